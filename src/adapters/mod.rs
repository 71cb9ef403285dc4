//! Concrete adapter implementations of the port traits.

pub mod csv_bar_adapter;
pub mod csv_metadata_adapter;
pub mod file_config_adapter;
