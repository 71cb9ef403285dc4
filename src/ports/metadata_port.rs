//! Instrument metadata port trait.

use crate::domain::error::MarketstageError;

pub trait MetadataPort: Sync {
    /// Every symbol in the configured universe.
    fn list_symbols(&self) -> Result<Vec<String>, MarketstageError>;

    /// Sector classification, if the symbol is known.
    fn sector_of(&self, symbol: &str) -> Option<String>;

    /// Display name; falls back to the symbol itself for unknown instruments.
    fn name_of(&self, symbol: &str) -> String;
}
