//! Bar retrieval port trait.
//!
//! The supplier may hand back raw rows including zero-close sentinel bars;
//! the core filters those during series construction. Implementations must
//! support concurrent read access — the core never writes through this port.

use crate::domain::bar::Bar;
use crate::domain::error::MarketstageError;
use chrono::NaiveDate;

pub trait BarDataPort: Sync {
    /// Daily bars for one instrument, ordered by date, optionally bounded.
    fn fetch_daily(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Bar>, MarketstageError>;

    /// Daily bars for the benchmark index used by relative strength.
    fn fetch_benchmark_daily(&self) -> Result<Vec<Bar>, MarketstageError>;
}
