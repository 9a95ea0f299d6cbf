//! Data access port trait.

use crate::domain::error::EmatrendError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Fetch bars sorted by date, validated strictly increasing.
    fn fetch_ohlcv(&self) -> Result<Vec<OhlcvBar>, EmatrendError>;

    /// (first date, last date, bar count), or `None` for an empty source.
    fn get_data_range(&self) -> Result<Option<(NaiveDate, NaiveDate, usize)>, EmatrendError>;
}
