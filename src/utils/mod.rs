//! Utility modules: fs helpers, logger, numeric conversions.
pub mod fsutil;
pub mod logger;
pub mod num;
