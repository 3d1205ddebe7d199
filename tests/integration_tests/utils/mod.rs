// Mirror src/utils: fsutil and logger
#[path = "mod_fsutil.rs"]
mod fsutil_tests;
#[path = "mod_logger.rs"]
mod logger_tests;
