pub mod export;
pub mod format;
pub mod log_file;
