pub mod error;
pub mod gap_fill;
pub mod import;
