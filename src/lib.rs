pub mod cli;
pub mod database;
pub mod error;
pub mod export;
pub mod merge;
pub mod pg;
pub mod tcx;
pub mod types;
pub mod utils;
