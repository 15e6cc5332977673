pub mod config;
pub mod error;
pub mod exclude;
pub mod git;
pub mod interpreter;
pub mod io;
pub mod launcher;
pub mod paths;
pub mod protect;
pub mod report;
pub mod runner;

pub use error::{Result, SyncError};
