pub mod changelog;
pub mod config;
pub mod docker;
pub mod domain;
pub mod error;
pub mod git;
pub mod process;
pub mod release;
pub mod ui;
pub mod version_file;

pub use error::{Result, TagshipError};
