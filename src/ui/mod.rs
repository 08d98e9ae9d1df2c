//! User interface module.
//!
//! - `formatter` - Styled terminal output for the CLI

pub mod formatter;

pub use formatter::{
    display_error, display_image_tags, display_release, display_status, display_success,
};
