//! Command handlers for the CLI application.
//!
//! - `replay`: run a capture through the full pipeline
//! - `frame`: decode and encode single frames
//! - `keymap`: print the translation table

pub mod frame;
pub mod keymap;
pub mod replay;
