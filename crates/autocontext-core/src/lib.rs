//! AutoContext Core - Domain models, configuration, and prompt formatting
//!
//! This crate contains the data model shared by the pipelines, the layered
//! configuration loaded from `config.json`, and the formatting utilities that
//! turn search results into prompt context.

pub mod config;
pub mod error;
pub mod format;
pub mod models;
pub mod prompt;

pub use error::{AutoContextError, Result};
