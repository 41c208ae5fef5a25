//! Core types for parley
//!
//! This crate provides the conversation data model, transcript storage,
//! configuration loading and logging setup shared by the other parley crates.

pub mod config;
pub mod error;
pub mod logging;
pub mod session;
pub mod utils;

pub use error::{Error, Result};
