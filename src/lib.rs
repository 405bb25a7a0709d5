//! usmkit - CRI USM conversion toolkit
//!
//! This library crate exposes the conversion pipeline for the CLI and for
//! integration testing.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod provision;

pub use error::{Error, Result};
