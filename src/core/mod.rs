//! Core infrastructure for acquisition runs
//!
//! Errors, settings, destination locking and user-facing output.

pub mod config;
pub mod error;
pub mod lock;
pub mod output;
