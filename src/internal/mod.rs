//! Internal utility modules
//!
//! Shared functionality used by the fetchers and the extractor.

pub mod fs_utils;
pub mod progress;
pub mod url_utils;
