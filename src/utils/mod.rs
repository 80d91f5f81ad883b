//! Shared helpers with no pipeline knowledge.

pub mod fs;
pub mod hash;
pub mod path;
