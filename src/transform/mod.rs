//! Per-file transformations applied inside pipelines.
//!
//! Each transform is a plain function over bytes or text; the task modules
//! wire them into [`crate::pipeline::Pipeline`] steps.

pub mod css;
pub mod favicon;
pub mod image;
pub mod include;
pub mod js;
pub mod rename;
pub mod sass;
pub mod svg;
