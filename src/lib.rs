//! csvscope: an in-memory tabular data engine and chart-description builder.
//!
//! Load delimited text (optionally inside a gzip archive), filter, sort,
//! group and page it, profile its columns, and describe it as a chart for a
//! rendering collaborator to draw. [`session::Session`] ties the stages
//! together behind a single event reducer.

pub mod cli;
pub mod constants;
pub mod data;
pub mod perf;
pub mod render;
pub mod session;
pub mod settings;
pub mod storage;
pub mod types;
