//! Destinations for invocation log records
//!
//! The instrumentation layer hands every record to a [`Sink`] as a template
//! plus ordered values and never formats or persists anything itself. Three
//! ready-made sinks are provided:
//!
//! - **TracingSink**: formats and emits through `tracing`
//! - **RecordingSink**: keeps records in memory for inspection
//! - **NullSink**: discards everything
//!
//! Any `Fn(&str, &[&str]) + Send + Sync` closure is a sink as well.

pub mod log_sink;
pub mod null_sink;
pub mod recording_sink;
pub mod tracing_sink;

pub use log_sink::{format_template, same_sink, Sink};
pub use null_sink::NullSink;
pub use recording_sink::{RecordCallback, RecordingSink, SinkRecord};
pub use tracing_sink::{TracingSink, TRACING_TARGET};
