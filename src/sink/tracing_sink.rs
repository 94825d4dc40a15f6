use super::log_sink::{format_template, Sink};
use tracing::Level;

/// Target every [`TracingSink`] event is emitted under
pub const TRACING_TARGET: &str = "invocation_logger";

/// Sink that forwards records to the `tracing` ecosystem
///
/// Records are formatted eagerly and emitted as a single event at the
/// configured level, so they show up wherever the host application's
/// subscriber sends them. Filter them with `invocation_logger=<level>`.
///
/// # Examples
///
/// ```
/// use invocation_logger::sink::{Sink, TracingSink};
/// use tracing::Level;
///
/// let sink = TracingSink::new().with_level(Level::INFO);
/// sink.log("%s(%s)", &["Account.deposit", "10"]);
/// ```
#[derive(Debug, Clone)]
pub struct TracingSink {
    level: Level,
}

impl TracingSink {
    pub fn new() -> Self {
        Self {
            level: Level::DEBUG,
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn level(&self) -> Level {
        self.level
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for TracingSink {
    fn log(&self, template: &str, values: &[&str]) {
        let message = format_template(template, values);
        match self.level {
            Level::ERROR => tracing::error!(target: TRACING_TARGET, "{}", message),
            Level::WARN => tracing::warn!(target: TRACING_TARGET, "{}", message),
            Level::INFO => tracing::info!(target: TRACING_TARGET, "{}", message),
            Level::DEBUG => tracing::debug!(target: TRACING_TARGET, "{}", message),
            _ => tracing::trace!(target: TRACING_TARGET, "{}", message),
        }
    }
}
