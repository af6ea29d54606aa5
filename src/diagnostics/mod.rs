//! Diagnostic reporting for navigation and conversion failures.
//!
//! Failed lookups do not abort; they degrade to absent or default values at
//! the call site and report the failure path through a [`Diagnostics`]
//! value. Each [`Document`](crate::Document) owns one, so configuration is
//! explicit and per-document rather than process-wide.
//!
//! Without a custom logger, messages go to `tracing` at `WARN` level under
//! the `xmlnav` target.

use std::fmt;
use std::sync::Arc;

/// A sink for diagnostic messages.
///
/// Any `Fn(&str) + Send + Sync` closure is a logger.
pub trait XmlLogger: Send + Sync {
    /// Receives one diagnostic message.
    fn log(&self, message: &str);
}

impl<F> XmlLogger for F
where
    F: Fn(&str) + Send + Sync,
{
    fn log(&self, message: &str) {
        self(message);
    }
}

/// Diagnostic configuration: an enabled flag and an optional logger.
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use xmlnav::diagnostics::Diagnostics;
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&seen);
/// let diagnostics = Diagnostics::default()
///     .logger(move |msg: &str| sink.lock().unwrap().push(msg.to_string()));
/// diagnostics.log("no such children named \"x\"");
/// assert_eq!(seen.lock().unwrap().len(), 1);
/// ```
#[derive(Clone)]
pub struct Diagnostics {
    enabled: bool,
    logger: Option<Arc<dyn XmlLogger>>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self {
            enabled: true,
            logger: None,
        }
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("enabled", &self.enabled)
            .field("logger", &self.logger.as_ref().map(|_| "<custom>"))
            .finish()
    }
}

impl Diagnostics {
    /// Diagnostics that drop every message.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            logger: None,
        }
    }

    /// Enables or disables reporting.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Routes messages to `logger` instead of `tracing`.
    #[must_use]
    pub fn logger(mut self, logger: impl XmlLogger + 'static) -> Self {
        self.logger = Some(Arc::new(logger));
        self
    }

    /// Returns `true` if messages are reported.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Reports a message, if enabled.
    pub fn log(&self, message: &str) {
        if !self.enabled {
            return;
        }
        match &self.logger {
            Some(logger) => logger.log(message),
            None => tracing::warn!(target: "xmlnav", "{message}"),
        }
    }
}
