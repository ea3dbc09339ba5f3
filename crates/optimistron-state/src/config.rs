//! Engine configuration and registration options

use std::fmt;
use std::sync::Arc;

use optimistron_core::Event;
use serde::{Deserialize, Serialize};

/// Optimistron engine configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimistronConfig {
    /// Warn once the pending list grows past this many entries (0 disables).
    /// Sanitization replays every pending transition on every event.
    pub pending_warn_threshold: usize,
    /// Run the sanitization pass after each state change
    pub sanitize: bool,
}

impl Default for OptimistronConfig {
    fn default() -> Self {
        OptimistronConfig {
            pending_warn_threshold: 64,
            sanitize: true,
        }
    }
}

/// Hook applied to transition events before they enter the pending list
pub type SanitizeAction<A> = Arc<dyn Fn(Event<A>) -> Event<A> + Send + Sync>;

/// Registration options
pub struct OptimistronOptions<A> {
    pub config: OptimistronConfig,
    /// e.g. strip error payloads that should not be retained
    pub sanitize_action: Option<SanitizeAction<A>>,
}

impl<A> OptimistronOptions<A> {
    pub fn new() -> Self {
        OptimistronOptions {
            config: OptimistronConfig::default(),
            sanitize_action: None,
        }
    }

    pub fn with_config(mut self, config: OptimistronConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_sanitize_action(
        mut self,
        hook: impl Fn(Event<A>) -> Event<A> + Send + Sync + 'static,
    ) -> Self {
        self.sanitize_action = Some(Arc::new(hook));
        self
    }
}

impl<A> Default for OptimistronOptions<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Clone for OptimistronOptions<A> {
    fn clone(&self) -> Self {
        OptimistronOptions {
            config: self.config.clone(),
            sanitize_action: self.sanitize_action.clone(),
        }
    }
}

impl<A> fmt::Debug for OptimistronOptions<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptimistronOptions")
            .field("config", &self.config)
            .field("sanitize_action", &self.sanitize_action.is_some())
            .finish()
    }
}
