//! Timeout configuration for gateway operations.

use std::time::Duration;

/// Timeouts for gateway HTTP calls and statement readiness polling.
///
/// # Examples
///
/// ```rust
/// use streamsql_link::LinkTimeouts;
/// use std::time::Duration;
///
/// let timeouts = LinkTimeouts::builder()
///     .connection_timeout(Duration::from_secs(5))
///     .statement_ready_timeout(Duration::from_secs(120))
///     .build();
///
/// let local = LinkTimeouts::fast();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTimeouts {
    /// Timeout for establishing connections (TCP + TLS handshake).
    /// Default: 10 seconds
    pub connection_timeout: Duration,

    /// Timeout for a single HTTP request/response exchange.
    /// Default: 30 seconds
    pub receive_timeout: Duration,

    /// How long to wait for a new statement to leave the PENDING phase.
    /// Default: 60 seconds
    pub statement_ready_timeout: Duration,

    /// Interval between statement status polls while waiting.
    /// Default: 500 milliseconds
    pub poll_interval: Duration,
}

impl Default for LinkTimeouts {
    fn default() -> Self {
        Self {
            connection_timeout: Duration::from_secs(10),
            receive_timeout: Duration::from_secs(30),
            statement_ready_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_millis(500),
        }
    }
}

impl LinkTimeouts {
    /// Create a new builder for custom timeout configuration.
    pub fn builder() -> LinkTimeoutsBuilder {
        LinkTimeoutsBuilder::new()
    }

    /// Short timeouts for a gateway on localhost.
    pub fn fast() -> Self {
        Self {
            connection_timeout: Duration::from_secs(2),
            receive_timeout: Duration::from_secs(5),
            statement_ready_timeout: Duration::from_secs(15),
            poll_interval: Duration::from_millis(100),
        }
    }

    /// Long timeouts for high-latency networks.
    pub fn relaxed() -> Self {
        Self {
            connection_timeout: Duration::from_secs(30),
            receive_timeout: Duration::from_secs(120),
            statement_ready_timeout: Duration::from_secs(300),
            poll_interval: Duration::from_secs(1),
        }
    }
}

/// Builder for [`LinkTimeouts`].
#[derive(Debug, Clone)]
pub struct LinkTimeoutsBuilder {
    timeouts: LinkTimeouts,
}

impl LinkTimeoutsBuilder {
    fn new() -> Self {
        Self {
            timeouts: LinkTimeouts::default(),
        }
    }

    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.connection_timeout = timeout;
        self
    }

    pub fn connection_timeout_secs(self, secs: u64) -> Self {
        self.connection_timeout(Duration::from_secs(secs))
    }

    pub fn receive_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.receive_timeout = timeout;
        self
    }

    pub fn receive_timeout_secs(self, secs: u64) -> Self {
        self.receive_timeout(Duration::from_secs(secs))
    }

    pub fn statement_ready_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.statement_ready_timeout = timeout;
        self
    }

    pub fn statement_ready_timeout_secs(self, secs: u64) -> Self {
        self.statement_ready_timeout(Duration::from_secs(secs))
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.timeouts.poll_interval = interval;
        self
    }

    pub fn poll_interval_ms(self, ms: u64) -> Self {
        self.poll_interval(Duration::from_millis(ms))
    }

    pub fn build(self) -> LinkTimeouts {
        self.timeouts
    }
}
