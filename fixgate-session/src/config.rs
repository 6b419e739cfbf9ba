/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Session configuration.
//!
//! This module provides configuration options for FIX sessions.

use std::time::Duration;

/// Default BeginString.
pub const DEFAULT_BEGIN_STRING: &str = "FIX.4.4";

/// Default Text (tag 58) of the Logout acknowledgment.
pub const DEFAULT_LOGOUT_TEXT: &str = "Goodbye";

/// How the session reacts to checksum and sequence number mismatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationPolicy {
    /// Log the mismatch and process the message anyway.
    #[default]
    Lenient,
    /// Log the mismatch and do not dispatch the message.
    ///
    /// A checksum mismatch is rejected before sequence bookkeeping; a
    /// sequence mismatch still advances the inbound counter.
    Strict,
}

impl ValidationPolicy {
    /// Returns true for [`ValidationPolicy::Strict`].
    #[must_use]
    pub const fn is_strict(self) -> bool {
        matches!(self, Self::Strict)
    }
}

/// Configuration for an accepted FIX session.
///
/// CompIDs are not configured: the session learns them from the
/// counterparty's Logon.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// FIX version BeginString (e.g., "FIX.4.4").
    pub begin_string: String,
    /// Validation policy for inbound checksums and sequence numbers.
    pub validation: ValidationPolicy,
    /// Period of the heartbeat check, independent of the negotiated interval.
    pub heartbeat_check_period: Duration,
    /// Heartbeat interval in seconds used until a Logon sets one.
    pub default_heartbeat_interval: u64,
    /// Text (tag 58) sent in the Logout acknowledgment.
    pub logout_text: String,
    /// Maximum inbound message size in bytes.
    pub max_message_size: usize,
}

impl SessionConfig {
    /// Creates a configuration with default settings for the given BeginString.
    ///
    /// # Arguments
    /// * `begin_string` - The FIX version string
    #[must_use]
    pub fn new(begin_string: impl Into<String>) -> Self {
        Self {
            begin_string: begin_string.into(),
            validation: ValidationPolicy::Lenient,
            heartbeat_check_period: Duration::from_secs(5),
            default_heartbeat_interval: 0,
            logout_text: DEFAULT_LOGOUT_TEXT.to_string(),
            max_message_size: 1024 * 1024, // 1MB
        }
    }

    /// Sets the validation policy.
    #[must_use]
    pub const fn with_validation(mut self, validation: ValidationPolicy) -> Self {
        self.validation = validation;
        self
    }

    /// Sets the heartbeat check period.
    #[must_use]
    pub const fn with_heartbeat_check_period(mut self, period: Duration) -> Self {
        self.heartbeat_check_period = period;
        self
    }

    /// Sets the heartbeat interval used before Logon.
    #[must_use]
    pub const fn with_default_heartbeat_interval(mut self, secs: u64) -> Self {
        self.default_heartbeat_interval = secs;
        self
    }

    /// Sets the Logout acknowledgment text.
    #[must_use]
    pub fn with_logout_text(mut self, text: impl Into<String>) -> Self {
        self.logout_text = text.into();
        self
    }

    /// Sets the maximum message size.
    #[must_use]
    pub const fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BEGIN_STRING)
    }
}
