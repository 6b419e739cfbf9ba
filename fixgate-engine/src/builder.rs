/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Engine builder for fluent configuration.
//!
//! This module provides a builder API for configuring a FIX acceptor.

use crate::acceptor::Acceptor;
use fixgate_core::error::FixError;
use fixgate_session::{SessionConfig, ValidationPolicy};
use std::time::Duration;

/// Default address the acceptor listens on.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:9876";

/// Builder for configuring a FIX acceptor.
#[derive(Debug, Clone)]
pub struct EngineBuilder {
    /// Address to listen on.
    bind_addr: String,
    /// Configuration applied to every accepted session.
    session: SessionConfig,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder {
    /// Creates a new engine builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            session: SessionConfig::default(),
        }
    }

    /// Sets the listen address.
    #[must_use]
    pub fn with_bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }

    /// Replaces the session configuration.
    #[must_use]
    pub fn with_session_config(mut self, config: SessionConfig) -> Self {
        self.session = config;
        self
    }

    /// Sets the inbound validation policy.
    #[must_use]
    pub fn with_validation(mut self, validation: ValidationPolicy) -> Self {
        self.session.validation = validation;
        self
    }

    /// Sets how often the heartbeat scheduler wakes up.
    #[must_use]
    pub fn with_heartbeat_check_period(mut self, period: Duration) -> Self {
        self.session.heartbeat_check_period = period;
        self
    }

    /// Returns the listen address.
    #[must_use]
    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }

    /// Returns the session configuration.
    #[must_use]
    pub fn session_config(&self) -> &SessionConfig {
        &self.session
    }

    /// Binds the listener and returns the acceptor.
    ///
    /// # Errors
    /// Returns an error if the address cannot be bound.
    pub async fn build(self) -> Result<Acceptor, FixError> {
        Acceptor::bind(self.bind_addr.as_str(), self.session).await
    }
}
