/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Heartbeat scheduling.
//!
//! The scheduler wakes on a fixed check period and asks the session to send
//! a Heartbeat when it has been logged in and silent for at least the
//! negotiated interval. Any inbound or outbound traffic pushes the next
//! heartbeat back.

use crate::session::Session;
use fixgate_core::error::SessionError;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Periodic heartbeat task for one session.
#[derive(Debug, Clone)]
pub struct HeartbeatScheduler {
    session: Session,
    period: Duration,
}

impl HeartbeatScheduler {
    /// Creates a scheduler using the session's configured check period.
    #[must_use]
    pub fn new(session: Session) -> Self {
        let period = session.config().heartbeat_check_period;
        Self { session, period }
    }

    /// Overrides the check period.
    #[must_use]
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Returns the check period.
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Runs until `cancel` fires or the outbound channel closes.
    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("heartbeat scheduler cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    match self.session.send_heartbeat_if_due() {
                        Ok(_) => {}
                        Err(SessionError::Closed) => {
                            debug!("heartbeat scheduler stopping, writer closed");
                            break;
                        }
                        Err(err) => warn!(error = %err, "failed to send heartbeat"),
                    }
                }
            }
        }
    }
}
