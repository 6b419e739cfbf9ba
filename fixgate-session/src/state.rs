/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Session status and identity.
//!
//! ```text
//! Connected → (Logon) → LoggedIn → (Logout) → LoggedOut
//!     └──────────────────┴─────────────────────┴─→ (read side ends) → Closed
//! ```
//!
//! A Logon received while `LoggedOut` logs the session in again; the
//! connection itself is only torn down by the transport.

use std::fmt;

/// Lifecycle status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// Transport connected, no Logon processed yet.
    #[default]
    Connected,
    /// Logon processed; heartbeats are scheduled.
    LoggedIn,
    /// Logout processed; the connection may still be open.
    LoggedOut,
    /// The inbound side of the connection has ended.
    Closed,
}

impl SessionStatus {
    /// Returns true while heartbeats should be sent.
    #[must_use]
    pub const fn is_logged_in(self) -> bool {
        matches!(self, Self::LoggedIn)
    }

    /// Returns the status name used in log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::LoggedIn => "logged_in",
            Self::LoggedOut => "logged_out",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session identifier, from this side's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SessionId {
    /// BeginString (FIX version).
    pub begin_string: String,
    /// Our SenderCompID (the counterparty's TargetCompID).
    pub sender_comp_id: String,
    /// Our TargetCompID (the counterparty's SenderCompID).
    pub target_comp_id: String,
}

impl SessionId {
    /// Creates a new session ID.
    #[must_use]
    pub fn new(
        begin_string: impl Into<String>,
        sender_comp_id: impl Into<String>,
        target_comp_id: impl Into<String>,
    ) -> Self {
        Self {
            begin_string: begin_string.into(),
            sender_comp_id: sender_comp_id.into(),
            target_comp_id: target_comp_id.into(),
        }
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}->{}",
            self.begin_string, self.sender_comp_id, self.target_comp_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_status_default() {
        let status = SessionStatus::default();
        assert_eq!(status, SessionStatus::Connected);
        assert!(!status.is_logged_in());
        assert!(SessionStatus::LoggedIn.is_logged_in());
        assert_eq!(SessionStatus::LoggedOut.to_string(), "logged_out");
    }

    #[test]
    fn test_session_id_display() {
        let id = SessionId::new("FIX.4.4", "SERVER", "CLIENT");
        assert_eq!(id.to_string(), "FIX.4.4:SERVER->CLIENT");
    }
}
