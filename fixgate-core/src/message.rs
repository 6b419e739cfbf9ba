/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! FIX message types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// FIX message types known to the session layer.
///
/// Anything else is carried as `Custom(String)` so it can still be logged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MsgType {
    /// Heartbeat (0) - Session level.
    #[default]
    Heartbeat,
    /// Test Request (1) - Session level.
    TestRequest,
    /// Logout (5) - Session level.
    Logout,
    /// Execution Report (8).
    ExecutionReport,
    /// Logon (A) - Session level.
    Logon,
    /// New Order Single (D).
    NewOrderSingle,
    /// Custom or unknown message type.
    Custom(String),
}

impl std::str::FromStr for MsgType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "0" => Self::Heartbeat,
            "1" => Self::TestRequest,
            "5" => Self::Logout,
            "8" => Self::ExecutionReport,
            "A" => Self::Logon,
            "D" => Self::NewOrderSingle,
            other => Self::Custom(other.to_string()),
        })
    }
}

impl MsgType {
    /// Parses a MsgType (tag 35) value.
    #[must_use]
    pub fn from_value(s: &str) -> Self {
        match s.parse() {
            Ok(msg_type) => msg_type,
            Err(never) => match never {},
        }
    }

    /// Returns the wire representation of this message type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Heartbeat => "0",
            Self::TestRequest => "1",
            Self::Logout => "5",
            Self::ExecutionReport => "8",
            Self::Logon => "A",
            Self::NewOrderSingle => "D",
            Self::Custom(s) => s.as_str(),
        }
    }
}

impl fmt::Display for MsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
