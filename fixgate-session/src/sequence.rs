/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Inbound sequence number tracking.
//!
//! The outbound counter lives in the message builder; this module tracks the
//! next MsgSeqNum expected from the counterparty. Both are only touched under
//! the session lock.

use fixgate_core::types::SeqNum;

/// Tracks the next expected inbound sequence number.
#[derive(Debug, Clone, Copy, Default)]
pub struct InboundSequence {
    next: SeqNum,
}

impl InboundSequence {
    /// Creates a tracker expecting sequence number 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next expected sequence number.
    #[inline]
    #[must_use]
    pub const fn expected(&self) -> SeqNum {
        self.next
    }

    /// Compares a received sequence number against the expected one.
    #[must_use]
    pub fn validate(&self, received: u64) -> SequenceResult {
        let expected = self.next.value();

        if received == expected {
            SequenceResult::Ok
        } else if received < expected {
            SequenceResult::TooLow { expected, received }
        } else {
            SequenceResult::Gap { expected, received }
        }
    }

    /// Advances the expected sequence number by one.
    ///
    /// Called once per parsed inbound message, whether or not it matched.
    #[inline]
    pub fn advance(&mut self) {
        self.next = self.next.next();
    }
}

/// Result of sequence number validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceResult {
    /// Sequence number is as expected.
    Ok,
    /// Sequence number is lower than expected (possible duplicate).
    TooLow {
        /// Expected sequence number.
        expected: u64,
        /// Received sequence number.
        received: u64,
    },
    /// Sequence number is higher than expected (gap detected).
    Gap {
        /// Expected sequence number.
        expected: u64,
        /// Received sequence number.
        received: u64,
    },
}

impl SequenceResult {
    /// Returns true if the sequence is valid.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Returns true if there's a gap.
    #[must_use]
    pub const fn is_gap(&self) -> bool {
        matches!(self, Self::Gap { .. })
    }

    /// Returns true if the sequence is too low.
    #[must_use]
    pub const fn is_too_low(&self) -> bool {
        matches!(self, Self::TooLow { .. })
    }
}
