/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Outbound message construction.
//!
//! [`MessageBuilder`] owns the outbound sequence counter. Every message it
//! builds carries the standard header in fixed order
//! (35, 49, 56, 34, 52), then the caller's fields in slice order, and
//! consumes exactly one sequence number.

use crate::state::SessionId;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use fixgate_core::field::tags;
use fixgate_core::message::MsgType;
use fixgate_core::types::{SeqNum, format_utc_timestamp};
use fixgate_tagvalue::Encoder;

/// Builds framed outbound messages for one session.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    /// BeginString and CompIDs stamped on every message.
    id: SessionId,
    /// Sequence number of the next message built.
    next_seq: SeqNum,
}

impl MessageBuilder {
    /// Creates a builder with empty CompIDs and sequence number 1.
    #[must_use]
    pub fn new(begin_string: impl Into<String>) -> Self {
        Self {
            id: SessionId {
                begin_string: begin_string.into(),
                ..SessionId::default()
            },
            next_seq: SeqNum::default(),
        }
    }

    /// Returns the identity stamped on outbound messages.
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.id
    }

    /// Sets SenderCompID (49) and TargetCompID (56) for later messages.
    pub fn set_comp_ids(&mut self, sender: impl Into<String>, target: impl Into<String>) {
        self.id.sender_comp_id = sender.into();
        self.id.target_comp_id = target.into();
    }

    /// Returns the sequence number the next message will carry.
    #[inline]
    #[must_use]
    pub const fn next_seq(&self) -> SeqNum {
        self.next_seq
    }

    /// Builds a message stamped with the current time.
    ///
    /// # Arguments
    /// * `msg_type` - MsgType (35) of the message
    /// * `fields` - Application fields appended after the header
    pub fn build(&mut self, msg_type: &MsgType, fields: &[(u32, String)]) -> Bytes {
        self.build_at(msg_type, fields, Utc::now())
    }

    /// Builds a message with SendingTime (52) taken from `now`.
    pub fn build_at(
        &mut self,
        msg_type: &MsgType,
        fields: &[(u32, String)],
        now: DateTime<Utc>,
    ) -> Bytes {
        let mut encoder = Encoder::new(&self.id.begin_string);
        encoder.put_str(tags::MSG_TYPE, msg_type.as_str());
        encoder.put_str(tags::SENDER_COMP_ID, &self.id.sender_comp_id);
        encoder.put_str(tags::TARGET_COMP_ID, &self.id.target_comp_id);
        encoder.put_uint(tags::MSG_SEQ_NUM, self.next_seq.value());
        encoder.put_str(tags::SENDING_TIME, &format_utc_timestamp(now));
        encoder.put_fields(fields);

        self.next_seq = self.next_seq.next();
        encoder.finish()
    }
}
