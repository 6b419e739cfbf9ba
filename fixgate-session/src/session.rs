/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Session state machine.
//!
//! A [`Session`] is shared by the connection's inbound task and its
//! heartbeat task. Every mutation (timestamp refresh, inbound bookkeeping,
//! building a reply, allocating its sequence number and queueing its bytes)
//! happens under one lock, so outbound bytes reach the writer in sequence
//! order. The lock is never held across an `.await`.

use crate::builder::MessageBuilder;
use crate::config::SessionConfig;
use crate::order::NewOrderSingle;
use crate::sequence::{InboundSequence, SequenceResult};
use crate::state::{SessionId, SessionStatus};
use bytes::Bytes;
use chrono::Utc;
use fixgate_core::error::SessionError;
use fixgate_core::field::{FieldMap, tags};
use fixgate_core::message::MsgType;
use fixgate_core::types::SeqNum;
use fixgate_tagvalue::{checksum_region, checksum_string, parse_fields};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Channel carrying framed outbound messages to the connection's writer.
pub type OutboundSender = mpsc::UnboundedSender<Bytes>;

/// Mutable per-session state, guarded by the session lock.
#[derive(Debug)]
struct SessionCore {
    status: SessionStatus,
    inbound: InboundSequence,
    /// Negotiated heartbeat interval in seconds.
    heartbeat_interval: u64,
    /// Last inbound arrival or outbound send.
    last_message_time: Instant,
    builder: MessageBuilder,
}

/// Summary of one processed inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Processed {
    /// MsgType (35) of the inbound message.
    pub msg_type: MsgType,
    /// MsgSeqNum (34) it carried, 0 when absent or unparseable.
    pub seq_num: u64,
    /// MsgType of the reply sent, if any.
    pub reply: Option<MsgType>,
}

/// Handle to one FIX session; clones share the same state.
#[derive(Debug, Clone)]
pub struct Session {
    config: Arc<SessionConfig>,
    core: Arc<Mutex<SessionCore>>,
    outbound: OutboundSender,
}

impl Session {
    /// Creates a session in the `Connected` state.
    ///
    /// # Arguments
    /// * `config` - Session configuration
    /// * `outbound` - Channel drained by the connection's writer
    #[must_use]
    pub fn new(config: Arc<SessionConfig>, outbound: OutboundSender) -> Self {
        let core = SessionCore {
            status: SessionStatus::Connected,
            inbound: InboundSequence::new(),
            heartbeat_interval: config.default_heartbeat_interval,
            last_message_time: Instant::now(),
            builder: MessageBuilder::new(config.begin_string.clone()),
        };
        Self {
            config,
            core: Arc::new(Mutex::new(core)),
            outbound,
        }
    }

    /// Processes one complete inbound message.
    ///
    /// # Errors
    /// Returns `SessionError::Malformed` if no field parses, the validation
    /// variants under a strict policy, and `SessionError::Closed` if a reply
    /// could not be queued. None of these end the session.
    pub fn on_message(&self, raw: &[u8]) -> Result<Processed, SessionError> {
        let parsed = parse_fields(raw);
        let mut core = self.core.lock();
        core.last_message_time = Instant::now();

        let parsed = parsed.inspect_err(|err| {
            warn!(error = %err, len = raw.len(), "failed to parse message");
        })?;
        if parsed.dropped > 0 {
            warn!(dropped = parsed.dropped, "dropped malformed fields");
        }
        let fields = parsed.fields;

        self.verify_checksum(raw, &fields)?;

        let msg_type = MsgType::from_value(fields.get_or_empty(tags::MSG_TYPE));
        let seq_num: u64 = fields.get_as(tags::MSG_SEQ_NUM).unwrap_or(0);
        info!(msg_type = %msg_type, seq_num, "received message");

        let sequence = core.inbound.validate(seq_num);
        core.inbound.advance();
        match sequence {
            SequenceResult::Ok => {}
            SequenceResult::TooLow { expected, received }
                if is_flag_set(&fields, tags::POSS_DUP_FLAG) =>
            {
                info!(expected, received, "possible duplicate received");
            }
            SequenceResult::TooLow { expected, received }
            | SequenceResult::Gap { expected, received } => {
                warn!(expected, received, "sequence number mismatch");
            }
        }
        if let SequenceResult::TooLow { expected, received }
        | SequenceResult::Gap { expected, received } = sequence
            && self.config.validation.is_strict()
        {
            return Err(SessionError::SequenceMismatch { expected, received });
        }

        let reply = self.dispatch(&mut core, &msg_type, &fields)?;
        Ok(Processed {
            msg_type,
            seq_num,
            reply,
        })
    }

    /// Builds and queues an outbound message.
    ///
    /// # Returns
    /// The sequence number the message was sent with.
    ///
    /// # Errors
    /// Returns `SessionError::Closed` if the writer has gone away.
    pub fn send(&self, msg_type: &MsgType, fields: &[(u32, String)]) -> Result<SeqNum, SessionError> {
        let mut core = self.core.lock();
        self.send_locked(&mut core, msg_type, fields)
    }

    /// Sends an unsolicited Heartbeat if the session is logged in and has
    /// been silent for at least the negotiated interval.
    ///
    /// # Returns
    /// `true` if a Heartbeat was queued.
    ///
    /// # Errors
    /// Returns `SessionError::Closed` if the writer has gone away.
    pub fn send_heartbeat_if_due(&self) -> Result<bool, SessionError> {
        let mut core = self.core.lock();
        if !core.status.is_logged_in() {
            return Ok(false);
        }

        let elapsed = core.last_message_time.elapsed();
        if elapsed < Duration::from_secs(core.heartbeat_interval) {
            return Ok(false);
        }

        let seq_num = self.send_locked(&mut core, &MsgType::Heartbeat, &[])?;
        info!(seq_num = seq_num.value(), ?elapsed, "sent scheduled heartbeat");
        Ok(true)
    }

    /// Marks the session closed once its inbound side has ended.
    pub fn close(&self) {
        let mut core = self.core.lock();
        core.status = SessionStatus::Closed;
    }

    /// Returns the session configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the current status.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.core.lock().status
    }

    /// Returns true between a Logon and the next Logout.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.status().is_logged_in()
    }

    /// Returns the identity stamped on outbound messages.
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.core.lock().builder.session_id().clone()
    }

    /// Returns the negotiated heartbeat interval in seconds.
    #[must_use]
    pub fn heartbeat_interval(&self) -> u64 {
        self.core.lock().heartbeat_interval
    }

    /// Returns the next expected inbound sequence number.
    #[must_use]
    pub fn next_incoming_seq(&self) -> SeqNum {
        self.core.lock().inbound.expected()
    }

    /// Returns the sequence number of the next outbound message.
    #[must_use]
    pub fn next_outgoing_seq(&self) -> SeqNum {
        self.core.lock().builder.next_seq()
    }

    /// Returns the time of the last inbound arrival or outbound send.
    #[must_use]
    pub fn last_message_time(&self) -> Instant {
        self.core.lock().last_message_time
    }

    fn verify_checksum(&self, raw: &[u8], fields: &FieldMap) -> Result<(), SessionError> {
        let region = checksum_region(raw).unwrap_or(raw);
        let calculated = checksum_string(region);
        let declared = fields.get_or_empty(tags::CHECKSUM);
        if calculated == declared {
            return Ok(());
        }

        warn!(calculated = %calculated, declared, "checksum mismatch");
        if self.config.validation.is_strict() {
            return Err(SessionError::ChecksumMismatch {
                calculated,
                declared: declared.to_string(),
            });
        }
        Ok(())
    }

    fn dispatch(
        &self,
        core: &mut SessionCore,
        msg_type: &MsgType,
        fields: &FieldMap,
    ) -> Result<Option<MsgType>, SessionError> {
        match msg_type {
            MsgType::Logon => self.on_logon(core, fields).map(Some),
            MsgType::Logout => self.on_logout(core, fields).map(Some),
            MsgType::Heartbeat => {
                debug!(test_req_id = fields.get(tags::TEST_REQ_ID), "received heartbeat");
                Ok(None)
            }
            MsgType::TestRequest => self.on_test_request(core, fields).map(Some),
            MsgType::NewOrderSingle => self.on_new_order(core, fields).map(Some),
            other => {
                warn!(msg_type = %other, "unhandled message type");
                Ok(None)
            }
        }
    }

    fn on_logon(&self, core: &mut SessionCore, fields: &FieldMap) -> Result<MsgType, SessionError> {
        // The counterparty's TargetCompID is our SenderCompID and vice versa.
        core.builder.set_comp_ids(
            fields.get_or_empty(tags::TARGET_COMP_ID),
            fields.get_or_empty(tags::SENDER_COMP_ID),
        );
        match fields.get_as::<u64>(tags::HEART_BT_INT) {
            Some(interval) => core.heartbeat_interval = interval,
            None => debug!(
                value = fields.get(tags::HEART_BT_INT),
                kept = core.heartbeat_interval,
                "keeping heartbeat interval"
            ),
        }
        core.status = SessionStatus::LoggedIn;

        info!(
            session = %core.builder.session_id(),
            heartbeat_interval = core.heartbeat_interval,
            "logon"
        );

        let reply = [
            (tags::ENCRYPT_METHOD, "0".to_string()),
            (tags::HEART_BT_INT, core.heartbeat_interval.to_string()),
        ];
        self.send_locked(core, &MsgType::Logon, &reply)?;
        Ok(MsgType::Logon)
    }

    fn on_logout(&self, core: &mut SessionCore, fields: &FieldMap) -> Result<MsgType, SessionError> {
        info!(text = fields.get_or_empty(tags::TEXT), "logout");
        core.status = SessionStatus::LoggedOut;

        let reply = [(tags::TEXT, self.config.logout_text.clone())];
        self.send_locked(core, &MsgType::Logout, &reply)?;
        Ok(MsgType::Logout)
    }

    fn on_test_request(
        &self,
        core: &mut SessionCore,
        fields: &FieldMap,
    ) -> Result<MsgType, SessionError> {
        let test_req_id = fields.get_or_empty(tags::TEST_REQ_ID);
        info!(test_req_id, "test request");

        let reply = [(tags::TEST_REQ_ID, test_req_id.to_string())];
        self.send_locked(core, &MsgType::Heartbeat, &reply)?;
        Ok(MsgType::Heartbeat)
    }

    fn on_new_order(&self, core: &mut SessionCore, fields: &FieldMap) -> Result<MsgType, SessionError> {
        let order = NewOrderSingle::from_fields(fields);
        info!(
            cl_ord_id = %order.cl_ord_id,
            symbol = %order.symbol,
            side = %order.side,
            order_qty = %order.order_qty,
            price = %order.price,
            "new order single"
        );

        let report = order.full_fill(Utc::now());
        self.send_locked(core, &MsgType::ExecutionReport, &report)?;
        info!(cl_ord_id = %order.cl_ord_id, order_id = %order.order_id(), "order filled");
        Ok(MsgType::ExecutionReport)
    }

    fn send_locked(
        &self,
        core: &mut SessionCore,
        msg_type: &MsgType,
        fields: &[(u32, String)],
    ) -> Result<SeqNum, SessionError> {
        let seq_num = core.builder.next_seq();
        let message = core.builder.build(msg_type, fields);
        core.last_message_time = Instant::now();

        debug!(msg_type = %msg_type, seq_num = seq_num.value(), len = message.len(), "queueing message");
        self.outbound.send(message).map_err(|_| {
            warn!(msg_type = %msg_type, seq_num = seq_num.value(), "outbound channel closed");
            SessionError::Closed
        })?;
        Ok(seq_num)
    }
}

/// Returns true if a boolean field is present and set to `Y`.
fn is_flag_set(fields: &FieldMap, tag: u32) -> bool {
    fields.get(tag) == Some("Y")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationPolicy;
    use fixgate_tagvalue::Encoder;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn new_session(config: SessionConfig) -> (Session, UnboundedReceiver<Bytes>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Session::new(Arc::new(config), tx), rx)
    }

    fn client_message(msg_type: &str, seq: u64, fields: &[(u32, &str)]) -> Vec<u8> {
        let mut encoder = Encoder::new("FIX.4.4");
        encoder.put_str(35, msg_type);
        encoder.put_str(49, "CLIENT");
        encoder.put_str(56, "SERVER");
        encoder.put_uint(34, seq);
        encoder.put_str(52, "20240101-00:00:00.000");
        for (tag, value) in fields {
            encoder.put_str(*tag, value);
        }
        encoder.finish().to_vec()
    }

    fn logon(session: &Session, rx: &mut UnboundedReceiver<Bytes>) {
        session
            .on_message(&client_message("A", 1, &[(98, "0"), (108, "30")]))
            .unwrap();
        rx.try_recv().unwrap();
    }

    fn drain(rx: &mut UnboundedReceiver<Bytes>) -> Vec<FieldMap> {
        let mut out = Vec::new();
        while let Ok(bytes) = rx.try_recv() {
            out.push(parse_fields(&bytes).unwrap().fields);
        }
        out
    }

    #[test]
    fn test_logon_reverses_roles() {
        let (session, mut rx) = new_session(SessionConfig::default());
        let processed = session
            .on_message(&client_message("A", 1, &[(98, "0"), (108, "30")]))
            .unwrap();

        assert_eq!(processed.reply, Some(MsgType::Logon));
        let id = session.session_id();
        assert_eq!(id.sender_comp_id, "SERVER");
        assert_eq!(id.target_comp_id, "CLIENT");
        assert_eq!(session.heartbeat_interval(), 30);
        assert!(session.is_logged_in());

        let replies = drain(&mut rx);
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].get(35), Some("A"));
        assert_eq!(replies[0].get(108), Some("30"));
        assert_eq!(replies[0].get(98), Some("0"));
        assert_eq!(replies[0].get(49), Some("SERVER"));
        assert_eq!(replies[0].get(56), Some("CLIENT"));
        assert_eq!(replies[0].get(34), Some("1"));
    }

    #[test]
    fn test_logon_bad_heartbeat_interval_keeps_previous() {
        let (session, mut rx) =
            new_session(SessionConfig::default().with_default_heartbeat_interval(15));
        session
            .on_message(&client_message("A", 1, &[(108, "soon")]))
            .unwrap();

        assert_eq!(session.heartbeat_interval(), 15);
        assert_eq!(drain(&mut rx)[0].get(108), Some("15"));
    }

    #[test]
    fn test_test_request_echo() {
        let (session, mut rx) = new_session(SessionConfig::default());
        logon(&session, &mut rx);

        let processed = session
            .on_message(&client_message("1", 2, &[(112, "T-42")]))
            .unwrap();

        assert_eq!(processed.reply, Some(MsgType::Heartbeat));
        let replies = drain(&mut rx);
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].get(35), Some("0"));
        assert_eq!(replies[0].get(112), Some("T-42"));
    }

    #[test]
    fn test_new_order_full_fill() {
        let (session, mut rx) = new_session(SessionConfig::default());
        logon(&session, &mut rx);

        session
            .on_message(&client_message(
                "D",
                2,
                &[
                    (11, "C1"),
                    (55, "XYZ"),
                    (54, "1"),
                    (38, "100"),
                    (44, "50.25"),
                ],
            ))
            .unwrap();

        let replies = drain(&mut rx);
        assert_eq!(replies.len(), 1);
        let report = &replies[0];
        assert_eq!(report.get(35), Some("8"));
        assert_eq!(report.get(14), Some("100"));
        assert_eq!(report.get(151), Some("0"));
        assert_eq!(report.get(39), Some("2"));
        assert_eq!(report.get(150), Some("2"));
        assert_eq!(report.get(32), Some("100"));
        assert_eq!(report.get(31), Some("50.25"));
        assert_eq!(report.get(11), Some("C1"));
        assert_eq!(report.get(37), Some("EXECC1"));
        assert_eq!(report.get(60).map(str::len), Some(21));
    }

    #[test]
    fn test_heartbeat_and_unknown_produce_no_reply() {
        let (session, mut rx) = new_session(SessionConfig::default());
        logon(&session, &mut rx);

        let heartbeat = session.on_message(&client_message("0", 2, &[])).unwrap();
        let unknown = session.on_message(&client_message("XZ", 3, &[])).unwrap();

        assert_eq!(heartbeat.reply, None);
        assert_eq!(unknown.msg_type, MsgType::Custom("XZ".to_string()));
        assert_eq!(unknown.reply, None);
        assert!(drain(&mut rx).is_empty());
        assert_eq!(session.next_incoming_seq().value(), 4);
    }

    #[test]
    fn test_logout_acknowledged() {
        let (session, mut rx) = new_session(SessionConfig::default());
        logon(&session, &mut rx);

        session
            .on_message(&client_message("5", 2, &[(58, "done for the day")]))
            .unwrap();

        assert_eq!(session.status(), SessionStatus::LoggedOut);
        let replies = drain(&mut rx);
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].get(35), Some("5"));
        assert_eq!(replies[0].get(58), Some("Goodbye"));
    }

    #[test]
    fn test_sequence_mismatch_lenient() {
        let (session, mut rx) = new_session(SessionConfig::default());
        logon(&session, &mut rx);

        let processed = session
            .on_message(&client_message("1", 7, &[(112, "gap")]))
            .unwrap();

        assert_eq!(processed.seq_num, 7);
        assert_eq!(processed.reply, Some(MsgType::Heartbeat));
        assert_eq!(session.next_incoming_seq().value(), 3);
    }

    #[test]
    fn test_sequence_mismatch_strict() {
        let config = SessionConfig::default().with_validation(ValidationPolicy::Strict);
        let (session, mut rx) = new_session(config);
        logon(&session, &mut rx);

        let result = session.on_message(&client_message("1", 7, &[(112, "gap")]));

        assert_eq!(
            result,
            Err(SessionError::SequenceMismatch {
                expected: 2,
                received: 7
            })
        );
        assert_eq!(session.next_incoming_seq().value(), 3);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_poss_dup_too_low_lenient() {
        let (session, mut rx) = new_session(SessionConfig::default());
        logon(&session, &mut rx);
        session
            .on_message(&client_message("1", 2, &[(112, "first")]))
            .unwrap();
        drain(&mut rx);

        let processed = session
            .on_message(&client_message("1", 2, &[(43, "Y"), (112, "resent")]))
            .unwrap();

        assert_eq!(processed.seq_num, 2);
        assert_eq!(processed.reply, Some(MsgType::Heartbeat));
        assert_eq!(session.next_incoming_seq().value(), 4);
        let replies = drain(&mut rx);
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].get(112), Some("resent"));
    }

    #[test]
    fn test_poss_dup_too_low_strict() {
        let config = SessionConfig::default().with_validation(ValidationPolicy::Strict);
        let (session, mut rx) = new_session(config);
        logon(&session, &mut rx);
        session
            .on_message(&client_message("1", 2, &[(112, "first")]))
            .unwrap();
        drain(&mut rx);

        let result = session.on_message(&client_message("1", 2, &[(43, "Y"), (112, "resent")]));

        assert_eq!(
            result,
            Err(SessionError::SequenceMismatch {
                expected: 3,
                received: 2
            })
        );
        assert_eq!(session.next_incoming_seq().value(), 4);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_checksum_mismatch_lenient() {
        let (session, mut rx) = new_session(SessionConfig::default());
        let mut raw = client_message("A", 1, &[(108, "30")]);
        let len = raw.len();
        raw[len - 2] = if raw[len - 2] == b'9' { b'0' } else { b'9' };

        session.on_message(&raw).unwrap();

        assert!(session.is_logged_in());
        assert_eq!(drain(&mut rx).len(), 1);
    }

    #[test]
    fn test_checksum_mismatch_strict() {
        let config = SessionConfig::default().with_validation(ValidationPolicy::Strict);
        let (session, mut rx) = new_session(config);
        let mut raw = client_message("A", 1, &[(108, "30")]);
        let len = raw.len();
        raw[len - 2] = if raw[len - 2] == b'9' { b'0' } else { b'9' };

        let result = session.on_message(&raw);

        assert!(matches!(result, Err(SessionError::ChecksumMismatch { .. })));
        assert!(!session.is_logged_in());
        assert_eq!(session.next_incoming_seq().value(), 1);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_malformed_message() {
        let (session, mut rx) = new_session(SessionConfig::default());

        let result = session.on_message(b"garbage\x01more garbage\x01");

        assert_eq!(
            result,
            Err(SessionError::Malformed(
                fixgate_core::error::DecodeError::NoFields
            ))
        );
        assert_eq!(session.next_incoming_seq().value(), 1);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_outbound_sequence_across_replies() {
        let (session, mut rx) = new_session(SessionConfig::default());
        logon(&session, &mut rx);
        for seq in 2..=5 {
            session
                .on_message(&client_message("1", seq, &[(112, "x")]))
                .unwrap();
        }
        session.send(&MsgType::Heartbeat, &[]).unwrap();

        let seqs: Vec<u64> = drain(&mut rx)
            .iter()
            .map(|m| m.get_as(34).unwrap())
            .collect();
        assert_eq!(seqs, vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_send_after_writer_gone() {
        let (session, rx) = new_session(SessionConfig::default());
        drop(rx);

        let result = session.on_message(&client_message("A", 1, &[(108, "30")]));

        assert_eq!(result, Err(SessionError::Closed));
        assert!(session.is_logged_in());
        assert_eq!(session.next_outgoing_seq().value(), 2);
    }

    #[test]
    fn test_heartbeat_not_sent_before_logon() {
        let (session, mut rx) = new_session(SessionConfig::default());
        assert!(!session.send_heartbeat_if_due().unwrap());
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_heartbeat_with_zero_interval_is_always_due() {
        let (session, mut rx) = new_session(SessionConfig::default());
        session
            .on_message(&client_message("A", 1, &[(108, "0")]))
            .unwrap();
        drain(&mut rx);

        assert!(session.send_heartbeat_if_due().unwrap());
        let replies = drain(&mut rx);
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].get(35), Some("0"));
        assert!(!replies[0].contains(112));
    }

    #[test]
    fn test_close() {
        let (session, _rx) = new_session(SessionConfig::default());
        session.close();
        assert_eq!(session.status(), SessionStatus::Closed);
    }
}
