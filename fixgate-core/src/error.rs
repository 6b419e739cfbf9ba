/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Error types for the FixGate session engine.
//!
//! Most failures in a FIX session are recoverable and only logged. The types
//! here exist so those conditions are still distinguishable and testable,
//! and so the one terminal condition (a transport failure) carries context.

use thiserror::Error;

/// Result type alias using [`FixError`] as the error type.
pub type Result<T> = std::result::Result<T, FixError>;

/// Top-level error type for all FixGate operations.
#[derive(Debug, Error)]
pub enum FixError {
    /// Error while framing or parsing an inbound message.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Error raised by the session layer.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// I/O error from the underlying transport.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that occur while framing or parsing inbound bytes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// BodyLength (tag 9) declares a body larger than any accepted frame.
    #[error("invalid body length {declared}: exceeds maximum {max_size}")]
    InvalidBodyLength {
        /// Body length declared by the peer.
        declared: usize,
        /// Maximum allowed size in bytes.
        max_size: usize,
    },

    /// Not a single `tag=value` segment could be parsed.
    #[error("message contains no parseable fields")]
    NoFields,

    /// Frame exceeds the configured maximum size.
    #[error("message too large: {size} bytes exceeds maximum {max_size}")]
    MessageTooLarge {
        /// Bytes buffered for the frame so far.
        size: usize,
        /// Maximum allowed size in bytes.
        max_size: usize,
    },
}

/// Errors raised while a session processes an inbound message.
///
/// None of these end the connection. In lenient mode only `Malformed` and
/// `Closed` are ever returned; the validation variants appear when the
/// session runs with a strict validation policy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The message could not be parsed into any field.
    #[error("malformed message: {0}")]
    Malformed(#[from] DecodeError),

    /// Declared checksum (tag 10) differs from the computed one.
    #[error("checksum mismatch: calculated {calculated}, declared {declared}")]
    ChecksumMismatch {
        /// Checksum computed over the received bytes.
        calculated: String,
        /// Checksum carried in tag 10, empty when absent.
        declared: String,
    },

    /// MsgSeqNum (tag 34) differs from the next expected inbound number.
    #[error("sequence mismatch: expected {expected}, received {received}")]
    SequenceMismatch {
        /// Next expected inbound sequence number.
        expected: u64,
        /// Sequence number carried by the message (0 when absent).
        received: u64,
    },

    /// The outbound channel of the connection has been closed.
    #[error("session closed")]
    Closed,
}
