/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! # FixGate Core
//!
//! Core types and error definitions shared by every FixGate crate.
//!
//! - **Error types**: `DecodeError`, `SessionError` and the top-level `FixError`
//! - **Field storage**: `FieldMap` and the tag numbers the session layer consumes
//! - **Message types**: `MsgType`
//! - **Core types**: `SeqNum` and FIX UTC timestamp formatting

pub mod error;
pub mod field;
pub mod message;
pub mod types;

pub use error::{DecodeError, FixError, Result, SessionError};
pub use field::{FieldMap, tags};
pub use message::MsgType;
pub use types::{SeqNum, format_utc_timestamp};
