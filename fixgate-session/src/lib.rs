/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! # FixGate Session
//!
//! FIX session layer for the FixGate engine.
//!
//! This crate provides:
//! - **Session**: Logon/Logout handling, TestRequest replies and order fills
//! - **Sequence management**: Inbound and outbound sequence numbers
//! - **Message building**: Standard header, BodyLength and CheckSum
//! - **Heartbeats**: Cancellable periodic heartbeat scheduler
//! - **Configuration**: Session configuration options

pub mod builder;
pub mod config;
pub mod heartbeat;
pub mod order;
pub mod sequence;
pub mod session;
pub mod state;

pub use builder::MessageBuilder;
pub use config::{SessionConfig, ValidationPolicy};
pub use heartbeat::HeartbeatScheduler;
pub use order::NewOrderSingle;
pub use sequence::{InboundSequence, SequenceResult};
pub use session::{OutboundSender, Processed, Session};
pub use state::{SessionId, SessionStatus};
