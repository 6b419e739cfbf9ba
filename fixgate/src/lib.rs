/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! # FixGate
//!
//! A minimal FIX 4.4 session engine for Rust.
//!
//! FixGate accepts TCP connections, frames the inbound byte stream into FIX
//! messages, runs the session layer (Logon, Logout, Heartbeat, TestRequest)
//! and answers every NewOrderSingle with a synthetic full fill.
//!
//! ## Features
//!
//! - **Framing**: BodyLength-aware, with a CheckSum marker fallback
//! - **Fast scanning**: Uses `memchr` for delimiter search
//! - **Ordered output**: One lock covers sequence allocation and queueing
//! - **Async**: Built on Tokio, one task set per connection
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fixgate::prelude::*;
//! use tokio_util::sync::CancellationToken;
//!
//! let acceptor = EngineBuilder::new()
//!     .with_bind_addr("127.0.0.1:9876")
//!     .with_validation(ValidationPolicy::Lenient)
//!     .build()
//!     .await?;
//! acceptor.run(CancellationToken::new()).await;
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`]: Fundamental types and error definitions
//! - [`tagvalue`]: Tag=value encoding, parsing and checksums
//! - [`session`]: Session layer protocol implementation
//! - [`transport`]: Stream framing codec
//! - [`engine`]: Connections and the TCP acceptor

pub mod core {
    //! Core types and error definitions.
    pub use fixgate_core::*;
}

pub mod tagvalue {
    //! Tag=value encoding, parsing and checksums.
    pub use fixgate_tagvalue::*;
}

pub mod session {
    //! Session layer protocol implementation.
    pub use fixgate_session::*;
}

pub mod transport {
    //! Stream framing codec.
    pub use fixgate_transport::*;
}

pub mod engine {
    //! Connections and the TCP acceptor.
    pub use fixgate_engine::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    // Core types
    pub use fixgate_core::{
        DecodeError, FieldMap, FixError, MsgType, Result, SeqNum, SessionError, tags,
    };

    // Tag-value encoding
    pub use fixgate_tagvalue::{Encoder, calculate_checksum, parse_fields};

    // Session
    pub use fixgate_session::{
        HeartbeatScheduler, MessageBuilder, Session, SessionConfig, SessionId, SessionStatus,
        ValidationPolicy,
    };

    // Transport
    pub use fixgate_transport::{CodecError, FixFrameCodec};

    // Engine
    pub use fixgate_engine::{Acceptor, Connection, EngineBuilder};
}
