/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! # FixGate Transport
//!
//! Turns an unbounded inbound byte stream into complete FIX messages.
//!
//! - **Codec**: Tokio codec extracting frames strictly in arrival order

pub mod codec;

pub use codec::{CodecError, FixFrameCodec};
