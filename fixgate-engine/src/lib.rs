/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! # FixGate Engine
//!
//! Runs FIX sessions over TCP for the FixGate protocol implementation.
//!
//! This crate provides:
//! - **Connection**: Read loop, outbound writer and heartbeat task per socket
//! - **Acceptor**: Server-side accept loop, one task per connection
//! - **Builder API**: Fluent configuration for acceptor setup

pub mod acceptor;
pub mod builder;
pub mod connection;

pub use acceptor::Acceptor;
pub use builder::EngineBuilder;
pub use connection::Connection;
