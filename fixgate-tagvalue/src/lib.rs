/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! # FixGate Tag-Value
//!
//! FIX tag=value parsing and serialization for the FixGate engine.
//!
//! - **Checksum**: modulo-256 byte sum, formatted as three digits
//! - **Decoder**: splits a framed message into a [`FieldMap`]
//! - **Encoder**: assembles BeginString, BodyLength, body and CheckSum

pub mod checksum;
pub mod decoder;
pub mod encoder;

pub use checksum::{calculate_checksum, checksum_region, checksum_string};
pub use decoder::{ParsedFields, parse_fields};
pub use encoder::Encoder;
pub use fixgate_core::field::FieldMap;

/// SOH (Start of Header) delimiter used in FIX messages.
pub const SOH: u8 = 0x01;
