/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! FIX message encoder.
//!
//! Fields are appended to the body in call order; `finish` prepends
//! BeginString and BodyLength and appends the CheckSum trailer.

use crate::SOH;
use crate::checksum::{calculate_checksum, format_checksum};
use bytes::{BufMut, Bytes, BytesMut};

/// FIX message encoder.
///
/// The body is everything BodyLength counts: the bytes after the
/// `9=N<SOH>` field up to, not including, `10=`.
#[derive(Debug)]
pub struct Encoder<'a> {
    /// Buffer for the message body.
    body: BytesMut,
    /// The BeginString value (e.g., "FIX.4.4").
    begin_string: &'a str,
}

impl<'a> Encoder<'a> {
    /// Creates a new encoder with the specified BeginString.
    ///
    /// # Arguments
    /// * `begin_string` - The FIX version string (e.g., "FIX.4.4")
    #[must_use]
    pub fn new(begin_string: &'a str) -> Self {
        Self {
            body: BytesMut::with_capacity(256),
            begin_string,
        }
    }

    /// Appends a field with a string value.
    #[inline]
    pub fn put_str(&mut self, tag: u32, value: &str) {
        self.put_raw(tag, value.as_bytes());
    }

    /// Appends a field with an unsigned integer value.
    #[inline]
    pub fn put_uint(&mut self, tag: u32, value: u64) {
        let mut buf = itoa::Buffer::new();
        let s = buf.format(value);
        self.put_raw(tag, s.as_bytes());
    }

    /// Appends every `(tag, value)` pair in slice order.
    pub fn put_fields(&mut self, fields: &[(u32, String)]) {
        for (tag, value) in fields {
            self.put_str(*tag, value);
        }
    }

    /// Appends a field with raw bytes.
    #[inline]
    pub fn put_raw(&mut self, tag: u32, value: &[u8]) {
        let mut tag_buf = itoa::Buffer::new();
        let tag_str = tag_buf.format(tag);

        self.body.put_slice(tag_str.as_bytes());
        self.body.put_u8(b'=');
        self.body.put_slice(value);
        self.body.put_u8(SOH);
    }

    /// Finalizes the message and returns the complete encoded bytes.
    ///
    /// The result is `8=<BeginString>|9=<BodyLength>|<body>10=<CheckSum>|`
    /// with the checksum computed over everything before `10=`.
    #[must_use]
    pub fn finish(self) -> Bytes {
        let body_len = self.body.len();
        let mut len_buf = itoa::Buffer::new();
        let len_str = len_buf.format(body_len);

        let mut message =
            BytesMut::with_capacity(self.begin_string.len() + len_str.len() + body_len + 16);
        message.put_slice(b"8=");
        message.put_slice(self.begin_string.as_bytes());
        message.put_u8(SOH);
        message.put_slice(b"9=");
        message.put_slice(len_str.as_bytes());
        message.put_u8(SOH);
        message.put_slice(&self.body);

        let checksum_bytes = format_checksum(calculate_checksum(&message));
        message.put_slice(b"10=");
        message.put_slice(&checksum_bytes);
        message.put_u8(SOH);

        message.freeze()
    }

    /// Returns the current body length.
    #[inline]
    #[must_use]
    pub fn body_len(&self) -> usize {
        self.body.len()
    }
}

impl Default for Encoder<'static> {
    fn default() -> Self {
        Self::new("FIX.4.4")
    }
}
