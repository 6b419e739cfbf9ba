/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Tokio codec for FIX message framing.
//!
//! A frame runs from `8=` through the SOH closing the CheckSum field. The
//! codec trusts BodyLength when it lands on `10=`, and otherwise falls back
//! to the first `<SOH>10=` marker after the BeginString field. Every call to
//! `decode` yields the oldest complete frame, so a chunk carrying several
//! messages is drained in arrival order by repeated calls.

use bytes::{BufMut, Bytes, BytesMut};
use fixgate_core::error::{DecodeError, FixError};
use fixgate_tagvalue::SOH;
use fixgate_tagvalue::checksum::CHECKSUM_MARKER;
use memchr::{memchr, memmem};
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

/// Errors that can occur during codec operations.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Framing error.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<CodecError> for FixError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Decode(err) => FixError::Decode(err),
            CodecError::Io(err) => FixError::Io(err),
        }
    }
}

const BEGIN_STRING_PREFIX: &[u8] = b"8=";
const BODY_LENGTH_PREFIX: &[u8] = b"9=";
const CHECKSUM_PREFIX: &[u8] = b"10=";
const NEXT_BEGIN_STRING: &[u8] = b"\x018=";

/// Default upper bound on a single frame.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Tokio codec for FIX message framing.
#[derive(Debug, Clone)]
pub struct FixFrameCodec {
    /// Maximum message size in bytes.
    max_message_size: usize,
}

impl FixFrameCodec {
    /// Creates a new codec with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }

    /// Sets the maximum message size.
    #[must_use]
    pub const fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    /// Returns the maximum message size.
    #[must_use]
    pub const fn max_message_size(&self) -> usize {
        self.max_message_size
    }

    /// Drops any bytes in front of the next BeginString field.
    ///
    /// # Returns
    /// `true` when the buffer now starts with `8=`.
    fn align(src: &mut BytesMut) -> bool {
        if src.starts_with(BEGIN_STRING_PREFIX) {
            return true;
        }

        match memmem::find(src, NEXT_BEGIN_STRING) {
            Some(pos) => {
                warn!(discarded = pos + 1, "discarding bytes before BeginString");
                let _ = src.split_to(pos + 1);
                true
            }
            None => {
                // The last byte may be the start of the next "8=" or its SOH.
                if src.len() > 1 {
                    let discarded = src.len() - 1;
                    warn!(discarded, "discarding bytes before BeginString");
                    let _ = src.split_to(discarded);
                }
                false
            }
        }
    }

    /// Returns where the body starts and the length BodyLength declares.
    fn declared_body(src: &[u8], begin_soh: usize) -> Option<(usize, usize)> {
        let len_start = begin_soh + 1;
        let rest = src.get(len_start..)?;
        if !rest.starts_with(BODY_LENGTH_PREFIX) {
            return None;
        }
        let len_soh = memchr(SOH, rest)?;
        let digits = std::str::from_utf8(&rest[BODY_LENGTH_PREFIX.len()..len_soh]).ok()?;
        let body_len: usize = digits.parse().ok()?;
        Some((len_start + len_soh + 1, body_len))
    }

    /// Returns the exclusive end offset of the first complete frame.
    ///
    /// `src` must start with `8=`.
    fn frame_end(src: &[u8]) -> Option<usize> {
        let begin_soh = memchr(SOH, src)?;
        let declared = Self::declared_body(src, begin_soh)
            .and_then(|(body_start, body_len)| body_start.checked_add(body_len));

        // The body starts after two fields, so `trailer - 1` cannot underflow.
        if let Some(trailer) = declared
            && src.get(trailer - 1) == Some(&SOH)
            && src
                .get(trailer..)
                .is_some_and(|rest| rest.starts_with(CHECKSUM_PREFIX))
        {
            let value_start = trailer + CHECKSUM_PREFIX.len();
            return memchr(SOH, &src[value_start..]).map(|pos| value_start + pos + 1);
        }

        let marker = begin_soh + memmem::find(&src[begin_soh..], CHECKSUM_MARKER)?;
        let value_start = marker + CHECKSUM_MARKER.len();
        let end = value_start + memchr(SOH, &src[value_start..])? + 1;

        if let Some(trailer) = declared
            && trailer != marker + 1
        {
            warn!(
                declared_trailer = trailer,
                actual_trailer = marker + 1,
                "BodyLength does not match CheckSum position"
            );
        }
        Some(end)
    }
}

impl Default for FixFrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FixFrameCodec {
    type Item = BytesMut;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < BEGIN_STRING_PREFIX.len() || !Self::align(src) {
            return Ok(None);
        }

        if let Some(begin_soh) = memchr(SOH, src)
            && let Some((_, body_len)) = Self::declared_body(src, begin_soh)
            && body_len > self.max_message_size
        {
            return Err(DecodeError::InvalidBodyLength {
                declared: body_len,
                max_size: self.max_message_size,
            }
            .into());
        }

        match Self::frame_end(src) {
            Some(end) if end > self.max_message_size => Err(DecodeError::MessageTooLarge {
                size: end,
                max_size: self.max_message_size,
            }
            .into()),
            Some(end) => Ok(Some(src.split_to(end))),
            None if src.len() > self.max_message_size => Err(DecodeError::MessageTooLarge {
                size: src.len(),
                max_size: self.max_message_size,
            }
            .into()),
            None => Ok(None),
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None => {
                if !src.is_empty() {
                    warn!(discarded = src.len(), "discarding partial message at end of stream");
                    src.clear();
                }
                Ok(None)
            }
        }
    }
}

impl Encoder<Bytes> for FixFrameCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(item.len());
        dst.put_slice(&item);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixgate_tagvalue::Encoder as MessageEncoder;

    fn make_fix_message(fields: &[(u32, &str)]) -> Vec<u8> {
        let mut encoder = MessageEncoder::new("FIX.4.4");
        for (tag, value) in fields {
            encoder.put_str(*tag, value);
        }
        encoder.finish().to_vec()
    }

    #[test]
    fn test_codec_decode_complete_message() {
        let mut codec = FixFrameCodec::new();
        let msg = make_fix_message(&[(35, "0")]);
        let mut buf = BytesMut::from(&msg[..]);

        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&frame[..], &msg[..]);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_codec_decode_incomplete() {
        let mut codec = FixFrameCodec::new();
        let msg = make_fix_message(&[(35, "0")]);
        let mut buf = BytesMut::from(&msg[..msg.len() - 1]);

        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert_eq!(buf.len(), msg.len() - 1);
    }

    #[test]
    fn test_codec_decode_byte_by_byte() {
        let mut codec = FixFrameCodec::new();
        let msg = make_fix_message(&[(35, "1"), (112, "T-42")]);
        let mut buf = BytesMut::new();
        let mut frames = Vec::new();

        for &b in &msg {
            buf.put_u8(b);
            if let Some(frame) = codec.decode(&mut buf).unwrap() {
                frames.push(frame);
            }
        }

        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0][..], &msg[..]);
    }

    #[test]
    fn test_codec_decode_burst_in_arrival_order() {
        let mut codec = FixFrameCodec::new();
        let first = make_fix_message(&[(35, "A"), (34, "1")]);
        let second = make_fix_message(&[(35, "1"), (34, "2"), (112, "X")]);
        let third = make_fix_message(&[(35, "0"), (34, "3")]);

        let mut buf = BytesMut::new();
        buf.put_slice(&first);
        buf.put_slice(&second);
        buf.put_slice(&third[..10]);

        assert_eq!(&codec.decode(&mut buf).unwrap().unwrap()[..], &first[..]);
        assert_eq!(&codec.decode(&mut buf).unwrap().unwrap()[..], &second[..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.put_slice(&third[10..]);
        assert_eq!(&codec.decode(&mut buf).unwrap().unwrap()[..], &third[..]);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_codec_falls_back_to_marker_on_wrong_body_length() {
        let mut codec = FixFrameCodec::new();
        let raw = b"8=FIX.4.4\x019=3\x0135=0\x0134=1\x0110=000\x01".to_vec();
        let next = make_fix_message(&[(35, "0")]);
        let mut buf = BytesMut::from(&raw[..]);
        buf.put_slice(&next);

        assert_eq!(&codec.decode(&mut buf).unwrap().unwrap()[..], &raw[..]);
        assert_eq!(&codec.decode(&mut buf).unwrap().unwrap()[..], &next[..]);
    }

    #[test]
    fn test_codec_without_body_length() {
        let mut codec = FixFrameCodec::new();
        let raw = b"8=FIX.4.4\x0135=0\x0110=000\x01";
        let mut buf = BytesMut::from(&raw[..]);

        assert_eq!(&codec.decode(&mut buf).unwrap().unwrap()[..], &raw[..]);
    }

    #[test]
    fn test_codec_discards_leading_garbage() {
        let mut codec = FixFrameCodec::new();
        let msg = make_fix_message(&[(35, "0")]);
        let mut buf = BytesMut::from(&b"noise\x01"[..]);
        buf.put_slice(&msg);

        assert_eq!(&codec.decode(&mut buf).unwrap().unwrap()[..], &msg[..]);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_codec_message_too_large() {
        let mut codec = FixFrameCodec::new().with_max_message_size(32);
        let mut buf = BytesMut::from(&b"8=FIX.4.4\x019=20\x0135=D\x0158="[..]);
        buf.put_slice(&[b'x'; 64]);

        let result = codec.decode(&mut buf);
        assert!(matches!(
            result,
            Err(CodecError::Decode(DecodeError::MessageTooLarge { .. }))
        ));
    }

    #[test]
    fn test_codec_huge_body_length() {
        let mut codec = FixFrameCodec::new();
        let mut buf =
            BytesMut::from(&b"8=FIX.4.4\x019=18446744073709551615\x0135=0\x0110=000\x01"[..]);

        let result = codec.decode(&mut buf);
        assert!(matches!(
            result,
            Err(CodecError::Decode(DecodeError::InvalidBodyLength { .. }))
        ));
    }

    #[test]
    fn test_codec_body_length_wrapping_offset() {
        let mut codec = FixFrameCodec::new();
        let body_len = usize::MAX - 14;
        let raw = format!("8=FIX.4.4\x019={body_len}\x0135=0\x0110=000\x01");
        let mut buf = BytesMut::from(raw.as_bytes());

        let result = codec.decode(&mut buf);
        assert!(matches!(
            result,
            Err(CodecError::Decode(DecodeError::InvalidBodyLength { .. }))
        ));
    }

    #[test]
    fn test_frame_end_overflowing_body_length_falls_back() {
        let raw = b"8=FIX.4.4\x019=18446744073709551615\x0135=0\x0110=000\x01";
        assert_eq!(FixFrameCodec::frame_end(raw), Some(raw.len()));

        let wrapping = format!("8=FIX.4.4\x019={}\x0135=0\x0110=000\x01", usize::MAX - 14);
        assert_eq!(
            FixFrameCodec::frame_end(wrapping.as_bytes()),
            Some(wrapping.len())
        );
    }

    #[test]
    fn test_codec_decode_eof_discards_partial() {
        let mut codec = FixFrameCodec::new();
        let mut buf = BytesMut::from(&b"8=FIX.4.4\x019=5\x0135="[..]);

        assert!(codec.decode_eof(&mut buf).unwrap().is_none());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_codec_encode() {
        let mut codec = FixFrameCodec::new();
        let msg = Bytes::from(make_fix_message(&[(35, "0")]));
        let mut dst = BytesMut::new();

        codec.encode(msg.clone(), &mut dst).unwrap();
        assert_eq!(&dst[..], &msg[..]);
    }
}
