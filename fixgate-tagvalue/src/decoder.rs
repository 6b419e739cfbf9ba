/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! FIX field parser.
//!
//! Splits one framed message on SOH into `tag=value` segments. Malformed
//! segments are dropped and counted rather than failing the message; only a
//! message with no usable segment at all is reported as an error.

use crate::SOH;
use fixgate_core::error::DecodeError;
use fixgate_core::field::FieldMap;
use memchr::memchr;

/// Equals sign delimiter between tag and value.
pub const EQUALS: u8 = b'=';

/// Outcome of parsing one framed message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFields {
    /// Fields that parsed, later occurrences of a tag overwriting earlier ones.
    pub fields: FieldMap,
    /// Number of non-empty segments discarded as malformed.
    pub dropped: usize,
}

/// Parses a framed message into its fields.
///
/// # Arguments
/// * `raw` - One complete message, normally ending in SOH
///
/// # Errors
/// Returns `DecodeError::NoFields` if no segment yields a field.
pub fn parse_fields(raw: &[u8]) -> Result<ParsedFields, DecodeError> {
    let mut parsed = ParsedFields::default();

    for segment in Segments::new(raw) {
        if segment.is_empty() {
            continue;
        }
        match split_field(segment) {
            Some((tag, value)) => {
                parsed
                    .fields
                    .insert(tag, String::from_utf8_lossy(value).into_owned());
            }
            None => parsed.dropped += 1,
        }
    }

    if parsed.fields.is_empty() {
        return Err(DecodeError::NoFields);
    }
    Ok(parsed)
}

/// Iterator over SOH-separated segments of a buffer.
///
/// A trailing segment without a closing SOH is still yielded.
struct Segments<'a> {
    input: &'a [u8],
    offset: usize,
}

impl<'a> Segments<'a> {
    const fn new(input: &'a [u8]) -> Self {
        Self { input, offset: 0 }
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.input.len() {
            return None;
        }

        let remaining = &self.input[self.offset..];
        match memchr(SOH, remaining) {
            Some(pos) => {
                self.offset += pos + 1;
                Some(&remaining[..pos])
            }
            None => {
                self.offset = self.input.len();
                Some(remaining)
            }
        }
    }
}

/// Splits a segment at its first `=` into a tag and a value.
#[inline]
fn split_field(segment: &[u8]) -> Option<(u32, &[u8])> {
    let eq_pos = memchr(EQUALS, segment)?;
    let tag = parse_tag(&segment[..eq_pos])?;
    Some((tag, &segment[eq_pos + 1..]))
}

/// Parses a tag number from ASCII bytes.
///
/// # Returns
/// The parsed tag number, or `None` if the bytes are not a non-negative integer.
#[inline]
fn parse_tag(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() || bytes.len() > 10 {
        return None;
    }

    let mut result: u32 = 0;
    for &b in bytes {
        if !b.is_ascii_digit() {
            return None;
        }
        result = result.checked_mul(10)?.checked_add((b - b'0') as u32)?;
    }

    Some(result)
}
