/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! FIX checksum calculation.
//!
//! The FIX checksum is the sum of all bytes from BeginString through the
//! delimiter preceding the CheckSum field, modulo 256, formatted as a
//! 3-digit zero-padded string.

use memchr::memmem;

/// Marks the start of the CheckSum field inside a message.
pub const CHECKSUM_MARKER: &[u8] = b"\x0110=";

/// Calculates the FIX checksum for the given data.
///
/// # Arguments
/// * `data` - The message bytes to checksum (excluding the 10=XXX| field)
///
/// # Example
/// ```
/// use fixgate_tagvalue::calculate_checksum;
///
/// assert_eq!(calculate_checksum(b"8=FIX.4.4\x019=5\x01"), 205);
/// ```
#[inline]
#[must_use]
pub fn calculate_checksum(data: &[u8]) -> u8 {
    let sum: u32 = data.iter().map(|&b| b as u32).sum();
    (sum % 256) as u8
}

/// Formats a checksum value as a 3-digit zero-padded string.
///
/// # Returns
/// A 3-byte representation (e.g., "042", "255").
#[inline]
#[must_use]
pub fn format_checksum(checksum: u8) -> [u8; 3] {
    let d0 = b'0' + (checksum / 100);
    let d1 = b'0' + ((checksum / 10) % 10);
    let d2 = b'0' + (checksum % 10);
    [d0, d1, d2]
}

/// Calculates the checksum of `data` and returns it as a 3-digit string.
#[must_use]
pub fn checksum_string(data: &[u8]) -> String {
    format_checksum(calculate_checksum(data))
        .iter()
        .map(|&b| b as char)
        .collect()
}

/// Returns the bytes a checksum covers: everything up to and including the
/// delimiter in front of the last CheckSum field.
///
/// # Returns
/// `None` if the message carries no CheckSum field.
#[must_use]
pub fn checksum_region(raw: &[u8]) -> Option<&[u8]> {
    memmem::rfind(raw, CHECKSUM_MARKER).map(|pos| &raw[..=pos])
}
