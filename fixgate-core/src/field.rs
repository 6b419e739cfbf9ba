/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Field storage for parsed FIX messages.
//!
//! This module provides:
//! - [`FieldMap`]: mapping from tag number to string value
//! - [`tags`]: the tag numbers consumed and produced by the session layer

use smallvec::SmallVec;
use std::collections::HashMap;
use std::str::FromStr;

/// Tag numbers used by the session layer.
pub mod tags {
    /// AvgPx.
    pub const AVG_PX: u32 = 6;
    /// BeginString.
    pub const BEGIN_STRING: u32 = 8;
    /// BodyLength.
    pub const BODY_LENGTH: u32 = 9;
    /// CheckSum.
    pub const CHECKSUM: u32 = 10;
    /// ClOrdID.
    pub const CL_ORD_ID: u32 = 11;
    /// CumQty.
    pub const CUM_QTY: u32 = 14;
    /// ExecID.
    pub const EXEC_ID: u32 = 17;
    /// LastPx.
    pub const LAST_PX: u32 = 31;
    /// LastQty.
    pub const LAST_QTY: u32 = 32;
    /// MsgSeqNum.
    pub const MSG_SEQ_NUM: u32 = 34;
    /// MsgType.
    pub const MSG_TYPE: u32 = 35;
    /// OrderID.
    pub const ORDER_ID: u32 = 37;
    /// OrderQty.
    pub const ORDER_QTY: u32 = 38;
    /// OrdStatus.
    pub const ORD_STATUS: u32 = 39;
    /// PossDupFlag.
    pub const POSS_DUP_FLAG: u32 = 43;
    /// Price.
    pub const PRICE: u32 = 44;
    /// SenderCompID.
    pub const SENDER_COMP_ID: u32 = 49;
    /// SendingTime.
    pub const SENDING_TIME: u32 = 52;
    /// Side.
    pub const SIDE: u32 = 54;
    /// Symbol.
    pub const SYMBOL: u32 = 55;
    /// TargetCompID.
    pub const TARGET_COMP_ID: u32 = 56;
    /// Text.
    pub const TEXT: u32 = 58;
    /// TransactTime.
    pub const TRANSACT_TIME: u32 = 60;
    /// EncryptMethod.
    pub const ENCRYPT_METHOD: u32 = 98;
    /// HeartBtInt.
    pub const HEART_BT_INT: u32 = 108;
    /// TestReqID.
    pub const TEST_REQ_ID: u32 = 112;
    /// ExecType.
    pub const EXEC_TYPE: u32 = 150;
    /// LeavesQty.
    pub const LEAVES_QTY: u32 = 151;
}

/// Mapping from tag number to string value for one inbound message.
///
/// Tags are unique: inserting a tag that is already present replaces its
/// value in place, so the later occurrence in a message wins. Entries keep
/// the position of their first occurrence. Lookups go through a tag index,
/// so building a map is linear in the number of fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    entries: SmallVec<[(u32, String); 32]>,
    /// Position of each tag in `entries`.
    index: HashMap<u32, usize>,
}

impl FieldMap {
    /// Creates an empty field map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, returning the previous value for the tag if any.
    ///
    /// # Arguments
    /// * `tag` - The field tag number
    /// * `value` - The field value
    pub fn insert(&mut self, tag: u32, value: impl Into<String>) -> Option<String> {
        let value = value.into();
        match self.index.get(&tag) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos].1, value)),
            None => {
                self.index.insert(tag, self.entries.len());
                self.entries.push((tag, value));
                None
            }
        }
    }

    /// Gets a field value by tag.
    #[must_use]
    pub fn get(&self, tag: u32) -> Option<&str> {
        self.index
            .get(&tag)
            .map(|&pos| self.entries[pos].1.as_str())
    }

    /// Gets a field value, or the empty string when the tag is absent.
    #[must_use]
    pub fn get_or_empty(&self, tag: u32) -> &str {
        self.get(tag).unwrap_or("")
    }

    /// Gets a field value parsed as the specified type.
    ///
    /// # Returns
    /// `None` if the tag is absent or its value does not parse.
    #[must_use]
    pub fn get_as<T: FromStr>(&self, tag: u32) -> Option<T> {
        self.get(tag).and_then(|v| v.parse().ok())
    }

    /// Returns true if the tag is present.
    #[must_use]
    pub fn contains(&self, tag: u32) -> bool {
        self.index.contains_key(&tag)
    }

    /// Returns the number of distinct tags.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no field is present.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over `(tag, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.entries.iter().map(|(t, v)| (*t, v.as_str()))
    }
}

impl<V: Into<String>> FromIterator<(u32, V)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (u32, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (tag, value) in iter {
            map.insert(tag, value);
        }
        map
    }
}
