/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Synthetic order handling.
//!
//! There is no matching engine behind the session: every NewOrderSingle is
//! answered with an ExecutionReport filling the whole quantity at the
//! requested price.

use chrono::{DateTime, Utc};
use fixgate_core::field::{FieldMap, tags};
use fixgate_core::types::format_utc_timestamp;

/// ExecType (150) value for a fill.
pub const EXEC_TYPE_FILL: &str = "2";

/// OrdStatus (39) value for a filled order.
pub const ORD_STATUS_FILLED: &str = "2";

/// The NewOrderSingle fields the session consumes.
///
/// Values are echoed verbatim; absent tags become empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewOrderSingle {
    /// ClOrdID (11).
    pub cl_ord_id: String,
    /// Symbol (55).
    pub symbol: String,
    /// Side (54).
    pub side: String,
    /// OrderQty (38).
    pub order_qty: String,
    /// Price (44).
    pub price: String,
}

impl NewOrderSingle {
    /// Extracts the order fields from a parsed message.
    #[must_use]
    pub fn from_fields(fields: &FieldMap) -> Self {
        Self {
            cl_ord_id: fields.get_or_empty(tags::CL_ORD_ID).to_string(),
            symbol: fields.get_or_empty(tags::SYMBOL).to_string(),
            side: fields.get_or_empty(tags::SIDE).to_string(),
            order_qty: fields.get_or_empty(tags::ORDER_QTY).to_string(),
            price: fields.get_or_empty(tags::PRICE).to_string(),
        }
    }

    /// OrderID (37) assigned to this order, derived from ClOrdID.
    #[must_use]
    pub fn order_id(&self) -> String {
        format!("EXEC{}", self.cl_ord_id)
    }

    /// ExecID (17) of the fill, derived from ClOrdID.
    #[must_use]
    pub fn exec_id(&self) -> String {
        format!("EXEC{}001", self.cl_ord_id)
    }

    /// Body fields of the ExecutionReport filling this order completely.
    ///
    /// # Arguments
    /// * `transact_time` - Value of TransactTime (60)
    #[must_use]
    pub fn full_fill(&self, transact_time: DateTime<Utc>) -> Vec<(u32, String)> {
        vec![
            (tags::ORDER_ID, self.order_id()),
            (tags::CL_ORD_ID, self.cl_ord_id.clone()),
            (tags::EXEC_ID, self.exec_id()),
            (tags::EXEC_TYPE, EXEC_TYPE_FILL.to_string()),
            (tags::ORD_STATUS, ORD_STATUS_FILLED.to_string()),
            (tags::SYMBOL, self.symbol.clone()),
            (tags::SIDE, self.side.clone()),
            (tags::ORDER_QTY, self.order_qty.clone()),
            (tags::PRICE, self.price.clone()),
            (tags::LAST_QTY, self.order_qty.clone()),
            (tags::LAST_PX, self.price.clone()),
            (tags::LEAVES_QTY, "0".to_string()),
            (tags::CUM_QTY, self.order_qty.clone()),
            (tags::AVG_PX, self.price.clone()),
            (tags::TRANSACT_TIME, format_utc_timestamp(transact_time)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_order() -> NewOrderSingle {
        let fields: FieldMap = [
            (11, "C1"),
            (55, "XYZ"),
            (54, "1"),
            (38, "100"),
            (44, "50.25"),
        ]
        .into_iter()
        .collect();
        NewOrderSingle::from_fields(&fields)
    }

    #[test]
    fn test_from_fields() {
        let order = sample_order();
        assert_eq!(order.cl_ord_id, "C1");
        assert_eq!(order.symbol, "XYZ");
        assert_eq!(order.price, "50.25");
    }

    #[test]
    fn test_from_fields_missing_tags() {
        let order = NewOrderSingle::from_fields(&FieldMap::new());
        assert_eq!(order, NewOrderSingle::default());
        assert_eq!(order.order_id(), "EXEC");
    }

    #[test]
    fn test_derived_ids() {
        let order = sample_order();
        assert_eq!(order.order_id(), "EXECC1");
        assert_eq!(order.exec_id(), "EXECC1001");
    }

    #[test]
    fn test_full_fill() {
        let now = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let fill: FieldMap = sample_order().full_fill(now).into_iter().collect();

        assert_eq!(fill.get(tags::EXEC_TYPE), Some("2"));
        assert_eq!(fill.get(tags::ORD_STATUS), Some("2"));
        assert_eq!(fill.get(tags::CUM_QTY), Some("100"));
        assert_eq!(fill.get(tags::LEAVES_QTY), Some("0"));
        assert_eq!(fill.get(tags::LAST_QTY), Some("100"));
        assert_eq!(fill.get(tags::LAST_PX), Some("50.25"));
        assert_eq!(fill.get(tags::AVG_PX), Some("50.25"));
        assert_eq!(fill.get(tags::TRANSACT_TIME), Some("20240506-07:08:09.000"));
    }
}
