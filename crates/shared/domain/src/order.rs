//! Order entity and the per-customer grouping projection.

use serde::{Deserialize, Serialize};

use crate::constants::ORDER_KIND;
use crate::entity::{Entity, EntityId};

/// An order placed by a customer.
///
/// `cust_id` is not checked against any customer collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Order {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub cust_id: i32,
    pub amount: i32,
    /// Free-form status, "A" and "B" in practice
    pub status: String,
}

impl Order {
    pub fn new(cust_id: i32, amount: i32, status: impl Into<String>) -> Self {
        Self {
            id: None,
            cust_id,
            amount,
            status: status.into(),
        }
    }
}

impl Entity for Order {
    const KIND: &'static str = ORDER_KIND;

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }
}

/// Sum of order amounts for one customer. Produced by aggregation only, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderGrouping {
    /// Customer id the group was keyed on
    #[serde(rename = "_id")]
    pub id: i32,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;

    #[test]
    fn test_order_document_layout() {
        let doc = bson::to_document(&Order::new(7, 120, ORDER_STATUS_B)).unwrap();

        assert_eq!(doc.get_i32(ORDER_FIELD_CUSTOMER_ID).unwrap(), 7);
        assert_eq!(doc.get_i32(ORDER_FIELD_AMOUNT).unwrap(), 120);
        assert_eq!(doc.get_str(ORDER_FIELD_STATUS).unwrap(), "B");
        assert!(!doc.contains_key(FIELD_ID));
    }

    #[test]
    fn test_grouping_accepts_int32_total() {
        let doc = bson::doc! { "_id": 1, "Total": 80 };
        let grouping: OrderGrouping = bson::from_document(doc).unwrap();
        assert_eq!(grouping, OrderGrouping { id: 1, total: 80 });
    }

    #[test]
    fn test_grouping_accepts_int64_total() {
        let doc = bson::doc! { "_id": 2, "Total": 5_000_000_000_i64 };
        let grouping: OrderGrouping = bson::from_document(doc).unwrap();
        assert_eq!(grouping.total, 5_000_000_000);
    }
}
