//! Domain-level constants.
//!
//! Field names match the persisted document layout.

// =============================================================================
// Shared Fields
// =============================================================================

/// Identifier field of every stored document
pub const FIELD_ID: &str = "_id";

// =============================================================================
// Message
// =============================================================================

/// Entity kind of the generic example record
pub const MESSAGE_KIND: &str = "MyClass";

/// Text payload field
pub const MESSAGE_FIELD_STRING_DATA: &str = "StringData";

// =============================================================================
// Orders
// =============================================================================

/// Entity kind of orders
pub const ORDER_KIND: &str = "Order";

pub const ORDER_FIELD_CUSTOMER_ID: &str = "CustId";

pub const ORDER_FIELD_AMOUNT: &str = "Amount";

pub const ORDER_FIELD_STATUS: &str = "Status";

/// Aggregated total of an order grouping
pub const GROUPING_FIELD_TOTAL: &str = "Total";

/// Status values seen in practice. Status is free-form; these are not an enumeration.
pub const ORDER_STATUS_A: &str = "A";
pub const ORDER_STATUS_B: &str = "B";
