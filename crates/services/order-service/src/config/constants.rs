//! Service-wide constants
//!
//! Centralized location for magic values to improve maintainability.

// =============================================================================
// Database
// =============================================================================

/// Default connection string (for development)
pub const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017";

/// Default logical database name
pub const DEFAULT_DATABASE_NAME: &str = "testdb";

/// Application name reported to the server
pub const DEFAULT_APP_NAME: &str = "order-service";

/// Default server selection timeout in milliseconds
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5000;

// =============================================================================
// Order Aggregation
// =============================================================================

/// Groups skipped before the first returned customer total
pub const CUSTOMER_TOTALS_SKIP: u64 = 0;

/// Maximum number of customer totals returned
pub const CUSTOMER_TOTALS_LIMIT: u64 = 10;

// =============================================================================
// Flagged Orders
// =============================================================================

/// Status "B" orders above this amount are flagged
pub const FLAGGED_MIN_AMOUNT: i32 = 100;

/// Customer whose non-zero status "A" orders are flagged
pub const FLAGGED_CUSTOMER_ID: i32 = 1;

// =============================================================================
// Demo
// =============================================================================

/// Text stored by the demo command
pub const DEMO_MESSAGE: &str = "Hello, World!";
