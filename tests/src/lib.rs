//! # dVPN Query Test Suite
//!
//! End-to-end tests that drive `VpnQueryService` through the JSON-RPC adapter
//! against a mock ledger node.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs     # Node responses: tx results, state query values
//!     ├── resolution.rs   # Subscription resolution over the wire
//!     └── queries.rs      # Single-step lookups over the wire
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p dvpn-tests
//! cargo test -p dvpn-tests integration::resolution
//! ```

pub mod integration;
