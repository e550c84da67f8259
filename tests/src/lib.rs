//! # Opsboard Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/      # Cross-crate choreography over the queue bus
//!     └── e2e_sheet_sync.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p opsboard-tests
//!
//! # By category
//! cargo test -p opsboard-tests integration::
//! ```

#![allow(dead_code)]

pub mod integration;
