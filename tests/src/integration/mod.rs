//! Cross-crate integration tests.

pub mod e2e_sheet_sync;
