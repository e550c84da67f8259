//! Sheet URL handling.

use crate::domain::error::BridgeError;

/// Extract the sheet id from a spreadsheet URL.
///
/// The id is the path segment following `/d/`, e.g.
/// `https://docs.google.com/spreadsheets/d/SHEET_ID/edit` yields `SHEET_ID`.
pub fn extract_sheet_id(url: &str) -> Result<String, BridgeError> {
    let mut parts = url.split('/');
    while let Some(part) = parts.next() {
        if part == "d" {
            if let Some(id) = parts.next().filter(|id| !id.is_empty()) {
                return Ok(id.to_string());
            }
        }
    }
    Err(BridgeError::InvalidSheetUrl(url.to_string()))
}
