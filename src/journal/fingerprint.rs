//! PP-012: BLAKE3 fingerprints of generated operation lists.

use crate::core::types::OperationList;

/// Hash a string. Returns `"blake3:{hex}"`.
pub fn hash_string(s: &str) -> String {
    format!("blake3:{}", blake3::hash(s.as_bytes()).to_hex())
}

/// Fingerprint an operation list by hashing its compact JSON form.
/// Identical lists (same ids, inputs, outputs, and order) hash equally.
pub fn fingerprint_operations(operations: &OperationList) -> Result<String, String> {
    let json =
        serde_json::to_string(operations).map_err(|e| format!("JSON serialize error: {}", e))?;
    Ok(hash_string(&json))
}
