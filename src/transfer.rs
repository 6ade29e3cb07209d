//! # Ban List Interchange
//!
//! Encoding and decoding of exported ban lists.
//!
//! The wire format is a JSON array of non-negative integers. Order is
//! preserved on both sides; duplicates are tolerated on input but removed
//! (first occurrence wins) before the IDs reach the engine. Payloads that
//! would exceed the transport's attachment bound are reported as a distinct
//! "too large" condition rather than a generic failure.

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::model::EntityId;

/// Default transport attachment bound (8 MiB).
pub const MAX_ATTACHMENT_BYTES: usize = 8 * 1024 * 1024;

/// Encode a ban list for export.
///
/// Fails with [`Error::PayloadTooLarge`] when the encoded form exceeds
/// `max_bytes`.
pub fn encode_ban_list(ids: &[EntityId], max_bytes: usize) -> Result<Vec<u8>> {
    let raw: Vec<u64> = ids.iter().map(|id| id.0).collect();
    let bytes = serde_json::to_vec(&raw)?;

    if bytes.len() > max_bytes {
        return Err(Error::PayloadTooLarge {
            size: bytes.len(),
            max: max_bytes,
        });
    }

    Ok(bytes)
}

/// Decode an exported ban list.
///
/// Rejects anything that is not a JSON array of non-negative integers with
/// [`Error::ImportFormat`]. The result preserves first-occurrence order and
/// contains no duplicates.
pub fn decode_ban_list(bytes: &[u8]) -> Result<Vec<EntityId>> {
    let values: Vec<serde_json::Value> =
        serde_json::from_slice(bytes).map_err(|e| Error::ImportFormat(e.to_string()))?;

    let mut ids = Vec::with_capacity(values.len());
    let mut seen = HashSet::with_capacity(values.len());
    for value in values {
        let id = value.as_u64().ok_or_else(|| {
            Error::ImportFormat(format!("expected a non-negative integer, got {}", value))
        })?;
        if seen.insert(id) {
            ids.push(EntityId(id));
        }
    }

    Ok(ids)
}
