//! Revision state encoding: JSON, zstd-compressed.

use std::str::FromStr;

use tempora_core::errors::{StorageError, TemporaResult};
use tempora_core::models::Revision;
use tempora_core::node::NodeState;
use tempora_core::{Guid, TemporaError, Timestamp};

use crate::queries::revision_ops::RawRevision;
use crate::to_storage_err;

const ZSTD_LEVEL: i32 = 3;

pub fn encode_state(state: &NodeState) -> TemporaResult<Vec<u8>> {
    let json = serde_json::to_vec(state)?;
    zstd::encode_all(json.as_slice(), ZSTD_LEVEL)
        .map_err(|e| to_storage_err(format!("zstd compress: {e}")))
}

pub fn decode_state(revision_id: u64, compressed: &[u8]) -> TemporaResult<NodeState> {
    let json = zstd::decode_all(compressed)
        .map_err(|e| corrupt(revision_id, format!("zstd decompress: {e}")))?;
    serde_json::from_slice(&json).map_err(|e| corrupt(revision_id, format!("deserialize state: {e}")))
}

/// Rebuild a `Revision` from its row.
pub fn decode_revision(raw: RawRevision) -> TemporaResult<Revision> {
    let guid = Guid::from_str(&raw.guid)
        .map_err(|e| corrupt(raw.revision_id, format!("guid {}: {e}", raw.guid)))?;
    let state = decode_state(raw.revision_id, &raw.state)?;
    if state.deleted != raw.deleted {
        return Err(corrupt(
            raw.revision_id,
            "deleted column disagrees with state".to_string(),
        ));
    }
    Ok(Revision {
        guid,
        tag: raw.tag,
        timestamp: Timestamp::from_millis(raw.recorded_at),
        state,
        content_hash: raw.content_hash,
        batch_id: Some(raw.batch_id),
    })
}

fn corrupt(revision_id: u64, details: String) -> TemporaError {
    TemporaError::StorageError(StorageError::CorruptRevision {
        revision_id,
        details,
    })
}
