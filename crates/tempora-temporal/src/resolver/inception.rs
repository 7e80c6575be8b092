//! Inception: the founding transaction of the requested node set.

use tempora_core::errors::TemporaResult;
use tempora_core::models::Resolution;
use tempora_core::traits::IRevisionStore;
use tempora_core::{Guid, Timestamp};

/// Only GUIDs whose first revision lands on the global minimum are returned;
/// nodes created later are absent. No revisions at all gives an empty result
/// at `Timestamp::MIN`.
pub async fn resolve_inception<S: IRevisionStore>(
    store: &S,
    guids: &[Guid],
) -> TemporaResult<Resolution> {
    let mut earliest = store.search_earliest(guids).await?;
    let Some(founded) = earliest.values().map(|r| r.timestamp).min() else {
        return Ok(Resolution::empty(Timestamp::MIN));
    };

    earliest.retain(|_, r| r.timestamp == founded && !r.is_deleted());
    Ok(Resolution {
        timestamp: founded,
        revisions: earliest,
    })
}
