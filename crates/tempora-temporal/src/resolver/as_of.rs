//! Now / At: latest revision at or before the instant, with total tombstone
//! exclusion.

use tempora_core::errors::TemporaResult;
use tempora_core::models::Resolution;
use tempora_core::traits::IRevisionStore;
use tempora_core::{Guid, Timestamp};

/// A GUID with any tombstone at or before `at` is absent, even if a later
/// non-deleted revision also qualifies.
pub async fn resolve_at<S: IRevisionStore>(
    store: &S,
    guids: &[Guid],
    at: Timestamp,
) -> TemporaResult<Resolution> {
    let mut revisions = store.search_at_or_before(guids, at).await?;
    if revisions.is_empty() {
        return Ok(Resolution::empty(at));
    }

    let found: Vec<Guid> = revisions.keys().copied().collect();
    let deleted = store.deleted_at_or_before(&found, at).await?;
    revisions.retain(|guid, _| !deleted.contains(guid));

    Ok(Resolution {
        timestamp: at,
        revisions,
    })
}
