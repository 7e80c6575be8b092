//! Next / Previous: step to the nearest event boundary.
//!
//! An event boundary is a timestamp at which at least one requested GUID has
//! a revision. Every revision sharing that timestamp is treated as one
//! logical transaction.

use tracing::debug;

use tempora_core::errors::TemporaResult;
use tempora_core::models::Resolution;
use tempora_core::traits::IRevisionStore;
use tempora_core::{Guid, Timestamp};

use super::as_of::resolve_at;

/// Baseline at `after`, overlaid with every requested GUID's revision at the
/// first boundary strictly after it. A GUID whose boundary revision is a
/// tombstone drops out; earlier tombstones do not matter here. Falls back to
/// the baseline at `after` when nothing later exists.
pub async fn resolve_next<S: IRevisionStore>(
    store: &S,
    guids: &[Guid],
    after: Timestamp,
) -> TemporaResult<Resolution> {
    let mut baseline = resolve_at(store, guids, after).await?;

    let upcoming = store.search_after(guids, after).await?;
    let Some(boundary) = upcoming.values().map(|r| r.timestamp).min() else {
        return Ok(baseline);
    };

    let at_boundary = store.search_at_or_before(guids, boundary).await?;
    let mut stepped = 0usize;
    for revision in at_boundary.into_values() {
        if revision.timestamp != boundary {
            continue;
        }
        stepped += 1;
        if revision.is_deleted() {
            baseline.revisions.remove(&revision.guid);
        } else {
            baseline.revisions.insert(revision.guid, revision);
        }
    }

    debug!(%after, %boundary, stepped, "stepped to next event boundary");
    baseline.timestamp = boundary;
    Ok(baseline)
}

/// The full At view at the last boundary strictly before `before`. Falls back
/// to the view at `before` when nothing earlier exists.
pub async fn resolve_previous<S: IRevisionStore>(
    store: &S,
    guids: &[Guid],
    before: Timestamp,
) -> TemporaResult<Resolution> {
    let earlier = store.search_before(guids, before).await?;
    let Some(boundary) = earlier.values().map(|r| r.timestamp).max() else {
        return resolve_at(store, guids, before).await;
    };

    debug!(%before, %boundary, "stepped to previous event boundary");
    resolve_at(store, guids, boundary).await
}
