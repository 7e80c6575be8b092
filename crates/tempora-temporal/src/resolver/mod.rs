//! Temporal resolver: GUID set + selector → resolved node set.
//!
//! Stateless. Every selector is built from the store's search shapes; absent
//! GUIDs are a valid result, never an error.

pub mod as_of;
pub mod inception;
pub mod step;

use tracing::debug;

use tempora_core::errors::TemporaResult;
use tempora_core::models::{Resolution, TemporalSelector};
use tempora_core::traits::IRevisionStore;
use tempora_core::{Guid, Timestamp};

pub use as_of::resolve_at;
pub use inception::resolve_inception;
pub use step::{resolve_next, resolve_previous};

/// Resolve `guids` at `selector`. `now` stands in for `TemporalSelector::Now`.
pub async fn resolve<S: IRevisionStore>(
    store: &S,
    guids: &[Guid],
    selector: TemporalSelector,
    now: Timestamp,
) -> TemporaResult<Resolution> {
    let resolution = match selector {
        TemporalSelector::Now => resolve_at(store, guids, now).await?,
        TemporalSelector::At(at) => resolve_at(store, guids, at).await?,
        TemporalSelector::Next(after) => resolve_next(store, guids, after).await?,
        TemporalSelector::Previous(before) => resolve_previous(store, guids, before).await?,
        TemporalSelector::Inception => resolve_inception(store, guids).await?,
    };
    debug!(
        ?selector,
        requested = guids.len(),
        resolved = resolution.len(),
        timestamp = %resolution.timestamp,
        "resolved node set"
    );
    Ok(resolution)
}
