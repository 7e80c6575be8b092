//! Raw SQL operations for the revision_references table.

use rusqlite::{params, Connection};

use tempora_core::errors::TemporaResult;
use tempora_core::node::NodeState;

use super::revision_ops::{row_to_raw_revision, RawRevision};
use crate::to_storage_err;

/// Index every edge and collection reference of one revision.
pub fn insert_references(
    conn: &Connection,
    revision_id: u64,
    guid: &str,
    state: &NodeState,
) -> TemporaResult<usize> {
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO revision_references (revision_id, guid, target, kind, name)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    let edges = state
        .edges
        .iter()
        .filter_map(|(name, target)| target.map(|t| ("edge", name, t)));
    let collections = state
        .edge_collections
        .iter()
        .flat_map(|(name, items)| items.iter().map(move |t| ("collection", name, *t)));

    let mut inserted = 0;
    for (kind, name, target) in edges.chain(collections) {
        stmt.execute(params![
            revision_id as i64,
            guid,
            target.to_string(),
            kind,
            name
        ])
        .map_err(|e| to_storage_err(e.to_string()))?;
        inserted += 1;
    }
    Ok(inserted)
}

/// Latest revision of every node that references `target` in its latest
/// revision, skipping nodes that carry any tombstone.
pub fn latest_referencing(conn: &Connection, target: &str) -> TemporaResult<Vec<RawRevision>> {
    let mut stmt = conn
        .prepare_cached(
            "WITH candidates AS (
                 SELECT DISTINCT guid FROM revision_references WHERE target = ?1
             ),
             latest AS (
                 SELECT r.revision_id,
                        ROW_NUMBER() OVER (
                            PARTITION BY r.guid
                            ORDER BY r.recorded_at DESC, r.revision_id DESC
                        ) AS rn
                 FROM node_revisions r
                 JOIN candidates c ON c.guid = r.guid
             )
             SELECT r.revision_id, r.guid, r.tag, r.deleted, r.recorded_at,
                    r.state, r.content_hash, r.batch_id
             FROM node_revisions r
             JOIN latest l ON l.revision_id = r.revision_id AND l.rn = 1
             WHERE EXISTS (
                       SELECT 1 FROM revision_references x
                       WHERE x.revision_id = r.revision_id AND x.target = ?1
                   )
               AND NOT EXISTS (
                       SELECT 1 FROM node_revisions d
                       WHERE d.guid = r.guid AND d.deleted = 1
                   )
             ORDER BY r.guid",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    let rows = stmt
        .query_map(params![target], row_to_raw_revision)
        .map_err(|e| to_storage_err(e.to_string()))?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

/// `(target, kind, name)` for every reference indexed under a revision.
pub fn references_of(
    conn: &Connection,
    revision_id: u64,
) -> TemporaResult<Vec<(String, String, String)>> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT target, kind, name FROM revision_references
             WHERE revision_id = ?1 ORDER BY rowid",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    let rows = stmt
        .query_map(params![revision_id as i64], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}
