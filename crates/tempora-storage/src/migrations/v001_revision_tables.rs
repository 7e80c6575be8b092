//! v001: batch records, node revisions, reverse references.

use rusqlite::Connection;

use tempora_core::errors::TemporaResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> TemporaResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE TABLE IF NOT EXISTS revision_batches (
            batch_id       INTEGER PRIMARY KEY AUTOINCREMENT,
            action         TEXT NOT NULL,
            recorded_at    INTEGER NOT NULL,
            revision_count INTEGER NOT NULL,
            committed_at   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE TABLE IF NOT EXISTS node_revisions (
            revision_id  INTEGER PRIMARY KEY AUTOINCREMENT,
            guid         TEXT NOT NULL,
            tag          TEXT NOT NULL,
            deleted      INTEGER NOT NULL DEFAULT 0,
            recorded_at  INTEGER NOT NULL,
            state        BLOB NOT NULL,
            content_hash TEXT NOT NULL,
            batch_id     INTEGER NOT NULL,
            FOREIGN KEY (batch_id) REFERENCES revision_batches(batch_id)
        );

        CREATE INDEX IF NOT EXISTS idx_revisions_guid_time
            ON node_revisions(guid, recorded_at);
        CREATE INDEX IF NOT EXISTS idx_revisions_tombstones
            ON node_revisions(guid, recorded_at) WHERE deleted = 1;
        CREATE INDEX IF NOT EXISTS idx_revisions_batch
            ON node_revisions(batch_id);

        CREATE TABLE IF NOT EXISTS revision_references (
            revision_id INTEGER NOT NULL,
            guid        TEXT NOT NULL,
            target      TEXT NOT NULL,
            kind        TEXT NOT NULL CHECK (kind IN ('edge', 'collection')),
            name        TEXT NOT NULL,
            FOREIGN KEY (revision_id) REFERENCES node_revisions(revision_id)
        );

        CREATE INDEX IF NOT EXISTS idx_references_target
            ON revision_references(target);

        CREATE TRIGGER IF NOT EXISTS node_revisions_no_update
            BEFORE UPDATE ON node_revisions
            BEGIN SELECT RAISE(ABORT, 'node_revisions is append-only'); END;
        CREATE TRIGGER IF NOT EXISTS node_revisions_no_delete
            BEFORE DELETE ON node_revisions
            BEGIN SELECT RAISE(ABORT, 'node_revisions is append-only'); END;
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
