//! `kv_store` table layout for `SqliteBlobStore`.
//!
//! # Invariants
//! - The applied revision is `PRAGMA user_version`; 0 means a fresh file.
//! - Pending revisions apply in one transaction, so a file is either at its
//!   old revision or at `SQLITE_SCHEMA_VERSION`.

use super::{BlobError, BlobResult};
use log::debug;
use rusqlite::Connection;

/// Newest `kv_store` revision this build reads and writes.
pub const SQLITE_SCHEMA_VERSION: u32 = 1;

struct Revision {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const REVISIONS: &[Revision] = &[Revision {
    version: 1,
    name: "kv_store",
    sql: include_str!("kv_store.sql"),
}];

pub(super) fn stored_version(conn: &Connection) -> BlobResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Brings `conn` up to `SQLITE_SCHEMA_VERSION`, returning how many
/// revisions were applied.
pub(super) fn upgrade(conn: &mut Connection) -> BlobResult<usize> {
    let found = stored_version(conn)?;
    if found > SQLITE_SCHEMA_VERSION {
        return Err(BlobError::UnsupportedSchemaVersion {
            found,
            supported: SQLITE_SCHEMA_VERSION,
        });
    }

    let pending: Vec<&Revision> = REVISIONS.iter().filter(|r| r.version > found).collect();
    if pending.is_empty() {
        return Ok(0);
    }

    let tx = conn.transaction()?;
    for revision in &pending {
        tx.execute_batch(revision.sql)?;
        tx.pragma_update(None, "user_version", revision.version)?;
        debug!(
            "event=blob_schema module=storage status=applied version={} name={}",
            revision.version, revision.name
        );
    }
    tx.commit()?;
    Ok(pending.len())
}

#[cfg(test)]
mod tests {
    use super::{stored_version, upgrade, REVISIONS, SQLITE_SCHEMA_VERSION};
    use rusqlite::Connection;

    #[test]
    fn revisions_are_increasing_and_end_at_current_version() {
        assert!(REVISIONS.windows(2).all(|w| w[0].version < w[1].version));
        assert_eq!(
            REVISIONS.last().map(|r| r.version),
            Some(SQLITE_SCHEMA_VERSION)
        );
    }

    #[test]
    fn upgrade_applies_once() {
        let mut conn = Connection::open_in_memory().unwrap();
        assert_eq!(stored_version(&conn).unwrap(), 0);
        assert_eq!(upgrade(&mut conn).unwrap(), REVISIONS.len());
        assert_eq!(upgrade(&mut conn).unwrap(), 0);
        assert_eq!(stored_version(&conn).unwrap(), SQLITE_SCHEMA_VERSION);
    }
}
