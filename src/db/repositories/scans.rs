use anyhow::Result;
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::{parse_datetime, parse_kind},
    models::ScanRecord,
};

fn row_to_record(row: &Row) -> Result<ScanRecord> {
    let scanned_at: String = row.get("scanned_at")?;
    let kind: String = row.get("kind")?;

    Ok(ScanRecord {
        id: row.get("id")?,
        content: row.get("content")?,
        kind: parse_kind(&kind)?,
        scanned_at: parse_datetime(&scanned_at, "scanned_at")?,
        favorite: row.get("favorite")?,
    })
}

impl Database {
    pub async fn insert_scan(&self, record: &ScanRecord) -> Result<()> {
        let record = record.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO scan_records (id, content, kind, scanned_at, favorite)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.id,
                    record.content,
                    record.kind.as_str(),
                    record.scanned_at.to_rfc3339(),
                    record.favorite,
                ],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn get_scan(&self, scan_id: &str) -> Result<Option<ScanRecord>> {
        let scan_id = scan_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, content, kind, scanned_at, favorite
                 FROM scan_records
                 WHERE id = ?1",
            )?;

            let record = stmt
                .query_row(params![scan_id], |row| {
                    Ok(row_to_record(row))
                })
                .optional()?
                .transpose()?;
            Ok(record)
        })
        .await
    }

    pub async fn list_scans(&self) -> Result<Vec<ScanRecord>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, content, kind, scanned_at, favorite
                 FROM scan_records
                 ORDER BY scanned_at DESC",
            )?;

            let mut rows = stmt.query([])?;
            let mut records = Vec::new();
            while let Some(row) = rows.next()? {
                records.push(row_to_record(row)?);
            }
            Ok(records)
        })
        .await
    }

    pub async fn list_scans_paginated(&self, limit: u32, offset: u32) -> Result<Vec<ScanRecord>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, content, kind, scanned_at, favorite
                 FROM scan_records
                 ORDER BY scanned_at DESC
                 LIMIT ?1 OFFSET ?2",
            )?;

            let mut rows = stmt.query(params![limit, offset])?;
            let mut records = Vec::new();
            while let Some(row) = rows.next()? {
                records.push(row_to_record(row)?);
            }
            Ok(records)
        })
        .await
    }

    pub async fn search_scans(&self, query: &str) -> Result<Vec<ScanRecord>> {
        let pattern = format!("%{query}%");
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, content, kind, scanned_at, favorite
                 FROM scan_records
                 WHERE content LIKE ?1 OR kind LIKE ?1
                 ORDER BY scanned_at DESC",
            )?;

            let mut rows = stmt.query(params![pattern])?;
            let mut records = Vec::new();
            while let Some(row) = rows.next()? {
                records.push(row_to_record(row)?);
            }
            Ok(records)
        })
        .await
    }

    pub async fn set_favorite(&self, scan_id: &str, favorite: bool) -> Result<()> {
        let scan_id = scan_id.to_string();
        self.execute(move |conn| {
            conn.execute(
                "UPDATE scan_records SET favorite = ?1 WHERE id = ?2",
                params![favorite, scan_id],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn delete_scan(&self, scan_id: &str) -> Result<()> {
        let scan_id = scan_id.to_string();
        self.execute(move |conn| {
            conn.execute("DELETE FROM scan_records WHERE id = ?1", params![scan_id])?;
            Ok(())
        })
        .await
    }

    pub async fn delete_all_scans(&self) -> Result<()> {
        self.execute(|conn| {
            conn.execute("DELETE FROM scan_records", [])?;
            Ok(())
        })
        .await
    }

    #[allow(dead_code)]
    pub async fn count_scans(&self) -> Result<u32> {
        self.execute(|conn| {
            let count: u32 =
                conn.query_row("SELECT COUNT(*) FROM scan_records", [], |row| row.get(0))?;
            Ok(count)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use crate::db::{
        models::{ScanKind, ScanRecord},
        Database,
    };

    struct TempDb {
        db: Database,
        path: std::path::PathBuf,
    }

    impl TempDb {
        fn new() -> Self {
            let path =
                std::env::temp_dir().join(format!("quickqr-test-{}.sqlite3", Uuid::new_v4()));
            let db = Database::new(path.clone()).expect("open test database");
            Self { db, path }
        }
    }

    impl Drop for TempDb {
        fn drop(&mut self) {
            for suffix in ["", "-wal", "-shm"] {
                let mut name = self.path.as_os_str().to_os_string();
                name.push(suffix);
                let _ = std::fs::remove_file(name);
            }
        }
    }

    fn record(content: &str, kind: ScanKind, age_secs: i64) -> ScanRecord {
        ScanRecord {
            id: Uuid::new_v4().to_string(),
            content: content.to_string(),
            kind,
            scanned_at: Utc::now() - Duration::seconds(age_secs),
            favorite: false,
        }
    }

    #[tokio::test]
    async fn insert_and_get_round_trip() {
        let tmp = TempDb::new();
        let rec = record("https://example.com", ScanKind::Url, 0);
        tmp.db.insert_scan(&rec).await.expect("insert");

        let fetched = tmp
            .db
            .get_scan(&rec.id)
            .await
            .expect("get")
            .expect("record present");
        assert_eq!(fetched.content, rec.content);
        assert_eq!(fetched.kind, ScanKind::Url);
        assert!(!fetched.favorite);
        // RFC 3339 keeps sub-second precision
        assert_eq!(fetched.scanned_at, rec.scanned_at);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let tmp = TempDb::new();
        let older = record("older", ScanKind::Text, 60);
        let newer = record("newer", ScanKind::Text, 0);
        tmp.db.insert_scan(&older).await.expect("insert older");
        tmp.db.insert_scan(&newer).await.expect("insert newer");

        let all = tmp.db.list_scans().await.expect("list");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].content, "newer");
        assert_eq!(all[1].content, "older");
    }

    #[tokio::test]
    async fn pagination_windows() {
        let tmp = TempDb::new();
        for i in 0..5 {
            tmp.db
                .insert_scan(&record(&format!("scan-{i}"), ScanKind::Text, i))
                .await
                .expect("insert");
        }

        let first = tmp.db.list_scans_paginated(2, 0).await.expect("page 1");
        let second = tmp.db.list_scans_paginated(2, 2).await.expect("page 2");
        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 2);
        assert_eq!(first[0].content, "scan-0");
        assert_eq!(second[0].content, "scan-2");
    }

    #[tokio::test]
    async fn search_matches_content_and_kind() {
        let tmp = TempDb::new();
        tmp.db
            .insert_scan(&record("https://rust-lang.org", ScanKind::Url, 0))
            .await
            .expect("insert url");
        tmp.db
            .insert_scan(&record("grocery list", ScanKind::Text, 1))
            .await
            .expect("insert text");

        let by_content = tmp.db.search_scans("rust").await.expect("search content");
        assert_eq!(by_content.len(), 1);
        assert_eq!(by_content[0].kind, ScanKind::Url);

        let by_kind = tmp.db.search_scans("URL").await.expect("search kind");
        assert_eq!(by_kind.len(), 1);

        let none = tmp.db.search_scans("nomatch").await.expect("search none");
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn favorite_toggle_persists() {
        let tmp = TempDb::new();
        let rec = record("WIFI:S:Net;;", ScanKind::Wifi, 0);
        tmp.db.insert_scan(&rec).await.expect("insert");

        tmp.db.set_favorite(&rec.id, true).await.expect("favorite");
        let fetched = tmp.db.get_scan(&rec.id).await.expect("get").unwrap();
        assert!(fetched.favorite);

        tmp.db
            .set_favorite(&rec.id, false)
            .await
            .expect("unfavorite");
        let fetched = tmp.db.get_scan(&rec.id).await.expect("get").unwrap();
        assert!(!fetched.favorite);
    }

    #[tokio::test]
    async fn deletes_individual_and_bulk() {
        let tmp = TempDb::new();
        let a = record("a", ScanKind::Text, 0);
        let b = record("b", ScanKind::Text, 1);
        tmp.db.insert_scan(&a).await.expect("insert a");
        tmp.db.insert_scan(&b).await.expect("insert b");

        tmp.db.delete_scan(&a.id).await.expect("delete a");
        assert_eq!(tmp.db.count_scans().await.expect("count"), 1);
        assert!(tmp.db.get_scan(&a.id).await.expect("get").is_none());

        tmp.db.delete_all_scans().await.expect("delete all");
        assert_eq!(tmp.db.count_scans().await.expect("count"), 0);
    }
}
