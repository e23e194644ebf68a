//! SQLite storage for ignored Wifi networks and saved Wifi locations.

mod insert;
mod models;
mod open;
mod query;
mod schema;

pub use open::Db;
pub use schema::DATABASE_VERSION;

use inetify_core::{Coordinate, IgnoredWifi, StoreError, WifiLocation, WifiStore};

impl WifiStore for Db {
    fn open(&self) -> Result<(), StoreError> {
        self.with_conn(|_| Ok(()))
    }

    fn close(&self) {
        self.close_conn();
    }

    fn is_open(&self) -> bool {
        self.conn_is_open()
    }

    fn add_ignored(&self, bssid: &str, ssid: &str) -> Result<bool, StoreError> {
        self.with_conn(|c| insert::add_ignored(c, bssid, ssid))
    }

    fn is_ignored(&self, ssid: &str) -> Result<bool, StoreError> {
        self.with_conn(|c| query::is_ignored(c, ssid))
    }

    fn delete_ignored(&self, ssid: &str) -> Result<bool, StoreError> {
        self.with_conn(|c| insert::delete_ignored(c, ssid))
    }

    fn fetch_ignored(&self) -> Result<Vec<IgnoredWifi>, StoreError> {
        self.with_conn(query::fetch_ignored)
    }

    fn add_location(&self, bssid: &str, ssid: &str, name: Option<&str>, location: &Coordinate) -> Result<bool, StoreError> {
        self.with_conn(|c| insert::add_location(c, bssid, ssid, name, location))
    }

    fn delete_location(&self, bssid: &str) -> Result<bool, StoreError> {
        self.with_conn(|c| insert::delete_location(c, bssid))
    }

    fn rename_location(&self, bssid: &str, name: &str) -> Result<bool, StoreError> {
        self.with_conn(|c| insert::rename_location(c, bssid, name))
    }

    fn fetch_locations(&self) -> Result<Vec<WifiLocation>, StoreError> {
        self.with_conn(query::fetch_locations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn db() -> (TempDir, Db) {
        let dir = tempfile::tempdir().unwrap();
        let db = Db::new(dir.path().join("inetify.db"));
        (dir, db)
    }

    fn insert_test_wifis(db: &Db) {
        db.add_ignored("00:21:29:A2:48:80", "Celsten").unwrap();
        db.add_ignored("00:11:22:33:44:55", "TestSSID1").unwrap();
        db.add_ignored("00:66:77:88:99:00", "TestSSID2").unwrap();
    }

    fn pairs(db: &Db) -> Vec<(String, String)> {
        db.fetch_ignored().unwrap().into_iter().map(|w| (w.bssid, w.ssid)).collect()
    }

    #[test]
    fn not_open_until_used() {
        let (_dir, db) = db();
        assert!(!db.is_open());
        db.is_ignored("Celsten").unwrap();
        assert!(db.is_open());
        db.close();
        assert!(!db.is_open());
    }

    #[test]
    fn schema_version() {
        let (_dir, db) = db();
        assert_eq!(db.database_version().unwrap(), DATABASE_VERSION);
        assert!(db.table_exists("ignorelist").unwrap());
        assert!(db.table_exists("locations").unwrap());
    }

    #[test]
    fn add_ignored_keeps_insertion_order() {
        let (_dir, db) = db();
        insert_test_wifis(&db);
        assert!(!db.add_ignored("", "").unwrap());
        assert_eq!(
            pairs(&db),
            vec![
                ("00:21:29:A2:48:80".into(), "Celsten".into()),
                ("00:11:22:33:44:55".into(), "TestSSID1".into()),
                ("00:66:77:88:99:00".into(), "TestSSID2".into()),
            ]
        );
    }

    #[test]
    fn same_bssid_other_ssid_updates() {
        let (_dir, db) = db();
        assert!(db.add_ignored("AA", "X").unwrap());
        assert!(db.add_ignored("AA", "Y").unwrap());
        assert_eq!(pairs(&db), vec![("AA".into(), "Y".into())]);
        assert!(!db.is_ignored("X").unwrap());
        assert!(db.delete_ignored("Y").unwrap());
        assert!(db.fetch_ignored().unwrap().is_empty());
    }

    #[test]
    fn is_ignored_by_ssid() {
        let (_dir, db) = db();
        insert_test_wifis(&db);
        assert!(db.is_ignored("Celsten").unwrap());
        assert!(db.is_ignored("TestSSID2").unwrap());
        assert!(!db.is_ignored("XXX").unwrap());
        assert!(!db.is_ignored("").unwrap());
    }

    #[test]
    fn delete_ignored_removes_every_bssid_with_ssid() {
        let (_dir, db) = db();
        insert_test_wifis(&db);
        db.add_ignored("10:11:22:33:44:55", "TestSSID1").unwrap();
        assert!(db.delete_ignored("TestSSID1").unwrap());
        assert!(!db.delete_ignored("XXX").unwrap());
        assert_eq!(
            pairs(&db),
            vec![
                ("00:21:29:A2:48:80".into(), "Celsten".into()),
                ("00:66:77:88:99:00".into(), "TestSSID2".into()),
            ]
        );
    }

    #[test]
    fn records_survive_close() {
        let (_dir, db) = db();
        insert_test_wifis(&db);
        db.close();
        assert_eq!(pairs(&db).len(), 3);
    }

    #[test]
    fn locations_crud() {
        let (_dir, db) = db();
        let here = Coordinate { latitude: 48.1, longitude: 11.5, accuracy: 25.0, time: 1_300_000_000_000 };
        assert!(db.add_location("AA", "Home", None, &here).unwrap());
        assert!(db.add_location("BB", "Work", Some("Office"), &here).unwrap());

        assert!(db.rename_location("AA", "Living room").unwrap());
        assert!(!db.rename_location("CC", "Nowhere").unwrap());

        let moved = Coordinate { latitude: 48.2, ..here };
        assert!(db.add_location("BB", "Work", Some("Office"), &moved).unwrap());

        let locs = db.fetch_locations().unwrap();
        assert_eq!(locs.len(), 2);
        assert_eq!(locs[0].name.as_deref(), Some("Living room"));
        assert_eq!(locs[1].location.latitude, 48.2);
        assert_eq!(locs[1].location.accuracy, 25.0);

        assert!(db.delete_location("AA").unwrap());
        assert!(!db.delete_location("AA").unwrap());
        assert_eq!(db.fetch_locations().unwrap().len(), 1);
    }

    #[test]
    fn location_needs_bssid_and_ssid() {
        let (_dir, db) = db();
        let here = Coordinate { latitude: 1.0, longitude: 2.0, accuracy: 5.0, time: 0 };
        assert!(!db.add_location("AA", "", None, &here).unwrap());
        assert!(!db.add_location("", "Home", None, &here).unwrap());
        assert!(db.fetch_locations().unwrap().is_empty());
    }

    #[test]
    fn unknown_database_version_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inetify.db");
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE ignorelist (_id INTEGER PRIMARY KEY, bssid TEXT); PRAGMA user_version = 1;").unwrap();
        drop(conn);

        let err = Db::new(&path).is_ignored("Home").unwrap_err();
        let source = std::error::Error::source(&err).unwrap().to_string();
        assert!(source.contains("unsupported database version 1"), "{source}");
    }

    #[test]
    fn shared_between_threads() {
        let (_dir, db) = db();
        let db = Arc::new(db);
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let db = db.clone();
                std::thread::spawn(move || {
                    db.add_ignored(&format!("BSSID{i}"), "Shared").unwrap();
                    db.is_ignored("Shared").unwrap()
                })
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap());
        }
        assert_eq!(db.fetch_ignored().unwrap().len(), 4);
    }
}
