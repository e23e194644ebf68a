use crate::models::{ignored_from_row, location_from_row};
use crate::Db;
use anyhow::Result;
use inetify_core::{IgnoredWifi, StoreError, WifiLocation};
use rusqlite::Connection;

impl Db {
    pub fn table_exists(&self, name: &str) -> Result<bool, StoreError> {
        self.with_conn(|conn| {
            let cnt: i64 = conn.query_row(
                "SELECT COUNT(1) FROM sqlite_master WHERE type='table' AND name=?",
                [name],
                |r| r.get(0),
            )?;
            Ok(cnt > 0)
        })
    }

    pub fn database_version(&self) -> Result<i64, StoreError> {
        self.with_conn(|conn| Ok(conn.query_row("PRAGMA user_version", [], |r| r.get(0))?))
    }
}

pub(crate) fn is_ignored(conn: &Connection, ssid: &str) -> Result<bool> {
    let cnt: i64 = conn.query_row("SELECT COUNT(1) FROM ignorelist WHERE ssid=?", [ssid], |r| r.get(0))?;
    Ok(cnt > 0)
}

pub(crate) fn fetch_ignored(conn: &Connection) -> Result<Vec<IgnoredWifi>> {
    let mut stmt = conn.prepare("SELECT bssid, ssid FROM ignorelist ORDER BY _id")?;
    let rows = stmt.query_map([], ignored_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub(crate) fn fetch_locations(conn: &Connection) -> Result<Vec<WifiLocation>> {
    let mut stmt = conn.prepare("SELECT bssid, ssid, name, lat, lon, acc, time FROM locations ORDER BY _id")?;
    let rows = stmt.query_map([], location_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}
