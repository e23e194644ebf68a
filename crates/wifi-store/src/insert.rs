use anyhow::Result;
use inetify_core::Coordinate;
use rusqlite::{params, Connection};

pub(crate) fn add_ignored(conn: &Connection, bssid: &str, ssid: &str) -> Result<bool> {
    if bssid.is_empty() || ssid.is_empty() {
        return Ok(false);
    }
    let n = conn.execute(
        "INSERT INTO ignorelist(bssid,ssid) VALUES (?,?) ON CONFLICT(bssid) DO UPDATE SET ssid=excluded.ssid",
        params![bssid, ssid],
    )?;
    Ok(n > 0)
}

pub(crate) fn delete_ignored(conn: &Connection, ssid: &str) -> Result<bool> {
    let n = conn.execute("DELETE FROM ignorelist WHERE ssid=?", params![ssid])?;
    Ok(n > 0)
}

pub(crate) fn add_location(conn: &Connection, bssid: &str, ssid: &str, name: Option<&str>, loc: &Coordinate) -> Result<bool> {
    if bssid.is_empty() || ssid.is_empty() {
        return Ok(false);
    }
    let n = conn.execute(
        "INSERT INTO locations(bssid,ssid,name,lat,lon,acc,time) VALUES (?,?,?,?,?,?,?)
         ON CONFLICT(bssid) DO UPDATE SET ssid=excluded.ssid, name=excluded.name, lat=excluded.lat, lon=excluded.lon, acc=excluded.acc, time=excluded.time",
        params![bssid, ssid, name, loc.latitude, loc.longitude, loc.accuracy as f64, loc.time],
    )?;
    Ok(n > 0)
}

pub(crate) fn delete_location(conn: &Connection, bssid: &str) -> Result<bool> {
    let n = conn.execute("DELETE FROM locations WHERE bssid=?", params![bssid])?;
    Ok(n > 0)
}

pub(crate) fn rename_location(conn: &Connection, bssid: &str, name: &str) -> Result<bool> {
    let n = conn.execute("UPDATE locations SET name=? WHERE bssid=?", params![name, bssid])?;
    Ok(n > 0)
}
