use inetify_core::{Coordinate, IgnoredWifi, WifiLocation};
use rusqlite::Row;

pub(crate) fn ignored_from_row(r: &Row<'_>) -> rusqlite::Result<IgnoredWifi> {
    Ok(IgnoredWifi { bssid: r.get("bssid")?, ssid: r.get("ssid")? })
}

pub(crate) fn location_from_row(r: &Row<'_>) -> rusqlite::Result<WifiLocation> {
    Ok(WifiLocation {
        bssid: r.get("bssid")?,
        ssid: r.get("ssid")?,
        name: r.get("name")?,
        location: Coordinate {
            latitude: r.get("lat")?,
            longitude: r.get("lon")?,
            accuracy: r.get::<_, f64>("acc")? as f32,
            time: r.get("time")?,
        },
    })
}
