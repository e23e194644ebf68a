pub const DATABASE_VERSION: i64 = 2;

pub const MIG_0001_INIT: &str = r#"
BEGIN;

CREATE TABLE ignorelist (
  _id             INTEGER PRIMARY KEY AUTOINCREMENT,
  bssid           TEXT NOT NULL UNIQUE,
  ssid            TEXT NOT NULL
);

CREATE TABLE locations (
  _id             INTEGER PRIMARY KEY AUTOINCREMENT,
  bssid           TEXT NOT NULL UNIQUE,
  ssid            TEXT NOT NULL,
  name            TEXT,
  lat             REAL NOT NULL,
  lon             REAL NOT NULL,
  acc             REAL NOT NULL DEFAULT 0.0,
  time            INTEGER NOT NULL
);

CREATE INDEX idx_ignorelist_ssid ON ignorelist(ssid);

PRAGMA user_version = 2;

COMMIT;
"#
;
