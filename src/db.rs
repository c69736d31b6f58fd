use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

pub const DEFAULT_DB_PATH: &str = "data.sqlite";

/// One recorded daily data point for a region.
#[derive(Debug, Clone, Serialize)]
pub struct Observation {
    pub date: NaiveDate,
    /// Intraday time. The canton publishes none, so this stays empty and
    /// only participates in the uniqueness key.
    pub time: String,
    pub region: String,
    pub tested: Option<i64>,
    pub confirmed: Option<i64>,
    pub hospitalized: Option<i64>,
    pub icu: Option<i64>,
    pub ventilated: Option<i64>,
    pub released: Option<i64>,
    pub deceased: Option<i64>,
    pub source: String,
}

impl Observation {
    pub fn new(date: NaiveDate, region: &str, source: &str) -> Self {
        Observation {
            date,
            time: String::new(),
            region: region.to_string(),
            tested: None,
            confirmed: None,
            hospitalized: None,
            icu: None,
            ventilated: None,
            released: None,
            deceased: None,
            source: source.to_string(),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyRecorded,
}

pub fn connect(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS data (
            date TEXT NOT NULL,
            time TEXT NOT NULL DEFAULT '',
            abbreviation_canton_and_fl TEXT NOT NULL,
            ncumul_tested INTEGER,
            ncumul_conf INTEGER,
            ncumul_hosp INTEGER,
            ncumul_ICU INTEGER,
            ncumul_vent INTEGER,
            ncumul_released INTEGER,
            ncumul_deceased INTEGER,
            source TEXT,
            UNIQUE(date, time, abbreviation_canton_and_fl)
        );
        ",
    )?;
    Ok(())
}

/// Append one observation. The table is append-only: a row with the same
/// (date, time, region) key is left untouched and reported as
/// `AlreadyRecorded`; every other failure propagates.
pub fn insert_observation(conn: &Connection, obs: &Observation) -> Result<InsertOutcome> {
    let result = conn.execute(
        "INSERT INTO data (
            date, time, abbreviation_canton_and_fl,
            ncumul_tested, ncumul_conf, ncumul_hosp, ncumul_ICU,
            ncumul_vent, ncumul_released, ncumul_deceased, source
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        rusqlite::params![
            obs.date,
            obs.time,
            obs.region,
            obs.tested,
            obs.confirmed,
            obs.hospitalized,
            obs.icu,
            obs.ventilated,
            obs.released,
            obs.deceased,
            obs.source,
        ],
    );

    match result {
        Ok(_) => Ok(InsertOutcome::Inserted),
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            Ok(InsertOutcome::AlreadyRecorded)
        }
        Err(e) => Err(e.into()),
    }
}

pub fn fetch_recent(conn: &Connection, limit: usize) -> Result<Vec<Observation>> {
    let mut stmt = conn.prepare(
        "SELECT date, time, abbreviation_canton_and_fl, ncumul_tested, ncumul_conf,
                ncumul_hosp, ncumul_ICU, ncumul_vent, ncumul_released, ncumul_deceased,
                COALESCE(source, '')
         FROM data
         ORDER BY date DESC, time DESC
         LIMIT ?1",
    )?;
    let rows = stmt
        .query_map([limit as i64], |row| {
            Ok(Observation {
                date: row.get(0)?,
                time: row.get(1)?,
                region: row.get(2)?,
                tested: row.get(3)?,
                confirmed: row.get(4)?,
                hospitalized: row.get(5)?,
                icu: row.get(6)?,
                ventilated: row.get(7)?,
                released: row.get(8)?,
                deceased: row.get(9)?,
                source: row.get(10)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── History backfill ──

// Figures the canton published before this scraper existed.
const HISTORY: &[(&str, i64, i64)] = &[("2020-03-16", 123, 1), ("2020-03-18", 193, 1)];

/// Insert the pre-scraper figures. Safe to run repeatedly; returns how many
/// rows were actually new.
pub fn seed_history(conn: &Connection) -> Result<usize> {
    let mut inserted = 0;
    for &(date, confirmed, deceased) in HISTORY {
        let mut obs = Observation::new(date.parse()?, crate::extract::REGION, "");
        obs.confirmed = Some(confirmed);
        obs.deceased = Some(deceased);
        if insert_observation(conn, &obs)? == InsertOutcome::Inserted {
            inserted += 1;
        }
    }
    Ok(inserted)
}

// ── Stats ──

pub struct Stats {
    pub rows: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let rows: usize = conn.query_row("SELECT COUNT(*) FROM data", [], |r| r.get(0))?;
    let (first_date, last_date) = conn.query_row("SELECT MIN(date), MAX(date) FROM data", [], |r| {
        Ok((r.get(0)?, r.get(1)?))
    })?;
    Ok(Stats {
        rows,
        first_date,
        last_date,
    })
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn obs(date: &str, region: &str) -> Observation {
        let mut o = Observation::new(date.parse().unwrap(), region, "https://example.org");
        o.confirmed = Some(500);
        o.deceased = Some(10);
        o
    }

    #[test]
    fn duplicate_insert_is_benign() {
        let conn = test_conn();
        assert_eq!(
            insert_observation(&conn, &obs("2020-03-18", "BE")).unwrap(),
            InsertOutcome::Inserted
        );
        assert_eq!(
            insert_observation(&conn, &obs("2020-03-18", "BE")).unwrap(),
            InsertOutcome::AlreadyRecorded
        );
        assert_eq!(get_stats(&conn).unwrap().rows, 1);
    }

    #[test]
    fn different_region_or_date_both_persist() {
        let conn = test_conn();
        insert_observation(&conn, &obs("2020-03-18", "BE")).unwrap();
        assert_eq!(
            insert_observation(&conn, &obs("2020-03-18", "ZH")).unwrap(),
            InsertOutcome::Inserted
        );
        assert_eq!(
            insert_observation(&conn, &obs("2020-03-19", "BE")).unwrap(),
            InsertOutcome::Inserted
        );
        assert_eq!(get_stats(&conn).unwrap().rows, 3);
    }

    #[test]
    fn init_schema_is_idempotent() {
        let conn = test_conn();
        insert_observation(&conn, &obs("2020-03-18", "BE")).unwrap();
        init_schema(&conn).unwrap();
        assert_eq!(get_stats(&conn).unwrap().rows, 1);
    }

    #[test]
    fn seed_twice_inserts_once() {
        let conn = test_conn();
        assert_eq!(seed_history(&conn).unwrap(), 2);
        assert_eq!(seed_history(&conn).unwrap(), 0);
        let s = get_stats(&conn).unwrap();
        assert_eq!(s.rows, 2);
        assert_eq!(s.first_date, NaiveDate::from_ymd_opt(2020, 3, 16));
        assert_eq!(s.last_date, NaiveDate::from_ymd_opt(2020, 3, 18));
    }

    #[test]
    fn fetch_recent_orders_newest_first() {
        let conn = test_conn();
        seed_history(&conn).unwrap();
        let rows = fetch_recent(&conn, 10).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date.to_string(), "2020-03-18");
        assert_eq!(rows[0].confirmed, Some(193));
        assert_eq!(rows[1].date.to_string(), "2020-03-16");
    }

    #[test]
    fn empty_store_has_no_dates() {
        let conn = test_conn();
        let s = get_stats(&conn).unwrap();
        assert_eq!(s.rows, 0);
        assert_eq!(s.first_date, None);
        assert_eq!(s.last_date, None);
    }
}
