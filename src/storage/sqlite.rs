use crate::model::{CleanRecord, RawRecord, Source, StorageError};
use rusqlite::types::{Type, Value};
use rusqlite::{Connection, Row, params};

/// SQLite-backed product table. The location and table name are explicit
/// construction parameters rather than process-wide globals.
///
/// The table holds raw rows (Price/Rating as TEXT) between scraping and
/// normalization, and clean rows (Price REAL, Rating REAL-or-NULL) after.
/// It is only ever replaced wholesale, never mixed.
pub struct SqliteStorage {
    conn: Connection,
    table: String,
}

impl SqliteStorage {
    pub fn open(db_path: &str, table: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(db_path)?;
        Ok(Self {
            conn,
            table: table.to_string(),
        })
    }

    pub fn in_memory(table: &str) -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn,
            table: table.to_string(),
        })
    }

    pub fn table_exists(&self) -> Result<bool, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
        let mut rows = stmt.query(params![self.table])?;
        Ok(rows.next()?.is_some())
    }

    /// Appends a batch of raw records in arrival order. Empty input is a
    /// no-op, even before the reset: a reset only happens together with the
    /// first actual write of a run. `reset` drops whatever table existed.
    pub fn append_raw(&self, records: &[RawRecord], reset: bool) -> Result<usize, StorageError> {
        if records.is_empty() {
            return Ok(0);
        }

        if reset {
            self.conn
                .execute(&format!("DROP TABLE IF EXISTS {}", self.table), [])?;
        }

        self.conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    Source TEXT NOT NULL,
                    Title TEXT NOT NULL,
                    Price TEXT,
                    Rating TEXT,
                    Link TEXT
                )",
                self.table
            ),
            [],
        )?;

        let mut stmt = self.conn.prepare(&format!(
            "INSERT INTO {} (Source, Title, Price, Rating, Link) VALUES (?1, ?2, ?3, ?4, ?5)",
            self.table
        ))?;
        for record in records {
            stmt.execute(params![
                record.source.as_str(),
                &record.title,
                &record.price,
                &record.rating,
                &record.link,
            ])?;
        }

        Ok(records.len())
    }

    /// Reads the whole table back as raw records. Numeric cells (a table
    /// that was already normalized) render back to text, so a second
    /// normalization pass sees equivalent input. An absent table reads as
    /// empty.
    pub fn load_raw(&self) -> Result<Vec<RawRecord>, StorageError> {
        if !self.table_exists()? {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(&format!(
            "SELECT Source, Title, Price, Rating, Link FROM {}",
            self.table
        ))?;
        let rows = stmt.query_map([], |row| {
            Ok(RawRecord {
                source: row_source(row, 0)?,
                title: row.get(1)?,
                price: value_text(row.get::<_, Value>(2)?),
                rating: value_text(row.get::<_, Value>(3)?),
                link: row.get(4)?,
            })
        })?;

        let mut records = Vec::new();
        for record in rows {
            records.push(record?);
        }
        Ok(records)
    }

    /// Replaces the table contents with the given clean rows: drop, then
    /// recreate with the numeric schema. Never updates in place.
    pub fn replace_with_clean(&self, records: &[CleanRecord]) -> Result<(), StorageError> {
        self.conn
            .execute(&format!("DROP TABLE IF EXISTS {}", self.table), [])?;
        self.conn.execute(
            &format!(
                "CREATE TABLE {} (
                    Source TEXT NOT NULL,
                    Title TEXT NOT NULL,
                    Price REAL NOT NULL,
                    Rating REAL,
                    Link TEXT
                )",
                self.table
            ),
            [],
        )?;

        let mut stmt = self.conn.prepare(&format!(
            "INSERT INTO {} (Source, Title, Price, Rating, Link) VALUES (?1, ?2, ?3, ?4, ?5)",
            self.table
        ))?;
        for record in records {
            stmt.execute(params![
                record.source.as_str(),
                &record.title,
                record.price,
                record.rating,
                &record.link,
            ])?;
        }

        Ok(())
    }

    /// The full clean table. Rows whose price cell is not numeric (a table
    /// still in its raw state) are skipped rather than surfaced as errors.
    pub fn all_products(&self) -> Result<Vec<CleanRecord>, StorageError> {
        if !self.table_exists()? {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT Source, Title, Price, Rating, Link FROM {}",
            self.table
        );
        self.query_clean(&sql)
    }

    /// The `limit` lowest-priced products.
    pub fn cheapest(&self, limit: usize) -> Result<Vec<CleanRecord>, StorageError> {
        if !self.table_exists()? {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT Source, Title, Price, Rating, Link FROM {}
             WHERE Price > 0 ORDER BY Price ASC LIMIT {limit}",
            self.table
        );
        self.query_clean(&sql)
    }

    /// The `limit` highest-priced products.
    pub fn priciest(&self, limit: usize) -> Result<Vec<CleanRecord>, StorageError> {
        if !self.table_exists()? {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT Source, Title, Price, Rating, Link FROM {}
             WHERE Price > 0 ORDER BY Price DESC LIMIT {limit}",
            self.table
        );
        self.query_clean(&sql)
    }

    /// Mean price and row count per source, in fixed source order.
    pub fn average_price_by_source(&self) -> Result<Vec<(Source, f64, usize)>, StorageError> {
        if !self.table_exists()? {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(&format!(
            "SELECT Source, AVG(Price), COUNT(*) FROM {} GROUP BY Source",
            self.table
        ))?;
        let rows = stmt.query_map([], |row| {
            let source = row_source(row, 0)?;
            let avg: f64 = row.get(1)?;
            let count: usize = row.get(2)?;
            Ok((source, avg, count))
        })?;

        let mut by_source = Vec::new();
        for row in rows {
            by_source.push(row?);
        }
        by_source.sort_by_key(|entry| {
            Source::ALL
                .iter()
                .position(|s| *s == entry.0)
                .unwrap_or(usize::MAX)
        });
        Ok(by_source)
    }

    fn query_clean(&self, sql: &str) -> Result<Vec<CleanRecord>, StorageError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| {
            let price = value_f64(row.get::<_, Value>(2)?);
            let rating = value_f64(row.get::<_, Value>(3)?);
            Ok((row_source(row, 0)?, row.get::<_, String>(1)?, price, rating, row.get::<_, String>(4)?))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (source, title, price, rating, link) = row?;
            let Some(price) = price else { continue };
            records.push(CleanRecord {
                source,
                title,
                price,
                rating,
                link,
            });
        }
        Ok(records)
    }
}

fn row_source(row: &Row, idx: usize) -> Result<Source, rusqlite::Error> {
    let text: String = row.get(idx)?;
    Source::parse(&text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("unknown source: {text}"),
            )),
        )
    })
}

/// Renders a dynamically-typed cell back to text. Reals keep an explicit
/// decimal point ("4.0", not "4"): rating re-extraction needs one, and the
/// price digit run is unaffected by it.
fn value_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => format!("{f:?}"),
        Value::Text(s) => s,
        Value::Blob(_) => String::new(),
    }
}

fn value_f64(value: Value) -> Option<f64> {
    match value {
        Value::Integer(i) => Some(i as f64),
        Value::Real(f) => Some(f),
        Value::Text(s) => s.trim().parse().ok(),
        Value::Null | Value::Blob(_) => None,
    }
}
