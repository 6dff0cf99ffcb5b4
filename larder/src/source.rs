//! Data source handling.
//!
//! Sources produce fully-loaded, ordered [`Collection`]s. Any file handles or
//! database connections are released before a load returns.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::debug;
use rusqlite::{types::ValueRef, Connection, OpenFlags};
use serde_json::Value as JsonValue;

use crate::{Collection, Error, Record, RecordKind, Value};

/// Something from which collections of records can be loaded.
pub trait RecordSource {
    /// Loads all records of the given kind, ordered by the kind's sort
    /// contract.
    fn load(&self, kind: RecordKind) -> Result<Collection, Error>;
}

/// A JSON file containing an array of record objects.
#[derive(Debug, Clone)]
pub struct JsonSource {
    path: PathBuf,
}

impl JsonSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for JsonSource {
    fn load(&self, kind: RecordKind) -> Result<Collection, Error> {
        let path = &self.path;
        if !path.is_file() {
            return Err(Error::MissingInput(format!(
                "data file not found: {}",
                path.display()
            )));
        }
        debug!("Loading {} records from {}", kind, path.display());
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Io(format!("while trying to read from {}", path.display()), e))?;
        let malformed = |reason: String| Error::MalformedInput(path.display().to_string(), reason);
        let data = serde_json::from_str::<JsonValue>(&content).map_err(|e| malformed(e.to_string()))?;
        let elements = match data {
            JsonValue::Array(arr) => arr,
            _ => return Err(malformed("JSON must be an array of records".to_string())),
        };
        let mut records = Vec::with_capacity(elements.len());
        for (i, element) in elements.iter().enumerate() {
            let obj = element
                .as_object()
                .ok_or_else(|| malformed(format!("element {} is not an object", i)))?;
            let record = kind.record_from_json(obj).map_err(|e| match e {
                Error::MalformedInput(_, reason) => malformed(format!("element {}: {}", i, reason)),
                e => e,
            })?;
            records.push(record);
        }
        kind.sort(&mut records);
        debug!("Loaded {} {} records", records.len(), kind);
        Ok(Collection::new(kind, records))
    }
}

/// A SQLite database with one table per record kind.
#[derive(Debug, Clone)]
pub struct SqliteSource {
    path: PathBuf,
}

impl SqliteSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<Connection, Error> {
        if !self.path.is_file() {
            return Err(Error::MissingInput(format!(
                "DB file not found: {}",
                self.path.display()
            )));
        }
        Ok(Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?)
    }
}

impl RecordSource for SqliteSource {
    fn load(&self, kind: RecordKind) -> Result<Collection, Error> {
        let table = kind.table().ok_or_else(|| {
            Error::MissingInput(format!("no database table holds {} records", kind))
        })?;
        let conn = self.open()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
            [table],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(Error::MissingInput(format!(
                "table {} not found in {}",
                table,
                self.path.display()
            )));
        }
        debug!("Loading {} records from {}:{}", kind, self.path.display(), table);
        let records = query_records(&conn, kind, table)?;
        debug!("Loaded {} {} records", records.len(), kind);
        Ok(Collection::new(kind, records))
    }
}

fn query_records(conn: &Connection, kind: RecordKind, table: &str) -> Result<Vec<Record>, Error> {
    let fields = kind.fields();
    let sql = format!(
        "SELECT {} FROM {} ORDER BY {}",
        fields
            .iter()
            .map(|f| f.name)
            .collect::<Vec<&str>>()
            .join(", "),
        table,
        kind.order_by()
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(fields.len());
        for (i, field) in fields.iter().enumerate() {
            let raw = match row.get_ref(i)? {
                ValueRef::Null => None,
                ValueRef::Integer(n) => Some(Value::Integer(n)),
                ValueRef::Text(t) => Some(Value::Text(String::from_utf8_lossy(t).into_owned())),
                ValueRef::Real(_) | ValueRef::Blob(_) => {
                    return Err(Error::MalformedInput(
                        format!("{} row {}", table, records.len()),
                        format!("column {} holds a non-scalar value", field.name),
                    ))
                }
            };
            if let Some(v) = kind.coerce(field, raw)? {
                values.push((field.name.to_string(), v));
            }
        }
        records.push(kind.finish(Record::from_iter(values)));
    }
    Ok(records)
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    /// Creates a fixture database with a few wines and beers.
    pub(crate) fn fixture_db(path: &Path) {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE wine_styles (id INTEGER PRIMARY KEY, title TEXT, country_code TEXT, vivino_url TEXT);
            CREATE TABLE wine_wines (id INTEGER PRIMARY KEY, producer TEXT, title TEXT, style_id INTEGER, img TEXT, review TEXT, vivino_url TEXT);
            CREATE TABLE beer_styles (id INTEGER PRIMARY KEY, title TEXT, country_code TEXT);
            CREATE TABLE beer_beers (id INTEGER PRIMARY KEY, title TEXT, brewery TEXT, style_id INTEGER, review TEXT, img TEXT, untappd_url TEXT);

            INSERT INTO wine_styles VALUES (1, 'Rioja', 'es', NULL);
            INSERT INTO wine_styles VALUES (2, ' Chablis ', 'fr', 'https://vivino.example/chablis');
            INSERT INTO wine_styles VALUES (3, 'Barolo', 'it', '');
            INSERT INTO wine_wines VALUES (10, 'Marqués', 'Reserva', 1, NULL, 'Good.', NULL);
            INSERT INTO wine_wines VALUES (11, 'Brocard', 'Premier Cru', 2, 'chablis.jpg', NULL, NULL);
            INSERT INTO wine_wines VALUES (12, 'Nobody', 'Orphan', NULL, NULL, NULL, NULL);
            INSERT INTO wine_wines VALUES (9, 'Faustino', 'Gran Reserva', 1, NULL, NULL, NULL);

            INSERT INTO beer_styles VALUES (1, 'Stout', 'ie');
            INSERT INTO beer_beers VALUES (1, 'Guinness', 'St. James''s Gate', 1, 'Creamy.', NULL, NULL);
            "#,
        )
        .unwrap();
    }

    #[test]
    fn loads_sqlite_in_contract_order() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("food.db");
        fixture_db(&db);
        let source = SqliteSource::new(&db);

        let styles = source.load(RecordKind::WineStyle).unwrap();
        let titles = styles
            .iter()
            .map(|s| s.text("title").unwrap())
            .collect::<Vec<&str>>();
        assert_eq!(titles, vec!["Rioja", "Chablis", "Barolo"]);
        assert_eq!(styles.records()[0].text("vivino_url"), Some(""));

        let wines = source.load(RecordKind::Wine).unwrap();
        let ids = wines.iter().filter_map(Record::id).collect::<Vec<i64>>();
        // NULL style IDs sort first in SQLite.
        assert_eq!(ids, vec![12, 9, 10, 11]);
        assert_eq!(wines.records()[0].get("style_id"), None);
    }

    #[test]
    fn missing_db_and_table_are_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = SqliteSource::new(dir.path().join("nope.db"))
            .load(RecordKind::Wine)
            .unwrap_err();
        assert!(matches!(err, Error::MissingInput(_)));

        let db = dir.path().join("empty.db");
        Connection::open(&db)
            .unwrap()
            .execute_batch("CREATE TABLE other (id INTEGER);")
            .unwrap();
        let err = SqliteSource::new(&db).load(RecordKind::Beer).unwrap_err();
        assert!(matches!(err, Error::MissingInput(_)));
    }

    #[test]
    fn loads_json_episodes_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("episodes.json");
        fs::write(
            &path,
            r#"[
                {"title": "ПроСто кухня | Выпуск 2", "url": "https://example.com/2"},
                {"title": "ПроСто кухня | Выпуск 10", "url": "https://example.com/10"},
                {"title": "Спецвыпуск"}
            ]"#,
        )
        .unwrap();
        let episodes = JsonSource::new(&path).load(RecordKind::Episode).unwrap();
        let numbers = episodes
            .iter()
            .filter_map(|e| e.integer("number"))
            .collect::<Vec<i64>>();
        assert_eq!(numbers, vec![10, 2, 0]);
        assert_eq!(episodes.records()[2].text("url"), Some(""));
    }

    #[test]
    fn json_must_be_an_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("episodes.json");
        fs::write(&path, r#"{"title": "Выпуск 1"}"#).unwrap();
        let err = JsonSource::new(&path).load(RecordKind::Episode).unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_, _)));

        fs::write(&path, "[1, 2").unwrap();
        let err = JsonSource::new(&path).load(RecordKind::Episode).unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_, _)));

        let err = JsonSource::new(dir.path().join("missing.json"))
            .load(RecordKind::Episode)
            .unwrap_err();
        assert!(matches!(err, Error::MissingInput(_)));
    }
}
