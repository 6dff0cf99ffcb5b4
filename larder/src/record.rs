//! Record kinds and their field schemas.

use std::{cmp::Ordering, fmt, str::FromStr};

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::{Error, Map, Value, ValueType};

lazy_static! {
    // "ПроСто кухня | Выпуск 224" -> 224
    static ref EPISODE_NUMBER: Regex = Regex::new(r"(?i)Выпуск\s+(\d+)").unwrap();
}

/// A single field in a record kind's schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub ty: ValueType,
    /// Required fields must be present and non-null in the source data.
    pub required: bool,
}

const fn required(name: &'static str, ty: ValueType) -> Field {
    Field {
        name,
        ty,
        required: true,
    }
}

const fn optional(name: &'static str, ty: ValueType) -> Field {
    Field {
        name,
        ty,
        required: false,
    }
}

const EPISODE_FIELDS: &[Field] = &[
    optional("number", ValueType::Integer),
    optional("title", ValueType::Text),
    optional("url", ValueType::Text),
    optional("date", ValueType::Text),
    optional("description", ValueType::Text),
];

const WINE_STYLE_FIELDS: &[Field] = &[
    required("id", ValueType::Integer),
    optional("title", ValueType::Text),
    optional("country_code", ValueType::Text),
    optional("vivino_url", ValueType::Text),
];

const WINE_FIELDS: &[Field] = &[
    required("id", ValueType::Integer),
    optional("producer", ValueType::Text),
    optional("title", ValueType::Text),
    optional("style_id", ValueType::Integer),
    optional("img", ValueType::Text),
    optional("review", ValueType::Text),
    optional("vivino_url", ValueType::Text),
];

const BEER_STYLE_FIELDS: &[Field] = &[
    required("id", ValueType::Integer),
    optional("title", ValueType::Text),
    optional("country_code", ValueType::Text),
];

const BEER_FIELDS: &[Field] = &[
    required("id", ValueType::Integer),
    optional("title", ValueType::Text),
    optional("brewery", ValueType::Text),
    optional("style_id", ValueType::Integer),
    optional("review", ValueType::Text),
    optional("img", ValueType::Text),
    optional("untappd_url", ValueType::Text),
];

/// The closed set of record kinds that larder knows how to load and render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordKind {
    Episode,
    WineStyle,
    Wine,
    BeerStyle,
    Beer,
}

impl RecordKind {
    /// The fields of this kind, in the order they are projected and
    /// substituted.
    pub fn fields(&self) -> &'static [Field] {
        match self {
            Self::Episode => EPISODE_FIELDS,
            Self::WineStyle => WINE_STYLE_FIELDS,
            Self::Wine => WINE_FIELDS,
            Self::BeerStyle => BEER_STYLE_FIELDS,
            Self::Beer => BEER_FIELDS,
        }
    }

    pub fn field(&self, name: &str) -> Option<&'static Field> {
        self.fields().iter().find(|f| f.name == name)
    }

    /// The database table holding records of this kind, if any.
    pub fn table(&self) -> Option<&'static str> {
        match self {
            Self::Episode => None,
            Self::WineStyle => Some("wine_styles"),
            Self::Wine => Some("wine_wines"),
            Self::BeerStyle => Some("beer_styles"),
            Self::Beer => Some("beer_beers"),
        }
    }

    /// The `ORDER BY` clause matching this kind's sort contract.
    pub fn order_by(&self) -> &'static str {
        match self {
            Self::Episode => "number DESC",
            Self::WineStyle | Self::BeerStyle => "country_code, title, id",
            Self::Wine | Self::Beer => "style_id, id",
        }
    }

    /// The foreign key by which records of this kind are grouped under
    /// another kind's records.
    pub fn group_key(&self) -> Option<&'static str> {
        match self {
            Self::Wine | Self::Beer => Some("style_id"),
            _ => None,
        }
    }

    /// Sorts records in place according to this kind's sort contract. The
    /// sort is stable.
    pub fn sort(&self, records: &mut [Record]) {
        match self {
            Self::Episode => {
                records.sort_by(|a, b| b.integer("number").cmp(&a.integer("number")))
            }
            Self::WineStyle | Self::BeerStyle => records.sort_by(|a, b| {
                by_text(a, b, "country_code")
                    .then_with(|| by_text(a, b, "title"))
                    .then_with(|| a.integer("id").cmp(&b.integer("id")))
            }),
            Self::Wine | Self::Beer => records.sort_by(|a, b| {
                a.integer("style_id")
                    .cmp(&b.integer("style_id"))
                    .then_with(|| a.integer("id").cmp(&b.integer("id")))
            }),
        }
    }

    /// Builds a record of this kind from a JSON object, coercing each schema
    /// field and keeping any extra scalar fields as they are.
    pub fn record_from_json(&self, obj: &JsonMap<String, JsonValue>) -> Result<Record, Error> {
        let mut values = Map::new();
        for field in self.fields() {
            let raw = match obj.get(field.name) {
                None | Some(JsonValue::Null) => None,
                Some(v) => Some(Value::from_json(v).ok_or_else(|| {
                    self.malformed(format!(
                        "field \"{}\" must be a {}, got {}",
                        field.name, field.ty, v
                    ))
                })?),
            };
            if let Some(v) = self.coerce(field, raw)? {
                values.insert(field.name.to_string(), v);
            }
        }
        for (k, v) in obj {
            if self.field(k).is_some() {
                continue;
            }
            match Value::from_json(v) {
                Some(v) => {
                    values.insert(k.clone(), v);
                }
                None => debug!("Dropping non-scalar field \"{}\" from {} record", k, self),
            }
        }
        Ok(self.finish(Record(values)))
    }

    /// Coerces a single raw field value against the schema. Text is trimmed,
    /// a missing text field becomes the empty string and a missing optional
    /// integer is left out of the record altogether.
    pub(crate) fn coerce(&self, field: &Field, raw: Option<Value>) -> Result<Option<Value>, Error> {
        let value = match (field.ty, raw) {
            (ValueType::Text, Some(Value::Text(s))) => Value::Text(s.trim().to_string()),
            (ValueType::Text, Some(Value::Integer(i))) => Value::Text(i.to_string()),
            (ValueType::Integer, Some(Value::Integer(i))) => Value::Integer(i),
            (ValueType::Integer, Some(Value::Text(s))) => {
                Value::Integer(s.trim().parse::<i64>().map_err(|_| {
                    self.malformed(format!(
                        "field \"{}\" must be an integer, got \"{}\"",
                        field.name, s
                    ))
                })?)
            }
            (_, None) if field.required => {
                return Err(self.malformed(format!("required field \"{}\" is null", field.name)))
            }
            (ValueType::Text, None) => Value::Text(String::new()),
            (ValueType::Integer, None) => return Ok(None),
        };
        Ok(Some(value))
    }

    /// Fills in derived fields.
    pub(crate) fn finish(&self, mut record: Record) -> Record {
        if let Self::Episode = self {
            let number = record.text("title").map(episode_number).unwrap_or(0);
            record.0.insert("number".to_string(), Value::Integer(number));
        }
        record
    }

    fn malformed(&self, reason: String) -> Error {
        Error::MalformedInput(format!("{} record", self), reason)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Episode => "episode",
                Self::WineStyle => "wine style",
                Self::Wine => "wine",
                Self::BeerStyle => "beer style",
                Self::Beer => "beer",
            }
        )
    }
}

fn by_text(a: &Record, b: &Record, field: &str) -> Ordering {
    a.text(field).cmp(&b.text(field))
}

/// Extracts the episode number from an episode title, or 0 if the title does
/// not carry one.
pub fn episode_number(title: &str) -> i64 {
    EPISODE_NUMBER
        .captures(title)
        .and_then(|c| c.get(1))
        .and_then(|m| i64::from_str(m.as_str()).ok())
        .unwrap_or(0)
}

/// An immutable, flat mapping from field names to scalar values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Convenience method for building records by hand.
    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: AsRef<str>,
        V: Into<Value>,
    {
        self.0.insert(key.as_ref().to_string(), value.into());
        self
    }

    pub fn get<K: AsRef<str>>(&self, key: K) -> Option<&Value> {
        self.0.get(key.as_ref())
    }

    pub fn integer<K: AsRef<str>>(&self, key: K) -> Option<i64> {
        self.get(key).and_then(Value::as_integer)
    }

    pub fn text<K: AsRef<str>>(&self, key: K) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// The record's `id` field, if it has one.
    pub fn id(&self) -> Option<i64> {
        self.integer("id")
    }

    /// An iterator visiting all field/value pairs in field name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(Map::from_iter(iter))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn obj(v: JsonValue) -> JsonMap<String, JsonValue> {
        match v {
            JsonValue::Object(o) => o,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn parses_episode_numbers() {
        assert_eq!(episode_number("ПроСто кухня | Выпуск 224"), 224);
        assert_eq!(episode_number("ПроСто кухня | выпуск  7"), 7);
        assert_eq!(episode_number("Спецвыпуск"), 0);
    }

    #[test]
    fn wine_record_from_json() {
        let r = RecordKind::Wine
            .record_from_json(&obj(json!({
                "id": 3,
                "producer": "  Domaine X ",
                "title": null,
                "style_id": null,
                "extra": "kept",
                "tags": ["dropped"],
            })))
            .unwrap();
        assert_eq!(r.id(), Some(3));
        assert_eq!(r.text("producer"), Some("Domaine X"));
        assert_eq!(r.text("title"), Some(""));
        assert_eq!(r.text("img"), Some(""));
        assert_eq!(r.get("style_id"), None);
        assert_eq!(r.text("extra"), Some("kept"));
        assert_eq!(r.get("tags"), None);
    }

    #[test]
    fn null_required_field_is_malformed() {
        let err = RecordKind::WineStyle
            .record_from_json(&obj(json!({ "id": null, "title": "Rioja" })))
            .unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_, _)));
    }

    #[test]
    fn wrongly_typed_field_is_malformed() {
        let err = RecordKind::BeerStyle
            .record_from_json(&obj(json!({ "id": 1, "title": ["IPA"] })))
            .unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_, _)));
    }

    #[test]
    fn episodes_get_derived_numbers() {
        let r = RecordKind::Episode
            .record_from_json(&obj(json!({ "title": "Выпуск 12", "number": 99 })))
            .unwrap();
        assert_eq!(r.integer("number"), Some(12));
    }

    #[test]
    fn styles_sort_by_country_title_id() {
        let mut styles = vec![
            Record::default().with("id", 3).with("country_code", "it").with("title", "Barolo"),
            Record::default().with("id", 2).with("country_code", "fr").with("title", "Sancerre"),
            Record::default().with("id", 1).with("country_code", "fr").with("title", "Sancerre"),
            Record::default().with("id", 4).with("country_code", "fr").with("title", "Chablis"),
        ];
        RecordKind::WineStyle.sort(&mut styles);
        let ids = styles.iter().map(|r| r.id().unwrap()).collect::<Vec<i64>>();
        assert_eq!(ids, vec![4, 1, 2, 3]);
    }

    #[test]
    fn episodes_sort_newest_first() {
        let mut episodes = vec![
            Record::default().with("number", 1).with("title", "a"),
            Record::default().with("number", 3).with("title", "b"),
            Record::default().with("number", 1).with("title", "c"),
        ];
        RecordKind::Episode.sort(&mut episodes);
        let titles = episodes
            .iter()
            .map(|r| r.text("title").unwrap())
            .collect::<Vec<&str>>();
        assert_eq!(titles, vec!["b", "a", "c"]);
    }
}
