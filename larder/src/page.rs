//! The pages larder knows how to generate.
//!
//! Each page kind fixes the record kinds it draws from, the loop variables
//! its template is written against and where its files live by default.

use std::{fmt, path::PathBuf, str::FromStr};

use serde::Deserialize;

use crate::{Error, Layout, NestedLoop, RecordKind};

/// Where a page's records come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    Sqlite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    Episodes,
    Wine,
    Beer,
}

impl PageKind {
    pub const ALL: &'static [PageKind] = &[Self::Episodes, Self::Wine, Self::Beer];

    pub fn source_format(&self) -> SourceFormat {
        match self {
            Self::Episodes => SourceFormat::Json,
            Self::Wine | Self::Beer => SourceFormat::Sqlite,
        }
    }

    /// The kind of record the page's outer loop iterates over.
    pub fn outer_kind(&self) -> RecordKind {
        match self {
            Self::Episodes => RecordKind::Episode,
            Self::Wine => RecordKind::WineStyle,
            Self::Beer => RecordKind::BeerStyle,
        }
    }

    /// The kind of record grouped under each outer record, if any.
    pub fn inner_kind(&self) -> Option<RecordKind> {
        match self {
            Self::Episodes => None,
            Self::Wine => Some(RecordKind::Wine),
            Self::Beer => Some(RecordKind::Beer),
        }
    }

    /// The name under which the outer collection is exposed to templates.
    pub fn collection_name(&self) -> &'static str {
        match self {
            Self::Episodes => "episodes",
            Self::Wine | Self::Beer => "styles",
        }
    }

    /// The name under which the grouping index is exposed to templates.
    pub fn group_name(&self) -> Option<&'static str> {
        match self {
            Self::Episodes => None,
            Self::Wine => Some("style_wines"),
            Self::Beer => Some("style_beers"),
        }
    }

    pub fn layout(&self) -> Layout {
        match self {
            Self::Episodes => Layout::new("episode", self.collection_name(), self.outer_kind()),
            Self::Wine => Layout::new("style", self.collection_name(), self.outer_kind())
                .with_nested(NestedLoop::indexed(
                    "wine",
                    "style_wines",
                    "style",
                    RecordKind::Wine,
                )),
            Self::Beer => Layout::new("style", self.collection_name(), self.outer_kind())
                .with_nested(NestedLoop::indexed(
                    "beer",
                    "style_beers",
                    "style",
                    RecordKind::Beer,
                )),
        }
    }

    /// Default data file, relative to the project root. SQLite-backed pages
    /// share the project database instead.
    pub fn default_data(&self) -> Option<PathBuf> {
        match self {
            Self::Episodes => Some(["data", "prosto-kuhnya.json"].iter().collect()),
            Self::Wine | Self::Beer => None,
        }
    }

    /// Default template path, relative to the project root.
    pub fn default_template(&self) -> PathBuf {
        ["templates", self.file_name()].iter().collect()
    }

    /// Default output path, relative to the project root.
    pub fn default_output(&self) -> PathBuf {
        match self {
            Self::Episodes => ["docs", self.file_name()].iter().collect(),
            Self::Wine | Self::Beer => ["docs", "tasting", self.file_name()].iter().collect(),
        }
    }

    fn file_name(&self) -> &'static str {
        match self {
            Self::Episodes => "prosto-kuhnya.md",
            Self::Wine => "wine.md",
            Self::Beer => "beer.md",
        }
    }

    /// Plural nouns for the outer and inner records, used in summaries.
    pub fn nouns(&self) -> (&'static str, Option<&'static str>) {
        match self {
            Self::Episodes => ("episodes", None),
            Self::Wine => ("styles", Some("wines")),
            Self::Beer => ("styles", Some("beers")),
        }
    }
}

impl FromStr for PageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_ref() {
            "episodes" | "prosto-kuhnya" => Self::Episodes,
            "wine" => Self::Wine,
            "beer" => Self::Beer,
            _ => return Err(Error::UnknownPage(s.to_string())),
        })
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Episodes => "episodes",
                Self::Wine => "wine",
                Self::Beer => "beer",
            }
        )
    }
}
