//! larder renders catalogue data (cooking show episodes, wine and beer
//! tasting notes) into Markdown pages for a static documentation site.
//!
//! Records are loaded from JSON files or a SQLite database, grouped where a
//! page nests one kind of record under another, and rendered through a
//! template. Templates use a small Jinja subset: `{% for %}` loops and
//! `{{ var.field }}` placeholders. They are rendered by MiniJinja when the
//! `jinja` feature is enabled, and otherwise by a built-in interpreter that
//! understands exactly the loop shapes larder's pages use.
//!
//! This crate provides the library API. For the command line interface, see
//! the `larder-cli` crate.

mod collection;
mod config;
mod context;
pub mod error;
mod fs;
mod page;
mod project;
mod record;
mod source;
pub mod template;
mod value;

pub use collection::{Collection, GroupingIndex};
pub use config::{Config, ConfigFile, PageOverrides, PagePaths};
pub use context::Context;
pub use error::{Category, Error};
pub use page::{PageKind, SourceFormat};
pub use project::{root_error, Project, Summary};
pub use record::{episode_number, Field, Record, RecordKind};
pub use source::{JsonSource, RecordSource, SqliteSource};
pub use template::{
    EngineChoice, FallbackEngine, Layout, Loop, NestedLoop, Renderer, TemplateEngine,
};
pub use value::{Map, Value, ValueType};

#[cfg(feature = "jinja")]
pub use template::JinjaEngine;
