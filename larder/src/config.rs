//! Configuration-related functionality for larder.
//!
//! Settings come from three layers, each overriding the one before it: the
//! built-in defaults for every [`PageKind`], an optional configuration file
//! in the project root, and explicit overrides (usually from the command
//! line). Relative paths are resolved against the project root.

use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

use log::debug;
use serde::Deserialize;

use crate::fs::maybe_canonicalize;
use crate::{EngineChoice, Error, Map, PageKind};

/// Files looked for in the project root when no configuration file is given
/// explicitly.
pub const CONFIG_FILE_NAMES: &[&str] = &["larder.yml", "larder.yaml", "larder.json"];

/// Default database file, relative to the project root.
pub const DEFAULT_DATABASE: &str = "potyk-food.db";

/// The on-disk shape of a configuration file. All fields are optional.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub database: Option<PathBuf>,
    pub engine: Option<EngineChoice>,
    pub pages: Map<PageKind, PageOverrides>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageOverrides {
    pub data: Option<PathBuf>,
    pub template: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

impl ConfigFile {
    /// Loads a configuration file, choosing the format from its extension.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Io(format!("while trying to read from {}", path.display()), e))?;
        match path.extension().and_then(OsStr::to_str) {
            Some("yml") | Some("yaml") => Ok(serde_yaml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            _ => Err(Error::UnsupportedFileType(path.to_path_buf())),
        }
    }
}

/// Resolved paths for a single page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePaths {
    /// The page's data file. For SQLite-backed pages this is the database.
    pub data: PathBuf,
    pub template: PathBuf,
    pub output: PathBuf,
}

/// Fully resolved larder configuration.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    engine: EngineChoice,
    database: PathBuf,
    pages: Map<PageKind, PageOverrides>,
}

impl Config {
    /// Default configuration for a project rooted at `root`.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            database: root.join(DEFAULT_DATABASE),
            root,
            engine: EngineChoice::default(),
            pages: Map::new(),
        }
    }

    /// Loads configuration for the project rooted at `root`, from
    /// `config_file` if given, or else from the first of
    /// [`CONFIG_FILE_NAMES`] present in the root.
    pub fn load<P: AsRef<Path>>(root: P, config_file: Option<&Path>) -> Result<Self, Error> {
        let root = root.as_ref();
        let config = Self::new(root);
        let path = match config_file {
            Some(path) => match maybe_canonicalize(root.join(path))? {
                Some(p) => p,
                None => {
                    return Err(Error::MissingInput(format!(
                        "config file not found: {}",
                        path.display()
                    )))
                }
            },
            None => match find_config_file(root)? {
                Some(p) => p,
                None => {
                    debug!("No configuration file found in {}", root.display());
                    return Ok(config);
                }
            },
        };
        debug!("Loading configuration from {}", path.display());
        Ok(config.merge(ConfigFile::load(&path)?))
    }

    /// Applies the settings from a configuration file on top of this
    /// configuration.
    pub fn merge(mut self, file: ConfigFile) -> Self {
        if let Some(database) = file.database {
            self.database = self.root.join(database);
        }
        if let Some(engine) = file.engine {
            self.engine = engine;
        }
        for (page, overrides) in file.pages {
            let entry = self.pages.entry(page).or_default();
            if overrides.data.is_some() {
                entry.data = overrides.data;
            }
            if overrides.template.is_some() {
                entry.template = overrides.template;
            }
            if overrides.output.is_some() {
                entry.output = overrides.output;
            }
        }
        self
    }

    pub fn with_database<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.database = self.root.join(path);
        self
    }

    pub fn with_engine(mut self, engine: EngineChoice) -> Self {
        self.engine = engine;
        self
    }

    /// Overrides the data file of a single page.
    pub fn with_data<P: AsRef<Path>>(mut self, page: PageKind, path: P) -> Self {
        self.pages.entry(page).or_default().data = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_template<P: AsRef<Path>>(mut self, page: PageKind, path: P) -> Self {
        self.pages.entry(page).or_default().template = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_output<P: AsRef<Path>>(mut self, page: PageKind, path: P) -> Self {
        self.pages.entry(page).or_default().output = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn engine(&self) -> EngineChoice {
        self.engine
    }

    pub fn database(&self) -> &Path {
        &self.database
    }

    /// Resolves the paths for the given page.
    pub fn page(&self, page: PageKind) -> PagePaths {
        let overrides = self.pages.get(&page);
        let pick = |f: fn(&PageOverrides) -> Option<&PathBuf>| overrides.and_then(f).cloned();
        let data = match pick(|o| o.data.as_ref()).or_else(|| page.default_data()) {
            Some(data) => self.root.join(data),
            None => self.database.clone(),
        };
        PagePaths {
            data,
            template: self
                .root
                .join(pick(|o| o.template.as_ref()).unwrap_or_else(|| page.default_template())),
            output: self
                .root
                .join(pick(|o| o.output.as_ref()).unwrap_or_else(|| page.default_output())),
        }
    }
}

fn find_config_file(root: &Path) -> Result<Option<PathBuf>, Error> {
    for name in CONFIG_FILE_NAMES {
        if let Some(path) = maybe_canonicalize(root.join(name))? {
            return Ok(Some(path));
        }
    }
    Ok(None)
}
