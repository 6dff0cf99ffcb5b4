use std::{fmt, fs, path::PathBuf};

use eyre::{Result, WrapErr};
use log::{debug, info};

use crate::fs::write_output;
use crate::page::SourceFormat;
use crate::{
    Config, Context, Error, GroupingIndex, JsonSource, PageKind, RecordSource, Renderer,
    SqliteSource,
};

/// What rendering a single page produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub page: PageKind,
    pub output: PathBuf,
    /// Number of records iterated by the page's outer loop.
    pub outer_count: usize,
    /// Number of grouped records, for pages with a nested loop.
    pub inner_count: Option<usize>,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (outer, inner) = self.page.nouns();
        write!(
            f,
            "Wrote {} ({} {}",
            self.output.display(),
            self.outer_count,
            outer
        )?;
        if let (Some(count), Some(noun)) = (self.inner_count, inner) {
            write!(f, ", {} {}", count, noun)?;
        }
        write!(f, ")")
    }
}

/// A project brings together the configuration and the renderer needed to
/// turn source data into pages.
#[derive(Debug)]
pub struct Project {
    config: Config,
    renderer: Renderer,
}

impl Project {
    /// Constructor. Selects a template engine according to the
    /// configuration.
    pub fn new(config: Config) -> Result<Self> {
        let renderer = Renderer::new(config.engine())
            .wrap_err_with(|| format!("failed to set up \"{}\" template engine", config.engine()))?;
        Ok(Self::with_renderer(config, renderer))
    }

    pub fn with_renderer(config: Config, renderer: Renderer) -> Self {
        Self { config, renderer }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Loads everything the given page's template is rendered against.
    ///
    /// Returns the context together with the outer and inner record counts.
    pub fn load_context(&self, page: PageKind) -> Result<(Context, usize, Option<usize>), Error> {
        let data = self.config.page(page).data;
        let source: Box<dyn RecordSource> = match page.source_format() {
            SourceFormat::Json => Box::new(JsonSource::new(&data)),
            SourceFormat::Sqlite => Box::new(SqliteSource::new(&data)),
        };
        let outer = source.load(page.outer_kind())?;
        let outer_count = outer.len();
        let mut context = Context::default();
        let mut inner_count = None;
        if let (Some(inner_kind), Some(group_name)) = (page.inner_kind(), page.group_name()) {
            let items = source.load(inner_kind)?;
            let mut group = GroupingIndex::from_items(&items);
            // Every outer record must be able to find its (possibly empty)
            // group.
            group.ensure_keys(&outer);
            inner_count = Some(group.item_count());
            context = context.with_group(group_name, group);
        }
        Ok((
            context.with_collection(page.collection_name(), outer),
            outer_count,
            inner_count,
        ))
    }

    /// Renders the given page and writes it to its output path.
    ///
    /// Nothing is written unless loading and rendering both succeed.
    pub fn render_page(&self, page: PageKind) -> Result<Summary> {
        let paths = self.config.page(page);
        let (context, outer_count, inner_count) = self
            .load_context(page)
            .wrap_err_with(|| format!("failed reading {} data from {}", page, paths.data.display()))?;

        if !paths.template.is_file() {
            return Err(Error::MissingTemplate(paths.template).into());
        }
        let template = fs::read_to_string(&paths.template).map_err(|e| {
            Error::Io(
                format!("while trying to read from {}", paths.template.display()),
                e,
            )
        })?;
        debug!(
            "Rendering {} with the {} engine",
            paths.template.display(),
            self.renderer.engine_name()
        );
        let rendered = self
            .renderer
            .render(&template, &page.layout(), &context)
            .wrap_err_with(|| format!("failed rendering {} template", page))?;

        write_output(&paths.output, &rendered)?;
        let summary = Summary {
            page,
            output: paths.output,
            outer_count,
            inner_count,
        };
        info!("{}", summary);
        Ok(summary)
    }

    /// Renders the given pages in order, stopping at the first failure.
    pub fn render_all(&self, pages: &[PageKind]) -> Result<Vec<Summary>> {
        pages.iter().map(|page| self.render_page(*page)).collect()
    }
}

/// Finds the larder error underlying a report, if there is one.
pub fn root_error(report: &eyre::Report) -> Option<&Error> {
    report.chain().find_map(|e| e.downcast_ref::<Error>())
}
