//! Template rendering.
//!
//! Two engines are available behind the [`TemplateEngine`] trait: a
//! Jinja-compatible engine (when built with the `jinja` feature) and the
//! built-in [`FallbackEngine`]. Which one is used is decided once, when a
//! [`Renderer`] is constructed.

mod block;
mod fallback;
#[cfg(feature = "jinja")]
mod jinja;
mod whitespace;

use std::{fmt, str::FromStr};

use log::{debug, warn};
use serde::Deserialize;

use crate::{Context, Error, RecordKind};

pub use block::{extract_block, Block, ENDFOR_TOKEN, FOR_TOKEN};
pub use fallback::{render as render_fallback, FallbackEngine};
pub use whitespace::trim_block_whitespace;

#[cfg(feature = "jinja")]
pub use jinja::JinjaEngine;

/// A template engine that can render a template against a data context.
pub trait TemplateEngine {
    /// A short, human-readable name for logging.
    fn name(&self) -> &'static str;

    /// Renders `template` against `context`. Engines that understand the
    /// template language fully may ignore `layout`.
    fn render(&self, template: &str, layout: &Layout, context: &Context) -> Result<String, Error>;
}

/// A `{% for <var> in <source> %}` loop over a named collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loop {
    pub var: String,
    /// The name of the collection in the rendering context.
    pub source: String,
    pub kind: RecordKind,
}

impl Loop {
    pub fn new<V, S>(var: V, source: S, kind: RecordKind) -> Self
    where
        V: AsRef<str>,
        S: AsRef<str>,
    {
        Self {
            var: var.as_ref().to_string(),
            source: source.as_ref().to_string(),
            kind,
        }
    }

    pub fn opening_tag(&self) -> String {
        opening_tag(&self.var, &self.source)
    }
}

/// A loop nested inside an outer loop, over the items a grouping index holds
/// for the current outer record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedLoop {
    pub var: String,
    /// The loop's source expression exactly as written in the template, e.g.
    /// `style_wines[style.id]`.
    pub expr: String,
    /// The name of the grouping index in the rendering context.
    pub group: String,
    /// The outer record field whose value selects the group.
    pub owner_key: String,
    pub kind: RecordKind,
}

impl NestedLoop {
    pub fn new<V, E, G>(var: V, expr: E, group: G, kind: RecordKind) -> Self
    where
        V: AsRef<str>,
        E: AsRef<str>,
        G: AsRef<str>,
    {
        Self {
            var: var.as_ref().to_string(),
            expr: expr.as_ref().to_string(),
            group: group.as_ref().to_string(),
            owner_key: "id".to_string(),
            kind,
        }
    }

    /// A loop over `<group>[<outer_var>.id]`.
    pub fn indexed<V, G, O>(var: V, group: G, outer_var: O, kind: RecordKind) -> Self
    where
        V: AsRef<str>,
        G: AsRef<str>,
        O: AsRef<str>,
    {
        let expr = format!("{}[{}.id]", group.as_ref(), outer_var.as_ref());
        Self::new(var, expr, group, kind)
    }

    pub fn opening_tag(&self) -> String {
        opening_tag(&self.var, &self.expr)
    }
}

fn opening_tag(var: &str, expr: &str) -> String {
    format!("{{% for {} in {} %}}", var, expr)
}

/// The loop structure a template kind is written against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub outer: Loop,
    pub inner: Option<NestedLoop>,
}

impl Layout {
    pub fn new<V, S>(var: V, source: S, kind: RecordKind) -> Self
    where
        V: AsRef<str>,
        S: AsRef<str>,
    {
        Self {
            outer: Loop::new(var, source, kind),
            inner: None,
        }
    }

    pub fn with_nested(mut self, nested: NestedLoop) -> Self {
        self.inner = Some(nested);
        self
    }
}

/// Which template engine to render with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineChoice {
    /// Prefer the Jinja engine, falling back to the built-in one if it is
    /// unavailable.
    Auto,
    Jinja,
    Fallback,
}

impl Default for EngineChoice {
    fn default() -> Self {
        Self::Auto
    }
}

impl FromStr for EngineChoice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_ref() {
            "auto" => Self::Auto,
            "jinja" => Self::Jinja,
            "fallback" => Self::Fallback,
            _ => return Err(Error::UnknownEngine(s.to_string())),
        })
    }
}

impl fmt::Display for EngineChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Auto => "auto",
                Self::Jinja => "jinja",
                Self::Fallback => "fallback",
            }
        )
    }
}

/// Attempts to set up the Jinja engine.
#[cfg(feature = "jinja")]
fn primary_engine() -> Result<Box<dyn TemplateEngine>, Error> {
    Ok(Box::new(JinjaEngine::new()))
}

#[cfg(not(feature = "jinja"))]
fn primary_engine() -> Result<Box<dyn TemplateEngine>, Error> {
    Err(Error::EngineUnavailable("jinja"))
}

fn fallback_engine() -> Box<dyn TemplateEngine> {
    Box::new(FallbackEngine::new().with_trim_blocks(true))
}

/// Renders templates through the engine selected at construction time.
pub struct Renderer {
    engine: Box<dyn TemplateEngine>,
}

impl Renderer {
    /// Selects an engine. Only an unavailable engine causes a switch to the
    /// fallback, and only when `choice` is [`EngineChoice::Auto`].
    pub fn new(choice: EngineChoice) -> Result<Self, Error> {
        let engine = match choice {
            EngineChoice::Jinja => primary_engine()?,
            EngineChoice::Fallback => fallback_engine(),
            EngineChoice::Auto => match primary_engine() {
                Ok(engine) => engine,
                Err(e) if e.is_engine_unavailable() => {
                    warn!("{}, using the built-in fallback renderer", e);
                    fallback_engine()
                }
                Err(e) => return Err(e),
            },
        };
        debug!("Using {} template engine", engine.name());
        Ok(Self { engine })
    }

    /// Wraps an already constructed engine.
    pub fn with_engine<E: TemplateEngine + 'static>(engine: E) -> Self {
        Self {
            engine: Box::new(engine),
        }
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    pub fn render(&self, template: &str, layout: &Layout, context: &Context) -> Result<String, Error> {
        self.engine.render(template, layout, context)
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("engine", &self.engine.name())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Collection, GroupingIndex, Record};

    #[test]
    fn derives_opening_tags() {
        let layout = Layout::new("style", "styles", RecordKind::BeerStyle)
            .with_nested(NestedLoop::indexed("beer", "style_beers", "style", RecordKind::Beer));
        assert_eq!(layout.outer.opening_tag(), "{% for style in styles %}");
        assert_eq!(
            layout.inner.unwrap().opening_tag(),
            "{% for beer in style_beers[style.id] %}"
        );
    }

    #[test]
    fn parses_engine_choice() {
        assert_eq!("AUTO".parse::<EngineChoice>().unwrap(), EngineChoice::Auto);
        assert_eq!(
            "fallback".parse::<EngineChoice>().unwrap(),
            EngineChoice::Fallback
        );
        assert!(matches!(
            "handlebars".parse::<EngineChoice>(),
            Err(Error::UnknownEngine(_))
        ));
    }

    #[test]
    fn explicit_fallback_is_always_available() {
        let renderer = Renderer::new(EngineChoice::Fallback).unwrap();
        assert_eq!(renderer.engine_name(), "fallback");
    }

    #[cfg(feature = "jinja")]
    #[test]
    fn auto_prefers_jinja() {
        assert_eq!(Renderer::new(EngineChoice::Auto).unwrap().engine_name(), "jinja");
    }

    #[cfg(not(feature = "jinja"))]
    #[test]
    fn auto_falls_back_without_jinja() {
        assert_eq!(
            Renderer::new(EngineChoice::Auto).unwrap().engine_name(),
            "fallback"
        );
        assert!(matches!(
            Renderer::new(EngineChoice::Jinja),
            Err(Error::EngineUnavailable(_))
        ));
    }

    // The engines must agree on the templates larder ships with.
    #[test]
    fn engines_agree_on_wine_layout() {
        let layout = Layout::new("style", "styles", RecordKind::WineStyle)
            .with_nested(NestedLoop::indexed("wine", "style_wines", "style", RecordKind::Wine));
        let styles = Collection::new(
            RecordKind::WineStyle,
            vec![
                Record::default()
                    .with("id", 1)
                    .with("title", "Rioja")
                    .with("country_code", "es")
                    .with("vivino_url", ""),
                Record::default()
                    .with("id", 2)
                    .with("title", "Chablis & Co")
                    .with("country_code", "fr")
                    .with("vivino_url", "https://vivino.example/c"),
            ],
        );
        let mut group = GroupingIndex::default();
        group.insert(
            1,
            vec![Record::default()
                .with("id", 10)
                .with("style_id", 1)
                .with("producer", "Marqués")
                .with("title", "Reserva")
                .with("img", "")
                .with("review", "Good <b>value</b>.")
                .with("vivino_url", "")],
        );
        group.insert(2, vec![]);
        let ctx = Context::default()
            .with_collection("styles", styles)
            .with_group("style_wines", group);
        let template = "# Wine\n\n{% for style in styles %}\n## {{ style.title }} ({{ style.country_code }})\n\n  {% for wine in style_wines[style.id] %}\n- **{{ wine.producer }}** {{ wine.title }}: {{ wine.review }}\n  {% endfor %}\n\n{% endfor %}\n";

        let fallback = Renderer::with_engine(FallbackEngine::new().with_trim_blocks(true))
            .render(template, &layout, &ctx)
            .unwrap();
        assert_eq!(
            fallback,
            "# Wine\n\n## Rioja (es)\n\n- **Marqués** Reserva: Good <b>value</b>.\n\n## Chablis & Co (fr)\n\n\n"
        );
        #[cfg(feature = "jinja")]
        {
            let jinja = Renderer::with_engine(JinjaEngine::new())
                .render(template, &layout, &ctx)
                .unwrap();
            assert_eq!(jinja, fallback);
        }
    }
}
