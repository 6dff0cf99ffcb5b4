//! Jinja-compatible rendering backed by [MiniJinja](https://docs.rs/minijinja).

use minijinja::{AutoEscape, Environment, Value};

use crate::{Context, Error};

use super::{Layout, TemplateEngine};

/// Full template engine configured for Markdown output: nothing is escaped,
/// block tags do not leave blank lines behind, and a trailing newline in the
/// template is kept.
pub struct JinjaEngine {
    env: Environment<'static>,
}

impl JinjaEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);
        Self { env }
    }
}

impl Default for JinjaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for JinjaEngine {
    fn name(&self) -> &'static str {
        "jinja"
    }

    fn render(&self, template: &str, _layout: &Layout, context: &Context) -> Result<String, Error> {
        self.env
            .render_str(template, Value::from_serialize(context))
            .map_err(|e| Error::RenderingFailure(e.to_string()))
    }
}
