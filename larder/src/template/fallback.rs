//! A minimal loop-and-substitute template interpreter.
//!
//! Supports exactly the shapes described by a [`Layout`]: one outer
//! `{% for %}` loop over a named collection, optionally containing one nested
//! loop over a grouping index, and `{{ var.field }}` placeholders for the
//! fields of each loop's record kind. Placeholders must be written with a
//! single space inside each pair of braces. Anything else in the template,
//! including unrecognized tags and placeholders, is emitted verbatim.

use log::trace;

use crate::{Context, Error, Record, RecordKind};

use super::{extract_block, Layout, NestedLoop, TemplateEngine};

/// The built-in interpreter, usable when no full template engine is.
#[derive(Debug, Clone, Copy)]
pub struct FallbackEngine {
    trim_blocks: bool,
}

impl FallbackEngine {
    /// An interpreter that emits template text exactly as written.
    pub fn new() -> Self {
        Self { trim_blocks: false }
    }

    /// Whether to apply Jinja-style `lstrip_blocks` and `trim_blocks`
    /// whitespace handling before interpreting templates.
    pub fn with_trim_blocks(mut self, trim_blocks: bool) -> Self {
        self.trim_blocks = trim_blocks;
        self
    }
}

impl Default for FallbackEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for FallbackEngine {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn render(&self, template: &str, layout: &Layout, context: &Context) -> Result<String, Error> {
        if self.trim_blocks {
            render(&super::trim_block_whitespace(template), layout, context)
        } else {
            render(template, layout, context)
        }
    }
}

/// Renders `template` by repeating the outer loop's body once per record of
/// the outer collection.
pub fn render(template: &str, layout: &Layout, context: &Context) -> Result<String, Error> {
    let outer = &layout.outer;
    let opening_tag = outer.opening_tag();
    let block = extract_block(template, &opening_tag).map_err(|e| match e {
        Error::TagNotFound(tag) => {
            Error::TemplateSyntaxUnsupported(format!("template has no {} loop", tag))
        }
        e => e,
    })?;
    let collection = context.collection(&outer.source).ok_or_else(|| {
        Error::RenderingFailure(format!("no collection named \"{}\"", outer.source))
    })?;
    trace!(
        "Rendering {} {} record(s) through {}",
        collection.len(),
        outer.kind,
        opening_tag
    );

    let mut out = String::from(block.prefix(&opening_tag));
    for record in collection.iter() {
        let body = substitute(block.body, &outer.var, outer.kind, record);
        match &layout.inner {
            Some(nested) => out.push_str(&expand_nested(&body, nested, record, context)?),
            None => out.push_str(&body),
        }
    }
    out.push_str(block.post);
    Ok(out)
}

/// Expands the nested loop in one outer record's (already substituted) body.
/// A body without the nested loop is returned unchanged.
fn expand_nested(
    body: &str,
    nested: &NestedLoop,
    owner: &Record,
    context: &Context,
) -> Result<String, Error> {
    let opening_tag = nested.opening_tag();
    if !body.contains(&opening_tag) {
        return Ok(body.to_string());
    }
    let block = extract_block(body, &opening_tag)?;
    let group = context.group(&nested.group).ok_or_else(|| {
        Error::RenderingFailure(format!("no grouping index named \"{}\"", nested.group))
    })?;
    let items = owner
        .integer(&nested.owner_key)
        .map(|key| group.get(key))
        .unwrap_or(&[]);

    let mut out = String::from(block.prefix(&opening_tag));
    for item in items {
        out.push_str(&substitute(block.body, &nested.var, nested.kind, item));
    }
    out.push_str(block.post);
    Ok(out)
}

/// Replaces every `{{ var.field }}` placeholder for the fields of `kind` that
/// `record` has a value for.
fn substitute(text: &str, var: &str, kind: RecordKind, record: &Record) -> String {
    let mut out = text.to_string();
    for field in kind.fields() {
        if let Some(value) = record.get(field.name) {
            let placeholder = format!("{{{{ {}.{} }}}}", var, field.name);
            if out.contains(&placeholder) {
                out = out.replace(&placeholder, &value.to_string());
            }
        }
    }
    out
}
