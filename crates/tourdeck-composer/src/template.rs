//! Plain-text document templates.
//!
//! Templates are loaded by name from a directory, carry `{{field}}`
//! placeholders, and may contain one repeating `{{#stops}}...{{/stops}}`
//! block that is expanded once per stop. Inside the block, stop fields
//! shadow global fields. Any placeholder without a value fails the render;
//! optional values are resolved to empty strings before rendering.

use crate::ComposeError;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const BLOCK_OPEN: &str = "{{#stops}}";
const BLOCK_CLOSE: &str = "{{/stops}}";

/// Loads named templates from a directory. A template `name` maps to the
/// file `{dir}/{name}.tpl`.
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        TemplateStore { dir: dir.into() }
    }

    pub fn load(&self, name: &str) -> Result<DocumentTemplate, ComposeError> {
        let path = self.dir.join(format!("{name}.tpl"));
        let text = std::fs::read_to_string(&path).map_err(|source| ComposeError::TemplateLoad {
            name: name.to_string(),
            source,
        })?;
        tracing::debug!(name = name, path = %path.display(), "template loaded");
        Ok(DocumentTemplate { text })
    }
}

/// Values for one render: global fields plus one field map per stop.
#[derive(Debug, Default)]
pub struct RenderContext {
    pub globals: HashMap<String, String>,
    pub stops: Vec<HashMap<String, String>>,
}

/// A parsed template, ready to render against a [`RenderContext`].
#[derive(Debug)]
pub struct DocumentTemplate {
    text: String,
}

impl DocumentTemplate {
    pub fn from_str(text: impl Into<String>) -> Self {
        DocumentTemplate { text: text.into() }
    }

    /// Expand the stops block and substitute every placeholder. Fails with
    /// [`ComposeError::MissingField`] on the first placeholder that has no
    /// value in scope.
    pub fn render(&self, ctx: &RenderContext) -> Result<String, ComposeError> {
        let placeholder = Regex::new(r"\{\{([A-Za-z0-9_.-]+)\}\}").expect("valid regex");

        let mut out = String::with_capacity(self.text.len());
        match self.text.find(BLOCK_OPEN) {
            Some(open) => {
                let after_open = open + BLOCK_OPEN.len();
                let close = self.text[after_open..]
                    .find(BLOCK_CLOSE)
                    .map(|i| after_open + i)
                    .ok_or_else(|| {
                        ComposeError::TemplateSyntax(format!("{BLOCK_OPEN} without {BLOCK_CLOSE}"))
                    })?;

                // The block body, once per stop; stop fields shadow globals.
                let body = strip_block_newlines(&self.text[after_open..close]);
                substitute(
                    &self.text[..open],
                    &placeholder,
                    |key| ctx.globals.get(key).cloned(),
                    &mut out,
                )?;
                for stop in &ctx.stops {
                    substitute(
                        body,
                        &placeholder,
                        |key| stop.get(key).or_else(|| ctx.globals.get(key)).cloned(),
                        &mut out,
                    )?;
                }
                substitute(
                    &self.text[close + BLOCK_CLOSE.len()..],
                    &placeholder,
                    |key| ctx.globals.get(key).cloned(),
                    &mut out,
                )?;
            }
            None => {
                substitute(
                    &self.text,
                    &placeholder,
                    |key| ctx.globals.get(key).cloned(),
                    &mut out,
                )?;
            }
        }
        Ok(out)
    }
}

/// The block markers sit on their own lines; drop the newline that follows
/// the opening marker so repeated bodies do not accumulate blank lines.
fn strip_block_newlines(body: &str) -> &str {
    body.strip_prefix('\n').unwrap_or(body)
}

fn substitute<F>(
    text: &str,
    placeholder: &Regex,
    lookup: F,
    out: &mut String,
) -> Result<(), ComposeError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut last = 0;
    for caps in placeholder.captures_iter(text) {
        let whole = caps.get(0).expect("match");
        let key = &caps[1];
        let value = lookup(key).ok_or_else(|| ComposeError::MissingField(key.to_string()))?;
        out.push_str(&text[last..whole.start()]);
        out.push_str(&value);
        last = whole.end();
    }
    out.push_str(&text[last..]);
    Ok(())
}
