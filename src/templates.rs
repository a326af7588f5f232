//! Minimal HTML templates with `{{ name }}` placeholders.
//!
//! A [`Template`] is an [`HtmlSource`] whose text is produced only when the
//! job runs. An unresolved placeholder is an error, so a broken view fails
//! the job instead of leaking `{{ ... }}` into the PDF.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use crate::error::SourceError;
use crate::source::HtmlSource;

#[derive(Debug, Clone)]
enum Body {
    Inline(String),
    File(PathBuf),
}

/// Placeholder-substituting HTML template.
#[derive(Debug, Clone)]
pub struct Template {
    body: Body,
    vars: BTreeMap<String, String>,
}

/// A placeholder had no value, or was never closed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("no value for placeholder `{0}`")]
    Unresolved(String),
    #[error("unterminated placeholder at byte {offset}")]
    Unterminated { offset: usize },
}

impl Template {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: Body::Inline(body.into()),
            vars: BTreeMap::new(),
        }
    }

    /// Template whose body is read from `path` at render time.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            body: Body::File(path.into()),
            vars: BTreeMap::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.vars.insert(name.into(), value.to_string());
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl fmt::Display) {
        self.vars.insert(name.into(), value.to_string());
    }

    /// Substitute placeholders in `text`.
    pub fn fill(&self, text: &str) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        let mut consumed = 0;

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after.find("}}").ok_or(TemplateError::Unterminated {
                offset: consumed + start,
            })?;
            let name = after[..end].trim();
            let value = self
                .vars
                .get(name)
                .ok_or_else(|| TemplateError::Unresolved(name.to_string()))?;
            out.push_str(value);

            let advance = start + 2 + end + 2;
            consumed += advance;
            rest = &rest[advance..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

impl HtmlSource for Template {
    fn render_html(&self) -> Result<String, SourceError> {
        let text = match &self.body {
            Body::Inline(s) => s.clone(),
            Body::File(path) => fs::read_to_string(path)
                .map_err(|e| format!("cannot read template {}: {e}", path.display()))?,
        };
        Ok(self.fill(&text)?)
    }
}
