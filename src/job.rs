//! Render jobs – the per-request half of the configuration.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CourierError, DocumentPart};
use crate::geometry::{Orientation, PaperGeometry};
use crate::html::inject_base_tag;
use crate::source::{resolve, HtmlSource};

/// Per-job page settings passed to the render worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageOptions {
    pub orientation: Orientation,
    /// CSS length of the header band (default `1cm`).
    pub header_height: String,
    /// CSS length of the footer band (default `1cm`).
    pub footer_height: String,
    pub dpi: u32,
    /// Named paper format; when set, `dpi` no longer sizes the page.
    pub paper_format: Option<String>,
    /// Extra settle time after the document reports `complete`.
    pub wait_ms: u64,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            orientation: Orientation::Portrait,
            header_height: "1cm".to_string(),
            footer_height: "1cm".to_string(),
            dpi: 72,
            paper_format: None,
            wait_ms: 100,
        }
    }
}

impl PageOptions {
    pub fn wait(&self) -> Duration {
        Duration::from_millis(self.wait_ms)
    }

    pub fn geometry(&self) -> PaperGeometry {
        PaperGeometry::resolve(self.paper_format.as_deref(), self.orientation, self.dpi)
    }
}

type BoxedSource<'a> = Box<dyn HtmlSource + Send + 'a>;

/// One request to produce a single PDF.
pub struct RenderJob<'a> {
    content: BoxedSource<'a>,
    header: Option<BoxedSource<'a>>,
    footer: Option<BoxedSource<'a>>,
    page: PageOptions,
}

impl fmt::Debug for RenderJob<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderJob")
            .field("header", &self.header.is_some())
            .field("footer", &self.footer.is_some())
            .field("page", &self.page)
            .finish_non_exhaustive()
    }
}

impl<'a> RenderJob<'a> {
    pub fn new(content: impl HtmlSource + Send + 'a) -> Self {
        Self {
            content: Box::new(content),
            header: None,
            footer: None,
            page: PageOptions::default(),
        }
    }

    pub fn header(mut self, header: impl HtmlSource + Send + 'a) -> Self {
        self.header = Some(Box::new(header));
        self
    }

    /// Footer HTML; `__PAGE_NUM__` and `__NUM_PAGES__` are substituted per page.
    pub fn footer(mut self, footer: impl HtmlSource + Send + 'a) -> Self {
        self.footer = Some(Box::new(footer));
        self
    }

    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.page.orientation = orientation;
        self
    }

    pub fn header_height(mut self, height: impl Into<String>) -> Self {
        self.page.header_height = height.into();
        self
    }

    pub fn footer_height(mut self, height: impl Into<String>) -> Self {
        self.page.footer_height = height.into();
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.page.dpi = dpi;
        self
    }

    pub fn paper_format(mut self, format: impl Into<String>) -> Self {
        self.page.paper_format = Some(format.into());
        self
    }

    pub fn wait(mut self, wait: Duration) -> Self {
        self.page.wait_ms = wait.as_millis().min(u128::from(u64::MAX)) as u64;
        self
    }

    pub fn page_options(mut self, page: PageOptions) -> Self {
        self.page = page;
        self
    }

    pub fn page(&self) -> &PageOptions {
        &self.page
    }

    /// Force every source to a string. Absent header/footer become empty.
    pub(crate) fn resolve(&self) -> Result<StagedHtml, CourierError> {
        let optional = |part, source: &Option<BoxedSource<'a>>| match source {
            Some(source) => resolve(part, source.as_ref()),
            None => Ok(String::new()),
        };

        Ok(StagedHtml {
            header: optional(DocumentPart::Header, &self.header)?,
            footer: optional(DocumentPart::Footer, &self.footer)?,
            content: resolve(DocumentPart::Content, self.content.as_ref())?,
        })
    }
}

/// Serialisable job description, used by the FFI layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobSpec {
    pub content: String,
    #[serde(default)]
    pub header: Option<String>,
    #[serde(default)]
    pub footer: Option<String>,
    #[serde(flatten)]
    pub page: PageOptions,
}

impl From<JobSpec> for RenderJob<'static> {
    fn from(spec: JobSpec) -> Self {
        let mut job = RenderJob::new(spec.content).page_options(spec.page);
        if let Some(header) = spec.header {
            job = job.header(header);
        }
        if let Some(footer) = spec.footer {
            job = job.footer(footer);
        }
        job
    }
}

/// Fully rendered HTML, ready to be written to the storage directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagedHtml {
    pub header: String,
    pub footer: String,
    pub content: String,
}

impl StagedHtml {
    pub fn with_base_url(self, base_url: &str) -> Self {
        Self {
            header: inject_base_tag(&self.header, base_url),
            footer: inject_base_tag(&self.footer, base_url),
            content: inject_base_tag(&self.content, base_url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::from_fn;

    #[test]
    fn defaults_match_documented_values() {
        let page = PageOptions::default();
        assert_eq!(page.orientation, Orientation::Portrait);
        assert_eq!(page.header_height, "1cm");
        assert_eq!(page.footer_height, "1cm");
        assert_eq!(page.dpi, 72);
        assert_eq!(page.paper_format, None);
        assert_eq!(page.wait(), Duration::from_millis(100));
    }

    #[test]
    fn missing_header_and_footer_resolve_empty() {
        let staged = RenderJob::new("<p>body</p>").resolve().unwrap();
        assert_eq!(staged.header, "");
        assert_eq!(staged.footer, "");
        assert_eq!(staged.content, "<p>body</p>");
    }

    #[test]
    fn failing_footer_is_reported_as_footer() {
        let job = RenderJob::new("<p>body</p>").footer(from_fn(|| Err::<String, _>("boom")));
        match job.resolve().unwrap_err() {
            CourierError::Conversion { part, .. } => assert_eq!(part, DocumentPart::Footer),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn base_url_applies_to_every_document() {
        let staged = StagedHtml {
            header: "<head></head>".into(),
            footer: "<p>no head</p>".into(),
            content: "<html><head></head></html>".into(),
        }
        .with_base_url("https://cdn.example/");
        assert_eq!(staged.header, "<head><base href=\"https://cdn.example/\"></head>");
        assert_eq!(staged.footer, "<p>no head</p>");
        assert!(staged.content.contains("<head><base href=\"https://cdn.example/\">"));
    }

    #[test]
    fn job_spec_deserialises_with_defaults() {
        let spec: JobSpec = serde_json::from_str(
            r#"{"content": "<p>x</p>", "footer": "__PAGE_NUM__", "orientation": "landscape"}"#,
        )
        .unwrap();
        assert_eq!(spec.page.orientation, Orientation::Landscape);
        assert_eq!(spec.page.dpi, 72);
        let job: RenderJob<'static> = spec.into();
        let staged = job.resolve().unwrap();
        assert_eq!(staged.footer, "__PAGE_NUM__");
    }
}
