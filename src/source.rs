//! HTML sources – anything that can render itself to a string, possibly
//! failing.
//!
//! Plain strings, closures, files and [`Template`](crate::templates::Template)s
//! all sit behind the one [`HtmlSource`] trait, so the orchestrator forces the
//! conversion at a single point and turns failures into job errors.

use std::borrow::Cow;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use crate::error::{CourierError, DocumentPart, SourceError};

/// Something that renders to an HTML string.
pub trait HtmlSource {
    fn render_html(&self) -> Result<String, SourceError>;
}

impl HtmlSource for str {
    fn render_html(&self) -> Result<String, SourceError> {
        Ok(self.to_owned())
    }
}

impl HtmlSource for String {
    fn render_html(&self) -> Result<String, SourceError> {
        Ok(self.clone())
    }
}

impl HtmlSource for Cow<'_, str> {
    fn render_html(&self) -> Result<String, SourceError> {
        Ok(self.clone().into_owned())
    }
}

impl<T: HtmlSource + ?Sized> HtmlSource for &T {
    fn render_html(&self) -> Result<String, SourceError> {
        (**self).render_html()
    }
}

impl<T: HtmlSource + ?Sized> HtmlSource for Box<T> {
    fn render_html(&self) -> Result<String, SourceError> {
        (**self).render_html()
    }
}

/// A source backed by a closure. See [`from_fn`].
pub struct FnSource<F>(F);

/// Wrap a closure as an [`HtmlSource`]; it runs when the job is produced.
pub fn from_fn<F, E>(f: F) -> FnSource<F>
where
    F: Fn() -> Result<String, E>,
    E: Into<SourceError>,
{
    FnSource(f)
}

impl<F, E> HtmlSource for FnSource<F>
where
    F: Fn() -> Result<String, E>,
    E: Into<SourceError>,
{
    fn render_html(&self) -> Result<String, SourceError> {
        (self.0)().map_err(Into::into)
    }
}

/// An HTML file read only when the job runs.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HtmlSource for FileSource {
    fn render_html(&self) -> Result<String, SourceError> {
        fs::read_to_string(&self.path)
            .map_err(|e| format!("cannot read {}: {e}", self.path.display()).into())
    }
}

/// Force a source to a string. Errors and panics raised by the source both
/// come back as [`CourierError::Conversion`].
pub(crate) fn resolve<S>(part: DocumentPart, source: &S) -> Result<String, CourierError>
where
    S: HtmlSource + ?Sized,
{
    let rendered = panic::catch_unwind(AssertUnwindSafe(|| source.render_html()));
    match rendered {
        Ok(Ok(html)) => Ok(html),
        Ok(Err(source)) => Err(CourierError::Conversion { part, source }),
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "source panicked".to_string());
            Err(CourierError::Conversion {
                part,
                source: message.into(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_strings_render_as_is() {
        assert_eq!("<p>hi</p>".render_html().unwrap(), "<p>hi</p>");
        assert_eq!(String::from("x").render_html().unwrap(), "x");
    }

    #[test]
    fn closure_errors_become_conversion_errors() {
        let source = from_fn(|| Err::<String, _>("view blew up"));
        let err = resolve(DocumentPart::Header, &source).unwrap_err();
        match err {
            CourierError::Conversion { part, source } => {
                assert_eq!(part, DocumentPart::Header);
                assert_eq!(source.to_string(), "view blew up");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn panicking_source_is_contained() {
        let source = from_fn(|| -> Result<String, SourceError> { panic!("bad template") });
        let err = resolve(DocumentPart::Content, &source).unwrap_err();
        assert!(err.to_string().contains("bad template"), "{err}");
    }

    #[test]
    fn missing_file_fails_lazily() {
        let source = FileSource::new("/definitely/not/here.html");
        let err = resolve(DocumentPart::Content, &source).unwrap_err();
        assert!(matches!(err, CourierError::Conversion { .. }));
    }
}
