//! Header and footer providers, evaluated once per printed page.

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use url::Url;

/// Replaced by the current 1-based page number in footer HTML.
pub const PAGE_NUM_TOKEN: &str = "__PAGE_NUM__";
/// Replaced by the total page count in footer HTML.
pub const NUM_PAGES_TOKEN: &str = "__NUM_PAGES__";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Band {
    Header,
    Footer,
}

/// A header or footer band backed by a staged HTML file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOverlay {
    band: Band,
    path: PathBuf,
}

impl PageOverlay {
    /// Header band: the file's contents verbatim, or nothing.
    pub fn header(location: &str) -> Self {
        Self {
            band: Band::Header,
            path: local_path(location),
        }
    }

    /// Footer band: the file's contents with page tokens substituted, or a
    /// centred `page/total` indicator when the file is empty or unreadable.
    pub fn footer(location: &str) -> Self {
        Self {
            band: Band::Footer,
            path: local_path(location),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// HTML for one page. The file is re-read on every call.
    pub fn contents(&self, page_num: impl Display, num_pages: impl Display) -> String {
        let html = fs::read_to_string(&self.path).unwrap_or_default();
        match self.band {
            Band::Header => html,
            Band::Footer if html.is_empty() => default_footer(page_num, num_pages),
            Band::Footer => html
                .replace(PAGE_NUM_TOKEN, &page_num.to_string())
                .replace(NUM_PAGES_TOKEN, &num_pages.to_string()),
        }
    }
}

/// The footer used when no footer HTML was supplied.
pub fn default_footer(page_num: impl Display, num_pages: impl Display) -> String {
    format!("<div style=\"text-align: center;\"><small>{page_num}/{num_pages}</small></div>")
}

/// Turn a path argument, possibly carrying a `file://` scheme, into a
/// filesystem path.
pub fn local_path(location: &str) -> PathBuf {
    if location.starts_with("file:") {
        if let Some(path) = Url::parse(location).ok().and_then(|u| u.to_file_path().ok()) {
            return path;
        }
        let stripped = location.trim_start_matches("file:").trim_start_matches('/');
        return PathBuf::from(format!("/{stripped}"));
    }
    PathBuf::from(location)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staged(dir: &tempfile::TempDir, name: &str, html: &str) -> String {
        let path = dir.path().join(name);
        fs::write(&path, html).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn footer_tokens_are_substituted() {
        let dir = tempfile::tempdir().unwrap();
        let location = staged(
            &dir,
            "footer.html",
            "<p>Page __PAGE_NUM__ of __NUM_PAGES__</p>",
        );
        let footer = PageOverlay::footer(&location);

        let pages: Vec<String> = (1..=3).map(|page| footer.contents(page, 3)).collect();
        assert_eq!(pages[0], "<p>Page 1 of 3</p>");
        assert_eq!(pages[1], "<p>Page 2 of 3</p>");
        assert_eq!(pages[2], "<p>Page 3 of 3</p>");
    }

    #[test]
    fn repeated_tokens_are_all_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let location = staged(&dir, "footer.html", "__PAGE_NUM__|__PAGE_NUM__|__NUM_PAGES__");
        assert_eq!(PageOverlay::footer(&location).contents(2, 3), "2|2|3");
    }

    #[test]
    fn missing_footer_falls_back_to_indicator() {
        let footer = PageOverlay::footer("/no/such/footer.html");
        assert_eq!(
            footer.contents(2, 3),
            "<div style=\"text-align: center;\"><small>2/3</small></div>"
        );
    }

    #[test]
    fn empty_footer_falls_back_to_indicator() {
        let dir = tempfile::tempdir().unwrap();
        let location = staged(&dir, "footer.html", "");
        assert_eq!(PageOverlay::footer(&location).contents(1, 1), default_footer(1, 1));
    }

    #[test]
    fn header_is_returned_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let location = staged(&dir, "header.html", "<h1>Report __PAGE_NUM__</h1>");
        assert_eq!(
            PageOverlay::header(&location).contents(1, 2),
            "<h1>Report __PAGE_NUM__</h1>"
        );
        assert_eq!(PageOverlay::header("/no/such/header.html").contents(1, 2), "");
    }

    #[cfg(unix)]
    #[test]
    fn file_scheme_is_stripped() {
        assert_eq!(
            local_path("file:///tmp/courier/header-1.html"),
            PathBuf::from("/tmp/courier/header-1.html")
        );
        assert_eq!(
            local_path("file:////tmp/courier/header-1.html"),
            PathBuf::from("/tmp/courier/header-1.html")
        );
        assert_eq!(local_path("/tmp/plain.html"), PathBuf::from("/tmp/plain.html"));
    }
}
