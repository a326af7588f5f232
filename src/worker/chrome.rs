//! Headless Chrome engine, driven over the DevTools protocol.

use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::Value;

use super::ready::ReadyState;
use super::{PrintLayout, RenderEngine};

/// Chrome fills these elements with the page number / page count of each
/// printed page, so overlays are rendered once with them in place of the
/// numbers.
pub const PAGE_NUMBER_MARKER: &str = r#"<span class="pageNumber"></span>"#;
pub const TOTAL_PAGES_MARKER: &str = r#"<span class="totalPages"></span>"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromeSettings {
    /// Browser executable; `None` lets headless_chrome locate one.
    pub executable: Option<PathBuf>,
    pub sandbox: bool,
    /// Window size in CSS pixels, for DPI-derived viewports.
    pub window_size: Option<(u32, u32)>,
}

impl Default for ChromeSettings {
    fn default() -> Self {
        Self {
            executable: None,
            sandbox: true,
            window_size: None,
        }
    }
}

pub struct ChromeEngine {
    // Dropping the browser shuts Chrome down.
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeEngine {
    pub fn launch(settings: &ChromeSettings) -> anyhow::Result<Self> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(settings.sandbox)
            .path(settings.executable.clone())
            .window_size(settings.window_size)
            .args(vec![OsStr::new("--hide-scrollbars")])
            .build()
            .map_err(|e| anyhow!("invalid Chrome launch options: {e}"))?;

        let browser = Browser::new(options).context("failed to launch Chrome")?;
        let tab = browser.new_tab().context("failed to open a Chrome tab")?;
        Ok(Self {
            _browser: browser,
            tab,
        })
    }
}

impl RenderEngine for ChromeEngine {
    fn load(&mut self, url: &str) -> anyhow::Result<()> {
        self.tab.navigate_to(url)?.wait_until_navigated()?;
        Ok(())
    }

    fn ready_state(&mut self) -> anyhow::Result<ReadyState> {
        let result = self.tab.evaluate("document.readyState", false)?;
        match result.value {
            Some(Value::String(state)) => Ok(state.parse()?),
            other => Err(anyhow!("unexpected document.readyState value {other:?}")),
        }
    }

    fn print_pdf(&mut self, layout: &PrintLayout<'_>) -> anyhow::Result<Vec<u8>> {
        let header = layout.header.contents(PAGE_NUMBER_MARKER, TOTAL_PAGES_MARKER);
        let footer = layout.footer.contents(PAGE_NUMBER_MARKER, TOTAL_PAGES_MARKER);

        let options = PrintToPdfOptions {
            landscape: Some(layout.landscape),
            display_header_footer: Some(true),
            print_background: Some(true),
            scale: Some(1.0),
            paper_width: Some(layout.paper_width_in),
            paper_height: Some(layout.paper_height_in),
            margin_top: Some(layout.margin_top_in),
            margin_bottom: Some(layout.margin_bottom_in),
            margin_left: Some(layout.margin_side_in),
            margin_right: Some(layout.margin_side_in),
            header_template: Some(band_template(&header, layout.margin_side_in)),
            footer_template: Some(band_template(&footer, layout.margin_side_in)),
            ..Default::default()
        };
        self.tab.print_to_pdf(Some(options))
    }
}

/// Wrap overlay HTML for Chrome's header/footer slots.
///
/// Chrome prints its own date/title band for an empty template and renders
/// template text at a near-invisible default size, so both are pinned here.
fn band_template(html: &str, side_margin_in: f64) -> String {
    if html.trim().is_empty() {
        return "<span></span>".to_string();
    }
    format!(
        "<div style=\"width: 100%; font-size: 10px; margin: 0 {side_margin_in:.3}in;\">{html}</div>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::overlay::default_footer;

    #[test]
    fn empty_band_suppresses_chrome_default() {
        assert_eq!(band_template("  ", 0.1), "<span></span>");
    }

    #[test]
    fn default_footer_uses_chrome_markers() {
        let html = band_template(&default_footer(PAGE_NUMBER_MARKER, TOTAL_PAGES_MARKER), 0.118);
        assert!(html.contains(
            "<small><span class=\"pageNumber\"></span>/<span class=\"totalPages\"></span></small>"
        ));
        assert!(html.contains("margin: 0 0.118in"));
    }
}
