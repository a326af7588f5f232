//! Command-line contract of `courier-render`.

use std::path::{self, PathBuf};
use std::time::Duration;

use clap::Parser;
use url::Url;

use super::chrome::ChromeSettings;
use super::overlay::PageOverlay;
use super::ready::PollSettings;
use super::RenderRequest;
use crate::error::WorkerError;
use crate::geometry::{Orientation, PaperGeometry};

/// Render staged HTML to PDF with headless Chrome.
///
/// Flags come first; the positional arguments are the ones `courier`
/// passes, in order.
#[derive(Debug, Parser)]
#[command(name = "courier-render", version)]
pub struct RenderArgs {
    /// Chrome/Chromium executable (default: auto-detect).
    #[arg(long, env = "COURIER_CHROME_PATH")]
    pub chrome: Option<PathBuf>,

    /// Launch Chrome without its sandbox (needed in most containers).
    #[arg(long)]
    pub no_sandbox: bool,

    /// Pause between `document.readyState` polls.
    #[arg(long, default_value_t = 50)]
    pub poll_interval_ms: u64,

    /// Give up after this many polls.
    #[arg(long, default_value_t = 600)]
    pub max_polls: u32,

    /// PDF file to write.
    pub output: PathBuf,
    /// Main document (path or URL).
    pub content: String,
    /// Header HTML file.
    pub header: String,
    /// Footer HTML file.
    pub footer: String,
    /// `portrait` or `landscape`.
    pub orientation: Orientation,
    pub header_height: String,
    pub footer_height: String,
    /// Named paper format; empty to size the page from DPI.
    pub paper_format: String,
    pub dpi: u32,
    /// Settle time after the document is complete, in milliseconds.
    pub wait_ms: u64,
}

impl RenderArgs {
    /// Validate the arguments before any browser is launched.
    pub fn request(&self) -> Result<RenderRequest, WorkerError> {
        self.geometry().paper_size_in()?;
        Ok(RenderRequest {
            output: self.output.clone(),
            document_url: document_url(&self.content)?,
            header: PageOverlay::header(&self.header),
            footer: PageOverlay::footer(&self.footer),
            geometry: self.geometry(),
            header_height: self.header_height.parse()?,
            footer_height: self.footer_height.parse()?,
            wait: Duration::from_millis(self.wait_ms),
        })
    }

    pub fn geometry(&self) -> PaperGeometry {
        PaperGeometry::resolve(Some(&self.paper_format), self.orientation, self.dpi)
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            interval: Duration::from_millis(self.poll_interval_ms),
            max_polls: self.max_polls.max(1),
        }
    }

    pub fn chrome_settings(&self) -> ChromeSettings {
        ChromeSettings {
            executable: self.chrome.clone(),
            sandbox: !self.no_sandbox,
            window_size: self.geometry().viewport(),
        }
    }
}

/// URL for the main document; bare paths become absolute `file://` URLs.
pub fn document_url(location: &str) -> Result<String, WorkerError> {
    if location.contains("://") {
        return Ok(location.to_string());
    }
    let invalid = || WorkerError::InvalidLocation(location.to_string());
    let absolute = path::absolute(location).map_err(|_| invalid())?;
    Url::from_file_path(&absolute)
        .map(String::from)
        .map_err(|_| invalid())
}
