//! Render worker – the `courier-render` side of the process boundary.
//!
//! A [`RenderSession`] walks one document through
//! `Loading → ReadyStatePolling → DocumentComplete → Rendering → Done`
//! (or `Aborted`) against any [`RenderEngine`]; [`chrome::ChromeEngine`] is
//! the production engine.

pub mod args;
pub mod chrome;
pub mod overlay;
pub mod ready;

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::WorkerError;
use crate::geometry::{CssLength, PaperGeometry};
use overlay::PageOverlay;
use ready::{wait_until_complete, CancelToken, PollSettings, ReadyState};

/// Page margin around the printable area, in centimetres.
pub const PAGE_MARGIN_CM: f64 = 0.3;

/// Everything the worker needs to produce one PDF.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub output: PathBuf,
    /// URL of the main document.
    pub document_url: String,
    pub header: PageOverlay,
    pub footer: PageOverlay,
    pub geometry: PaperGeometry,
    pub header_height: CssLength,
    pub footer_height: CssLength,
    /// Settle time after the document reports `complete`.
    pub wait: Duration,
}

impl RenderRequest {
    /// Paper size and margins for the print call.
    pub fn print_layout(&self) -> Result<PrintLayout<'_>, WorkerError> {
        let (paper_width_in, paper_height_in, landscape) = self.geometry.paper_size_in()?;
        let margin = CssLength::from_inches(PAGE_MARGIN_CM / 2.54);
        Ok(PrintLayout {
            paper_width_in,
            paper_height_in,
            landscape,
            margin_top_in: (margin + self.header_height).inches(),
            margin_bottom_in: (margin + self.footer_height).inches(),
            margin_side_in: margin.inches(),
            header: &self.header,
            footer: &self.footer,
        })
    }
}

/// Resolved page setup handed to [`RenderEngine::print_pdf`].
#[derive(Debug, Clone)]
pub struct PrintLayout<'a> {
    pub paper_width_in: f64,
    pub paper_height_in: f64,
    pub landscape: bool,
    pub margin_top_in: f64,
    pub margin_bottom_in: f64,
    pub margin_side_in: f64,
    pub header: &'a PageOverlay,
    pub footer: &'a PageOverlay,
}

/// A headless browser able to load a page and print it.
pub trait RenderEngine {
    /// Navigate to `url` and wait for its load event.
    fn load(&mut self, url: &str) -> anyhow::Result<()>;

    fn ready_state(&mut self) -> anyhow::Result<ReadyState>;

    /// Print the loaded page. The engine calls the overlays once per page.
    fn print_pdf(&mut self, layout: &PrintLayout<'_>) -> anyhow::Result<Vec<u8>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPhase {
    Loading,
    ReadyStatePolling,
    DocumentComplete,
    Rendering,
    Done,
    Aborted,
}

/// Drives one [`RenderRequest`] through an engine.
pub struct RenderSession<'r> {
    request: &'r RenderRequest,
    poll: PollSettings,
    cancel: CancelToken,
    phase: RenderPhase,
}

impl<'r> RenderSession<'r> {
    pub fn new(request: &'r RenderRequest, poll: PollSettings, cancel: CancelToken) -> Self {
        Self {
            request,
            poll,
            cancel,
            phase: RenderPhase::Loading,
        }
    }

    pub fn phase(&self) -> RenderPhase {
        self.phase
    }

    pub fn run<E: RenderEngine>(&mut self, engine: &mut E) -> Result<(), WorkerError> {
        let result = self.advance(engine);
        if result.is_err() {
            self.enter(RenderPhase::Aborted);
        }
        result
    }

    fn advance<E: RenderEngine>(&mut self, engine: &mut E) -> Result<(), WorkerError> {
        let request = self.request;
        let layout = request.print_layout()?;

        self.enter(RenderPhase::Loading);
        engine
            .load(&request.document_url)
            .map_err(|source| WorkerError::Load {
                url: request.document_url.clone(),
                source,
            })?;

        self.enter(RenderPhase::ReadyStatePolling);
        let polls = wait_until_complete(
            || engine.ready_state().map_err(WorkerError::Engine),
            self.poll,
            &self.cancel,
        )?;
        log::debug!("Document complete after {polls} polls");

        self.enter(RenderPhase::DocumentComplete);
        if self.cancel.wait(request.wait) {
            return Err(WorkerError::Cancelled);
        }

        self.enter(RenderPhase::Rendering);
        let pdf = engine.print_pdf(&layout)?;
        fs::write(&request.output, &pdf).map_err(|source| WorkerError::Write {
            path: request.output.clone(),
            source,
        })?;

        self.enter(RenderPhase::Done);
        log::info!("Wrote {} ({} bytes)", request.output.display(), pdf.len());
        Ok(())
    }

    fn enter(&mut self, phase: RenderPhase) {
        log::debug!("{:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }
}
