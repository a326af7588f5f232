//! # pdf-courier – HTML → PDF through an external headless renderer
//!
//! This crate stages HTML documents on disk, runs a renderer process over
//! them and hands back the finished PDF. The stages of one
//! [`PdfGenerator::produce`] call are:
//!
//! 1. **Validate** – the storage directory must exist and be writable ([`staging`])
//! 2. **Resolve** – force every [`HtmlSource`] to a string ([`source`], [`templates`])
//! 3. **Stage** – inject `<base href>` and write the HTML files ([`html`], [`staging`])
//! 4. **Render** – run the renderer with a timeout ([`command`], [`process`])
//! 5. **Promote** – clean up the HTML and move the PDF into place
//!
//! The renderer itself lives in [`worker`] and ships as the `courier-render`
//! binary, which drives headless Chrome. A C-compatible FFI surface is
//! exposed via the [`ffi`] module.

pub mod command;
pub mod config;
pub mod error;
pub mod ffi;
pub mod generator;
pub mod geometry;
pub mod html;
pub mod job;
pub mod process;
pub mod source;
pub mod staging;
pub mod templates;
pub mod worker;

// Re-exports for convenience
pub use config::GeneratorConfig;
pub use error::{CourierError, DocumentPart, Result, WorkerError};
pub use generator::PdfGenerator;
pub use geometry::{Orientation, PaperGeometry};
pub use job::{JobSpec, PageOptions, RenderJob};
pub use source::{from_fn, FileSource, HtmlSource};
pub use templates::Template;
