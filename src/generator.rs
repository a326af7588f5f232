//! The orchestrator – stages HTML, runs the renderer, promotes the PDF.

use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::command::RenderCommand;
use crate::config::GeneratorConfig;
use crate::error::{CourierError, Result};
use crate::job::{PageOptions, RenderJob};
use crate::process;
use crate::staging::{validate_storage_dir, TempFileSet};

/// Produces PDFs through an external renderer.
///
/// The generator only holds installation-wide settings; everything
/// job-specific travels in the [`RenderJob`], so one generator can serve
/// concurrent callers.
#[derive(Debug, Clone)]
pub struct PdfGenerator {
    config: GeneratorConfig,
}

impl PdfGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Render `job` and move the resulting PDF to `destination`.
    ///
    /// On renderer failure the staged HTML files are left in the storage
    /// directory for inspection.
    pub fn produce(&self, job: RenderJob<'_>, destination: impl AsRef<Path>) -> Result<()> {
        let destination = destination.as_ref();
        let storage = validate_storage_dir(self.config.storage_path.as_deref())?;
        let files = TempFileSet::generate(storage);
        log::debug!("Job {} staging in {}", files.id(), storage.display());

        let mut html = job.resolve()?;
        if let Some(base_url) = &self.config.base_url {
            html = html.with_base_url(base_url);
        }
        files.write_html(&html)?;

        let command = self.render_command(&files, job.page());
        log::debug!("Job {} running {:?}", files.id(), command.argv());

        let output = match process::run(command.to_command(), self.config.timeout()) {
            Ok(output) => output,
            Err(e) => {
                files.discard_pdf();
                return Err(e);
            }
        };

        if !output.stderr.is_empty() {
            files.discard_pdf();
            return Err(CourierError::Renderer(output.stderr));
        }
        if !output.status.success() {
            files.discard_pdf();
            return Err(CourierError::Renderer(format!(
                "renderer exited with {}",
                output.status
            )));
        }

        files.remove_html();
        files.promote(destination)?;
        log::info!("Job {} wrote {}", files.id(), destination.display());
        Ok(())
    }

    /// The command `produce` would run for `files` and `page`.
    pub fn render_command(&self, files: &TempFileSet, page: &PageOptions) -> RenderCommand {
        RenderCommand::build(&self.config, files, page)
    }

    /// Concatenate `inputs` into `output` with the configured merge tool.
    pub fn merge<P: AsRef<Path>>(&self, output: impl AsRef<Path>, inputs: &[P]) -> Result<()> {
        validate_merge_inputs(inputs)?;

        let command = self.merge_command(output.as_ref(), inputs);
        let result = process::run(command, self.config.timeout())?;
        if !result.status.success() {
            let detail = result.stderr.trim();
            return Err(CourierError::Merge(if detail.is_empty() {
                format!("{} exited with {}", self.config.merge_tool.display(), result.status)
            } else {
                format!(
                    "{} exited with {}: {detail}",
                    self.config.merge_tool.display(),
                    result.status
                )
            }));
        }
        log::info!("Merged {} PDFs into {}", inputs.len(), output.as_ref().display());
        Ok(())
    }

    /// `<merge-tool> <inputs...> <output>`, run directly rather than through a shell.
    pub fn merge_command<P: AsRef<Path>>(&self, output: &Path, inputs: &[P]) -> Command {
        let mut command = Command::new(&self.config.merge_tool);
        command
            .args(inputs.iter().map(|p| p.as_ref().as_os_str()))
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }
}

fn validate_merge_inputs<P: AsRef<Path>>(inputs: &[P]) -> Result<()> {
    if inputs.is_empty() {
        return Err(CourierError::Validation(
            "at least one PDF is required to merge".to_string(),
        ));
    }
    for input in inputs {
        let input = input.as_ref();
        let is_pdf = input
            .extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if !is_pdf {
            return Err(CourierError::Validation(format!(
                "all documents must be in PDF format (got {})",
                input.display()
            )));
        }
    }
    Ok(())
}
