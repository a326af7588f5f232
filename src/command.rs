//! Render command construction.
//!
//! The argument order is the positional contract `courier-render` (or any
//! script-hosting renderer) parses:
//!
//! ```text
//! <binary> [options...] [script] <output.pdf> <content> <header> <footer>
//!          <orientation> <header-height> <footer-height> <paper-format> <dpi> <wait-ms>
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::config::GeneratorConfig;
use crate::job::PageOptions;
use crate::staging::TempFileSet;

/// Scheme prepended to HTML paths on Windows.
pub const WINDOWS_FILE_PREFIX: &str = "file:///";

/// Program plus ordered arguments for one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl RenderCommand {
    pub fn build(config: &GeneratorConfig, files: &TempFileSet, page: &PageOptions) -> Self {
        Self::build_for(config, files, page, cfg!(windows))
    }

    fn build_for(
        config: &GeneratorConfig,
        files: &TempFileSet,
        page: &PageOptions,
        windows: bool,
    ) -> Self {
        let mut args: Vec<OsString> = config
            .command_line_options
            .iter()
            .map(OsString::from)
            .collect();

        if let Some(script) = &config.render_script {
            args.push(script.clone().into_os_string());
        }

        args.push(files.pdf().as_os_str().to_owned());
        args.push(html_path_arg(files.content(), windows));
        args.push(html_path_arg(files.header(), windows));
        args.push(html_path_arg(files.footer(), windows));
        args.push(page.orientation.as_str().into());
        args.push(OsString::from(&page.header_height));
        args.push(OsString::from(&page.footer_height));
        args.push(OsString::from(page.paper_format.as_deref().unwrap_or("")));
        args.push(page.dpi.to_string().into());
        args.push(page.wait_ms.to_string().into());

        Self {
            program: config.binary_path.clone(),
            args,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Program followed by arguments, lossily converted for logging.
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(|s| s.to_string_lossy().into_owned())
            .collect()
    }

    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }
}

fn html_path_arg(path: &Path, windows: bool) -> OsString {
    if windows {
        let mut prefixed = OsString::from(WINDOWS_FILE_PREFIX);
        prefixed.push(path.as_os_str());
        prefixed
    } else {
        path.as_os_str().to_owned()
    }
}
