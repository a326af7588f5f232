//! courier – command-line front end for producing and merging PDFs.
//!
//! Usage:
//!   courier produce <content.html> <output.pdf> [--header F] [--footer F] [--landscape] ...
//!   courier merge <output.pdf> <input.pdf>...
//!
//! Installation settings come from `--config <file.json>`, then `COURIER_*`
//! environment variables, then the flags below.

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use pdf_courier::{
    CourierError, FileSource, GeneratorConfig, HtmlSource, Orientation, PageOptions, PdfGenerator,
    RenderJob, Template,
};

#[derive(Debug, Parser)]
#[command(name = "courier", version, about = "HTML to PDF via an external renderer")]
struct Cli {
    /// JSON configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Render an HTML file (plus optional header/footer) to PDF.
    Produce(ProduceArgs),
    /// Concatenate PDFs with the configured merge tool.
    Merge {
        output: PathBuf,
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
}

#[derive(Debug, Args)]
struct ProduceArgs {
    content: PathBuf,
    output: PathBuf,

    #[arg(long)]
    header: Option<PathBuf>,
    /// Footer HTML; `__PAGE_NUM__` and `__NUM_PAGES__` are substituted.
    #[arg(long)]
    footer: Option<PathBuf>,
    #[arg(long, default_value = "portrait")]
    orientation: Orientation,
    /// Shorthand for `--orientation landscape`.
    #[arg(long, short = 'l')]
    landscape: bool,
    #[arg(long, default_value = "1cm")]
    header_height: String,
    #[arg(long, default_value = "1cm")]
    footer_height: String,
    #[arg(long, default_value_t = 72)]
    dpi: u32,
    /// Named paper format (A4, Letter, ...); overrides DPI sizing.
    #[arg(long)]
    format: Option<String>,
    #[arg(long, default_value_t = 100)]
    wait_ms: u64,
    /// Template value, `KEY=VALUE`; applies to content, header and footer.
    #[arg(long = "var", value_parser = parse_var)]
    vars: Vec<(String, String)>,

    #[arg(long)]
    storage: Option<PathBuf>,
    #[arg(long)]
    binary: Option<PathBuf>,
    #[arg(long)]
    script: Option<PathBuf>,
    #[arg(long)]
    timeout: Option<u64>,
    #[arg(long)]
    base_url: Option<String>,
    /// Extra renderer flag; repeatable.
    #[arg(long = "option", allow_hyphen_values = true)]
    options: Vec<String>,
}

fn parse_var(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got `{s}`"))
}

/// Input files are passed through verbatim unless `--var` values were given,
/// so markup with literal `{{ ... }}` renders as written.
fn page_source(path: PathBuf, vars: &[(String, String)]) -> Box<dyn HtmlSource + Send> {
    if vars.is_empty() {
        return Box::new(FileSource::new(path));
    }
    Box::new(
        vars.iter()
            .fold(Template::from_file(path), |t, (k, v)| t.with(k.clone(), v)),
    )
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CourierError> {
    let config = match &cli.config {
        Some(path) => GeneratorConfig::from_file(path)?,
        None => GeneratorConfig::default(),
    }
    .apply_env()?;

    match cli.command {
        Commands::Produce(args) => produce(config, args),
        Commands::Merge { output, inputs } => {
            PdfGenerator::new(config).merge(&output, inputs.as_slice())?;
            eprintln!("Merged {} files into '{}'", inputs.len(), output.display());
            Ok(())
        }
    }
}

fn produce(mut config: GeneratorConfig, args: ProduceArgs) -> Result<(), CourierError> {
    if let Some(storage) = args.storage {
        config.storage_path = Some(storage);
    }
    if let Some(binary) = args.binary {
        config.binary_path = binary;
    }
    if let Some(script) = args.script {
        config.render_script = Some(script);
    }
    if let Some(secs) = args.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    if let Some(url) = args.base_url {
        config.base_url = Some(url);
    }
    config.command_line_options.extend(args.options);

    let source = |path: PathBuf| page_source(path, &args.vars);

    let page = PageOptions {
        orientation: if args.landscape {
            Orientation::Landscape
        } else {
            args.orientation
        },
        header_height: args.header_height.clone(),
        footer_height: args.footer_height.clone(),
        dpi: args.dpi,
        paper_format: args.format.clone(),
        wait_ms: args.wait_ms,
    };

    let mut job = RenderJob::new(source(args.content.clone())).page_options(page);
    if let Some(header) = args.header.clone() {
        job = job.header(source(header));
    }
    if let Some(footer) = args.footer.clone() {
        job = job.footer(source(footer));
    }

    PdfGenerator::new(config).produce(job, &args.output)?;
    eprintln!("Wrote '{}'", args.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const SCRIPTED: &str = "<script>var t = '{{ user }}';</script>";

    #[test]
    fn files_without_vars_are_passed_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.html");
        fs::write(&path, SCRIPTED).unwrap();

        let html = page_source(path, &[]).render_html().unwrap();
        assert_eq!(html, SCRIPTED);
    }

    #[test]
    fn vars_turn_files_into_templates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.html");
        fs::write(&path, SCRIPTED).unwrap();

        let vars = [parse_var("user=ada").unwrap()];
        let html = page_source(path, &vars).render_html().unwrap();
        assert_eq!(html, "<script>var t = 'ada';</script>");
    }

    #[test]
    fn produce_flags_parse() {
        let cli = Cli::try_parse_from([
            "courier",
            "produce",
            "in.html",
            "out.pdf",
            "-l",
            "--var",
            "n=1",
            "--option",
            "--no-sandbox",
        ])
        .unwrap();
        match cli.command {
            Commands::Produce(args) => {
                assert!(args.landscape);
                assert_eq!(args.vars, vec![("n".to_string(), "1".to_string())]);
                assert_eq!(args.options, vec!["--no-sandbox".to_string()]);
            }
            other => panic!("expected produce, got {other:?}"),
        }
    }
}
