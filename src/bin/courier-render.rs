//! courier-render – the render worker.
//!
//! Invoked by `courier` (or any host speaking the same positional contract):
//!
//!   courier-render [--no-sandbox] [--chrome PATH] <output.pdf> <content> <header> <footer>
//!                  <orientation> <header-height> <footer-height> <format> <dpi> <wait-ms>
//!
//! Anything written to stderr fails the job on the orchestrator side, so
//! logging is off unless `COURIER_RENDER_LOG` is set.

use std::process;

use clap::Parser;

use pdf_courier::worker::args::RenderArgs;
use pdf_courier::worker::chrome::ChromeEngine;
use pdf_courier::worker::ready::CancelToken;
use pdf_courier::worker::RenderSession;
use pdf_courier::WorkerError;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("COURIER_RENDER_LOG", "off"))
        .init();

    let args = RenderArgs::parse();
    if let Err(e) = run(&args) {
        eprintln!("courier-render: {e}");
        process::exit(1);
    }
}

fn run(args: &RenderArgs) -> Result<(), WorkerError> {
    let request = args.request()?;
    let mut engine = ChromeEngine::launch(&args.chrome_settings())?;
    RenderSession::new(&request, args.poll_settings(), CancelToken::new()).run(&mut engine)
}
