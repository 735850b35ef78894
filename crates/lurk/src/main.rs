#![forbid(unsafe_code)]

//! lurk: scroll and follow append-only log files in the terminal.

mod app;
mod cli;
mod render;
mod spill;
mod term;

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::mpsc;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use lurk_buffer::{Buffer, BufferConfig};

use crate::app::App;
use crate::cli::Cli;
use crate::term::TerminalGuard;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("lurk: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(cli.log_file.as_deref())?;

    let source = spill::prepare(cli.file.as_deref())?;
    let (width, height) = TerminalGuard::size().unwrap_or((80, 24));

    let config = BufferConfig::new(width as usize, height as usize)
        .follow(cli.follow)
        .wrap_mode(cli.wrap.wrap_mode());
    let buffer = Arc::new(Buffer::open(
        source.path(),
        config,
        cli.project.projection(),
    )?);

    let (repaint_tx, repaint_rx) = mpsc::channel();
    buffer.set_post_event(move || {
        let _ = repaint_tx.send(());
    });

    let guard = TerminalGuard::enter()?;
    let result = App::new(Arc::clone(&buffer), repaint_rx, width, height).run(&mut io::stdout());
    drop(guard);

    buffer.close();
    result.map_err(Into::into)
}

/// Route diagnostics to `--log-file`, if given. The terminal itself is
/// never a log destination: in raw mode stray writes shred the screen.
fn init_logging(path: Option<&Path>) -> io::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
