//! gamification-event-validate - decodes event payload files through the
//! wire codec and reports every payload the codec rejects.
//!
//! Each `.json` file holds one payload object or an array of them. One line
//! is printed per payload, followed by a summary; the process fails if any
//! payload was rejected.

use anyhow::{bail, Result};
use clap::Parser;

mod check;
mod config;
mod logging;

use config::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level, cli.log_format);

    let summary = check::run(&cli.paths, |outcome| println!("{outcome}"))?;
    println!("{summary}");

    if summary.rejected > 0 {
        bail!("{} of {} payloads rejected", summary.rejected, summary.total());
    }
    Ok(())
}
