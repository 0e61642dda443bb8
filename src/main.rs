mod app;
mod browser;
mod cli;
mod components;
mod logging;
mod models;
mod source;
mod tui;

use anyhow::Result;
use app::App;
use clap::Parser;
use cli::Cli;
use tracing::info;
use tui::Tui;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let tick = cli.tick_period()?;
    logging::init_logging(cli.log_level.into(), cli.log_file.as_deref())?;

    let source = cli.patient_source()?;
    info!(source = %source.describe(), page_size = cli.page_size.get(), "starting");

    let mut app = App::new(source, cli.page_size);
    app.refresh();

    let mut tui = Tui::new(tick)?;
    tui.enter()?;
    let res = app.run(&mut tui);
    tui.exit()?;

    if let Err(e) = res {
        eprintln!("Application Error: {e:#}");
    }
    Ok(())
}
