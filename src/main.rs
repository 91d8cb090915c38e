use clap::Parser;
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::File;
use std::path::PathBuf;

use tickr::core::clock::ClockMode;
use tickr::core::config::{self, CliOverrides};
use tickr::tui;

#[derive(Parser)]
#[command(name = "tickr", about = "Countdown timers in the terminal")]
struct Args {
    /// Milliseconds between timer updates
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Time source for timers ("logical" pauses while unfocused)
    #[arg(long, value_enum)]
    clock: Option<ClockMode>,

    /// Log level written to tickr.log
    #[arg(long)]
    log_level: Option<String>,

    /// Directory holding saved timers
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Open this slot's timer screen right after the main screen
    #[arg(long)]
    open_slot: Option<usize>,
}

fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let cli = CliOverrides {
        tick_ms: args.tick_ms,
        clock: args.clock,
        log_level: args.log_level,
        data_dir: args.data_dir,
    };
    let file_config = config::load_config();
    let resolved = config::resolve(file_config.as_ref().unwrap_or(&Default::default()), &cli);

    // Initialize file logger - writes to tickr.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("tickr.log") {
        let _ = WriteLogger::init(resolved.log_level, log_config, log_file);
    }

    if let Err(e) = &file_config {
        log::error!("Ignoring config file: {}", e);
    }
    log::info!(
        "tickr starting up (tick {}ms, {} clock, saves in {})",
        resolved.tick_ms,
        resolved.clock.label(),
        resolved.data_dir.display()
    );

    tui::run(resolved, args.open_slot)
}
