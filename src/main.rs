/*!
 * Command-line interface for treedump
 */

use std::io;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use indicatif::{ProgressBar, ProgressStyle};

use treedump::config::{Args, Config};
use treedump::dumper::Dumper;
use treedump::report::Reporter;

fn main() {
    let args = Args::parse();

    if let Some(shell) = args.generate {
        let mut cmd = Args::command();
        let name = cmd.get_name().to_string();
        generate(shell, &mut cmd, name, &mut io::stdout());
        return;
    }

    setup_logging(args.quiet, args.verbose);
    log::debug!("CLI args parsed: {:?}", args);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn progress_bar(hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }

    let progress = ProgressBar::new(0);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} {prefix:.bold.cyan} {wide_msg:.dim.white} {pos}/{len} ({percent}%) Elapsed: {elapsed_precise}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress.set_style(style);
    progress.enable_steady_tick(Duration::from_millis(100));
    progress.set_prefix("Dumping");
    progress
}

fn run(args: Args) -> treedump::Result<()> {
    let reporter = Reporter::new(args.report);
    let progress = progress_bar(args.quiet || args.verbose > 0);

    let config = Config::from_args(args);
    config.validate()?;
    progress.set_message(format!(
        "Scanning directory: {}",
        config.target_dir.display()
    ));

    let mut dumper = Dumper::new(config, Arc::new(progress.clone()));
    let report = dumper.run();
    progress.finish_and_clear();

    reporter.print_report(&report?)
}
