//! Photo Organiser - sort a camera dump into a dated photo library
//!
//! Copies (or moves) every file under SOURCE into
//! TARGET/<year>/<MM> - <Month>/<DD>/ based on its EXIF capture date.

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use photo_organiser::{Cli, Config, ExifDateResolver, FileOutcome, ImportEngine};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{Level, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, filter::LevelFilter, fmt, prelude::*};

mod cli_output {
    //! Styled console output

    use crossterm::{
        ExecutableCommand,
        style::{Color, Print, Stylize, style},
    };
    use std::io::stdout;

    pub struct CliTheme;

    impl CliTheme {
        pub const SUCCESS: Color = Color::Green;
        pub const WARNING: Color = Color::Yellow;
        pub const ERROR: Color = Color::Red;
        pub const HINT: Color = Color::DarkGrey;
    }

    pub fn print_separator() {
        let _ = stdout().execute(Print(format!("{}\n", "─".repeat(60))));
    }

    pub fn print_banner(title: &str) {
        let _ = stdout().execute(Print(format!("{}\n", title.bold())));
    }

    pub fn print_warning(msg: &str) {
        let _ = stdout().execute(Print(style("⚠ ").with(CliTheme::WARNING).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_error(msg: &str) {
        let _ = stdout().execute(Print(style("✗ ").with(CliTheme::ERROR).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_line(msg: &str) {
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    pub fn print_stat(key: &str, value: usize, color: Color) {
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(style(key).with(CliTheme::HINT)));
        let _ = stdout().execute(Print(": "));
        let _ = stdout().execute(Print(style(value.to_string()).with(color).bold()));
        let _ = stdout().execute(Print("\n"));
    }

    pub fn print_log_path(path: &str) {
        let _ = stdout().execute(Print(style("  Log file: ").with(CliTheme::HINT)));
        let _ = stdout().execute(Print(format!("{}\n", path)));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(ref path) = cli.write_sample_config {
        Config::write_sample(path)?;
        cli_output::print_line(&format!("Sample configuration written to {}", path.display()));
        return Ok(());
    }

    let exe_dir = get_executable_dir()?;
    let config = load_config(&cli, &exe_dir)?;

    let log_dir = config
        .log_dir
        .clone()
        .unwrap_or_else(|| exe_dir.join("Log"));
    let log_path = log_dir.join(format!("Import_{}.log", Local::now().format("%Y%m%d_%H%M%S")));
    let _guard = setup_logging(&cli, config.verbose, &log_path)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Photo Organiser starting");
    if config.verbose {
        info!(?config, "Configuration loaded");
    }

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = cancel.clone();
        if let Err(e) = ctrlc::set_handler(move || cancel.store(true, Ordering::Relaxed)) {
            warn!(error = %e, "Could not install Ctrl-C handler");
        }
    }

    let engine = ImportEngine::new(config, ExifDateResolver::new()).with_cancel_flag(cancel);

    let report = engine
        .run_with(|result| {
            if let FileOutcome::Failed(failure) = &result.outcome {
                cli_output::print_error(&failure.to_string());
            }
        })
        .inspect_err(|e| error!(error = %e, "Import could not start"))?;

    use cli_output::*;

    print_separator();
    print_banner("Photos were imported to:");
    for dir in report.touched_directories() {
        print_line(&dir.display().to_string());
    }
    print_separator();

    let stats = report.stats();
    print_stat("Transferred", stats.transferred, CliTheme::SUCCESS);
    print_stat("Skipped", stats.skipped, CliTheme::WARNING);
    print_stat("Failed", stats.failed, CliTheme::ERROR);

    if report.was_cancelled() {
        print_warning("Import was cancelled before all files were processed");
    }

    print_log_path(&log_path.display().to_string());
    info!(log_file = %log_path.display(), "Import complete");

    Ok(())
}

/// Get the directory where the executable is located
fn get_executable_dir() -> Result<PathBuf> {
    let exe_path = std::env::current_exe()?;
    Ok(exe_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".")))
}

/// Resolve config path - bare names are looked up in `Config/` beside the executable
fn resolve_config_path(exe_dir: &Path, config_path: &Path) -> PathBuf {
    if config_path.exists() {
        return config_path.to_path_buf();
    }

    let with_extension = if config_path.extension().is_none() {
        config_path.with_extension("toml")
    } else {
        config_path.to_path_buf()
    };

    if with_extension.exists() {
        return with_extension;
    }

    let filename = config_path.file_name().unwrap_or(config_path.as_os_str());
    let mut in_config_dir = exe_dir.join("Config").join(filename);
    if in_config_dir.extension().is_none() {
        in_config_dir = in_config_dir.with_extension("toml");
    }

    if in_config_dir.exists() {
        return in_config_dir;
    }

    config_path.to_path_buf()
}

/// Load configuration from file and/or CLI arguments
fn load_config(cli: &Cli, exe_dir: &Path) -> Result<Config> {
    let config = if let Some(ref config_path) = cli.config {
        let resolved_path = resolve_config_path(exe_dir, config_path);
        let file_config = Config::load_from_file(&resolved_path)?;
        cli.merge_with_config(file_config)
    } else {
        cli.to_config()
    };

    if config.source_dir.as_os_str().is_empty() {
        anyhow::bail!("No SOURCE directory given");
    }
    if config.target_dir.as_os_str().is_empty() {
        anyhow::bail!("No TARGET directory given");
    }

    Ok(config)
}

/// Setup logging (file + console)
///
/// The console only carries errors; per-file failures are already printed
/// by the import observer.
fn setup_logging(cli: &Cli, verbose: bool, log_path: &Path) -> Result<WorkerGuard> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if cli.json_log {
        subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_filter(LevelFilter::ERROR),
            )
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_filter(LevelFilter::ERROR),
            )
            .init();
    }

    Ok(guard)
}
