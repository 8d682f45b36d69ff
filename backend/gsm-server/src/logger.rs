use crate::error::{Result as ServerErrorResult, ServerError};

use gsm_config::LoggingConfig;

use std::fmt::Arguments;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use fern::colors::{Color, ColoredLevelConfig};
use fern::{Dispatch, FormatCallback};
use log::{LevelFilter, Record, info};

/// Crates whose request-level chatter drowns out lifecycle logs.
const QUIET_TARGETS: [&str; 3] = ["hyper", "tower_http", "sysinfo"];

/// Resolve `logging.file` inside `logging.dir` under `config_dir`, creating
/// the directory. None means stdout.
pub fn log_file_path(
    logging: &LoggingConfig,
    config_dir: &Path,
) -> ServerErrorResult<Option<PathBuf>> {
    let Some(ref filename) = logging.file else {
        return Ok(None);
    };

    let log_dir = config_dir.join(&logging.dir);
    std::fs::create_dir_all(&log_dir).map_err(|source| ServerError::LogFile {
        path: log_dir.display().to_string(),
        source,
    })?;
    Ok(Some(log_dir.join(filename)))
}

/// Install the global fern logger for the controller.
///
/// Lifecycle transitions are logged from request tasks and background
/// tasks alike, so every line carries its source location. Colors apply only
/// when `logging.colored` is set and stdout is a terminal.
pub fn initialize(logging: &LoggingConfig, log_file: Option<&Path>) -> ServerErrorResult<()> {
    let level_filter = logging.level.0;

    let mut base_dispatch = Dispatch::new().level(level_filter);
    for target in QUIET_TARGETS {
        base_dispatch = base_dispatch.level_for(target, level_filter.min(LevelFilter::Warn));
    }

    let dispatch = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| ServerError::LogFile {
                    path: path.display().to_string(),
                    source,
                })?;
            Dispatch::new()
                .format(|out, message, record| write_line(out, message, record, None))
                .chain(file)
        }
        None if logging.colored && std::io::stdout().is_terminal() => {
            let colors = ColoredLevelConfig::new()
                .trace(Color::Magenta)
                .debug(Color::Blue)
                .info(Color::Green)
                .warn(Color::Yellow)
                .error(Color::Red);
            Dispatch::new()
                .format(move |out, message, record| {
                    write_line(out, message, record, Some(&colors))
                })
                .chain(std::io::stdout())
        }
        // systemd and docker capture stdout without a TTY
        None => Dispatch::new()
            .format(|out, message, record| write_line(out, message, record, None))
            .chain(std::io::stdout()),
    };

    base_dispatch
        .chain(dispatch)
        .apply()
        .map_err(|e| ServerError::Logger {
            message: format!("Failed to initialize logger: {e}"),
        })?;

    match log_file {
        Some(path) => info!(
            "Logger initialized: level={level_filter:?}, file={}",
            path.display()
        ),
        None => info!("Logger initialized: level={level_filter:?}, stdout"),
    }

    // Dependencies that emit through `tracing` end up in the same sink
    tracing_log::LogTracer::init().ok();

    Ok(())
}

fn write_line(
    out: FormatCallback,
    message: &Arguments,
    record: &Record,
    colors: Option<&ColoredLevelConfig>,
) {
    let date = humantime::format_rfc3339_seconds(SystemTime::now());
    let file = record.file().unwrap_or("unknown");
    let line = record.line().unwrap_or(0);
    match colors {
        Some(colors) => out.finish(format_args!(
            "[{date} - {}] {message} [{file}:{line}]",
            colors.color(record.level())
        )),
        None => out.finish(format_args!(
            "[{date} - {}] {message} [{file}:{line}]",
            record.level()
        )),
    }
}
