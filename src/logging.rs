use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

/// Initialise logging. With `debug` the default level is `debug` and
/// `RUST_LOG` may override it; otherwise the level is fixed at `info`.
/// When `log_file` is given, output goes to that file instead of stderr.
pub fn init(debug: bool, log_file: Option<PathBuf>) {
    let level = if debug { "debug" } else { "info" };

    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let appender = log_file.as_deref().and_then(file_appender);
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let _ = match appender {
        Some(appender) => builder.with_ansi(false).with_writer(appender).try_init(),
        None => builder.try_init(),
    };
}

fn file_appender(path: &Path) -> Option<RollingFileAppender> {
    let (dir, file_name) = split_log_path(path)?;
    match RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(&dir)
    {
        Ok(appender) => Some(appender),
        Err(err) => {
            eprintln!("failed to open log file {}: {err}", path.display());
            None
        }
    }
}

fn split_log_path(path: &Path) -> Option<(PathBuf, String)> {
    let file_name = path.file_name()?.to_string_lossy().into_owned();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Some((dir, file_name))
}
