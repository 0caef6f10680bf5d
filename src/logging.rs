use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Initialise logging. With `debug` disabled the level is fixed at `info`;
/// with it enabled the default is `debug` and `RUST_LOG` may override it.
/// When `file` is given, output goes to that file instead of stderr.
pub fn init(debug: bool, file: Option<PathBuf>) {
    // Ignore `RUST_LOG` unless debug logging was asked for, so a stray
    // environment variable cannot flood the terminal.
    let level = if debug { "debug" } else { "info" };
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let Some(path) = file else {
        let _ = builder.try_init();
        return;
    };

    let dir = path
        .parent()
        .map(|p| p.to_path_buf())
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from("."));
    let Some(name) = path.file_name() else {
        let _ = builder.try_init();
        tracing::warn!("log file path {} has no file name", path.display());
        return;
    };

    let appender = tracing_appender::rolling::never(dir, name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    if builder.with_writer(writer).with_ansi(false).try_init().is_ok() {
        // Dropping the guard would stop the background writer.
        let _ = FILE_GUARD.set(guard);
    }
}
