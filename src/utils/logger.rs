use crate::utils::error::{PushError, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Layer};

/// Logging for one run. Output stops going to the log file once this is dropped.
pub struct LogContext {
    log_file: Option<PathBuf>,
    _guard: DefaultGuard,
}

impl LogContext {
    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }
}

fn build_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("datapush=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("datapush=info"))
    }
}

/// `<log_dir>/datapush_<YYYYmmdd_HHMMSS>.log`
pub fn log_file_path(log_dir: &Path) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    log_dir.join(format!("datapush_{}.log", stamp))
}

/// Installs a stdout layer and, when `log_dir` is given, a plain-text file
/// layer as the default subscriber for as long as the returned context lives.
pub fn init_run_logger(log_dir: Option<&Path>, verbose: bool) -> Result<LogContext> {
    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact();

    let (file_layer, log_file) = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir).map_err(|source| PushError::FileAccessError {
                path: dir.display().to_string(),
                source,
            })?;
            let path = log_file_path(dir);
            let file = File::create(&path).map_err(|source| PushError::FileAccessError {
                path: path.display().to_string(),
                source,
            })?;
            let layer = tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .boxed();
            (Some(layer), Some(path))
        }
        None => (None, None),
    };

    let subscriber = tracing_subscriber::registry()
        .with(build_filter(verbose))
        .with(stdout_layer)
        .with(file_layer);

    let guard = tracing::subscriber::set_default(subscriber);

    Ok(LogContext {
        log_file,
        _guard: guard,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_log_file_is_created_under_log_dir() {
        let temp_dir = TempDir::new().unwrap();
        let log_dir = temp_dir.path().join("logs");

        let context = init_run_logger(Some(&log_dir), false).unwrap();
        tracing::info!("hello from the test");

        let path = context.log_file().unwrap().to_path_buf();
        assert!(path.starts_with(&log_dir));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("datapush_"));
        assert!(name.ends_with(".log"));

        drop(context);
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("hello from the test"));
    }

    #[test]
    fn test_console_only_logger_has_no_file() {
        let context = init_run_logger(None, true).unwrap();
        assert!(context.log_file().is_none());
    }
}
