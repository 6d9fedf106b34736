//! Per-build logger with tracing, file and callback output.
//!
//! Each build gets its own logger that:
//! - Forwards every message to `tracing`
//! - Optionally writes to a dedicated log file
//! - Optionally sends lines to a callback
//! - Maintains a tail buffer replayed when the build fails

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use parking_lot::Mutex;

use super::types::{LogCallback, LogConfig, LogLevel, MessagePrefix};

/// Per-build logger.
pub struct BuildLogger {
    /// Build name (the repository root folder name).
    build_name: String,
    /// Path to the log file, if one is written.
    log_path: Option<PathBuf>,
    file_writer: Arc<Mutex<Option<BufWriter<File>>>>,
    callback: Arc<Mutex<Option<LogCallback>>>,
    config: LogConfig,
    tail_buffer: Arc<Mutex<VecDeque<String>>>,
}

impl BuildLogger {
    /// Create a new build logger.
    ///
    /// # Arguments
    /// * `build_name` - Name of the build (used in the log filename)
    /// * `log_dir` - Directory for the log file; `None` disables file output
    /// * `config` - Logging configuration
    /// * `callback` - Optional line callback
    pub fn new(
        build_name: impl Into<String>,
        log_dir: Option<&Path>,
        config: LogConfig,
        callback: Option<LogCallback>,
    ) -> std::io::Result<Self> {
        let build_name = build_name.into();

        let (log_path, writer) = match log_dir {
            Some(dir) => {
                fs::create_dir_all(dir)?;
                let path = dir.join(format!("{}.log", sanitize_filename(&build_name)));
                let file = File::create(&path)?;
                (Some(path), Some(BufWriter::new(file)))
            }
            None => (None, None),
        };

        Ok(Self {
            build_name,
            log_path,
            file_writer: Arc::new(Mutex::new(writer)),
            callback: Arc::new(Mutex::new(callback)),
            tail_buffer: Arc::new(Mutex::new(VecDeque::with_capacity(config.error_tail))),
            config,
        })
    }

    /// Logger that only forwards to `tracing`.
    pub fn tracing_only(build_name: impl Into<String>) -> Self {
        Self {
            build_name: build_name.into(),
            log_path: None,
            file_writer: Arc::new(Mutex::new(None)),
            callback: Arc::new(Mutex::new(None)),
            tail_buffer: Arc::new(Mutex::new(VecDeque::new())),
            config: LogConfig::default(),
        }
    }

    /// Get the build name.
    pub fn build_name(&self) -> &str {
        &self.build_name
    }

    /// Get the log file path, if file output is enabled.
    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    /// Log a message at the specified level.
    pub fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Trace => tracing::trace!(build = %self.build_name, "{}", message),
            LogLevel::Debug => tracing::debug!(build = %self.build_name, "{}", message),
            LogLevel::Info => tracing::info!(build = %self.build_name, "{}", message),
            LogLevel::Warn => tracing::warn!(build = %self.build_name, "{}", message),
            LogLevel::Error => tracing::error!(build = %self.build_name, "{}", message),
        }

        if level < self.config.level {
            return;
        }
        self.push_tail(message);
        self.output(&self.format_message(message));
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, &MessagePrefix::Warning.format(message));
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, &MessagePrefix::Error.format(message));
    }

    /// Log a phase marker.
    pub fn phase(&self, phase_name: &str) {
        self.log(LogLevel::Info, &MessagePrefix::Phase.format(phase_name));
    }

    pub fn success(&self, message: &str) {
        self.log(LogLevel::Info, &MessagePrefix::Success.format(message));
    }

    /// Record a single staged/archived file.
    ///
    /// In compact mode these only reach the tail buffer and `tracing` at
    /// trace level.
    pub fn file_line(&self, line: &str) {
        if self.config.compact {
            tracing::trace!(build = %self.build_name, "{}", line);
            self.push_tail(line);
            return;
        }
        self.log(LogLevel::Debug, line);
    }

    /// Replay the tail buffer after an error.
    ///
    /// Goes out at warn level so it reaches a console filtered to warnings.
    pub fn show_tail(&self, header: &str) {
        let lines = self.get_tail();
        if lines.is_empty() {
            return;
        }

        let title = format!("[{}/tail]", header);
        tracing::warn!(build = %self.build_name, "{}", title);
        self.output(&self.format_message(&title));
        for line in &lines {
            tracing::warn!(build = %self.build_name, "  {}", line);
            self.output(&self.format_message(line));
        }
    }

    /// Get the current tail buffer contents.
    pub fn get_tail(&self) -> Vec<String> {
        self.tail_buffer.lock().iter().cloned().collect()
    }

    /// Flush the log file.
    pub fn flush(&self) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writer.flush();
        }
    }

    /// Close the logger and release the file.
    pub fn close(&self) {
        self.flush();
        *self.file_writer.lock() = None;
    }

    fn push_tail(&self, line: &str) {
        if self.config.error_tail == 0 {
            return;
        }
        let mut buffer = self.tail_buffer.lock();
        if buffer.len() >= self.config.error_tail {
            buffer.pop_front();
        }
        buffer.push_back(line.to_string());
    }

    fn format_message(&self, message: &str) -> String {
        if self.config.show_timestamps {
            let timestamp = Local::now().format("%H:%M:%S");
            format!("[{}] {}", timestamp, message)
        } else {
            message.to_string()
        }
    }

    /// Write a formatted line to file and callback.
    fn output(&self, formatted: &str) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writeln!(writer, "{}", formatted);
        }

        if let Some(ref callback) = *self.callback.lock() {
            callback(formatted);
        }
    }
}

impl Drop for BuildLogger {
    fn drop(&mut self) {
        self.close();
    }
}

/// Sanitize a string to be safe for use as a filename.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    #[test]
    fn creates_log_file() {
        let dir = tempdir().unwrap();
        let logger =
            BuildLogger::new("my_ext", Some(dir.path()), LogConfig::default(), None).unwrap();

        let path = logger.log_path().unwrap();
        assert!(path.exists());
        assert!(path.to_string_lossy().ends_with("my_ext.log"));
    }

    #[test]
    fn writes_to_file() {
        let dir = tempdir().unwrap();
        let logger =
            BuildLogger::new("my_ext", Some(dir.path()), LogConfig::default(), None).unwrap();

        logger.phase("Stage");
        logger.flush();

        let content = fs::read_to_string(logger.log_path().unwrap()).unwrap();
        assert!(content.contains("=== Stage ==="));
    }

    #[test]
    fn no_file_without_log_dir() {
        let logger = BuildLogger::new("my_ext", None, LogConfig::default(), None).unwrap();
        assert!(logger.log_path().is_none());
        logger.info("still fine");
    }

    #[test]
    fn callback_respects_level() {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        let callback: LogCallback = Box::new(move |_line| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        let logger = BuildLogger::new("my_ext", None, LogConfig::default(), Some(callback)).unwrap();
        logger.info("shown");
        logger.debug("hidden");
        logger.warn("shown");

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn compact_file_lines_only_reach_tail() {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        let callback: LogCallback = Box::new(move |_line| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        let config = LogConfig {
            error_tail: 3,
            ..LogConfig::default()
        };
        let logger = BuildLogger::new("my_ext", None, config, Some(callback)).unwrap();

        for i in 0..5 {
            logger.file_line(&format!("copy {}", i));
        }

        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(logger.get_tail(), vec!["copy 2", "copy 3", "copy 4"]);
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn tail_reaches_console_filtered_to_warnings() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter("warn")
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let logger = BuildLogger::new("my_ext", None, LogConfig::default(), None).unwrap();
            logger.info("Packaging my_ext v1.0.0");
            logger.show_tail("my_ext");
        });

        let text = String::from_utf8(captured.0.lock().clone()).unwrap();
        assert!(text.contains("[my_ext/tail]"));
        assert!(text.contains("Packaging my_ext v1.0.0"));
    }

    #[test]
    fn sanitizes_filename() {
        assert_eq!(sanitize_filename("normal_name"), "normal_name");
        assert_eq!(sanitize_filename("has/slash"), "has_slash");
        assert_eq!(sanitize_filename("a<b>c"), "a_b_c");
    }
}
