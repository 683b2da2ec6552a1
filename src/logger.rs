//! Structured logging for the dashboard client
//!
//! - Log levels (ERROR, WARN, INFO, DEBUG)
//! - Human-readable lines in development, JSON lines in production
//! - Optional daily log file next to the preference store
//! - Token/secret redaction before anything touches disk or stdout

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    pub fn from_env() -> Self {
        std::env::var("RUST_LOG")
            .map(|s| match s.to_uppercase().as_str() {
                "DEBUG" | "TRACE" => LogLevel::Debug,
                "INFO" => LogLevel::Info,
                "WARN" => LogLevel::Warn,
                _ => LogLevel::Error,
            })
            .unwrap_or(LogLevel::Info)
    }
}

/// One structured log line
#[derive(Debug, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub target: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub level: LogLevel,
    pub log_to_file: bool,
    pub log_to_stdout: bool,
    pub json_format: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::from_env(),
            log_to_file: true,
            log_to_stdout: true,
            json_format: cfg!(not(debug_assertions)),
        }
    }
}

pub struct Logger {
    config: LoggerConfig,
    log_dir: PathBuf,
    writer: Mutex<Option<BufWriter<File>>>,
}

impl Logger {
    pub fn init(app_data_dir: &Path, config: LoggerConfig) -> Result<Self, String> {
        let log_dir = app_data_dir.join("logs");

        std::fs::create_dir_all(&log_dir)
            .map_err(|e| format!("Failed to create log directory: {}", e))?;

        let logger = Self {
            config,
            log_dir,
            writer: Mutex::new(None),
        };
        logger.open_daily_file()?;

        Ok(logger)
    }

    /// One file per day; appended across restarts.
    fn open_daily_file(&self) -> Result<(), String> {
        let date = Local::now().format("%Y-%m-%d");
        let path = self.log_dir.join(format!("client-{}.log", date));

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| format!("Failed to open log file: {}", e))?;

        *self.writer.lock().unwrap() = Some(BufWriter::new(file));
        Ok(())
    }

    fn write(&self, entry: &LogEntry) {
        if entry.level > self.config.level {
            return;
        }

        let line = if self.config.json_format {
            serde_json::to_string(entry).unwrap_or_else(|_| "{}".to_string())
        } else {
            format!(
                "{} [{}] [{}] {}{}",
                entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
                entry.level.as_str(),
                entry.target,
                entry.message,
                entry
                    .data
                    .as_ref()
                    .map(|d| format!(" | {}", d))
                    .unwrap_or_default()
            )
        };

        if self.config.log_to_stdout {
            match entry.level {
                LogLevel::Error | LogLevel::Warn => eprintln!("{}", line),
                _ => println!("{}", line),
            }
        }

        if self.config.log_to_file {
            if let Ok(mut guard) = self.writer.lock() {
                if let Some(writer) = guard.as_mut() {
                    let _ = writeln!(writer, "{}", line);
                    let _ = writer.flush();
                }
            }
        }
    }

    fn entry(&self, level: LogLevel, target: &'static str, message: &str, data: Option<serde_json::Value>, error: Option<&str>) {
        self.write(&LogEntry {
            timestamp: Local::now(),
            level,
            target,
            message: message.to_string(),
            data: data.map(redact_sensitive),
            error: error.map(String::from),
        });
    }

    pub fn error(&self, target: &'static str, message: &str, error: Option<&str>) {
        self.entry(LogLevel::Error, target, message, None, error);
    }

    pub fn warn(&self, target: &'static str, message: &str) {
        self.entry(LogLevel::Warn, target, message, None, None);
    }

    pub fn info(&self, target: &'static str, message: &str, data: Option<serde_json::Value>) {
        self.entry(LogLevel::Info, target, message, data, None);
    }

    pub fn debug(&self, target: &'static str, message: &str, data: Option<serde_json::Value>) {
        self.entry(LogLevel::Debug, target, message, data, None);
    }
}

/// Replace token/secret-looking fields in structured data before logging.
fn redact_sensitive(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(mut map) => {
            for (key, val) in map.iter_mut() {
                let key_lower = key.to_lowercase();
                if key_lower.contains("token")
                    || key_lower.contains("secret")
                    || key_lower.contains("password")
                    || key_lower.contains("otp")
                {
                    *val = serde_json::Value::String("***REDACTED***".to_string());
                } else {
                    *val = redact_sensitive(val.clone());
                }
            }
            serde_json::Value::Object(map)
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(redact_sensitive).collect())
        }
        _ => value,
    }
}

/// Global logger instance
static GLOBAL_LOGGER: OnceLock<Logger> = OnceLock::new();

/// Initialize the global logger
pub fn init_global_logger(app_data_dir: &Path) -> Result<(), String> {
    let logger = Logger::init(app_data_dir, LoggerConfig::default())?;

    GLOBAL_LOGGER
        .set(logger)
        .map_err(|_| "Logger already initialized".to_string())
}

/// Get the global logger instance
pub fn get_logger() -> Option<&'static Logger> {
    GLOBAL_LOGGER.get()
}

#[macro_export]
macro_rules! log_error {
    ($target:expr, $msg:expr) => {
        if let Some(l) = $crate::logger::get_logger() {
            l.error($target, $msg, None);
        }
    };
    ($target:expr, $msg:expr, $err:expr) => {
        if let Some(l) = $crate::logger::get_logger() {
            l.error($target, $msg, Some(&$err));
        }
    };
}

#[macro_export]
macro_rules! log_warn {
    ($target:expr, $msg:expr) => {
        if let Some(l) = $crate::logger::get_logger() {
            l.warn($target, $msg);
        }
    };
}

#[macro_export]
macro_rules! log_info {
    ($target:expr, $msg:expr) => {
        if let Some(l) = $crate::logger::get_logger() {
            l.info($target, $msg, None);
        }
    };
    ($target:expr, $msg:expr, $data:expr) => {
        if let Some(l) = $crate::logger::get_logger() {
            l.info($target, $msg, Some($data));
        }
    };
}

#[macro_export]
macro_rules! log_debug {
    ($target:expr, $msg:expr) => {
        if let Some(l) = $crate::logger::get_logger() {
            l.debug($target, $msg, None);
        }
    };
    ($target:expr, $msg:expr, $data:expr) => {
        if let Some(l) = $crate::logger::get_logger() {
            l.debug($target, $msg, Some($data));
        }
    };
}
