//! Log entry types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

use crate::enrich;
use crate::error::{Error, Result};

/// Maximum number of frames kept in a captured stack trace
const MAX_STACK_FRAMES: usize = 32;

/// Severity level of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(Error::config(format!("Invalid log level: {}", s))),
        }
    }
}

/// A single structured log entry with AI-oriented metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub operation: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub context: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub human_note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_todo: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stack_trace: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    /// 1-4, higher is more urgent
    pub severity: u8,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub searchable: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pattern: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub suggestion: String,
}

impl LogEntry {
    /// Build an entry stamped now and fill in the derived AI fields
    pub fn new(
        level: LogLevel,
        operation: impl Into<String>,
        message: impl Into<String>,
        options: LogOptions,
    ) -> Self {
        let operation = operation.into();
        let message = message.into();

        Self {
            timestamp: Utc::now(),
            level,
            severity: enrich::severity_score(level),
            category: enrich::infer_category(&operation, &message).to_string(),
            searchable: enrich::searchable_terms(&operation, &message),
            pattern: enrich::detect_pattern(&operation, &message).to_string(),
            suggestion: enrich::ai_suggestion(level, &operation, &message)
                .unwrap_or_default()
                .to_string(),
            stack_trace: if level == LogLevel::Error {
                capture_stack_trace()
            } else {
                Vec::new()
            },
            environment: BTreeMap::new(),
            context: options.context,
            human_note: options.human_note,
            ai_todo: options.ai_todo,
            correlation_id: options.correlation_id,
            operation,
            message,
        }
    }

    pub fn with_environment(mut self, environment: BTreeMap<String, String>) -> Self {
        self.environment = environment;
        self
    }

    /// Serialize as a single JSON line (without the trailing newline)
    pub fn to_json_line(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Optional fields attached to an entry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogOptions {
    pub context: Map<String, Value>,
    pub human_note: Option<String>,
    pub ai_todo: Option<String>,
    pub correlation_id: Option<String>,
}

impl LogOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single context value
    pub fn context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Merge several context values
    pub fn fields<K, V, I>(mut self, fields: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in fields {
            self.context.insert(key.into(), value.into());
        }
        self
    }

    /// Free-form note for whoever reads the log
    pub fn human_note(mut self, note: impl Into<String>) -> Self {
        self.human_note = Some(note.into());
        self
    }

    /// Instruction for an AI assistant analyzing the log
    pub fn ai_todo(mut self, todo: impl Into<String>) -> Self {
        self.ai_todo = Some(todo.into());
        self
    }

    pub fn correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Record an error's message and type
    pub fn error<E: std::error::Error>(self, err: &E) -> Self {
        self.context("error", err.to_string())
            .context("error_type", std::any::type_name::<E>())
    }

    pub fn user_id(self, user_id: impl Into<String>) -> Self {
        self.context("user_id", user_id.into())
    }

    pub fn request_id(self, request_id: impl Into<String>) -> Self {
        self.context("request_id", request_id.into())
    }

    pub fn duration(self, duration: Duration) -> Self {
        self.context("duration_ms", duration.as_millis() as u64)
            .context("duration_human", format!("{:?}", duration))
    }
}

/// Runtime environment recorded on every entry
pub fn runtime_environment(environment: &str) -> BTreeMap<String, String> {
    let mut env = BTreeMap::new();
    env.insert("os".to_string(), std::env::consts::OS.to_string());
    env.insert("arch".to_string(), std::env::consts::ARCH.to_string());
    env.insert("pid".to_string(), std::process::id().to_string());
    env.insert(
        "pwd".to_string(),
        std::env::current_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_default(),
    );
    env.insert("vibelog_version".to_string(), crate::version::VERSION.to_string());
    env.insert("environment".to_string(), environment.to_string());
    env
}

fn capture_stack_trace() -> Vec<String> {
    std::backtrace::Backtrace::force_capture()
        .to_string()
        .lines()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .take(MAX_STACK_FRAMES)
        .collect()
}
