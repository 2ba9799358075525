//! Keyword heuristics that annotate entries for AI-assisted debugging
//!
//! Everything here is a pure function of the level, operation and message.
//! Matching is case-insensitive substring search over `"<operation> <message>"`.

use crate::types::LogLevel;

const CATEGORIES: &[(&str, &[&str])] = &[
    ("user_action", &["user", "login", "auth", "session"]),
    ("database", &["db", "database", "sql", "query"]),
    ("api", &["api", "http", "request", "response"]),
    ("system", &["file", "disk", "io", "read", "write"]),
    ("business_logic", &["business", "logic", "validation", "calculation"]),
];

const SEARCH_TAGS: &[(&str, &[&str])] = &[
    ("error", &["error", "failed", "exception", "panic"]),
    ("start", &["start", "begin", "init", "startup"]),
    ("complete", &["end", "complete", "finish", "done"]),
    ("performance", &["timeout", "slow", "performance"]),
    ("retry", &["retry", "attempt", "fallback"]),
];

const PATTERNS: &[(&str, &[&str])] = &[
    (
        "database_error",
        &["connection refused", "connection timeout", "no rows", "duplicate key"],
    ),
    (
        "network_error",
        &["network unreachable", "connection reset", "timeout", "502", "503", "504"],
    ),
    ("auth_error", &["unauthorized", "forbidden", "invalid token", "expired"]),
    (
        "filesystem_error",
        &["file not found", "permission denied", "disk full", "no space"],
    ),
    (
        "performance_issue",
        &["slow query", "high memory", "cpu usage", "memory leak"],
    ),
    (
        "validation_error",
        &["invalid input", "validation failed", "bad request", "malformed", "invalid format"],
    ),
];

const UNKNOWN_PATTERN: &str = "unknown_pattern";

// Order matters: the first matching rule wins.
const SUGGESTIONS: &[(&[&str], &str)] = &[
    (
        &["connection refused", "connection timeout"],
        "Check database connectivity and connection pool settings",
    ),
    (&["no rows", "not found"], "Verify query parameters and data existence"),
    (
        &["timeout", "network unreachable"],
        "Check network connectivity and service availability",
    ),
    (&["502", "503", "504"], "Verify upstream service health and load balancing"),
    (
        &["unauthorized", "forbidden"],
        "Verify authentication credentials and permissions",
    ),
    (
        &["expired", "invalid token"],
        "Check token expiration and refresh mechanism",
    ),
    (&["file not found", "no such file"], "Verify file path and existence"),
    (&["permission denied"], "Check file permissions and user access rights"),
    (
        &["slow", "timeout", "performance"],
        "Consider optimizing query/operation or adding timeout handling",
    ),
    (
        &["invalid", "validation", "malformed"],
        "Verify input data format and validation rules",
    ),
];

const FALLBACK_SUGGESTION: &str = "Review logs and investigate root cause";

fn combined(operation: &str, message: &str) -> String {
    format!("{} {}", operation, message).to_lowercase()
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Numeric severity used for prioritization (DEBUG=1 .. ERROR=4)
pub fn severity_score(level: LogLevel) -> u8 {
    match level {
        LogLevel::Debug => 1,
        LogLevel::Info => 2,
        LogLevel::Warn => 3,
        LogLevel::Error => 4,
    }
}

/// Coarse category of an entry, `"general"` when nothing matches
pub fn infer_category(operation: &str, message: &str) -> &'static str {
    let text = combined(operation, message);
    CATEGORIES
        .iter()
        .find(|(_, keywords)| contains_any(&text, keywords))
        .map(|(category, _)| *category)
        .unwrap_or("general")
}

/// Search terms: the operation, matching tags, then the raw text
pub fn searchable_terms(operation: &str, message: &str) -> String {
    let raw = format!("{} {}", operation, message);
    let text = raw.to_lowercase();

    let mut terms: Vec<&str> = Vec::new();
    if !operation.is_empty() {
        terms.push(operation);
    }
    terms.extend(
        SEARCH_TAGS
            .iter()
            .filter(|(_, keywords)| contains_any(&text, keywords))
            .map(|(tag, _)| *tag),
    );
    terms.push(&raw);
    terms.join(" ")
}

/// Known error pattern, `"unknown_pattern"` when nothing matches
pub fn detect_pattern(operation: &str, message: &str) -> &'static str {
    let text = combined(operation, message);
    PATTERNS
        .iter()
        .find(|(_, keywords)| contains_any(&text, keywords))
        .map(|(pattern, _)| *pattern)
        .unwrap_or(UNKNOWN_PATTERN)
}

/// Debugging hint for warnings and errors; `None` for lower levels
pub fn ai_suggestion(level: LogLevel, operation: &str, message: &str) -> Option<&'static str> {
    if level < LogLevel::Warn {
        return None;
    }

    let text = combined(operation, message);
    let suggestion = SUGGESTIONS
        .iter()
        .find(|(keywords, _)| contains_any(&text, keywords))
        .map(|(_, suggestion)| *suggestion)
        .unwrap_or(FALLBACK_SUGGESTION);
    Some(suggestion)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_score() {
        assert_eq!(severity_score(LogLevel::Debug), 1);
        assert_eq!(severity_score(LogLevel::Info), 2);
        assert_eq!(severity_score(LogLevel::Warn), 3);
        assert_eq!(severity_score(LogLevel::Error), 4);
    }

    #[test]
    fn test_infer_category() {
        assert_eq!(infer_category("user_login", "User logged in"), "user_action");
        assert_eq!(infer_category("fetch", "SQL statement prepared"), "database");
        assert_eq!(infer_category("proxy", "HTTP 200"), "api");
        assert_eq!(infer_category("flush", "disk sync"), "system");
        assert_eq!(infer_category("pricing", "business rule applied"), "business_logic");
        // "calculation" contains "io", so the system rule fires first
        assert_eq!(infer_category("pricing", "calculation finished"), "system");
        assert_eq!(infer_category("tick", "heartbeat"), "general");
    }

    #[test]
    fn test_category_first_match_wins() {
        // "user" and "database" both match; user_action comes first
        assert_eq!(infer_category("user", "database lookup"), "user_action");
    }

    #[test]
    fn test_searchable_terms() {
        let terms = searchable_terms("worker_init", "Startup failed after retry");
        assert_eq!(
            terms,
            "worker_init error start retry worker_init Startup failed after retry"
        );

        let terms = searchable_terms("", "hello");
        assert_eq!(terms, " hello");
    }

    #[test]
    fn test_detect_pattern() {
        assert_eq!(detect_pattern("insert", "Duplicate key value"), "database_error");
        assert_eq!(detect_pattern("call", "upstream returned 503"), "network_error");
        assert_eq!(detect_pattern("auth", "Invalid token supplied"), "auth_error");
        assert_eq!(detect_pattern("open", "Permission denied"), "filesystem_error");
        assert_eq!(detect_pattern("report", "slow query detected"), "performance_issue");
        assert_eq!(detect_pattern("parse", "malformed payload"), "validation_error");
        assert_eq!(detect_pattern("noop", "all good"), "unknown_pattern");
    }

    #[test]
    fn test_ai_suggestion_levels() {
        assert_eq!(ai_suggestion(LogLevel::Info, "db", "connection refused"), None);
        assert_eq!(ai_suggestion(LogLevel::Debug, "db", "connection refused"), None);
        assert_eq!(
            ai_suggestion(LogLevel::Error, "db", "connection refused"),
            Some("Check database connectivity and connection pool settings")
        );
    }

    #[test]
    fn test_ai_suggestion_rules() {
        assert_eq!(
            ai_suggestion(LogLevel::Warn, "lookup", "record not found"),
            Some("Verify query parameters and data existence")
        );
        assert_eq!(
            ai_suggestion(LogLevel::Warn, "gateway", "got 502"),
            Some("Verify upstream service health and load balancing")
        );
        assert_eq!(
            ai_suggestion(LogLevel::Error, "session", "token expired"),
            Some("Check token expiration and refresh mechanism")
        );
        assert_eq!(
            ai_suggestion(LogLevel::Error, "write", "permission denied"),
            Some("Check file permissions and user access rights")
        );
        assert_eq!(
            ai_suggestion(LogLevel::Warn, "form", "invalid email"),
            Some("Verify input data format and validation rules")
        );
        assert_eq!(
            ai_suggestion(LogLevel::Error, "job", "something odd"),
            Some("Review logs and investigate root cause")
        );
    }
}
