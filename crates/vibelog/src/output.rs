//! Terminal and JSON output formatting

use chrono::{DateTime, Local};
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};
use vibelog_core::{LoggerConfig, VersionInfo};

/// Global flag for JSON output mode
static JSON_MODE: AtomicBool = AtomicBool::new(false);

/// Enable or disable JSON output mode
pub fn set_json_mode(enabled: bool) {
    JSON_MODE.store(enabled, Ordering::SeqCst);
}

/// Check if JSON output mode is enabled
pub fn is_json_mode() -> bool {
    JSON_MODE.load(Ordering::SeqCst)
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing to JSON: {}", e),
    }
}

/// A rotated file as shown by `list`
#[derive(Debug, Serialize)]
pub struct RotatedFile {
    pub path: PathBuf,
    pub size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Local>>,
}

impl RotatedFile {
    pub fn from_path(path: &Path) -> Self {
        let meta = std::fs::metadata(path).ok();
        RotatedFile {
            path: path.to_path_buf(),
            size_bytes: meta.as_ref().map(|m| m.len()).unwrap_or(0),
            modified: meta
                .and_then(|m| m.modified().ok())
                .map(DateTime::<Local>::from),
        }
    }
}

#[derive(Tabled)]
struct RotatedRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "file")]
    file: String,
    #[tabled(rename = "size")]
    size: String,
    #[tabled(rename = "modified")]
    modified: String,
}

pub fn print_rotated_files(files: &[RotatedFile]) {
    if is_json_mode() {
        print_json(files);
        return;
    }

    if files.is_empty() {
        println!("No rotated files");
        return;
    }

    let rows: Vec<RotatedRow> = files
        .iter()
        .enumerate()
        .map(|(i, file)| RotatedRow {
            index: i + 1,
            file: file
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.path.display().to_string()),
            size: format_bytes(file.size_bytes),
            modified: file
                .modified
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::single(0)).with(Alignment::right()))
        .to_string();

    println!("{}", table);
}

/// Result of a `write` run
#[derive(Debug, Serialize)]
pub struct WriteSummary {
    pub file: PathBuf,
    pub entries: usize,
    pub file_size_bytes: u64,
    pub rotated_files: Vec<PathBuf>,
}

pub fn print_write_summary(summary: &WriteSummary) {
    if is_json_mode() {
        print_json(summary);
        return;
    }

    print_success(&format!(
        "Wrote {} entries to {} ({})",
        summary.entries,
        summary.file.display(),
        format_bytes(summary.file_size_bytes)
    ));
    if !summary.rotated_files.is_empty() {
        print_info(&format!("{} rotated file(s) retained", summary.rotated_files.len()));
    }
}

/// Result of a `rotate` run
#[derive(Debug, Serialize)]
pub struct RotateSummary {
    pub file: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotated_to: Option<PathBuf>,
    pub rotated_files: usize,
}

pub fn print_rotate_summary(summary: &RotateSummary) {
    if is_json_mode() {
        print_json(summary);
        return;
    }

    match &summary.rotated_to {
        Some(rotated) => print_success(&format!(
            "Rotated {} to {}",
            summary.file.display(),
            rotated.display()
        )),
        None => print_success(&format!("Rotated {}", summary.file.display())),
    }
}

#[derive(Serialize)]
struct ConfigJson<'a> {
    #[serde(flatten)]
    config: &'a LoggerConfig,
    resolved_file_path: &'a Path,
}

pub fn print_config(config: &LoggerConfig, resolved: &Path, source: Option<&Path>) {
    if is_json_mode() {
        print_json(&ConfigJson {
            config,
            resolved_file_path: resolved,
        });
        return;
    }

    let yes_no = |b: bool| if b { "yes".green() } else { "no".red() };
    let limit = |n: u64| {
        if n == 0 {
            "unlimited".to_string()
        } else {
            n.to_string()
        }
    };

    println!("{}", "─".repeat(50));
    println!(
        "  {} │ {}",
        "Source".bold(),
        source
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "defaults".to_string())
    );
    println!("  {} │ {}", "File".bold(), resolved.display());
    println!("  {} │ {}", "Environment".bold(), config.environment);
    if let Some(project) = &config.project_name {
        println!("  {} │ {}", "Project".bold(), project);
    }
    println!("{}", "─".repeat(50));
    println!("  {} │ {}", "Rotation".bold(), yes_no(config.rotation_enabled));
    println!(
        "  {} │ {}",
        "Max Size".bold(),
        if config.max_file_size == 0 {
            "unlimited".to_string()
        } else {
            format_bytes(config.max_file_size)
        }
    );
    println!(
        "  {} │ {}",
        "Max Files".bold(),
        limit(config.max_rotated_files as u64)
    );
    println!("  {} │ {}", "Async".bold(), yes_no(config.async_rotation));
    println!("{}", "─".repeat(50));
    println!("  {} │ {}", "Auto Save".bold(), yes_no(config.auto_save));
    println!("  {} │ {}", "Memory Log".bold(), yes_no(config.enable_memory_log));
    if config.enable_memory_log {
        println!(
            "  {} │ {}",
            "Memory Limit".bold(),
            limit(config.memory_log_limit as u64)
        );
    }
    println!("  {} │ {}", "Console".bold(), yes_no(config.console_output));
    println!("{}", "─".repeat(50));
}

pub fn print_version(info: &VersionInfo) {
    if is_json_mode() {
        print_json(info);
        return;
    }

    println!("vibelog {}", info.version);
    println!("  {} │ {}", "Target".bold(), info.rust_target);
    if let Some(pre) = &info.prerelease {
        println!("  {} │ {}", "Pre-release".bold(), pre);
    }
}

pub fn format_bytes(bytes: u64) -> String {
    if bytes >= 1_073_741_824 {
        format!("{:.1}G", bytes as f64 / 1_073_741_824.0)
    } else if bytes >= 1_048_576 {
        format!("{:.1}M", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.0}K", bytes as f64 / 1024.0)
    } else if bytes > 0 {
        format!("{}B", bytes)
    } else {
        "0B".to_string()
    }
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}
