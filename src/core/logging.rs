//! Process logging built on `flexi_logger`
//!
//! Everything in the crate logs through the `log` facade; this module only
//! installs the backend. The logger is started once per process and its handle
//! kept for the life of the process so file output stays open.

use colored::Colorize;
use std::sync::{Mutex, OnceLock};

static LOGGER_HANDLE: OnceLock<Mutex<flexi_logger::LoggerHandle>> = OnceLock::new();

/// Levels accepted by `--log-level`, lowest verbosity last
pub const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Output formats accepted by `--log-format`
pub const LOG_FORMATS: [&str; 3] = ["text", "ext", "json"];

/// Resolve the effective level from an explicit level and `-v`/`-q` counts
///
/// An explicit level wins. Otherwise each `-v` moves one step towards `trace`
/// and each `-q` one step towards `off`, starting from `info`.
pub fn effective_level(log_level: Option<&str>, verbosity: i8) -> &'static str {
    if let Some(level) = log_level {
        if let Some(known) = LOG_LEVELS.iter().find(|l| l.eq_ignore_ascii_case(level)) {
            return known;
        }
    }
    let info_index = 2i16;
    let index = (info_index - verbosity as i16).clamp(0, LOG_LEVELS.len() as i16 - 1);
    LOG_LEVELS[index as usize]
}

/// Start the process logger
///
/// Fails if the level spec or file path is invalid, or if a logger is
/// already installed in this process.
pub fn init_logging(
    log_level: &str,
    log_format: Option<&str>,
    log_file: Option<&std::path::Path>,
    color_enabled: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    use flexi_logger::{Duplicate, FileSpec, Logger};

    let mut logger = Logger::try_with_str(log_level)?;

    logger = match log_format.unwrap_or("text") {
        "json" => logger.format(json_format),
        "ext" if color_enabled => logger.format(extended_color_format),
        "ext" => logger.format(extended_format),
        _ if color_enabled => logger.format(simple_color_format),
        _ => logger.format(simple_format),
    };

    if let Some(file_path) = log_file {
        let file_spec = FileSpec::try_from(file_path)?;
        // file output never carries colour codes; stderr keeps every line
        logger = logger
            .log_to_file(file_spec)
            .format_for_files(extended_format)
            .duplicate_to_stderr(Duplicate::All);
    }

    let handle = logger.start()?;
    let _ = LOGGER_HANDLE.set(Mutex::new(handle));

    Ok(())
}

fn level_abbr(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "ERR",
        log::Level::Warn => "WRN",
        log::Level::Info => "INF",
        log::Level::Debug => "DBG",
        log::Level::Trace => "TRC",
    }
}

// "YYYY-MM-DD HH:mm:ss.fff INF message"
fn simple_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "{} {} {}",
        now.format("%Y-%m-%d %H:%M:%S%.3f"),
        level_abbr(record.level()),
        record.args()
    )
}

fn simple_color_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "{} {} {}",
        now.format("%Y-%m-%d %H:%M:%S%.3f").to_string().dimmed(),
        colored_level(record.level()),
        record.args()
    )
}

// "YYYY-MM-DD HH:mm:ss.fff INF message (plugin/orchestrator.rs:42)"
fn extended_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "{} {} {} ({})",
        now.format("%Y-%m-%d %H:%M:%S%.3f"),
        level_abbr(record.level()),
        record.args(),
        format_target_as_path(record.target(), record.line())
    )
}

fn extended_color_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "{} {} {} ({})",
        now.format("%Y-%m-%d %H:%M:%S%.3f").to_string().dimmed(),
        colored_level(record.level()),
        record.args(),
        format_target_as_path(record.target(), record.line()).dimmed()
    )
}

fn json_format(
    w: &mut dyn std::io::Write,
    now: &mut flexi_logger::DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    let json_obj = serde_json::json!({
        "timestamp": now.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        "level": level_abbr(record.level()),
        "message": record.args().to_string(),
        "target": format_target_as_path(record.target(), record.line())
    });

    match serde_json::to_string(&json_obj) {
        Ok(json_string) => w.write_all(json_string.as_bytes()),
        Err(_) => w.write_all(b"{\"error\":\"Failed to serialize log message\"}"),
    }
}

fn colored_level(level: log::Level) -> colored::ColoredString {
    match level {
        log::Level::Error => "ERR".red().bold(),
        log::Level::Warn => "WRN".yellow(),
        log::Level::Info => "INF".green(),
        log::Level::Debug => "DBG".blue(),
        log::Level::Trace => "TRC".magenta(),
    }
}

// pickman::plugin::orchestrator -> plugin/orchestrator.rs:42
fn format_target_as_path(target: &str, line: Option<u32>) -> String {
    let path_like = match target.strip_prefix("pickman::") {
        Some(without_prefix) => without_prefix.replace("::", "/") + ".rs",
        None => target.replace("::", "/"),
    };

    match line {
        Some(line_num) => format!("{}:{}", path_like, line_num),
        None => path_like,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flexi_logger::DeferredNow;
    use serial_test::serial;

    fn render(
        format: fn(
            &mut dyn std::io::Write,
            &mut DeferredNow,
            &log::Record,
        ) -> Result<(), std::io::Error>,
        target: &str,
    ) -> String {
        let mut buffer = Vec::new();
        let mut now = DeferredNow::new();
        let record = log::Record::builder()
            .level(log::Level::Info)
            .target(target)
            .line(Some(42))
            .args(format_args!("Collector plugin was configured (col1)"))
            .build();

        format(&mut buffer, &mut now, &record).expect("format should succeed");
        String::from_utf8(buffer).expect("output should be valid UTF-8")
    }

    #[test]
    fn test_effective_level_prefers_explicit_level() {
        assert_eq!(effective_level(Some("debug"), -2), "debug");
        assert_eq!(effective_level(Some("WARN"), 0), "warn");
    }

    #[test]
    fn test_effective_level_from_verbosity() {
        assert_eq!(effective_level(None, 0), "info");
        assert_eq!(effective_level(None, 1), "debug");
        assert_eq!(effective_level(None, 5), "trace");
        assert_eq!(effective_level(None, -1), "warn");
        assert_eq!(effective_level(None, -10), "off");
        assert_eq!(effective_level(Some("loud"), 0), "info");
    }

    #[test]
    fn test_simple_format_layout() {
        let output = render(simple_format, "pickman::plugin::orchestrator");
        assert!(output.contains("INF Collector plugin was configured (col1)"));
        assert!(!output.contains("orchestrator.rs"));
    }

    #[test]
    fn test_extended_format_includes_target_path() {
        let output = render(extended_format, "pickman::plugin::orchestrator");
        assert!(
            output.ends_with("(plugin/orchestrator.rs:42)"),
            "unexpected output: {}",
            output
        );
    }

    #[test]
    fn test_json_format_is_single_object() {
        let output = render(json_format, "reqwest::connect");
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["level"], "INF");
        assert_eq!(value["target"], "reqwest/connect:42");
        assert_eq!(value["message"], "Collector plugin was configured (col1)");
        assert!(!output.contains('\n'));
    }

    #[test]
    #[serial]
    fn test_init_logging_to_file_keeps_handle() {
        let temp = tempfile::TempDir::new().unwrap();
        let log_file = temp.path().join("pickman.log");

        init_logging("info", Some("ext"), Some(&log_file), false).unwrap();
        log::info!("Collector plugin was configured (col1)");

        assert!(LOGGER_HANDLE.get().is_some());
        // a second logger cannot be installed
        assert!(init_logging("info", None, None, false).is_err());
    }
}
