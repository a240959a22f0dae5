use env_logger::{Builder, Target, WriteStyle};
use log::{error, info, warn, LevelFilter};
use std::fs::OpenOptions;

use crate::modules::config::Settings;

/// Initialize logging from settings: file output when `log_file` is set,
/// stderr otherwise. Calling it twice is harmless.
pub fn initialize_logging(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = Builder::new();
    builder
        .filter_level(LevelFilter::Info)
        .parse_filters(&settings.log_level)
        .format_timestamp_secs()
        .format_module_path(true)
        .write_style(WriteStyle::Auto);

    if let Some(path) = &settings.log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    if builder.try_init().is_ok() {
        info!("Logging system initialized");
    }
    Ok(())
}

/// Mask all but the edges of an identifier before it reaches a log line
pub(crate) fn format_sensitive(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}

/// Structured logging for login, logout and authentication events
pub fn log_auth_event(event_type: &str, subject: &str, success: bool, details: Option<&str>) {
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    if success {
        info!(
            "Auth event: type={}, subject={}, success=true, timestamp={}, details={:?}",
            event_type,
            format_sensitive(subject),
            timestamp,
            details
        );
    } else {
        warn!(
            "Auth event: type={}, subject={}, success=false, timestamp={}, details={:?}",
            event_type,
            format_sensitive(subject),
            timestamp,
            details
        );
    }
}

/// Structured logging for record state changes
pub fn log_data_operation(
    operation: &str,
    subject: &str,
    resource: &str,
    success: bool,
    details: Option<&str>,
) {
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    if success {
        info!(
            "Data operation: op={}, subject={}, resource={}, success=true, timestamp={}, details={:?}",
            operation,
            format_sensitive(subject),
            resource,
            timestamp,
            details
        );
    } else {
        error!(
            "Data operation: op={}, subject={}, resource={}, success=false, timestamp={}, details={:?}",
            operation,
            format_sensitive(subject),
            resource,
            timestamp,
            details
        );
    }
}
