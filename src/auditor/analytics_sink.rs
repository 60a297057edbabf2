use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

pub const SEO_CATEGORY: &str = "SEO";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryEvent {
    pub category: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<u64>,
}

impl TelemetryEvent {
    pub fn labelled(action: &str, label: &str) -> Self {
        Self {
            category: SEO_CATEGORY.to_string(),
            action: action.to_string(),
            label: Some(label.to_string()),
            value: None,
        }
    }

    pub fn valued(action: &str, value: u64) -> Self {
        Self {
            category: SEO_CATEGORY.to_string(),
            action: action.to_string(),
            label: None,
            value: Some(value),
        }
    }
}

/// Receives one event per check the auditor performs. Implementations must
/// not fail the audit: a sink that cannot deliver just drops the event.
pub trait AnalyticsSink: Send + Sync + 'static {
    fn log_event(&self, event: TelemetryEvent);
}

/// Default sink, forwards events to the `analytics` log target.
#[derive(Clone, Default)]
pub struct LogAnalyticsSink {}

impl LogAnalyticsSink {
    pub fn new() -> Self {
        Self {}
    }
}

impl AnalyticsSink for LogAnalyticsSink {
    fn log_event(&self, event: TelemetryEvent) {
        log::debug!(
            target: "analytics",
            "{} / {} / {} / {}",
            event.category,
            event.action,
            event.label.as_deref().unwrap_or("-"),
            event.value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
        );
    }
}

/// Appends every event as one JSON object per line.
pub struct JsonLinesAnalyticsSink {
    file: Mutex<File>,
}

impl JsonLinesAnalyticsSink {
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AnalyticsSink for JsonLinesAnalyticsSink {
    fn log_event(&self, event: TelemetryEvent) {
        let line = match serde_json::to_string(&event) {
            Ok(line) => line,
            Err(e) => {
                log::debug!("Dropping telemetry event: {}", e);
                return;
            }
        };
        let Ok(mut file) = self.file.lock() else {
            return;
        };
        if let Err(e) = writeln!(file, "{}", line) {
            log::debug!("Dropping telemetry event: {}", e);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_lines_sink_appends_one_object_per_event() {
        let path = std::env::temp_dir().join(format!("pixel-audit-events-{}.jsonl", std::process::id()));
        let _ = std::fs::remove_file(&path);
        {
            let sink = JsonLinesAnalyticsSink::create(&path).unwrap();
            sink.log_event(TelemetryEvent::valued("Title Length", 42));
            sink.log_event(TelemetryEvent::labelled("Mobile Friendly", "Yes"));
        }
        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            r#"{"category":"SEO","action":"Title Length","value":42}"#
        );
        assert_eq!(
            lines[1],
            r#"{"category":"SEO","action":"Mobile Friendly","label":"Yes"}"#
        );
        let _ = std::fs::remove_file(&path);
    }
}
