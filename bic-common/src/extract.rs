//! Field extraction from job log transcripts
//!
//! Job logs are free text, but the voice logger writes them as labeled lines
//! (`Client: Jane Doe`, `Action: call back`). The quote form uses these
//! helpers to pre-fill itself; nothing here is authoritative and nothing here
//! fails. A label that is not found is simply an absent field.

use serde::{Deserialize, Serialize};

const CLIENT_LABELS: &[&str] = &["Client", "Customer", "Name"];
const CITY_LABELS: &[&str] = &["City"];
const SERVICE_LABELS: &[&str] = &["Service", "Service Type"];
const SQFT_LABELS: &[&str] = &["SqFt", "Sq Ft", "Square Feet", "Square Footage"];
const ACTION_LABEL: &str = "Action";
const IMPORTANT_LABEL: &str = "Important";
const PRIORITY_LABEL: &str = "Priority";

/// Job priority as chosen in the logger
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    fn parse_label(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

/// Fields recovered from a transcript
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFields {
    pub client: Option<String>,
    pub city: Option<String>,
    pub service: Option<String>,
    /// Square footage with everything but digits and dots removed
    pub sqft: Option<String>,
    pub actions: Vec<String>,
    pub important: bool,
    pub priority: Priority,
}

impl ExtractedFields {
    /// Square footage as a number, only when it is finite and positive
    pub fn sqft_value(&self) -> Option<f64> {
        self.sqft
            .as_deref()
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v > 0.0)
    }
}

/// Text following `label` at the start of `line` (label case-insensitive)
fn after_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let head = line.get(..label.len())?;
    head.eq_ignore_ascii_case(label).then(|| &line[label.len()..])
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

/// Value of `line` if it reads `<label>\s*:\s*<value>`
fn labeled_value<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    non_empty(after_label(line, label)?.trim_start().strip_prefix(':')?)
}

/// Value of an `Action:` line; the colon must follow the label directly
fn action_value(line: &str) -> Option<&str> {
    non_empty(after_label(line, ACTION_LABEL)?.strip_prefix(':')?)
}

/// First value for the first label (in preference order) that appears at all
fn first_labeled(lines: &[&str], labels: &[&str]) -> Option<String> {
    labels.iter().find_map(|label| {
        lines
            .iter()
            .find_map(|line| labeled_value(line, label))
            .map(str::to_string)
    })
}

/// Extract labeled fields from a multi-line note
pub fn extract_fields(text: &str) -> ExtractedFields {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let sqft = first_labeled(&lines, SQFT_LABELS)
        .map(|raw| {
            raw.chars()
                .filter(|c| c.is_ascii_digit() || *c == '.')
                .collect::<String>()
        })
        .filter(|s| !s.is_empty());

    let actions = lines
        .iter()
        .copied()
        .filter_map(action_value)
        .map(str::to_string)
        .collect();

    let important = first_labeled(&lines, &[IMPORTANT_LABEL])
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "yes" | "y" | "true"))
        .unwrap_or(false);

    let priority = first_labeled(&lines, &[PRIORITY_LABEL])
        .and_then(|v| Priority::parse_label(&v))
        .unwrap_or_default();

    ExtractedFields {
        client: first_labeled(&lines, CLIENT_LABELS),
        city: first_labeled(&lines, CITY_LABELS),
        service: first_labeled(&lines, SERVICE_LABELS),
        sqft,
        actions,
        important,
        priority,
    }
}

/// Structured logger input, the form side of a transcript
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobLogEntry {
    pub priority: Priority,
    pub important: bool,
    pub client: String,
    pub city: String,
    pub service: String,
    pub sqft: String,
    pub actions: Vec<String>,
    pub notes: String,
}

impl JobLogEntry {
    /// True when at least one field carries content
    pub fn has_content(&self) -> bool {
        [&self.client, &self.city, &self.service, &self.sqft, &self.notes]
            .iter()
            .any(|s| !s.trim().is_empty())
            || self.actions.iter().any(|a| !a.trim().is_empty())
    }
}

/// Render an entry as the labeled transcript stored on a job log
pub fn compose_transcript(entry: &JobLogEntry) -> String {
    let mut lines = vec![format!("{}: {}", PRIORITY_LABEL, entry.priority.as_str())];
    if entry.important {
        lines.push(format!("{}: Yes", IMPORTANT_LABEL));
    }

    for (label, value) in [
        ("Client", &entry.client),
        ("City", &entry.city),
        ("Service", &entry.service),
        ("SqFt", &entry.sqft),
    ] {
        let value = value.trim();
        if !value.is_empty() {
            lines.push(format!("{}: {}", label, value));
        }
    }

    lines.extend(
        entry
            .actions
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .map(|a| format!("{}: {}", ACTION_LABEL, a)),
    );

    let notes = entry.notes.trim();
    if !notes.is_empty() {
        lines.push(String::new());
        lines.push(notes.to_string());
    }

    lines.join("\n")
}
