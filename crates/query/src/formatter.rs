//! Reply rendering for pages of records.

use std::collections::HashSet;

use lifeline_config::FormatConfig;
use lifeline_core::{Markup, Record, Reply};
use serde_json::Value;

use crate::messages;

/// Renders pages of records as chat replies.
pub struct Formatter {
    phone_prefix: String,
    attribution: String,
    hidden: HashSet<String>,
}

impl Formatter {
    pub fn new(settings: &FormatConfig) -> Self {
        Self {
            phone_prefix: settings.phone_prefix.clone(),
            attribution: settings.attribution.clone(),
            hidden: settings
                .hidden_fields
                .iter()
                .map(|f| f.to_lowercase())
                .collect(),
        }
    }

    /// Render one page. An empty page means the dataset is exhausted.
    pub fn render_page(&self, page: &[Record], markup: Markup) -> Reply {
        if page.is_empty() {
            return Reply::plain(messages::NO_MORE);
        }

        let mut text = String::new();
        text.push_str(&markup.bold(messages::RESULTS_HEADER));
        text.push_str("\n\n");

        for record in page {
            self.render_record(record, markup, &mut text);
        }

        text.push_str(&format!(
            "Data fetched from - {}\n",
            markup.escape(&self.attribution)
        ));
        text.push_str(messages::MORE_INVITE);

        Reply { text, markup }
    }

    fn render_record(&self, record: &Record, markup: Markup, out: &mut String) {
        let Some(name) = record.name() else {
            return;
        };
        out.push_str(&markup.emphasis(name));
        out.push('\n');

        for (key, value) in record.fields() {
            if self.hidden.contains(&key.to_lowercase()) {
                continue;
            }
            let Some(shown) = self.display_value(key, value) else {
                continue;
            };
            out.push_str(&format!(
                "{} - {}\n",
                markup.bold(&field_label(key)),
                markup.escape(&shown)
            ));
        }
        out.push('\n');
    }

    /// Display text for a field, `None` when there is nothing to show.
    fn display_value(&self, key: &str, value: &Value) -> Option<String> {
        let text = scalar_text(value).or_else(|| match value {
            Value::Array(items) => {
                let parts: Vec<String> = items.iter().filter_map(scalar_text).collect();
                (!parts.is_empty()).then(|| parts.join(", "))
            }
            Value::Object(map) if !map.is_empty() => Some(Value::Object(map.clone()).to_string()),
            _ => None,
        })?;

        if key.to_lowercase().contains("phone") && looks_like_number(&text) {
            return Some(format!("{}{}", self.phone_prefix, text));
        }
        Some(text)
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim_end_matches(['\n', '\r']);
            (!s.trim().is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("Yes".into()),
        Value::Bool(false) => Some("No".into()),
        _ => None,
    }
}

/// Digits with optional spaces and dashes, not already international.
fn looks_like_number(text: &str) -> bool {
    let text = text.trim();
    !text.starts_with('+')
        && text.chars().any(|c| c.is_ascii_digit())
        && text
            .chars()
            .all(|c| c.is_ascii_digit() || c == ' ' || c == '-')
}

/// Human-readable label for a feed key: `phone1` → "Phone 1",
/// `contactName` → "Contact Name", `open_24x7` → "Open 24x7".
pub fn field_label(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev: Option<char> = None;

    for c in key.chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev = None;
            continue;
        }
        let boundary = match prev {
            Some(p) => {
                (p.is_lowercase() && c.is_uppercase())
                    || (p.is_alphabetic() && c.is_ascii_digit() && current.chars().all(char::is_alphabetic))
            }
            None => false,
        };
        if boundary && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(c);
        prev = Some(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
