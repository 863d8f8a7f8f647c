//! Command reports
//!
//! A [`Report`] is an ordered list of named entries. It renders either as a
//! JSON object for `--json` or as an indented, column-aligned text block.

use serde_json::{Map, Value};
use std::fmt::{Display, Write};

/// How a report is written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Aligned `key: value` lines
    Text,
    /// Pretty-printed JSON object
    Json,
}

impl Format {
    /// Pick the format from the global `--json` flag
    pub fn from_flag(json: bool) -> Self {
        if json {
            Format::Json
        } else {
            Format::Text
        }
    }
}

#[derive(Debug, Clone)]
enum Entry {
    Text(String),
    Number(u64),
    Flag(bool),
    List(Vec<String>),
    Section(Report),
}

impl Entry {
    fn to_json(&self) -> Value {
        match self {
            Entry::Text(s) => Value::String(s.clone()),
            Entry::Number(n) => Value::Number((*n).into()),
            Entry::Flag(b) => Value::Bool(*b),
            Entry::List(items) => Value::Array(items.iter().cloned().map(Value::String).collect()),
            Entry::Section(report) => report.to_json(),
        }
    }
}

/// Ordered command output
#[derive(Debug, Clone, Default)]
pub struct Report {
    title: Option<String>,
    entries: Vec<(String, Entry)>,
}

impl Report {
    /// Report whose text form starts with `title`. The title is not part of the JSON form.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            entries: Vec::new(),
        }
    }

    /// Report without a heading, used for nested sections
    pub fn section() -> Self {
        Self::default()
    }

    fn push(mut self, key: &str, entry: Entry) -> Self {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = entry,
            None => self.entries.push((key.to_string(), entry)),
        }
        self
    }

    /// Add a displayable value
    pub fn text(self, key: &str, value: impl Display) -> Self {
        self.push(key, Entry::Text(value.to_string()))
    }

    /// Add a counter
    pub fn number(self, key: &str, value: u64) -> Self {
        self.push(key, Entry::Number(value))
    }

    /// Add a yes/no value
    pub fn flag(self, key: &str, value: bool) -> Self {
        self.push(key, Entry::Flag(value))
    }

    /// Add a list of strings, one per line in text form
    pub fn list<I, T>(self, key: &str, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Display,
    {
        self.push(key, Entry::List(items.into_iter().map(|i| i.to_string()).collect()))
    }

    /// Nest another report under `key`
    pub fn nest(self, key: &str, report: Report) -> Self {
        self.push(key, Entry::Section(report))
    }

    /// JSON object form
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (key, entry) in &self.entries {
            map.insert(key.clone(), entry.to_json());
        }
        Value::Object(map)
    }

    /// Text form
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let depth = match &self.title {
            Some(title) => {
                out.push_str(title);
                out.push('\n');
                1
            }
            None => 0,
        };
        self.write_entries(&mut out, depth);
        out
    }

    fn write_entries(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        let width = self.entries.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        for (key, entry) in &self.entries {
            match entry {
                Entry::Text(s) => {
                    let _ = writeln!(out, "{indent}{:<width$}  {s}", format!("{key}:"), width = width + 1);
                }
                Entry::Number(n) => {
                    let _ = writeln!(out, "{indent}{:<width$}  {n}", format!("{key}:"), width = width + 1);
                }
                Entry::Flag(b) => {
                    let shown = if *b { "yes" } else { "no" };
                    let _ = writeln!(out, "{indent}{:<width$}  {shown}", format!("{key}:"), width = width + 1);
                }
                Entry::List(items) => {
                    let _ = writeln!(out, "{indent}{key}: ({})", items.len());
                    for item in items {
                        let _ = writeln!(out, "{indent}  - {item}");
                    }
                }
                Entry::Section(report) => {
                    let _ = writeln!(out, "{indent}{key}:");
                    report.write_entries(out, depth + 1);
                }
            }
        }
    }

    /// Write to stdout in `format`
    pub fn emit(&self, format: Format) {
        match format {
            Format::Json => {
                println!("{}", serde_json::to_string_pretty(&self.to_json()).unwrap_or_default());
            }
            Format::Text => print!("{}", self.to_text()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Report {
        Report::titled("Session ready")
            .text("owner", "0x1")
            .number("ledger_declares", 5)
            .flag("dispatcher_consistent", true)
            .nest("classes", Report::section().text("proxy", "0xabc").list("entry_points", ["initialize"]))
    }

    #[test]
    fn test_json_form_nests_sections() {
        assert_eq!(
            sample().to_json(),
            json!({
                "owner": "0x1",
                "ledger_declares": 5,
                "dispatcher_consistent": true,
                "classes": { "proxy": "0xabc", "entry_points": ["initialize"] },
            })
        );
    }

    #[test]
    fn test_text_form_aligns_keys() {
        let text = sample().to_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Session ready");
        assert_eq!(lines[1], "  owner:                  0x1");
        assert_eq!(lines[2], "  ledger_declares:        5");
        assert_eq!(lines[3], "  dispatcher_consistent:  yes");
        assert_eq!(lines[4], "  classes:");
        assert_eq!(lines[5], "    proxy:         0xabc");
        assert_eq!(lines[6], "    entry_points: (1)");
        assert_eq!(lines[7], "      - initialize");
    }

    #[test]
    fn test_repeated_key_replaces_in_place() {
        let report = Report::section().text("a", 1).text("b", 2).text("a", 3);
        assert_eq!(report.to_text(), "a:  3\nb:  2\n");
    }

    #[test]
    fn test_empty_list_in_text_form() {
        let report = Report::titled("0 vectors").list("ids", Vec::<String>::new());
        assert_eq!(report.to_text(), "0 vectors\n  ids: (0)\n");
        assert_eq!(report.to_json(), json!({ "ids": [] }));
    }

    #[test]
    fn test_format_from_flag() {
        assert_eq!(Format::from_flag(true), Format::Json);
        assert_eq!(Format::from_flag(false), Format::Text);
    }
}
