//! Marker popup content.

use std::fmt;

use crate::geoip::GeoRecord;

/// One labeled popup line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupLine {
    pub label: &'static str,
    pub value: String,
}

/// Structured popup content; surfaces render it as they see fit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopupContent {
    lines: Vec<PopupLine>,
}

impl PopupContent {
    /// City, region, country and org lines, each only when present and non-empty.
    pub fn from_record(record: &GeoRecord) -> Self {
        let fields = [
            ("City", &record.city),
            ("Region", &record.region),
            ("Country", &record.country),
            ("Org", &record.org),
        ];
        let lines = fields
            .into_iter()
            .filter_map(|(label, value)| {
                value
                    .as_deref()
                    .filter(|v| !v.trim().is_empty())
                    .map(|v| PopupLine {
                        label,
                        value: v.to_string(),
                    })
            })
            .collect();
        Self { lines }
    }

    pub fn lines(&self) -> &[PopupLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// HTML fragment with one `<b>Label:</b> value` line per field.
    pub fn to_html(&self) -> String {
        self.lines
            .iter()
            .map(|line| format!("<b>{}:</b> {}", line.label, escape_html(&line.value)))
            .collect::<Vec<_>>()
            .join("<br>")
    }
}

impl fmt::Display for PopupContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}: {}", line.label, line.value)?;
        }
        Ok(())
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
