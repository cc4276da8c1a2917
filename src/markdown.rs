//! Field values from a Markdown file.
//!
//! ```text
//! # Field name
//! value line
//! another value line
//!
//! ## Other field
//! value
//! ```
//!
//! A `#` or `##` heading names a field; its value is the block of non-empty
//! lines right after it; lines holding only spaces belong to the value.
//! Deeper headings (`###`) are ordinary value lines.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Error;
use crate::model::FieldMap;

static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#{1,2}[ \t]+(.+?)\s*$").expect("heading pattern is valid")
});

pub fn parse_markdown_content(path: &Path) -> Result<FieldMap, Error> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_markdown_str(&content))
}

pub fn parse_markdown_str(content: &str) -> FieldMap {
    let mut fields = FieldMap::new();
    let mut lines = content.lines().peekable();

    while let Some(line) = lines.next() {
        let Some(caps) = HEADING.captures(line) else {
            continue;
        };
        let name = caps[1].trim().to_string();

        while lines.peek().is_some_and(|l| l.trim().is_empty()) {
            lines.next();
        }
        let mut value = Vec::new();
        while let Some(next) = lines.peek() {
            if next.is_empty() || HEADING.is_match(next) {
                break;
            }
            value.push(*next);
            lines.next();
        }

        let value = value.join("\n").trim().to_string();
        if !name.is_empty() && !value.is_empty() {
            fields.insert(name, value);
        }
    }
    fields
}
