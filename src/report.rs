//! Markdown structure report.
//!
//! The headings are scraped by downstream tooling, so their wording and the
//! blank-line layout are fixed.

use std::path::{Path, PathBuf};

use crate::model::{Document, Section};

const PREVIEW_CHARS: usize = 50;

pub fn render_report(doc: &Document) -> String {
    let file_name = doc
        .file_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut lines = vec![
        format!("# 문서 구조 분석: {file_name}"),
        String::new(),
        format!("**원본 파일**: `{}`", doc.file_path.display()),
        format!("**섹션 수**: {}", doc.sections.len()),
        String::new(),
    ];

    if !doc.fields.is_empty() {
        render_fields(doc, &mut lines);
    }
    for section in &doc.sections {
        render_section(section, &mut lines);
    }

    lines.join("\n")
}

fn render_fields(doc: &Document, lines: &mut Vec<String>) {
    lines.push("## 필드 목록".into());
    lines.push(String::new());

    let empty: Vec<_> = doc.empty_fields().collect();
    if !empty.is_empty() {
        lines.push("### 빈 필드 (채워야 할 항목)".into());
        for field in empty {
            lines.push(format!("- **{}**: _(빈 칸)_", field.name));
        }
        lines.push(String::new());
    }

    let filled: Vec<_> = doc.filled_fields().collect();
    if !filled.is_empty() {
        lines.push("### 기존 내용이 있는 필드".into());
        for field in filled {
            lines.push(format!("- **{}**: {}", field.name, preview(&field.content)));
        }
        lines.push(String::new());
    }
}

fn render_section(section: &Section, lines: &mut Vec<String>) {
    lines.push(format!("## 섹션 {}", section.index + 1));
    lines.push(String::new());

    if !section.tables.is_empty() {
        lines.push(format!("### 표 ({}개)", section.tables.len()));
        lines.push(String::new());
        for table in &section.tables {
            lines.push(format!(
                "#### 표 {} ({}행 x {}열)",
                table.index + 1,
                table.rows,
                table.cols
            ));
            lines.push(String::new());
            lines.push(table.to_markdown());
            lines.push(String::new());
        }
    }

    if !section.paragraphs.is_empty() {
        lines.push("### 텍스트 내용".into());
        lines.push(String::new());
        for para in &section.paragraphs {
            let para = para.trim();
            if !para.is_empty() {
                lines.push(para.to_string());
                lines.push(String::new());
            }
        }
    }
}

/// First 50 characters, with `...` appended when truncated.
fn preview(content: &str) -> String {
    match content.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

/// Default report location: `<stem>_structure.md` beside the source document.
pub fn default_report_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    source.with_file_name(format!("{stem}_structure.md"))
}
