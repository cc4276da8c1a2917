use std::fs::{self, File};
use std::io::Write;
use std::ops::Range;
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;

use crate::error::Error;
use crate::model::FieldMap;

use super::container::Container;
use super::{
    CELL_TAG, ROW_TAG, RUN_TAG, TABLE_TAG, TEXT_TAG, find_all_strategies, find_first_strategy,
    first_named, is_section_part, run_text,
};

/// A replacement of `range` in the original part text.
struct Edit {
    range: Range<usize>,
    text: String,
}

/// Copy `template` to `output`, replacing the column-1 text of every table row
/// whose column-0 text matches a key of `mapping`. Everything else in the
/// container is carried over unchanged.
pub(crate) fn fill(template: &Path, mapping: &FieldMap, output: &Path) -> Result<PathBuf, Error> {
    Container::open(template)?;
    if !is_same_file(template, output) {
        fs::copy(template, output)?;
    }

    // Removed on drop, so every early return below cleans up too.
    let scratch = tempfile::Builder::new()
        .prefix(".hwpx-fill-")
        .tempdir_in(parent_dir(output))?;
    let extracted = scratch.path().join("parts");
    let packed = scratch.path().join("packed.hwpx");

    {
        let mut archive = zip::ZipArchive::new(File::open(output)?)?;
        archive.extract(&extracted)?;

        let mut sections: Vec<&str> = archive
            .file_names()
            .filter(|name| is_section_part(name))
            .collect();
        sections.sort();

        let mut patched = 0;
        for name in sections {
            if fill_section_file(&extracted.join(name), name, mapping)? {
                patched += 1;
            }
        }
        log::debug!("{patched} section part(s) modified");

        repack(&mut archive, &extracted, &packed)?;
    }

    fs::rename(&packed, output)?;
    scratch.close()?;
    Ok(output.to_path_buf())
}

pub(crate) fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Returns whether the part was rewritten.
fn fill_section_file(path: &Path, name: &str, mapping: &FieldMap) -> Result<bool, Error> {
    let data = fs::read(path)?;
    match patch_section(name, &data, mapping) {
        Some(patched) => {
            fs::write(path, patched)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// New part bytes, or `None` when nothing in the part matched.
fn patch_section(name: &str, data: &[u8], mapping: &FieldMap) -> Option<Vec<u8>> {
    let text = match std::str::from_utf8(data) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("Skipping section part {name}: {e}");
            return None;
        }
    };
    let (bom, body) = match text.strip_prefix('\u{feff}') {
        Some(body) => ("\u{feff}", body),
        None => ("", text),
    };
    let xml = match roxmltree::Document::parse(body) {
        Ok(xml) => xml,
        Err(e) => {
            log::warn!("Skipping section part {name}: {e}");
            return None;
        }
    };

    let edits = collect_edits(&xml, body, mapping);
    if edits.is_empty() {
        return None;
    }
    log::debug!("{name}: {} cell(s) filled", edits.len());

    let mut out = String::with_capacity(text.len());
    out.push_str(bom);
    out.push_str(&apply_edits(body, edits));
    Some(out.into_bytes())
}

fn collect_edits(xml: &roxmltree::Document, src: &str, mapping: &FieldMap) -> Vec<Edit> {
    let mut edits = Vec::new();
    for tbl in find_all_strategies(xml.root_element(), TABLE_TAG) {
        for tr in find_first_strategy(tbl, ROW_TAG) {
            let cells = find_first_strategy(tr, CELL_TAG);
            if cells.len() < 2 {
                continue;
            }
            let label = run_text(cells[0]);
            let label = label.trim();
            if label.is_empty() {
                continue;
            }
            let Some(value) = mapping.get(label) else {
                continue;
            };
            match cell_edit(src, cells[1], value) {
                Some(edit) => {
                    log::debug!("Filling {label:?}");
                    edits.push(edit);
                }
                None => log::debug!("No text run under the value cell of {label:?}, left unchanged"),
            }
        }
    }
    edits.sort_by_key(|e| e.range.start);
    edits
}

/// Overlapping or repeated edits (the same cell reached twice) keep the first.
fn apply_edits(src: &str, edits: Vec<Edit>) -> String {
    let mut out = String::with_capacity(src.len());
    let mut pos = 0;
    let mut last: Option<Range<usize>> = None;
    for edit in edits {
        if edit.range.start < pos || last.as_ref() == Some(&edit.range) {
            continue;
        }
        last = Some(edit.range.clone());
        out.push_str(&src[pos..edit.range.start]);
        out.push_str(&edit.text);
        pos = edit.range.end;
    }
    out.push_str(&src[pos..]);
    out
}

fn cell_edit(src: &str, cell: roxmltree::Node, value: &str) -> Option<Edit> {
    let escaped = escape_text(value);
    if let Some(t) = first_named(cell, TEXT_TAG) {
        return Some(replace_text(src, t, escaped));
    }
    let run = first_named(cell, RUN_TAG)?;
    append_text_run(src, run, escaped)
}

/// Overwrite the leading text of a text-run element, keeping any child elements.
/// The leading text spans from the start tag to the first non-text child or the
/// end tag, CDATA sections included.
fn replace_text(src: &str, t: roxmltree::Node, escaped: String) -> Edit {
    let range = t.range();
    let gt = start_tag_end(src, range.start);
    if is_self_closing(src, gt) {
        return Edit {
            range: gt - 1..gt + 1,
            text: format!(">{escaped}</{}>", qualified_name(src, range.start)),
        };
    }
    let inner = gt + 1;
    let end = if t.first_child().is_some_and(|c| c.is_text()) {
        t.children()
            .find(|c| !c.is_text())
            .map(|c| c.range().start)
            .or_else(|| src[range.clone()].rfind("</").map(|i| range.start + i))
            .unwrap_or(inner)
    } else {
        inner
    };
    Edit {
        range: inner..end,
        text: escaped,
    }
}

/// Append a new text-run to `run`, written with the run's own prefix so the
/// existing namespace binding applies.
fn append_text_run(src: &str, run: roxmltree::Node, escaped: String) -> Option<Edit> {
    let range = run.range();
    let run_name = qualified_name(src, range.start);
    let t_name = match run_name.split_once(':') {
        Some((prefix, _)) => format!("{prefix}:{TEXT_TAG}"),
        None => TEXT_TAG.to_string(),
    };
    let element = format!("<{t_name}>{escaped}</{t_name}>");

    let gt = start_tag_end(src, range.start);
    if is_self_closing(src, gt) {
        return Some(Edit {
            range: gt - 1..gt + 1,
            text: format!(">{element}</{run_name}>"),
        });
    }
    let close = range.start + src[range.clone()].rfind("</")?;
    Some(Edit {
        range: close..close,
        text: element,
    })
}

/// Byte offset of the `>` closing the start tag that begins at `start`.
fn start_tag_end(src: &str, start: usize) -> usize {
    let mut quote = None;
    for (i, b) in src.bytes().enumerate().skip(start) {
        match (quote, b) {
            (None, b'"' | b'\'') => quote = Some(b),
            (Some(q), _) if q == b => quote = None,
            (None, b'>') => return i,
            _ => {}
        }
    }
    src.len()
}

fn is_self_closing(src: &str, gt: usize) -> bool {
    gt > 0 && gt < src.len() && src.as_bytes()[gt - 1] == b'/'
}

/// The tag name as written in the source, prefix included.
fn qualified_name(src: &str, start: usize) -> &str {
    let rest = &src[start + 1..];
    let end = rest
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(rest.len());
    &rest[..end]
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Rebuild the archive from the scratch tree, keeping the original entry
/// order, compression methods and timestamps.
fn repack(archive: &mut zip::ZipArchive<File>, extracted: &Path, packed: &Path) -> Result<(), Error> {
    let mut writer = zip::ZipWriter::new(File::create(packed)?);
    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        let name = entry.name().to_string();
        let mut options = SimpleFileOptions::default().compression_method(entry.compression());
        if let Some(modified) = entry.last_modified() {
            options = options.last_modified_time(modified);
        }
        if entry.is_dir() {
            writer.add_directory(name, options)?;
            continue;
        }
        let Some(relative) = entry.enclosed_name() else {
            log::warn!("Dropping archive entry with unsafe path: {name}");
            continue;
        };
        drop(entry);

        let data = fs::read(extracted.join(relative))?;
        writer.start_file(name, options)?;
        writer.write_all(&data)?;
    }
    writer.finish()?;
    Ok(())
}
