use crate::error::MalformedPart;
use crate::model::{Cell, Section, Table};

use super::{
    CELL_TAG, PARAGRAPH_TAG, ROW_TAG, TABLE_TAG, find_all_strategies, find_first_strategy,
    run_text,
};

pub(super) fn parse_section(name: &str, data: &[u8], index: usize) -> Result<Section, MalformedPart> {
    let malformed = |message: String| MalformedPart {
        part: name.to_string(),
        message,
    };
    let text = std::str::from_utf8(data).map_err(|e| malformed(e.to_string()))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let xml = roxmltree::Document::parse(text).map_err(|e| malformed(e.to_string()))?;
    let root = xml.root_element();

    Ok(Section {
        index,
        tables: parse_tables(root),
        paragraphs: parse_paragraphs(root),
    })
}

fn parse_tables(root: roxmltree::Node) -> Vec<Table> {
    find_all_strategies(root, TABLE_TAG)
        .into_iter()
        .enumerate()
        .filter_map(|(index, tbl)| parse_table(tbl, index))
        .collect()
}

/// Declared `rowCnt`/`colCnt`; absent or unparseable counts read as 0.
fn declared_count(tbl: roxmltree::Node, attr: &str) -> usize {
    tbl.attribute(attr)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}

fn parse_table(tbl: roxmltree::Node, index: usize) -> Option<Table> {
    let row_nodes = find_first_strategy(tbl, ROW_TAG);

    let mut rows = declared_count(tbl, "rowCnt");
    let mut cols = declared_count(tbl, "colCnt");
    if rows == 0 || cols == 0 {
        rows = row_nodes.len();
    }

    let mut cells = Vec::new();
    for (row, tr) in row_nodes.into_iter().enumerate() {
        for (col, tc) in find_first_strategy(tr, CELL_TAG).into_iter().enumerate() {
            cells.push(Cell::new(row, col, run_text(tc)));
        }
    }

    // Observed coordinates override the declared counts.
    if let (Some(max_row), Some(max_col)) = (
        cells.iter().map(|c| c.row).max(),
        cells.iter().map(|c| c.col).max(),
    ) {
        rows = max_row + 1;
        cols = max_col + 1;
    }

    if rows == 0 || cols == 0 {
        return None;
    }
    Some(Table {
        index,
        rows,
        cols,
        cells,
    })
}

fn parse_paragraphs(root: roxmltree::Node) -> Vec<String> {
    find_first_strategy(root, PARAGRAPH_TAG)
        .into_iter()
        .map(run_text)
        .filter(|text| !text.is_empty())
        .collect()
}
