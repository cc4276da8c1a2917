use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::MalformedPart;

/// Field name → replacement text, as consumed by fill operations.
pub type FieldMap = BTreeMap<String, String>;

#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
    pub content: String,
    pub row_span: usize, // always 1: merge metadata is not read
    pub col_span: usize,
}

impl Cell {
    pub fn new(row: usize, col: usize, content: String) -> Self {
        Self {
            row,
            col,
            content,
            row_span: 1,
            col_span: 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    /// Ordinal of the table element within its section, counting discarded tables.
    pub index: usize,
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<Cell>,
}

impl Table {
    /// Cell at `(row, col)`. With duplicate coordinates the last one wins.
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cells
            .iter()
            .rev()
            .find(|c| c.row == row && c.col == col)
    }

    /// Trimmed cell texts laid out on the `rows × cols` grid; missing cells are empty.
    pub fn grid(&self) -> Vec<Vec<&str>> {
        let mut grid = vec![vec![""; self.cols]; self.rows];
        for cell in &self.cells {
            if cell.row < self.rows && cell.col < self.cols {
                grid[cell.row][cell.col] = cell.content.trim();
            }
        }
        grid
    }

    pub fn to_markdown(&self) -> String {
        if self.cells.is_empty() {
            return String::new();
        }
        let mut lines = Vec::with_capacity(self.rows + 1);
        for (i, row) in self.grid().iter().enumerate() {
            let escaped: Vec<String> = row.iter().map(|c| c.replace('|', "\\|")).collect();
            lines.push(format!("| {} |", escaped.join(" | ")));
            if i == 0 {
                lines.push(format!("|{}|", vec!["---"; self.cols].join("|")));
            }
        }
        lines.join("\n")
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Section {
    pub index: usize,
    pub paragraphs: Vec<String>,
    pub tables: Vec<Table>,
}

impl Section {
    pub fn empty(index: usize) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }
}

/// A name/value pair inferred from a row of a two-column table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub content: String,
    pub position: usize,
    pub is_empty: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub file_path: PathBuf,
    pub sections: Vec<Section>,
    pub fields: Vec<Field>,
    /// Section parts that could not be parsed and were replaced by empty sections.
    pub warnings: Vec<MalformedPart>,
}

impl Document {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            sections: Vec::new(),
            fields: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn empty_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.is_empty)
    }

    pub fn filled_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| !f.is_empty)
    }

    pub fn to_structure_markdown(&self) -> String {
        crate::report::render_report(self)
    }
}
