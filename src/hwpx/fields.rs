use crate::model::{Field, Section};

/// Infer fields from every table with at least two columns: column 0 is the
/// field name, column 1 its content. Positions run across the whole document.
pub(super) fn infer_fields(sections: &[Section]) -> Vec<Field> {
    let mut fields = Vec::new();
    for table in sections.iter().flat_map(|s| &s.tables) {
        if table.cols < 2 {
            continue;
        }
        for row in 0..table.rows {
            let Some(name_cell) = table.cell(row, 0) else {
                continue;
            };
            let name = name_cell.content.trim();
            if name.is_empty() {
                continue;
            }
            let content = table
                .cell(row, 1)
                .map(|c| c.content.trim().to_string())
                .unwrap_or_default();
            fields.push(Field {
                name: name.to_string(),
                is_empty: content.is_empty(),
                content,
                position: fields.len(),
            });
        }
    }
    fields
}
