mod dispatch;
mod error;
mod hwpx;
mod markdown;
mod model;
mod registry;
mod report;

pub use dispatch::{
    Dispatcher, DocumentBackend, Format, FormatSupport, HwpxBackend, SupportInfo,
    UnavailableLegacyBackend,
};
pub use error::{ContainerError, Error, MalformedPart};
pub use markdown::{parse_markdown_content, parse_markdown_str};
pub use model::{Cell, Document, Field, FieldMap, Section, Table};
pub use registry::{JsonTemplateRegistry, TemplateRecord, TemplateRegistry};
pub use report::{default_report_path, render_report};

use std::path::{Path, PathBuf};
use std::time::Instant;

/// Analyze a `.hwpx` or `.hwp` document with the default backends.
pub fn analyze_document(path: &Path) -> Result<Document, Error> {
    let t0 = Instant::now();

    let doc = Dispatcher::new().analyze(path)?;

    log::info!(
        "Analyzed {} in {:.1}ms: {} section(s), {} field(s), {} malformed part(s)",
        path.display(),
        t0.elapsed().as_secs_f64() * 1000.0,
        doc.sections.len(),
        doc.fields.len(),
        doc.warnings.len(),
    );
    Ok(doc)
}

/// Fill `template` with `mapping` and write the result to `output`.
pub fn fill_document(template: &Path, mapping: &FieldMap, output: &Path) -> Result<PathBuf, Error> {
    let t0 = Instant::now();

    let written = Dispatcher::new().fill(template, mapping, output)?;

    log::info!(
        "Filled {} -> {} in {:.1}ms ({} mapped field(s))",
        template.display(),
        written.display(),
        t0.elapsed().as_secs_f64() * 1000.0,
        mapping.len(),
    );
    Ok(written)
}

/// Write the structure report of `doc` to `output`, or to
/// `<stem>_structure.md` beside the source document.
pub fn save_structure(doc: &Document, output: Option<&Path>) -> Result<PathBuf, Error> {
    let path = match output {
        Some(path) => path.to_path_buf(),
        None => default_report_path(&doc.file_path),
    };
    std::fs::write(&path, render_report(doc)).map_err(Error::Io)?;
    Ok(path)
}
