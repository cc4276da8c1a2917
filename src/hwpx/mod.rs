//! HWPX container handling.
//!
//! An HWPX file is a ZIP archive whose body lives in `Contents/section*.xml`
//! parts. Producers disagree on namespaces (2011 vs 2016 paragraph schema, or
//! none at all), so every element lookup here matches on local name and tries
//! each known namespace before falling back to un-namespaced tags.

mod container;
mod fields;
mod fill;
mod section;

use std::path::Path;

use crate::error::Error;
use crate::model::{Document, Section};

pub(crate) use fill::{fill, is_same_file};

pub(super) const HP_NS: &str = "http://www.hancom.co.kr/hwpml/2011/paragraph";
pub(super) const HP10_NS: &str = "http://www.hancom.co.kr/hwpml/2016/paragraph";

pub(super) const SECTION_PREFIX: &str = "Contents/section";
pub(super) const SECTION_SUFFIX: &str = ".xml";

pub(super) const PARAGRAPH_TAG: &str = "p";
pub(super) const TABLE_TAG: &str = "tbl";
pub(super) const ROW_TAG: &str = "tr";
pub(super) const CELL_TAG: &str = "tc";
pub(super) const RUN_TAG: &str = "run";
pub(super) const TEXT_TAG: &str = "t";

/// Lookup strategies, in the order they are tried. `None` is the bare tag.
const LOOKUP_ORDER: [Option<&str>; 3] = [Some(HP_NS), Some(HP10_NS), None];

pub(super) fn is_section_part(name: &str) -> bool {
    name.starts_with(SECTION_PREFIX) && name.ends_with(SECTION_SUFFIX)
}

/// Tag name with any namespace prefix or URI stripped.
pub(super) fn local_name<'a, 'input>(node: roxmltree::Node<'a, 'input>) -> &'input str {
    node.tag_name().name()
}

fn has_local_name(node: roxmltree::Node, name: &str) -> bool {
    node.is_element() && local_name(node) == name
}

fn descendants_in<'a>(
    node: roxmltree::Node<'a, 'a>,
    name: &str,
    ns: Option<&str>,
) -> Vec<roxmltree::Node<'a, 'a>> {
    node.descendants()
        .skip(1)
        .filter(|n| has_local_name(*n, name) && n.tag_name().namespace() == ns)
        .collect()
}

/// Descendants named `name` found by the first lookup strategy that finds any.
pub(super) fn find_first_strategy<'a>(
    node: roxmltree::Node<'a, 'a>,
    name: &str,
) -> Vec<roxmltree::Node<'a, 'a>> {
    LOOKUP_ORDER
        .iter()
        .map(|ns| descendants_in(node, name, *ns))
        .find(|found| !found.is_empty())
        .unwrap_or_default()
}

/// Descendants named `name` from every lookup strategy, concatenated in
/// strategy order. Matches are not de-duplicated.
pub(super) fn find_all_strategies<'a>(
    node: roxmltree::Node<'a, 'a>,
    name: &str,
) -> Vec<roxmltree::Node<'a, 'a>> {
    LOOKUP_ORDER
        .iter()
        .flat_map(|ns| descendants_in(node, name, *ns))
        .collect()
}

/// First descendant (or `node` itself) with the given local name, in any namespace.
pub(super) fn first_named<'a>(
    node: roxmltree::Node<'a, 'a>,
    name: &str,
) -> Option<roxmltree::Node<'a, 'a>> {
    node.descendants().find(|n| has_local_name(*n, name))
}

/// Text of every text-run under `node`, in document order, joined by a single space.
pub(super) fn run_text(node: roxmltree::Node) -> String {
    node.descendants()
        .filter(|n| has_local_name(*n, TEXT_TAG))
        .filter_map(|n| n.text())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn parse(path: &Path) -> Result<Document, Error> {
    let mut container = container::Container::open(path)?;
    let parts = container.section_parts()?;

    let mut doc = Document::new(path);
    for (index, part) in parts.iter().enumerate() {
        match section::parse_section(&part.name, &part.data, index) {
            Ok(section) => doc.sections.push(section),
            Err(malformed) => {
                log::warn!("{malformed}; continuing with an empty section");
                doc.warnings.push(malformed);
                doc.sections.push(Section::empty(index));
            }
        }
    }
    doc.fields = fields::infer_fields(&doc.sections);

    log::debug!(
        "{}: {} section(s), {} table(s), {} field(s)",
        path.display(),
        doc.sections.len(),
        doc.sections.iter().map(|s| s.tables.len()).sum::<usize>(),
        doc.fields.len(),
    );
    Ok(doc)
}
