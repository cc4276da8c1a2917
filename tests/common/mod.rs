use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;

pub const HP: &str = "http://www.hancom.co.kr/hwpml/2011/paragraph";
pub const HP10: &str = "http://www.hancom.co.kr/hwpml/2016/paragraph";
const HS: &str = "http://www.hancom.co.kr/hwpml/2011/section";

pub const MIMETYPE: &[u8] = b"application/hwp+zip";
pub const HEADER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?><hh:head xmlns:hh="http://www.hancom.co.kr/hwpml/2011/head" version="1.4"><hh:refList/></hh:head>"#;
pub const IMAGE_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 13, 1, 2, 3];

/// Section root with the usual `hs`/`hp` bindings around `body`.
pub fn section_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes" ?><hs:sec xmlns:hp="{HP}" xmlns:hs="{HS}">{body}</hs:sec>"#
    )
}

pub fn paragraph_xml(text: &str) -> String {
    format!(r#"<hp:p id="0" paraPrIDRef="0"><hp:run charPrIDRef="0"><hp:t>{text}</hp:t></hp:run></hp:p>"#)
}

/// Cell with one run; an empty `text` gives a run with no text element, as
/// the word processor writes blank cells.
pub fn cell_xml(text: &str) -> String {
    let run = if text.is_empty() {
        r#"<hp:run charPrIDRef="0"/>"#.to_string()
    } else {
        format!(r#"<hp:run charPrIDRef="0"><hp:t>{text}</hp:t></hp:run>"#)
    };
    format!(r#"<hp:tc name="" header="0"><hp:subList><hp:p id="0">{run}</hp:p></hp:subList></hp:tc>"#)
}

/// A table wrapped in its anchoring paragraph, declaring the counts of `rows`.
pub fn table_xml(rows: &[&[&str]]) -> String {
    let cols = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    table_xml_declared(rows, rows.len(), cols)
}

pub fn table_xml_declared(rows: &[&[&str]], row_cnt: usize, col_cnt: usize) -> String {
    let body: String = rows
        .iter()
        .map(|row| format!("<hp:tr>{}</hp:tr>", row.iter().map(|c| cell_xml(c)).collect::<String>()))
        .collect();
    format!(
        r#"<hp:p id="0"><hp:run charPrIDRef="0"><hp:tbl id="1" rowCnt="{row_cnt}" colCnt="{col_cnt}">{body}</hp:tbl></hp:run></hp:p>"#
    )
}

/// Write an HWPX container: a stored `mimetype` first, then header, the given
/// section parts (as `Contents/section{i}.xml`), settings and a binary image.
pub fn write_hwpx(path: &Path, sections: &[String]) {
    let parts: Vec<(String, Vec<u8>)> = sections
        .iter()
        .enumerate()
        .map(|(i, xml)| (format!("Contents/section{i}.xml"), xml.clone().into_bytes()))
        .collect();
    write_hwpx_parts(path, &parts);
}

pub fn write_hwpx_parts(path: &Path, sections: &[(String, Vec<u8>)]) {
    let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
    let stored = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    zip.start_file("mimetype", stored).unwrap();
    zip.write_all(MIMETYPE).unwrap();
    zip.start_file("Contents/header.xml", deflated).unwrap();
    zip.write_all(HEADER_XML.as_bytes()).unwrap();
    for (name, data) in sections {
        zip.start_file(name.as_str(), deflated).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.start_file("settings.xml", deflated).unwrap();
    zip.write_all(b"<?xml version=\"1.0\"?><ha:HWPApplicationSetting xmlns:ha=\"http://www.hancom.co.kr/hwpml/2011/app\"/>").unwrap();
    zip.start_file("BinData/image1.png", stored).unwrap();
    zip.write_all(IMAGE_BYTES).unwrap();
    zip.finish().unwrap();
}

pub fn entry_names(path: &Path) -> Vec<String> {
    let zip = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    zip.file_names().map(str::to_string).collect::<Vec<_>>()
}

pub fn read_entry(path: &Path, name: &str) -> Vec<u8> {
    let mut zip = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut data = Vec::new();
    zip.by_name(name).unwrap().read_to_end(&mut data).unwrap();
    data
}

pub fn read_entry_text(path: &Path, name: &str) -> String {
    String::from_utf8(read_entry(path, name)).unwrap()
}

pub fn compression_of(path: &Path, name: &str) -> zip::CompressionMethod {
    let mut zip = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    zip.by_name(name).unwrap().compression()
}

/// Entries of `dir` whose names start with `prefix`.
pub fn leftovers(dir: &Path, prefix: &str) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.starts_with(prefix))
        .collect()
}
