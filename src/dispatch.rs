use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::model::{Document, FieldMap};

/// File formats recognised by extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    /// ZIP + XML container, handled natively.
    Hwpx,
    /// Legacy binary format, handled by an injected [`DocumentBackend`].
    Hwp,
}

impl Format {
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "hwpx" => Ok(Format::Hwpx),
            "hwp" => Ok(Format::Hwp),
            _ => Err(Error::UnsupportedFormat(format!(".{ext}"))),
        }
    }
}

/// The two operations every format backend provides.
pub trait DocumentBackend {
    fn analyze(&self, path: &Path) -> Result<Document, Error>;
    fn fill(&self, template: &Path, mapping: &FieldMap, output: &Path) -> Result<PathBuf, Error>;

    fn is_available(&self) -> bool {
        true
    }

    fn support_message(&self) -> String {
        String::from("supported in every environment")
    }
}

pub struct HwpxBackend;

impl DocumentBackend for HwpxBackend {
    fn analyze(&self, path: &Path) -> Result<Document, Error> {
        crate::hwpx::parse(path)
    }

    fn fill(&self, template: &Path, mapping: &FieldMap, output: &Path) -> Result<PathBuf, Error> {
        crate::hwpx::fill(template, mapping, output)
    }

    fn support_message(&self) -> String {
        String::from(".hwpx files are supported in every environment")
    }
}

/// Stand-in for the legacy backend when its native application is not present.
pub struct UnavailableLegacyBackend;

impl UnavailableLegacyBackend {
    fn unsupported() -> Error {
        Error::EnvironmentUnsupported(
            ".hwp files can only be processed on Windows with the Hancom Office \
             application installed; convert the file to .hwpx and try again"
                .into(),
        )
    }
}

impl DocumentBackend for UnavailableLegacyBackend {
    fn analyze(&self, _path: &Path) -> Result<Document, Error> {
        Err(Self::unsupported())
    }

    fn fill(&self, _template: &Path, _mapping: &FieldMap, _output: &Path) -> Result<PathBuf, Error> {
        Err(Self::unsupported())
    }

    fn is_available(&self) -> bool {
        false
    }

    fn support_message(&self) -> String {
        Self::unsupported().to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatSupport {
    pub supported: bool,
    pub message: String,
}

fn describe(backend: &dyn DocumentBackend) -> FormatSupport {
    FormatSupport {
        supported: backend.is_available(),
        message: backend.support_message(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SupportInfo {
    pub hwpx: FormatSupport,
    pub hwp: FormatSupport,
}

/// Routes each operation to the backend for the file's extension.
pub struct Dispatcher {
    hwpx: HwpxBackend,
    legacy: Box<dyn DocumentBackend>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::with_legacy_backend(Box::new(UnavailableLegacyBackend))
    }

    pub fn with_legacy_backend(legacy: Box<dyn DocumentBackend>) -> Self {
        Self {
            hwpx: HwpxBackend,
            legacy,
        }
    }

    fn backend(&self, path: &Path) -> Result<&dyn DocumentBackend, Error> {
        let backend: &dyn DocumentBackend = match Format::from_path(path)? {
            Format::Hwpx => &self.hwpx,
            Format::Hwp => self.legacy.as_ref(),
        };
        Ok(backend)
    }

    pub fn analyze(&self, path: &Path) -> Result<Document, Error> {
        self.backend(path)?.analyze(path)
    }

    pub fn fill(&self, template: &Path, mapping: &FieldMap, output: &Path) -> Result<PathBuf, Error> {
        self.backend(template)?.fill(template, mapping, output)
    }

    /// Analyze `path` and write its report to `output`, or next to the source.
    pub fn save_structure(&self, path: &Path, output: Option<&Path>) -> Result<PathBuf, Error> {
        let doc = self.analyze(path)?;
        crate::save_structure(&doc, output)
    }

    pub fn support_info(&self) -> SupportInfo {
        SupportInfo {
            hwpx: describe(&self.hwpx),
            hwp: describe(self.legacy.as_ref()),
        }
    }
}
