use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{ContainerError, Error};

use super::is_section_part;

pub(super) struct SectionPart {
    pub name: String,
    pub data: Vec<u8>,
}

/// Read-only view of an HWPX archive.
pub(super) struct Container {
    path: PathBuf,
    zip: zip::ZipArchive<File>,
}

impl Container {
    pub fn open(path: &Path) -> Result<Self, ContainerError> {
        if !path.is_file() {
            return Err(ContainerError::NotFound(path.to_path_buf()));
        }
        let file = File::open(path).map_err(|_| ContainerError::NotFound(path.to_path_buf()))?;
        let zip = zip::ZipArchive::new(file)
            .map_err(|_| ContainerError::NotAZip(path.to_path_buf()))?;
        Ok(Self {
            path: path.to_path_buf(),
            zip,
        })
    }

    /// Section part entry names, sorted by name. Archive order is not trusted.
    pub fn section_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .zip
            .file_names()
            .filter(|name| is_section_part(name))
            .map(str::to_string)
            .collect();
        names.sort();
        names
    }

    pub fn section_parts(&mut self) -> Result<Vec<SectionPart>, Error> {
        let names = self.section_names();
        let mut parts = Vec::with_capacity(names.len());
        for name in names {
            let mut data = Vec::new();
            self.zip.by_name(&name)?.read_to_end(&mut data)?;
            parts.push(SectionPart { name, data });
        }
        log::debug!("{}: {} section part(s)", self.path.display(), parts.len());
        Ok(parts)
    }
}
