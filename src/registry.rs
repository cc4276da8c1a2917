//! Named template storage.
//!
//! Templates are copied into a directory next to an `index.json` that maps each
//! name to a [`TemplateRecord`]. The core never reads this index; callers inject
//! a [`TemplateRegistry`] where they need one.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dispatch::Dispatcher;
use crate::error::Error;
use crate::model::{Field, FieldMap};

const INDEX_FILE: &str = "index.json";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateRecord {
    pub file: PathBuf,
    pub original_path: PathBuf,
    pub extension: String,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub field_mapping: FieldMap,
}

type Index = BTreeMap<String, TemplateRecord>;

pub trait TemplateRegistry {
    /// Store a copy of `path` under `name`, replacing any previous entry.
    /// Returns the stored copy's path.
    fn save(&self, name: &str, path: &Path, mapping: Option<&FieldMap>) -> Result<PathBuf, Error>;
    fn get(&self, name: &str) -> Result<Option<TemplateRecord>, Error>;
    fn list(&self) -> Result<Vec<String>, Error>;
    fn delete(&self, name: &str) -> Result<bool, Error>;
    fn update_mapping(&self, name: &str, mapping: &FieldMap) -> Result<bool, Error>;
}

pub struct JsonTemplateRegistry {
    dir: PathBuf,
    dispatcher: Dispatcher,
}

impl JsonTemplateRegistry {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, Error> {
        Self::with_dispatcher(dir, Dispatcher::new())
    }

    pub fn with_dispatcher(dir: impl Into<PathBuf>, dispatcher: Dispatcher) -> Result<Self, Error> {
        let registry = Self {
            dir: dir.into(),
            dispatcher,
        };
        fs::create_dir_all(&registry.dir)?;
        if !registry.index_path().exists() {
            registry.store(&Index::new())?;
        }
        Ok(registry)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    fn load(&self) -> Result<Index, Error> {
        let path = self.index_path();
        if !path.exists() {
            return Ok(Index::new());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn store(&self, index: &Index) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(index)?;
        fs::write(self.index_path(), json)?;
        Ok(())
    }
}

impl TemplateRegistry for JsonTemplateRegistry {
    fn save(&self, name: &str, path: &Path, mapping: Option<&FieldMap>) -> Result<PathBuf, Error> {
        let mut index = self.load()?;

        let extension = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let stored = self.dir.join(format!("{name}{extension}"));
        if crate::hwpx::is_same_file(path, &stored) {
            log::debug!("Template {name:?} is already stored at {}", stored.display());
        } else {
            fs::copy(path, &stored)?;
        }

        let fields = match self.dispatcher.analyze(path) {
            Ok(doc) => doc.fields,
            Err(e) => {
                log::warn!("Template {name:?} stored without field info: {e}");
                Vec::new()
            }
        };

        index.insert(
            name.to_string(),
            TemplateRecord {
                file: stored.clone(),
                original_path: path.to_path_buf(),
                extension,
                fields,
                field_mapping: mapping.cloned().unwrap_or_default(),
            },
        );
        self.store(&index)?;
        log::info!("Saved template {name:?} to {}", stored.display());
        Ok(stored)
    }

    fn get(&self, name: &str) -> Result<Option<TemplateRecord>, Error> {
        Ok(self.load()?.remove(name))
    }

    fn list(&self) -> Result<Vec<String>, Error> {
        Ok(self.load()?.into_keys().collect())
    }

    fn delete(&self, name: &str) -> Result<bool, Error> {
        let mut index = self.load()?;
        let Some(record) = index.remove(name) else {
            return Ok(false);
        };
        if record.file.exists() {
            fs::remove_file(&record.file)?;
        }
        self.store(&index)?;
        Ok(true)
    }

    fn update_mapping(&self, name: &str, mapping: &FieldMap) -> Result<bool, Error> {
        let mut index = self.load()?;
        let Some(record) = index.get_mut(name) else {
            return Ok(false);
        };
        record.field_mapping = mapping.clone();
        self.store(&index)?;
        Ok(true)
    }
}
