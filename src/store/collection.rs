use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{PlanError, Result};
use crate::ids;
use crate::store::filter::Filter;
use crate::store::update::Update;
use crate::store::{CREATED_AT_FIELD, Document, ID_FIELD, document_id, timestamp};

/// Which side of an update `find_one_and_update` hands back.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ReturnDocument {
    #[default]
    Before,
    After,
}

/// A collection of documents persisted as one JSON array in one file.
///
/// Every call reads the whole file and every mutation rewrites it; nothing
/// is cached between calls. Concurrent writers race (last write wins).
#[derive(Debug, Clone)]
pub struct Collection {
    path: PathBuf,
}

impl Collection {
    /// Open a collection backed by `path`, creating an empty one if needed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let collection = Self { path: path.into() };
        collection.ensure_exists()?;
        Ok(collection)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the parent directory and an empty `[]` file when absent.
    pub fn ensure_exists(&self) -> Result<()> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
            && !dir.exists()
        {
            fs::create_dir_all(dir)?;
        }
        if !self.path.exists() {
            debug!(path = %self.path.display(), "initializing empty collection");
            fs::write(&self.path, "[]")?;
        }
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<Document>> {
        self.ensure_exists()?;
        let content = fs::read_to_string(&self.path)?;
        let docs: Vec<Document> = serde_json::from_str(&content).map_err(|e| {
            PlanError::CorruptCollection(self.path.display().to_string(), e.to_string())
        })?;
        trace!(path = %self.path.display(), count = docs.len(), "read collection");
        Ok(docs)
    }

    fn write_all(&self, docs: &[Document]) -> Result<()> {
        fs::write(&self.path, serde_json::to_string_pretty(docs)?)?;
        trace!(path = %self.path.display(), count = docs.len(), "wrote collection");
        Ok(())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read_all()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn find_by_id(&self, id: &str) -> Result<Option<Document>> {
        Ok(self
            .read_all()?
            .into_iter()
            .find(|doc| document_id(doc) == Some(id)))
    }

    pub fn find_one(&self, filter: &Filter) -> Result<Option<Document>> {
        Ok(self.read_all()?.into_iter().find(|doc| filter.matches(doc)))
    }

    /// All matching documents in insertion order.
    pub fn find(&self, filter: &Filter) -> Result<Vec<Document>> {
        let mut docs = self.read_all()?;
        if !filter.is_empty() {
            docs.retain(|doc| filter.matches(doc));
        }
        Ok(docs)
    }

    /// Insert `fields` with a fresh `_id` and `createdAt`, overriding any
    /// caller-supplied values for those two fields.
    pub fn create(&self, fields: Document) -> Result<Document> {
        let mut docs = self.read_all()?;
        let mut doc = fields;
        doc.insert(ID_FIELD.to_string(), Value::String(ids::document_id()));
        doc.insert(CREATED_AT_FIELD.to_string(), Value::String(timestamp()));
        docs.push(doc.clone());
        self.write_all(&docs)?;
        debug!(path = %self.path.display(), id = document_id(&doc), "created document");
        Ok(doc)
    }

    /// Apply `update` to the document with `id` and return it post-update.
    pub fn find_by_id_and_update(&self, id: &str, update: &Update) -> Result<Option<Document>> {
        self.find_one_and_update(&Filter::by_id(id), update, ReturnDocument::After)
    }

    /// Apply `update` to the first document matching `filter`.
    pub fn find_one_and_update(
        &self,
        filter: &Filter,
        update: &Update,
        returning: ReturnDocument,
    ) -> Result<Option<Document>> {
        let mut docs = self.read_all()?;
        let Some(index) = docs.iter().position(|doc| filter.matches(doc)) else {
            return Ok(None);
        };

        let before = docs[index].clone();
        update.apply(&mut docs[index], filter)?;
        self.write_all(&docs)?;
        debug!(path = %self.path.display(), id = document_id(&before), "updated document");

        Ok(Some(match returning {
            ReturnDocument::Before => before,
            ReturnDocument::After => docs.swap_remove(index),
        }))
    }

    pub fn find_by_id_and_delete(&self, id: &str) -> Result<Option<Document>> {
        let mut docs = self.read_all()?;
        let Some(index) = docs.iter().position(|doc| document_id(doc) == Some(id)) else {
            return Ok(None);
        };

        let removed = docs.remove(index);
        self.write_all(&docs)?;
        debug!(path = %self.path.display(), id, "deleted document");
        Ok(Some(removed))
    }
}
