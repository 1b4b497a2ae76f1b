//! Core SpanEngine struct and constructors

use anyhow::{anyhow, Result};
use std::fs;
use std::path::Path;
use tantivy::{directory::MmapDirectory, schema::Schema, Index, IndexReader, IndexWriter};

use crate::engine::config::EngineConfig;
use crate::engine::schema::{build_schema, register_tokenizers, SpanFields};

/// Sentence index with span search over its annotation fields
pub struct SpanEngine {
    pub(crate) index: Index,
    pub(crate) reader: IndexReader,
    pub(crate) writer: Option<IndexWriter>,
    pub(crate) schema: Schema,
    pub(crate) fields: SpanFields,
    pub(crate) config: EngineConfig,
}

impl SpanEngine {
    /// Open the index in `index_dir`, creating the directory and the index if needed
    pub fn open(index_dir: &Path, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        if !index_dir.exists() {
            fs::create_dir_all(index_dir)
                .map_err(|e| anyhow!("Failed to create index directory {}: {}", index_dir.display(), e))?;
        }
        let schema = build_schema(&config.annotations)?;
        let dir = MmapDirectory::open(index_dir)?;
        let index = Index::open_or_create(dir, schema)?;
        log::info!("Opened index at {}", index_dir.display());
        Self::from_index(index, config)
    }

    /// Open an index with the configuration stored in a YAML file
    pub fn open_with_config_file(index_dir: &Path, config_path: &Path) -> Result<Self> {
        Self::open(index_dir, EngineConfig::from_yaml(config_path)?)
    }

    /// In-memory index, used by tests and one-off searches
    pub fn create_in_ram(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let index = Index::create_in_ram(build_schema(&config.annotations)?);
        Self::from_index(index, config)
    }

    fn from_index(index: Index, config: EngineConfig) -> Result<Self> {
        register_tokenizers(&index);
        let schema = index.schema();
        let fields = SpanFields::from_schema(&schema, &config.annotations)?;
        let reader = index.reader()?;
        let writer = Self::try_create_writer(&index, config.writer_heap_bytes)?;
        Ok(Self {
            index,
            reader,
            writer,
            schema,
            fields,
            config,
        })
    }

    fn try_create_writer(index: &Index, heap_bytes: usize) -> Result<Option<IndexWriter>> {
        match index.writer(heap_bytes) {
            Ok(w) => Ok(Some(w)),
            Err(tantivy::TantivyError::LockFailure(e, _)) => {
                log::warn!("Could not acquire index lock, running in READ-ONLY mode: {}", e);
                Ok(None)
            }
            Err(e) => Err(anyhow::Error::from(e)),
        }
    }

    /// Number of indexed sentences
    pub fn num_sentences(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    pub fn is_read_only(&self) -> bool {
        self.writer.is_none()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn fields(&self) -> &SpanFields {
        &self.fields
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn searcher(&self) -> tantivy::Searcher {
        self.reader.searcher()
    }
}
