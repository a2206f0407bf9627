//! Persisted replacement rules and block list.
//!
//! Each collection lives in its own JSON document. Reads go straight to disk;
//! writes replace the whole document (write `.tmp`, then rename) under a
//! per-document mutex so concurrent read-modify-write sequences never interleave.

use std::{
    collections::HashSet,
    marker::PhantomData,
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, MutexGuard};

use crate::{config::Config, domain::MessageId, errors::Error, replace::RuleMap, Result};

/// `{"texts": {...}, "links": {...}}`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub texts: RuleMap,
    #[serde(default)]
    pub links: RuleMap,
}

impl RuleSet {
    /// Texts first, then links; a link overrides a text rule with the same pattern.
    pub fn merged(&self) -> RuleMap {
        let mut out = self.texts.clone();
        out.extend_from(&self.links);
        out
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty() && self.links.is_empty()
    }
}

/// `{"blocked_messages": [int, ...]}`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct BlockDocument {
    #[serde(default)]
    blocked_messages: Vec<MessageId>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockList {
    ids: HashSet<MessageId>,
}

impl BlockList {
    pub fn contains(&self, id: MessageId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    fn from_document(doc: BlockDocument) -> Self {
        Self {
            ids: doc.blocked_messages.into_iter().collect(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockOutcome {
    Blocked,
    AlreadyBlocked,
}

/// A whole-document JSON file with a single writer.
struct JsonDocument<T> {
    path: PathBuf,
    write_lock: Mutex<()>,
    _doc: PhantomData<fn() -> T>,
}

struct DocumentWriter<'a, T> {
    doc: &'a JsonDocument<T>,
    _guard: MutexGuard<'a, ()>,
}

impl<T> JsonDocument<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
            _doc: PhantomData,
        }
    }

    /// Missing file reads as the default document; unreadable or corrupt is an error.
    async fn read(&self) -> Result<T> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => return Err(self.unavailable(e)),
        };
        serde_json::from_str(&raw).map_err(|e| self.unavailable(e))
    }

    async fn lock(&self) -> DocumentWriter<'_, T> {
        DocumentWriter {
            doc: self,
            _guard: self.write_lock.lock().await,
        }
    }

    /// Create the file with its default shape if it does not exist yet.
    async fn ensure_exists(&self) -> Result<()> {
        let writer = self.lock().await;
        if tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(());
        }
        writer.write(&T::default()).await
    }

    fn unavailable(&self, e: impl std::fmt::Display) -> Error {
        Error::StorageUnavailable {
            path: self.path.clone(),
            reason: e.to_string(),
        }
    }

    fn write_failed(&self, e: impl std::fmt::Display) -> Error {
        Error::StorageWrite {
            path: self.path.clone(),
            reason: e.to_string(),
        }
    }
}

impl<T> DocumentWriter<'_, T>
where
    T: Serialize + DeserializeOwned + Default,
{
    /// Read for update. An unreadable document is never overwritten.
    async fn read(&self) -> Result<T> {
        self.doc.read().await.map_err(|e| match e {
            Error::StorageUnavailable { path, reason } => Error::StorageWrite {
                path,
                reason: format!("refusing to overwrite unreadable document: {reason}"),
            },
            other => other,
        })
    }

    async fn write(&self, value: &T) -> Result<()> {
        let doc = self.doc;
        let json = serde_json::to_vec(value).map_err(|e| doc.write_failed(e))?;
        let tmp = tmp_path(&doc.path);

        let res = async {
            let mut f = tokio::fs::File::create(&tmp).await?;
            f.write_all(&json).await?;
            f.sync_all().await?;
            drop(f);
            tokio::fs::rename(&tmp, &doc.path).await
        }
        .await;

        if let Err(e) = res {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(doc.write_failed(e));
        }
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Replacement rules + block list, backed by two JSON documents.
pub struct RuleStore {
    replacements: JsonDocument<RuleSet>,
    blocked: JsonDocument<BlockDocument>,
}

impl RuleStore {
    pub fn new(cfg: &Config) -> Self {
        Self::with_paths(cfg.replacement_file.clone(), cfg.blocked_file.clone())
    }

    pub fn with_paths(replacement_file: PathBuf, blocked_file: PathBuf) -> Self {
        Self {
            replacements: JsonDocument::new(replacement_file),
            blocked: JsonDocument::new(blocked_file),
        }
    }

    /// Create missing documents with their empty shape. Failures are logged only.
    pub async fn ensure_documents(&self) {
        if let Err(e) = self.replacements.ensure_exists().await {
            tracing::warn!("could not create replacement document: {e}");
        }
        if let Err(e) = self.blocked.ensure_exists().await {
            tracing::warn!("could not create block document: {e}");
        }
    }

    pub async fn get_rules(&self) -> Result<RuleSet> {
        self.replacements.read().await
    }

    pub async fn set_text_rule(&self, pattern: &str, replacement: &str) -> Result<()> {
        let writer = self.replacements.lock().await;
        let mut rules = writer.read().await?;
        rules.texts.insert(pattern, replacement);
        writer.write(&rules).await
    }

    pub async fn get_block_list(&self) -> Result<BlockList> {
        Ok(BlockList::from_document(self.blocked.read().await?))
    }

    pub async fn block_message(&self, id: MessageId) -> Result<BlockOutcome> {
        let writer = self.blocked.lock().await;
        let mut doc = writer.read().await?;
        if doc.blocked_messages.contains(&id) {
            return Ok(BlockOutcome::AlreadyBlocked);
        }
        doc.blocked_messages.push(id);
        writer.write(&doc).await?;
        Ok(BlockOutcome::Blocked)
    }
}
