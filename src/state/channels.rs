//! Channel membership.
//!
//! [`ChannelSet`] is the ordered list of channels the bot should be in. It is
//! mutated only by `!join`/`!part`, and every mutation is handed to a
//! [`ChannelStore`] so the list survives restarts.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::StoreError;

/// Add the `#` prefix if it is missing.
pub fn normalize_channel(name: &str) -> String {
    let name = name.trim();
    if name.starts_with('#') {
        name.to_string()
    } else {
        format!("#{}", name)
    }
}

/// True when the server would read `name` as exactly one channel.
///
/// A space or comma would split it into a channel plus a key, or into
/// several channels, on the `JOIN` line.
pub fn is_valid_channel(name: &str) -> bool {
    !name.trim_start_matches('#').is_empty() && !name.contains([' ', ',', '\x07'])
}

/// Ordered, duplicate-free set of channel names.
///
/// Names are compared exactly; `#Games` and `#games` are distinct entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelSet {
    names: Vec<String>,
}

impl ChannelSet {
    /// Build a set from raw names, normalizing and dropping duplicates and
    /// names that are not a single channel.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for name in names {
            let name = normalize_channel(name.as_ref());
            if is_valid_channel(&name) {
                set.insert(&name);
            }
        }
        set
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Append `name`. Returns false if it was already present.
    pub fn insert(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.names.push(name.to_string());
        true
    }

    /// Remove `name`. Returns false if it was not present.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.names.len();
        self.names.retain(|n| n != name);
        self.names.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Persistence for the channel list.
#[async_trait]
pub trait ChannelStore: Send + Sync {
    /// Load the persisted list (or the seed list if nothing was saved yet).
    async fn load(&self) -> Result<Vec<String>, StoreError>;

    /// Replace the persisted list.
    async fn save(&self, channels: &[String]) -> Result<(), StoreError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct ChannelFile {
    #[serde(default)]
    channels: Vec<String>,
}

/// TOML file store: `channels = ["#a", "#b"]`.
///
/// Saves go to a sibling temp file that is then renamed over the target, so a
/// crash mid-write leaves the previous list intact.
#[derive(Debug, Clone)]
pub struct FileChannelStore {
    path: PathBuf,
    seed: Vec<String>,
}

impl FileChannelStore {
    /// `seed` is returned by `load` until the first save creates the file.
    pub fn new(path: impl Into<PathBuf>, seed: Vec<String>) -> Self {
        Self {
            path: path.into(),
            seed,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl ChannelStore for FileChannelStore {
    async fn load(&self) -> Result<Vec<String>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                let file: ChannelFile = toml::from_str(&content)?;
                debug!(path = %self.path.display(), count = file.channels.len(), "Loaded channel list");
                Ok(file.channels)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No channel file yet, using configured channels");
                Ok(self.seed.clone())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, channels: &[String]) -> Result<(), StoreError> {
        let content = toml::to_string(&ChannelFile {
            channels: channels.to_vec(),
        })?;
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        info!(path = %self.path.display(), channels = %channels.join(", "), "Saved channel list");
        Ok(())
    }
}

/// In-memory store for ephemeral runs and tests. Records every save.
#[derive(Debug, Default)]
pub struct MemoryChannelStore {
    current: Mutex<Vec<String>>,
    saves: Mutex<Vec<Vec<String>>>,
}

impl MemoryChannelStore {
    pub fn new(seed: Vec<String>) -> Self {
        Self {
            current: Mutex::new(seed),
            saves: Mutex::new(Vec::new()),
        }
    }

    /// Every list passed to `save`, oldest first.
    pub async fn saves(&self) -> Vec<Vec<String>> {
        self.saves.lock().await.clone()
    }
}

#[async_trait]
impl ChannelStore for MemoryChannelStore {
    async fn load(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.current.lock().await.clone())
    }

    async fn save(&self, channels: &[String]) -> Result<(), StoreError> {
        *self.current.lock().await = channels.to_vec();
        self.saves.lock().await.push(channels.to_vec());
        Ok(())
    }
}
