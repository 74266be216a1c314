//! Storage collaborators for the rebuild jobs.
//!
//! The ranking and tessellation code only works on in-memory snapshots; these
//! traits are the seam to whatever store holds scenes, feed order and
//! tessellation documents. Writes replace the whole document.

use crate::{Error, Result, Scene, SceneId, Tessellation};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Provides the full set of candidate scenes.
pub trait SceneSource {
    fn load_scenes(&self) -> Result<Vec<Scene>>;
}

/// Holds the home feed as a sort key per scene, i.e. an ordered id list.
pub trait FeedStore {
    /// Current feed order, empty if never built.
    fn feed_order(&self) -> Result<Vec<SceneId>>;

    /// Replace the whole order. Scenes not listed lose their sort key.
    fn replace_feed_order(&mut self, order: &[SceneId]) -> Result<()>;
}

/// Holds named tessellation documents.
pub trait TessellationStore {
    fn load_tessellation(&self, name: &str) -> Result<Option<Tessellation>>;

    fn replace_tessellation(&mut self, tessellation: &Tessellation) -> Result<()>;
}

/// In-memory store, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub scenes: Vec<Scene>,
    pub feed: Vec<SceneId>,
    pub tessellations: BTreeMap<String, Tessellation>,
}

impl MemoryStore {
    pub fn with_scenes(scenes: Vec<Scene>) -> Self {
        Self {
            scenes,
            ..Default::default()
        }
    }
}

impl SceneSource for MemoryStore {
    fn load_scenes(&self) -> Result<Vec<Scene>> {
        Ok(self.scenes.clone())
    }
}

impl FeedStore for MemoryStore {
    fn feed_order(&self) -> Result<Vec<SceneId>> {
        Ok(self.feed.clone())
    }

    fn replace_feed_order(&mut self, order: &[SceneId]) -> Result<()> {
        self.feed = order.to_vec();
        Ok(())
    }
}

impl TessellationStore for MemoryStore {
    fn load_tessellation(&self, name: &str) -> Result<Option<Tessellation>> {
        Ok(self.tessellations.get(name).cloned())
    }

    fn replace_tessellation(&mut self, tessellation: &Tessellation) -> Result<()> {
        self.tessellations
            .insert(tessellation.name.clone(), tessellation.clone());
        Ok(())
    }
}

/// JSON documents in a directory:
/// `scenes.json`, `feed.json` and `tessellation-<name>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub const SCENES_FILE: &'static str = "scenes.json";
    pub const FEED_FILE: &'static str = "feed.json";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn tessellation_path(&self, name: &str) -> Result<PathBuf> {
        let ok = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !ok {
            return Err(Error::InvalidConfig(format!(
                "tessellation name `{name}` must be non-empty ASCII alphanumerics, `-` or `_`"
            )));
        }
        Ok(self.root.join(format!("tessellation-{name}.json")))
    }

    /// Serialize to a sibling temp file, then rename over the target.
    fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(value)?)?;
        fs::rename(&tmp, path)?;
        debug!(path = %path.display(), "wrote document");
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace `scenes.json`; used to seed a data directory.
    pub fn replace_scenes(&self, scenes: &[Scene]) -> Result<()> {
        self.write_json(&self.root.join(Self::SCENES_FILE), scenes)
    }
}

impl SceneSource for JsonFileStore {
    fn load_scenes(&self) -> Result<Vec<Scene>> {
        Ok(self
            .read_json(&self.root.join(Self::SCENES_FILE))?
            .unwrap_or_default())
    }
}

impl FeedStore for JsonFileStore {
    fn feed_order(&self) -> Result<Vec<SceneId>> {
        Ok(self
            .read_json(&self.root.join(Self::FEED_FILE))?
            .unwrap_or_default())
    }

    fn replace_feed_order(&mut self, order: &[SceneId]) -> Result<()> {
        self.write_json(&self.root.join(Self::FEED_FILE), order)
    }
}

impl TessellationStore for JsonFileStore {
    fn load_tessellation(&self, name: &str) -> Result<Option<Tessellation>> {
        let path = self.tessellation_path(name)?;
        let Some(tessellation) = self.read_json::<Tessellation>(&path)? else {
            return Ok(None);
        };
        tessellation.validate()?;
        Ok(Some(tessellation))
    }

    fn replace_tessellation(&mut self, tessellation: &Tessellation) -> Result<()> {
        let path = self.tessellation_path(&tessellation.name)?;
        self.write_json(&path, tessellation)
    }
}
