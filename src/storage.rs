use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::warn;

use crate::model::{CacheFile, Platform, Scope, SshTerminal};

/// Warning line prepended to the persisted cache file.
pub const CACHE_MARKER: &str = "// Do not modify! This is autogenerated!";

/// Reads and writes the two external profile sources: the live,
/// editor-managed settings documents (one per scope) and the internal
/// persisted cache. The cache is always fully rewritten, never patched.
pub struct ProfileStore {
    platform: Platform,
    global_config: PathBuf,
    workspace_config: Option<PathBuf>,
    cache_path: PathBuf,
    key_dir: PathBuf,
}

impl ProfileStore {
    pub fn new(
        platform: Platform,
        global_config: PathBuf,
        workspace_config: Option<PathBuf>,
        storage_dir: PathBuf,
    ) -> Result<Self> {
        fs::create_dir_all(&storage_dir).context("create storage directory")?;
        let key_dir = storage_dir.join("keys");
        fs::create_dir_all(&key_dir).context("create key directory")?;

        let store = Self {
            platform,
            global_config,
            workspace_config,
            cache_path: storage_dir.join("storage.json"),
            key_dir,
        };
        store.ensure_settings_file(&store.global_config);
        if let Some(workspace) = &store.workspace_config {
            store.ensure_settings_file(workspace);
        }
        Ok(store)
    }

    /// Default layout under the platform config directory, with an
    /// optional workspace directory contributing the workspace scope.
    pub fn with_default_paths(workspace_dir: Option<&Path>) -> Result<Self> {
        let base = dirs::config_dir()
            .context("config directory unavailable")?
            .join("ssh-terminal");
        let global_config = base.join("settings.json");
        let workspace_config =
            workspace_dir.map(|dir| dir.join(".ssh-terminal").join("settings.json"));
        Self::new(Platform::current(), global_config, workspace_config, base)
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    pub fn key_dir(&self) -> &Path {
        &self.key_dir
    }

    pub fn config_path(&self, scope: Scope) -> Option<&Path> {
        match scope {
            Scope::Global => Some(&self.global_config),
            Scope::Workspace => self.workspace_config.as_deref(),
        }
    }

    /// Maps a saved file back to its configuration scope by path identity.
    /// Unrecognized paths return `None`.
    pub fn scope_of(&self, path: &Path) -> Option<Scope> {
        if same_path(path, &self.global_config) {
            return Some(Scope::Global);
        }
        match &self.workspace_config {
            Some(workspace) if same_path(path, workspace) => Some(Scope::Workspace),
            _ => None,
        }
    }

    /// Profile map (`name -> untyped profile`) of one scope's live
    /// settings document. Missing file, malformed JSON or an absent
    /// profiles section all read as an empty map.
    pub fn live_profiles(&self, scope: Scope) -> Map<String, Value> {
        let Some(path) = self.config_path(scope) else {
            return Map::new();
        };
        let Some(document) = read_json(path) else {
            return Map::new();
        };
        document
            .get(self.platform.profiles_key())
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default()
    }

    /// Replaces one terminal's entry in the live settings document of
    /// `scope`. Entries are keyed by name; a name with no existing entry
    /// leaves the document untouched. The document is rebuilt and fully
    /// rewritten, never mutated in place.
    pub fn update_live_profile(&self, scope: Scope, terminal: &SshTerminal) -> Result<()> {
        let path = self
            .config_path(scope)
            .context("workspace configuration unavailable")?;
        let document = read_json(path).unwrap_or_else(|| Value::Object(Map::new()));
        let key = self.platform.profiles_key();

        let mut profiles = document
            .get(&key)
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        if !profiles.contains_key(&terminal.name) {
            return Ok(());
        }

        let mut entry = serde_json::to_value(terminal).context("serialize terminal")?;
        if let Some(obj) = entry.as_object_mut() {
            obj.remove("name");
        }
        profiles.insert(terminal.name.clone(), entry);

        let mut next = document.as_object().cloned().unwrap_or_default();
        next.insert(key, Value::Object(profiles));
        write_json(path, &Value::Object(next))
    }

    /// Reads the persisted cache. A missing or corrupt file is first-run
    /// data, not an error.
    pub fn read_cache(&self) -> Option<CacheFile> {
        let content = fs::read_to_string(&self.cache_path).ok()?;
        let body: String = content
            .lines()
            .filter(|line| !line.trim_start().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");
        match serde_json::from_str(&body) {
            Ok(cache) => Some(cache),
            Err(err) => {
                warn!(path = %self.cache_path.display(), %err, "discarding corrupt cache");
                None
            }
        }
    }

    /// Fully rewrites the persisted cache, prefixed with the
    /// autogenerated-file marker.
    pub fn write_cache(&self, cache: &CacheFile) -> Result<()> {
        let json = serde_json::to_string_pretty(cache).context("serialize cache")?;
        if let Some(parent) = self.cache_path.parent() {
            fs::create_dir_all(parent).context("create cache directory")?;
        }
        fs::write(&self.cache_path, format!("{CACHE_MARKER}\n{json}")).context("write cache file")
    }

    /// Removes every regular file in the key directory that is not listed
    /// in `keep`. Returns the removed paths.
    pub fn prune_key_dir(&self, keep: &[PathBuf]) -> Result<Vec<PathBuf>> {
        if !self.key_dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut removed = Vec::new();
        for entry in fs::read_dir(&self.key_dir).context("read key directory")? {
            let path = entry.context("read key directory entry")?.path();
            if !path.is_file() {
                continue;
            }
            if keep.iter().any(|kept| same_path(kept, &path)) {
                continue;
            }
            fs::remove_file(&path).with_context(|| format!("remove {}", path.display()))?;
            removed.push(path);
        }
        Ok(removed)
    }

    /// Drops the key directory wholesale and recreates it empty.
    pub fn reset_key_dir(&self) -> Result<()> {
        if self.key_dir.is_dir() {
            fs::remove_dir_all(&self.key_dir).context("remove key directory")?;
        }
        fs::create_dir_all(&self.key_dir).context("recreate key directory")
    }

    fn ensure_settings_file(&self, path: &Path) {
        if path.is_file() {
            return;
        }
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let _ = fs::write(path, "{}\n");
    }
}

pub fn is_file_in_directory(dir: &Path, file: &Path) -> bool {
    let Ok(dir) = dir.canonicalize() else {
        return false;
    };
    let Ok(file) = file.canonicalize() else {
        return false;
    };
    file.is_file() && file.starts_with(&dir)
}

fn same_path(left: &Path, right: &Path) -> bool {
    match (left.canonicalize(), right.canonicalize()) {
        (Ok(left), Ok(right)) => left == right,
        _ => left == right,
    }
}

fn read_json(path: &Path) -> Option<Value> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

fn write_json(path: &Path, value: &Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("create config directory")?;
    }
    let content = serde_json::to_string_pretty(value).context("serialize config")?;
    fs::write(path, content).context("write config file")
}
