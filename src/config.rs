use std::path::{Path, PathBuf};

use anyhow::Result;
use serde_json::{Map, Value};
use tracing::debug;

use crate::keygen::KeyGenerator;
use crate::model::{
    CacheFile, Changeset, KeyAlgorithm, Scope, ScopedTerminals, SshKeyPair, SshTerminal, Terminal,
};
use crate::storage::{ProfileStore, is_file_in_directory};
use crate::validator::{
    ChangeKind, classify_change, contains_name, has_usable_key, terminal_map, validate_terminal,
};

/// Outcome of [`ConfigService::add_ssh_key`].
#[derive(Debug, Clone)]
pub struct SshKeyAdded {
    pub keys: SshKeyPair,
    pub changes: Changeset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCacheClear {
    /// Drop the whole generated-key directory.
    Force,
    /// Remove only keys no longer referenced by a valid terminal.
    UnusedOnly,
}

/// Keeps the persisted, validated cache synchronized with the live
/// profile sources and reports exactly what changed on each pass.
pub struct ConfigService {
    store: ProfileStore,
}

impl ConfigService {
    pub fn new(store: ProfileStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    /// Validated terminals from the persisted cache. A missing or corrupt
    /// cache reads as two empty scopes; it self-heals on the next write.
    pub fn load_effective_terminals(&self) -> ScopedTerminals<SshTerminal> {
        let mut terminals = self
            .store
            .read_cache()
            .map(|cache| cache.terminals)
            .unwrap_or_default();
        dedup_by_name(&mut terminals.global);
        dedup_by_name(&mut terminals.workspace);
        terminals
    }

    /// Like [`Self::load_effective_terminals`], additionally filtered down
    /// to terminals whose key file exists right now.
    pub fn load_valid_ssh_key_terminals(&self) -> ScopedTerminals<SshTerminal> {
        let mut terminals = self.load_effective_terminals();
        terminals.global.retain(has_usable_key);
        terminals.workspace.retain(has_usable_key);
        terminals
    }

    /// Unvalidated view of the live profile sources, for letting the user
    /// pick an entry to edit even if it does not yet qualify.
    pub fn load_modifiable_terminals(&self) -> ScopedTerminals<Terminal> {
        let mut terminals = ScopedTerminals::new();
        for scope in [Scope::Global, Scope::Workspace] {
            let profiles = self.store.live_profiles(scope);
            let list = terminals.scope_mut(scope);
            for (name, entry) in &profiles {
                if !entry.is_object() {
                    continue;
                }
                let mut value = entry.clone();
                value["name"] = Value::String(name.clone());
                if let Ok(terminal) = serde_json::from_value::<Terminal>(value) {
                    if !list.iter().any(|t: &Terminal| t.name == *name) {
                        list.push(terminal);
                    }
                }
            }
        }
        terminals
    }

    /// Resolves a profile by name from the effective view; a workspace
    /// entry shadows a global entry of the same name.
    pub fn find_terminal(&self, name: &str) -> Option<SshTerminal> {
        self.load_effective_terminals()
            .merged()
            .into_iter()
            .find(|terminal| terminal.name == name)
            .cloned()
    }

    /// Reconciles the live sources into the cache, as on startup.
    pub fn synchronize(&self) -> Result<Changeset> {
        self.update_all(self.live_terminals())
    }

    /// Reconciliation entry point for a saved configuration file.
    ///
    /// `path` decides the scope; a path that is neither known config
    /// location is not ours and returns `None`. Malformed JSON means "no
    /// changes this pass": the cache is left untouched and an empty
    /// changeset is returned.
    pub fn save_raw_config_text(&self, text: &str, path: &Path) -> Result<Option<Changeset>> {
        let Some(scope) = self.store.scope_of(path) else {
            return Ok(None);
        };

        let document: Value = match serde_json::from_str(text) {
            Ok(document) => document,
            Err(err) => {
                debug!(path = %path.display(), %err, "unparseable config save, keeping cache");
                return Ok(Some(Changeset::default()));
            }
        };
        let profiles = document
            .get(self.store.platform().profiles_key())
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        let mut new_terminals = self.live_terminals();
        *new_terminals.scope_mut(scope) = collect_valid(&profiles);
        self.update_all(new_terminals).map(Some)
    }

    /// Generates a key pair, wires its private-key path into the terminal
    /// and writes the terminal back to both the live source and the cache.
    pub fn add_ssh_key(
        &self,
        keygen: &dyn KeyGenerator,
        mut terminal: SshTerminal,
        scope: Scope,
        algorithm: KeyAlgorithm,
        password: &str,
    ) -> Result<SshKeyAdded> {
        let keys = keygen.create_key_pair(self.store.key_dir(), algorithm, password)?;
        terminal.ssh.key = Some(keys.private.path.to_string_lossy().into_owned());

        self.store.update_live_profile(scope, &terminal)?;
        let changes = self.update_one(&terminal, scope)?;
        Ok(SshKeyAdded { keys, changes })
    }

    /// Generated-key housekeeping. Returns the removed key files.
    pub fn clear_key_cache(&self, mode: KeyCacheClear) -> Result<Vec<PathBuf>> {
        match mode {
            KeyCacheClear::Force => {
                self.store.reset_key_dir()?;
                Ok(Vec::new())
            }
            KeyCacheClear::UnusedOnly => {
                let terminals = self.load_valid_ssh_key_terminals();
                let keep: Vec<PathBuf> = terminals
                    .global
                    .iter()
                    .chain(&terminals.workspace)
                    .filter_map(|terminal| terminal.ssh.key.as_deref())
                    .map(PathBuf::from)
                    .filter(|key| is_file_in_directory(self.store.key_dir(), key))
                    .collect();
                self.store.prune_key_dir(&keep)
            }
        }
    }

    /// Validated snapshot of both live scopes.
    fn live_terminals(&self) -> ScopedTerminals<SshTerminal> {
        let mut terminals = ScopedTerminals::new();
        for scope in [Scope::Global, Scope::Workspace] {
            *terminals.scope_mut(scope) = collect_valid(&self.store.live_profiles(scope));
        }
        terminals
    }

    /// Merges a full new terminal set into the cache, scope by scope. The
    /// new set is written back unconditionally: it is the new source of
    /// truth even for entries that did not change.
    fn update_all(&self, new_terminals: ScopedTerminals<SshTerminal>) -> Result<Changeset> {
        let mut changes = Changeset::default();
        match self.store.read_cache() {
            None => {
                // first run: everything counts as saved
                for terminal in new_terminals.global.iter().chain(&new_terminals.workspace) {
                    push_unique(&mut changes.saved, terminal);
                }
            }
            Some(cache) => {
                diff_scope(&mut changes, &cache.terminals.global, &new_terminals.global);
                diff_scope(
                    &mut changes,
                    &cache.terminals.workspace,
                    &new_terminals.workspace,
                );
            }
        }
        self.store.write_cache(&CacheFile {
            terminals: new_terminals,
        })?;
        Ok(changes)
    }

    /// Merges a single terminal into one cache scope; the other scope is
    /// carried over untouched.
    fn update_one(&self, terminal: &SshTerminal, scope: Scope) -> Result<Changeset> {
        let mut terminals = self
            .store
            .read_cache()
            .map(|cache| cache.terminals)
            .unwrap_or_default();

        let mut changes = Changeset::default();
        let list = terminals.scope_mut(scope);
        match list.iter_mut().find(|t| t.name == terminal.name) {
            Some(existing) => {
                match classify_change(Some(&*existing), Some(terminal)) {
                    ChangeKind::Edited => push_unique(&mut changes.edited, terminal),
                    _ => {}
                }
                *existing = terminal.clone();
            }
            None => {
                list.push(terminal.clone());
                push_unique(&mut changes.saved, terminal);
            }
        }

        self.store.write_cache(&CacheFile { terminals })?;
        Ok(changes)
    }
}

/// Extracts the SSH-qualifying subset of a live profile map, in source
/// order, first occurrence winning on a name collision.
fn collect_valid(profiles: &Map<String, Value>) -> Vec<SshTerminal> {
    let mut terminals: Vec<SshTerminal> = Vec::new();
    for (name, entry) in profiles {
        if let Some(terminal) = validate_terminal(entry, Some(name)) {
            if !contains_name(&terminals, &terminal.name) {
                terminals.push(terminal);
            }
        }
    }
    terminals
}

/// Classifies the union of names across the previous and new contents of
/// one scope, appending to the changeset buckets with per-bucket name
/// deduplication.
fn diff_scope(changes: &mut Changeset, prev: &[SshTerminal], next: &[SshTerminal]) {
    let prev_map = terminal_map(prev);
    let next_map = terminal_map(next);

    for terminal in prev.iter().chain(next) {
        let before = prev_map.get(terminal.name.as_str()).copied();
        let after = next_map.get(terminal.name.as_str()).copied();
        match classify_change(before, after) {
            ChangeKind::Created => {
                if let Some(after) = after {
                    push_unique(&mut changes.saved, after);
                }
            }
            ChangeKind::Edited => {
                if let Some(after) = after {
                    push_unique(&mut changes.edited, after);
                }
            }
            ChangeKind::Removed => {
                if let Some(before) = before {
                    push_unique(&mut changes.removed, before);
                }
            }
            ChangeKind::None => {}
        }
    }
}

fn push_unique(bucket: &mut Vec<SshTerminal>, terminal: &SshTerminal) {
    if !contains_name(bucket, &terminal.name) {
        bucket.push(terminal.clone());
    }
}

fn dedup_by_name(terminals: &mut Vec<SshTerminal>) {
    let mut seen = Vec::new();
    terminals.retain(|terminal| {
        if seen.contains(&terminal.name) {
            false
        } else {
            seen.push(terminal.name.clone());
            true
        }
    });
}
