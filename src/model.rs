use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Environment assignments for a profile. A `None` value means the variable
/// is declared but carries no value.
pub type Envs = BTreeMap<String, Option<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Global,
    Workspace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Mac,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::Mac
        } else {
            Platform::Linux
        }
    }

    pub fn section(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Mac => "osx",
            Platform::Linux => "linux",
        }
    }

    /// Key of the profile map inside a live settings document.
    pub fn profiles_key(&self) -> String {
        format!("terminal.integrated.profiles.{}", self.section())
    }
}

/// Shell arguments, either a single string or an ordered list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ShellArgs {
    One(String),
    List(Vec<String>),
}

impl ShellArgs {
    pub fn lines(&self) -> Vec<&str> {
        match self {
            ShellArgs::One(arg) => vec![arg.as_str()],
            ShellArgs::List(args) => args.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SshConfig {
    pub host: String,
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub crypted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// A terminal profile that passed validation: `override_name` is set, the
/// `ssh` block is present and carries host and user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SshTerminal {
    #[serde(default)]
    pub name: String,
    pub override_name: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<ShellArgs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<Envs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub ssh: SshConfig,
}

/// An unvalidated profile as it appears in the live source. Used for the
/// modifiable view, where the user may pick an entry that does not (yet)
/// qualify as an SSH terminal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Terminal {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub override_name: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<ShellArgs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<Envs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh: Option<SshConfig>,
}

pub trait Named {
    fn profile_name(&self) -> &str;
}

impl Named for SshTerminal {
    fn profile_name(&self) -> &str {
        &self.name
    }
}

impl Named for Terminal {
    fn profile_name(&self) -> &str {
        &self.name
    }
}

/// Profiles partitioned by configuration scope. Both scopes are kept
/// separate for persistence; `merged` builds the effective view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScopedTerminals<T> {
    #[serde(default = "Vec::new")]
    pub global: Vec<T>,
    #[serde(default = "Vec::new")]
    pub workspace: Vec<T>,
}

impl<T> Default for ScopedTerminals<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ScopedTerminals<T> {
    pub fn new() -> Self {
        Self {
            global: Vec::new(),
            workspace: Vec::new(),
        }
    }

    pub fn scope(&self, scope: Scope) -> &Vec<T> {
        match scope {
            Scope::Global => &self.global,
            Scope::Workspace => &self.workspace,
        }
    }

    pub fn scope_mut(&mut self, scope: Scope) -> &mut Vec<T> {
        match scope {
            Scope::Global => &mut self.global,
            Scope::Workspace => &mut self.workspace,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.workspace.is_empty()
    }
}

impl<T: Named> ScopedTerminals<T> {
    /// Effective view: exactly one entry per name, a workspace entry
    /// shadows a global entry of the same name.
    pub fn merged(&self) -> Vec<&T> {
        let mut merged: Vec<&T> = self.workspace.iter().collect();
        for terminal in &self.global {
            if !merged
                .iter()
                .any(|t| t.profile_name() == terminal.profile_name())
            {
                merged.push(terminal);
            }
        }
        merged
    }
}

/// Result of one reconciliation pass, deduplicated by name per bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changeset {
    pub saved: Vec<SshTerminal>,
    pub edited: Vec<SshTerminal>,
    pub removed: Vec<SshTerminal>,
}

impl Changeset {
    pub fn is_empty(&self) -> bool {
        self.saved.is_empty() && self.edited.is_empty() && self.removed.is_empty()
    }

    /// Human-readable summary for the notification sink, `None` when the
    /// pass changed nothing.
    pub fn summary(&self) -> Option<String> {
        fn names(terminals: &[SshTerminal]) -> String {
            terminals
                .iter()
                .map(|t| t.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        }

        let mut parts = Vec::new();
        if !self.saved.is_empty() {
            parts.push(format!("Terminals Saved: {}", names(&self.saved)));
        }
        if !self.edited.is_empty() {
            parts.push(format!("Terminals Edited: {}", names(&self.edited)));
        }
        if !self.removed.is_empty() {
            parts.push(format!("Terminals Removed: {}", names(&self.removed)));
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n"))
        }
    }
}

/// On-disk shape of the persisted cache.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheFile {
    #[serde(default)]
    pub terminals: ScopedTerminals<SshTerminal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAlgorithm {
    Rsa,
    Dsa,
    Ecdsa,
    Ed25519,
}

impl KeyAlgorithm {
    /// Type name as understood by `ssh-keygen -t`.
    pub fn keygen_type(&self) -> &'static str {
        match self {
            KeyAlgorithm::Rsa => "rsa",
            KeyAlgorithm::Dsa => "dsa",
            KeyAlgorithm::Ecdsa => "ecdsa",
            KeyAlgorithm::Ed25519 => "ed25519",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshKeyFile {
    pub path: PathBuf,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshKeyPair {
    pub private: SshKeyFile,
    pub public: SshKeyFile,
}
