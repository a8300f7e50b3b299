//! SSH terminal profile management: reconciles editable profile sources
//! against a validated persisted cache and turns validated profiles into
//! live, bridged SSH sessions.

pub mod config;
pub mod crypto;
pub mod keygen;
pub mod model;
pub mod session;
pub mod ssh;
pub mod storage;
pub mod validator;
pub mod watch;

pub use config::{ConfigService, KeyCacheClear, SshKeyAdded};
pub use keygen::{KeyGenerator, OpenSshKeygen};
pub use model::{
    CacheFile, Changeset, Envs, KeyAlgorithm, Named, Platform, Scope, ScopedTerminals, ShellArgs,
    SshConfig, SshKeyFile, SshKeyPair, SshTerminal, Terminal,
};
pub use session::{
    ChannelEvent, ConnectParams, LocalBridge, LocalTerminal, LogNotifier, Notifier,
    PasswordPrompt, RemoteSession, RemoteTransport, SessionManager, SessionOptions, ShellLink,
    TerminalHost, TtyPrompt,
};
pub use ssh::Ssh2Transport;
pub use storage::ProfileStore;
pub use validator::{classify_change, validate_terminal, ChangeKind};
pub use watch::Watched;
