use std::collections::HashSet;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, warn};

use crate::config::ConfigService;
use crate::crypto;
use crate::model::SshTerminal;

pub const DEFAULT_MAX_RETRIES: usize = 3;
pub const DEFAULT_GREETING_WINDOW: Duration = Duration::from_millis(30);
const DEFAULT_GREETING: &str = "Opened with SSH-Terminal";

/// Parameters handed to the remote transport for one connect attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectParams {
    pub host: String,
    pub user: String,
    pub port: Option<u16>,
    pub password: Option<String>,
    pub key_path: Option<String>,
}

/// One event out of an open remote shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Data(Vec<u8>),
    Closed(i32),
}

/// Duplex handle to an open remote shell. The transport owns the far
/// side of both queues: bytes sent through `input` reach the remote
/// unchanged, and everything the remote produces arrives on `output`.
pub struct ShellLink {
    pub input: mpsc::Sender<Vec<u8>>,
    pub output: mpsc::Receiver<ChannelEvent>,
}

pub trait RemoteTransport {
    type Session: RemoteSession + Send + 'static;

    fn connect(&self, params: &ConnectParams) -> Result<Self::Session>;
}

pub trait RemoteSession {
    fn request_shell(&mut self) -> Result<ShellLink>;
}

/// The write/close surface of a local terminal standing in for the
/// remote shell.
pub trait LocalBridge: Send {
    fn write(&mut self, data: &str);
    fn close(&mut self, exit_code: i32);
}

/// The host UI. Creating a bridge yields the surface plus the process id
/// the new terminal runs under; the input sender carries local
/// keystrokes to the remote verbatim.
pub trait TerminalHost {
    fn create_bridge(
        &mut self,
        terminal: &SshTerminal,
        input: mpsc::Sender<Vec<u8>>,
    ) -> (Box<dyn LocalBridge>, u32);

    fn dispose_terminal(&mut self, pid: u32);
}

pub trait PasswordPrompt {
    fn prompt(&mut self, message: &str) -> Option<String>;
}

/// Interactive prompt on the controlling tty.
pub struct TtyPrompt;

impl PasswordPrompt for TtyPrompt {
    fn prompt(&mut self, message: &str) -> Option<String> {
        rpassword::prompt_password(format!("{message}: "))
            .ok()
            .filter(|password| !password.is_empty())
    }
}

/// Fire-and-forget surfacing of outcomes to the user.
pub trait Notifier {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}

/// Notifier that only feeds the log, for headless hosts.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }
}

/// A terminal on the host side, identified by its process id. `name` is
/// only set for terminals created from an `overrideName` profile.
#[derive(Debug, Clone)]
pub struct LocalTerminal {
    pub name: Option<String>,
    pub pid: u32,
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub max_retries: usize,
    /// How long after the shell opened a first data chunk still counts
    /// as a login banner worth folding into the greeting.
    pub greeting_window: Duration,
    pub greeting: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            greeting_window: DEFAULT_GREETING_WINDOW,
            greeting: DEFAULT_GREETING.to_string(),
        }
    }
}

/// Turns validated profiles into live, bridged remote sessions: bounded
/// retry with interactive credential recovery, greeting injection, and
/// exactly one close notification per session.
pub struct SessionManager<T: RemoteTransport> {
    config: ConfigService,
    transport: T,
    host: Box<dyn TerminalHost>,
    prompt: Box<dyn PasswordPrompt>,
    notifier: Box<dyn Notifier>,
    options: SessionOptions,
    active: Arc<Mutex<HashSet<u32>>>,
}

impl<T: RemoteTransport> SessionManager<T> {
    pub fn new(
        config: ConfigService,
        transport: T,
        host: Box<dyn TerminalHost>,
        prompt: Box<dyn PasswordPrompt>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self::with_options(config, transport, host, prompt, notifier, SessionOptions::default())
    }

    pub fn with_options(
        config: ConfigService,
        transport: T,
        host: Box<dyn TerminalHost>,
        prompt: Box<dyn PasswordPrompt>,
        notifier: Box<dyn Notifier>,
        options: SessionOptions,
    ) -> Self {
        Self {
            config,
            transport,
            host,
            prompt,
            notifier,
            options,
            active: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn config(&self) -> &ConfigService {
        &self.config
    }

    pub fn is_tracked(&self, pid: u32) -> bool {
        self.active.lock().map(|set| set.contains(&pid)).unwrap_or(false)
    }

    /// Attaches a remote session to the terminal the host reports as
    /// active. Terminals without a profile name are not ours; a process
    /// id with a tracked connection is a duplicate trigger and no-ops.
    pub fn connect_terminal(&mut self, local: &LocalTerminal) {
        let Some(name) = local.name.clone() else {
            return;
        };
        if !self.track(local.pid) {
            return;
        }
        let Some(terminal) = self.config.find_terminal(&name) else {
            self.untrack(local.pid);
            return;
        };

        if self.create_session(&terminal) {
            // the plain local terminal would linger as a dead duplicate
            self.host.dispose_terminal(local.pid);
        } else {
            self.untrack(local.pid);
        }
    }

    /// The bounded attempt loop. Returns true once a bridged session is
    /// live, false when attempts are exhausted or credentials are
    /// missing outright.
    fn create_session(&mut self, terminal: &SshTerminal) -> bool {
        let mut password = terminal.ssh.password.clone();
        if terminal.ssh.crypted {
            // an undecryptable stored password is absent, not an error
            password = password.as_deref().and_then(crypto::decrypt);
        }

        let mut tries = 0;
        while tries < self.options.max_retries {
            if tries != 0 {
                password = self.prompt.prompt("Enter SSH Password");
            }
            if terminal.ssh.key.is_none() && password.is_none() {
                self.notifier.error("Connection details are not provided!");
                return false;
            }

            let params = ConnectParams {
                host: terminal.ssh.host.clone(),
                user: terminal.ssh.user.clone(),
                port: terminal.ssh.port,
                password: password.clone(),
                key_path: terminal.ssh.key.clone(),
            };
            let opened = self
                .transport
                .connect(&params)
                .and_then(|mut session| Ok((session.request_shell()?, session)));
            match opened {
                Ok((link, session)) => {
                    self.bridge_session(terminal, session, link, Instant::now());
                    return true;
                }
                Err(err) => {
                    tries += 1;
                    warn!(host = %terminal.ssh.host, attempt = tries, %err, "connect failed");
                    self.notifier.error(&format!("Failed to connect: {err}"));
                }
            }
        }
        false
    }

    /// Wires the open shell onto a fresh local bridge, injects the
    /// greeting and hands forwarding off to a background pump.
    fn bridge_session(
        &mut self,
        terminal: &SshTerminal,
        session: T::Session,
        link: ShellLink,
        shell_opened: Instant,
    ) {
        let ShellLink { input, output } = link;
        let (mut bridge, pid) = self.host.create_bridge(terminal, input.clone());
        self.track(pid);
        let _ = input.send(b"clear;\n".to_vec());

        // greeting race: a first chunk arriving inside the window is a
        // login banner and gets folded into the greeting
        let window = self
            .options
            .greeting_window
            .saturating_sub(shell_opened.elapsed());
        let banner = match output.recv_timeout(window) {
            Ok(ChannelEvent::Data(chunk)) => Some(chunk),
            Ok(ChannelEvent::Closed(code)) => {
                debug!(pid, code, "remote closed before greeting");
                deliver_close(bridge.as_mut(), code);
                self.untrack(pid);
                return;
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        };
        self.send_greeting(&input, terminal, banner.as_deref());
        if let Some(banner) = &banner {
            bridge.write(&String::from_utf8_lossy(banner));
        }

        let active = Arc::clone(&self.active);
        thread::spawn(move || {
            // keeps the remote handle alive until the channel closes
            let _session = session;
            let mut bridge = bridge;
            for event in output {
                match event {
                    ChannelEvent::Data(chunk) => bridge.write(&String::from_utf8_lossy(&chunk)),
                    ChannelEvent::Closed(code) => {
                        deliver_close(bridge.as_mut(), code);
                        break;
                    }
                }
            }
            if let Ok(mut active) = active.lock() {
                active.remove(&pid);
            }
        });
    }

    /// Environment assignments, the greeting echo and any startup
    /// arguments, written straight to the remote shell.
    fn send_greeting(
        &self,
        input: &mpsc::Sender<Vec<u8>>,
        terminal: &SshTerminal,
        banner: Option<&[u8]>,
    ) {
        if let Some(env) = &terminal.env {
            let assigns = env
                .iter()
                .map(|(key, value)| format!("{key}={}", value.as_deref().unwrap_or_default()))
                .collect::<Vec<_>>()
                .join(";");
            let _ = input.send(format!("{assigns};\n").into_bytes());
        }

        let greeting = &self.options.greeting;
        let line = match banner {
            Some(banner) => {
                let stripped: Vec<u8> = banner.iter().copied().filter(|b| *b != b'\r').collect();
                format!(
                    "clear;echo \"{greeting}\";echo \"{}\";\n",
                    String::from_utf8_lossy(&stripped)
                )
            }
            None => format!("echo \"{greeting}\";\n"),
        };
        let _ = input.send(line.into_bytes());

        if let Some(args) = &terminal.args {
            for arg in args.lines() {
                let _ = input.send(format!("{arg}\n").into_bytes());
            }
        }
    }

    fn track(&self, pid: u32) -> bool {
        self.active
            .lock()
            .map(|mut set| set.insert(pid))
            .unwrap_or(false)
    }

    fn untrack(&self, pid: u32) {
        if let Ok(mut set) = self.active.lock() {
            set.remove(&pid);
        }
    }
}

fn deliver_close(bridge: &mut dyn LocalBridge, code: i32) {
    bridge.write(&format!("\r\nExit with code: {code}\r\n"));
    bridge.close(code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Platform, ScopedTerminals, ShellArgs, SshConfig, CacheFile};
    use crate::storage::ProfileStore;
    use std::collections::VecDeque;

    fn terminal(name: &str) -> SshTerminal {
        SshTerminal {
            name: name.to_string(),
            override_name: true,
            icon: None,
            color: None,
            args: None,
            env: None,
            path: Some("/bin/bash".to_string()),
            source: None,
            ssh: SshConfig {
                host: "db.internal".to_string(),
                user: "deploy".to_string(),
                port: None,
                password: Some("stored-pw".to_string()),
                crypted: false,
                key: None,
            },
        }
    }

    fn config_with(terminals: Vec<SshTerminal>) -> ConfigService {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(
            Platform::Linux,
            dir.path().join("settings.json"),
            None,
            dir.path().join("storage"),
        )
        .unwrap();
        // leak the tempdir so the cache file outlives this helper
        std::mem::forget(dir);
        let mut scoped = ScopedTerminals::new();
        scoped.workspace = terminals;
        store
            .write_cache(&CacheFile { terminals: scoped })
            .unwrap();
        ConfigService::new(store)
    }

    #[derive(Default)]
    struct HostState {
        bridges: usize,
        next_pid: u32,
        disposed: Vec<u32>,
        writes: Vec<String>,
        closes: Vec<i32>,
    }

    #[derive(Clone, Default)]
    struct SharedHost(Arc<Mutex<HostState>>);

    impl SharedHost {
        fn state(&self) -> std::sync::MutexGuard<'_, HostState> {
            self.0.lock().unwrap()
        }
    }

    struct FakeBridge(SharedHost);

    impl LocalBridge for FakeBridge {
        fn write(&mut self, data: &str) {
            self.0.state().writes.push(data.to_string());
        }

        fn close(&mut self, exit_code: i32) {
            self.0.state().closes.push(exit_code);
        }
    }

    struct FakeHost(SharedHost);

    impl TerminalHost for FakeHost {
        fn create_bridge(
            &mut self,
            _terminal: &SshTerminal,
            _input: mpsc::Sender<Vec<u8>>,
        ) -> (Box<dyn LocalBridge>, u32) {
            let mut state = self.0.state();
            state.bridges += 1;
            state.next_pid += 1;
            let pid = 1000 + state.next_pid;
            (Box::new(FakeBridge(self.0.clone())), pid)
        }

        fn dispose_terminal(&mut self, pid: u32) {
            self.0.state().disposed.push(pid);
        }
    }

    struct ShellEnds {
        written: mpsc::Receiver<Vec<u8>>,
        remote: mpsc::Sender<ChannelEvent>,
    }

    #[derive(Clone)]
    struct FakeTransport {
        connects: Arc<Mutex<Vec<ConnectParams>>>,
        failures_before_success: usize,
        always_fail: bool,
        banner: Option<Vec<u8>>,
        ends: Arc<Mutex<Vec<ShellEnds>>>,
    }

    impl FakeTransport {
        fn new() -> Self {
            Self {
                connects: Arc::new(Mutex::new(Vec::new())),
                failures_before_success: 0,
                always_fail: false,
                banner: None,
                ends: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn connect_count(&self) -> usize {
            self.connects.lock().unwrap().len()
        }
    }

    struct FakeSession {
        banner: Option<Vec<u8>>,
        ends: Arc<Mutex<Vec<ShellEnds>>>,
    }

    impl RemoteTransport for FakeTransport {
        type Session = FakeSession;

        fn connect(&self, params: &ConnectParams) -> Result<FakeSession> {
            let mut connects = self.connects.lock().unwrap();
            connects.push(params.clone());
            if self.always_fail || connects.len() <= self.failures_before_success {
                anyhow::bail!("host unreachable");
            }
            Ok(FakeSession {
                banner: self.banner.clone(),
                ends: Arc::clone(&self.ends),
            })
        }
    }

    impl RemoteSession for FakeSession {
        fn request_shell(&mut self) -> Result<ShellLink> {
            let (input_tx, input_rx) = mpsc::channel();
            let (output_tx, output_rx) = mpsc::channel();
            if let Some(banner) = &self.banner {
                let _ = output_tx.send(ChannelEvent::Data(banner.clone()));
            }
            self.ends.lock().unwrap().push(ShellEnds {
                written: input_rx,
                remote: output_tx,
            });
            Ok(ShellLink {
                input: input_tx,
                output: output_rx,
            })
        }
    }

    struct FakePrompt {
        responses: Arc<Mutex<VecDeque<Option<String>>>>,
        calls: Arc<Mutex<usize>>,
    }

    struct FakeNotifier(Arc<Mutex<Vec<String>>>);

    impl PasswordPrompt for FakePrompt {
        fn prompt(&mut self, _message: &str) -> Option<String> {
            *self.calls.lock().unwrap() += 1;
            self.responses.lock().unwrap().pop_front().flatten()
        }
    }

    impl Notifier for FakeNotifier {
        fn info(&self, _message: &str) {}

        fn error(&self, message: &str) {
            self.0.lock().unwrap().push(message.to_string());
        }
    }

    struct Harness {
        manager: SessionManager<FakeTransport>,
        transport: FakeTransport,
        host: SharedHost,
        errors: Arc<Mutex<Vec<String>>>,
        prompt_calls: Arc<Mutex<usize>>,
    }

    fn harness(
        terminals: Vec<SshTerminal>,
        transport: FakeTransport,
        prompts: Vec<Option<String>>,
    ) -> Harness {
        let host = SharedHost::default();
        let errors = Arc::new(Mutex::new(Vec::new()));
        let prompt_calls = Arc::new(Mutex::new(0));
        let prompt = FakePrompt {
            responses: Arc::new(Mutex::new(prompts.into_iter().collect())),
            calls: Arc::clone(&prompt_calls),
        };
        let manager = SessionManager::new(
            config_with(terminals),
            transport.clone(),
            Box::new(FakeHost(host.clone())),
            Box::new(prompt),
            Box::new(FakeNotifier(Arc::clone(&errors))),
        );
        Harness {
            manager,
            transport,
            host,
            errors,
            prompt_calls,
        }
    }

    fn local(name: Option<&str>, pid: u32) -> LocalTerminal {
        LocalTerminal {
            name: name.map(str::to_string),
            pid,
        }
    }

    fn wait_until(mut check: impl FnMut() -> bool) {
        for _ in 0..200 {
            if check() {
                return;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("condition not reached in time");
    }

    fn drain_written(ends: &ShellEnds) -> String {
        let mut written = String::new();
        while let Ok(bytes) = ends.written.try_recv() {
            written.push_str(&String::from_utf8_lossy(&bytes));
        }
        written
    }

    #[test]
    fn retry_bound_is_exact_and_no_bridge_is_created() {
        let mut transport = FakeTransport::new();
        transport.always_fail = true;
        let mut h = harness(
            vec![terminal("db")],
            transport,
            vec![Some("pw".into()), Some("pw".into())],
        );

        h.manager.connect_terminal(&local(Some("db"), 7));

        assert_eq!(h.transport.connect_count(), DEFAULT_MAX_RETRIES);
        assert_eq!(h.host.state().bridges, 0);
        assert!(h.host.state().disposed.is_empty());
        assert_eq!(h.errors.lock().unwrap().len(), DEFAULT_MAX_RETRIES);
        // stored password is used on the first attempt only
        assert_eq!(*h.prompt_calls.lock().unwrap(), DEFAULT_MAX_RETRIES - 1);
        // a failed connect frees the pid for another try
        assert!(!h.manager.is_tracked(7));
    }

    #[test]
    fn missing_credentials_abort_without_any_attempt() {
        let mut profile = terminal("db");
        profile.ssh.password = None;
        let mut h = harness(vec![profile], FakeTransport::new(), vec![]);

        h.manager.connect_terminal(&local(Some("db"), 7));

        assert_eq!(h.transport.connect_count(), 0);
        let errors = h.errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Connection details are not provided"));
    }

    #[test]
    fn nameless_terminal_is_ignored() {
        let mut h = harness(vec![terminal("db")], FakeTransport::new(), vec![]);
        h.manager.connect_terminal(&local(None, 7));
        assert_eq!(h.transport.connect_count(), 0);
        assert!(h.errors.lock().unwrap().is_empty());
    }

    #[test]
    fn unknown_profile_name_is_ignored_and_untracked() {
        let mut h = harness(vec![terminal("db")], FakeTransport::new(), vec![]);
        h.manager.connect_terminal(&local(Some("nope"), 7));
        assert_eq!(h.transport.connect_count(), 0);
        assert!(!h.manager.is_tracked(7));
    }

    #[test]
    fn duplicate_process_id_opens_exactly_one_session() {
        let mut h = harness(vec![terminal("db")], FakeTransport::new(), vec![]);

        h.manager.connect_terminal(&local(Some("db"), 7));
        h.manager.connect_terminal(&local(Some("db"), 7));

        assert_eq!(h.transport.connect_count(), 1);
        assert_eq!(h.host.state().bridges, 1);
        // the originating plain terminal was torn down once
        assert_eq!(h.host.state().disposed, vec![7]);
    }

    #[test]
    fn prompted_password_replaces_stored_one_after_first_failure() {
        let mut transport = FakeTransport::new();
        transport.failures_before_success = 1;
        let mut h = harness(
            vec![terminal("db")],
            transport,
            vec![Some("fresh-pw".into())],
        );

        h.manager.connect_terminal(&local(Some("db"), 7));

        let connects = h.transport.connects.lock().unwrap();
        assert_eq!(connects.len(), 2);
        assert_eq!(connects[0].password.as_deref(), Some("stored-pw"));
        assert_eq!(connects[1].password.as_deref(), Some("fresh-pw"));
        assert_eq!(h.host.state().bridges, 1);
    }

    #[test]
    fn crypted_password_is_decrypted_before_connecting() {
        let mut profile = terminal("db");
        profile.ssh.password = Some(crypto::encrypt("plain-secret").unwrap());
        profile.ssh.crypted = true;
        let mut h = harness(vec![profile], FakeTransport::new(), vec![]);

        h.manager.connect_terminal(&local(Some("db"), 7));

        let connects = h.transport.connects.lock().unwrap();
        assert_eq!(connects[0].password.as_deref(), Some("plain-secret"));
    }

    #[test]
    fn undecryptable_password_counts_as_absent() {
        let mut profile = terminal("db");
        profile.ssh.password = Some("not a real blob".to_string());
        profile.ssh.crypted = true;
        profile.ssh.key = Some("/keys/id_ed25519".to_string());
        let mut h = harness(vec![profile], FakeTransport::new(), vec![]);

        h.manager.connect_terminal(&local(Some("db"), 7));

        let connects = h.transport.connects.lock().unwrap();
        assert_eq!(connects.len(), 1);
        assert_eq!(connects[0].password, None);
        assert_eq!(connects[0].key_path.as_deref(), Some("/keys/id_ed25519"));
    }

    #[test]
    fn banner_inside_window_is_folded_into_greeting() {
        let mut transport = FakeTransport::new();
        transport.banner = Some(b"Welcome to db.internal\r\n".to_vec());
        let mut profile = terminal("db");
        profile.env = Some(
            [("APP_ENV".to_string(), Some("prod".to_string()))]
                .into_iter()
                .collect(),
        );
        profile.args = Some(ShellArgs::List(vec!["cd /srv".into(), "ls".into()]));
        let mut h = harness(vec![profile], transport, vec![]);

        h.manager.connect_terminal(&local(Some("db"), 7));

        let ends = h.transport.ends.lock().unwrap();
        let written = drain_written(&ends[0]);
        assert!(written.contains("APP_ENV=prod;\n"));
        // carriage returns are stripped from the echoed banner
        assert!(written.contains("echo \"Welcome to db.internal\n\""));
        assert!(written.contains("clear;echo \"Opened with SSH-Terminal\""));
        assert!(written.contains("cd /srv\n"));
        assert!(written.contains("ls\n"));
        // the banner itself still reaches the local surface verbatim
        assert!(
            h.host
                .state()
                .writes
                .iter()
                .any(|w| w.contains("Welcome to db.internal"))
        );
    }

    #[test]
    fn quiet_shell_gets_greeting_without_banner() {
        let mut h = harness(vec![terminal("db")], FakeTransport::new(), vec![]);

        h.manager.connect_terminal(&local(Some("db"), 7));

        let ends = h.transport.ends.lock().unwrap();
        let written = drain_written(&ends[0]);
        assert!(written.contains("echo \"Opened with SSH-Terminal\";\n"));
        assert!(!written.contains("clear;echo \"Opened"));
    }

    #[test]
    fn remote_data_is_forwarded_verbatim() {
        let mut h = harness(vec![terminal("db")], FakeTransport::new(), vec![]);
        h.manager.connect_terminal(&local(Some("db"), 7));

        {
            let ends = h.transport.ends.lock().unwrap();
            ends[0]
                .remote
                .send(ChannelEvent::Data(b"total 4\r\n".to_vec()))
                .unwrap();
        }

        let host = h.host.clone();
        wait_until(move || host.state().writes.iter().any(|w| w == "total 4\r\n"));
    }

    #[test]
    fn remote_close_delivers_exactly_one_close_and_untracks() {
        let mut h = harness(vec![terminal("db")], FakeTransport::new(), vec![]);
        h.manager.connect_terminal(&local(Some("db"), 7));
        // FakeHost hands out pids starting at 1001
        assert!(h.manager.is_tracked(1001));

        {
            let ends = h.transport.ends.lock().unwrap();
            ends[0].remote.send(ChannelEvent::Closed(2)).unwrap();
        }

        let host = h.host.clone();
        wait_until(move || !host.state().closes.is_empty());
        wait_until(|| !h.manager.is_tracked(1001));
        let state = h.host.state();
        assert_eq!(state.closes, vec![2]);
        assert!(state.writes.iter().any(|w| w.contains("Exit with code: 2")));
    }
}
