use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use ssh2::{Channel, Session};
use tracing::debug;

use crate::session::{ChannelEvent, ConnectParams, RemoteSession, RemoteTransport, ShellLink};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_PORT: u16 = 22;
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// libssh2-backed transport. Each open shell runs its own pump thread
/// that bridges the non-blocking channel to the `ShellLink` queues.
pub struct Ssh2Transport;

pub struct Ssh2Session {
    session: Session,
}

impl RemoteTransport for Ssh2Transport {
    type Session = Ssh2Session;

    fn connect(&self, params: &ConnectParams) -> Result<Ssh2Session> {
        let address = format!("{}:{}", params.host, params.port.unwrap_or(DEFAULT_PORT));
        let mut last_err = None;
        let mut tcp = None;
        for addr in address.to_socket_addrs().context("resolve address")? {
            match TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT) {
                Ok(stream) => {
                    tcp = Some(stream);
                    break;
                }
                Err(err) => last_err = Some(err),
            }
        }
        let tcp = tcp.ok_or_else(|| {
            let err = last_err
                .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "connect failed"));
            anyhow::anyhow!("connect tcp failed: {err}")
        })?;
        tcp.set_read_timeout(Some(CONNECT_TIMEOUT)).ok();
        tcp.set_write_timeout(Some(CONNECT_TIMEOUT)).ok();

        let mut session = Session::new().context("create session")?;
        session.set_timeout(CONNECT_TIMEOUT.as_millis() as u32);
        session.set_tcp_stream(tcp);
        session.handshake().context("ssh handshake")?;

        if let Some(key) = &params.key_path {
            let path = expand_tilde(key);
            if !path.exists() {
                anyhow::bail!("Private key not found at {}", path.display());
            }
            // the stored password doubles as the key passphrase; a bad
            // passphrase falls through to password auth below
            let attempt = session.userauth_pubkey_file(
                &params.user,
                None,
                &path,
                params.password.as_deref(),
            );
            if let Err(err) = attempt {
                debug!(%err, "private key auth failed");
            }
        }
        if !session.authenticated() {
            if let Some(password) = &params.password {
                session
                    .userauth_password(&params.user, password)
                    .context("password auth")?;
            }
        }
        if !session.authenticated() {
            anyhow::bail!("Authentication failed");
        }

        Ok(Ssh2Session { session })
    }
}

impl RemoteSession for Ssh2Session {
    fn request_shell(&mut self) -> Result<ShellLink> {
        let mut channel = self.session.channel_session().context("open channel")?;
        channel
            .request_pty("xterm", None, None)
            .context("request pty")?;
        channel.shell().context("start shell")?;
        self.session.set_blocking(false);

        let (input_tx, input_rx) = mpsc::channel::<Vec<u8>>();
        let (output_tx, output_rx) = mpsc::channel();
        let session = self.session.clone();
        thread::spawn(move || pump_channel(session, channel, input_rx, output_tx));

        Ok(ShellLink {
            input: input_tx,
            output: output_rx,
        })
    }
}

/// Shuttles bytes both ways until the remote side hangs up, then reports
/// the exit status exactly once.
fn pump_channel(
    session: Session,
    mut channel: Channel,
    input: mpsc::Receiver<Vec<u8>>,
    output: mpsc::Sender<ChannelEvent>,
) {
    let mut buffer = [0u8; 4096];
    loop {
        if channel.eof() {
            break;
        }

        match channel.read(&mut buffer) {
            Ok(0) => {}
            Ok(count) => {
                if output
                    .send(ChannelEvent::Data(buffer[..count].to_vec()))
                    .is_err()
                {
                    break;
                }
            }
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {}
            Err(_) => break,
        }

        let mut disconnected = false;
        loop {
            match input.try_recv() {
                Ok(bytes) => {
                    channel.write_all(&bytes).ok();
                    channel.flush().ok();
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }
        if disconnected {
            break;
        }

        thread::sleep(POLL_INTERVAL);
    }

    session.set_blocking(true);
    let code = channel.exit_status().unwrap_or(0);
    channel.close().ok();
    let _ = output.send(ChannelEvent::Closed(code));
}

pub(crate) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
