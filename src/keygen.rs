use std::fs;
use std::path::Path;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};

use crate::model::{KeyAlgorithm, SshKeyFile, SshKeyPair};

/// Key-pair generation, injected so reconciliation tests run without
/// touching a real keygen binary.
pub trait KeyGenerator {
    fn create_key_pair(
        &self,
        dir: &Path,
        algorithm: KeyAlgorithm,
        password: &str,
    ) -> Result<SshKeyPair>;
}

/// Production generator shelling out to `ssh-keygen`. Key files land in
/// `dir` under a timestamped name; the passphrase may be empty.
pub struct OpenSshKeygen;

impl KeyGenerator for OpenSshKeygen {
    fn create_key_pair(
        &self,
        dir: &Path,
        algorithm: KeyAlgorithm,
        password: &str,
    ) -> Result<SshKeyPair> {
        let private_path = dir.join(key_file_stem(algorithm));
        let public_path = private_path.with_extension("pub");
        // ssh-keygen prompts instead of overwriting, so clear leftovers
        let _ = fs::remove_file(&private_path);
        let _ = fs::remove_file(&public_path);

        let mut command = Command::new("ssh-keygen");
        command
            .arg("-q")
            .arg("-t")
            .arg(algorithm.keygen_type())
            .arg("-m")
            .arg("PEM")
            .arg("-C")
            .arg("Created by SSH-Terminal")
            .arg("-N")
            .arg(password)
            .arg("-f")
            .arg(&private_path);
        if algorithm == KeyAlgorithm::Rsa {
            command.arg("-b").arg("2048");
        }

        let output = command.output().context("run ssh-keygen")?;
        if !output.status.success() {
            anyhow::bail!(
                "ssh-keygen failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let private_key = fs::read_to_string(&private_path).context("read private key")?;
        let public_key = fs::read_to_string(&public_path).context("read public key")?;
        Ok(SshKeyPair {
            private: SshKeyFile {
                path: private_path,
                key: private_key,
            },
            public: SshKeyFile {
                path: public_path,
                key: public_key,
            },
        })
    }
}

fn key_file_stem(algorithm: KeyAlgorithm) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis())
        .unwrap_or(0);
    format!("{}_{millis}", algorithm.keygen_type())
}
