use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use anyhow::Result;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as Base64;
use rand_core::OsRng;
use rand_core::TryRngCore;

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

/// Encrypts a stored password for at-rest obfuscation. A fresh key and
/// nonce are generated per call and appended to the ciphertext, so the
/// blob is self-contained: `base64(ciphertext || key || nonce)`.
pub fn encrypt(plaintext: &str) -> Result<String> {
    let mut key_bytes = [0u8; KEY_LEN];
    let mut nonce_bytes = [0u8; NONCE_LEN];
    let mut rng = OsRng;
    rng.try_fill_bytes(&mut key_bytes)
        .map_err(|err| anyhow::anyhow!("random key failed: {err:?}"))?;
    rng.try_fill_bytes(&mut nonce_bytes)
        .map_err(|err| anyhow::anyhow!("random nonce failed: {err:?}"))?;

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key_bytes));
    let nonce = Nonce::from_slice(&nonce_bytes);
    let mut blob = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|err| anyhow::anyhow!("encrypt failed: {err:?}"))?;
    blob.extend_from_slice(&key_bytes);
    blob.extend_from_slice(&nonce_bytes);
    Ok(Base64.encode(blob))
}

/// Reverses [`encrypt`]. Any malformed or tampered blob yields `None`;
/// an undecryptable stored password is treated as absent data upstream.
pub fn decrypt(blob: &str) -> Option<String> {
    let bytes = Base64.decode(blob).ok()?;
    if bytes.len() < KEY_LEN + NONCE_LEN {
        return None;
    }
    let (rest, nonce_bytes) = bytes.split_at(bytes.len() - NONCE_LEN);
    let (ciphertext, key_bytes) = rest.split_at(rest.len() - KEY_LEN);

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key_bytes));
    let nonce = Nonce::from_slice(nonce_bytes);
    let plaintext = cipher.decrypt(nonce, ciphertext).ok()?;
    String::from_utf8(plaintext).ok()
}
