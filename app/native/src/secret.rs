//! Encrypted-at-rest storage for the image API credential.
//!
//! A random 256-bit key is generated once and kept next to the credential
//! file. The credential is sealed with ChaCha20-Poly1305 and stored as
//! base64 text (`nonce || ciphertext`).
//!
//! This only protects against casual inspection of the credential file: anyone
//! who can read both files can recover the plaintext.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use rand::Rng;
use zeroize::Zeroizing;

use crate::error::AiwallError;
use crate::paths::AppPaths;

/// Size of the symmetric key in bytes.
pub const KEY_SIZE: usize = 32;

/// Size of the per-message nonce in bytes.
pub const NONCE_SIZE: usize = 12;

/// Owns the key file and the encrypted credential file.
#[derive(Debug, Clone)]
pub struct SecretStore {
    key_path: PathBuf,
    credential_path: PathBuf,
}

impl SecretStore {
    #[must_use]
    pub const fn new(key_path: PathBuf, credential_path: PathBuf) -> Self {
        Self { key_path, credential_path }
    }

    #[must_use]
    pub fn from_paths(paths: &AppPaths) -> Self {
        Self::new(paths.key_file(), paths.credential_file())
    }

    /// Generates and persists the local key if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`AiwallError::Io`] if the key cannot be written.
    pub fn ensure_key(&self) -> Result<(), AiwallError> {
        if self.key_path.exists() {
            return Ok(());
        }

        let mut key = Zeroizing::new([0u8; KEY_SIZE]);
        rand::rng().fill(&mut key[..]);
        write_private(&self.key_path, &key[..])?;

        tracing::info!(path = %self.key_path.display(), "generated credential encryption key");
        Ok(())
    }

    /// Encrypts `plaintext` exactly as given and overwrites the credential
    /// file.
    ///
    /// # Errors
    ///
    /// Returns [`AiwallError::Io`] on write failure.
    pub fn save_credential(&self, plaintext: &str) -> Result<(), AiwallError> {
        self.ensure_key()?;
        let cipher = self.cipher()?;

        let mut nonce = [0u8; NONCE_SIZE];
        rand::rng().fill(&mut nonce[..]);

        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|err| AiwallError::Io(format!("failed to encrypt credential: {err}")))?;

        let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);

        write_private(&self.credential_path, BASE64.encode(sealed).as_bytes())?;
        tracing::info!(path = %self.credential_path.display(), "saved encrypted API key");
        Ok(())
    }

    /// Loads and decrypts the stored credential.
    ///
    /// Returns `Ok(None)` when no credential has been saved.
    ///
    /// # Errors
    ///
    /// Returns [`AiwallError::Decryption`] if the stored ciphertext cannot be
    /// opened with the local key, [`AiwallError::Io`] if a file cannot be read.
    pub fn load_credential(&self) -> Result<Option<Zeroizing<String>>, AiwallError> {
        if !self.credential_path.exists() {
            return Ok(None);
        }

        let encoded = fs::read_to_string(&self.credential_path)
            .map_err(|err| AiwallError::io(self.credential_path.display(), &err))?;

        self.ensure_key()?;
        let cipher = self.cipher()?;

        let sealed = BASE64
            .decode(encoded.trim())
            .map_err(|err| AiwallError::Decryption(format!("invalid encoding: {err}")))?;
        if sealed.len() <= NONCE_SIZE {
            return Err(AiwallError::Decryption("ciphertext is truncated".to_string()));
        }

        let (nonce, ciphertext) = sealed.split_at(NONCE_SIZE);
        let plaintext = cipher.decrypt(Nonce::from_slice(nonce), ciphertext).map_err(|_| {
            AiwallError::Decryption("key does not match the stored ciphertext".to_string())
        })?;

        let text = String::from_utf8(plaintext)
            .map_err(|_| AiwallError::Decryption("credential is not valid UTF-8".to_string()))?;
        Ok(Some(Zeroizing::new(text)))
    }

    /// Returns whether a credential file is present.
    #[must_use]
    pub fn has_credential(&self) -> bool { self.credential_path.exists() }

    /// Deletes the stored credential. Returns `false` if there was none.
    ///
    /// # Errors
    ///
    /// Returns [`AiwallError::Io`] if the file exists but cannot be removed.
    pub fn clear_credential(&self) -> Result<bool, AiwallError> {
        if !self.credential_path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.credential_path)
            .map_err(|err| AiwallError::io(self.credential_path.display(), &err))?;
        Ok(true)
    }

    fn cipher(&self) -> Result<ChaCha20Poly1305, AiwallError> {
        let key = Zeroizing::new(
            fs::read(&self.key_path).map_err(|err| AiwallError::io(self.key_path.display(), &err))?,
        );
        if key.len() != KEY_SIZE {
            return Err(AiwallError::Decryption(format!(
                "key file has {} bytes, expected {KEY_SIZE}",
                key.len()
            )));
        }
        Ok(ChaCha20Poly1305::new(Key::from_slice(&key)))
    }
}

/// Writes a file readable only by the current user where the platform allows it.
fn write_private(path: &Path, contents: &[u8]) -> Result<(), AiwallError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| AiwallError::io(parent.display(), &err))?;
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(|err| AiwallError::io(path.display(), &err))?;
    file.write_all(contents).map_err(|err| AiwallError::io(path.display(), &err))?;
    Ok(())
}
