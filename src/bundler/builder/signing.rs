//! Manifest signatures.
//!
//! `SIGNATURE.DS` carries either an OpenSSL signature over the manifest
//! checksum (when a private key is configured) or the checksum itself. The
//! checksum is the lowercase hex SHA-256 of `MANIFEST.json`, taken as ASCII
//! bytes; that is the representation the device recomputes and verifies.
//!
//! The unsigned form is only an integrity marker. Anyone can produce it, so
//! it must never be treated as proof of origin.

use super::checksum::file_checksum;
use crate::bundler::{
    SIGNATURE_FILE,
    error::{ErrorExt, Result},
};
use openssl::{
    hash::MessageDigest,
    pkey::{HasPublic, PKey, PKeyRef, Private},
    sign::{Signer, Verifier},
};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Passphrase the SDK tooling uses for developer signing keys.
pub const DEFAULT_KEY_PASSPHRASE: &str = "pass";

/// Integrity token written to `SIGNATURE.DS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureToken {
    /// Signature over the manifest checksum.
    Signature(Vec<u8>),
    /// The manifest checksum itself (unsigned package).
    Checksum(Vec<u8>),
}

impl SignatureToken {
    /// Raw bytes as written to disk.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Signature(bytes) | Self::Checksum(bytes) => bytes,
        }
    }

    /// True for a cryptographic signature.
    pub fn is_signed(&self) -> bool {
        matches!(self, Self::Signature(_))
    }
}

/// Produces the integrity token for the manifest at `manifest_path`.
///
/// With a key the checksum is signed using SHA-256 as the message digest;
/// RSA keys produce deterministic PKCS#1 v1.5 signatures.
pub fn sign(manifest_path: &Path, key: Option<&PKey<Private>>) -> Result<SignatureToken> {
    let checksum = file_checksum(manifest_path)?.into_bytes();

    match key {
        Some(key) => {
            let mut signer = Signer::new(MessageDigest::sha256(), key)?;
            signer.update(&checksum)?;
            Ok(SignatureToken::Signature(signer.sign_to_vec()?))
        }
        None => {
            log::warn!(
                "No signing key; {} will carry the bare manifest checksum",
                SIGNATURE_FILE
            );
            Ok(SignatureToken::Checksum(checksum))
        }
    }
}

/// Writes `token` to `<metadata_dir>/SIGNATURE.DS`.
pub fn write_signature(metadata_dir: &Path, token: &SignatureToken) -> Result<PathBuf> {
    let path = metadata_dir.join(SIGNATURE_FILE);
    fs::write(&path, token.as_bytes()).fs_context("writing signature", &path)?;
    Ok(path)
}

/// Checks `token` against the manifest at `manifest_path`.
///
/// Signatures are verified with `public_key`; checksum tokens are compared
/// against a fresh checksum and ignore the key.
pub fn verify<T: HasPublic>(
    manifest_path: &Path,
    token: &SignatureToken,
    public_key: &PKeyRef<T>,
) -> Result<bool> {
    let checksum = file_checksum(manifest_path)?.into_bytes();

    match token {
        SignatureToken::Signature(signature) => {
            let mut verifier = Verifier::new(MessageDigest::sha256(), public_key)?;
            verifier.update(&checksum)?;
            Ok(verifier.verify(signature)?)
        }
        SignatureToken::Checksum(bytes) => Ok(*bytes == checksum),
    }
}

/// Loads a PEM private key, decrypting it with `passphrase` when needed.
///
/// A malformed key or a wrong passphrase is an error; it never falls back to
/// an unsigned package.
pub fn load_private_key(path: &Path, passphrase: &str) -> Result<PKey<Private>> {
    let pem = fs::read(path).fs_context("reading private key", path)?;
    let key = PKey::private_key_from_pem_passphrase(&pem, passphrase.as_bytes())?;
    log::debug!("Loaded {:?} signing key from {}", key.id(), path.display());
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use openssl::{rsa::Rsa, symm::Cipher};
    use sha2::{Digest, Sha256};
    use tempfile::TempDir;

    fn manifest(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("MANIFEST.json");
        fs::write(&path, "{\n    \"app\": {}\n}").unwrap();
        path
    }

    fn rsa_key() -> PKey<Private> {
        PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap()
    }

    #[test]
    fn test_unsigned_token_is_hex_digest() {
        let dir = TempDir::new().unwrap();
        let path = manifest(&dir);

        let token = sign(&path, None).unwrap();
        assert!(!token.is_signed());

        let expected = hex::encode(Sha256::digest(fs::read(&path).unwrap()));
        assert_eq!(token.as_bytes(), expected.as_bytes());
    }

    #[test]
    fn test_signature_is_deterministic_and_verifies() {
        let dir = TempDir::new().unwrap();
        let path = manifest(&dir);
        let key = rsa_key();

        let first = sign(&path, Some(&key)).unwrap();
        let second = sign(&path, Some(&key)).unwrap();
        assert!(first.is_signed());
        assert_eq!(first, second);
        assert!(verify(&path, &first, &key).unwrap());

        fs::write(&path, "{}").unwrap();
        assert!(!verify(&path, &first, &key).unwrap());
    }

    #[test]
    fn test_write_signature() {
        let dir = TempDir::new().unwrap();
        let token = SignatureToken::Checksum(b"abc123".to_vec());
        let written = write_signature(dir.path(), &token).unwrap();
        assert_eq!(written, dir.path().join(SIGNATURE_FILE));
        assert_eq!(fs::read(written).unwrap(), b"abc123");
    }

    #[test]
    fn test_load_encrypted_key() {
        let dir = TempDir::new().unwrap();
        let rsa = Rsa::generate(2048).unwrap();
        let pem = rsa
            .private_key_to_pem_passphrase(Cipher::aes_256_cbc(), DEFAULT_KEY_PASSPHRASE.as_bytes())
            .unwrap();
        let key_path = dir.path().join("dev.pem");
        fs::write(&key_path, pem).unwrap();

        let key = load_private_key(&key_path, DEFAULT_KEY_PASSPHRASE).unwrap();
        assert_eq!(key.rsa().unwrap().n(), rsa.n());

        let err = load_private_key(&key_path, "wrong").unwrap_err();
        assert!(matches!(err, crate::bundler::Error::Crypto(_)));
    }

    #[test]
    fn test_load_garbage_key_fails() {
        let dir = TempDir::new().unwrap();
        let key_path = dir.path().join("bad.pem");
        fs::write(&key_path, "not a key").unwrap();
        assert!(matches!(
            load_private_key(&key_path, DEFAULT_KEY_PASSPHRASE).unwrap_err(),
            crate::bundler::Error::Crypto(_)
        ));
    }
}
