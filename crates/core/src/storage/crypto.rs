use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::errors::CoreError;

pub const SALT_LEN: usize = 16;
pub const NONCE_LEN: usize = 12;
pub const KEY_LEN: usize = 32;

/// Argon2id parameters for key derivation.
/// Written into the store header so a file always opens with the
/// parameters it was sealed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB
    pub memory_cost: u32,
    /// Number of iterations
    pub time_cost: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_cost: 65_536, // 64 MiB
            time_cost: 3,
            parallelism: 4,
        }
    }
}

/// Ciphertext plus the random material needed to open it again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedPayload {
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    /// AES-256-GCM output, authentication tag appended
    pub ciphertext: Vec<u8>,
}

/// Derive a 256-bit key from a password with Argon2id.
pub fn derive_key(password: &str, salt: &[u8; SALT_LEN], params: &KdfParams) -> Result<[u8; KEY_LEN], CoreError> {
    let argon2_params = Params::new(
        params.memory_cost,
        params.time_cost,
        params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| CoreError::Encryption(format!("Invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut key = [0u8; KEY_LEN];
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut key)
        .map_err(|e| CoreError::Encryption(format!("Argon2 key derivation failed: {e}")))?;
    Ok(key)
}

/// Encrypt `plaintext` under a key derived from `password` with a fresh
/// salt and nonce.
pub fn seal(plaintext: &[u8], password: &str, params: &KdfParams) -> Result<SealedPayload, CoreError> {
    let salt: [u8; SALT_LEN] = random_bytes()?;
    let nonce: [u8; NONCE_LEN] = random_bytes()?;
    let key = derive_key(password, &salt, params)?;

    let cipher = Aes256Gcm::new_from_slice(&key)
        .map_err(|e| CoreError::Encryption(format!("Failed to create cipher: {e}")))?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| CoreError::Encryption(format!("Encryption failed: {e}")))?;

    Ok(SealedPayload {
        salt,
        nonce,
        ciphertext,
    })
}

/// Decrypt a payload. A wrong password and tampered data both surface
/// as `CoreError::Decryption` since GCM cannot tell them apart.
pub fn open(payload: &SealedPayload, password: &str, params: &KdfParams) -> Result<Vec<u8>, CoreError> {
    let key = derive_key(password, &payload.salt, params)?;
    let cipher = Aes256Gcm::new_from_slice(&key)
        .map_err(|e| CoreError::Encryption(format!("Failed to create cipher: {e}")))?;
    Ok(cipher.decrypt(Nonce::from_slice(&payload.nonce), payload.ciphertext.as_slice())?)
}

fn random_bytes<const N: usize>() -> Result<[u8; N], CoreError> {
    let mut buf = [0u8; N];
    getrandom::getrandom(&mut buf)
        .map_err(|e| CoreError::Encryption(format!("Failed to gather randomness: {e}")))?;
    Ok(buf)
}
