use std::path::Path;

use tracing::debug;

use crate::errors::CoreError;
use crate::models::ledger::Ledger;

use super::crypto::{self, KdfParams};
use super::format::{self, StoreFile};

/// High-level storage operations: save/load the ledger to/from encrypted
/// bytes or files.
pub struct StorageManager;

impl StorageManager {
    /// Encrypt and serialize a ledger with the default KDF parameters.
    ///
    /// Flow: Ledger → bincode → AES-256-GCM(Argon2id(password)) → PFTK bytes
    pub fn save_to_bytes(ledger: &Ledger, password: &str) -> Result<Vec<u8>, CoreError> {
        Self::save_to_bytes_with(ledger, password, &KdfParams::default())
    }

    /// Same as [`save_to_bytes`](Self::save_to_bytes) with explicit KDF parameters.
    pub fn save_to_bytes_with(
        ledger: &Ledger,
        password: &str,
        kdf_params: &KdfParams,
    ) -> Result<Vec<u8>, CoreError> {
        let plaintext = bincode::serialize(ledger)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize ledger: {e}")))?;
        let payload = crypto::seal(&plaintext, password, kdf_params)?;
        Ok(format::encode(&StoreFile {
            version: format::CURRENT_VERSION,
            kdf_params: *kdf_params,
            payload,
        }))
    }

    /// Decrypt and deserialize a ledger. The KDF parameters come from the header.
    pub fn load_from_bytes(data: &[u8], password: &str) -> Result<Ledger, CoreError> {
        let file = format::decode(data)?;
        let plaintext = crypto::open(&file.payload, password, &file.kdf_params)?;
        bincode::deserialize(&plaintext)
            .map_err(|e| CoreError::Deserialization(format!("Failed to deserialize ledger: {e}")))
    }

    pub fn save_to_file(ledger: &Ledger, path: impl AsRef<Path>, password: &str) -> Result<(), CoreError> {
        Self::save_to_file_with(ledger, path, password, &KdfParams::default())
    }

    /// Write the store file, creating parent directories as needed.
    pub fn save_to_file_with(
        ledger: &Ledger,
        path: impl AsRef<Path>,
        password: &str,
        kdf_params: &KdfParams,
    ) -> Result<(), CoreError> {
        let path = path.as_ref();
        let bytes = Self::save_to_bytes_with(ledger, password, kdf_params)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &bytes)?;
        debug!(path = %path.display(), bytes = bytes.len(), "store saved");
        Ok(())
    }

    pub fn load_from_file(path: impl AsRef<Path>, password: &str) -> Result<Ledger, CoreError> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::load_from_bytes(&bytes, password)
    }
}
