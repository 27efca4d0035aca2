use crate::errors::CoreError;

use super::crypto::{KdfParams, SealedPayload, NONCE_LEN, SALT_LEN};

/// Magic bytes identifying a Portfolio Tracker store file.
pub const MAGIC: &[u8; 4] = b"PFTK";

/// Current store format version.
pub const CURRENT_VERSION: u16 = 1;

/// Header size in bytes:
/// magic(4) + version(2) + kdf_params(12) + salt(16) + nonce(12) + ciphertext_len(8) = 54
pub const HEADER_SIZE: usize = 4 + 2 + 12 + SALT_LEN + NONCE_LEN + 8;

/// Upper bounds on KDF parameters accepted from a file header, so a
/// crafted file cannot make key derivation exhaust memory or CPU.
const MEMORY_COST_RANGE: std::ops::RangeInclusive<u32> = 8..=1_048_576;
const TIME_COST_RANGE: std::ops::RangeInclusive<u32> = 1..=20;
const PARALLELISM_RANGE: std::ops::RangeInclusive<u32> = 1..=16;

/// A decoded store file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreFile {
    pub version: u16,
    pub kdf_params: KdfParams,
    pub payload: SealedPayload,
}

/// Encode a store file.
///
/// Layout:
/// ```text
/// [PFTK: 4B] [version: 2B LE] [memory_cost: 4B LE] [time_cost: 4B LE]
/// [parallelism: 4B LE] [salt: 16B] [nonce: 12B] [ciphertext_len: 8B LE]
/// [ciphertext: variable]
/// ```
pub fn encode(file: &StoreFile) -> Vec<u8> {
    let payload = &file.payload;
    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.ciphertext.len());
    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&file.version.to_le_bytes());
    buf.extend_from_slice(&file.kdf_params.memory_cost.to_le_bytes());
    buf.extend_from_slice(&file.kdf_params.time_cost.to_le_bytes());
    buf.extend_from_slice(&file.kdf_params.parallelism.to_le_bytes());
    buf.extend_from_slice(&payload.salt);
    buf.extend_from_slice(&payload.nonce);
    buf.extend_from_slice(&(payload.ciphertext.len() as u64).to_le_bytes());
    buf.extend_from_slice(&payload.ciphertext);
    buf
}

/// Decode and validate a store file. Trailing bytes after the declared
/// ciphertext are ignored.
pub fn decode(data: &[u8]) -> Result<StoreFile, CoreError> {
    if data.len() < HEADER_SIZE {
        return Err(CoreError::InvalidFileFormat(
            "File too small to be a store file".into(),
        ));
    }

    let mut cursor = Cursor { data, offset: 0 };

    if cursor.take::<4>()? != *MAGIC {
        return Err(CoreError::InvalidFileFormat(
            "Invalid magic bytes, not a store file".into(),
        ));
    }

    let version = u16::from_le_bytes(cursor.take()?);
    if version == 0 || version > CURRENT_VERSION {
        return Err(CoreError::UnsupportedVersion(version));
    }

    let kdf_params = KdfParams {
        memory_cost: u32::from_le_bytes(cursor.take()?),
        time_cost: u32::from_le_bytes(cursor.take()?),
        parallelism: u32::from_le_bytes(cursor.take()?),
    };
    check_range("memory_cost", kdf_params.memory_cost, &MEMORY_COST_RANGE)?;
    check_range("time_cost", kdf_params.time_cost, &TIME_COST_RANGE)?;
    check_range("parallelism", kdf_params.parallelism, &PARALLELISM_RANGE)?;

    let salt = cursor.take::<SALT_LEN>()?;
    let nonce = cursor.take::<NONCE_LEN>()?;
    let ciphertext_len = u64::from_le_bytes(cursor.take()?);

    let remaining = data.len() - cursor.offset;
    let ciphertext_len = usize::try_from(ciphertext_len)
        .ok()
        .filter(|len| *len <= remaining)
        .ok_or_else(|| {
            CoreError::InvalidFileFormat(format!(
                "File truncated: expected {ciphertext_len} bytes of ciphertext, got {remaining}"
            ))
        })?;
    let ciphertext = data[cursor.offset..cursor.offset + ciphertext_len].to_vec();

    Ok(StoreFile {
        version,
        kdf_params,
        payload: SealedPayload {
            salt,
            nonce,
            ciphertext,
        },
    })
}

fn check_range(name: &str, value: u32, range: &std::ops::RangeInclusive<u32>) -> Result<(), CoreError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(CoreError::InvalidFileFormat(format!(
            "KDF {name} out of safe range: {value} (expected {}..{})",
            range.start(),
            range.end()
        )))
    }
}

struct Cursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl Cursor<'_> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N], CoreError> {
        let bytes: [u8; N] = self
            .data
            .get(self.offset..self.offset + N)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| CoreError::InvalidFileFormat("Unexpected end of header".into()))?;
        self.offset += N;
        Ok(bytes)
    }
}
