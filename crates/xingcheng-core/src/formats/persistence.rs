//! Save blob persistence formats.
//!
//! Canonical layout: `MAGIC (4 bytes) | VERSION (1 byte) | postcard payload`.
//! Postcard encodes struct fields in declaration order, so identical
//! profiles always produce identical bytes.

use crate::CoreError;
use crate::profile::UserProfile;

/// Header magic of a canonical export.
pub const MAGIC: [u8; 4] = *b"XCSV";

/// Current canonical format version.
pub const FORMAT_VERSION: u8 = 1;

const HEADER_LEN: usize = MAGIC.len() + 1;

/// Encode a profile in the canonical binary format.
pub fn encode_canonical(profile: &UserProfile) -> Result<Vec<u8>, CoreError> {
    let payload = postcard::to_stdvec(profile)?;
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    out.extend_from_slice(&MAGIC);
    out.push(FORMAT_VERSION);
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Decode a canonical export, checking magic and version.
pub fn decode_canonical(bytes: &[u8]) -> Result<UserProfile, CoreError> {
    let (header, payload) = bytes
        .split_at_checked(HEADER_LEN)
        .ok_or(CoreError::InvalidHeader)?;
    if header[..MAGIC.len()] != MAGIC {
        return Err(CoreError::InvalidHeader);
    }
    let version = header[MAGIC.len()];
    if version != FORMAT_VERSION {
        return Err(CoreError::UnsupportedVersion(version));
    }
    Ok(postcard::from_bytes(payload)?)
}

/// Encode a profile as the JSON save blob.
pub fn encode_json(profile: &UserProfile) -> Result<String, CoreError> {
    Ok(serde_json::to_string_pretty(profile)?)
}

/// Decode a JSON save blob.
pub fn decode_json(text: &str) -> Result<UserProfile, CoreError> {
    Ok(serde_json::from_str(text)?)
}

/// Whether bytes look like a canonical export.
#[must_use]
pub fn is_canonical(bytes: &[u8]) -> bool {
    bytes.starts_with(&MAGIC)
}

/// Decode either format, sniffing the header.
pub fn decode_any(bytes: &[u8]) -> Result<UserProfile, CoreError> {
    if is_canonical(bytes) {
        decode_canonical(bytes)
    } else {
        Ok(serde_json::from_slice(bytes)?)
    }
}

// =============================================================================
// TESTS
// =============================================================================
