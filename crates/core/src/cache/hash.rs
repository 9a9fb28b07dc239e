//! Deterministic result id derivation.

use sha2::{Digest, Sha256};

/// Namespace tag prepended to every result id.
pub const ID_PREFIX: &str = "fs_";

/// Number of hex characters kept from the digest.
pub const ID_HEX_LEN: usize = 16;

/// Compute the stable id for a search result.
///
/// The same (url, position, query) triple yields the same id in every process,
/// so repeated searches overwrite entries instead of fragmenting the cache.
/// Each field is length-prefixed, so separators inside a url or query cannot
/// make two distinct triples hash alike.
pub fn compute_result_id(url: &str, position: u32, query: &str) -> String {
    let mut hasher = Sha256::new();
    update_field(&mut hasher, url.as_bytes());
    update_field(&mut hasher, position.to_string().as_bytes());
    update_field(&mut hasher, query.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("{ID_PREFIX}{}", &digest[..ID_HEX_LEN])
}

fn update_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}
