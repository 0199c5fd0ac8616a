//! Fingerprinting of rendered case files.
//!
//! Uses FNV-1a for a fast, deterministic content hash. The fingerprint is
//! not cryptographically secure; it identifies whether two renderings of a
//! case are byte-identical.

use crate::render::RenderedFile;

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

#[inline]
fn fnv1a_bytes(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash = (hash ^ b as u64).wrapping_mul(FNV_PRIME);
    }
    hash
}

#[inline]
fn fnv1a_u64(hash: u64, v: u64) -> u64 {
    fnv1a_bytes(hash, &v.to_le_bytes())
}

/// Hash the relative path and contents of every file, in order.
///
/// Lengths are folded in before each path and body so that moving bytes
/// from one file to the next changes the hash.
pub fn fingerprint(files: &[RenderedFile]) -> u64 {
    let mut hash = FNV_OFFSET;
    hash = fnv1a_u64(hash, files.len() as u64);
    for file in files {
        let path = file.path.to_string_lossy();
        hash = fnv1a_u64(hash, path.len() as u64);
        hash = fnv1a_bytes(hash, path.as_bytes());
        hash = fnv1a_u64(hash, file.contents.len() as u64);
        hash = fnv1a_bytes(hash, file.contents.as_bytes());
    }
    hash
}
