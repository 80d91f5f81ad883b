//! Content hashing with blake3.
//!
//! ```ignore
//! let key = hash::hex(&bytes);               // 64 hex chars
//! let fp = hash::fingerprint(&bytes);        // "a1b2c3d4"
//! ```

/// Full blake3 digest as lowercase hex.
pub fn hex<T: AsRef<[u8]> + ?Sized>(data: &T) -> String {
    hex::encode(blake3::hash(data.as_ref()).as_bytes())
}

/// First 8 hex chars of the digest, for cache-busting file names
/// (e.g. `styles.min.a1b2c3d4.css`).
pub fn fingerprint<T: AsRef<[u8]> + ?Sized>(data: &T) -> String {
    hex(data)[..8].to_string()
}

/// Digest of several parts, each length-prefixed so boundaries are unambiguous.
pub fn hex_parts(parts: &[&[u8]]) -> String {
    let mut hasher = blake3::Hasher::new();
    for part in parts {
        hasher.update(&(part.len() as u64).to_le_bytes());
        hasher.update(part);
    }
    hex::encode(hasher.finalize().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_stable() {
        let a = fingerprint("body { color: red; }");
        assert_eq!(a.len(), 8);
        assert_eq!(a, fingerprint("body { color: red; }"));
        assert_ne!(a, fingerprint("body { color: blue; }"));
    }

    #[test]
    fn test_hex_parts_boundaries() {
        assert_ne!(hex_parts(&[b"ab", b"c"]), hex_parts(&[b"a", b"bc"]));
        assert_eq!(hex_parts(&[b"ab", b"c"]).len(), 64);
    }
}
