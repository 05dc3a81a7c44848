use crate::content_hash::sha256_hex;

/// Opaque token handed to downstream consumers in place of a track filename:
/// hex SHA-256 of the track name followed by the secret salt.
pub fn stream_reference(track_name: &str, salt: &str) -> String {
    sha256_hex(&[track_name, salt])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_is_reproducible() {
        assert_eq!(
            stream_reference("Al Noor", "pepper"),
            "c034e25e7b9f96b52e1a45c7a1c39e0bb09faec6a344e0d6a836559bb2802132"
        );
        assert_eq!(
            stream_reference("Al Noor", "pepper"),
            stream_reference("Al Noor", "pepper")
        );
    }

    #[test]
    fn test_salt_changes_reference() {
        assert_ne!(
            stream_reference("Al Noor", "pepper"),
            stream_reference("Al Noor", "salt")
        );
        // Without a salt the reference is just the hash of the name
        assert_eq!(
            stream_reference("Al Noor", ""),
            "e6ea2f582facd463c9071a84bfd5471eaa194a3af6880e026759e69996fca043"
        );
    }
}
