//! Username anonymization for player statistics.
//!
//! Usernames are the only player-identifying data the plugin sends. They are
//! replaced by a keyed BLAKE3 digest: stable for one server key, so the
//! dashboard can still count distinct players, but not reversible or
//! comparable across servers.

const KEY_CONTEXT: &str = "ServerDashboard 2021-04 player-statistics username";

#[derive(Clone)]
pub struct UsernameAnonymizer {
    key: [u8; 32],
}

impl UsernameAnonymizer {
    /// Derives the hashing key from a secret (the configured secret, or the
    /// server token when none is set).
    pub fn from_secret(secret: &str) -> Self {
        Self {
            key: blake3::derive_key(KEY_CONTEXT, secret.as_bytes()),
        }
    }

    /// Hex-encoded keyed digest of `username`.
    pub fn anonymize(&self, username: &str) -> String {
        blake3::keyed_hash(&self.key, username.as_bytes())
            .to_hex()
            .to_string()
    }
}

impl std::fmt::Debug for UsernameAnonymizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsernameAnonymizer").finish_non_exhaustive()
    }
}
