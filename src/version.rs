// Version information for the EtherChat core

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-lifecycle-core-2026-08-08";

/// Semantic version number
pub const VERSION_NUMBER: &str = "0.1.0";

/// Build date
pub const BUILD_DATE: &str = "2026-08-08";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "secp256k1-identity",
    "ecdh-shared-secrets",
    "xchacha20-poly1305",
    "legacy-tx-pipeline",
    "serialized-nonces",
    "lifecycle-events",
    "read-only-queries",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("EtherChat Core {} ({})", VERSION_NUMBER, BUILD_DATE)
}
