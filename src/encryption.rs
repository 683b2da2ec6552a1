use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose, Engine as _};
use rand::RngCore;
use std::env;

use crate::errors::AppError;

/// Bundled application key used when ENCRYPTION_KEY is not set.
///
/// The local preference store is not a security boundary: this key ships with
/// the client and only keeps ids and tokens out of casual plaintext
/// inspection.
const BUNDLED_APP_KEY: &str = "subadmin-dashboard-prefs-v1";

/// Expand a key string to 32 bytes for AES-256.
fn expand_key(source: &str) -> [u8; 32] {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    source.hash(&mut hasher);
    let hash = hasher.finish();

    let mut key = [0u8; 32];
    key[..8].copy_from_slice(&hash.to_le_bytes());
    for (i, &b) in source.as_bytes().iter().take(24).enumerate() {
        key[8 + i] = b;
    }
    key
}

fn encryption_key() -> [u8; 32] {
    match env::var("ENCRYPTION_KEY") {
        Ok(key_str) if !key_str.is_empty() => expand_key(&key_str),
        _ => expand_key(BUNDLED_APP_KEY),
    }
}

/// Encrypt plaintext with AES-256-GCM; output is base64(nonce || ciphertext).
pub fn encrypt(plaintext: &str) -> Result<String, AppError> {
    let key = encryption_key();
    let cipher = Aes256Gcm::new_from_slice(&key)
        .map_err(|e| AppError::Crypto(format!("Failed to initialize cipher: {}", e)))?;

    let mut nonce_bytes = [0u8; 12];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|e| AppError::Crypto(format!("Encryption failed: {}", e)))?;

    let mut combined = nonce_bytes.to_vec();
    combined.extend_from_slice(&ciphertext);

    Ok(general_purpose::STANDARD.encode(&combined))
}

/// Decrypt a value produced by [`encrypt`].
///
/// Callers that persist values (the preference store) treat any failure here
/// as "absent" rather than propagating it.
pub fn decrypt(ciphertext_b64: &str) -> Result<String, AppError> {
    let key = encryption_key();
    let cipher = Aes256Gcm::new_from_slice(&key)
        .map_err(|e| AppError::Crypto(format!("Failed to initialize cipher: {}", e)))?;

    let combined = general_purpose::STANDARD
        .decode(ciphertext_b64)
        .map_err(|e| AppError::Crypto(format!("Invalid base64: {}", e)))?;

    if combined.len() < 12 {
        return Err(AppError::Crypto("Invalid ciphertext format".to_string()));
    }

    let nonce = Nonce::from_slice(&combined[..12]);
    let ciphertext = &combined[12..];

    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|e| AppError::Crypto(format!("Decryption failed: {}", e)))?;

    String::from_utf8(plaintext)
        .map_err(|e| AppError::Crypto(format!("Invalid UTF-8 in decrypted data: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let original = "redemption-id-4821";
        let encrypted = encrypt(original).unwrap();
        let decrypted = decrypt(&encrypted).unwrap();
        assert_eq!(original, decrypted);
    }

    #[test]
    fn nonce_makes_ciphertexts_distinct() {
        let a = encrypt("hello").unwrap();
        let b = encrypt("hello").unwrap();
        assert_ne!(a, b);

        assert_eq!(decrypt(&a).unwrap(), "hello");
        assert_eq!(decrypt(&b).unwrap(), "hello");
    }

    #[test]
    fn garbage_input_is_an_error_not_a_panic() {
        assert!(decrypt("not base64 at all!!!").is_err());
        assert!(decrypt("YWJj").is_err()); // valid base64, too short
    }
}
