//! Unwrapping of passwords protected by Chromium's OS-level encryption.
//!
//! Chromium encrypts `password_value` with a per-user secret. Where that
//! secret lives depends on the platform:
//! - **Windows**: DPAPI, plus an AES-256-GCM key in `Local State` for `v10` data
//! - **Linux**: a fixed `v10` key, and a `v11` key from GNOME Keyring or KWallet
//! - **macOS**: a `v10` key derived from the Keychain "Safe Storage" password

use crate::error::Result;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
pub use linux::OsCrypt;
#[cfg(target_os = "macos")]
pub use macos::OsCrypt;
#[cfg(target_os = "windows")]
pub use windows::OsCrypt;

/// Reverses the browser's at-rest protection of a stored secret.
pub trait SecretUnwrap {
    fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>>;
}

impl<T: SecretUnwrap + ?Sized> SecretUnwrap for &T {
    fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        (**self).decrypt(data)
    }
}

impl<T: SecretUnwrap + ?Sized> SecretUnwrap for Box<T> {
    fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        (**self).decrypt(data)
    }
}

pub(crate) const V10_PREFIX: &[u8] = b"v10";

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
mod unsupported {
    use super::SecretUnwrap;
    use crate::error::{ImportError, Result};
    use crate::profile::ChromiumBrowser;
    use std::path::Path;

    /// Placeholder on platforms without a known Chromium key store.
    #[derive(Debug)]
    pub struct OsCrypt;

    impl OsCrypt {
        pub fn for_browser(_browser: ChromiumBrowser, _user_data_dir: &Path) -> Result<Self> {
            Ok(OsCrypt)
        }
    }

    impl SecretUnwrap for OsCrypt {
        fn decrypt(&self, _data: &[u8]) -> Result<Vec<u8>> {
            Err(ImportError::Unsupported(
                "Password decryption is only implemented for Windows, Linux, and macOS"
                    .to_string(),
            ))
        }
    }
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
pub use unsupported::OsCrypt;

#[cfg(any(target_os = "linux", target_os = "macos"))]
pub(crate) mod cbc_key {
    use crate::error::{ImportError, Result};
    use aes::Aes128;
    use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, KeyIvInit};
    use pbkdf2::pbkdf2_hmac;
    use sha1::Sha1;

    const KEY_DERIVE_SALT: &[u8] = b"saltysalt";
    pub(crate) const KEY_LENGTH: usize = 16;
    pub(crate) const AES_IV: &[u8; 16] = b"                ";

    pub(crate) type Key = [u8; KEY_LENGTH];

    /// PBKDF2-HMAC-SHA1 over the fixed Chromium salt.
    pub(crate) fn derive_key(password: &[u8], iterations: u32) -> Key {
        let mut key = [0u8; KEY_LENGTH];
        pbkdf2_hmac::<Sha1>(password, KEY_DERIVE_SALT, iterations, &mut key);
        key
    }

    pub(crate) fn decrypt_aes_cbc(ciphertext: &[u8], key: &Key) -> Result<Vec<u8>> {
        let mut buffer = ciphertext.to_vec();
        let decryptor = cbc::Decryptor::<Aes128>::new_from_slices(key, AES_IV)
            .map_err(|e| ImportError::Decrypt(format!("Failed to create AES decryptor: {}", e)))?;
        let plaintext = decryptor
            .decrypt_padded_mut::<Pkcs7>(&mut buffer)
            .map_err(|_| ImportError::Decrypt("AES-CBC padding check failed".to_string()))?;
        Ok(plaintext.to_vec())
    }

    /// Try each key in order. A result that is valid UTF-8 is preferred.
    pub(crate) fn decrypt_with_any(ciphertext: &[u8], keys: &[&Key]) -> Result<Vec<u8>> {
        let mut fallback = None;
        for key in keys {
            match decrypt_aes_cbc(ciphertext, key) {
                Ok(plaintext) if std::str::from_utf8(&plaintext).is_ok() => return Ok(plaintext),
                Ok(plaintext) => {
                    fallback.get_or_insert(plaintext);
                }
                Err(err) => log::debug!("Key rejected: {}", err),
            }
        }
        fallback.ok_or_else(|| ImportError::Decrypt("No key could decrypt the password".to_string()))
    }

    #[cfg(test)]
    pub(crate) fn encrypt_aes_cbc(plaintext: &[u8], key: &Key) -> Vec<u8> {
        use cbc::cipher::BlockEncryptMut;

        let padded_len = (plaintext.len() / 16 + 1) * 16;
        let mut buffer = vec![0u8; padded_len];
        buffer[..plaintext.len()].copy_from_slice(plaintext);
        cbc::Encryptor::<Aes128>::new_from_slices(key, AES_IV)
            .expect("cipher")
            .encrypt_padded_mut::<Pkcs7>(&mut buffer, plaintext.len())
            .expect("encrypt")
            .to_vec()
    }

    #[cfg(test)]
    mod tests {
        use super::{decrypt_aes_cbc, decrypt_with_any, derive_key, encrypt_aes_cbc};
        use crate::error::ImportError;

        #[test]
        fn derive_key_matches_chromium_v10_key() {
            let key = derive_key(b"peanuts", 1);
            let expected: [u8; 16] = [
                0xfd, 0x62, 0x1f, 0xe5, 0xa2, 0xb4, 0x02, 0x53, 0x9d, 0xfa, 0x14, 0x7c, 0xa9,
                0x27, 0x27, 0x78,
            ];
            assert_eq!(key, expected);
        }

        #[test]
        fn derive_key_matches_empty_password_key() {
            let key = derive_key(b"", 1);
            let expected: [u8; 16] = [
                0xd0, 0xd0, 0xec, 0x9c, 0x7d, 0x77, 0xd4, 0x3a, 0xc5, 0x41, 0x87, 0xfa, 0x48,
                0x18, 0xd1, 0x7f,
            ];
            assert_eq!(key, expected);
        }

        #[test]
        fn iterations_change_the_key() {
            assert_ne!(derive_key(b"hunter2", 1), derive_key(b"hunter2", 1003));
        }

        #[test]
        fn decrypts_with_matching_key() {
            let key = derive_key(b"peanuts", 1);
            let ciphertext = encrypt_aes_cbc(b"correct horse", &key);
            assert_eq!(decrypt_aes_cbc(&ciphertext, &key).expect("plain"), b"correct horse");
        }

        #[test]
        fn falls_back_to_second_key() {
            let wrong = derive_key(b"wrong", 1);
            let right = derive_key(b"", 1);
            let ciphertext = encrypt_aes_cbc(b"secret", &right);
            let plaintext = decrypt_with_any(&ciphertext, &[&wrong, &right]).expect("plain");
            assert_eq!(plaintext, b"secret");
        }

        #[test]
        fn truncated_ciphertext_is_rejected() {
            let key = derive_key(b"peanuts", 1);
            let err = decrypt_with_any(&[1, 2, 3], &[&key]).expect_err("bad block");
            assert!(matches!(err, ImportError::Decrypt(_)));
        }
    }
}
