use super::cbc_key::{decrypt_with_any, derive_key, Key};
use super::{SecretUnwrap, V10_PREFIX};
use crate::error::{ImportError, Result};
use crate::profile::ChromiumBrowser;
use security_framework::passwords::get_generic_password;
use std::path::Path;

const KEY_DERIVE_ITERATIONS: u32 = 1003;

/// macOS implementation of Chromium's `os_crypt`, keyed from the Keychain.
pub struct OsCrypt {
    key: Option<Key>,
}

impl OsCrypt {
    pub fn for_browser(browser: ChromiumBrowser, _user_data_dir: &Path) -> Result<Self> {
        let account = keychain_account(browser);
        let service = format!("{} Safe Storage", account);
        let key = match get_generic_password(&service, account) {
            Ok(password) => Some(derive_key(&password, KEY_DERIVE_ITERATIONS)),
            Err(err) => {
                log::warn!("Failed to read keychain password for {}: {}", account, err);
                None
            }
        };
        Ok(Self { key })
    }
}

impl SecretUnwrap for OsCrypt {
    fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        match data.strip_prefix(V10_PREFIX) {
            Some(ciphertext) => {
                let key = self.key.as_ref().ok_or_else(|| {
                    ImportError::Decrypt("Keychain password is not available".to_string())
                })?;
                decrypt_with_any(ciphertext, &[key])
            }
            None => Ok(data.to_vec()),
        }
    }
}

fn keychain_account(browser: ChromiumBrowser) -> &'static str {
    match browser {
        ChromiumBrowser::Chrome => "Chrome",
        ChromiumBrowser::Chromium => "Chromium",
        ChromiumBrowser::Edge => "Microsoft Edge",
        ChromiumBrowser::Brave => "Brave",
        ChromiumBrowser::Opera => "Opera",
        ChromiumBrowser::Vivaldi => "Vivaldi",
        ChromiumBrowser::Whale => "Whale",
    }
}

#[cfg(test)]
mod tests {
    use super::OsCrypt;
    use crate::error::ImportError;
    use crate::oscrypt::cbc_key::{derive_key, encrypt_aes_cbc};
    use crate::oscrypt::SecretUnwrap;

    #[test]
    fn decrypts_v10_with_keychain_key() {
        let key = derive_key(b"keychain secret", 1003);
        let crypt = OsCrypt { key: Some(key) };
        let mut data = b"v10".to_vec();
        data.extend(encrypt_aes_cbc(b"secret", &key));
        assert_eq!(crypt.decrypt(&data).expect("plain"), b"secret");
    }

    #[test]
    fn v10_without_keychain_key_fails() {
        let crypt = OsCrypt { key: None };
        let err = crypt.decrypt(b"v10abcdefghijklmnop").expect_err("no key");
        assert!(matches!(err, ImportError::Decrypt(_)));
    }
}
