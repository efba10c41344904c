use super::{SecretUnwrap, V10_PREFIX};
use crate::error::{ImportError, Result};
use crate::profile::ChromiumBrowser;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::Aes256Gcm;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use winapi::um::dpapi::CryptUnprotectData;
use winapi::um::winbase::LocalFree;
use winapi::um::wincrypt::DATA_BLOB;

const LOCAL_STATE_FILE: &str = "Local State";
const DPAPI_KEY_PREFIX: &[u8] = b"DPAPI";
const AES_GCM_NONCE_LEN: usize = 12;
const AES_GCM_TAG_LEN: usize = 16;

#[derive(Deserialize)]
struct LocalState {
    os_crypt: Option<LocalStateOsCrypt>,
}

#[derive(Deserialize)]
struct LocalStateOsCrypt {
    encrypted_key: Option<String>,
}

/// Windows implementation of Chromium's `os_crypt`.
///
/// `v10` data is AES-256-GCM with the key from `Local State`. Anything else is a
/// raw DPAPI blob written by older browser versions.
pub struct OsCrypt {
    v10_key: Option<Vec<u8>>,
}

impl OsCrypt {
    pub fn for_browser(_browser: ChromiumBrowser, user_data_dir: &Path) -> Result<Self> {
        let v10_key = read_v10_key(&user_data_dir.join(LOCAL_STATE_FILE));
        Ok(Self { v10_key })
    }
}

impl SecretUnwrap for OsCrypt {
    fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        match data.strip_prefix(V10_PREFIX) {
            Some(ciphertext) => {
                let key = self.v10_key.as_ref().ok_or_else(|| {
                    ImportError::Decrypt("No key found in Local State".to_string())
                })?;
                decrypt_aes_gcm(ciphertext, key)
            }
            None => decrypt_dpapi(data),
        }
    }
}

fn read_v10_key(local_state_path: &Path) -> Option<Vec<u8>> {
    let data = fs::read_to_string(local_state_path)
        .map_err(|e| log::warn!("Failed to read {:?}: {}", local_state_path, e))
        .ok()?;
    let state: LocalState = serde_json::from_str(&data)
        .map_err(|e| log::warn!("Failed to parse {:?}: {}", local_state_path, e))
        .ok()?;
    let encrypted_key = state.os_crypt?.encrypted_key?;
    let encrypted_bytes = STANDARD.decode(encrypted_key).ok()?;
    let Some(wrapped) = encrypted_bytes.strip_prefix(DPAPI_KEY_PREFIX) else {
        log::warn!("Invalid DPAPI prefix in Local State");
        return None;
    };
    decrypt_dpapi(wrapped)
        .map_err(|e| log::warn!("Failed to unwrap Local State key: {}", e))
        .ok()
}

fn decrypt_aes_gcm(ciphertext: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    if ciphertext.len() < AES_GCM_NONCE_LEN + AES_GCM_TAG_LEN {
        return Err(ImportError::Decrypt(
            "Invalid AES-GCM ciphertext length".to_string(),
        ));
    }
    let (nonce_bytes, payload) = ciphertext.split_at(AES_GCM_NONCE_LEN);
    let nonce = aes_gcm::Nonce::from_slice(nonce_bytes);
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| ImportError::Decrypt(format!("Failed to create AES-GCM cipher: {}", e)))?;
    cipher
        .decrypt(nonce, payload)
        .map_err(|_| ImportError::Decrypt("AES-GCM authentication failed".to_string()))
}

fn decrypt_dpapi(ciphertext: &[u8]) -> Result<Vec<u8>> {
    unsafe {
        let mut in_blob = DATA_BLOB {
            cbData: ciphertext.len() as u32,
            pbData: ciphertext.as_ptr() as *mut u8,
        };
        let mut out_blob = DATA_BLOB {
            cbData: 0,
            pbData: std::ptr::null_mut(),
        };

        let result = CryptUnprotectData(
            &mut in_blob,
            std::ptr::null_mut(),
            std::ptr::null_mut(),
            std::ptr::null_mut(),
            std::ptr::null_mut(),
            0,
            &mut out_blob,
        );
        if result == 0 {
            return Err(ImportError::Decrypt(
                "CryptUnprotectData failed".to_string(),
            ));
        }

        let data = std::slice::from_raw_parts(out_blob.pbData, out_blob.cbData as usize).to_vec();
        LocalFree(out_blob.pbData as *mut _);
        Ok(data)
    }
}
