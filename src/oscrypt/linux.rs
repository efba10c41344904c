use super::cbc_key::{decrypt_with_any, derive_key, Key};
use super::{SecretUnwrap, V10_PREFIX};
use crate::error::{ImportError, Result};
use crate::profile::ChromiumBrowser;
use secret_service::blocking::SecretService;
use secret_service::EncryptionType;
use std::env;
use std::path::Path;
use std::process::Command;
use std::str::FromStr;

const V11_PREFIX: &[u8] = b"v11";
const V10_PASSWORD: &[u8] = b"peanuts";
const KEY_DERIVE_ITERATIONS: u32 = 1;

/// Password store Chromium used to hold its `v11` secret.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinuxKeyring {
    KWallet,
    KWallet5,
    KWallet6,
    GnomeKeyring,
    BasicText,
}

impl FromStr for LinuxKeyring {
    type Err = ImportError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "kwallet" => Ok(LinuxKeyring::KWallet),
            "kwallet5" => Ok(LinuxKeyring::KWallet5),
            "kwallet6" => Ok(LinuxKeyring::KWallet6),
            "gnome" | "gnomekeyring" => Ok(LinuxKeyring::GnomeKeyring),
            "basic" | "basictext" => Ok(LinuxKeyring::BasicText),
            _ => Err(ImportError::Config(format!("Unsupported keyring: {}", value))),
        }
    }
}

/// Linux implementation of Chromium's `os_crypt`.
pub struct OsCrypt {
    v10_key: Key,
    empty_key: Key,
    v11_key: Option<Key>,
}

impl OsCrypt {
    pub fn for_browser(browser: ChromiumBrowser, _user_data_dir: &Path) -> Result<Self> {
        Self::with_keyring(browser, None)
    }

    /// Build with an explicit keyring name instead of guessing from the desktop.
    pub fn with_keyring(browser: ChromiumBrowser, keyring: Option<&str>) -> Result<Self> {
        let keyring = match keyring {
            Some(name) => name.parse::<LinuxKeyring>()?,
            None => detect_keyring(),
        };
        let password = keyring_password(keyring_name(browser), keyring);
        Ok(Self {
            v10_key: derive_key(V10_PASSWORD, KEY_DERIVE_ITERATIONS),
            empty_key: derive_key(b"", KEY_DERIVE_ITERATIONS),
            v11_key: password.map(|password| derive_key(&password, KEY_DERIVE_ITERATIONS)),
        })
    }
}

impl SecretUnwrap for OsCrypt {
    fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        if let Some(ciphertext) = data.strip_prefix(V10_PREFIX) {
            decrypt_with_any(ciphertext, &[&self.v10_key, &self.empty_key])
        } else if let Some(ciphertext) = data.strip_prefix(V11_PREFIX) {
            let v11_key = self.v11_key.as_ref().ok_or_else(|| {
                ImportError::Decrypt("No keyring password available for v11 data".to_string())
            })?;
            decrypt_with_any(ciphertext, &[v11_key, &self.empty_key])
        } else {
            Ok(data.to_vec())
        }
    }
}

fn keyring_name(browser: ChromiumBrowser) -> &'static str {
    match browser {
        ChromiumBrowser::Chrome | ChromiumBrowser::Vivaldi => "Chrome",
        ChromiumBrowser::Brave => "Brave",
        ChromiumBrowser::Whale => "Whale",
        ChromiumBrowser::Chromium | ChromiumBrowser::Edge | ChromiumBrowser::Opera => "Chromium",
    }
}

fn detect_keyring() -> LinuxKeyring {
    let desktop = env::var("XDG_CURRENT_DESKTOP").unwrap_or_default();
    let session = env::var("DESKTOP_SESSION").unwrap_or_default();
    let kde_version = env::var("KDE_SESSION_VERSION").ok();
    keyring_for_desktop(&desktop, &session, kde_version.as_deref())
}

fn keyring_for_desktop(desktop: &str, session: &str, kde_version: Option<&str>) -> LinuxKeyring {
    let is_desktop = |names: &[&str]| desktop.split(':').any(|part| names.contains(&part.trim()));

    if is_desktop(&["KDE"]) || session.starts_with("kde") {
        return match kde_version {
            Some("6") => LinuxKeyring::KWallet6,
            Some("5") => LinuxKeyring::KWallet5,
            _ => LinuxKeyring::KWallet,
        };
    }
    if is_desktop(&[
        "GNOME",
        "Unity",
        "X-Cinnamon",
        "Deepin",
        "Pantheon",
        "XFCE",
        "UKUI",
    ]) || matches!(session, "gnome" | "mate" | "deepin" | "ukui")
        || session.contains("xfce")
    {
        return LinuxKeyring::GnomeKeyring;
    }
    LinuxKeyring::BasicText
}

fn keyring_password(browser_keyring_name: &str, keyring: LinuxKeyring) -> Option<Vec<u8>> {
    log::debug!("Reading {} Safe Storage from {:?}", browser_keyring_name, keyring);
    match keyring {
        LinuxKeyring::KWallet | LinuxKeyring::KWallet5 | LinuxKeyring::KWallet6 => {
            kwallet_password(browser_keyring_name, keyring)
        }
        LinuxKeyring::GnomeKeyring => gnome_keyring_password(browser_keyring_name),
        LinuxKeyring::BasicText => None,
    }
}

fn kwallet_password(browser_keyring_name: &str, keyring: LinuxKeyring) -> Option<Vec<u8>> {
    let output = Command::new("kwallet-query")
        .args([
            "--read-password",
            &format!("{} Safe Storage", browser_keyring_name),
            "--folder",
            &format!("{} Keys", browser_keyring_name),
            &kwallet_network_wallet(keyring),
        ])
        .output();

    let output = match output {
        Ok(output) if output.status.success() => output,
        Ok(output) => {
            log::warn!(
                "kwallet-query failed with status {}",
                output.status.code().unwrap_or(-1)
            );
            return None;
        }
        Err(err) => {
            log::warn!("kwallet-query command failed: {}", err);
            return None;
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    if stdout.to_lowercase().starts_with("failed to read") {
        log::warn!("No Safe Storage password in kwallet");
        return None;
    }
    Some(stdout.trim_end_matches('\n').as_bytes().to_vec())
}

fn kwallet_network_wallet(keyring: LinuxKeyring) -> String {
    const DEFAULT_WALLET: &str = "kdewallet";
    let (service_name, wallet_path) = match keyring {
        LinuxKeyring::KWallet => ("org.kde.kwalletd", "/modules/kwalletd"),
        LinuxKeyring::KWallet5 => ("org.kde.kwalletd5", "/modules/kwalletd5"),
        LinuxKeyring::KWallet6 => ("org.kde.kwalletd6", "/modules/kwalletd6"),
        _ => return DEFAULT_WALLET.to_string(),
    };

    let output = Command::new("dbus-send")
        .args([
            "--session",
            "--print-reply=literal",
            &format!("--dest={}", service_name),
            wallet_path,
            "org.kde.KWallet.networkWallet",
        ])
        .output();

    match output {
        Ok(output) if output.status.success() => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            parse_network_wallet(&stdout).unwrap_or_else(|| DEFAULT_WALLET.to_string())
        }
        Ok(_) | Err(_) => {
            log::warn!("Could not query the KWallet network wallet, using {}", DEFAULT_WALLET);
            DEFAULT_WALLET.to_string()
        }
    }
}

fn parse_network_wallet(reply: &str) -> Option<String> {
    let trimmed = reply.trim();
    let unquoted = trimmed
        .strip_prefix("string \"")
        .and_then(|rest| rest.strip_suffix('"'));
    match unquoted {
        Some(name) => Some(name.to_string()),
        None if !trimmed.is_empty() => Some(trimmed.to_string()),
        None => None,
    }
}

fn gnome_keyring_password(browser_keyring_name: &str) -> Option<Vec<u8>> {
    let service = SecretService::connect(EncryptionType::Dh)
        .map_err(|err| log::warn!("Failed to connect to secret service: {}", err))
        .ok()?;
    let collection = service
        .get_default_collection()
        .or_else(|_| service.get_any_collection())
        .map_err(|err| log::warn!("Failed to open keyring collection: {}", err))
        .ok()?;
    let items = collection
        .get_all_items()
        .map_err(|err| log::warn!("Failed to list keyring items: {}", err))
        .ok()?;

    let label = format!("{} Safe Storage", browser_keyring_name);
    let item = items
        .into_iter()
        .find(|item| item.get_label().map(|l| l == label).unwrap_or(false));
    let Some(item) = item else {
        log::warn!("{} not found in keyring", label);
        return None;
    };

    if item.is_locked().unwrap_or(false) {
        if let Err(err) = item.unlock() {
            log::warn!("Failed to unlock keyring item: {}", err);
        }
    }
    item.get_secret()
        .map_err(|err| log::warn!("Failed to read keyring secret: {}", err))
        .ok()
}
