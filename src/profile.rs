//! Browser profile directories.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{ImportError, Result};
use crate::store::LOGIN_DATA_FILE;

/// Chromium-based browsers with a known default profile location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromiumBrowser {
    Chrome,
    Chromium,
    Edge,
    Brave,
    Opera,
    Vivaldi,
    Whale,
}

impl FromStr for ChromiumBrowser {
    type Err = ImportError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chrome" => Ok(ChromiumBrowser::Chrome),
            "chromium" => Ok(ChromiumBrowser::Chromium),
            "edge" => Ok(ChromiumBrowser::Edge),
            "brave" => Ok(ChromiumBrowser::Brave),
            "opera" => Ok(ChromiumBrowser::Opera),
            "vivaldi" => Ok(ChromiumBrowser::Vivaldi),
            "whale" => Ok(ChromiumBrowser::Whale),
            _ => Err(ImportError::Config(format!("Unsupported browser: {}", s))),
        }
    }
}

impl fmt::Display for ChromiumBrowser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChromiumBrowser::Chrome => "Chrome",
            ChromiumBrowser::Chromium => "Chromium",
            ChromiumBrowser::Edge => "Edge",
            ChromiumBrowser::Brave => "Brave",
            ChromiumBrowser::Opera => "Opera",
            ChromiumBrowser::Vivaldi => "Vivaldi",
            ChromiumBrowser::Whale => "Whale",
        };
        write!(f, "{}", name)
    }
}

/// Default user data directory of `browser` on this platform.
#[cfg(target_os = "linux")]
pub fn user_data_dir(browser: ChromiumBrowser) -> Result<PathBuf> {
    let config_home = dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .ok_or_else(|| ImportError::Config("Cannot determine config directory".to_string()))?;
    let relative_dir = match browser {
        ChromiumBrowser::Chrome => "google-chrome",
        ChromiumBrowser::Chromium => "chromium",
        ChromiumBrowser::Edge => "microsoft-edge",
        ChromiumBrowser::Brave => "BraveSoftware/Brave-Browser",
        ChromiumBrowser::Opera => "opera",
        ChromiumBrowser::Vivaldi => "vivaldi",
        ChromiumBrowser::Whale => "naver-whale",
    };
    Ok(config_home.join(relative_dir))
}

/// Default user data directory of `browser` on this platform.
#[cfg(target_os = "macos")]
pub fn user_data_dir(browser: ChromiumBrowser) -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ImportError::Config("Cannot determine home directory".to_string()))?;
    let relative_dir = match browser {
        ChromiumBrowser::Chrome => "Google/Chrome",
        ChromiumBrowser::Chromium => "Chromium",
        ChromiumBrowser::Edge => "Microsoft Edge",
        ChromiumBrowser::Brave => "BraveSoftware/Brave-Browser",
        ChromiumBrowser::Opera => "com.operasoftware.Opera",
        ChromiumBrowser::Vivaldi => "Vivaldi",
        ChromiumBrowser::Whale => "Naver/Whale",
    };
    Ok(home.join("Library/Application Support").join(relative_dir))
}

/// Default user data directory of `browser` on this platform.
#[cfg(target_os = "windows")]
pub fn user_data_dir(browser: ChromiumBrowser) -> Result<PathBuf> {
    let home = dirs::home_dir();
    let local_root = std::env::var_os("LOCALAPPDATA")
        .map(PathBuf::from)
        .or_else(|| home.as_ref().map(|home| home.join("AppData/Local")))
        .ok_or_else(|| ImportError::Config("Cannot determine LOCALAPPDATA".to_string()))?;

    let relative_dir = match browser {
        ChromiumBrowser::Chrome => "Google/Chrome/User Data",
        ChromiumBrowser::Chromium => "Chromium/User Data",
        ChromiumBrowser::Edge => "Microsoft/Edge/User Data",
        ChromiumBrowser::Brave => "BraveSoftware/Brave-Browser/User Data",
        ChromiumBrowser::Vivaldi => "Vivaldi/User Data",
        ChromiumBrowser::Whale => "Naver/Naver Whale/User Data",
        ChromiumBrowser::Opera => {
            let roaming_root = std::env::var_os("APPDATA")
                .map(PathBuf::from)
                .or_else(|| home.as_ref().map(|home| home.join("AppData/Roaming")))
                .ok_or_else(|| ImportError::Config("Cannot determine APPDATA".to_string()))?;
            return Ok(roaming_root.join("Opera Software/Opera Stable"));
        }
    };
    Ok(local_root.join(relative_dir))
}

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
pub fn user_data_dir(browser: ChromiumBrowser) -> Result<PathBuf> {
    Err(ImportError::Unsupported(format!(
        "No known {} profile location on this platform",
        browser
    )))
}

/// Pick the directory to import from.
///
/// A non-empty custom path wins over a named profile, which wins over the root.
pub fn resolve_profile_dir(root: &Path, custom: Option<&str>, profile: Option<&str>) -> PathBuf {
    match (non_empty(custom), non_empty(profile)) {
        (Some(custom), _) => PathBuf::from(custom),
        (None, Some(profile)) => root.join(profile),
        (None, None) => root.to_path_buf(),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

/// Names of the profile directories under `root` that hold a login store.
pub fn list_profiles(root: &Path) -> Result<Vec<String>> {
    let mut profiles = Vec::new();
    for entry in fs::read_dir(root)? {
        let path = entry?.path();
        if !path.is_dir() || !path.join(LOGIN_DATA_FILE).is_file() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
            profiles.push(name.to_string());
        }
    }
    profiles.sort();
    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use super::{list_profiles, resolve_profile_dir, ChromiumBrowser};
    use crate::error::ImportError;
    use crate::store::LOGIN_DATA_FILE;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::tempdir;

    #[test]
    fn custom_path_wins_over_profile() {
        let root = Path::new("/browser/root");
        let resolved = resolve_profile_dir(root, Some("/elsewhere"), Some("Default"));
        assert_eq!(resolved, PathBuf::from("/elsewhere"));
    }

    #[test]
    fn named_profile_is_joined_under_root() {
        let root = Path::new("/browser/root");
        let resolved = resolve_profile_dir(root, None, Some("Profile 1"));
        assert_eq!(resolved, root.join("Profile 1"));
    }

    #[test]
    fn empty_values_fall_back_to_root() {
        let root = Path::new("/browser/root");
        assert_eq!(resolve_profile_dir(root, None, None), root);
        assert_eq!(resolve_profile_dir(root, Some(""), Some("")), root);
        assert_eq!(
            resolve_profile_dir(root, Some(""), Some("Default")),
            root.join("Default")
        );
    }

    #[test]
    fn list_profiles_only_reports_dirs_with_login_data() {
        let root = tempdir().expect("tempdir");
        for name in ["Profile 2", "Default", "System Profile"] {
            fs::create_dir(root.path().join(name)).expect("profile dir");
        }
        fs::write(root.path().join("Default").join(LOGIN_DATA_FILE), b"").expect("login data");
        fs::write(root.path().join("Profile 2").join(LOGIN_DATA_FILE), b"").expect("login data");
        fs::write(root.path().join(LOGIN_DATA_FILE), b"").expect("stray file");

        let profiles = list_profiles(root.path()).expect("profiles");
        assert_eq!(profiles, vec!["Default".to_string(), "Profile 2".to_string()]);
    }

    #[test]
    fn list_profiles_fails_for_missing_root() {
        let root = tempdir().expect("tempdir");
        let err = list_profiles(&root.path().join("missing")).expect_err("missing root");
        assert!(matches!(err, ImportError::Io(_)));
    }

    #[test]
    fn browser_names_parse_case_insensitively() {
        assert_eq!("Chrome".parse::<ChromiumBrowser>().ok(), Some(ChromiumBrowser::Chrome));
        assert_eq!("EDGE".parse::<ChromiumBrowser>().ok(), Some(ChromiumBrowser::Edge));
        let err = "firefox".parse::<ChromiumBrowser>().expect_err("not chromium");
        assert!(matches!(err, ImportError::Config(_)));
        assert_eq!(ChromiumBrowser::Vivaldi.to_string(), "Vivaldi");
    }
}
