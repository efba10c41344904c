//! Import of saved logins from a Chromium profile.

use std::path::{Path, PathBuf};

use crate::chromium_time;
use crate::config::ImportRequest;
use crate::error::{ImportError, Result};
use crate::host::EntryInfo;
use crate::oscrypt::{OsCrypt, SecretUnwrap};
use crate::profile::{self, ChromiumBrowser};
use crate::store::{LoginStore, LOGIN_DATA_FILE};

/// Operations a host needs from a browser importer.
pub trait BrowserImporter {
    fn supports_profiles(&self) -> bool;

    fn uses_master_password(&self) -> bool;

    fn profile_path(&self, profile: &str) -> PathBuf;

    fn profiles(&self) -> Result<Vec<String>>;

    fn import_credentials(&self, request: &mut dyn ImportRequest) -> Result<usize>;
}

/// Importer for any browser that keeps its logins in a Chromium `Login Data` store.
pub struct ChromiumImporter<U> {
    profile_root: PathBuf,
    unwrap: U,
}

impl ChromiumImporter<OsCrypt> {
    /// Importer for `browser`'s default profile root, using the platform key store.
    pub fn for_browser(browser: ChromiumBrowser) -> Result<Self> {
        let profile_root = profile::user_data_dir(browser)?;
        let unwrap = OsCrypt::for_browser(browser, &profile_root)?;
        Ok(Self::new(profile_root, unwrap))
    }
}

impl<U: SecretUnwrap> ChromiumImporter<U> {
    pub fn new(profile_root: impl Into<PathBuf>, unwrap: U) -> Self {
        Self {
            profile_root: profile_root.into(),
            unwrap,
        }
    }

    pub fn profile_root(&self) -> &Path {
        &self.profile_root
    }

    /// Read every login from the resolved profile and hand it to the host.
    ///
    /// Returns the number of entries passed to `create_website_entry`.
    pub fn import_credentials(&self, request: &mut dyn ImportRequest) -> Result<usize> {
        let profile_dir = profile::resolve_profile_dir(
            &self.profile_root,
            request.custom_profile_path(),
            request.profile(),
        );
        if !profile_dir.is_dir() {
            return Err(ImportError::ProfileNotFound(profile_dir));
        }

        let login_data_path = profile_dir.join(LOGIN_DATA_FILE);
        if !login_data_path.is_file() {
            return Err(ImportError::ProfileNotFound(login_data_path));
        }

        log::debug!("Reading logins from {:?}", login_data_path);
        let rows = {
            let store = LoginStore::open(&login_data_path).map_err(ImportError::data_access)?;
            store.read_logins().map_err(ImportError::data_access)?
        };
        log::debug!("Found {} stored logins", rows.len());

        let mut imported = 0;
        for row in rows {
            let row = row.into_login_row()?;
            let date = chromium_time::to_datetime(row.date_created)?;
            let password = String::from_utf8(self.unwrap.decrypt(&row.encrypted_password)?)?;

            let entry = EntryInfo {
                hostname: row.origin_url,
                username: row.username,
                password,
                created: date,
                modified: date,
            };

            request
                .create_website_entry(entry)
                .map_err(ImportError::EntryCreation)?;
            imported += 1;
        }

        Ok(imported)
    }
}

impl<U: SecretUnwrap> BrowserImporter for ChromiumImporter<U> {
    fn supports_profiles(&self) -> bool {
        true
    }

    fn uses_master_password(&self) -> bool {
        false
    }

    fn profile_path(&self, profile: &str) -> PathBuf {
        self.profile_root.join(profile)
    }

    fn profiles(&self) -> Result<Vec<String>> {
        profile::list_profiles(&self.profile_root)
    }

    fn import_credentials(&self, request: &mut dyn ImportRequest) -> Result<usize> {
        ChromiumImporter::import_credentials(self, request)
    }
}

#[cfg(test)]
mod tests {
    use super::{BrowserImporter, ChromiumImporter};
    use crate::error::Result;
    use crate::oscrypt::SecretUnwrap;
    use std::path::Path;

    struct Identity;

    impl SecretUnwrap for Identity {
        fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
            Ok(data.to_vec())
        }
    }

    #[test]
    fn profile_path_joins_under_root() {
        let importer = ChromiumImporter::new("/browser/User Data", Identity);
        assert_eq!(
            importer.profile_path("Profile 3"),
            Path::new("/browser/User Data/Profile 3")
        );
        assert_eq!(importer.profile_root(), Path::new("/browser/User Data"));
    }

    #[test]
    fn chromium_importer_capabilities() {
        let importer = ChromiumImporter::new("/browser/User Data", Identity);
        assert!(importer.supports_profiles());
        assert!(!importer.uses_master_password());
    }
}
