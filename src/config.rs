//! Import request configuration

use crate::host::{EntryInfo, HostError, PasswordDatabase, StatusLogger};

/// Everything the host supplies for one import call.
pub struct ImportParameter<'a, D: PasswordDatabase> {
    /// Profile directory to read instead of the importer's profile root.
    pub custom_profile_path: Option<String>,
    /// Profile name under the importer's profile root, e.g. `Default`.
    pub profile: Option<String>,
    pub group: &'a D::Group,
    pub creation_settings: &'a D::CreationSettings,
    pub logger: &'a dyn StatusLogger,
    pub database: &'a mut D,
}

impl<'a, D: PasswordDatabase> ImportParameter<'a, D> {
    /// Import from the default profile root.
    pub fn new(
        database: &'a mut D,
        group: &'a D::Group,
        creation_settings: &'a D::CreationSettings,
        logger: &'a dyn StatusLogger,
    ) -> Self {
        Self {
            custom_profile_path: None,
            profile: None,
            group,
            creation_settings,
            logger,
            database,
        }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn with_custom_profile_path(mut self, path: impl Into<String>) -> Self {
        self.custom_profile_path = Some(path.into());
        self
    }
}

/// Object-safe view of an import request, so importers can be driven as
/// `dyn BrowserImporter`.
pub trait ImportRequest {
    fn custom_profile_path(&self) -> Option<&str>;

    fn profile(&self) -> Option<&str>;

    /// Hand one entry to the host's database, with the request's group,
    /// creation settings and logger.
    fn create_website_entry(&mut self, entry: EntryInfo) -> Result<(), HostError>;
}

impl<D: PasswordDatabase> ImportRequest for ImportParameter<'_, D> {
    fn custom_profile_path(&self) -> Option<&str> {
        self.custom_profile_path.as_deref()
    }

    fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    fn create_website_entry(&mut self, entry: EntryInfo) -> Result<(), HostError> {
        self.database
            .create_website_entry(self.group, entry, self.creation_settings, self.logger)
    }
}
