//! Capabilities the password-manager host provides to an import.
//!
//! The importer only depends on these traits. The host keeps ownership of its
//! database, groups and settings and decides what an entry becomes once it is
//! handed over.

use time::OffsetDateTime;

/// Error type returned by host callbacks.
pub type HostError = Box<dyn std::error::Error + Send + Sync>;

/// A credential read from the browser, ready to be turned into a host entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub hostname: String,
    pub username: String,
    pub password: String,
    pub created: OffsetDateTime,
    pub modified: OffsetDateTime,
}

/// Status sink supplied by the host. Passed through to entry creation untouched.
pub trait StatusLogger {
    fn set_text(&self, text: &str);
}

/// Destination database that knows how to persist website entries.
pub trait PasswordDatabase {
    type Group;
    type CreationSettings;

    /// Create one entry in `group`. Duplicate handling is up to the host.
    fn create_website_entry(
        &mut self,
        group: &Self::Group,
        entry: EntryInfo,
        settings: &Self::CreationSettings,
        logger: &dyn StatusLogger,
    ) -> Result<(), HostError>;
}

/// `StatusLogger` that forwards status text to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogStatusLogger;

impl StatusLogger for LogStatusLogger {
    fn set_text(&self, text: &str) {
        log::info!("{}", text);
    }
}
