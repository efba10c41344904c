//! chromium-login-import - import saved browser logins into a password manager
//!
//! This crate reads the `Login Data` store of a Chromium-based browser profile,
//! unwraps each stored password with the platform key store, and hands every
//! credential to a host-provided [`host::PasswordDatabase`].

pub mod chromium_time;
pub mod config;
pub mod error;
pub mod host;
pub mod importer;
pub mod logging;
pub mod oscrypt;
pub mod profile;
pub mod store;

pub use config::{ImportParameter, ImportRequest};
pub use error::{ErrorKind, ImportError, Result};
pub use host::{EntryInfo, LogStatusLogger, PasswordDatabase, StatusLogger};
pub use importer::{BrowserImporter, ChromiumImporter};
pub use oscrypt::{OsCrypt, SecretUnwrap};
pub use profile::ChromiumBrowser;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
