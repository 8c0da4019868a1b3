//! Application identity used to locate the storage directory

use std::path::PathBuf;

/// Application identifier used to determine storage location
///
/// Storage follows the [XDG Base Directory Specification](https://specifications.freedesktop.org/basedir-spec/basedir-spec-latest.html)
/// on Linux and similar conventions on other platforms:
/// - Linux: `$XDG_CONFIG_HOME/<app>/store` or `~/.config/<app>/store`
/// - macOS: `~/Library/Application Support/<qualifier>.<org>.<app>/store`
/// - Windows: `%LOCALAPPDATA%\<org>\<app>\config\store`
///
/// # Example
///
/// ```
/// use storefront_store::AppName;
///
/// let app_name = AppName::new("com", "lenscraft", "camera_shop");
/// assert_eq!(app_name.application, "camera_shop");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppName {
    pub qualifier: String,
    pub organization: String,
    pub application: String,
}

impl AppName {
    /// Create a new application name
    ///
    /// # Arguments
    ///
    /// * `qualifier` - Typically a reverse domain name (e.g., "com", "org")
    /// * `organization` - Your organization or username (e.g., "lenscraft")
    /// * `application` - The application name (e.g., "camera_shop")
    pub fn new(
        qualifier: impl Into<String>,
        organization: impl Into<String>,
        application: impl Into<String>,
    ) -> Self {
        Self {
            qualifier: qualifier.into(),
            organization: organization.into(),
            application: application.into(),
        }
    }

    /// The directory holding this application's store files
    ///
    /// Falls back to `./store` when no home directory can be determined.
    pub fn storage_dir(&self) -> PathBuf {
        directories::ProjectDirs::from(&self.qualifier, &self.organization, &self.application)
            .map(|dirs| dirs.config_local_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
            .join("store")
    }
}
