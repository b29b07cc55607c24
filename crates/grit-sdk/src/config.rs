use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};

/// Name of the config file inside `.git`.
pub const CONFIG_FILE: &str = "grit.toml";

/// Repository configuration, read from `.git/grit.toml`.
///
/// Every field is optional in the file; missing ones take their defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RepoConfig {
    pub user: UserConfig,
    pub core: CoreConfig,
}

/// Identity recorded as author and committer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UserConfig {
    pub name: String,
    pub email: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            name: "grit".into(),
            email: "grit@localhost".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    /// zlib level for loose objects, 0 (none) through 9 (best).
    pub compression_level: u32,
    /// Branch HEAD names in a freshly initialized repository.
    pub default_branch: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            compression_level: 6,
            default_branch: "main".into(),
        }
    }
}

impl RepoConfig {
    /// Parse a config from TOML text. `path` is only used in errors.
    pub fn from_toml(text: &str, path: &Path) -> SdkResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| SdkError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.validate(path)?;
        Ok(config)
    }

    /// Load the config at `path`, or the defaults if the file does not exist.
    pub fn load_or_default(path: &Path) -> SdkResult<Self> {
        match fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text, path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(SdkError::io(path, e)),
        }
    }

    /// Write the config as TOML.
    pub fn save(&self, path: &Path) -> SdkResult<()> {
        let text = toml::to_string_pretty(self).map_err(|e| SdkError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        fs::write(path, text).map_err(|e| SdkError::io(path, e))
    }

    fn validate(&self, path: &Path) -> SdkResult<()> {
        let invalid = |reason: String| SdkError::Config {
            path: path.to_path_buf(),
            reason,
        };
        if self.core.compression_level > 9 {
            return Err(invalid(format!(
                "core.compression_level must be 0-9, got {}",
                self.core.compression_level
            )));
        }
        grit_refs::validate_branch_name(&self.core.default_branch)
            .map_err(|e| invalid(format!("core.default_branch: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = RepoConfig::default();
        assert_eq!(c.user.name, "grit");
        assert_eq!(c.core.compression_level, 6);
        assert_eq!(c.core.default_branch, "main");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let c = RepoConfig::from_toml(
            "[user]\nname = \"Alice\"\nemail = \"alice@example.com\"\n",
            Path::new("grit.toml"),
        )
        .unwrap();
        assert_eq!(c.user.name, "Alice");
        assert_eq!(c.core, CoreConfig::default());
    }

    #[test]
    fn rejects_bad_values() {
        let path = Path::new("grit.toml");
        assert!(RepoConfig::from_toml("[core]\ncompression_level = 12\n", path).is_err());
        assert!(RepoConfig::from_toml("[core]\ndefault_branch = \"a..b\"\n", path).is_err());
        assert!(RepoConfig::from_toml("[core]\nbogus = 1\n", path).is_err());
        assert!(matches!(
            RepoConfig::from_toml("not toml", path),
            Err(SdkError::Config { .. })
        ));
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let c = RepoConfig::load_or_default(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(c, RepoConfig::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let mut c = RepoConfig::default();
        c.core.default_branch = "trunk".into();
        c.core.compression_level = 1;
        c.save(&path).unwrap();
        assert_eq!(RepoConfig::load_or_default(&path).unwrap(), c);
    }
}
