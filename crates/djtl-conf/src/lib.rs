use std::fs;
use std::path::Path;

use config::Config;
use config::ConfigError as ExternalConfigError;
use config::File;
use config::FileFormat;
use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration build/deserialize error")]
    Config(#[from] ExternalConfigError),
    #[error("Failed to read pyproject.toml")]
    PyprojectIo(#[from] std::io::Error),
    #[error("Failed to parse pyproject.toml TOML")]
    PyprojectParse(#[from] toml::de::Error),
    #[error("Failed to serialize extracted pyproject data")]
    PyprojectSerialize(#[from] toml::ser::Error),
}

/// Engine settings shared by every template an engine compiles.
#[derive(Debug, Deserialize, Default, PartialEq, Clone)]
#[serde(default)]
pub struct Settings {
    /// Turn on debug logging in the command line tool.
    pub debug: bool,
    /// Emitted in place of a `{{ variable }}` that resolves to no value.
    pub string_if_invalid: String,
}

impl Settings {
    /// Load settings for a project, layering (lowest priority first) the user
    /// config file, `[tool.djtl]` in `pyproject.toml`, `.djtl.toml` and
    /// `djtl.toml`.
    pub fn new(project_root: &Path) -> Result<Self, ConfigError> {
        let user_config_file = ProjectDirs::from("com.github", "djtl", "djtl")
            .map(|proj_dirs| proj_dirs.config_dir().join("djtl.toml"));

        Self::load_from_paths(project_root, user_config_file.as_deref())
    }

    fn load_from_paths(
        project_root: &Path,
        user_config_path: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = user_config_path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }

        let pyproject_path = project_root.join("pyproject.toml");
        if pyproject_path.exists() {
            let content = fs::read_to_string(&pyproject_path)?;
            let full_toml_value: toml::Value = toml::from_str(&content)?;

            let table = ["tool", "djtl"]
                .iter()
                .try_fold(&full_toml_value, |current, &key| current.get(key))
                .and_then(toml::Value::as_table);

            if let Some(table) = table {
                let table_string = toml::to_string(table)?;
                builder = builder.add_source(File::from_str(&table_string, FileFormat::Toml));
            }
        }

        builder = builder.add_source(
            File::from(project_root.join(".djtl.toml"))
                .format(FileFormat::Toml)
                .required(false),
        );

        builder = builder.add_source(
            File::from(project_root.join("djtl.toml"))
                .format(FileFormat::Toml)
                .required(false),
        );

        let config = builder.build()?;
        let settings: Settings = config.try_deserialize()?;
        tracing::debug!("Loaded settings for {}: {:?}", project_root.display(), settings);
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    fn debug_only(debug: bool) -> Settings {
        Settings {
            debug,
            ..Settings::default()
        }
    }

    mod defaults {
        use super::*;

        #[test]
        fn test_load_no_files() {
            let dir = tempdir().unwrap();
            let settings = Settings::load_from_paths(dir.path(), None).unwrap();
            assert_eq!(settings, Settings::default());
            assert_eq!(settings.string_if_invalid, "");
        }
    }

    mod project_files {
        use super::*;

        #[test]
        fn test_load_djtl_toml_only() {
            let dir = tempdir().unwrap();
            fs::write(dir.path().join("djtl.toml"), "debug = true").unwrap();
            let settings = Settings::load_from_paths(dir.path(), None).unwrap();
            assert_eq!(settings, debug_only(true));
        }

        #[test]
        fn test_load_dot_djtl_toml_only() {
            let dir = tempdir().unwrap();
            fs::write(dir.path().join(".djtl.toml"), "debug = true").unwrap();
            let settings = Settings::load_from_paths(dir.path(), None).unwrap();
            assert_eq!(settings, debug_only(true));
        }

        #[test]
        fn test_load_pyproject_toml_only() {
            let dir = tempdir().unwrap();
            let content = "[tool.djtl]\nstring_if_invalid = \"<missing>\"\n";
            fs::write(dir.path().join("pyproject.toml"), content).unwrap();
            let settings = Settings::load_from_paths(dir.path(), None).unwrap();
            assert_eq!(settings.string_if_invalid, "<missing>");
            assert!(!settings.debug);
        }

        #[test]
        fn test_pyproject_without_table() {
            let dir = tempdir().unwrap();
            fs::write(dir.path().join("pyproject.toml"), "[project]\nname = \"x\"\n").unwrap();
            let settings = Settings::load_from_paths(dir.path(), None).unwrap();
            assert_eq!(settings, Settings::default());
        }
    }

    mod priority {
        use super::*;

        #[test]
        fn test_djtl_overrides_dot_djtl() {
            let dir = tempdir().unwrap();
            fs::write(dir.path().join(".djtl.toml"), "debug = false").unwrap();
            fs::write(dir.path().join("djtl.toml"), "debug = true").unwrap();
            let settings = Settings::load_from_paths(dir.path(), None).unwrap();
            assert_eq!(settings, debug_only(true));
        }

        #[test]
        fn test_dot_djtl_overrides_pyproject() {
            let dir = tempdir().unwrap();
            fs::write(dir.path().join("pyproject.toml"), "[tool.djtl]\ndebug = false\n").unwrap();
            fs::write(dir.path().join(".djtl.toml"), "debug = true").unwrap();
            let settings = Settings::load_from_paths(dir.path(), None).unwrap();
            assert_eq!(settings, debug_only(true));
        }

        #[test]
        fn test_project_overrides_user() {
            let user_dir = tempdir().unwrap();
            let project_dir = tempdir().unwrap();
            let user_conf_path = user_dir.path().join("djtl.toml");
            fs::write(&user_conf_path, "debug = true\nstring_if_invalid = \"?\"").unwrap();
            fs::write(project_dir.path().join("djtl.toml"), "debug = false").unwrap();

            let settings =
                Settings::load_from_paths(project_dir.path(), Some(&user_conf_path)).unwrap();
            assert!(!settings.debug);
            // Keys the project leaves alone still come from the user file.
            assert_eq!(settings.string_if_invalid, "?");
        }

        #[test]
        fn test_missing_user_file_ignored() {
            let user_dir = tempdir().unwrap();
            let project_dir = tempdir().unwrap();
            let user_conf_path = user_dir.path().join("djtl.toml");
            fs::write(project_dir.path().join("djtl.toml"), "debug = true").unwrap();

            let settings =
                Settings::load_from_paths(project_dir.path(), Some(&user_conf_path)).unwrap();
            assert_eq!(settings, debug_only(true));
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn test_invalid_toml_content() {
            let dir = tempdir().unwrap();
            fs::write(dir.path().join("djtl.toml"), "debug = not_a_boolean").unwrap();
            let result = Settings::load_from_paths(dir.path(), None);
            assert!(matches!(result, Err(ConfigError::Config(_))));
        }

        #[test]
        fn test_invalid_pyproject() {
            let dir = tempdir().unwrap();
            fs::write(dir.path().join("pyproject.toml"), "[tool.djtl\n").unwrap();
            let result = Settings::load_from_paths(dir.path(), None);
            assert!(matches!(result, Err(ConfigError::PyprojectParse(_))));
        }
    }
}
