use std::path::Path;

use clap::ValueEnum;
use config::{Config, File};
use serde::Deserialize;

use crate::error::Result;
use crate::rst::Level;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Lowest message level that is reported
    pub report_level: ReportLevel,
    /// Directives treated as inert in addition to the Sphinx ones
    pub ignore_directives: Vec<String>,
    pub ignore_roles: Vec<String>,
    /// Substitutions that resolve to themselves instead of being reported
    pub ignore_substitutions: Vec<String>,
    /// Code block languages that are not handed to the embedded code checks
    pub ignore_languages: Vec<String>,
    /// Regex; matching messages are dropped
    pub ignore_messages: Option<String>,
    pub sphinx: SphinxMode,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportLevel {
    Info,
    Warning,
    Error,
    Severe,
    None,
}

impl ReportLevel {
    /// Whether a message of `level` passes this threshold.
    pub fn admits(&self, level: Level) -> bool {
        let threshold = match self {
            ReportLevel::Info => Level::Info,
            ReportLevel::Warning => Level::Warning,
            ReportLevel::Error => Level::Error,
            ReportLevel::Severe => Level::Severe,
            ReportLevel::None => return false,
        };
        level >= threshold
    }
}

/// How the Sphinx toolchain is used.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SphinxMode {
    /// Use Sphinx when it is compiled in, otherwise check plain docutils markup
    Auto,
    /// Fail with `FeatureUnavailable` when Sphinx support is missing
    Require,
    Off,
}

impl Settings {
    pub fn new(root_dir: &Path) -> Result<Settings> {
        let expanded = shellexpand::tilde("~/.config/rstcheck/settings");
        let local = root_dir.join(".rstcheck");
        let settings = Config::builder()
            .add_source(File::with_name(&expanded).required(false))
            .add_source(File::with_name(&local.to_string_lossy()).required(false))
            .set_default("report_level", "info")?
            .set_default("ignore_directives", Vec::<String>::new())?
            .set_default("ignore_roles", Vec::<String>::new())?
            .set_default("ignore_substitutions", Vec::<String>::new())?
            .set_default("ignore_languages", Vec::<String>::new())?
            .set_default("sphinx", "auto")?
            .build()?;

        let settings = settings.try_deserialize::<Settings>()?;

        Ok(settings)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            report_level: ReportLevel::Info,
            ignore_directives: vec![],
            ignore_roles: vec![],
            ignore_substitutions: vec![],
            ignore_languages: vec![],
            ignore_messages: None,
            sphinx: SphinxMode::Auto,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::test_utils::create_test_project_dir;

    #[test]
    fn test_defaults_without_config_file() {
        let (_temp_dir, project_dir) = create_test_project_dir();
        let settings = Settings::new(&project_dir).unwrap();

        assert_eq!(settings.report_level, ReportLevel::Info);
        assert_eq!(settings.sphinx, SphinxMode::Auto);
        assert!(settings.ignore_directives.is_empty());
        assert!(settings.ignore_messages.is_none());
    }

    #[test]
    fn test_project_config_file_is_read() {
        let (_temp_dir, project_dir) = create_test_project_dir();
        fs::write(
            project_dir.join(".rstcheck.toml"),
            r#"
report_level = "warning"
ignore_directives = ["automodule", "mermaid"]
ignore_languages = ["yaml"]
sphinx = "off"
"#,
        )
        .unwrap();

        let settings = Settings::new(&project_dir).unwrap();

        assert_eq!(settings.report_level, ReportLevel::Warning);
        assert_eq!(settings.ignore_directives, vec!["automodule", "mermaid"]);
        assert_eq!(settings.ignore_languages, vec!["yaml"]);
        assert_eq!(settings.sphinx, SphinxMode::Off);
    }

    #[test]
    fn test_report_level_threshold() {
        assert!(ReportLevel::Warning.admits(Level::Error));
        assert!(ReportLevel::Warning.admits(Level::Warning));
        assert!(!ReportLevel::Warning.admits(Level::Info));
        assert!(!ReportLevel::None.admits(Level::Severe));
    }
}
