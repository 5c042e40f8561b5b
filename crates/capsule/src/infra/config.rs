//! Configuration management utilities.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static PROJECT_CONFIG_PATH: &str = ".capsule/config.toml";

/// Layered configuration loaded from defaults, user, project, explicit file, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub project: Project,
    #[serde(default)]
    pub redaction: Redaction,
    #[serde(default)]
    pub export: Export,
    #[serde(default)]
    pub ui: Ui,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Glob patterns matched against file names in the opened folder.
    #[serde(default = "Project::default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default = "Project::default_output_file")]
    pub output_file: String,
    /// Entry listed when the opened folder does not exist.
    #[serde(default = "Project::default_placeholder_file")]
    pub placeholder_file: String,
}

impl Project {
    fn default_extensions() -> Vec<String> {
        vec!["*.cs".into()]
    }

    fn default_output_file() -> String {
        "AiContextMulti.md".into()
    }

    fn default_placeholder_file() -> String {
        "FakeFile.cs".into()
    }
}

impl Default for Project {
    fn default() -> Self {
        Self {
            extensions: Self::default_extensions(),
            output_file: Self::default_output_file(),
            placeholder_file: Self::default_placeholder_file(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redaction {
    #[serde(default = "Redaction::default_method_placeholder")]
    pub method_placeholder: String,
    #[serde(default = "Redaction::default_class_placeholder")]
    pub class_placeholder: String,
}

impl Redaction {
    fn default_method_placeholder() -> String {
        "logic hidden".into()
    }

    fn default_class_placeholder() -> String {
        "whole class collapsed".into()
    }
}

impl Default for Redaction {
    fn default() -> Self {
        Self {
            method_placeholder: Self::default_method_placeholder(),
            class_placeholder: Self::default_class_placeholder(),
        }
    }
}

/// Unset keys fall back to built-in values, so a layer without an `[export]` section never
/// overrides an earlier one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Export {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    template: Option<String>,
}

impl Export {
    fn default_title() -> &'static str {
        "Project bundle for AI"
    }

    fn default_language() -> &'static str {
        "csharp"
    }

    fn default_template() -> &'static str {
        "bundle_markdown"
    }

    pub fn title(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| Self::default_title().to_owned())
    }

    /// Info string placed after the opening code fence.
    pub fn language(&self) -> String {
        self.language
            .clone()
            .unwrap_or_else(|| Self::default_language().to_owned())
    }

    /// Built-in template name or a path to a template file.
    pub fn template(&self) -> String {
        self.template
            .clone()
            .unwrap_or_else(|| Self::default_template().to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ui {
    #[serde(default = "Ui::default_theme")]
    pub theme: String,
}

impl Ui {
    fn default_theme() -> String {
        "base16-ocean.dark".into()
    }
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            theme: Self::default_theme(),
        }
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    output_file: Option<String>,
    theme: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            output_file: env::var("CAPSULE_OUTPUT_FILE").ok(),
            theme: env::var("CAPSULE_THEME").ok(),
        }
    }

    #[cfg(test)]
    fn for_tests(output_file: &str, theme: &str) -> Self {
        Self {
            output_file: Some(output_file.to_owned()),
            theme: Some(theme.to_owned()),
        }
    }
}

impl Config {
    /// Load configuration for a project folder: defaults, user config, the folder's
    /// `.capsule/config.toml`, an optional explicit file, then env overrides.
    pub fn load_for(project_root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let project = Some(project_root.join(PROJECT_CONFIG_PATH));
        Self::load_with_layers(global, project, explicit, env)
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        project: Option<PathBuf>,
        explicit: Option<&Path>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<Config> = Vec::new();

        layers.push(Self::from_str(&DEFAULT_CONFIG)?);

        if let Some(global_path) = global.filter(|path| path.exists()) {
            layers.push(Self::from_file(&global_path)?);
        }

        if let Some(project_path) = project.filter(|path| path.exists()) {
            layers.push(Self::from_file(&project_path)?);
        }

        // Unlike the discovered layers, a file named on the command line must exist.
        if let Some(explicit_path) = explicit {
            layers.push(Self::from_file(explicit_path)?);
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        Ok(apply_env_overrides(merged, env_overrides))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data)
            .with_context(|| format!("invalid config file: {}", path.display()))
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            project: merge_project(self.project, other.project),
            redaction: merge_redaction(self.redaction, other.redaction),
            export: merge_export(self.export, other.export),
            ui: Ui {
                theme: choose(self.ui.theme, other.ui.theme, Ui::default_theme),
            },
        }
    }
}

fn merge_project(base: Project, overlay: Project) -> Project {
    Project {
        extensions: if overlay.extensions != Project::default_extensions() {
            overlay.extensions
        } else {
            base.extensions
        },
        output_file: choose(
            base.output_file,
            overlay.output_file,
            Project::default_output_file,
        ),
        placeholder_file: choose(
            base.placeholder_file,
            overlay.placeholder_file,
            Project::default_placeholder_file,
        ),
    }
}

fn merge_redaction(base: Redaction, overlay: Redaction) -> Redaction {
    Redaction {
        method_placeholder: choose(
            base.method_placeholder,
            overlay.method_placeholder,
            Redaction::default_method_placeholder,
        ),
        class_placeholder: choose(
            base.class_placeholder,
            overlay.class_placeholder,
            Redaction::default_class_placeholder,
        ),
    }
}

fn merge_export(mut base: Export, overlay: Export) -> Export {
    if let Some(value) = overlay.title {
        base.title = Some(value);
    }
    if let Some(value) = overlay.language {
        base.language = Some(value);
    }
    if let Some(value) = overlay.template {
        base.template = Some(value);
    }
    base
}

/// Overlay values equal to the built-in default do not clobber a customised base.
fn choose(base: String, overlay: String, default_fn: fn() -> String) -> String {
    if overlay != default_fn() {
        overlay
    } else {
        base
    }
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("capsule/config.toml"))
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(output_file) = env.output_file {
        config.project.output_file = output_file;
    }
    if let Some(theme) = env.theme {
        config.ui.theme = theme;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_uses_defaults_when_no_files() {
        let config = Config::load_with_layers(None, None, None, EnvOverrides::default())
            .expect("load default config");
        assert_eq!(config.project.output_file, "AiContextMulti.md");
        assert_eq!(config.project.extensions, ["*.cs"]);
        assert_eq!(config.export.language(), "csharp");
        assert_eq!(config.redaction.method_placeholder, "logic hidden");
    }

    #[test]
    fn builtin_defaults_match_struct_defaults() -> Result<()> {
        let builtin = Config::from_str(&DEFAULT_CONFIG)?;
        let fallback = Config::default();
        assert_eq!(builtin.project, fallback.project);
        assert_eq!(builtin.redaction, fallback.redaction);
        assert_eq!(builtin.ui, fallback.ui);
        assert_eq!(builtin.export.title(), fallback.export.title());
        assert_eq!(builtin.export.template(), fallback.export.template());
        Ok(())
    }

    #[test]
    fn layer_without_export_section_keeps_earlier_title() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let global = temp.path().join("global.toml");
        fs::write(&global, "[export]\ntitle = \"Team bundle\"\n")?;
        let project = temp.path().join("project.toml");
        fs::write(&project, "[ui]\ntheme = \"InspiredGitHub\"\n")?;

        let config =
            Config::load_with_layers(Some(global), Some(project), None, EnvOverrides::default())?;
        assert_eq!(config.export.title(), "Team bundle");
        assert_eq!(config.ui.theme, "InspiredGitHub");
        Ok(())
    }

    #[test]
    fn merge_global_and_project() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let global = temp.path().join("config.toml");
        fs::write(
            &global,
            r#"
[redaction]
method_placeholder = "snip"
[export]
title = "Team bundle"
"#,
        )?;

        let project_dir = temp.path().join("repo");
        fs::create_dir_all(project_dir.join(".capsule"))?;
        fs::write(
            project_dir.join(PROJECT_CONFIG_PATH),
            r#"
[project]
extensions = ["*.cs", "*.csx"]
[export]
language = "cs"
"#,
        )?;

        let config = Config::load_with_layers(
            Some(global),
            Some(project_dir.join(PROJECT_CONFIG_PATH)),
            None,
            EnvOverrides::default(),
        )?;

        assert_eq!(config.redaction.method_placeholder, "snip");
        assert_eq!(config.redaction.class_placeholder, "whole class collapsed");
        assert_eq!(config.export.title(), "Team bundle");
        assert_eq!(config.export.language(), "cs");
        assert_eq!(config.project.extensions, ["*.cs", "*.csx"]);
        Ok(())
    }

    #[test]
    fn env_overrides_take_precedence() -> Result<()> {
        let overrides = EnvOverrides::for_tests("Bundle.md", "InspiredGitHub");
        let config = Config::load_with_layers(None, None, None, overrides)?;
        assert_eq!(config.project.output_file, "Bundle.md");
        assert_eq!(config.ui.theme, "InspiredGitHub");
        Ok(())
    }

    #[test]
    fn env_overrides_win_over_explicit_file() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let explicit = temp.path().join("capsule.toml");
        fs::write(
            &explicit,
            "[project]\noutput_file = \"FromFile.md\"\n[ui]\ntheme = \"Solarized (dark)\"\n",
        )?;

        let overrides = EnvOverrides {
            output_file: Some("FromEnv.md".into()),
            theme: None,
        };
        let config = Config::load_with_layers(None, None, Some(&explicit), overrides)?;
        assert_eq!(config.project.output_file, "FromEnv.md");
        assert_eq!(config.ui.theme, "Solarized (dark)");
        Ok(())
    }

    #[test]
    fn explicit_file_overrides_project_layer() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let project = temp.path().join("project.toml");
        fs::write(&project, "[project]\noutput_file = \"Project.md\"\n")?;
        let explicit = temp.path().join("explicit.toml");
        fs::write(&explicit, "[project]\noutput_file = \"Explicit.md\"\n")?;

        let config = Config::load_with_layers(
            None,
            Some(project),
            Some(&explicit),
            EnvOverrides::default(),
        )?;
        assert_eq!(config.project.output_file, "Explicit.md");
        Ok(())
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let missing = temp.path().join("absent.toml");
        let result =
            Config::load_with_layers(None, None, Some(&missing), EnvOverrides::default());
        assert!(result.is_err());
    }

    #[test]
    fn invalid_config_returns_error() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let file = temp.path().join("broken.toml");
        fs::write(&file, "this is not toml")?;
        assert!(Config::from_file(&file).is_err());
        Ok(())
    }
}
