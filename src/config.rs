use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::ui::style::{BackgroundMode, background_mode_from_colorfgbg};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Auto,
    Light,
    Dark,
}

impl ThemeMode {
    /// Resolve `Auto` from the `COLORFGBG` hint.
    pub fn resolve(self, colorfgbg: Option<&str>) -> BackgroundMode {
        match self {
            Self::Auto => background_mode_from_colorfgbg(colorfgbg),
            Self::Light => BackgroundMode::Light,
            Self::Dark => BackgroundMode::Dark,
        }
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Ansi,
    Plain,
    Json,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub no_color: bool,
    pub format: Option<OutputFormat>,
    pub theme: Option<ThemeMode>,
    pub highlights: Option<PathBuf>,
    pub post_id: Option<String>,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            no_color: self.no_color || other.no_color,
            format: other.format.or(self.format),
            theme: other.theme.or(self.theme),
            highlights: other
                .highlights
                .clone()
                .or_else(|| self.highlights.clone()),
            post_id: other.post_id.clone().or_else(|| self.post_id.clone()),
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("postmark").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("postmark")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("postmark").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("postmark")
                .join("config");
        }
    }

    PathBuf::from(".postmarkrc")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".postmarkrc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# postmark defaults (saved with --save)".to_string());
    if flags.no_color {
        lines.push("--no-color".to_string());
    }
    if let Some(format) = flags.format {
        let format_str = match format {
            OutputFormat::Ansi => "ansi",
            OutputFormat::Plain => "plain",
            OutputFormat::Json => "json",
        };
        lines.push(format!("--format {format_str}"));
    }
    if let Some(theme) = flags.theme {
        let theme_str = match theme {
            ThemeMode::Auto => "auto",
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        };
        lines.push(format!("--theme {theme_str}"));
    }
    if let Some(path) = &flags.highlights {
        lines.push(format!("--highlights {}", path.display()));
    }
    if let Some(post_id) = &flags.post_id {
        lines.push(format!("--post-id {post_id}"));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        if token == "--no-color" {
            flags.no_color = true;
        } else if token == "--format" {
            if let Some(next) = tokens.get(i + 1) {
                flags.format = parse_format(next);
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--format=") {
            flags.format = parse_format(value);
        } else if token == "--theme" {
            if let Some(next) = tokens.get(i + 1) {
                flags.theme = parse_theme(next);
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--theme=") {
            flags.theme = parse_theme(value);
        } else if token == "--highlights" {
            if let Some(next) = tokens.get(i + 1) {
                flags.highlights = Some(PathBuf::from(next));
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--highlights=") {
            flags.highlights = Some(PathBuf::from(value));
        } else if token == "--post-id" {
            if let Some(next) = tokens.get(i + 1) {
                flags.post_id = Some(next.clone());
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--post-id=") {
            flags.post_id = Some(value.to_string());
        }
        i += 1;
    }
    flags
}

fn parse_theme(s: &str) -> Option<ThemeMode> {
    match s {
        "auto" => Some(ThemeMode::Auto),
        "light" => Some(ThemeMode::Light),
        "dark" => Some(ThemeMode::Dark),
        _ => None,
    }
}

fn parse_format(s: &str) -> Option<OutputFormat> {
    match s {
        "ansi" => Some(OutputFormat::Ansi),
        "plain" => Some(OutputFormat::Plain),
        "json" => Some(OutputFormat::Json),
        _ => None,
    }
}
