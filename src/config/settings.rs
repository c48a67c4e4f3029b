// Csputil — Configuration file
//
// Located by `--config` / CSPUTIL_CONFIG, else <config_dir>/csputil/config.toml.
// A missing default file means built-in defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::blob::DumpLayout;
use crate::provider::Scope;

use super::ConfigError;

/// Which provider implementation serves the commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// In-process software provider.
    Soft,
    /// Windows CryptoAPI.
    Capi,
}

impl Default for Backend {
    #[cfg(all(windows, feature = "capi"))]
    fn default() -> Self {
        Backend::Capi
    }

    #[cfg(not(all(windows, feature = "capi")))]
    fn default() -> Self {
        Backend::Soft
    }
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Soft => "soft",
            Backend::Capi => "capi",
        }
    }
}

/// Hex dump geometry for keys and signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DumpConfig {
    #[serde(default = "default_key_width")]
    pub key_width: usize,
    #[serde(default = "default_key_ellipsis")]
    pub key_ellipsis: usize,
    #[serde(default = "default_signature_width")]
    pub signature_width: usize,
    #[serde(default = "default_signature_ellipsis")]
    pub signature_ellipsis: usize,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            key_width: default_key_width(),
            key_ellipsis: default_key_ellipsis(),
            signature_width: default_signature_width(),
            signature_ellipsis: default_signature_ellipsis(),
        }
    }
}

impl DumpConfig {
    pub fn key_layout(&self) -> DumpLayout {
        DumpLayout {
            width: self.key_width,
            ellipsis: self.key_ellipsis,
        }
    }

    pub fn signature_layout(&self) -> DumpLayout {
        DumpLayout {
            width: self.signature_width,
            ellipsis: self.signature_ellipsis,
        }
    }
}

fn default_key_width() -> usize { DumpLayout::KEY.width }
fn default_key_ellipsis() -> usize { DumpLayout::KEY.ellipsis }
fn default_signature_width() -> usize { DumpLayout::SIGNATURE.width }
fn default_signature_ellipsis() -> usize { DumpLayout::SIGNATURE.ellipsis }

/// Where a software-provider key comes from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum KeySource {
    /// A fresh key, generated at startup.
    Generate,
    /// A PEM file (PKCS#8 or PKCS#1). Relative paths resolve against the
    /// configuration file's directory.
    Pem(PathBuf),
}

impl From<String> for KeySource {
    fn from(value: String) -> Self {
        if value == "generate" {
            KeySource::Generate
        } else {
            KeySource::Pem(PathBuf::from(value))
        }
    }
}

/// A software-provider container.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContainerConfig {
    pub name: String,
    #[serde(default)]
    pub scope: Scope,
    #[serde(default)]
    pub exchange_key: Option<KeySource>,
    #[serde(default)]
    pub signature_key: Option<KeySource>,
    #[serde(default = "default_true")]
    pub exportable: bool,
    /// Opened when acquiring without a container name.
    #[serde(default)]
    pub default: bool,
    /// Modulus size for generated keys.
    #[serde(default = "default_key_bits")]
    pub key_bits: usize,
}

fn default_true() -> bool { true }
pub(crate) fn default_key_bits() -> usize { 2048 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: Backend,
    #[serde(default)]
    pub dump: DumpConfig,
    #[serde(default)]
    pub containers: Vec<ContainerConfig>,
    /// Directory of the file this was loaded from.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl Config {
    /// Load from `explicit` if given (it must exist), else from the default
    /// location if a file is there, else built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match default_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => {
                    tracing::debug!("No configuration file, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        tracing::debug!(
            "Loaded configuration from {} ({} containers)",
            path.display(),
            config.containers.len()
        );
        Ok(config)
    }

    /// Resolve a key path against the configuration file's directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// `<config_dir>/csputil/config.toml`.
pub fn default_path() -> Option<PathBuf> {
    dirs_next::config_dir().map(|dir| dir.join("csputil").join("config.toml"))
}
