// Csputil — Provider construction
//
// Builds the provider selected by the configuration. For the software
// backend this loads or generates the configured container keys; nothing is
// written back.

use std::path::Path;

use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::RsaPrivateKey;

use crate::provider::{CryptoProvider, KeySpec, Scope, SoftContainer, SoftKey, SoftProvider};

use super::settings::default_key_bits;
use super::{Backend, Config, ConfigError, ContainerConfig, KeySource};

/// Container created when the software backend has none configured.
pub const DEMO_CONTAINER: &str = "csputil-demo";

/// Open the configured backend.
pub fn open_provider(config: &Config) -> Result<Box<dyn CryptoProvider>, ConfigError> {
    match config.backend {
        Backend::Soft => Ok(Box::new(soft_provider(config)?)),
        Backend::Capi => capi_provider(),
    }
}

#[cfg(all(windows, feature = "capi"))]
fn capi_provider() -> Result<Box<dyn CryptoProvider>, ConfigError> {
    Ok(Box::new(crate::provider::CapiProvider::new()))
}

#[cfg(not(all(windows, feature = "capi")))]
fn capi_provider() -> Result<Box<dyn CryptoProvider>, ConfigError> {
    Err(ConfigError::BackendUnavailable(Backend::Capi.name()))
}

/// A software provider holding the configured containers, or the demo
/// container when none are configured.
pub fn soft_provider(config: &Config) -> Result<SoftProvider, ConfigError> {
    let provider = SoftProvider::new();
    if config.containers.is_empty() {
        provider.add_container(demo_container(default_key_bits())?);
        return Ok(provider);
    }

    let mut seen: Vec<(Scope, &str)> = Vec::new();
    for entry in &config.containers {
        if seen.contains(&(entry.scope, entry.name.as_str())) {
            return Err(ConfigError::DuplicateContainer(entry.name.clone()));
        }
        seen.push((entry.scope, &entry.name));
        provider.add_container(build_container(config, entry)?);
    }
    Ok(provider)
}

fn build_container(config: &Config, entry: &ContainerConfig) -> Result<SoftContainer, ConfigError> {
    let mut container = SoftContainer::new(&entry.name, entry.scope);
    for (spec, source) in [
        (KeySpec::Exchange, &entry.exchange_key),
        (KeySpec::Signature, &entry.signature_key),
    ] {
        if let Some(source) = source {
            let key = match source {
                KeySource::Generate => generate_key(entry.key_bits)?,
                KeySource::Pem(path) => load_pem_key(&config.resolve(path))?,
            };
            container = container.with_key(spec, SoftKey::new(key, entry.exportable));
        }
    }
    if entry.default {
        container = container.as_default();
    }
    Ok(container)
}

/// Session-only user container with fresh exportable keys in both slots.
pub(crate) fn demo_container(bits: usize) -> Result<SoftContainer, ConfigError> {
    tracing::info!(
        "No containers configured; generating {}-bit keys for '{}'",
        bits,
        DEMO_CONTAINER
    );
    Ok(SoftContainer::new(DEMO_CONTAINER, Scope::User)
        .with_key(KeySpec::Exchange, SoftKey::new(generate_key(bits)?, true))
        .with_key(KeySpec::Signature, SoftKey::new(generate_key(bits)?, true))
        .as_default())
}

fn generate_key(bits: usize) -> Result<RsaPrivateKey, ConfigError> {
    let mut rng = rand::thread_rng();
    Ok(RsaPrivateKey::new(&mut rng, bits)?)
}

/// Read an RSA private key in PKCS#8 or PKCS#1 PEM form.
pub fn load_pem_key(path: &Path) -> Result<RsaPrivateKey, ConfigError> {
    let pem = std::fs::read_to_string(path).map_err(|e| ConfigError::Key {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    RsaPrivateKey::from_pkcs8_pem(&pem)
        .or_else(|_| RsaPrivateKey::from_pkcs1_pem(&pem))
        .map_err(|e| ConfigError::Key {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}
