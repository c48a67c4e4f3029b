// Csputil — Config Module
//
// TOML configuration: backend choice, hex dump geometry and the containers
// the software provider starts with.

mod error;
mod keyset;
mod settings;

pub use error::ConfigError;
pub use keyset::{load_pem_key, open_provider, soft_provider, DEMO_CONTAINER};
pub use settings::{default_path, Backend, Config, ContainerConfig, DumpConfig, KeySource};
