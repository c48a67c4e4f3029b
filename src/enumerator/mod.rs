// Csputil — Enumerator Module
//
// Lists what a provider offers: registered provider types, registered
// providers and the key containers of a user or machine key store. Each list
// of types or providers starts with a "(Default)" entry.

mod containers;
mod descriptor;
mod registry;

pub use containers::{ContainerEnumerator, ContainerListSnapshot, ContainerNames, ContainerQuery};
pub use descriptor::NameAndType;
pub use registry::{
    default_provider_type_index, list_provider_types, list_providers, provider_types, providers,
    Registrations,
};
