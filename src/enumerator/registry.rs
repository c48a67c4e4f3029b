// Csputil — Provider registry listing
//
// Provider types and provider names are enumerated by index until the
// provider reports exhaustion. The sequences are lazy and finite; once
// exhausted (or failed) they stay exhausted.

use std::iter::FusedIterator;

use crate::provider::{CryptoProvider, ProviderError, PROV_RSA_AES};

use super::NameAndType;

type Fetch = fn(&dyn CryptoProvider, u32) -> Result<Option<(u32, String)>, ProviderError>;

/// Lazy walk over one of the provider's registration tables.
pub struct Registrations<'p> {
    provider: &'p dyn CryptoProvider,
    fetch: Fetch,
    index: u32,
    done: bool,
}

impl<'p> Registrations<'p> {
    fn new(provider: &'p dyn CryptoProvider, fetch: Fetch) -> Self {
        Self {
            provider,
            fetch,
            index: 0,
            done: false,
        }
    }
}

impl Iterator for Registrations<'_> {
    type Item = Result<NameAndType, ProviderError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match (self.fetch)(self.provider, self.index) {
            Ok(Some((provider_type, name))) => {
                self.index += 1;
                Some(Ok(NameAndType::new(name, provider_type)))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                tracing::warn!("Enumeration stopped at index {} - {:08x}", self.index, e.code);
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl FusedIterator for Registrations<'_> {}

/// Every registered provider type, in registration order.
pub fn provider_types(provider: &dyn CryptoProvider) -> Registrations<'_> {
    Registrations::new(provider, |p, i| p.enum_provider_types(i))
}

/// Every registered provider as (name, type), in registration order.
pub fn providers(provider: &dyn CryptoProvider) -> Registrations<'_> {
    Registrations::new(provider, |p, i| p.enum_providers(i))
}

/// "(Default)" followed by every registered provider type.
pub fn list_provider_types(provider: &dyn CryptoProvider) -> Result<Vec<NameAndType>, ProviderError> {
    std::iter::once(Ok(NameAndType::sentinel()))
        .chain(provider_types(provider))
        .collect()
}

/// "(Default)" followed by every registered provider name.
pub fn list_providers(provider: &dyn CryptoProvider) -> Result<Vec<NameAndType>, ProviderError> {
    std::iter::once(Ok(NameAndType::sentinel()))
        .chain(providers(provider))
        .collect()
}

/// Initial selection for a provider type list: the RSA-AES type if listed,
/// otherwise the first entry.
pub fn default_provider_type_index(types: &[NameAndType]) -> usize {
    types
        .iter()
        .position(|t| t.provider_type() == PROV_RSA_AES)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{SoftProvider, PROV_RSA_FULL};

    #[test]
    fn test_provider_types_start_with_sentinel() {
        let provider = SoftProvider::new();
        let types = list_provider_types(&provider).unwrap();
        assert_eq!(types.len(), 3);
        assert!(types[0].is_default());
        assert_eq!(types[1].provider_type(), PROV_RSA_FULL);
        assert_eq!(types[2].provider_type(), PROV_RSA_AES);
    }

    #[test]
    fn test_default_selection_prefers_rsa_aes() {
        let provider = SoftProvider::new();
        let types = list_provider_types(&provider).unwrap();
        assert_eq!(default_provider_type_index(&types), 2);

        let without_aes = vec![NameAndType::sentinel(), NameAndType::new("RSA Full", 1)];
        assert_eq!(default_provider_type_index(&without_aes), 0);
    }

    #[test]
    fn test_providers_listing() {
        let provider = SoftProvider::new();
        let names: Vec<String> = list_providers(&provider)
            .unwrap()
            .iter()
            .map(NameAndType::display_name)
            .collect();
        assert_eq!(
            names,
            vec![
                "(Default)".to_string(),
                "Csputil Base Software Provider  (type: 1)".to_string(),
                "Csputil Enhanced RSA and AES Software Provider  (type: 24)".to_string(),
            ]
        );
    }

    #[test]
    fn test_sequence_stays_exhausted() {
        let provider = SoftProvider::new();
        let mut walk = provider_types(&provider);
        assert_eq!(walk.by_ref().count(), 2);
        assert!(walk.next().is_none());
    }
}
