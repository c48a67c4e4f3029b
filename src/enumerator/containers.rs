// Csputil — Container listing
//
// Containers are listed through a verify-only context on the requested
// provider and key store. The last query and its sorted result are kept so
// that a container can later be selected by index.

use std::iter::FusedIterator;

use crate::csp::CryptoContext;
use crate::provider::{
    CryptoProvider, EnumCursor, ErrorKind, ProviderError, Scope, CRYPT_VERIFYCONTEXT,
};

use super::NameAndType;

/// The parameters of a container listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContainerQuery {
    pub scope: Scope,
    /// Provider type id; `0` leaves it to the provider.
    pub provider_type: u32,
    pub provider: NameAndType,
}

impl ContainerQuery {
    pub fn new(scope: Scope, provider_type: u32, provider: NameAndType) -> Self {
        Self {
            scope,
            provider_type,
            provider,
        }
    }

    /// Flags for opening one of the listed containers.
    pub fn acquire_flags(&self) -> u32 {
        self.scope.flags()
    }
}

/// Result of the last container listing.
#[derive(Debug, Clone, Default)]
pub struct ContainerListSnapshot {
    query: ContainerQuery,
    names: Vec<String>,
}

impl ContainerListSnapshot {
    pub fn query(&self) -> &ContainerQuery {
        &self.query
    }

    /// Container names, sorted lexicographically (case-sensitive).
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Lazy walk over the containers visible to a context, CRYPT_FIRST then
/// CRYPT_NEXT until the provider reports exhaustion.
pub struct ContainerNames<'a, 'p> {
    context: &'a CryptoContext<'p>,
    cursor: EnumCursor,
    done: bool,
}

impl<'a, 'p> ContainerNames<'a, 'p> {
    pub fn new(context: &'a CryptoContext<'p>) -> Self {
        Self {
            context,
            cursor: EnumCursor::First,
            done: false,
        }
    }
}

impl Iterator for ContainerNames<'_, '_> {
    type Item = Result<String, ProviderError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let step = self.context.require(ErrorKind::Enumeration).and_then(|handle| {
            self.context.provider().enum_containers(handle, self.cursor)
        });
        self.cursor = EnumCursor::Next;
        match step {
            Ok(Some(name)) => Some(Ok(name)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                tracing::warn!("CryptGetProvParam(PP_ENUMCONTAINERS) failed - {:08x}", e.code);
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl FusedIterator for ContainerNames<'_, '_> {}

/// Lists containers and remembers the last listing.
pub struct ContainerEnumerator<'p> {
    provider: &'p dyn CryptoProvider,
    snapshot: Option<ContainerListSnapshot>,
}

impl<'p> ContainerEnumerator<'p> {
    pub fn new(provider: &'p dyn CryptoProvider) -> Self {
        Self {
            provider,
            snapshot: None,
        }
    }

    /// Enumerate the containers matching `query` and replace the snapshot.
    ///
    /// The snapshot records `query` even when the verify context cannot be
    /// acquired, leaving an empty name list.
    pub fn list_containers(
        &mut self,
        query: ContainerQuery,
    ) -> Result<&ContainerListSnapshot, ProviderError> {
        let provider = self.provider;
        let snapshot = self.snapshot.insert(ContainerListSnapshot {
            query,
            names: Vec::new(),
        });
        let query = &snapshot.query;

        let context = CryptoContext::open(
            provider,
            None,
            query.provider.name(),
            query.provider_type,
            CRYPT_VERIFYCONTEXT | query.scope.flags(),
        )?;
        let mut names = ContainerNames::new(&context).collect::<Result<Vec<_>, _>>()?;
        names.sort();

        tracing::debug!(
            "Found {} containers in the {} key store (type {}, provider {})",
            names.len(),
            query.scope,
            query.provider_type,
            query.provider
        );
        snapshot.names = names;
        Ok(snapshot)
    }

    /// True when the last listing was made for exactly `query`.
    pub fn is_cached(&self, query: &ContainerQuery) -> bool {
        self.snapshot.as_ref().is_some_and(|s| s.query == *query)
    }

    pub fn snapshot(&self) -> Option<&ContainerListSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn provider(&self) -> &'p dyn CryptoProvider {
        self.provider
    }
}
