// Csputil — Inspection session
//
// Holds the active container context and the key blobs exported from it.
// Opening a container clears the key table, then inspects the exchange and
// signature slots independently: a failure in one never hides the other.

use std::path::Path;

use crate::blob::{Blob, DumpLayout};
use crate::csp::CryptoContext;
use crate::enumerator::{ContainerEnumerator, ContainerListSnapshot, ContainerQuery};
use crate::provider::{BlobKind, CryptoProvider, ErrorKind, KeySpec, ProviderError};

use super::report::failure_text;
use super::{ContainerReport, KeyIndex, KeySlotReport, SessionError};

pub struct Session<'p> {
    enumerator: ContainerEnumerator<'p>,
    context: CryptoContext<'p>,
    container: Option<String>,
    report: Option<ContainerReport>,
    keys: [Option<Blob>; 4],
    layout: DumpLayout,
}

impl<'p> Session<'p> {
    pub fn new(provider: &'p dyn CryptoProvider, layout: DumpLayout) -> Self {
        Self {
            enumerator: ContainerEnumerator::new(provider),
            context: CryptoContext::new(provider),
            container: None,
            report: None,
            keys: Default::default(),
            layout,
        }
    }

    /// List the containers for `query`, replacing the current listing.
    pub fn list_containers(
        &mut self,
        query: ContainerQuery,
    ) -> Result<&ContainerListSnapshot, ProviderError> {
        self.enumerator.list_containers(query)
    }

    pub fn snapshot(&self) -> Option<&ContainerListSnapshot> {
        self.enumerator.snapshot()
    }

    /// Open the container at `index` of the current listing, with the
    /// listing's scope and provider. `None` when there is no such entry.
    pub fn select_container(&mut self, index: usize) -> Option<&ContainerReport> {
        let snapshot = self.enumerator.snapshot()?;
        let name = snapshot.get(index)?.to_string();
        let query = snapshot.query().clone();
        Some(self.open_container(&query, &name))
    }

    /// Open `name` under the scope and provider of `query` and export the
    /// keys of both slots.
    pub fn open_container(&mut self, query: &ContainerQuery, name: &str) -> &ContainerReport {
        self.keys = Default::default();
        self.container = Some(name.to_string());

        let acquired = self.context.acquire(
            Some(name),
            query.provider.name(),
            query.provider_type,
            query.acquire_flags(),
        );
        let report = match acquired {
            Ok(()) => ContainerReport::Opened {
                exchange: self.inspect_slot(KeySpec::Exchange),
                signature: self.inspect_slot(KeySpec::Signature),
            },
            Err(e) => ContainerReport::AcquireFailed(e),
        };
        tracing::info!(
            "Opened container '{}' in the {} key store: {}",
            name,
            query.scope,
            if report.is_opened() { "ok" } else { "failed" }
        );
        self.report.insert(report)
    }

    fn inspect_slot(&mut self, spec: KeySpec) -> KeySlotReport {
        let key = match self.context.user_key(spec) {
            Ok(key) => key,
            Err(e) if e.is_no_key() => return KeySlotReport::NoKey,
            Err(e) => return KeySlotReport::Failed(e),
        };

        let mut outcome = |kind: BlobKind| match key.export(kind) {
            Ok(blob) => {
                self.keys[KeyIndex::new(spec, kind).slot()] = Some(blob);
                Ok(())
            }
            Err(e) => Err(e),
        };
        let public = outcome(BlobKind::Public);
        let private = outcome(BlobKind::Private);
        KeySlotReport::Exported { public, private }
    }

    pub fn context(&self) -> &CryptoContext<'p> {
        &self.context
    }

    pub fn container_name(&self) -> Option<&str> {
        self.container.as_deref()
    }

    pub fn report(&self) -> Option<&ContainerReport> {
        self.report.as_ref()
    }

    pub fn layout(&self) -> DumpLayout {
        self.layout
    }

    /// The exported blob at `index`, if the last opened container yielded one.
    pub fn key(&self, index: KeyIndex) -> Option<&Blob> {
        self.keys[index.slot()].as_ref()
    }

    /// Display text for the blob at `index`: its hex dump, "No key", or
    /// the failure that prevented the export.
    pub fn describe(&self, index: KeyIndex) -> String {
        match &self.report {
            None => String::new(),
            Some(ContainerReport::AcquireFailed(e)) => {
                // Reported once, in the first box.
                if index == KeyIndex::ExchangePublic {
                    failure_text(ErrorKind::ContextAcquisition, e)
                } else {
                    String::new()
                }
            }
            Some(report) => match report.slot(index.spec()) {
                Some(slot) => slot.describe(index.kind(), || {
                    self.key(index)
                        .map(|blob| blob.dump_with(self.layout))
                        .unwrap_or_default()
                }),
                None => String::new(),
            },
        }
    }

    /// Write the exported blob at `index` to `path`.
    pub fn save_key(&self, index: KeyIndex, path: &Path) -> Result<(), SessionError> {
        if self.container.is_none() {
            return Err(SessionError::NoContainer);
        }
        let blob = self.key(index).ok_or(SessionError::NotExported(index))?;
        blob.save(path)?;
        tracing::info!("Saved the {} ({} bytes) to {}", index, blob.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enumerator::NameAndType;
    use crate::provider::{codes, Scope};
    use crate::testing;

    fn listed(provider: &dyn CryptoProvider) -> Session<'_> {
        let mut session = Session::new(provider, DumpLayout::KEY);
        session
            .list_containers(ContainerQuery::new(Scope::User, 0, NameAndType::sentinel()))
            .unwrap();
        session
    }

    fn select(session: &mut Session<'_>, name: &str) -> ContainerReport {
        let index = session.snapshot().unwrap().position(name).unwrap();
        session.select_container(index).unwrap().clone()
    }

    #[test]
    fn test_full_container_exports_four_blobs() {
        let provider = testing::soft_provider();
        let mut session = listed(&provider);
        let report = select(&mut session, testing::FULL_CONTAINER);

        assert!(report.is_opened());
        for index in KeyIndex::ALL {
            assert!(session.key(index).is_some(), "{} missing", index);
        }
        assert_eq!(session.key(KeyIndex::SignaturePublic).unwrap().as_bytes()[0], 0x06);
        assert_eq!(session.key(KeyIndex::ExchangePrivate).unwrap().as_bytes()[0], 0x07);
        assert!(session
            .describe(KeyIndex::SignaturePublic)
            .starts_with("Total: 148 (=0x94) bytes\r\n0000: 06 02 00 00 00 24 00 00\r\n"));
        assert!(session.describe(KeyIndex::ExchangePrivate).ends_with(" ...\r\n"));
    }

    #[test]
    fn test_slots_are_reported_independently() {
        let provider = testing::soft_provider();
        let mut session = listed(&provider);
        let report = select(&mut session, testing::SIGNATURE_ONLY_CONTAINER);

        assert_eq!(report.slot(KeySpec::Exchange), Some(&KeySlotReport::NoKey));
        assert_eq!(
            report.slot(KeySpec::Signature),
            Some(&KeySlotReport::Exported {
                public: Ok(()),
                private: Err(ProviderError::new(ErrorKind::KeyExport, codes::NTE_BAD_KEY_STATE)),
            })
        );
        assert_eq!(session.describe(KeyIndex::ExchangePublic), "No key");
        assert_eq!(session.describe(KeyIndex::ExchangePrivate), "No key");
        assert_eq!(
            session.describe(KeyIndex::SignaturePrivate),
            "Failed to export the key - 8009000b"
        );
        assert!(session.key(KeyIndex::SignaturePublic).is_some());
        assert!(session.key(KeyIndex::SignaturePrivate).is_none());
    }

    #[test]
    fn test_selecting_again_clears_key_table() {
        let provider = testing::soft_provider();
        let mut session = listed(&provider);
        select(&mut session, testing::FULL_CONTAINER);
        let report = select(&mut session, testing::EMPTY_CONTAINER);

        assert_eq!(report.slot(KeySpec::Exchange), Some(&KeySlotReport::NoKey));
        assert_eq!(report.slot(KeySpec::Signature), Some(&KeySlotReport::NoKey));
        assert!(KeyIndex::ALL.iter().all(|i| session.key(*i).is_none()));
        assert_eq!(session.container_name(), Some(testing::EMPTY_CONTAINER));
        // Keys are released; only the container context stays open.
        assert_eq!(provider.open_handles(), 1);
    }

    #[test]
    fn test_acquire_failure_is_reported_once() {
        let provider = testing::soft_provider();
        let mut session = Session::new(&provider, DumpLayout::KEY);
        let query = ContainerQuery::new(Scope::User, 0, NameAndType::sentinel());
        let report = session.open_container(&query, "missing").clone();

        assert!(!report.is_opened());
        assert_eq!(
            session.describe(KeyIndex::ExchangePublic),
            "Failed to acquire the container - 80090016"
        );
        assert_eq!(session.describe(KeyIndex::SignaturePublic), "");
        assert!(!session.context().is_acquired());
    }

    #[test]
    fn test_select_out_of_range_is_ignored() {
        let provider = testing::soft_provider();
        let mut session = listed(&provider);
        assert!(session.select_container(99).is_none());
        assert!(session.report().is_none());

        let mut unlisted = Session::new(&provider, DumpLayout::KEY);
        assert!(unlisted.select_container(0).is_none());
    }

    #[test]
    fn test_save_key_writes_raw_blob() {
        let provider = testing::soft_provider();
        let mut session = listed(&provider);
        select(&mut session, testing::FULL_CONTAINER);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(KeyIndex::ExchangePublic.default_file_name());
        session.save_key(KeyIndex::ExchangePublic, &path).unwrap();

        let written = std::fs::read(&path).unwrap();
        assert_eq!(
            written.as_slice(),
            session.key(KeyIndex::ExchangePublic).unwrap().as_bytes()
        );
    }

    #[test]
    fn test_save_missing_key_fails() {
        let provider = testing::soft_provider();
        let mut session = listed(&provider);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sig_pri");

        assert!(matches!(
            session.save_key(KeyIndex::SignaturePrivate, &path),
            Err(SessionError::NoContainer)
        ));

        select(&mut session, testing::SIGNATURE_ONLY_CONTAINER);
        assert!(matches!(
            session.save_key(KeyIndex::SignaturePrivate, &path),
            Err(SessionError::NotExported(KeyIndex::SignaturePrivate))
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_save_to_missing_directory_fails() {
        let provider = testing::soft_provider();
        let mut session = listed(&provider);
        select(&mut session, testing::FULL_CONTAINER);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("sig_pub");
        assert!(matches!(
            session.save_key(KeyIndex::SignaturePublic, &path),
            Err(SessionError::Save(_))
        ));
    }
}
