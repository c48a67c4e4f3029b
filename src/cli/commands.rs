// Csputil — CLI Command Handlers
//
// Each function handles one CLI subcommand against an opened provider and
// writes its report to `out`. `execute` loads the configuration, opens the
// configured backend and dispatches.

use std::io::Write;
use std::path::PathBuf;

use crate::blob::DumpLayout;
use crate::config::{open_provider, Config};
use crate::csp::CryptoContext;
use crate::enumerator::{
    default_provider_type_index, list_provider_types, list_providers, ContainerQuery, NameAndType,
};
use crate::error::CsputilError;
use crate::provider::{BlobKind, CryptoProvider, HashAlgorithm, Scope};
use crate::session::{ContainerReport, KeyIndex, Session, SessionError};
use crate::signer::{
    InputFormat, KeySelection, OutputFormat, SignError, SignForm, SigningPipeline, VerifyRequest,
};

use super::{Cli, Commands};

/// Provider selection shared by every command.
struct Target {
    scope: Scope,
    provider_type: u32,
    provider: Option<String>,
}

impl Target {
    fn from_cli(cli: &Cli) -> Self {
        Self {
            scope: if cli.machine { Scope::Machine } else { Scope::User },
            provider_type: cli.provider_type,
            provider: cli.provider.clone(),
        }
    }

    /// The container query for this selection. A provider name is looked up
    /// among the registered providers to learn its type.
    fn query(&self, provider: &dyn CryptoProvider) -> Result<ContainerQuery, CsputilError> {
        let descriptor = match &self.provider {
            None => NameAndType::sentinel(),
            Some(name) => list_providers(provider)?
                .into_iter()
                .find(|p| p.name() == Some(name.as_str()))
                .ok_or_else(|| SessionError::UnknownProvider(name.clone()))?,
        };
        Ok(ContainerQuery::new(self.scope, self.provider_type, descriptor))
    }

    fn open<'p>(
        &self,
        provider: &'p dyn CryptoProvider,
        container: &str,
    ) -> Result<CryptoContext<'p>, CsputilError> {
        let query = self.query(provider)?;
        Ok(CryptoContext::open(
            provider,
            Some(container),
            query.provider.name(),
            query.provider_type,
            query.acquire_flags(),
        )?)
    }
}

/// Execute the parsed CLI command.
pub fn execute(cli: Cli) -> Result<(), CsputilError> {
    let config = Config::load(cli.config.as_deref())?;
    let provider = open_provider(&config)?;
    let target = Target::from_cli(&cli);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(cli.command, &config, &*provider, &target, &mut out)
}

fn run(
    command: Commands,
    config: &Config,
    provider: &dyn CryptoProvider,
    target: &Target,
    out: &mut dyn Write,
) -> Result<(), CsputilError> {
    match command {
        Commands::Types => cmd_types(provider, out),
        Commands::Providers => cmd_providers(provider, out),
        Commands::Containers => cmd_containers(provider, target, out),
        Commands::Show { container } => {
            cmd_show(provider, target, config.dump.key_layout(), &container, out)
        }
        Commands::Export {
            container,
            slot,
            blob,
            out: path,
        } => cmd_export(provider, target, &container, slot, blob, path, out),
        Commands::Sign {
            container,
            exchange,
            signature,
            alg,
            input_format,
            output_format,
            reverse,
            out: path,
            input,
        } => {
            let form = SignForm {
                exchange_key: exchange,
                signature_key: signature,
                algorithm: HashAlgorithm::ALL.iter().position(|a| *a == alg),
                input_format: index_of(&InputFormat::ALL, input_format),
                output_format: index_of(&OutputFormat::ALL, output_format),
                reverse,
                input,
            };
            cmd_sign(
                provider,
                target,
                config.dump.signature_layout(),
                &container,
                &form,
                path,
                out,
            )
        }
        Commands::Verify {
            container,
            slot,
            alg,
            input_format,
            signature_format,
            reversed,
            input,
            signature,
        } => {
            let request = VerifyRequest {
                key: slot,
                algorithm: alg,
                input_format,
                input,
                signature_format,
                reversed,
                signature,
            };
            cmd_verify(provider, target, &container, &request, out)
        }
    }
}

fn index_of<T: PartialEq>(all: &[T], item: T) -> usize {
    all.iter().position(|x| *x == item).unwrap_or(all.len())
}

// ─── Listing ─────────────────────────────────────────────────────────────────

fn cmd_types(provider: &dyn CryptoProvider, out: &mut dyn Write) -> Result<(), CsputilError> {
    let types = list_provider_types(provider)?;
    let selected = default_provider_type_index(&types);
    for (i, entry) in types.iter().enumerate() {
        let marker = if i == selected { '*' } else { ' ' };
        writeln!(out, "{} {}", marker, entry)?;
    }
    Ok(())
}

fn cmd_providers(provider: &dyn CryptoProvider, out: &mut dyn Write) -> Result<(), CsputilError> {
    for entry in list_providers(provider)? {
        writeln!(out, "  {}", entry)?;
    }
    Ok(())
}

fn cmd_containers(
    provider: &dyn CryptoProvider,
    target: &Target,
    out: &mut dyn Write,
) -> Result<(), CsputilError> {
    let query = target.query(provider)?;
    let mut session = Session::new(provider, DumpLayout::KEY);
    let snapshot = session.list_containers(query)?;

    if snapshot.is_empty() {
        writeln!(out, "No containers in the {} key store.", target.scope)?;
        return Ok(());
    }
    for name in snapshot.names() {
        writeln!(out, "{}", name)?;
    }
    Ok(())
}

// ─── Keys ────────────────────────────────────────────────────────────────────

/// Display order of the key table.
const SHOW_ORDER: [KeyIndex; 4] = [
    KeyIndex::ExchangePublic,
    KeyIndex::ExchangePrivate,
    KeyIndex::SignaturePublic,
    KeyIndex::SignaturePrivate,
];

fn cmd_show(
    provider: &dyn CryptoProvider,
    target: &Target,
    layout: DumpLayout,
    container: &str,
    out: &mut dyn Write,
) -> Result<(), CsputilError> {
    let query = target.query(provider)?;
    let mut session = Session::new(provider, layout);
    if let ContainerReport::AcquireFailed(e) = session.open_container(&query, container) {
        return Err((*e).into());
    }

    writeln!(out, "Container: {} ({} key store)", container, target.scope)?;
    for index in SHOW_ORDER {
        writeln!(out)?;
        writeln!(out, "[{}]", index)?;
        let text = session.describe(index);
        write!(out, "{}", text)?;
        if !text.ends_with('\n') {
            writeln!(out)?;
        }
    }
    Ok(())
}

fn cmd_export(
    provider: &dyn CryptoProvider,
    target: &Target,
    container: &str,
    slot: KeySelection,
    kind: BlobKind,
    path: Option<PathBuf>,
    out: &mut dyn Write,
) -> Result<(), CsputilError> {
    let query = target.query(provider)?;
    let mut session = Session::new(provider, DumpLayout::KEY);
    if let ContainerReport::AcquireFailed(e) = session.open_container(&query, container) {
        return Err((*e).into());
    }

    let index = KeyIndex::new(slot.spec(), kind);
    if session.key(index).is_none() {
        let reason = session.describe(index);
        return Err(SessionError::KeyUnavailable { index, reason }.into());
    }
    let path = path.unwrap_or_else(|| PathBuf::from(index.default_file_name()));
    session.save_key(index, &path)?;

    let size = session.key(index).map(|blob| blob.len()).unwrap_or_default();
    writeln!(out, "✓ Saved the {} ({} bytes) to {}", index, size, path.display())?;
    Ok(())
}

// ─── Signing ─────────────────────────────────────────────────────────────────

fn cmd_sign(
    provider: &dyn CryptoProvider,
    target: &Target,
    layout: DumpLayout,
    container: &str,
    form: &SignForm,
    path: Option<PathBuf>,
    out: &mut dyn Write,
) -> Result<(), CsputilError> {
    let context = target.open(provider, container)?;
    let pipeline = SigningPipeline::new(&context).with_layout(layout);

    let output = pipeline.run(form).ok_or(SignError::KeySelection)??;

    write!(out, "{}", output.text)?;
    if !output.text.ends_with('\n') {
        writeln!(out)?;
    }
    if let Some(path) = path {
        output.signature.save(&path)?;
    }
    Ok(())
}

fn cmd_verify(
    provider: &dyn CryptoProvider,
    target: &Target,
    container: &str,
    request: &VerifyRequest,
    out: &mut dyn Write,
) -> Result<(), CsputilError> {
    let context = target.open(provider, container)?;
    if SigningPipeline::new(&context).verify(request)? {
        writeln!(out, "✓ Signature is valid")?;
        Ok(())
    } else {
        Err(SignError::SignatureMismatch.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    fn user() -> Target {
        Target {
            scope: Scope::User,
            provider_type: 0,
            provider: None,
        }
    }

    fn output(f: impl FnOnce(&mut Vec<u8>) -> Result<(), CsputilError>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn sign_form(input: &str, output_format: usize) -> SignForm {
        SignForm {
            signature_key: true,
            output_format,
            reverse: true,
            input: input.to_string(),
            ..SignForm::default()
        }
    }

    #[test]
    fn test_types_marks_default_selection() {
        let provider = testing::soft_provider();
        let text = output(|out| cmd_types(&provider, out));
        assert_eq!(
            text,
            "  (Default)\n  RSA Full (Signature and Key Exchange)  (type: 1)\n* RSA Full and AES  (type: 24)\n"
        );
    }

    #[test]
    fn test_containers_sorted() {
        let provider = testing::soft_provider();
        let text = output(|out| cmd_containers(&provider, &user(), out));
        assert_eq!(text, "Signing-Only\narchive\ncsputil-full\n");

        let machine = Target {
            scope: Scope::Machine,
            ..user()
        };
        let text = output(|out| cmd_containers(&provider, &machine, out));
        assert_eq!(text, "machine-keys\n");
    }

    #[test]
    fn test_unknown_provider_name() {
        let provider = testing::soft_provider();
        let target = Target {
            provider: Some("Nope".to_string()),
            ..user()
        };
        let mut out = Vec::new();
        let err = cmd_containers(&provider, &target, &mut out).unwrap_err();
        assert!(matches!(
            err,
            CsputilError::Session(SessionError::UnknownProvider(ref name)) if name == "Nope"
        ));
    }

    #[test]
    fn test_show_reports_each_blob() {
        let provider = testing::soft_provider();
        let text = output(|out| {
            cmd_show(
                &provider,
                &user(),
                DumpLayout::KEY,
                testing::SIGNATURE_ONLY_CONTAINER,
                out,
            )
        });
        assert!(text.starts_with("Container: Signing-Only (user key store)\n"));
        assert!(text.contains("[exchange public key]\nNo key\n"));
        assert!(text.contains("[signature public key]\nTotal: 148 (=0x94) bytes\r\n"));
        assert!(text.ends_with("[signature private key]\nFailed to export the key - 8009000b\n"));
    }

    #[test]
    fn test_show_unknown_container_fails() {
        let provider = testing::soft_provider();
        let mut out = Vec::new();
        let err = cmd_show(&provider, &user(), DumpLayout::KEY, "missing", &mut out).unwrap_err();
        assert!(err.to_string().ends_with("Failed to acquire the container - 80090016"));
    }

    #[test]
    fn test_export_writes_file() {
        let provider = testing::soft_provider();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key.bin");
        let text = output(|out| {
            cmd_export(
                &provider,
                &user(),
                testing::FULL_CONTAINER,
                KeySelection::Exchange,
                BlobKind::Private,
                Some(path.clone()),
                out,
            )
        });
        assert!(text.contains("exchange private key (596 bytes)"));
        assert_eq!(std::fs::read(&path).unwrap()[0], 0x07);
    }

    #[test]
    fn test_export_non_exportable_fails() {
        let provider = testing::soft_provider();
        let dir = tempfile::tempdir().unwrap();
        let mut out = Vec::new();
        let err = cmd_export(
            &provider,
            &user(),
            testing::SIGNATURE_ONLY_CONTAINER,
            KeySelection::Signature,
            BlobKind::Private,
            Some(dir.path().join("sig_pri")),
            &mut out,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CsputilError::Session(SessionError::KeyUnavailable { index: KeyIndex::SignaturePrivate, .. })
        ));
        assert!(err
            .to_string()
            .ends_with("signature private key: Failed to export the key - 8009000b"));
    }

    #[test]
    fn test_sign_base64_and_save() {
        let provider = testing::soft_provider();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sig.bin");
        let text = output(|out| {
            cmd_sign(
                &provider,
                &user(),
                DumpLayout::SIGNATURE,
                testing::FULL_CONTAINER,
                &sign_form("hello", 1),
                Some(path.clone()),
                out,
            )
        });
        assert!(text.starts_with("iQg5NC0dfoiTV/nW"));
        assert!(text.ends_with("\r\n"));
        assert_eq!(
            hex::encode(std::fs::read(&path).unwrap()),
            testing::HELLO_SHA256_SIGNATURE_BE
        );
    }

    #[test]
    fn test_sign_requires_one_key() {
        let provider = testing::soft_provider();
        let mut form = sign_form("hello", 0);
        form.exchange_key = true;
        let mut out = Vec::new();
        let err = cmd_sign(
            &provider,
            &user(),
            DumpLayout::SIGNATURE,
            testing::FULL_CONTAINER,
            &form,
            None,
            &mut out,
        )
        .unwrap_err();
        assert!(matches!(err, CsputilError::Sign(SignError::KeySelection)));
        assert!(out.is_empty());
    }

    #[test]
    fn test_verify_command() {
        let provider = testing::soft_provider();
        let mut request = VerifyRequest {
            key: KeySelection::Signature,
            algorithm: HashAlgorithm::Sha256,
            input_format: InputFormat::Utf8,
            input: "hello".to_string(),
            signature_format: OutputFormat::Hex,
            reversed: true,
            signature: testing::HELLO_SHA256_SIGNATURE_BE.to_string(),
        };
        let text = output(|out| {
            cmd_verify(&provider, &user(), testing::FULL_CONTAINER, &request, out)
        });
        assert_eq!(text, "✓ Signature is valid\n");

        request.reversed = false;
        let mut out = Vec::new();
        let err = cmd_verify(&provider, &user(), testing::FULL_CONTAINER, &request, &mut out)
            .unwrap_err();
        assert!(matches!(err, CsputilError::Sign(SignError::SignatureMismatch)));
    }

    #[test]
    fn test_index_of() {
        assert_eq!(index_of(&OutputFormat::ALL, OutputFormat::Base64), 1);
        assert_eq!(index_of(&InputFormat::ALL, InputFormat::Utf8), 0);
    }
}
