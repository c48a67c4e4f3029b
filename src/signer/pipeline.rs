// Csputil — Signing pipeline
//
// One pass per invocation: create the hash on the active context, resolve
// the digest from the input, inject it, sign with the chosen key slot,
// optionally reverse the bytes, then encode. The first failing stage ends
// the pass.

use crate::blob::{Blob, DumpLayout};
use crate::csp::CryptoContext;
use crate::provider::{
    CryptoProvider, HashAlgorithm, ProviderError, CRYPT_VERIFYCONTEXT, PROV_RSA_AES,
};

use super::{InputFormat, KeySelection, OutputFormat, SignError, SignForm, SignRequest, VerifyRequest};

/// A produced signature and its rendering.
#[derive(Debug)]
pub struct SignedOutput {
    pub signature: Blob,
    pub text: String,
}

/// Signs digests with the keys of one acquired container.
pub struct SigningPipeline<'c, 'p> {
    context: &'c CryptoContext<'p>,
    layout: DumpLayout,
}

impl<'c, 'p> SigningPipeline<'c, 'p> {
    pub fn new(context: &'c CryptoContext<'p>) -> Self {
        Self {
            context,
            layout: DumpLayout::SIGNATURE,
        }
    }

    /// Geometry of the hex rendering.
    pub fn with_layout(mut self, layout: DumpLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Run the pipeline for a raw form.
    ///
    /// Returns `None` without doing anything when no container is open, when
    /// not exactly one key is selected, or when no valid algorithm is.
    pub fn run(&self, form: &SignForm) -> Option<Result<SignedOutput, SignError>> {
        if !self.context.is_acquired() {
            return None;
        }
        let key = KeySelection::from_flags(form.exchange_key, form.signature_key)?;
        let algorithm = form.algorithm.and_then(HashAlgorithm::from_index)?;
        Some(self.execute(
            key,
            algorithm,
            InputFormat::from_index(form.input_format),
            OutputFormat::from_index(form.output_format),
            form.reverse,
            &form.input,
        ))
    }

    pub fn sign(&self, request: &SignRequest) -> Result<SignedOutput, SignError> {
        self.execute(
            request.key,
            request.algorithm,
            Some(request.input_format),
            Some(request.output_format),
            request.reverse,
            &request.input,
        )
    }

    fn execute(
        &self,
        key: KeySelection,
        algorithm: HashAlgorithm,
        input_format: Option<InputFormat>,
        output_format: Option<OutputFormat>,
        reverse: bool,
        input: &str,
    ) -> Result<SignedOutput, SignError> {
        let mut hash = self
            .context
            .create_hash(algorithm)
            .map_err(SignError::CreateHash)?;

        let digest = match input_format {
            Some(format) => resolve_digest(self.context.provider(), format, algorithm, input)?,
            None => return Err(SignError::InvalidHashValue(None)),
        };
        hash.set_digest(digest.as_bytes())
            .map_err(|e| SignError::InvalidHashValue(Some(e)))?;

        let mut signature = hash.sign(key.spec()).map_err(SignError::Signing)?;
        if reverse {
            signature.reverse();
        }

        let text = match output_format {
            Some(OutputFormat::Hex) => signature.dump_with(self.layout),
            Some(OutputFormat::Base64) => signature.to_base64(),
            None => return Err(SignError::InvalidFormat),
        };
        tracing::info!(
            "Signed a {} digest with the {} key ({} bytes)",
            algorithm,
            key.spec(),
            signature.len()
        );
        Ok(SignedOutput { signature, text })
    }

    /// Check a signature against the public key of the selected slot.
    pub fn verify(&self, request: &VerifyRequest) -> Result<bool, SignError> {
        let public_key = self
            .context
            .user_key(request.key.spec())
            .map_err(SignError::GetKey)?;
        let mut hash = self
            .context
            .create_hash(request.algorithm)
            .map_err(SignError::CreateHash)?;

        let digest = resolve_digest(
            self.context.provider(),
            request.input_format,
            request.algorithm,
            &request.input,
        )?;
        hash.set_digest(digest.as_bytes())
            .map_err(|e| SignError::InvalidHashValue(Some(e)))?;

        let mut signature = match request.signature_format {
            OutputFormat::Hex => Blob::from_hex(&request.signature),
            OutputFormat::Base64 => Blob::from_base64(&request.signature),
        }
        .map_err(|_| SignError::InvalidSignature)?;
        if signature.is_empty() {
            return Err(SignError::InvalidSignature);
        }
        if request.reversed {
            signature.reverse();
        }

        hash.verify(signature.as_bytes(), &public_key)
            .map_err(SignError::Verification)
    }
}

/// The digest to sign: the input itself for Hex/Base64, or the hash of the
/// input text for UTF-8.
fn resolve_digest(
    provider: &dyn CryptoProvider,
    format: InputFormat,
    algorithm: HashAlgorithm,
    input: &str,
) -> Result<Blob, SignError> {
    let digest = match format {
        InputFormat::Utf8 => {
            let text = Blob::from_utf8(input).map_err(|_| SignError::InvalidHashValue(None))?;
            hash_plaintext(provider, algorithm, &text).map_err(|e| SignError::InvalidHashValue(Some(e)))?
        }
        InputFormat::Hex => Blob::from_hex(input).map_err(|_| SignError::InvalidHashValue(None))?,
        InputFormat::Base64 => {
            Blob::from_base64(input).map_err(|_| SignError::InvalidHashValue(None))?
        }
    };
    tracing::debug!("Resolved a {}-byte digest from {}", digest.len(), format);
    Ok(digest)
}

/// Hash `data` in a throwaway verify-only context, independent of any
/// open container.
fn hash_plaintext(
    provider: &dyn CryptoProvider,
    algorithm: HashAlgorithm,
    data: &Blob,
) -> Result<Blob, ProviderError> {
    let context = CryptoContext::open(provider, None, None, PROV_RSA_AES, CRYPT_VERIFYCONTEXT)?;
    let mut hash = context.create_hash(algorithm)?;
    hash.add_data(data.as_bytes())?;
    let digest = hash.digest()?;
    Ok(digest)
}
