// Csputil — Signer Module
//
// Signs a digest with a provider-held key of the open container. The digest
// is either computed from UTF-8 plaintext or supplied directly in hex or
// Base64; the signature comes back as a hex dump or framed Base64.

mod error;
mod form;
mod pipeline;

pub use error::SignError;
pub use form::{InputFormat, KeySelection, OutputFormat, SignForm, SignRequest, VerifyRequest};
pub use pipeline::{SignedOutput, SigningPipeline};
