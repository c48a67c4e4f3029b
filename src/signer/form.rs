// Csputil — Signing inputs
//
// `SignForm` mirrors what an interactive front end collects: two key
// toggles and list indices. `SignRequest` is the validated, typed form.

use std::fmt;

use crate::provider::{HashAlgorithm, KeySpec};

/// The key slot a signature is made with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum KeySelection {
    Exchange,
    Signature,
}

impl KeySelection {
    /// Exactly one of the two toggles must be set.
    pub fn from_flags(use_exchange: bool, use_signature: bool) -> Option<Self> {
        match (use_exchange, use_signature) {
            (true, false) => Some(KeySelection::Exchange),
            (false, true) => Some(KeySelection::Signature),
            _ => None,
        }
    }

    pub fn spec(&self) -> KeySpec {
        match self {
            KeySelection::Exchange => KeySpec::Exchange,
            KeySelection::Signature => KeySpec::Signature,
        }
    }
}

/// How the input text is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum InputFormat {
    /// Plaintext, hashed before signing.
    Utf8,
    /// A precomputed digest in hex.
    Hex,
    /// A precomputed digest in Base64.
    Base64,
}

impl InputFormat {
    pub const ALL: [InputFormat; 3] = [InputFormat::Utf8, InputFormat::Hex, InputFormat::Base64];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn label(&self) -> &'static str {
        match self {
            InputFormat::Utf8 => "Plaintext in UTF-8",
            InputFormat::Hex => "Hash in Hexstring",
            InputFormat::Base64 => "Hash in Base64-encode",
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How the signature is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Hex,
    Base64,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 2] = [OutputFormat::Hex, OutputFormat::Base64];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn label(&self) -> &'static str {
        match self {
            OutputFormat::Hex => "Hexstring",
            OutputFormat::Base64 => "Base64-encode",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw selections as an interactive front end holds them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignForm {
    pub exchange_key: bool,
    pub signature_key: bool,
    /// Index into [`HashAlgorithm::ALL`]; `None` when nothing is selected.
    pub algorithm: Option<usize>,
    /// Index into [`InputFormat::ALL`].
    pub input_format: usize,
    /// Index into [`OutputFormat::ALL`].
    pub output_format: usize,
    pub reverse: bool,
    pub input: String,
}

impl Default for SignForm {
    fn default() -> Self {
        Self {
            exchange_key: false,
            signature_key: false,
            algorithm: Some(HashAlgorithm::DEFAULT_INDEX),
            input_format: 0,
            output_format: 0,
            reverse: false,
            input: String::new(),
        }
    }
}

/// A fully specified signing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignRequest {
    pub key: KeySelection,
    pub algorithm: HashAlgorithm,
    pub input_format: InputFormat,
    pub output_format: OutputFormat,
    /// Reverse the signature bytes before encoding.
    pub reverse: bool,
    pub input: String,
}

/// A signature check against a provider-held public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyRequest {
    pub key: KeySelection,
    pub algorithm: HashAlgorithm,
    pub input_format: InputFormat,
    pub input: String,
    /// Encoding of `signature`: Base64 or bare hex digits.
    pub signature_format: OutputFormat,
    /// The signature text is most significant byte first.
    pub reversed: bool,
    pub signature: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_selection_requires_exactly_one() {
        assert_eq!(KeySelection::from_flags(true, false), Some(KeySelection::Exchange));
        assert_eq!(KeySelection::from_flags(false, true), Some(KeySelection::Signature));
        assert_eq!(KeySelection::from_flags(true, true), None);
        assert_eq!(KeySelection::from_flags(false, false), None);
    }

    #[test]
    fn test_format_indices() {
        assert_eq!(InputFormat::from_index(0), Some(InputFormat::Utf8));
        assert_eq!(InputFormat::from_index(2), Some(InputFormat::Base64));
        assert_eq!(InputFormat::from_index(3), None);
        assert_eq!(OutputFormat::from_index(1), Some(OutputFormat::Base64));
        assert_eq!(OutputFormat::from_index(2), None);
        assert_eq!(InputFormat::Hex.to_string(), "Hash in Hexstring");
    }

    #[test]
    fn test_default_form_selects_sha256() {
        let form = SignForm::default();
        assert_eq!(
            form.algorithm.and_then(HashAlgorithm::from_index),
            Some(HashAlgorithm::Sha256)
        );
    }
}
