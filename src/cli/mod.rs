// Csputil — CLI Module
//
// Command-line interface using clap derive macros.
// Subcommands: types, providers, containers, show, export, sign, verify.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::provider::{BlobKind, HashAlgorithm};
use crate::signer::{InputFormat, KeySelection, OutputFormat};

pub use commands::execute;

/// Csputil — inspect CryptoAPI key containers, export key blobs and sign
/// digests with provider-held keys.
#[derive(Parser, Debug)]
#[command(name = "csputil")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (TOML).
    #[arg(long, global = true, env = "CSPUTIL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Use the local machine key store instead of the current user's.
    #[arg(long, global = true)]
    pub machine: bool,

    /// Provider type id. 0 lets the provider choose.
    #[arg(long = "type", global = true, default_value_t = 0)]
    pub provider_type: u32,

    /// Provider name, as listed by `csputil providers`.
    #[arg(long, global = true)]
    pub provider: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the registered provider types.
    Types,

    /// List the registered providers.
    Providers,

    /// List the key containers of the selected key store, sorted by name.
    Containers,

    /// Open a container and dump the public and private blobs of both key slots.
    Show {
        /// The container name.
        container: String,
    },

    /// Export one key blob of a container to a file.
    Export {
        /// The container name.
        container: String,

        /// Which key slot to export.
        #[arg(long, value_enum)]
        slot: KeySelection,

        /// Public or private key blob.
        #[arg(long, value_enum, default_value = "public")]
        blob: BlobKind,

        /// Output file (default: exchg_pub, exchg_pri, sig_pub or sig_pri).
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Sign a digest with a key of a container.
    Sign {
        /// The container name.
        container: String,

        /// Sign with the key exchange key.
        #[arg(long)]
        exchange: bool,

        /// Sign with the signature key.
        #[arg(long)]
        signature: bool,

        /// Hash algorithm.
        #[arg(long, value_enum, default_value = "sha256")]
        alg: HashAlgorithm,

        /// utf8: plaintext to hash; hex / base64: a precomputed digest.
        #[arg(long, value_enum, default_value = "utf8")]
        input_format: InputFormat,

        /// hex: hex dump; base64: Base64 with CRLF every 64 characters.
        #[arg(long, value_enum, default_value = "hex")]
        output_format: OutputFormat,

        /// Reverse the signature bytes (CryptoAPI signatures are little-endian).
        #[arg(long)]
        reverse: bool,

        /// Also write the raw signature bytes to this file.
        #[arg(long)]
        out: Option<PathBuf>,

        /// The plaintext or digest.
        input: String,
    },

    /// Verify a signature with the public key of a container.
    Verify {
        /// The container name.
        container: String,

        /// Which key slot's public key to verify with.
        #[arg(long, value_enum, default_value = "signature")]
        slot: KeySelection,

        /// Hash algorithm.
        #[arg(long, value_enum, default_value = "sha256")]
        alg: HashAlgorithm,

        /// utf8: plaintext to hash; hex / base64: a precomputed digest.
        #[arg(long, value_enum, default_value = "utf8")]
        input_format: InputFormat,

        /// Encoding of the signature: bare hex digits or Base64.
        #[arg(long, value_enum, default_value = "base64")]
        signature_format: OutputFormat,

        /// The signature is most significant byte first.
        #[arg(long)]
        reversed: bool,

        /// The plaintext or digest.
        input: String,

        /// The signature.
        signature: String,
    },
}
