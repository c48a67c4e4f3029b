// Csputil — Test fixtures
//
// A software provider seeded with fixed RSA-1024 keys so that signatures are
// reproducible across runs.

use rsa::pkcs8::DecodePrivateKey;
use rsa::RsaPrivateKey;

use crate::provider::{KeySpec, Scope, SoftContainer, SoftKey, SoftProvider};

/// User container holding exportable exchange and signature keys; the default.
pub const FULL_CONTAINER: &str = "csputil-full";
/// User container holding only a non-exportable signature key.
pub const SIGNATURE_ONLY_CONTAINER: &str = "Signing-Only";
/// User container with both slots empty.
pub const EMPTY_CONTAINER: &str = "archive";
/// Machine container holding an exportable signature key.
pub const MACHINE_CONTAINER: &str = "machine-keys";

/// SHA256("hello") signed with the signature fixture, big-endian, as produced
/// by `openssl dgst -sha256 -sign`.
pub const HELLO_SHA256_SIGNATURE_BE: &str = "890839342d1d7e889357f9d60d278a16aaa2c4df71b793f4e6d9f1633067e2e3df9c037ccd98334a8b83608754ddc8b3289dd44db6722362199dc7ee07d1ba397568178f74102c0d0c119da10b8da5a7bcdc551b9bfc8bb9dd3b54743e14a55f056430b668f027193fb6fca52321bb80818fc93f05d37bfc6c6abee24bae2003";

const EXCHANGE_PEM: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/testdata/exchange_rsa1024.pem"
));
const SIGNATURE_PEM: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/testdata/signature_rsa1024.pem"
));

pub fn exchange_key() -> RsaPrivateKey {
    RsaPrivateKey::from_pkcs8_pem(EXCHANGE_PEM).expect("exchange fixture parses")
}

pub fn signature_key() -> RsaPrivateKey {
    RsaPrivateKey::from_pkcs8_pem(SIGNATURE_PEM).expect("signature fixture parses")
}

/// Provider with the four fixture containers. User containers are registered
/// out of lexicographic order.
pub fn soft_provider() -> SoftProvider {
    SoftProvider::new()
        .with_container(
            SoftContainer::new(FULL_CONTAINER, Scope::User)
                .with_key(KeySpec::Exchange, SoftKey::new(exchange_key(), true))
                .with_key(KeySpec::Signature, SoftKey::new(signature_key(), true))
                .as_default(),
        )
        .with_container(
            SoftContainer::new(SIGNATURE_ONLY_CONTAINER, Scope::User)
                .with_key(KeySpec::Signature, SoftKey::new(signature_key(), false)),
        )
        .with_container(SoftContainer::new(EMPTY_CONTAINER, Scope::User))
        .with_container(
            SoftContainer::new(MACHINE_CONTAINER, Scope::Machine)
                .with_key(KeySpec::Signature, SoftKey::new(signature_key(), true)),
        )
}
