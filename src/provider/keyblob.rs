// Csputil — CryptoAPI RSA key blob layout
//
// PUBLICKEYBLOB:  BLOBHEADER | RSAPUBKEY("RSA1") | modulus
// PRIVATEKEYBLOB: BLOBHEADER | RSAPUBKEY("RSA2") | modulus | prime1 | prime2
//                 | exponent1 | exponent2 | coefficient | privateExponent
//
// All integers are little-endian. Modulus and private exponent take bitlen/8
// bytes, the CRT components bitlen/16.

use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{BigUint, RsaPrivateKey};

use super::{codes, BlobKind, ErrorKind, KeySpec, ProviderError};

const CUR_BLOB_VERSION: u8 = 2;
const CALG_RSA_SIGN: u32 = 0x0000_2400;
const CALG_RSA_KEYX: u32 = 0x0000_a400;
/// "RSA1"
const MAGIC_PUBLIC: u32 = 0x3141_5352;
/// "RSA2"
const MAGIC_PRIVATE: u32 = 0x3241_5352;

/// Encode `key` in the requested CryptoAPI blob layout.
pub fn encode(key: &RsaPrivateKey, spec: KeySpec, kind: BlobKind) -> Result<Vec<u8>, ProviderError> {
    let modulus_len = key.size();
    let half_len = modulus_len.div_ceil(2);
    let public_exponent = exponent_u32(key.e())?;

    let mut blob = Vec::with_capacity(20 + modulus_len * 2 + half_len * 5);
    blob.push(kind.as_raw() as u8);
    blob.push(CUR_BLOB_VERSION);
    blob.extend_from_slice(&0u16.to_le_bytes());
    blob.extend_from_slice(&key_algorithm(spec).to_le_bytes());

    let magic = match kind {
        BlobKind::Public => MAGIC_PUBLIC,
        BlobKind::Private => MAGIC_PRIVATE,
    };
    blob.extend_from_slice(&magic.to_le_bytes());
    blob.extend_from_slice(&((modulus_len * 8) as u32).to_le_bytes());
    blob.extend_from_slice(&public_exponent.to_le_bytes());
    push_le(&mut blob, key.n(), modulus_len);

    if kind == BlobKind::Private {
        let [p, q] = key.primes() else {
            tracing::warn!("Multi-prime RSA keys cannot be expressed as PRIVATEKEYBLOB");
            return Err(ProviderError::new(ErrorKind::KeyExport, codes::NTE_BAD_KEY));
        };
        let one = BigUint::from(1u32);
        let two = BigUint::from(2u32);
        let d = key.d();
        let exponent1 = d % &(p - &one);
        let exponent2 = d % &(q - &one);
        // q^-1 mod p, by Fermat since p is prime.
        let coefficient = q.modpow(&(p - &two), p);

        push_le(&mut blob, p, half_len);
        push_le(&mut blob, q, half_len);
        push_le(&mut blob, &exponent1, half_len);
        push_le(&mut blob, &exponent2, half_len);
        push_le(&mut blob, &coefficient, half_len);
        push_le(&mut blob, d, modulus_len);
    }

    Ok(blob)
}

fn key_algorithm(spec: KeySpec) -> u32 {
    match spec {
        KeySpec::Exchange => CALG_RSA_KEYX,
        KeySpec::Signature => CALG_RSA_SIGN,
    }
}

fn exponent_u32(e: &BigUint) -> Result<u32, ProviderError> {
    let bytes = e.to_bytes_le();
    if bytes.len() > 4 {
        tracing::warn!("Public exponent does not fit RSAPUBKEY.pubexp");
        return Err(ProviderError::new(ErrorKind::KeyExport, codes::NTE_BAD_KEY));
    }
    let mut raw = [0u8; 4];
    raw[..bytes.len()].copy_from_slice(&bytes);
    Ok(u32::from_le_bytes(raw))
}

fn push_le(out: &mut Vec<u8>, value: &BigUint, len: usize) {
    let mut bytes = value.to_bytes_le();
    bytes.resize(len, 0);
    out.extend_from_slice(&bytes);
}
