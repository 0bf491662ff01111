//! Golden test vectors for the built-in schemes.
//!
//! Published test vectors (FIPS 180, RFC 4231, RFC 8032 and the BLAKE3
//! reference) pinned against the registry, so a scheme swap that changes
//! output is caught.

use nodeguard_crypto::{ids, CryptoRegistry, KeyMaterial};

/// Expected digest of `input` under `scheme`.
#[derive(Debug, Clone)]
pub struct HashVector {
    pub scheme: &'static str,
    pub input: &'static [u8],
    pub expected: &'static str,
}

/// Expected tag of `input` under `scheme` with `key`.
#[derive(Debug, Clone)]
pub struct MacVector {
    pub scheme: &'static str,
    pub key: &'static [u8],
    pub input: &'static [u8],
    pub expected: &'static str,
}

/// Expected deterministic signature of `message` by the key with `seed`.
#[derive(Debug, Clone)]
pub struct SignatureVector {
    pub scheme: &'static str,
    pub seed: &'static str,
    pub public_key: &'static str,
    pub message: &'static [u8],
    pub expected: &'static str,
}

/// Get all hash vectors.
pub fn hash_vectors() -> Vec<HashVector> {
    vec![
        HashVector {
            scheme: ids::SHA256,
            input: b"abc",
            expected: "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
        },
        HashVector {
            scheme: ids::SHA512,
            input: b"abc",
            expected: "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a\
                       2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f",
        },
        HashVector {
            scheme: ids::BLAKE3,
            input: b"abc",
            expected: "6437b3ac38465133ffb63b75273a8db548c558465d79db03fd359c6cd5bd9d85",
        },
        HashVector {
            scheme: ids::SHA256,
            input: b"",
            expected: "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
        },
    ]
}

/// Get all MAC vectors (RFC 4231 test case 2).
pub fn mac_vectors() -> Vec<MacVector> {
    vec![
        MacVector {
            scheme: ids::HMAC_SHA256,
            key: b"Jefe",
            input: b"what do ya want for nothing?",
            expected: "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843",
        },
        MacVector {
            scheme: ids::HMAC_SHA512,
            key: b"Jefe",
            input: b"what do ya want for nothing?",
            expected: "164b7a7bfcf819e2e395fbe73b56e0a387bd64222e831fd610270cd7ea250554\
                       9758bf75c05a994a6d034f65f8f0e6fdcaeab1a34d4a6b4b636e070a38bce737",
        },
    ]
}

/// Get all signature vectors (RFC 8032 test 1).
pub fn signature_vectors() -> Vec<SignatureVector> {
    vec![SignatureVector {
        scheme: ids::ED25519,
        seed: "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60",
        public_key: "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a",
        message: b"",
        expected: "e5564300c360ac729086e2cc806e828a84877f1eb8e5d974d873e06522490155\
                   5fb8821590a33bacc61e39701cf9b46bd25bf5f0595bbe24655141438e7a100b",
    }]
}

/// Decode a 32-byte hex seed or key.
pub fn key32(hex_str: &str) -> [u8; 32] {
    let bytes = hex::decode(hex_str).expect("valid hex");
    bytes.try_into().expect("32 bytes")
}

/// Check every vector against `registry`. Returns the names of failures.
pub fn check_all(registry: &CryptoRegistry) -> Vec<String> {
    let mut failures = Vec::new();

    for v in hash_vectors() {
        let scheme = registry.hash_scheme(v.scheme).expect("hash scheme registered");
        if hex::encode(scheme.hash(v.input)) != v.expected {
            failures.push(format!("hash {}", v.scheme));
        }
    }

    for v in mac_vectors() {
        let scheme = registry.mac_scheme(v.scheme).expect("mac scheme registered");
        let tag = scheme
            .mac(&KeyMaterial::secret(v.key.to_vec()), v.input)
            .expect("mac computes");
        if hex::encode(tag) != v.expected {
            failures.push(format!("mac {}", v.scheme));
        }
    }

    for v in signature_vectors() {
        let scheme = registry
            .signature_scheme(v.scheme)
            .expect("signature scheme registered");
        let key = KeyMaterial::ed25519_signing(key32(v.seed));
        if key.ed25519_public().map(hex::encode).as_deref() != Some(v.public_key) {
            failures.push(format!("public key {}", v.scheme));
        }
        let signature = scheme.sign(&key, v.message).expect("sign");
        if hex::encode(signature) != v.expected {
            failures.push(format!("signature {}", v.scheme));
        }
    }

    failures
}
