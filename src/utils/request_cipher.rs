use base64::{engine::general_purpose::STANDARD, Engine};
use rsa::pkcs8::{EncodePublicKey, LineEnding};
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use serde::de::DeserializeOwned;
use sha2::Sha256;

use crate::middleware::error::{AppError, AppResult};

/// RSA keypair used by clients to encrypt login and register payloads.
/// Ciphertext is RSA-OAEP with SHA-256 for both the digest and MGF1.
pub struct RequestCipher {
    private_key: RsaPrivateKey,
    public_key_pem: String,
}

impl RequestCipher {
    pub fn new(bits: usize) -> AppResult<Self> {
        let mut rng = rand::thread_rng();
        let private_key = RsaPrivateKey::new(&mut rng, bits).map_err(|e| AppError::Generic {
            description: format!("RSA key generation failed: {e}"),
        })?;
        let public_key_pem = RsaPublicKey::from(&private_key)
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| AppError::Generic {
                description: format!("RSA public key encoding failed: {e}"),
            })?;
        Ok(Self {
            private_key,
            public_key_pem,
        })
    }

    /// SubjectPublicKeyInfo PEM.
    pub fn public_key_pem(&self) -> &str {
        &self.public_key_pem
    }

    pub fn decrypt(&self, encrypted_b64: &str) -> AppResult<Vec<u8>> {
        let ciphertext = STANDARD
            .decode(encrypted_b64.trim())
            .map_err(|e| AppError::RequestDecrypt {
                source: e.to_string(),
            })?;
        self.private_key
            .decrypt(Oaep::new::<Sha256>(), &ciphertext)
            .map_err(|e| AppError::RequestDecrypt {
                source: e.to_string(),
            })
    }

    pub fn decrypt_json<T: DeserializeOwned>(&self, encrypted_b64: &str) -> AppResult<T> {
        let plain = self.decrypt(encrypted_b64)?;
        serde_json::from_slice(&plain).map_err(|e| AppError::RequestDecrypt {
            source: e.to_string(),
        })
    }

    #[cfg(test)]
    pub fn encrypt_for_test(&self, plain: &[u8]) -> String {
        let public_key = RsaPublicKey::from(&self.private_key);
        let ciphertext = public_key
            .encrypt(&mut rand::thread_rng(), Oaep::new::<Sha256>(), plain)
            .unwrap();
        STANDARD.encode(ciphertext)
    }
}
