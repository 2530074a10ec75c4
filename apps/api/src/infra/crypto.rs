use aes_gcm::{
    AesGcm, KeyInit,
    aead::{AeadInPlace, consts::U16, generic_array::GenericArray},
    aes::Aes256,
};

use crate::app_error::{AppError, AppResult};

/// AES-256-GCM with a 128-bit nonce, matching the stored envelope format.
type SettingsAead = AesGcm<Aes256, U16>;

const NONCE_LEN: usize = 16;
const TAG_LEN: usize = 16;
const KEY_HEX_LEN: usize = 64;

/// Field-level cipher for sensitive settings.
///
/// Stored form is `nonce:tag:ciphertext`, each lowercase hex.
#[derive(Clone)]
pub struct SettingsCipher {
    key: aes_gcm::Key<SettingsAead>,
}

struct Envelope {
    nonce: Vec<u8>,
    tag: Vec<u8>,
    ciphertext: Vec<u8>,
}

impl SettingsCipher {
    pub fn from_hex(key_hex: &str) -> AppResult<Self> {
        let key_hex = key_hex.trim();
        if key_hex.len() != KEY_HEX_LEN {
            return Err(AppError::Configuration(
                "SETTINGS_ENCRYPTION_KEY must be 64 hex characters (32 bytes)".into(),
            ));
        }
        let raw = hex::decode(key_hex).map_err(|e| {
            AppError::Configuration(format!("Invalid SETTINGS_ENCRYPTION_KEY: {e}"))
        })?;
        Ok(Self {
            key: GenericArray::clone_from_slice(&raw),
        })
    }

    pub fn encrypt(&self, plaintext: &str) -> AppResult<String> {
        let cipher = SettingsAead::new(&self.key);
        let nonce_bytes = rand::random::<[u8; NONCE_LEN]>();
        let nonce = GenericArray::from_slice(&nonce_bytes);
        let mut buffer = plaintext.as_bytes().to_vec();
        let tag = cipher
            .encrypt_in_place_detached(nonce, b"", &mut buffer)
            .map_err(|e| AppError::Internal(format!("encrypt failed: {e}")))?;
        Ok(format!(
            "{}:{}:{}",
            hex::encode(nonce_bytes),
            hex::encode(tag),
            hex::encode(buffer)
        ))
    }

    /// Fails with [`AppError::Decryption`] if the value is not a well-formed
    /// envelope (checked before any cipher work) or does not authenticate.
    pub fn decrypt(&self, stored: &str) -> AppResult<String> {
        let envelope = parse_envelope(stored)
            .ok_or_else(|| AppError::Decryption("value is not an encrypted envelope".into()))?;
        let cipher = SettingsAead::new(&self.key);
        let mut buffer = envelope.ciphertext;
        cipher
            .decrypt_in_place_detached(
                GenericArray::from_slice(&envelope.nonce),
                b"",
                &mut buffer,
                GenericArray::from_slice(&envelope.tag),
            )
            .map_err(|_| AppError::Decryption("authentication failed".into()))?;
        String::from_utf8(buffer).map_err(|e| AppError::Decryption(e.to_string()))
    }

    /// Shape check only; says nothing about which key produced the value.
    pub fn looks_encrypted(value: &str) -> bool {
        parse_envelope(value).is_some()
    }
}

fn parse_envelope(value: &str) -> Option<Envelope> {
    let mut parts = value.split(':');
    let (nonce, tag, ciphertext) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    if nonce.len() != NONCE_LEN * 2 || tag.len() != TAG_LEN * 2 || ciphertext.is_empty() {
        return None;
    }
    Some(Envelope {
        nonce: hex::decode(nonce).ok()?,
        tag: hex::decode(tag).ok()?,
        ciphertext: hex::decode(ciphertext).ok()?,
    })
}
