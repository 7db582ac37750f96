use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit},
};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::{Codec, Error, Result};

const NONCE_SIZE: usize = 24;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct FileUrlRef {
    #[serde(rename = "f")]
    pub file_id: String,
    #[serde(rename = "u")]
    pub slack_user_id: String,
}

impl FileUrlRef {
    pub fn new(file_id: impl Into<String>, slack_user_id: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            slack_user_id: slack_user_id.into(),
        }
    }
}

/// XChaCha20-Poly1305 over the JSON payload, `nonce || ciphertext` in URL-safe base64.
pub struct FileUrlRefCodec {
    cipher: XChaCha20Poly1305,
}

impl FileUrlRefCodec {
    pub fn new(key: [u8; 32]) -> Self {
        Self {
            cipher: XChaCha20Poly1305::new(&key.into()),
        }
    }

    pub fn generate_key() -> [u8; 32] {
        let mut key = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut key);
        key
    }

    pub fn encode(&self, file_ref: &FileUrlRef) -> Result<String> {
        let payload = serde_json::to_vec(file_ref)?;

        let mut nonce = [0u8; NONCE_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut nonce);
        let ciphertext = self
            .cipher
            .encrypt(XNonce::from_slice(&nonce), payload.as_slice())
            .map_err(|_| Error::NotEncrypted)?;

        let mut token = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        token.extend_from_slice(&nonce);
        token.extend_from_slice(&ciphertext);
        Ok(URL_SAFE_NO_PAD.encode(token))
    }

    pub fn decode(&self, token: &str) -> Result<FileUrlRef> {
        let data = URL_SAFE_NO_PAD.decode(token)?;
        if data.len() <= NONCE_SIZE {
            return Err(Error::Malformed);
        }

        let (nonce, ciphertext) = data.split_at(NONCE_SIZE);
        let payload = self
            .cipher
            .decrypt(XNonce::from_slice(nonce), ciphertext)
            .map_err(|_| Error::Malformed)?;

        serde_json::from_slice(&payload).map_err(Error::from)
    }
}

#[derive(Clone)]
pub struct ThumbnailLinks {
    codec: Codec,
    base_url: String,
    slack_user_id: String,
}

impl ThumbnailLinks {
    pub fn new(codec: Codec, base_url: &str, slack_user_id: impl Into<String>) -> Self {
        Self {
            codec,
            base_url: base_url.trim_end_matches('/').to_string(),
            slack_user_id: slack_user_id.into(),
        }
    }

    pub fn url(&self, file_id: &str) -> Result<String> {
        let token = self
            .codec
            .encode(&FileUrlRef::new(file_id, self.slack_user_id.as_str()))?;
        Ok(format!("{}/archive/file-thumbnail/{token}", self.base_url))
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use super::*;

    fn codec() -> FileUrlRefCodec {
        FileUrlRefCodec::new([7u8; 32])
    }

    #[test]
    fn should_round_trip_ref() {
        let codec = codec();
        let file_ref = FileUrlRef::new("F123", "U456");

        let token = codec.encode(&file_ref).unwrap();

        assert_eq!(codec.decode(&token).unwrap(), file_ref);
    }

    #[test]
    fn should_produce_url_safe_tokens() {
        let token = codec().encode(&FileUrlRef::new("F1", "U1")).unwrap();

        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn should_use_fresh_nonce_per_encoding() {
        let codec = codec();
        let file_ref = FileUrlRef::new("F1", "U1");

        assert_ne!(
            codec.encode(&file_ref).unwrap(),
            codec.encode(&file_ref).unwrap()
        );
    }

    #[test]
    fn should_reject_tampered_token() {
        let codec = codec();
        let token = codec.encode(&FileUrlRef::new("F1", "U1")).unwrap();

        let mut bytes = URL_SAFE_NO_PAD.decode(&token).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        let tampered = URL_SAFE_NO_PAD.encode(bytes);

        assert!(matches!(codec.decode(&tampered), Err(Error::Malformed)));
    }

    #[test]
    fn should_reject_garbage_without_panicking() {
        let codec = codec();

        assert!(codec.decode("not*base64").is_err());
        assert!(matches!(codec.decode("c2hvcnQ"), Err(Error::Malformed)));
        assert!(codec.decode("").is_err());
    }

    #[test]
    fn should_reject_token_from_another_key() {
        let token = FileUrlRefCodec::new([1u8; 32])
            .encode(&FileUrlRef::new("F1", "U1"))
            .unwrap();

        assert!(codec().decode(&token).is_err());
    }

    #[test]
    fn should_build_proxy_url() {
        let codec: Codec = Arc::new(codec());
        let links = ThumbnailLinks::new(codec.clone(), "https://archive.example/", "U9");

        let url = links.url("F1").unwrap();

        let token = url
            .strip_prefix("https://archive.example/archive/file-thumbnail/")
            .unwrap();
        assert_eq!(codec.decode(token).unwrap(), FileUrlRef::new("F1", "U9"));
    }
}
