//! Segment decryption.
//!
//! Key and IV acquisition is shared; the transform is picked per `METHOD`
//! tag of the manifest key through [`cipher_for_method`].

use crate::http;
use aes::Aes128;
use cbc::cipher::block_padding::NoPadding;
use cbc::cipher::{BlockDecryptMut, KeyIvInit, StreamCipher};
use reqwest::Client;
use showtape_common::{Error, Result};

/// AES-128 key and IV length.
pub const KEY_LEN: usize = 16;

pub type Key = [u8; KEY_LEN];
pub type Iv = [u8; KEY_LEN];

/// Fetch a key and keep exactly its first 16 bytes.
pub async fn fetch_key(client: &Client, key_url: &str) -> Result<Key> {
    let response = http::send(client.get(key_url)).await?;
    let body = response.bytes().await.map_err(Error::transport)?;

    let key: Key = body
        .get(..KEY_LEN)
        .and_then(|head| head.try_into().ok())
        .ok_or(Error::ShortKey { got: body.len() })?;
    Ok(key)
}

/// Decode a manifest IV such as `0x000102030405060708090a0b0c0d0e0f`.
///
/// The first two characters are dropped whatever they are.
pub fn parse_iv(tag: &str) -> Result<Iv> {
    let digits = tag
        .get(2..)
        .ok_or_else(|| Error::parse(format!("IV too short: {tag}")))?;
    let bytes = hex::decode(digits).map_err(|e| Error::parse(format!("invalid IV {tag}: {e}")))?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| Error::parse(format!("IV must be 16 bytes, got {}", b.len())))
}

/// A whole-buffer decryption transform.
pub trait SegmentCipher: Send + Sync + std::fmt::Debug {
    /// Method tag this transform serves, e.g. `AES-128`.
    fn method(&self) -> &'static str;

    /// Decrypt `data`, returning a buffer of the same length.
    fn decrypt(&self, data: &[u8], key: &Key, iv: &Iv) -> Result<Vec<u8>>;
}

/// AES-128 in CBC mode. Padding is left in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aes128Cbc;

impl SegmentCipher for Aes128Cbc {
    fn method(&self) -> &'static str {
        "AES-128"
    }

    fn decrypt(&self, data: &[u8], key: &Key, iv: &Iv) -> Result<Vec<u8>> {
        let mut buf = data.to_vec();
        cbc::Decryptor::<Aes128>::new(key.into(), iv.into())
            .decrypt_padded_mut::<NoPadding>(&mut buf)
            .map_err(|_| {
                Error::parse(format!(
                    "ciphertext length {} is not a multiple of 16",
                    data.len()
                ))
            })?;
        Ok(buf)
    }
}

/// AES-128 in CTR mode with a 128-bit big-endian counter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aes128Ctr;

impl SegmentCipher for Aes128Ctr {
    fn method(&self) -> &'static str {
        "AES-128-CTR"
    }

    fn decrypt(&self, data: &[u8], key: &Key, iv: &Iv) -> Result<Vec<u8>> {
        let mut buf = data.to_vec();
        ctr::Ctr128BE::<Aes128>::new(key.into(), iv.into()).apply_keystream(&mut buf);
        Ok(buf)
    }
}

/// Pick the transform for a key `METHOD` tag.
pub fn cipher_for_method(method: &str) -> Result<Box<dyn SegmentCipher>> {
    match method {
        "AES-128" => Ok(Box::new(Aes128Cbc)),
        "AES-128-CTR" => Ok(Box::new(Aes128Ctr)),
        other => Err(Error::unsupported(format!("key method {other}"))),
    }
}
