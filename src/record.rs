//! The document record stored by the [`crate::docstore::DocStore`].

use crate::error::{Error, Result};

/// A stored document: its opaque payload plus the int8 embedding the oracle
/// produced for it.
///
/// Payload bytes are opaque to the store; the caller decides their
/// encoding (the scenarios and tests in this crate use UTF-8 JSON).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocRecord {
    /// Caller-supplied opaque payload bytes.
    pub payload: Vec<u8>,
    /// int8-quantized embedding, length D.
    pub emb_int8: Vec<i8>,
}

impl DocRecord {
    /// Encodes this record as a self-describing blob: a u32 length-prefixed
    /// payload followed by the fixed-length int8 array.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(4 + self.payload.len() + self.emb_int8.len());
        #[allow(clippy::cast_possible_truncation)]
        let len = self.payload.len() as u32;
        buf.extend_from_slice(&len.to_le_bytes());
        buf.extend_from_slice(&self.payload);
        #[allow(clippy::cast_sign_loss)]
        buf.extend(self.emb_int8.iter().map(|&b| b as u8));
        buf
    }

    /// Decodes a record previously produced by [`DocRecord::encode`].
    ///
    /// `dim` is the database's fixed vector dimension; the int8 array must
    /// occupy exactly that many trailing bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageFailure`] if `bytes` is shorter than the
    /// length prefix claims, or doesn't leave exactly `dim` bytes for the
    /// int8 array.
    pub fn decode(bytes: &[u8], dim: usize) -> Result<Self> {
        if bytes.len() < 4 {
            return Err(Error::StorageFailure(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "document record truncated before length prefix",
            )));
        }
        let payload_len = u32::from_le_bytes(bytes[0..4].try_into().unwrap()) as usize;
        if bytes.len() != 4 + payload_len + dim {
            return Err(Error::StorageFailure(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "document record length does not match payload length + dim",
            )));
        }
        let payload = bytes[4..4 + payload_len].to_vec();
        #[allow(clippy::cast_possible_wrap)]
        let emb_int8 = bytes[4 + payload_len..].iter().map(|&b| b as i8).collect();
        Ok(Self { payload, emb_int8 })
    }
}
