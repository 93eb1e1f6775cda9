use uuid::Uuid;

use crate::{BlobError, BlobResult};

pub const DEFAULT_KEY_PREFIX: &str = "coach/";

/// Key strategy for coach photos: `<prefix><id>`.
#[derive(Debug, Clone)]
pub struct PhotoKeys {
    prefix: String,
}

impl Default for PhotoKeys {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX)
    }
}

impl PhotoKeys {
    pub fn new<S: Into<String>>(prefix: S) -> Self {
        let mut prefix = prefix.into();
        if !prefix.ends_with('/') {
            prefix.push('/');
        }
        Self { prefix }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Key derived from an owning coach id.
    pub fn object_key(&self, coach_id: &Uuid) -> String {
        format!("{}{}", self.prefix, coach_id)
    }

    /// A key no other blob has used.
    pub fn fresh_key(&self) -> String {
        self.object_key(&Uuid::new_v4())
    }

    /// Turn a stored photo location back into its store key.
    ///
    /// The location may be a full URL (`http://host/bucket/coach/<id>`) or a
    /// bare key. The key is the prefix followed by one trailing path segment,
    /// so a bucket or endpoint path that also contains the prefix is skipped.
    pub fn key_from_reference(&self, reference: &str) -> BlobResult<String> {
        let malformed = || BlobError::malformed_reference(reference);
        let index = reference.rfind(&self.prefix).ok_or_else(malformed)?;
        if index > 0 && !reference[..index].ends_with('/') {
            return Err(malformed());
        }
        let segment = &reference[index + self.prefix.len()..];
        if segment.is_empty() || segment.contains('/') {
            return Err(malformed());
        }
        Ok(reference[index..].to_string())
    }
}
