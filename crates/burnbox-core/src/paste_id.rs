use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt::Display;

use crate::error::PasteError;

const MAX_LENGTH: usize = 64;

/// An opaque paste identifier.
///
/// Generated ids are base58 strings. Ids arriving from clients are accepted
/// when they are 1-64 characters of `[a-zA-Z0-9_-]`; anything else can never
/// name a stored paste.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PasteId(SmolStr);

impl PasteId {
    /// Encodes raw bytes (typically random) as a base58 id.
    ///
    /// # Examples
    ///
    /// ```
    /// use burnbox_core::PasteId;
    ///
    /// let id = PasteId::from_bytes([0x01, 0x02, 0x03]);
    /// assert_eq!(id.as_str(), "Ldp");
    /// ```
    pub fn from_bytes<T: AsRef<[u8]>>(bytes: T) -> Self {
        let encoded = bs58::encode(bytes).into_string();
        Self(SmolStr::new(encoded))
    }

    /// Parses a client-supplied id.
    pub fn parse(id: &str) -> Result<Self, PasteError> {
        Self::validate(id)?;
        Ok(Self(SmolStr::new(id)))
    }

    /// Creates an id without validation.
    ///
    /// Use this only for ids produced by trusted generators.
    pub fn new_unchecked(id: impl AsRef<str>) -> Self {
        Self(SmolStr::new(id.as_ref()))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key under which the paste record is stored.
    pub fn storage_key(&self) -> String {
        format!("paste:{}", self.0)
    }

    /// Builds the human-facing view url under `base_url`.
    pub fn to_view_url(&self, base_url: &str) -> String {
        format!("{}/p/{}", base_url.trim_end_matches('/'), self)
    }

    fn validate(id: &str) -> Result<(), PasteError> {
        if id.is_empty() || id.len() > MAX_LENGTH {
            return Err(PasteError::validation(
                "id",
                format!("id length must be between 1 and {MAX_LENGTH}, got {}", id.len()),
            ));
        }

        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(PasteError::validation(
                "id",
                format!("id must contain only alphanumeric characters, hyphens, or underscores: '{id}'"),
            ));
        }

        Ok(())
    }
}

impl std::fmt::Debug for PasteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PasteId").field(&self.0).finish()
    }
}

impl Display for PasteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for PasteId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PasteId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = SmolStr::deserialize(deserializer)?;
        Self::validate(&s).map_err(serde::de::Error::custom)?;
        Ok(Self(s))
    }
}
