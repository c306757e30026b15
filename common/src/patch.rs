//! Serde support for nullable fields in partial updates.
//!
//! A patch field of type `Option<Option<T>>` distinguishes three cases:
//! absent (`None`, leave untouched), `null` (`Some(None)`, clear) and a value
//! (`Some(Some(v))`, replace). serde folds `null` into the outer `None` on its
//! own, so such fields decode through [`nullable`].

use serde::{Deserialize, Deserializer};

/// Decode a present field, keeping an explicit `null` as `Some(None)`.
///
/// Pair with `#[serde(default)]` so an absent field stays `None`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
