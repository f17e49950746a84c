//! Entity key newtypes identifying assets and asset checks.
//!
//! All keys are immutable, hashable, and totally ordered so that every
//! container keyed by them iterates deterministically. An [`AssetKey`] is a
//! short path of string segments; an [`AssetCheckKey`] binds a check name to
//! the asset it validates; [`EntityKey`] is the closed union of the two.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::CoreError;

/// Separator used in the user-facing string form of an asset key path.
const KEY_PATH_SEPARATOR: char = '/';

/// Separator between the asset path and the check name in the user-facing
/// string form of an asset check key.
const CHECK_NAME_SEPARATOR: char = ':';

/// Globally-unique identifier of an asset: a non-empty path of non-empty
/// string segments.
///
/// Most keys have one or two segments, so the path is stored inline.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetKey {
    path: SmallVec<[String; 2]>,
}

impl AssetKey {
    /// Creates an asset key from path segments.
    ///
    /// Segment validity (non-empty path, non-empty segments) is the caller's
    /// responsibility here; use [`AssetKey::from_user_string`] for validated
    /// construction from untrusted input.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let path: SmallVec<[String; 2]> = segments.into_iter().map(Into::into).collect();
        debug_assert!(!path.is_empty(), "asset key path must be non-empty");
        AssetKey { path }
    }

    /// Parses the user-facing `"seg/seg/..."` form.
    pub fn from_user_string(raw: &str) -> Result<Self, CoreError> {
        if raw.is_empty() {
            return Err(CoreError::InvalidAssetKey {
                raw: raw.to_string(),
                reason: "key is empty".to_string(),
            });
        }
        let path: SmallVec<[String; 2]> = raw
            .split(KEY_PATH_SEPARATOR)
            .map(str::to_string)
            .collect();
        if path.iter().any(String::is_empty) {
            return Err(CoreError::InvalidAssetKey {
                raw: raw.to_string(),
                reason: "key contains an empty path segment".to_string(),
            });
        }
        Ok(AssetKey { path })
    }

    /// Returns the path segments.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Renders the `"seg/seg/..."` user-facing form.
    pub fn to_user_string(&self) -> String {
        self.path.join(&KEY_PATH_SEPARATOR.to_string())
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_user_string())
    }
}

/// Identifier of an asset check: the checked asset's key plus the check name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetCheckKey {
    /// Key of the asset this check validates.
    pub asset_key: AssetKey,
    /// Name of the check, unique per asset.
    pub name: String,
}

impl AssetCheckKey {
    /// Creates a check key for the given asset and check name.
    pub fn new(asset_key: AssetKey, name: impl Into<String>) -> Self {
        AssetCheckKey {
            asset_key,
            name: name.into(),
        }
    }

    /// Parses the user-facing `"asset/path:check_name"` form.
    pub fn from_user_string(raw: &str) -> Result<Self, CoreError> {
        let (asset_part, check_name) = raw
            .rsplit_once(CHECK_NAME_SEPARATOR)
            .ok_or_else(|| CoreError::InvalidAssetCheckKey {
                raw: raw.to_string(),
            })?;
        if check_name.is_empty() {
            return Err(CoreError::InvalidAssetCheckKey {
                raw: raw.to_string(),
            });
        }
        let asset_key =
            AssetKey::from_user_string(asset_part).map_err(|_| CoreError::InvalidAssetCheckKey {
                raw: raw.to_string(),
            })?;
        Ok(AssetCheckKey {
            asset_key,
            name: check_name.to_string(),
        })
    }
}

impl fmt::Display for AssetCheckKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.asset_key, CHECK_NAME_SEPARATOR, self.name)
    }
}

/// The closed union of keys the graph tracks: assets and asset checks.
///
/// Ordered with all asset keys before all check keys so that mixed key sets
/// iterate deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKey {
    /// An asset key.
    Asset(AssetKey),
    /// An asset check key.
    Check(AssetCheckKey),
}

impl EntityKey {
    /// Returns the asset key when this is an asset entity.
    pub fn as_asset_key(&self) -> Option<&AssetKey> {
        match self {
            EntityKey::Asset(key) => Some(key),
            EntityKey::Check(_) => None,
        }
    }

    /// Returns the check key when this is a check entity.
    pub fn as_check_key(&self) -> Option<&AssetCheckKey> {
        match self {
            EntityKey::Asset(_) => None,
            EntityKey::Check(key) => Some(key),
        }
    }

    /// Returns the key of the asset this entity belongs to: the asset itself,
    /// or the asset a check validates.
    pub fn owning_asset_key(&self) -> &AssetKey {
        match self {
            EntityKey::Asset(key) => key,
            EntityKey::Check(key) => &key.asset_key,
        }
    }
}

impl From<AssetKey> for EntityKey {
    fn from(key: AssetKey) -> Self {
        EntityKey::Asset(key)
    }
}

impl From<AssetCheckKey> for EntityKey {
    fn from(key: AssetCheckKey) -> Self {
        EntityKey::Check(key)
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKey::Asset(key) => write!(f, "{}", key),
            EntityKey::Check(key) => write!(f, "{}", key),
        }
    }
}
