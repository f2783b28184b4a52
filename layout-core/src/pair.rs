//! Master/derived layout pairs and legacy migration.
//!
//! The wide layout is the hand-authored master. The narrow layout is derived
//! from it and may later be customized by hand. Older documents stored two
//! flat layouts with no versioning; those are migrated once at load time.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::fingerprint::{fingerprint, Fingerprint};
use crate::{LayoutConfig, LayoutError, LayoutResult};

/// Get the current timestamp in milliseconds since epoch.
#[must_use]
#[allow(clippy::cast_possible_truncation)] // Timestamps won't exceed u64 for billions of years
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Discriminator carried by each side of a versioned pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutRole {
    /// The wide, hand-authored layout.
    Master,
    /// The narrow layout generated from (or customized after) the master.
    Derived,
}

/// The wide, authoritative layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterLayout {
    /// Always [`LayoutRole::Master`].
    #[serde(rename = "type")]
    pub role: LayoutRole,
    /// The layout itself.
    pub data: LayoutConfig,
    /// Last edit, in ms since epoch.
    pub last_modified: u64,
}

impl MasterLayout {
    /// Wrap a layout as the master.
    #[must_use]
    pub const fn new(data: LayoutConfig, last_modified: u64) -> Self {
        Self {
            role: LayoutRole::Master,
            data,
            last_modified,
        }
    }
}

/// The narrow layout and its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedLayout {
    /// Always [`LayoutRole::Derived`].
    #[serde(rename = "type")]
    pub role: LayoutRole,
    /// The layout itself.
    pub data: LayoutConfig,
    /// Whether `data` was ever produced by generation from the master.
    pub is_generated: bool,
    /// Master fingerprint at the last generation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_from_hash: Option<Fingerprint>,
    /// Whether a human has edited `data` since it was generated.
    pub has_customizations: bool,
    /// Last edit or generation, in ms since epoch.
    pub last_modified: u64,
}

impl DerivedLayout {
    /// An empty, never-generated narrow layout.
    #[must_use]
    pub const fn empty(last_modified: u64) -> Self {
        Self {
            role: LayoutRole::Derived,
            data: LayoutConfig::narrow(),
            is_generated: false,
            generated_from_hash: None,
            has_customizations: false,
            last_modified,
        }
    }
}

/// The versioned wrapper around both layouts.
///
/// Treated as an immutable value: every transition returns a new pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedLayoutPair {
    /// Wide layout.
    pub master: MasterLayout,
    /// Narrow layout.
    pub derived: DerivedLayout,
}

impl VersionedLayoutPair {
    /// Pair for a new document: empty 12-column master, empty 4-column
    /// derived that has not been generated yet.
    #[must_use]
    pub fn initial() -> Self {
        Self::initial_at(now_ms())
    }

    /// [`Self::initial`] with an explicit timestamp.
    #[must_use]
    pub const fn initial_at(timestamp: u64) -> Self {
        Self {
            master: MasterLayout::new(LayoutConfig::wide(), timestamp),
            derived: DerivedLayout::empty(timestamp),
        }
    }

    /// Strip versioning metadata down to two flat layouts.
    #[must_use]
    pub fn to_legacy(&self) -> LegacyLayoutPair {
        LegacyLayoutPair {
            desktop: self.master.data.clone(),
            mobile: self.derived.data.clone(),
        }
    }

    /// Serialize the pair to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> LayoutResult<String> {
        serde_json::to_string(self).map_err(LayoutError::Serialization)
    }
}

impl Default for VersionedLayoutPair {
    fn default() -> Self {
        Self::initial()
    }
}

/// The pre-versioning format: two flat layouts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyLayoutPair {
    /// Wide layout.
    pub desktop: LayoutConfig,
    /// Narrow layout.
    pub mobile: LayoutConfig,
}

impl LegacyLayoutPair {
    /// Migrate into a versioned pair, stamped now.
    ///
    /// The stored narrow layout is assumed to carry human tuning, so the
    /// derived side is marked customized and will not be overwritten by
    /// automatic regeneration.
    #[must_use]
    pub fn migrate(&self) -> VersionedLayoutPair {
        self.migrate_at(now_ms())
    }

    /// [`Self::migrate`] with an explicit timestamp.
    #[must_use]
    pub fn migrate_at(&self, timestamp: u64) -> VersionedLayoutPair {
        VersionedLayoutPair {
            master: MasterLayout::new(self.desktop.clone(), timestamp),
            derived: DerivedLayout {
                role: LayoutRole::Derived,
                data: self.mobile.clone(),
                is_generated: true,
                generated_from_hash: Some(fingerprint(&self.desktop)),
                has_customizations: true,
                last_modified: timestamp,
            },
        }
    }
}

/// Layouts as a persistence layer hands them over: either shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredLayouts {
    /// Current versioned format.
    Versioned(VersionedLayoutPair),
    /// Pre-versioning format.
    Legacy(LegacyLayoutPair),
}

impl StoredLayouts {
    /// Parse persisted layouts in either format.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::UnrecognizedFormat`] if the JSON is valid but
    /// matches neither shape, or [`LayoutError::Serialization`] if it is not
    /// valid JSON.
    pub fn from_json(json: &str) -> LayoutResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Interpret an already-parsed JSON value.
    ///
    /// The `master`/`derived` or `desktop`/`mobile` keys pick the format, so
    /// a malformed pair reports the field that is actually wrong.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::UnrecognizedFormat`] if the value matches
    /// neither shape.
    pub fn from_value(value: serde_json::Value) -> LayoutResult<Self> {
        let has = |key: &str| value.get(key).is_some();

        if has("master") || has("derived") {
            serde_json::from_value(value)
                .map(Self::Versioned)
                .map_err(|e| LayoutError::UnrecognizedFormat(format!("versioned layouts: {e}")))
        } else if has("desktop") || has("mobile") {
            serde_json::from_value(value)
                .map(Self::Legacy)
                .map_err(|e| LayoutError::UnrecognizedFormat(format!("legacy layouts: {e}")))
        } else {
            serde_json::from_value(value)
                .map_err(|e| LayoutError::UnrecognizedFormat(e.to_string()))
        }
    }

    /// Check whether these layouts are in the versioned format.
    ///
    /// Recognized by the role discriminators on each side.
    #[must_use]
    pub fn is_versioned(&self) -> bool {
        matches!(
            self,
            Self::Versioned(pair)
                if pair.master.role == LayoutRole::Master
                    && pair.derived.role == LayoutRole::Derived
        )
    }

    /// Return versioned layouts, migrating legacy ones (stamped now).
    #[must_use]
    pub fn ensure_versioned(self) -> VersionedLayoutPair {
        self.ensure_versioned_at(now_ms())
    }

    /// [`Self::ensure_versioned`] with an explicit migration timestamp.
    #[must_use]
    pub fn ensure_versioned_at(self, timestamp: u64) -> VersionedLayoutPair {
        match self {
            Self::Versioned(mut pair) => {
                // Mislabelled roles are a storage bug; the positions are authoritative.
                pair.master.role = LayoutRole::Master;
                pair.derived.role = LayoutRole::Derived;
                pair
            }
            Self::Legacy(legacy) => {
                tracing::debug!(
                    "Migrating legacy layouts ({} wide items, {} narrow items)",
                    legacy.desktop.len(),
                    legacy.mobile.len()
                );
                legacy.migrate_at(timestamp)
            }
        }
    }
}

impl From<VersionedLayoutPair> for StoredLayouts {
    fn from(pair: VersionedLayoutPair) -> Self {
        Self::Versioned(pair)
    }
}

impl From<LegacyLayoutPair> for StoredLayouts {
    fn from(pair: LegacyLayoutPair) -> Self {
        Self::Legacy(pair)
    }
}
