//! Grid layouts - node placements on a fixed-column grid.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{LayoutError, LayoutResult, NodeId};

/// Column count of the wide (master) grid.
pub const WIDE_COLUMNS: i32 = 12;

/// Column count of the narrow (derived) grid.
pub const NARROW_COLUMNS: i32 = 4;

/// One node's placement within a grid layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayoutItem {
    /// The node this item places.
    #[serde(rename = "i", alias = "nodeId")]
    pub node_id: NodeId,
    /// Column origin.
    pub x: i32,
    /// Row origin.
    pub y: i32,
    /// Column span.
    pub w: i32,
    /// Row span.
    pub h: i32,
}

impl LayoutItem {
    /// Create an item at the given position and size.
    #[must_use]
    pub fn new(node_id: impl Into<NodeId>, x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            node_id: node_id.into(),
            x,
            y,
            w,
            h,
        }
    }

    /// Row just below this item.
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.h)
    }

    /// Column just right of this item.
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.w)
    }

    /// Check whether two items cover a common cell.
    #[must_use]
    pub const fn intersects(&self, other: &Self) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// A grid column count plus the items placed on it.
///
/// Item order carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Number of grid columns.
    pub columns: i32,
    /// Placed items, at most one per node.
    #[serde(default)]
    pub items: Vec<LayoutItem>,
}

impl LayoutConfig {
    /// Create an empty layout with the given column count.
    #[must_use]
    pub const fn new(columns: i32) -> Self {
        Self {
            columns,
            items: Vec::new(),
        }
    }

    /// Create an empty wide layout.
    #[must_use]
    pub const fn wide() -> Self {
        Self::new(WIDE_COLUMNS)
    }

    /// Create an empty narrow layout.
    #[must_use]
    pub const fn narrow() -> Self {
        Self::new(NARROW_COLUMNS)
    }

    /// Add an item.
    #[must_use]
    pub fn with_item(mut self, item: LayoutItem) -> Self {
        self.items.push(item);
        self
    }

    /// Find the item placing `node_id`, if any.
    #[must_use]
    pub fn item_for(&self, node_id: &NodeId) -> Option<&LayoutItem> {
        self.items.iter().find(|item| &item.node_id == node_id)
    }

    /// Get the number of placed items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if nothing is placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Lowest occupied row boundary (0 for an empty layout).
    #[must_use]
    pub fn bottom(&self) -> i32 {
        self.items.iter().map(LayoutItem::bottom).max().unwrap_or(0)
    }

    /// Check every item against the grid geometry invariants.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Geometry`] for the first item with a negative
    /// origin or height, a width below one, or a right edge past the grid.
    pub fn validate(&self) -> LayoutResult<()> {
        for item in &self.items {
            let reason = if item.x < 0 || item.y < 0 {
                Some(format!("origin ({}, {}) is negative", item.x, item.y))
            } else if item.w < 1 {
                Some(format!("width {} is below 1", item.w))
            } else if item.h < 0 {
                Some(format!("height {} is negative", item.h))
            } else if item.right() > self.columns {
                Some(format!(
                    "spans to column {} on a {}-column grid",
                    item.right(),
                    self.columns
                ))
            } else {
                None
            };

            if let Some(reason) = reason {
                tracing::warn!("Layout item {} is invalid: {reason}", item.node_id);
                return Err(LayoutError::Geometry {
                    node_id: item.node_id.clone(),
                    reason,
                });
            }
        }
        Ok(())
    }

    /// Find the first pair of items that cover a common cell.
    #[must_use]
    pub fn find_overlap(&self) -> Option<(&LayoutItem, &LayoutItem)> {
        self.items.iter().enumerate().find_map(|(idx, a)| {
            self.items[idx + 1..]
                .iter()
                .find(|b| a.intersects(b))
                .map(|b| (a, b))
        })
    }

    /// Serialize the layout to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> LayoutResult<String> {
        serde_json::to_string(self).map_err(LayoutError::Serialization)
    }

    /// Deserialize a layout from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_json(json: &str) -> LayoutResult<Self> {
        serde_json::from_str(json).map_err(LayoutError::Serialization)
    }
}

/// Which representation a caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Viewport {
    /// Wide multi-column arrangement (master).
    Wide,
    /// Narrow single-column arrangement (derived).
    Narrow,
}

impl Viewport {
    /// Conventional column count for this viewport.
    #[must_use]
    pub const fn columns(self) -> i32 {
        match self {
            Self::Wide => WIDE_COLUMNS,
            Self::Narrow => NARROW_COLUMNS,
        }
    }
}

impl FromStr for Viewport {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wide" | "desktop" => Ok(Self::Wide),
            "narrow" | "mobile" => Ok(Self::Narrow),
            _ => Err(LayoutError::UnknownViewport(s.to_string())),
        }
    }
}

impl std::fmt::Display for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Wide => f.write_str("wide"),
            Self::Narrow => f.write_str("narrow"),
        }
    }
}
