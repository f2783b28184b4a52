//! Persisted document envelope: the node collection plus its layouts.
//!
//! Storage I/O belongs to the caller. This module only fixes the JSON
//! shape and performs the one-time legacy migration on load.

use serde::{Deserialize, Serialize};

use crate::pair::now_ms;
use crate::{
    LayoutConfig, LayoutError, LayoutResult, Node, NodeId, NodePatches, StoredLayouts,
    VersionedLayoutPair, Viewport,
};

/// A document as read from storage, layouts in either format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument {
    /// Content nodes.
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Layouts, versioned or legacy.
    pub layouts: StoredLayouts,
}

impl StoredDocument {
    /// Parse a stored document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or the layouts match neither
    /// format.
    pub fn from_json(json: &str) -> LayoutResult<Self> {
        let mut value: serde_json::Value = serde_json::from_str(json)?;
        let layouts = value
            .get_mut("layouts")
            .map(serde_json::Value::take)
            .ok_or_else(|| LayoutError::UnrecognizedFormat("missing `layouts`".to_string()))?;
        let nodes = match value.get_mut("nodes").map(serde_json::Value::take) {
            Some(nodes) => serde_json::from_value(nodes)?,
            None => Vec::new(),
        };
        Ok(Self {
            nodes,
            layouts: StoredLayouts::from_value(layouts)?,
        })
    }

    /// Check whether the layouts are already versioned.
    #[must_use]
    pub fn is_versioned(&self) -> bool {
        self.layouts.is_versioned()
    }

    /// Convert into a current document, migrating legacy layouts (stamped now).
    #[must_use]
    pub fn into_document(self) -> LayoutDocument {
        self.into_document_at(now_ms())
    }

    /// [`Self::into_document`] with an explicit migration timestamp.
    #[must_use]
    pub fn into_document_at(self, timestamp: u64) -> LayoutDocument {
        LayoutDocument {
            nodes: self.nodes,
            layouts: self.layouts.ensure_versioned_at(timestamp),
        }
    }
}

/// A document with versioned layouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutDocument {
    /// Content nodes.
    pub nodes: Vec<Node>,
    /// Master and derived layouts.
    pub layouts: VersionedLayoutPair,
}

impl LayoutDocument {
    /// Create a document with the initial (empty) layouts.
    #[must_use]
    pub fn new(nodes: Vec<Node>) -> Self {
        Self {
            nodes,
            layouts: VersionedLayoutPair::initial(),
        }
    }

    /// Parse a document, migrating legacy layouts if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or the layouts match neither
    /// format.
    pub fn from_json(json: &str) -> LayoutResult<Self> {
        Ok(StoredDocument::from_json(json)?.into_document())
    }

    /// Serialize the document to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> LayoutResult<String> {
        serde_json::to_string(self).map_err(LayoutError::Serialization)
    }

    /// Serialize the document to indented JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> LayoutResult<String> {
        serde_json::to_string_pretty(self).map_err(LayoutError::Serialization)
    }

    /// Get a node by id.
    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| &node.id == id)
    }

    /// The layout shown on the given viewport.
    #[must_use]
    pub const fn layout_for(&self, viewport: Viewport) -> &LayoutConfig {
        self.layouts.select_for_viewport(viewport)
    }

    /// Return a copy with the patches merged into matching nodes' data.
    ///
    /// Patches for ids not in the document are ignored.
    #[must_use]
    pub fn apply_patches(&self, patches: &NodePatches) -> Self {
        let nodes = self
            .nodes
            .iter()
            .map(|node| match patches.get(&node.id) {
                Some(patch) => node.with_patch(patch),
                None => node.clone(),
            })
            .collect();

        let unknown = patches.keys().filter(|id| self.node(id).is_none()).count();
        if unknown > 0 {
            tracing::debug!("Ignoring {unknown} patches for nodes not in the document");
        }

        Self {
            nodes,
            layouts: self.layouts.clone(),
        }
    }

    /// Return a copy with different layouts.
    #[must_use]
    pub fn with_layouts(&self, layouts: VersionedLayoutPair) -> Self {
        Self {
            nodes: self.nodes.clone(),
            layouts,
        }
    }
}
