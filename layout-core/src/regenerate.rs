//! Narrow layout regeneration.
//!
//! Decides whether a derived layout can be reused, must be kept because a
//! human customized it, or should be rebuilt from the master:
//!
//! ```text
//! Force ───────────────────────────────▶ Regenerated
//! IfStale ─ customized? ── yes ────────▶ KeptCustomized
//!                       └─ no ─ stale? ─ yes ─▶ Regenerated
//!                                      └─ no ──▶ Reused
//! ```

use serde::{Deserialize, Serialize};

use crate::convert::ViewportConverter;
use crate::pair::now_ms;
use crate::{Node, NodePatches, VersionedLayoutPair};

/// How eagerly to regenerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegenerateMode {
    /// Regenerate only an uncustomized, stale derived layout.
    #[default]
    IfStale,
    /// Always regenerate, discarding customizations.
    Force,
}

/// What regeneration did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The derived layout was current and was left as is.
    Reused,
    /// The derived layout was customized and was left as is.
    KeptCustomized,
    /// A new derived layout was generated from the master.
    Regenerated,
}

/// Result of a regeneration request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Regeneration {
    /// The pair to store (unchanged unless regenerated).
    pub pair: VersionedLayoutPair,
    /// Node patches from the narrow conversion; empty unless regenerated.
    pub node_patches: NodePatches,
    /// What happened.
    pub outcome: Outcome,
}

/// Bring the derived layout up to date with the master.
#[must_use]
pub fn regenerate(
    pair: &VersionedLayoutPair,
    nodes: &[Node],
    converter: &ViewportConverter,
    mode: RegenerateMode,
) -> Regeneration {
    regenerate_at(pair, nodes, converter, mode, now_ms())
}

/// [`regenerate`] with an explicit timestamp.
#[must_use]
pub fn regenerate_at(
    pair: &VersionedLayoutPair,
    nodes: &[Node],
    converter: &ViewportConverter,
    mode: RegenerateMode,
    timestamp: u64,
) -> Regeneration {
    if mode == RegenerateMode::IfStale {
        let kept = if pair.derived.has_customizations {
            Some(Outcome::KeptCustomized)
        } else if !pair.is_stale() {
            Some(Outcome::Reused)
        } else {
            None
        };

        if let Some(outcome) = kept {
            tracing::info!("Derived layout left in place ({outcome:?})");
            return Regeneration {
                pair: pair.clone(),
                node_patches: NodePatches::new(),
                outcome,
            };
        }
    }

    let result = converter.to_narrow(nodes, &pair.master.data);
    tracing::info!(
        "Regenerated derived layout from master {} ({} items, mode {mode:?})",
        pair.master_fingerprint(),
        result.layout.len()
    );

    Regeneration {
        pair: pair.mark_generated_at(result.layout, timestamp),
        node_patches: result.node_patches,
        outcome: Outcome::Regenerated,
    }
}
