//! Layout state transitions.
//!
//! Every transition takes the pair by reference and returns a new one; the
//! caller swaps it in atomically. `mark_generated` is the only transition
//! that records a generation, and `update_derived` is the only one that
//! records a customization.

use crate::fingerprint::{fingerprint, Fingerprint};
use crate::pair::now_ms;
use crate::{LayoutConfig, VersionedLayoutPair, Viewport};

impl VersionedLayoutPair {
    /// Replace the master layout. The derived side is untouched.
    #[must_use]
    pub fn update_master(&self, layout: LayoutConfig) -> Self {
        self.update_master_at(layout, now_ms())
    }

    /// [`Self::update_master`] with an explicit timestamp.
    #[must_use]
    pub fn update_master_at(&self, layout: LayoutConfig, timestamp: u64) -> Self {
        let mut next = self.clone();
        next.master.data = layout;
        next.master.last_modified = timestamp;
        next
    }

    /// Replace the derived layout with a hand edit.
    ///
    /// Any direct edit counts as a customization, even one that happens to
    /// equal what generation would produce.
    #[must_use]
    pub fn update_derived(&self, layout: LayoutConfig) -> Self {
        self.update_derived_at(layout, now_ms())
    }

    /// [`Self::update_derived`] with an explicit timestamp.
    #[must_use]
    pub fn update_derived_at(&self, layout: LayoutConfig, timestamp: u64) -> Self {
        let mut next = self.clone();
        if !next.derived.has_customizations {
            tracing::debug!("Derived layout customized; automatic regeneration disabled");
        }
        next.derived.data = layout;
        next.derived.has_customizations = true;
        next.derived.last_modified = timestamp;
        next
    }

    /// Record a freshly generated derived layout.
    ///
    /// Clears customizations and pins the master fingerprint so that
    /// [`Self::is_stale`] reports false until the master changes.
    #[must_use]
    pub fn mark_generated(&self, layout: LayoutConfig) -> Self {
        self.mark_generated_at(layout, now_ms())
    }

    /// [`Self::mark_generated`] with an explicit timestamp.
    #[must_use]
    pub fn mark_generated_at(&self, layout: LayoutConfig, timestamp: u64) -> Self {
        let mut next = self.clone();
        next.derived.data = layout;
        next.derived.is_generated = true;
        next.derived.has_customizations = false;
        next.derived.generated_from_hash = Some(fingerprint(&self.master.data));
        next.derived.last_modified = timestamp;
        next
    }

    /// Fingerprint of the current master layout.
    #[must_use]
    pub fn master_fingerprint(&self) -> Fingerprint {
        fingerprint(&self.master.data)
    }

    /// Check whether the derived layout needs regenerating.
    ///
    /// True if it was never generated, or if it was generated from a master
    /// that has since changed. A generated layout with no recorded
    /// fingerprint gives no signal and reports false.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        if !self.derived.is_generated {
            return true;
        }
        self.derived
            .generated_from_hash
            .as_ref()
            .is_some_and(|hash| *hash != self.master_fingerprint())
    }

    /// The layout to show on the given viewport.
    #[must_use]
    pub const fn select_for_viewport(&self, viewport: Viewport) -> &LayoutConfig {
        match viewport {
            Viewport::Wide => &self.master.data,
            Viewport::Narrow => &self.derived.data,
        }
    }
}
