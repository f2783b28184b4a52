//! Per-node-type narrow-screen policy.
//!
//! | Type        | Priority | Narrow cols | Wide cols | Spacing | Font  |
//! |-------------|----------|-------------|-----------|---------|-------|
//! | `heading`   | 1        | 4 (forced)  | 10        | compact | 0.85  |
//! | `callout`   | 1        | 4 (forced)  | 8         | normal  | 0.95  |
//! | `image`     | 2        | 4 (forced)  | 10        | normal  | -     |
//! | `video`     | 2        | 4 (forced)  | 10        | normal  | -     |
//! | `text`      | 3        | 4 (forced)  | 8         | normal  | -     |
//! | `quote`     | 3        | 4 (forced)  | 8         | loose   | 0.95  |
//! | `table`     | 4        | 4 (forced)  | 12        | compact | 0.85  |
//! | `poll`      | 5        | 4 (forced)  | 10        | normal  | -     |
//! | `reference` | 6        | 4           | 10        | compact | 0.9   |
//! | `separator` | 7        | 4 (forced)  | 12        | compact | -     |
//! | other       | 5        | 4 (forced)  | 10        | normal  | -     |
//!
//! Font scale and styles are content hints only and never affect geometry.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::NodeKind;

/// Vertical rhythm hint for a node on a narrow screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Spacing {
    /// Tighter than usual.
    Compact,
    /// No change.
    #[default]
    Normal,
    /// Looser than usual.
    Loose,
}

impl Spacing {
    /// The wire tag for this spacing.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Normal => "normal",
            Self::Loose => "loose",
        }
    }
}

/// How one node type behaves on a narrow screen (and back on a wide one).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileRule {
    /// Always span the whole narrow grid.
    pub force_full_width: bool,
    /// Narrow column span when not forced to full width (1..=4).
    pub preferred_mobile_columns: i32,
    /// Stacking order on narrow screens; lower sorts first.
    pub stacking_priority: i32,
    /// Font scale hint.
    pub scale_font: Option<f64>,
    /// Spacing hint.
    pub adjust_spacing: Spacing,
    /// Free-form style overrides for narrow screens.
    pub mobile_specific_styles: Option<serde_json::Value>,
    /// Column span when the node stands alone in a wide row.
    pub preferred_wide_columns: i32,
}

impl MobileRule {
    const fn base(stacking_priority: i32, preferred_wide_columns: i32) -> Self {
        Self {
            force_full_width: true,
            preferred_mobile_columns: 4,
            stacking_priority,
            scale_font: None,
            adjust_spacing: Spacing::Normal,
            mobile_specific_styles: None,
            preferred_wide_columns,
        }
    }

    fn font(mut self, scale: f64) -> Self {
        self.scale_font = Some(scale);
        self
    }

    fn spacing(mut self, spacing: Spacing) -> Self {
        self.adjust_spacing = spacing;
        self
    }

    fn styles(mut self, styles: serde_json::Value) -> Self {
        self.mobile_specific_styles = Some(styles);
        self
    }

    /// Check whether this rule carries any content-adaptation hint.
    #[must_use]
    pub fn has_hints(&self) -> bool {
        self.scale_font.is_some()
            || self.adjust_spacing != Spacing::Normal
            || self.mobile_specific_styles.is_some()
    }
}

impl Default for MobileRule {
    /// Policy for types without an entry: full width, mid priority, normal spacing.
    fn default() -> Self {
        Self::base(5, 10)
    }
}

static DEFAULT_RULE: Lazy<MobileRule> = Lazy::new(MobileRule::default);

static RULES: Lazy<HashMap<&'static str, MobileRule>> = Lazy::new(|| {
    HashMap::from([
        (
            "heading",
            MobileRule::base(1, 10)
                .font(0.85)
                .spacing(Spacing::Compact),
        ),
        (
            "callout",
            MobileRule::base(1, 8)
                .font(0.95)
                .styles(json!({ "padding": "12px" })),
        ),
        (
            "image",
            MobileRule::base(2, 10).styles(json!({ "maxWidth": "100%", "height": "auto" })),
        ),
        (
            "video",
            MobileRule::base(2, 10).styles(json!({ "aspectRatio": "16 / 9" })),
        ),
        ("text", MobileRule::base(3, 8)),
        (
            "quote",
            MobileRule::base(3, 8).font(0.95).spacing(Spacing::Loose),
        ),
        (
            "table",
            MobileRule::base(4, 12)
                .font(0.85)
                .spacing(Spacing::Compact)
                .styles(json!({ "overflowX": "auto" })),
        ),
        ("poll", MobileRule::base(5, 10)),
        (
            "reference",
            MobileRule {
                force_full_width: false,
                ..MobileRule::base(6, 10)
            }
            .font(0.9)
            .spacing(Spacing::Compact),
        ),
        (
            "separator",
            MobileRule::base(7, 12).spacing(Spacing::Compact),
        ),
    ])
});

/// Look up the policy for a node type, falling back to the default.
#[must_use]
pub fn rule_for(kind: &NodeKind) -> &'static MobileRule {
    RULES.get(kind.as_str()).unwrap_or_else(|| {
        tracing::debug!("No layout rule for node type {kind}; using default");
        &*DEFAULT_RULE
    })
}
