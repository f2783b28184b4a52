//! Wide/narrow viewport conversion.
//!
//! ## Wide to narrow
//!
//! ```text
//! nodes ──sort by (stacking priority, wide y)──▶ single column stack
//!        width  = rule's narrow span (full width by default)
//!        height = per-type heuristic on the wide height
//!        y      = running cursor, advanced by height + spacing
//! ```
//!
//! ## Narrow to wide
//!
//! ```text
//! nodes ──sort by narrow y──▶ runs of adjacent compatible nodes
//!        run of k > 1 : k items of columns / k, side by side
//!        run of 1     : rule's preferred wide span at x = 0
//! ```
//!
//! Both directions are total over the node collection. A node with no item
//! in the source layout is placed from a zero-sized placeholder; items for
//! nodes that are no longer in the collection are dropped.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::rules::{rule_for, MobileRule, Spacing};
use crate::{LayoutConfig, LayoutItem, Node, NodeId, NodeKind, NodePatch, NodePatches};

/// Node data key for narrow-only style overrides.
pub const MOBILE_STYLES_KEY: &str = "mobileStyles";

/// Node data key for the narrow font scale hint.
pub const FONT_SCALE_KEY: &str = "fontScale";

/// Node data key for the narrow spacing hint.
pub const SPACING_KEY: &str = "spacing";

const HINT_KEYS: [&str; 3] = [MOBILE_STYLES_KEY, FONT_SCALE_KEY, SPACING_KEY];

/// Narrow height floor for headings.
const HEADING_MIN_HEIGHT: i32 = 2;

/// Narrow height floor for body text.
const TEXT_MIN_HEIGHT: i32 = 3;

/// Narrow height floor for tables.
const TABLE_MIN_HEIGHT: i32 = 6;

/// Fixed narrow height of separators.
const SEPARATOR_HEIGHT: i32 = 1;

/// Height floor for every other type, and for unplaced nodes going wide.
const DEFAULT_MIN_HEIGHT: i32 = 3;

/// Configuration for viewport conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverterConfig {
    /// Column count of the wide grid.
    pub wide_columns: i32,
    /// Column count of the narrow grid.
    pub narrow_columns: i32,
    /// Empty rows between consecutive rows of output.
    pub row_spacing: i32,
    /// Type pairs allowed to share a wide row, in either order.
    pub compatible_pairs: Vec<(NodeKind, NodeKind)>,
}

impl ConverterConfig {
    /// Check whether two node types may sit side by side in a wide row.
    #[must_use]
    pub fn is_compatible(&self, a: &NodeKind, b: &NodeKind) -> bool {
        self.compatible_pairs
            .iter()
            .any(|(x, y)| (x == a && y == b) || (x == b && y == a))
    }
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            wide_columns: crate::grid::WIDE_COLUMNS,
            narrow_columns: crate::grid::NARROW_COLUMNS,
            row_spacing: 2,
            compatible_pairs: vec![
                (NodeKind::Text, NodeKind::Image),
                (NodeKind::Heading, NodeKind::Text),
                (NodeKind::Callout, NodeKind::Reference),
            ],
        }
    }
}

/// Result of converting a layout to the other viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    /// The converted layout.
    pub layout: LayoutConfig,
    /// Suggested node data patches; the caller decides whether to merge them.
    pub node_patches: NodePatches,
}

/// Converts layouts between the wide and narrow viewports.
#[derive(Debug, Clone, Default)]
pub struct ViewportConverter {
    config: ConverterConfig,
}

/// A node paired with its placement in the source layout and its rule.
#[derive(Debug)]
struct Placed<'a> {
    node: &'a Node,
    source: Option<&'a LayoutItem>,
    rule: &'static MobileRule,
}

impl Placed<'_> {
    fn source_y(&self) -> i32 {
        self.source.map_or(0, |item| item.y)
    }

    fn source_h(&self) -> i32 {
        self.source.map_or(0, |item| item.h)
    }
}

impl ViewportConverter {
    /// Create a converter with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ConverterConfig::default())
    }

    /// Create with custom configuration.
    #[must_use]
    pub const fn with_config(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// Get the current configuration.
    #[must_use]
    pub const fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Narrow grid width, never below one column.
    const fn narrow_columns(&self) -> i32 {
        if self.config.narrow_columns < 1 {
            1
        } else {
            self.config.narrow_columns
        }
    }

    /// Wide grid width, never below one column.
    const fn wide_columns(&self) -> i32 {
        if self.config.wide_columns < 1 {
            1
        } else {
            self.config.wide_columns
        }
    }

    /// Row spacing, never negative.
    const fn row_spacing(&self) -> i32 {
        if self.config.row_spacing < 0 {
            0
        } else {
            self.config.row_spacing
        }
    }

    /// Stack a wide layout into a single narrow column.
    ///
    /// Nodes are ordered by stacking priority, then by their wide row, and
    /// placed top to bottom at `x = 0` with no vertical overlap.
    #[must_use]
    pub fn to_narrow(&self, nodes: &[Node], master: &LayoutConfig) -> ConversionResult {
        let columns = self.narrow_columns();
        let spacing = self.row_spacing();
        let mut placed = placements(nodes, master);
        placed.sort_by_key(|p| (p.rule.stacking_priority, p.source_y()));

        let mut layout = LayoutConfig::new(columns);
        let mut node_patches = NodePatches::new();
        let mut cursor: i32 = 0;

        for p in &placed {
            let rule = p.rule;
            let w = if rule.force_full_width {
                columns
            } else {
                rule.preferred_mobile_columns.clamp(1, columns)
            };
            let h = narrow_height(&p.node.kind, p.source_h());

            layout
                .items
                .push(LayoutItem::new(p.node.id.clone(), 0, cursor, w, h));
            cursor = cursor.saturating_add(h).saturating_add(spacing);

            if let Some(patch) = narrow_hints(rule) {
                node_patches.insert(p.node.id.clone(), patch);
            }
        }

        debug_assert!(layout.items.iter().all(|i| i.x == 0 && i.right() <= columns));
        tracing::debug!(
            "Stacked {} nodes into {}-column layout ({} rows tall, {} hint patches)",
            layout.len(),
            layout.columns,
            cursor,
            node_patches.len()
        );

        ConversionResult {
            layout,
            node_patches,
        }
    }

    /// Expand a narrow layout into wide rows.
    ///
    /// Adjacent nodes whose types are compatible share a row, splitting the
    /// grid evenly; lone nodes take their type's preferred wide span.
    #[must_use]
    pub fn to_wide(&self, nodes: &[Node], narrow: &LayoutConfig) -> ConversionResult {
        let columns = self.wide_columns();
        let spacing = self.row_spacing();
        let max_group = usize::try_from(columns).unwrap_or(1);

        let mut placed = placements(nodes, narrow);
        placed.sort_by_key(Placed::source_y);

        let mut groups: Vec<Vec<Placed<'_>>> = Vec::new();
        for p in placed {
            let joins = groups.last().is_some_and(|group| {
                group.len() < max_group
                    && group
                        .last()
                        .is_some_and(|prev| self.config.is_compatible(&prev.node.kind, &p.node.kind))
            });
            match groups.last_mut() {
                Some(group) if joins => group.push(p),
                _ => groups.push(vec![p]),
            }
        }

        let mut layout = LayoutConfig::new(columns);
        let mut node_patches = NodePatches::new();
        let mut cursor: i32 = 0;

        for group in &groups {
            let mut row_height = 0;
            let width = if group.len() > 1 {
                columns / i32::try_from(group.len()).unwrap_or(columns)
            } else {
                group
                    .first()
                    .map_or(columns, |p| p.rule.preferred_wide_columns)
                    .clamp(1, columns)
            };

            for (slot, p) in (0..).zip(group) {
                let x = slot * width;
                let h = p.source.map_or(DEFAULT_MIN_HEIGHT, |item| item.h.max(1));
                row_height = row_height.max(h);
                layout
                    .items
                    .push(LayoutItem::new(p.node.id.clone(), x, cursor, width, h));

                if let Some(patch) = cleared_hints(p.node) {
                    node_patches.insert(p.node.id.clone(), patch);
                }
            }

            cursor = cursor.saturating_add(row_height).saturating_add(spacing);
        }

        debug_assert!(layout.items.iter().all(|i| i.x >= 0 && i.right() <= columns));
        tracing::debug!(
            "Expanded {} nodes into {} wide rows ({} hint clears)",
            layout.len(),
            groups.len(),
            node_patches.len()
        );

        ConversionResult {
            layout,
            node_patches,
        }
    }
}

/// Stack a wide layout into a narrow one with the default configuration.
#[must_use]
pub fn to_narrow(nodes: &[Node], master: &LayoutConfig) -> ConversionResult {
    ViewportConverter::new().to_narrow(nodes, master)
}

/// Expand a narrow layout into a wide one with the default configuration.
#[must_use]
pub fn to_wide(nodes: &[Node], narrow: &LayoutConfig) -> ConversionResult {
    ViewportConverter::new().to_wide(nodes, narrow)
}

/// Pair each distinct node (first occurrence wins) with its source item.
fn placements<'a>(nodes: &'a [Node], source: &'a LayoutConfig) -> Vec<Placed<'a>> {
    let mut index: HashMap<&NodeId, &LayoutItem> = HashMap::with_capacity(source.len());
    for item in &source.items {
        index.entry(&item.node_id).or_insert(item);
    }

    let mut seen: HashSet<&NodeId> = HashSet::with_capacity(nodes.len());
    let mut placed = Vec::with_capacity(nodes.len());
    for node in nodes {
        if seen.insert(&node.id) {
            placed.push(Placed {
                node,
                source: index.get(&node.id).copied(),
                rule: rule_for(&node.kind),
            });
        }
    }

    let orphans = index.keys().filter(|id| !seen.contains(**id)).count();
    if orphans > 0 {
        tracing::debug!("Dropping {orphans} layout items with no matching node");
    }
    placed
}

/// Per-type narrow height, derived from the wide height.
fn narrow_height(kind: &NodeKind, wide_h: i32) -> i32 {
    match kind {
        NodeKind::Heading => scale_floor(wide_h, 7, 10).max(HEADING_MIN_HEIGHT),
        NodeKind::Text => scale_ceil(wide_h, 6, 5).max(TEXT_MIN_HEIGHT),
        NodeKind::Table => scale_ceil(wide_h, 3, 2).max(TABLE_MIN_HEIGHT),
        NodeKind::Separator => SEPARATOR_HEIGHT,
        _ => wide_h.max(DEFAULT_MIN_HEIGHT),
    }
}

/// `floor(value * num / den)` in integer arithmetic.
fn scale_floor(value: i32, num: i32, den: i32) -> i32 {
    value.saturating_mul(num).div_euclid(den)
}

/// `ceil(value * num / den)` in integer arithmetic.
fn scale_ceil(value: i32, num: i32, den: i32) -> i32 {
    let negated = value.saturating_mul(num).saturating_neg();
    -(negated.div_euclid(den))
}

/// Content-adaptation patch for a node going narrow, if its rule has hints.
fn narrow_hints(rule: &MobileRule) -> Option<NodePatch> {
    if !rule.has_hints() {
        return None;
    }

    let mut patch = NodePatch::new();
    if let Some(styles) = &rule.mobile_specific_styles {
        patch.insert(MOBILE_STYLES_KEY.to_string(), styles.clone());
    }
    if let Some(scale) = rule.scale_font {
        patch.insert(FONT_SCALE_KEY.to_string(), serde_json::json!(scale));
    }
    if rule.adjust_spacing != Spacing::Normal {
        patch.insert(
            SPACING_KEY.to_string(),
            serde_json::json!(rule.adjust_spacing.as_str()),
        );
    }
    Some(patch)
}

/// Patch clearing whichever narrow hints the node currently carries.
fn cleared_hints(node: &Node) -> Option<NodePatch> {
    let patch: NodePatch = HINT_KEYS
        .iter()
        .filter(|key| node.data.contains_key(**key))
        .map(|key| ((*key).to_string(), serde_json::Value::Null))
        .collect();
    (!patch.is_empty()).then_some(patch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(id: &str, kind: NodeKind) -> Node {
        Node::new(id, kind)
    }

    fn ids(layout: &LayoutConfig) -> Vec<&str> {
        layout.items.iter().map(|i| i.node_id.as_str()).collect()
    }

    // ===========================================
    // Height heuristics
    // ===========================================

    #[test]
    fn test_integer_scaling() {
        assert_eq!(scale_floor(4, 7, 10), 2);
        assert_eq!(scale_floor(10, 7, 10), 7);
        assert_eq!(scale_ceil(8, 6, 5), 10);
        assert_eq!(scale_ceil(5, 6, 5), 6);
        assert_eq!(scale_ceil(3, 3, 2), 5);
        assert_eq!(scale_ceil(0, 6, 5), 0);
    }

    #[test]
    fn test_narrow_heights() {
        assert_eq!(narrow_height(&NodeKind::Heading, 4), 2);
        assert_eq!(narrow_height(&NodeKind::Heading, 1), HEADING_MIN_HEIGHT);
        assert_eq!(narrow_height(&NodeKind::Text, 8), 10);
        assert_eq!(narrow_height(&NodeKind::Text, 0), TEXT_MIN_HEIGHT);
        assert_eq!(narrow_height(&NodeKind::Table, 6), 9);
        assert_eq!(narrow_height(&NodeKind::Table, 2), TABLE_MIN_HEIGHT);
        assert_eq!(narrow_height(&NodeKind::Separator, 20), SEPARATOR_HEIGHT);
        assert_eq!(narrow_height(&NodeKind::Image, 7), 7);
        assert_eq!(narrow_height(&NodeKind::Image, 1), DEFAULT_MIN_HEIGHT);
    }

    // ===========================================
    // Wide to narrow
    // ===========================================

    #[test]
    fn test_to_narrow_heading_before_text() {
        let nodes = vec![node("t1", NodeKind::Text), node("h1", NodeKind::Heading)];
        let master = LayoutConfig::wide()
            .with_item(LayoutItem::new("h1", 0, 0, 12, 4))
            .with_item(LayoutItem::new("t1", 0, 6, 12, 8));

        let result = to_narrow(&nodes, &master);

        assert_eq!(result.layout.columns, 4);
        assert_eq!(
            result.layout.items,
            vec![
                LayoutItem::new("h1", 0, 0, 4, 2),
                LayoutItem::new("t1", 0, 4, 4, 10),
            ]
        );
    }

    #[test]
    fn test_to_narrow_priority_beats_position() {
        let nodes = vec![node("sep", NodeKind::Separator), node("h", NodeKind::Heading)];
        let master = LayoutConfig::wide()
            .with_item(LayoutItem::new("sep", 0, 0, 12, 1))
            .with_item(LayoutItem::new("h", 0, 20, 12, 4));

        let result = to_narrow(&nodes, &master);
        assert_eq!(ids(&result.layout), vec!["h", "sep"]);
    }

    #[test]
    fn test_to_narrow_same_priority_keeps_visual_order() {
        let nodes = vec![
            node("c", NodeKind::Text),
            node("a", NodeKind::Text),
            node("b", NodeKind::Quote),
        ];
        let master = LayoutConfig::wide()
            .with_item(LayoutItem::new("a", 0, 0, 6, 4))
            .with_item(LayoutItem::new("b", 6, 0, 6, 4))
            .with_item(LayoutItem::new("c", 0, 10, 12, 4));

        let result = to_narrow(&nodes, &master);
        // a and b tie on (priority, y); input order breaks the tie
        assert_eq!(ids(&result.layout), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_to_narrow_missing_item_gets_floor_height() {
        let nodes = vec![node("t", NodeKind::Text), node("tbl", NodeKind::Table)];
        let result = to_narrow(&nodes, &LayoutConfig::wide());

        assert_eq!(result.layout.len(), 2);
        assert_eq!(result.layout.items[0].h, TEXT_MIN_HEIGHT);
        assert_eq!(result.layout.items[1].h, TABLE_MIN_HEIGHT);
        assert_eq!(result.layout.items[1].y, TEXT_MIN_HEIGHT + 2);
    }

    #[test]
    fn test_to_narrow_drops_orphan_items() {
        let nodes = vec![node("a", NodeKind::Text)];
        let master = LayoutConfig::wide()
            .with_item(LayoutItem::new("a", 0, 0, 12, 4))
            .with_item(LayoutItem::new("gone", 0, 4, 12, 4));

        let result = to_narrow(&nodes, &master);
        assert_eq!(ids(&result.layout), vec!["a"]);
    }

    #[test]
    fn test_to_narrow_duplicate_nodes_placed_once() {
        let nodes = vec![node("a", NodeKind::Text), node("a", NodeKind::Text)];
        let result = to_narrow(&nodes, &LayoutConfig::wide());
        assert_eq!(result.layout.len(), 1);
    }

    #[test]
    fn test_to_narrow_empty_input() {
        let result = to_narrow(&[], &LayoutConfig::wide());
        assert!(result.layout.is_empty());
        assert!(result.node_patches.is_empty());
    }

    #[test]
    fn test_to_narrow_emits_hint_patches() {
        let nodes = vec![node("tbl", NodeKind::Table), node("t", NodeKind::Text)];
        let result = to_narrow(&nodes, &LayoutConfig::wide());

        let patch = result
            .node_patches
            .get(&NodeId::from("tbl"))
            .expect("table should get hints");
        assert_eq!(patch[FONT_SCALE_KEY], json!(0.85));
        assert_eq!(patch[SPACING_KEY], json!("compact"));
        assert_eq!(patch[MOBILE_STYLES_KEY], json!({"overflowX": "auto"}));
        assert!(!result.node_patches.contains_key(&NodeId::from("t")));
    }

    #[test]
    fn test_to_narrow_non_forced_width_is_clamped() {
        let config = ConverterConfig {
            narrow_columns: 2,
            ..ConverterConfig::default()
        };
        let converter = ViewportConverter::with_config(config);
        let result = converter.to_narrow(&[node("r", NodeKind::Reference)], &LayoutConfig::wide());
        assert_eq!(result.layout.items[0].w, 2);
    }

    // ===========================================
    // Narrow to wide
    // ===========================================

    #[test]
    fn test_to_wide_groups_compatible_pair() {
        let nodes = vec![node("img1", NodeKind::Image), node("txt1", NodeKind::Text)];
        let narrow = LayoutConfig::narrow()
            .with_item(LayoutItem::new("img1", 0, 0, 4, 6))
            .with_item(LayoutItem::new("txt1", 0, 8, 4, 10));

        let result = to_wide(&nodes, &narrow);

        assert_eq!(
            result.layout.items,
            vec![
                LayoutItem::new("img1", 0, 0, 6, 6),
                LayoutItem::new("txt1", 6, 0, 6, 10),
            ]
        );
    }

    #[test]
    fn test_to_wide_lone_widths() {
        let nodes = vec![
            node("t", NodeKind::Text),
            node("tbl", NodeKind::Table),
            node("img", NodeKind::Image),
            node("x", NodeKind::Other("kanban".to_string())),
        ];
        let narrow = LayoutConfig::narrow()
            .with_item(LayoutItem::new("t", 0, 0, 4, 3))
            .with_item(LayoutItem::new("tbl", 0, 5, 4, 6))
            .with_item(LayoutItem::new("img", 0, 13, 4, 4))
            .with_item(LayoutItem::new("x", 0, 19, 4, 4));

        let result = to_wide(&nodes, &narrow);
        let widths: Vec<i32> = result.layout.items.iter().map(|i| i.w).collect();
        assert_eq!(widths, vec![8, 12, 10, 10]);
        assert!(result.layout.items.iter().all(|i| i.x == 0));
    }

    #[test]
    fn test_to_wide_rows_advance_by_tallest_member() {
        let nodes = vec![
            node("h", NodeKind::Heading),
            node("t", NodeKind::Text),
            node("sep", NodeKind::Separator),
        ];
        let narrow = LayoutConfig::narrow()
            .with_item(LayoutItem::new("h", 0, 0, 4, 2))
            .with_item(LayoutItem::new("t", 0, 4, 4, 10))
            .with_item(LayoutItem::new("sep", 0, 16, 4, 1));

        let result = to_wide(&nodes, &narrow);
        let sep = result
            .layout
            .item_for(&NodeId::from("sep"))
            .expect("separator placed");
        assert_eq!(sep.y, 10 + 2);
        assert_eq!(sep.w, 12);
    }

    #[test]
    fn test_to_wide_chain_of_compatible_nodes() {
        // heading-text and text-image are both allowed, so all three share a row
        let nodes = vec![
            node("h", NodeKind::Heading),
            node("t", NodeKind::Text),
            node("i", NodeKind::Image),
        ];
        let narrow = LayoutConfig::narrow()
            .with_item(LayoutItem::new("h", 0, 0, 4, 2))
            .with_item(LayoutItem::new("t", 0, 4, 4, 3))
            .with_item(LayoutItem::new("i", 0, 9, 4, 4));

        let result = to_wide(&nodes, &narrow);
        let xs: Vec<(i32, i32)> = result.layout.items.iter().map(|i| (i.x, i.w)).collect();
        assert_eq!(xs, vec![(0, 4), (4, 4), (8, 4)]);
    }

    #[test]
    fn test_to_wide_incompatible_nodes_split_rows() {
        let nodes = vec![node("t", NodeKind::Text), node("tbl", NodeKind::Table)];
        let narrow = LayoutConfig::narrow()
            .with_item(LayoutItem::new("t", 0, 0, 4, 3))
            .with_item(LayoutItem::new("tbl", 0, 5, 4, 6));

        let result = to_wide(&nodes, &narrow);
        assert_eq!(result.layout.items[0].y, 0);
        assert_eq!(result.layout.items[1].y, 3 + 2);
    }

    #[test]
    fn test_to_wide_compatibility_is_symmetric() {
        let nodes = vec![node("r", NodeKind::Reference), node("c", NodeKind::Callout)];
        let narrow = LayoutConfig::narrow()
            .with_item(LayoutItem::new("r", 0, 0, 4, 3))
            .with_item(LayoutItem::new("c", 0, 5, 4, 3));

        let result = to_wide(&nodes, &narrow);
        assert!(result.layout.items.iter().all(|i| i.y == 0 && i.w == 6));
    }

    #[test]
    fn test_to_wide_clears_narrow_hints() {
        let nodes = vec![
            node("tbl", NodeKind::Table)
                .with_data(FONT_SCALE_KEY, json!(0.85))
                .with_data(SPACING_KEY, json!("compact"))
                .with_data("rows", json!(3)),
            node("t", NodeKind::Text),
        ];
        let result = to_wide(&nodes, &LayoutConfig::narrow());

        let patch = result
            .node_patches
            .get(&NodeId::from("tbl"))
            .expect("table hints cleared");
        assert_eq!(patch.len(), 2);
        assert!(patch[FONT_SCALE_KEY].is_null());
        assert!(patch[SPACING_KEY].is_null());
        assert!(!result.node_patches.contains_key(&NodeId::from("t")));
    }

    #[test]
    fn test_to_wide_missing_item_uses_floor() {
        let result = to_wide(&[node("a", NodeKind::Image)], &LayoutConfig::narrow());
        assert_eq!(result.layout.items[0].h, DEFAULT_MIN_HEIGHT);
    }

    #[test]
    fn test_to_wide_group_size_capped_by_columns() {
        let config = ConverterConfig {
            wide_columns: 2,
            compatible_pairs: vec![(NodeKind::Text, NodeKind::Text)],
            ..ConverterConfig::default()
        };
        let nodes: Vec<Node> = (0..5).map(|i| node(&format!("t{i}"), NodeKind::Text)).collect();
        let result = ViewportConverter::with_config(config).to_wide(&nodes, &LayoutConfig::narrow());

        assert!(result.layout.items.iter().all(|i| i.w >= 1 && i.right() <= 2));
        assert!(result.layout.find_overlap().is_none());
    }

    #[test]
    fn test_config_compatibility() {
        let config = ConverterConfig::default();
        assert!(config.is_compatible(&NodeKind::Image, &NodeKind::Text));
        assert!(config.is_compatible(&NodeKind::Text, &NodeKind::Heading));
        assert!(!config.is_compatible(&NodeKind::Text, &NodeKind::Text));
        assert!(!config.is_compatible(&NodeKind::Table, &NodeKind::Text));
    }

    #[test]
    fn test_config_serializes_pairs_as_tags() {
        let value = serde_json::to_value(ConverterConfig::default()).expect("should serialize");
        assert_eq!(value["compatiblePairs"][0], json!(["text", "image"]));
        assert_eq!(value["rowSpacing"], json!(2));
    }

    // ===========================================
    // Degenerate settings and extreme geometry
    // ===========================================

    fn two_texts() -> (Vec<Node>, LayoutConfig) {
        let nodes = vec![node("a", NodeKind::Text), node("b", NodeKind::Text)];
        let master = LayoutConfig::wide()
            .with_item(LayoutItem::new("a", 0, 0, 12, 3))
            .with_item(LayoutItem::new("b", 0, 4, 12, 3));
        (nodes, master)
    }

    #[test]
    fn test_to_narrow_zero_columns_stays_in_grid() {
        let (nodes, master) = two_texts();
        let converter = ViewportConverter::with_config(ConverterConfig {
            narrow_columns: 0,
            ..ConverterConfig::default()
        });

        let result = converter.to_narrow(&nodes, &master);
        assert_eq!(result.layout.columns, 1);
        assert!(result.layout.validate().is_ok());
        assert!(result.layout.items.iter().all(|i| i.w == 1));
    }

    #[test]
    fn test_to_wide_negative_columns_stays_in_grid() {
        let (nodes, _) = two_texts();
        let narrow = LayoutConfig::narrow()
            .with_item(LayoutItem::new("a", 0, 0, 4, 3))
            .with_item(LayoutItem::new("b", 0, 5, 4, 3));
        let converter = ViewportConverter::with_config(ConverterConfig {
            wide_columns: -4,
            ..ConverterConfig::default()
        });

        let result = converter.to_wide(&nodes, &narrow);
        assert_eq!(result.layout.columns, 1);
        assert!(result.layout.validate().is_ok());
        assert!(result.layout.find_overlap().is_none());
    }

    #[test]
    fn test_negative_row_spacing_does_not_overlap() {
        let (nodes, master) = two_texts();
        let converter = ViewportConverter::with_config(ConverterConfig {
            row_spacing: -3,
            ..ConverterConfig::default()
        });

        let narrow = converter.to_narrow(&nodes, &master).layout;
        assert!(narrow.find_overlap().is_none());
        assert_eq!(narrow.items[1].y, narrow.items[0].bottom());

        let wide = converter.to_wide(&nodes, &narrow).layout;
        assert!(wide.find_overlap().is_none());
    }

    #[test]
    fn test_huge_heights_saturate_instead_of_overflowing() {
        let nodes = vec![node("a", NodeKind::Image), node("b", NodeKind::Image)];
        let master = LayoutConfig::wide()
            .with_item(LayoutItem::new("a", 0, 0, 12, i32::MAX))
            .with_item(LayoutItem::new("b", 0, 0, 12, 4));

        let narrow = to_narrow(&nodes, &master).layout;
        assert_eq!(narrow.items[0].h, i32::MAX);
        assert_eq!(narrow.items[1].y, i32::MAX);
        assert!(narrow.find_overlap().is_none());

        let wide = to_wide(&nodes, &narrow).layout;
        assert!(wide.items.iter().all(|i| i.y >= 0));
        assert!(wide.find_overlap().is_none());
    }

    #[test]
    fn test_unknown_types_resolve_rule_once_per_node() {
        let nodes = vec![
            node("k1", NodeKind::from("kanban")),
            node("k2", NodeKind::from("kanban")),
        ];
        let source = LayoutConfig::wide();
        let placed = placements(&nodes, &source);
        assert_eq!(placed.len(), 2);
        assert!(placed.iter().all(|p| std::ptr::eq(p.rule, rule_for(&p.node.kind))));
    }

    #[test]
    fn test_spacing_hint_uses_wire_tag() {
        let patch = narrow_hints(rule_for(&NodeKind::Quote)).expect("quote has hints");
        assert_eq!(patch[SPACING_KEY], json!("loose"));
    }
}
