//! # Layout Core
//!
//! Responsive layout conversion between a wide multi-column grid and a
//! narrow single-column grid. Compiles to WASM for use inside editors.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              layout-core.wasm               │
//! ├─────────────────────────────────────────────┤
//! │  Versioning        │  Conversion            │
//! │  - Master/derived  │  - Wide → narrow stack │
//! │  - Legacy migrate  │  - Narrow → wide rows  │
//! │  - Staleness       │  - Per-type rules      │
//! ├─────────────────────────────────────────────┤
//! │  Fingerprinting    │  Regeneration          │
//! │  - Order-free hash │  - Reuse / keep / redo │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Every operation is a pure function of its inputs. Pairs are values:
//! transitions return a new pair rather than mutating in place.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod convert;
pub mod document;
pub mod error;
pub mod fingerprint;
pub mod grid;
pub mod node;
pub mod pair;
pub mod regenerate;
pub mod rules;
pub mod state;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use convert::{to_narrow, to_wide, ConversionResult, ConverterConfig, ViewportConverter};
pub use document::{LayoutDocument, StoredDocument};
pub use error::{LayoutError, LayoutResult};
pub use fingerprint::{fingerprint, Fingerprint};
pub use grid::{LayoutConfig, LayoutItem, Viewport};
pub use node::{Node, NodeData, NodeId, NodeKind, NodePatch, NodePatches};
pub use pair::{
    DerivedLayout, LayoutRole, LegacyLayoutPair, MasterLayout, StoredLayouts, VersionedLayoutPair,
};
pub use regenerate::{regenerate, Outcome, RegenerateMode, Regeneration};
pub use rules::{rule_for, MobileRule, Spacing};

/// Layout core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
