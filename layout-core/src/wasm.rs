//! WebAssembly bindings for layout-core.
//!
//! Every call takes and returns JSON strings so the editor can pass its own
//! store state straight through.

use wasm_bindgen::prelude::*;

use crate::regenerate::{regenerate, RegenerateMode};
use crate::{fingerprint, ConverterConfig, LayoutConfig, Node, StoredLayouts, ViewportConverter};

/// Initialize the layout WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
}

/// Layout engine instance for WASM.
#[wasm_bindgen]
pub struct WasmLayoutEngine {
    converter: ViewportConverter,
}

#[wasm_bindgen]
impl WasmLayoutEngine {
    /// Create an engine with the default converter configuration.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        Self {
            converter: ViewportConverter::new(),
        }
    }

    /// Create an engine from a JSON converter configuration.
    ///
    /// # Errors
    ///
    /// Returns an error string if JSON parsing fails.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config_json: &str) -> Result<WasmLayoutEngine, String> {
        let config: ConverterConfig = parse(config_json)?;
        Ok(Self {
            converter: ViewportConverter::with_config(config),
        })
    }

    /// Get the active converter configuration as JSON.
    #[wasm_bindgen(js_name = getConfigJson)]
    #[must_use]
    pub fn get_config_json(&self) -> String {
        serde_json::to_string(self.converter.config()).unwrap_or_default()
    }

    /// Fingerprint a layout configuration.
    ///
    /// # Errors
    ///
    /// Returns an error string if JSON parsing fails.
    pub fn fingerprint(&self, layout_json: &str) -> Result<String, String> {
        let layout: LayoutConfig = parse(layout_json)?;
        Ok(fingerprint(&layout).to_string())
    }

    /// Convert a wide layout to a narrow one; returns a conversion result.
    ///
    /// # Errors
    ///
    /// Returns an error string if JSON parsing fails.
    #[wasm_bindgen(js_name = toNarrow)]
    pub fn to_narrow(&self, nodes_json: &str, layout_json: &str) -> Result<String, String> {
        let nodes: Vec<Node> = parse(nodes_json)?;
        let layout: LayoutConfig = parse(layout_json)?;
        render(&self.converter.to_narrow(&nodes, &layout))
    }

    /// Convert a narrow layout to a wide one; returns a conversion result.
    ///
    /// # Errors
    ///
    /// Returns an error string if JSON parsing fails.
    #[wasm_bindgen(js_name = toWide)]
    pub fn to_wide(&self, nodes_json: &str, layout_json: &str) -> Result<String, String> {
        let nodes: Vec<Node> = parse(nodes_json)?;
        let layout: LayoutConfig = parse(layout_json)?;
        render(&self.converter.to_wide(&nodes, &layout))
    }

    /// Return stored layouts in the versioned format.
    ///
    /// # Errors
    ///
    /// Returns an error string if the layouts match neither format.
    #[wasm_bindgen(js_name = ensureVersioned)]
    pub fn ensure_versioned(&self, layouts_json: &str) -> Result<String, String> {
        let stored = StoredLayouts::from_json(layouts_json).map_err(|e| e.to_string())?;
        render(&stored.ensure_versioned())
    }

    /// Check whether stored layouts need their narrow side regenerated.
    ///
    /// # Errors
    ///
    /// Returns an error string if the layouts match neither format.
    #[wasm_bindgen(js_name = isStale)]
    pub fn is_stale(&self, layouts_json: &str) -> Result<bool, String> {
        let stored = StoredLayouts::from_json(layouts_json).map_err(|e| e.to_string())?;
        Ok(stored.ensure_versioned().is_stale())
    }

    /// Regenerate the narrow layout if needed (or always, with `force`).
    ///
    /// # Errors
    ///
    /// Returns an error string if JSON parsing fails.
    pub fn regenerate(
        &self,
        nodes_json: &str,
        layouts_json: &str,
        force: bool,
    ) -> Result<String, String> {
        let nodes: Vec<Node> = parse(nodes_json)?;
        let pair = StoredLayouts::from_json(layouts_json)
            .map_err(|e| e.to_string())?
            .ensure_versioned();
        let mode = if force {
            RegenerateMode::Force
        } else {
            RegenerateMode::IfStale
        };
        render(&regenerate(&pair, &nodes, &self.converter, mode))
    }
}

impl Default for WasmLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn parse<T: serde::de::DeserializeOwned>(json: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| e.to_string())
}

fn render<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| e.to_string())
}
