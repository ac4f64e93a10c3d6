//! Tool Catalog
//!
//! Static list of the invocable tools, built once at first use and immutable
//! thereafter. The whole catalog is announced verbatim (never filtered per
//! client) each time a session opens.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::OnceLock;

/// One catalog entry: name, description, and a JSON-schema-like input shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Correlation id used for the catalog announcement event.
pub const CATALOG_EVENT_ID: &str = "tools";

fn build_catalog() -> Vec<ToolInfo> {
    vec![
        // Standard MCP compatibility pair
        ToolInfo {
            name: "search".to_string(),
            description:
                "Ricerca Qricambi. Formati: 'plate:AB123CD' o 'supplier:NOME skus:SKU1,SKU2,SKU3'."
                    .to_string(),
            input_schema: json!({
                "type": "object",
                "required": ["query"],
                "properties": { "query": { "type": "string" } }
            }),
        },
        ToolInfo {
            name: "fetch".to_string(),
            description: "Dettaglio per un id restituito da search.".to_string(),
            input_schema: json!({
                "type": "object",
                "required": ["id"],
                "properties": { "id": { "type": "string" } }
            }),
        },
        // Qricambi-specific tools
        ToolInfo {
            name: "qricambi.mysupplier".to_string(),
            description: "Elenco fornitori salvati nel tuo account Qricambi".to_string(),
            input_schema: json!({ "type": "object", "properties": {} }),
        },
        ToolInfo {
            name: "qricambi.searchPriceAvailability".to_string(),
            description: "Prezzi netti e disponibilità per un fornitore".to_string(),
            input_schema: json!({
                "type": "object",
                "required": ["supplier", "skus"],
                "properties": {
                    "supplier": { "type": "string" },
                    "skus": { "type": "array", "maxItems": 3, "items": { "type": "string" } },
                    "qty": { "type": "integer", "minimum": 1 },
                    "brand_input": { "type": "string" },
                    "user": { "type": "string" },
                    "password": { "type": "string" }
                }
            }),
        },
        ToolInfo {
            name: "qricambi.vehicleByPlate".to_string(),
            description: "Dati veicolo da targa IT".to_string(),
            input_schema: json!({
                "type": "object",
                "required": ["plate"],
                "properties": { "plate": { "type": "string" } }
            }),
        },
    ]
}

/// The process-wide tool catalog.
pub fn tool_catalog() -> &'static [ToolInfo] {
    static CATALOG: OnceLock<Vec<ToolInfo>> = OnceLock::new();
    CATALOG.get_or_init(build_catalog)
}

/// The catalog announcement payload sent on session open.
pub fn catalog_announcement() -> Value {
    json!({
        "jsonrpc": "2.0",
        "method": "tools/list",
        "result": { "tools": tool_catalog() }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_names_are_unique() {
        let mut names: Vec<_> = tool_catalog().iter().map(|t| t.name.as_str()).collect();
        names.sort();
        let before = names.len();
        names.dedup();
        assert_eq!(before, names.len());
    }

    #[test]
    fn every_schema_is_an_object_schema() {
        for tool in tool_catalog() {
            assert_eq!(tool.input_schema["type"], "object", "tool {}", tool.name);
        }
    }

    #[test]
    fn skus_schema_is_bounded_to_three() {
        let price = tool_catalog()
            .iter()
            .find(|t| t.name == "qricambi.searchPriceAvailability")
            .unwrap();
        assert_eq!(price.input_schema["properties"]["skus"]["maxItems"], 3);
    }

    #[test]
    fn announcement_lists_all_tools() {
        let ann = catalog_announcement();
        assert_eq!(ann["method"], "tools/list");
        assert_eq!(
            ann["result"]["tools"].as_array().unwrap().len(),
            tool_catalog().len()
        );
        // serialized with the wire key, not a rust-side rename
        assert!(ann["result"]["tools"][0].get("input_schema").is_some());
    }
}
