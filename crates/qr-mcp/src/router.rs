//! Tool Router
//!
//! Maps an incoming invocation (tool name + arguments) onto a closed set of
//! operation variants, validates inputs before anything goes upstream, and
//! converts every outcome into a protocol payload. Nothing that happens in
//! here can take the session down: errors become error results, full stop.

use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use qr_api::{PriceQuery, QricambiApi};
use qr_core::{Error, Result};

use crate::compat::{self, DocId};
use crate::protocol::{content_payload, error_payload};

/// The closed set of operations this gateway supports.
///
/// Adding or removing a tool means touching this enum and getting exhaustive
/// match coverage from the compiler, instead of a stringly-typed fallthrough.
#[derive(Debug, Clone)]
pub enum ToolCall {
    /// Free-text search resolving to addressable result ids.
    Search { query: String },
    /// Detail record for an id produced by `Search`.
    Fetch { id: String },
    /// Suppliers saved in the account.
    MySuppliers,
    /// Net prices and availability for a supplier (1..=3 SKUs).
    PriceAvailability(PriceQuery),
    /// Vehicle data from an Italian plate.
    VehicleByPlate { plate: String },
}

impl ToolCall {
    /// Map a tool name and raw arguments onto an operation variant.
    pub fn parse(name: &str, arguments: Value) -> Result<Self> {
        match name {
            "search" => {
                let query = required_str(&arguments, "query")?;
                Ok(ToolCall::Search { query })
            }
            "fetch" => {
                let id = required_str(&arguments, "id")?;
                Ok(ToolCall::Fetch { id })
            }
            "qricambi.mysupplier" => Ok(ToolCall::MySuppliers),
            "qricambi.searchPriceAvailability" => {
                let query: PriceQuery = serde_json::from_value(arguments)
                    .map_err(|e| Error::invalid_argument(e.to_string()))?;
                Ok(ToolCall::PriceAvailability(query))
            }
            "qricambi.vehicleByPlate" => {
                let plate = required_str(&arguments, "plate")?;
                Ok(ToolCall::VehicleByPlate { plate })
            }
            other => Err(Error::unknown_tool(other)),
        }
    }
}

fn required_str(arguments: &Value, key: &str) -> Result<String> {
    arguments
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::invalid_argument(format!("missing required field '{key}'")))
}

/// Dispatches parsed invocations to the upstream client.
pub struct ToolRouter {
    api: Arc<dyn QricambiApi>,
}

impl ToolRouter {
    pub fn new(api: Arc<dyn QricambiApi>) -> Self {
        Self { api }
    }

    /// Handle one `tools/call` invocation end to end.
    ///
    /// Always produces a payload; failures are content-wrapped error results.
    pub async fn handle_call(&self, name: &str, arguments: Value) -> Value {
        debug!(tool = name, "dispatching tool call");
        let outcome = match ToolCall::parse(name, arguments) {
            Ok(call) => self.dispatch(call).await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(value) => content_payload(&value),
            Err(e) => {
                warn!(tool = name, error = %e, "tool call failed");
                error_payload(e.to_string())
            }
        }
    }

    /// One exhaustive dispatch over the operation set.
    pub async fn dispatch(&self, call: ToolCall) -> Result<Value> {
        match call {
            ToolCall::Search { query } => {
                let hits = compat::search(&query);
                if hits.is_empty() {
                    return Err(Error::invalid_argument(format!(
                        "unsupported query: {query}"
                    )));
                }
                Ok(json!({ "results": hits }))
            }

            ToolCall::Fetch { id } => match DocId::parse(&id)? {
                DocId::Plate(plate) => {
                    let data = self.api.vehicle_by_plate(&plate).await?;
                    Ok(json!({
                        "id": id,
                        "title": format!("Veicolo {plate}"),
                        "text": data.to_string(),
                        "url": format!("vehiclebyplate:{plate}"),
                    }))
                }
                DocId::Price { supplier, sku } => {
                    let data = self
                        .api
                        .price_availability(&PriceQuery::single(&supplier, &sku))
                        .await?;
                    Ok(json!({
                        "id": id,
                        "title": format!("Prezzo {sku} @ {supplier}"),
                        "text": data.to_string(),
                        "url": format!("searchpriceandavailability:{supplier}:{sku}"),
                    }))
                }
            },

            ToolCall::MySuppliers => self.api.my_suppliers().await,

            ToolCall::PriceAvailability(query) => {
                // Bound check happens here, before any upstream traffic.
                if query.skus.is_empty() || query.skus.len() > 3 {
                    return Err(Error::invalid_argument("1-3 SKUs required"));
                }
                self.api.price_availability(&query).await
            }

            ToolCall::VehicleByPlate { plate } => self.api.vehicle_by_plate(&plate).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Stub upstream that counts calls and returns canned documents.
    #[derive(Default)]
    struct StubApi {
        calls: AtomicUsize,
    }

    impl StubApi {
        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl QricambiApi for StubApi {
        async fn vehicle_by_plate(&self, plate: &str) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!({ "model": "X", "plate": plate }))
        }

        async fn my_suppliers(&self) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!({ "suppliers": ["RHIAG"] }))
        }

        async fn price_availability(&self, query: &PriceQuery) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!({ "supplier": query.supplier, "skus": query.skus }))
        }
    }

    fn router() -> (ToolRouter, Arc<StubApi>) {
        let api = Arc::new(StubApi::default());
        (ToolRouter::new(api.clone()), api)
    }

    fn inner_text(payload: &Value) -> Value {
        serde_json::from_str(payload["content"][0]["text"].as_str().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn vehicle_by_plate_happy_path() {
        let (router, api) = router();
        let payload = router
            .handle_call("qricambi.vehicleByPlate", json!({"plate": "AB123CD"}))
            .await;
        let inner = inner_text(&payload);
        assert_eq!(inner["model"], "X");
        assert_eq!(api.call_count(), 1);
    }

    #[tokio::test]
    async fn sku_bounds_are_enforced_locally() {
        let (router, api) = router();

        let empty = router
            .handle_call(
                "qricambi.searchPriceAvailability",
                json!({"supplier": "RHIAG", "skus": []}),
            )
            .await;
        assert!(inner_text(&empty)["error"].as_str().unwrap().contains("1-3 SKUs"));

        let four = router
            .handle_call(
                "qricambi.searchPriceAvailability",
                json!({"supplier": "RHIAG", "skus": ["a", "b", "c", "d"]}),
            )
            .await;
        assert!(inner_text(&four).get("error").is_some());

        // No upstream call was made for either violation.
        assert_eq!(api.call_count(), 0);

        let ok = router
            .handle_call(
                "qricambi.searchPriceAvailability",
                json!({"supplier": "RHIAG", "skus": ["a"]}),
            )
            .await;
        assert!(inner_text(&ok).get("error").is_none());
        assert_eq!(api.call_count(), 1);
    }

    #[tokio::test]
    async fn unknown_tool_is_a_local_error() {
        let (router, api) = router();
        let payload = router.handle_call("qricambi.nope", json!({})).await;
        let msg = inner_text(&payload)["error"].as_str().unwrap().to_string();
        assert!(msg.contains("unknown tool"));
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn search_never_touches_upstream() {
        let (router, api) = router();
        let payload = router
            .handle_call("search", json!({"query": "plate:AB123CD"}))
            .await;
        let inner = inner_text(&payload);
        assert_eq!(inner["results"][0]["id"], "plate|AB123CD");
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn search_then_fetch_round_trip() {
        let (router, _api) = router();
        let payload = router
            .handle_call("search", json!({"query": "plate:AB123CD"}))
            .await;
        let id = inner_text(&payload)["results"][0]["id"]
            .as_str()
            .unwrap()
            .to_string();

        let detail = router.handle_call("fetch", json!({ "id": id })).await;
        let inner = inner_text(&detail);
        assert_eq!(inner["url"], "vehiclebyplate:AB123CD");
        assert!(inner["text"].as_str().unwrap().contains("AB123CD"));
    }

    #[tokio::test]
    async fn fetch_price_id_resolves_supplier_and_sku() {
        let (router, _api) = router();
        let detail = router
            .handle_call("fetch", json!({"id": "price|RHIAG|SKU1"}))
            .await;
        let inner = inner_text(&detail);
        assert_eq!(inner["title"], "Prezzo SKU1 @ RHIAG");
        let data: Value = serde_json::from_str(inner["text"].as_str().unwrap()).unwrap();
        assert_eq!(data["supplier"], "RHIAG");
        assert_eq!(data["skus"][0], "SKU1");
    }

    #[tokio::test]
    async fn unresolvable_fetch_id_is_an_error_result() {
        let (router, api) = router();
        let payload = router.handle_call("fetch", json!({"id": "garbage"})).await;
        assert!(inner_text(&payload).get("error").is_some());
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn upstream_failure_surfaces_as_error_result() {
        struct FailingApi;

        #[async_trait]
        impl QricambiApi for FailingApi {
            async fn vehicle_by_plate(&self, _plate: &str) -> Result<Value> {
                Err(Error::upstream("Qricambi API error 503"))
            }
            async fn my_suppliers(&self) -> Result<Value> {
                Err(Error::MissingCredential)
            }
            async fn price_availability(&self, _q: &PriceQuery) -> Result<Value> {
                Err(Error::upstream("boom"))
            }
        }

        let router = ToolRouter::new(Arc::new(FailingApi));

        let payload = router
            .handle_call("qricambi.vehicleByPlate", json!({"plate": "AB123CD"}))
            .await;
        assert!(inner_text(&payload)["error"]
            .as_str()
            .unwrap()
            .contains("503"));

        // Missing credential is scoped to the call, surfaced the same way.
        let payload = router.handle_call("qricambi.mysupplier", json!({})).await;
        assert!(inner_text(&payload)["error"]
            .as_str()
            .unwrap()
            .contains("QRICAMBI_BEARER"));
    }
}
