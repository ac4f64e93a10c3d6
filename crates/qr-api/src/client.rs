//! Qricambi API client implementation

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use qr_core::{Error, GatewayConfig, Result};

/// Qricambi API endpoints
pub mod endpoints {
    /// Vehicle data by Italian plate (GET, `plate` query parameter)
    pub const VEHICLE_BY_PLATE: &str = "/vehiclebyplate";

    /// Suppliers saved in the account (GET)
    pub const MY_SUPPLIER: &str = "/mysupplier";

    /// Net prices and availability (POST, JSON body)
    pub const SEARCH_PRICE_AVAILABILITY: &str = "/searchpriceandavailability";
}

/// Arguments for the price/availability operation.
///
/// `skus` is bounded to 1..=3 entries; the router validates the bound before
/// this ever reaches the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceQuery {
    pub supplier: String,
    pub skus: Vec<String>,
    #[serde(default)]
    pub qty: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl PriceQuery {
    /// Single-SKU query with default quantity, used by the compat fetch path.
    pub fn single(supplier: impl Into<String>, sku: impl Into<String>) -> Self {
        Self {
            supplier: supplier.into(),
            skus: vec![sku.into()],
            qty: Some(1),
            brand_input: None,
            user: None,
            password: None,
        }
    }
}

/// Upstream operations, one per supported capability.
///
/// This is the seam tests stub out: the router only ever sees this trait.
#[async_trait]
pub trait QricambiApi: Send + Sync {
    /// Vehicle data for an Italian plate.
    async fn vehicle_by_plate(&self, plate: &str) -> Result<Value>;

    /// Suppliers saved in the account.
    async fn my_suppliers(&self) -> Result<Value>;

    /// Net prices and availability for a supplier.
    async fn price_availability(&self, query: &PriceQuery) -> Result<Value>;
}

/// reqwest-backed implementation against the live API.
pub struct QricambiClient {
    http: Client,
    config: Arc<GatewayConfig>,
}

impl QricambiClient {
    pub fn new(config: Arc<GatewayConfig>) -> Self {
        Self {
            http: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            config,
        }
    }

    /// `Authorization` header value, or a credential error scoped to this call.
    fn bearer(&self) -> Result<String> {
        self.config
            .bearer
            .as_deref()
            .map(|t| format!("Bearer {t}"))
            .ok_or(Error::MissingCredential)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base.trim_end_matches('/'), path)
    }

    /// Normalize a response into a JSON document or a typed failure.
    async fn read_json(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::upstream(format!("Qricambi API error {status}: {body}")));
        }
        response
            .json::<Value>()
            .await
            .map_err(|e| Error::malformed_response(e.to_string()))
    }
}

#[async_trait]
impl QricambiApi for QricambiClient {
    async fn vehicle_by_plate(&self, plate: &str) -> Result<Value> {
        let bearer = self.bearer()?;
        let url = self.url(endpoints::VEHICLE_BY_PLATE);
        debug!(%plate, "vehiclebyplate request");

        let response = self
            .http
            .get(&url)
            .query(&[("plate", plate)])
            .header("Authorization", bearer)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| Error::upstream(e.to_string()))?;

        Self::read_json(response).await
    }

    async fn my_suppliers(&self) -> Result<Value> {
        let bearer = self.bearer()?;
        let url = self.url(endpoints::MY_SUPPLIER);
        debug!("mysupplier request");

        let response = self
            .http
            .get(&url)
            .header("Authorization", bearer)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| Error::upstream(e.to_string()))?;

        Self::read_json(response).await
    }

    async fn price_availability(&self, query: &PriceQuery) -> Result<Value> {
        let bearer = self.bearer()?;
        let url = self.url(endpoints::SEARCH_PRICE_AVAILABILITY);
        debug!(supplier = %query.supplier, skus = query.skus.len(), "searchpriceandavailability request");

        let body = serde_json::json!({
            "supplier": query.supplier,
            "skus": query.skus,
            "qty": query.qty.unwrap_or(1),
            "brand_input": query.brand_input,
            "user": query.user,
            "password": query.password,
        });

        let response = self
            .http
            .post(&url)
            .header("Authorization", bearer)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::upstream(e.to_string()))?;

        Self::read_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_without_bearer() -> QricambiClient {
        QricambiClient::new(Arc::new(GatewayConfig::default()))
    }

    #[tokio::test]
    async fn missing_bearer_fails_before_any_network_io() {
        // api_base points at the real host, but the bearer check runs first
        // so no request is ever issued.
        let client = client_without_bearer();
        let err = client.vehicle_by_plate("AB123CD").await.unwrap_err();
        assert!(matches!(err, Error::MissingCredential));

        let err = client.my_suppliers().await.unwrap_err();
        assert!(matches!(err, Error::MissingCredential));

        let err = client
            .price_availability(&PriceQuery::single("RHIAG", "SKU1"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingCredential));
    }

    #[test]
    fn price_query_deserializes_with_optional_fields() {
        let q: PriceQuery = serde_json::from_value(serde_json::json!({
            "supplier": "RHIAG",
            "skus": ["A", "B"]
        }))
        .unwrap();
        assert_eq!(q.supplier, "RHIAG");
        assert_eq!(q.skus.len(), 2);
        assert!(q.qty.is_none());
        assert!(q.brand_input.is_none());
    }

    #[test]
    fn url_join_tolerates_trailing_slash() {
        let cfg = GatewayConfig {
            api_base: "https://api.qricambi.com/".to_string(),
            ..Default::default()
        };
        let client = QricambiClient::new(Arc::new(cfg));
        assert_eq!(
            client.url(endpoints::MY_SUPPLIER),
            "https://api.qricambi.com/mysupplier"
        );
    }
}
