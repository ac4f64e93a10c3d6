//! search/fetch compatibility layer
//!
//! A convenience pair on top of the specific tools: `search` resolves a
//! free-text query into addressable result ids, `fetch` resolves such an id
//! back into a full detail record. The ids are opaque pipe-delimited strings
//! that embed everything needed to reverse the encoding without any state.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

use qr_core::{Error, Result};

/// One search result, addressable via its `id` through `fetch`.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
    pub url: String,
}

/// Decoded form of a `search` result id.
///
/// Encoding is plain pipe-delimited text, as in `plate|AB123CD` and
/// `price|RHIAG|SKU1`. There is no escaping rule: a `|` inside the supplier
/// shifts the split, while a `|` inside the SKU survives because the SKU is
/// the trailing segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocId {
    Plate(String),
    Price { supplier: String, sku: String },
}

impl DocId {
    pub fn parse(id: &str) -> Result<Self> {
        if let Some(plate) = id.strip_prefix("plate|") {
            if plate.is_empty() {
                return Err(Error::unknown_document(id));
            }
            return Ok(DocId::Plate(plate.to_string()));
        }
        if let Some(rest) = id.strip_prefix("price|") {
            let mut parts = rest.splitn(2, '|');
            let supplier = parts.next().unwrap_or("");
            let sku = parts.next().unwrap_or("");
            if supplier.is_empty() || sku.is_empty() {
                return Err(Error::unknown_document(id));
            }
            return Ok(DocId::Price {
                supplier: supplier.to_string(),
                sku: sku.to_string(),
            });
        }
        Err(Error::unknown_document(id))
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocId::Plate(plate) => write!(f, "plate|{plate}"),
            DocId::Price { supplier, sku } => write!(f, "price|{supplier}|{sku}"),
        }
    }
}

fn plate_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)plate:([A-Z0-9]+)").unwrap())
}

fn supplier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)supplier:(\S+)").unwrap())
}

fn skus_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)skus:([A-Za-z0-9,\-_.]+)").unwrap())
}

/// Resolve a free-text query into zero or more addressable hits.
///
/// Recognized tokens: `plate:<PLATE>`, and `supplier:<NAME>` together with
/// `skus:<A,B,C>` (at most 3 SKUs are kept). Queries that match nothing
/// produce an empty list; the router turns that into an error result.
pub fn search(query: &str) -> Vec<SearchHit> {
    let mut hits = Vec::new();

    if let Some(cap) = plate_re().captures(query) {
        let plate = cap[1].to_uppercase();
        hits.push(SearchHit {
            id: DocId::Plate(plate.clone()).to_string(),
            title: format!("Veicolo {plate}"),
            url: format!("vehiclebyplate:{plate}"),
        });
    }

    let supplier = supplier_re().captures(query).map(|c| c[1].to_string());
    let skus = skus_re().captures(query).map(|c| c[1].to_string());
    if let (Some(supplier), Some(skus)) = (supplier, skus) {
        for sku in skus
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .take(3)
        {
            hits.push(SearchHit {
                id: DocId::Price {
                    supplier: supplier.clone(),
                    sku: sku.to_string(),
                }
                .to_string(),
                title: format!("Prezzo {sku} @ {supplier}"),
                url: format!("searchpriceandavailability:{supplier}:{sku}"),
            });
        }
    }

    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plate_query_round_trips_through_its_id() {
        let hits = search("plate:ab123cd");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "plate|AB123CD");

        match DocId::parse(&hits[0].id).unwrap() {
            DocId::Plate(p) => assert_eq!(p, "AB123CD"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn supplier_sku_query_round_trips_and_caps_at_three() {
        let hits = search("supplier:RHIAG skus:A1,B2,C3,D4");
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].id, "price|RHIAG|A1");

        match DocId::parse(&hits[2].id).unwrap() {
            DocId::Price { supplier, sku } => {
                assert_eq!(supplier, "RHIAG");
                assert_eq!(sku, "C3");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn combined_query_yields_both_kinds() {
        let hits = search("plate:AB123CD supplier:RHIAG skus:X9");
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn unsupported_query_yields_nothing() {
        assert!(search("what is this").is_empty());
        assert!(search("supplier:RHIAG").is_empty()); // skus missing
    }

    #[test]
    fn bogus_ids_are_rejected() {
        assert!(DocId::parse("plate|").is_err());
        assert!(DocId::parse("price|onlysupplier").is_err());
        assert!(DocId::parse("something|else").is_err());
        assert!(DocId::parse("").is_err());
    }

    #[test]
    fn pipe_in_sku_survives_decoding() {
        // No escaping rule exists; the SKU is the trailing segment.
        let id = DocId::Price {
            supplier: "S".into(),
            sku: "A|B".into(),
        }
        .to_string();
        match DocId::parse(&id).unwrap() {
            DocId::Price { supplier, sku } => {
                assert_eq!(supplier, "S");
                assert_eq!(sku, "A|B");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
