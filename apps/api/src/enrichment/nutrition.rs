//! Nutrition lookups against FoodData Central, routed through the expiring cache.
//!
//! One request per ingredient, asking for the single best match. Only matches
//! are cached; misses and failures come back as `matched: false` and are
//! retried on the next call.

use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::Duration;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::enrichment::cache::ExpiringCache;

/// Namespace for nutrition slots in the cache store.
pub const CACHE_NAMESPACE: &str = "usda";

#[derive(Debug, Error)]
pub enum NutritionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Nutrition API returned status {0}")]
    Status(u16),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nutrient {
    pub name: String,
    pub value: f64,
}

/// Outcome of one lookup. `matched` is false when the source had no hit or failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionRecord {
    pub ingredient_query: String,
    pub matched: bool,
    pub nutrients: Vec<Nutrient>,
    pub is_branded: bool,
    pub description: Option<String>,
    /// Serving size of the match in grams, when the source reports one.
    pub serving_size: Option<f64>,
}

impl NutritionRecord {
    pub fn unmatched(query: &str) -> Self {
        Self {
            ingredient_query: query.to_string(),
            matched: false,
            nutrients: Vec::new(),
            is_branded: false,
            description: None,
            serving_size: None,
        }
    }

    pub fn has_nutrient(&self, name: &str) -> bool {
        self.nutrients.iter().any(|n| n.name == name)
    }
}

/// Anything that can answer "what is in this ingredient". Never fails; a
/// failed lookup is an unmatched record.
#[async_trait]
pub trait NutritionLookup: Send + Sync {
    async fn lookup(&self, ingredient: &str) -> NutritionRecord;
}

// FoodData Central search response. Field aliases cover the live API names.

#[derive(Debug, Deserialize)]
struct FoodSearchResponse {
    #[serde(default)]
    foods: Vec<FoodHit>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FoodHit {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    serving_size: Option<f64>,
    #[serde(default)]
    brand_owner: Option<String>,
    #[serde(default, alias = "foodNutrients")]
    nutrients: Vec<FoodNutrient>,
}

#[derive(Debug, Deserialize)]
struct FoodNutrient {
    #[serde(default, alias = "nutrientName")]
    name: String,
    #[serde(default)]
    value: Option<f64>,
}

pub struct NutritionLookupClient {
    http: Client,
    base_url: String,
    api_key: String,
    cache: ExpiringCache<NutritionRecord>,
    ttl: Duration,
}

impl NutritionLookupClient {
    pub fn new(
        base_url: &str,
        api_key: String,
        timeout: StdDuration,
        cache: ExpiringCache<NutritionRecord>,
        ttl: Duration,
    ) -> Result<Self, NutritionError> {
        Ok(Self {
            http: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            cache,
            ttl,
        })
    }

    async fn search(&self, ingredient: &str) -> Result<Option<FoodHit>, NutritionError> {
        let response = self
            .http
            .get(format!("{}/foods/search", self.base_url))
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("query", ingredient),
                ("pageSize", "1"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NutritionError::Status(status.as_u16()));
        }

        let body: FoodSearchResponse = response.json().await?;
        Ok(body.foods.into_iter().next())
    }
}

#[async_trait]
impl NutritionLookup for NutritionLookupClient {
    async fn lookup(&self, ingredient: &str) -> NutritionRecord {
        let query = ingredient.trim();
        if query.is_empty() {
            return NutritionRecord::unmatched(query);
        }

        if let Some(record) = self.cache.get(query).await {
            return record;
        }

        match self.search(query).await {
            Ok(Some(hit)) => {
                let record = record_from_hit(query, hit);
                debug!(
                    "Nutrition match for {query:?}: {:?} ({} nutrients)",
                    record.description,
                    record.nutrients.len()
                );
                self.cache.set(query, record.clone(), self.ttl).await;
                record
            }
            Ok(None) => {
                info!("No nutrition match for {query:?}");
                NutritionRecord::unmatched(query)
            }
            Err(e) => {
                warn!("Nutrition lookup failed for {query:?}: {e}");
                NutritionRecord::unmatched(query)
            }
        }
    }
}

fn record_from_hit(query: &str, hit: FoodHit) -> NutritionRecord {
    NutritionRecord {
        ingredient_query: query.to_string(),
        matched: true,
        nutrients: hit
            .nutrients
            .into_iter()
            .filter(|n| !n.name.is_empty())
            .map(|n| Nutrient {
                name: n.name,
                value: n.value.unwrap_or(0.0),
            })
            .collect(),
        is_branded: hit.brand_owner.is_some_and(|b| !b.trim().is_empty()),
        description: hit.description,
        serving_size: hit.serving_size,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mockito::Matcher;

    use super::*;
    use crate::enrichment::cache::tests::ManualClock;
    use crate::enrichment::cache::MemoryCacheStore;

    fn client_for(base_url: &str) -> NutritionLookupClient {
        let clock = Arc::new(ManualClock::new(chrono::Utc::now()));
        let cache = ExpiringCache::new(Arc::new(MemoryCacheStore::new()), clock, CACHE_NAMESPACE);
        NutritionLookupClient::new(
            base_url,
            "test-key".to_string(),
            StdDuration::from_secs(2),
            cache,
            Duration::days(30),
        )
        .unwrap()
    }

    const CHICKPEA_BODY: &str = r#"{
        "foods": [{
            "description": "Chickpeas, canned",
            "servingSize": 130,
            "brandOwner": "Goya Foods",
            "nutrients": [
                {"name": "Protein", "value": 7.2},
                {"name": "Fiber, total dietary", "value": 6.4}
            ]
        }]
    }"#;

    #[tokio::test]
    async fn test_match_is_parsed_and_cached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/foods/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("query".into(), "chickpeas".into()),
                Matcher::UrlEncoded("pageSize".into(), "1".into()),
                Matcher::UrlEncoded("api_key".into(), "test-key".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(CHICKPEA_BODY)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let record = client.lookup("chickpeas").await;
        assert!(record.matched);
        assert!(record.is_branded);
        assert!(record.has_nutrient("Protein"));
        assert_eq!(record.serving_size, Some(130.0));
        assert_eq!(record.description.as_deref(), Some("Chickpeas, canned"));

        // Second lookup is served from cache; the mock only allows one hit.
        let again = client.lookup("chickpeas").await;
        assert_eq!(again, record);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_live_field_names_are_accepted() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/foods/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"foods": [{"description": "Spinach, raw",
                    "foodNutrients": [{"nutrientName": "Vitamin A, RAE", "value": 469.0},
                                      {"nutrientName": "Iron, Fe", "value": null}]}]}"#,
            )
            .create_async()
            .await;

        let record = client_for(&server.url()).lookup("spinach").await;
        assert!(record.matched);
        assert!(!record.is_branded);
        assert_eq!(record.nutrients.len(), 2);
        assert_eq!(record.nutrients[0].name, "Vitamin A, RAE");
        assert_eq!(record.nutrients[1].value, 0.0);
    }

    #[tokio::test]
    async fn test_server_error_is_unmatched_and_not_cached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/foods/search")
            .match_query(Matcher::Any)
            .with_status(503)
            .expect(2)
            .create_async()
            .await;

        let client = client_for(&server.url());
        assert!(!client.lookup("saffron").await.matched);
        assert!(!client.lookup("saffron").await.matched);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_result_set_is_unmatched() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/foods/search")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"foods": []}"#)
            .create_async()
            .await;

        let record = client_for(&server.url()).lookup("unobtainium").await;
        assert!(!record.matched);
        assert_eq!(record.ingredient_query, "unobtainium");
    }

    #[tokio::test]
    async fn test_unreachable_source_is_unmatched() {
        let record = client_for("http://127.0.0.1:1").lookup("salt").await;
        assert!(!record.matched);
    }

    #[tokio::test]
    async fn test_blank_query_skips_the_request() {
        let record = client_for("http://127.0.0.1:1").lookup("   ").await;
        assert!(!record.matched);
    }
}
