//! Exercises the reqwest clients against a local axum server standing in for
//! the publishing API, the taxonomy service and the asset manager.

use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use url::Url;

use publishing_sync::asset_manager::AssetManagerClient;
use publishing_sync::http::ServiceEndpoint;
use publishing_sync::publishing_api::PublishingApiClient;
use publishing_sync::taxonomy_api::TaxonomyClient;
use publishing_sync_core::contract::{AssetManager, AttributeMap, PublishingApi, TaxonomySnapshot};
use publishing_sync_core::jobs::{AssetUpdateJob, InMemoryJobQueue, JobQueue};
use publishing_sync_core::taxonomy::EditionTaxonsFetcher;
use publishing_sync_core::worker::{AssetManagerUpdateAssetWorker, UpdateOutcome};

const TOKEN: &str = "test-token";

#[derive(Clone, Default)]
struct Recorded {
    updates: Arc<Mutex<Vec<(String, Value)>>>,
    asset_lookups: Arc<Mutex<Vec<String>>>,
    auth_headers: Arc<Mutex<Vec<String>>>,
}

impl Recorded {
    fn record_auth(&self, headers: &HeaderMap) {
        if let Some(value) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
            self.auth_headers.lock().unwrap().push(value.to_string());
        }
    }
}

async fn expanded_links(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    Path(content_id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    recorded.record_auth(&headers);
    match content_id.as_str() {
        "edition-1" => Ok(Json(json!({
            "content_id": "edition-1",
            "expanded_links": {
                "taxons": [
                    {
                        "content_id": "published-child",
                        "title": "School funding",
                        "base_path": "/education/school-funding",
                        "links": {
                            "parent_taxons": [
                                {
                                    "content_id": "education",
                                    "title": "Education",
                                    "base_path": "/education",
                                    "links": {}
                                }
                            ]
                        }
                    },
                    {
                        "content_id": "hidden-draft",
                        "title": "Hidden",
                        "base_path": "/hidden"
                    }
                ]
            }
        }))),
        "broken" => Err(StatusCode::INTERNAL_SERVER_ERROR),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn links(Path(content_id): Path<String>) -> Result<Json<Value>, StatusCode> {
    if content_id == "edition-1" {
        Ok(Json(json!({
            "links": { "taxons": ["published-child", "hidden-draft"] },
            "version": 4
        })))
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

async fn published_taxons(Json(body): Json<Value>) -> Json<Value> {
    let matched: Vec<Value> = body["content_ids"]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .filter(|id| id.as_str().is_some_and(|id| id.starts_with("published")))
        .collect();
    Json(json!({ "content_ids": matched }))
}

async fn visible_draft_taxons(Json(_body): Json<Value>) -> Json<Value> {
    Json(json!({ "content_ids": [] }))
}

async fn whitehall_asset(
    State(recorded): State<Recorded>,
    Path(legacy_url_path): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    recorded
        .asset_lookups
        .lock()
        .unwrap()
        .push(legacy_url_path.clone());
    match legacy_url_path.as_str() {
        "draft.pdf" => Ok(Json(json!({
            "id": "http://asset-manager.dev.gov.uk/assets/asset-123",
            "draft": true,
            "state": "uploaded"
        }))),
        "live.pdf" => Ok(Json(json!({
            "id": "http://asset-manager.dev.gov.uk/assets/asset-456",
            "draft": false
        }))),
        "malformed.pdf" => Ok(Json(json!({
            "id": "http://asset-manager.dev.gov.uk/things/asset-789",
            "draft": true
        }))),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn update_asset(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    Path(asset_id): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    recorded.record_auth(&headers);
    recorded.updates.lock().unwrap().push((asset_id, body));
    Json(json!({}))
}

async fn start_server() -> (Url, Recorded) {
    let recorded = Recorded::default();
    let app = Router::new()
        .route("/v2/expanded-links/:content_id", get(expanded_links))
        .route("/v2/links/:content_id", get(links))
        .route("/taxonomy/published-taxons", post(published_taxons))
        .route("/taxonomy/visible-draft-taxons", post(visible_draft_taxons))
        .route("/whitehall_assets/*legacy_url_path", get(whitehall_asset))
        .route("/assets/:asset_id", put(update_asset))
        .with_state(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind local test server");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });

    let base_url = Url::parse(&format!("http://{addr}")).expect("valid base url");
    (base_url, recorded)
}

fn endpoint(base_url: &Url) -> ServiceEndpoint {
    ServiceEndpoint {
        base_url: base_url.clone(),
        bearer_token: TOKEN.to_string(),
        timeout: Some(std::time::Duration::from_secs(5)),
    }
}

#[tokio::test]
async fn publishing_api_client_decodes_expanded_links_and_sends_token() {
    let (base_url, recorded) = start_server().await;
    let client = PublishingApiClient::new(endpoint(&base_url)).unwrap();

    let links = client.get_expanded_links("edition-1").await.unwrap();

    assert_eq!(links.expanded_links.taxons.len(), 2);
    let first = &links.expanded_links.taxons[0];
    assert_eq!(first.links.parent_taxons[0].content_id, "education");
    assert!(links.expanded_links.taxons[1].links.parent_taxons.is_empty());
    assert_eq!(
        recorded.auth_headers.lock().unwrap().as_slice(),
        [format!("Bearer {TOKEN}")]
    );
}

#[tokio::test]
async fn publishing_api_client_maps_404_and_server_errors() {
    let (base_url, _recorded) = start_server().await;
    let client = PublishingApiClient::new(endpoint(&base_url)).unwrap();

    let missing = client.get_expanded_links("unknown").await.unwrap_err();
    assert!(missing.is_not_found(), "got {missing:?}");

    let broken = client.get_expanded_links("broken").await.unwrap_err();
    assert!(
        matches!(broken, publishing_sync_core::contract::ServiceError::Http { status: 500, .. }),
        "got {broken:?}"
    );

    let link_set = client.get_links("edition-1").await.unwrap();
    assert_eq!(link_set.links.taxons, vec!["published-child", "hidden-draft"]);
    assert_eq!(link_set.version, Some(4));
    assert!(client.get_links("unknown").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn taxonomy_client_posts_content_ids() {
    let (base_url, _recorded) = start_server().await;
    let client = TaxonomyClient::new(endpoint(&base_url)).unwrap();
    let ids = vec!["published-a".to_string(), "draft-b".to_string()];

    assert_eq!(
        client.matching_against_published_taxons(&ids).await.unwrap(),
        vec!["published-a"]
    );
    assert!(client
        .matching_against_visible_draft_taxons(&ids)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn edition_taxons_fetcher_runs_against_http_clients() {
    let (base_url, _recorded) = start_server().await;
    let publishing_api = PublishingApiClient::new(endpoint(&base_url)).unwrap();
    let taxonomy = TaxonomyClient::new(endpoint(&base_url)).unwrap();

    let fetcher = EditionTaxonsFetcher::new("edition-1", &publishing_api, &taxonomy);
    let taxons = fetcher.fetch().await.unwrap();

    assert_eq!(taxons.len(), 1);
    assert_eq!(taxons[0].content_id, "published-child");
    assert_eq!(taxons[0].breadcrumb(), vec!["Education", "School funding"]);

    let unknown = EditionTaxonsFetcher::new("unknown", &publishing_api, &taxonomy);
    assert!(unknown.fetch().await.unwrap().is_empty());
}

#[tokio::test]
async fn asset_manager_client_wraps_updates_in_asset_key() {
    let (base_url, recorded) = start_server().await;
    let client = AssetManagerClient::new(endpoint(&base_url)).unwrap();

    let asset = client.whitehall_asset("/draft.pdf").await.unwrap();
    assert_eq!(
        asset.self_url(),
        Some("http://asset-manager.dev.gov.uk/assets/asset-123")
    );
    assert!(client.whitehall_asset("absent.pdf").await.unwrap_err().is_not_found());

    let mut attributes = AttributeMap::new();
    attributes.insert("draft".to_string(), json!(false));
    client.update_asset("asset-123", &attributes).await.unwrap();

    let updates = recorded.updates.lock().unwrap();
    assert_eq!(
        updates.as_slice(),
        [("asset-123".to_string(), json!({ "asset": { "draft": false } }))]
    );
}

#[tokio::test]
async fn worker_and_queue_update_only_stale_assets() {
    let (base_url, recorded) = start_server().await;
    let client = AssetManagerClient::new(endpoint(&base_url)).unwrap();
    let worker = AssetManagerUpdateAssetWorker::new(&client);

    let mut attributes = AttributeMap::new();
    attributes.insert("draft".to_string(), json!(false));
    let outcome = worker.perform("draft.pdf", &attributes).await.unwrap();
    assert_eq!(
        outcome,
        UpdateOutcome::Updated {
            asset_id: "asset-123".to_string()
        }
    );

    let queue = InMemoryJobQueue::new(2);
    for path in ["live.pdf", "malformed.pdf", "absent.pdf"] {
        queue.enqueue(AssetUpdateJob::set_draft(path, false)).await.unwrap();
    }
    let report = queue.drain(&worker).await;

    assert!(report.updated.is_empty());
    assert_eq!(report.unchanged, 1);
    let mut dead: Vec<_> = report
        .dead
        .iter()
        .map(|d| d.job.legacy_url_path.as_str())
        .collect();
    dead.sort();
    assert_eq!(dead, vec!["absent.pdf", "malformed.pdf"]);
    assert_eq!(recorded.updates.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn asset_manager_client_sends_reserved_characters_inside_the_path() {
    let (base_url, recorded) = start_server().await;
    let client = AssetManagerClient::new(endpoint(&base_url)).unwrap();
    let dir = "/government/uploads/system/uploads/attachment_data/file/1";

    for filename in ["report#2.pdf", "q?a.pdf", "annual report.pdf"] {
        let err = client
            .whitehall_asset(&format!("{dir}/{filename}"))
            .await
            .unwrap_err();
        assert!(err.is_not_found(), "got {err:?}");
    }

    assert_eq!(
        recorded.asset_lookups.lock().unwrap().as_slice(),
        [
            "government/uploads/system/uploads/attachment_data/file/1/report#2.pdf",
            "government/uploads/system/uploads/attachment_data/file/1/q?a.pdf",
            "government/uploads/system/uploads/attachment_data/file/1/annual report.pdf",
        ]
    );
}
