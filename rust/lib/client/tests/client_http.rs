//! Client tests against a real HTTP server.
//!
//! Starts an axum app that speaks the Directus items envelope, then drives
//! every `DirectusClient` method through actual requests.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query as AxumQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};

use pabrik_client::{ApiError, DirectusClient, NoAuth, Query, StaticToken, StoredToken};
use pabrik_core::{DirectusConfig, Record, RecordId};
use pabrik_kv::MemoryStore;

// =====================================================================
// Fake Directus
// =====================================================================

#[derive(Clone, Default)]
struct Fake {
    items: Arc<Mutex<BTreeMap<String, Vec<Value>>>>,
    seen_auth: Arc<Mutex<Vec<Option<String>>>>,
    seen_query: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

impl Fake {
    fn seed(&self, collection: &str, rows: Value) {
        let rows = rows.as_array().cloned().unwrap_or_default();
        self.items.lock().unwrap().insert(collection.to_string(), rows);
    }

    fn note(&self, headers: &HeaderMap, query: Option<HashMap<String, String>>) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        self.seen_auth.lock().unwrap().push(auth);
        if let Some(q) = query {
            self.seen_query.lock().unwrap().push(q);
        }
    }
}

fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({"errors": [{"message": "You don't have permission to access this."}]})),
    )
        .into_response()
}

fn same_id(row: &Value, id: &str) -> bool {
    match &row["id"] {
        Value::Number(n) => n.to_string() == id,
        Value::String(s) => s == id,
        _ => false,
    }
}

async fn list_items(
    State(fake): State<Fake>,
    Path(collection): Path<String>,
    AxumQuery(query): AxumQuery<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    fake.note(&headers, Some(query.clone()));
    match collection.as_str() {
        "forbidden" => return forbidden(),
        "broken" => return (StatusCode::INTERNAL_SERVER_ERROR, "oops").into_response(),
        "garbled" => return (StatusCode::OK, "{not json").into_response(),
        "nulldata" => return Json(json!({"data": null})).into_response(),
        _ => {}
    }
    let mut rows = fake
        .items
        .lock()
        .unwrap()
        .get(&collection)
        .cloned()
        .unwrap_or_default();
    let total = rows.len();
    if let Some(limit) = query.get("limit").and_then(|l| l.parse::<usize>().ok()) {
        rows.truncate(limit);
    }
    if query.contains_key("meta") {
        Json(json!({"data": rows, "meta": {"total_count": total}})).into_response()
    } else {
        Json(json!({"data": rows})).into_response()
    }
}

async fn create_item(
    State(fake): State<Fake>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    fake.note(&headers, None);
    if collection == "forbidden" {
        return forbidden();
    }
    let mut items = fake.items.lock().unwrap();
    let rows = items.entry(collection).or_default();
    body["id"] = json!(rows.len() as i64 + 1);
    rows.push(body.clone());
    Json(json!({"data": body})).into_response()
}

async fn get_item(
    State(fake): State<Fake>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    fake.note(&headers, None);
    let items = fake.items.lock().unwrap();
    match items
        .get(&collection)
        .and_then(|rows| rows.iter().find(|r| same_id(r, &id)))
    {
        Some(row) => Json(json!({"data": row})).into_response(),
        None => forbidden(),
    }
}

async fn patch_item(
    State(fake): State<Fake>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(patch): Json<Value>,
) -> Response {
    fake.note(&headers, None);
    let mut items = fake.items.lock().unwrap();
    let Some(row) = items
        .get_mut(&collection)
        .and_then(|rows| rows.iter_mut().find(|r| same_id(r, &id)))
    else {
        return forbidden();
    };
    if let (Some(obj), Some(p)) = (row.as_object_mut(), patch.as_object()) {
        for (k, v) in p {
            obj.insert(k.clone(), v.clone());
        }
    }
    Json(json!({"data": row.clone()})).into_response()
}

async fn delete_item(
    State(fake): State<Fake>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    fake.note(&headers, None);
    let mut items = fake.items.lock().unwrap();
    let Some(rows) = items.get_mut(&collection) else {
        return forbidden();
    };
    let before = rows.len();
    rows.retain(|r| !same_id(r, &id));
    if rows.len() == before {
        return forbidden();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn start(fake: Fake) -> String {
    let app = Router::new()
        .route("/items/{collection}", get(list_items).post(create_item))
        .route(
            "/items/{collection}/{id}",
            get(get_item).patch(patch_item).delete(delete_item),
        )
        .with_state(fake);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn client_for(fake: &Fake) -> DirectusClient {
    let base = start(fake.clone()).await;
    DirectusClient::from_config(&DirectusConfig::new(base).with_token("test-token")).unwrap()
}

// =====================================================================
// Tests
// =====================================================================

#[tokio::test]
async fn crud_roundtrip_through_http() {
    let fake = Fake::default();
    let client = client_for(&fake).await;

    let created: Record = client
        .create("gudang", &json!({"kode_gudang": "G01", "nama_gudang": "Utama"}))
        .await
        .unwrap();
    let id = pabrik_core::record_id(&created).unwrap();
    assert_eq!(id, RecordId::Int(1));

    let fetched: Option<Record> = client.get("gudang", &id, &Query::new()).await.unwrap();
    assert_eq!(fetched.unwrap()["nama_gudang"], "Utama");

    let updated: Record = client
        .update("gudang", &id, &json!({"nama_gudang": "Gudang Utama"}))
        .await
        .unwrap();
    assert_eq!(updated["nama_gudang"], "Gudang Utama");
    assert_eq!(updated["kode_gudang"], "G01");

    client.delete("gudang", &id).await.unwrap();
    let rows: Vec<Record> = client.list("gudang", &Query::new()).await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn bearer_token_is_attached() {
    let fake = Fake::default();
    let client = client_for(&fake).await;
    let _: Vec<Record> = client.list("spk", &Query::new()).await.unwrap();

    let anon = client.with_token_source(Arc::new(NoAuth));
    let _: Vec<Record> = anon.list("spk", &Query::new()).await.unwrap();

    let seen = fake.seen_auth.lock().unwrap().clone();
    assert_eq!(seen, vec![Some("Bearer test-token".to_string()), None]);
}

#[tokio::test]
async fn stored_token_changes_apply_to_next_request() {
    let fake = Fake::default();
    let client = client_for(&fake).await;
    let store = Arc::new(MemoryStore::new());
    let client = client.with_token_source(Arc::new(StoredToken::new(
        store.clone(),
        Some("fallback".into()),
    )));

    let _: Vec<Record> = client.list("spk", &Query::new()).await.unwrap();
    StoredToken::save(store.as_ref(), "fresh").unwrap();
    let _: Vec<Record> = client.list("spk", &Query::new()).await.unwrap();

    let seen = fake.seen_auth.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![
            Some("Bearer fallback".to_string()),
            Some("Bearer fresh".to_string())
        ]
    );
}

#[tokio::test]
async fn query_parameters_reach_the_server() {
    let fake = Fake::default();
    fake.seed("rawmaterial", json!([{"id": 1, "kode": "A"}, {"id": 2, "kode": "B"}]));
    let client = client_for(&fake).await;

    let query = Query::new()
        .fields(&["id", "kode"])
        .eq("status", "published")
        .sort_desc("kode")
        .limit(1)
        .meta("total_count");
    let page = client.list_page::<Record>("rawmaterial", &query).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.meta.unwrap()["total_count"], 2);

    let seen = fake.seen_query.lock().unwrap().clone();
    let q = &seen[0];
    assert_eq!(q["fields"], "id,kode");
    assert_eq!(q["filter[status][_eq]"], "published");
    assert_eq!(q["sort"], "-kode");
    assert_eq!(q["limit"], "1");
}

#[tokio::test]
async fn remote_error_carries_status_and_message() {
    let fake = Fake::default();
    let client = client_for(&fake).await;

    let err = client
        .list::<Record>("forbidden", &Query::new())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert_eq!(
        err.message(),
        Some("You don't have permission to access this.")
    );

    let err = client.list::<Record>("broken", &Query::new()).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.message(), None);
}

#[tokio::test]
async fn garbled_body_is_decode_error_and_null_data_is_empty() {
    let fake = Fake::default();
    let client = client_for(&fake).await;

    let err = client.list::<Record>("garbled", &Query::new()).await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));

    let rows = client.list::<Record>("nulldata", &Query::new()).await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = DirectusConfig::new(format!("http://{addr}"));
    let client = DirectusClient::new(&config, Arc::new(StaticToken::new("t"))).unwrap();
    let err = client.list::<Record>("spk", &Query::new()).await.unwrap_err();
    assert_eq!(err.error_code(), "TRANSPORT");

    let status = client.ping("spk").await;
    assert!(!status.success);
    assert_eq!(status.status, 0);
}

#[tokio::test]
async fn ping_reports_status() {
    let fake = Fake::default();
    let client = client_for(&fake).await;

    let ok = client.ping("spk").await;
    assert!(ok.success);
    assert_eq!(ok.message, "Connection successful");

    let denied = client.ping("forbidden").await;
    assert!(!denied.success);
    assert_eq!(denied.status, 403);
    assert_eq!(denied.message, "HTTP 403");
}

#[tokio::test]
async fn typed_collection_view() {
    #[derive(Debug, serde::Deserialize)]
    struct Gudang {
        id: i64,
        kode_gudang: String,
    }

    let fake = Fake::default();
    fake.seed("gudang", json!([{"id": 4, "kode_gudang": "G04", "extra": true}]));
    let client = client_for(&fake).await;

    let gudang = client.collection::<Gudang>("gudang");
    let rows = gudang.list(&Query::new()).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, 4);
    assert_eq!(rows[0].kode_gudang, "G04");

    let missing = gudang.get(&RecordId::Int(99)).await.unwrap_err();
    assert_eq!(missing.status(), Some(403));
}
