use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use entity::{User, UserPatch};
use serde::Serialize;
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{debug, info};

use crate::{CollectionError, ListQuery, SharedCollection};

pub const COLLECTION_PATH: &str = "/usuarios";

const TOTAL_COUNT: HeaderName = HeaderName::from_static("x-total-count");

pub fn router(collection: SharedCollection) -> Router {
    let header_name = HeaderName::from_static("x-request-id");
    Router::new()
        .route("/health", get(health_handler))
        .route(COLLECTION_PATH, get(list_handler).post(create_handler))
        .route(
            &format!("{COLLECTION_PATH}/{{id}}"),
            get(get_handler).put(update_handler),
        )
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), MakeRequestUuid))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer()),
        )
        .with_state(collection)
}

/// Browsers only let scripts read `X-Total-Count` when it is exposed.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([header::CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .expose_headers([TOTAL_COUNT])
}

async fn list_handler(
    State(collection): State<SharedCollection>,
    Query(query): Query<ListQuery>,
) -> HttpResult<(HeaderMap, Json<Vec<User>>)> {
    let (users, total) = collection.query(&query).await?;
    let mut headers = HeaderMap::new();
    if query.is_paginated() && collection.reports_total_count() {
        headers.insert(TOTAL_COUNT, HeaderValue::from(total));
    }
    debug!(returned = users.len(), total, "listing served");
    Ok((headers, Json(users)))
}

async fn get_handler(
    State(collection): State<SharedCollection>,
    Path(id): Path<String>,
) -> HttpResult<Json<User>> {
    collection
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| CollectionError::NotFound(id.clone()).into())
}

async fn create_handler(
    State(collection): State<SharedCollection>,
    body: Result<Json<User>, JsonRejection>,
) -> HttpResult<(StatusCode, Json<User>)> {
    let Json(user) = body.map_err(HttpError::bad_body)?;
    let created = collection.insert(user).await?;
    info!(id = %created.id, "user created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_handler(
    State(collection): State<SharedCollection>,
    Path(id): Path<String>,
    body: Result<Json<UserPatch>, JsonRejection>,
) -> HttpResult<Json<User>> {
    let Json(patch) = body.map_err(HttpError::bad_body)?;
    let updated = collection.patch(&id, &patch).await?;
    info!(%id, "user updated");
    Ok(Json(updated))
}

async fn health_handler(State(collection): State<SharedCollection>) -> impl IntoResponse {
    Json(HealthResponse {
        ok: true,
        records: collection.len().await,
    })
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    records: usize,
}

type HttpResult<T> = Result<T, HttpError>;

#[derive(Debug)]
struct HttpError {
    status: StatusCode,
    message: String,
}

impl HttpError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_body(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl From<CollectionError> for HttpError {
    fn from(err: CollectionError) -> Self {
        let status = match err {
            CollectionError::DuplicateId(_) => StatusCode::CONFLICT,
            CollectionError::NotFound(_) => StatusCode::NOT_FOUND,
            CollectionError::UnsupportedSort(_) => StatusCode::BAD_REQUEST,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Collection, seed_users};
    use axum::body::Body;
    use axum::http::Request;
    use entity::Estado;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn call(router: Router, request: Request<Body>) -> (StatusCode, HeaderMap, serde_json::Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, headers, body)
    }

    fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn paginated_listing_sets_total_count() {
        let app = router(Collection::shared(seed_users(7000, 25)));
        let request = Request::get("/usuarios?sector=7000&_limit=10&_page=2")
            .body(Body::empty())
            .unwrap();
        let (status, headers, body) = call(app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers.get("x-total-count").unwrap(), "25");
        assert_eq!(body.as_array().unwrap().len(), 10);
        assert!(headers.contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn plain_listing_has_no_total_count() {
        let app = router(Collection::shared(seed_users(7000, 3)));
        let request = Request::get("/usuarios").body(Body::empty()).unwrap();
        let (status, headers, body) = call(app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!headers.contains_key("x-total-count"));
        assert_eq!(body.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn total_count_can_be_omitted() {
        let collection = Collection::shared(seed_users(7000, 5));
        collection.omit_total_count(true);
        let request = Request::get("/usuarios?_limit=2&_page=1").body(Body::empty()).unwrap();
        let (status, headers, body) = call(router(collection), request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!headers.contains_key("x-total-count"));
        assert_eq!(body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unsupported_sort_is_bad_request_with_message() {
        let app = router(Collection::shared(seed_users(7000, 2)));
        let request = Request::get("/usuarios?_sort=sector").body(Body::empty()).unwrap();
        let (status, _, body) = call(app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "cannot sort by sector");
    }

    #[tokio::test]
    async fn create_then_conflict() {
        let collection = Collection::shared(Vec::new());
        let body = json!({"id": "1", "usuario": "ana", "estado": "ACTIVO", "sector": 7000});

        let (status, _, created) = call(
            router(collection.clone()),
            json_request(Method::POST, "/usuarios", body.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created, body);

        let (status, _, error) =
            call(router(collection), json_request(Method::POST, "/usuarios", body)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(error["error"], "user 1 already exists");
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let app = router(Collection::shared(Vec::new()));
        let (status, _, _) = call(
            app,
            json_request(Method::POST, "/usuarios", json!({"usuario": "sin id"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn put_merges_fields_and_404s_unknown_ids() {
        let collection = Collection::shared(seed_users(7000, 2));
        let (status, _, updated) = call(
            router(collection.clone()),
            json_request(Method::PUT, "/usuarios/2", json!({"estado": "INACTIVO"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["usuario"], "bruno2");
        assert_eq!(updated["estado"], "INACTIVO");
        assert_eq!(collection.get("2").await.unwrap().estado, Estado::Inactivo);

        let (status, _, _) = call(
            router(collection),
            json_request(Method::PUT, "/usuarios/42", json!({"estado": "INACTIVO"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_reports_record_count() {
        let app = router(Collection::shared(seed_users(7000, 4)));
        let (status, _, body) = call(app, Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"ok": true, "records": 4}));
    }
}
