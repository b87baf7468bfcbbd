//! Customer route handlers.

use axum::{
    Json,
    extract::{FromRequest, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use customers_core::{CreatedCustomer, CustomerPayload, DeletedCustomer, NameSlug, PageRequest};

use crate::error::AppError;
use crate::state::AppState;

/// JSON body extractor that reports malformed bodies as code 100.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query parameters for `GET /customers`.
///
/// Kept as raw strings so that unparseable values fall back to defaults
/// instead of rejecting the request.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub name: Option<String>,
    pub page: Option<String>,
    pub size: Option<String>,
    /// Legacy alias for `size`.
    pub limit: Option<String>,
}

impl ListQuery {
    /// Collect the known keys from raw query pairs.
    ///
    /// The first occurrence of a repeated key wins; unknown keys are ignored.
    #[must_use]
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "name" => &mut query.name,
                "page" => &mut query.page,
                "size" => &mut query.size,
                "limit" => &mut query.limit,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }
}

/// List customers, or look one up by name when `?name=` is present.
pub async fn list(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let query = ListQuery::from_pairs(pairs);
    if let Some(slug) = query.name.as_deref().and_then(|n| NameSlug::parse(n).ok()) {
        let customer = state.customers().find_by_name(&slug).await?;
        return Ok(Json(customer).into_response());
    }

    let request = PageRequest::from_query(
        query.page.as_deref(),
        query.size.as_deref(),
        query.limit.as_deref(),
    );
    let page = state.customers().list(request).await?;
    Ok(Json(page).into_response())
}

/// Get a customer by id.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let customer = state.customers().get(&id).await?;
    Ok(Json(customer).into_response())
}

/// Create a customer. Responds 201 with the new id only.
pub async fn create(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CustomerPayload>,
) -> Result<(StatusCode, Json<CreatedCustomer>), AppError> {
    let id = state.customers().create(payload).await?;
    Ok((StatusCode::CREATED, Json(CreatedCustomer { id })))
}

/// Partially update a customer. Responds 200 with an empty body.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<CustomerPayload>,
) -> Result<StatusCode, AppError> {
    state.customers().update(&id, payload).await?;
    Ok(StatusCode::OK)
}

/// Delete a customer.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedCustomer>, AppError> {
    let id = state.customers().delete(&id).await?;
    Ok(Json(DeletedCustomer::new(id)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Router,
        body::Body,
        http::{Method, Request, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::db::MemoryCustomerRepository;

    fn app() -> Router {
        let state = AppState::new(Arc::new(MemoryCustomerRepository::new()));
        crate::app(state)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn jane() -> Value {
        json!({
            "name": "Jane Doe",
            "email": "jane@example.com",
            "phone": "555-0100",
            "address": "1 Main St",
            "country": "Canada"
        })
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let app = app();
        let (status, body) = send(&app, Method::POST, "/customers", Some(jane())).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["id"].as_i64().unwrap();
        assert_eq!(body.as_object().unwrap().len(), 1);

        let (status, body) = send(&app, Method::GET, &format!("/customers/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Jane Doe");
        assert!(body["region"].is_null());
        assert!(body["postalZip"].is_null());
        assert!(body["numberrange"].is_null());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let app = app();
        send(&app, Method::POST, "/customers", Some(jane())).await;
        let (status, body) = send(&app, Method::POST, "/customers", Some(jane())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], 200);
        assert_eq!(body["error"]["message"], "Email already exists");
    }

    #[tokio::test]
    async fn test_missing_fields() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/customers",
            Some(json!({"name": "A", "phone": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], 102);
        assert_eq!(
            body["error"]["fields"],
            json!(["email", "phone", "address", "country"])
        );
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_input() {
        let app = app();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/customers")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], 100);
    }

    #[tokio::test]
    async fn test_non_numeric_id() {
        let app = app();
        for method in [Method::GET, Method::DELETE] {
            let (status, body) = send(&app, method, "/customers/abc", None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"]["code"], 100);
        }
        let (status, _) = send(&app, Method::PUT, "/customers/-3", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_returns_empty_ok() {
        let app = app();
        send(&app, Method::POST, "/customers", Some(jane())).await;

        let (status, body) = send(
            &app,
            Method::PUT,
            "/customers/1",
            Some(json!({"email": "jane.doe@example.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_null());

        let (_, body) = send(&app, Method::GET, "/customers/1", None).await;
        assert_eq!(body["email"], "jane.doe@example.com");
        assert_eq!(body["name"], "Jane Doe");
    }

    #[tokio::test]
    async fn test_update_missing_customer() {
        let app = app();
        let (status, body) =
            send(&app, Method::PUT, "/customers/5", Some(json!({"email": "bad"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], 300);
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let app = app();
        send(&app, Method::POST, "/customers", Some(jane())).await;

        let (status, body) = send(&app, Method::DELETE, "/customers/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deletedId"], 1);
        assert_eq!(body["message"], "Customer deleted successfully");

        let (status, _) = send(&app, Method::DELETE, "/customers/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_and_name_lookup() {
        let app = app();
        send(&app, Method::POST, "/customers", Some(jane())).await;

        let (status, body) = send(&app, Method::GET, "/customers?size=1000", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["size"], 100);
        assert_eq!(body["total"], 1);
        assert_eq!(body["count"], 1);

        let (status, body) = send(&app, Method::GET, "/customers?name=jane-doe", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "jane@example.com");

        let (status, body) = send(&app, Method::GET, "/customers?name=john-smith", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "Customer 'john smith' not found");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let app = app();
        let (status, body) = send(&app, Method::GET, "/orders", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_unsupported_method_is_route_not_found() {
        let app = app();
        for (method, uri) in [
            (Method::PATCH, "/customers/1"),
            (Method::POST, "/health"),
            (Method::DELETE, "/customers"),
        ] {
            let (status, body) = send(&app, method.clone(), uri, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
            assert_eq!(body["error"]["message"], "Route not found");
            assert_eq!(body["error"]["code"], "NOT_FOUND");
        }
    }

    #[tokio::test]
    async fn test_repeated_query_keys_use_first_value() {
        let app = app();
        send(&app, Method::POST, "/customers", Some(jane())).await;

        let (status, body) =
            send(&app, Method::GET, "/customers?page=1&page=2&size=x", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["page"], 1);
        assert_eq!(body["size"], 20);
        assert_eq!(body["count"], 1);
    }

    #[tokio::test]
    async fn test_blank_name_lists_instead_of_lookup() {
        let app = app();
        send(&app, Method::POST, "/customers", Some(jane())).await;

        let (status, body) = send(&app, Method::GET, "/customers?name=%20", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["customers"][0]["name"], "Jane Doe");
    }

    #[tokio::test]
    async fn test_mistyped_fields_are_invalid_body() {
        let app = app();
        let mut numeric_zip = jane();
        numeric_zip["postalZip"] = json!(10117);
        let mut text_range = jane();
        text_range["numberrange"] = json!("7");

        for body in [numeric_zip, text_range] {
            let (status, body) = send(&app, Method::POST, "/customers", Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"]["code"], 100);
            assert_eq!(body["error"]["message"], "Invalid request body");
        }
    }

    #[test]
    fn test_list_query_from_pairs() {
        let pairs = vec![
            ("limit".to_string(), "5".to_string()),
            ("name".to_string(), "jane-doe".to_string()),
            ("name".to_string(), "john".to_string()),
            ("sort".to_string(), "id".to_string()),
        ];
        assert_eq!(
            ListQuery::from_pairs(pairs),
            ListQuery {
                name: Some("jane-doe".to_string()),
                limit: Some("5".to_string()),
                ..ListQuery::default()
            }
        );
    }

    #[tokio::test]
    async fn test_health_and_request_id() {
        let app = app();
        let response = app
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));

        let (status, _) = send(&app, Method::GET, "/health/ready", None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
