//! REST endpoints: auth, product CRUD, album export, health.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{Map, Value};

use crate::albums::{to_csv, EXPORT_LIMIT};
use crate::auth::{hash_password, verify_password, AuthState};
use crate::domain::{validate_credentials, validate_patch, NewUser, Product, ProductDraft};
use crate::server::AppState;

use super::error::ApiError;
use super::types::{
    CredentialsRequest, HealthResponse, LoginResponse, MessageResponse, RegisterResponse,
};

/// Build the `/api/v1` router.
///
/// The auth middleware gates only the mutating product routes; reads,
/// creation, and the auth routes are open by design.
pub fn router(auth_state: AuthState) -> Router<AppState> {
    let protected = Router::new()
        .route("/productos/:id", put(update_product).delete(delete_product))
        .route_layer(axum::middleware::from_fn_with_state(
            auth_state,
            crate::auth::auth_middleware,
        ));

    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/productos", post(create_product).get(list_products))
        .route("/productos/:id", get(get_product))
        .route("/albums/csv", get(albums_csv))
        .merge(protected)
}

/// JSON 404 for unmatched routes, matching the error body shape.
pub async fn fallback() -> ApiError {
    ApiError::not_found("route not found")
}

/// Health report at the root, outside the versioned prefix.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        db_provider: state.config.db_provider.as_str(),
        auth_method: state.config.auth_method.as_str(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

type Body<T> = Result<Json<T>, JsonRejection>;

/// Unwrap a JSON body, normalizing axum's rejection into the error shape.
fn json_body<T>(body: Body<T>) -> Result<T, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(ApiError::bad_request(rejection.body_text())),
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

fn required_credentials(body: &CredentialsRequest) -> Result<(&str, &str), ApiError> {
    match (body.username.as_deref(), body.password.as_deref()) {
        (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
            Ok((username, password))
        }
        _ => Err(ApiError::bad_request(
            "fields \"username\" and \"password\" are required",
        )),
    }
}

fn invalid_credentials() -> ApiError {
    // Unknown user and wrong password share one message: no enumeration leak.
    ApiError::unauthorized("invalid credentials")
}

async fn register(
    State(state): State<AppState>,
    body: Body<CredentialsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let body = json_body(body)?;
    let (username, password) = required_credentials(&body)?;

    validate_credentials(username, password)
        .map_err(|errors| ApiError::bad_request(errors.join(", ")))?;

    let password_hash = hash_password(password)
        .map_err(|e| ApiError::internal(format!("password hashing failed: {e}")))?;
    let user = state.users.create(NewUser::new(username, password_hash)).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "user registered successfully".to_string(),
            user,
        }),
    ))
}

async fn login(
    State(state): State<AppState>,
    body: Body<CredentialsRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let body = json_body(body)?;
    let (username, password) = required_credentials(&body)?;

    let user = state
        .users
        .verify_credentials(username, password)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !verify_password(password, &user.password) {
        return Err(invalid_credentials());
    }

    let token = state
        .jwt
        .issue(&user.id, &user.username)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(Json(LoginResponse {
        message: "login successful".to_string(),
        token,
        user: user.public(),
    }))
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

fn product_not_found(id: &str) -> ApiError {
    ApiError::not_found(format!("product not found: {id}"))
}

async fn create_product(
    State(state): State<AppState>,
    body: Body<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let body = json_body(body)?;
    let draft = ProductDraft::from_value(&body)
        .map_err(|errors| ApiError::bad_request(errors.join(", ")))?;

    let product = state.products.create(draft).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.products.find_all().await?))
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    state
        .products
        .find_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| product_not_found(&id))
}

async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Body<Map<String, Value>>,
) -> Result<Json<Product>, ApiError> {
    let patch = json_body(body)?;
    validate_patch(&patch).map_err(|errors| ApiError::bad_request(errors.join(", ")))?;

    state
        .products
        .update(&id, patch)
        .await?
        .map(Json)
        .ok_or_else(|| product_not_found(&id))
}

async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if state.products.delete(&id).await? {
        Ok(Json(MessageResponse {
            message: format!("product deleted: {id}"),
        }))
    } else {
        Err(product_not_found(&id))
    }
}

// ---------------------------------------------------------------------------
// Albums
// ---------------------------------------------------------------------------

async fn albums_csv(State(state): State<AppState>) -> Result<Response, ApiError> {
    let albums = state
        .albums
        .fetch_first(EXPORT_LIMIT)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    let csv = to_csv(&albums);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"albums_15.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use chrono::Duration;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::albums::AlbumsClient;
    use crate::auth::{AuthMethod, JwtVerifier};
    use crate::infra::{
        DbProvider, MockProductRepository, MockUserRepository, RepositoryError,
    };
    use crate::server::{build_router, AppState, Config};

    use super::*;

    fn test_config() -> Config {
        Config {
            db_provider: DbProvider::Json,
            mongo_uri: String::new(),
            json_db_path: "unused.json".into(),
            auth_method: AuthMethod::ApiKey,
            api_key: "k".to_string(),
            jwt_secret: "test-secret".to_string(),
            jwt_expires_in_secs: 3600,
            albums_url: "http://127.0.0.1:1/albums".to_string(),
            listen_addr: "127.0.0.1:0".parse().unwrap(),
            cors_allow_origins: Vec::new(),
        }
    }

    fn state_with(
        products: MockProductRepository,
        users: MockUserRepository,
    ) -> AppState {
        let config = test_config();
        AppState {
            jwt: Arc::new(JwtVerifier::new(
                config.jwt_secret.as_bytes(),
                Duration::seconds(config.jwt_expires_in_secs),
            )),
            albums: Arc::new(AlbumsClient::new(config.albums_url.clone())),
            config: Arc::new(config),
            products: Arc::new(products),
            users: Arc::new(users),
        }
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn backend_failures_become_500_with_the_error_shape() {
        let mut products = MockProductRepository::new();
        products
            .expect_find_all()
            .returning(|| Err(RepositoryError::Io(std::io::Error::other("disk gone"))));

        let app = build_router(state_with(products, MockUserRepository::new()));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/productos")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let value = body_json(response).await;
        assert_eq!(value["statusCode"], 500);
        assert!(value["error"].as_str().unwrap().contains("disk gone"));
    }

    #[tokio::test]
    async fn malformed_json_body_is_shaped_400() {
        let app = build_router(state_with(
            MockProductRepository::new(),
            MockUserRepository::new(),
        ));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/productos")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let value = body_json(response).await;
        assert_eq!(value["statusCode"], 400);
    }

    #[tokio::test]
    async fn verify_api_key_gate_short_circuits_before_the_repository() {
        // No expectations set: reaching the mock would panic the test.
        let app = build_router(state_with(
            MockProductRepository::new(),
            MockUserRepository::new(),
        ));

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/v1/productos/abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
