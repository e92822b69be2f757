use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::{get, patch, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{AuthService, IdentityVerifier, JwtError, JwtKeys, Role};
use crate::catalog::CatalogService;
use crate::config::AppConfig;
use crate::database::{DatabaseManager, MemoryStore, PgStore, ProductRepository, UserRepository};
use crate::handlers::{protected, public};
use crate::middleware::auth::{require_roles, resolve_principal, ADMIN, ANY_ROLE, ELEVATED, USER};
use crate::realtime::{self, PresenceRegistry};

/// Everything a request handler can reach
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepository>,
    pub auth: AuthService,
    pub verifier: IdentityVerifier,
    pub catalog: CatalogService,
    pub presence: Arc<PresenceRegistry>,
    pub database: Option<DatabaseManager>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        users: Arc<dyn UserRepository>,
        products: Arc<dyn ProductRepository>,
    ) -> Result<Self, JwtError> {
        let keys = JwtKeys::from_config(&config.security)?;

        Ok(Self {
            auth: AuthService::new(Arc::clone(&users), keys.clone(), config.security.bcrypt_cost),
            verifier: IdentityVerifier::new(keys, Arc::clone(&users)),
            catalog: CatalogService::new(products),
            presence: Arc::new(PresenceRegistry::new()),
            config: Arc::new(config),
            users,
            database: None,
        })
    }

    /// State backed by a process-local store
    pub fn in_memory(config: AppConfig) -> Result<Self, JwtError> {
        let store = MemoryStore::new();
        Self::new(config, Arc::new(store.clone()), Arc::new(store))
    }

    /// State backed by Postgres through `database`'s pool
    pub fn postgres(config: AppConfig, database: DatabaseManager) -> Result<Self, JwtError> {
        let store = PgStore::new(database.pool().clone());
        let mut state = Self::new(config, Arc::new(store.clone()), Arc::new(store))?;
        state.database = Some(database);
        Ok(state)
    }
}

/// Build the full router: public routes, guarded `/api` routes and the realtime socket
pub fn app(state: AppState) -> Router {
    let mut public_routes = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/auth/register", post(public::auth::register_post))
        .route("/auth/login", post(public::auth::login_post))
        .route("/products", get(public::products::list_get))
        .route("/products/:term", get(public::products::show_get))
        .route("/ws", get(realtime::ws_handler));

    if state.config.api.enable_seed_route {
        public_routes = public_routes.route("/seed", get(public::seed::seed_get));
    }

    // route_layer order: resolve_principal wraps every guard below it
    let protected_routes = Router::new()
        .merge(guarded(
            ANY_ROLE,
            Router::new().route("/api/auth/status", get(protected::auth::status_get)),
        ))
        .merge(guarded(
            ELEVATED,
            Router::new().route("/api/auth/elevated", get(protected::auth::elevated_get)),
        ))
        .merge(guarded(
            USER,
            Router::new().route("/api/products", post(protected::products::create_post)),
        ))
        .merge(guarded(
            ADMIN,
            Router::new().route(
                "/api/products/:id",
                patch(protected::products::update_patch).delete(protected::products::delete_delete),
            ),
        ))
        .route_layer(from_fn_with_state(state.clone(), resolve_principal));

    let cors = cors_layer(&state.config.security.cors_origins);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn guarded(required: &'static [Role], routes: Router<AppState>) -> Router<AppState> {
    routes.route_layer(from_fn_with_state(required, require_roles))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Teslo API",
            "version": version,
            "description": "Product catalog backend with role-guarded writes and live presence",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "public_auth": "/auth/register, /auth/login (public - token acquisition)",
                "products": "/products[/:term] (public)",
                "auth": "/api/auth/status, /api/auth/elevated (protected)",
                "catalog": "/api/products[/:id] (protected, role guarded)",
                "seed": "/seed (development only)",
                "realtime": "/ws (bearer token at handshake)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    let Some(database) = &state.database else {
        return (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "in-memory"
                }
            })),
        );
    };

    match database.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": true,
                    "message": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
