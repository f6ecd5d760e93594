// [apps/gateway/src/routes.rs]
/*!
 * =================================================================
 * APARATO: SOVEREIGN ROUTING MATRIX (V4.2 - GATEWAY ALIGNED)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L4)
 * RESPONSABILIDAD: ORQUESTACIÓN DE ESTRATOS DE INGESTA, CONSULTA,
 * CRÉDITO Y PORTAL
 *
 * VISION HIPER-HOLÍSTICA:
 * La topología expone:
 * 1. REST Táctico de ingesta (High Frequency).
 * 2. Consultas de agregación parametrizadas.
 * 3. Kernel de Crédito (features, grants, balance, reset, ledger).
 * 4. Portal con guardia de token y CORS opcional.
 * =================================================================
 */

use crate::handlers::{credit::CreditHandler, events::IngestHandler, meters::MeterHandler, portal::PortalHandler};
use crate::middleware::portal_guard;
use crate::state::AppState;
use axum::{
    middleware,
    routing::{delete, get, post},
    Json, Router,
    http::{header, Method},
};
use tower_http::cors::{Any, CorsLayer};
use std::time::Duration;

pub fn create_sovereign_router(application_shared_state: AppState, portal_cors_enabled: bool) -> Router {
    // ESTRATO TÁCTICO: Ingesta de eventos (Producers)
    let ingest_stratum = Router::new()
        .route("/events", post(IngestHandler::handle_ingest_event))
        .route("/events/batch", post(IngestHandler::handle_ingest_batch));

    // ESTRATO DE CONSULTA: Medidores y agregaciones
    let meters_stratum = Router::new()
        .route("/meters", get(MeterHandler::handle_list_meters))
        .route("/meters/:slug/query", get(MeterHandler::handle_query_meter));

    // ESTRATO DE CRÉDITO: Features, concesiones, saldos y resets
    let credit_stratum = Router::new()
        .route(
            "/features",
            post(CreditHandler::handle_create_feature).get(CreditHandler::handle_list_features),
        )
        .route("/features/:feature_id", delete(CreditHandler::handle_archive_feature))
        .route(
            "/subjects/:subject/grants",
            post(CreditHandler::handle_create_grant).get(CreditHandler::handle_list_grants),
        )
        .route(
            "/subjects/:subject/grants/:grant_id",
            delete(CreditHandler::handle_void_grant),
        )
        .route("/subjects/:subject/balance", get(CreditHandler::handle_get_balance))
        .route("/subjects/:subject/reset", post(CreditHandler::handle_reset))
        .route("/subjects/:subject/ledger", get(CreditHandler::handle_ledger_history));

    // ESTRATO DE PORTAL: Emisión de tokens y consultas con alcance
    let scoped_query_stratum = Router::new()
        .route("/portal/meters/:slug/query", get(PortalHandler::handle_scoped_query))
        .layer(middleware::from_fn_with_state(application_shared_state.clone(), portal_guard));

    let mut portal_stratum = Router::new()
        .route(
            "/portal/tokens",
            post(PortalHandler::handle_mint_token).get(PortalHandler::handle_list_tokens),
        )
        .route("/portal/tokens/invalidate", post(PortalHandler::handle_invalidate_tokens))
        .merge(scoped_query_stratum);

    if portal_cors_enabled {
        // Escudo de Red: habilita el consumo del portal desde dashboards externos.
        let network_security_shield = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(Duration::from_secs(3600));
        portal_stratum = portal_stratum.layer(network_security_shield);
    }

    // COMPOSICIÓN GLOBAL (Root Topology)
    Router::new()
        .route("/health", get(|| async { "STATUS_OK" }))
        .route(
            "/version",
            get(|| async {
                Json(serde_json::json!({
                    "version": env!("CARGO_PKG_VERSION"),
                    "os": std::env::consts::OS,
                    "arch": std::env::consts::ARCH,
                }))
            }),
        )
        .nest(
            "/api/v1",
            Router::new()
                .merge(ingest_stratum)
                .merge(meters_stratum)
                .merge(credit_stratum)
                .merge(portal_stratum),
        )
        .with_state(application_shared_state)
}
