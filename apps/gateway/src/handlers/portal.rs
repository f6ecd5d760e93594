// [apps/gateway/src/handlers/portal.rs]
/*!
 * =================================================================
 * APARATO: PORTAL STRATUM HANDLER (V2.2 - SOBERANO)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L4)
 * RESPONSABILIDAD: EMISIÓN DE TOKENS Y CONSULTAS CON ALCANCE
 *
 * El sujeto de una consulta de portal proviene SIEMPRE del token
 * verificado, jamás de los parámetros de la petición.
 * =================================================================
 */

use crate::handlers::meters::parse_meter_query_params;
use crate::portal::PortalClaims;
use crate::problem::problem_response;
use crate::state::AppState;
use aforo_domain_models::fault::DomainFault;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse as AxumResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use tracing::instrument;

/// Petición de emisión de un token de portal.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalTokenRequest {
    pub subject: String,
    #[serde(default)]
    pub allowed_meter_slugs: Option<Vec<String>>,
}

pub struct PortalHandler;

impl PortalHandler {
    /**
     * Endpoint: POST /api/v1/portal/tokens
     *
     * Firma un token de corta vida con el sujeto y su allow-list.
     * 501 en despliegues con el portal apagado.
     */
    #[instrument(skip(application_state, request))]
    pub async fn handle_mint_token(
        State(application_state): State<AppState>,
        Json(request): Json<PortalTokenRequest>,
    ) -> Response {
        let Some(strategy) = application_state.portal.clone() else {
            return problem_response(DomainFault::NotImplemented(
                "the consumer portal is disabled on this deployment".to_string(),
            ));
        };

        match strategy.mint(&request.subject, request.allowed_meter_slugs) {
            Ok(portal_token) => Json(portal_token).into_response(),
            Err(minting_fault) => problem_response(minting_fault),
        }
    }

    /// Endpoint: GET /api/v1/portal/tokens — hosted-only.
    pub async fn handle_list_tokens() -> Response {
        problem_response(DomainFault::NotImplemented(
            "portal token listing is available on the hosted platform only".to_string(),
        ))
    }

    /// Endpoint: POST /api/v1/portal/tokens/invalidate — hosted-only.
    pub async fn handle_invalidate_tokens() -> Response {
        problem_response(DomainFault::NotImplemented(
            "portal token invalidation is available on the hosted platform only".to_string(),
        ))
    }

    /**
     * Endpoint: GET /api/v1/portal/meters/{slug}/query
     *
     * Consulta con alcance: el sujeto llega de los claims inyectados por
     * el guardia y el slug se autoriza contra la allow-list del token.
     */
    #[instrument(skip(application_state, claims, raw_pairs), fields(slug = %meter_slug))]
    pub async fn handle_scoped_query(
        State(application_state): State<AppState>,
        Extension(claims): Extension<PortalClaims>,
        Path(meter_slug): Path<String>,
        Query(raw_pairs): Query<Vec<(String, String)>>,
    ) -> Response {
        if let Err(scope_fault) = claims.authorize_meter(&meter_slug) {
            return problem_response(scope_fault);
        }

        let mut params = match parse_meter_query_params(&raw_pairs) {
            Ok(params) => params,
            Err(parse_fault) => return problem_response(parse_fault),
        };

        // El alcance del token prevalece sobre cualquier filtro del cliente.
        params.subjects = vec![claims.sub.clone()];

        match application_state
            .streaming
            .query_meter(&application_state.default_namespace, &meter_slug, &params)
            .await
        {
            Ok(result) => Json(result).into_response(),
            Err(query_fault) => problem_response(query_fault),
        }
    }
}
