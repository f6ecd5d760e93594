// [apps/gateway/src/middleware.rs]
/*!
 * =================================================================
 * APARATO: PORTAL AUTHENTICATION GUARD (V2.1 - SOBERANO)
 * CLASIFICACIÓN: SECURITY STRATUM (ESTRATO L4)
 * RESPONSABILIDAD: VALIDACIÓN DE TOKENS E INYECCIÓN DE IDENTIDAD
 *
 * El guardia valida el bearer token del portal en cada petición y
 * inyecta los claims autenticados en el flujo asíncrono para su
 * consumo por los handlers de consulta con alcance.
 * =================================================================
 */

use crate::problem::problem_response;
use crate::state::AppState;
use aforo_domain_models::fault::DomainFault;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::debug;

/**
 * Guardia del portal: exige un bearer token firmado y vigente.
 *
 * # Logic:
 * 1. Sin estrategia de portal activa -> NOT_IMPLEMENTED.
 * 2. Bearer ausente o malformado -> UNAUTHORIZED.
 * 3. Token verificado -> claims inyectados en las extensiones.
 */
pub async fn portal_guard(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let Some(strategy) = state.portal.clone() else {
        return problem_response(DomainFault::NotImplemented(
            "the consumer portal is disabled on this deployment".to_string(),
        ));
    };

    let bearer_token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let Some(raw_token) = bearer_token else {
        return problem_response(DomainFault::Unauthorized(
            "missing portal bearer token".to_string(),
        ));
    };

    match strategy.verify(raw_token) {
        Ok(claims) => {
            debug!("🔐 [PORTAL_GUARD]: Subject '{}' authenticated.", claims.sub);
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(verification_fault) => problem_response(verification_fault),
    }
}
