// [apps/gateway/src/problem.rs]
/*!
 * =================================================================
 * APARATO: RFC 7807 PROBLEM SURFACE (V2.1 - SOBERANO)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L4)
 * RESPONSABILIDAD: TRADUCCIÓN DE FALLOS DE DOMINIO A PROBLEM+JSON
 *
 * La superficie externa expone únicamente la clase del fallo y un
 * mensaje seguro; la cadena de causas interna viaja por el rastro de
 * trazas, jamás por la respuesta HTTP.
 * =================================================================
 */

use aforo_domain_models::fault::{DomainFault, FaultClass, IndexedViolation};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

/// Cuerpo RFC 7807 de la superficie de errores.
#[derive(Debug, Serialize)]
pub struct ApiProblem {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    /// Extensión: violaciones por índice de un lote de ingesta.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violations: Option<Vec<IndexedViolation>>,
}

impl From<DomainFault> for ApiProblem {
    fn from(fault: DomainFault) -> Self {
        let class = fault.fault_class();

        match class {
            FaultClass::Internal => error!("❌ [API_FAULT]: {}", fault),
            FaultClass::Transient => warn!("⚠️  [API_FAULT]: {}", fault),
            _ => {}
        }

        let violations = match &fault {
            DomainFault::BatchValidation { failures } => Some(failures.clone()),
            _ => None,
        };

        Self {
            problem_type: "about:blank".to_string(),
            title: class.title().to_string(),
            status: class.http_status(),
            detail: fault.safe_detail(),
            violations,
        }
    }
}

impl IntoResponse for ApiProblem {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (
            status,
            [(header::CONTENT_TYPE, "application/problem+json")],
            Json(self),
        )
            .into_response()
    }
}

/// Atajo nominal para los handlers: fallo de dominio -> respuesta HTTP.
pub fn problem_response(fault: DomainFault) -> Response {
    ApiProblem::from(fault).into_response()
}
