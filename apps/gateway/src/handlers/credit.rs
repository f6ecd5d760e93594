// [apps/gateway/src/handlers/credit.rs]
/*!
 * =================================================================
 * APARATO: CREDIT STRATUM HANDLER (V4.1 - GOLD MASTER)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L4)
 * RESPONSABILIDAD: EXPOSICIÓN DEL KERNEL DE CRÉDITO AL EXTERIOR
 *
 * Adaptadores finos sobre el conector de crédito; con entitlements
 * deshabilitados la variante 'nope' responde 501 en cada operación.
 * =================================================================
 */

use crate::problem::problem_response;
use crate::state::AppState;
use aforo_domain_credit::{FeatureSpec, GrantSpec};
use aforo_domain_models::fault::DomainFault;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse as AxumResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

/// Petición de reset de saldos de un sujeto.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetRequest {
    /// Instante UTC del fork; ausente = ahora.
    #[serde(default)]
    pub effective_at: Option<DateTime<Utc>>,
}

fn parse_optional_instant(
    raw_pairs: &[(String, String)],
    field: &str,
) -> Result<Option<DateTime<Utc>>, DomainFault> {
    for (raw_key, raw_value) in raw_pairs {
        if raw_key == field {
            return DateTime::parse_from_rfc3339(raw_value)
                .map(|instant| Some(instant.with_timezone(&Utc)))
                .map_err(|_| DomainFault::validation(field, "must be an RFC3339 timestamp with offset"));
        }
    }
    Ok(None)
}

pub struct CreditHandler;

impl CreditHandler {
    /// Endpoint: POST /api/v1/features
    #[instrument(skip(application_state, spec))]
    pub async fn handle_create_feature(
        State(application_state): State<AppState>,
        Json(spec): Json<FeatureSpec>,
    ) -> Response {
        match application_state
            .credit
            .create_feature(&application_state.default_namespace, spec)
            .await
        {
            Ok(feature) => (StatusCode::CREATED, Json(feature)).into_response(),
            Err(credit_fault) => problem_response(credit_fault),
        }
    }

    /// Endpoint: GET /api/v1/features
    #[instrument(skip(application_state))]
    pub async fn handle_list_features(State(application_state): State<AppState>) -> Response {
        match application_state
            .credit
            .list_features(&application_state.default_namespace)
            .await
        {
            Ok(features) => Json(features).into_response(),
            Err(credit_fault) => problem_response(credit_fault),
        }
    }

    /// Endpoint: DELETE /api/v1/features/{featureId} — archivado lógico.
    #[instrument(skip(application_state))]
    pub async fn handle_archive_feature(
        State(application_state): State<AppState>,
        Path(feature_id): Path<Uuid>,
    ) -> Response {
        match application_state
            .credit
            .archive_feature(&application_state.default_namespace, feature_id)
            .await
        {
            Ok(feature) => Json(feature).into_response(),
            Err(credit_fault) => problem_response(credit_fault),
        }
    }

    /// Endpoint: POST /api/v1/subjects/{subject}/grants
    #[instrument(skip(application_state, spec), fields(subject = %subject))]
    pub async fn handle_create_grant(
        State(application_state): State<AppState>,
        Path(subject): Path<String>,
        Json(spec): Json<GrantSpec>,
    ) -> Response {
        match application_state
            .credit
            .create_grant(&application_state.default_namespace, &subject, spec)
            .await
        {
            Ok(grant) => (StatusCode::CREATED, Json(grant)).into_response(),
            Err(credit_fault) => problem_response(credit_fault),
        }
    }

    /// Endpoint: GET /api/v1/subjects/{subject}/grants?includeVoids=true
    #[instrument(skip(application_state, raw_pairs), fields(subject = %subject))]
    pub async fn handle_list_grants(
        State(application_state): State<AppState>,
        Path(subject): Path<String>,
        Query(raw_pairs): Query<Vec<(String, String)>>,
    ) -> Response {
        let include_void = raw_pairs
            .iter()
            .any(|(key, value)| key == "includeVoids" && (value == "true" || value == "1"));

        match application_state
            .credit
            .list_grants(&application_state.default_namespace, &subject, include_void)
            .await
        {
            Ok(grants) => Json(grants).into_response(),
            Err(credit_fault) => problem_response(credit_fault),
        }
    }

    /// Endpoint: DELETE /api/v1/subjects/{subject}/grants/{grantId}
    #[instrument(skip(application_state), fields(subject = %subject))]
    pub async fn handle_void_grant(
        State(application_state): State<AppState>,
        Path((subject, grant_id)): Path<(String, Uuid)>,
    ) -> Response {
        match application_state
            .credit
            .void_grant(&application_state.default_namespace, &subject, grant_id)
            .await
        {
            Ok(grant) => Json(grant).into_response(),
            Err(credit_fault) => problem_response(credit_fault),
        }
    }

    /// Endpoint: GET /api/v1/subjects/{subject}/balance?time=...
    #[instrument(skip(application_state, raw_pairs), fields(subject = %subject))]
    pub async fn handle_get_balance(
        State(application_state): State<AppState>,
        Path(subject): Path<String>,
        Query(raw_pairs): Query<Vec<(String, String)>>,
    ) -> Response {
        let as_of = match parse_optional_instant(&raw_pairs, "time") {
            Ok(instant) => instant.unwrap_or_else(Utc::now),
            Err(parse_fault) => return problem_response(parse_fault),
        };

        match application_state
            .credit
            .get_balance(&application_state.default_namespace, &subject, as_of)
            .await
        {
            Ok(snapshot) => Json(snapshot).into_response(),
            Err(credit_fault) => problem_response(credit_fault),
        }
    }

    /// Endpoint: POST /api/v1/subjects/{subject}/reset
    #[instrument(skip(application_state, request), fields(subject = %subject))]
    pub async fn handle_reset(
        State(application_state): State<AppState>,
        Path(subject): Path<String>,
        Json(request): Json<ResetRequest>,
    ) -> Response {
        let effective_at = request.effective_at.unwrap_or_else(Utc::now);

        match application_state
            .credit
            .reset(&application_state.default_namespace, &subject, effective_at)
            .await
        {
            Ok(reset) => (StatusCode::CREATED, Json(reset)).into_response(),
            Err(credit_fault) => problem_response(credit_fault),
        }
    }

    /// Endpoint: GET /api/v1/subjects/{subject}/ledger?from=...&to=...
    #[instrument(skip(application_state, raw_pairs), fields(subject = %subject))]
    pub async fn handle_ledger_history(
        State(application_state): State<AppState>,
        Path(subject): Path<String>,
        Query(raw_pairs): Query<Vec<(String, String)>>,
    ) -> Response {
        let from = match parse_optional_instant(&raw_pairs, "from") {
            Ok(instant) => instant,
            Err(parse_fault) => return problem_response(parse_fault),
        };
        let to = match parse_optional_instant(&raw_pairs, "to") {
            Ok(instant) => instant,
            Err(parse_fault) => return problem_response(parse_fault),
        };

        match application_state
            .credit
            .ledger_history(&application_state.default_namespace, &subject, from, to)
            .await
        {
            Ok(entries) => Json(entries).into_response(),
            Err(credit_fault) => problem_response(credit_fault),
        }
    }
}
