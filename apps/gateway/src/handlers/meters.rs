// [apps/gateway/src/handlers/meters.rs]
/*!
 * =================================================================
 * APARATO: METER QUERY HANDLER (V4.1 - GOLD MASTER)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L4)
 * RESPONSABILIDAD: LISTADO DE MEDIDORES Y CONSULTAS PARAMETRIZADAS
 *
 * Las consultas son parametrizadas, jamás SQL libre: todo parámetro
 * desconocido se rechaza con su ruta de campo.
 * =================================================================
 */

use crate::problem::problem_response;
use crate::state::AppState;
use aforo_domain_models::fault::DomainFault;
use aforo_domain_models::meter::{Meter, WindowSize};
use aforo_domain_models::query::MeterQueryParams;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse as AxumResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use tracing::instrument;

pub struct MeterHandler;

impl MeterHandler {
    /// Endpoint: GET /api/v1/meters
    #[instrument(skip(application_state))]
    pub async fn handle_list_meters(State(application_state): State<AppState>) -> Response {
        let meters: Vec<Meter> = application_state
            .meter_registry
            .list()
            .into_iter()
            .cloned()
            .collect();
        Json(meters).into_response()
    }

    /**
     * Endpoint: GET /api/v1/meters/{slug}/query
     *
     * Ejecuta el plan de consulta del medidor con los límites alineados
     * ecoizados en el resultado.
     */
    #[instrument(skip(application_state, raw_pairs), fields(slug = %meter_slug))]
    pub async fn handle_query_meter(
        State(application_state): State<AppState>,
        Path(meter_slug): Path<String>,
        Query(raw_pairs): Query<Vec<(String, String)>>,
    ) -> Response {
        let params = match parse_meter_query_params(&raw_pairs) {
            Ok(params) => params,
            Err(parse_fault) => return problem_response(parse_fault),
        };

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

/// Interpreta un instante RFC3339 con offset explícito (UTC absoluto).
fn parse_instant(field: &str, raw: &str) -> Result<DateTime<Utc>, DomainFault> {
    DateTime::parse_from_rfc3339(raw)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|_| DomainFault::validation(field, "must be an RFC3339 timestamp with offset"))
}

/**
 * Interpreta los pares crudos de la query string hacia los parámetros
 * del contrato de consulta.
 *
 * # Gramática aceptada:
 * from, to, windowSize, windowTimeZone, subject (repetible),
 * groupBy (repetible), filterGroupBy[clave]=literal.
 */
pub fn parse_meter_query_params(raw_pairs: &[(String, String)]) -> Result<MeterQueryParams, DomainFault> {
    let mut params = MeterQueryParams::default();

    for (raw_key, raw_value) in raw_pairs {
        match raw_key.as_str() {
            "from" => params.from = Some(parse_instant("from", raw_value)?),
            "to" => params.to = Some(parse_instant("to", raw_value)?),
            "windowSize" => {
                params.window_size = Some(match raw_value.as_str() {
                    "MINUTE" => WindowSize::Minute,
                    "HOUR" => WindowSize::Hour,
                    "DAY" => WindowSize::Day,
                    _ => {
                        return Err(DomainFault::validation(
                            "windowSize",
                            "must be one of MINUTE | HOUR | DAY",
                        ))
                    }
                });
            }
            "windowTimeZone" => {
                params.window_time_zone = raw_value
                    .parse()
                    .map_err(|_| DomainFault::validation("windowTimeZone", "must be an IANA zone name"))?;
            }
            "subject" => params.subjects.push(raw_value.clone()),
            "groupBy" => params.group_by.push(raw_value.clone()),
            key if key.starts_with("filterGroupBy[") && key.ends_with(']') => {
                let filter_key = &key["filterGroupBy[".len()..key.len() - 1];
                if filter_key.is_empty() {
                    return Err(DomainFault::validation("filterGroupBy", "filter key must not be empty"));
                }
                params
                    .filter_group_by
                    .insert(filter_key.to_string(), raw_value.clone());
            }
            unknown => {
                return Err(DomainFault::validation(
                    unknown,
                    "unknown query parameter (queries are parameterised, not free-form)",
                ));
            }
        }
    }

    Ok(params)
}
