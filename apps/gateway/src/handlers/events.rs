// [apps/gateway/src/handlers/events.rs]
/*!
 * =================================================================
 * APARATO: INGEST STRATUM HANDLER (V4.0 - SOBERANO)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L4)
 * RESPONSABILIDAD: ADAPTACIÓN HTTP -> COLECTOR DE INGESTA
 *
 * Adaptador fino: petición -> operación del kernel -> respuesta. El
 * namespace se decodifica estáticamente hacia el namespace por defecto
 * del despliegue.
 * =================================================================
 */

use crate::problem::problem_response;
use crate::state::AppState;
use aforo_domain_models::event::IngestedEvent;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse as AxumResponse, Response},
    Json,
};
use tracing::instrument;

pub struct IngestHandler;

impl IngestHandler {
    /**
     * Endpoint: POST /api/v1/events
     *
     * Ingesta un CloudEvent individual. 204 al aceptar en el buffer del
     * transporte; 400 en violaciones; 503 con el transporte caído.
     */
    #[instrument(skip(application_state, event))]
    pub async fn handle_ingest_event(
        State(application_state): State<AppState>,
        Json(event): Json<IngestedEvent>,
    ) -> Response {
        match application_state
            .collector
            .ingest(&application_state.default_namespace, event)
            .await
        {
            Ok(()) => StatusCode::NO_CONTENT.into_response(),
            Err(ingest_fault) => problem_response(ingest_fault),
        }
    }

    /**
     * Endpoint: POST /api/v1/events/batch
     *
     * Ingesta un lote homogéneo. Cualquier sobre inválido aborta el lote
     * con la lista estructurada de violaciones por índice.
     */
    #[instrument(skip(application_state, events))]
    pub async fn handle_ingest_batch(
        State(application_state): State<AppState>,
        Json(events): Json<Vec<IngestedEvent>>,
    ) -> Response {
        match application_state
            .collector
            .ingest_batch(&application_state.default_namespace, events)
            .await
        {
            Ok(()) => StatusCode::NO_CONTENT.into_response(),
            Err(ingest_fault) => problem_response(ingest_fault),
        }
    }
}
