// [libs/domain/models/src/event.rs]
/*!
 * =================================================================
 * APARATO: CLOUDEVENTS ENVELOPE (V2.2 - SOBERANO)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: GRAMÁTICA DEL SOBRE DE EVENTOS Y VALIDACIÓN DE BORDE
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. WIRE PARITY: Campos estándar CloudEvents v1.0 en JSON, con 'data'
 *    como objeto JSON arbitrario del productor.
 * 2. IDENTITY INVARIANT: La tripleta (namespace, source, id) identifica
 *    unívocamente un evento para la capa de idempotencia.
 * 3. RECEIPT STAMPING: 'time' ausente se sella con la hora de recepción.
 * =================================================================
 */

use crate::fault::DomainFault;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sobre CloudEvents v1.0 aceptado por el colector de ingesta.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestedEvent {
    /// Identificador unívoco dentro del 'source' del productor.
    pub id: String,

    /// Origen lógico del productor del evento.
    pub source: String,

    /// Versión de la especificación CloudEvents (siempre "1.0").
    #[serde(default = "default_spec_version")]
    pub specversion: String,

    /// Tipo del evento. Debe coincidir con el 'event_type' de un medidor
    /// para ser agregado.
    #[serde(rename = "type")]
    pub event_type: String,

    /// Cuenta medida (tenant-subject). Nunca vacía.
    pub subject: String,

    /// Marca temporal RFC3339. Si el productor la omite, el colector
    /// la sella con la hora de recepción.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,

    /// Tipo de contenido declarado del payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datacontenttype: Option<String>,

    /// Payload JSON arbitrario del productor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

fn default_spec_version() -> String {
    "1.0".to_string()
}

impl IngestedEvent {
    /**
     * Valida el sobre en el borde síncrono del colector.
     *
     * # Logic:
     * Verifica campos de identidad no vacíos, y que 'data' sea un objeto
     * JSON cuando 'datacontenttype' declara JSON. La hora se valida por
     * construcción (el deserializador rechaza RFC3339 malformado).
     */
    pub fn validate(&self) -> Result<(), DomainFault> {
        if self.id.trim().is_empty() {
            return Err(DomainFault::validation("id", "must not be empty"));
        }
        if self.source.trim().is_empty() {
            return Err(DomainFault::validation("source", "must not be empty"));
        }
        if self.event_type.trim().is_empty() {
            return Err(DomainFault::validation("type", "must not be empty"));
        }
        if self.subject.trim().is_empty() {
            return Err(DomainFault::validation("subject", "must not be empty"));
        }

        if let Some(content_type) = &self.datacontenttype {
            let claims_json = content_type.to_ascii_lowercase().contains("json");
            if claims_json {
                match &self.data {
                    Some(serde_json::Value::Object(_)) | None => {}
                    Some(_) => {
                        return Err(DomainFault::validation(
                            "data",
                            "datacontenttype claims JSON but payload is not a JSON object",
                        ));
                    }
                }
            }
        }

        Ok(())
    }

    /// Sella la hora de recepción si el productor omitió 'time'.
    pub fn stamp_receipt_time(&mut self, receipt_instant: DateTime<Utc>) {
        if self.time.is_none() {
            self.time = Some(receipt_instant);
        }
    }

    /// Clave de identidad para la capa de idempotencia: (source, id).
    pub fn identity_within_namespace(&self) -> (String, String) {
        (self.source.clone(), self.id.clone())
    }
}
