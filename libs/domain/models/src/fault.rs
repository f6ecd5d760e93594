// [libs/domain/models/src/fault.rs]
/*!
 * =================================================================
 * APARATO: DOMAIN FAULT CATALOG (V2.0 - SOBERANO)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA TRANSVERSAL DE FALLOS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. LINGUA FRANCA: Todos los conectores (Streaming, Crédito, Ingesta)
 *    traducen sus fallos internos a este catálogo en su frontera,
 *    permitiendo al driver HTTP un mapeo 1:1 hacia RFC 7807.
 * 2. PANOPTICON COMPLIANCE: Prefijos de estrato para renderizado
 *    cromático en el colector de logs.
 * 3. SAFE SURFACE: El detalle interno viaja en el rastro de trazas;
 *    la superficie externa solo expone la clase y un mensaje seguro.
 * =================================================================
 */

use thiserror::Error;

/// Clase de recuperación de un fallo, alineada con la tabla de errores del plano HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultClass {
    /// Petición malformada o inválida. No se reintenta.
    BadRequest,
    /// Credenciales o token de portal inválido.
    Unauthorized,
    /// El recurso nominal no existe.
    NotFound,
    /// Conflicto de idempotencia o slug duplicado.
    Conflict,
    /// Operación no soportada por la configuración activa.
    NotImplemented,
    /// Infraestructura colaboradora no disponible. El llamador puede reintentar.
    Transient,
    /// Colapso interno. Se registra con rastro completo.
    Internal,
}

impl FaultClass {
    /// Código de estado HTTP canónico de la clase.
    pub fn http_status(&self) -> u16 {
        match self {
            FaultClass::BadRequest => 400,
            FaultClass::Unauthorized => 401,
            FaultClass::NotFound => 404,
            FaultClass::Conflict => 409,
            FaultClass::NotImplemented => 501,
            FaultClass::Transient => 503,
            FaultClass::Internal => 500,
        }
    }

    /// Título humano estable para la superficie RFC 7807.
    pub fn title(&self) -> &'static str {
        match self {
            FaultClass::BadRequest => "Bad Request",
            FaultClass::Unauthorized => "Unauthorized",
            FaultClass::NotFound => "Not Found",
            FaultClass::Conflict => "Conflict",
            FaultClass::NotImplemented => "Not Implemented",
            FaultClass::Transient => "Service Unavailable",
            FaultClass::Internal => "Internal Server Error",
        }
    }
}

/// Violación de validación anclada a un índice de lote.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedViolation {
    pub index: usize,
    pub field: String,
    pub message: String,
}

/// Fallo transversal del dominio de medición.
///
/// Los errores internos de cada adaptador (SQL, transporte, ledger) se
/// traducen a este catálogo en la frontera de su conector.
#[derive(Error, Debug)]
pub enum DomainFault {
    /// Violación de validación con ruta de campo para el consumidor de la API.
    #[error("[L2_VALIDATION_FAULT]: FIELD_REJECTED [{field}] -> {message}")]
    Validation { field: String, message: String },

    /// Lote de ingesta con violaciones por índice. El lote no se
    /// compromete desde la perspectiva del llamador.
    #[error("[L2_VALIDATION_FAULT]: BATCH_REJECTED ({} events)", failures.len())]
    BatchValidation { failures: Vec<IndexedViolation> },

    #[error("[L2_FAULT]: UNAUTHORIZED -> {0}")]
    Unauthorized(String),

    #[error("[L2_FAULT]: RESOURCE_NOT_FOUND -> {0}")]
    NotFound(String),

    #[error("[L2_FAULT]: IDEMPOTENCY_CONFLICT -> {0}")]
    Conflict(String),

    #[error("[L2_FAULT]: OPERATION_NOT_IMPLEMENTED -> {0}")]
    NotImplemented(String),

    /// Infraestructura colaboradora (transporte, almacén) fuera de línea.
    #[error("[L2_FAULT]: COLLABORATOR_UNAVAILABLE -> {0}")]
    Transient(String),

    #[error("[L2_FAULT]: INTERNAL_COLLAPSE -> {0}")]
    Internal(String),
}

impl DomainFault {
    /// Constructor nominal para violaciones con ruta de campo.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        DomainFault::Validation { field: field.into(), message: message.into() }
    }

    /// Clase de recuperación del fallo (mapeo a estado HTTP).
    pub fn fault_class(&self) -> FaultClass {
        match self {
            DomainFault::Validation { .. } => FaultClass::BadRequest,
            DomainFault::BatchValidation { .. } => FaultClass::BadRequest,
            DomainFault::Unauthorized(_) => FaultClass::Unauthorized,
            DomainFault::NotFound(_) => FaultClass::NotFound,
            DomainFault::Conflict(_) => FaultClass::Conflict,
            DomainFault::NotImplemented(_) => FaultClass::NotImplemented,
            DomainFault::Transient(_) => FaultClass::Transient,
            DomainFault::Internal(_) => FaultClass::Internal,
        }
    }

    /// Mensaje seguro para la superficie externa (sin causas internas).
    pub fn safe_detail(&self) -> String {
        match self {
            DomainFault::Validation { field, message } => format!("{}: {}", field, message),
            DomainFault::BatchValidation { failures } => failures
                .iter()
                .map(|violation| format!("events[{}].{}: {}", violation.index, violation.field, violation.message))
                .collect::<Vec<_>>()
                .join("; "),
            DomainFault::Unauthorized(detail) => detail.clone(),
            DomainFault::NotFound(detail) => detail.clone(),
            DomainFault::Conflict(detail) => detail.clone(),
            DomainFault::NotImplemented(detail) => detail.clone(),
            DomainFault::Transient(_) => "collaborating infrastructure temporarily unavailable".to_string(),
            DomainFault::Internal(_) => "internal error".to_string(),
        }
    }
}
