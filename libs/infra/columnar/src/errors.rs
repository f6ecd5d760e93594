// [libs/infra/columnar/src/errors.rs]
/*!
 * =================================================================
 * APARATO: COLUMNAR ERROR CATALOG (V2.0 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS DEL ALMACÉN
 * =================================================================
 */

use aforo_domain_models::fault::DomainFault;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ColumnarError {
    /// Enlace HTTP con el almacén caído o rechazado.
    #[error("[L3_COLUMNAR_FAULT]: STORE_UPLINK_SEVERED -> {0}")]
    Unavailable(String),

    /// El almacén rechazó la sentencia (estado HTTP no exitoso).
    #[error("[L3_COLUMNAR_FAULT]: STATEMENT_REJECTED (status {status}) -> {detail}")]
    Statement { status: u16, detail: String },

    /// Fila de resultado con forma inesperada.
    #[error("[L3_COLUMNAR_FAULT]: ROW_DECODE_VIOLATION -> {0}")]
    Decode(String),
}

impl From<ColumnarError> for DomainFault {
    fn from(fault: ColumnarError) -> Self {
        match fault {
            ColumnarError::Unavailable(detail) => DomainFault::Transient(detail),
            ColumnarError::Statement { status, detail } => {
                DomainFault::Internal(format!("columnar statement rejected ({}): {}", status, detail))
            }
            ColumnarError::Decode(detail) => DomainFault::Internal(detail),
        }
    }
}
