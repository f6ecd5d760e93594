// [libs/infra/transport/src/errors.rs]
/*!
 * =================================================================
 * APARATO: TRANSPORT ERROR CATALOG (V2.0 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS DE TRANSPORTE
 * =================================================================
 */

use aforo_domain_models::fault::DomainFault;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    /// El topic del namespace no fue aprovisionado por el manager.
    #[error("[L3_TRANSPORT_FAULT]: TOPIC_NOT_PROVISIONED -> {0}")]
    UnknownTopic(String),

    /// El productor rechazó el registro (buffer saturado o enlace caído).
    #[error("[L3_TRANSPORT_FAULT]: CLIENT_BUFFER_REJECTION -> {0}")]
    Unavailable(String),

    /// Fallo en la serialización canónica del sobre.
    #[error("[L3_TRANSPORT_FAULT]: PAYLOAD_SERIALIZATION_COLLAPSE -> {0}")]
    Serialization(String),

    /// Plantilla de topic malformada en configuración.
    #[error("[L3_TRANSPORT_FAULT]: TOPIC_TEMPLATE_REJECTED -> {0}")]
    Template(String),
}

impl From<TransportError> for DomainFault {
    fn from(fault: TransportError) -> Self {
        match fault {
            TransportError::UnknownTopic(detail) => DomainFault::Transient(detail),
            TransportError::Unavailable(detail) => DomainFault::Transient(detail),
            TransportError::Serialization(detail) => DomainFault::Internal(detail),
            TransportError::Template(detail) => DomainFault::Internal(detail),
        }
    }
}
