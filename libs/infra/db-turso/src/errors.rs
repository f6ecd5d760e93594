// [libs/infra/db-turso/src/errors.rs]
/*!
 * =================================================================
 * APARATO: LEDGER ERROR CATALOG (V3.0 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS DE PERSISTENCIA
 * =================================================================
 */

use aforo_domain_models::fault::DomainFault;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    /// Error de enlace físico o de red con el almacén del ledger.
    #[error("[L3_DB_NET_FAULT]: LEDGER_UPLINK_SEVERED -> {0}")]
    ConnectionError(String),

    /// Fallo en la configuración del entorno (variables vacías o malformadas).
    #[error("[L3_DB_CONFIG_FAULT]: STRATEGIC_ENV_VOID -> {0}")]
    ConfigurationError(String),

    /// Error de sintaxis o ejecución devuelto por el motor libSQL.
    #[error("[L3_DB_QUERY_FAULT]: SQL_QUERY_REJECTED -> {0}")]
    QueryError(#[from] libsql::Error),

    /// Fallo en la transformación de tipos entre SQLite y el dominio.
    #[error("[L3_DB_MAPPING_FAULT]: DATA_MAPPING_VIOLATION -> {0}")]
    MappingError(String),

    /// Error al comprometer cambios en una secuencia multi-tabla.
    #[error("[L3_DB_FAULT]: TRANSACTION_COLLAPSE")]
    TransactionError,

    // --- ESTRATO DEL LEDGER DE CRÉDITO (L7) ---

    /// La feature solicitada no existe en el namespace.
    #[error("[L3_LEDGER_FAULT]: FEATURE_NOT_FOUND")]
    FeatureNotFound,

    /// La concesión solicitada no existe para el sujeto.
    #[error("[L3_LEDGER_FAULT]: GRANT_NOT_FOUND")]
    GrantNotFound,

    /// La concesión ya fue anulada por una fila VOID previa.
    #[error("[L3_LEDGER_FAULT]: GRANT_ALREADY_VOID")]
    GrantAlreadyVoid,
}

impl From<DbError> for DomainFault {
    fn from(fault: DbError) -> Self {
        match fault {
            DbError::FeatureNotFound => DomainFault::NotFound("feature not found".to_string()),
            DbError::GrantNotFound => DomainFault::NotFound("grant not found".to_string()),
            DbError::GrantAlreadyVoid => DomainFault::Conflict("grant is already void".to_string()),
            DbError::ConnectionError(detail) => DomainFault::Transient(detail),
            DbError::ConfigurationError(detail) => DomainFault::Internal(detail),
            DbError::QueryError(query_fault) => DomainFault::Transient(query_fault.to_string()),
            DbError::MappingError(detail) => DomainFault::Internal(detail),
            DbError::TransactionError => DomainFault::Transient("ledger transaction collapsed".to_string()),
        }
    }
}
