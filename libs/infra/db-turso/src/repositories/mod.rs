// [libs/infra/db-turso/src/repositories/mod.rs]
/*!
 * =================================================================
 * APARATO: LEDGER REPOSITORY REGISTRY (V3.0 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: REGISTRO DE REPOSITORIOS Y CÓDECS TEMPORALES
 * =================================================================
 */

pub mod feature;
pub mod grant;

pub use feature::FeatureRepository;
pub use grant::GrantLedgerRepository;

use crate::errors::DbError;
use chrono::{DateTime, SecondsFormat, Utc};

/// Codifica un instante UTC con ancho fijo (micros, sufijo Z) para que
/// la comparación lexicográfica en SQL coincida con la cronológica.
pub(crate) fn encode_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Decodifica un instante persistido de vuelta a UTC.
pub(crate) fn decode_instant(raw: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|parse_fault| DbError::MappingError(format!("instant '{}' rejected: {}", raw, parse_fault)))
}
