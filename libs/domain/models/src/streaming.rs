// [libs/domain/models/src/streaming.rs]
/*!
 * =================================================================
 * APARATO: STREAMING CONNECTOR CONTRACT (V2.0 - SOBERANO)
 * CLASIFICACIÓN: DOMAIN CONTRACT (ESTRATO L2)
 * RESPONSABILIDAD: FRONTERA ENTRE EL DOMINIO Y EL ALMACÉN COLUMNAR
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. PORT & ADAPTER: El dominio y el kernel de crédito consumen este
 *    contrato; el adaptador columnar (L3) lo materializa en SQL.
 * 2. CREATE POLICY: El ciclo de vida de la materialización por medidor
 *    se gobierna con una política explícita de arranque.
 * =================================================================
 */

use crate::fault::DomainFault;
use crate::meter::Meter;
use crate::query::{MeterQueryParams, MeterQueryResult};
use async_trait::async_trait;
use serde::Deserialize;

/// Política de creación/reemplazo de la materialización por medidor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MeterCreatePolicy {
    /// Los medidores deben existir; uno ausente es fallo de arranque.
    Never,
    /// Creación idempotente (CREATE IF NOT EXISTS).
    #[default]
    CreateIfMissing,
    /// Destruye y recrea la materialización. Destructivo.
    Replace,
}

/// Contrato del conector de streaming: materializaciones y planes de consulta.
#[async_trait]
pub trait StreamingConnector: Send + Sync {
    /// Crea (según política) la agregación continua del medidor.
    async fn create_meter(&self, namespace: &str, meter: &Meter) -> Result<(), DomainFault>;

    /// Ejecuta el plan de consulta del medidor identificado por slug.
    async fn query_meter(
        &self,
        namespace: &str,
        meter_slug: &str,
        params: &MeterQueryParams,
    ) -> Result<MeterQueryResult, DomainFault>;
}
