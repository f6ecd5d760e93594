// [libs/domain/credit/src/connector.rs]
/*!
 * =================================================================
 * APARATO: CREDIT CONNECTOR CONTRACT (V3.0 - SOBERANO)
 * CLASIFICACIÓN: DOMAIN CONTRACT (ESTRATO L2/L7)
 * RESPONSABILIDAD: FRONTERA DE OPERACIONES DEL LEDGER DE CRÉDITO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. VARIANT MODELING: El modo deshabilitado es una variante dedicada
 *    del conector (Nope), jamás un chequeo de nulos.
 * 2. EDGE VALIDATION: Las especificaciones validan sus invariantes
 *    puras aquí; la resolución de features y medidores vive en el
 *    adaptador persistente.
 * =================================================================
 */

use crate::model::{
    BalanceSnapshot, CreditGrant, CreditReset, Feature, GrantExpiration, GrantRollover,
    LedgerEntry, validate_rollover,
};
use aforo_domain_models::fault::DomainFault;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Especificación de creación de una feature.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSpec {
    pub name: String,
    pub meter_slug: String,
    #[serde(default)]
    pub meter_group_by_filters: BTreeMap<String, String>,
}

impl FeatureSpec {
    pub fn validate(&self) -> Result<(), DomainFault> {
        if self.name.trim().is_empty() {
            return Err(DomainFault::validation("name", "must not be empty"));
        }
        Ok(())
    }
}

/// Especificación de creación de una concesión.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantSpec {
    pub feature_id: Uuid,
    pub amount: f64,
    #[serde(default)]
    pub priority: u8,
    pub effective_at: DateTime<Utc>,
    pub expiration: GrantExpiration,
    #[serde(default)]
    pub rollover: Option<GrantRollover>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl GrantSpec {
    /**
     * Valida los invariantes puros de la concesión.
     *
     * # Logic:
     * 1. Monto estrictamente positivo y finito.
     * 2. 'effective_at' no más allá del sesgo futuro configurado.
     * 3. Expiración con count >= 1 y rollover con tope >= 0.
     */
    pub fn validate(&self, now: DateTime<Utc>, max_future_skew: Duration) -> Result<(), DomainFault> {
        if !(self.amount > 0.0) || !self.amount.is_finite() {
            return Err(DomainFault::validation("amount", "must be a finite amount > 0"));
        }
        if self.effective_at > now + max_future_skew {
            return Err(DomainFault::validation(
                "effectiveAt",
                "must not lie in the future beyond the configured skew",
            ));
        }
        if self.expiration.count == 0 {
            return Err(DomainFault::validation("expiration.count", "must be >= 1"));
        }
        validate_rollover(&self.rollover)?;
        Ok(())
    }
}

/// Contrato del conector de crédito: CRUD de concesiones, features,
/// snapshot de saldos, resets e historial del ledger.
#[async_trait]
pub trait CreditConnector: Send + Sync {
    async fn create_feature(&self, namespace: &str, spec: FeatureSpec) -> Result<Feature, DomainFault>;

    async fn list_features(&self, namespace: &str) -> Result<Vec<Feature>, DomainFault>;

    async fn archive_feature(&self, namespace: &str, feature_id: Uuid) -> Result<Feature, DomainFault>;

    async fn create_grant(
        &self,
        namespace: &str,
        subject: &str,
        spec: GrantSpec,
    ) -> Result<CreditGrant, DomainFault>;

    /// Lista concesiones del sujeto; con 'include_void' incorpora las anuladas.
    async fn list_grants(
        &self,
        namespace: &str,
        subject: &str,
        include_void: bool,
    ) -> Result<Vec<CreditGrant>, DomainFault>;

    async fn void_grant(
        &self,
        namespace: &str,
        subject: &str,
        grant_id: Uuid,
    ) -> Result<CreditGrant, DomainFault>;

    /// Snapshot de saldos del sujeto en 'as_of' (lectura de instantánea).
    async fn get_balance(
        &self,
        namespace: &str,
        subject: &str,
        as_of: DateTime<Utc>,
    ) -> Result<BalanceSnapshot, DomainFault>;

    /// Bifurca los saldos sobrevivientes del sujeto en 'effective_at'.
    async fn reset(
        &self,
        namespace: &str,
        subject: &str,
        effective_at: DateTime<Utc>,
    ) -> Result<CreditReset, DomainFault>;

    /// Historial auditable del sujeto en [from, to).
    async fn ledger_history(
        &self,
        namespace: &str,
        subject: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<LedgerEntry>, DomainFault>;
}
