// [libs/domain/credit/src/nope.rs]
/*!
 * =================================================================
 * APARATO: NOPE CREDIT CONNECTOR (V1.1 - SOBERANO)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2/L7)
 * RESPONSABILIDAD: VARIANTE DESHABILITADA DEL KERNEL DE CRÉDITO
 *
 * Con entitlements deshabilitados en configuración, toda operación de
 * crédito retorna NOT_IMPLEMENTED. Variante explícita del conector,
 * jamás un chequeo de nulos en los handlers.
 * =================================================================
 */

use crate::connector::{CreditConnector, FeatureSpec, GrantSpec};
use crate::model::{BalanceSnapshot, CreditGrant, CreditReset, Feature, LedgerEntry};
use aforo_domain_models::fault::DomainFault;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

const DISABLED_DETAIL: &str = "entitlements are disabled on this deployment";

/// Conector de crédito para despliegues sin entitlements.
#[derive(Debug, Clone, Copy, Default)]
pub struct NopeCreditConnector;

impl NopeCreditConnector {
    pub fn new() -> Self {
        Self
    }

    fn refusal<T>() -> Result<T, DomainFault> {
        Err(DomainFault::NotImplemented(DISABLED_DETAIL.to_string()))
    }
}

#[async_trait]
impl CreditConnector for NopeCreditConnector {
    async fn create_feature(&self, _namespace: &str, _spec: FeatureSpec) -> Result<Feature, DomainFault> {
        Self::refusal()
    }

    async fn list_features(&self, _namespace: &str) -> Result<Vec<Feature>, DomainFault> {
        Self::refusal()
    }

    async fn archive_feature(&self, _namespace: &str, _feature_id: Uuid) -> Result<Feature, DomainFault> {
        Self::refusal()
    }

    async fn create_grant(
        &self,
        _namespace: &str,
        _subject: &str,
        _spec: GrantSpec,
    ) -> Result<CreditGrant, DomainFault> {
        Self::refusal()
    }

    async fn list_grants(
        &self,
        _namespace: &str,
        _subject: &str,
        _include_void: bool,
    ) -> Result<Vec<CreditGrant>, DomainFault> {
        Self::refusal()
    }

    async fn void_grant(
        &self,
        _namespace: &str,
        _subject: &str,
        _grant_id: Uuid,
    ) -> Result<CreditGrant, DomainFault> {
        Self::refusal()
    }

    async fn get_balance(
        &self,
        _namespace: &str,
        _subject: &str,
        _as_of: DateTime<Utc>,
    ) -> Result<BalanceSnapshot, DomainFault> {
        Self::refusal()
    }

    async fn reset(
        &self,
        _namespace: &str,
        _subject: &str,
        _effective_at: DateTime<Utc>,
    ) -> Result<CreditReset, DomainFault> {
        Self::refusal()
    }

    async fn ledger_history(
        &self,
        _namespace: &str,
        _subject: &str,
        _from: Option<DateTime<Utc>>,
        _to: Option<DateTime<Utc>>,
    ) -> Result<Vec<LedgerEntry>, DomainFault> {
        Self::refusal()
    }
}
