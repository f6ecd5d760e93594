// [libs/infra/db-turso/src/connector.rs]
/*!
 * =================================================================
 * APARATO: LEDGER CREDIT CONNECTOR (V3.3 - GOLD MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3/L7)
 * RESPONSABILIDAD: OPERACIONES DE CRÉDITO SOBRE EL LEDGER PERSISTENTE
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. SUBJECT SERIALISATION: Mutaciones (grant, void, reset) de un mismo
 *    sujeto serializadas con un candado consultivo por sujeto; las
 *    lecturas de saldo son instantáneas sin candado.
 * 2. USAGE SYNAPSE: El uso medido llega del conector de streaming con
 *    los filtros de la feature y la granularidad nativa del medidor.
 * 3. RESET FORK: Los saldos sobrevivientes se bifurcan en concesiones
 *    hijas que preservan el vencimiento original del padre; el rastro
 *    (VOID + RESET) queda íntegro para auditoría.
 * =================================================================
 */

use crate::repositories::{FeatureRepository, GrantLedgerRepository};
use crate::TursoClient;
use aforo_domain_credit::{
    replay_feature_balance, BalanceSnapshot, CreditConnector, CreditGrant, CreditReset, Feature,
    FeatureBalance, FeatureSpec, GrantBalance, GrantSpec, GrantType, LedgerEntry, UsagePoint,
};
use aforo_domain_models::fault::DomainFault;
use aforo_domain_models::query::MeterQueryParams;
use aforo_domain_models::registry::MeterRegistry;
use aforo_domain_models::streaming::StreamingConnector;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{info, instrument};
use uuid::Uuid;

/// Configuración del conector de crédito persistente.
#[derive(Debug, Clone)]
pub struct LedgerCreditConnectorConfig {
    /// Sesgo futuro tolerado en 'effectiveAt' de concesiones y resets.
    pub max_future_skew: Duration,
}

impl Default for LedgerCreditConnectorConfig {
    fn default() -> Self {
        Self { max_future_skew: Duration::minutes(5) }
    }
}

/// Conector de crédito soberano sobre libSQL + streaming.
pub struct LedgerCreditConnector {
    features: FeatureRepository,
    grants: GrantLedgerRepository,
    streaming: Arc<dyn StreamingConnector>,
    registry: Arc<MeterRegistry>,
    subject_locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
    config: LedgerCreditConnectorConfig,
}

impl LedgerCreditConnector {
    pub fn new(
        client: TursoClient,
        streaming: Arc<dyn StreamingConnector>,
        registry: Arc<MeterRegistry>,
        config: LedgerCreditConnectorConfig,
    ) -> Self {
        Self {
            features: FeatureRepository::new(client.clone()),
            grants: GrantLedgerRepository::new(client),
            streaming,
            registry,
            subject_locks: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Candado consultivo por (namespace, sujeto) para mutaciones.
    async fn lock_subject(&self, namespace: &str, subject: &str) -> OwnedMutexGuard<()> {
        let subject_lock = {
            let mut locks = self.subject_locks.lock().expect("subject lock registry poisoned");
            locks
                .entry(format!("{}::{}", namespace, subject))
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        subject_lock.lock_owned().await
    }

    /// Uso medido de una feature para el sujeto, a granularidad nativa.
    async fn measured_usage(
        &self,
        namespace: &str,
        feature: &Feature,
        subject: &str,
        feature_grants: &[CreditGrant],
        as_of: DateTime<Utc>,
    ) -> Result<Vec<UsagePoint>, DomainFault> {
        let Some(earliest_effective) = feature_grants.iter().map(|grant| grant.effective_at).min() else {
            return Ok(Vec::new());
        };

        let meter = self.registry.resolve(&feature.meter_slug)?;
        let params = MeterQueryParams {
            from: Some(earliest_effective),
            to: Some(as_of),
            window_size: Some(meter.window_size),
            subjects: vec![subject.to_string()],
            filter_group_by: feature.meter_group_by_filters.clone(),
            ..MeterQueryParams::default()
        };

        let result = self
            .streaming
            .query_meter(namespace, &feature.meter_slug, &params)
            .await?;

        Ok(result
            .data
            .into_iter()
            .map(|row| UsagePoint { at: row.window_start, amount: row.value })
            .collect())
    }

    /// Replay completo del sujeto: saldos por feature y por concesión.
    async fn replay_subject(
        &self,
        namespace: &str,
        subject: &str,
        as_of: DateTime<Utc>,
    ) -> Result<(Vec<FeatureBalance>, Vec<GrantBalance>), DomainFault> {
        let all_grants = self
            .grants
            .grants_for_balance(namespace, subject, as_of)
            .await
            .map_err(DomainFault::from)?;
        let last_reset = self
            .grants
            .latest_reset_at_or_before(namespace, subject, as_of)
            .await
            .map_err(DomainFault::from)?
            .map(|reset| reset.effective_at);

        let mut grants_by_feature: BTreeMap<Uuid, Vec<CreditGrant>> = BTreeMap::new();
        for grant in all_grants {
            grants_by_feature.entry(grant.feature_id).or_default().push(grant);
        }

        let mut feature_balances = Vec::new();
        let mut grant_balances = Vec::new();

        for (feature_id, feature_grants) in grants_by_feature {
            let feature = self
                .features
                .get_feature(namespace, feature_id)
                .await
                .map_err(DomainFault::from)?;

            let usage = self
                .measured_usage(namespace, &feature, subject, &feature_grants, as_of)
                .await?;

            let outcome = replay_feature_balance(&feature_grants, last_reset, &usage, as_of);

            grant_balances.extend(
                outcome
                    .grant_balances
                    .iter()
                    .filter(|entry| entry.grant.is_active_at(as_of))
                    .cloned(),
            );
            feature_balances.push(FeatureBalance {
                balance: outcome.feature_balance(as_of),
                usage: outcome.consumed + outcome.overage,
                feature,
            });
        }

        Ok((feature_balances, grant_balances))
    }
}

#[async_trait]
impl CreditConnector for LedgerCreditConnector {
    #[instrument(skip(self, spec), fields(namespace = %namespace))]
    async fn create_feature(&self, namespace: &str, spec: FeatureSpec) -> Result<Feature, DomainFault> {
        spec.validate()?;

        // La feature solo puede filtrar claves declaradas por su medidor.
        let meter = self.registry.resolve(&spec.meter_slug)?;
        for filter_key in spec.meter_group_by_filters.keys() {
            if !meter.group_by.contains_key(filter_key) {
                return Err(DomainFault::validation(
                    format!("meterGroupByFilters.{}", filter_key),
                    "key is not declared by the meter",
                ));
            }
        }

        let feature = Feature {
            id: Uuid::new_v4(),
            name: spec.name,
            meter_slug: spec.meter_slug,
            meter_group_by_filters: spec.meter_group_by_filters,
            archived: false,
        };
        self.features
            .insert_feature(namespace, &feature)
            .await
            .map_err(DomainFault::from)?;
        Ok(feature)
    }

    async fn list_features(&self, namespace: &str) -> Result<Vec<Feature>, DomainFault> {
        self.features.list_features(namespace).await.map_err(DomainFault::from)
    }

    async fn archive_feature(&self, namespace: &str, feature_id: Uuid) -> Result<Feature, DomainFault> {
        self.features
            .archive_feature(namespace, feature_id)
            .await
            .map_err(DomainFault::from)
    }

    #[instrument(skip(self, spec), fields(namespace = %namespace, subject = %subject))]
    async fn create_grant(
        &self,
        namespace: &str,
        subject: &str,
        spec: GrantSpec,
    ) -> Result<CreditGrant, DomainFault> {
        let _subject_guard = self.lock_subject(namespace, subject).await;

        spec.validate(Utc::now(), self.config.max_future_skew)?;

        let feature = self
            .features
            .get_feature(namespace, spec.feature_id)
            .await
            .map_err(DomainFault::from)?;
        if feature.archived {
            return Err(DomainFault::validation(
                "featureId",
                "feature is archived and rejects new grants",
            ));
        }

        let grant = CreditGrant {
            id: Uuid::new_v4(),
            parent_id: None,
            subject: subject.to_string(),
            feature_id: spec.feature_id,
            grant_type: GrantType::Usage,
            amount: spec.amount,
            priority: spec.priority,
            effective_at: spec.effective_at,
            expiration: spec.expiration,
            expires_at: spec.expiration.expiry_from(spec.effective_at),
            rollover: spec.rollover,
            void: false,
            metadata: spec.metadata,
        };
        self.grants
            .insert_grant(namespace, &grant)
            .await
            .map_err(DomainFault::from)?;

        info!("💳 [CREDIT_GRANT]: Grant '{}' of {} issued to '{}'.", grant.id, grant.amount, subject);
        Ok(grant)
    }

    async fn list_grants(
        &self,
        namespace: &str,
        subject: &str,
        include_void: bool,
    ) -> Result<Vec<CreditGrant>, DomainFault> {
        self.grants
            .list_grants(namespace, subject, include_void)
            .await
            .map_err(DomainFault::from)
    }

    #[instrument(skip(self), fields(namespace = %namespace, subject = %subject))]
    async fn void_grant(
        &self,
        namespace: &str,
        subject: &str,
        grant_id: Uuid,
    ) -> Result<CreditGrant, DomainFault> {
        let _subject_guard = self.lock_subject(namespace, subject).await;

        let mut grant = self
            .grants
            .find_grant(namespace, subject, grant_id)
            .await
            .map_err(DomainFault::from)?;
        if grant.void {
            return Err(DomainFault::Conflict("grant is already void".to_string()));
        }

        self.grants
            .insert_void(namespace, subject, grant.id, grant.feature_id, Utc::now())
            .await
            .map_err(DomainFault::from)?;
        grant.void = true;
        Ok(grant)
    }

    async fn get_balance(
        &self,
        namespace: &str,
        subject: &str,
        as_of: DateTime<Utc>,
    ) -> Result<BalanceSnapshot, DomainFault> {
        let (feature_balances, grant_balances) = self.replay_subject(namespace, subject, as_of).await?;
        Ok(BalanceSnapshot {
            subject: subject.to_string(),
            at: as_of,
            feature_balances,
            grant_balances,
        })
    }

    #[instrument(skip(self), fields(namespace = %namespace, subject = %subject))]
    async fn reset(
        &self,
        namespace: &str,
        subject: &str,
        effective_at: DateTime<Utc>,
    ) -> Result<CreditReset, DomainFault> {
        let _subject_guard = self.lock_subject(namespace, subject).await;

        if effective_at > Utc::now() + self.config.max_future_skew {
            return Err(DomainFault::validation(
                "effectiveAt",
                "must not lie in the future beyond the configured skew",
            ));
        }

        // 1. SALDOS SOBREVIVIENTES EN R (replay por feature, incluye hijas
        //    virtuales de rollover nacidas antes de R).
        let persisted_grants = self
            .grants
            .grants_for_balance(namespace, subject, effective_at)
            .await
            .map_err(DomainFault::from)?;
        let persisted_ids: Vec<Uuid> = persisted_grants.iter().map(|grant| grant.id).collect();
        let last_reset = self
            .grants
            .latest_reset_at_or_before(namespace, subject, effective_at)
            .await
            .map_err(DomainFault::from)?
            .map(|reset| reset.effective_at);

        let mut grants_by_feature: BTreeMap<Uuid, Vec<CreditGrant>> = BTreeMap::new();
        for grant in persisted_grants {
            grants_by_feature.entry(grant.feature_id).or_default().push(grant);
        }

        let mut forked_count = 0usize;
        for (feature_id, feature_grants) in grants_by_feature {
            let feature = self
                .features
                .get_feature(namespace, feature_id)
                .await
                .map_err(DomainFault::from)?;
            let usage = self
                .measured_usage(namespace, &feature, subject, &feature_grants, effective_at)
                .await?;
            let outcome = replay_feature_balance(&feature_grants, last_reset, &usage, effective_at);

            // 2. BIFURCACIÓN: void del padre vigente + hija con el saldo
            //    sobreviviente y el vencimiento original preservado.
            for entry in outcome.grant_balances {
                let survives = entry.balance > 0.0
                    && entry.grant.effective_at <= effective_at
                    && entry.grant.expires_at > effective_at;
                if !survives {
                    continue;
                }

                let is_persisted = persisted_ids.contains(&entry.grant.id);
                let child_parent = if is_persisted {
                    entry.grant.id
                } else {
                    // Hija virtual de rollover: el ancla auditable es su
                    // concesión persistida ancestra.
                    entry.grant.parent_id.unwrap_or(entry.grant.id)
                };

                if is_persisted {
                    self.grants
                        .insert_void(namespace, subject, entry.grant.id, feature_id, effective_at)
                        .await
                        .map_err(DomainFault::from)?;
                }

                let child = CreditGrant {
                    id: Uuid::new_v4(),
                    parent_id: Some(child_parent),
                    subject: subject.to_string(),
                    feature_id,
                    grant_type: entry.grant.grant_type,
                    amount: entry.balance,
                    priority: entry.grant.priority,
                    effective_at,
                    expiration: entry.grant.expiration,
                    expires_at: entry.grant.expires_at,
                    rollover: entry.grant.rollover,
                    void: false,
                    metadata: entry.grant.metadata.clone(),
                };
                self.grants
                    .insert_grant(namespace, &child)
                    .await
                    .map_err(DomainFault::from)?;
                forked_count += 1;
            }
        }

        // 3. SELLADO DEL RESET (aditivo; el historial previo queda íntegro).
        let reset = CreditReset {
            id: Uuid::new_v4(),
            subject: subject.to_string(),
            effective_at,
        };
        self.grants
            .insert_reset(namespace, &reset)
            .await
            .map_err(DomainFault::from)?;

        info!("🔄 [CREDIT_RESET]: Subject '{}' forked {} surviving balances at {}.", subject, forked_count, effective_at);
        Ok(reset)
    }

    async fn ledger_history(
        &self,
        namespace: &str,
        subject: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<LedgerEntry>, DomainFault> {
        self.grants
            .ledger_history(namespace, subject, from, to)
            .await
            .map_err(DomainFault::from)
    }
}
