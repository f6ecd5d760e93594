// [libs/infra/transport/src/dedupe.rs]
/*!
 * =================================================================
 * APARATO: IDEMPOTENCY STRATUM (V2.2 - GOLD MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: CHECK-AND-SET SOBRE LA IDENTIDAD DEL EVENTO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. IDENTITY TRIPLET: (namespace, source, id) digestado con SHA-256
 *    para acotar la huella de memoria del almacén.
 * 2. FAIL-CLOSED: La indisponibilidad del almacén jamás acepta
 *    silenciosamente un duplicado potencial; se propaga TRANSIENT.
 * 3. TTL WINDOW: Las entradas frescas viven lo suficiente para cubrir
 *    la ventana de reintentos del productor (24h por defecto).
 * =================================================================
 */

use crate::collector::IngestCollector;
use aforo_domain_models::event::IngestedEvent;
use aforo_domain_models::fault::{DomainFault, IndexedViolation};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument};

/// Veredicto del check-and-set de idempotencia.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupeVerdict {
    /// Identidad no vista dentro del TTL; quedó registrada.
    Fresh,
    /// Identidad ya vista dentro del TTL.
    Duplicate,
}

/// Puerto del almacén de idempotencia (cache clave-valor con CAS).
#[async_trait]
pub trait Deduplicator: Send + Sync {
    async fn check_and_set(
        &self,
        namespace: &str,
        source: &str,
        id: &str,
    ) -> Result<DedupeVerdict, DomainFault>;
}

/// Digest estable de la tripleta de identidad.
fn identity_digest(namespace: &str, source: &str, id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(namespace.as_bytes());
    hasher.update([0x1f]);
    hasher.update(source.as_bytes());
    hasher.update([0x1f]);
    hasher.update(id.as_bytes());
    hex::encode(hasher.finalize())
}

/// Driver de idempotencia en memoria con expiración por TTL.
pub struct MemoryDeduplicator {
    ttl: Duration,
    seen: Mutex<HashMap<String, DateTime<Utc>>>,
}

/// Umbral de entradas a partir del cual se poda el almacén en caliente.
const PRUNE_HIGH_WATER_MARK: usize = 16_384;

impl MemoryDeduplicator {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, seen: Mutex::new(HashMap::new()) }
    }

    /// TTL por defecto: cubre la ventana de reintentos de productores (24h).
    pub fn with_default_ttl() -> Self {
        Self::new(Duration::hours(24))
    }
}

#[async_trait]
impl Deduplicator for MemoryDeduplicator {
    async fn check_and_set(
        &self,
        namespace: &str,
        source: &str,
        id: &str,
    ) -> Result<DedupeVerdict, DomainFault> {
        let digest = identity_digest(namespace, source, id);
        let now = Utc::now();

        let mut seen = self
            .seen
            .lock()
            .map_err(|_| DomainFault::Transient("idempotency store lock poisoned".to_string()))?;

        if seen.len() > PRUNE_HIGH_WATER_MARK {
            let ttl = self.ttl;
            seen.retain(|_, recorded_at| now - *recorded_at < ttl);
        }

        match seen.get(&digest) {
            Some(recorded_at) if now - *recorded_at < self.ttl => Ok(DedupeVerdict::Duplicate),
            _ => {
                seen.insert(digest, now);
                Ok(DedupeVerdict::Fresh)
            }
        }
    }
}

/// Decorador de idempotencia sobre el colector, con su mismo contrato.
///
/// Un veredicto 'Duplicate' retorna éxito sin encolar; el productor
/// reintentante observa el mismo resultado que en su primer intento.
pub struct DeduplicatingCollector {
    inner: Arc<dyn IngestCollector>,
    deduplicator: Arc<dyn Deduplicator>,
}

impl DeduplicatingCollector {
    pub fn new(inner: Arc<dyn IngestCollector>, deduplicator: Arc<dyn Deduplicator>) -> Self {
        Self { inner, deduplicator }
    }
}

#[async_trait]
impl IngestCollector for DeduplicatingCollector {
    #[instrument(skip(self, event), fields(namespace = %namespace))]
    async fn ingest(&self, namespace: &str, event: IngestedEvent) -> Result<(), DomainFault> {
        event.validate()?;

        let verdict = self
            .deduplicator
            .check_and_set(namespace, &event.source, &event.id)
            .await?;

        match verdict {
            DedupeVerdict::Duplicate => {
                debug!(
                    "♻️  [DEDUPE_HIT]: Event '{}' from '{}' already seen within TTL. No-op.",
                    event.id, event.source
                );
                Ok(())
            }
            DedupeVerdict::Fresh => self.inner.ingest(namespace, event).await,
        }
    }

    #[instrument(skip(self, events), fields(namespace = %namespace, batch = events.len()))]
    async fn ingest_batch(&self, namespace: &str, events: Vec<IngestedEvent>) -> Result<(), DomainFault> {
        // Misma semántica de lote que el colector interno: toda violación
        // se reporta con su índice antes de tocar el almacén.
        let mut violations: Vec<IndexedViolation> = Vec::new();
        for (index, event) in events.iter().enumerate() {
            if let Err(DomainFault::Validation { field, message }) = event.validate() {
                violations.push(IndexedViolation { index, field, message });
            }
        }
        if !violations.is_empty() {
            return Err(DomainFault::BatchValidation { failures: violations });
        }

        let mut fresh_events = Vec::with_capacity(events.len());
        for event in events {
            let verdict = self
                .deduplicator
                .check_and_set(namespace, &event.source, &event.id)
                .await?;
            if verdict == DedupeVerdict::Fresh {
                fresh_events.push(event);
            }
        }

        if fresh_events.is_empty() {
            return Ok(());
        }
        self.inner.ingest_batch(namespace, fresh_events).await
    }
}
