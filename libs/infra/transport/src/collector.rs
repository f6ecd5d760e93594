// [libs/infra/transport/src/collector.rs]
/*!
 * =================================================================
 * APARATO: INGEST COLLECTOR (V3.1 - GOLD MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: VALIDACIÓN SÍNCRONA Y ENRUTADO AT-LEAST-ONCE
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. SYNC EDGE: Valida el sobre, sella la hora de recepción y serializa
 *    en forma canónica antes de tocar el transporte.
 * 2. BATCH SEMANTICS: Un lote con cualquier sobre inválido aborta con
 *    la lista estructurada de violaciones por índice; los registros ya
 *    aceptados quedan en el log (at-least-once tolerado).
 * =================================================================
 */

use crate::producer::{routing_key, TopicTemplate, TransportProducer};
use crate::serializer::to_canonical_json;
use aforo_domain_models::event::IngestedEvent;
use aforo_domain_models::fault::{DomainFault, IndexedViolation};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Contrato del colector de ingesta (at-least-once hacia el transporte).
#[async_trait]
pub trait IngestCollector: Send + Sync {
    /// Ingesta un sobre en el topic del namespace.
    async fn ingest(&self, namespace: &str, event: IngestedEvent) -> Result<(), DomainFault>;

    /// Ingesta un lote homogéneo; valida todo el lote antes de encolar.
    async fn ingest_batch(&self, namespace: &str, events: Vec<IngestedEvent>) -> Result<(), DomainFault>;
}

/// Colector soberano sobre el puerto del productor de transporte.
pub struct TransportCollector {
    producer: Arc<dyn TransportProducer>,
    topic_template: TopicTemplate,
}

impl TransportCollector {
    pub fn new(producer: Arc<dyn TransportProducer>, topic_template: TopicTemplate) -> Self {
        Self { producer, topic_template }
    }

    async fn enqueue_validated(&self, namespace: &str, event: &IngestedEvent) -> Result<(), DomainFault> {
        let payload = to_canonical_json(event)?;
        let topic = self.topic_template.render(namespace);

        self.producer
            .enqueue(&topic, routing_key(&event.subject), payload)
            .await?;

        debug!(
            "📨 [INGEST_ACCEPTED]: Event '{}' from '{}' routed to topic '{}'.",
            event.id, event.source, topic
        );
        Ok(())
    }
}

#[async_trait]
impl IngestCollector for TransportCollector {
    #[instrument(skip(self, event), fields(namespace = %namespace))]
    async fn ingest(&self, namespace: &str, event: IngestedEvent) -> Result<(), DomainFault> {
        let mut event = event;
        event.validate()?;
        event.stamp_receipt_time(Utc::now());
        self.enqueue_validated(namespace, &event).await
    }

    #[instrument(skip(self, events), fields(namespace = %namespace, batch = events.len()))]
    async fn ingest_batch(&self, namespace: &str, events: Vec<IngestedEvent>) -> Result<(), DomainFault> {
        // 1. VALIDACIÓN COMPLETA DEL LOTE (sin encolar nada todavía).
        let mut violations: Vec<IndexedViolation> = Vec::new();
        for (index, event) in events.iter().enumerate() {
            if let Err(validation_fault) = event.validate() {
                let (field, message) = match validation_fault {
                    DomainFault::Validation { field, message } => (field, message),
                    other => ("event".to_string(), other.safe_detail()),
                };
                violations.push(IndexedViolation { index, field, message });
            }
        }
        if !violations.is_empty() {
            return Err(DomainFault::BatchValidation { failures: violations });
        }

        // 2. ENCOLADO SECUENCIAL (preserva el orden por sujeto).
        let receipt_instant = Utc::now();
        for mut event in events {
            event.stamp_receipt_time(receipt_instant);
            self.enqueue_validated(namespace, &event).await?;
        }
        Ok(())
    }
}
