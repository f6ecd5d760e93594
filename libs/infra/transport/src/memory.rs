// [libs/infra/transport/src/memory.rs]
/*!
 * =================================================================
 * APARATO: PARTITIONED MEMORY LOG (V2.3 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: LOG DE TRANSPORTE EN PROCESO CON ORDEN POR PARTICIÓN
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. BROKER SEMANTICS: Topics con particiones append-only; el orden se
 *    preserva dentro de cada partición, jamás entre particiones.
 * 2. DUAL PURPOSE: Adaptador de despliegues embebidos y arnés del
 *    Proving Grounds (inspección de particiones por los tests).
 * =================================================================
 */

use crate::errors::TransportError;
use crate::producer::TransportProducer;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, info};

struct MemoryTopic {
    partitions: Vec<Vec<Vec<u8>>>,
}

/// Log de transporte en proceso, compartido por el colector y los tests.
#[derive(Default)]
pub struct PartitionedMemoryLog {
    topics: RwLock<HashMap<String, MemoryTopic>>,
}

impl PartitionedMemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registros de una partición, en orden de llegada.
    pub fn partition_records(&self, topic: &str, partition: usize) -> Vec<Vec<u8>> {
        let topics = self.topics.read().expect("memory log lock poisoned");
        topics
            .get(topic)
            .and_then(|entry| entry.partitions.get(partition))
            .cloned()
            .unwrap_or_default()
    }

    /// Total de registros aceptados en el topic.
    pub fn topic_depth(&self, topic: &str) -> usize {
        let topics = self.topics.read().expect("memory log lock poisoned");
        topics
            .get(topic)
            .map(|entry| entry.partitions.iter().map(Vec::len).sum())
            .unwrap_or(0)
    }

    /// Cantidad de particiones aprovisionadas del topic.
    pub fn partition_count(&self, topic: &str) -> usize {
        let topics = self.topics.read().expect("memory log lock poisoned");
        topics.get(topic).map(|entry| entry.partitions.len()).unwrap_or(0)
    }
}

#[async_trait]
impl TransportProducer for PartitionedMemoryLog {
    async fn provision_topic(&self, topic: &str, partitions: u32) -> Result<(), TransportError> {
        let mut topics = self.topics.write().expect("memory log lock poisoned");
        if topics.contains_key(topic) {
            debug!("📦 [TRANSPORT_LOG]: Topic '{}' already provisioned (idempotent).", topic);
            return Ok(());
        }
        let partition_count = partitions.max(1) as usize;
        topics.insert(
            topic.to_string(),
            MemoryTopic { partitions: vec![Vec::new(); partition_count] },
        );
        info!("📦 [TRANSPORT_LOG]: Topic '{}' provisioned with {} partitions.", topic, partition_count);
        Ok(())
    }

    async fn delete_topic(&self, topic: &str) -> Result<(), TransportError> {
        let mut topics = self.topics.write().expect("memory log lock poisoned");
        topics.remove(topic);
        Ok(())
    }

    async fn enqueue(&self, topic: &str, partition_key: u64, payload: Vec<u8>) -> Result<(), TransportError> {
        let mut topics = self.topics.write().expect("memory log lock poisoned");
        let Some(entry) = topics.get_mut(topic) else {
            return Err(TransportError::UnknownTopic(format!(
                "topic '{}' has not been provisioned",
                topic
            )));
        };
        let partition = (partition_key % entry.partitions.len() as u64) as usize;
        entry.partitions[partition].push(payload);
        Ok(())
    }
}
