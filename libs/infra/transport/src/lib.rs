// [libs/infra/transport/src/lib.rs]
/*!
 * =================================================================
 * APARATO: INGEST TRANSPORT PLANE (V3.0 - GOLD MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: COLECCIÓN, IDEMPOTENCIA Y ENRUTADO DE EVENTOS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. AT-LEAST-ONCE: El colector retorna tras la aceptación en el buffer
 *    del productor; la durabilidad la gobierna la configuración del
 *    transporte (acks del broker fuera del alcance del kernel).
 * 2. SUBJECT ORDERING: Clave de enrutado = hash(subject); el log
 *    particionado preserva el orden por partición.
 * 3. DECORATOR IDEMPOTENCY: La deduplicación envuelve al colector con
 *    su mismo contrato (adaptador delegante, jamás herencia).
 * =================================================================
 */

pub mod collector;
pub mod dedupe;
pub mod errors;
pub mod memory;
pub mod producer;
pub mod provisioner;
pub mod serializer;

pub use collector::{IngestCollector, TransportCollector};
pub use dedupe::{DedupeVerdict, DeduplicatingCollector, Deduplicator, MemoryDeduplicator};
pub use errors::TransportError;
pub use memory::PartitionedMemoryLog;
pub use producer::{routing_key, TopicTemplate, TransportProducer};
pub use provisioner::TopicProvisioner;
pub use serializer::to_canonical_json;
