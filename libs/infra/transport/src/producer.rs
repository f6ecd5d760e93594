// [libs/infra/transport/src/producer.rs]
/*!
 * =================================================================
 * APARATO: TRANSPORT PRODUCER PORT (V2.2 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE PORT (ESTRATO L3)
 * RESPONSABILIDAD: CONTRATO DEL PRODUCTOR Y ÁLGEBRA DE ENRUTADO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. VENDOR-AGNOSTIC: La construcción de clientes de broker es un
 *    colaborador externo; este puerto replica su semántica (topics
 *    particionados, orden por partición, at-least-once).
 * 2. DETERMINISTIC ROUTING: SipHash con claves fijas sobre el sujeto;
 *    el mismo sujeto aterriza siempre en la misma partición.
 * =================================================================
 */

use crate::errors::TransportError;
use async_trait::async_trait;
use siphasher::sip::SipHasher13;
use std::hash::Hasher;

/// Claves fijas del hash de enrutado. Estables entre procesos para que
/// el particionado sobreviva a un reinicio del plano de ingesta.
const ROUTING_HASH_KEY_0: u64 = 0x6166_6f72_6f5f_696e;
const ROUTING_HASH_KEY_1: u64 = 0x6765_7374_5f76_3033;

/// Clave de enrutado determinista de un sujeto.
pub fn routing_key(subject: &str) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(ROUTING_HASH_KEY_0, ROUTING_HASH_KEY_1);
    hasher.write(subject.as_bytes());
    hasher.finish()
}

/// Plantilla de nombre de topic por namespace (por defecto
/// 'om_{namespace}_events').
#[derive(Debug, Clone)]
pub struct TopicTemplate {
    template: String,
}

impl TopicTemplate {
    pub const NAMESPACE_PLACEHOLDER: &'static str = "{namespace}";

    /// Construye la plantilla verificando la presencia del placeholder.
    pub fn new(template: impl Into<String>) -> Result<Self, TransportError> {
        let template = template.into();
        if !template.contains(Self::NAMESPACE_PLACEHOLDER) {
            return Err(TransportError::Template(format!(
                "template '{}' lacks the '{}' placeholder",
                template,
                Self::NAMESPACE_PLACEHOLDER
            )));
        }
        Ok(Self { template })
    }

    /// Renderiza el nombre de topic del namespace.
    pub fn render(&self, namespace: &str) -> String {
        self.template.replace(Self::NAMESPACE_PLACEHOLDER, namespace)
    }
}

impl Default for TopicTemplate {
    fn default() -> Self {
        Self { template: "om_{namespace}_events".to_string() }
    }
}

/// Puerto del productor de transporte, compartido por proceso (thread-safe).
#[async_trait]
pub trait TransportProducer: Send + Sync {
    /// Crea el topic con el particionado pedido. Idempotente.
    async fn provision_topic(&self, topic: &str, partitions: u32) -> Result<(), TransportError>;

    /// Desmantela el topic. Idempotente.
    async fn delete_topic(&self, topic: &str) -> Result<(), TransportError>;

    /**
     * Acepta un registro en el buffer del cliente.
     *
     * Retorna al aceptar en el buffer, no tras el acuse del broker:
     * la durabilidad es responsabilidad de la configuración del
     * transporte (acks=all recomendado, no forzado).
     */
    async fn enqueue(&self, topic: &str, partition_key: u64, payload: Vec<u8>) -> Result<(), TransportError>;
}
