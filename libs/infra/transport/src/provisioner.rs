// [libs/infra/transport/src/provisioner.rs]
/*!
 * =================================================================
 * APARATO: TOPIC PROVISIONER (V2.0 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: NAMESPACE HANDLER DEL PLANO DE TRANSPORTE
 * =================================================================
 */

use crate::producer::{TopicTemplate, TransportProducer};
use aforo_domain_models::fault::DomainFault;
use aforo_domain_namespace::NamespaceHandler;
use async_trait::async_trait;
use std::sync::Arc;

/// Handler de namespaces que aprovisiona el topic de eventos del tenant.
pub struct TopicProvisioner {
    producer: Arc<dyn TransportProducer>,
    topic_template: TopicTemplate,
    partitions: u32,
}

impl TopicProvisioner {
    pub fn new(producer: Arc<dyn TransportProducer>, topic_template: TopicTemplate, partitions: u32) -> Self {
        Self { producer, topic_template, partitions }
    }
}

#[async_trait]
impl NamespaceHandler for TopicProvisioner {
    fn handler_name(&self) -> &'static str {
        "transport-topic"
    }

    async fn create_namespace(&self, name: &str) -> Result<(), DomainFault> {
        let topic = self.topic_template.render(name);
        self.producer
            .provision_topic(&topic, self.partitions)
            .await
            .map_err(DomainFault::from)
    }

    async fn delete_namespace(&self, name: &str) -> Result<(), DomainFault> {
        let topic = self.topic_template.render(name);
        self.producer.delete_topic(&topic).await.map_err(DomainFault::from)
    }
}
