// [tests/mirror/libs/infra/transport/dedupe_decorator.test.rs]
/**
 * =================================================================
 * APARATO: IDEMPOTENCY DECORATOR TEST (V1.1)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L3-MIRROR
 * RESPONSABILIDAD: CERTIFICACIÓN FRESH/DUPLICATE Y VENTANA TTL
 * =================================================================
 */

use aforo_domain_models::event::IngestedEvent;
use aforo_infra_transport::{
    DedupeVerdict, DeduplicatingCollector, Deduplicator, IngestCollector, MemoryDeduplicator,
    PartitionedMemoryLog, TopicTemplate, TransportCollector, TransportProducer,
};
use chrono::Duration;
use serde_json::json;
use std::sync::Arc;

fn envelope(id: &str) -> IngestedEvent {
    serde_json::from_value(json!({
        "id": id,
        "source": "billing-api",
        "type": "dedupe",
        "subject": "customer_1",
        "data": {}
    }))
    .expect("envelope decode failed")
}

async fn decorated_collector() -> (Arc<PartitionedMemoryLog>, DeduplicatingCollector) {
    let transport_log = Arc::new(PartitionedMemoryLog::new());
    transport_log.provision_topic("om_default_events", 1).await.unwrap();
    let inner = Arc::new(TransportCollector::new(transport_log.clone(), TopicTemplate::default()));
    let decorator = DeduplicatingCollector::new(inner, Arc::new(MemoryDeduplicator::with_default_ttl()));
    (transport_log, decorator)
}

#[tokio::test]
async fn certify_repeated_identity_is_a_successful_noop() {
    println!("\n♻️  [PROVING_GROUNDS]: Auditing idempotency decorator...");

    let (transport_log, collector) = decorated_collector().await;

    // Misma identidad ingestada 1000 veces: un único registro en el log.
    for _ in 0..1000 {
        collector
            .ingest("default", envelope("52f44f66-5f70-4a43-a9ad-b7b8a3a42a6d"))
            .await
            .expect("duplicate ingest must report success");
    }

    assert_eq!(
        transport_log.topic_depth("om_default_events"),
        1,
        "L3_DEDUPE_FAULT: duplicate identity reached the transport log."
    );
}

#[tokio::test]
async fn certify_distinct_sources_are_distinct_identities() {
    let (transport_log, collector) = decorated_collector().await;

    let mut from_other_source = envelope("evt_1");
    from_other_source.source = "other-api".to_string();

    collector.ingest("default", envelope("evt_1")).await.unwrap();
    collector.ingest("default", from_other_source).await.unwrap();

    assert_eq!(transport_log.topic_depth("om_default_events"), 2);
}

#[tokio::test]
async fn certify_ttl_expiry_readmits_the_identity() {
    let deduplicator = MemoryDeduplicator::new(Duration::zero());

    let first = deduplicator.check_and_set("default", "api", "evt_1").await.unwrap();
    assert_eq!(first, DedupeVerdict::Fresh);

    // TTL cero: la segunda aparición vuelve a ser fresca.
    let second = deduplicator.check_and_set("default", "api", "evt_1").await.unwrap();
    assert_eq!(second, DedupeVerdict::Fresh, "L3_DEDUPE_FAULT: expired entry still deduplicated.");
}

#[tokio::test]
async fn certify_batch_dedupe_forwards_only_fresh_events() {
    let (transport_log, collector) = decorated_collector().await;

    collector.ingest("default", envelope("evt_1")).await.unwrap();
    collector
        .ingest_batch("default", vec![envelope("evt_1"), envelope("evt_2")])
        .await
        .expect("batch with duplicates must succeed");

    assert_eq!(transport_log.topic_depth("om_default_events"), 2);
}
