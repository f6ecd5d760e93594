// [tests/mirror/libs/infra/transport/collector_ingest.test.rs]
/**
 * =================================================================
 * APARATO: INGEST COLLECTOR TEST (V1.1)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L3-MIRROR
 * RESPONSABILIDAD: CERTIFICACIÓN DE VALIDACIÓN, SELLADO Y ENRUTADO
 * =================================================================
 */

use aforo_domain_models::event::IngestedEvent;
use aforo_domain_models::fault::{DomainFault, FaultClass};
use aforo_infra_transport::{
    IngestCollector, PartitionedMemoryLog, TopicTemplate, TransportCollector, TransportProducer,
};
use serde_json::json;
use std::sync::Arc;

fn envelope(id: &str, subject: &str) -> IngestedEvent {
    serde_json::from_value(json!({
        "id": id,
        "source": "billing-api",
        "type": "request",
        "subject": subject,
        "data": {"duration_ms": 100}
    }))
    .expect("envelope decode failed")
}

async fn provisioned_collector() -> (Arc<PartitionedMemoryLog>, TransportCollector) {
    let transport_log = Arc::new(PartitionedMemoryLog::new());
    transport_log
        .provision_topic("om_default_events", 4)
        .await
        .expect("topic provisioning failed");
    let collector = TransportCollector::new(transport_log.clone(), TopicTemplate::default());
    (transport_log, collector)
}

#[tokio::test]
async fn certify_accepted_event_lands_in_the_namespace_topic() {
    println!("\n📨 [PROVING_GROUNDS]: Auditing collector routing...");

    let (transport_log, collector) = provisioned_collector().await;
    collector
        .ingest("default", envelope("evt_1", "customer_1"))
        .await
        .expect("ingest failed");

    assert_eq!(transport_log.topic_depth("om_default_events"), 1);

    // El registro serializado incluye la hora sellada en la recepción.
    let partition_with_record = (0..4)
        .find(|&p| !transport_log.partition_records("om_default_events", p).is_empty())
        .expect("record landed nowhere");
    let payload = transport_log.partition_records("om_default_events", partition_with_record)[0].clone();
    let decoded: serde_json::Value = serde_json::from_slice(&payload).unwrap();
    assert_eq!(decoded["id"], "evt_1");
    assert!(decoded["time"].is_string(), "L3_INGEST_FAULT: receipt time not stamped.");
}

#[tokio::test]
async fn certify_validation_rejects_before_touching_transport() {
    let (transport_log, collector) = provisioned_collector().await;

    let mut hollow = envelope("evt_1", "customer_1");
    hollow.subject = "".to_string();

    let refusal = collector.ingest("default", hollow).await.unwrap_err();
    assert_eq!(refusal.fault_class(), FaultClass::BadRequest);
    assert_eq!(transport_log.topic_depth("om_default_events"), 0);
}

#[tokio::test]
async fn certify_unprovisioned_topic_surfaces_as_transient() {
    let transport_log = Arc::new(PartitionedMemoryLog::new());
    let collector = TransportCollector::new(transport_log, TopicTemplate::default());

    let refusal = collector
        .ingest("ghost", envelope("evt_1", "customer_1"))
        .await
        .unwrap_err();
    assert_eq!(
        refusal.fault_class(),
        FaultClass::Transient,
        "L3_INGEST_FAULT: missing topic must be retryable for the caller."
    );
}

#[tokio::test]
async fn certify_batch_reports_indexed_violations_without_enqueueing() {
    let (transport_log, collector) = provisioned_collector().await;

    let mut broken = envelope("evt_2", "customer_2");
    broken.event_type = "".to_string();

    let batch = vec![envelope("evt_1", "customer_1"), broken, envelope("evt_3", "customer_3")];
    let refusal = collector.ingest_batch("default", batch).await.unwrap_err();

    match refusal {
        DomainFault::BatchValidation { failures } => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].index, 1);
            assert_eq!(failures[0].field, "type");
        }
        other => panic!("L3_INGEST_FAULT: expected indexed batch violations, got {:?}", other),
    }

    assert_eq!(
        transport_log.topic_depth("om_default_events"),
        0,
        "L3_INGEST_FAULT: invalid batch partially enqueued."
    );
}
