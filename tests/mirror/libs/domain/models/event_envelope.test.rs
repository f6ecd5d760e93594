// [tests/mirror/libs/domain/models/event_envelope.test.rs]
/**
 * =================================================================
 * APARATO: CLOUDEVENTS ENVELOPE TEST (V1.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L2-MIRROR
 * RESPONSABILIDAD: CERTIFICACIÓN DEL SOBRE Y SUS DEFAULTS
 * =================================================================
 */

use aforo_domain_models::event::IngestedEvent;
use chrono::{TimeZone, Utc};
use serde_json::json;

fn decode(raw: serde_json::Value) -> IngestedEvent {
    serde_json::from_value(raw).expect("envelope decode failed")
}

#[test]
fn certify_wire_decode_with_defaults() {
    println!("\n📨 [PROVING_GROUNDS]: Auditing CloudEvents envelope decode...");

    let event = decode(json!({
        "id": "8f5b5f66-3a5c-4a26-9b91-2f6e1dc72b2b",
        "source": "billing-api",
        "type": "request",
        "subject": "customer_1",
        "data": {"duration_ms": 100}
    }));

    assert_eq!(event.specversion, "1.0", "L2_EVENT_FAULT: specversion default lost.");
    assert!(event.time.is_none());
    assert!(event.validate().is_ok());
}

#[test]
fn certify_identity_fields_must_not_be_empty() {
    for hollow_field in ["id", "source", "type", "subject"] {
        let mut raw = json!({
            "id": "evt_1", "source": "api", "type": "request", "subject": "customer_1"
        });
        raw[hollow_field] = json!("  ");
        let event = decode(raw);
        assert!(
            event.validate().is_err(),
            "L2_EVENT_FAULT: empty '{}' accepted.",
            hollow_field
        );
    }
}

#[test]
fn certify_json_content_type_demands_object_payload() {
    let mut event = decode(json!({
        "id": "evt_1", "source": "api", "type": "request", "subject": "customer_1",
        "datacontenttype": "application/json",
        "data": {"tokens": 3}
    }));
    assert!(event.validate().is_ok());

    event.data = Some(json!([1, 2, 3]));
    assert!(event.validate().is_err(), "L2_EVENT_FAULT: non-object JSON payload accepted.");
}

#[test]
fn certify_receipt_time_stamping_is_idempotent() {
    let mut event = decode(json!({
        "id": "evt_1", "source": "api", "type": "request", "subject": "customer_1"
    }));

    let receipt = Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap();
    event.stamp_receipt_time(receipt);
    assert_eq!(event.time, Some(receipt));

    // Un segundo sellado jamás pisa la marca del productor.
    event.stamp_receipt_time(receipt + chrono::Duration::hours(1));
    assert_eq!(event.time, Some(receipt));
}

#[test]
fn certify_malformed_rfc3339_is_rejected_at_decode() {
    let raw = json!({
        "id": "evt_1", "source": "api", "type": "request", "subject": "customer_1",
        "time": "2026-02-01 12:00:00"
    });
    assert!(
        serde_json::from_value::<IngestedEvent>(raw).is_err(),
        "L2_EVENT_FAULT: naive timestamp accepted."
    );
}
