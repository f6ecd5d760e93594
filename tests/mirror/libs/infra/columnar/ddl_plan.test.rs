// [tests/mirror/libs/infra/columnar/ddl_plan.test.rs]
/**
 * =================================================================
 * APARATO: DDL PLAN CERTIFICATION (V1.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L3-MIRROR
 * RESPONSABILIDAD: CERTIFICACIÓN DE PLANES DE MATERIALIZACIÓN
 * =================================================================
 */

use aforo_domain_models::meter::{Meter, MeterAggregation, WindowSize};
use aforo_infra_columnar::plan;
use std::collections::BTreeMap;

fn meter_with(aggregation: MeterAggregation, value_property: Option<&str>) -> Meter {
    let mut group_by = BTreeMap::new();
    group_by.insert("model".to_string(), "$.model".to_string());
    Meter {
        slug: "tokens".to_string(),
        description: None,
        event_type: "prompt".to_string(),
        aggregation,
        value_property: value_property.map(str::to_string),
        group_by,
        window_size: WindowSize::Minute,
    }
}

#[test]
fn certify_events_table_matches_the_columnar_schema() {
    println!("\n🧱 [PROVING_GROUNDS]: Auditing raw events table DDL...");

    let sql = plan::create_events_table_sql("metering", "acme");
    assert!(sql.contains("CREATE TABLE IF NOT EXISTS metering.om_acme_events"));
    assert!(sql.contains("namespace LowCardinality(String)"));
    assert!(sql.contains("type LowCardinality(String)"));
    assert!(sql.contains("time DateTime"));
    assert!(sql.contains("data String"));
    assert!(sql.contains("ENGINE = MergeTree"));
    assert!(sql.contains("ORDER BY (namespace, type, subject, time)"));
}

#[test]
fn certify_transport_queue_consumes_the_namespace_topic() {
    let sql = plan::create_events_queue_sql(
        "metering",
        "acme",
        "broker-1:9092",
        "om_acme_events",
        "om_acme_consumer",
    );
    assert!(sql.contains("CREATE TABLE IF NOT EXISTS metering.om_acme_events_queue"));
    assert!(sql.contains("ENGINE = Kafka"));
    assert!(sql.contains("kafka_broker_list = 'broker-1:9092'"));
    assert!(sql.contains("kafka_topic_list = 'om_acme_events'"));
    assert!(sql.contains("kafka_format = 'JSONEachRow'"));

    let consumer = plan::create_events_consumer_sql("metering", "acme");
    assert!(consumer.contains("TO metering.om_acme_events"));
    assert!(consumer.contains("parseDateTimeBestEffort(time) AS time"));
    assert!(consumer.contains("'acme' AS namespace"));
}

#[test]
fn certify_unique_count_uses_cardinality_estimating_state() {
    let meter = meter_with(MeterAggregation::UniqueCount, Some("$.trace_id"));

    let table_sql = plan::create_meter_table_sql("metering", "acme", &meter);
    assert!(table_sql.contains("value AggregateFunction(uniq, String)"));

    let view_sql = plan::create_meter_view_sql("metering", "acme", &meter);
    assert!(view_sql.contains("uniqState(JSON_VALUE(data, '$.trace_id')) AS value"));
}

#[test]
fn certify_backfill_replays_the_raw_table_into_the_materialisation() {
    let meter = meter_with(MeterAggregation::Sum, Some("$.tokens"));

    let populate_sql = plan::populate_meter_sql("metering", "acme", &meter);
    assert!(populate_sql.starts_with("INSERT INTO metering.om_acme_meter_tokens SELECT"));
    assert!(populate_sql.contains("FROM metering.om_acme_events"));
    assert!(populate_sql.contains("WHERE type = 'prompt'"));
}

#[test]
fn certify_drop_statements_cover_view_then_table() {
    let meter = meter_with(MeterAggregation::Sum, Some("$.tokens"));

    let statements = plan::drop_meter_sql("metering", "acme", &meter);
    assert_eq!(statements.len(), 2);
    assert!(statements[0].contains("DROP VIEW IF EXISTS metering.om_acme_meter_tokens_mv"));
    assert!(statements[1].contains("DROP TABLE IF EXISTS metering.om_acme_meter_tokens"));
}

#[test]
fn certify_group_columns_are_nullable_and_inside_the_sort_key() {
    let meter = meter_with(MeterAggregation::Sum, Some("$.tokens"));

    let table_sql = plan::create_meter_table_sql("metering", "acme", &meter);
    assert!(table_sql.contains("model Nullable(String)"));
    assert!(table_sql.contains("ORDER BY (windowstart, windowend, subject, model)"));
    assert!(table_sql.contains("allow_nullable_key = 1"));
}
