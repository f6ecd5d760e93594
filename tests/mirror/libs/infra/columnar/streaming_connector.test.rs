// [tests/mirror/libs/infra/columnar/streaming_connector.test.rs]
/**
 * =================================================================
 * APARATO: STREAMING CONNECTOR TEST (V1.2)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L3-MIRROR
 * RESPONSABILIDAD: CERTIFICACIÓN DE ALINEACIÓN, POLÍTICAS Y PARSEO
 * =================================================================
 */

use aforo_domain_models::fault::FaultClass;
use aforo_domain_models::meter::{Meter, MeterAggregation, WindowSize};
use aforo_domain_models::query::MeterQueryParams;
use aforo_domain_models::registry::MeterRegistry;
use aforo_domain_models::streaming::{MeterCreatePolicy, StreamingConnector};
use aforo_infra_columnar::{
    ColumnarConnectorConfig, ColumnarError, ColumnarExecutor, ColumnarStreamingConnector,
};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Ejecutor sintético: captura sentencias y sirve filas enlatadas.
#[derive(Default)]
struct ProbeExecutor {
    statements: Mutex<Vec<String>>,
    canned_rows: Mutex<Vec<Map<String, Value>>>,
}

impl ProbeExecutor {
    fn with_rows(rows: Vec<Value>) -> Arc<Self> {
        let maps = rows
            .into_iter()
            .map(|row| row.as_object().cloned().expect("canned row must be an object"))
            .collect();
        Arc::new(Self {
            statements: Mutex::new(Vec::new()),
            canned_rows: Mutex::new(maps),
        })
    }

    fn captured(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }
}

#[async_trait]
impl ColumnarExecutor for ProbeExecutor {
    async fn execute(&self, sql: &str) -> Result<(), ColumnarError> {
        self.statements.lock().unwrap().push(sql.to_string());
        Ok(())
    }

    async fn query(&self, sql: &str) -> Result<Vec<Map<String, Value>>, ColumnarError> {
        self.statements.lock().unwrap().push(sql.to_string());
        Ok(self.canned_rows.lock().unwrap().clone())
    }
}

fn sum_meter() -> Meter {
    let mut group_by = BTreeMap::new();
    group_by.insert("model".to_string(), "$.model".to_string());
    Meter {
        slug: "tokens".to_string(),
        description: None,
        event_type: "prompt".to_string(),
        aggregation: MeterAggregation::Sum,
        value_property: Some("$.tokens".to_string()),
        group_by,
        window_size: WindowSize::Minute,
    }
}

fn connector_with(
    executor: Arc<ProbeExecutor>,
    policy: MeterCreatePolicy,
    populate: bool,
) -> ColumnarStreamingConnector {
    let registry = Arc::new(MeterRegistry::from_definitions(vec![sum_meter()]).unwrap());
    ColumnarStreamingConnector::new(
        executor,
        registry,
        ColumnarConnectorConfig {
            database: "metering".to_string(),
            kafka_broker: "broker-1:9092".to_string(),
            events_topic_template: "om_{namespace}_events".to_string(),
            create_policy: policy,
            populate_meter: populate,
        },
    )
}

#[tokio::test]
async fn certify_replace_policy_drops_recreates_and_backfills() {
    println!("\n🔥 [PROVING_GROUNDS]: Auditing replace+populate policy...");

    let executor = ProbeExecutor::with_rows(vec![]);
    let connector = connector_with(executor.clone(), MeterCreatePolicy::Replace, true);

    connector.create_meter("acme", &sum_meter()).await.unwrap();

    let captured = executor.captured();
    assert_eq!(captured.len(), 5, "drop view, drop table, create table, create view, backfill");
    assert!(captured[0].starts_with("DROP VIEW IF EXISTS"));
    assert!(captured[1].starts_with("DROP TABLE IF EXISTS"));
    assert!(captured[2].starts_with("CREATE TABLE IF NOT EXISTS"));
    assert!(captured[3].starts_with("CREATE MATERIALIZED VIEW IF NOT EXISTS"));
    assert!(captured[4].starts_with("INSERT INTO"));
}

#[tokio::test]
async fn certify_never_policy_fails_boot_on_missing_materialisation() {
    let executor = ProbeExecutor::with_rows(vec![json!({"present": 0.0})]);
    let connector = connector_with(executor, MeterCreatePolicy::Never, false);

    let refusal = connector.create_meter("acme", &sum_meter()).await.unwrap_err();
    assert_eq!(refusal.fault_class(), FaultClass::Internal);
}

#[tokio::test]
async fn certify_empty_aligned_range_short_circuits_without_querying() {
    let executor = ProbeExecutor::with_rows(vec![]);
    let connector = connector_with(executor.clone(), MeterCreatePolicy::CreateIfMissing, false);

    let mut params = MeterQueryParams::default();
    params.window_size = Some(WindowSize::Hour);
    // Ambos instantes caen dentro de la misma hora: floor(from) == ceil(to).
    params.from = Some(Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap());
    params.to = Some(Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap());

    let result = connector.query_meter("acme", "tokens", &params).await.unwrap();
    assert!(result.data.is_empty());
    assert!(executor.captured().is_empty(), "L3_CONNECTOR_FAULT: empty range still hit the store.");
}

#[tokio::test]
async fn certify_misaligned_bounds_are_floored_and_ceiled_in_the_echo() {
    let executor = ProbeExecutor::with_rows(vec![]);
    let connector = connector_with(executor, MeterCreatePolicy::CreateIfMissing, false);

    let mut params = MeterQueryParams::default();
    params.window_size = Some(WindowSize::Hour);
    params.from = Some(Utc.with_ymd_and_hms(2026, 3, 1, 10, 17, 3).unwrap());
    params.to = Some(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 1).unwrap());

    let result = connector.query_meter("acme", "tokens", &params).await.unwrap();
    assert_eq!(result.from, Some(Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap()));
    assert_eq!(result.to, Some(Utc.with_ymd_and_hms(2026, 3, 1, 13, 0, 0).unwrap()));
}

#[tokio::test]
async fn certify_finer_than_native_window_is_rejected() {
    let executor = ProbeExecutor::with_rows(vec![]);
    let registry = Arc::new(
        MeterRegistry::from_definitions(vec![Meter {
            window_size: WindowSize::Hour,
            ..sum_meter()
        }])
        .unwrap(),
    );
    let connector = ColumnarStreamingConnector::new(
        executor,
        registry,
        ColumnarConnectorConfig {
            database: "metering".to_string(),
            kafka_broker: "broker-1:9092".to_string(),
            events_topic_template: "om_{namespace}_events".to_string(),
            create_policy: MeterCreatePolicy::CreateIfMissing,
            populate_meter: false,
        },
    );

    let mut params = MeterQueryParams::default();
    params.window_size = Some(WindowSize::Minute);

    let refusal = connector.query_meter("acme", "tokens", &params).await.unwrap_err();
    assert_eq!(refusal.fault_class(), FaultClass::BadRequest);
}

#[tokio::test]
async fn certify_unknown_meter_is_not_found() {
    let executor = ProbeExecutor::with_rows(vec![]);
    let connector = connector_with(executor, MeterCreatePolicy::CreateIfMissing, false);

    let refusal = connector
        .query_meter("acme", "ghost", &MeterQueryParams::default())
        .await
        .unwrap_err();
    assert_eq!(refusal.fault_class(), FaultClass::NotFound);
}

#[tokio::test]
async fn certify_rows_parse_with_groups_and_store_datetimes() {
    let executor = ProbeExecutor::with_rows(vec![
        json!({
            "windowstart": "2026-03-01 10:00:00",
            "windowend": "2026-03-01 10:01:00",
            "value": 500.0,
            "subject": "customer_1",
            "model": "gpt-4"
        }),
        json!({
            "windowstart": "2026-03-01 10:01:00",
            "windowend": "2026-03-01 10:02:00",
            "value": "42.5",
            "subject": "customer_1",
            "model": null
        }),
    ]);
    let connector = connector_with(executor, MeterCreatePolicy::CreateIfMissing, false);

    let mut params = MeterQueryParams::default();
    params.window_size = Some(WindowSize::Minute);
    params.subjects = vec!["customer_1".to_string()];
    params.group_by = vec!["model".to_string()];

    let result = connector.query_meter("acme", "tokens", &params).await.unwrap();
    assert_eq!(result.data.len(), 2);

    let first = &result.data[0];
    assert_eq!(first.window_start, Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap());
    assert_eq!(first.value, 500.0);
    assert_eq!(first.subject.as_deref(), Some("customer_1"));
    assert_eq!(first.group_by.get("model"), Some(&Some("gpt-4".to_string())));

    // Valores citados (enteros de 64 bits del almacén) y grupos nulos.
    let second = &result.data[1];
    assert_eq!(second.value, 42.5);
    assert_eq!(second.group_by.get("model"), Some(&None));
}

#[tokio::test]
async fn certify_namespace_pipeline_provisioning_order() {
    use aforo_domain_namespace::NamespaceHandler;

    let executor = ProbeExecutor::with_rows(vec![]);
    let connector = connector_with(executor.clone(), MeterCreatePolicy::CreateIfMissing, false);

    connector.create_namespace("acme").await.unwrap();

    let captured = executor.captured();
    assert_eq!(captured.len(), 3);
    assert!(captured[0].contains("om_acme_events ("), "raw table first");
    assert!(captured[1].contains("om_acme_events_queue"), "transport queue second");
    assert!(captured[2].contains("om_acme_events_consumer"), "consumer view last");
}
