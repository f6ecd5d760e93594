// [tests/mirror/apps/gateway/handlers/meters_api.test.rs]
/**
 * =================================================================
 * APARATO: METERS API TEST (V1.1)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L4-MIRROR
 * RESPONSABILIDAD: CERTIFICACIÓN DEL DRIVER DE CONSULTAS
 * =================================================================
 */

use aforo_domain_credit::NopeCreditConnector;
use aforo_domain_models::fault::DomainFault;
use aforo_domain_models::meter::{Meter, MeterAggregation, WindowSize};
use aforo_domain_models::query::{MeterQueryParams, MeterQueryResult, MeterQueryRow};
use aforo_domain_models::registry::MeterRegistry;
use aforo_domain_models::streaming::StreamingConnector;
use aforo_domain_namespace::{NamespaceManager, NamespaceManagerConfig};
use aforo_gateway::prelude::*;
use aforo_infra_transport::{PartitionedMemoryLog, TopicTemplate, TransportCollector};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{TimeZone, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower::util::ServiceExt;

/// Streaming sintético: valida parámetros contra el registro y sirve
/// una fila determinista.
struct SingleRowStreaming {
    registry: Arc<MeterRegistry>,
}

#[async_trait]
impl StreamingConnector for SingleRowStreaming {
    async fn create_meter(&self, _namespace: &str, _meter: &Meter) -> Result<(), DomainFault> {
        Ok(())
    }

    async fn query_meter(
        &self,
        _namespace: &str,
        meter_slug: &str,
        params: &MeterQueryParams,
    ) -> Result<MeterQueryResult, DomainFault> {
        let meter = self.registry.resolve(meter_slug)?;
        params.validate_against(meter)?;

        // Misma alineación silenciosa floor/ceil que el conector real.
        let alignment = params.window_size.unwrap_or(meter.window_size);
        let zone = params.window_time_zone;
        let aligned_from = params.from.map(|instant| alignment.floor(instant, &zone));
        let aligned_to = params.to.map(|instant| alignment.ceil(instant, &zone));

        let window_start = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        Ok(MeterQueryResult {
            from: aligned_from,
            to: aligned_to,
            window_size: params.window_size,
            data: vec![MeterQueryRow {
                window_start,
                window_end: window_start + chrono::Duration::minutes(1),
                subject: None,
                value: 1000.0,
                group_by: BTreeMap::new(),
            }],
        })
    }
}

fn tokens_meter() -> Meter {
    let mut group_by = BTreeMap::new();
    group_by.insert("model".to_string(), "$.model".to_string());
    Meter {
        slug: "tokens".to_string(),
        description: Some("prompt tokens per model".to_string()),
        event_type: "prompt".to_string(),
        aggregation: MeterAggregation::Sum,
        value_property: Some("$.tokens".to_string()),
        group_by,
        window_size: WindowSize::Minute,
    }
}

fn gateway_under_test() -> axum::Router {
    let registry = Arc::new(MeterRegistry::from_definitions(vec![tokens_meter()]).unwrap());
    let state = AppState {
        meter_registry: registry.clone(),
        collector: Arc::new(TransportCollector::new(
            Arc::new(PartitionedMemoryLog::new()),
            TopicTemplate::default(),
        )),
        streaming: Arc::new(SingleRowStreaming { registry }),
        credit: Arc::new(NopeCreditConnector::new()),
        namespaces: Arc::new(
            NamespaceManager::new(
                vec![],
                NamespaceManagerConfig {
                    default_namespace: "default".to_string(),
                    disable_management: false,
                },
            )
            .unwrap(),
        ),
        portal: None,
        default_namespace: "default".to_string(),
    };
    create_sovereign_router(state, false)
}

async fn get(router: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), 1 << 20).await.unwrap();
    let decoded = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, decoded)
}

#[tokio::test]
async fn certify_meter_listing_exposes_definitions() {
    println!("\n📏 [PROVING_GROUNDS]: Auditing GET /api/v1/meters...");

    let (status, body) = get(gateway_under_test(), "/api/v1/meters").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["slug"], "tokens");
    assert_eq!(body[0]["aggregation"], "SUM");
    assert_eq!(body[0]["windowSize"], "MINUTE");
}

#[tokio::test]
async fn certify_query_returns_rows_with_aligned_echo() {
    let (status, body) = get(
        gateway_under_test(),
        "/api/v1/meters/tokens/query?from=2026-03-01T10:00:30Z&to=2026-03-01T11:00:00Z&windowSize=HOUR",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["windowSize"], "HOUR");
    assert_eq!(body["data"][0]["value"], 1000.0);
    // El límite inferior desalineado se ecoiza alineado por floor.
    assert_eq!(body["from"], "2026-03-01T10:00:00Z");
}

#[tokio::test]
async fn certify_unknown_meter_is_404() {
    let (status, body) = get(gateway_under_test(), "/api/v1/meters/ghost/query").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["title"], "Not Found");
}

#[tokio::test]
async fn certify_unknown_query_parameter_is_rejected() {
    let (status, body) = get(gateway_under_test(), "/api/v1/meters/tokens/query?windowsize=HOUR").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("windowsize"));
}

#[tokio::test]
async fn certify_malformed_window_size_is_rejected() {
    let (status, _) = get(gateway_under_test(), "/api/v1/meters/tokens/query?windowSize=WEEK").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
