// [libs/infra/columnar/src/connector.rs]
/*!
 * =================================================================
 * APARATO: COLUMNAR STREAMING CONNECTOR (V3.2 - GOLD MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: CICLO DE VIDA DE MATERIALIZACIONES Y CONSULTAS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. CREATE POLICY: never / create-if-missing / replace (+ backfill)
 *    gobiernan la materialización por medidor en el boot.
 * 2. SILENT ALIGNMENT: from/to se truncan (floor/ceil) a la ventana
 *    elegida y los límites alineados se ecoizan en el resultado.
 * 3. NAMESPACE HANDLER: El conector aprovisiona el pipeline columnar
 *    del tenant (tabla cruda + cola del transporte + vista consumidora).
 * =================================================================
 */

use crate::errors::ColumnarError;
use crate::executor::ColumnarExecutor;
use crate::plan;
use aforo_domain_models::fault::DomainFault;
use aforo_domain_models::meter::Meter;
use aforo_domain_models::query::{MeterQueryParams, MeterQueryResult, MeterQueryRow};
use aforo_domain_models::registry::MeterRegistry;
use aforo_domain_models::streaming::{MeterCreatePolicy, StreamingConnector};
use aforo_domain_namespace::NamespaceHandler;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Configuración del conector de streaming columnar.
#[derive(Debug, Clone)]
pub struct ColumnarConnectorConfig {
    pub database: String,

    /// Broker del transporte, incrustado en el DDL de la tabla-cola.
    pub kafka_broker: String,

    /// Plantilla del topic de eventos (placeholder '{namespace}').
    pub events_topic_template: String,

    pub create_policy: MeterCreatePolicy,

    /// Con 'replace', rellena la materialización recreada desde la
    /// tabla cruda.
    pub populate_meter: bool,
}

/// Conector soberano sobre el ejecutor columnar.
pub struct ColumnarStreamingConnector {
    executor: Arc<dyn ColumnarExecutor>,
    registry: Arc<MeterRegistry>,
    config: ColumnarConnectorConfig,
}

impl ColumnarStreamingConnector {
    pub fn new(
        executor: Arc<dyn ColumnarExecutor>,
        registry: Arc<MeterRegistry>,
        config: ColumnarConnectorConfig,
    ) -> Self {
        Self { executor, registry, config }
    }

    async fn meter_materialisation_exists(&self, namespace: &str, meter: &Meter) -> Result<bool, DomainFault> {
        let probe = plan::meter_exists_sql(&self.config.database, namespace, meter);
        let rows = self.executor.query(&probe).await.map_err(DomainFault::from)?;
        let present = rows
            .first()
            .and_then(|row| row.get("present"))
            .and_then(parse_f64)
            .unwrap_or(0.0);
        Ok(present > 0.0)
    }
}

#[async_trait]
impl StreamingConnector for ColumnarStreamingConnector {
    #[instrument(skip(self, meter), fields(namespace = %namespace, slug = %meter.slug))]
    async fn create_meter(&self, namespace: &str, meter: &Meter) -> Result<(), DomainFault> {
        match self.config.create_policy {
            MeterCreatePolicy::Never => {
                if !self.meter_materialisation_exists(namespace, meter).await? {
                    return Err(DomainFault::Internal(format!(
                        "meter materialisation '{}' is missing and createOrReplaceMeter=never",
                        meter.slug
                    )));
                }
                Ok(())
            }
            MeterCreatePolicy::CreateIfMissing => {
                self.executor
                    .execute(&plan::create_meter_table_sql(&self.config.database, namespace, meter))
                    .await
                    .map_err(DomainFault::from)?;
                self.executor
                    .execute(&plan::create_meter_view_sql(&self.config.database, namespace, meter))
                    .await
                    .map_err(DomainFault::from)?;
                Ok(())
            }
            MeterCreatePolicy::Replace => {
                warn!("🔥 [METER_REPLACE]: Dropping and recreating materialisation for '{}'.", meter.slug);
                for statement in plan::drop_meter_sql(&self.config.database, namespace, meter) {
                    self.executor.execute(&statement).await.map_err(DomainFault::from)?;
                }
                self.executor
                    .execute(&plan::create_meter_table_sql(&self.config.database, namespace, meter))
                    .await
                    .map_err(DomainFault::from)?;
                self.executor
                    .execute(&plan::create_meter_view_sql(&self.config.database, namespace, meter))
                    .await
                    .map_err(DomainFault::from)?;

                if self.config.populate_meter {
                    info!("⏪ [METER_BACKFILL]: Replaying raw events into '{}'.", meter.slug);
                    self.executor
                        .execute(&plan::populate_meter_sql(&self.config.database, namespace, meter))
                        .await
                        .map_err(DomainFault::from)?;
                }
                Ok(())
            }
        }
    }

    #[instrument(skip(self, params), fields(namespace = %namespace, slug = %meter_slug))]
    async fn query_meter(
        &self,
        namespace: &str,
        meter_slug: &str,
        params: &MeterQueryParams,
    ) -> Result<MeterQueryResult, DomainFault> {
        // 1. RESOLUCIÓN Y VALIDACIÓN
        let meter = self.registry.resolve(meter_slug)?.clone();
        params.validate_against(&meter)?;

        // 2. ALINEACIÓN SILENCIOSA DE LÍMITES (floor/ceil a la ventana elegida)
        let alignment_window = params.window_size.unwrap_or(meter.window_size);
        let zone = params.window_time_zone;
        let aligned_from = params.from.map(|instant| alignment_window.floor(instant, &zone));
        let aligned_to = params.to.map(|instant| alignment_window.ceil(instant, &zone));

        if let (Some(from), Some(to)) = (aligned_from, aligned_to) {
            if from >= to {
                return Ok(MeterQueryResult {
                    from: aligned_from,
                    to: aligned_to,
                    window_size: params.window_size,
                    data: Vec::new(),
                });
            }
        }

        // 3. COMPILACIÓN Y EJECUCIÓN DEL PLAN
        let query_plan = plan::meter_query_plan(
            &self.config.database,
            namespace,
            &meter,
            params,
            aligned_from,
            aligned_to,
        )?;
        let raw_rows = self.executor.query(&query_plan.sql).await.map_err(DomainFault::from)?;

        // 4. PARSEO DE FILAS
        let mut data = Vec::with_capacity(raw_rows.len());
        for row in raw_rows {
            if query_plan.full_range {
                let populated = row.get("agg_rows").and_then(parse_f64).unwrap_or(0.0);
                if populated == 0.0 {
                    continue;
                }
            }

            let window_start = parse_store_datetime(&row, "windowstart").map_err(DomainFault::from)?;
            let window_end = parse_store_datetime(&row, "windowend").map_err(DomainFault::from)?;
            let value = row
                .get("value")
                .and_then(parse_f64)
                .ok_or_else(|| DomainFault::Internal("aggregated row lacks a numeric value".to_string()))?;

            let subject = if query_plan.selects_subject {
                row.get("subject").and_then(Value::as_str).map(str::to_string)
            } else {
                None
            };

            let mut group_by = BTreeMap::new();
            for group_key in &query_plan.projected_groups {
                let group_value = match row.get(group_key) {
                    Some(Value::String(text)) if !text.is_empty() => Some(text.clone()),
                    _ => None,
                };
                group_by.insert(group_key.clone(), group_value);
            }

            data.push(MeterQueryRow { window_start, window_end, subject, value, group_by });
        }

        Ok(MeterQueryResult {
            from: aligned_from,
            to: aligned_to,
            window_size: params.window_size,
            data,
        })
    }
}

#[async_trait]
impl NamespaceHandler for ColumnarStreamingConnector {
    fn handler_name(&self) -> &'static str {
        "columnar-store"
    }

    async fn create_namespace(&self, name: &str) -> Result<(), DomainFault> {
        let topic = self
            .config
            .events_topic_template
            .replace("{namespace}", name);
        let consumer_group = format!("om_{}_consumer", name);

        self.executor
            .execute(&plan::create_events_table_sql(&self.config.database, name))
            .await
            .map_err(DomainFault::from)?;
        self.executor
            .execute(&plan::create_events_queue_sql(
                &self.config.database,
                name,
                &self.config.kafka_broker,
                &topic,
                &consumer_group,
            ))
            .await
            .map_err(DomainFault::from)?;
        self.executor
            .execute(&plan::create_events_consumer_sql(&self.config.database, name))
            .await
            .map_err(DomainFault::from)?;
        Ok(())
    }

    async fn delete_namespace(&self, name: &str) -> Result<(), DomainFault> {
        for statement in plan::drop_namespace_sql(&self.config.database, name) {
            self.executor.execute(&statement).await.map_err(DomainFault::from)?;
        }
        Ok(())
    }
}

/// Interpreta un escalar numérico de JSONEachRow (número o cadena citada).
fn parse_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.parse::<f64>().ok(),
        _ => None,
    }
}

/// Interpreta un DateTime del almacén ('YYYY-MM-DD hh:mm:ss', reloj UTC).
fn parse_store_datetime(row: &Map<String, Value>, column: &str) -> Result<DateTime<Utc>, ColumnarError> {
    let raw = row
        .get(column)
        .and_then(Value::as_str)
        .ok_or_else(|| ColumnarError::Decode(format!("column '{}' missing from aggregated row", column)))?;
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|parse_fault| {
            ColumnarError::Decode(format!("column '{}' is not a store datetime: {}", column, parse_fault))
        })
}
