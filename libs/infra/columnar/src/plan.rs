// [libs/infra/columnar/src/plan.rs]
/*!
 * =================================================================
 * APARATO: MATERIALISATION & QUERY PLANNER (V3.3 - GOLD MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: COMPILACIÓN DE MEDIDORES A SQL COLUMNAR
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. CONTINUOUS AGGREGATION: Cada medidor compila a una tabla de
 *    estados agregados (AggregatingMergeTree) alimentada por una vista
 *    materializada sobre la tabla cruda del namespace.
 * 2. STATE/MERGE SPLIT: La vista persiste estados (-State); la consulta
 *    recompone con combinadores -Merge, incluido AVG = SUM/COUNT.
 * 3. STREAM SOURCE: La tabla cruda se alimenta de una tabla-cola del
 *    transporte (engine Kafka) vía una vista consumidora.
 * =================================================================
 */

use crate::sql::{
    escape_string_literal, events_consumer_view, events_queue_table, events_table,
    json_extraction, meter_table, meter_view, quoted, window_interval,
};
use aforo_domain_models::fault::DomainFault;
use aforo_domain_models::meter::{Meter, MeterAggregation, WindowSize};
use aforo_domain_models::query::MeterQueryParams;
use chrono::{DateTime, Utc};

/// Tabla cruda de eventos del namespace (sink del consumidor de transporte).
pub fn create_events_table_sql(database: &str, namespace: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (\
         namespace LowCardinality(String), \
         id String, \
         type LowCardinality(String), \
         source String, \
         subject String, \
         time DateTime, \
         data String\
         ) ENGINE = MergeTree PARTITION BY toYYYYMM(time) ORDER BY (namespace, type, subject, time)",
        table = events_table(database, namespace)
    )
}

/// Tabla-cola que consume el topic de eventos del namespace.
pub fn create_events_queue_sql(
    database: &str,
    namespace: &str,
    broker: &str,
    topic: &str,
    consumer_group: &str,
) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {queue} (\
         id String, \
         type String, \
         source String, \
         subject String, \
         time String, \
         data String\
         ) ENGINE = Kafka SETTINGS \
         kafka_broker_list = {broker}, \
         kafka_topic_list = {topic}, \
         kafka_group_name = {group}, \
         kafka_format = 'JSONEachRow', \
         input_format_skip_unknown_fields = 1, \
         input_format_json_read_objects_as_strings = 1",
        queue = events_queue_table(database, namespace),
        broker = quoted(broker),
        topic = quoted(topic),
        group = quoted(consumer_group),
    )
}

/// Vista consumidora: cola del transporte -> tabla cruda del namespace.
pub fn create_events_consumer_sql(database: &str, namespace: &str) -> String {
    format!(
        "CREATE MATERIALIZED VIEW IF NOT EXISTS {view} TO {table} AS \
         SELECT {namespace_literal} AS namespace, id, type, source, subject, \
         parseDateTimeBestEffort(time) AS time, data \
         FROM {queue}",
        view = events_consumer_view(database, namespace),
        table = events_table(database, namespace),
        namespace_literal = quoted(namespace),
        queue = events_queue_table(database, namespace),
    )
}

/// Sentencias de desmantelamiento del pipeline del namespace.
pub fn drop_namespace_sql(database: &str, namespace: &str) -> Vec<String> {
    vec![
        format!("DROP VIEW IF EXISTS {}", events_consumer_view(database, namespace)),
        format!("DROP TABLE IF EXISTS {}", events_queue_table(database, namespace)),
        format!("DROP TABLE IF EXISTS {}", events_table(database, namespace)),
    ]
}

/// Columnas de estado agregado del medidor.
fn meter_value_columns(meter: &Meter) -> String {
    match meter.aggregation {
        MeterAggregation::Sum => "value AggregateFunction(sum, Float64)".to_string(),
        MeterAggregation::Min => "value AggregateFunction(min, Float64)".to_string(),
        MeterAggregation::Max => "value AggregateFunction(max, Float64)".to_string(),
        MeterAggregation::Count => "value AggregateFunction(count)".to_string(),
        MeterAggregation::UniqueCount => "value AggregateFunction(uniq, String)".to_string(),
        // AVG retiene SUM y COUNT; el promedio se recompone en consulta.
        MeterAggregation::Avg => {
            "value_sum AggregateFunction(sum, Float64), value_count AggregateFunction(count)".to_string()
        }
    }
}

/// Expresiones -State de la vista materializada del medidor.
fn meter_state_expressions(meter: &Meter) -> String {
    let value_expression = meter
        .value_property
        .as_deref()
        .map(|path| format!("cast({}, 'Float64')", json_extraction("data", path)));

    match meter.aggregation {
        MeterAggregation::Sum => format!("sumState({}) AS value", value_expression.expect("validated")),
        MeterAggregation::Min => format!("minState({}) AS value", value_expression.expect("validated")),
        MeterAggregation::Max => format!("maxState({}) AS value", value_expression.expect("validated")),
        MeterAggregation::Count => "countState() AS value".to_string(),
        MeterAggregation::UniqueCount => {
            let raw = meter.value_property.as_deref().expect("validated");
            format!("uniqState({}) AS value", json_extraction("data", raw))
        }
        MeterAggregation::Avg => format!(
            "sumState({}) AS value_sum, countState() AS value_count",
            value_expression.expect("validated")
        ),
    }
}

/// Expresión -Merge del valor en consulta (Float64 garantizado).
fn meter_merge_expression(meter: &Meter) -> String {
    match meter.aggregation {
        MeterAggregation::Sum => "sumMerge(value) AS value".to_string(),
        MeterAggregation::Min => "minMerge(value) AS value".to_string(),
        MeterAggregation::Max => "maxMerge(value) AS value".to_string(),
        MeterAggregation::Count => "toFloat64(countMerge(value)) AS value".to_string(),
        MeterAggregation::UniqueCount => "toFloat64(uniqMerge(value)) AS value".to_string(),
        MeterAggregation::Avg => {
            "sumMerge(value_sum) / toFloat64(countMerge(value_count)) AS value".to_string()
        }
    }
}

/// Tabla de agregación del medidor.
pub fn create_meter_table_sql(database: &str, namespace: &str, meter: &Meter) -> String {
    let mut order_by: Vec<String> = vec![
        "windowstart".to_string(),
        "windowend".to_string(),
        "subject".to_string(),
    ];
    let mut group_columns = String::new();
    for group_key in meter.group_by.keys() {
        group_columns.push_str(&format!(", {} Nullable(String)", group_key));
        order_by.push(group_key.clone());
    }

    let settings = if meter.group_by.is_empty() {
        String::new()
    } else {
        // Claves de agrupación anulables dentro de la clave de orden.
        " SETTINGS allow_nullable_key = 1".to_string()
    };

    format!(
        "CREATE TABLE IF NOT EXISTS {table} (\
         subject String, \
         windowstart DateTime, \
         windowend DateTime, \
         {value_columns}{group_columns}\
         ) ENGINE = AggregatingMergeTree() ORDER BY ({order_by}){settings}",
        table = meter_table(database, namespace, meter),
        value_columns = meter_value_columns(meter),
        group_columns = group_columns,
        order_by = order_by.join(", "),
        settings = settings,
    )
}

/// Cuerpo SELECT compartido entre la vista materializada y el backfill.
fn meter_select_body(database: &str, namespace: &str, meter: &Meter) -> String {
    let interval = window_interval(meter.window_size);

    let mut projections = vec![
        "subject".to_string(),
        format!("tumbleStart(time, {}) AS windowstart", interval),
        format!("tumbleEnd(time, {}) AS windowend", interval),
        meter_state_expressions(meter),
    ];
    let mut group_by = vec![
        "windowstart".to_string(),
        "windowend".to_string(),
        "subject".to_string(),
    ];
    for (group_key, group_path) in &meter.group_by {
        projections.push(format!("{} AS {}", json_extraction("data", group_path), group_key));
        group_by.push(group_key.clone());
    }

    format!(
        "SELECT {projections} FROM {events} WHERE type = {event_type} GROUP BY {group_by}",
        projections = projections.join(", "),
        events = events_table(database, namespace),
        event_type = quoted(&meter.event_type),
        group_by = group_by.join(", "),
    )
}

/// Vista materializada del medidor (agregación continua).
pub fn create_meter_view_sql(database: &str, namespace: &str, meter: &Meter) -> String {
    format!(
        "CREATE MATERIALIZED VIEW IF NOT EXISTS {view} TO {table} AS {body}",
        view = meter_view(database, namespace, meter),
        table = meter_table(database, namespace, meter),
        body = meter_select_body(database, namespace, meter),
    )
}

/// Backfill: replay de la tabla cruda hacia la materialización recreada.
pub fn populate_meter_sql(database: &str, namespace: &str, meter: &Meter) -> String {
    format!(
        "INSERT INTO {table} {body}",
        table = meter_table(database, namespace, meter),
        body = meter_select_body(database, namespace, meter),
    )
}

/// Sentencias de desmantelamiento de la materialización del medidor.
pub fn drop_meter_sql(database: &str, namespace: &str, meter: &Meter) -> Vec<String> {
    vec![
        format!("DROP VIEW IF EXISTS {}", meter_view(database, namespace, meter)),
        format!("DROP TABLE IF EXISTS {}", meter_table(database, namespace, meter)),
    ]
}

/// Sonda de existencia de la materialización (política 'never').
pub fn meter_exists_sql(database: &str, namespace: &str, meter: &Meter) -> String {
    format!(
        "SELECT toFloat64(count()) AS present FROM system.tables WHERE database = {} AND name = {}",
        quoted(database),
        quoted(&format!("om_{}_meter_{}", namespace, meter.slug)),
    )
}

/// Plan de consulta compilado de un medidor.
#[derive(Debug, Clone)]
pub struct MeterQueryPlan {
    pub sql: String,
    /// Límites alineados ecoizados en el resultado.
    pub aligned_from: Option<DateTime<Utc>>,
    pub aligned_to: Option<DateTime<Utc>>,
    pub window_size: Option<WindowSize>,
    /// Claves de agrupación proyectadas, en orden de selección.
    pub projected_groups: Vec<String>,
    pub selects_subject: bool,
    /// Rollup de rango completo: una fila por grupo.
    pub full_range: bool,
}

/**
 * Compila el plan de consulta del medidor.
 *
 * # Contrato:
 * 'params' ya validado contra el medidor y con los límites alineados
 * (floor/ceil) por el conector; el rango vacío se resuelve antes de
 * llegar aquí.
 */
pub fn meter_query_plan(
    database: &str,
    namespace: &str,
    meter: &Meter,
    params: &MeterQueryParams,
    aligned_from: Option<DateTime<Utc>>,
    aligned_to: Option<DateTime<Utc>>,
) -> Result<MeterQueryPlan, DomainFault> {
    let table = meter_table(database, namespace, meter);
    let time_zone = quoted(params.window_time_zone.name());
    let selects_subject = params.groups_by_subject();

    let projected_groups: Vec<String> = params
        .group_by
        .iter()
        .filter(|key| key.as_str() != "subject")
        .cloned()
        .collect();

    // 1. PROYECCIÓN
    let mut projections: Vec<String> = Vec::new();
    let mut group_by: Vec<String> = Vec::new();
    let full_range = params.window_size.is_none();

    if let Some(window) = params.window_size {
        let interval = window_interval(window);
        projections.push(format!(
            "tumbleStart(windowstart, {interval}, {tz}) AS windowstart",
            interval = interval,
            tz = time_zone
        ));
        projections.push(format!(
            "tumbleEnd(windowstart, {interval}, {tz}) AS windowend",
            interval = interval,
            tz = time_zone
        ));
        group_by.push("windowstart".to_string());
        group_by.push("windowend".to_string());
    } else {
        projections.push("min(windowstart) AS windowstart".to_string());
        projections.push("max(windowend) AS windowend".to_string());
        // Permite descartar la fila fantasma del rollup global sobre una
        // materialización vacía.
        projections.push("toFloat64(count()) AS agg_rows".to_string());
    }

    projections.push(meter_merge_expression(meter));

    if selects_subject {
        projections.push("subject".to_string());
        group_by.push("subject".to_string());
    }
    for group_key in &projected_groups {
        projections.push(group_key.clone());
        group_by.push(group_key.clone());
    }

    // 2. FILTROS
    let mut predicates: Vec<String> = Vec::new();
    if let Some(from) = aligned_from {
        predicates.push(format!("windowstart >= toDateTime({})", from.timestamp()));
    }
    if let Some(to) = aligned_to {
        predicates.push(format!("windowend <= toDateTime({})", to.timestamp()));
    }
    if !params.subjects.is_empty() {
        let quoted_subjects: Vec<String> = params.subjects.iter().map(|s| quoted(s)).collect();
        predicates.push(format!("subject IN ({})", quoted_subjects.join(", ")));
    }
    for (filter_key, filter_value) in &params.filter_group_by {
        predicates.push(format!("{} = '{}'", filter_key, escape_string_literal(filter_value)));
    }

    // 3. ENSAMBLADO
    let mut sql = format!("SELECT {} FROM {}", projections.join(", "), table);
    if !predicates.is_empty() {
        sql.push_str(&format!(" WHERE {}", predicates.join(" AND ")));
    }
    if !group_by.is_empty() {
        sql.push_str(&format!(" GROUP BY {}", group_by.join(", ")));
    }

    let mut order_by: Vec<&str> = Vec::new();
    if !full_range {
        order_by.push("windowstart");
    }
    if selects_subject {
        order_by.push("subject");
    }
    if !order_by.is_empty() {
        sql.push_str(&format!(" ORDER BY {}", order_by.join(", ")));
    }

    Ok(MeterQueryPlan {
        sql,
        aligned_from,
        aligned_to,
        window_size: params.window_size,
        projected_groups,
        selects_subject,
        full_range,
    })
}
