// [libs/infra/columnar/src/sql.rs]
/*!
 * =================================================================
 * APARATO: SQL IDENTIFIER ALGEBRA (V2.1 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: NOMENCLATURA DE TABLAS Y ESCAPADO DE LITERALES
 *
 * Los identificadores (namespace, slug, claves de agrupación) llegan ya
 * validados contra [a-z0-9_]+ en el dominio; los literales del productor
 * (sujetos, valores de filtro) se escapan aquí antes de interpolarse.
 * =================================================================
 */

use aforo_domain_models::meter::{Meter, WindowSize};

/// Tabla cruda de eventos del namespace.
pub fn events_table(database: &str, namespace: &str) -> String {
    format!("{}.om_{}_events", database, namespace)
}

/// Tabla-cola del consumidor de transporte del namespace.
pub fn events_queue_table(database: &str, namespace: &str) -> String {
    format!("{}.om_{}_events_queue", database, namespace)
}

/// Vista consumidora cola -> tabla cruda.
pub fn events_consumer_view(database: &str, namespace: &str) -> String {
    format!("{}.om_{}_events_consumer", database, namespace)
}

/// Tabla de agregación del medidor.
pub fn meter_table(database: &str, namespace: &str, meter: &Meter) -> String {
    format!("{}.om_{}_meter_{}", database, namespace, meter.slug)
}

/// Vista materializada que alimenta la tabla del medidor.
pub fn meter_view(database: &str, namespace: &str, meter: &Meter) -> String {
    format!("{}.om_{}_meter_{}_mv", database, namespace, meter.slug)
}

/// Escapa un literal de cadena para su interpolación segura.
pub fn escape_string_literal(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Literal de cadena citado y escapado.
pub fn quoted(raw: &str) -> String {
    format!("'{}'", escape_string_literal(raw))
}

/// Expresión de intervalo de una granularidad de ventana.
pub fn window_interval(window: WindowSize) -> &'static str {
    match window {
        WindowSize::Minute => "toIntervalMinute(1)",
        WindowSize::Hour => "toIntervalHour(1)",
        WindowSize::Day => "toIntervalDay(1)",
    }
}

/// Compila una JSONPath punteada validada a una expresión de extracción
/// sobre la columna JSON cruda.
pub fn json_extraction(column: &str, json_path: &str) -> String {
    format!("JSON_VALUE({}, {})", column, quoted(json_path))
}
