// [libs/domain/models/src/meter.rs]
/*!
 * =================================================================
 * APARATO: METER DEFINITION GRAMMAR (V3.1 - GOLD MASTER)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: DEFINICIÓN INMUTABLE DE MEDIDORES Y SUS INVARIANTES
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. CREATE-TIME VALIDATION: Las rutas JSONPath de extracción se validan
 *    al crear el medidor, jamás por evento individual.
 * 2. WINDOW ALGEBRA: Granularidad nativa MINUTE/HOUR/DAY con orden total
 *    para el contrato "igual o más grueso, nunca más fino".
 * 3. RESERVED COLUMNS: Las claves de agrupación no pueden colisionar con
 *    las columnas estructurales de la materialización.
 * =================================================================
 */

use crate::fault::DomainFault;
use chrono::{DateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Columnas estructurales de la materialización; vetadas como claves de agrupación.
const RESERVED_GROUP_KEYS: &[&str] = &["subject", "window_start", "window_end", "value"];

/// Longitud máxima de un slug o clave de agrupación.
const MAX_IDENTIFIER_LENGTH: usize = 64;

/// Función de agregación de un medidor sobre el stream de eventos tipados.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeterAggregation {
    Sum,
    Count,
    Avg,
    Min,
    Max,
    UniqueCount,
}

impl MeterAggregation {
    /// Indica si la agregación exige una ruta de valor sobre el payload.
    pub fn requires_value_property(&self) -> bool {
        !matches!(self, MeterAggregation::Count)
    }
}

/// Granularidad de materialización y de consulta de ventanas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WindowSize {
    Minute,
    Hour,
    Day,
}

impl WindowSize {
    /// Duración nominal de la ventana en segundos.
    pub fn seconds(&self) -> i64 {
        match self {
            WindowSize::Minute => 60,
            WindowSize::Hour => 3_600,
            WindowSize::Day => 86_400,
        }
    }

    /// Contrato de granularidad: una consulta puede pedir ventanas iguales
    /// o más gruesas que la granularidad nativa del medidor, nunca más finas.
    pub fn is_coarser_or_equal_than(&self, native: WindowSize) -> bool {
        self.seconds() >= native.seconds()
    }

    /**
     * Trunca un instante al inicio de su ventana (floor) en la zona dada.
     *
     * # Logic:
     * La alineación se realiza sobre el reloj civil de la zona solicitada
     * y el resultado se reexpresa como instante UTC.
     */
    pub fn floor<Z: TimeZone>(&self, instant: DateTime<Utc>, zone: &Z) -> DateTime<Utc> {
        let local = instant.with_timezone(zone);
        let aligned = match self {
            WindowSize::Minute => local
                .with_second(0)
                .and_then(|t| t.with_nanosecond(0)),
            WindowSize::Hour => local
                .with_minute(0)
                .and_then(|t| t.with_second(0))
                .and_then(|t| t.with_nanosecond(0)),
            WindowSize::Day => local
                .with_hour(0)
                .and_then(|t| t.with_minute(0))
                .and_then(|t| t.with_second(0))
                .and_then(|t| t.with_nanosecond(0)),
        };
        aligned
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or(instant)
    }

    /// Techo (ceil) de un instante hacia el fin de su ventana en la zona dada.
    pub fn ceil<Z: TimeZone>(&self, instant: DateTime<Utc>, zone: &Z) -> DateTime<Utc> {
        let floored = self.floor(instant, zone);
        if floored == instant {
            instant
        } else {
            self.advance(floored, zone)
        }
    }

    /// Avanza un instante alineado exactamente una ventana.
    pub fn advance<Z: TimeZone>(&self, aligned: DateTime<Utc>, zone: &Z) -> DateTime<Utc> {
        match self {
            WindowSize::Minute => aligned + chrono::Duration::minutes(1),
            WindowSize::Hour => aligned + chrono::Duration::hours(1),
            WindowSize::Day => {
                // Los días se avanzan sobre el calendario civil de la zona
                // para absorber transiciones de horario de verano.
                let local = aligned.with_timezone(zone);
                let next = local
                    .date_naive()
                    .succ_opt()
                    .map(|d| d.and_hms_opt(local.hour(), 0, 0).unwrap_or_else(|| d.and_hms_opt(0, 0, 0).expect("midnight exists")))
                    .unwrap_or_else(|| local.date_naive().and_hms_opt(0, 0, 0).expect("midnight exists"));
                match zone.from_local_datetime(&next).earliest() {
                    Some(t) => t.with_timezone(&Utc),
                    None => aligned + chrono::Duration::days(1),
                }
            }
        }
    }
}

/// Definición inmutable de un medidor, única por slug dentro del namespace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Meter {
    /// Identificador URL-safe del medidor ([a-z0-9_]+).
    pub slug: String,

    /// Descripción operacional para el listado de la API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Tipo de evento CloudEvents que este medidor agrega.
    pub event_type: String,

    /// Función de agregación sobre el valor extraído.
    pub aggregation: MeterAggregation,

    /// JSONPath sobre 'data' que selecciona el valor numérico.
    /// Obligatorio para toda agregación distinta de COUNT.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_property: Option<String>,

    /// Proyección de agrupación: nombre de clave -> JSONPath sobre 'data'.
    /// BTreeMap para un orden de columnas determinista en la materialización.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub group_by: BTreeMap<String, String>,

    /// Granularidad nativa de materialización.
    pub window_size: WindowSize,
}

impl Meter {
    /**
     * Valida la definición completa del medidor (boot / meter-create time).
     *
     * # Logic:
     * 1. Slug e identificadores de agrupación en [a-z0-9_]+.
     * 2. 'value_property' obligatoria salvo COUNT, y JSONPath bien formada.
     * 3. Claves de agrupación sin colisión con columnas estructurales.
     */
    pub fn validate(&self) -> Result<(), DomainFault> {
        validate_identifier(&self.slug, "slug")?;

        if self.event_type.trim().is_empty() {
            return Err(DomainFault::validation("eventType", "must not be empty"));
        }

        match (&self.value_property, self.aggregation.requires_value_property()) {
            (None, true) => {
                return Err(DomainFault::validation(
                    "valueProperty",
                    "required for every aggregation except COUNT",
                ));
            }
            (Some(path), true) => validate_json_path(path, "valueProperty")?,
            (Some(_), false) => {
                return Err(DomainFault::validation(
                    "valueProperty",
                    "must be omitted for COUNT aggregation",
                ));
            }
            (None, false) => {}
        }

        for (group_key, group_path) in &self.group_by {
            let field = format!("groupBy.{}", group_key);
            validate_identifier(group_key, &field)?;
            if RESERVED_GROUP_KEYS.contains(&group_key.as_str()) {
                return Err(DomainFault::validation(field, "collides with a reserved column name"));
            }
            validate_json_path(group_path, &field)?;
        }

        Ok(())
    }
}

/// Valida un identificador soberano: [a-z0-9_]+, longitud acotada.
///
/// Se aplica a slugs de medidor, claves de agrupación y nombres de
/// namespace (que se incrustan en nombres de topic y de tabla).
pub fn validate_identifier(value: &str, field: &str) -> Result<(), DomainFault> {
    if value.is_empty() {
        return Err(DomainFault::validation(field, "must not be empty"));
    }
    if value.len() > MAX_IDENTIFIER_LENGTH {
        return Err(DomainFault::validation(field, "exceeds 64 characters"));
    }
    if !value.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_') {
        return Err(DomainFault::validation(field, "must match [a-z0-9_]+"));
    }
    Ok(())
}

/**
 * Valida una JSONPath de extracción en su forma punteada simple '$.a.b'.
 *
 * # Logic:
 * El plan de consulta compila estas rutas a expresiones de columna sobre
 * el JSON crudo; restringir la gramática aquí garantiza que la compilación
 * sea total y que ningún payload individual requiera re-validación.
 */
pub fn validate_json_path(path: &str, field: &str) -> Result<(), DomainFault> {
    let Some(stripped) = path.strip_prefix("$.") else {
        return Err(DomainFault::validation(field, "JSONPath must start with '$.'"));
    };
    if stripped.is_empty() {
        return Err(DomainFault::validation(field, "JSONPath must select at least one property"));
    }
    for segment in stripped.split('.') {
        if segment.is_empty() {
            return Err(DomainFault::validation(field, "JSONPath contains an empty segment"));
        }
        if !segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(DomainFault::validation(field, "JSONPath segments must match [A-Za-z0-9_]+"));
        }
    }
    Ok(())
}
