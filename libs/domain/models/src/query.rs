// [libs/domain/models/src/query.rs]
/*!
 * =================================================================
 * APARATO: METER QUERY CONTRACT (V2.3 - SOBERANO)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: PARÁMETROS Y FILAS DEL CONTRATO DE CONSULTA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. HALF-OPEN WINDOWS: [from, to) con alineación silenciosa floor/ceil;
 *    los límites alineados se devuelven en el resultado.
 * 2. ZONE-AWARE: La alineación de ventanas respeta la zona IANA pedida
 *    (UTC por defecto) sin contaminar el almacenamiento, que es UTC puro.
 * 3. STABLE ORDER: Filas ordenadas por (window_start asc, subject asc).
 * =================================================================
 */

use crate::fault::DomainFault;
use crate::meter::{Meter, WindowSize};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::collections::BTreeMap;

/// Parámetros de una consulta de agregación sobre un medidor.
#[derive(Debug, Clone)]
pub struct MeterQueryParams {
    /// Límite inferior (inclusive, se alinea con floor).
    pub from: Option<DateTime<Utc>>,

    /// Límite superior (exclusive, se alinea con ceil).
    pub to: Option<DateTime<Utc>>,

    /// Granularidad pedida; ausente = rollup de rango completo.
    pub window_size: Option<WindowSize>,

    /// Zona IANA para la alineación de ventanas.
    pub window_time_zone: Tz,

    /// Filtro OR de sujetos.
    pub subjects: Vec<String>,

    /// Subconjunto de claves de agrupación del medidor a proyectar.
    pub group_by: Vec<String>,

    /// Filtro de igualdad clave -> literal, combinado con AND.
    pub filter_group_by: BTreeMap<String, String>,
}

impl Default for MeterQueryParams {
    fn default() -> Self {
        Self {
            from: None,
            to: None,
            window_size: None,
            window_time_zone: chrono_tz::UTC,
            subjects: Vec::new(),
            group_by: Vec::new(),
            filter_group_by: BTreeMap::new(),
        }
    }
}

impl MeterQueryParams {
    /**
     * Valida los parámetros contra la definición del medidor.
     *
     * # Logic:
     * 1. La granularidad pedida debe ser >= la nativa del medidor.
     * 2. Toda clave proyectada o filtrada debe existir en el medidor.
     */
    pub fn validate_against(&self, meter: &Meter) -> Result<(), DomainFault> {
        if let Some(requested) = self.window_size {
            if !requested.is_coarser_or_equal_than(meter.window_size) {
                return Err(DomainFault::validation(
                    "windowSize",
                    "requested window is finer than the meter's native granularity",
                ));
            }
        }

        for projected_key in &self.group_by {
            if projected_key != "subject" && !meter.group_by.contains_key(projected_key) {
                return Err(DomainFault::validation(
                    format!("groupBy.{}", projected_key),
                    "key is not declared by the meter",
                ));
            }
        }

        for filter_key in self.filter_group_by.keys() {
            if !meter.group_by.contains_key(filter_key) {
                return Err(DomainFault::validation(
                    format!("filterGroupBy.{}", filter_key),
                    "key is not declared by the meter",
                ));
            }
        }

        Ok(())
    }

    /// Indica si el plan debe agrupar por sujeto.
    pub fn groups_by_subject(&self) -> bool {
        !self.subjects.is_empty() || self.group_by.iter().any(|key| key == "subject")
    }
}

/// Fila agregada devuelta por el conector de streaming.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MeterQueryRow {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub value: f64,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub group_by: BTreeMap<String, Option<String>>,
}

/// Resultado completo de una consulta, con límites alineados ecoizados.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterQueryResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_size: Option<WindowSize>,
    pub data: Vec<MeterQueryRow>,
}
