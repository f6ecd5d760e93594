// [libs/domain/models/src/registry.rs]
/*!
 * =================================================================
 * APARATO: METER REGISTRY (V2.0 - SOBERANO)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: RESOLUCIÓN SLUG -> MEDIDOR EN MEMORIA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. READ-MOSTLY: Se construye en el boot desde la configuración y es
 *    inmutable durante la vida del proceso; acceso sin candados.
 * 2. CONFLICT AT BOOT: Un slug duplicado en la configuración es un
 *    fallo de arranque (CONFLICT), jamás un estado parcial.
 * =================================================================
 */

use crate::fault::DomainFault;
use crate::meter::Meter;
use std::collections::BTreeMap;

/// Mapa en memoria slug -> medidor, compartido entre los conectores
/// de streaming y de crédito. Escrituras en runtime deshabilitadas.
#[derive(Debug, Clone, Default)]
pub struct MeterRegistry {
    meters_by_slug: BTreeMap<String, Meter>,
}

impl MeterRegistry {
    /**
     * Construye el registro validando cada definición y la unicidad de slugs.
     *
     * # Errors:
     * - `Validation` si alguna definición viola sus invariantes.
     * - `Conflict` si dos definiciones comparten slug.
     */
    pub fn from_definitions(definitions: Vec<Meter>) -> Result<Self, DomainFault> {
        let mut meters_by_slug = BTreeMap::new();

        for meter in definitions {
            meter.validate()?;
            if meters_by_slug.contains_key(&meter.slug) {
                return Err(DomainFault::Conflict(format!(
                    "duplicate meter slug '{}' in configuration",
                    meter.slug
                )));
            }
            meters_by_slug.insert(meter.slug.clone(), meter);
        }

        Ok(Self { meters_by_slug })
    }

    /// Resuelve un slug hacia su medidor.
    pub fn resolve(&self, slug: &str) -> Result<&Meter, DomainFault> {
        self.meters_by_slug
            .get(slug)
            .ok_or_else(|| DomainFault::NotFound(format!("meter '{}' not found", slug)))
    }

    /// Listado estable (orden de slug) para la superficie de la API.
    pub fn list(&self) -> Vec<&Meter> {
        self.meters_by_slug.values().collect()
    }

    /// Cantidad de medidores registrados.
    pub fn len(&self) -> usize {
        self.meters_by_slug.len()
    }

    /// Indica si el registro está vacío.
    pub fn is_empty(&self) -> bool {
        self.meters_by_slug.is_empty()
    }
}
