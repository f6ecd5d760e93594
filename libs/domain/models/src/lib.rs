// [libs/domain/models/src/lib.rs]
/*!
 * =================================================================
 * APARATO: METERING DOMAIN MODELS (V3.0 - GOLD MASTER)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: GRAMÁTICA SOBERANA DEL PLANO DE MEDICIÓN
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. SINGLE SOURCE OF TRUTH: Define el sobre CloudEvents, la gramática
 *    de medidores y el contrato del conector de streaming consumido
 *    por los estratos L3 (Columnar) y L7 (Crédito).
 * 2. NOMINAL PURITY: Erradicación total de abreviaciones en tipos
 *    y campos expuestos a los adaptadores.
 * 3. HYGIENE: Validación en el borde (meter-create time), nunca por
 *    evento individual.
 * =================================================================
 */

pub mod event;
pub mod fault;
pub mod meter;
pub mod query;
pub mod registry;
pub mod streaming;

pub use event::IngestedEvent;
pub use fault::{DomainFault, FaultClass, IndexedViolation};
pub use meter::{Meter, MeterAggregation, WindowSize};
pub use query::{MeterQueryParams, MeterQueryResult, MeterQueryRow};
pub use registry::MeterRegistry;
pub use streaming::{MeterCreatePolicy, StreamingConnector};
