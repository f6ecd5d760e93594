// [libs/infra/columnar/src/lib.rs]
/*!
 * =================================================================
 * APARATO: COLUMNAR AGGREGATION PLANE (V3.0 - GOLD MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: MATERIALIZACIÓN POR MEDIDOR Y PLANES DE CONSULTA
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. PLAN-TIME COMPILATION: Las rutas JSONPath de los medidores se
 *    compilan a expresiones de columna al crear la materialización,
 *    jamás por evento.
 * 2. EXECUTOR PORT: El SQL viaja por un puerto ejecutable; el adaptador
 *    de producción habla el protocolo HTTP del almacén columnar.
 * 3. AVG CORRECTNESS: La materialización retiene SUM y COUNT; el AVG
 *    se recompone en consulta, jamás se re-promedian sub-ventanas.
 * =================================================================
 */

pub mod connector;
pub mod errors;
pub mod executor;
pub mod plan;
pub mod sql;

pub use connector::{ColumnarConnectorConfig, ColumnarStreamingConnector};
pub use errors::ColumnarError;
pub use executor::{ColumnarExecutor, HttpColumnarClient, HttpColumnarClientConfig};
