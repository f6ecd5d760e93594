// [apps/gateway/src/handlers/mod.rs]
/*!
 * =================================================================
 * APARATO: HANDLER REGISTRY (V4.0 - SOBERANO)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L4)
 * RESPONSABILIDAD: REGISTRO NOMINAL DE ADAPTADORES HTTP
 * =================================================================
 */

pub mod credit;
pub mod events;
pub mod meters;
pub mod portal;
