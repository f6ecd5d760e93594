// [libs/infra/db-turso/src/lib.rs]
/*!
 * =================================================================
 * APARATO: CREDIT LEDGER PERSISTENCE (V3.0 - GOLD MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: PERSISTENCIA ACID DEL LEDGER DE CRÉDITO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. APPEND-ONLY LEDGER: Concesiones inmutables; anular inserta una
 *    fila VOID referenciando la original; los resets son aditivos.
 * 2. SUBJECT SERIALISATION: Las mutaciones de crédito de un mismo
 *    sujeto se serializan con un candado consultivo por sujeto más la
 *    transacción de escritor único del almacén.
 * 3. DERIVED BALANCE: El saldo jamás se almacena; se deriva con el
 *    motor de replay contra el uso medido del conector de streaming.
 * =================================================================
 */

pub mod client;
pub mod connector;
pub mod errors;
pub mod repositories;
pub mod schema;

pub use client::TursoClient;
pub use connector::{LedgerCreditConnector, LedgerCreditConnectorConfig};
pub use errors::DbError;
