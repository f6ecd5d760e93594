// [libs/domain/credit/src/lib.rs]
/*!
 * =================================================================
 * APARATO: CREDIT KERNEL (V3.0 - GOLD MASTER)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2/L7)
 * RESPONSABILIDAD: GOBERNANZA DE CONCESIONES Y CÁLCULO DE SALDOS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. LEDGER-LIKE: Concesiones inmutables una vez escritas; anular crea
 *    una fila nueva que referencia la original. El saldo es puramente
 *    derivado, jamás almacenado.
 * 2. PURE REPLAY: El motor de balances es computación pura sin puntos
 *    de suspensión; el I/O vive en los conectores (L3).
 * 3. NOPE MODE: Con entitlements deshabilitados, todas las operaciones
 *    retornan NOT_IMPLEMENTED vía una variante dedicada del conector.
 * =================================================================
 */

pub mod connector;
pub mod engine;
pub mod model;
pub mod nope;

pub use connector::{CreditConnector, FeatureSpec, GrantSpec};
pub use engine::{replay_feature_balance, ReplayOutcome, UsagePoint};
pub use model::{
    BalanceSnapshot, CreditGrant, CreditReset, ExpirationPeriod, Feature, FeatureBalance,
    GrantBalance, GrantExpiration, GrantRollover, GrantType, LedgerEntry, LedgerEntryType,
    RolloverType,
};
pub use nope::NopeCreditConnector;
