// [libs/infra/db-turso/src/schema.rs]
/**
 * =================================================================
 * APARATO: CREDIT LEDGER SCHEMA (V3.0 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: GOBERNANZA ESTRUCTURAL E IDEMPOTENCIA TOTAL
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. APPEND-ONLY: 'credit_grants' aloja filas GRANT y VOID; una
 *    concesión es void si una fila VOID posterior la referencia.
 * 2. EXPLICIT EXPIRY: 'expires_at' persiste el vencimiento exacto para
 *    que los hijos de un reset preserven el del padre.
 * 3. IDEMPOTENCIA: Gestión de errores para migraciones en caliente.
 * 4. PERFORMANCE: Índices de aceleración para el replay por sujeto.
 * =================================================================
 */

use anyhow::{Context, Result};
use libsql::Connection;
use tracing::{debug, info, instrument};

/**
 * ESTRATO 1: SOLIDIFICACIÓN (Génesis de Tablas)
 * Define las entidades del ledger de crédito.
 */
const LEDGER_TABLES: &[(&str, &str)] = &[
    ("TABLE_CREDIT_FEATURES", r#"
        CREATE TABLE IF NOT EXISTS credit_features (
            id TEXT PRIMARY KEY,
            namespace TEXT NOT NULL,
            name TEXT NOT NULL,
            meter_slug TEXT NOT NULL,
            meter_group_by_filters TEXT NOT NULL DEFAULT '{}',
            archived INTEGER NOT NULL DEFAULT 0,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_CREDIT_GRANTS", r#"
        CREATE TABLE IF NOT EXISTS credit_grants (
            id TEXT PRIMARY KEY,
            namespace TEXT NOT NULL,
            entry_type TEXT NOT NULL DEFAULT 'GRANT',
            parent_id TEXT,
            subject TEXT NOT NULL,
            feature_id TEXT,
            amount REAL,
            priority INTEGER NOT NULL DEFAULT 0,
            effective_at TEXT NOT NULL,
            expiration_period TEXT,
            expiration_count INTEGER,
            expires_at TEXT,
            rollover_type TEXT,
            rollover_max_amount REAL,
            metadata_json TEXT NOT NULL DEFAULT '{}',
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_CREDIT_RESETS", r#"
        CREATE TABLE IF NOT EXISTS credit_resets (
            id TEXT PRIMARY KEY,
            namespace TEXT NOT NULL,
            subject TEXT NOT NULL,
            effective_at TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
];

/**
 * ESTRATO 2: ACELERACIÓN (Índices de Replay)
 */
const LEDGER_INDICES: &[(&str, &str)] = &[
    ("IDX_FEATURES_NAMESPACE", "CREATE INDEX IF NOT EXISTS idx_credit_features_namespace ON credit_features (namespace);"),
    ("IDX_GRANTS_SUBJECT", "CREATE INDEX IF NOT EXISTS idx_credit_grants_subject ON credit_grants (namespace, subject, effective_at);"),
    ("IDX_GRANTS_PARENT", "CREATE INDEX IF NOT EXISTS idx_credit_grants_parent ON credit_grants (parent_id);"),
    ("IDX_RESETS_SUBJECT", "CREATE INDEX IF NOT EXISTS idx_credit_resets_subject ON credit_resets (namespace, subject, effective_at);"),
];

/**
 * Aplica el esquema completo del ledger de forma idempotente.
 */
#[instrument(skip(database_connection))]
pub async fn apply_credit_ledger_schema(database_connection: &Connection) -> Result<()> {
    info!("🏗️  [SCHEMA]: Levelizing credit ledger strata...");

    for (artifact_name, create_statement) in LEDGER_TABLES {
        database_connection
            .execute(create_statement, ())
            .await
            .with_context(|| format!("schema solidification failed for {}", artifact_name))?;
        debug!("   🧱 [SCHEMA]: {} levelized.", artifact_name);
    }

    for (artifact_name, create_statement) in LEDGER_INDICES {
        database_connection
            .execute(create_statement, ())
            .await
            .with_context(|| format!("index acceleration failed for {}", artifact_name))?;
        debug!("   ⚡ [SCHEMA]: {} levelized.", artifact_name);
    }

    info!("✅ [SCHEMA]: Credit ledger schema bit-perfect.");
    Ok(())
}
