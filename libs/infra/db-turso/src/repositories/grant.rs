// [libs/infra/db-turso/src/repositories/grant.rs]
/*!
 * =================================================================
 * APARATO: GRANT LEDGER REPOSITORY (V3.2 - GOLD MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: FILAS GRANT/VOID, RESETS E HISTORIAL AUDITABLE
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. IMMUTABLE ROWS: Una concesión jamás se actualiza; anularla inserta
 *    una fila VOID con parent_id hacia la original.
 * 2. DERIVED VOID FLAG: El estado void se computa con EXISTS sobre las
 *    filas VOID, preservando el rastro auditable completo.
 * =================================================================
 */

use crate::errors::DbError;
use crate::repositories::{decode_instant, encode_instant};
use crate::TursoClient;
use aforo_domain_credit::{
    CreditGrant, CreditReset, ExpirationPeriod, GrantExpiration, GrantRollover, GrantType,
    LedgerEntry, LedgerEntryType, RolloverType,
};
use chrono::{DateTime, Utc};
use libsql::{params, Row};
use std::collections::BTreeMap;
use tracing::{debug, instrument};
use uuid::Uuid;

const INSERT_GRANT: &str = "
    INSERT INTO credit_grants (
        id, namespace, entry_type, parent_id, subject, feature_id, amount, priority,
        effective_at, expiration_period, expiration_count, expires_at,
        rollover_type, rollover_max_amount, metadata_json
    ) VALUES (?1, ?2, 'GRANT', ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
";

const INSERT_VOID: &str = "
    INSERT INTO credit_grants (id, namespace, entry_type, parent_id, subject, feature_id, effective_at)
    VALUES (?1, ?2, 'VOID', ?3, ?4, ?5, ?6)
";

const SELECT_GRANTS_BASE: &str = "
    SELECT g.id, g.parent_id, g.subject, g.feature_id, g.amount, g.priority,
           g.effective_at, g.expiration_period, g.expiration_count, g.expires_at,
           g.rollover_type, g.rollover_max_amount, g.metadata_json,
           EXISTS(
               SELECT 1 FROM credit_grants v
               WHERE v.entry_type = 'VOID' AND v.parent_id = g.id
           ) AS void
    FROM credit_grants g
    WHERE g.namespace = ?1 AND g.subject = ?2 AND g.entry_type = 'GRANT'
    ORDER BY g.effective_at ASC, g.id ASC
";

const INSERT_RESET: &str = "
    INSERT INTO credit_resets (id, namespace, subject, effective_at)
    VALUES (?1, ?2, ?3, ?4)
";

const LATEST_RESET: &str = "
    SELECT id, subject, effective_at
    FROM credit_resets
    WHERE namespace = ?1 AND subject = ?2 AND effective_at <= ?3
    ORDER BY effective_at DESC, id DESC
    LIMIT 1
";

const LEDGER_HISTORY: &str = "
    SELECT id, entry_type, subject, feature_id, amount, parent_id, effective_at
    FROM credit_grants
    WHERE namespace = ?1 AND subject = ?2
    UNION ALL
    SELECT id, 'RESET' AS entry_type, subject, NULL, NULL, NULL, effective_at
    FROM credit_resets
    WHERE namespace = ?1 AND subject = ?2
    ORDER BY effective_at ASC, id ASC
";

/// Liga un texto opcional como valor SQL (NULL explícito).
fn opt_text(value: Option<String>) -> libsql::Value {
    match value {
        Some(text) => libsql::Value::Text(text),
        None => libsql::Value::Null,
    }
}

/// Liga un real opcional como valor SQL (NULL explícito).
fn opt_real(value: Option<f64>) -> libsql::Value {
    match value {
        Some(real) => libsql::Value::Real(real),
        None => libsql::Value::Null,
    }
}

pub struct GrantLedgerRepository {
    database_client: TursoClient,
}

impl GrantLedgerRepository {
    pub fn new(client: TursoClient) -> Self {
        Self { database_client: client }
    }

    #[instrument(skip(self, grant), fields(subject = %grant.subject))]
    pub async fn insert_grant(&self, namespace: &str, grant: &CreditGrant) -> Result<(), DbError> {
        let database_connection = self.database_client.get_connection()?;
        let metadata_json = serde_json::to_string(&grant.metadata)
            .map_err(|fault| DbError::MappingError(fault.to_string()))?;

        database_connection
            .execute(
                INSERT_GRANT,
                params![
                    grant.id.to_string(),
                    namespace,
                    opt_text(grant.parent_id.map(|parent| parent.to_string())),
                    grant.subject.clone(),
                    grant.feature_id.to_string(),
                    grant.amount,
                    grant.priority as i64,
                    encode_instant(grant.effective_at),
                    encode_period(grant.expiration.duration),
                    grant.expiration.count as i64,
                    encode_instant(grant.expires_at),
                    opt_text(grant.rollover.map(|r| encode_rollover_type(r.rollover_type).to_string())),
                    opt_real(grant.rollover.and_then(|r| r.max_amount)),
                    metadata_json
                ],
            )
            .await?;

        debug!("📜 [GRANT_LEDGER]: Grant '{}' crystallized for subject '{}'.", grant.id, grant.subject);
        Ok(())
    }

    /// Inserta la fila VOID que anula una concesión. Fila nueva, jamás
    /// una reescritura de la original.
    #[instrument(skip(self))]
    pub async fn insert_void(
        &self,
        namespace: &str,
        subject: &str,
        voided_grant_id: Uuid,
        feature_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Uuid, DbError> {
        let database_connection = self.database_client.get_connection()?;
        let void_row_id = Uuid::new_v4();

        database_connection
            .execute(
                INSERT_VOID,
                params![
                    void_row_id.to_string(),
                    namespace,
                    voided_grant_id.to_string(),
                    subject,
                    feature_id.to_string(),
                    encode_instant(at)
                ],
            )
            .await?;

        Ok(void_row_id)
    }

    /// Concesiones del sujeto (filas GRANT) con el flag void derivado.
    pub async fn list_grants(
        &self,
        namespace: &str,
        subject: &str,
        include_void: bool,
    ) -> Result<Vec<CreditGrant>, DbError> {
        let database_connection = self.database_client.get_connection()?;
        let mut query_results = database_connection
            .query(SELECT_GRANTS_BASE, params![namespace, subject])
            .await?;

        let mut grants = Vec::new();
        while let Some(data_row) = query_results.next().await? {
            let grant = map_row_to_grant(&data_row)?;
            if include_void || !grant.void {
                grants.push(grant);
            }
        }
        Ok(grants)
    }

    /// Concesión puntual del sujeto.
    pub async fn find_grant(
        &self,
        namespace: &str,
        subject: &str,
        grant_id: Uuid,
    ) -> Result<CreditGrant, DbError> {
        let grants = self.list_grants(namespace, subject, true).await?;
        grants
            .into_iter()
            .find(|grant| grant.id == grant_id)
            .ok_or(DbError::GrantNotFound)
    }

    /// Conjunto de replay: concesiones no anuladas con effective_at <= as_of.
    pub async fn grants_for_balance(
        &self,
        namespace: &str,
        subject: &str,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<CreditGrant>, DbError> {
        let grants = self.list_grants(namespace, subject, false).await?;
        Ok(grants
            .into_iter()
            .filter(|grant| grant.effective_at <= as_of)
            .collect())
    }

    #[instrument(skip(self, reset))]
    pub async fn insert_reset(&self, namespace: &str, reset: &CreditReset) -> Result<(), DbError> {
        let database_connection = self.database_client.get_connection()?;
        database_connection
            .execute(
                INSERT_RESET,
                params![
                    reset.id.to_string(),
                    namespace,
                    reset.subject.clone(),
                    encode_instant(reset.effective_at)
                ],
            )
            .await?;
        Ok(())
    }

    /// Reset más reciente del sujeto en o antes de 'as_of'.
    pub async fn latest_reset_at_or_before(
        &self,
        namespace: &str,
        subject: &str,
        as_of: DateTime<Utc>,
    ) -> Result<Option<CreditReset>, DbError> {
        let database_connection = self.database_client.get_connection()?;
        let mut query_results = database_connection
            .query(LATEST_RESET, params![namespace, subject, encode_instant(as_of)])
            .await?;

        match query_results.next().await? {
            Some(data_row) => {
                let raw_id: String = data_row.get(0)?;
                Ok(Some(CreditReset {
                    id: Uuid::parse_str(&raw_id).map_err(|fault| DbError::MappingError(fault.to_string()))?,
                    subject: data_row.get(1)?,
                    effective_at: decode_instant(&data_row.get::<String>(2)?)?,
                }))
            }
            None => Ok(None),
        }
    }

    /// Historial auditable del sujeto (GRANT + VOID + RESET) en [from, to).
    pub async fn ledger_history(
        &self,
        namespace: &str,
        subject: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<LedgerEntry>, DbError> {
        let database_connection = self.database_client.get_connection()?;
        let mut query_results = database_connection
            .query(LEDGER_HISTORY, params![namespace, subject])
            .await?;

        let mut entries = Vec::new();
        while let Some(data_row) = query_results.next().await? {
            let entry = map_row_to_ledger_entry(&data_row)?;
            if let Some(lower) = from {
                if entry.at < lower {
                    continue;
                }
            }
            if let Some(upper) = to {
                if entry.at >= upper {
                    continue;
                }
            }
            entries.push(entry);
        }
        Ok(entries)
    }
}

fn encode_period(period: ExpirationPeriod) -> &'static str {
    match period {
        ExpirationPeriod::Hour => "HOUR",
        ExpirationPeriod::Day => "DAY",
        ExpirationPeriod::Week => "WEEK",
        ExpirationPeriod::Month => "MONTH",
        ExpirationPeriod::Year => "YEAR",
    }
}

fn decode_period(raw: &str) -> Result<ExpirationPeriod, DbError> {
    match raw {
        "HOUR" => Ok(ExpirationPeriod::Hour),
        "DAY" => Ok(ExpirationPeriod::Day),
        "WEEK" => Ok(ExpirationPeriod::Week),
        "MONTH" => Ok(ExpirationPeriod::Month),
        "YEAR" => Ok(ExpirationPeriod::Year),
        other => Err(DbError::MappingError(format!("expiration period '{}' rejected", other))),
    }
}

fn encode_rollover_type(rollover_type: RolloverType) -> &'static str {
    match rollover_type {
        RolloverType::OriginalAmount => "ORIGINAL_AMOUNT",
        RolloverType::RemainingAmount => "REMAINING_AMOUNT",
    }
}

fn decode_rollover_type(raw: &str) -> Result<RolloverType, DbError> {
    match raw {
        "ORIGINAL_AMOUNT" => Ok(RolloverType::OriginalAmount),
        "REMAINING_AMOUNT" => Ok(RolloverType::RemainingAmount),
        other => Err(DbError::MappingError(format!("rollover type '{}' rejected", other))),
    }
}

fn parse_uuid(raw: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|fault| DbError::MappingError(fault.to_string()))
}

fn map_row_to_grant(data_row: &Row) -> Result<CreditGrant, DbError> {
    let raw_id: String = data_row.get(0)?;
    let raw_parent: Option<String> = data_row.get(1)?;
    let raw_feature: String = data_row.get(3)?;
    let raw_period: String = data_row.get(7)?;
    let raw_rollover_type: Option<String> = data_row.get(10)?;
    let rollover_max: Option<f64> = data_row.get(11)?;
    let metadata_json: String = data_row.get(12)?;

    let rollover = match raw_rollover_type {
        Some(raw) => Some(GrantRollover {
            rollover_type: decode_rollover_type(&raw)?,
            max_amount: rollover_max,
        }),
        None => None,
    };

    let metadata: BTreeMap<String, String> = serde_json::from_str(&metadata_json)
        .map_err(|fault| DbError::MappingError(format!("grant metadata rejected: {}", fault)))?;

    Ok(CreditGrant {
        id: parse_uuid(&raw_id)?,
        parent_id: raw_parent.as_deref().map(parse_uuid).transpose()?,
        subject: data_row.get(2)?,
        feature_id: parse_uuid(&raw_feature)?,
        grant_type: GrantType::Usage,
        amount: data_row.get(4)?,
        priority: data_row.get::<i64>(5)? as u8,
        effective_at: decode_instant(&data_row.get::<String>(6)?)?,
        expiration: GrantExpiration {
            duration: decode_period(&raw_period)?,
            count: data_row.get::<i64>(8)? as u32,
        },
        expires_at: decode_instant(&data_row.get::<String>(9)?)?,
        rollover,
        void: data_row.get::<i64>(13)? != 0,
        metadata,
    })
}

fn map_row_to_ledger_entry(data_row: &Row) -> Result<LedgerEntry, DbError> {
    let raw_id: String = data_row.get(0)?;
    let raw_type: String = data_row.get(1)?;
    let raw_feature: Option<String> = data_row.get(3)?;
    let raw_parent: Option<String> = data_row.get(5)?;

    let entry_type = match raw_type.as_str() {
        "GRANT" => LedgerEntryType::Grant,
        "VOID" => LedgerEntryType::Void,
        "RESET" => LedgerEntryType::Reset,
        other => return Err(DbError::MappingError(format!("ledger entry type '{}' rejected", other))),
    };

    Ok(LedgerEntry {
        id: parse_uuid(&raw_id)?,
        entry_type,
        subject: data_row.get(2)?,
        feature_id: raw_feature.as_deref().map(parse_uuid).transpose()?,
        amount: data_row.get(4)?,
        parent_id: raw_parent.as_deref().map(parse_uuid).transpose()?,
        at: decode_instant(&data_row.get::<String>(6)?)?,
    })
}
