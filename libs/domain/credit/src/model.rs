// [libs/domain/credit/src/model.rs]
/*!
 * =================================================================
 * APARATO: CREDIT LEDGER GRAMMAR (V3.2 - GOLD MASTER)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2/L7)
 * RESPONSABILIDAD: GRAMÁTICA DE FEATURES, CONCESIONES Y RESETS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. EXPLICIT EXPIRY: Cada concesión persiste su instante de expiración
 *    ('expires_at'), de modo que los hijos de un reset preservan el
 *    vencimiento original del padre con exactitud de bit.
 * 2. UTC ABSOLUTO: Todos los instantes son UTC; las entradas en hora
 *    local se rechazan en el borde de la API.
 * 3. AUDIT TRAIL: Anulaciones y resets son filas aditivas; el historial
 *    del ledger jamás se reescribe.
 * =================================================================
 */

use aforo_domain_models::fault::DomainFault;
use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Proyección nombrada sobre un medidor usada como unidad de crédito.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    pub id: Uuid,

    /// Nombre operacional de la feature.
    pub name: String,

    /// Medidor subyacente cuyo uso consume el crédito.
    pub meter_slug: String,

    /// Filtros de igualdad sobre las claves de agrupación del medidor.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meter_group_by_filters: BTreeMap<String, String>,

    /// Una feature archivada sigue visible pero rechaza nuevas concesiones.
    #[serde(default)]
    pub archived: bool,
}

/// Tipo de concesión. El kernel actual solo emite concesiones de uso.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GrantType {
    Usage,
}

/// Unidad de período de expiración de una concesión.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpirationPeriod {
    Hour,
    Day,
    Week,
    Month,
    Year,
}

/// Ventana de vigencia de una concesión: duration × count.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GrantExpiration {
    pub duration: ExpirationPeriod,
    pub count: u32,
}

impl GrantExpiration {
    /**
     * Computa el instante de expiración desde un ancla.
     *
     * # Logic:
     * Horas/días/semanas son duraciones fijas; meses/años avanzan sobre
     * el calendario civil (aritmética de meses de chrono).
     */
    pub fn expiry_from(&self, anchor: DateTime<Utc>) -> DateTime<Utc> {
        match self.duration {
            ExpirationPeriod::Hour => anchor + Duration::hours(self.count as i64),
            ExpirationPeriod::Day => anchor + Duration::days(self.count as i64),
            ExpirationPeriod::Week => anchor + Duration::weeks(self.count as i64),
            ExpirationPeriod::Month => anchor
                .checked_add_months(Months::new(self.count))
                .unwrap_or(anchor),
            ExpirationPeriod::Year => anchor
                .checked_add_months(Months::new(self.count.saturating_mul(12)))
                .unwrap_or(anchor),
        }
    }
}

/// Regla de traspaso de saldo al expirar una concesión.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RolloverType {
    /// El hijo nace con el monto original de la concesión.
    OriginalAmount,
    /// El hijo nace con el saldo sobreviviente al expirar.
    RemainingAmount,
}

/// Configuración de rollover de una concesión.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GrantRollover {
    #[serde(rename = "type")]
    pub rollover_type: RolloverType,

    /// Tope superior del monto traspasado (∞ si ausente).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<f64>,
}

impl GrantRollover {
    /// Monto del hijo de rollover: clamp(regla, 0, max ∨ ∞).
    pub fn child_amount(&self, original_amount: f64, remaining_balance: f64) -> f64 {
        let nominal = match self.rollover_type {
            RolloverType::OriginalAmount => original_amount,
            RolloverType::RemainingAmount => remaining_balance,
        };
        let ceiling = self.max_amount.unwrap_or(f64::INFINITY);
        nominal.clamp(0.0, ceiling)
    }
}

/// Concesión de crédito. Inmutable una vez escrita en el ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreditGrant {
    pub id: Uuid,

    /// Enlaza una concesión hija (producto de un reset o rollover) con su
    /// predecesora.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,

    pub subject: String,
    pub feature_id: Uuid,

    #[serde(rename = "type")]
    pub grant_type: GrantType,

    /// Monto concedido. Estrictamente positivo al crear.
    pub amount: f64,

    /// Orden de consumo: menor prioridad gana.
    pub priority: u8,

    pub effective_at: DateTime<Utc>,

    pub expiration: GrantExpiration,

    /// Instante de expiración persistido. Para hijas de reset preserva el
    /// vencimiento original del padre.
    pub expires_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rollover: Option<GrantRollover>,

    /// Marcada cuando una fila VOID posterior referencia esta concesión.
    #[serde(default)]
    pub void: bool,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl CreditGrant {
    /// Vigencia half-open: activa en [effective_at, expires_at).
    pub fn is_active_at(&self, instant: DateTime<Utc>) -> bool {
        !self.void && self.effective_at <= instant && instant < self.expires_at
    }
}

/// Punto de bifurcación de saldos de un sujeto.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreditReset {
    pub id: Uuid,
    pub subject: String,
    pub effective_at: DateTime<Utc>,
}

/// Tipo de entrada del historial del ledger.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerEntryType {
    Grant,
    Void,
    Reset,
}

/// Entrada del historial auditable de un sujeto.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: Uuid,
    pub entry_type: LedgerEntryType,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    pub at: DateTime<Utc>,
}

/// Saldo derivado de una concesión en un instante.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GrantBalance {
    pub grant: CreditGrant,
    pub balance: f64,
}

/// Saldo derivado de una feature en un instante.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeatureBalance {
    pub feature: Feature,
    pub balance: f64,
    /// Uso total consumido contra la feature hasta el instante.
    pub usage: f64,
}

/// Snapshot completo (derivado, jamás persistido) de un sujeto.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSnapshot {
    pub subject: String,
    pub at: DateTime<Utc>,
    pub feature_balances: Vec<FeatureBalance>,
    pub grant_balances: Vec<GrantBalance>,
}

/// Valida una especificación de rollover al crear una concesión.
pub fn validate_rollover(rollover: &Option<GrantRollover>) -> Result<(), DomainFault> {
    if let Some(config) = rollover {
        if let Some(ceiling) = config.max_amount {
            if ceiling < 0.0 || !ceiling.is_finite() {
                return Err(DomainFault::validation(
                    "rollover.maxAmount",
                    "must be a finite amount >= 0",
                ));
            }
        }
    }
    Ok(())
}
