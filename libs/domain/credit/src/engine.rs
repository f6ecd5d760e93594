// [libs/domain/credit/src/engine.rs]
/*!
 * =================================================================
 * APARATO: BALANCE REPLAY ENGINE (V3.4 - GOLD MASTER)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2/L7)
 * RESPONSABILIDAD: DERIVACIÓN PURA DE SALDOS POR REPLAY DE USO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. PURE COMPUTATION: Sin puntos de suspensión; los incrementos de uso
 *    llegan ya materializados desde el conector de streaming.
 * 2. CONSUMPTION ORDER: (priority asc, effective_at asc, id asc) sobre
 *    las concesiones activas en el instante del incremento.
 * 3. ROLLOVER SYNTHESIS: Al cruzar una expiración con rollover, el motor
 *    emite una concesión hija sintética que participa del resto del replay.
 *
 * # Mathematical Proof (Conservation):
 * Para un replay sin expiraciones cruzadas:
 *   Σ saldo(concesión, T) + consumido(T) - exceso(T) = Σ monto(concesión)
 * El motor preserva esta identidad por construcción: cada unidad de uso
 * o bien decrementa exactamente un saldo, o bien incrementa el exceso.
 * =================================================================
 */

use crate::model::{CreditGrant, GrantBalance};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Incremento de uso medido, proveniente de la capa de agregación.
#[derive(Debug, Clone, PartialEq)]
pub struct UsagePoint {
    pub at: DateTime<Utc>,
    pub amount: f64,
}

/// Resultado del replay de una feature para un sujeto.
#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    /// Saldos finales de cada concesión admitida, incluyendo hijas
    /// sintéticas de rollover (parent_id poblado, id fresco).
    pub grant_balances: Vec<GrantBalance>,

    /// Uso total consumido contra concesiones.
    pub consumed: f64,

    /// Uso no cubierto por ninguna concesión activa. Se reporta, jamás
    /// se almacena.
    pub overage: f64,
}

impl ReplayOutcome {
    /// Saldo vivo de la feature en 'as_of': suma de saldos de concesiones
    /// activas menos el exceso no cubierto.
    pub fn feature_balance(&self, as_of: DateTime<Utc>) -> f64 {
        let live: f64 = self
            .grant_balances
            .iter()
            .filter(|entry| entry.grant.is_active_at(as_of))
            .map(|entry| entry.balance)
            .sum();
        live - self.overage
    }
}

struct WorkingGrant {
    grant: CreditGrant,
    balance: f64,
    expired: bool,
}

impl WorkingGrant {
    fn is_consumable_at(&self, instant: DateTime<Utc>) -> bool {
        !self.expired
            && self.balance > 0.0
            && self.grant.effective_at <= instant
            && instant < self.grant.expires_at
    }
}

/**
 * Replay del saldo de una feature para un sujeto en 'as_of'.
 *
 * # Contrato:
 * - 'grants': concesiones no anuladas con effective_at <= as_of; las que
 *   expiran en o antes del último reset se descartan aquí.
 * - 'last_reset': instante del reset más reciente en o antes de 'as_of'.
 * - 'usage': incrementos medidos; se ordenan por instante antes del replay.
 */
pub fn replay_feature_balance(
    grants: &[CreditGrant],
    last_reset: Option<DateTime<Utc>>,
    usage: &[UsagePoint],
    as_of: DateTime<Utc>,
) -> ReplayOutcome {
    // 1. ADMISIÓN: Filtro de concesiones relevantes para el replay.
    let mut working: Vec<WorkingGrant> = grants
        .iter()
        .filter(|grant| !grant.void)
        .filter(|grant| grant.effective_at <= as_of)
        .filter(|grant| match last_reset {
            Some(reset_instant) => grant.expires_at > reset_instant,
            None => true,
        })
        .cloned()
        .map(|grant| WorkingGrant { balance: grant.amount, grant, expired: false })
        .collect();

    let mut consumed = 0.0_f64;
    let mut overage = 0.0_f64;

    // 2. LÍNEA DE TIEMPO: Incrementos ordenados por instante.
    let mut timeline: Vec<UsagePoint> = usage
        .iter()
        .filter(|point| point.at <= as_of)
        .cloned()
        .collect();
    timeline.sort_by_key(|point| point.at);

    // 3. REPLAY: Expiraciones primero (ventana half-open), consumo después.
    for point in timeline {
        settle_expiries_up_to(&mut working, point.at);

        let mut remaining = point.amount;
        let mut order: Vec<usize> = (0..working.len())
            .filter(|&index| working[index].is_consumable_at(point.at))
            .collect();
        order.sort_by(|&a, &b| {
            let left = &working[a].grant;
            let right = &working[b].grant;
            left.priority
                .cmp(&right.priority)
                .then(left.effective_at.cmp(&right.effective_at))
                .then(left.id.cmp(&right.id))
        });

        for index in order {
            if remaining <= 0.0 {
                break;
            }
            let taken = remaining.min(working[index].balance);
            working[index].balance -= taken;
            consumed += taken;
            remaining -= taken;
        }

        if remaining > 0.0 {
            overage += remaining;
        }
    }

    // 4. CIERRE: Expiraciones pendientes hasta el instante de corte.
    settle_expiries_up_to(&mut working, as_of);

    ReplayOutcome {
        grant_balances: working
            .into_iter()
            .map(|entry| GrantBalance { balance: entry.balance, grant: entry.grant })
            .collect(),
        consumed,
        overage,
    }
}

/**
 * Procesa en orden cronológico toda expiración con expires_at <= horizon.
 *
 * Una expiración con rollover emite una hija sintética que se incorpora
 * al conjunto de trabajo (y puede expirar a su vez dentro del horizonte).
 */
fn settle_expiries_up_to(working: &mut Vec<WorkingGrant>, horizon: DateTime<Utc>) {
    loop {
        let next = working
            .iter()
            .enumerate()
            .filter(|(_, entry)| !entry.expired && entry.grant.expires_at <= horizon)
            .min_by_key(|(_, entry)| (entry.grant.expires_at, entry.grant.id));

        let Some((index, _)) = next else {
            return;
        };

        let surviving_balance = working[index].balance;
        working[index].expired = true;
        working[index].balance = 0.0;

        let parent = working[index].grant.clone();
        if let Some(rollover) = parent.rollover {
            let child_amount = rollover.child_amount(parent.amount, surviving_balance);
            let child_effective = parent.expires_at;
            let child = CreditGrant {
                id: Uuid::new_v4(),
                parent_id: Some(parent.id),
                subject: parent.subject.clone(),
                feature_id: parent.feature_id,
                grant_type: parent.grant_type,
                amount: child_amount,
                priority: parent.priority,
                effective_at: child_effective,
                expiration: parent.expiration,
                expires_at: parent.expiration.expiry_from(child_effective),
                rollover: parent.rollover,
                void: false,
                metadata: parent.metadata.clone(),
            };
            working.push(WorkingGrant { balance: child_amount, grant: child, expired: false });
        }
    }
}
