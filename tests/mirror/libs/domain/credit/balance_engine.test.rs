// [tests/mirror/libs/domain/credit/balance_engine.test.rs]
/**
 * =================================================================
 * APARATO: BALANCE REPLAY ENGINE TEST (V1.1)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L2-MIRROR
 * RESPONSABILIDAD: CERTIFICACIÓN DEL REPLAY (ORDEN, EXPIRACIÓN, ROLLOVER)
 * =================================================================
 */

use aforo_domain_credit::{
    replay_feature_balance, CreditGrant, ExpirationPeriod, GrantExpiration, GrantRollover,
    GrantType, RolloverType, UsagePoint,
};
use chrono::{DateTime, TimeZone, Utc};
use std::collections::BTreeMap;
use uuid::Uuid;

fn instant(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, hour, minute, 0).unwrap()
}

fn grant(amount: f64, priority: u8, effective: DateTime<Utc>, expiration: GrantExpiration) -> CreditGrant {
    CreditGrant {
        id: Uuid::new_v4(),
        parent_id: None,
        subject: "customer_1".to_string(),
        feature_id: Uuid::new_v4(),
        grant_type: GrantType::Usage,
        amount,
        priority,
        effective_at: effective,
        expiration,
        expires_at: expiration.expiry_from(effective),
        rollover: None,
        void: false,
        metadata: BTreeMap::new(),
    }
}

const MONTH: GrantExpiration = GrantExpiration { duration: ExpirationPeriod::Month, count: 1 };
const ONE_HOUR: GrantExpiration = GrantExpiration { duration: ExpirationPeriod::Hour, count: 1 };

#[test]
fn certify_consumption_order_priority_then_effective_then_id() {
    println!("\n⚖️  [PROVING_GROUNDS]: Auditing consumption order...");

    let early = grant(5.0, 2, instant(0, 0), MONTH);
    let late = grant(5.0, 2, instant(1, 0), MONTH);
    let premium = grant(5.0, 1, instant(2, 0), MONTH);

    // 12 unidades: 5 al prioritario, 5 al más antiguo del resto, 2 al último.
    let usage = [UsagePoint { at: instant(3, 0), amount: 12.0 }];
    let outcome = replay_feature_balance(
        &[late.clone(), premium.clone(), early.clone()],
        None,
        &usage,
        instant(4, 0),
    );

    let balance_of = |id: Uuid| {
        outcome
            .grant_balances
            .iter()
            .find(|entry| entry.grant.id == id)
            .map(|entry| entry.balance)
            .expect("grant missing from outcome")
    };

    assert_eq!(balance_of(premium.id), 0.0, "L2_REPLAY_FAULT: priority 1 must drain first.");
    assert_eq!(balance_of(early.id), 0.0, "L2_REPLAY_FAULT: earlier effective_at must drain next.");
    assert_eq!(balance_of(late.id), 3.0);
    assert_eq!(outcome.consumed, 12.0);
    assert_eq!(outcome.overage, 0.0);
}

#[test]
fn certify_usage_before_effective_at_never_consumes() {
    let late_grant = grant(10.0, 1, instant(2, 0), MONTH);
    let usage = [UsagePoint { at: instant(1, 0), amount: 4.0 }];

    let outcome = replay_feature_balance(&[late_grant.clone()], None, &usage, instant(3, 0));

    assert_eq!(outcome.consumed, 0.0);
    assert_eq!(outcome.overage, 4.0, "L2_REPLAY_FAULT: pre-effective usage must surface as overage.");
    assert_eq!(outcome.feature_balance(instant(3, 0)), 6.0);
}

#[test]
fn certify_expired_grant_stops_consuming_at_expiry_boundary() {
    // Ventana half-open: el instante exacto de expiración ya no consume.
    let short_grant = grant(10.0, 1, instant(0, 0), ONE_HOUR);
    let usage = [UsagePoint { at: instant(1, 0), amount: 4.0 }];

    let outcome = replay_feature_balance(&[short_grant], None, &usage, instant(2, 0));

    assert_eq!(outcome.consumed, 0.0, "L2_REPLAY_FAULT: grant consumed at its expiry instant.");
    assert_eq!(outcome.overage, 4.0);
}

#[test]
fn certify_rollover_original_amount_is_clamped_by_max() {
    let mut parent = grant(10.0, 1, instant(0, 0), ONE_HOUR);
    parent.rollover = Some(GrantRollover {
        rollover_type: RolloverType::OriginalAmount,
        max_amount: Some(6.0),
    });

    let outcome = replay_feature_balance(&[parent.clone()], None, &[], instant(3, 0));

    let child = outcome
        .grant_balances
        .iter()
        .find(|entry| entry.grant.parent_id == Some(parent.id))
        .expect("rollover child missing");
    assert_eq!(child.grant.amount, 6.0, "L2_REPLAY_FAULT: maxAmount clamp violated.");
    assert_eq!(child.grant.effective_at, parent.expires_at);
}

#[test]
fn certify_chained_rollover_children_expire_in_sequence() {
    let mut parent = grant(8.0, 1, instant(0, 0), ONE_HOUR);
    parent.rollover = Some(GrantRollover {
        rollover_type: RolloverType::RemainingAmount,
        max_amount: None,
    });

    // Tras 3 horas la cadena es padre -> hija -> nieta; el saldo persiste.
    let outcome = replay_feature_balance(&[parent.clone()], None, &[], instant(3, 30));

    let live: Vec<_> = outcome
        .grant_balances
        .iter()
        .filter(|entry| entry.grant.is_active_at(instant(3, 30)))
        .collect();
    assert_eq!(live.len(), 1, "L2_REPLAY_FAULT: exactly one live descendant expected.");
    assert_eq!(live[0].balance, 8.0);
    assert_eq!(outcome.feature_balance(instant(3, 30)), 8.0);
}
