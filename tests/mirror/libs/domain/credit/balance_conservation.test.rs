// [tests/mirror/libs/domain/credit/balance_conservation.test.rs]
/**
 * =================================================================
 * APARATO: BALANCE CONSERVATION PROPERTY (V1.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L2-MIRROR
 * RESPONSABILIDAD: PROPIEDADES UNIVERSALES DEL REPLAY
 *
 * # Mathematical Proof (replayed here as property):
 * Sin expiraciones cruzadas ni resets:
 *   Σ saldo(g, T) + consumido(T) - exceso(T) = Σ monto(g)
 * y el saldo total es monótonamente no-creciente en T.
 * =================================================================
 */

use aforo_domain_credit::{
    replay_feature_balance, CreditGrant, ExpirationPeriod, GrantExpiration, GrantType, UsagePoint,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use std::collections::BTreeMap;
use uuid::Uuid;

fn origin() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

fn grant(amount: f64, priority: u8, offset_minutes: i64) -> CreditGrant {
    // Expiración a un año: ninguna expiración cruza el horizonte del test.
    let expiration = GrantExpiration { duration: ExpirationPeriod::Year, count: 1 };
    let effective = origin() + Duration::minutes(offset_minutes);
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

proptest! {
    #[test]
    fn conservation_holds_for_arbitrary_grants_and_usage(
        grant_specs in proptest::collection::vec((1u32..=1_000, 0u8..=5, 0i64..=59), 1..6),
        usage_specs in proptest::collection::vec((0u32..=500, 60i64..=600), 0..12),
    ) {
        let grants: Vec<CreditGrant> = grant_specs
            .iter()
            .map(|(amount, priority, offset)| grant(*amount as f64, *priority, *offset))
            .collect();
        let usage: Vec<UsagePoint> = usage_specs
            .iter()
            .map(|(amount, offset)| UsagePoint {
                at: origin() + Duration::minutes(*offset),
                amount: *amount as f64,
            })
            .collect();

        let as_of = origin() + Duration::minutes(700);
        let outcome = replay_feature_balance(&grants, None, &usage, as_of);

        let issued: f64 = grants.iter().map(|g| g.amount).sum();
        let remaining: f64 = outcome.grant_balances.iter().map(|entry| entry.balance).sum();

        // Identidad de conservación (tolerancia de coma flotante).
        prop_assert!((remaining + outcome.consumed - issued).abs() < 1e-6);

        // Todo incremento medido termina consumido o reportado como exceso.
        let measured: f64 = usage.iter().map(|point| point.amount).sum();
        prop_assert!((outcome.consumed + outcome.overage - measured).abs() < 1e-6);
    }

    #[test]
    fn balance_is_monotonically_non_increasing_without_new_grants(
        usage_offsets in proptest::collection::vec((1u32..=200, 10i64..=500), 1..10),
    ) {
        let fixed_grants = vec![grant(2_000.0, 1, 0)];
        let usage: Vec<UsagePoint> = usage_offsets
            .iter()
            .map(|(amount, offset)| UsagePoint {
                at: origin() + Duration::minutes(*offset),
                amount: *amount as f64,
            })
            .collect();

        let mut previous_balance = f64::INFINITY;
        for checkpoint_minutes in [100i64, 200, 300, 400, 500, 600] {
            let as_of = origin() + Duration::minutes(checkpoint_minutes);
            let outcome = replay_feature_balance(&fixed_grants, None, &usage, as_of);
            let balance = outcome.feature_balance(as_of);
            prop_assert!(balance <= previous_balance + 1e-9);
            previous_balance = balance;
        }
    }
}
