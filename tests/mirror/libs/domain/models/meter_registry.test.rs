// [tests/mirror/libs/domain/models/meter_registry.test.rs]
/**
 * =================================================================
 * APARATO: METER REGISTRY TEST (V1.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L2-MIRROR
 * RESPONSABILIDAD: CERTIFICACIÓN DE RESOLUCIÓN SLUG -> MEDIDOR
 * =================================================================
 */

use aforo_domain_models::fault::{DomainFault, FaultClass};
use aforo_domain_models::meter::{Meter, MeterAggregation, WindowSize};
use aforo_domain_models::registry::MeterRegistry;
use std::collections::BTreeMap;

fn meter_named(slug: &str) -> Meter {
    Meter {
        slug: slug.to_string(),
        description: None,
        event_type: "request".to_string(),
        aggregation: MeterAggregation::Count,
        value_property: None,
        group_by: BTreeMap::new(),
        window_size: WindowSize::Minute,
    }
}

#[test]
fn certify_resolution_and_stable_listing() {
    let registry = MeterRegistry::from_definitions(vec![
        meter_named("tokens"),
        meter_named("api_calls"),
    ])
    .expect("registry ignition failed");

    assert_eq!(registry.len(), 2);
    assert!(registry.resolve("api_calls").is_ok());

    // Listado estable por slug para la superficie de la API.
    let slugs: Vec<&str> = registry.list().iter().map(|m| m.slug.as_str()).collect();
    assert_eq!(slugs, vec!["api_calls", "tokens"]);
}

#[test]
fn certify_unknown_slug_resolves_to_not_found() {
    let registry = MeterRegistry::from_definitions(vec![meter_named("tokens")]).unwrap();
    match registry.resolve("ghost") {
        Err(fault @ DomainFault::NotFound(_)) => {
            assert_eq!(fault.fault_class(), FaultClass::NotFound);
        }
        other => panic!("L2_REGISTRY_FAULT: expected NotFound, got {:?}", other.err()),
    }
}

#[test]
fn certify_duplicate_slug_is_a_boot_conflict() {
    match MeterRegistry::from_definitions(vec![meter_named("tokens"), meter_named("tokens")]) {
        Err(fault @ DomainFault::Conflict(_)) => {
            assert_eq!(fault.fault_class(), FaultClass::Conflict);
        }
        other => panic!("L2_REGISTRY_FAULT: duplicate slug accepted: {:?}", other.err()),
    }
}
