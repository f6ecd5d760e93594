// [tests/mirror/libs/domain/namespace/manager_fanout.test.rs]
/**
 * =================================================================
 * APARATO: NAMESPACE FAN-OUT TEST (V1.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L2-MIRROR
 * RESPONSABILIDAD: CERTIFICACIÓN DE ABORTO EN PRIMER FALLO
 * =================================================================
 */

use aforo_domain_models::fault::{DomainFault, FaultClass};
use aforo_domain_namespace::{NamespaceHandler, NamespaceManager, NamespaceManagerConfig};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Handler sintético que registra invocaciones y puede fallar a demanda.
struct ProbeHandler {
    name: &'static str,
    creations: AtomicUsize,
    fail: bool,
}

impl ProbeHandler {
    fn new(name: &'static str, fail: bool) -> Arc<Self> {
        Arc::new(Self { name, creations: AtomicUsize::new(0), fail })
    }
}

#[async_trait]
impl NamespaceHandler for ProbeHandler {
    fn handler_name(&self) -> &'static str {
        self.name
    }

    async fn create_namespace(&self, _name: &str) -> Result<(), DomainFault> {
        self.creations.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(DomainFault::Transient("probe handler offline".to_string()))
        } else {
            Ok(())
        }
    }

    async fn delete_namespace(&self, _name: &str) -> Result<(), DomainFault> {
        Ok(())
    }
}

fn manager_with(handlers: Vec<Arc<dyn NamespaceHandler>>, disabled: bool) -> NamespaceManager {
    NamespaceManager::new(
        handlers,
        NamespaceManagerConfig {
            default_namespace: "default".to_string(),
            disable_management: disabled,
        },
    )
    .expect("manager ignition failed")
}

#[tokio::test]
async fn certify_fanout_aborts_on_first_failure_leaving_created_resources() {
    println!("\n🏷️  [PROVING_GROUNDS]: Auditing namespace fan-out abort...");

    let healthy = ProbeHandler::new("transport-topic", false);
    let broken = ProbeHandler::new("columnar-store", true);
    let shadowed = ProbeHandler::new("never-reached", false);

    let manager = manager_with(
        vec![healthy.clone(), broken.clone(), shadowed.clone()],
        false,
    );

    let outcome = manager.create_namespace("acme").await;
    assert!(outcome.is_err(), "L2_NAMESPACE_FAULT: failing fan-out reported success.");

    // Lo ya creado queda en su lugar; el handler posterior jamás se invoca.
    assert_eq!(healthy.creations.load(Ordering::SeqCst), 1);
    assert_eq!(broken.creations.load(Ordering::SeqCst), 1);
    assert_eq!(shadowed.creations.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn certify_disabled_management_is_noop_for_default_only() {
    let probe = ProbeHandler::new("transport-topic", false);
    let manager = manager_with(vec![probe.clone()], true);

    assert!(manager.create_namespace("default").await.is_ok());
    assert_eq!(
        probe.creations.load(Ordering::SeqCst),
        0,
        "L2_NAMESPACE_FAULT: disabled management still provisioned resources."
    );

    let refusal = manager.create_namespace("acme").await.unwrap_err();
    assert_eq!(refusal.fault_class(), FaultClass::NotImplemented);
}

#[tokio::test]
async fn certify_namespace_grammar_is_enforced() {
    let manager = manager_with(vec![], false);
    let refusal = manager.create_namespace("Acme-Prod").await.unwrap_err();
    assert_eq!(refusal.fault_class(), FaultClass::BadRequest);
}
