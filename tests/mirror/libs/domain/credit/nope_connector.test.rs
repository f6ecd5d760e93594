// [tests/mirror/libs/domain/credit/nope_connector.test.rs]
/**
 * =================================================================
 * APARATO: NOPE CONNECTOR TEST (V1.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L2-MIRROR
 * RESPONSABILIDAD: CERTIFICACIÓN DEL MODO DESHABILITADO
 * =================================================================
 */

use aforo_domain_credit::{CreditConnector, NopeCreditConnector};
use aforo_domain_models::fault::FaultClass;
use chrono::Utc;
use uuid::Uuid;

#[tokio::test]
async fn certify_every_operation_returns_not_implemented() {
    println!("\n💤 [PROVING_GROUNDS]: Auditing disabled credit connector...");

    let connector = NopeCreditConnector::new();

    let refusals = [
        connector.list_features("default").await.err().map(|f| f.fault_class()),
        connector.list_grants("default", "customer_1", false).await.err().map(|f| f.fault_class()),
        connector
            .archive_feature("default", Uuid::new_v4())
            .await
            .err()
            .map(|f| f.fault_class()),
        connector
            .void_grant("default", "customer_1", Uuid::new_v4())
            .await
            .err()
            .map(|f| f.fault_class()),
        connector
            .get_balance("default", "customer_1", Utc::now())
            .await
            .err()
            .map(|f| f.fault_class()),
        connector
            .reset("default", "customer_1", Utc::now())
            .await
            .err()
            .map(|f| f.fault_class()),
        connector
            .ledger_history("default", "customer_1", None, None)
            .await
            .err()
            .map(|f| f.fault_class()),
    ];

    for refusal in refusals {
        assert_eq!(
            refusal,
            Some(FaultClass::NotImplemented),
            "L2_NOPE_FAULT: operation leaked past the disabled connector."
        );
    }
}
