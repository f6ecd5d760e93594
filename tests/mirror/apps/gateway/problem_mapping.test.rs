// [tests/mirror/apps/gateway/problem_mapping.test.rs]
/**
 * =================================================================
 * APARATO: PROBLEM MAPPING TEST (V1.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L4-MIRROR
 * RESPONSABILIDAD: CERTIFICACIÓN DEL MAPEO FALLO -> RFC 7807
 * =================================================================
 */

use aforo_domain_models::fault::{DomainFault, IndexedViolation};
use aforo_gateway::problem::ApiProblem;

#[test]
fn certify_fault_classes_map_to_the_error_table() {
    println!("\n🧾 [PROVING_GROUNDS]: Auditing RFC 7807 mapping...");

    let expectations = [
        (DomainFault::validation("subject", "must not be empty"), 400, "Bad Request"),
        (DomainFault::Unauthorized("token rejected".to_string()), 401, "Unauthorized"),
        (DomainFault::NotFound("meter 'ghost' not found".to_string()), 404, "Not Found"),
        (DomainFault::Conflict("duplicate slug".to_string()), 409, "Conflict"),
        (DomainFault::NotImplemented("hosted only".to_string()), 501, "Not Implemented"),
        (DomainFault::Transient("broker offline".to_string()), 503, "Service Unavailable"),
        (DomainFault::Internal("sql rejected".to_string()), 500, "Internal Server Error"),
    ];

    for (fault, expected_status, expected_title) in expectations {
        let problem = ApiProblem::from(fault);
        assert_eq!(problem.status, expected_status);
        assert_eq!(problem.title, expected_title);
        assert_eq!(problem.problem_type, "about:blank");
    }
}

#[test]
fn certify_internal_causes_never_leak_to_the_surface() {
    let problem = ApiProblem::from(DomainFault::Internal(
        "SQL_QUERY_REJECTED -> table om_acme_meter_tokens is corrupted".to_string(),
    ));
    assert_eq!(problem.detail, "internal error", "L4_PROBLEM_FAULT: internal cause leaked.");

    let problem = ApiProblem::from(DomainFault::Transient(
        "broker 10.0.0.17:9092 connection refused".to_string(),
    ));
    assert!(!problem.detail.contains("10.0.0.17"), "L4_PROBLEM_FAULT: transient cause leaked.");
}

#[test]
fn certify_batch_violations_ride_the_problem_extension() {
    let problem = ApiProblem::from(DomainFault::BatchValidation {
        failures: vec![IndexedViolation {
            index: 3,
            field: "subject".to_string(),
            message: "must not be empty".to_string(),
        }],
    });

    assert_eq!(problem.status, 400);
    let violations = problem.violations.expect("violations extension missing");
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].index, 3);
}

#[test]
fn certify_validation_detail_carries_the_field_path() {
    let problem = ApiProblem::from(DomainFault::validation("expiration.count", "must be >= 1"));
    assert_eq!(problem.detail, "expiration.count: must be >= 1");
}
