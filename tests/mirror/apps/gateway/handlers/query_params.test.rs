// [tests/mirror/apps/gateway/handlers/query_params.test.rs]
/**
 * =================================================================
 * APARATO: QUERY PARAMS GRAMMAR TEST (V1.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L4-MIRROR
 * RESPONSABILIDAD: CERTIFICACIÓN DE LA GRAMÁTICA DE CONSULTA
 * =================================================================
 */

use aforo_domain_models::meter::WindowSize;
use aforo_gateway::handlers::meters::parse_meter_query_params;
use chrono::{TimeZone, Utc};

fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
    raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[test]
fn certify_full_grammar_roundtrip() {
    println!("\n🔤 [PROVING_GROUNDS]: Auditing query parameter grammar...");

    let params = parse_meter_query_params(&pairs(&[
        ("from", "2026-03-01T10:00:00Z"),
        ("to", "2026-03-02T10:00:00+02:00"),
        ("windowSize", "HOUR"),
        ("windowTimeZone", "America/Santiago"),
        ("subject", "customer_1"),
        ("subject", "customer_2"),
        ("groupBy", "model"),
        ("filterGroupBy[model]", "gpt-4"),
    ]))
    .expect("grammar rejected a valid query");

    assert_eq!(params.from, Some(Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap()));
    // Los offsets no-UTC se normalizan a instantes UTC absolutos.
    assert_eq!(params.to, Some(Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap()));
    assert_eq!(params.window_size, Some(WindowSize::Hour));
    assert_eq!(params.window_time_zone, chrono_tz::America::Santiago);
    assert_eq!(params.subjects, vec!["customer_1", "customer_2"]);
    assert_eq!(params.group_by, vec!["model"]);
    assert_eq!(params.filter_group_by.get("model").map(String::as_str), Some("gpt-4"));
}

#[test]
fn certify_naive_timestamps_are_rejected() {
    let refusal = parse_meter_query_params(&pairs(&[("from", "2026-03-01 10:00:00")]));
    assert!(refusal.is_err(), "L4_PARAMS_FAULT: naive timestamp accepted.");
}

#[test]
fn certify_unknown_zone_is_rejected() {
    let refusal = parse_meter_query_params(&pairs(&[("windowTimeZone", "Mars/Olympus")]));
    assert!(refusal.is_err());
}

#[test]
fn certify_empty_filter_key_is_rejected() {
    let refusal = parse_meter_query_params(&pairs(&[("filterGroupBy[]", "gpt-4")]));
    assert!(refusal.is_err());
}

#[test]
fn certify_unknown_parameter_is_rejected() {
    let refusal = parse_meter_query_params(&pairs(&[("limit", "100")]));
    assert!(refusal.is_err(), "L4_PARAMS_FAULT: free-form parameter accepted.");
}

#[test]
fn certify_defaults_are_utc_full_range() {
    let params = parse_meter_query_params(&[]).unwrap();
    assert!(params.from.is_none() && params.to.is_none());
    assert!(params.window_size.is_none());
    assert_eq!(params.window_time_zone, chrono_tz::UTC);
}
