// [tests/mirror/libs/shared/vigia/vigia_integrity.test.rs]
/**
 * =================================================================
 * APARATO: VIGÍA INTEGRITY TEST (V1.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L6-MIRROR
 * RESPONSABILIDAD: CERTIFICACIÓN DE LA IGNICIÓN DE OBSERVABILIDAD
 * =================================================================
 */

use aforo_shared_vigia::init_tracing;

#[test]
fn certify_tracing_ignition_and_panic_shield_installation() {
    println!("\n👁️  [PROVING_GROUNDS]: Auditing Vigía ignition...");

    // La ignición instala el suscriptor global y el Phoenix Shield sin
    // colapsar el proceso anfitrión.
    init_tracing("aforo_proving_grounds");

    // El hook de pánico instalado captura y traza sin re-entrar.
    let captured = std::panic::catch_unwind(|| {
        panic!("controlled collapse for the panic shield");
    });
    assert!(captured.is_err(), "L6_VIGIA_FAULT: controlled panic not observed.");
}
