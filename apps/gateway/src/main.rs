// [apps/gateway/src/main.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY MAIN ENTRY POINT (V4.0 - GOLD MASTER)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L3)
 * RESPONSABILIDAD: BOOTSTRAP DE INFRAESTRUCTURA E IGNICIÓN SEGURA
 *
 * # Mathematical Proof (Deterministic Ignition):
 * El proceso garantiza que el aprovisionamiento del namespace por
 * defecto y las materializaciones por medidor ocurran antes que la
 * apertura del socket TCP, previniendo estados de carrera donde un
 * productor publique hacia un topic aún no cristalizado.
 * =================================================================
 */

use aforo_gateway::prelude::*;

use aforo_shared_vigia::init_tracing;
use dotenvy::dotenv;
use tracing::{error, info};

/**
 * Punto de ignición supremo del binario del gateway.
 *
 * Código de salida: 0 en apagado cooperativo; distinto de cero ante
 * cualquier violación de configuración o colapso de ignición.
 */
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. CARGA DE ENTORNO SOBERANO
    dotenv().ok();

    // 2. INICIALIZACIÓN DE OBSERVABILIDAD NEURAL (VIGÍA)
    init_tracing("aforo_gateway");

    // 3. CONFIGURACIÓN DEL RUNTIME SOBERANO
    let runtime_gateway = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime_gateway.block_on(async {
        info!("🛰️  [COMMAND_CENTER]: Metering plane ignition sequence starting...");

        // 4. HIDRATACIÓN Y VALIDACIÓN DE CONFIGURACIÓN
        let configuration = match GatewayConfig::from_environment() {
            Ok(configuration) => configuration,
            Err(configuration_fault) => {
                error!("❌ [BOOT_FAULT]: Configuration rejected: {}", configuration_fault);
                std::process::exit(1);
            }
        };

        // 5. CONSTRUCCIÓN DEL KERNEL SOBERANO (ESTRATO L1-APP)
        let kernel_instance = match GatewayKernel::ignite(configuration).await {
            Ok(kernel_instance) => kernel_instance,
            Err(ignition_fault) => {
                error!("❌ [BOOT_FAULT]: Kernel ignition collapsed: {:#}", ignition_fault);
                std::process::exit(1);
            }
        };

        // 6. IGNICIÓN DE OPERACIONES DEL PLANO DE MEDICIÓN
        if let Err(runtime_fault) = kernel_instance.launch_sovereign_operations().await {
            error!("❌ [RUNTIME_FAULT]: Sovereign operations collapsed: {:#}", runtime_fault);
            std::process::exit(1);
        }

        Ok(())
    })
}
