// [apps/gateway/src/lib.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY LIBRARY ROOT (V4.0 - GOLD MASTER)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L4)
 * RESPONSABILIDAD: EXPOSICIÓN NOMINAL DE MÓDULOS DEL GATEWAY
 * =================================================================
 */

pub mod config;
pub mod handlers;
pub mod kernel;
pub mod middleware;
pub mod portal;
pub mod problem;
pub mod routes;
pub mod state;

/// Preludio nominal para el binario y el Proving Grounds.
pub mod prelude {
    pub use crate::config::GatewayConfig;
    pub use crate::kernel::GatewayKernel;
    pub use crate::portal::PortalTokenStrategy;
    pub use crate::routes::create_sovereign_router;
    pub use crate::state::AppState;
}
