// [apps/gateway/src/state.rs]
/*!
 * =================================================================
 * APARATO: SOVEREIGN STATE HUB (V4.0 - GOLD MASTER)
 * CLASIFICACIÓN: APPLICATION STATE (ESTRATO L1-APP)
 * RESPONSABILIDAD: ORQUESTACIÓN DE CONECTORES Y ESTRATEGIAS
 *
 * Contenedor de estado compartido (thread-safe) del gateway. Actúa como
 * la placa base donde se conectan el colector de ingesta, el conector
 * de streaming, el kernel de crédito y la estrategia de portal.
 * =================================================================
 */

use crate::portal::PortalTokenStrategy;
use aforo_domain_credit::CreditConnector;
use aforo_domain_models::registry::MeterRegistry;
use aforo_domain_models::streaming::StreamingConnector;
use aforo_domain_namespace::NamespaceManager;
use aforo_infra_transport::IngestCollector;
use std::sync::Arc;

/// Estado compartido del gateway (clonable por handler).
#[derive(Clone)]
pub struct AppState {
    /// Registro en memoria slug -> medidor (read-only tras el boot).
    pub meter_registry: Arc<MeterRegistry>,

    /// Colector de ingesta (decorado con idempotencia si está activa).
    pub collector: Arc<dyn IngestCollector>,

    /// Conector de streaming hacia el almacén columnar.
    pub streaming: Arc<dyn StreamingConnector>,

    /// Kernel de crédito (ledger persistente o variante 'nope').
    pub credit: Arc<dyn CreditConnector>,

    /// Manager de aprovisionamiento por tenant.
    pub namespaces: Arc<NamespaceManager>,

    /// Estrategia de tokens de portal (ausente si el portal está apagado).
    pub portal: Option<Arc<PortalTokenStrategy>>,

    /// Namespace por defecto decodificado estáticamente para HTTP.
    pub default_namespace: String,
}
