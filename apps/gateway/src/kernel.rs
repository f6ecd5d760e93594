// [apps/gateway/src/kernel.rs]
/**
 * =================================================================
 * APARATO: GATEWAY SOVEREIGN KERNEL (V4.3 - GUARD ACTIVE)
 * CLASIFICACIÓN: COMPOSITION ROOT (ESTRATO L1-APP)
 * RESPONSABILIDAD: BOOTSTRAP DE INFRAESTRUCTURA E IGNICIÓN SEGURA
 *
 * VISION HIPER-HOLÍSTICA:
 * Actúa como la placa base donde se conectan todos los conectores del
 * plano de medición: transporte de ingesta, almacén columnar, ledger
 * de crédito y estrategia de portal. El aprovisionamiento del
 * namespace por defecto y las materializaciones por medidor ocurren
 * ANTES de abrir el socket TCP.
 * =================================================================
 */

use crate::config::GatewayConfig;
use crate::portal::PortalTokenStrategy;
use crate::routes::create_sovereign_router;
use crate::state::AppState;
use aforo_domain_credit::{CreditConnector, NopeCreditConnector};
use aforo_domain_models::registry::MeterRegistry;
use aforo_domain_models::streaming::StreamingConnector;
use aforo_domain_namespace::{NamespaceHandler, NamespaceManager, NamespaceManagerConfig};
use aforo_infra_columnar::{
    ColumnarConnectorConfig, ColumnarStreamingConnector, HttpColumnarClient, HttpColumnarClientConfig,
};
use aforo_infra_db::{LedgerCreditConnector, LedgerCreditConnectorConfig, TursoClient};
use aforo_infra_transport::{
    DeduplicatingCollector, IngestCollector, MemoryDeduplicator, PartitionedMemoryLog,
    TopicProvisioner, TopicTemplate, TransportCollector,
};
use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, instrument};

pub struct GatewayKernel {
    pub server_address: SocketAddr,
    pub application_shared_state: AppState,
    portal_cors_enabled: bool,
}

impl GatewayKernel {
    /**
     * Realiza la ignición completa de la infraestructura del gateway.
     *
     * # Orden de ignición:
     * 1. Registro de medidores (validación de definiciones y slugs).
     * 2. Enlace columnar y conector de streaming.
     * 3. Plano de transporte + colector (decorado con idempotencia).
     * 4. Fan-out del namespace por defecto y materializaciones.
     * 5. Kernel de crédito (ledger persistente o variante 'nope').
     */
    #[instrument(skip(config))]
    pub async fn ignite(config: GatewayConfig) -> anyhow::Result<Self> {
        // 1. REGISTRO DE MEDIDORES (SSoT de definiciones)
        let meter_registry = Arc::new(
            MeterRegistry::from_definitions(config.meters.clone())
                .context("meter registry ignition rejected")?,
        );
        info!("📐 [REGISTRY]: {} meter definitions levelized.", meter_registry.len());

        // 2. ENLACE COLUMNAR Y CONECTOR DE STREAMING
        let columnar_executor = Arc::new(
            HttpColumnarClient::new(HttpColumnarClientConfig {
                address: config.aggregation.address.clone(),
                database: config.aggregation.database.clone(),
                username: config.aggregation.username.clone(),
                password: config.aggregation.password.clone(),
                tls: config.aggregation.tls,
                max_idle_connections: 5,
            })
            .context("columnar uplink ignition failed")?,
        );
        let streaming_connector = Arc::new(ColumnarStreamingConnector::new(
            columnar_executor,
            meter_registry.clone(),
            ColumnarConnectorConfig {
                database: config.aggregation.database.clone(),
                kafka_broker: config.ingest.kafka_broker.clone(),
                events_topic_template: config.ingest.events_topic_template.clone(),
                create_policy: config.aggregation.create_or_replace_meter,
                populate_meter: config.aggregation.populate_meter,
            },
        ));

        // 3. PLANO DE TRANSPORTE Y COLECTOR DE INGESTA
        let transport_log = Arc::new(PartitionedMemoryLog::new());
        let topic_template = TopicTemplate::new(config.ingest.events_topic_template.clone())
            .context("events topic template rejected")?;

        let base_collector: Arc<dyn IngestCollector> = Arc::new(TransportCollector::new(
            transport_log.clone(),
            topic_template.clone(),
        ));
        let collector: Arc<dyn IngestCollector> = if config.dedupe.enabled {
            info!("♻️  [DEDUPE]: Idempotency stratum ACTIVE (driver '{}').", config.dedupe.driver);
            Arc::new(DeduplicatingCollector::new(
                base_collector,
                Arc::new(MemoryDeduplicator::new(config.dedupe.ttl)),
            ))
        } else {
            base_collector
        };

        // 4. NAMESPACE MANAGER: FAN-OUT DE APROVISIONAMIENTO
        let topic_provisioner = Arc::new(TopicProvisioner::new(
            transport_log.clone(),
            topic_template,
            config.ingest.partitions,
        ));
        let namespace_handlers: Vec<Arc<dyn NamespaceHandler>> = vec![
            topic_provisioner,
            streaming_connector.clone() as Arc<dyn NamespaceHandler>,
        ];
        let namespace_manager = Arc::new(
            NamespaceManager::new(
                namespace_handlers,
                NamespaceManagerConfig {
                    default_namespace: config.namespace.default_namespace.clone(),
                    disable_management: config.namespace.disable_management,
                },
            )
            .context("namespace manager ignition rejected")?,
        );
        namespace_manager
            .create_default_namespace()
            .await
            .context("default namespace provisioning collapsed")?;

        // Materializaciones por medidor según la política de creación.
        for meter in meter_registry.list() {
            streaming_connector
                .create_meter(namespace_manager.default_namespace(), meter)
                .await
                .with_context(|| format!("meter '{}' materialisation failed", meter.slug))?;
        }
        info!("📏 [METERS]: {} materialisations levelized.", meter_registry.len());

        // 5. KERNEL DE CRÉDITO (Ledger o variante 'nope')
        let credit_connector: Arc<dyn CreditConnector> = if config.entitlements_enabled {
            let ledger_client = TursoClient::connect(&config.ledger_url, config.ledger_auth_token.clone())
                .await
                .context("credit ledger uplink collapsed")?;
            info!("💳 [CREDIT]: Entitlements support ENABLED.");
            Arc::new(LedgerCreditConnector::new(
                ledger_client,
                streaming_connector.clone() as Arc<dyn StreamingConnector>,
                meter_registry.clone(),
                LedgerCreditConnectorConfig::default(),
            ))
        } else {
            info!("💤 [CREDIT]: Entitlements support disabled (nope connector).");
            Arc::new(NopeCreditConnector::new())
        };

        // 6. ESTRATEGIA DE PORTAL (opcional)
        let portal_strategy = if config.portal.enabled {
            Some(Arc::new(
                PortalTokenStrategy::new(&config.portal.token_secret, config.portal.token_expiration)
                    .context("portal token strategy rejected")?,
            ))
        } else {
            None
        };

        info!(
            "🛰️  [TELEMETRY]: Collaborating collector expected at {}.",
            config.telemetry_address
        );

        Ok(Self {
            server_address: config.address,
            application_shared_state: AppState {
                meter_registry,
                collector,
                streaming: streaming_connector as Arc<dyn StreamingConnector>,
                credit: credit_connector,
                namespaces: namespace_manager,
                portal: portal_strategy,
                default_namespace: config.namespace.default_namespace,
            },
            portal_cors_enabled: config.portal.cors_enabled,
        })
    }

    /**
     * Levanta el servidor axum con apagado cooperativo (SIGINT/SIGTERM).
     */
    pub async fn launch_sovereign_operations(self) -> anyhow::Result<()> {
        let router = create_sovereign_router(self.application_shared_state, self.portal_cors_enabled);

        let listener = tokio::net::TcpListener::bind(self.server_address)
            .await
            .with_context(|| format!("socket bind rejected on {}", self.server_address))?;

        info!("🚀 [AFORO_ONLINE]: Metering plane operational on {}.", self.server_address);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("server collapsed")?;

        info!("🛑 [AFORO_OFFLINE]: Graceful shutdown sealed.");
        Ok(())
    }
}

/// Señal de apagado cooperativo: SIGINT (Ctrl-C) o SIGTERM.
async fn shutdown_signal() {
    let interrupt = async {
        tokio::signal::ctrl_c().await.expect("SIGINT handler installation failed");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation failed")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => info!("📡 [SIGNAL]: SIGINT received; draining."),
        _ = terminate => info!("📡 [SIGNAL]: SIGTERM received; draining."),
    }
}
