// [apps/gateway/src/config.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY CONFIGURATION SURFACE (V4.1 - GOLD MASTER)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L4)
 * RESPONSABILIDAD: HIDRATACIÓN Y VALIDACIÓN DEL ENTORNO SOBERANO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. ENV-DRIVEN: Variables 'AFORO_*' hidratadas vía dotenvy; el
 *    manifiesto de medidores llega como archivo JSON declarativo.
 * 2. FAIL AT BOOT: Toda violación de configuración colapsa la ignición
 *    con código de salida distinto de cero, jamás un estado parcial.
 * =================================================================
 */

use aforo_domain_models::fault::DomainFault;
use aforo_domain_models::meter::Meter;
use aforo_domain_models::streaming::MeterCreatePolicy;
use chrono::Duration;
use std::env;
use std::net::SocketAddr;

/// Configuración del plano de ingesta (transporte de eventos).
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub kafka_broker: String,
    pub events_topic_template: String,
    pub partitions: u32,
}

/// Configuración del plano de agregación columnar.
#[derive(Debug, Clone)]
pub struct AggregationConfig {
    pub address: String,
    pub database: String,
    pub username: String,
    pub password: String,
    pub tls: bool,
    pub create_or_replace_meter: MeterCreatePolicy,
    pub populate_meter: bool,
}

/// Configuración de la capa de idempotencia.
#[derive(Debug, Clone)]
pub struct DedupeConfig {
    pub enabled: bool,
    pub driver: String,
    pub ttl: Duration,
}

/// Configuración del estrato de namespaces.
#[derive(Debug, Clone)]
pub struct NamespaceConfig {
    pub default_namespace: String,
    pub disable_management: bool,
}

/// Configuración del portal de consumidores.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub enabled: bool,
    pub token_secret: String,
    pub token_expiration: Duration,
    pub cors_enabled: bool,
}

/// Configuración completa del gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub address: SocketAddr,
    /// Dirección del colector de telemetría colaborador (fuera del kernel).
    pub telemetry_address: SocketAddr,
    pub ingest: IngestConfig,
    pub aggregation: AggregationConfig,
    pub dedupe: DedupeConfig,
    pub namespace: NamespaceConfig,
    pub portal: PortalConfig,
    pub entitlements_enabled: bool,
    /// URL del ledger de crédito (Motor A).
    pub ledger_url: String,
    pub ledger_auth_token: Option<String>,
    pub meters: Vec<Meter>,
}

fn env_or(key: &str, fallback: &str) -> String {
    env::var(key).unwrap_or_else(|_| fallback.to_string())
}

fn env_flag(key: &str) -> bool {
    matches!(env::var(key).as_deref(), Ok("1") | Ok("true") | Ok("TRUE") | Ok("yes"))
}

fn parse_address(key: &str, raw: &str) -> Result<SocketAddr, DomainFault> {
    raw.parse::<SocketAddr>()
        .map_err(|_| DomainFault::validation(key, "must be a host:port socket address"))
}

impl GatewayConfig {
    /**
     * Hidrata la configuración completa desde el entorno del proceso.
     *
     * # Errors:
     * Retorna la primera violación con su ruta de campo; el binario la
     * traduce a un colapso de ignición con salida no-cero.
     */
    pub fn from_environment() -> Result<Self, DomainFault> {
        let address = parse_address("address", &env_or("AFORO_ADDRESS", "0.0.0.0:8888"))?;
        let telemetry_address =
            parse_address("telemetry.address", &env_or("AFORO_TELEMETRY_ADDRESS", "127.0.0.1:10000"))?;

        let ingest = IngestConfig {
            kafka_broker: env_or("AFORO_INGEST_KAFKA_BROKER", "127.0.0.1:9092"),
            events_topic_template: env_or("AFORO_INGEST_EVENTS_TOPIC_TEMPLATE", "om_{namespace}_events"),
            partitions: env_or("AFORO_INGEST_KAFKA_PARTITIONS", "1")
                .parse()
                .map_err(|_| DomainFault::validation("ingest.kafka.partitions", "must be a positive integer"))?,
        };
        if !ingest.events_topic_template.contains("{namespace}") {
            return Err(DomainFault::validation(
                "ingest.kafka.eventsTopicTemplate",
                "must contain the '{namespace}' placeholder",
            ));
        }
        if ingest.partitions == 0 {
            return Err(DomainFault::validation("ingest.kafka.partitions", "must be >= 1"));
        }

        let create_or_replace_meter = match env_or("AFORO_CLICKHOUSE_CREATE_OR_REPLACE_METER", "create-if-missing").as_str() {
            "never" => MeterCreatePolicy::Never,
            "create-if-missing" => MeterCreatePolicy::CreateIfMissing,
            "replace" => MeterCreatePolicy::Replace,
            _ => {
                return Err(DomainFault::validation(
                    "aggregation.clickhouse.createOrReplaceMeter",
                    "must be one of never | create-if-missing | replace",
                ))
            }
        };

        let aggregation = AggregationConfig {
            address: env_or("AFORO_CLICKHOUSE_ADDRESS", "127.0.0.1:8123"),
            database: env_or("AFORO_CLICKHOUSE_DATABASE", "aforo"),
            username: env_or("AFORO_CLICKHOUSE_USERNAME", "default"),
            password: env_or("AFORO_CLICKHOUSE_PASSWORD", ""),
            tls: env_flag("AFORO_CLICKHOUSE_TLS"),
            create_or_replace_meter,
            populate_meter: env_flag("AFORO_CLICKHOUSE_POPULATE_METER"),
        };

        let dedupe = DedupeConfig {
            enabled: env_flag("AFORO_DEDUPE_ENABLED"),
            driver: env_or("AFORO_DEDUPE_DRIVER", "memory"),
            ttl: Duration::hours(
                env_or("AFORO_DEDUPE_TTL_HOURS", "24")
                    .parse()
                    .map_err(|_| DomainFault::validation("dedupe.ttl", "must be a positive integer of hours"))?,
            ),
        };
        if dedupe.enabled && dedupe.driver != "memory" {
            return Err(DomainFault::validation(
                "dedupe.driver",
                "only the 'memory' driver ships with this build; external stores are collaborator-provided",
            ));
        }

        let namespace = NamespaceConfig {
            default_namespace: env_or("AFORO_NAMESPACE_DEFAULT", "default"),
            disable_management: env_flag("AFORO_NAMESPACE_DISABLE_MANAGEMENT"),
        };

        let portal = PortalConfig {
            enabled: env_flag("AFORO_PORTAL_ENABLED"),
            token_secret: env_or("AFORO_PORTAL_TOKEN_SECRET", ""),
            token_expiration: Duration::minutes(
                env_or("AFORO_PORTAL_TOKEN_EXPIRATION_MINUTES", "60")
                    .parse()
                    .map_err(|_| DomainFault::validation("portal.tokenExpiration", "must be minutes >= 1"))?,
            ),
            cors_enabled: env_flag("AFORO_PORTAL_CORS_ENABLED"),
        };
        if portal.enabled && portal.token_secret.trim().is_empty() {
            return Err(DomainFault::validation(
                "portal.tokenSecret",
                "required when the portal is enabled",
            ));
        }

        let meters = load_meters_manifest()?;

        Ok(Self {
            address,
            telemetry_address,
            ingest,
            aggregation,
            dedupe,
            namespace,
            portal,
            entitlements_enabled: env_flag("AFORO_ENTITLEMENTS_ENABLED"),
            ledger_url: env_or("AFORO_DATABASE_URL", "file:aforo_ledger.db"),
            ledger_auth_token: env::var("AFORO_DATABASE_AUTH_TOKEN").ok(),
            meters,
        })
    }
}

/// Carga el manifiesto declarativo de medidores (JSON) si fue provisto.
fn load_meters_manifest() -> Result<Vec<Meter>, DomainFault> {
    let Ok(manifest_path) = env::var("AFORO_METERS_MANIFEST") else {
        return Ok(Vec::new());
    };

    let raw_manifest = std::fs::read_to_string(&manifest_path).map_err(|read_fault| {
        DomainFault::validation(
            "meters",
            format!("manifest '{}' unreadable: {}", manifest_path, read_fault),
        )
    })?;

    serde_json::from_str::<Vec<Meter>>(&raw_manifest).map_err(|decode_fault| {
        DomainFault::validation("meters", format!("manifest rejected: {}", decode_fault))
    })
}
