// [libs/infra/columnar/src/executor.rs]
/*!
 * =================================================================
 * APARATO: COLUMNAR HTTP EXECUTOR (V2.4 - GOLD MASTER)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: EJECUCIÓN DE SENTENCIAS SOBRE EL ALMACÉN COLUMNAR
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. EXECUTOR PORT: El planner emite SQL; este puerto lo ejecuta. Los
 *    tests inyectan ejecutores sintéticos sin tocar la red.
 * 2. HTTP WIRE: El adaptador de producción habla la interfaz HTTP del
 *    almacén (POST de sentencia, filas en JSONEachRow).
 * 3. POOLED LINK: Cliente compartido por proceso con pool de conexiones
 *    y timeouts acotados.
 * =================================================================
 */

use crate::errors::ColumnarError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, instrument};

/// Puerto de ejecución de sentencias columnar.
#[async_trait]
pub trait ColumnarExecutor: Send + Sync {
    /// Ejecuta una sentencia sin filas de resultado (DDL, INSERT SELECT).
    async fn execute(&self, sql: &str) -> Result<(), ColumnarError>;

    /// Ejecuta una consulta y devuelve sus filas como objetos JSON.
    async fn query(&self, sql: &str) -> Result<Vec<Map<String, Value>>, ColumnarError>;
}

/// Configuración del enlace HTTP con el almacén columnar.
#[derive(Debug, Clone)]
pub struct HttpColumnarClientConfig {
    /// Host y puerto de la interfaz HTTP (p.ej. "localhost:8123").
    pub address: String,
    pub database: String,
    pub username: String,
    pub password: String,
    pub tls: bool,
    /// Conexiones ociosas máximas retenidas en el pool.
    pub max_idle_connections: usize,
}

impl Default for HttpColumnarClientConfig {
    fn default() -> Self {
        Self {
            address: "localhost:8123".to_string(),
            database: "metering".to_string(),
            username: "default".to_string(),
            password: String::new(),
            tls: false,
            max_idle_connections: 5,
        }
    }
}

/// Cliente HTTP soberano hacia el almacén columnar.
pub struct HttpColumnarClient {
    network_session_client: reqwest::Client,
    statement_endpoint: String,
    username: String,
    password: String,
}

impl HttpColumnarClient {
    pub fn new(config: HttpColumnarClientConfig) -> Result<Self, ColumnarError> {
        let scheme = if config.tls { "https" } else { "http" };
        let statement_endpoint = format!(
            "{}://{}/?database={}",
            scheme, config.address, config.database
        );

        let network_session_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(config.max_idle_connections)
            .pool_idle_timeout(Duration::from_secs(600))
            .build()
            .map_err(|client_fault| ColumnarError::Unavailable(client_fault.to_string()))?;

        Ok(Self {
            network_session_client,
            statement_endpoint,
            username: config.username,
            password: config.password,
        })
    }

    async fn post_statement(&self, sql: String) -> Result<String, ColumnarError> {
        let response = self
            .network_session_client
            .post(&self.statement_endpoint)
            .basic_auth(&self.username, Some(&self.password))
            .body(sql)
            .send()
            .await
            .map_err(|network_fault| ColumnarError::Unavailable(network_fault.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|network_fault| ColumnarError::Unavailable(network_fault.to_string()))?;

        if !status.is_success() {
            return Err(ColumnarError::Statement { status: status.as_u16(), detail: body });
        }
        Ok(body)
    }
}

#[async_trait]
impl ColumnarExecutor for HttpColumnarClient {
    #[instrument(skip(self, sql))]
    async fn execute(&self, sql: &str) -> Result<(), ColumnarError> {
        debug!("🧱 [COLUMNAR_DDL]: Executing statement ({} bytes).", sql.len());
        self.post_statement(sql.to_string()).await.map(|_| ())
    }

    #[instrument(skip(self, sql))]
    async fn query(&self, sql: &str) -> Result<Vec<Map<String, Value>>, ColumnarError> {
        let body = self
            .post_statement(format!("{} FORMAT JSONEachRow", sql))
            .await?;

        let mut rows = Vec::new();
        for line in body.lines().filter(|line| !line.trim().is_empty()) {
            let row: Map<String, Value> = serde_json::from_str(line)
                .map_err(|decode_fault| ColumnarError::Decode(decode_fault.to_string()))?;
            rows.push(row);
        }
        Ok(rows)
    }
}
