// [libs/domain/namespace/src/lib.rs]
/*!
 * =================================================================
 * APARATO: NAMESPACE MANAGER (V2.1 - GOLD MASTER)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: ORQUESTACIÓN DE APROVISIONAMIENTO POR TENANT
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. CAPABILITY SET: 'NamespaceHandler' modela {create, delete} como
 *    contrato pequeño; el manager posee una lista heterogénea y hace
 *    fan-out, jamás una jerarquía de clases profunda.
 * 2. IDEMPOTENT CONVERGENCE: Un fallo aborta el fan-out dejando los
 *    recursos ya creados en su lugar; los handlers son idempotentes y
 *    un reintento posterior converge.
 * 3. KILL SWITCH: Con la gestión deshabilitada, la creación es un no-op
 *    exitoso únicamente para el namespace por defecto.
 * =================================================================
 */

use aforo_domain_models::fault::DomainFault;
use aforo_domain_models::meter::validate_identifier;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Conjunto de capacidades de aprovisionamiento por namespace.
///
/// Implementaciones actuales: creador de topics del transporte y creador
/// de tablas del almacén columnar.
#[async_trait]
pub trait NamespaceHandler: Send + Sync {
    /// Nombre nominal del handler para el rastro de trazas.
    fn handler_name(&self) -> &'static str;

    /// Aprovisiona los recursos del namespace. Debe ser idempotente.
    async fn create_namespace(&self, name: &str) -> Result<(), DomainFault>;

    /// Desmantela los recursos del namespace. Debe ser idempotente.
    async fn delete_namespace(&self, name: &str) -> Result<(), DomainFault>;
}

/// Configuración del manager de namespaces.
#[derive(Debug, Clone)]
pub struct NamespaceManagerConfig {
    /// Namespace por defecto, existente desde el boot.
    pub default_namespace: String,

    /// Deshabilita la gestión dinámica de namespaces.
    pub disable_management: bool,
}

/// Composite de handlers con fan-out y aborto en primer fallo.
pub struct NamespaceManager {
    handlers: Vec<Arc<dyn NamespaceHandler>>,
    config: NamespaceManagerConfig,
}

impl NamespaceManager {
    /**
     * Construye el manager validando el nombre del namespace por defecto
     * (se incrusta en nombres de topic y de tabla).
     */
    pub fn new(
        handlers: Vec<Arc<dyn NamespaceHandler>>,
        config: NamespaceManagerConfig,
    ) -> Result<Self, DomainFault> {
        validate_identifier(&config.default_namespace, "namespace.default")?;
        Ok(Self { handlers, config })
    }

    /// Namespace por defecto del despliegue.
    pub fn default_namespace(&self) -> &str {
        &self.config.default_namespace
    }

    /// Aprovisiona el namespace por defecto durante el boot.
    pub async fn create_default_namespace(&self) -> Result<(), DomainFault> {
        self.fan_out_create(&self.config.default_namespace.clone()).await
    }

    /**
     * Crea un namespace haciendo fan-out sobre cada handler.
     *
     * # Logic:
     * Con la gestión deshabilitada, solo el namespace por defecto retorna
     * éxito (no-op); cualquier otro nombre se rechaza. Con gestión activa,
     * el primer fallo aborta dejando lo ya creado en su lugar.
     */
    #[instrument(skip(self))]
    pub async fn create_namespace(&self, name: &str) -> Result<(), DomainFault> {
        validate_identifier(name, "namespace")?;

        if self.config.disable_management {
            if name == self.config.default_namespace {
                return Ok(());
            }
            return Err(DomainFault::NotImplemented(
                "namespace management is disabled on this deployment".to_string(),
            ));
        }

        self.fan_out_create(name).await
    }

    async fn fan_out_create(&self, name: &str) -> Result<(), DomainFault> {
        for handler in &self.handlers {
            if let Err(provisioning_fault) = handler.create_namespace(name).await {
                warn!(
                    "⚠️  [NAMESPACE_FANOUT]: Handler '{}' failed for namespace '{}'. Retry converges.",
                    handler.handler_name(),
                    name
                );
                return Err(provisioning_fault);
            }
        }

        info!("🏷️  [NAMESPACE_READY]: Namespace '{}' provisioned across {} handlers.", name, self.handlers.len());
        Ok(())
    }

    /// Desmantela un namespace sobre cada handler (mismo contrato de aborto).
    #[instrument(skip(self))]
    pub async fn delete_namespace(&self, name: &str) -> Result<(), DomainFault> {
        validate_identifier(name, "namespace")?;

        if self.config.disable_management {
            return Err(DomainFault::NotImplemented(
                "namespace management is disabled on this deployment".to_string(),
            ));
        }

        for handler in &self.handlers {
            handler.delete_namespace(name).await?;
        }
        Ok(())
    }
}
