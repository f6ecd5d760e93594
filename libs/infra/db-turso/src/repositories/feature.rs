// [libs/infra/db-turso/src/repositories/feature.rs]
/*!
 * =================================================================
 * APARATO: FEATURE REPOSITORY (V3.0 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: PROYECCIONES NOMBRADAS SOBRE MEDIDORES
 *
 * Una feature archivada permanece visible en el listado pero el
 * conector rechaza nuevas concesiones contra ella.
 * =================================================================
 */

use crate::errors::DbError;
use crate::TursoClient;
use aforo_domain_credit::Feature;
use libsql::{params, Row};
use std::collections::BTreeMap;
use tracing::{debug, instrument};
use uuid::Uuid;

const INSERT_FEATURE: &str = "
    INSERT INTO credit_features (id, namespace, name, meter_slug, meter_group_by_filters, archived)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
";

const SELECT_FEATURE: &str = "
    SELECT id, name, meter_slug, meter_group_by_filters, archived
    FROM credit_features
    WHERE namespace = ?1 AND id = ?2
";

const LIST_FEATURES: &str = "
    SELECT id, name, meter_slug, meter_group_by_filters, archived
    FROM credit_features
    WHERE namespace = ?1
    ORDER BY name ASC, id ASC
";

const ARCHIVE_FEATURE: &str = "
    UPDATE credit_features SET archived = 1 WHERE namespace = ?1 AND id = ?2
";

pub struct FeatureRepository {
    database_client: TursoClient,
}

impl FeatureRepository {
    pub fn new(client: TursoClient) -> Self {
        Self { database_client: client }
    }

    #[instrument(skip(self, feature))]
    pub async fn insert_feature(&self, namespace: &str, feature: &Feature) -> Result<(), DbError> {
        let database_connection = self.database_client.get_connection()?;
        let filters_json = serde_json::to_string(&feature.meter_group_by_filters)
            .map_err(|fault| DbError::MappingError(fault.to_string()))?;

        database_connection
            .execute(
                INSERT_FEATURE,
                params![
                    feature.id.to_string(),
                    namespace,
                    feature.name.clone(),
                    feature.meter_slug.clone(),
                    filters_json,
                    feature.archived as i64
                ],
            )
            .await?;

        debug!("🧩 [FEATURE_LEDGER]: Feature '{}' crystallized in namespace '{}'.", feature.name, namespace);
        Ok(())
    }

    pub async fn get_feature(&self, namespace: &str, feature_id: Uuid) -> Result<Feature, DbError> {
        let database_connection = self.database_client.get_connection()?;
        let mut query_results = database_connection
            .query(SELECT_FEATURE, params![namespace, feature_id.to_string()])
            .await?;

        match query_results.next().await? {
            Some(data_row) => map_row_to_feature(&data_row),
            None => Err(DbError::FeatureNotFound),
        }
    }

    pub async fn list_features(&self, namespace: &str) -> Result<Vec<Feature>, DbError> {
        let database_connection = self.database_client.get_connection()?;
        let mut query_results = database_connection.query(LIST_FEATURES, params![namespace]).await?;

        let mut features = Vec::new();
        while let Some(data_row) = query_results.next().await? {
            features.push(map_row_to_feature(&data_row)?);
        }
        Ok(features)
    }

    /// Archiva la feature y devuelve su estado actualizado.
    #[instrument(skip(self))]
    pub async fn archive_feature(&self, namespace: &str, feature_id: Uuid) -> Result<Feature, DbError> {
        let database_connection = self.database_client.get_connection()?;
        let updated = database_connection
            .execute(ARCHIVE_FEATURE, params![namespace, feature_id.to_string()])
            .await?;
        if updated == 0 {
            return Err(DbError::FeatureNotFound);
        }
        self.get_feature(namespace, feature_id).await
    }
}

fn map_row_to_feature(data_row: &Row) -> Result<Feature, DbError> {
    let raw_id: String = data_row.get(0)?;
    let filters_json: String = data_row.get(3)?;

    let meter_group_by_filters: BTreeMap<String, String> = serde_json::from_str(&filters_json)
        .map_err(|fault| DbError::MappingError(format!("group-by filters rejected: {}", fault)))?;

    Ok(Feature {
        id: Uuid::parse_str(&raw_id).map_err(|fault| DbError::MappingError(fault.to_string()))?,
        name: data_row.get(1)?,
        meter_slug: data_row.get(2)?,
        meter_group_by_filters,
        archived: data_row.get::<i64>(4)? != 0,
    })
}
