// [apps/gateway/src/portal.rs]
/*!
 * =================================================================
 * APARATO: PORTAL TOKEN STRATEGY (V2.2 - GOLD MASTER)
 * CLASIFICACIÓN: SECURITY STRATUM (ESTRATO L4)
 * RESPONSABILIDAD: FIRMA Y VERIFICACIÓN DE TOKENS DE PORTAL
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. SYMMETRIC SHORT-LIVED: HS256 con secreto del despliegue y
 *    expiración acotada; el token es opaco para el consumidor.
 * 2. SCOPED SUBJECT: El token acarrea el sujeto autenticado y una
 *    allow-list opcional de slugs de medidor.
 * 3. HOSTED-ONLY SURFACE: Listado e invalidación de tokens retornan
 *    NOT_IMPLEMENTED en despliegues autogestionados.
 * =================================================================
 */

use aforo_domain_models::fault::DomainFault;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims firmados en el token de portal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalClaims {
    /// Sujeto autenticado (cuenta medida).
    pub sub: String,
    /// Expiración unix (validada en la verificación).
    pub exp: i64,
    /// Allow-list opcional de slugs de medidor consultables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meters: Option<Vec<String>>,
}

impl PortalClaims {
    /// Autoriza la consulta de un medidor contra la allow-list del token.
    pub fn authorize_meter(&self, meter_slug: &str) -> Result<(), DomainFault> {
        match &self.meters {
            Some(allowed) if !allowed.iter().any(|slug| slug == meter_slug) => Err(
                DomainFault::Unauthorized(format!("meter '{}' is outside the token scope", meter_slug)),
            ),
            _ => Ok(()),
        }
    }
}

/// Token de portal emitido hacia el consumidor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalToken {
    pub token: String,
    pub subject: String,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_meter_slugs: Option<Vec<String>>,
}

/// Estrategia simétrica de firma de tokens de portal.
pub struct PortalTokenStrategy {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiration: Duration,
}

impl PortalTokenStrategy {
    pub fn new(token_secret: &str, token_expiration: Duration) -> Result<Self, DomainFault> {
        if token_secret.trim().is_empty() {
            return Err(DomainFault::validation("portal.tokenSecret", "must not be empty"));
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(token_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(token_secret.as_bytes()),
            token_expiration,
        })
    }

    /// Firma un token de portal para el sujeto con alcance opcional.
    pub fn mint(
        &self,
        subject: &str,
        allowed_meter_slugs: Option<Vec<String>>,
    ) -> Result<PortalToken, DomainFault> {
        if subject.trim().is_empty() {
            return Err(DomainFault::validation("subject", "must not be empty"));
        }

        let expires_at = Utc::now() + self.token_expiration;
        let claims = PortalClaims {
            sub: subject.to_string(),
            exp: expires_at.timestamp(),
            meters: allowed_meter_slugs.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|signing_fault| DomainFault::Internal(signing_fault.to_string()))?;

        Ok(PortalToken {
            token,
            subject: subject.to_string(),
            expires_at,
            allowed_meter_slugs,
        })
    }

    /// Verifica un token y devuelve el sujeto autenticado.
    pub fn verify(&self, raw_token: &str) -> Result<PortalClaims, DomainFault> {
        decode::<PortalClaims>(raw_token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|verification_fault| {
                DomainFault::Unauthorized(format!("portal token rejected: {}", verification_fault))
            })
    }
}
