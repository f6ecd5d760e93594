// [libs/infra/transport/src/serializer.rs]
/*!
 * =================================================================
 * APARATO: CANONICAL WIRE SERIALIZER (V1.2 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: SERIALIZACIÓN JSON DETERMINISTA DEL SOBRE
 *
 * # Mathematical Proof (Byte Determinism):
 * Los campos del sobre serializan en orden de declaración y los objetos
 * JSON anidados se reordenan recursivamente por clave. Dos sobres
 * estructuralmente iguales producen exactamente los mismos bytes, lo
 * que habilita digests estables aguas abajo.
 * =================================================================
 */

use crate::errors::TransportError;
use aforo_domain_models::event::IngestedEvent;
use serde_json::Value;

/// Serializa el sobre a JSON canónico (claves de objeto ordenadas).
pub fn to_canonical_json(event: &IngestedEvent) -> Result<Vec<u8>, TransportError> {
    let mut tree = serde_json::to_value(event)
        .map_err(|serialization_fault| TransportError::Serialization(serialization_fault.to_string()))?;
    sort_object_keys(&mut tree);
    serde_json::to_vec(&tree)
        .map_err(|serialization_fault| TransportError::Serialization(serialization_fault.to_string()))
}

/// Reordena recursivamente las claves de todo objeto anidado.
fn sort_object_keys(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = std::mem::take(map).into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            for (_, entry) in entries.iter_mut() {
                sort_object_keys(entry);
            }
            *map = entries.into_iter().collect();
        }
        Value::Array(items) => {
            for item in items {
                sort_object_keys(item);
            }
        }
        _ => {}
    }
}
