use std::fmt;

use crate::execution::Value;

/// Custom column mapping contract. A codec owns the conversion between one
/// logical value and the column values it is persisted as; the catalog keeps
/// a registry of them by name and `Basic` properties may reference one.
pub trait ScalarCodec: Send + Sync {
    /// Decompose a logical value into column values, one per mapped column.
    fn encode(&self, value: &Value) -> Vec<Value>;

    /// Reassemble the logical value from its column values.
    fn decode(&self, columns: &[Value]) -> Value;

    /// Mutable codecs force dirty-checking by value on the caller's side.
    fn is_mutable(&self) -> bool {
        false
    }
}

impl fmt::Debug for dyn ScalarCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScalarCodec")
    }
}

/// Pass-through codec for single-column values stored as-is.
pub struct IdentityCodec;

impl ScalarCodec for IdentityCodec {
    fn encode(&self, value: &Value) -> Vec<Value> {
        vec![value.clone()]
    }

    fn decode(&self, columns: &[Value]) -> Value {
        columns.first().cloned().unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_codec_round_trips_single_column() {
        let codec = IdentityCodec;
        let encoded = codec.encode(&Value::String("steve".into()));
        assert_eq!(encoded, vec![Value::String("steve".into())]);
        assert_eq!(codec.decode(&encoded), Value::String("steve".into()));
        assert!(!codec.is_mutable());
    }

    #[test]
    fn identity_codec_decodes_missing_column_as_null() {
        assert_eq!(IdentityCodec.decode(&[]), Value::Null);
    }
}
