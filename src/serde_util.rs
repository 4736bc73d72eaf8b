use serde::{Deserialize, Deserializer};

/// Distinguishes an absent JSON field from an explicit `null`.
///
/// Pair with `#[serde(default, deserialize_with = "deserialize_some")]` on an
/// `Option<Option<T>>` field: absent stays `None`, `null` becomes
/// `Some(None)`, and a value becomes `Some(Some(v))`. Update handlers use
/// this to tell "leave unchanged" apart from "clear the field".
pub fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "deserialize_some")]
        category_id: Option<Option<i64>>,
    }

    #[test]
    fn absent_field_is_none() {
        let patch: Patch = serde_json::from_str("{}").expect("parse");
        assert_eq!(patch.category_id, None);
    }

    #[test]
    fn explicit_null_is_some_none() {
        let patch: Patch = serde_json::from_str(r#"{"category_id": null}"#).expect("parse");
        assert_eq!(patch.category_id, Some(None));
    }

    #[test]
    fn value_is_some_some() {
        let patch: Patch = serde_json::from_str(r#"{"category_id": 7}"#).expect("parse");
        assert_eq!(patch.category_id, Some(Some(7)));
    }
}
