use serde::{Deserialize, Deserializer};

/// Deserializes a field into `Option<Option<T>>` so partial updates can tell
/// "field absent" (outer `None`, leave unchanged) apart from an explicit
/// `null` (inner `None`, clear the column).
///
/// Use together with `#[serde(default)]` on the field.
pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "super::double_option")]
        notes: Option<Option<String>>,
    }

    #[test]
    fn absent_field_means_unchanged() {
        let p: Patch = serde_json::from_str("{}").unwrap();
        assert!(p.notes.is_none());
    }

    #[test]
    fn explicit_null_means_clear() {
        let p: Patch = serde_json::from_str(r#"{"notes": null}"#).unwrap();
        assert_eq!(p.notes, Some(None));
    }

    #[test]
    fn value_means_set() {
        let p: Patch = serde_json::from_str(r#"{"notes": "after lunch"}"#).unwrap();
        assert_eq!(p.notes, Some(Some("after lunch".to_string())));
    }
}
