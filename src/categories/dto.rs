use serde::Deserialize;

use crate::serde_util::deserialize_some;

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// `name` keeps its current value when omitted; `description` is tri-state
/// (absent keeps, explicit null clears).
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_description_is_tri_state() {
        let keep: UpdateCategoryRequest = serde_json::from_str(r#"{"name": "rust"}"#).expect("parse");
        assert_eq!(keep.description, None);

        let clear: UpdateCategoryRequest =
            serde_json::from_str(r#"{"description": null}"#).expect("parse");
        assert_eq!(clear.description, Some(None));

        let set: UpdateCategoryRequest =
            serde_json::from_str(r#"{"description": "systems things"}"#).expect("parse");
        assert_eq!(set.description, Some(Some("systems things".into())));
    }
}
