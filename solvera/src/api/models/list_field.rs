//! Deserializers for list-valued text fields (benefits, checklists, promo features).
//!
//! Editors paste these from documents, so besides a JSON array of strings a single string with
//! one entry per line is accepted. Entries are trimmed and blank lines dropped either way.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum LinesOrList {
    List(Vec<String>),
    Text(String),
}

impl LinesOrList {
    fn into_entries(self) -> Vec<String> {
        let raw: Vec<String> = match self {
            LinesOrList::List(items) => items,
            LinesOrList::Text(text) => text.lines().map(str::to_string).collect(),
        };
        raw.into_iter()
            .map(|entry| entry.trim().to_string())
            .filter(|entry| !entry.is_empty())
            .collect()
    }
}

/// For required list fields. Use together with `#[serde(default)]` so omission means empty.
pub fn entries<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<LinesOrList>::deserialize(deserializer)?
        .map(LinesOrList::into_entries)
        .unwrap_or_default())
}

/// For patch fields: absent or `null` stays `None` (unchanged).
pub fn optional_entries<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<LinesOrList>::deserialize(deserializer)?.map(LinesOrList::into_entries))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Create {
        #[serde(default, deserialize_with = "super::entries")]
        benefits: Vec<String>,
    }

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "super::optional_entries")]
        benefits: Option<Vec<String>>,
    }

    #[test]
    fn test_accepts_array_and_lines() {
        let from_list: Create = serde_json::from_value(json!({"benefits": [" Fast ", "", "Secure"]})).unwrap();
        assert_eq!(from_list.benefits, vec!["Fast", "Secure"]);

        let from_text: Create = serde_json::from_value(json!({"benefits": "Fast\r\n\n  Secure  \n"})).unwrap();
        assert_eq!(from_text.benefits, vec!["Fast", "Secure"]);

        let omitted: Create = serde_json::from_value(json!({})).unwrap();
        assert!(omitted.benefits.is_empty());
    }

    #[test]
    fn test_patch_distinguishes_absent_from_empty() {
        let absent: Patch = serde_json::from_value(json!({})).unwrap();
        assert_eq!(absent.benefits, None);

        let null: Patch = serde_json::from_value(json!({"benefits": null})).unwrap();
        assert_eq!(null.benefits, None);

        let cleared: Patch = serde_json::from_value(json!({"benefits": []})).unwrap();
        assert_eq!(cleared.benefits, Some(vec![]));
    }

    #[test]
    fn test_rejects_other_shapes() {
        assert!(serde_json::from_value::<Create>(json!({"benefits": 42})).is_err());
    }
}
