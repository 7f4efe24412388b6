use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockcast_core::{DomainError, DomainResult, IssuanceId};

/// Stock-keeping unit for demand purposes: (category, type, size).
///
/// `size == None` marks an accessory. Empty and whitespace-only sizes are
/// folded into `None` on construction so both spellings compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemKey {
    pub category: String,
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default, deserialize_with = "deserialize_size")]
    pub size: Option<String>,
}

impl ItemKey {
    pub fn new(
        category: impl Into<String>,
        item_type: impl Into<String>,
        size: Option<impl Into<String>>,
    ) -> Self {
        Self {
            category: category.into(),
            item_type: item_type.into(),
            size: normalize_size(size.map(Into::into)),
        }
    }

    /// An item-key with no applicable size.
    pub fn is_accessory(&self) -> bool {
        self.size.is_none()
    }

    /// Whether an issuance belongs to this item-key.
    ///
    /// Category and type match exactly; sizes match after trimming, with
    /// null and empty treated as the same "no size".
    pub fn matches(&self, record: &IssuanceRecord) -> bool {
        let record_size = record.size.as_deref().map(str::trim).filter(|s| !s.is_empty());
        self.category == record.item_category
            && self.item_type == record.item_type
            && self.size.as_deref() == record_size
    }
}

impl core::fmt::Display for ItemKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.size {
            Some(size) => write!(f, "{}/{}/{}", self.category, self.item_type, size),
            None => write!(f, "{}/{}", self.category, self.item_type),
        }
    }
}

/// One issuance of stock to a member, owned by the inventory subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuanceRecord {
    pub id: IssuanceId,
    pub item_category: String,
    pub item_type: String,
    #[serde(default)]
    pub size: Option<String>,
    pub quantity: u32,
    pub occurred_at: DateTime<Utc>,
}

impl IssuanceRecord {
    pub fn new(
        item_category: impl Into<String>,
        item_type: impl Into<String>,
        size: Option<String>,
        quantity: u32,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let item_category = item_category.into();
        let item_type = item_type.into();

        if item_category.trim().is_empty() {
            return Err(DomainError::validation("itemCategory cannot be empty"));
        }
        if item_type.trim().is_empty() {
            return Err(DomainError::validation("itemType cannot be empty"));
        }

        Ok(Self {
            id: IssuanceId::new(),
            item_category,
            item_type,
            size,
            quantity,
            occurred_at,
        })
    }

    pub fn item_key(&self) -> ItemKey {
        ItemKey::new(
            self.item_category.clone(),
            self.item_type.clone(),
            self.size.clone(),
        )
    }
}

/// Fold empty/whitespace sizes into `None` and trim the rest.
pub fn normalize_size(size: Option<String>) -> Option<String> {
    size.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Canonical spelling of a garment letter size.
///
/// Upper-cases and maps the long-hand spellings onto the numeric forms the
/// encoder tables use (`XXL` → `2XL`, `XXXL` → `3XL`). Anything else is
/// returned upper-cased and otherwise untouched.
pub fn normalize_cloth_size(size: &str) -> String {
    let upper = size.trim().to_uppercase();
    match upper.as_str() {
        "XXL" => "2XL".to_string(),
        "XXXL" => "3XL".to_string(),
        _ => upper,
    }
}

fn deserialize_size<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(normalize_size(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap()
    }

    #[test]
    fn empty_size_is_accessory() {
        let key = ItemKey::new("Others", "Belt", Some("  "));
        assert!(key.is_accessory());
        assert_eq!(key, ItemKey::new("Others", "Belt", None::<String>));
    }

    #[test]
    fn matches_treats_null_and_empty_size_alike() {
        let key = ItemKey::new("Others", "Belt", None::<String>);
        let with_empty =
            IssuanceRecord::new("Others", "Belt", Some(String::new()), 1, at(1)).unwrap();
        let with_none = IssuanceRecord::new("Others", "Belt", None, 1, at(1)).unwrap();
        let sized = IssuanceRecord::new("Others", "Belt", Some("M".into()), 1, at(1)).unwrap();

        assert!(key.matches(&with_empty));
        assert!(key.matches(&with_none));
        assert!(!key.matches(&sized));
    }

    #[test]
    fn matches_requires_exact_category_and_type() {
        let key = ItemKey::new("Uniform No 3", "BAJU_NO_3_LELAKI", Some("M"));
        let other_type =
            IssuanceRecord::new("Uniform No 3", "BAJU_NO_4", Some("M".into()), 2, at(2)).unwrap();
        let same =
            IssuanceRecord::new("Uniform No 3", "BAJU_NO_3_LELAKI", Some(" M ".into()), 2, at(2))
                .unwrap();

        assert!(!key.matches(&other_type));
        assert!(key.matches(&same));
    }

    #[test]
    fn new_rejects_blank_category() {
        let err = IssuanceRecord::new(" ", "BOOT", Some("7".into()), 1, at(3)).unwrap_err();
        assert_eq!(err, DomainError::validation("itemCategory cannot be empty"));
    }

    #[test]
    fn cloth_size_aliases_collapse() {
        assert_eq!(normalize_cloth_size("xxl"), "2XL");
        assert_eq!(normalize_cloth_size("XXXL"), "3XL");
        assert_eq!(normalize_cloth_size(" m "), "M");
        assert_eq!(normalize_cloth_size("7 1/4"), "7 1/4");
    }

    #[test]
    fn item_key_deserializes_empty_size_as_none() {
        let key: ItemKey =
            serde_json::from_str(r#"{"category":"Others","type":"Belt","size":""}"#).unwrap();
        assert!(key.is_accessory());
    }
}
