//! Categorical encodings shared with the offline training workflow.
//!
//! Every mapping here is total: unmapped input yields a sentinel, never an
//! error. Codes must stay byte-for-byte identical to what the training
//! notebook produced, so tables are only ever appended to.

use std::sync::LazyLock;

use regex::Regex;

use stockcast_inventory::normalize_cloth_size;

/// Sentinel for categories and sizes with no known code.
pub const UNKNOWN_CODE: i32 = -1;

const CATEGORY_CODES: &[(&str, i32)] = &[
    ("Uniform No 3", 0),
    ("Uniform No 4", 1),
    ("T-Shirt", 2),
    ("T Shirt", 2),
    ("TShirt", 2),
    ("Others", UNKNOWN_CODE),
];

/// Known item types, in training order.
///
/// The first five are the current canonical names. The rest are names found
/// on older stored records; they keep their own indices (including `BERET`,
/// which can never be reached past `Beret` under case-insensitive lookup) so
/// historical encodings do not shift.
pub const ITEM_TYPES: &[&str] = &[
    "BAJU_NO_3_LELAKI",
    "BAJU_NO_3_PEREMPUAN",
    "BAJU_NO_4",
    "BOOT",
    "PVC Shoes",
    "Cloth No 3",
    "Cloth No 4",
    "Trousers No 3",
    "Trousers No 4",
    "Hat",
    "Beret",
    "Shoes",
    "Belt",
    "Socks",
    "Shirt",
    "Jacket",
    "BERET",
];

/// Letter sizes; the code is the index.
const LETTER_SIZES: &[&str] = &["XS", "S", "M", "L", "XL", "2XL", "3XL", "4XL", "5XL"];

/// Numeric shoe sizes occupy a contiguous band after the letter sizes.
const SHOE_SIZE_MIN: u32 = 4;
const SHOE_SIZE_MAX: u32 = 15;
const SHOE_BAND_OFFSET: i32 = 10;

/// Fractional headwear sizes (berets, caps).
const HEADWEAR_SIZES: &[(&str, i32)] = &[
    ("6 1/2", 30),
    ("6 5/8", 31),
    ("6 3/4", 32),
    ("6 7/8", 33),
    ("7 1/8", 34),
    ("7 1/4", 35),
    ("7 3/8", 36),
    ("7 1/2", 37),
    ("7 5/8", 38),
    ("7 3/4", 39),
    ("7 7/8", 40),
];

static YEAR_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{4}").expect("static year pattern is valid"));

/// Item category → code. Unknown categories map to [`UNKNOWN_CODE`].
pub fn encode_category(category: &str) -> i32 {
    CATEGORY_CODES
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, code)| *code)
        .unwrap_or(UNKNOWN_CODE)
}

/// Item type → index into [`ITEM_TYPES`] (case-insensitive, first match).
///
/// Unmatched types encode as `ITEM_TYPES.len()`, one past the end.
pub fn encode_type(item_type: &str) -> i32 {
    let needle = item_type.trim();
    let idx = ITEM_TYPES
        .iter()
        .position(|name| name.eq_ignore_ascii_case(needle))
        .unwrap_or(ITEM_TYPES.len());
    idx as i32
}

/// Size → code.
///
/// - missing or blank: accessory, [`UNKNOWN_CODE`]
/// - letter sizes `XS..5XL`: 0..=8
/// - whole shoe sizes 4..=15: `10 + (n - 4)`
/// - fractional headwear sizes (`"7 1/4"`): dedicated band from 30
/// - anything else: [`UNKNOWN_CODE`]
pub fn encode_size(size: Option<&str>) -> i32 {
    let Some(raw) = size.map(str::trim).filter(|s| !s.is_empty()) else {
        return UNKNOWN_CODE;
    };

    if raw.contains('/') {
        let canonical = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        return HEADWEAR_SIZES
            .iter()
            .find(|(name, _)| *name == canonical)
            .map(|(_, code)| *code)
            .unwrap_or(UNKNOWN_CODE);
    }

    let letter = normalize_cloth_size(raw);
    if let Some(idx) = LETTER_SIZES.iter().position(|s| *s == letter) {
        return idx as i32;
    }

    if raw.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(n) = raw.parse::<u32>() {
            if (SHOE_SIZE_MIN..=SHOE_SIZE_MAX).contains(&n) {
                return SHOE_BAND_OFFSET + (n - SHOE_SIZE_MIN) as i32;
            }
        }
    }

    UNKNOWN_CODE
}

/// Batch label → intake year.
///
/// Takes the first run of four digits (`"Batch 2023/B"` → 2023). Labels
/// without one, and missing labels, fall back to `fallback_year`.
pub fn encode_batch(batch: Option<&str>, fallback_year: i32) -> i32 {
    batch
        .and_then(|label| YEAR_RUN.find(label))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(fallback_year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn category_aliases_share_a_code() {
        assert_eq!(encode_category("T-Shirt"), 2);
        assert_eq!(encode_category("T Shirt"), 2);
        assert_eq!(encode_category("TShirt"), 2);
        assert_eq!(encode_category("Uniform No 4"), 1);
    }

    #[test]
    fn unknown_category_is_sentinel() {
        assert_eq!(encode_category("Others"), UNKNOWN_CODE);
        assert_eq!(encode_category("uniform no 3"), UNKNOWN_CODE);
        assert_eq!(encode_category(""), UNKNOWN_CODE);
    }

    #[test]
    fn type_lookup_is_case_insensitive() {
        assert_eq!(encode_type("baju_no_4"), 2);
        assert_eq!(encode_type("pvc shoes"), 4);
    }

    #[test]
    fn deprecated_types_keep_their_own_index() {
        assert_eq!(encode_type("Cloth No 3"), 5);
        assert_eq!(encode_type("Jacket"), 15);
        // Case-insensitive first match lands on `Beret`, never on `BERET`.
        assert_eq!(encode_type("BERET"), 10);
    }

    #[test]
    fn unknown_type_is_one_past_the_end() {
        assert_eq!(encode_type("Raincoat"), ITEM_TYPES.len() as i32);
        assert_eq!(encode_type("Raincoat"), 17);
    }

    #[test]
    fn letter_sizes_are_unique_and_dense() {
        let codes: Vec<i32> = LETTER_SIZES.iter().map(|s| encode_size(Some(*s))).collect();
        assert_eq!(codes, (0..=8).collect::<Vec<_>>());
    }

    #[test]
    fn accessory_sizes_are_sentinel() {
        assert_eq!(encode_size(None), UNKNOWN_CODE);
        assert_eq!(encode_size(Some("")), UNKNOWN_CODE);
        assert_eq!(encode_size(Some("   ")), UNKNOWN_CODE);
    }

    #[test]
    fn letter_size_aliases_and_case() {
        assert_eq!(encode_size(Some("XXL")), encode_size(Some("2XL")));
        assert_eq!(encode_size(Some("xxxl")), 6);
        assert_eq!(encode_size(Some("m")), 2);
    }

    #[test]
    fn headwear_sizes() {
        assert_eq!(encode_size(Some("6 1/2")), 30);
        assert_eq!(encode_size(Some("7  1/4")), 35);
        assert_eq!(encode_size(Some("9 1/2")), UNKNOWN_CODE);
    }

    #[test]
    fn non_integer_numbers_are_sentinel() {
        assert_eq!(encode_size(Some("7.5")), UNKNOWN_CODE);
        assert_eq!(encode_size(Some("-5")), UNKNOWN_CODE);
        assert_eq!(encode_size(Some("ONE SIZE")), UNKNOWN_CODE);
    }

    #[test]
    fn batch_takes_first_four_digit_run() {
        assert_eq!(encode_batch(Some("Batch 2023"), 1999), 2023);
        assert_eq!(encode_batch(Some("B12-2021-2022"), 1999), 2021);
        assert_eq!(encode_batch(Some("intake-123"), 1999), 1999);
        assert_eq!(encode_batch(None, 2026), 2026);
    }

    proptest! {
        #[test]
        fn shoe_sizes_map_into_band(n in 4u32..=15) {
            prop_assert_eq!(encode_size(Some(&n.to_string())), 10 + (n as i32 - 4));
        }

        #[test]
        fn numbers_outside_shoe_range_are_sentinel(n in prop_oneof![0u32..4, 16u32..10_000]) {
            prop_assert_eq!(encode_size(Some(&n.to_string())), UNKNOWN_CODE);
        }

        #[test]
        fn type_codes_stay_in_range(s in "\\PC{0,24}") {
            let code = encode_type(&s);
            prop_assert!(code >= 0 && code <= ITEM_TYPES.len() as i32);
        }
    }
}
