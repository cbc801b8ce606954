//! Item classification by resolved display name
//!
//! Matching is exact and case insensitive. The product name contains the
//! source name as a substring, so a `contains` check would treat already
//! converted items as fresh sources and feed them back into the loop.

/// Display name of an unconverted source unit
pub const SOURCE_ITEM_NAME: &str = "Bestiary Orb";
/// Display name of a converted product unit
pub const PRODUCT_ITEM_NAME: &str = "Imprinted Bestiary Orb";

/// Exact, case-insensitive name comparison
fn name_matches(candidate: &str, expected: &str) -> bool {
    candidate.eq_ignore_ascii_case(expected)
}

pub fn is_source_item(name: &str) -> bool {
    name_matches(name, SOURCE_ITEM_NAME)
}

pub fn is_product_item(name: &str) -> bool {
    name_matches(name, PRODUCT_ITEM_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_ignores_ascii_case() {
        assert!(is_source_item("bestiary orb"));
        assert!(is_source_item("BESTIARY ORB"));
        assert!(is_product_item("imprinted bestiary ORB"));
    }

    #[test]
    fn product_is_not_a_source() {
        assert!(!is_source_item(PRODUCT_ITEM_NAME));
        assert!(is_product_item(PRODUCT_ITEM_NAME));
        assert!(!is_product_item(SOURCE_ITEM_NAME));
    }

    #[test]
    fn no_partial_or_padded_matches() {
        for name in ["Bestiary", " Bestiary Orb", "Bestiary Orbs", "Imprinted Bestiary", ""] {
            assert!(!is_source_item(name), "{name:?}");
            assert!(!is_product_item(name), "{name:?}");
        }
    }
}
