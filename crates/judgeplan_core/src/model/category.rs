//! Award category model and category-derived group naming.
//!
//! # Responsibility
//! - Define category identity and the type that drives splitting and quotas.
//! - Encode category ids as letter codes for judge group names.
//!
//! # Invariants
//! - `GENERAL_CATEGORY_ID` is reserved for the one `CategoryType::General` row.
//! - Codes are bijective base-26: 1 -> `A`, 26 -> `Z`, 27 -> `AA`.

use serde::{Deserialize, Serialize};

/// Store-assigned category id. Positive and stable for a planning run.
pub type CategoryId = i64;

/// Id of the reserved General category.
pub const GENERAL_CATEGORY_ID: CategoryId = 1;

/// Classification of an award category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryType {
    /// Overall judging every project enters.
    General,
    /// Prizes run by the organizers.
    Inhouse,
    /// Prizes judged by one sponsor's reviewers.
    Sponsor,
    /// Prizes judged outside the event's judge pool.
    Mlh,
}

impl CategoryType {
    /// Every type, in display order.
    pub const ALL: [CategoryType; 4] = [
        CategoryType::General,
        CategoryType::Inhouse,
        CategoryType::Sponsor,
        CategoryType::Mlh,
    ];

    /// Stable storage string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Inhouse => "inhouse",
            Self::Sponsor => "sponsor",
            Self::Mlh => "mlh",
        }
    }

    /// Parses the storage string produced by [`CategoryType::as_str`].
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "general" => Some(Self::General),
            "inhouse" => Some(Self::Inhouse),
            "sponsor" => Some(Self::Sponsor),
            "mlh" => Some(Self::Mlh),
            _ => None,
        }
    }
}

/// Award category a project can submit to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Serialized as `type` to match external schema naming.
    #[serde(rename = "type")]
    pub kind: CategoryType,
}

impl Category {
    pub fn new(id: CategoryId, name: impl Into<String>, kind: CategoryType) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
        }
    }

    /// Returns whether this is the reserved General category.
    pub fn is_general(&self) -> bool {
        self.id == GENERAL_CATEGORY_ID
    }
}

/// Letter code for a category id.
///
/// Returns `None` for non-positive ids.
pub fn category_code(id: CategoryId) -> Option<String> {
    if id <= 0 {
        return None;
    }

    let mut remaining = id;
    let mut letters = Vec::new();
    while remaining > 0 {
        remaining -= 1;
        letters.push(char::from(b'A' + (remaining % 26) as u8));
        remaining /= 26;
    }
    Some(letters.iter().rev().collect())
}

/// Judge group name for the `ordinal`-th (1-based) group of a category.
pub fn group_name(category_id: CategoryId, ordinal: usize) -> Option<String> {
    if ordinal == 0 {
        return None;
    }
    category_code(category_id).map(|code| format!("{code}{ordinal}"))
}

#[cfg(test)]
mod tests {
    use super::{category_code, group_name, CategoryType};

    #[test]
    fn single_letter_codes_follow_alphabet() {
        assert_eq!(category_code(1).as_deref(), Some("A"));
        assert_eq!(category_code(2).as_deref(), Some("B"));
        assert_eq!(category_code(5).as_deref(), Some("E"));
        assert_eq!(category_code(26).as_deref(), Some("Z"));
    }

    #[test]
    fn codes_past_z_widen_to_multiple_letters() {
        assert_eq!(category_code(27).as_deref(), Some("AA"));
        assert_eq!(category_code(28).as_deref(), Some("AB"));
        assert_eq!(category_code(52).as_deref(), Some("AZ"));
        assert_eq!(category_code(53).as_deref(), Some("BA"));
        assert_eq!(category_code(702).as_deref(), Some("ZZ"));
        assert_eq!(category_code(703).as_deref(), Some("AAA"));
    }

    #[test]
    fn non_positive_ids_have_no_code() {
        assert_eq!(category_code(0), None);
        assert_eq!(category_code(-3), None);
    }

    #[test]
    fn group_name_appends_ordinal() {
        assert_eq!(group_name(2, 3).as_deref(), Some("B3"));
        assert_eq!(group_name(28, 10).as_deref(), Some("AB10"));
        assert_eq!(group_name(2, 0), None);
    }

    #[test]
    fn category_type_parse_trims_and_rejects_unknown_values() {
        assert_eq!(CategoryType::parse(" sponsor "), Some(CategoryType::Sponsor));
        assert_eq!(CategoryType::parse("hardware"), None);
    }
}
