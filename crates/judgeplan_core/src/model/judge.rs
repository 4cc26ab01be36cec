//! Judge and judge group records.
//!
//! # Invariants
//! - Every member of a `JudgeGroup` shares the group's `category_id`.
//! - Group names are `<category code><ordinal>`, see `model::category::group_name`.

use crate::model::category::{Category, CategoryId};
use serde::{Deserialize, Serialize};

pub type JudgeId = i64;
pub type JudgeGroupId = i64;

/// Reviewer registered for one award category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Judge {
    pub id: JudgeId,
    pub name: String,
    pub email: String,
    pub category_id: CategoryId,
    /// `None` until group formation links the judge.
    pub judge_group_id: Option<JudgeGroupId>,
}

/// Persisted judge group with its member ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgeGroup {
    pub id: JudgeGroupId,
    pub category_id: CategoryId,
    pub name: String,
    /// Member judge ids, ascending.
    pub member_judge_ids: Vec<JudgeId>,
}

impl JudgeGroup {
    /// Number of judges reviewing as this group.
    pub fn judge_count(&self) -> usize {
        self.member_judge_ids.len()
    }
}

/// Judge annotated with the category it reviews for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgeWithCategory {
    pub judge: Judge,
    pub category: Category,
}
