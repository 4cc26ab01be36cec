//! Judge group formation.
//!
//! # Responsibility
//! - Partition a flat judge roster into review groups per category.
//! - Derive group names from category code and formation ordinal.
//!
//! # Invariants
//! - Sponsor categories form exactly one group holding every judge.
//! - Other categories form `ceil(n / 2)` groups of at most two judges,
//!   chunked in roster order.
//! - Ordinals within a category start at 1 and have no gaps.
//! - Output is ordered by category id, then ordinal.

use crate::engine::error::{PlanningError, PlanningResult};
use crate::model::category::{group_name, CategoryId, CategoryType};
use crate::model::judge::{JudgeId, JudgeWithCategory};
use std::collections::BTreeMap;

/// Maximum members of a non-sponsor group.
pub const MAX_GROUP_SIZE: usize = 2;

/// Group produced by formation, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedJudgeGroup {
    pub category_id: CategoryId,
    /// 1-based position among this category's groups.
    pub ordinal: usize,
    pub name: String,
    /// Members in roster order.
    pub member_judge_ids: Vec<JudgeId>,
}

/// Builds the full replacement group set for `judges`.
///
/// # Errors
/// - `EmptyRoster` when `judges` is empty.
/// - `JudgeCategoryMismatch` when a judge is annotated with another category.
/// - `InvalidCategoryId` when a category id cannot be named.
pub fn form_groups(judges: &[JudgeWithCategory]) -> PlanningResult<Vec<PlannedJudgeGroup>> {
    if judges.is_empty() {
        return Err(PlanningError::EmptyRoster);
    }

    let mut by_category: BTreeMap<CategoryId, (CategoryType, Vec<JudgeId>)> = BTreeMap::new();
    for entry in judges {
        if entry.judge.category_id != entry.category.id {
            return Err(PlanningError::JudgeCategoryMismatch {
                judge_id: entry.judge.id,
                category_id: entry.category.id,
            });
        }
        by_category
            .entry(entry.category.id)
            .or_insert_with(|| (entry.category.kind, Vec::new()))
            .1
            .push(entry.judge.id);
    }

    let mut groups = Vec::new();
    for (category_id, (kind, members)) in by_category {
        for (index, member_judge_ids) in split_members(kind, members).into_iter().enumerate() {
            let ordinal = index + 1;
            let name = group_name(category_id, ordinal)
                .ok_or(PlanningError::InvalidCategoryId(category_id))?;
            groups.push(PlannedJudgeGroup {
                category_id,
                ordinal,
                name,
                member_judge_ids,
            });
        }
    }

    Ok(groups)
}

fn split_members(kind: CategoryType, members: Vec<JudgeId>) -> Vec<Vec<JudgeId>> {
    match kind {
        CategoryType::Sponsor => vec![members],
        _ => members
            .chunks(MAX_GROUP_SIZE)
            .map(<[JudgeId]>::to_vec)
            .collect(),
    }
}
