//! Project, submission, and assignment records.

use crate::model::category::CategoryId;
use crate::model::judge::JudgeGroupId;
use serde::{Deserialize, Serialize};

pub type ProjectId = i64;
pub type SubmissionId = i64;

/// Team project entered into the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    /// Table or room identifier.
    pub location: String,
    pub location2: String,
}

/// One project's entry into one category.
///
/// A project has at most one submission per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub project_id: ProjectId,
    pub category_id: CategoryId,
}

/// Project read model with its submissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectWithSubmissions {
    pub project: Project,
    /// Ordered by category id.
    pub submissions: Vec<Submission>,
}

/// Pairing of one submission with one reviewing judge group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Assignment {
    pub submission_id: SubmissionId,
    pub judge_group_id: JudgeGroupId,
}

impl Assignment {
    pub fn new(submission_id: SubmissionId, judge_group_id: JudgeGroupId) -> Self {
        Self {
            submission_id,
            judge_group_id,
        }
    }
}
