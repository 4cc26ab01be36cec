//! Planning error taxonomy.
//!
//! Every variant maps to one [`PlanningErrorKind`]; callers branch on the
//! kind to decide between "fix the roster" and "investigate a defect".

use crate::model::category::CategoryId;
use crate::model::judge::{JudgeGroupId, JudgeId};
use crate::model::project::{Assignment, ProjectId, SubmissionId};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type PlanningResult<T> = Result<T, PlanningError>;

/// Coarse classification of planning failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanningErrorKind {
    /// Engine settings or group supply make the run impossible to configure.
    Configuration,
    /// Roster data does not allow the run to start.
    Precondition,
    /// An operation was rejected before mutation.
    Validation,
    /// Planned output broke a post-condition; nothing was persisted.
    InvariantViolation,
}

impl PlanningErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Precondition => "precondition",
            Self::Validation => "validation",
            Self::InvariantViolation => "invariant_violation",
        }
    }
}

/// Errors raised by group formation and submission planning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanningError {
    /// A rotating queue was constructed with no items.
    EmptyRotation,
    /// A category needs groups to rotate over but has none.
    MissingGroups { category_id: CategoryId },
    /// Planning settings are unusable.
    InvalidConfig(String),
    /// No judges were supplied to group formation.
    EmptyRoster,
    /// Not enough General judges to ever reach the per-project minimum.
    InsufficientGeneralJudges { available: usize, required: usize },
    /// A project needs General top-up but has no General submission.
    MissingGeneralSubmission(ProjectId),
    /// Category id cannot be encoded as a group name.
    InvalidCategoryId(CategoryId),
    /// Record references a category absent from the roster.
    UnknownCategory(CategoryId),
    /// Judge record and its annotated category disagree.
    JudgeCategoryMismatch {
        judge_id: JudgeId,
        category_id: CategoryId,
    },
    /// Judge cannot join a group of another category.
    GroupCategoryMismatch {
        judge_id: JudgeId,
        judge_category_id: CategoryId,
        judge_group_id: JudgeGroupId,
        group_category_id: CategoryId,
    },
    /// Project total judge count is below the minimum.
    UnderCoverage {
        project_id: ProjectId,
        assigned: usize,
        required: usize,
    },
    /// One full rotation of General groups could not cover the project.
    TopUpExhausted {
        project_id: ProjectId,
        assigned: usize,
        required: usize,
    },
    /// Same submission assigned to the same group twice.
    DuplicateAssignment(Assignment),
    /// Assignment pairs a submission with a group of another category.
    CrossCategoryAssignment(Assignment),
    /// Assignment references a submission that is not in the roster.
    UnknownSubmission(SubmissionId),
    /// Assignment references a group that is not in the roster.
    UnknownGroup(JudgeGroupId),
}

impl PlanningError {
    pub fn kind(&self) -> PlanningErrorKind {
        match self {
            Self::EmptyRotation | Self::MissingGroups { .. } | Self::InvalidConfig(_) => {
                PlanningErrorKind::Configuration
            }
            Self::EmptyRoster
            | Self::InsufficientGeneralJudges { .. }
            | Self::MissingGeneralSubmission(_) => PlanningErrorKind::Precondition,
            Self::InvalidCategoryId(_)
            | Self::UnknownCategory(_)
            | Self::JudgeCategoryMismatch { .. }
            | Self::GroupCategoryMismatch { .. } => PlanningErrorKind::Validation,
            Self::UnderCoverage { .. }
            | Self::TopUpExhausted { .. }
            | Self::DuplicateAssignment(_)
            | Self::CrossCategoryAssignment(_)
            | Self::UnknownSubmission(_)
            | Self::UnknownGroup(_) => PlanningErrorKind::InvariantViolation,
        }
    }
}

impl Display for PlanningError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyRotation => write!(f, "rotating queue requires at least one item"),
            Self::MissingGroups { category_id } => {
                write!(f, "category {category_id} has no judge groups to rotate over")
            }
            Self::InvalidConfig(message) => write!(f, "invalid planning config: {message}"),
            Self::EmptyRoster => write!(f, "no judges to organize into groups"),
            Self::InsufficientGeneralJudges {
                available,
                required,
            } => write!(
                f,
                "General category has {available} judges, at least {required} are required"
            ),
            Self::MissingGeneralSubmission(project_id) => {
                write!(f, "project {project_id} has no General submission")
            }
            Self::InvalidCategoryId(id) => {
                write!(f, "category id {id} cannot be encoded as a group name")
            }
            Self::UnknownCategory(id) => write!(f, "unknown category: {id}"),
            Self::JudgeCategoryMismatch {
                judge_id,
                category_id,
            } => write!(
                f,
                "judge {judge_id} was supplied with mismatched category {category_id}"
            ),
            Self::GroupCategoryMismatch {
                judge_id,
                judge_category_id,
                judge_group_id,
                group_category_id,
            } => write!(
                f,
                "judge {judge_id} of category {judge_category_id} cannot move to group {judge_group_id} of category {group_category_id}"
            ),
            Self::UnderCoverage {
                project_id,
                assigned,
                required,
            } => write!(
                f,
                "project {project_id} is assigned {assigned} judges, minimum is {required}"
            ),
            Self::TopUpExhausted {
                project_id,
                assigned,
                required,
            } => write!(
                f,
                "General groups exhausted for project {project_id} at {assigned} of {required} judges"
            ),
            Self::DuplicateAssignment(assignment) => write!(
                f,
                "submission {} assigned to group {} more than once",
                assignment.submission_id, assignment.judge_group_id
            ),
            Self::CrossCategoryAssignment(assignment) => write!(
                f,
                "submission {} assigned to group {} of another category",
                assignment.submission_id, assignment.judge_group_id
            ),
            Self::UnknownSubmission(id) => write!(f, "unknown submission: {id}"),
            Self::UnknownGroup(id) => write!(f, "unknown judge group: {id}"),
        }
    }
}

impl Error for PlanningError {}
