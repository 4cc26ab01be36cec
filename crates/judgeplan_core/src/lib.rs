//! Core of the judging planner.
//! This crate is the single source of truth for judge group and assignment invariants.

pub mod config;
pub mod db;
pub mod engine;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::PlanningConfig;
pub use engine::assignment_planner::{
    check_general_headcount, plan_assignments, verify_assignments, AssignmentPlan,
    GroupCapacity, PlanningInput,
};
pub use engine::error::{PlanningError, PlanningErrorKind, PlanningResult};
pub use engine::group_formation::{form_groups, PlannedJudgeGroup, MAX_GROUP_SIZE};
pub use engine::rotating_queue::RotatingQueue;
pub use logging::{init_logging, logging_status, LogLevel, LoggingError};
pub use model::category::{
    category_code, group_name, Category, CategoryId, CategoryType, GENERAL_CATEGORY_ID,
};
pub use model::judge::{Judge, JudgeGroup, JudgeGroupId, JudgeId, JudgeWithCategory};
pub use model::project::{
    Assignment, Project, ProjectId, ProjectWithSubmissions, Submission, SubmissionId,
};
pub use model::validation::RosterValidationError;
pub use repo::judging_repo::{
    AssignmentRecord, JudgingRepository, ReplaceAssignmentsOutcome, SqliteJudgingRepository,
};
pub use repo::roster_repo::{
    NewJudge, NewProject, RepoError, RepoResult, RosterRepository, SqliteRosterRepository,
};
pub use service::judging_service::{
    AssignReport, JudgingService, JudgingServiceError, ReorganizeReport,
};
pub use service::roster_service::RosterService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
