//! Judging commands: group reorganization and submission assignment.
//!
//! # Responsibility
//! - Run the formation and planning engine over the stored roster.
//! - Persist results only after every engine check has passed.
//! - Validate manual judge moves before mutation.
//!
//! # Invariants
//! - Both commands are idempotent over a fixed roster and fully replace
//!   prior derived state.
//! - A failed command leaves stored groups and assignments untouched.

use crate::config::PlanningConfig;
use crate::engine::assignment_planner::{
    check_general_headcount, plan_assignments, GroupCapacity, PlanningInput,
};
use crate::engine::error::{PlanningError, PlanningErrorKind};
use crate::engine::group_formation::form_groups;
use crate::model::category::GENERAL_CATEGORY_ID;
use crate::model::judge::{JudgeGroup, JudgeGroupId, JudgeId};
use crate::repo::judging_repo::{AssignmentRecord, JudgingRepository};
use crate::repo::roster_repo::{RepoError, RosterRepository};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;

/// Errors from judging commands.
#[derive(Debug)]
pub enum JudgingServiceError {
    /// Engine rejected the run.
    Planning(PlanningError),
    /// Target judge does not exist.
    JudgeNotFound(JudgeId),
    /// Target group does not exist.
    GroupNotFound(JudgeGroupId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl JudgingServiceError {
    /// Engine classification, when the failure came from the engine.
    pub fn planning_kind(&self) -> Option<PlanningErrorKind> {
        match self {
            Self::Planning(err) => Some(err.kind()),
            _ => None,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Planning(err) => err.kind().as_str(),
            Self::JudgeNotFound(_) | Self::GroupNotFound(_) => "not_found",
            Self::Repo(_) => "storage",
        }
    }
}

impl Display for JudgingServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Planning(err) => write!(f, "{err}"),
            Self::JudgeNotFound(id) => write!(f, "judge not found: {id}"),
            Self::GroupNotFound(id) => write!(f, "judge group not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for JudgingServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Planning(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PlanningError> for JudgingServiceError {
    fn from(value: PlanningError) -> Self {
        Self::Planning(value)
    }
}

impl From<RepoError> for JudgingServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Summary of a group reorganization run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorganizeReport {
    pub run_id: Uuid,
    pub groups: Vec<JudgeGroup>,
    pub judge_count: usize,
}

/// Summary of an assignment run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignReport {
    pub run_id: Uuid,
    pub assignment_count: usize,
    /// Assignments the run replaced.
    pub replaced_count: usize,
    pub project_count: usize,
    pub top_up_count: usize,
    pub batches: usize,
    /// Fewest judges any project ended up with; `None` without projects.
    pub min_project_coverage: Option<usize>,
}

/// Judging command facade over roster and judging repositories.
pub struct JudgingService<R: RosterRepository, J: JudgingRepository> {
    roster: R,
    judging: J,
    config: PlanningConfig,
}

impl<R: RosterRepository, J: JudgingRepository> JudgingService<R, J> {
    pub fn new(roster: R, judging: J, config: PlanningConfig) -> Self {
        Self {
            roster,
            judging,
            config,
        }
    }

    pub fn config(&self) -> &PlanningConfig {
        &self.config
    }

    /// Recomputes every judge group from the current judge roster.
    ///
    /// Existing groups, judge links, and assignments are replaced atomically.
    pub fn reorganize_judge_groups(&self) -> Result<ReorganizeReport, JudgingServiceError> {
        let run_id = Uuid::new_v4();
        let started_at = Instant::now();
        info!("event=judge_groups_reorganize module=service status=start run_id={run_id}");

        let result = self.reorganize_inner(run_id);
        match &result {
            Ok(report) => info!(
                "event=judge_groups_reorganize module=service status=ok run_id={run_id} duration_ms={} groups={} judges={}",
                started_at.elapsed().as_millis(),
                report.groups.len(),
                report.judge_count
            ),
            Err(err) => error!(
                "event=judge_groups_reorganize module=service status=error run_id={run_id} duration_ms={} error_code={} error={}",
                started_at.elapsed().as_millis(),
                err.code(),
                err
            ),
        }
        result
    }

    fn reorganize_inner(&self, run_id: Uuid) -> Result<ReorganizeReport, JudgingServiceError> {
        let judges = self.roster.list_judges_with_categories()?;
        let planned = form_groups(&judges)?;
        let groups = self.judging.replace_judge_groups(&planned)?;

        Ok(ReorganizeReport {
            run_id,
            groups,
            judge_count: judges.len(),
        })
    }

    /// Recomputes every submission assignment from stored groups.
    ///
    /// Nothing is written unless the General headcount check, planning, and
    /// post-condition verification all pass.
    pub fn assign_submissions_to_groups(&self) -> Result<AssignReport, JudgingServiceError> {
        let run_id = Uuid::new_v4();
        let started_at = Instant::now();
        info!("event=submissions_assign module=service status=start run_id={run_id}");

        let result = self.assign_inner(run_id);
        match &result {
            Ok(report) => info!(
                "event=submissions_assign module=service status=ok run_id={run_id} duration_ms={} assignments={} replaced={} projects={} top_ups={} batches={}",
                started_at.elapsed().as_millis(),
                report.assignment_count,
                report.replaced_count,
                report.project_count,
                report.top_up_count,
                report.batches
            ),
            Err(err) => error!(
                "event=submissions_assign module=service status=error run_id={run_id} duration_ms={} error_code={} error={}",
                started_at.elapsed().as_millis(),
                err.code(),
                err
            ),
        }
        result
    }

    fn assign_inner(&self, run_id: Uuid) -> Result<AssignReport, JudgingServiceError> {
        self.config.validate()?;

        let judges = self.roster.list_judges()?;
        let general_judge_count = judges
            .iter()
            .filter(|judge| judge.category_id == GENERAL_CATEGORY_ID)
            .count();
        check_general_headcount(general_judge_count, &self.config)?;

        let categories = self.roster.list_categories()?;
        let submissions = self.roster.list_submissions()?;
        let groups: Vec<GroupCapacity> = self
            .judging
            .list_judge_groups()?
            .iter()
            .map(|group| GroupCapacity {
                judge_group_id: group.id,
                category_id: group.category_id,
                judge_count: group.judge_count(),
            })
            .collect();

        let plan = plan_assignments(
            &PlanningInput {
                categories: &categories,
                submissions: &submissions,
                groups: &groups,
                general_judge_count,
            },
            &self.config,
        )?;
        let outcome = self
            .judging
            .replace_assignments(&plan.assignments, self.config.batch_size)?;

        Ok(AssignReport {
            run_id,
            assignment_count: outcome.inserted,
            replaced_count: outcome.deleted,
            project_count: plan.coverage.len(),
            top_up_count: plan.top_up_count,
            batches: outcome.batches,
            min_project_coverage: plan.coverage.values().min().copied(),
        })
    }

    /// Moves one judge into another group of the same category.
    pub fn move_judge(
        &self,
        judge_id: JudgeId,
        judge_group_id: JudgeGroupId,
    ) -> Result<(), JudgingServiceError> {
        let judge = self
            .roster
            .get_judge(judge_id)?
            .ok_or(JudgingServiceError::JudgeNotFound(judge_id))?;
        let group = self
            .judging
            .get_judge_group(judge_group_id)?
            .ok_or(JudgingServiceError::GroupNotFound(judge_group_id))?;

        if judge.category_id != group.category_id {
            let err = PlanningError::GroupCategoryMismatch {
                judge_id,
                judge_category_id: judge.category_id,
                judge_group_id,
                group_category_id: group.category_id,
            };
            error!(
                "event=judge_move module=service status=error judge_id={judge_id} group_id={judge_group_id} error_code={} error={err}",
                err.kind().as_str()
            );
            return Err(err.into());
        }

        self.judging.set_judge_group(judge_id, judge_group_id)?;
        info!(
            "event=judge_move module=service status=ok judge_id={judge_id} group_id={judge_group_id}"
        );
        Ok(())
    }

    /// Deletes every judge group; assignments go with them.
    pub fn clear_judge_groups(&self) -> Result<usize, JudgingServiceError> {
        let deleted = self.judging.clear_judge_groups()?;
        info!("event=judge_groups_clear module=service status=ok deleted={deleted}");
        Ok(deleted)
    }

    pub fn list_judge_groups(&self) -> Result<Vec<JudgeGroup>, JudgingServiceError> {
        Ok(self.judging.list_judge_groups()?)
    }

    pub fn list_assignments(&self) -> Result<Vec<AssignmentRecord>, JudgingServiceError> {
        Ok(self.judging.list_assignments()?)
    }
}
