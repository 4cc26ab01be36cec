//! Submission to judge group assignment planning.
//!
//! # Responsibility
//! - Distribute each submission across its category's groups by quota.
//! - Top up under-covered projects with General groups.
//! - Verify coverage and uniqueness before anything is persisted.
//!
//! # Invariants
//! - Every planned pair joins a submission with a group of the same category.
//! - No `(submission, group)` pair appears twice.
//! - Every project with a submission totals at least the configured minimum
//!   of judges across all its assigned groups.

use crate::config::PlanningConfig;
use crate::engine::error::{PlanningError, PlanningResult};
use crate::engine::rotating_queue::RotatingQueue;
use crate::model::category::{Category, CategoryId, CategoryType, GENERAL_CATEGORY_ID};
use crate::model::judge::JudgeGroupId;
use crate::model::project::{Assignment, ProjectId, Submission, SubmissionId};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Planning view of one judge group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupCapacity {
    pub judge_group_id: JudgeGroupId,
    pub category_id: CategoryId,
    pub judge_count: usize,
}

/// Roster snapshot consumed by [`plan_assignments`].
#[derive(Debug, Clone, Copy)]
pub struct PlanningInput<'a> {
    pub categories: &'a [Category],
    /// Processed in slice order.
    pub submissions: &'a [Submission],
    /// Rotation order within a category follows slice order.
    pub groups: &'a [GroupCapacity],
    /// Judges registered in the General category, grouped or not.
    pub general_judge_count: usize,
}

/// Verified replacement assignment set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentPlan {
    /// Quota pairs first, then top-up pairs.
    pub assignments: Vec<Assignment>,
    /// Total judges per project.
    pub coverage: BTreeMap<ProjectId, usize>,
    /// Pairs added by the top-up phase.
    pub top_up_count: usize,
}

/// Fails when the General headcount cannot reach the per-project minimum.
pub fn check_general_headcount(
    general_judge_count: usize,
    config: &PlanningConfig,
) -> PlanningResult<()> {
    if general_judge_count < config.minimum_judges_per_project {
        return Err(PlanningError::InsufficientGeneralJudges {
            available: general_judge_count,
            required: config.minimum_judges_per_project,
        });
    }
    Ok(())
}

/// Plans the full replacement assignment set and verifies it.
///
/// # Errors
/// - Configuration: invalid `config`, or top-up needed with no General groups.
/// - Precondition: too few General judges, or a project lacking a General
///   submission needs top-up.
/// - Validation: a submission or group names an unknown category.
/// - InvariantViolation: a project cannot be covered within one rotation of
///   General groups, or verification rejects the plan.
pub fn plan_assignments(
    input: &PlanningInput<'_>,
    config: &PlanningConfig,
) -> PlanningResult<AssignmentPlan> {
    config.validate()?;
    check_general_headcount(input.general_judge_count, config)?;

    let kinds: HashMap<CategoryId, CategoryType> = input
        .categories
        .iter()
        .map(|category| (category.id, category.kind))
        .collect();

    let mut groups_by_category: BTreeMap<CategoryId, Vec<GroupCapacity>> = BTreeMap::new();
    for group in input.groups {
        if !kinds.contains_key(&group.category_id) {
            return Err(PlanningError::UnknownCategory(group.category_id));
        }
        groups_by_category
            .entry(group.category_id)
            .or_default()
            .push(*group);
    }

    let mut allocators = BTreeMap::new();
    for (category_id, groups) in groups_by_category {
        allocators.insert(category_id, RotatingQueue::new(groups)?);
    }

    let minimum = config.minimum_judges_per_project;
    let mut assignments = Vec::new();
    let mut planned: HashSet<Assignment> = HashSet::new();
    let mut coverage: BTreeMap<ProjectId, usize> = BTreeMap::new();
    let mut general_submissions: HashMap<ProjectId, SubmissionId> = HashMap::new();

    for submission in input.submissions {
        let kind = kinds
            .get(&submission.category_id)
            .copied()
            .ok_or(PlanningError::UnknownCategory(submission.category_id))?;
        let total = coverage.entry(submission.project_id).or_insert(0);
        if submission.category_id == GENERAL_CATEGORY_ID {
            general_submissions.insert(submission.project_id, submission.id);
        }

        let Some(allocator) = allocators.get_mut(&submission.category_id) else {
            continue;
        };
        let slots = config.quota_for(kind).min(allocator.len());
        for _ in 0..slots {
            let group = *allocator.next_item();
            let assignment = Assignment::new(submission.id, group.judge_group_id);
            if planned.insert(assignment) {
                assignments.push(assignment);
                *total += group.judge_count;
            }
        }
    }

    let mut top_up_count = 0;
    for (project_id, total) in coverage.iter_mut() {
        if *total >= minimum {
            continue;
        }

        let general_submission_id = general_submissions
            .get(project_id)
            .copied()
            .ok_or(PlanningError::MissingGeneralSubmission(*project_id))?;
        let general = allocators
            .get_mut(&GENERAL_CATEGORY_ID)
            .ok_or(PlanningError::MissingGroups {
                category_id: GENERAL_CATEGORY_ID,
            })?;

        // One full rotation visits every General group once.
        let rotation = general.len();
        let mut pulls = 0;
        while *total < minimum {
            if pulls == rotation {
                return Err(PlanningError::TopUpExhausted {
                    project_id: *project_id,
                    assigned: *total,
                    required: minimum,
                });
            }
            pulls += 1;

            let group = *general.next_item();
            let assignment = Assignment::new(general_submission_id, group.judge_group_id);
            if planned.insert(assignment) {
                assignments.push(assignment);
                *total += group.judge_count;
                top_up_count += 1;
            }
        }
    }

    let verified = verify_assignments(&assignments, input.submissions, input.groups, minimum)?;

    Ok(AssignmentPlan {
        assignments,
        coverage: verified,
        top_up_count,
    })
}

/// Checks post-conditions of an assignment set against its roster.
///
/// Returns the per-project judge totals on success.
///
/// # Errors
/// - `UnknownSubmission` / `UnknownGroup` for dangling references.
/// - `DuplicateAssignment` for a repeated pair.
/// - `CrossCategoryAssignment` when categories of the pair differ.
/// - `UnderCoverage` for the first project (by id) below `minimum`.
pub fn verify_assignments(
    assignments: &[Assignment],
    submissions: &[Submission],
    groups: &[GroupCapacity],
    minimum: usize,
) -> PlanningResult<BTreeMap<ProjectId, usize>> {
    let submissions_by_id: HashMap<SubmissionId, &Submission> = submissions
        .iter()
        .map(|submission| (submission.id, submission))
        .collect();
    let groups_by_id: HashMap<JudgeGroupId, &GroupCapacity> = groups
        .iter()
        .map(|group| (group.judge_group_id, group))
        .collect();

    let mut coverage: BTreeMap<ProjectId, usize> = submissions
        .iter()
        .map(|submission| (submission.project_id, 0))
        .collect();
    let mut seen = HashSet::with_capacity(assignments.len());

    for assignment in assignments {
        if !seen.insert(*assignment) {
            return Err(PlanningError::DuplicateAssignment(*assignment));
        }
        let submission = submissions_by_id
            .get(&assignment.submission_id)
            .ok_or(PlanningError::UnknownSubmission(assignment.submission_id))?;
        let group = groups_by_id
            .get(&assignment.judge_group_id)
            .ok_or(PlanningError::UnknownGroup(assignment.judge_group_id))?;
        if submission.category_id != group.category_id {
            return Err(PlanningError::CrossCategoryAssignment(*assignment));
        }
        *coverage.entry(submission.project_id).or_insert(0) += group.judge_count;
    }

    if let Some((project_id, assigned)) = coverage.iter().find(|(_, total)| **total < minimum) {
        return Err(PlanningError::UnderCoverage {
            project_id: *project_id,
            assigned: *assigned,
            required: minimum,
        });
    }

    Ok(coverage)
}

#[cfg(test)]
mod tests {
    use super::{
        check_general_headcount, plan_assignments, verify_assignments, GroupCapacity,
        PlanningInput,
    };
    use crate::config::PlanningConfig;
    use crate::engine::error::{PlanningError, PlanningErrorKind};
    use crate::model::category::{Category, CategoryType};
    use crate::model::project::{Assignment, Submission};

    fn categories() -> Vec<Category> {
        vec![
            Category::new(1, "General", CategoryType::General),
            Category::new(2, "Best Hardware Hack", CategoryType::Inhouse),
            Category::new(3, "Best Use of Maps", CategoryType::Sponsor),
            Category::new(4, "Best Domain Name", CategoryType::Mlh),
        ]
    }

    fn group(judge_group_id: i64, category_id: i64, judge_count: usize) -> GroupCapacity {
        GroupCapacity {
            judge_group_id,
            category_id,
            judge_count,
        }
    }

    fn submission(id: i64, project_id: i64, category_id: i64) -> Submission {
        Submission {
            id,
            project_id,
            category_id,
        }
    }

    #[test]
    fn general_only_project_is_topped_up_once() {
        let categories = categories();
        let groups = vec![group(10, 1, 4), group(11, 1, 4)];
        let submissions = vec![submission(100, 1, 1)];
        let input = PlanningInput {
            categories: &categories,
            submissions: &submissions,
            groups: &groups,
            general_judge_count: 8,
        };

        let plan = plan_assignments(&input, &PlanningConfig::default()).unwrap();
        assert_eq!(
            plan.assignments,
            vec![Assignment::new(100, 10), Assignment::new(100, 11)]
        );
        assert_eq!(plan.top_up_count, 1);
        assert_eq!(plan.coverage.get(&1), Some(&8));
    }

    #[test]
    fn inhouse_submissions_take_two_groups_round_robin() {
        let categories = categories();
        let groups = vec![
            group(1, 1, 2),
            group(2, 1, 2),
            group(3, 1, 2),
            group(20, 2, 2),
            group(21, 2, 2),
            group(22, 2, 1),
        ];
        let submissions = vec![
            submission(100, 1, 1),
            submission(101, 1, 2),
            submission(200, 2, 1),
            submission(201, 2, 2),
        ];
        let input = PlanningInput {
            categories: &categories,
            submissions: &submissions,
            groups: &groups,
            general_judge_count: 6,
        };

        let plan = plan_assignments(&input, &PlanningConfig::default()).unwrap();
        let inhouse: Vec<_> = plan
            .assignments
            .iter()
            .filter(|assignment| assignment.submission_id % 100 == 1)
            .copied()
            .collect();
        assert_eq!(
            inhouse,
            vec![
                Assignment::new(101, 20),
                Assignment::new(101, 21),
                Assignment::new(201, 22),
                Assignment::new(201, 20),
            ]
        );
        assert!(plan.coverage.values().all(|total| *total >= 6));
    }

    #[test]
    fn quota_is_capped_by_available_groups() {
        let categories = categories();
        let groups = vec![group(1, 1, 3), group(2, 1, 3), group(20, 2, 2)];
        let submissions = vec![submission(100, 1, 1), submission(101, 1, 2)];
        let input = PlanningInput {
            categories: &categories,
            submissions: &submissions,
            groups: &groups,
            general_judge_count: 6,
        };

        let plan = plan_assignments(&input, &PlanningConfig::default()).unwrap();
        let inhouse_pairs = plan
            .assignments
            .iter()
            .filter(|assignment| assignment.submission_id == 101)
            .count();
        assert_eq!(inhouse_pairs, 1);
    }

    #[test]
    fn mlh_and_groupless_categories_contribute_nothing() {
        let categories = categories();
        let groups = vec![group(1, 1, 6), group(40, 4, 2)];
        let submissions = vec![
            submission(100, 1, 1),
            submission(101, 1, 4),
            submission(102, 1, 3),
        ];
        let input = PlanningInput {
            categories: &categories,
            submissions: &submissions,
            groups: &groups,
            general_judge_count: 6,
        };

        let plan = plan_assignments(&input, &PlanningConfig::default()).unwrap();
        assert_eq!(plan.assignments, vec![Assignment::new(100, 1)]);
        assert_eq!(plan.top_up_count, 0);
    }

    #[test]
    fn sponsor_coverage_reduces_top_up() {
        let categories = categories();
        let groups = vec![group(1, 1, 2), group(2, 1, 2), group(3, 1, 2), group(30, 3, 4)];
        let submissions = vec![submission(100, 1, 1), submission(101, 1, 3)];
        let input = PlanningInput {
            categories: &categories,
            submissions: &submissions,
            groups: &groups,
            general_judge_count: 6,
        };

        let plan = plan_assignments(&input, &PlanningConfig::default()).unwrap();
        assert_eq!(plan.top_up_count, 0);
        assert_eq!(plan.coverage.get(&1), Some(&6));
    }

    #[test]
    fn insufficient_general_judges_is_a_precondition_error() {
        let categories = categories();
        let groups = vec![group(1, 1, 2), group(2, 1, 2)];
        let submissions = vec![submission(100, 1, 1)];
        let input = PlanningInput {
            categories: &categories,
            submissions: &submissions,
            groups: &groups,
            general_judge_count: 4,
        };

        let err = plan_assignments(&input, &PlanningConfig::default()).unwrap_err();
        assert_eq!(
            err,
            PlanningError::InsufficientGeneralJudges {
                available: 4,
                required: 6
            }
        );
        assert_eq!(err.kind(), PlanningErrorKind::Precondition);
        assert!(check_general_headcount(6, &PlanningConfig::default()).is_ok());
    }

    #[test]
    fn ungrouped_general_judges_exhaust_top_up() {
        let categories = categories();
        let groups = vec![group(1, 1, 2), group(2, 1, 2)];
        let submissions = vec![submission(100, 1, 1)];
        let input = PlanningInput {
            categories: &categories,
            submissions: &submissions,
            groups: &groups,
            general_judge_count: 6,
        };

        let err = plan_assignments(&input, &PlanningConfig::default()).unwrap_err();
        assert_eq!(
            err,
            PlanningError::TopUpExhausted {
                project_id: 1,
                assigned: 4,
                required: 6
            }
        );
        assert_eq!(err.kind(), PlanningErrorKind::InvariantViolation);
    }

    #[test]
    fn missing_general_groups_is_a_configuration_error() {
        let categories = categories();
        let groups = vec![group(20, 2, 2)];
        let submissions = vec![submission(100, 1, 1), submission(101, 1, 2)];
        let input = PlanningInput {
            categories: &categories,
            submissions: &submissions,
            groups: &groups,
            general_judge_count: 6,
        };

        let err = plan_assignments(&input, &PlanningConfig::default()).unwrap_err();
        assert_eq!(err, PlanningError::MissingGroups { category_id: 1 });
        assert_eq!(err.kind(), PlanningErrorKind::Configuration);
    }

    #[test]
    fn project_without_general_submission_cannot_be_topped_up() {
        let categories = categories();
        let groups = vec![group(1, 1, 6), group(20, 2, 2)];
        let submissions = vec![submission(101, 7, 2)];
        let input = PlanningInput {
            categories: &categories,
            submissions: &submissions,
            groups: &groups,
            general_judge_count: 6,
        };

        let err = plan_assignments(&input, &PlanningConfig::default()).unwrap_err();
        assert_eq!(err, PlanningError::MissingGeneralSubmission(7));
    }

    #[test]
    fn unknown_submission_category_is_rejected() {
        let categories = categories();
        let groups = vec![group(1, 1, 6)];
        let submissions = vec![submission(100, 1, 1), submission(101, 1, 9)];
        let input = PlanningInput {
            categories: &categories,
            submissions: &submissions,
            groups: &groups,
            general_judge_count: 6,
        };

        let err = plan_assignments(&input, &PlanningConfig::default()).unwrap_err();
        assert_eq!(err, PlanningError::UnknownCategory(9));
        assert_eq!(err.kind(), PlanningErrorKind::Validation);
    }

    #[test]
    fn no_submissions_yields_empty_plan() {
        let categories = categories();
        let input = PlanningInput {
            categories: &categories,
            submissions: &[],
            groups: &[],
            general_judge_count: 6,
        };

        let plan = plan_assignments(&input, &PlanningConfig::default()).unwrap();
        assert!(plan.assignments.is_empty());
        assert!(plan.coverage.is_empty());
    }

    #[test]
    fn verify_rejects_duplicate_pairs() {
        let groups = vec![group(1, 1, 6)];
        let submissions = vec![submission(100, 1, 1)];
        let assignments = vec![Assignment::new(100, 1), Assignment::new(100, 1)];

        let err = verify_assignments(&assignments, &submissions, &groups, 6).unwrap_err();
        assert_eq!(err, PlanningError::DuplicateAssignment(Assignment::new(100, 1)));
        assert_eq!(err.kind(), PlanningErrorKind::InvariantViolation);
    }

    #[test]
    fn verify_rejects_under_covered_projects() {
        let groups = vec![group(1, 1, 6), group(2, 1, 2)];
        let submissions = vec![submission(100, 1, 1), submission(200, 2, 1)];
        let assignments = vec![Assignment::new(100, 1), Assignment::new(200, 2)];

        let err = verify_assignments(&assignments, &submissions, &groups, 6).unwrap_err();
        assert_eq!(
            err,
            PlanningError::UnderCoverage {
                project_id: 2,
                assigned: 2,
                required: 6
            }
        );
    }

    #[test]
    fn verify_rejects_cross_category_pairs() {
        let groups = vec![group(1, 1, 6), group(20, 2, 2)];
        let submissions = vec![submission(100, 1, 1), submission(101, 1, 2)];
        let assignments = vec![Assignment::new(100, 1), Assignment::new(101, 1)];

        let err = verify_assignments(&assignments, &submissions, &groups, 6).unwrap_err();
        assert_eq!(err, PlanningError::CrossCategoryAssignment(Assignment::new(101, 1)));
    }
}
