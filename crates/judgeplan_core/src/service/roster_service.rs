//! Roster maintenance use-cases.
//!
//! # Responsibility
//! - Validate and normalize category, judge, and project input.
//! - Guarantee every project has a General submission.
//!
//! # Invariants
//! - Only category 1 is typed `general`, and it cannot be retyped or deleted.
//! - Service APIs never bypass repository persistence contracts.

use crate::model::category::{Category, CategoryId, CategoryType, GENERAL_CATEGORY_ID};
use crate::model::judge::{Judge, JudgeId};
use crate::model::project::{ProjectId, ProjectWithSubmissions};
use crate::model::validation::{normalize_email, normalize_name, RosterValidationError};
use crate::repo::roster_repo::{NewJudge, NewProject, RepoError, RepoResult, RosterRepository};

/// Use-case service wrapper for roster CRUD.
pub struct RosterService<R: RosterRepository> {
    repo: R,
}

impl<R: RosterRepository> RosterService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a non-General category.
    pub fn create_category(&self, name: &str, kind: CategoryType) -> RepoResult<Category> {
        let name = normalize_name("category name", name)?;
        if kind == CategoryType::General {
            return Err(RosterValidationError::ReservedGeneralCategory.into());
        }
        self.repo.create_category(&name, kind)
    }

    /// Renames or retypes a category.
    ///
    /// The General category may only be renamed.
    pub fn update_category(
        &self,
        id: CategoryId,
        name: &str,
        kind: CategoryType,
    ) -> RepoResult<()> {
        let name = normalize_name("category name", name)?;
        match (id == GENERAL_CATEGORY_ID, kind == CategoryType::General) {
            (true, false) => {
                return Err(RosterValidationError::GeneralCategoryImmutable(id).into());
            }
            (false, true) => return Err(RosterValidationError::ReservedGeneralCategory.into()),
            _ => {}
        }
        self.repo.update_category(&Category::new(id, name, kind))
    }

    pub fn delete_category(&self, id: CategoryId) -> RepoResult<()> {
        if id == GENERAL_CATEGORY_ID {
            return Err(RosterValidationError::GeneralCategoryImmutable(id).into());
        }
        self.repo.delete_category(id)
    }

    pub fn list_categories(&self) -> RepoResult<Vec<Category>> {
        self.repo.list_categories()
    }

    pub fn create_judge(&self, name: &str, email: &str, category_id: CategoryId) -> RepoResult<Judge> {
        let judge = NewJudge {
            name: normalize_name("judge name", name)?,
            email: normalize_email(email)?,
            category_id,
        };
        self.repo.create_judge(&judge)
    }

    /// Updates judge details; moving category drops the current group link.
    pub fn update_judge(
        &self,
        id: JudgeId,
        name: &str,
        email: &str,
        category_id: CategoryId,
    ) -> RepoResult<Judge> {
        let existing = self
            .repo
            .get_judge(id)?
            .ok_or(RepoError::NotFound { entity: "judge", id })?;
        let judge = Judge {
            id,
            name: normalize_name("judge name", name)?,
            email: normalize_email(email)?,
            category_id,
            judge_group_id: if existing.category_id == category_id {
                existing.judge_group_id
            } else {
                None
            },
        };
        self.repo.update_judge(&judge)?;
        Ok(judge)
    }

    pub fn delete_judge(&self, id: JudgeId) -> RepoResult<()> {
        self.repo.delete_judge(id)
    }

    pub fn list_judges(&self) -> RepoResult<Vec<Judge>> {
        self.repo.list_judges()
    }

    /// Creates a project submitted to `category_ids` plus General.
    ///
    /// Duplicate category ids are collapsed.
    pub fn create_project(
        &self,
        name: &str,
        location: &str,
        location2: &str,
        category_ids: &[CategoryId],
    ) -> RepoResult<ProjectWithSubmissions> {
        let project = new_project(name, location, location2, category_ids)?;
        self.repo.create_project(&project)
    }

    /// Renames and relocates a project and resyncs its submissions.
    ///
    /// General stays submitted whatever `category_ids` holds. Submissions for
    /// categories still listed keep their ids and assignments.
    pub fn update_project(
        &self,
        id: ProjectId,
        name: &str,
        location: &str,
        location2: &str,
        category_ids: &[CategoryId],
    ) -> RepoResult<ProjectWithSubmissions> {
        let project = new_project(name, location, location2, category_ids)?;
        self.repo.update_project(id, &project)
    }

    pub fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        self.repo.delete_project(id)
    }

    pub fn list_projects(&self) -> RepoResult<Vec<ProjectWithSubmissions>> {
        self.repo.list_projects()
    }
}

fn new_project(
    name: &str,
    location: &str,
    location2: &str,
    category_ids: &[CategoryId],
) -> RepoResult<NewProject> {
    let mut categories = vec![GENERAL_CATEGORY_ID];
    categories.extend(category_ids.iter().copied());
    categories.sort_unstable();
    categories.dedup();

    Ok(NewProject {
        name: normalize_name("project name", name)?,
        location: location.trim().to_string(),
        location2: location2.trim().to_string(),
        category_ids: categories,
    })
}
