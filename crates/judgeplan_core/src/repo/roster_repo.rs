//! Roster repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over categories, judges, projects, and submissions.
//! - Serve the roster snapshots read by the planning engine.
//!
//! # Invariants
//! - Inputs arrive normalized; services own validation.
//! - Changing a judge's category unlinks the judge from its group.
//! - Project writes touch the project and its submissions atomically.
//! - A project update keeps the submission rows (and their assignments) of
//!   categories it still lists.

use crate::db::DbError;
use crate::model::category::{Category, CategoryId, CategoryType};
use crate::model::judge::{Judge, JudgeId, JudgeWithCategory};
use crate::model::project::{Project, ProjectId, ProjectWithSubmissions, Submission};
use crate::model::validation::RosterValidationError;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for roster and judging persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(RosterValidationError),
    Db(DbError),
    NotFound { entity: &'static str, id: i64 },
    /// Write rejected by a uniqueness constraint.
    Conflict(String),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Conflict(message) => write!(f, "conflict: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } | Self::Conflict(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<RosterValidationError> for RepoError {
    fn from(value: RosterValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Input for a new judge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJudge {
    pub name: String,
    pub email: String,
    pub category_id: CategoryId,
}

/// Input for a new project and its submissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub name: String,
    pub location: String,
    pub location2: String,
    /// Distinct category ids to submit to.
    pub category_ids: Vec<CategoryId>,
}

/// Repository interface for roster records.
pub trait RosterRepository {
    fn create_category(&self, name: &str, kind: CategoryType) -> RepoResult<Category>;
    fn update_category(&self, category: &Category) -> RepoResult<()>;
    fn delete_category(&self, id: CategoryId) -> RepoResult<()>;
    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>>;
    /// Ordered by type (general, inhouse, sponsor, mlh), then name.
    fn list_categories(&self) -> RepoResult<Vec<Category>>;

    fn create_judge(&self, judge: &NewJudge) -> RepoResult<Judge>;
    /// Updates name, email, and category; a category change clears the group link.
    fn update_judge(&self, judge: &Judge) -> RepoResult<()>;
    fn delete_judge(&self, id: JudgeId) -> RepoResult<()>;
    fn get_judge(&self, id: JudgeId) -> RepoResult<Option<Judge>>;
    /// Ordered by id.
    fn list_judges(&self) -> RepoResult<Vec<Judge>>;
    /// Ordered by id.
    fn list_judges_with_categories(&self) -> RepoResult<Vec<JudgeWithCategory>>;

    fn create_project(&self, project: &NewProject) -> RepoResult<ProjectWithSubmissions>;
    /// Rewrites project fields and syncs its submissions to `category_ids`.
    fn update_project(
        &self,
        id: ProjectId,
        project: &NewProject,
    ) -> RepoResult<ProjectWithSubmissions>;
    fn delete_project(&self, id: ProjectId) -> RepoResult<()>;
    /// Ordered by project id.
    fn list_projects(&self) -> RepoResult<Vec<ProjectWithSubmissions>>;
    /// Ordered by id.
    fn list_submissions(&self) -> RepoResult<Vec<Submission>>;
}

/// SQLite-backed roster repository.
pub struct SqliteRosterRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRosterRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl RosterRepository for SqliteRosterRepository<'_> {
    fn create_category(&self, name: &str, kind: CategoryType) -> RepoResult<Category> {
        self.conn
            .execute(
                "INSERT INTO categories (name, type) VALUES (?1, ?2);",
                params![name, kind.as_str()],
            )
            .map_err(|err| unique_conflict(err, format!("category `{name}` already exists")))?;

        Ok(Category::new(self.conn.last_insert_rowid(), name, kind))
    }

    fn update_category(&self, category: &Category) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE categories SET name = ?1, type = ?2 WHERE id = ?3;",
                params![category.name, category.kind.as_str(), category.id],
            )
            .map_err(|err| {
                unique_conflict(err, format!("category `{}` already exists", category.name))
            })?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "category",
                id: category.id,
            });
        }
        Ok(())
    }

    fn delete_category(&self, id: CategoryId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM categories WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "category",
                id,
            });
        }
        Ok(())
    }

    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>> {
        let row: Option<(CategoryId, String, String)> = self
            .conn
            .query_row(
                "SELECT id, name, type FROM categories WHERE id = ?1;",
                [id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        row.map(|(id, name, kind)| Ok(Category::new(id, name, parse_category_type(&kind)?)))
            .transpose()
    }

    fn list_categories(&self) -> RepoResult<Vec<Category>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, type
             FROM categories
             ORDER BY CASE type
                 WHEN 'general' THEN 0
                 WHEN 'inhouse' THEN 1
                 WHEN 'sponsor' THEN 2
                 ELSE 3
             END, name ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            let kind: String = row.get("type")?;
            categories.push(Category::new(
                row.get("id")?,
                row.get::<_, String>("name")?,
                parse_category_type(&kind)?,
            ));
        }
        Ok(categories)
    }

    fn create_judge(&self, judge: &NewJudge) -> RepoResult<Judge> {
        ensure_category_exists(self.conn, judge.category_id)?;
        self.conn.execute(
            "INSERT INTO judges (name, email, category_id) VALUES (?1, ?2, ?3);",
            params![judge.name, judge.email, judge.category_id],
        )?;

        Ok(Judge {
            id: self.conn.last_insert_rowid(),
            name: judge.name.clone(),
            email: judge.email.clone(),
            category_id: judge.category_id,
            judge_group_id: None,
        })
    }

    fn update_judge(&self, judge: &Judge) -> RepoResult<()> {
        ensure_category_exists(self.conn, judge.category_id)?;
        let changed = self.conn.execute(
            "UPDATE judges
             SET
                name = ?1,
                email = ?2,
                judge_group_id = CASE WHEN category_id = ?3 THEN judge_group_id ELSE NULL END,
                category_id = ?3
             WHERE id = ?4;",
            params![judge.name, judge.email, judge.category_id, judge.id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "judge",
                id: judge.id,
            });
        }
        Ok(())
    }

    fn delete_judge(&self, id: JudgeId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM judges WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "judge", id });
        }
        Ok(())
    }

    fn get_judge(&self, id: JudgeId) -> RepoResult<Option<Judge>> {
        let judge = self
            .conn
            .query_row(
                "SELECT id, name, email, category_id, judge_group_id FROM judges WHERE id = ?1;",
                [id],
                parse_judge_row,
            )
            .optional()?;
        Ok(judge)
    }

    fn list_judges(&self) -> RepoResult<Vec<Judge>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, email, category_id, judge_group_id FROM judges ORDER BY id ASC;",
        )?;
        let judges = stmt
            .query_map([], parse_judge_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(judges)
    }

    fn list_judges_with_categories(&self) -> RepoResult<Vec<JudgeWithCategory>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                j.id,
                j.name,
                j.email,
                j.category_id,
                j.judge_group_id,
                c.name AS category_name,
                c.type AS category_type
             FROM judges j
             JOIN categories c ON c.id = j.category_id
             ORDER BY j.id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut judges = Vec::new();
        while let Some(row) = rows.next()? {
            let judge = parse_judge_row(row)?;
            let kind: String = row.get("category_type")?;
            let category = Category::new(
                judge.category_id,
                row.get::<_, String>("category_name")?,
                parse_category_type(&kind)?,
            );
            judges.push(JudgeWithCategory { judge, category });
        }
        Ok(judges)
    }

    fn create_project(&self, project: &NewProject) -> RepoResult<ProjectWithSubmissions> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO projects (name, location, location2) VALUES (?1, ?2, ?3);",
            params![project.name, project.location, project.location2],
        )?;
        let project_id = tx.last_insert_rowid();

        let mut submissions = Vec::with_capacity(project.category_ids.len());
        {
            let mut insert = tx.prepare(
                "INSERT INTO submissions (project_id, category_id) VALUES (?1, ?2);",
            )?;
            for category_id in &project.category_ids {
                ensure_category_exists(&tx, *category_id)?;
                insert.execute(params![project_id, category_id])?;
                submissions.push(Submission {
                    id: tx.last_insert_rowid(),
                    project_id,
                    category_id: *category_id,
                });
            }
        }
        tx.commit()?;

        submissions.sort_by_key(|submission| submission.category_id);
        Ok(ProjectWithSubmissions {
            project: Project {
                id: project_id,
                name: project.name.clone(),
                location: project.location.clone(),
                location2: project.location2.clone(),
            },
            submissions,
        })
    }

    fn update_project(
        &self,
        id: ProjectId,
        project: &NewProject,
    ) -> RepoResult<ProjectWithSubmissions> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE projects SET name = ?1, location = ?2, location2 = ?3 WHERE id = ?4;",
            params![project.name, project.location, project.location2, id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "project",
                id,
            });
        }

        let existing: Vec<Submission> = {
            let mut stmt = tx.prepare(
                "SELECT id, project_id, category_id FROM submissions WHERE project_id = ?1;",
            )?;
            let rows = stmt
                .query_map([id], parse_submission_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        for submission in &existing {
            if !project.category_ids.contains(&submission.category_id) {
                tx.execute(
                    "DELETE FROM submissions WHERE id = ?1 AND project_id = ?2;",
                    params![submission.id, id],
                )?;
            }
        }
        for category_id in &project.category_ids {
            if existing
                .iter()
                .any(|submission| submission.category_id == *category_id)
            {
                continue;
            }
            ensure_category_exists(&tx, *category_id)?;
            tx.execute(
                "INSERT INTO submissions (project_id, category_id) VALUES (?1, ?2);",
                params![id, category_id],
            )?;
        }

        let submissions = {
            let mut stmt = tx.prepare(
                "SELECT id, project_id, category_id FROM submissions
                 WHERE project_id = ?1
                 ORDER BY category_id ASC;",
            )?;
            let rows = stmt
                .query_map([id], parse_submission_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };
        tx.commit()?;

        Ok(ProjectWithSubmissions {
            project: Project {
                id,
                name: project.name.clone(),
                location: project.location.clone(),
                location2: project.location2.clone(),
            },
            submissions,
        })
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM projects WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "project",
                id,
            });
        }
        Ok(())
    }

    fn list_projects(&self) -> RepoResult<Vec<ProjectWithSubmissions>> {
        let mut by_project: BTreeMap<ProjectId, ProjectWithSubmissions> = BTreeMap::new();
        {
            let mut stmt = self.conn.prepare(
                "SELECT id, name, location, location2 FROM projects ORDER BY id ASC;",
            )?;
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                let project = Project {
                    id: row.get("id")?,
                    name: row.get("name")?,
                    location: row.get("location")?,
                    location2: row.get("location2")?,
                };
                by_project.insert(
                    project.id,
                    ProjectWithSubmissions {
                        project,
                        submissions: Vec::new(),
                    },
                );
            }
        }

        let mut stmt = self.conn.prepare(
            "SELECT id, project_id, category_id FROM submissions ORDER BY project_id, category_id;",
        )?;
        for submission in stmt.query_map([], parse_submission_row)? {
            let submission = submission?;
            let entry = by_project.get_mut(&submission.project_id).ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "submission {} references missing project {}",
                    submission.id, submission.project_id
                ))
            })?;
            entry.submissions.push(submission);
        }

        Ok(by_project.into_values().collect())
    }

    fn list_submissions(&self) -> RepoResult<Vec<Submission>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, project_id, category_id FROM submissions ORDER BY id ASC;")?;
        let submissions = stmt
            .query_map([], parse_submission_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(submissions)
    }
}

fn ensure_category_exists(conn: &Connection, id: CategoryId) -> RepoResult<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM categories WHERE id = ?1);",
        [id],
        |row| row.get(0),
    )?;
    if !exists {
        return Err(RepoError::NotFound {
            entity: "category",
            id,
        });
    }
    Ok(())
}

fn parse_judge_row(row: &Row<'_>) -> rusqlite::Result<Judge> {
    Ok(Judge {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        category_id: row.get("category_id")?,
        judge_group_id: row.get("judge_group_id")?,
    })
}

fn parse_submission_row(row: &Row<'_>) -> rusqlite::Result<Submission> {
    Ok(Submission {
        id: row.get("id")?,
        project_id: row.get("project_id")?,
        category_id: row.get("category_id")?,
    })
}

pub(crate) fn parse_category_type(value: &str) -> RepoResult<CategoryType> {
    CategoryType::parse(value).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid category type `{value}` in categories.type"))
    })
}

fn unique_conflict(err: rusqlite::Error, message: String) -> RepoError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            RepoError::Conflict(message)
        }
        _ => err.into(),
    }
}
