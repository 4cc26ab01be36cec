//! Judging repository: derived judge groups and assignments.
//!
//! # Responsibility
//! - Replace the judge group set and judge links in one transaction.
//! - Replace the assignment set in one transaction, inserting in batches.
//! - Serve group and assignment read models.
//!
//! # Invariants
//! - Readers never observe groups or assignments deleted but not replaced.
//! - Replacing groups drops every assignment (assignments reference groups).
//! - A judge only links to a group of its own category.

use crate::engine::group_formation::PlannedJudgeGroup;
use crate::model::category::CategoryId;
use crate::model::judge::{JudgeGroup, JudgeGroupId, JudgeId};
use crate::model::project::{Assignment, ProjectId, SubmissionId};
use crate::repo::roster_repo::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::collections::BTreeMap;

/// Assignment joined with its group and project for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentRecord {
    pub submission_id: SubmissionId,
    pub judge_group_id: JudgeGroupId,
    pub group_name: String,
    pub category_id: CategoryId,
    pub category_name: String,
    pub project_id: ProjectId,
    pub project_name: String,
}

/// Outcome of a batched assignment replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceAssignmentsOutcome {
    pub deleted: usize,
    pub inserted: usize,
    pub batches: usize,
}

/// Repository interface for derived judging state.
pub trait JudgingRepository {
    /// Deletes every group and judge link, then inserts `groups`.
    ///
    /// Returns persisted groups in input order.
    fn replace_judge_groups(&self, groups: &[PlannedJudgeGroup]) -> RepoResult<Vec<JudgeGroup>>;
    /// Deletes every group; returns the number removed.
    fn clear_judge_groups(&self) -> RepoResult<usize>;
    fn get_judge_group(&self, id: JudgeGroupId) -> RepoResult<Option<JudgeGroup>>;
    /// Ordered by category id, then formation order.
    fn list_judge_groups(&self) -> RepoResult<Vec<JudgeGroup>>;
    /// Links one judge to one group of the same category.
    ///
    /// `NotFound` when the judge is missing or its category differs.
    fn set_judge_group(&self, judge_id: JudgeId, judge_group_id: JudgeGroupId) -> RepoResult<()>;
    /// Deletes every assignment, then inserts `assignments` in chunks of `batch_size`.
    fn replace_assignments(
        &self,
        assignments: &[Assignment],
        batch_size: usize,
    ) -> RepoResult<ReplaceAssignmentsOutcome>;
    /// Ordered by category, group formation order, then submission id.
    fn list_assignments(&self) -> RepoResult<Vec<AssignmentRecord>>;
}

/// SQLite-backed judging repository.
pub struct SqliteJudgingRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteJudgingRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl JudgingRepository for SqliteJudgingRepository<'_> {
    fn replace_judge_groups(&self, groups: &[PlannedJudgeGroup]) -> RepoResult<Vec<JudgeGroup>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute("UPDATE judges SET judge_group_id = NULL;", [])?;
        tx.execute("DELETE FROM judge_groups;", [])?;

        let mut persisted = Vec::with_capacity(groups.len());
        {
            let mut insert_group =
                tx.prepare("INSERT INTO judge_groups (category_id, name) VALUES (?1, ?2);")?;
            let mut link_judge = tx.prepare(
                "UPDATE judges SET judge_group_id = ?1 WHERE id = ?2 AND category_id = ?3;",
            )?;

            for group in groups {
                insert_group.execute(params![group.category_id, group.name])?;
                let group_id = tx.last_insert_rowid();

                for judge_id in &group.member_judge_ids {
                    let changed = link_judge.execute(params![group_id, judge_id, group.category_id])?;
                    if changed == 0 {
                        return Err(RepoError::NotFound {
                            entity: "judge in group category",
                            id: *judge_id,
                        });
                    }
                }

                let mut member_judge_ids = group.member_judge_ids.clone();
                member_judge_ids.sort_unstable();
                persisted.push(JudgeGroup {
                    id: group_id,
                    category_id: group.category_id,
                    name: group.name.clone(),
                    member_judge_ids,
                });
            }
        }
        tx.commit()?;

        Ok(persisted)
    }

    fn clear_judge_groups(&self) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute("UPDATE judges SET judge_group_id = NULL;", [])?;
        let deleted = tx.execute("DELETE FROM judge_groups;", [])?;
        tx.commit()?;
        Ok(deleted)
    }

    fn get_judge_group(&self, id: JudgeGroupId) -> RepoResult<Option<JudgeGroup>> {
        let header: Option<(CategoryId, String)> = self
            .conn
            .query_row(
                "SELECT category_id, name FROM judge_groups WHERE id = ?1;",
                [id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let Some((category_id, name)) = header else {
            return Ok(None);
        };

        let mut stmt = self
            .conn
            .prepare("SELECT id FROM judges WHERE judge_group_id = ?1 ORDER BY id ASC;")?;
        let member_judge_ids = stmt
            .query_map([id], |row| row.get(0))?
            .collect::<Result<Vec<JudgeId>, _>>()?;

        Ok(Some(JudgeGroup {
            id,
            category_id,
            name,
            member_judge_ids,
        }))
    }

    fn list_judge_groups(&self) -> RepoResult<Vec<JudgeGroup>> {
        let mut groups: BTreeMap<JudgeGroupId, JudgeGroup> = BTreeMap::new();
        let mut order = Vec::new();
        {
            let mut stmt = self.conn.prepare(
                "SELECT id, category_id, name FROM judge_groups ORDER BY category_id ASC, id ASC;",
            )?;
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                let group = JudgeGroup {
                    id: row.get("id")?,
                    category_id: row.get("category_id")?,
                    name: row.get("name")?,
                    member_judge_ids: Vec::new(),
                };
                order.push(group.id);
                groups.insert(group.id, group);
            }
        }

        let mut stmt = self.conn.prepare(
            "SELECT id, judge_group_id FROM judges
             WHERE judge_group_id IS NOT NULL
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let judge_id: JudgeId = row.get("id")?;
            let group_id: JudgeGroupId = row.get("judge_group_id")?;
            let group = groups.get_mut(&group_id).ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "judge {judge_id} references missing group {group_id}"
                ))
            })?;
            group.member_judge_ids.push(judge_id);
        }

        Ok(order
            .into_iter()
            .filter_map(|id| groups.remove(&id))
            .collect())
    }

    fn set_judge_group(&self, judge_id: JudgeId, judge_group_id: JudgeGroupId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE judges SET judge_group_id = ?1
             WHERE id = ?2
               AND category_id = (SELECT category_id FROM judge_groups WHERE id = ?1);",
            params![judge_group_id, judge_id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "judge in group category",
                id: judge_id,
            });
        }
        Ok(())
    }

    fn replace_assignments(
        &self,
        assignments: &[Assignment],
        batch_size: usize,
    ) -> RepoResult<ReplaceAssignmentsOutcome> {
        if batch_size == 0 {
            return Err(RepoError::InvalidData(
                "assignment batch size must be at least 1".to_string(),
            ));
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let deleted = tx.execute("DELETE FROM assignments;", [])?;

        let mut inserted = 0;
        let mut batches = 0;
        for chunk in assignments.chunks(batch_size) {
            inserted += insert_assignment_batch(&tx, chunk)?;
            batches += 1;
        }
        tx.commit()?;

        Ok(ReplaceAssignmentsOutcome {
            deleted,
            inserted,
            batches,
        })
    }

    fn list_assignments(&self) -> RepoResult<Vec<AssignmentRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                a.submission_id,
                a.judge_group_id,
                g.name AS group_name,
                g.category_id,
                c.name AS category_name,
                p.id AS project_id,
                p.name AS project_name
             FROM assignments a
             JOIN judge_groups g ON g.id = a.judge_group_id
             JOIN categories c ON c.id = g.category_id
             JOIN submissions s ON s.id = a.submission_id
             JOIN projects p ON p.id = s.project_id
             ORDER BY g.category_id ASC, g.id ASC, a.submission_id ASC;",
        )?;
        let records = stmt
            .query_map([], |row| {
                Ok(AssignmentRecord {
                    submission_id: row.get("submission_id")?,
                    judge_group_id: row.get("judge_group_id")?,
                    group_name: row.get("group_name")?,
                    category_id: row.get("category_id")?,
                    category_name: row.get("category_name")?,
                    project_id: row.get("project_id")?,
                    project_name: row.get("project_name")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

fn insert_assignment_batch(tx: &Transaction<'_>, chunk: &[Assignment]) -> RepoResult<usize> {
    let placeholders = vec!["(?, ?)"; chunk.len()].join(", ");
    let sql =
        format!("INSERT INTO assignments (submission_id, judge_group_id) VALUES {placeholders};");
    let values = chunk.iter().flat_map(|assignment| {
        [
            Value::Integer(assignment.submission_id),
            Value::Integer(assignment.judge_group_id),
        ]
    });
    let inserted = tx.execute(&sql, params_from_iter(values))?;
    Ok(inserted)
}
