use judgeplan_core::db::open_db_in_memory;
use judgeplan_core::{
    CategoryType, JudgingRepository, RepoError, RosterRepository, RosterService,
    RosterValidationError, SqliteJudgingRepository, SqliteRosterRepository, GENERAL_CATEGORY_ID,
};

fn setup() -> rusqlite::Connection {
    open_db_in_memory().unwrap()
}

#[test]
fn create_category_trims_name_and_lists_by_type_then_name() {
    let conn = setup();
    let service = RosterService::new(SqliteRosterRepository::new(&conn));

    service
        .create_category("  Best Use of Maps ", CategoryType::Sponsor)
        .unwrap();
    service
        .create_category("Best Hardware Hack", CategoryType::Inhouse)
        .unwrap();
    service
        .create_category("Best Design", CategoryType::Inhouse)
        .unwrap();

    let names: Vec<String> = service
        .list_categories()
        .unwrap()
        .into_iter()
        .map(|category| category.name)
        .collect();
    assert_eq!(
        names,
        ["General", "Best Design", "Best Hardware Hack", "Best Use of Maps"]
    );
}

#[test]
fn duplicate_category_name_is_a_conflict() {
    let conn = setup();
    let service = RosterService::new(SqliteRosterRepository::new(&conn));

    service
        .create_category("Best Design", CategoryType::Inhouse)
        .unwrap();
    let err = service
        .create_category("Best Design", CategoryType::Sponsor)
        .unwrap_err();
    assert!(matches!(err, RepoError::Conflict(_)));
}

#[test]
fn general_category_is_reserved() {
    let conn = setup();
    let service = RosterService::new(SqliteRosterRepository::new(&conn));

    let err = service
        .create_category("Second General", CategoryType::General)
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(RosterValidationError::ReservedGeneralCategory)
    ));

    let err = service
        .update_category(GENERAL_CATEGORY_ID, "General", CategoryType::Inhouse)
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(RosterValidationError::GeneralCategoryImmutable(1))
    ));

    let err = service.delete_category(GENERAL_CATEGORY_ID).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(RosterValidationError::GeneralCategoryImmutable(1))
    ));

    service
        .update_category(GENERAL_CATEGORY_ID, "Overall", CategoryType::General)
        .unwrap();
    let general = SqliteRosterRepository::new(&conn)
        .get_category(GENERAL_CATEGORY_ID)
        .unwrap()
        .unwrap();
    assert_eq!(general.name, "Overall");
}

#[test]
fn create_judge_normalizes_email_and_requires_existing_category() {
    let conn = setup();
    let service = RosterService::new(SqliteRosterRepository::new(&conn));

    let judge = service
        .create_judge(" Ada Lovelace ", "Ada@Example.org", GENERAL_CATEGORY_ID)
        .unwrap();
    assert_eq!(judge.name, "Ada Lovelace");
    assert_eq!(judge.email, "ada@example.org");
    assert_eq!(judge.judge_group_id, None);

    let err = service
        .create_judge("Grace", "not-an-email", GENERAL_CATEGORY_ID)
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(RosterValidationError::InvalidEmail(_))
    ));

    let err = service
        .create_judge("Grace", "grace@example.org", 42)
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            entity: "category",
            id: 42
        }
    ));
}

#[test]
fn create_project_always_adds_general_submission() {
    let conn = setup();
    let service = RosterService::new(SqliteRosterRepository::new(&conn));
    let design = service
        .create_category("Best Design", CategoryType::Inhouse)
        .unwrap();

    let created = service
        .create_project("Rover", " T12 ", "", &[design.id, design.id])
        .unwrap();
    let categories: Vec<i64> = created
        .submissions
        .iter()
        .map(|submission| submission.category_id)
        .collect();
    assert_eq!(categories, vec![GENERAL_CATEGORY_ID, design.id]);
    assert_eq!(created.project.location, "T12");

    let listed = service.list_projects().unwrap();
    assert_eq!(listed, vec![created]);
}

#[test]
fn create_project_with_unknown_category_writes_nothing() {
    let conn = setup();
    let service = RosterService::new(SqliteRosterRepository::new(&conn));

    let err = service.create_project("Rover", "", "", &[99]).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            entity: "category",
            id: 99
        }
    ));
    assert!(service.list_projects().unwrap().is_empty());
}

#[test]
fn update_project_resyncs_only_its_own_submissions() {
    let conn = setup();
    let service = RosterService::new(SqliteRosterRepository::new(&conn));
    let design = service
        .create_category("Best Design", CategoryType::Inhouse)
        .unwrap();
    let maps = service
        .create_category("Best Use of Maps", CategoryType::Sponsor)
        .unwrap();
    let hardware = service
        .create_category("Best Hardware Hack", CategoryType::Inhouse)
        .unwrap();

    let rover = service
        .create_project("Rover", "T1", "", &[design.id, maps.id])
        .unwrap();
    let atlas = service
        .create_project("Atlas", "T2", "", &[design.id])
        .unwrap();
    let rover_general = rover.submissions[0].id;

    conn.execute(
        "INSERT INTO judge_groups (id, category_id, name) VALUES (7, 1, 'A1');",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO assignments (submission_id, judge_group_id) VALUES (?1, 7);",
        [rover_general],
    )
    .unwrap();

    let updated = service
        .update_project(rover.project.id, " Rover II ", "Hall B", "T9", &[maps.id, hardware.id])
        .unwrap();
    assert_eq!(updated.project.name, "Rover II");
    assert_eq!(updated.project.location, "Hall B");
    let categories: Vec<i64> = updated
        .submissions
        .iter()
        .map(|submission| submission.category_id)
        .collect();
    assert_eq!(categories, vec![GENERAL_CATEGORY_ID, maps.id, hardware.id]);
    assert_eq!(updated.submissions[0].id, rover_general);
    assert_eq!(updated.submissions[1].id, rover.submissions[2].id);

    let listed = service.list_projects().unwrap();
    assert_eq!(listed, vec![updated, atlas]);

    let kept: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM assignments WHERE submission_id = ?1;",
            [rover_general],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(kept, 1);
}

#[test]
fn update_project_with_unknown_category_changes_nothing() {
    let conn = setup();
    let service = RosterService::new(SqliteRosterRepository::new(&conn));
    let design = service
        .create_category("Best Design", CategoryType::Inhouse)
        .unwrap();
    let rover = service
        .create_project("Rover", "T1", "", &[design.id])
        .unwrap();

    let err = service
        .update_project(rover.project.id, "Rover II", "T2", "", &[99])
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            entity: "category",
            id: 99
        }
    ));
    assert_eq!(service.list_projects().unwrap(), vec![rover]);

    let err = service.update_project(404, "Ghost", "", "", &[]).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            entity: "project",
            id: 404
        }
    ));
}

#[test]
fn changing_judge_category_unlinks_group() {
    let conn = setup();
    let service = RosterService::new(SqliteRosterRepository::new(&conn));
    let design = service
        .create_category("Best Design", CategoryType::Inhouse)
        .unwrap();
    let judge = service
        .create_judge("Ada", "ada@example.org", GENERAL_CATEGORY_ID)
        .unwrap();

    conn.execute(
        "INSERT INTO judge_groups (id, category_id, name) VALUES (7, 1, 'A1');",
        [],
    )
    .unwrap();
    SqliteJudgingRepository::new(&conn)
        .set_judge_group(judge.id, 7)
        .unwrap();

    let renamed = service
        .update_judge(judge.id, "Ada L.", "ada@example.org", GENERAL_CATEGORY_ID)
        .unwrap();
    assert_eq!(renamed.judge_group_id, Some(7));

    let moved = service
        .update_judge(judge.id, "Ada L.", "ada@example.org", design.id)
        .unwrap();
    assert_eq!(moved.judge_group_id, None);

    let stored = SqliteRosterRepository::new(&conn)
        .get_judge(judge.id)
        .unwrap()
        .unwrap();
    assert_eq!(stored, moved);
}

#[test]
fn deleting_missing_records_reports_not_found() {
    let conn = setup();
    let service = RosterService::new(SqliteRosterRepository::new(&conn));

    assert!(matches!(
        service.delete_judge(5),
        Err(RepoError::NotFound { entity: "judge", id: 5 })
    ));
    assert!(matches!(
        service.delete_project(6),
        Err(RepoError::NotFound {
            entity: "project",
            id: 6
        })
    ));
    assert!(matches!(
        service.delete_category(7),
        Err(RepoError::NotFound {
            entity: "category",
            id: 7
        })
    ));
}
