//! Command-line entry point for judge group and assignment runs.
//!
//! # Responsibility
//! - Bootstrap logging, planning config, and the SQLite database.
//! - Dispatch one roster or judging command and print a plain-text summary.
//!
//! # Exit codes
//! - `0` command succeeded.
//! - `1` command failed (planning or storage error).
//! - `2` bootstrap failed (logging, config file, or database open).

use clap::{Parser, Subcommand};
use judgeplan_core::db::open_db;
use judgeplan_core::{
    init_logging, CategoryId, CategoryType, JudgingService, JudgingServiceError, PlanningConfig,
    RepoError, RosterService, SqliteJudgingRepository, SqliteRosterRepository,
};
use log::error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::process::ExitCode;

const EXIT_COMMAND_FAILED: u8 = 1;
const EXIT_BOOTSTRAP_FAILED: u8 = 2;

#[derive(Parser)]
#[command(
    name = "judgeplan",
    version,
    about = "Form hackathon judge groups and assign submissions to them"
)]
struct Cli {
    /// SQLite database file; created and migrated when missing.
    #[arg(long, env = "JUDGEPLAN_DB", default_value = "judgeplan.sqlite3")]
    db: PathBuf,

    /// JSON planning config; built-in defaults when omitted.
    #[arg(long, env = "JUDGEPLAN_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,

    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a judging category (inhouse, sponsor, or mlh)
    AddCategory {
        #[arg(long)]
        name: String,
        #[arg(long = "type", value_parser = parse_category_type)]
        kind: CategoryType,
    },
    /// Add a judge to a category
    AddJudge {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value_t = 1)]
        category: CategoryId,
    },
    /// Add a project; General is always included
    AddProject {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        location: String,
        #[arg(long, default_value = "")]
        location2: String,
        /// Repeat for each category entered.
        #[arg(long = "category")]
        categories: Vec<CategoryId>,
    },
    /// Rebuild every judge group from the current roster
    ReorganizeGroups,
    /// Recompute every submission assignment from stored groups
    AssignSubmissions,
    /// Print judge groups with their members
    ListGroups,
    /// Print submission assignments
    ListAssignments,
    /// Delete every judge group and its assignments
    ClearGroups,
    /// Move one judge into another group of the same category
    MoveJudge {
        #[arg(long)]
        judge: i64,
        #[arg(long)]
        group: i64,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(&cli.log_level, &cli.log_dir) {
        eprintln!("fatal: logging setup failed: {err}");
        return ExitCode::from(EXIT_BOOTSTRAP_FAILED);
    }

    let config = match &cli.config {
        Some(path) => PlanningConfig::from_json_file(path),
        None => Ok(PlanningConfig::default()),
    };
    let config = match config.and_then(|config| config.validate().map(|()| config)) {
        Ok(config) => config,
        Err(err) => {
            error!("event=cli_bootstrap module=cli status=error stage=config error={err}");
            eprintln!("fatal: {err}");
            return ExitCode::from(EXIT_BOOTSTRAP_FAILED);
        }
    };

    let conn = match open_db(&cli.db) {
        Ok(conn) => conn,
        Err(err) => {
            error!("event=cli_bootstrap module=cli status=error stage=db error={err}");
            eprintln!("fatal: cannot open `{}`: {err}", cli.db.display());
            return ExitCode::from(EXIT_BOOTSTRAP_FAILED);
        }
    };

    let roster = RosterService::new(SqliteRosterRepository::new(&conn));
    let judging = JudgingService::new(
        SqliteRosterRepository::new(&conn),
        SqliteJudgingRepository::new(&conn),
        config,
    );

    match run(&roster, &judging, cli.cmd) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(EXIT_COMMAND_FAILED)
        }
    }
}

/// Failure of a dispatched command.
#[derive(Debug)]
enum CommandError {
    Roster(RepoError),
    Judging(JudgingServiceError),
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Roster(err) => write!(f, "error: {err}"),
            Self::Judging(err) => match err.planning_kind() {
                Some(kind) => write!(f, "error ({}): {err}", kind.as_str()),
                None => write!(f, "error: {err}"),
            },
        }
    }
}

impl From<RepoError> for CommandError {
    fn from(value: RepoError) -> Self {
        Self::Roster(value)
    }
}

impl From<JudgingServiceError> for CommandError {
    fn from(value: JudgingServiceError) -> Self {
        Self::Judging(value)
    }
}

fn parse_category_type(value: &str) -> Result<CategoryType, String> {
    CategoryType::parse(value).ok_or_else(|| {
        let known: Vec<&str> = CategoryType::ALL.iter().map(|kind| kind.as_str()).collect();
        format!("expected one of {}", known.join(", "))
    })
}

fn run(
    roster: &RosterService<SqliteRosterRepository<'_>>,
    service: &JudgingService<SqliteRosterRepository<'_>, SqliteJudgingRepository<'_>>,
    cmd: Command,
) -> Result<(), CommandError> {
    match cmd {
        Command::AddCategory { name, kind } => {
            let category = roster.create_category(&name, kind)?;
            println!(
                "category {}: {} ({})",
                category.id,
                category.name,
                category.kind.as_str()
            );
        }
        Command::AddJudge {
            name,
            email,
            category,
        } => {
            let judge = roster.create_judge(&name, &email, category)?;
            println!(
                "judge {}: {} <{}> category={}",
                judge.id, judge.name, judge.email, judge.category_id
            );
        }
        Command::AddProject {
            name,
            location,
            location2,
            categories,
        } => {
            let created = roster.create_project(&name, &location, &location2, &categories)?;
            let submitted: Vec<String> = created
                .submissions
                .iter()
                .map(|submission| submission.category_id.to_string())
                .collect();
            println!(
                "project {}: {} categories=[{}]",
                created.project.id,
                created.project.name,
                submitted.join(",")
            );
        }
        Command::ReorganizeGroups => {
            let report = service.reorganize_judge_groups()?;
            println!(
                "run {}: {} judges in {} groups",
                report.run_id,
                report.judge_count,
                report.groups.len()
            );
            for group in &report.groups {
                println!("  {} ({} judges)", group.name, group.judge_count());
            }
        }
        Command::AssignSubmissions => {
            let report = service.assign_submissions_to_groups()?;
            println!(
                "run {}: {} assignments for {} projects ({} top-ups, {} batches)",
                report.run_id,
                report.assignment_count,
                report.project_count,
                report.top_up_count,
                report.batches
            );
            if let Some(min) = report.min_project_coverage {
                println!("  fewest judges on any project: {min}");
            }
        }
        Command::ListGroups => {
            for group in service.list_judge_groups()? {
                let members: Vec<String> = group
                    .member_judge_ids
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                println!(
                    "{}\tgroup={}\tcategory={}\tjudges=[{}]",
                    group.name,
                    group.id,
                    group.category_id,
                    members.join(",")
                );
            }
        }
        Command::ListAssignments => {
            for record in service.list_assignments()? {
                println!(
                    "{}\t{}\t{}\tsubmission={}",
                    record.group_name,
                    record.category_name,
                    record.project_name,
                    record.submission_id
                );
            }
        }
        Command::ClearGroups => {
            let deleted = service.clear_judge_groups()?;
            println!("deleted {deleted} judge groups");
        }
        Command::MoveJudge { judge, group } => {
            service.move_judge(judge, group)?;
            println!("judge {judge} moved to group {group}");
        }
    }
    Ok(())
}
