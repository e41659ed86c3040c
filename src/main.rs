use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate, NaiveTime, TimeZone};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use studysmart_lib::{
    db::{Database, Priority, Subject},
    settings, stats,
    timer::{TimerAction, TimerController},
    viewmodel::{
        DashboardEvent, DashboardViewModel, SessionEvent, SessionViewModel, SnackBarEvent,
        SnackBarReceiver, SubjectEvent, SubjectViewModel, TaskEvent, TaskViewModel,
    },
};

#[derive(Parser)]
#[command(name = "studysmart")]
#[command(about = "Track study subjects, tasks and timed study sessions", long_about = None)]
struct Cli {
    /// Directory holding the database and settings. Defaults to STUDYSMART_DATA_DIR
    /// or the platform data directory.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Totals, subjects, upcoming tasks and the last five sessions
    Dashboard,
    /// Manage subjects
    Subject {
        #[command(subcommand)]
        command: SubjectCommand,
    },
    /// Manage tasks
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },
    /// List, delete or record study sessions
    Session {
        #[command(subcommand)]
        command: SessionCommand,
    },
}

#[derive(Subcommand)]
enum SubjectCommand {
    Add {
        #[arg(short, long)]
        name: String,
        /// Goal study hours (1 to 1000)
        #[arg(short, long)]
        goal: String,
    },
    List,
    Show { id: i64 },
    /// Delete a subject with all of its tasks and sessions
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum TaskCommand {
    Add {
        #[arg(short, long)]
        subject: i64,
        #[arg(short, long)]
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// Due date (YYYY-MM-DD). Defaults to now.
        #[arg(long)]
        due: Option<String>,
        /// low, medium, high or 0-2
        #[arg(short, long, default_value = "low")]
        priority: String,
    },
    List {
        #[arg(short, long)]
        subject: Option<i64>,
    },
    /// Flip a task between upcoming and completed
    Toggle { id: i64 },
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum SessionCommand {
    List,
    Delete { id: i64 },
    /// Run the timer; reads start, stop, cancel and finish from stdin
    Track {
        #[arg(short, long)]
        subject: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    studysmart_lib::init_logging();

    let cli = Cli::parse();
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => settings::data_dir()?,
    };
    let app = studysmart_lib::init(&data_dir)?;

    match cli.command {
        Commands::Dashboard => show_dashboard(app.db).await,
        Commands::Subject { command } => run_subject(app.db, command).await,
        Commands::Task { command } => run_task(app.db, command).await,
        Commands::Session { command } => run_session(app.db, app.timer, command).await,
    }
}

/// Prints every queued snackbar message.
fn report(receiver: &mut SnackBarReceiver) {
    while let Ok(event) = receiver.try_recv() {
        if let SnackBarEvent::ShowSnackBar { message, .. } = event {
            println!("{message}");
        }
    }
}

fn colors_label(colors: &[i32]) -> String {
    colors
        .iter()
        .map(|color| format!("#{:08X}", *color as u32))
        .collect::<Vec<_>>()
        .join(" -> ")
}

async fn show_dashboard(db: Database) -> Result<()> {
    let (vm, _snackbar) = DashboardViewModel::new(db);
    vm.refresh().await?;
    let state = vm.state();

    println!("Subjects:            {}", state.total_subject_count);
    println!("Studied hours:       {:.2}", state.total_studied_hours);
    println!("Goal study hours:    {:.2}", state.total_goal_study_hours);

    println!();
    println!("Subjects");
    for subject in &state.subjects {
        println!("  [{}] {} ({} h goal)", subject.id, subject.name, subject.goal_hours);
    }

    println!();
    println!("Upcoming tasks");
    for task in &state.upcoming_tasks {
        println!(
            "  [{}] {} - {} - {} priority - {}",
            task.id,
            task.title,
            task.related_to_subject,
            task.priority,
            stats::format_date(task.due_date)
        );
    }

    println!();
    println!("Recent study sessions");
    for session in &state.recent_sessions {
        println!(
            "  [{}] {} - {} - {:.2} hr",
            session.id,
            session.related_to_subject,
            stats::format_date(session.date),
            stats::to_hours(session.duration)
        );
    }
    Ok(())
}

async fn run_subject(db: Database, command: SubjectCommand) -> Result<()> {
    match command {
        SubjectCommand::Add { name, goal } => {
            let (vm, mut snackbar) = DashboardViewModel::new(db);
            vm.on_event(DashboardEvent::SubjectNameChanged(name)).await;
            vm.on_event(DashboardEvent::GoalStudyHoursChanged(goal)).await;
            vm.on_event(DashboardEvent::SaveSubject).await;
            report(&mut snackbar);
        }
        SubjectCommand::List => {
            for subject in db.get_all_subjects().await? {
                println!(
                    "[{}] {} - {} h goal - {}",
                    subject.id,
                    subject.name,
                    subject.goal_hours,
                    colors_label(&subject.colors)
                );
            }
        }
        SubjectCommand::Show { id } => {
            let (vm, _snackbar) = SubjectViewModel::new(db, id).await?;
            vm.refresh().await?;
            let state = vm.state();
            if state.current_subject_id.is_none() {
                bail!("Subject {id} not found");
            }

            println!("{} ({})", state.subject_name, colors_label(&state.subject_card_colors));
            println!(
                "Studied {:.2} of {} h ({:.0}%)",
                state.studied_hours,
                state.goal_study_hours,
                state.progress * 100.0
            );
            println!("Upcoming tasks");
            for task in &state.upcoming_tasks {
                println!("  [{}] {} - {}", task.id, task.title, stats::format_date(task.due_date));
            }
            println!("Completed tasks");
            for task in &state.completed_tasks {
                println!("  [{}] {}", task.id, task.title);
            }
            println!("Recent study sessions");
            for session in &state.recent_sessions {
                println!(
                    "  [{}] {} - {:.2} hr",
                    session.id,
                    stats::format_date(session.date),
                    stats::to_hours(session.duration)
                );
            }
        }
        SubjectCommand::Delete { id } => {
            let (vm, mut snackbar) = SubjectViewModel::new(db, id).await?;
            vm.on_event(SubjectEvent::DeleteSubject).await;
            report(&mut snackbar);
        }
    }
    Ok(())
}

fn parse_due_date(raw: &str) -> Result<i64> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Invalid due date '{raw}'. Use YYYY-MM-DD"))?;
    Local
        .from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .ok_or_else(|| anyhow!("Due date '{raw}' does not exist in the local time zone"))
}

async fn run_task(db: Database, command: TaskCommand) -> Result<()> {
    match command {
        TaskCommand::Add {
            subject,
            title,
            description,
            due,
            priority,
        } => {
            let priority: Priority = priority.parse()?;
            let (vm, mut snackbar) = TaskViewModel::new(db, None, Some(subject)).await?;
            if vm.state().subject_id.is_none() {
                bail!("Subject {subject} not found");
            }

            vm.on_event(TaskEvent::TitleChanged(title)).await;
            vm.on_event(TaskEvent::DescriptionChanged(description)).await;
            vm.on_event(TaskEvent::PriorityChanged(priority)).await;
            if let Some(due) = due {
                vm.on_event(TaskEvent::DueDateChanged(parse_due_date(&due)?)).await;
                if vm.state().due_date.is_none() {
                    report(&mut snackbar);
                    return Ok(());
                }
            }
            vm.on_event(TaskEvent::SaveTask).await;
            report(&mut snackbar);
        }
        TaskCommand::List { subject } => {
            let tasks = match subject {
                Some(id) => db.get_tasks_for_subject(id).await?,
                None => db.get_all_tasks().await?,
            };
            for task in tasks {
                println!(
                    "[{}] [{}] {} - {} - {} priority - {}",
                    task.id,
                    if task.is_complete { "x" } else { " " },
                    task.title,
                    task.related_to_subject,
                    task.priority,
                    stats::format_date(task.due_date)
                );
            }
        }
        TaskCommand::Toggle { id } => {
            let task = db
                .get_task(id)
                .await?
                .ok_or_else(|| anyhow!("Task {id} not found"))?;
            let (vm, mut snackbar) = DashboardViewModel::new(db);
            vm.on_event(DashboardEvent::ToggleTaskComplete(task)).await;
            report(&mut snackbar);
        }
        TaskCommand::Delete { id } => {
            let (vm, mut snackbar) = TaskViewModel::new(db, Some(id), None).await?;
            vm.on_event(TaskEvent::DeleteTask).await;
            report(&mut snackbar);
        }
    }
    Ok(())
}

async fn run_session(db: Database, timer: TimerController, command: SessionCommand) -> Result<()> {
    let (vm, mut snackbar) = SessionViewModel::new(db.clone(), timer).await;

    match command {
        SessionCommand::List => {
            vm.refresh().await?;
            for session in vm.state().sessions {
                println!(
                    "[{}] {} - {} - {:.2} hr",
                    session.id,
                    session.related_to_subject,
                    stats::format_date(session.date),
                    stats::to_hours(session.duration)
                );
            }
        }
        SessionCommand::Delete { id } => {
            vm.refresh().await?;
            let session = vm
                .state()
                .sessions
                .into_iter()
                .find(|session| session.id == id)
                .ok_or_else(|| anyhow!("Session {id} not found"))?;
            vm.on_event(SessionEvent::DeleteSessionClicked(session)).await;
            vm.on_event(SessionEvent::DeleteSession).await;
            report(&mut snackbar);
        }
        SessionCommand::Track { subject } => {
            let subject = db
                .get_subject(subject)
                .await?
                .ok_or_else(|| anyhow!("Subject {subject} not found"))?;
            track(Arc::new(vm), snackbar, subject).await?;
        }
    }
    Ok(())
}

async fn track(
    vm: Arc<SessionViewModel>,
    mut snackbar: SnackBarReceiver,
    subject: Subject,
) -> Result<()> {
    println!("Tracking {}. Commands: start, stop, cancel, finish, quit", subject.name);
    vm.on_event(SessionEvent::RelatedSubjectSelected(subject)).await;

    let mut snapshots = vm.timer();
    let printer = tokio::spawn(async move {
        while snapshots.changed().await.is_ok() {
            let display = snapshots.borrow_and_update().display.clone();
            println!("{display}");
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = line.trim();
        match command {
            "" => continue,
            "finish" => vm.on_event(SessionEvent::FinishSession).await,
            "quit" | "exit" => break,
            other => match other.parse::<TimerAction>() {
                Ok(action) => vm.on_event(SessionEvent::Timer(action)).await,
                Err(err) => eprintln!("{err}"),
            },
        }
        report(&mut snackbar);
    }

    vm.on_event(SessionEvent::Timer(TimerAction::Cancel)).await;
    printer.abort();
    Ok(())
}
