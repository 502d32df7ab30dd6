use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{Local, Utc};
use clap::{Args, Parser, Subcommand};
use planner_core::aggregate::Analytics;
use planner_core::config::Config;
use planner_core::filter::distinct_categories;
use planner_core::{
    Choice, Database, NewTask, Planner, Priority, Session, Status, TaskFilter, TaskPatch, User,
    parse_due_date,
};
use serde::Serialize;

use crate::format::{distribution_line, task_line};
use crate::ui;

#[derive(Parser, Debug)]
#[command(name = "planner", version, about = "Personal learning planner")]
pub struct Cli {
    /// SQLite database URL (defaults to the state directory)
    #[arg(long, global = true, env = "PLANNER_DATABASE_URL")]
    pub database: Option<String>,

    /// User id every query is scoped to
    #[arg(long, global = true, env = "PLANNER_USER")]
    pub user: Option<String>,

    /// Configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open the terminal interface (default)
    Tui,
    /// Create a task
    Add(AddArgs),
    /// Edit fields of a task
    Edit(EditArgs),
    /// Change the status of a task
    Status {
        id: String,
        status: Status,
    },
    /// Delete a task
    Rm { id: String },
    /// List tasks, optionally filtered
    List(ListArgs),
    /// Totals, overdue count and recent tasks
    Dashboard,
    /// Distributions and weekly activity
    Analytics,
    /// Categories in use, sorted
    Categories,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    pub title: String,
    #[arg(long, short)]
    pub category: String,
    #[arg(long, short)]
    pub description: Option<String>,
    #[arg(long, short, default_value_t = Priority::Medium)]
    pub priority: Priority,
    #[arg(long, short, default_value_t = Status::Pending)]
    pub status: Status,
    /// YYYY-MM-DD or RFC 3339
    #[arg(long)]
    pub due: Option<String>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub priority: Option<Priority>,
    #[arg(long)]
    pub status: Option<Status>,
    #[arg(long, conflicts_with = "clear_due")]
    pub due: Option<String>,
    #[arg(long)]
    pub clear_due: bool,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[arg(long, short, default_value = "")]
    pub search: String,
    #[arg(long, default_value = "all")]
    pub status: Choice<Status>,
    #[arg(long, default_value = "all")]
    pub category: Choice<String>,
    #[arg(long, default_value = "all")]
    pub priority: Choice<Priority>,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = self.load_config()?;
        let planner = self.open_planner(&config).await?;
        let json = self.json;

        match self.command.unwrap_or(Command::Tui) {
            Command::Tui => ui::run_app(planner).await,
            Command::Add(args) => add(&planner, args, json).await,
            Command::Edit(args) => edit(&planner, args).await,
            Command::Status { id, status } => {
                planner.set_status(&id, status).await?;
                println!("Task status updated!");
                Ok(())
            }
            Command::Rm { id } => {
                planner.delete_task(&id).await?;
                println!("Task deleted successfully!");
                Ok(())
            }
            Command::List(args) => list(&planner, args, json).await,
            Command::Dashboard => dashboard(&planner, json).await,
            Command::Analytics => analytics(&planner, json).await,
            Command::Categories => {
                let categories = distinct_categories(&planner.fetch_tasks().await);
                if json {
                    print_json(&categories)
                } else {
                    categories.iter().for_each(|c| println!("{c}"));
                    Ok(())
                }
            }
        }
    }

    fn load_config(&self) -> Result<Config> {
        match self.config.clone().or_else(Config::default_path) {
            Some(path) => Config::load_or_default(&path)
                .with_context(|| format!("loading {}", path.display())),
            None => Ok(Config::default()),
        }
    }

    async fn open_planner(&self, config: &Config) -> Result<Planner> {
        let user = match (&self.user, &config.user) {
            (Some(id), Some(configured)) if *id == configured.id => configured.clone(),
            (Some(id), _) => User::new(id.as_str()),
            (None, Some(configured)) => configured.clone(),
            (None, None) => bail!("no user configured: pass --user or set [user] in the config file"),
        };

        let db = match self.database.as_ref().or(config.database_url.as_ref()) {
            Some(url) => Database::connect(url).await?,
            None => Database::connect_default().await?,
        };

        tracing::debug!(user = %user.id, "opening planner");
        Ok(Planner::new(db, Session::signed_in(user))
            .with_recent_limit(config.dashboard.recent_limit))
    }
}

async fn add(planner: &Planner, args: AddArgs, json: bool) -> Result<()> {
    let mut task = NewTask::new(args.title, args.category)
        .with_priority(args.priority)
        .with_status(args.status);
    if let Some(description) = args.description {
        task = task.with_description(description);
    }
    if let Some(due) = args.due {
        task = task.with_due_date(parse_due_date(&due)?);
    }

    let task = planner.create_task(task).await?;
    if json {
        print_json(&task)
    } else {
        println!("Task created successfully! {}", task.id);
        Ok(())
    }
}

async fn edit(planner: &Planner, args: EditArgs) -> Result<()> {
    let due_date = match (args.due, args.clear_due) {
        (Some(due), _) => Some(Some(parse_due_date(&due)?)),
        (None, true) => Some(None),
        (None, false) => None,
    };
    let patch = TaskPatch {
        title: args.title,
        description: args.description.map(Some),
        category: args.category,
        priority: args.priority,
        status: args.status,
        due_date,
    };
    if patch.is_empty() {
        bail!("nothing to change");
    }

    planner.update_task(&args.id, patch).await?;
    println!("Task updated successfully!");
    Ok(())
}

#[derive(Serialize)]
struct ListOutput<'a> {
    total: usize,
    shown: usize,
    active_filters: usize,
    tasks: Vec<&'a planner_core::Task>,
}

async fn list(planner: &Planner, args: ListArgs, json: bool) -> Result<()> {
    let tasks = planner.fetch_tasks().await;
    let filter = TaskFilter {
        search: args.search,
        status: args.status,
        category: args.category,
        priority: args.priority,
    };
    let shown = filter.apply(&tasks);

    if json {
        return print_json(&ListOutput {
            total: tasks.len(),
            shown: shown.len(),
            active_filters: filter.active_count(),
            tasks: shown,
        });
    }

    let now = Utc::now();
    for task in &shown {
        println!("{}  {}", short_id(&task.id), task_line(task, now));
    }
    println!("Showing {} of {} tasks", shown.len(), tasks.len());
    Ok(())
}

async fn dashboard(planner: &Planner, json: bool) -> Result<()> {
    let dashboard = planner.dashboard().await;
    if json {
        return print_json(&dashboard);
    }

    if let Some(user) = planner.session().user() {
        println!("Welcome back, {}!", user.display_name());
    }
    let stats = &dashboard.stats;
    println!("Total tasks:  {}", stats.total);
    println!(
        "Completed:    {} ({:.0}%)",
        stats.completed,
        stats.completion_rate()
    );
    println!("In progress:  {}", stats.in_progress);
    println!("Pending:      {}", stats.pending);
    println!("Overdue:      {}", stats.overdue);
    println!();
    println!("Recent tasks:");
    if dashboard.recent.is_empty() {
        println!("  No tasks yet");
    }
    let now = Utc::now();
    for task in &dashboard.recent {
        println!("  {}", task_line(task, now));
    }
    Ok(())
}

async fn analytics(planner: &Planner, json: bool) -> Result<()> {
    let tasks = planner.fetch_history().await;
    let analytics = Analytics::compute(&tasks, Local::now());
    if json {
        return print_json(&analytics);
    }

    if analytics.total == 0 {
        println!("No data available. Create some tasks to see analytics.");
        return Ok(());
    }

    println!("Total tasks:      {}", analytics.total);
    println!("Completed:        {}", analytics.completed);
    println!("Completion rate:  {:.1}%", analytics.completion_rate);
    println!("Categories:       {}", analytics.category_count);
    for (title, buckets) in [
        ("Status", &analytics.status),
        ("Priority", &analytics.priority),
        ("Category", &analytics.categories),
    ] {
        println!();
        println!("{title}:");
        for bucket in buckets {
            println!("  {}", distribution_line(bucket));
        }
    }
    println!();
    println!("Weekly activity:");
    for day in &analytics.weekly {
        println!(
            "  {}  created {:>3}  completed {:>3}",
            day.date.format("%b %d"),
            day.created,
            day.completed
        );
    }
    Ok(())
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
