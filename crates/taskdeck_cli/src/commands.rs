//! Subcommand execution against a `TaskService`.
//!
//! Output goes to a caller-supplied writer so commands can be exercised
//! against an in-memory database.

use crate::cli::{AddArgs, Command, ListArgs, UpdateArgs};
use crate::config::Config;
use anyhow::{Context, Result};
use std::io::Write;
use taskdeck_core::{
    sort_tasks, Task, TaskDraft, TaskFilter, TaskPatch, TaskRepository, TaskService,
};

const SHORT_ID_LEN: usize = 8;

pub fn run<R: TaskRepository>(
    command: Command,
    service: &mut TaskService<R>,
    config: &Config,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Command::Add(args) => add(args, service, out),
        Command::List(args) => list(args, service, config, out),
        Command::Toggle { id } => {
            let id = service.resolve_id(&id)?;
            let completed = service.toggle(id)?;
            let state = if completed { "completed" } else { "active" };
            writeln!(out, "{} is now {state}", short_id(id))?;
            Ok(())
        }
        Command::Update(args) => update(args, service, out),
        Command::Delete { id } => {
            let id = service.resolve_id(&id)?;
            let removed = service.delete(id)?;
            writeln!(out, "deleted {}", render_line(&removed))?;
            Ok(())
        }
        Command::ClearCompleted => {
            let removed = service.clear_completed()?;
            writeln!(out, "removed {} completed task(s)", removed.len())?;
            Ok(())
        }
        Command::Stats => {
            let counts = service.counts();
            writeln!(
                out,
                "total={} active={} completed={}",
                counts.total, counts.active, counts.completed
            )?;
            Ok(())
        }
    }
}

fn add<R: TaskRepository>(
    args: AddArgs,
    service: &mut TaskService<R>,
    out: &mut impl Write,
) -> Result<()> {
    let draft = TaskDraft {
        title: args.title,
        description: args.description,
        category: args.category,
        priority: args.priority,
        due_date: args.due,
    };
    let task = service.add_draft(draft).context("could not add task")?;
    writeln!(out, "added {}", render_line(&task))?;
    Ok(())
}

fn list<R: TaskRepository>(
    args: ListArgs,
    service: &TaskService<R>,
    config: &Config,
    out: &mut impl Write,
) -> Result<()> {
    let filter = TaskFilter {
        status: match args.status {
            Some(status) => status,
            None => config.default_status()?,
        },
        category: args.category,
        priority: args.priority,
        text: args.search,
    };
    let sort = match args.sort {
        Some(key) => Some(key),
        None => config.default_sort()?,
    };
    let direction = match args.direction {
        Some(direction) => direction,
        None => config.default_direction()?,
    };

    let view = service.filter(filter);
    let tasks: Vec<&Task> = match sort {
        Some(key) => sort_tasks(&view, key, direction),
        None => view.to_vec(),
    };

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &tasks)?;
        writeln!(out)?;
        return Ok(());
    }

    if tasks.is_empty() {
        writeln!(out, "no tasks")?;
        return Ok(());
    }
    for task in tasks {
        writeln!(out, "{}", render_line(task))?;
    }
    Ok(())
}

fn update<R: TaskRepository>(
    args: UpdateArgs,
    service: &mut TaskService<R>,
    out: &mut impl Write,
) -> Result<()> {
    let id = service.resolve_id(&args.id)?;
    let patch = TaskPatch {
        title: args.title,
        description: args.description.map(Some),
        category: if args.clear_category {
            Some(None)
        } else {
            args.category.map(Some)
        },
        priority: if args.clear_priority {
            Some(None)
        } else {
            args.priority.map(Some)
        },
        due_date: if args.clear_due {
            Some(None)
        } else {
            args.due.map(Some)
        },
    };
    if patch.is_empty() {
        writeln!(out, "nothing to update")?;
        return Ok(());
    }
    let task = service.update(id, &patch)?;
    writeln!(out, "updated {}", render_line(&task))?;
    Ok(())
}

fn short_id(id: taskdeck_core::TaskId) -> String {
    id.to_string().chars().take(SHORT_ID_LEN).collect()
}

fn render_line(task: &Task) -> String {
    let mark = if task.completed { "x" } else { " " };
    let mut line = format!("[{mark}] {}  {}", short_id(task.id), task.title);

    let mut details = Vec::new();
    if let Some(priority) = task.priority {
        details.push(priority.to_string());
    }
    if let Some(due) = task.due_date {
        details.push(format!("due {due}"));
    }
    if let Some(category) = &task.category {
        details.push(format!("#{category}"));
    }
    if !details.is_empty() {
        line.push_str(&format!("  ({})", details.join(", ")));
    }
    line
}
