pub mod comment;
pub mod dev;
pub mod get;
pub mod project;
pub mod search;
pub mod status;

use colored::Colorize;
use jiratool_core::jira::{format_timestamp, TicketOutput};

use crate::prelude::{println, *};

/// Jira module app - root command
#[derive(Debug, clap::Parser)]
#[command(name = "jira")]
#[command(about = "Jira operations")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

/// Jira commands
#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Search Jira issues using JQL
    #[clap(name = "search")]
    Search(search::SearchOptions),

    /// Get detailed information about a Jira issue
    #[clap(name = "get")]
    Get(get::GetOptions),

    /// Manage comments on a Jira issue
    #[command(subcommand)]
    Comment(comment::CommentCommands),

    /// Browse Jira projects
    #[command(subcommand)]
    Project(project::ProjectCommands),

    /// List workflow statuses
    #[command(subcommand)]
    Status(status::StatusCommands),

    /// Show development info linked to an issue
    #[clap(name = "dev")]
    Dev(dev::DevOptions),
}

/// Run Jira commands
pub async fn run(app: App, global: crate::Global) -> Result<()> {
    if global.verbose {
        println!("Running Jira command...");
    }

    match app.command {
        Commands::Search(options) => search::handler(options).await,
        Commands::Get(options) => get::handler(options).await,
        Commands::Comment(cmd) => comment::handler(cmd).await,
        Commands::Project(cmd) => project::handler(cmd).await,
        Commands::Status(cmd) => status::handler(cmd).await,
        Commands::Dev(options) => dev::handler(options).await,
    }
}

/// Display a ticket's details as a formatted CLI table.
///
/// Renders the standard ticket view used by the get handler: header line,
/// metadata table, description, labels, components, and comments.
fn display_ticket(ticket: &TicketOutput) {
    std::println!(
        "\n{} - {}\n",
        ticket.key.bold().cyan(),
        ticket.summary.bright_white()
    );

    let mut table = new_table();
    table.add_row(prettytable::row![
        "Status".bold().cyan(),
        ticket.status.green().to_string()
    ]);

    if let Some(priority) = &ticket.priority {
        table.add_row(prettytable::row![
            "Priority".bold().cyan(),
            priority.bright_yellow().to_string()
        ]);
    }

    if let Some(issue_type) = &ticket.issue_type {
        table.add_row(prettytable::row![
            "Type".bold().cyan(),
            issue_type.bright_blue().to_string()
        ]);
    }

    let assignee = ticket.assignee.as_deref().unwrap_or("Unassigned");
    let assignee_colored = if assignee == "Unassigned" {
        assignee.bright_black().to_string()
    } else {
        assignee.bright_magenta().to_string()
    };
    table.add_row(prettytable::row![
        "Assignee".bold().cyan(),
        assignee_colored
    ]);

    if let Some(created) = &ticket.created {
        table.add_row(prettytable::row![
            "Created".bold().cyan(),
            format_timestamp(created).bright_black().to_string()
        ]);
    }

    if let Some(updated) = &ticket.updated {
        table.add_row(prettytable::row![
            "Updated".bold().cyan(),
            format_timestamp(updated).bright_black().to_string()
        ]);
    }

    if let Some(due_date) = &ticket.due_date {
        table.add_row(prettytable::row![
            "Due Date".bold().cyan(),
            due_date.yellow().to_string()
        ]);
    }

    table.printstd();

    if let Some(description) = &ticket.description {
        std::println!("\n{}:", "Description".bold().cyan());
        std::println!("{}\n", description);
    }

    if !ticket.labels.is_empty() {
        std::println!(
            "\n{}: {}",
            "Labels".bold().cyan(),
            ticket.labels.join(", ").bright_green()
        );
    }

    if !ticket.components.is_empty() {
        std::println!(
            "{}: {}",
            "Components".bold().cyan(),
            ticket.components.join(", ").bright_blue()
        );
    }

    if !ticket.comments.is_empty() {
        std::println!("\n{}", "Comments:".bold().cyan());
        for (index, comment) in ticket.comments.iter().enumerate() {
            let index_str = format!("{}.", index + 1).green().to_string();
            let timestamp_str = comment
                .created
                .as_deref()
                .map(|created| format!("[{}]", format_timestamp(created)).blue().to_string())
                .unwrap_or_default();
            let author_str = comment
                .author
                .clone()
                .unwrap_or_else(|| "Unknown".to_string())
                .magenta()
                .to_string();

            std::println!("{} {} {}", index_str, timestamp_str, author_str);
            std::println!("{}\n", comment.body);
        }
    }

    std::println!();
}

// Re-export public data functions for external use (e.g., MCP)
pub use comment::{add_comment_data, list_comments_data};
pub use dev::get_dev_info_data;
pub use get::get_ticket_data;
pub use project::{get_project_data, list_projects_data};
pub use search::search_issues_data;
pub use status::list_statuses_data;
