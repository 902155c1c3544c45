use serde::{Deserialize, Serialize};

use crate::client::{api_get, create_jira_client, parse_value, JiraConfig};
use crate::prelude::{eprintln, println, *};
use jiratool_core::jira::{
    format_pagination_footer, transform_projects, JiraProject, ProjectOutput, ProjectsOutput,
};
use jiratool_core::pagination::{extract_pagination_info, PaginationStyle};

/// Project commands
#[derive(Debug, clap::Subcommand)]
pub enum ProjectCommands {
    /// List projects visible to the authenticated user
    #[clap(name = "list")]
    List(ListOptions),

    /// Get a single project by key
    #[clap(name = "get")]
    Get(GetOptions),
}

/// Options for listing projects
#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct ListOptions {
    /// Maximum number of projects to return per page
    #[arg(short, long, default_value = "25")]
    pub limit: usize,

    /// Start index for fetching the next page
    #[arg(long)]
    pub start_at: Option<u64>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Options for getting a project
#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct GetOptions {
    /// Project key (e.g., "PROJ")
    pub project_key: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, serde::Deserialize)]
struct ProjectSearchResponse {
    #[serde(default)]
    values: Vec<JiraProject>,
    #[serde(default)]
    total: Option<u64>,
}

/// List projects - used by both CLI and MCP
pub async fn list_projects_data(
    limit: usize,
    start_at: Option<u64>,
) -> Result<ProjectsOutput, JiraError> {
    let config = JiraConfig::from_env()?;
    let client = create_jira_client(&config)?;

    let url = format!("{}/rest/api/3/project/search", config.api_base());

    let max_results = std::cmp::min(limit, 100).to_string();
    let start_at = start_at.unwrap_or(0).to_string();
    let query_params = [
        ("startAt", start_at.as_str()),
        ("maxResults", max_results.as_str()),
        ("expand", "lead"),
    ];

    let raw = api_get(&client, &url, &query_params).await?;
    let pagination = extract_pagination_info(&raw, PaginationStyle::Offset);
    let response: ProjectSearchResponse = parse_value(raw, "project search")?;

    Ok(transform_projects(response.values, response.total, pagination))
}

/// Get a single project - used by both CLI and MCP
pub async fn get_project_data(project_key: String) -> Result<ProjectOutput, JiraError> {
    let config = JiraConfig::from_env()?;
    let client = create_jira_client(&config)?;

    let url = format!(
        "{}/rest/api/3/project/{}",
        config.api_base(),
        urlencoding::encode(&project_key)
    );

    let raw = api_get(&client, &url, &[("expand", "lead")]).await?;
    let project: JiraProject = parse_value(raw, "project")?;

    Ok(ProjectOutput {
        id: project.id,
        key: project.key,
        name: project.name,
        project_type: project.project_type_key,
        lead: project.lead.and_then(|l| l.display_name),
    })
}

/// Handle the project subcommands
pub async fn handler(cmd: ProjectCommands) -> Result<()> {
    match cmd {
        ProjectCommands::List(options) => {
            let data = list_projects_data(options.limit, options.start_at)
                .await
                .map_err(|e| eyre!(e.user_message()))
                .wrap_err("listing projects")?;

            if options.json {
                println!("{}", serde_json::to_string_pretty(&data)?);
                return Ok(());
            }

            if data.projects.is_empty() {
                println!("No projects found.");
                return Ok(());
            }

            let mut table = new_table();
            table.add_row(prettytable::row!["Key", "Name", "Type", "Lead"]);

            for project in &data.projects {
                table.add_row(prettytable::row![
                    &project.key,
                    &project.name,
                    project.project_type.as_deref().unwrap_or("-"),
                    project.lead.as_deref().unwrap_or("-")
                ]);
            }

            table.printstd();

            eprintln!(
                "\n{}",
                format_pagination_footer(
                    &data.pagination,
                    Some(data.total),
                    "projects",
                    "--start-at"
                )
            );

            Ok(())
        }
        ProjectCommands::Get(options) => {
            let project_key = options.project_key.clone();
            let project = get_project_data(options.project_key)
                .await
                .map_err(|e| eyre!(e.user_message()))
                .wrap_err(f!("retrieving project {project_key}"))?;

            if options.json {
                println!("{}", serde_json::to_string_pretty(&project)?);
                return Ok(());
            }

            let mut table = new_table();
            table.add_row(prettytable::row!["Key", &project.key]);
            table.add_row(prettytable::row!["Name", &project.name]);
            table.add_row(prettytable::row![
                "Type",
                project.project_type.as_deref().unwrap_or("-")
            ]);
            table.add_row(prettytable::row![
                "Lead",
                project.lead.as_deref().unwrap_or("-")
            ]);
            table.printstd();

            Ok(())
        }
    }
}
