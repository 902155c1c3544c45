use crate::prelude::{eprintln, println, *};
use serde::{Deserialize, Serialize};

use crate::client::{api_get, create_jira_client, parse_value, JiraConfig};
use jiratool_core::jira::{
    format_pagination_footer, transform_search_response, JiraSearchResponse, SearchOutput,
};
use jiratool_core::pagination::{extract_pagination_info, PaginationStyle};

/// Options for searching Jira issues
#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
#[command(after_help = "EXAMPLES:
  # Get all tickets assigned to the current user:
  jiratool jira search \"assignee = currentUser()\"

  # Get only active tickets (excluding Done/Closed):
  jiratool jira search \"assignee = currentUser() AND status NOT IN (Done, Closed)\"

  # Find tickets by summary (search by name):
  jiratool jira search \"summary ~ \\\"bug fix\\\"\"

  # Fetch the next page using the offset from the previous response:
  jiratool jira search \"assignee = currentUser()\" --limit 50 --start-at 50

NOTES:
  - JQL queries use Jira Query Language syntax
  - Use currentUser() to reference the logged-in user
  - Status names vary by project (common: Open, In Progress, Done, Closed)
  - The ~ operator performs text search (case-insensitive substring match)
  - Results are limited to 10 per page by default; use --limit to change
  - Use --start-at with the offset printed under the results to fetch additional pages")]
pub struct SearchOptions {
    /// JQL query (e.g., "project = PROJ AND status = Open")
    #[clap(env = "JIRA_QUERY")]
    pub jql_query: String,

    /// Maximum number of results to return per page
    #[arg(short, long, default_value = "10")]
    pub limit: usize,

    /// Start index for fetching the next page (offset-based pagination)
    #[arg(long)]
    pub start_at: Option<u64>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Public data function - used by both CLI and MCP
///
/// Jira's search endpoint paginates by offset: `startAt` plus `maxResults`
/// against a known `total`.
pub async fn search_issues_data(
    query: String,
    limit: usize,
    start_at: Option<u64>,
) -> Result<SearchOutput, JiraError> {
    let config = JiraConfig::from_env()?;
    let client = create_jira_client(&config)?;

    let url = format!("{}/rest/api/2/search", config.api_base());

    let max_results = std::cmp::min(limit, 100).to_string(); // Jira API max is 100
    let start_at = start_at.unwrap_or(0).to_string();

    let query_params = [
        ("jql", query.as_str()),
        ("startAt", start_at.as_str()),
        ("maxResults", max_results.as_str()),
        ("fields", "summary,status,assignee"),
    ];

    let raw = api_get(&client, &url, &query_params).await?;
    let pagination = extract_pagination_info(&raw, PaginationStyle::Offset);
    let response: JiraSearchResponse = parse_value(raw, "issue search")?;

    Ok(transform_search_response(response, pagination))
}

/// Handle the search command
pub async fn handler(options: SearchOptions) -> Result<()> {
    let data = search_issues_data(options.jql_query.clone(), options.limit, options.start_at)
        .await
        .map_err(|e| eyre!(e.user_message()))?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    // Human-readable format
    if data.issues.is_empty() {
        println!("No issues found.");
        return Ok(());
    }

    println!("Found {} issue(s):\n", data.issues.len());

    let mut table = crate::prelude::new_table();
    table.add_row(prettytable::row!["Key", "Summary", "Status", "Assignee"]);

    for issue in &data.issues {
        let assignee = issue.assignee.as_deref().unwrap_or("Unassigned");
        table.add_row(prettytable::row![
            &issue.key,
            &issue.summary,
            &issue.status,
            assignee
        ]);
    }

    table.printstd();

    eprintln!(
        "\n{}",
        format_pagination_footer(&data.pagination, Some(data.total), "issues", "--start-at")
    );

    Ok(())
}
