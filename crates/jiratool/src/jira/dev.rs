//! Development info linked to an issue
//!
//! The dev-status endpoint serves one `dataType` per request. The three
//! reads are independent, so they are dispatched concurrently and joined
//! before formatting.

use serde::{Deserialize, Serialize};

use crate::client::{api_get, create_jira_client, parse_value, JiraConfig};
use crate::prelude::{println, *};
use jiratool_core::jira::{
    format_dev_info_markdown, transform_dev_info, DevDetailResponse, DevInfoOutput,
    JiraIssueResponse,
};

/// Options for showing development info
#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct DevOptions {
    /// Issue key (e.g., "PROJ-123")
    pub issue_key: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Get development info for an issue - used by both CLI and MCP
pub async fn get_dev_info_data(issue_key: String) -> Result<DevInfoOutput, JiraError> {
    let config = JiraConfig::from_env()?;
    let client = create_jira_client(&config)?;
    let base_url = config.api_base();

    // dev-status wants the numeric issue id, not the key.
    let issue_url = format!(
        "{}/rest/api/3/issue/{}",
        base_url,
        urlencoding::encode(&issue_key)
    );
    let raw_issue = api_get(&client, &issue_url, &[("fields", "summary")]).await?;
    let issue: JiraIssueResponse = parse_value(raw_issue, "issue")?;
    let issue_id = issue
        .id
        .ok_or_else(|| JiraError::validation("issue", "response is missing the issue id"))?;

    let detail_url = format!("{base_url}/rest/dev-status/1.0/issue/detail");

    let (branches, commits, pull_requests) = futures::try_join!(
        fetch_detail(&client, &detail_url, &issue_id, "branch"),
        fetch_detail(&client, &detail_url, &issue_id, "repository"),
        fetch_detail(&client, &detail_url, &issue_id, "pullrequest"),
    )?;

    Ok(transform_dev_info(branches, commits, pull_requests))
}

async fn fetch_detail(
    client: &reqwest::Client,
    url: &str,
    issue_id: &str,
    data_type: &str,
) -> Result<DevDetailResponse, JiraError> {
    let query_params = [
        ("issueId", issue_id),
        ("applicationType", "GitHub"),
        ("dataType", data_type),
    ];

    let raw = api_get(client, url, &query_params).await?;
    parse_value(raw, "development info")
}

/// Handle the dev command
pub async fn handler(options: DevOptions) -> Result<()> {
    let issue_key = options.issue_key.clone();
    let info = get_dev_info_data(options.issue_key)
        .await
        .map_err(|e| eyre!(e.user_message()))
        .wrap_err(f!("retrieving development info for {issue_key}"))?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("{}", format_dev_info_markdown(&issue_key, &info));
    }

    Ok(())
}
