use serde::{Deserialize, Serialize};

use crate::client::{api_get, create_jira_client, parse_value, JiraConfig};
use crate::prelude::{println, *};
use jiratool_core::jira::{
    transform_ticket_response, JiraComment, JiraCommentsResponse, JiraIssueResponse, TicketOutput,
};

/// Options for getting a Jira issue
#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct GetOptions {
    /// Issue key (e.g., "PROJ-123")
    #[clap(env = "JIRA_ISSUE_KEY")]
    pub issue_key: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Get detailed ticket information from Jira
pub async fn get_ticket_data(issue_key: String) -> Result<TicketOutput, JiraError> {
    let config = JiraConfig::from_env()?;
    let client = create_jira_client(&config)?;
    let base_url = config.api_base();

    let ticket_url = format!(
        "{}/rest/api/3/issue/{}",
        base_url,
        urlencoding::encode(&issue_key)
    );

    let raw_ticket = api_get(&client, &ticket_url, &[]).await?;
    let issue: JiraIssueResponse = parse_value(raw_ticket, "issue")?;

    let comments_url = format!(
        "{}/rest/api/3/issue/{}/comment",
        base_url,
        urlencoding::encode(&issue_key)
    );

    // A comment fetch failure should not sink the whole read.
    let comments = match api_get(&client, &comments_url, &[]).await {
        Ok(raw_comments) => {
            parse_value::<JiraCommentsResponse>(raw_comments, "comment list")
                .map(|response| response.comments)
                .unwrap_or_default()
        }
        Err(_) => Vec::<JiraComment>::new(),
    };

    Ok(transform_ticket_response(issue, comments))
}

/// Handle the get command
pub async fn handler(options: GetOptions) -> Result<()> {
    let issue_key = options.issue_key.clone();
    let ticket = get_ticket_data(options.issue_key)
        .await
        .map_err(|e| eyre!(e.user_message()))
        .wrap_err(f!("retrieving issue {issue_key}"))?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&ticket)?);
    } else {
        super::display_ticket(&ticket);
    }

    Ok(())
}
