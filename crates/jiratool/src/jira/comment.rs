//! List and add comments on Jira issues
//!
//! Outbound comment bodies take the reverse path of the read side: Markdown
//! written on the command line becomes an ADF document in the POST payload.

use serde::{Deserialize, Serialize};

use crate::client::{api_get, api_post, create_jira_client, parse_value, JiraConfig};
use crate::prelude::{println, *};
use jiratool_core::adf::{markdown_to_adf, text_to_adf};
use jiratool_core::jira::{
    format_comments_markdown, transform_comment, transform_comments, CommentOutput,
    CommentsOutput, JiraComment, JiraCommentsResponse,
};
use jiratool_core::pagination::{extract_pagination_info, PaginationStyle};

/// Comment commands
#[derive(Debug, clap::Subcommand)]
pub enum CommentCommands {
    /// List comments on an issue
    #[clap(name = "list")]
    List(ListOptions),

    /// Add a comment to an issue
    #[clap(name = "add")]
    Add(AddOptions),
}

/// Options for listing comments
#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct ListOptions {
    /// Issue key (e.g., "PROJ-123")
    pub issue_key: String,

    /// Maximum number of comments to return per page
    #[arg(short, long, default_value = "10")]
    pub limit: usize,

    /// Start index for fetching the next page
    #[arg(long)]
    pub start_at: Option<u64>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Options for adding a comment
#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
#[command(after_help = "EXAMPLES:
  # Add a Markdown comment:
  jiratool jira comment add PROJ-123 \"Fixed in **1.2.0**, see [the changelog](https://example.com)\"

  # Add a comment without Markdown interpretation:
  jiratool jira comment add PROJ-123 \"literal *stars* stay literal\" --plain")]
pub struct AddOptions {
    /// Issue key (e.g., "PROJ-123")
    pub issue_key: String,

    /// Comment body (Markdown unless --plain is given)
    pub body: String,

    /// Treat the body as plain text instead of Markdown
    #[arg(long)]
    pub plain: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// List comments on an issue - used by both CLI and MCP
pub async fn list_comments_data(
    issue_key: String,
    limit: usize,
    start_at: Option<u64>,
) -> Result<CommentsOutput, JiraError> {
    let config = JiraConfig::from_env()?;
    let client = create_jira_client(&config)?;

    let url = format!(
        "{}/rest/api/3/issue/{}/comment",
        config.api_base(),
        urlencoding::encode(&issue_key)
    );

    let max_results = std::cmp::min(limit, 100).to_string();
    let start_at = start_at.unwrap_or(0).to_string();
    let query_params = [
        ("startAt", start_at.as_str()),
        ("maxResults", max_results.as_str()),
    ];

    let raw = api_get(&client, &url, &query_params).await?;
    let pagination = extract_pagination_info(&raw, PaginationStyle::Offset);
    let response: JiraCommentsResponse = parse_value(raw, "comment list")?;

    Ok(transform_comments(response, pagination))
}

/// Add a comment to an issue - used by both CLI and MCP
pub async fn add_comment_data(
    issue_key: String,
    body: String,
    plain: bool,
) -> Result<CommentOutput, JiraError> {
    let config = JiraConfig::from_env()?;
    let client = create_jira_client(&config)?;

    let url = format!(
        "{}/rest/api/3/issue/{}/comment",
        config.api_base(),
        urlencoding::encode(&issue_key)
    );

    let document = if plain {
        text_to_adf(&body)
    } else {
        markdown_to_adf(&body)
    };
    let payload = serde_json::json!({ "body": document.to_value() });

    let raw = api_post(&client, &url, &payload).await?;
    let created: JiraComment = parse_value(raw, "created comment")?;

    Ok(transform_comment(created))
}

/// Handle the comment subcommands
pub async fn handler(cmd: CommentCommands) -> Result<()> {
    match cmd {
        CommentCommands::List(options) => {
            let issue_key = options.issue_key.clone();
            let data = list_comments_data(options.issue_key, options.limit, options.start_at)
                .await
                .map_err(|e| eyre!(e.user_message()))
                .wrap_err(f!("listing comments on {issue_key}"))?;

            if options.json {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                println!("{}", format_comments_markdown(&issue_key, &data));
            }

            Ok(())
        }
        CommentCommands::Add(options) => {
            let issue_key = options.issue_key.clone();
            let comment = add_comment_data(options.issue_key, options.body, options.plain)
                .await
                .map_err(|e| eyre!(e.user_message()))
                .wrap_err(f!("adding comment to {issue_key}"))?;

            if options.json {
                println!("{}", serde_json::to_string_pretty(&comment)?);
            } else {
                println!("Comment {} added to {}.", comment.id, issue_key);
            }

            Ok(())
        }
    }
}
