use serde::{Deserialize, Serialize};

use crate::client::{api_get, create_jira_client, parse_value, JiraConfig};
use crate::prelude::{println, *};
use jiratool_core::jira::{transform_statuses, JiraStatusDef, StatusOutput};

/// Status commands
#[derive(Debug, clap::Subcommand)]
pub enum StatusCommands {
    /// List all workflow statuses
    #[clap(name = "list")]
    List(ListOptions),
}

/// Options for listing statuses
#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct ListOptions {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// List workflow statuses - used by both CLI and MCP
///
/// The status endpoint returns a plain array, no pagination envelope.
pub async fn list_statuses_data() -> Result<Vec<StatusOutput>, JiraError> {
    let config = JiraConfig::from_env()?;
    let client = create_jira_client(&config)?;

    let url = format!("{}/rest/api/3/status", config.api_base());

    let raw = api_get(&client, &url, &[]).await?;
    let statuses: Vec<JiraStatusDef> = parse_value(raw, "status list")?;

    Ok(transform_statuses(statuses))
}

/// Handle the status subcommands
pub async fn handler(cmd: StatusCommands) -> Result<()> {
    match cmd {
        StatusCommands::List(options) => {
            let statuses = list_statuses_data()
                .await
                .map_err(|e| eyre!(e.user_message()))
                .wrap_err("listing statuses")?;

            if options.json {
                println!("{}", serde_json::to_string_pretty(&statuses)?);
                return Ok(());
            }

            if statuses.is_empty() {
                println!("No statuses found.");
                return Ok(());
            }

            let mut table = new_table();
            table.add_row(prettytable::row!["Status", "Category", "Description"]);

            for status in &statuses {
                table.add_row(prettytable::row![
                    &status.name,
                    status.category.as_deref().unwrap_or("-"),
                    status.description.as_deref().unwrap_or("-")
                ]);
            }

            table.printstd();

            Ok(())
        }
    }
}
