//! Transformation functions for Jira API responses

use serde::{Deserialize, Serialize};

use crate::adf::{adf_to_markdown, description_to_markdown};
use crate::pagination::PaginationInfo;

/// Jira issue response from API
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct JiraIssueResponse {
    #[serde(default)]
    pub id: Option<String>,
    pub key: String,
    pub fields: JiraIssueFields,
}

/// Fields from Jira issue
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct JiraIssueFields {
    pub summary: String,
    #[serde(default)]
    pub description: Option<serde_json::Value>, // Can be a string or ADF (Atlassian Document Format)
    #[serde(default)]
    pub status: Option<JiraStatus>,
    #[serde(default)]
    pub assignee: Option<JiraAssignee>,
    #[serde(default)]
    pub priority: Option<JiraPriority>,
    #[serde(default)]
    pub issuetype: Option<JiraIssueType>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(default)]
    pub duedate: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub components: Vec<JiraComponent>,
}

/// Jira status field
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct JiraStatus {
    pub name: String,
}

/// Jira assignee field
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct JiraAssignee {
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    #[serde(default)]
    #[serde(rename = "emailAddress")]
    pub email_address: Option<String>,
}

/// Jira priority field
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct JiraPriority {
    #[serde(default)]
    pub name: String,
}

/// Jira issue type field
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct JiraIssueType {
    pub name: String,
}

/// Jira component field
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct JiraComponent {
    pub name: String,
}

/// Search response from the Jira search endpoint
#[derive(Debug, Deserialize, Clone)]
pub struct JiraSearchResponse {
    pub issues: Vec<JiraIssueResponse>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    #[serde(rename = "startAt")]
    pub start_at: Option<u64>,
    #[serde(default)]
    #[serde(rename = "maxResults")]
    pub max_results: Option<u64>,
}

/// Comment on a Jira ticket
#[derive(Debug, Serialize, Clone, Deserialize, PartialEq)]
pub struct JiraComment {
    pub id: String,
    /// Plain string or ADF document
    pub body: serde_json::Value,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub author: Option<JiraAssignee>,
}

/// Response from the issue comment endpoint
#[derive(Debug, Deserialize, Clone)]
pub struct JiraCommentsResponse {
    #[serde(default)]
    pub comments: Vec<JiraComment>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// Project lead from the project endpoints
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct JiraProjectLead {
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
}

/// Jira project from the project search endpoint
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct JiraProject {
    pub id: String,
    pub key: String,
    pub name: String,
    #[serde(rename = "projectTypeKey", default)]
    pub project_type_key: Option<String>,
    #[serde(default)]
    pub lead: Option<JiraProjectLead>,
}

/// Status category grouping (To Do / In Progress / Done)
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct JiraStatusCategory {
    pub name: String,
}

/// Workflow status definition from the status endpoint
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct JiraStatusDef {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "statusCategory", default)]
    pub status_category: Option<JiraStatusCategory>,
}

// Development info (dev-status endpoints). Each dataType request returns a
// `detail` array; branches and pull requests hang off the detail entries,
// commits off the repositories inside them.

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DevDetailResponse {
    #[serde(default)]
    pub detail: Vec<DevDetail>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DevDetail {
    #[serde(default)]
    pub branches: Vec<DevBranch>,
    #[serde(rename = "pullRequests", default)]
    pub pull_requests: Vec<DevPullRequest>,
    #[serde(default)]
    pub repositories: Vec<DevRepository>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DevBranch {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DevPullRequest {
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DevRepository {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub commits: Vec<DevCommit>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DevCommit {
    #[serde(rename = "displayId", default)]
    pub display_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Output structure for a single issue
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct IssueOutput {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub assignee: Option<String>,
}

/// Output structure for the search command
#[derive(Debug, Serialize, PartialEq)]
pub struct SearchOutput {
    pub issues: Vec<IssueOutput>,
    pub total: u64,
    pub pagination: PaginationInfo,
}

/// Output structure for a rendered comment
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CommentOutput {
    pub id: String,
    pub author: Option<String>,
    pub created: Option<String>,
    /// Comment body rendered to Markdown
    pub body: String,
}

/// Output structure for the comment list command
#[derive(Debug, Serialize, PartialEq)]
pub struct CommentsOutput {
    pub comments: Vec<CommentOutput>,
    pub total: u64,
    pub pagination: PaginationInfo,
}

/// Output structure for detailed ticket information
#[derive(Debug, Serialize, Clone)]
pub struct TicketOutput {
    pub key: String,
    pub summary: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: Option<String>,
    pub issue_type: Option<String>,
    pub assignee: Option<String>,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub due_date: Option<String>,
    pub labels: Vec<String>,
    pub components: Vec<String>,
    pub comments: Vec<CommentOutput>,
}

/// Output structure for a single project
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ProjectOutput {
    pub id: String,
    pub key: String,
    pub name: String,
    pub project_type: Option<String>,
    pub lead: Option<String>,
}

/// Output structure for the project list command
#[derive(Debug, Serialize, PartialEq)]
pub struct ProjectsOutput {
    pub projects: Vec<ProjectOutput>,
    pub total: u64,
    pub pagination: PaginationInfo,
}

/// Output structure for a workflow status
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct StatusOutput {
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
}

/// Output structure for development info
#[derive(Debug, Serialize, Clone, Default)]
pub struct DevInfoOutput {
    pub branches: Vec<DevBranch>,
    pub commits: Vec<DevCommit>,
    pub pull_requests: Vec<DevPullRequest>,
}

/// Preferred display name for an assignee-shaped field
fn assignee_name(assignee: Option<&JiraAssignee>) -> Option<String> {
    assignee.and_then(|a| a.display_name.clone().or_else(|| a.email_address.clone()))
}

/// Convert Jira search response to domain model
pub fn transform_search_response(
    search_response: JiraSearchResponse,
    pagination: PaginationInfo,
) -> SearchOutput {
    let issues: Vec<IssueOutput> = search_response
        .issues
        .into_iter()
        .map(|issue| IssueOutput {
            key: issue.key,
            summary: issue.fields.summary,
            status: issue
                .fields
                .status
                .map(|s| s.name)
                .unwrap_or_else(|| "Unknown".to_string()),
            assignee: assignee_name(issue.fields.assignee.as_ref()),
        })
        .collect();

    SearchOutput {
        issues,
        total: search_response.total.unwrap_or(0),
        pagination,
    }
}

/// Convert a raw comment into its rendered form
pub fn transform_comment(comment: JiraComment) -> CommentOutput {
    CommentOutput {
        author: assignee_name(comment.author.as_ref()),
        created: comment.created,
        body: adf_to_markdown(&comment.body),
        id: comment.id,
    }
}

/// Convert the comment list response to domain model
pub fn transform_comments(
    response: JiraCommentsResponse,
    pagination: PaginationInfo,
) -> CommentsOutput {
    CommentsOutput {
        comments: response
            .comments
            .into_iter()
            .map(transform_comment)
            .collect(),
        total: response.total.unwrap_or(0),
        pagination,
    }
}

/// Convert Jira issue response + comments to ticket output
pub fn transform_ticket_response(
    issue: JiraIssueResponse,
    comments: Vec<JiraComment>,
) -> TicketOutput {
    TicketOutput {
        key: issue.key,
        summary: issue.fields.summary,
        description: description_to_markdown(issue.fields.description),
        status: issue
            .fields
            .status
            .map(|s| s.name)
            .unwrap_or_else(|| "Unknown".to_string()),
        priority: issue
            .fields
            .priority
            .map(|p| p.name)
            .filter(|n| !n.is_empty()),
        issue_type: issue.fields.issuetype.map(|it| it.name),
        assignee: assignee_name(issue.fields.assignee.as_ref()),
        created: issue.fields.created,
        updated: issue.fields.updated,
        due_date: issue.fields.duedate,
        labels: issue.fields.labels,
        components: issue
            .fields
            .components
            .into_iter()
            .map(|c| c.name)
            .collect(),
        comments: comments.into_iter().map(transform_comment).collect(),
    }
}

/// Convert the project search response to domain model
pub fn transform_projects(
    projects: Vec<JiraProject>,
    total: Option<u64>,
    pagination: PaginationInfo,
) -> ProjectsOutput {
    ProjectsOutput {
        projects: projects
            .into_iter()
            .map(|project| ProjectOutput {
                id: project.id,
                key: project.key,
                name: project.name,
                project_type: project.project_type_key,
                lead: project.lead.and_then(|l| l.display_name),
            })
            .collect(),
        total: total.unwrap_or(0),
        pagination,
    }
}

/// Convert the status list to domain model
pub fn transform_statuses(statuses: Vec<JiraStatusDef>) -> Vec<StatusOutput> {
    statuses
        .into_iter()
        .map(|status| StatusOutput {
            name: status.name,
            category: status.status_category.map(|c| c.name),
            description: status.description.filter(|d| !d.is_empty()),
        })
        .collect()
}

/// Merge the three dev-status responses into one output
///
/// The three requests are independent reads of the same issue, so callers
/// fetch them concurrently and join here.
pub fn transform_dev_info(
    branches: DevDetailResponse,
    commits: DevDetailResponse,
    pull_requests: DevDetailResponse,
) -> DevInfoOutput {
    DevInfoOutput {
        branches: branches
            .detail
            .into_iter()
            .flat_map(|d| d.branches)
            .collect(),
        commits: commits
            .detail
            .into_iter()
            .flat_map(|d| d.repositories)
            .flat_map(|r| r.commits)
            .collect(),
        pull_requests: pull_requests
            .detail
            .into_iter()
            .flat_map(|d| d.pull_requests)
            .collect(),
    }
}

// ============================================================================
// Markdown formatters
// ============================================================================

/// Pretty-print a Jira timestamp, falling back to the raw value
pub fn format_timestamp(raw: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(raw)
        .or_else(|_| chrono::DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.3f%z"))
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Render the trailing pagination hint line
///
/// The total is only mentioned when known and positive, "more available"
/// only when a next page exists, and the flag hint only when there is also a
/// cursor to pass.
pub fn format_pagination_footer(
    pagination: &PaginationInfo,
    total: Option<u64>,
    noun: &str,
    flag: &str,
) -> String {
    let mut footer = match total {
        Some(total) if total > 0 => format!("Showing {} of {} {}.", pagination.count, total, noun),
        _ => format!("Showing {} {}.", pagination.count, noun),
    };

    if pagination.has_more {
        footer.push_str(" More results are available.");
        if let Some(cursor) = &pagination.next_cursor {
            footer.push_str(&format!(" Use {flag} \"{cursor}\" to continue."));
        }
    }

    footer
}

/// Render search results as a Markdown document
pub fn format_search_markdown(output: &SearchOutput) -> String {
    if output.issues.is_empty() {
        return "No issues found.".to_string();
    }

    let mut lines = vec![
        "| Key | Summary | Status | Assignee |".to_string(),
        "| --- | --- | --- | --- |".to_string(),
    ];
    for issue in &output.issues {
        lines.push(format!(
            "| {} | {} | {} | {} |",
            issue.key,
            issue.summary,
            issue.status,
            issue.assignee.as_deref().unwrap_or("Unassigned")
        ));
    }

    format!(
        "{}\n\n{}",
        lines.join("\n"),
        format_pagination_footer(
            &output.pagination,
            Some(output.total),
            "issues",
            "--start-at"
        )
    )
}

/// Render a ticket as a Markdown document
pub fn format_ticket_markdown(ticket: &TicketOutput) -> String {
    let mut sections = vec![format!("# {}: {}", ticket.key, ticket.summary)];

    let mut fields = vec![format!("**Status:** {}", ticket.status)];
    if let Some(issue_type) = &ticket.issue_type {
        fields.push(format!("**Type:** {issue_type}"));
    }
    if let Some(priority) = &ticket.priority {
        fields.push(format!("**Priority:** {priority}"));
    }
    fields.push(format!(
        "**Assignee:** {}",
        ticket.assignee.as_deref().unwrap_or("Unassigned")
    ));
    if let Some(created) = &ticket.created {
        fields.push(format!("**Created:** {}", format_timestamp(created)));
    }
    if let Some(updated) = &ticket.updated {
        fields.push(format!("**Updated:** {}", format_timestamp(updated)));
    }
    if let Some(due_date) = &ticket.due_date {
        fields.push(format!("**Due Date:** {due_date}"));
    }
    if !ticket.labels.is_empty() {
        fields.push(format!("**Labels:** {}", ticket.labels.join(", ")));
    }
    if !ticket.components.is_empty() {
        fields.push(format!("**Components:** {}", ticket.components.join(", ")));
    }
    sections.push(fields.join("\n"));

    if let Some(description) = &ticket.description {
        sections.push(format!("## Description\n\n{description}"));
    }

    if !ticket.comments.is_empty() {
        let mut comments = vec![format!("## Comments ({})", ticket.comments.len())];
        for comment in &ticket.comments {
            comments.push(format_comment_markdown(comment));
        }
        sections.push(comments.join("\n\n"));
    }

    sections.join("\n\n")
}

fn format_comment_markdown(comment: &CommentOutput) -> String {
    let author = comment.author.as_deref().unwrap_or("Unknown");
    let header = match comment.created.as_deref() {
        Some(created) => format!("### {author} ({})", format_timestamp(created)),
        None => format!("### {author}"),
    };

    format!("{header}\n\n{}", comment.body)
}

/// Render a comment page as a Markdown document
pub fn format_comments_markdown(issue_key: &str, output: &CommentsOutput) -> String {
    if output.comments.is_empty() {
        return format!("No comments on {issue_key}.");
    }

    let mut sections = vec![format!("# Comments on {issue_key}")];
    for comment in &output.comments {
        sections.push(format_comment_markdown(comment));
    }
    sections.push(format_pagination_footer(
        &output.pagination,
        Some(output.total),
        "comments",
        "--start-at",
    ));

    sections.join("\n\n")
}

/// Render the project list as a Markdown document
pub fn format_projects_markdown(output: &ProjectsOutput) -> String {
    if output.projects.is_empty() {
        return "No projects found.".to_string();
    }

    let mut lines = vec![
        "| Key | Name | Type | Lead |".to_string(),
        "| --- | --- | --- | --- |".to_string(),
    ];
    for project in &output.projects {
        lines.push(format!(
            "| {} | {} | {} | {} |",
            project.key,
            project.name,
            project.project_type.as_deref().unwrap_or("-"),
            project.lead.as_deref().unwrap_or("-")
        ));
    }

    format!(
        "{}\n\n{}",
        lines.join("\n"),
        format_pagination_footer(
            &output.pagination,
            Some(output.total),
            "projects",
            "--start-at"
        )
    )
}

/// Render the status list as a Markdown document
pub fn format_statuses_markdown(statuses: &[StatusOutput]) -> String {
    if statuses.is_empty() {
        return "No statuses found.".to_string();
    }

    let mut lines = vec![
        "| Status | Category | Description |".to_string(),
        "| --- | --- | --- |".to_string(),
    ];
    for status in statuses {
        lines.push(format!(
            "| {} | {} | {} |",
            status.name,
            status.category.as_deref().unwrap_or("-"),
            status.description.as_deref().unwrap_or("-")
        ));
    }

    lines.join("\n")
}

/// Render development info as a Markdown document
pub fn format_dev_info_markdown(issue_key: &str, info: &DevInfoOutput) -> String {
    let mut sections = vec![format!("# Development info for {issue_key}")];

    if !info.branches.is_empty() {
        let mut lines = vec![format!("## Branches ({})", info.branches.len())];
        for branch in &info.branches {
            lines.push(match &branch.url {
                Some(url) => format!("- [{}]({url})", branch.name),
                None => format!("- {}", branch.name),
            });
        }
        sections.push(lines.join("\n"));
    }

    if !info.commits.is_empty() {
        let mut lines = vec![format!("## Commits ({})", info.commits.len())];
        for commit in &info.commits {
            lines.push(format!(
                "- `{}` {}",
                commit.display_id.as_deref().unwrap_or("unknown"),
                commit.message.as_deref().unwrap_or("").lines().next().unwrap_or("")
            ));
        }
        sections.push(lines.join("\n"));
    }

    if !info.pull_requests.is_empty() {
        let mut lines = vec![format!("## Pull Requests ({})", info.pull_requests.len())];
        for pr in &info.pull_requests {
            let status = pr.status.as_deref().unwrap_or("UNKNOWN");
            lines.push(match &pr.url {
                Some(url) => format!("- [{}]({url}) ({status})", pr.name),
                None => format!("- {} ({status})", pr.name),
            });
        }
        sections.push(lines.join("\n"));
    }

    if sections.len() == 1 {
        sections.push("No linked development information.".to_string());
    }

    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // Helper to create a basic issue response for testing
    fn create_issue_response(
        key: &str,
        summary: &str,
        status: &str,
        assignee: Option<JiraAssignee>,
    ) -> JiraIssueResponse {
        JiraIssueResponse {
            id: Some("10000".to_string()),
            key: key.to_string(),
            fields: JiraIssueFields {
                summary: summary.to_string(),
                status: Some(JiraStatus {
                    name: status.to_string(),
                }),
                assignee,
                ..Default::default()
            },
        }
    }

    fn no_pagination(count: usize) -> PaginationInfo {
        PaginationInfo {
            count,
            ..Default::default()
        }
    }

    #[test]
    fn test_transform_search_response_basic() {
        // Arrange: Create a basic search response with one issue
        let response = JiraSearchResponse {
            issues: vec![create_issue_response(
                "PROJ-123",
                "Fix bug in authentication",
                "In Progress",
                Some(JiraAssignee {
                    display_name: Some("John Doe".to_string()),
                    email_address: Some("john@example.com".to_string()),
                }),
            )],
            total: Some(1),
            start_at: Some(0),
            max_results: Some(10),
        };

        // Act: Transform the response
        let output = transform_search_response(response, no_pagination(1));

        // Assert: Verify the transformation
        assert_eq!(output.total, 1);
        assert_eq!(output.issues.len(), 1);

        let issue = &output.issues[0];
        assert_eq!(issue.key, "PROJ-123");
        assert_eq!(issue.summary, "Fix bug in authentication");
        assert_eq!(issue.status, "In Progress");
        assert_eq!(issue.assignee, Some("John Doe".to_string()));
    }

    #[test]
    fn test_transform_search_response_assignee_email_fallback() {
        // Arrange: An assignee with only an email address
        let response = JiraSearchResponse {
            issues: vec![create_issue_response(
                "PROJ-999",
                "Issue with email only",
                "Blocked",
                Some(JiraAssignee {
                    display_name: None,
                    email_address: Some("user@example.com".to_string()),
                }),
            )],
            total: Some(1),
            start_at: Some(0),
            max_results: Some(10),
        };

        // Act
        let output = transform_search_response(response, no_pagination(1));

        // Assert: emailAddress is used when displayName is absent
        assert_eq!(
            output.issues[0].assignee,
            Some("user@example.com".to_string())
        );
    }

    #[test]
    fn test_transform_search_response_missing_assignee() {
        let response = JiraSearchResponse {
            issues: vec![create_issue_response("PROJ-456", "Unassigned", "To Do", None)],
            total: Some(1),
            start_at: Some(0),
            max_results: Some(10),
        };

        let output = transform_search_response(response, no_pagination(1));

        assert_eq!(output.issues[0].assignee, None);
    }

    #[test]
    fn test_transform_search_response_total_missing() {
        let response = JiraSearchResponse {
            issues: vec![],
            total: None,
            start_at: None,
            max_results: None,
        };

        let output = transform_search_response(response, no_pagination(0));

        assert_eq!(output.total, 0);
        assert!(output.issues.is_empty());
    }

    #[test]
    fn test_transform_ticket_response_full() {
        // Arrange: A ticket with an ADF description and one comment
        let mut issue = create_issue_response(
            "PROJ-456",
            "Implement authentication",
            "In Progress",
            Some(JiraAssignee {
                display_name: Some("John Doe".to_string()),
                email_address: None,
            }),
        );
        issue.fields.description = Some(json!({
            "version": 1,
            "type": "doc",
            "content": [{
                "type": "paragraph",
                "content": [{"type": "text", "text": "Use OAuth2."}]
            }]
        }));
        issue.fields.priority = Some(JiraPriority {
            name: "High".to_string(),
        });
        issue.fields.issuetype = Some(JiraIssueType {
            name: "Story".to_string(),
        });
        issue.fields.labels = vec!["backend".to_string(), "api".to_string()];
        issue.fields.components = vec![JiraComponent {
            name: "Auth".to_string(),
        }];

        let comments = vec![JiraComment {
            id: "1".to_string(),
            body: json!("Great work!"),
            created: Some("2024-01-01T12:00:00.000+0000".to_string()),
            author: Some(JiraAssignee {
                display_name: Some("Jane".to_string()),
                email_address: None,
            }),
        }];

        // Act
        let output = transform_ticket_response(issue, comments);

        // Assert
        assert_eq!(output.key, "PROJ-456");
        assert_eq!(output.description, Some("Use OAuth2.".to_string()));
        assert_eq!(output.priority, Some("High".to_string()));
        assert_eq!(output.issue_type, Some("Story".to_string()));
        assert_eq!(output.labels, vec!["backend", "api"]);
        assert_eq!(output.components, vec!["Auth"]);
        assert_eq!(output.comments.len(), 1);
        assert_eq!(output.comments[0].body, "Great work!");
        assert_eq!(output.comments[0].author, Some("Jane".to_string()));
    }

    #[test]
    fn test_transform_ticket_response_empty_priority_filtered() {
        let mut issue = create_issue_response("PROJ-300", "Empty priority", "Open", None);
        issue.fields.priority = Some(JiraPriority {
            name: String::new(),
        });

        let output = transform_ticket_response(issue, vec![]);

        assert_eq!(output.priority, None);
    }

    #[test]
    fn test_transform_comment_renders_adf_body() {
        // Arrange: An ADF comment body with a mention
        let comment = JiraComment {
            id: "42".to_string(),
            body: json!({
                "version": 1,
                "type": "doc",
                "content": [{
                    "type": "paragraph",
                    "content": [
                        {"type": "mention", "attrs": {"text": "@Sam"}},
                        {"type": "text", "text": " please review"}
                    ]
                }]
            }),
            created: None,
            author: None,
        };

        // Act
        let output = transform_comment(comment);

        // Assert
        assert_eq!(output.body, "@Sam please review");
        assert_eq!(output.author, None);
    }

    #[test]
    fn test_transform_projects() {
        let projects = vec![JiraProject {
            id: "10001".to_string(),
            key: "PROJ".to_string(),
            name: "My Project".to_string(),
            project_type_key: Some("software".to_string()),
            lead: Some(JiraProjectLead {
                display_name: Some("Lead Person".to_string()),
            }),
        }];

        let output = transform_projects(projects, Some(1), no_pagination(1));

        assert_eq!(output.projects.len(), 1);
        assert_eq!(output.projects[0].key, "PROJ");
        assert_eq!(output.projects[0].project_type, Some("software".to_string()));
        assert_eq!(output.projects[0].lead, Some("Lead Person".to_string()));
    }

    #[test]
    fn test_transform_statuses_filters_empty_description() {
        let statuses = vec![JiraStatusDef {
            name: "Done".to_string(),
            description: Some(String::new()),
            status_category: Some(JiraStatusCategory {
                name: "Done".to_string(),
            }),
        }];

        let output = transform_statuses(statuses);

        assert_eq!(output[0].description, None);
        assert_eq!(output[0].category, Some("Done".to_string()));
    }

    #[test]
    fn test_transform_dev_info_counts_each_source() {
        // Arrange: Branches and PRs on the detail, commits on repositories
        let branches: DevDetailResponse = serde_json::from_value(json!({
            "detail": [{"branches": [{"name": "feature/login"}]}]
        }))
        .unwrap();
        let commits: DevDetailResponse = serde_json::from_value(json!({
            "detail": [{"repositories": [{
                "name": "backend",
                "commits": [
                    {"displayId": "abc1234", "message": "Add login"},
                    {"displayId": "def5678", "message": "Fix typo"}
                ]
            }]}]
        }))
        .unwrap();
        let prs: DevDetailResponse = serde_json::from_value(json!({
            "detail": [{"pullRequests": [{"name": "Login flow", "status": "OPEN"}]}]
        }))
        .unwrap();

        // Act
        let output = transform_dev_info(branches, commits, prs);

        // Assert
        assert_eq!(output.branches.len(), 1);
        assert_eq!(output.commits.len(), 2);
        assert_eq!(output.pull_requests.len(), 1);
        assert_eq!(output.branches[0].name, "feature/login");
        assert_eq!(output.pull_requests[0].status, Some("OPEN".to_string()));
    }

    #[test]
    fn test_format_pagination_footer_full() {
        let pagination = PaginationInfo {
            count: 25,
            has_more: true,
            next_cursor: Some("25".to_string()),
        };

        let footer = format_pagination_footer(&pagination, Some(100), "issues", "--start-at");

        assert_eq!(
            footer,
            "Showing 25 of 100 issues. More results are available. Use --start-at \"25\" to continue."
        );
    }

    #[test]
    fn test_format_pagination_footer_no_more_results() {
        let pagination = PaginationInfo {
            count: 3,
            has_more: false,
            next_cursor: None,
        };

        let footer = format_pagination_footer(&pagination, Some(3), "issues", "--start-at");

        assert_eq!(footer, "Showing 3 of 3 issues.");
        assert!(!footer.contains("More results"));
        assert!(!footer.contains("--start-at"));
    }

    #[test]
    fn test_format_pagination_footer_unknown_total() {
        let pagination = PaginationInfo {
            count: 7,
            has_more: false,
            next_cursor: None,
        };

        let footer = format_pagination_footer(&pagination, None, "comments", "--start-at");

        assert_eq!(footer, "Showing 7 comments.");
    }

    #[test]
    fn test_format_pagination_footer_has_more_without_cursor() {
        // The flag hint needs a cursor to be useful
        let pagination = PaginationInfo {
            count: 10,
            has_more: true,
            next_cursor: None,
        };

        let footer = format_pagination_footer(&pagination, Some(50), "issues", "--start-at");

        assert!(footer.contains("More results are available."));
        assert!(!footer.contains("--start-at"));
    }

    #[test]
    fn test_format_search_markdown_contains_footer() {
        let output = SearchOutput {
            issues: vec![IssueOutput {
                key: "PROJ-1".to_string(),
                summary: "First".to_string(),
                status: "Open".to_string(),
                assignee: None,
            }],
            total: 40,
            pagination: PaginationInfo {
                count: 1,
                has_more: true,
                next_cursor: Some("1".to_string()),
            },
        };

        let markdown = format_search_markdown(&output);

        assert!(markdown.contains("| PROJ-1 | First | Open | Unassigned |"));
        assert!(markdown.contains("Showing 1 of 40 issues."));
        assert!(markdown.contains("Use --start-at \"1\" to continue."));
    }

    #[test]
    fn test_format_search_markdown_empty() {
        let output = SearchOutput {
            issues: vec![],
            total: 0,
            pagination: PaginationInfo::default(),
        };

        let markdown = format_search_markdown(&output);

        assert_eq!(markdown, "No issues found.");
        assert!(!markdown.contains("Showing"));
    }

    #[test]
    fn test_format_ticket_markdown_sections() {
        let ticket = TicketOutput {
            key: "PROJ-9".to_string(),
            summary: "Ship it".to_string(),
            description: Some("Do the thing.".to_string()),
            status: "In Review".to_string(),
            priority: None,
            issue_type: Some("Task".to_string()),
            assignee: None,
            created: None,
            updated: None,
            due_date: None,
            labels: vec![],
            components: vec![],
            comments: vec![CommentOutput {
                id: "1".to_string(),
                author: Some("Jane".to_string()),
                created: None,
                body: "LGTM".to_string(),
            }],
        };

        let markdown = format_ticket_markdown(&ticket);

        assert!(markdown.starts_with("# PROJ-9: Ship it"));
        assert!(markdown.contains("**Status:** In Review"));
        assert!(markdown.contains("**Assignee:** Unassigned"));
        assert!(markdown.contains("## Description\n\nDo the thing."));
        assert!(markdown.contains("## Comments (1)"));
        assert!(markdown.contains("LGTM"));
        assert!(!markdown.contains("**Priority:**"));
    }

    #[test]
    fn test_format_comments_markdown_empty() {
        let output = CommentsOutput {
            comments: vec![],
            total: 0,
            pagination: PaginationInfo::default(),
        };

        assert_eq!(
            format_comments_markdown("PROJ-1", &output),
            "No comments on PROJ-1."
        );
    }

    #[test]
    fn test_format_timestamp_jira_format() {
        assert_eq!(
            format_timestamp("2024-01-15T10:30:00.000+0000"),
            "2024-01-15 10:30"
        );
    }

    #[test]
    fn test_format_timestamp_passes_through_garbage() {
        assert_eq!(format_timestamp("yesterday"), "yesterday");
    }

    #[test]
    fn test_format_dev_info_markdown_empty() {
        let markdown = format_dev_info_markdown("PROJ-1", &DevInfoOutput::default());
        assert!(markdown.contains("No linked development information."));
    }
}
