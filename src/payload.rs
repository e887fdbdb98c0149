//! Jira issue payloads
//!
//! Builds the `/issue` request body for one task line. A task line is either
//! `Title~Description` or just `Title`, in which case the title doubles as the
//! description.

use serde::Serialize;

/// Separator between summary and description in a task line
pub const DESCRIPTION_SEPARATOR: char = '~';

/// Issue type every generated ticket is created with
pub const ISSUE_TYPE: &str = "Task";

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct IssuePayload {
    pub fields: IssueFields,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct IssueFields {
    pub project: KeyRef,
    pub summary: String,
    #[serde(rename = "issuetype")]
    pub issue_type: NameRef,
    pub description: Document,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter: Option<AccountRef>,
    pub parent: KeyRef,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct KeyRef {
    pub key: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NameRef {
    pub name: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AccountRef {
    #[serde(rename = "accountId")]
    pub account_id: String,
}

/// Atlassian document format node
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Document {
    #[serde(rename = "type")]
    pub node_type: String,
    pub version: u32,
    pub content: Vec<Node>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Node {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Node>,
}

impl Document {
    /// A document holding `text` as a single paragraph
    pub fn paragraph(text: impl Into<String>) -> Self {
        let text_node = Node {
            node_type: "text".into(),
            text: Some(text.into()),
            content: Vec::new(),
        };
        Self {
            node_type: "doc".into(),
            version: 1,
            content: vec![Node {
                node_type: "paragraph".into(),
                text: None,
                content: vec![text_node],
            }],
        }
    }

    /// Text of the first text node, if any
    pub fn text(&self) -> Option<&str> {
        self.content
            .first()
            .and_then(|paragraph| paragraph.content.first())
            .and_then(|node| node.text.as_deref())
    }
}

/// Splits a task line into `(summary, description)` on the first `~`
///
/// Whitespace around the separator is dropped from both halves, so
/// `"Fix login ~ Users get logged out"` gives `("Fix login", "Users get
/// logged out")`. A line without `~` is used untouched for both.
pub fn split_title(title: &str) -> (&str, &str) {
    match title.split_once(DESCRIPTION_SEPARATOR) {
        Some((summary, description)) => (summary.trim(), description.trim()),
        None => (title, title),
    }
}

/// Builds the issue creation body for one task line
pub fn build_payload(project: &str, epic: &str, title: &str, reporter_account_id: Option<&str>) -> IssuePayload {
    let (summary, description) = split_title(title);

    IssuePayload {
        fields: IssueFields {
            project: KeyRef { key: project.into() },
            summary: summary.into(),
            issue_type: NameRef {
                name: ISSUE_TYPE.into(),
            },
            description: Document::paragraph(description),
            reporter: reporter_account_id.map(|account_id| AccountRef {
                account_id: account_id.into(),
            }),
            parent: KeyRef { key: epic.into() },
        },
    }
}
