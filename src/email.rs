//! The release e-mail: a few mail headers followed by an HTML body listing
//! the commits, contributors and tasks of a deployment.

use chrono::Local;
use serde::Serialize;

use crate::api::jira::Issue;
use crate::api::manoderecha::Task;
use crate::changelog::{ChangelogEntry, Contributor};

const TIME_FORMAT: &str = "%a, %B %d, %Y, %H:%M";

/// Basic information about a release of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseInfo {
    /// Live url of the project
    pub project_url: String,
    /// The project url without its scheme
    pub nice_project_url: String,
    /// When the release happened
    pub current_time: String,
}

impl ReleaseInfo {
    /// Creates the release info for a project released now.
    /// ```
    /// # use release_email::email::ReleaseInfo;
    /// let info = ReleaseInfo::new("http://example.com/some-project");
    /// assert_eq!(info.project_url, "http://example.com/some-project");
    /// assert_eq!(info.nice_project_url, "example.com/some-project");
    /// assert!(!info.current_time.is_empty());
    /// ```
    pub fn new(project_url: &str) -> Self {
        return Self {
            project_url: project_url.to_owned(),
            nice_project_url: nice_url(project_url),
            current_time: Local::now().format(TIME_FORMAT).to_string(),
        };
    }
}

/// Drops the scheme of a url.
fn nice_url(url: &str) -> String {
    return match url.split_once("://") {
        Some((_, rest)) => rest.to_owned(),
        None => url.to_owned(),
    };
}

/// Escapes text for HTML bodies and attributes.
/// ```
/// # use release_email::email::escape_html;
/// assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
/// ```
pub fn escape_html(text: &str) -> String {
    return text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;");
}

/// Everything that goes into a release e-mail.
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseEmail {
    /// Basic release info
    #[serde(flatten)]
    pub info: ReleaseInfo,
    /// The commits in this release, labels already parsed
    pub git_log: Vec<ChangelogEntry>,
    /// Everyone who authored a commit
    pub contributors: Vec<Contributor>,
    /// Tasks referenced by the commits
    pub tasks: Vec<Task>,
    /// Issues referenced by the commits
    pub issues: Vec<Issue>,
    /// Url of the remote repository, used to link commits
    pub remote_url: Option<String>,
}

impl ReleaseEmail {
    /// Creates an e-mail without commits.
    pub fn new(info: ReleaseInfo) -> Self {
        return Self {
            info,
            git_log: Vec::new(),
            contributors: Vec::new(),
            tasks: Vec::new(),
            issues: Vec::new(),
            remote_url: None,
        };
    }

    /// The mail headers, one per line.
    pub fn headers(&self) -> Vec<String> {
        return vec![
            format!("Subject: New deployment to {}", self.info.nice_project_url),
            "MIME-Version: 1.0".to_string(),
            "Content-Type: text/html; charset=utf-8".to_string(),
            "Content-Disposition: inline".to_string(),
        ];
    }

    /// Link to a commit on the remote, if there's one.
    pub fn commit_url(&self, hash: &str) -> Option<String> {
        return self.remote_url
            .as_ref()
            .map(|remote| format!("{}/commit/{hash}", remote.trim_end_matches('/')));
    }

    /// Renders the headers and the HTML body.
    pub fn render(&self) -> String {
        let mut mail = self.headers().join("\n");
        mail.push_str("\n\n");
        mail.push_str(&self.body());
        return mail;
    }

    /// The HTML body of the mail.
    fn body(&self) -> String {
        let mut body = String::new();
        body.push_str("<!DOCTYPE html>\n");
        body.push_str("<html><body style=\"font-family: sans-serif;\">\n");
        body.push_str(&format!(
            "<h1>New deployment to <a href=\"{}\">{}</a></h1>\n",
            escape_html(&self.info.project_url),
            escape_html(&self.info.nice_project_url),
        ));
        body.push_str(&format!("<p>{}</p>\n", escape_html(&self.info.current_time)));

        body.push_str("<h2>Changes</h2>\n");
        if self.git_log.is_empty() {
            body.push_str("<p>No changes.</p>\n");
        } else {
            body.push_str("<ul>\n");
            for entry in &self.git_log {
                let hash = escape_html(&entry.hash);
                let hash = match self.commit_url(&entry.hash) {
                    Some(url) => format!("<a href=\"{}\"><code>{hash}</code></a>", escape_html(&url)),
                    None => format!("<code>{hash}</code>"),
                };
                body.push_str(&format!("<li>{hash} {}", escape_html(&entry.message)));
                for label in &entry.pretty_labels {
                    body.push_str(&format!(" <small>[{}]</small>", escape_html(label)));
                }
                body.push_str(&format!(" <em>{}</em></li>\n", escape_html(&entry.author_name)));
            }
            body.push_str("</ul>\n");
        }

        if !self.tasks.is_empty() {
            body.push_str("<h2>Tasks</h2>\n<ul>\n");
            for task in &self.tasks {
                body.push_str(&format!(
                    "<li><code>{}</code> #{} {}</li>\n",
                    escape_html(&task.status().to_string()),
                    task.id,
                    escape_html(&task.concept),
                ));
            }
            body.push_str("</ul>\n");
        }

        if !self.issues.is_empty() {
            body.push_str("<h2>Issues</h2>\n<ul>\n");
            for issue in &self.issues {
                body.push_str(&format!(
                    "<li>{} {}</li>\n",
                    escape_html(&issue.key),
                    escape_html(&issue.fields.summary),
                ));
            }
            body.push_str("</ul>\n");
        }

        if !self.contributors.is_empty() {
            body.push_str("<h2>Contributors</h2>\n<p>\n");
            for contributor in &self.contributors {
                body.push_str(&format!(
                    "<img src=\"https://www.gravatar.com/avatar/{}?s=40\" alt=\"{name}\" title=\"{name}\">\n",
                    contributor.gravatar,
                    name = escape_html(&contributor.name),
                ));
            }
            body.push_str("</p>\n");
        }

        body.push_str("</body></html>\n");
        return body;
    }
}
