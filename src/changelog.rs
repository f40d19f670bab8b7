use std::collections::{BTreeSet, HashMap};

use anyhow::{ensure, Result};
use log::debug;
use md5::{Digest, Md5};
use serde::Serialize;

use crate::labels::{self, Labels};
use crate::macros::ok_or_continue;

/// Separates the fields of a single `git log` line.
pub const FIELD_SEPARATOR: char = '\u{1f}';

/// A single commit as it appears in the release notes.
/// Designed to be initialized using [`tokenize_git_log`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangelogEntry {
    /// The abbreviated commit hash
    pub hash: String,
    /// The commit subject, without labels once [`annotate_labels`] ran
    pub message: String,
    /// The author's name
    pub author_name: String,
    /// The author's e-mail
    pub author_email: String,
    /// The gravatar hash of the author's e-mail
    pub author_gravatar: String,
    /// Labels parsed from the subject
    pub labels: Labels,
    /// Sorted display form of the labels
    pub pretty_labels: Vec<String>,
}

impl ChangelogEntry {
    /// Creates a new entry without labels.
    pub fn new(hash: &str, message: &str, author_name: &str, author_email: &str) -> Self {
        return Self {
            hash: hash.to_owned(),
            message: message.to_owned(),
            author_name: author_name.to_owned(),
            author_email: author_email.to_owned(),
            author_gravatar: gravatar_hash(author_email),
            labels: Labels::new(),
            pretty_labels: Vec::new(),
        };
    }

    /// Parses a line of `git log` output.
    /// Fields are hash, subject, author name and author e-mail, separated by
    /// [`FIELD_SEPARATOR`].
    /// ```
    /// # use release_email::changelog::ChangelogEntry;
    /// let entry = ChangelogEntry::from_log_line(
    ///     "abcde\u{1f}Some message\u{1f}Sherlock Holmes\u{1f}sherlock@example.com"
    /// ).unwrap();
    /// assert_eq!(entry.hash, "abcde");
    /// assert_eq!(entry.author_email, "sherlock@example.com");
    /// assert!(ChangelogEntry::from_log_line("abcde\u{1f}No author").is_err());
    /// ```
    pub fn from_log_line(line: &str) -> Result<Self> {
        let fields = line
            .splitn(4, FIELD_SEPARATOR)
            .collect::<Vec<&str>>();

        ensure!(fields.len() == 4, "Log line doesn't have 4 fields: '{}'", line);

        return Ok(Self::new(fields[0], fields[1], fields[2], fields[3]));
    }

    /// Whether this is a merge commit.
    pub fn is_merge(&self) -> bool {
        return self.message.starts_with("Merge");
    }
}

/// A person that authored at least one commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contributor {
    /// The author's name
    pub name: String,
    /// The author's e-mail
    pub email: String,
    /// The gravatar hash shared by all the author's addresses
    pub gravatar: String,
}

/// Computes gravatar's hash for an e-mail.
/// ```
/// # use release_email::changelog::gravatar_hash;
/// let hash = gravatar_hash("jairtrejo@gmail.com");
/// assert_eq!(hash.len(), 32);
/// assert_eq!(hash, gravatar_hash("Jairtrejo@GMAIL.COM "));
/// ```
pub fn gravatar_hash(email: &str) -> String {
    let normalized_email = email.trim().to_lowercase();
    return hex::encode(Md5::digest(normalized_email.as_bytes()));
}

/// Tokenizes raw `git log` output into changelog entries.
/// Merge commits are dropped and lines that can't be read are skipped.
/// ```
/// # use release_email::changelog::tokenize_git_log;
/// let raw_log = [
///     "abcde\u{1f}Some message\u{1f}Sherlock Holmes\u{1f}sherlock@example.com",
///     "fghij\u{1f}Merge branch 'x'\u{1f}John Watson\u{1f}watson@example.com",
/// ].join("\n");
/// let changelog = tokenize_git_log(&raw_log);
/// assert_eq!(changelog.len(), 1);
/// assert_eq!(changelog[0].author_name, "Sherlock Holmes");
/// ```
pub fn tokenize_git_log(raw_log: &str) -> Vec<ChangelogEntry> {
    let mut changelog = Vec::new();

    for line in raw_log.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        let entry = ok_or_continue!(ChangelogEntry::from_log_line(line));
        if entry.is_merge() {
            debug!("Dropping merge commit {}", entry.hash);
            continue;
        }
        changelog.push(entry);
    }

    return changelog;
}

/// Annotates entries with their labels and strips the labels from messages.
pub fn annotate_labels(mut changelog: Vec<ChangelogEntry>) -> Vec<ChangelogEntry> {
    for entry in changelog.iter_mut() {
        entry.labels = labels::parse(&entry.message);
        entry.pretty_labels = entry.labels.pretty();
        entry.message = labels::strip(&entry.message);
    }
    return changelog;
}

/// Drops every entry carrying any of the given labels.
/// ```
/// # use release_email::changelog::{annotate_labels, exclude_labeled, ChangelogEntry};
/// let changelog = annotate_labels(vec![
///     ChangelogEntry::new("a", "(ignore) Typo", "A", "a@example.com"),
///     ChangelogEntry::new("b", "(md:1) Feature", "B", "b@example.com"),
/// ]);
/// let kept = exclude_labeled(changelog, &["ignore".to_string()]);
/// assert_eq!(kept.len(), 1);
/// assert_eq!(kept[0].hash, "b");
/// ```
pub fn exclude_labeled(changelog: Vec<ChangelogEntry>, keys: &[String]) -> Vec<ChangelogEntry> {
    return changelog
        .into_iter()
        .filter(|entry| {
            let excluded = keys.iter().any(|key| entry.labels.contains(key));
            if excluded {
                debug!("Excluding {} ({})", entry.hash, entry.labels);
            }
            return !excluded;
        })
        .collect();
}

/// Gets the contributors of a changelog, merged by gravatar hash.
/// Contributors keep the order they first appear in, with the name and
/// e-mail of their latest entry.
pub fn contributors(changelog: &[ChangelogEntry]) -> Vec<Contributor> {
    let mut contributors: Vec<Contributor> = Vec::new();
    let mut seen: HashMap<&str, usize> = HashMap::new();

    for entry in changelog {
        let contributor = Contributor {
            name: entry.author_name.to_owned(),
            email: entry.author_email.to_owned(),
            gravatar: entry.author_gravatar.to_owned(),
        };
        match seen.get(entry.author_gravatar.as_str()) {
            Some(&index) => contributors[index] = contributor,
            None => {
                seen.insert(entry.author_gravatar.as_str(), contributors.len());
                contributors.push(contributor);
            },
        }
    }

    return contributors;
}

/// Collects the ids referenced by a label across the whole changelog.
/// ```
/// # use release_email::changelog::{annotate_labels, task_ids, ChangelogEntry};
/// let changelog = annotate_labels(vec![
///     ChangelogEntry::new("a", "(md:123) One", "A", "a@example.com"),
///     ChangelogEntry::new("b", "Two", "B", "b@example.com"),
///     ChangelogEntry::new("c", r#"(md:"456,123") Three"#, "C", "c@example.com"),
/// ]);
/// let ids = task_ids(&changelog, "md");
/// assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec!["123", "456"]);
/// ```
pub fn task_ids(changelog: &[ChangelogEntry], key: &str) -> BTreeSet<String> {
    return changelog
        .iter()
        .flat_map(|entry| entry.labels.values_of(key))
        .collect();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(fields: [&str; 4]) -> String {
        return fields.join(FIELD_SEPARATOR.to_string().as_str());
    }

    fn raw_log(lines: &[[&str; 4]]) -> String {
        return lines
            .iter()
            .map(|fields| line(*fields))
            .collect::<Vec<String>>()
            .join("\n");
    }

    #[test]
    fn tokenizes_log_correctly() {
        let changelog = tokenize_git_log(&raw_log(&[
            ["abcde", "Some message", "Sherlock Holmes", "sherlock@example.com"],
            ["fghij", "Other message", "John Watson", "watson@example.com"],
        ]));

        assert_eq!(changelog.len(), 2);
        let first = &changelog[0];
        assert_eq!(first.hash, "abcde");
        assert_eq!(first.message, "Some message");
        assert_eq!(first.author_name, "Sherlock Holmes");
        assert_eq!(first.author_email, "sherlock@example.com");
        assert_eq!(first.author_gravatar, gravatar_hash("sherlock@example.com"));
    }

    #[test]
    fn removes_merge_commits() {
        let changelog = tokenize_git_log(&raw_log(&[
            ["abcde", "Some message", "Sherlock Holmes", "sherlock@example.com"],
            ["fghij", "Merge commit", "John Watson", "watson@example.com"],
        ]));

        assert_eq!(changelog.len(), 1);
        assert_eq!(changelog[0].author_email, "sherlock@example.com");
    }

    #[test]
    fn skips_blank_and_short_lines() {
        let raw = format!(
            "\n{}\r\nbroken line\n\n",
            line(["abcde", "Some message", "Sherlock Holmes", "sherlock@example.com"]),
        );
        let changelog = tokenize_git_log(&raw);

        assert_eq!(changelog.len(), 1);
        assert_eq!(changelog[0].author_email, "sherlock@example.com");
    }

    #[test]
    fn empty_log_has_no_entries() {
        assert!(tokenize_git_log("").is_empty());
        assert!(annotate_labels(Vec::new()).is_empty());
    }

    #[test]
    fn known_gravatar_hash() {
        assert_eq!(gravatar_hash("MyEmailAddress@example.com "), "0bc83cb571cd1c50ba6f3e8a78ef1346");
    }

    #[test]
    fn annotates_labels() {
        let changelog = annotate_labels(vec![
            ChangelogEntry::new("abcde", "(md:123 wip) Some message", "A", "a@example.com"),
            ChangelogEntry::new("fghij", "Plain (x) message", "B", "b@example.com"),
        ]);

        assert_eq!(changelog[0].message, "Some message");
        assert_eq!(changelog[0].labels.get("md"), Some("123"));
        assert_eq!(changelog[0].pretty_labels, vec!["md:123", "wip"]);
        assert_eq!(changelog[1].message, "Plain (x) message");
        assert!(changelog[1].labels.is_empty());
        assert!(changelog[1].pretty_labels.is_empty());
    }

    #[test]
    fn gets_all_contributors() {
        let changelog = tokenize_git_log(&raw_log(&[
            ["abcde", "Some message", "Sherlock Holmes", "sherlock@example.com"],
            ["fghij", "Other message", "John Watson", "watson@example.com"],
        ]));
        let contributors = contributors(&changelog);

        assert_eq!(contributors.len(), 2);
        assert_eq!(contributors[0].email, "sherlock@example.com");
        assert_eq!(contributors[1].email, "watson@example.com");
    }

    #[test]
    fn merges_contributors_by_gravatar() {
        let changelog = tokenize_git_log(&raw_log(&[
            ["abcde", "Some message", "Sherlock Holmes", "sherlock@example.com"],
            ["fghij", "Other message", "John Watson", "Watson@example.com"],
            ["klmno", "New message", "Sherlock Holmes", "sherlock@example.com"],
            ["pqrst", "Final message", "John Watson", "watson@example.com"],
        ]));
        let contributors = contributors(&changelog);

        assert_eq!(contributors.len(), 2);
        assert_eq!(contributors[0].email, "sherlock@example.com");
        assert_eq!(contributors[1].email, "watson@example.com");
        assert_eq!(contributors[1].gravatar, gravatar_hash("watson@example.com"));
    }

    #[test]
    fn gets_task_ids_from_labels() {
        let changelog = annotate_labels(tokenize_git_log(&raw_log(&[
            ["abcde", "Some message", "Sherlock Holmes", "sherlock@example.com"],
            ["fghij", "(md:123) Other message", "John Watson", "Watson@example.com"],
            ["klmno", "New message", "Sherlock Holmes", "sherlock@example.com"],
            ["pqrst", "(md:456) Final message", "John Watson", "watson@example.com"],
        ])));
        let ids = task_ids(&changelog, "md");

        assert_eq!(ids, BTreeSet::from(["123".to_string(), "456".to_string()]));
        assert!(task_ids(&changelog, "jira").is_empty());
    }

    #[test]
    fn excludes_any_of_the_keys() {
        let changelog = annotate_labels(vec![
            ChangelogEntry::new("a", "(ignore) One", "A", "a@example.com"),
            ChangelogEntry::new("b", "(skip:yes) Two", "A", "a@example.com"),
            ChangelogEntry::new("c", "Three (ignore)", "A", "a@example.com"),
        ]);
        let kept = exclude_labeled(changelog, &["ignore".to_string(), "skip".to_string()]);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].hash, "c");
    }
}
