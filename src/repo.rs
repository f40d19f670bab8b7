use anyhow::{anyhow, ensure, Context, Result};
use log::{debug, info};

use super::GIT_FOLDERNAME;

use std::{path::PathBuf, process::Command, str::FromStr};

use crate::changelog::{tokenize_git_log, ChangelogEntry};

/// Pretty format for `git log`: hash, subject, author name and e-mail
/// separated by [`crate::changelog::FIELD_SEPARATOR`].
const LOG_FORMAT: &str = "--pretty=format:%h%x1f%s%x1f%an%x1f%ae";

/// Builds the arguments for `git log` since a revision.
/// Without a revision the whole history is logged.
/// ```
/// # use release_email::git_log_args;
/// let args = git_log_args(Some("abcde"));
/// assert_eq!(args[0], "log");
/// assert_eq!(args.last().unwrap(), "abcde..");
/// assert_eq!(git_log_args(None).len(), 2);
/// ```
pub fn git_log_args(since: Option<&str>) -> Vec<String> {
    let mut args = vec!["log".to_string(), LOG_FORMAT.to_string()];
    if let Some(since) = since {
        args.push(format!("{since}.."));
    }
    return args;
}

/// Struct that represents a repository.
#[derive(Debug, Clone)]
pub struct Repo {
    /// The working tree git commands run in
    pub work_tree: PathBuf,
    /// The `.git` entry of the working tree
    pub dir: PathBuf,
}

impl Repo {
    /// Constructs a repo object from a path.
    /// ```
    /// # use release_email::Repo;
    /// assert!(Repo::from_path("/nonexistent/path").is_err());
    /// ```
    pub fn from_path(path: &str) -> Result<Self> {
        return Self::from_pathbuf(&PathBuf::from_str(path)?);
    }

    /// Tries to construct a repo from a path.
    /// The `.git` entry may be a directory or, for worktrees, a file.
    pub fn from_pathbuf(path: &PathBuf) -> Result<Self> {
        let git_path = path.join(GIT_FOLDERNAME);
        if git_path.exists() {
            return Ok(
                Repo {
                    work_tree: path.to_owned(),
                    dir: git_path,
                });
        } else {
            return Err(anyhow!("Couldn't read repo in path: '{:?}'", path));
        }
    }

    /// Runs `git log` since a revision and returns its raw output.
    pub fn raw_log(&self, since: Option<&str>) -> Result<String> {
        let args = git_log_args(since);
        debug!("Running git {:?} in {:?}", args, self.work_tree);

        let output = Command::new("git")
            .args(&args)
            .current_dir(&self.work_tree)
            .output()
            .with_context(|| "Couldn't run git, is it installed?")?;

        ensure!(output.status.success(), anyhow!(
            "git log failed ({}): {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim(),
        ));

        return Ok(String::from_utf8_lossy(&output.stdout).to_string());
    }

    /// Gets the changelog since a revision.
    pub fn changelog(&self, since: Option<&str>) -> Result<Vec<ChangelogEntry>> {
        let changelog = tokenize_git_log(&self.raw_log(since)?);
        info!("{} commits since {}", changelog.len(), since.unwrap_or("the first commit"));
        return Ok(changelog);
    }
}
