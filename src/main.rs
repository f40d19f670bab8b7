use std::{fs, process::exit};

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use log::warn;
use simple_logger::SimpleLogger;

use release_email::{
    api::{jenkins, jira::{Issue, Jira}, manoderecha::{Manoderecha, Task}},
    changelog::{annotate_labels, contributors, exclude_labeled, task_ids, ChangelogEntry},
    cli::Args,
    email::{ReleaseEmail, ReleaseInfo},
    Repo,
};

fn main() {
    let args = Args::parse();

    if let Err(e) = SimpleLogger::new().with_level(args.log_level()).init() {
        eprintln!("Couldn't set up logging: {e}");
    }

    if let Err(e) = run(&args) {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let repo = Repo::from_path(&args.path)?;

    // Gets the revision the log starts from
    let since = match &args.since {
        Some(v) => Some(v.to_owned()),
        None => jenkins::last_good_revision(&args.ci_url, &args.job_name)
            .with_context(|| format!("Couldn't get the last good build of '{}'", args.job_name))?,
    };

    let git_log = annotate_labels(repo.changelog(since.as_deref())?);
    let git_log = exclude_labeled(git_log, &args.exclude);

    let mut release = ReleaseEmail::new(ReleaseInfo::new(&args.project_url));
    release.contributors = contributors(&git_log);
    release.tasks = get_tasks(args, &git_log)?;
    release.issues = get_issues(args, &git_log)?;
    release.remote_url = args.remote_url.to_owned();
    release.git_log = git_log;

    let output = if args.json {
        serde_json::to_string_pretty(&release)?
    } else {
        release.render()
    };

    match &args.outfile {
        Some(path) => fs::write(path, output)
            .with_context(|| format!("Couldn't write to '{path}'"))?,
        None => println!("{output}"),
    }
    return Ok(());
}

fn get_tasks(args: &Args, git_log: &[ChangelogEntry]) -> Result<Vec<Task>> {
    let ids = task_ids(git_log, &args.task_label)
        .into_iter()
        .collect::<Vec<String>>();
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let (user, password) = match (&args.manoderecha_user, &args.manoderecha_password) {
        (Some(user), Some(password)) => (user, password),
        _ => {
            warn!("MANODERECHA_USER or MANODERECHA_PASSWORD not set, skipping {} tasks", ids.len());
            return Ok(Vec::new());
        },
    };

    let md = Manoderecha::with_base(&release_email::api::base_url(&args.manoderecha_url), user, password);
    return Ok(md.get_tasks(&ids).context("Couldn't get tasks from manoderecha")?);
}

fn get_issues(args: &Args, git_log: &[ChangelogEntry]) -> Result<Vec<Issue>> {
    let ids = task_ids(git_log, &args.issue_label)
        .into_iter()
        .collect::<Vec<String>>();
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let (url, user, password) = match (&args.jira_url, &args.jira_user, &args.jira_password) {
        (Some(url), Some(user), Some(password)) => (url, user, password),
        _ => {
            warn!("JIRA_URL, JIRA_USER or JIRA_PASSWORD not set, skipping {} issues", ids.len());
            return Ok(Vec::new());
        },
    };

    let jira = Jira::new(user, password, &release_email::api::base_url(url));
    return Ok(jira.get_issues(&ids).context("Couldn't get issues from JIRA")?);
}
