use log::{info, warn};
use serde::Deserialize;

use super::{base_url, ApiClient, ApiError};

#[derive(Debug, Deserialize)]
struct Build {
    #[serde(default)]
    actions: Vec<Option<Action>>,
}

#[derive(Debug, Deserialize)]
struct Action {
    #[serde(rename = "lastBuiltRevision")]
    last_built_revision: Option<Revision>,
}

#[derive(Debug, Deserialize)]
struct Revision {
    #[serde(rename = "SHA1")]
    sha1: String,
}

/// Client for a Jenkins server.
#[derive(Debug, Clone)]
pub struct Jenkins {
    client: ApiClient,
}

impl Jenkins {
    /// Creates a client for the server at `url`.
    pub fn new(url: &str) -> Self {
        return Self {
            client: ApiClient::new(&base_url(url)),
        };
    }

    /// Gets the revision built by the last successful build of a job.
    /// `Ok(None)` if the job never succeeded or didn't record a revision.
    pub fn last_good_revision(&self, job_name: &str) -> Result<Option<String>, ApiError> {
        let path = format!("job/{job_name}/lastSuccessfulBuild/api/json");
        let build: Build = match self.client.call(&path)? {
            Some(v) => serde_json::from_value(v)?,
            None => {
                warn!("Job '{job_name}' has no successful builds");
                return Ok(None);
            },
        };

        let revision = build.actions
            .into_iter()
            .flatten()
            .find_map(|action| action.last_built_revision)
            .map(|revision| revision.sha1);

        match &revision {
            Some(sha1) => info!("Last good revision of '{job_name}' is {sha1}"),
            None => warn!("Last good build of '{job_name}' has no revision"),
        }
        return Ok(revision);
    }
}

/// Gets the last good revision of a job on a Jenkins server.
pub fn last_good_revision(jenkins_url: &str, job_name: &str) -> Result<Option<String>, ApiError> {
    return Jenkins::new(jenkins_url).last_good_revision(job_name);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_revision_among_actions() {
        let build: Build = serde_json::from_str(r#"{
            "actions": [
                {"_class": "hudson.model.CauseAction", "causes": []},
                null,
                {},
                {"lastBuiltRevision": {"SHA1": "abcde", "branch": []}}
            ]
        }"#).unwrap();
        let revision = build.actions
            .into_iter()
            .flatten()
            .find_map(|action| action.last_built_revision);
        assert_eq!(revision.unwrap().sha1, "abcde");
    }
}
