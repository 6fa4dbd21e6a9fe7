//! Octocrab client wrapper scoped to a specific repository.

use octocrab::Octocrab;

use crate::types::RepoId;

/// A GitHub API client scoped to a specific repository.
///
/// All effects interpreted through this client target the same repository,
/// which is why `GitHubEffect` variants carry no repository.
#[derive(Clone)]
pub struct OctocrabClient {
    client: Octocrab,
    repo: RepoId,
}

impl OctocrabClient {
    pub fn new(client: Octocrab, repo: RepoId) -> Self {
        Self { client, repo }
    }

    /// Builds an authenticated octocrab instance, optionally against a
    /// non-default API root (GitHub Enterprise Server).
    pub fn build_octocrab(
        token: impl Into<String>,
        api_url: Option<&str>,
    ) -> Result<Octocrab, octocrab::Error> {
        let mut builder = Octocrab::builder().personal_token(token.into());
        if let Some(url) = api_url {
            builder = builder.base_uri(url)?;
        }
        builder.build()
    }

    /// Creates a client from a GitHub token.
    pub fn from_token(
        token: impl Into<String>,
        api_url: Option<&str>,
        repo: RepoId,
    ) -> Result<Self, octocrab::Error> {
        Ok(Self::new(Self::build_octocrab(token, api_url)?, repo))
    }

    /// Returns a reference to the underlying octocrab client.
    pub fn inner(&self) -> &Octocrab {
        &self.client
    }

    pub fn repo(&self) -> &RepoId {
        &self.repo
    }

    pub fn owner(&self) -> &str {
        &self.repo.owner
    }

    pub fn repo_name(&self) -> &str {
        &self.repo.repo
    }

    /// Builds a `/repos/{owner}/{repo}/...` route.
    pub(crate) fn route(&self, suffix: &str) -> String {
        format!("/repos/{}/{}/{}", self.owner(), self.repo_name(), suffix)
    }
}

impl std::fmt::Debug for OctocrabClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OctocrabClient")
            .field("repo", &self.repo)
            .finish_non_exhaustive()
    }
}
