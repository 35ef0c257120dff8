use std::fmt;

pub const API_BASE: &str = "https://api.github.com/repos";
pub const DEFAULT_OWNER: &str = "PsychedelicShayna";
pub const DEFAULT_NAME: &str = "github-chronicler";

/// The traffic sub-resources the tool knows how to query, in menu order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    ViewsWeekly,
    ViewsDaily,
    ClonesWeekly,
    ClonesDaily,
    PopularPaths,
    PopularReferrers,
}

impl Endpoint {
    pub const ALL: [Endpoint; 6] = [
        Endpoint::ViewsWeekly,
        Endpoint::ViewsDaily,
        Endpoint::ClonesWeekly,
        Endpoint::ClonesDaily,
        Endpoint::PopularPaths,
        Endpoint::PopularReferrers,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Endpoint::ViewsWeekly => "traffic/views?per=week",
            Endpoint::ViewsDaily => "traffic/views?per=day",
            Endpoint::ClonesWeekly => "traffic/clones?per=week",
            Endpoint::ClonesDaily => "traffic/clones?per=day",
            Endpoint::PopularPaths => "traffic/popular/paths",
            Endpoint::PopularReferrers => "traffic/popular/referrers",
        }
    }

    /// Recognises a request URL by its endpoint suffix.
    pub fn from_url(url: &str) -> Option<Endpoint> {
        Self::ALL
            .iter()
            .copied()
            .find(|endpoint| url.ends_with(&format!("/{}", endpoint.path())))
    }

    pub fn from_index(index: i64) -> Option<Endpoint> {
        usize::try_from(index)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    /// Blank input picks the defaults.
    pub fn from_input(owner: &str, name: &str) -> Self {
        let owner = owner.trim();
        let name = name.trim();
        Self {
            owner: if owner.is_empty() { DEFAULT_OWNER } else { owner }.to_string(),
            name: if name.is_empty() { DEFAULT_NAME } else { name }.to_string(),
        }
    }
}

impl Default for RepoRef {
    fn default() -> Self {
        Self::from_input("", "")
    }
}

pub fn build_url(base: &str, repo: &RepoRef, endpoint: Endpoint) -> String {
    format!(
        "{}/{}/{}/{}",
        base.trim_end_matches('/'),
        repo.owner,
        repo.name,
        endpoint.path()
    )
}
