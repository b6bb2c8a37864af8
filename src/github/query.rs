use crate::error::{ContribError, Result};
use crate::model::{RawActivityRecord, RawEvent, RestrictedPeriod, Window};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Longest span covered by one aliased collection. A repository has at most
/// one commit node per day, so a slice never fills a 100-node page with them.
pub const SLICE_DAYS: u32 = 92;

/// Public events and the restricted aggregate come from separate
/// sub-queries of the same contributions collection. The totals and
/// `totalCount`s are only read to detect truncated connections.
const ACTIVITY_FRAGMENT: &str = r#"
fragment Activity on ContributionsCollection {
  restrictedContributionsCount
  earliestRestrictedContributionDate
  contributionCalendar { totalContributions }
  totalCommitContributions
  totalIssueContributions
  totalPullRequestContributions
  totalPullRequestReviewContributions
  totalRepositoryContributions
  commitContributionsByRepository(maxRepositories: 100) {
    repository { nameWithOwner isPrivate }
    contributions(first: 100) {
      totalCount
      pageInfo { hasNextPage }
      nodes { occurredAt commitCount }
    }
  }
  issueContributions(first: 100) {
    totalCount
    pageInfo { hasNextPage }
    nodes { occurredAt issue { repository { nameWithOwner isPrivate } } }
  }
  pullRequestContributions(first: 100) {
    totalCount
    pageInfo { hasNextPage }
    nodes { occurredAt pullRequest { repository { nameWithOwner isPrivate } } }
  }
  pullRequestReviewContributions(first: 100) {
    totalCount
    pageInfo { hasNextPage }
    nodes { occurredAt repository { nameWithOwner isPrivate } }
  }
  repositoryContributions(first: 100) {
    totalCount
    pageInfo { hasNextPage }
    nodes { occurredAt repository { nameWithOwner isPrivate } }
  }
}
"#;

/// Response key of the `index`-th slice.
pub fn slice_alias(index: usize) -> String {
    format!("slice{index}")
}

/// One query with an aliased `contributionsCollection` per slice, taking
/// `$from{i}`/`$to{i}` variables.
pub fn contributions_query(slices: usize) -> String {
    let mut params = Vec::with_capacity(slices);
    let mut collections = String::new();
    for i in 0..slices {
        params.push(format!("$from{i}: DateTime!, $to{i}: DateTime!"));
        collections.push_str(&format!(
            "    {}: contributionsCollection(from: $from{i}, to: $to{i}) {{ ...Activity }}\n",
            slice_alias(i)
        ));
    }
    format!(
        "query({}) {{\n  viewer {{\n    login\n    name\n{collections}  }}\n}}\n{ACTIVITY_FRAGMENT}",
        params.join(", ")
    )
}

#[derive(Debug, Deserialize)]
pub struct GraphqlResponse {
    pub data: Option<ResponseData>,
    pub errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlError {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseData {
    pub viewer: Option<Viewer>,
}

#[derive(Debug, Deserialize)]
pub struct Viewer {
    pub login: String,
    pub name: Option<String>,
    /// Aliased collections keyed by [`slice_alias`].
    #[serde(flatten)]
    pub slices: BTreeMap<String, ContributionsCollection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionsCollection {
    pub restricted_contributions_count: i64,
    pub earliest_restricted_contribution_date: Option<NaiveDate>,
    pub contribution_calendar: ContributionCalendar,
    pub total_commit_contributions: i64,
    pub total_issue_contributions: i64,
    pub total_pull_request_contributions: i64,
    pub total_pull_request_review_contributions: i64,
    pub total_repository_contributions: i64,
    pub commit_contributions_by_repository: Vec<CommitsByRepository>,
    pub issue_contributions: Connection<IssueNode>,
    pub pull_request_contributions: Connection<PullRequestNode>,
    pub pull_request_review_contributions: Connection<RepositoryNode>,
    pub repository_contributions: Connection<RepositoryNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionCalendar {
    pub total_contributions: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    pub total_count: usize,
    #[serde(default)]
    pub page_info: PageInfo,
    pub nodes: Vec<T>,
}

impl<T> Connection<T> {
    pub fn is_complete(&self) -> bool {
        !self.page_info.has_next_page && self.nodes.len() >= self.total_count
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub has_next_page: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryRef {
    pub name_with_owner: Option<String>,
    #[serde(default)]
    pub is_private: bool,
}

#[derive(Debug, Deserialize)]
pub struct CommitsByRepository {
    pub repository: Option<RepositoryRef>,
    pub contributions: Connection<CommitNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitNode {
    pub occurred_at: Option<DateTime<Utc>>,
    pub commit_count: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct HasRepository {
    pub repository: Option<RepositoryRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueNode {
    pub occurred_at: Option<DateTime<Utc>>,
    pub issue: Option<HasRepository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestNode {
    pub occurred_at: Option<DateTime<Utc>>,
    pub pull_request: Option<HasRepository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryNode {
    pub occurred_at: Option<DateTime<Utc>>,
    pub repository: Option<RepositoryRef>,
}

impl ContributionsCollection {
    /// Fail when any connection returned fewer items than the collection reports.
    pub fn check_complete(&self, alias: &str) -> Result<()> {
        let partial = |what: &str, returned: i64, reported: i64| -> Result<()> {
            Err(ContribError::transport(format!(
                "Partial response: `{alias}.{what}` returned {returned} of {reported}"
            )))
        };

        for by_repo in &self.commit_contributions_by_repository {
            let contributions = &by_repo.contributions;
            if !contributions.is_complete() {
                return partial(
                    "commitContributionsByRepository.contributions",
                    contributions.nodes.len() as i64,
                    contributions.total_count as i64,
                );
            }
        }

        let commits: i64 = self
            .commit_contributions_by_repository
            .iter()
            .flat_map(|by_repo| &by_repo.contributions.nodes)
            .map(|node| node.commit_count.unwrap_or(1))
            .fold(0i64, i64::saturating_add);
        if commits < self.total_commit_contributions {
            return partial(
                "commitContributionsByRepository",
                commits,
                self.total_commit_contributions,
            );
        }

        let connections = [
            (
                "issueContributions",
                self.issue_contributions.is_complete(),
                self.issue_contributions.nodes.len() as i64,
                self.total_issue_contributions,
            ),
            (
                "pullRequestContributions",
                self.pull_request_contributions.is_complete(),
                self.pull_request_contributions.nodes.len() as i64,
                self.total_pull_request_contributions,
            ),
            (
                "pullRequestReviewContributions",
                self.pull_request_review_contributions.is_complete(),
                self.pull_request_review_contributions.nodes.len() as i64,
                self.total_pull_request_review_contributions,
            ),
            (
                "repositoryContributions",
                self.repository_contributions.is_complete(),
                self.repository_contributions.nodes.len() as i64,
                self.total_repository_contributions,
            ),
        ];
        let mut itemized = commits;
        for (what, complete, returned, reported) in connections {
            if !complete || returned < reported {
                return partial(what, returned, reported);
            }
            itemized = itemized.saturating_add(returned);
        }

        // The calendar may or may not include restricted activity, so it is
        // only an upper bound check.
        let calendar = self.contribution_calendar.total_contributions;
        let accounted = itemized.saturating_add(self.restricted_contributions_count);
        if calendar > accounted {
            return partial("contributionCalendar", accounted, calendar);
        }
        Ok(())
    }

    /// Flatten this slice into events and at most one restricted period.
    /// Events from private repositories are marked restricted and lose their
    /// repository name here.
    fn collect_into(
        self,
        slice: Window,
        events: &mut Vec<RawEvent>,
        restricted_periods: &mut Vec<RestrictedPeriod>,
    ) {
        for by_repo in self.commit_contributions_by_repository {
            let repository = by_repo.repository.unwrap_or_default();
            for node in by_repo.contributions.nodes {
                events.push(event(node.occurred_at, "commit", node.commit_count, &repository));
            }
        }
        for node in self.issue_contributions.nodes {
            let repository = node.issue.and_then(|i| i.repository).unwrap_or_default();
            events.push(event(node.occurred_at, "issue", Some(1), &repository));
        }
        for node in self.pull_request_contributions.nodes {
            let repository = node.pull_request.and_then(|p| p.repository).unwrap_or_default();
            events.push(event(node.occurred_at, "pull-request", Some(1), &repository));
        }
        for node in self.pull_request_review_contributions.nodes {
            let repository = node.repository.unwrap_or_default();
            events.push(event(node.occurred_at, "review", Some(1), &repository));
        }
        for node in self.repository_contributions.nodes {
            let repository = node.repository.unwrap_or_default();
            events.push(event(node.occurred_at, "other", Some(1), &repository));
        }

        if self.restricted_contributions_count != 0 {
            let start = self
                .earliest_restricted_contribution_date
                .map_or(slice.start, |d| d.clamp(slice.start, slice.end));
            restricted_periods.push(RestrictedPeriod {
                start,
                end: slice.end,
                count: self.restricted_contributions_count,
            });
        }
    }
}

impl Viewer {
    /// Check and flatten every slice, in window order, into one raw record.
    pub fn into_record(mut self, slices: &[Window]) -> Result<RawActivityRecord> {
        let mut events = Vec::new();
        let mut restricted_periods = Vec::new();

        for (i, slice) in slices.iter().enumerate() {
            let alias = slice_alias(i);
            let collection = self
                .slices
                .remove(&alias)
                .ok_or_else(|| ContribError::transport(format!("Response is missing `viewer.{alias}`")))?;
            collection.check_complete(&alias)?;
            collection.collect_into(*slice, &mut events, &mut restricted_periods);
        }

        Ok(RawActivityRecord {
            login: self.login,
            name: self.name,
            events,
            restricted_periods,
        })
    }
}

fn event(
    occurred_at: Option<DateTime<Utc>>,
    category: &str,
    count: Option<i64>,
    repository: &RepositoryRef,
) -> RawEvent {
    RawEvent {
        date: occurred_at.map(|ts| ts.date_naive()),
        category: Some(category.to_string()),
        count,
        restricted: repository.is_private,
        repository: if repository.is_private {
            None
        } else {
            repository.name_with_owner.clone()
        },
    }
}
