use serde::Deserialize;

use crate::error::Error;
use crate::http;

/// Open merge request as returned by the group merge-requests endpoint.
/// Unknown fields are ignored; only what the pipeline reads is modeled.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct MergeRequest {
    pub project_id: u64,
    pub iid: u64,
    pub title: String,
}

/// The pair of ids needed to address a merge request's approvals endpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeRequestRef {
    pub project_id: u64,
    pub iid: u64,
}

impl From<&MergeRequest> for MergeRequestRef {
    fn from(mr: &MergeRequest) -> Self {
        MergeRequestRef {
            project_id: mr.project_id,
            iid: mr.iid,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct ApprovalResponse {
    pub approved_by: Vec<Approval>,
}

#[derive(Deserialize, Debug)]
pub struct Approval {
    pub user: User,
}

#[derive(Deserialize, Debug)]
pub struct User {
    pub id: u64,
}

pub fn open_merge_requests_url(base_url: &str, group_id: u64) -> String {
    format!(
        "{}/api/v4/groups/{}/merge_requests?state=opened",
        base_url, group_id
    )
}

pub fn approvals_url(base_url: &str, mr: &MergeRequestRef) -> String {
    format!(
        "{}/api/v4/projects/{}/merge_requests/{}/approvals",
        base_url, mr.project_id, mr.iid
    )
}

/// Web page listing the group's merge requests, for the browser side effect.
pub fn group_merge_requests_url(base_url: &str, group_name: &str) -> String {
    format!("{}/groups/{}/-/merge_requests", base_url, group_name)
}

/// The two GitLab reads the pipeline performs. `Api` backs it with real
/// HTTP; tests substitute canned responses.
pub trait MergeRequestSource {
    fn open_merge_requests(&self) -> Result<Vec<MergeRequest>, Error>;
    fn approvals(&self, mr: &MergeRequestRef) -> Result<ApprovalResponse, Error>;
}

pub struct Api<'a> {
    client: &'a http::Client,
    base_url: &'a str,
    group_id: u64,
}

impl<'a> Api<'a> {
    pub fn new(client: &'a http::Client, base_url: &'a str, group_id: u64) -> Api<'a> {
        Api {
            client,
            base_url,
            group_id,
        }
    }
}

impl MergeRequestSource for Api<'_> {
    fn open_merge_requests(&self) -> Result<Vec<MergeRequest>, Error> {
        let url = open_merge_requests_url(self.base_url, self.group_id);

        Ok(self.client.get(&url)?)
    }

    fn approvals(&self, mr: &MergeRequestRef) -> Result<ApprovalResponse, Error> {
        let url = approvals_url(self.base_url, mr);

        Ok(self.client.get(&url)?)
    }
}

/// Drop merge requests whose title starts with "wip" (case-insensitive).
/// Order is preserved.
pub fn without_wip(merge_requests: Vec<MergeRequest>) -> Vec<MergeRequest> {
    merge_requests
        .into_iter()
        .filter(|mr| !mr.title.to_lowercase().starts_with("wip"))
        .collect()
}

fn approved_by_user(approvals: &ApprovalResponse, user_id: u64) -> usize {
    approvals
        .approved_by
        .iter()
        .filter(|approval| approval.user.id == user_id)
        .count()
}

/// Total approvals by `user_id` across `merge_requests`, fetched one
/// approvals endpoint at a time. An empty list sums to 0 without a fetch.
pub fn approved_mr_count(
    source: &dyn MergeRequestSource,
    user_id: u64,
    merge_requests: &[MergeRequest],
) -> Result<usize, Error> {
    let mut total = 0;

    for mr in merge_requests {
        let approvals = source.approvals(&MergeRequestRef::from(mr))?;
        total += approved_by_user(&approvals, user_id);
    }

    Ok(total)
}
