//! Promotional tasks.
//!
//! Tasks are owned by the service; the client lists them, starts them and
//! claims their reward. The task list schema changes often, so anything that
//! is not recognized is logged and skipped instead of failing the session.

use log::{debug, error, warn};
use serde_json::Value;

use crate::blum::{
    ApiError,
    requester::{BlumRequester, Host},
    response_structs::{TaskClaimResponse, TaskResponse},
    structs::{Task, TaskStatus},
};

/// Status reported by a successful claim.
const CLAIMED_STATUS: &str = "CLAIMED";

/// Lists, starts and claims tasks. Single calls, no retry.
pub struct TaskClient {
    account: String,
    requester: BlumRequester,
}

impl TaskClient {
    pub fn new(account: &str, requester: BlumRequester) -> Self {
        TaskClient {
            account: account.to_owned(),
            requester,
        }
    }

    /// Request `/tasks`.
    ///
    /// The service returns a json array. Entries may be task groups holding
    /// their own `tasks` or `subTasks` arrays; those are flattened.
    ///
    /// # Returns
    ///
    /// The tasks, or an empty list (logged) when the body is not an array,
    /// whatever the HTTP status. Only transport failures are errors.
    pub async fn get_tasks(&self) -> Result<Vec<Task>, ApiError> {
        let response = self.requester.get(Host::Game, "/tasks").await?;
        if !response.is_success() {
            warn!("{} | get_tasks answered {}", self.account, response.status);
        }

        let value: Value = match response.json() {
            Ok(value) => value,
            Err(e) => {
                error!("{} | unexpected response format in get_tasks: {}", self.account, e);
                return Ok(vec![]);
            }
        };

        let Value::Array(entries) = value else {
            error!(
                "{} | unexpected response format in get_tasks: {}",
                self.account, response.body
            );
            return Ok(vec![]);
        };

        let mut tasks = vec![];
        self.collect_tasks(entries, &mut tasks);
        debug!("{} | {} tasks", self.account, tasks.len());

        Ok(tasks)
    }

    fn collect_tasks(&self, entries: Vec<Value>, tasks: &mut Vec<Task>) {
        for mut entry in entries {
            let nested = ["tasks", "subTasks", "subSections"]
                .iter()
                .filter_map(|key| entry.get_mut(*key).map(Value::take))
                .filter_map(|value| match value {
                    Value::Array(children) => Some(children),
                    _ => None,
                })
                .collect::<Vec<_>>();

            // Groups carry no id of their own
            if entry.get("id").is_some() {
                match serde_json::from_value::<TaskResponse>(entry) {
                    Ok(task) => tasks.push(Task {
                        status: task
                            .status
                            .as_deref()
                            .map(TaskStatus::from)
                            .unwrap_or(TaskStatus::Unclaimed),
                        title: task.title.unwrap_or_default(),
                        reward: task.reward.map(|a| a.0),
                        id: task.id,
                    }),
                    Err(e) => warn!("{} | skipping malformed task: {}", self.account, e),
                }
            }

            for children in nested {
                self.collect_tasks(children, tasks);
            }
        }
    }

    /// Request `/tasks/{id}/start`.
    pub async fn start_task(&self, task: &Task) -> Result<(), ApiError> {
        let response = self
            .requester
            .post(Host::Game, &format!("/tasks/{}/start", task.id))
            .await?;

        debug!(
            "{} | start task {} -> {} {}",
            self.account, task.id, response.status, response.body
        );
        Ok(())
    }

    /// Request `/tasks/{id}/claim`.
    ///
    /// # Returns
    ///
    /// `true` only when the response `status` is exactly `CLAIMED`, whatever
    /// the HTTP status.
    pub async fn claim_task(&self, task: &Task) -> Result<bool, ApiError> {
        let response = self
            .requester
            .post(Host::Game, &format!("/tasks/{}/claim", task.id))
            .await?;

        debug!(
            "{} | claim task {} -> {} {}",
            self.account, task.id, response.status, response.body
        );

        let claimed = response
            .json::<TaskClaimResponse>()
            .ok()
            .and_then(|claim| claim.status)
            .is_some_and(|status| status == CLAIMED_STATUS);

        Ok(claimed)
    }
}
