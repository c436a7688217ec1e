use std::sync::{Arc, Mutex, MutexGuard};

use fieldsched::backend::{BackendFuture, JobBackend, JobQuery};
use fieldsched::errors::FieldschedError;
use fieldsched::model::{Crew, Job, JobId, SchedulePatch};

/// One call as seen by the fake backend, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    ListJobs(JobQuery),
    UpdateSchedule(JobId, SchedulePatch),
    ListCrews,
}

impl BackendCall {
    pub fn is_update(&self) -> bool {
        matches!(self, BackendCall::UpdateSchedule(..))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, BackendCall::ListJobs(_))
    }
}

#[derive(Debug, Default)]
struct State {
    jobs: Vec<Job>,
    crews: Vec<Crew>,
    calls: Vec<BackendCall>,
    fail_lists: bool,
    fail_updates: bool,
    fail_crews: bool,
}

/// In-memory record API.
///
/// - filters listings with `JobQuery::matches`
/// - applies updates with `SchedulePatch::apply_to`
/// - records every call
/// - can be told to fail each kind of call
///
/// Clones share state, so several views can be pointed at the same records.
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<State>>,
}

impl FakeBackend {
    pub fn new(jobs: Vec<Job>) -> Self {
        let backend = Self::default();
        backend.state().jobs = jobs;
        backend
    }

    pub fn with_crews(self, crews: Vec<Crew>) -> Self {
        self.state().crews = crews;
        self
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn job(&self, id: JobId) -> Option<Job> {
        self.state().jobs.iter().find(|j| j.id == id).cloned()
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    pub fn fail_lists(&self, fail: bool) {
        self.state().fail_lists = fail;
    }

    pub fn fail_updates(&self, fail: bool) {
        self.state().fail_updates = fail;
    }

    pub fn fail_crews(&self, fail: bool) {
        self.state().fail_crews = fail;
    }
}

fn unavailable(what: &str) -> FieldschedError {
    FieldschedError::Status {
        service: "fake backend",
        status: 503,
        body: format!("{what} unavailable"),
    }
}

impl JobBackend for FakeBackend {
    fn list_jobs<'a>(&'a self, query: &'a JobQuery) -> BackendFuture<'a, Vec<Job>> {
        let result = {
            let mut state = self.state();
            state.calls.push(BackendCall::ListJobs(query.clone()));
            if state.fail_lists {
                Err(unavailable("jobs"))
            } else {
                Ok(state
                    .jobs
                    .iter()
                    .filter(|j| query.matches(j))
                    .cloned()
                    .collect())
            }
        };
        Box::pin(async move { result })
    }

    fn update_schedule<'a>(&'a self, id: JobId, patch: SchedulePatch) -> BackendFuture<'a, Job> {
        let result = {
            let mut state = self.state();
            state.calls.push(BackendCall::UpdateSchedule(id, patch));
            if state.fail_updates {
                Err(unavailable("updates"))
            } else {
                match state.jobs.iter_mut().find(|j| j.id == id) {
                    Some(job) => {
                        patch.apply_to(job);
                        Ok(job.clone())
                    }
                    None => Err(FieldschedError::Status {
                        service: "fake backend",
                        status: 404,
                        body: "Job not found".to_string(),
                    }),
                }
            }
        };
        Box::pin(async move { result })
    }

    fn list_crews(&self) -> BackendFuture<'_, Vec<Crew>> {
        let result = {
            let mut state = self.state();
            state.calls.push(BackendCall::ListCrews);
            if state.fail_crews {
                Err(unavailable("crews"))
            } else {
                Ok(state.crews.clone())
            }
        };
        Box::pin(async move { result })
    }
}
