// src/backend/http.rs

//! `JobBackend` over the operations record API.

use reqwest::{Client, Response, Url};
use tracing::debug;

use crate::backend::{BackendFuture, JobBackend, JobQuery};
use crate::config::BackendConfig;
use crate::errors::{FieldschedError, Result};
use crate::model::{Crew, Job, JobId, SchedulePatch};

const SERVICE: &str = "backend";

#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: Url,
    client: Client,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            base_url: config.base_url.clone(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| FieldschedError::ConfigError(format!("bad backend path {path:?}: {e}")))
    }
}

/// Turn a non-success response into a structured error, keeping the body for
/// the log line.
pub(crate) async fn ensure_success(service: &'static str, res: Response) -> Result<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    Err(FieldschedError::Status {
        service,
        status: status.as_u16(),
        body,
    })
}

impl JobBackend for HttpBackend {
    fn list_jobs<'a>(&'a self, query: &'a JobQuery) -> BackendFuture<'a, Vec<Job>> {
        Box::pin(async move {
            let url = self.endpoint("jobs")?;
            let params = query.to_params();
            debug!(%url, ?params, "listing jobs");

            let res = self.client.get(url).query(&params).send().await?;
            let res = ensure_success(SERVICE, res).await?;
            Ok(res.json::<Vec<Job>>().await?)
        })
    }

    fn update_schedule<'a>(&'a self, id: JobId, patch: SchedulePatch) -> BackendFuture<'a, Job> {
        Box::pin(async move {
            let url = self.endpoint(&format!("jobs/{id}"))?;
            let body = patch.to_body();
            debug!(%url, %body, "updating job schedule");

            let res = self.client.put(url).json(&body).send().await?;
            let res = ensure_success(SERVICE, res).await?;
            Ok(res.json::<Job>().await?)
        })
    }

    fn list_crews(&self) -> BackendFuture<'_, Vec<Crew>> {
        Box::pin(async move {
            let url = self.endpoint("crews")?;
            debug!(%url, "listing crews");

            let res = self.client.get(url).send().await?;
            let res = ensure_success(SERVICE, res).await?;
            Ok(res.json::<Vec<Crew>>().await?)
        })
    }
}
