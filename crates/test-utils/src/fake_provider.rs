use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use fieldsched::errors::FieldschedError;
use fieldsched::route::provider::ProviderFuture;
use fieldsched::route::{ProviderResponse, RouteRequest, RoutingProvider};

/// What the fake answers to the next request.
#[derive(Debug, Clone)]
pub enum Scripted {
    Respond(ProviderResponse),
    Fail(String),
}

/// A routing provider that replays scripted answers in order and records
/// every request it receives. Once the script runs out it fails.
#[derive(Debug, Clone, Default)]
pub struct FakeRoutingProvider {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<RouteRequest>>>,
}

impl FakeRoutingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, response: ProviderResponse) -> Self {
        self.push(Scripted::Respond(response));
        self
    }

    pub fn fail(self, reason: &str) -> Self {
        self.push(Scripted::Fail(reason.to_string()));
        self
    }

    pub fn push(&self, next: Scripted) {
        self.script.lock().unwrap().push_back(next);
    }

    pub fn requests(&self) -> Vec<RouteRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl RoutingProvider for FakeRoutingProvider {
    fn fetch<'a>(&'a self, request: &'a RouteRequest) -> ProviderFuture<'a, ProviderResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.script.lock().unwrap().pop_front();
        Box::pin(async move {
            match next {
                Some(Scripted::Respond(response)) => Ok(response),
                Some(Scripted::Fail(reason)) => Err(FieldschedError::Provider(reason)),
                None => Err(FieldschedError::Provider("no scripted answer".to_string())),
            }
        })
    }
}
