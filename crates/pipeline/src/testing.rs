//! Scripted oracle for tests.
//!
//! Used by this crate's tests and by downstream crates (gateway, cli) for
//! end-to-end scenarios without a hosted API.

use std::collections::VecDeque;
use std::sync::Mutex;

use skillbot_core::error::OracleError;
use skillbot_core::oracle::{CompletionRequest, Oracle};

/// An oracle that returns a fixed sequence of scripted replies.
///
/// Each call to `complete` returns the next reply in the queue and records
/// the request for later assertions. Panics if more calls are made than
/// replies provided.
pub struct ScriptedOracle {
    replies: Mutex<VecDeque<String>>,
    failure: Option<OracleError>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedOracle {
    pub fn new(replies: Vec<String>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            failure: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// An oracle that fails every call with a clone of the given error.
    pub fn failing(error: OracleError) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            failure: Some(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Number of completed calls so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// The requests received so far, in order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Oracle for ScriptedOracle {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, OracleError> {
        self.requests.lock().unwrap().push(request);

        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(text) => Ok(text),
            None => panic!(
                "ScriptedOracle: no more replies (call #{})",
                self.requests.lock().unwrap().len()
            ),
        }
    }
}
