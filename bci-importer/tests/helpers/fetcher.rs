//! Scripted network fetcher
//!
//! Answers from a fixed URL → response table and records every request.
//! Unknown URLs answer 404.

use async_trait::async_trait;
use bci_importer::store::{FetchResponse, NetworkFetcher, TransportError};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Scripted {
    Response(u16, Vec<u8>),
    Transport(String),
}

#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    responses: Mutex<HashMap<String, Scripted>>,
    calls: Mutex<Vec<(String, Duration)>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with 200 and `body`
    pub fn serve(self, url: &str, body: &[u8]) -> Self {
        self.respond(url, 200, body)
    }

    pub fn respond(self, url: &str, status: u16, body: &[u8]) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Scripted::Response(status, body.to_vec()));
        self
    }

    /// Fail `url` at the transport level
    pub fn fail(self, url: &str, message: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Scripted::Transport(message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_timeout(&self) -> Option<Duration> {
        self.calls.lock().unwrap().last().map(|(_, timeout)| *timeout)
    }
}

#[async_trait]
impl NetworkFetcher for ScriptedFetcher {
    async fn get(&self, url: &str, timeout: Duration) -> Result<FetchResponse, TransportError> {
        self.calls.lock().unwrap().push((url.to_string(), timeout));

        let scripted = self.responses.lock().unwrap().get(url).cloned();
        match scripted {
            Some(Scripted::Response(status, body)) => Ok(FetchResponse { status, body }),
            Some(Scripted::Transport(message)) => Err(TransportError(message)),
            None => Ok(FetchResponse {
                status: 404,
                body: b"not found".to_vec(),
            }),
        }
    }
}
