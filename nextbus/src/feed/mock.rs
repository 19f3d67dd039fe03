//! Mock transport for testing without network access.
//!
//! Serves canned XML bodies keyed by command name, loaded from memory or
//! from a directory of `{command}.xml` files, and records every request.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use super::client::Transport;
use super::error::FeedError;

/// Recorded query parameters of one request.
pub type Request = Vec<(String, String)>;

/// Transport that answers from canned responses.
#[derive(Debug, Default)]
pub struct MockTransport {
    /// Response bodies, keyed by command name.
    responses: HashMap<String, String>,
    /// Every request received, in order.
    requests: Mutex<Vec<Request>>,
}

impl MockTransport {
    /// Create a mock with no responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load responses from a directory.
    ///
    /// Expects files named `{command}.xml` (e.g., `agencyList.xml`,
    /// `routeConfig.xml`).
    pub fn from_dir(data_dir: impl AsRef<Path>) -> Result<Self, FeedError> {
        let data_dir = data_dir.as_ref();
        let mut responses = HashMap::new();

        let entries = std::fs::read_dir(data_dir).map_err(|e| {
            FeedError::NotConfigured(format!(
                "failed to read mock data directory {data_dir:?}: {e}"
            ))
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| {
                FeedError::NotConfigured(format!("failed to read directory entry: {e}"))
            })?;

            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("xml") {
                continue;
            }

            // "routeConfig.xml" -> "routeConfig"
            let command = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| FeedError::NotConfigured(format!("invalid filename: {path:?}")))?
                .to_string();

            let body = std::fs::read_to_string(&path).map_err(|e| {
                FeedError::NotConfigured(format!("failed to read {path:?}: {e}"))
            })?;

            responses.insert(command, body);
        }

        if responses.is_empty() {
            return Err(FeedError::NotConfigured(format!(
                "no mock response files found in {data_dir:?}"
            )));
        }

        Ok(Self {
            responses,
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Add or replace the response for a command.
    pub fn with_response(mut self, command: impl Into<String>, body: impl Into<String>) -> Self {
        self.responses.insert(command.into(), body.into());
        self
    }

    /// Commands this mock can answer, sorted.
    pub fn available_commands(&self) -> Vec<&str> {
        let mut commands: Vec<_> = self.responses.keys().map(String::as_str).collect();
        commands.sort_unstable();
        commands
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<Request> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl Transport for MockTransport {
    fn get(&self, params: &[(&str, String)]) -> Result<String, FeedError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(
                params
                    .iter()
                    .map(|(key, value)| (key.to_string(), value.clone()))
                    .collect(),
            );
        }

        let command = params
            .iter()
            .find(|(key, _)| *key == "command")
            .map(|(_, value)| value.as_str())
            .ok_or_else(|| FeedError::NotConfigured("request has no command".to_string()))?;

        self.responses.get(command).cloned().ok_or_else(|| {
            FeedError::NotConfigured(format!(
                "no mock response for command {command}. Available: {:?}",
                self.available_commands()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn load_mock_dir() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("agencyList.xml"), "<body/>").unwrap();
        std::fs::write(dir.path().join("routeList.xml"), "<body/>").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mock = MockTransport::from_dir(dir.path()).unwrap();
        assert_eq!(mock.available_commands(), ["agencyList", "routeList"]);
    }

    #[test]
    fn empty_dir_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            MockTransport::from_dir(dir.path()),
            Err(FeedError::NotConfigured(_))
        ));
    }

    #[test]
    fn missing_dir_is_an_error() {
        assert!(MockTransport::from_dir("/nonexistent/mock/feed").is_err());
    }

    #[test]
    fn answers_by_command_and_records_requests() {
        let mock = MockTransport::new().with_response("agencyList", "<body/>");

        let body = mock
            .get(&[("command", "agencyList".to_string())])
            .unwrap();
        assert_eq!(body, "<body/>");

        let err = mock
            .get(&[("command", "schedule".to_string()), ("a", "x".to_string())])
            .unwrap_err();
        assert!(err.to_string().contains("no mock response for command schedule"));

        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1][1], ("a".to_string(), "x".to_string()));
    }
}
