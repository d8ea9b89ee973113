use crate::utils::error::{ErrorSeverity, Result};
use std::future::Future;

/// The `{data, loading, error}` view of one remote fetch.
///
/// A failed reload keeps the previous data so a list does not blank out on a
/// transient error.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource<T> {
    data: Option<T>,
    loading: bool,
    error: Option<String>,
    severity: Option<ErrorSeverity>,
}

impl<T> Default for Resource<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
            severity: None,
        }
    }
}

/// Clears the loading flag when the fetch completes or is dropped mid-flight.
struct LoadingGuard<'a>(&'a mut bool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

impl<T> Resource<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Severity of the last failure, cleared by the next successful load.
    pub fn error_severity(&self) -> Option<ErrorSeverity> {
        self.severity
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    pub async fn load<F>(&mut self, fetch: F) -> &Self
    where
        F: Future<Output = Result<T>>,
    {
        self.loading = true;
        let outcome = {
            let _guard = LoadingGuard(&mut self.loading);
            fetch.await
        };
        match outcome {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
                self.severity = None;
            }
            Err(e) => {
                tracing::warn!(
                    "Fetch failed: {} (severity: {:?}, retryable: {})",
                    e,
                    e.severity(),
                    e.is_retryable()
                );
                self.error = Some(e.user_friendly_message());
                self.severity = Some(e.severity());
            }
        }
        self
    }
}
