use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::search::backend::SearchBackend;
use crate::search::model::{QueryType, SearchRequest, SnippetResult};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

/// Sequence number of an issued search. Later requests compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// What happened to the state when a request settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// The response replaced the result set
    Applied { count: usize },
    /// A newer request had been issued; the response was dropped
    Stale,
}

/// Client-side search state: busy flag, current results, last failure
#[derive(Debug, Default)]
pub struct SearchState {
    loading: bool,
    results: Vec<SnippetResult>,
    last_error: Option<String>,
    last_query: Option<String>,
    issued: u64,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn results(&self) -> &[SnippetResult] {
        &self.results
    }

    /// Message of the most recent failed search, cleared by the next submit
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    /// The most recently issued request, if any
    pub fn latest(&self) -> Option<RequestId> {
        (self.issued > 0).then_some(RequestId(self.issued))
    }

    /// Mark a new request as in flight and supersede any older one
    pub fn begin(&mut self, query: &str) -> RequestId {
        self.issued += 1;
        self.loading = true;
        self.last_error = None;
        self.last_query = Some(query.to_string());
        RequestId(self.issued)
    }

    /// Apply the outcome of request `id`.
    ///
    /// Only the latest request may touch the state. On success the result set
    /// is replaced wholesale; on failure results are left as they were and the
    /// error is handed back to the caller. Either way the busy flag is cleared.
    pub fn settle(
        &mut self,
        id: RequestId,
        outcome: Result<Vec<SnippetResult>>,
    ) -> Result<Settlement> {
        if id.0 != self.issued {
            match &outcome {
                Ok(results) => debug!(
                    request = id.0,
                    latest = self.issued,
                    results = results.len(),
                    "discarding stale search response"
                ),
                Err(e) => debug!(
                    request = id.0,
                    latest = self.issued,
                    error = %e,
                    "discarding stale search failure"
                ),
            }
            return Ok(Settlement::Stale);
        }

        self.loading = false;
        match outcome {
            Ok(results) => {
                let count = results.len();
                self.results = results;
                info!(request = id.0, results = count, "search applied");
                Ok(Settlement::Applied { count })
            }
            Err(e) => {
                warn!(request = id.0, error = %e, "search failed");
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

/// Holds the busy flag for an awaited search.
/// Dropping it without settling (e.g. the future was cancelled) releases the
/// flag as an aborted request.
struct InFlight<'a> {
    state: &'a mut SearchState,
    id: RequestId,
    settled: bool,
}

impl<'a> InFlight<'a> {
    fn acquire(state: &'a mut SearchState, query: &str) -> Self {
        let id = state.begin(query);
        Self {
            state,
            id,
            settled: false,
        }
    }

    fn settle(mut self, outcome: Result<Vec<SnippetResult>>) -> Result<Settlement> {
        self.settled = true;
        self.state.settle(self.id, outcome)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            let _ = self.state.settle(self.id, Err(Error::Aborted));
        }
    }
}

/// Outcome of a dispatched request, delivered back to the owning orchestrator
#[derive(Debug)]
pub struct Completion {
    pub id: RequestId,
    pub outcome: Result<Vec<SnippetResult>>,
}

/// Owned by a spawned search task. Delivers exactly one completion when
/// dropped, whether the task finished, failed, panicked or was torn down.
struct Ticket {
    id: RequestId,
    outcome: Option<Result<Vec<SnippetResult>>>,
    completions: UnboundedSender<Completion>,
}

impl Ticket {
    fn complete(mut self, outcome: Result<Vec<SnippetResult>>) {
        self.outcome = Some(outcome);
    }
}

impl Drop for Ticket {
    fn drop(&mut self) {
        let outcome = self.outcome.take().unwrap_or(Err(Error::Aborted));
        // The receiver only goes away together with the orchestrator.
        let _ = self.completions.send(Completion {
            id: self.id,
            outcome,
        });
    }
}

/// Issues searches against one collection and keeps the resulting state
pub struct SearchOrchestrator<B: SearchBackend> {
    backend: Arc<B>,
    collection: String,
    query_type: QueryType,
    state: SearchState,
    completions_tx: UnboundedSender<Completion>,
    completions_rx: UnboundedReceiver<Completion>,
}

impl<B: SearchBackend> SearchOrchestrator<B> {
    pub fn new(config: &Config, backend: B) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            backend: Arc::new(backend),
            collection: config.collection_name.clone(),
            query_type: config.query_type,
            state: SearchState::new(),
            completions_tx,
            completions_rx,
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn results(&self) -> &[SnippetResult] {
        self.state.results()
    }

    fn request_for(&self, query: &str) -> Result<SearchRequest> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::EmptyQuery);
        }
        Ok(SearchRequest::new(query, self.query_type))
    }

    /// Run one search to completion on the current task
    pub async fn search(&mut self, query: &str) -> Result<Settlement> {
        let request = self.request_for(query)?;
        info!(collection = %self.collection, query = %request.query, "searching");

        let guard = InFlight::acquire(&mut self.state, &request.query);
        let outcome = self.backend.search(&self.collection, &request).await;
        guard.settle(outcome)
    }

    /// Start a search on `runtime` and return immediately.
    ///
    /// The state is updated once the completion is picked up by
    /// [`poll_completions`](Self::poll_completions) or
    /// [`next_completion`](Self::next_completion).
    pub fn dispatch(&mut self, query: &str, runtime: &Handle) -> Result<RequestId> {
        let request = self.request_for(query)?;
        let id = self.state.begin(&request.query);
        info!(
            request = id.0,
            collection = %self.collection,
            query = %request.query,
            "dispatching search"
        );

        let ticket = Ticket {
            id,
            outcome: None,
            completions: self.completions_tx.clone(),
        };
        let backend = Arc::clone(&self.backend);
        let collection = self.collection.clone();

        runtime.spawn(async move {
            let outcome = backend.search(&collection, &request).await;
            ticket.complete(outcome);
        });

        Ok(id)
    }

    /// Apply every completion that has already arrived, without blocking
    pub fn poll_completions(&mut self) -> Vec<Result<Settlement>> {
        let mut settled = Vec::new();
        while let Ok(completion) = self.completions_rx.try_recv() {
            settled.push(self.state.settle(completion.id, completion.outcome));
        }
        settled
    }

    /// Wait for the next dispatched request to finish and apply it.
    /// Never resolves if nothing is in flight.
    pub async fn next_completion(&mut self) -> Result<Settlement> {
        let completion = self.completions_rx.recv().await.ok_or(Error::Aborted)?;
        self.state.settle(completion.id, completion.outcome)
    }
}
