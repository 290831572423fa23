//! Dashboard state machine and derived views.
//!
//! The controller owns the single ResultSet/status pair of the whole
//! application. Fetch outcomes drive `Idle → Loading → {Loaded, Failed}`;
//! aggregation and filtering are recomputed synchronously whenever the
//! result version or the query changes, and cached by input identity.

use crate::analysis::{self, filter_records, Aggregates};
use crate::client::{AnalysisClient, FetchError};
use crate::models::{AnalysisResult, SuspectProperty};
use tracing::{info, warn};

/// Fetch lifecycle of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// Why the dashboard has nothing to show. The three causes drive
/// distinguishable empty-state messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyKind {
    /// Nothing has been fetched yet.
    NoPayload,
    /// The backend marked the result as empty (`status == "vazio"`).
    MarkedEmpty,
    /// A payload arrived but its record list has zero length.
    NoRecords,
}

/// Controller wiring user input to the analysis engines.
pub struct Dashboard {
    client: AnalysisClient,
    state: FetchState,
    /// Last successful payload. Immutable until the next success replaces it.
    result: Option<AnalysisResult>,
    /// Bumped on every successful fetch; identity key for the caches.
    version: u64,
    query: String,
    last_failure: Option<String>,
    aggregates_cache: (u64, Aggregates),
    filtered_cache: (u64, String, Vec<SuspectProperty>),
}

impl Dashboard {
    pub fn new(client: AnalysisClient) -> Self {
        Self {
            client,
            state: FetchState::Idle,
            result: None,
            version: 0,
            query: String::new(),
            last_failure: None,
            aggregates_cache: (0, analysis::aggregate(&[])),
            filtered_cache: (0, String::new(), Vec::new()),
        }
    }

    pub fn state(&self) -> FetchState {
        self.state
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Notice from the last failed fetch, if the state is `Failed`.
    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// The endpoint this dashboard fetches from.
    pub fn endpoint(&self) -> &str {
        self.client.endpoint()
    }

    /// Records of the current result; empty before the first load.
    pub fn records(&self) -> &[SuspectProperty] {
        self.result
            .as_ref()
            .map(|r| r.records.as_slice())
            .unwrap_or(&[])
    }

    /// Trigger a fetch. A refresh requested while one is already in
    /// flight is ignored. Entering `Loading` clears no prior data.
    pub async fn refresh(&mut self) {
        if self.state == FetchState::Loading {
            warn!("refresh ignored: a fetch is already in flight");
            return;
        }

        self.state = FetchState::Loading;
        let outcome = self.client.fetch().await;
        self.apply_outcome(outcome);
    }

    /// Apply a fetch outcome to the state machine. Split out of
    /// [`Dashboard::refresh`] so transitions are testable without a
    /// live backend.
    pub(crate) fn apply_outcome(&mut self, outcome: Result<AnalysisResult, FetchError>) {
        match outcome {
            Ok(payload) => {
                info!("analysis loaded: {} records", payload.records.len());
                self.result = Some(payload);
                self.version += 1;
                self.last_failure = None;
                self.state = FetchState::Loaded;
            }
            Err(err) => {
                warn!("fetch failed: {}", err);
                // The previous result stays visible underneath.
                self.last_failure = Some(err.user_notice().to_string());
                self.state = FetchState::Failed;
            }
        }
    }

    /// The three aggregation summaries, recomputed only when the result
    /// version changes.
    pub fn aggregates(&mut self) -> &Aggregates {
        if self.aggregates_cache.0 != self.version {
            let computed = analysis::aggregate(self.records());
            self.aggregates_cache = (self.version, computed);
        }
        &self.aggregates_cache.1
    }

    /// The filtered view, recomputed only when the result version or the
    /// query changes.
    pub fn filtered(&mut self) -> &[SuspectProperty] {
        if self.filtered_cache.0 != self.version || self.filtered_cache.1 != self.query {
            let rows = filter_records(self.records(), &self.query);
            self.filtered_cache = (self.version, self.query.clone(), rows);
        }
        &self.filtered_cache.2
    }

    /// Classify why there is nothing to show, if so.
    pub fn emptiness(&self) -> Option<EmptyKind> {
        match &self.result {
            None => Some(EmptyKind::NoPayload),
            Some(r) if r.is_marked_empty() => Some(EmptyKind::MarkedEmpty),
            Some(r) if r.records.is_empty() => Some(EmptyKind::NoRecords),
            Some(_) => None,
        }
    }

    /// Empty-state message: the server-supplied message when present,
    /// else a default that distinguishes the cause.
    pub fn empty_message(&self) -> Option<String> {
        let kind = self.emptiness()?;

        if let Some(message) = self.result.as_ref().and_then(|r| r.message.as_deref()) {
            if !message.is_empty() {
                return Some(message.to_string());
            }
        }

        Some(
            match kind {
                EmptyKind::NoPayload => {
                    "Aguardando análise. Use 'refresh' para executar a auditoria."
                }
                EmptyKind::MarkedEmpty => {
                    "Análise vazia. Verifique se o arquivo 'bens-imoveis.json' está na pasta de dados do backend."
                }
                EmptyKind::NoRecords => "Nenhum imóvel suspeito encontrado na última análise.",
            }
            .to_string(),
        )
    }
}
