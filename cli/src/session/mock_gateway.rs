//! In-memory statement gateway for session tests

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use streamsql_link::models::{
    ResultData, ResultSchema, ResultsMetadata, StatementSpec, StatementStatus, StatementTraits,
};
use streamsql_link::{
    ColumnDetails, DataType, FieldType, LinkError, ResultItem, Statement, StatementGateway,
    StatementPhase, StatementResults, WireItem,
};

#[derive(Default)]
struct MockState {
    /// Phases handed out by `get_statement`; the last one repeats
    phases: VecDeque<StatementPhase>,
    create_phase: Option<StatementPhase>,
    detail: Option<String>,
    pages: Vec<Vec<ResultItem>>,
    /// Every page links to a following one, like an unbounded statement
    open_ended: bool,
    fail_create: Option<u16>,
    fail_results: Option<u16>,
    fail_get: Option<u16>,
    created: Vec<(String, HashMap<String, String>)>,
    result_requests: Vec<Option<String>>,
    deleted: Vec<String>,
}

pub struct MockGateway {
    columns: Vec<ColumnDetails>,
    state: Mutex<MockState>,
}

impl MockGateway {
    /// Single INTEGER column `id`, RUNNING right away
    pub fn new() -> Self {
        Self::with_columns(vec![ColumnDetails::new(
            "id",
            DataType::atomic(FieldType::Integer),
        )])
    }

    pub fn with_columns(columns: Vec<ColumnDetails>) -> Self {
        Self {
            columns,
            state: Mutex::new(MockState {
                create_phase: Some(StatementPhase::Running),
                ..MockState::default()
            }),
        }
    }

    pub fn created_pending_then(self, phases: Vec<StatementPhase>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.create_phase = Some(StatementPhase::Pending);
            state.phases = phases.into();
        }
        self
    }

    pub fn with_detail(self, detail: &str) -> Self {
        self.state.lock().unwrap().detail = Some(detail.to_string());
        self
    }

    pub fn with_pages(self, pages: Vec<Vec<ResultItem>>) -> Self {
        self.state.lock().unwrap().pages = pages;
        self
    }

    pub fn open_ended(self) -> Self {
        self.state.lock().unwrap().open_ended = true;
        self
    }

    pub fn failing_create(self, status: u16) -> Self {
        self.state.lock().unwrap().fail_create = Some(status);
        self
    }

    pub fn failing_get(self, status: u16) -> Self {
        self.state.lock().unwrap().fail_get = Some(status);
        self
    }

    pub fn failing_results(&self, status: Option<u16>) {
        self.state.lock().unwrap().fail_results = status;
    }

    pub fn created(&self) -> Vec<(String, HashMap<String, String>)> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn result_requests(&self) -> Vec<Option<String>> {
        self.state.lock().unwrap().result_requests.clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.state.lock().unwrap().deleted.clone()
    }

    fn statement(
        &self,
        name: &str,
        sql: &str,
        phase: StatementPhase,
        detail: Option<String>,
    ) -> Statement {
        Statement {
            name: name.to_string(),
            spec: StatementSpec {
                statement: sql.to_string(),
                ..StatementSpec::default()
            },
            status: StatementStatus {
                phase,
                detail,
                traits: Some(StatementTraits {
                    schema: Some(ResultSchema {
                        columns: self.columns.clone(),
                    }),
                    is_bounded: false,
                    ..StatementTraits::default()
                }),
            },
        }
    }
}

/// Insert row for a single INTEGER column
pub fn insert(id: i64) -> ResultItem {
    ResultItem::insert(vec![WireItem::scalar(id.to_string())])
}

pub fn change(op: streamsql_link::Operation, id: i64) -> ResultItem {
    ResultItem::new(op, vec![WireItem::scalar(id.to_string())])
}

#[async_trait]
impl StatementGateway for MockGateway {
    async fn create_statement(
        &self,
        sql: &str,
        properties: &HashMap<String, String>,
    ) -> streamsql_link::Result<Statement> {
        let (name, phase, detail) = {
            let mut state = self.state.lock().unwrap();
            if let Some(status) = state.fail_create {
                return Err(LinkError::from_status(status, "create rejected".into()));
            }
            let name = format!("stmt-{}", state.created.len() + 1);
            state.created.push((name.clone(), properties.clone()));
            (
                name,
                state.create_phase.clone().unwrap_or(StatementPhase::Running),
                state.detail.clone(),
            )
        };
        Ok(self.statement(&name, sql, phase, detail))
    }

    async fn get_statement(&self, name: &str) -> streamsql_link::Result<Statement> {
        let (phase, detail) = {
            let mut state = self.state.lock().unwrap();
            if let Some(status) = state.fail_get {
                return Err(LinkError::from_status(status, "status unavailable".into()));
            }
            let phase = if state.phases.len() > 1 {
                state.phases.pop_front()
            } else {
                state.phases.front().cloned()
            };
            (phase.unwrap_or(StatementPhase::Running), state.detail.clone())
        };
        Ok(self.statement(name, "", phase, detail))
    }

    async fn get_statement_results(
        &self,
        _name: &str,
        page_token: Option<&str>,
    ) -> streamsql_link::Result<StatementResults> {
        let mut state = self.state.lock().unwrap();
        state.result_requests.push(page_token.map(str::to_string));
        if let Some(status) = state.fail_results {
            return Err(LinkError::from_status(status, "results unavailable".into()));
        }

        let index = match page_token {
            None => 0,
            Some(token) => token
                .strip_prefix("page-")
                .and_then(|n| n.parse::<usize>().ok())
                .unwrap_or(usize::MAX),
        };
        let data = state.pages.get(index).cloned().unwrap_or_default();
        let has_next = state.open_ended || index.saturating_add(1) < state.pages.len();
        let next = has_next.then(|| {
            format!(
                "/statements/s/results?page_token=page-{}",
                index.saturating_add(1)
            )
        });

        Ok(StatementResults {
            results: ResultData { data },
            metadata: ResultsMetadata { next },
        })
    }

    async fn delete_statement(&self, name: &str) -> streamsql_link::Result<()> {
        self.state.lock().unwrap().deleted.push(name.to_string());
        Ok(())
    }
}
