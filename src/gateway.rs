//! Request dispatch for calculator clients.
//!
//! Requests and responses are JSON objects. A request names its `method`
//! and carries the method's parameters next to it:
//!
//! ```text
//! {"method": "evaluate", "expression": "2 + 3"}
//! {"status": "ok", "data": {"expression": "2 + 3", "result": 5.0, "operation_type": "basic"}}
//!
//! {"method": "evaluate", "expression": "sqrt(-1)"}
//! {"status": "error", "kind": "eval", "message": "EvalError: mathematical evaluation failed"}
//! ```
//!
//! [`Gateway::serve`] reads one request per line and writes one response per
//! line.

use crate::config::HistoryConfig;
use crate::expr::evaluate;
use crate::outcome::Evaluation;
use crate::store::{Calculation, CalculationStore, HistoryQuery, NewCalculation};
use crate::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Write};

/// A client request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Request {
    /// Liveness check
    Healthcheck,
    /// Evaluate an expression without recording it
    Evaluate {
        /// Raw expression text
        expression: String,
    },
    /// Record a calculation in the history
    SaveCalculation(NewCalculation),
    /// Read a page of history, newest first
    GetHistory {
        /// Page size, defaults to the configured one
        #[serde(default)]
        limit: Option<i64>,
        /// Records to skip, defaults to 0
        #[serde(default)]
        offset: Option<i64>,
    },
    /// Forget the whole history
    ClearHistory,
}

impl Request {
    /// Method name, as it appears on the wire
    #[must_use]
    pub fn method(&self) -> &'static str {
        match *self {
            Self::Healthcheck => "healthcheck",
            Self::Evaluate { .. } => "evaluate",
            Self::SaveCalculation(_) => "save_calculation",
            Self::GetHistory { .. } => "get_history",
            Self::ClearHistory => "clear_history",
        }
    }
}

/// Answer to a healthcheck
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Health {
    /// Always `"ok"`
    pub status: &'static str,
    /// Time of the check
    pub timestamp: DateTime<Utc>,
}

/// Answer to a history clear
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cleared {
    /// Always true, failures are reported as errors
    pub success: bool,
    /// Human readable confirmation
    pub message: String,
}

/// Successful response payloads
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    /// `healthcheck`
    Health(Health),
    /// `evaluate`
    Evaluation(Evaluation),
    /// `save_calculation`
    Calculation(Calculation),
    /// `get_history`
    History(Vec<Calculation>),
    /// `clear_history`
    Cleared(Cleared),
}

/// A response to one request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    /// The request succeeded
    Ok {
        /// Method specific payload
        data: Reply,
    },
    /// The request failed. Retrying the same request fails the same way.
    Error {
        /// `validation`, `lex`, `parse`, `eval` or `invalid_request`
        kind: String,
        /// Error text, unchanged from its source
        message: String,
    },
}

impl From<Result<Reply, Error>> for Response {
    fn from(result: Result<Reply, Error>) -> Self {
        match result {
            Ok(data) => Self::Ok { data },
            Err(err) => Self::Error {
                kind: err.kind().to_owned(),
                message: err.to_string(),
            },
        }
    }
}

/// Dispatches requests to the evaluator and a [`CalculationStore`]
///
/// # Examples
///
/// ```
/// # use tally::{Gateway, MemoryStore, Request, Response};
/// let gateway = Gateway::new(MemoryStore::new());
/// let response = gateway.handle(Request::Evaluate { expression: "2+3*4".into() });
/// assert!(matches!(response, Response::Ok { .. }));
///
/// let line = gateway.handle_line(r#"{"method": "evaluate", "expression": "5/0"}"#);
/// assert!(line.contains("\"Infinity\""));
/// ```
pub struct Gateway<S> {
    store: S,
    history: HistoryConfig,
}

impl<S: CalculationStore> Gateway<S> {
    /// A gateway over `store` with the default history paging
    pub fn new(store: S) -> Self {
        Self::with_config(store, HistoryConfig::default())
    }

    /// A gateway over `store` with the given history paging
    pub fn with_config(store: S, history: HistoryConfig) -> Self {
        Self { store, history }
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Answer one request
    pub fn handle(&self, request: Request) -> Response {
        let method = request.method();
        tracing::debug!(method, "handling request");
        let result = match request {
            Request::Healthcheck => Ok(Reply::Health(Self::healthcheck())),
            Request::Evaluate { expression } => self.evaluate(&expression).map(Reply::Evaluation),
            Request::SaveCalculation(calculation) => {
                self.store.save(calculation).map(Reply::Calculation)
            }
            Request::GetHistory { limit, offset } => self.history(limit, offset).map(Reply::History),
            Request::ClearHistory => self.store.clear().map(|()| {
                Reply::Cleared(Cleared {
                    success: true,
                    message: "Calculation history cleared successfully".into(),
                })
            }),
        };
        if let Err(ref err) = result {
            tracing::warn!(method, error = %err, "request failed");
        }
        result.into()
    }

    /// Decode a JSON request, answer it and encode the response
    pub fn handle_line(&self, line: &str) -> String {
        let response = match serde_json::from_str::<Request>(line) {
            Ok(request) => self.handle(request),
            Err(err) => {
                tracing::warn!(error = %err, "undecodable request");
                Response::Error {
                    kind: "invalid_request".into(),
                    message: err.to_string(),
                }
            }
        };
        serde_json::to_string(&response).unwrap_or_else(|err| {
            // only reachable through a non-string map key, which no reply has
            format!(
                r#"{{"status":"error","kind":"internal","message":{:?}}}"#,
                err.to_string()
            )
        })
    }

    /// Serve line-delimited JSON requests from `reader` until end of input,
    /// writing each response to `writer` as soon as it is ready
    pub fn serve<R: BufRead, W: Write>(&self, reader: R, mut writer: W) -> io::Result<()> {
        tracing::info!("serving requests");
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            writeln!(writer, "{}", self.handle_line(&line))?;
            writer.flush()?;
        }
        tracing::info!("input closed");
        Ok(())
    }

    fn healthcheck() -> Health {
        Health {
            status: "ok",
            timestamp: Utc::now(),
        }
    }

    fn evaluate(&self, expression: &str) -> Result<Evaluation, Error> {
        let evaluation = evaluate(expression)?;
        tracing::debug!(
            expression = %evaluation.expression,
            result = evaluation.result,
            operation_type = %evaluation.operation_type,
            "expression evaluated"
        );
        Ok(evaluation)
    }

    fn history(&self, limit: Option<i64>, offset: Option<i64>) -> Result<Vec<Calculation>, Error> {
        let limit = match limit {
            None => self.history.default_limit,
            Some(limit) => usize::try_from(limit)
                .ok()
                .filter(|limit| (1..=self.history.max_limit).contains(limit))
                .ok_or_else(|| {
                    Error::ValidationError(format!(
                        "limit must be between 1 and {}",
                        self.history.max_limit
                    ))
                })?,
        };
        let offset = usize::try_from(offset.unwrap_or(0))
            .map_err(|_| Error::ValidationError("offset cannot be negative".into()))?;
        self.store.list(HistoryQuery::new(limit, offset)?)
    }
}
