//! Calculation history.
//!
//! [`CalculationStore`] is the seam between the request gateway and
//! whatever keeps the records; [`MemoryStore`] keeps them in process.

use crate::outcome::{number, Evaluation, OperationType};
use crate::Error;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Page size used when a history request does not give one
pub const DEFAULT_LIMIT: usize = 50;
/// Largest page size a history request may ask for
pub const MAX_LIMIT: usize = 100;

/// A calculation to record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCalculation {
    /// Expression text, non-empty
    pub expression: String,
    /// Result, never NaN
    #[serde(with = "number")]
    pub result: f64,
    /// Classification of the expression
    pub operation_type: OperationType,
}

impl NewCalculation {
    /// Reject records that could not have come out of an evaluation
    pub fn validate(&self) -> Result<(), Error> {
        if self.expression.is_empty() {
            return Err(Error::ValidationError("expression cannot be empty".into()));
        }
        if self.result.is_nan() {
            return Err(Error::ValidationError("result cannot be NaN".into()));
        }
        Ok(())
    }
}

impl From<Evaluation> for NewCalculation {
    fn from(evaluation: Evaluation) -> Self {
        Self {
            expression: evaluation.expression,
            result: evaluation.result,
            operation_type: evaluation.operation_type,
        }
    }
}

/// A recorded calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calculation {
    /// Assigned by the store, increasing from 1
    pub id: u64,
    /// Expression text
    pub expression: String,
    /// Result, possibly infinite
    #[serde(with = "number")]
    pub result: f64,
    /// Classification of the expression
    pub operation_type: OperationType,
    /// When the store accepted the record
    pub created_at: DateTime<Utc>,
}

/// One page of history, newest first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryQuery {
    limit: usize,
    offset: usize,
}

impl HistoryQuery {
    /// A page of at most `limit` records after skipping `offset` of them.
    /// `limit` must be in `1..=MAX_LIMIT`.
    pub fn new(limit: usize, offset: usize) -> Result<Self, Error> {
        if limit == 0 || limit > MAX_LIMIT {
            return Err(Error::ValidationError(format!(
                "limit must be between 1 and {}",
                MAX_LIMIT
            )));
        }
        Ok(Self { limit, offset })
    }

    /// Maximum number of records returned
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of newest records skipped
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// Storage for the calculation history
pub trait CalculationStore: Send + Sync {
    /// Record a calculation, assigning its id and creation time
    fn save(&self, calculation: NewCalculation) -> Result<Calculation, Error>;

    /// Records ordered by creation time, newest first
    fn list(&self, query: HistoryQuery) -> Result<Vec<Calculation>, Error>;

    /// Forget every record
    fn clear(&self) -> Result<(), Error>;
}

#[derive(Debug, Default)]
struct History {
    last_id: u64,
    // insertion order, which is also creation order
    records: Vec<Calculation>,
}

/// In-process [`CalculationStore`]
///
/// # Examples
///
/// ```
/// # use tally::{evaluate, CalculationStore, HistoryQuery, MemoryStore};
/// let store = MemoryStore::new();
/// store.save(evaluate("1 + 1").unwrap().into()).unwrap();
/// store.save(evaluate("2 * 3").unwrap().into()).unwrap();
///
/// let history = store.list(HistoryQuery::new(1, 0).unwrap()).unwrap();
/// assert_eq!(history[0].expression, "2 * 3");
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    history: RwLock<History>,
}

impl MemoryStore {
    /// An empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held
    #[must_use]
    pub fn len(&self) -> usize {
        self.history.read().records.len()
    }

    /// Whether the store holds no record
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CalculationStore for MemoryStore {
    fn save(&self, calculation: NewCalculation) -> Result<Calculation, Error> {
        calculation.validate()?;
        let mut history = self.history.write();
        history.last_id += 1;
        let record = Calculation {
            id: history.last_id,
            expression: calculation.expression,
            result: calculation.result,
            operation_type: calculation.operation_type,
            created_at: Utc::now(),
        };
        history.records.push(record.clone());
        tracing::debug!(id = record.id, expression = %record.expression, "calculation saved");
        Ok(record)
    }

    fn list(&self, query: HistoryQuery) -> Result<Vec<Calculation>, Error> {
        let history = self.history.read();
        let mut records: Vec<&Calculation> = history.records.iter().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(records
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect())
    }

    fn clear(&self) -> Result<(), Error> {
        let mut history = self.history.write();
        let removed = history.records.len();
        history.records.clear();
        tracing::info!(removed, "calculation history cleared");
        Ok(())
    }
}
