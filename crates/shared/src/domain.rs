use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CounterId(pub i64);

/// The one global counter row; there is no keying or multi-tenancy.
pub const COUNTER_ID: CounterId = CounterId(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Increment,
    Decrement,
}

impl Operation {
    pub fn delta(self) -> i64 {
        match self {
            Operation::Increment => 1,
            Operation::Decrement => -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Counter {
    pub id: CounterId,
    pub value: i64,
    pub updated_at: DateTime<Utc>,
}

impl Counter {
    /// Synthetic stand-in used when the backend cannot be reached.
    pub fn local_stub() -> Self {
        Self {
            id: COUNTER_ID,
            value: 0,
            updated_at: Utc::now(),
        }
    }

    /// Replacement counter produced by applying `operation` locally.
    /// The record is replaced whole, never mutated in place.
    pub fn applied(&self, operation: Operation) -> Self {
        Self {
            id: self.id,
            value: self.value + operation.delta(),
            updated_at: Utc::now(),
        }
    }
}
