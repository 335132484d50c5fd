use serde::{Deserialize, Serialize};

use crate::domain::Operation;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UpdateCounterRequest {
    pub operation: Operation,
}
