use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::operations::{Domain, Operation};
use crate::params::ParameterSet;

/// Which resolver produced an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    PatternMatch,
    Llm,
}

impl ResolutionSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PatternMatch => "pattern_match",
            Self::Llm => "llm",
        }
    }
}

/// Resolved decision for one user message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Intent {
    pub operation: Operation,
    pub parameters: ParameterSet,
    pub source: ResolutionSource,
}

impl Intent {
    pub fn new(operation: Operation, parameters: ParameterSet, source: ResolutionSource) -> Self {
        Self {
            operation,
            parameters,
            source,
        }
    }

    pub fn domain(&self) -> Domain {
        self.operation.domain()
    }
}

/// One recorded exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub timestamp: DateTime<Utc>,
    pub user_message: String,
    pub system_response: String,
    /// Domain the message was resolved to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<Domain>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<Operation>,
}

impl ConversationTurn {
    pub fn new(
        user_message: impl Into<String>,
        system_response: impl Into<String>,
        operation: Option<Operation>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            user_message: user_message.into(),
            system_response: system_response.into(),
            domain: operation.map(Operation::domain),
            operation,
        }
    }
}
