//! Session configuration and its validation.

use serde::{Deserialize, Serialize};

/// The closed set of drill operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    Add,
    Multiply,
}

impl OpKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Multiply => "multiply",
        }
    }

    /// The symbol used when rendering a question label.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Multiply => "\u{00d7}",
        }
    }
}

impl std::fmt::Display for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OpKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Self::Add),
            "multiply" => Ok(Self::Multiply),
            other => Err(ConfigError::UnknownMode(other.to_string())),
        }
    }
}

/// Mode-specific generation parameters. Opaque to the session controller,
/// passed through to the question service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModeParams {
    /// Multiplication tables: first operand drawn from `start_table..=end_table`.
    Multiply { start_table: u32, end_table: u32 },
    /// Addition: `term_count` operands with `digits` digits each.
    Add { digits: u32, term_count: u32 },
}

impl ModeParams {
    pub fn kind(&self) -> OpKind {
        match self {
            Self::Multiply { .. } => OpKind::Multiply,
            Self::Add { .. } => OpKind::Add,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown operation mode: {0}")]
    UnknownMode(String),
    #[error("{0} must be greater than zero")]
    NonPositive(&'static str),
}

/// Immutable per-session configuration, supplied to `start()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub params: ModeParams,
    /// Time limit per question, in whole seconds.
    pub time_per_question: u32,
    pub total_questions: u32,
}

impl SessionConfig {
    pub fn mode(&self) -> OpKind {
        self.params.kind()
    }

    /// All numeric fields must be greater than zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time_per_question == 0 {
            return Err(ConfigError::NonPositive("time_per_question"));
        }
        if self.total_questions == 0 {
            return Err(ConfigError::NonPositive("total_questions"));
        }
        match self.params {
            ModeParams::Multiply {
                start_table,
                end_table,
            } => {
                if start_table == 0 {
                    return Err(ConfigError::NonPositive("start_table"));
                }
                if end_table == 0 {
                    return Err(ConfigError::NonPositive("end_table"));
                }
            }
            ModeParams::Add { digits, term_count } => {
                if digits == 0 {
                    return Err(ConfigError::NonPositive("digits"));
                }
                if term_count == 0 {
                    return Err(ConfigError::NonPositive("term_count"));
                }
            }
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    /// The setup screen's initial values: tables 2-12, ten questions,
    /// ten seconds each.
    fn default() -> Self {
        Self {
            params: ModeParams::Multiply {
                start_table: 2,
                end_table: 12,
            },
            time_per_question: 10,
            total_questions: 10,
        }
    }
}
