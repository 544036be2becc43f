//! Screen operations, form inputs and the echo request payload.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;

/// One of the five buttons on the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Get,
    Post,
    Put,
    Delete,
    Status,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Get,
        Operation::Post,
        Operation::Put,
        Operation::Delete,
        Operation::Status,
    ];

    /// Button label, also accepted by `FromStr`.
    pub fn label(self) -> &'static str {
        match self {
            Operation::Get => "GET",
            Operation::Post => "POST",
            Operation::Put => "PUT",
            Operation::Delete => "DELETE",
            Operation::Status => "STATUS",
        }
    }

    /// Stable numeric code used across the C ABI.
    pub fn code(self) -> u32 {
        match self {
            Operation::Get => 0,
            Operation::Post => 1,
            Operation::Put => 2,
            Operation::Delete => 3,
            Operation::Status => 4,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Operation {
    type Err = DispatchError;

    /// Labels are matched exactly; `"get"` is not a screen operation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.label() == s)
            .ok_or_else(|| DispatchError::UnsupportedOperation(s.to_string()))
    }
}

impl TryFrom<u32> for Operation {
    type Error = DispatchError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        Operation::ALL
            .into_iter()
            .find(|op| op.code() == code)
            .ok_or_else(|| DispatchError::UnsupportedOperation(code.to_string()))
    }
}

/// The three text inputs on the screen.
///
/// `status_code` is kept as typed text; it is never validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub name: String,
    pub message: String,
    pub status_code: String,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            name: String::new(),
            message: String::new(),
            status_code: "200".to_string(),
        }
    }
}

/// JSON body sent with POST and PUT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EchoPayload {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "mensagem")]
    pub message: String,
    #[serde(rename = "tipo")]
    pub kind: String,
}
