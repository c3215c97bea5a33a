//! Account shapes: credits and saved codes

use serde::{Deserialize, Serialize};

/// Credits available to the user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credits {
    /// Credits left
    #[serde(default)]
    pub remaining: f64,

    /// Promotional credits
    #[serde(default)]
    pub promotional: f64,

    /// Credit ceiling for the user's tier
    #[serde(default)]
    pub max_user_type: f64,
}

/// User record returned by `users/{userId}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Credit balance
    #[serde(default)]
    pub credit: Credits,
}

/// Status of an execution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStatus {
    /// Status identifier (e.g. `"DONE"`)
    #[serde(default)]
    pub id: String,
}

/// One execution of a saved code
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    /// Execution identifier
    #[serde(default)]
    pub id: String,

    /// Device the code ran on
    #[serde(default)]
    pub device_run_type: Option<String>,

    /// Shots used
    #[serde(default)]
    pub shots: Option<u64>,

    /// Execution status
    #[serde(default)]
    pub status: Option<ExecutionStatus>,
}

/// A code saved on the server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Code {
    /// Code identifier
    #[serde(default)]
    pub id: String,

    /// Code name
    #[serde(default)]
    pub name: Option<String>,

    /// Code type (e.g. `"QASM2"`)
    #[serde(default)]
    pub code_type: Option<String>,

    /// QASM source
    #[serde(default)]
    pub qasm: Option<String>,

    /// Creation timestamp
    #[serde(default)]
    pub creation_date: Option<String>,

    /// Whether the code was deleted
    #[serde(default)]
    pub deleted: bool,

    /// Executions of this code
    #[serde(default)]
    pub executions: Vec<Execution>,
}

/// Most recent codes of the user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Codes {
    /// Codes, newest first
    #[serde(default)]
    pub codes: Vec<Code>,
}
