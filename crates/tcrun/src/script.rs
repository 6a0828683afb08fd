//! Test-case script format
//!
//! ```json
//! {
//!   "cacheManager": [
//!     { "testCase1": [
//!         { "isEmpty": {} },
//!         { "add": { "key": 20, "fullName": "John Doe", "address": "1234 Log St",
//!                    "city": "Oakland", "state": "CA", "zip": "12345" } },
//!         { "sort": { "ascending": "true" } },
//!         { "printRange": { "low": 10, "high": 30 } }
//!     ] }
//!   ]
//! }
//! ```
//!
//! Test cases inside one object run in name order.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use tricache::Key;

/// Payload cached for every key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Record {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}, {} {}",
            self.full_name, self.address, self.city, self.state, self.zip
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KeyArgs {
    pub key: Key,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddArgs {
    pub key: Key,
    #[serde(flatten)]
    pub record: Record,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RangeArgs {
    pub low: Key,
    pub high: Key,
}

/// `"ascending"` shows up both as a JSON bool and as the string `"true"`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Text(String),
}

impl Flag {
    pub fn is_set(&self) -> bool {
        match self {
            Flag::Bool(b) => *b,
            Flag::Text(s) => s.trim().eq_ignore_ascii_case("true"),
        }
    }
}

impl Default for Flag {
    fn default() -> Self {
        Flag::Bool(true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SortArgs {
    #[serde(default)]
    pub ascending: Flag,
}

/// One scripted call against the cache
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    IsEmpty {},
    GetSize {},
    Contains(KeyArgs),
    Get(KeyArgs),
    Add(AddArgs),
    Remove(KeyArgs),
    Clear {},
    Sort(SortArgs),
    PrintRange(RangeArgs),
}

/// Named sequence of operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub name: String,
    pub operations: Vec<Operation>,
}

#[derive(Debug, Deserialize)]
struct ScriptFile {
    #[serde(rename = "cacheManager")]
    cache_manager: Vec<BTreeMap<String, Vec<Operation>>>,
}

/// Parsed test-case file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub test_cases: Vec<TestCase>,
}

impl Script {
    /// Read and parse a script file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read test-case file {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("Invalid test-case file {}", path.display()))
    }

    /// Parse script JSON
    pub fn parse(raw: &str) -> Result<Self> {
        let file: ScriptFile = serde_json::from_str(raw).context("Failed to parse script JSON")?;
        let test_cases = file
            .cache_manager
            .into_iter()
            .flat_map(|group| group.into_iter())
            .map(|(name, operations)| TestCase { name, operations })
            .collect();
        Ok(Self { test_cases })
    }

    /// Total operations across all test cases
    pub fn operation_count(&self) -> usize {
        self.test_cases.iter().map(|case| case.operations.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_operations() {
        let script = Script::parse(
            r#"{ "cacheManager": [ { "testCase1": [
                { "isEmpty": {} },
                { "add": { "key": 20, "fullName": "John Doe", "address": "1234 Log St",
                           "city": "Oakland", "state": "CA", "zip": "12345" } },
                { "contains": { "key": 20 } },
                { "getSize": {} },
                { "get": { "key": 20 } },
                { "remove": { "key": 20 } },
                { "sort": { "ascending": "false" } },
                { "printRange": { "low": 1, "high": 9 } },
                { "clear": {} }
            ] } ] }"#,
        )
        .unwrap();

        assert_eq!(script.test_cases.len(), 1);
        let case = &script.test_cases[0];
        assert_eq!(case.name, "testCase1");
        assert_eq!(case.operations.len(), 9);
        assert_eq!(case.operations[0], Operation::IsEmpty {});
        assert_eq!(
            case.operations[1],
            Operation::Add(AddArgs {
                key: 20,
                record: Record {
                    full_name: "John Doe".to_string(),
                    address: "1234 Log St".to_string(),
                    city: "Oakland".to_string(),
                    state: "CA".to_string(),
                    zip: "12345".to_string(),
                },
            })
        );
        assert_eq!(
            case.operations[7],
            Operation::PrintRange(RangeArgs { low: 1, high: 9 })
        );
        match &case.operations[6] {
            Operation::Sort(args) => assert!(!args.ascending.is_set()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_flag_forms() {
        assert!(Flag::Text("true".to_string()).is_set());
        assert!(Flag::Text(" TRUE ".to_string()).is_set());
        assert!(!Flag::Text("no".to_string()).is_set());
        assert!(Flag::Bool(true).is_set());

        let args: SortArgs = serde_json::from_str(r#"{"ascending": false}"#).unwrap();
        assert!(!args.ascending.is_set());
        let args: SortArgs = serde_json::from_str("{}").unwrap();
        assert!(args.ascending.is_set());
    }

    #[test]
    fn test_case_order_and_count() {
        let script = Script::parse(
            r#"{ "cacheManager": [
                { "testCase2": [ { "clear": {} } ], "testCase1": [ { "getSize": {} } ] },
                { "testCase3": [ { "isEmpty": {} }, { "isEmpty": {} } ] }
            ] }"#,
        )
        .unwrap();

        let names: Vec<_> = script.test_cases.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["testCase1", "testCase2", "testCase3"]);
        assert_eq!(script.operation_count(), 4);
    }

    #[test]
    fn test_missing_record_fields_default() {
        let op: Operation = serde_json::from_str(r#"{"add": {"key": -4}}"#).unwrap();
        assert_eq!(
            op,
            Operation::Add(AddArgs {
                key: -4,
                record: Record::default(),
            })
        );
    }

    #[test]
    fn test_unknown_operation_is_rejected() {
        assert!(Script::parse(r#"{ "cacheManager": [ { "t": [ { "explode": {} } ] } ] }"#).is_err());
    }
}
