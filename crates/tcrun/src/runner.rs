//! Test-case execution

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use tricache::{CacheStats, TriCache};

use crate::report::{record_line, ReportSink, Reporter};
use crate::script::{Operation, Record, Script, TestCase};

/// Counts for one completed run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub test_cases: usize,
    pub operations: usize,
    pub stats: CacheStats,
}

/// Drives a cache through scripted test cases and reports every step
pub struct Runner<S> {
    cache: TriCache<Record>,
    report: Reporter<S>,
    /// Counters saved from mid-case clears
    carried: CacheStats,
}

impl<S: ReportSink> Runner<S> {
    pub fn new(cache: TriCache<Record>, sink: S) -> Self {
        Self {
            cache,
            report: Reporter::new(sink),
            carried: CacheStats::new(),
        }
    }

    pub fn cache(&self) -> &TriCache<Record> {
        &self.cache
    }

    pub fn log(&mut self, message: &str) -> Result<()> {
        self.report.log(message).context("Failed to write report")
    }

    /// Run every test case, then the closing line
    pub fn run(&mut self, script: &Script) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for case in &script.test_cases {
            // clear() at the end of a case resets the cache's counters
            let stats = self
                .run_case(case)
                .with_context(|| format!("Test case {} failed", case.name))?;
            summary.test_cases += 1;
            summary.operations += case.operations.len();
            summary.stats.merge(&stats);
        }

        self.log("\n\nEnd of unit tests")?;
        self.report.flush().context("Failed to flush report")?;
        Ok(summary)
    }

    /// One test case followed by the cache dump, both sorts and a clear.
    /// Returns the case's cache counters.
    pub fn run_case(&mut self, case: &TestCase) -> Result<CacheStats> {
        info!("Processing {} ({} operations)", case.name, case.operations.len());
        self.log(&format!("\nProcessing {}:\n\n", case.name))?;

        for op in &case.operations {
            self.apply(op)?;
        }

        if let Err(e) = self.cache.check_consistency() {
            warn!("Cache inconsistent after {}: {}", case.name, e);
        }

        self.report.cache(&self.cache).context("Failed to write report")?;
        self.report
            .sorted(&self.cache, true)
            .context("Failed to write report")?;
        self.report
            .sorted(&self.cache, false)
            .context("Failed to write report")?;

        let mut stats = std::mem::take(&mut self.carried);
        stats.merge(self.cache.stats());
        self.cache.clear();
        Ok(stats)
    }

    /// Apply one operation and log its result line
    pub fn apply(&mut self, op: &Operation) -> Result<()> {
        debug!("Applying {:?}", op);
        match op {
            Operation::IsEmpty {} => {
                let result = self.cache.is_empty();
                self.log(&format!("isEmpty: {}", result))
            }
            Operation::GetSize {} => {
                let result = self.cache.len();
                self.log(&format!("getSize: {}", result))
            }
            Operation::Contains(args) => {
                let result = self.cache.contains(args.key);
                self.log(&format!("contains({}): {}", args.key, result))
            }
            Operation::Get(args) => {
                let line = match self.cache.get(args.key) {
                    Some(record) => format!("get({}): {}", args.key, record_line(args.key, record)),
                    None => format!("get({}): not found", args.key),
                };
                self.log(&line)
            }
            Operation::Add(args) => {
                if !self.cache.add(args.key, args.record.clone()) {
                    warn!("add({}) rejected", args.key);
                }
                self.log(&format!("add key to cacheManager: {}", args.key))
            }
            Operation::Remove(args) => {
                if !self.cache.remove(args.key) {
                    debug!("remove({}) found nothing", args.key);
                }
                self.log(&format!("remove key: {} from cacheManager", args.key))
            }
            Operation::Clear {} => {
                self.carried.merge(self.cache.stats());
                self.cache.clear();
                self.log("clear cacheManager: ")
            }
            Operation::Sort(args) => {
                let ascending = args.ascending.is_set();
                let direction = if ascending { "ascending" } else { "descending" };
                self.log(&format!("sort {} cacheManager", direction))?;
                self.report
                    .sorted(&self.cache, ascending)
                    .context("Failed to write report")
            }
            Operation::PrintRange(args) => {
                self.log(&format!(
                    "printRange with low: {} and high: {}",
                    args.low, args.high
                ))?;
                self.report
                    .range(&self.cache, args.low, args.high)
                    .context("Failed to write report")
            }
        }
    }

    #[cfg(test)]
    pub fn into_sink(self) -> S {
        self.report.into_sink()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::MemorySink;

    fn runner(capacity: usize, buckets: usize) -> Runner<MemorySink> {
        Runner::new(TriCache::new(capacity, buckets).unwrap(), MemorySink::new())
    }

    fn position(lines: &[String], needle: &str) -> usize {
        lines
            .iter()
            .position(|line| line == needle)
            .unwrap_or_else(|| panic!("missing line {:?}", needle))
    }

    const SCRIPT: &str = r#"{ "cacheManager": [ { "testCase1": [
        { "isEmpty": {} },
        { "add": { "key": 20, "fullName": "John Doe", "address": "1234 Log St",
                   "city": "Oakland", "state": "CA", "zip": "12345" } },
        { "add": { "key": 10, "fullName": "Jane Roe", "address": "9 Elm St",
                   "city": "Fresno", "state": "CA", "zip": "93650" } },
        { "contains": { "key": 20 } },
        { "getSize": {} },
        { "get": { "key": 10 } },
        { "get": { "key": 99 } },
        { "remove": { "key": 20 } },
        { "sort": { "ascending": "true" } },
        { "printRange": { "low": 0, "high": 15 } }
    ] } ] }"#;

    #[test]
    fn test_operation_lines() {
        let script = Script::parse(SCRIPT).unwrap();
        let mut runner = runner(3, 3);
        let summary = runner.run(&script).unwrap();

        assert_eq!(summary.test_cases, 1);
        assert_eq!(summary.operations, 10);
        assert_eq!(summary.stats.hits(), 1);
        assert_eq!(summary.stats.misses(), 1);
        assert_eq!(summary.stats.inserts(), 2);
        assert_eq!(summary.stats.removals(), 1);

        let lines = runner.into_sink().into_lines();
        assert_eq!(lines[0], "\nProcessing testCase1:\n\n");
        assert_eq!(
            &lines[1..9],
            &[
                "isEmpty: true",
                "add key to cacheManager: 20",
                "add key to cacheManager: 10",
                "contains(20): true",
                "getSize: 2",
                "get(10): Key: 10, Jane Roe, 9 Elm St, Fresno, CA 93650",
                "get(99): not found",
                "remove key: 20 from cacheManager",
            ]
        );
        assert_eq!(lines[9], "sort ascending cacheManager");
        assert_eq!(lines.last().map(String::as_str), Some("\n\nEnd of unit tests"));
    }

    #[test]
    fn test_case_epilogue_order() {
        let script = Script::parse(SCRIPT).unwrap();
        let mut runner = runner(3, 3);
        runner.run(&script).unwrap();
        assert!(runner.cache().is_empty());

        let lines = runner.into_sink().into_lines();
        let range = position(&lines, "Printing nodes in range [0, 15]");
        let dump = position(&lines, "Printing out the cache: ");
        let reverse = position(&lines, "Performing reverse-order traversal");
        let end = position(&lines, "\n\nEnd of unit tests");
        assert!(range < dump && dump < reverse && reverse < end);
        assert_eq!(lines[range + 1], "Node key: 10, Color: BLACK");
    }

    #[test]
    fn test_clear_between_cases() {
        let script = Script::parse(
            r#"{ "cacheManager": [ {
                "testCase1": [ { "add": { "key": 1 } }, { "add": { "key": 2 } } ],
                "testCase2": [ { "getSize": {} }, { "isEmpty": {} } ]
            } ] }"#,
        )
        .unwrap();

        let mut runner = runner(2, 2);
        runner.run(&script).unwrap();
        let lines = runner.into_sink().into_lines();

        let second = position(&lines, "\nProcessing testCase2:\n\n");
        assert_eq!(lines[second + 1], "getSize: 0");
        assert_eq!(lines[second + 2], "isEmpty: true");
    }

    #[test]
    fn test_mid_case_clear_keeps_counts() {
        let script = Script::parse(
            r#"{ "cacheManager": [ { "t": [
                { "add": { "key": 1 } },
                { "get": { "key": 1 } },
                { "clear": {} },
                { "get": { "key": 1 } }
            ] } ] }"#,
        )
        .unwrap();

        let mut runner = runner(2, 2);
        let summary = runner.run(&script).unwrap();
        assert_eq!(summary.stats.hits(), 1);
        assert_eq!(summary.stats.misses(), 1);
        assert_eq!(summary.stats.inserts(), 1);
    }

    #[test]
    fn test_eviction_visible_in_dump() {
        let script = Script::parse(
            r#"{ "cacheManager": [ { "evict": [
                { "add": { "key": 1 } },
                { "add": { "key": 2 } },
                { "add": { "key": 3 } },
                { "contains": { "key": 1 } },
                { "add": { "key": 4 } },
                { "contains": { "key": 2 } }
            ] } ] }"#,
        )
        .unwrap();

        let mut runner = runner(3, 3);
        let summary = runner.run(&script).unwrap();
        assert_eq!(summary.stats.evictions(), 1);
        let lines = runner.into_sink().into_lines();

        assert!(lines.contains(&"contains(1): true".to_string()));
        assert!(lines.contains(&"contains(2): false".to_string()));

        let start = position(&lines, "Here are the FIFO List contents: ");
        assert_eq!(&lines[start + 1..start + 5], &["4 ", "1 ", "3 ", "End of FIFO List"]);
    }
}
