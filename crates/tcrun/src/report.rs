//! Report output
//!
//! Every line the runner produces goes through a [`ReportSink`]. The binary
//! writes to the console and the output file.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tricache::{NodeView, TriCache};

use crate::script::Record;

/// Destination for report lines
pub trait ReportSink {
    fn line(&mut self, line: &str) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: ReportSink + ?Sized> ReportSink for Box<S> {
    fn line(&mut self, line: &str) -> io::Result<()> {
        (**self).line(line)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

/// Writes to stdout
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ReportSink for ConsoleSink {
    fn line(&mut self, line: &str) -> io::Result<()> {
        writeln!(io::stdout().lock(), "{}", line)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}

/// Buffered writer over a created (truncated) file
pub struct FileSink {
    writer: BufWriter<File>,
}

impl FileSink {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file {}", path.display()))?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl ReportSink for FileSink {
    fn line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.writer, "{}", line)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Fans every line out to several sinks
#[derive(Default)]
pub struct TeeSink {
    sinks: Vec<Box<dyn ReportSink>>,
}

impl TeeSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl ReportSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl ReportSink for TeeSink {
    fn line(&mut self, line: &str) -> io::Result<()> {
        for sink in &mut self.sinks {
            sink.line(line)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        for sink in &mut self.sinks {
            sink.flush()?;
        }
        Ok(())
    }
}

/// Keeps lines in memory
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Vec<String>,
}

#[cfg(test)]
impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

#[cfg(test)]
impl ReportSink for MemorySink {
    fn line(&mut self, line: &str) -> io::Result<()> {
        self.lines.push(line.to_string());
        Ok(())
    }
}

/// Formats cache state onto a sink
pub struct Reporter<S> {
    sink: S,
}

impl<S: ReportSink> Reporter<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn log(&mut self, message: &str) -> io::Result<()> {
        self.sink.line(message)
    }

    /// Recency list front to back, then every hash bucket
    pub fn cache(&mut self, cache: &TriCache<Record>) -> io::Result<()> {
        self.log("Printing out the cache: ")?;
        self.log("Here are the FIFO List contents: ")?;
        if cache.recency().is_empty() {
            self.log("Empty list")?;
        } else {
            for key in cache.recency_order() {
                self.log(&format!("{} ", key))?;
            }
        }
        self.log("End of FIFO List")?;

        for (bucket, chain) in cache.hash_index().buckets() {
            let mut chain = chain.peekable();
            if chain.peek().is_none() {
                self.log(&format!("Empty bucket: {}", bucket))?;
                continue;
            }
            self.log(&format!("\nBucket {}: ", bucket))?;
            for (key, id) in chain {
                match cache.entry(*id) {
                    Some(entry) => self.log(&record_line(key, &entry.payload))?,
                    None => self.log(&format!("Hash node with key: {}", key))?,
                }
            }
        }
        Ok(())
    }

    /// Sorted walk in the requested direction followed by a breadth-first dump
    pub fn sorted(&mut self, cache: &TriCache<Record>, ascending: bool) -> io::Result<()> {
        let tree = cache.tree();
        if ascending {
            self.log("Performing In-order traversal")?;
            self.nodes(tree.in_order())?;
        } else {
            self.log("Performing reverse-order traversal")?;
            self.nodes(tree.reverse_order())?;
        }

        if tree.is_empty() {
            return self.log("Tree is empty");
        }
        self.log("Performing Breadth First traversal")?;
        self.nodes(tree.level_order())
    }

    /// Every node with `low <= key <= high`, with its record
    pub fn range(&mut self, cache: &TriCache<Record>, low: i64, high: i64) -> io::Result<()> {
        self.log(&format!("Printing nodes in range [{}, {}]", low, high))?;
        for node in cache.tree().range(low, high) {
            self.log(&node_line(&node))?;
            if let Some(entry) = cache.entry(*node.value) {
                self.log(&format!("    {}", entry.payload))?;
            }
        }
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }

    #[cfg(test)]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    #[cfg(test)]
    pub fn into_sink(self) -> S {
        self.sink
    }

    fn nodes<'a, T: 'a>(&mut self, nodes: impl Iterator<Item = NodeView<'a, T>>) -> io::Result<()> {
        for node in nodes {
            self.log(&node_line(&node))?;
        }
        Ok(())
    }
}

pub fn node_line<T>(node: &NodeView<'_, T>) -> String {
    format!("Node key: {}, Color: {}", node.key, node.color)
}

pub fn record_line(key: i64, record: &Record) -> String {
    format!("Key: {}, {}", key, record)
}
