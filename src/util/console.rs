//! Line-oriented console output.
//!
//! Console output is its own serialization domain: a [`Console`] takes its
//! own lock per line and callers never hold the simulation state lock while
//! emitting.

use std::io::{self, Write};

use parking_lot::Mutex;

/// Sink for human-readable simulation output.
pub trait Console: Send + Sync {
    /// Writes one line. Lines from concurrent callers never interleave.
    fn emit(&self, line: &str);

    /// Writes several lines as one uninterrupted block.
    fn emit_block(&self, lines: &[String]);
}

/// Writes to stdout.
#[derive(Debug, Default)]
pub struct StdoutConsole {
    lock: Mutex<()>,
}

impl StdoutConsole {
    /// Creates a stdout console.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Console for StdoutConsole {
    fn emit(&self, line: &str) {
        let _guard = self.lock.lock();
        let mut out = io::stdout().lock();
        if let Err(e) = writeln!(out, "{line}") {
            tracing::warn!(error = %e, "failed to write console line");
        }
    }

    fn emit_block(&self, lines: &[String]) {
        let _guard = self.lock.lock();
        let mut out = io::stdout().lock();
        for line in lines {
            if let Err(e) = writeln!(out, "{line}") {
                tracing::warn!(error = %e, "failed to write console block");
                return;
            }
        }
    }
}

/// Collects lines in memory. Useful for tests and for embedding the
/// simulation without a terminal.
#[derive(Debug, Default)]
pub struct MemoryConsole {
    lines: Mutex<Vec<String>>,
}

impl MemoryConsole {
    /// Creates an empty console.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every line emitted so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Returns the lines that start with `prefix`.
    pub fn lines_starting_with(&self, prefix: &str) -> Vec<String> {
        self.lines
            .lock()
            .iter()
            .filter(|line| line.starts_with(prefix))
            .cloned()
            .collect()
    }
}

impl Console for MemoryConsole {
    fn emit(&self, line: &str) {
        self.lines.lock().push(line.to_owned());
    }

    fn emit_block(&self, lines: &[String]) {
        self.lines.lock().extend(lines.iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_memory_console_collects_lines() {
        let console = MemoryConsole::new();
        console.emit("[I0] Dungeon started (2s)");
        console.emit_block(&["a".to_string(), "b".to_string()]);
        assert_eq!(console.lines(), vec!["[I0] Dungeon started (2s)", "a", "b"]);
        assert_eq!(console.lines_starting_with("[I0]").len(), 1);
    }

    #[test]
    fn test_memory_console_blocks_stay_contiguous() {
        let console = Arc::new(MemoryConsole::new());
        let mut handles = vec![];

        for id in 0..8 {
            let console = Arc::clone(&console);
            handles.push(thread::spawn(move || {
                for _ in 0..20 {
                    console.emit_block(&[format!("head-{id}"), format!("tail-{id}")]);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let lines = console.lines();
        assert_eq!(lines.len(), 8 * 20 * 2);
        for pair in lines.chunks(2) {
            let id = pair[0].trim_start_matches("head-");
            assert_eq!(pair[1], format!("tail-{id}"));
        }
    }
}
