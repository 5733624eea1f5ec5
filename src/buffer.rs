use crate::emitter::EmittedFragment;
use std::collections::HashSet;

const MINDPLUS_PREAMBLE: &[&str] = &["#  -*- coding: UTF-8 -*-", "", "# MindPlus", "# Python"];

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub header: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { header: true }
    }
}

/// Where a line of rendered source came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOrigin {
    Preamble,
    Import(usize),
    Separator,
    Code { index: usize, instance: Option<usize> },
}

/// Accumulates the imports and code lines of one compilation.
#[derive(Debug, Clone, Default)]
pub struct ProgramBuffer {
    imports: Vec<String>,
    seen_imports: HashSet<String>,
    lines: Vec<String>,
    line_instances: Vec<Option<usize>>,
    instances: usize,
}

impl ProgramBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the exact import string was already present.
    pub fn register_import(&mut self, import: &str) -> bool {
        if import.is_empty() || self.seen_imports.contains(import) {
            return false;
        }
        self.seen_imports.insert(import.to_string());
        self.imports.push(import.to_string());
        true
    }

    pub fn register_code_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
        self.line_instances.push(None);
    }

    /// Appends one block instance's output and returns its instance index.
    pub fn append(&mut self, fragment: EmittedFragment) -> usize {
        let instance = self.instances;
        self.instances += 1;
        self.register_import(&fragment.import);
        for line in fragment.lines {
            self.lines.push(line);
            self.line_instances.push(Some(instance));
        }
        instance
    }

    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn instance_count(&self) -> usize {
        self.instances
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty() && self.lines.is_empty()
    }

    pub fn finalize(&self) -> String {
        let mut out = String::new();
        for import in &self.imports {
            out.push_str(import);
            out.push('\n');
        }
        out.push('\n');
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    pub fn render(&self, options: RenderOptions) -> String {
        if !options.header {
            return self.finalize();
        }
        let mut out = String::new();
        for line in MINDPLUS_PREAMBLE {
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&self.finalize());
        out
    }

    /// Maps a 1-based line of `render(options)` back to its origin.
    pub fn locate_line(&self, line: usize, options: RenderOptions) -> Option<LineOrigin> {
        let mut line = line;
        if options.header {
            let preamble_len = MINDPLUS_PREAMBLE.len() + 1;
            if (1..=preamble_len).contains(&line) {
                return Some(LineOrigin::Preamble);
            }
            line = line.checked_sub(preamble_len)?;
        }
        if line == 0 {
            return None;
        }
        if line <= self.imports.len() {
            return Some(LineOrigin::Import(line - 1));
        }
        if line == self.imports.len() + 1 {
            return Some(LineOrigin::Separator);
        }
        let index = line - self.imports.len() - 2;
        self.line_instances
            .get(index)
            .map(|&instance| LineOrigin::Code { index, instance })
    }

    pub fn reset(&mut self) {
        self.imports.clear();
        self.seen_imports.clear();
        self.lines.clear();
        self.line_instances.clear();
        self.instances = 0;
    }
}
