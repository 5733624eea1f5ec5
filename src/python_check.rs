use anyhow::{bail, Context, Result};
use std::process::Command;
use tempfile::Builder;

/// Outcome of running the generated source through `py_compile`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxCheck {
    Ok,
    Failed { line: Option<usize>, message: String },
}

pub fn check_python_syntax(python: &str, source: &str) -> Result<SyntaxCheck> {
    let mut temp = Builder::new()
        .prefix("blockgen-")
        .suffix(".py")
        .tempfile()
        .context("Failed to create temporary Python file for syntax check.")?;
    std::io::Write::write_all(&mut temp, source.as_bytes())?;

    let output = Command::new(python)
        .arg("-m")
        .arg("py_compile")
        .arg(temp.path())
        .output()
        .with_context(|| {
            format!(
                "Failed to start '{}'. Ensure Python is available or remove --check.",
                python
            )
        })?;
    if output.status.success() {
        return Ok(SyntaxCheck::Ok);
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let message = format!("{}\n{}", stdout.trim(), stderr.trim()).trim().to_string();
    if message.is_empty() {
        bail!("'{}' -m py_compile failed without output.", python);
    }
    Ok(SyntaxCheck::Failed {
        line: extract_line(&message),
        message,
    })
}

/// Finds the `line N` reference in a Python error message.
pub fn extract_line(message: &str) -> Option<usize> {
    let marker = "line ";
    let mut rest = message;
    while let Some(at) = rest.find(marker) {
        let tail = &rest[at + marker.len()..];
        let digits = tail
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect::<String>();
        if let Ok(line) = digits.parse::<usize>() {
            return Some(line);
        }
        rest = tail;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_line_in_traceback_output() {
        let message = "  File \"/tmp/blockgen-x.py\", line 12\n    predict(m,\n           ^\nSyntaxError: '(' was never closed";
        assert_eq!(extract_line(message), Some(12));
    }

    #[test]
    fn skips_marker_without_number() {
        assert_eq!(extract_line("bad line here, line 3"), Some(3));
        assert_eq!(extract_line("no location"), None);
    }
}
