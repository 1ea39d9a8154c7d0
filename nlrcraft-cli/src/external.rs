//! Invocation of external programs (Foldseek, Rscript).
//!
//! A non-zero exit or a failure to start is returned as
//! [`NlrError::Tool`]; nothing is retried.

use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::process::{Command, ExitStatus};
use std::time::{Duration, Instant};

use nlrcraft_core::{NlrError, Result};
use nlrcraft_io::foldseek::format_output_arg;

/// Lines of stderr kept in a [`NlrError::Tool`] message.
const STDERR_TAIL_LINES: usize = 20;

/// An external command line, built up before it is run.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: String,
    args: Vec<OsString>,
}

/// A finished, successful tool run.
#[derive(Debug, Clone)]
pub struct ToolRun {
    pub command_line: String,
    pub status: ExitStatus,
    pub elapsed: Duration,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// The command as it would be typed in a shell, for logging.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }

    /// Run to completion, capturing output.
    pub fn run(&self) -> Result<ToolRun> {
        let command_line = self.command_line();
        log::info!("running: {}", command_line);

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        let started = Instant::now();
        let output = cmd.output().map_err(|e| NlrError::Tool {
            program: self.program.clone(),
            status: "could not start".to_string(),
            stderr: e.to_string(),
        })?;
        let elapsed = started.elapsed();

        if !output.status.success() {
            let stderr = stderr_tail(&output.stderr, STDERR_TAIL_LINES);
            log::error!("{} failed after {:.1?}: {}", self.program, elapsed, output.status);
            return Err(NlrError::Tool {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr,
            });
        }

        log::info!("{} finished in {:.1?}", self.program, elapsed);
        Ok(ToolRun {
            command_line,
            status: output.status,
            elapsed,
        })
    }
}

/// Last `n` non-empty lines of captured stderr.
fn stderr_tail(bytes: &[u8], n: usize) -> String {
    let text = String::from_utf8_lossy(bytes);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

/// `foldseek createdb <templates> <db>`
pub fn foldseek_createdb(foldseek: &str, templates: &Path, db: &Path) -> ToolCommand {
    ToolCommand::new(foldseek)
        .arg("createdb")
        .arg(templates)
        .arg(db)
}

/// `foldseek easy-search` writing the 19-column hit table.
pub fn foldseek_easy_search(
    foldseek: &str,
    queries: &Path,
    db: &Path,
    hits: &Path,
    tmp: &Path,
) -> ToolCommand {
    ToolCommand::new(foldseek)
        .arg("easy-search")
        .arg(queries)
        .arg(db)
        .arg(hits)
        .arg(tmp)
        .arg("--format-output")
        .arg(format_output_arg())
}

/// `Rscript <script> <model> <labels> <predictions>`
pub fn rf_predict(
    rscript: &str,
    script: &Path,
    model: &Path,
    labels: &Path,
    predictions: &Path,
) -> ToolCommand {
    ToolCommand::new(rscript).args([script, model, labels, predictions])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_for_logging() {
        let cmd = foldseek_createdb("foldseek", Path::new("domains_pdb"), Path::new("db/nlrDB"));
        assert_eq!(cmd.command_line(), "foldseek createdb domains_pdb db/nlrDB");
    }

    #[test]
    fn easy_search_requests_all_columns() {
        let cmd = foldseek_easy_search(
            "foldseek",
            Path::new("q"),
            Path::new("db"),
            Path::new("aln.txt"),
            Path::new("tmp"),
        );
        let line = cmd.command_line();
        assert!(line.starts_with("foldseek easy-search q db aln.txt tmp --format-output "));
        assert!(line.ends_with("alntmscore,qtmscore,ttmscore"));
    }

    #[test]
    fn tail_keeps_last_lines() {
        let err = b"one\n\ntwo\nthree\n";
        assert_eq!(stderr_tail(err, 2), "two\nthree");
        assert_eq!(stderr_tail(b"", 5), "");
    }

    #[test]
    fn missing_program_is_tool_error() {
        let err = ToolCommand::new("nlrcraft-no-such-program").run().unwrap_err();
        match err {
            NlrError::Tool { program, status, .. } => {
                assert_eq!(program, "nlrcraft-no-such-program");
                assert_eq!(status, "could not start");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_tool_error() {
        let err = ToolCommand::new("sh")
            .args(["-c", "echo broken >&2; exit 3"])
            .run()
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("sh failed"));
        assert!(msg.contains("broken"));
    }

    #[cfg(unix)]
    #[test]
    fn success_reports_status() {
        let run = ToolCommand::new("sh")
            .args(["-c", "true"])
            .run()
            .unwrap();
        assert!(run.status.success());
        assert_eq!(run.command_line, "sh -c true");
    }
}
