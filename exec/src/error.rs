use thiserror::Error;

/// Exec result type alias
pub type Result<T> = std::result::Result<T, ExecError>;

/// Errors from launching or awaiting a child process.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("`{program}` not found in the project or on PATH")]
    ToolNotFound { program: String },

    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("failed while waiting for `{program}`: {source}")]
    Wait {
        program: String,
        source: std::io::Error,
    },

    #[error("`{program}` {}{}", describe_exit(.code), describe_stderr(.stderr))]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
}

// thiserror hands format arguments over by reference.
#[allow(clippy::trivially_copy_pass_by_ref)]
fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {code}"),
        None => "was terminated by a signal".to_string(),
    }
}

fn describe_stderr(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(":\n{stderr}")
    }
}
