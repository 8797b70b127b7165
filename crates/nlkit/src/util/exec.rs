//! Running external commands.

use std::io::{self, Write};
use std::os::unix::process::CommandExt;
use std::process::Command;

use crate::netlink::error::{Error, Result};

/// Run `cmd` with `args`.
///
/// Buffered standard output is flushed first so the child's output lands
/// after ours. With `fork` the call blocks until the child exits and returns
/// its exit status; a child killed by a signal is an error. Without `fork`
/// the current process image is replaced, so this only returns on failure.
pub fn cmd_exec(cmd: &str, args: &[String], fork: bool) -> Result<i32> {
    io::stdout().flush()?;

    let mut command = Command::new(cmd);
    command.args(args);

    if !fork {
        let source = command.exec();
        return Err(Error::Exec {
            command: cmd.to_string(),
            source,
        });
    }

    tracing::debug!(command = cmd, ?args, "running child");
    let status = command.status().map_err(|source| Error::Exec {
        command: cmd.to_string(),
        source,
    })?;

    status.code().ok_or_else(|| Error::ChildAbnormal {
        command: cmd.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_exit_status() {
        assert_eq!(cmd_exec("true", &[], true).unwrap(), 0);
        assert_eq!(cmd_exec("sh", &args(&["-c", "exit 3"]), true).unwrap(), 3);
    }

    #[test]
    fn test_spawn_failure() {
        let err = cmd_exec("/nonexistent/nlkit-test", &[], true).unwrap_err();
        assert!(matches!(err, Error::Exec { ref command, .. } if command == "/nonexistent/nlkit-test"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_signal_death() {
        let err = cmd_exec("sh", &args(&["-c", "kill -KILL $$"]), true).unwrap_err();
        assert!(matches!(err, Error::ChildAbnormal { .. }));
    }

    #[test]
    fn test_exec_failure_returns() {
        // exec of a missing program fails before the image is replaced.
        let err = cmd_exec("/nonexistent/nlkit-test", &[], false).unwrap_err();
        assert!(matches!(err, Error::Exec { .. }));
    }
}
