//! Running external programs.
//!
//! Commands are first run directly from their argument vector. If that cannot even be
//! started, the vector is joined into one line and retried once through the platform shell,
//! which picks up shell builtins, aliases and `PATHEXT` lookups the direct spawn misses.

use crate::error::SetupError;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// Run `argv` in `cwd` with extra `env` bindings, falling back to the shell once.
///
/// # Errors
/// [`SetupError::SubprocessFailure`] on a non-zero exit, [`SetupError::Spawn`] if not even the
/// shell could be started.
pub fn safe_call(
    argv: &[String],
    cwd: Option<&Path>,
    env: &[(String, String)],
) -> Result<(), SetupError> {
    let (program, args) = argv.split_first().ok_or(SetupError::EmptyCommand)?;

    let mut direct = Command::new(program);
    direct.args(args);
    configure(&mut direct, cwd, env);
    log::debug!("running `{direct:?}`");

    let (status, command_line) = match direct.status() {
        Ok(status) => (status, argv.join(" ")),
        Err(error) => {
            let line = argv.join(" ");
            log::warn!("could not run `{program}` directly ({error}), retrying through the shell");
            let mut shell = shell_command(&line);
            configure(&mut shell, cwd, env);
            let status = shell.status().map_err(|source| SetupError::Spawn {
                command: line.clone(),
                source,
            })?;
            (status, line)
        }
    };
    check_status(status, command_line)
}

/// Apply the working directory and environment shared by both invocation modes.
fn configure(command: &mut Command, cwd: Option<&Path>, env: &[(String, String)]) {
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }
    command.envs(env.iter().map(|(key, value)| (key, value)));
}

/// `sh -c <line>`, or `cmd /C <line>` on Windows.
fn shell_command(line: &str) -> Command {
    let mut command;
    if cfg!(windows) {
        command = Command::new("cmd");
        command.arg("/C");
    } else {
        command = Command::new("sh");
        command.arg("-c");
    }
    command.arg(line);
    command
}

/// Turn an exit status into a result.
fn check_status(status: ExitStatus, command: String) -> Result<(), SetupError> {
    if status.success() {
        Ok(())
    } else {
        Err(SetupError::SubprocessFailure {
            command,
            code: status.code(),
        })
    }
}

/// The directories of a `PATH`-style variable, in search order.
pub fn search_path() -> Vec<PathBuf> {
    std::env::var_os("PATH")
        .map(|path| std::env::split_paths(&path).collect())
        .unwrap_or_default()
}

/// First file called `name` in `dirs`.
pub fn find_in<P: AsRef<Path>>(name: &str, dirs: &[P]) -> Option<PathBuf> {
    dirs.iter()
        .map(|dir| dir.as_ref().join(name))
        .find(|candidate| candidate.is_file())
}

/// First executable called `name` on `PATH`.
pub fn find_on_path(name: &str) -> Option<PathBuf> {
    let dirs = search_path();
    let found = find_in(name, dirs.as_slice()).or_else(|| {
        cfg!(windows)
            .then(|| find_in(&format!("{name}.exe"), dirs.as_slice()))
            .flatten()
    });
    log::trace!("looked for `{name}` on PATH: {found:?}");
    found
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::{scratch_dir, strings};

    #[test_log::test]
    fn empty_command_is_rejected() {
        let error = safe_call(&[], None, &[]).unwrap_err();
        assert!(matches!(error, SetupError::EmptyCommand), "{error:?}");
    }

    #[cfg(unix)]
    #[test_log::test]
    fn successful_command() {
        safe_call(&strings(&["true"]), None, &[]).unwrap();
    }

    #[cfg(unix)]
    #[test_log::test]
    fn non_zero_exit_is_a_failure() {
        let error = safe_call(&strings(&["false"]), None, &[]).unwrap_err();
        assert!(
            matches!(&error, SetupError::SubprocessFailure { command, code: Some(1) } if command == "false"),
            "{error:?}"
        );
    }

    #[cfg(unix)]
    #[test_log::test]
    fn unstartable_command_is_retried_through_the_shell() {
        // No executable is called "exit 0", but the shell understands the joined line.
        safe_call(&strings(&["exit 0"]), None, &[]).unwrap();

        let error = safe_call(&strings(&["exit", "3"]), None, &[]).unwrap_err();
        assert!(
            matches!(&error, SetupError::SubprocessFailure { command, code: Some(3) } if command == "exit 3"),
            "{error:?}"
        );
    }

    #[cfg(unix)]
    #[test_log::test]
    fn missing_program_fails_after_the_retry() {
        let error = safe_call(
            &strings(&["cymetric-setup-no-such-program", "--version"]),
            None,
            &[],
        )
        .unwrap_err();
        assert!(
            matches!(error, SetupError::SubprocessFailure { code: Some(127), .. }),
            "{error:?}"
        );
    }

    #[cfg(unix)]
    #[test_log::test]
    fn environment_and_working_directory_are_applied() {
        let dir = scratch_dir();
        let env = [("HDF5_ROOT".to_owned(), "/opt/hdf5".to_owned())];
        safe_call(
            &strings(&["sh", "-c", "test \"$HDF5_ROOT\" = /opt/hdf5 && touch marker"]),
            Some(dir.path()),
            &env,
        )
        .unwrap();
        assert!(dir.path().join("marker").is_file());
    }

    #[test_log::test]
    fn finds_files_in_search_order() {
        let first = scratch_dir();
        let second = scratch_dir();
        std::fs::write(second.path().join("cmake"), "").unwrap();
        let dirs = [first.path(), second.path()];
        assert_eq!(find_in("cmake", &dirs), Some(second.path().join("cmake")));

        std::fs::write(first.path().join("cmake"), "").unwrap();
        assert_eq!(find_in("cmake", &dirs), Some(first.path().join("cmake")));
        assert_eq!(find_in("make", &dirs), None);
    }
}
