//! Everything that can abort a `cymetric-setup` invocation.

use std::path::PathBuf;

/// Fatal errors raised while routing arguments or driving the external build tools.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SetupError {
    /// No sub-command (`install`, `build`, `clean`, ...) was given.
    #[error("missing the sub-command to send to setup, e.g. `install` or `build`")]
    MissingPositionalArgument,

    /// A token that matches nothing in the argument schema.
    #[error("unrecognized argument: {token}")]
    UnrecognizedArgument {
        /// The offending token, as typed.
        token: String,
    },

    /// `--build-type` was not one of the CMake build types.
    #[error(
        "unknown build type `{given}`, expected one of: None, Debug, Release, RelWithDebInfo, MinSizeRel"
    )]
    UnknownBuildType {
        /// The value passed to `--build-type`.
        given: String,
    },

    /// A required external program is not on the search path.
    #[error("{tool} is not installed, aborting build.")]
    ExternalToolMissing {
        /// Name of the missing program.
        tool: String,
    },

    /// An external program ran but exited unsuccessfully.
    #[error("`{command}` failed with {}", describe_code(.code))]
    SubprocessFailure {
        /// The command line that was run.
        command: String,
        /// Its exit code, `None` when terminated by a signal.
        code: Option<i32>,
    },

    /// Neither the direct nor the shell invocation could be started.
    #[error("could not start `{command}`")]
    Spawn {
        /// The command line that was attempted.
        command: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// A subprocess was requested with an empty argument vector.
    #[error("refusing to run an empty command")]
    EmptyCommand,

    /// Removing the build directory failed.
    #[error("could not remove build directory '{}'", .path.display())]
    Clean {
        /// The directory being removed.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// Any other outcome of command line matching, including `--help` and `--version`.
    #[error(transparent)]
    Cli(#[from] clap::Error),
}

/// Human readable exit code.
#[expect(clippy::ref_option, reason = "called from the `thiserror` format arguments")]
fn describe_code(code: &Option<i32>) -> String {
    code.map_or_else(
        || "no exit code (terminated by a signal)".to_owned(),
        |value| format!("exit code {value}"),
    )
}

#[cfg(test)]
mod test {
    use super::*;

    #[test_log::test]
    fn subprocess_failure_reports_the_exit_code() {
        let error = SetupError::SubprocessFailure {
            command: "make -j4".to_owned(),
            code: Some(2),
        };
        assert_eq!(error.to_string(), "`make -j4` failed with exit code 2");

        let signalled = SetupError::SubprocessFailure {
            command: "make".to_owned(),
            code: None,
        };
        assert!(signalled.to_string().contains("terminated by a signal"));
    }

    #[test_log::test]
    fn missing_tool_message_matches_the_build_abort() {
        let error = SetupError::ExternalToolMissing {
            tool: "CMake".to_owned(),
        };
        assert_eq!(error.to_string(), "CMake is not installed, aborting build.");
    }
}
