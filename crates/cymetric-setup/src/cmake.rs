//! The `cmake` invocation: base command, presence check and Windows generator choice.

use crate::error::SetupError;
use crate::process;
use std::collections::HashSet;
use std::path::Path;

/// Where `cmake` finds the sources, relative to the build directory.
const SOURCE_DIR: &str = "..";

/// Fail early if the build generator cannot be found.
///
/// Skipped on Windows, where `cmake` is routinely reached through the shell only.
///
/// # Errors
/// [`SetupError::ExternalToolMissing`] if `cmake` is not on `PATH`.
pub fn ensure_installed(cmake: &str) -> Result<(), SetupError> {
    if cfg!(windows) {
        return Ok(());
    }
    if process::find_on_path(cmake).is_none() && !Path::new(cmake).is_file() {
        return Err(SetupError::ExternalToolMissing {
            tool: "CMake".to_owned(),
        });
    }
    Ok(())
}

/// Pick a makefile generator from the names of the files on `PATH`.
///
/// MSVC is CMake's own default, so it needs no flag.
pub fn windows_generator(files_on_path: &HashSet<String>) -> Option<&'static str> {
    if files_on_path.contains("cl.exe") {
        None
    } else if files_on_path.contains("sh.exe") {
        Some("MSYS Makefiles")
    } else if files_on_path.contains("gcc.exe") {
        Some("MinGW Makefiles")
    } else {
        None
    }
}

/// Names of every file in the `PATH` directories.
fn files_on_path() -> HashSet<String> {
    process::search_path()
        .iter()
        .filter_map(|dir| std::fs::read_dir(dir).ok())
        .flat_map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
        })
        .collect()
}

/// The complete `cmake` command line.
pub fn command_line(
    cmake: &str,
    cmake_args: &[String],
    python: &str,
    generator: Option<&str>,
) -> Vec<String> {
    let mut command = vec![cmake.to_owned(), SOURCE_DIR.to_owned()];
    command.extend(cmake_args.iter().cloned());
    command.push(format!("-DPYTHON_EXECUTABLE={python}"));
    if let Some(generator) = generator {
        command.push("-G".to_owned());
        command.push(generator.to_owned());
    }
    command
}

/// [`command_line`] with the generator chosen for the current platform.
pub fn command_line_for_host(cmake: &str, cmake_args: &[String], python: &str) -> Vec<String> {
    let generator = if cfg!(windows) {
        windows_generator(&files_on_path())
    } else {
        None
    };
    command_line(cmake, cmake_args, python, generator)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::strings;

    fn names(files: &[&str]) -> HashSet<String> {
        files.iter().map(|&file| file.to_owned()).collect()
    }

    #[test_log::test]
    fn msvc_wins_over_everything() {
        assert_eq!(
            windows_generator(&names(&["gcc.exe", "sh.exe", "cl.exe"])),
            None
        );
    }

    #[test_log::test]
    fn msys_before_mingw() {
        assert_eq!(
            windows_generator(&names(&["gcc.exe", "sh.exe"])),
            Some("MSYS Makefiles")
        );
        assert_eq!(
            windows_generator(&names(&["gcc.exe"])),
            Some("MinGW Makefiles")
        );
        assert_eq!(windows_generator(&names(&["notepad.exe"])), None);
    }

    #[test_log::test]
    fn routed_args_follow_the_source_dir() {
        let command = command_line(
            "cmake",
            &strings(&["-DA=1", "-DCMAKE_BUILD_TYPE=Release"]),
            "/usr/bin/python3",
            None,
        );
        assert_eq!(
            command,
            [
                "cmake",
                "..",
                "-DA=1",
                "-DCMAKE_BUILD_TYPE=Release",
                "-DPYTHON_EXECUTABLE=/usr/bin/python3"
            ]
        );
    }

    #[test_log::test]
    fn generator_goes_last() {
        let command = command_line("cmake", &[], "python", Some("MinGW Makefiles"));
        assert_eq!(
            command,
            [
                "cmake",
                "..",
                "-DPYTHON_EXECUTABLE=python",
                "-G",
                "MinGW Makefiles"
            ]
        );
    }

    #[cfg(unix)]
    #[test_log::test]
    fn missing_cmake_is_reported() {
        let error = ensure_installed("cymetric-setup-no-such-cmake").unwrap_err();
        assert!(
            matches!(&error, SetupError::ExternalToolMissing { tool } if tool == "CMake"),
            "{error:?}"
        );
    }

    #[cfg(unix)]
    #[test_log::test]
    fn present_tool_passes() {
        ensure_installed("sh").unwrap();
    }
}
