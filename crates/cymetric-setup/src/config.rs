//! Optional per-project settings, read from `cymetric-setup.toml` next to the sources.
//!
//! ```toml
//! build_dir = "build"
//! cmake = "cmake"
//! make = "make"
//! python = "python3"
//! packaging_script = "setup.py"
//! ```

use anyhow::Context as _;
use std::path::{Path, PathBuf};

/// Name of the settings file in the project root.
pub const CONFIG_FILE: &str = "cymetric-setup.toml";

/// Tool names and locations used by the build.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Build directory, relative to the project root.
    pub build_dir: PathBuf,
    /// The build generator.
    pub cmake: String,
    /// The build tool.
    pub make: String,
    /// Interpreter for the packaging step, also handed to CMake as `PYTHON_EXECUTABLE`.
    pub python: String,
    /// Packaging script, relative to the project root.
    pub packaging_script: PathBuf,
}

impl Default for Config {
    #[inline]
    fn default() -> Self {
        Self {
            build_dir: PathBuf::from("build"),
            cmake: "cmake".to_owned(),
            make: "make".to_owned(),
            python: "python3".to_owned(),
            packaging_script: PathBuf::from("setup.py"),
        }
    }
}

impl Config {
    /// Load the settings of the project at `root`, or the defaults if it has none.
    ///
    /// # Errors
    /// If the file exists but cannot be read or parsed.
    pub fn load(root: &Path) -> anyhow::Result<Self> {
        let path = root.join(CONFIG_FILE);
        if !path.is_file() {
            log::debug!("no '{}', using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config file '{}'", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("parsing config file '{}'", path.display()))?;
        log::debug!("loaded {config:#?} from '{}'", path.display());
        Ok(config)
    }
}
