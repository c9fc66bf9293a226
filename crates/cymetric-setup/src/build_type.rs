//! CMake build types accepted by `--build-type`.

use crate::error::SetupError;

/// A value for `CMAKE_BUILD_TYPE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildType {
    /// No optimisation flags from CMake.
    None,
    /// `-g`
    Debug,
    /// Optimised, no debug info.
    Release,
    /// Optimised with debug info.
    RelWithDebInfo,
    /// Optimised for size.
    MinSizeRel,
}

impl BuildType {
    /// All build types, keyed by their lowercase spelling.
    const ALL: [(&'static str, Self); 5] = [
        ("none", Self::None),
        ("debug", Self::Debug),
        ("release", Self::Release),
        ("relwithdebinfo", Self::RelWithDebInfo),
        ("minsizerel", Self::MinSizeRel),
    ];

    /// The canonical spelling CMake expects.
    pub const fn as_cmake(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Debug => "Debug",
            Self::Release => "Release",
            Self::RelWithDebInfo => "RelWithDebInfo",
            Self::MinSizeRel => "MinSizeRel",
        }
    }
}

impl core::str::FromStr for BuildType {
    type Err = SetupError;

    /// Matches case-insensitively.
    fn from_str(given: &str) -> Result<Self, Self::Err> {
        let key = given.to_lowercase();
        Self::ALL
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, build_type)| *build_type)
            .ok_or_else(|| SetupError::UnknownBuildType {
                given: given.to_owned(),
            })
    }
}

impl core::fmt::Display for BuildType {
    #[expect(
        clippy::min_ident_chars,
        reason = "It's a core library trait implementation"
    )]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_cmake())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test_log::test]
    fn resolves_any_case() {
        for (given, expected) in [
            ("release", "Release"),
            ("RELEASE", "Release"),
            ("Debug", "Debug"),
            ("relWithDebInfo", "RelWithDebInfo"),
            ("MinSizeRel", "MinSizeRel"),
            ("NONE", "None"),
        ] {
            let build_type: BuildType = given.parse().unwrap();
            assert_eq!(build_type.as_cmake(), expected);
        }
    }

    #[test_log::test]
    fn rejects_unknown_names() {
        for given in ["", "fast", "release ", "Rel-With-Deb-Info"] {
            let error = given.parse::<BuildType>().unwrap_err();
            assert!(
                matches!(&error, SetupError::UnknownBuildType { given: name } if name == given),
                "{error:?}"
            );
        }
    }
}
