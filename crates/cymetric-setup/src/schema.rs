//! The fixed argument schema.
//!
//! Every flag is declared exactly once in [`SCHEMA`], together with the set of destinations
//! that read it. Projections walk the schema in declaration order, so the order of entries
//! here is also the order in which tokens are emitted.

use clap::{Arg, ArgAction};

/// A consumer of routed arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    /// The native packaging step, which receives a rewritten argument vector.
    Setup,
    /// The build generator, `cmake`.
    Cmake,
    /// The build tool, `make`.
    Make,
    /// Environment handed to every spawned process.
    Other,
}

/// The help section a flag is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    /// Normal setup arguments.
    Setup,
    /// CMake arguments.
    Cmake,
    /// Make arguments.
    Make,
    /// Miscellaneous arguments, typically feeding several destinations.
    Other,
}

impl Group {
    /// Heading used in `--help`.
    pub const fn heading(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Cmake => "cmake",
            Self::Make => "make",
            Self::Other => "other",
        }
    }
}

/// How many tokens a flag consumes and how repeated occurrences are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// The single required positional token.
    Positional,
    /// A boolean switch.
    Toggle,
    /// Takes one value; appears at most once.
    Value,
    /// Takes one value per occurrence; occurrences accumulate in order.
    Repeated,
}

/// Identity of every entry in the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FlagId {
    /// `cmd`
    Command,
    /// `--clean`
    Clean,
    /// `--user`
    User,
    /// `-D`
    Define,
    /// `--build-type`
    BuildType,
    /// `--prefix`
    Prefix,
    /// `--egg-base`
    EggBase,
    /// `-j`
    Jobs,
    /// `--hdf5`
    Hdf5,
    /// `--moab`
    Moab,
}

impl FlagId {
    /// The id clap stores matches under.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Command => "cmd",
            Self::Clean => "clean",
            Self::User => "user",
            Self::Define => "D",
            Self::BuildType => "build_type",
            Self::Prefix => "prefix",
            Self::EggBase => "egg_base",
            Self::Jobs => "j",
            Self::Hdf5 => "hdf5",
            Self::Moab => "moab",
        }
    }
}

/// How a flag is spelled on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spelling {
    /// No dashes; matched by position.
    Positional,
    /// `--name`
    Long(&'static str),
    /// `-c`
    Short(char),
}

/// One schema entry.
#[derive(Debug, Clone, Copy)]
pub struct FlagSpec {
    /// Identity.
    pub id: FlagId,
    /// Command line spelling.
    pub spelling: Spelling,
    /// Token consumption.
    pub arity: Arity,
    /// Placeholder for the value in help output.
    pub value_name: Option<&'static str>,
    /// Help section.
    pub group: Group,
    /// Every projection that reads this flag.
    pub destinations: &'static [Destination],
    /// One line of help.
    pub help: &'static str,
}

impl FlagSpec {
    /// Whether `destination` reads this flag.
    pub fn feeds(&self, destination: Destination) -> bool {
        self.destinations.contains(&destination)
    }

    /// The matching `clap` argument.
    pub fn to_arg(&self) -> Arg {
        let mut arg = Arg::new(self.id.as_str())
            .help(self.help)
            .help_heading(self.group.heading());
        arg = match self.spelling {
            Spelling::Positional => arg,
            Spelling::Long(long) => arg.long(long),
            Spelling::Short(short) => arg.short(short),
        };
        arg = match self.arity {
            Arity::Positional => arg.required(true).action(ArgAction::Set),
            // Repeats are accepted; the last occurrence wins.
            Arity::Toggle => arg
                .action(ArgAction::SetTrue)
                .overrides_with(self.id.as_str()),
            Arity::Value => arg
                .action(ArgAction::Set)
                .overrides_with(self.id.as_str()),
            Arity::Repeated => arg.action(ArgAction::Append),
        };
        if self.arity != Arity::Toggle {
            arg = arg.value_parser(clap::value_parser!(String));
        }
        if let Some(value_name) = self.value_name {
            arg = arg.value_name(value_name);
        }
        arg
    }
}

/// The argument schema, in emission order.
pub const SCHEMA: &[FlagSpec] = &[
    FlagSpec {
        id: FlagId::Command,
        spelling: Spelling::Positional,
        arity: Arity::Positional,
        value_name: Some("CMD"),
        group: Group::Setup,
        destinations: &[Destination::Setup],
        help: "command to send to normal setup, e.g. install or build.",
    },
    FlagSpec {
        id: FlagId::Clean,
        spelling: Spelling::Long("clean"),
        arity: Arity::Toggle,
        value_name: None,
        group: Group::Setup,
        destinations: &[Destination::Setup],
        help: "Remove the build directory before building.",
    },
    FlagSpec {
        id: FlagId::User,
        spelling: Spelling::Long("user"),
        arity: Arity::Toggle,
        value_name: None,
        group: Group::Setup,
        destinations: &[Destination::Setup],
        help: "Install into the user site directory.",
    },
    FlagSpec {
        id: FlagId::Define,
        spelling: Spelling::Short('D'),
        arity: Arity::Repeated,
        value_name: Some("VAR"),
        group: Group::Cmake,
        destinations: &[Destination::Cmake],
        help: "Set a CMake cache variable, may be repeated.",
    },
    FlagSpec {
        id: FlagId::BuildType,
        spelling: Spelling::Long("build-type"),
        arity: Arity::Value,
        value_name: Some("BT"),
        group: Group::Cmake,
        destinations: &[Destination::Cmake],
        help: "Set build type via CMAKE_BUILD_TYPE, e.g. Release or Debug.",
    },
    FlagSpec {
        id: FlagId::Prefix,
        spelling: Spelling::Long("prefix"),
        arity: Arity::Value,
        value_name: Some("PREFIX"),
        group: Group::Other,
        destinations: &[Destination::Setup, Destination::Cmake],
        help: "Prefix for install location.",
    },
    FlagSpec {
        id: FlagId::EggBase,
        spelling: Spelling::Long("egg-base"),
        arity: Arity::Value,
        value_name: Some("EGG_BASE"),
        group: Group::Setup,
        destinations: &[Destination::Setup],
        help: "Directory for egg metadata, relative to this program's directory.",
    },
    FlagSpec {
        id: FlagId::Jobs,
        spelling: Spelling::Short('j'),
        arity: Arity::Value,
        value_name: Some("J"),
        group: Group::Make,
        destinations: &[Destination::Make],
        help: "Degree of parallelism for build.",
    },
    FlagSpec {
        id: FlagId::Hdf5,
        spelling: Spelling::Long("hdf5"),
        arity: Arity::Value,
        value_name: Some("HDF5"),
        group: Group::Other,
        destinations: &[Destination::Other],
        help: "Path to HDF5 root directory.",
    },
    FlagSpec {
        id: FlagId::Moab,
        spelling: Spelling::Long("moab"),
        arity: Arity::Value,
        value_name: Some("MOAB"),
        group: Group::Other,
        destinations: &[Destination::Other],
        help: "Path to MOAB root directory.",
    },
];

/// Every schema entry read by `destination`, in emission order.
pub fn flags_for(destination: Destination) -> impl Iterator<Item = &'static FlagSpec> {
    SCHEMA.iter().filter(move |spec| spec.feeds(destination))
}

/// Builds the `clap` command that matches raw tokens against [`SCHEMA`].
pub fn command() -> clap::Command {
    SCHEMA.iter().fold(
        clap::Command::new("cymetric-setup")
            .about("Routes one command line to CMake, make and the Python packaging step.")
            .version(env!("CARGO_PKG_VERSION")),
        |command, spec| command.arg(spec.to_arg()),
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashSet;

    #[test_log::test]
    fn clap_command_is_well_formed() {
        command().debug_assert();
    }

    #[test_log::test]
    fn every_flag_is_declared_once() {
        let ids = SCHEMA.iter().map(|spec| spec.id).collect::<HashSet<_>>();
        assert_eq!(ids.len(), SCHEMA.len());
    }

    #[test_log::test]
    fn exactly_one_positional() {
        let positionals = SCHEMA
            .iter()
            .filter(|spec| spec.arity == Arity::Positional)
            .count();
        assert_eq!(positionals, 1);
    }

    #[test_log::test]
    fn prefix_feeds_setup_and_cmake() {
        let setup = flags_for(Destination::Setup)
            .map(|spec| spec.id)
            .collect::<Vec<_>>();
        assert_eq!(
            setup,
            [
                FlagId::Command,
                FlagId::Clean,
                FlagId::User,
                FlagId::Prefix,
                FlagId::EggBase
            ]
        );

        let cmake = flags_for(Destination::Cmake)
            .map(|spec| spec.id)
            .collect::<Vec<_>>();
        assert_eq!(cmake, [FlagId::Define, FlagId::BuildType, FlagId::Prefix]);
    }

    #[test_log::test]
    fn every_flag_has_a_destination() {
        assert!(SCHEMA.iter().all(|spec| !spec.destinations.is_empty()));
    }
}
