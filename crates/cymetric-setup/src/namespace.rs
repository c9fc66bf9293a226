//! Matching raw command line tokens against the schema.

use crate::error::SetupError;
use crate::schema::{self, Arity, Destination, FlagId, FlagSpec, SCHEMA};
use clap::error::{ContextKind, ContextValue, ErrorKind};
use std::collections::BTreeMap;

/// A parsed flag value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A toggle that was set.
    Set,
    /// A single value.
    Text(String),
    /// Every occurrence of a repeatable flag, first to last.
    List(Vec<String>),
}

/// The result of matching one command line against [`SCHEMA`].
///
/// Only flags that were actually given are present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    /// The sub-command.
    command: String,
    /// Everything else that was given.
    values: BTreeMap<FlagId, Value>,
}

impl Namespace {
    /// Parse the tokens following the program name.
    ///
    /// Bare `--` tokens are dropped first; older invocations put one between the sub-command
    /// and its flags.
    pub fn parse<I, S>(tokens: I) -> Result<Self, SetupError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv = core::iter::once(String::from("cymetric-setup"))
            .chain(tokens.into_iter().map(Into::into).filter(|token| token != "--"))
            .collect::<Vec<_>>();
        log::trace!("matching tokens: {argv:?}");

        let matches = schema::command()
            .try_get_matches_from(argv)
            .map_err(classify_clap_error)?;

        let mut command = None;
        let mut values = BTreeMap::new();
        for spec in SCHEMA {
            let id = spec.id.as_str();
            let value = match spec.arity {
                Arity::Positional | Arity::Value => {
                    matches.get_one::<String>(id).cloned().map(Value::Text)
                }
                Arity::Toggle => matches.get_flag(id).then_some(Value::Set),
                Arity::Repeated => matches
                    .get_many::<String>(id)
                    .map(|occurrences| Value::List(occurrences.cloned().collect())),
            };
            match (spec.id, value) {
                (FlagId::Command, Some(Value::Text(text))) => command = Some(text),
                (_, Some(value)) => {
                    values.insert(spec.id, value);
                }
                (_, None) => {}
            }
        }

        let namespace = Self {
            command: command.ok_or(SetupError::MissingPositionalArgument)?,
            values,
        };
        log::debug!("parsed {namespace:?}");
        Ok(namespace)
    }

    /// The sub-command, e.g. `install`.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Whether a toggle was set.
    pub fn is_set(&self, id: FlagId) -> bool {
        self.values.contains_key(&id)
    }

    /// A single-valued flag.
    pub fn text(&self, id: FlagId) -> Option<&str> {
        match self.values.get(&id) {
            Some(Value::Text(text)) => Some(text),
            Some(Value::Set | Value::List(_)) | None => None,
        }
    }

    /// Occurrences of a repeatable flag, empty if it was never given.
    pub fn list(&self, id: FlagId) -> &[String] {
        match self.values.get(&id) {
            Some(Value::List(items)) => items,
            Some(Value::Set | Value::Text(_)) | None => &[],
        }
    }

    /// The flags `destination` reads that were given, in schema order.
    pub fn routed(
        &self,
        destination: Destination,
    ) -> impl Iterator<Item = (&'static FlagSpec, &Value)> + '_ {
        schema::flags_for(destination)
            .filter_map(|spec| self.values.get(&spec.id).map(|value| (spec, value)))
    }
}

/// Map `clap`'s failures onto our own taxonomy where one exists.
#[expect(clippy::wildcard_enum_match_arm, reason = "clap has many error kinds")]
fn classify_clap_error(error: clap::Error) -> SetupError {
    match error.kind() {
        ErrorKind::MissingRequiredArgument => SetupError::MissingPositionalArgument,
        ErrorKind::UnknownArgument => {
            let token = match error.get(ContextKind::InvalidArg) {
                Some(ContextValue::String(token)) => Some(token.clone()),
                _ => None,
            };
            match token {
                Some(token) => SetupError::UnrecognizedArgument { token },
                None => SetupError::Cli(error),
            }
        }
        _ => SetupError::Cli(error),
    }
}
