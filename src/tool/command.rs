//! External tool command lines built from nested argument groups

use std::fmt;
use std::path::{Path, PathBuf};

/// A command line argument, or a group of arguments kept together at the
/// call site
///
/// Groups exist only for construction; they are flattened left to right
/// before the command runs. Strings are always atomic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Leaf(String),
    Group(Vec<Arg>),
}

impl Arg {
    /// Build a group from anything convertible into arguments
    pub fn group<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Arg>,
    {
        Self::Group(items.into_iter().map(Into::into).collect())
    }

    fn flatten_into(&self, out: &mut Vec<String>) {
        match self {
            Self::Leaf(token) => out.push(token.clone()),
            Self::Group(items) => {
                for item in items {
                    item.flatten_into(out);
                }
            }
        }
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Self::Leaf(value.to_string())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Self::Leaf(value)
    }
}

impl From<&String> for Arg {
    fn from(value: &String) -> Self {
        Self::Leaf(value.clone())
    }
}

impl From<&Path> for Arg {
    fn from(value: &Path) -> Self {
        Self::Leaf(value.to_string_lossy().into_owned())
    }
}

impl From<PathBuf> for Arg {
    fn from(value: PathBuf) -> Self {
        Self::from(value.as_path())
    }
}

impl From<&PathBuf> for Arg {
    fn from(value: &PathBuf) -> Self {
        Self::from(value.as_path())
    }
}

impl From<Vec<Arg>> for Arg {
    fn from(value: Vec<Arg>) -> Self {
        Self::Group(value)
    }
}

/// Flatten nested arguments into their token sequence
pub fn flatten(args: &[Arg]) -> Vec<String> {
    let mut out = Vec::new();
    for arg in args {
        arg.flatten_into(&mut out);
    }
    out
}

/// An executable plus its (possibly nested) arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<Arg>,
}

impl ToolCommand {
    /// Start a command for `program`
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append an argument or argument group
    pub fn arg(mut self, arg: impl Into<Arg>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append each item as its own argument
    pub fn args<I, T>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Arg>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The executable to run
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Flattened argument tokens, excluding the program
    pub fn argv(&self) -> Vec<String> {
        flatten(&self.args)
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for token in self.argv() {
            write!(f, " {}", token)?;
        }
        Ok(())
    }
}
