#![doc = include_str!("../README.md")]

mod args;
mod complete;
pub mod csi;
mod error;
mod help;
mod norm;
mod opts;
mod parse;
mod requires;
mod term;
mod validate;
mod version;
mod youmean;

#[cfg(feature = "config-import")]
pub mod config;

pub use crate::args::Args;
pub use crate::csi::Style;
pub use crate::error::{ErrorConfig, ErrorKind, MsgStyles, ParseFailure};
pub use crate::help::{ColumnConfig, HelpConfig, HelpFormatter, HelpItem};
pub use crate::opts::{
    ArraySpec, CaseFold, CommandCb, CompleteCb, DefaultCb, DefaultValue, FunctionCb, Kind,
    NumCheck, Opt, OptStyles, OptValues, ParseCb, ParseDelimitedCb, Positional, ResolveCb, Round,
    Separator, StrCheck, ValSpec, Value,
};
pub use crate::parse::Parser;
pub use crate::requires::Requires;
pub use crate::term::{FmtSpec, TermString};

/// Schema shorthand: keyed option definitions in declaration order
pub type Opts = Vec<(String, Opt)>;

/// Build the keyed schema vector without the `to_string` noise
///
/// ```ignore
/// let parser = Parser::new(schema([
///     ("all", Opt::flag(&["-a", "--all"])),
///     ("name", Opt::string(&["-n"]).required()),
/// ]))?;
/// ```
pub fn schema<const N: usize>(opts: [(&str, Opt); N]) -> Opts {
    opts.into_iter()
        .map(|(key, opt)| (key.to_string(), opt))
        .collect()
}
