//! Error taxonomy and the outcome channel
//!
//! Internally everything unusual is an [`Error`]: a kind plus the values
//! needed to phrase it. Messages are rendered late, through the phrase
//! table of [`ErrorConfig`], so callers can reword any message without
//! touching parsing logic. The public outcome channel is [`ParseFailure`],
//! which also carries the non-error terminations: help, version and
//! completion candidates are results the caller is expected to print, not
//! failures of the parse.

use std::collections::BTreeMap;

use crate::csi::{Color, Style};
use crate::term::TermString;

/// Everything that can go wrong, by kind
///
/// Schema kinds are fatal at construction or during the deep validation
/// pass; parse kinds terminate a parse; value kinds are shared by both,
/// defaults and examples run through the same normalization pipeline as
/// parsed parameters.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum ErrorKind {
    // schema
    EmptyPositionalMarker,
    InvalidOptionName,
    OptionRequiresItself,
    UnknownRequiredOption,
    NiladicOptionRequiredValue,
    OptionZeroEnum,
    DuplicateOptionName,
    DuplicatePositionalOption,
    DuplicateStringEnum,
    DuplicateNumberEnum,
    OptionValueIncompatible,
    OptionEmptyVersion,
    // parse
    UnknownOption,
    UnknownOptionWithSimilar,
    ParseError,
    ParseErrorWithSimilar,
    MissingParameter,
    MissingRequiredOption,
    OptionRequires,
    OptionInlineValue,
    PositionalInlineValue,
    MissingManifest,
    // value constraints
    StringEnums,
    StringRegex,
    NumberEnums,
    NumberRange,
    ArrayLimit,
}

fn default_phrase(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::EmptyPositionalMarker => "Option %o contains an empty positional marker.",
        ErrorKind::InvalidOptionName => "Invalid option name %o.",
        ErrorKind::OptionRequiresItself => "Option %o requires itself.",
        ErrorKind::UnknownRequiredOption => "Unknown option %o in requirement.",
        ErrorKind::NiladicOptionRequiredValue => "Required option %o does not accept values.",
        ErrorKind::OptionZeroEnum => "Option %o has zero enum values.",
        ErrorKind::DuplicateOptionName => "Duplicate option name %o.",
        ErrorKind::DuplicatePositionalOption => "Duplicate positional option %o.",
        ErrorKind::DuplicateStringEnum => "Option %o has duplicate enum %s2.",
        ErrorKind::DuplicateNumberEnum => "Option %o has duplicate enum %n2.",
        ErrorKind::OptionValueIncompatible => {
            "Option %o has incompatible value %t2. Should be of type %s3."
        }
        ErrorKind::OptionEmptyVersion => "Option %o contains an empty version.",
        ErrorKind::UnknownOption => "Unknown option %o.",
        ErrorKind::UnknownOptionWithSimilar => "Unknown option %o. Similar names are: %t2.",
        ErrorKind::ParseError => "%t",
        ErrorKind::ParseErrorWithSimilar => "%t Similar names are: %t2.",
        ErrorKind::MissingParameter => "Missing parameter to %o.",
        ErrorKind::MissingRequiredOption => "Option %o is required.",
        ErrorKind::OptionRequires => "Option %o requires %t2.",
        ErrorKind::OptionInlineValue => "Option %o does not accept inline values.",
        ErrorKind::PositionalInlineValue => "Positional marker %o does not accept inline values.",
        ErrorKind::MissingManifest => "Could not find a Cargo.toml manifest to resolve %o.",
        ErrorKind::StringEnums => "Invalid parameter to %o: %s2. Possible values are: %t3.",
        ErrorKind::StringRegex => "Invalid parameter to %o: %s2. Value must match the regex %r3.",
        ErrorKind::NumberEnums => "Invalid parameter to %o: %n2. Possible values are: %t3.",
        ErrorKind::NumberRange => {
            "Invalid parameter to %o: %n2. Value must be in the range [%n3, %n4]."
        }
        ErrorKind::ArrayLimit => "Option %o has too many values (%n2). Should have at most %n3.",
    }
}

/// One phrase argument, already typed for its formatter
#[derive(Debug, Clone)]
pub(crate) enum FmtArg {
    Bool(bool),
    Str(String),
    Num(f64),
    Regex(String),
    OptName(String),
    Param(String),
    Url(String),
    Term(TermString),
    StrList(Vec<String>),
    NumList(Vec<f64>),
    Value(crate::opts::Value),
}

/// Numbers print without a decimal point when they are whole
pub(crate) fn format_num(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Styles used when phrasing messages
#[derive(Debug, Clone)]
pub struct MsgStyles {
    pub boolean: Style,
    pub string: Style,
    pub number: Style,
    pub regex: Style,
    pub option: Style,
    pub param: Style,
    pub url: Style,
    /// emitted after every styled fragment
    pub revert: Style,
}

impl Default for MsgStyles {
    fn default() -> Self {
        MsgStyles {
            boolean: Style::new().fg(Color::Yellow),
            string: Style::new().fg(Color::Green),
            number: Style::new().fg(Color::Yellow),
            regex: Style::new().fg(Color::Red),
            option: Style::new().bold(),
            param: Style::new().underline(),
            url: Style::new().fg(Color::Cyan),
            revert: Style::reset(),
        }
    }
}

impl MsgStyles {
    pub(crate) fn push_arg(&self, arg: &FmtArg, out: &mut TermString) {
        match arg {
            FmtArg::Bool(b) => {
                out.styled(&self.boolean, if *b { "true" } else { "false" }, &self.revert);
            }
            FmtArg::Str(s) => out.styled(&self.string, &format!("'{}'", s), &self.revert),
            FmtArg::Num(n) => out.styled(&self.number, &format_num(*n), &self.revert),
            FmtArg::Regex(r) => out.styled(&self.regex, r, &self.revert),
            FmtArg::OptName(n) => out.styled(&self.option, n, &self.revert),
            FmtArg::Param(p) => out.styled(&self.param, p, &self.revert),
            FmtArg::Url(u) => out.styled(&self.url, u, &self.revert),
            FmtArg::Term(t) => out.append(t),
            FmtArg::StrList(xs) => {
                for (ix, x) in xs.iter().enumerate() {
                    if ix != 0 {
                        out.push_str(",");
                    }
                    out.styled(&self.string, &format!("'{}'", x), &self.revert);
                }
            }
            FmtArg::NumList(xs) => {
                for (ix, x) in xs.iter().enumerate() {
                    if ix != 0 {
                        out.push_str(",");
                    }
                    out.styled(&self.number, &format_num(*x), &self.revert);
                }
            }
            FmtArg::Value(v) => self.push_value(v, out),
        }
    }

    pub(crate) fn push_value(&self, value: &crate::opts::Value, out: &mut TermString) {
        use crate::opts::Value;
        match value {
            Value::Bool(b) => self.push_arg(&FmtArg::Bool(*b), out),
            Value::Str(s) => self.push_arg(&FmtArg::Str(s.clone()), out),
            Value::Num(n) => self.push_arg(&FmtArg::Num(*n), out),
            Value::StrArray(xs) => self.push_arg(&FmtArg::StrList(xs.clone()), out),
            Value::NumArray(xs) => self.push_arg(&FmtArg::NumList(xs.clone()), out),
        }
    }
}

/// Message configuration: phrase overrides plus fragment styles
#[derive(Debug, Clone, Default)]
pub struct ErrorConfig {
    pub phrases: BTreeMap<ErrorKind, String>,
    pub styles: MsgStyles,
}

impl ErrorConfig {
    pub(crate) fn phrase(&self, kind: ErrorKind) -> &str {
        self.phrases
            .get(&kind)
            .map(String::as_str)
            .unwrap_or_else(|| default_phrase(kind))
    }
}

/// Fill a phrase's format specifiers from a positional argument list
///
/// A bare `%x` takes the next argument, an indexed `%x2` takes that one;
/// the code letter is advisory, the argument knows its own formatter.
pub(crate) fn render_phrase(
    phrase: &str,
    alt: usize,
    args: &[FmtArg],
    styles: &MsgStyles,
    out: &mut TermString,
) {
    let mut next = 0usize;
    out.split_phrase(phrase, alt, &mut |spec, out| {
        let ix = spec.index.unwrap_or_else(|| {
            next += 1;
            next
        });
        if let Some(arg) = args.get(ix - 1) {
            styles.push_arg(arg, out);
        }
    });
}

/// Internal error representation, rendered on the way out
#[derive(Debug, Clone)]
pub(crate) struct Error {
    pub(crate) kind: ErrorKind,
    pub(crate) args: Vec<FmtArg>,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, args: Vec<FmtArg>) -> Self {
        Error { kind, args }
    }

    pub(crate) fn render(&self, config: &ErrorConfig) -> TermString {
        let mut out = TermString::new();
        render_phrase(config.phrase(self.kind), 0, &self.args, &config.styles, &mut out);
        out
    }

    pub(crate) fn into_failure(self, config: &ErrorConfig) -> ParseFailure {
        ParseFailure::Stderr(self.render(config))
    }
}

/// Outcome of an unsuccessful (or short-circuited) parse
///
/// `Stdout` carries help or version output and means success from the
/// process point of view; `Completion` must be printed to stdout unchanged,
/// shell completion relies on that; `Stderr` is a genuine parse error.
#[derive(Debug, Clone)]
pub enum ParseFailure {
    Stdout(TermString),
    Completion(String),
    Stderr(TermString),
}

impl ParseFailure {
    /// Returns the contained `stderr` message - for unit tests
    ///
    /// # Panics
    ///
    /// Panics if the failure is not `Stderr`
    #[allow(clippy::must_use_candidate)]
    #[track_caller]
    pub fn unwrap_stderr(self) -> String {
        match self {
            Self::Stderr(msg) => msg.plain(),
            Self::Stdout(..) | Self::Completion(..) => panic!("not an stderr: {:?}", self),
        }
    }

    /// Returns the contained `stdout` message - for unit tests
    ///
    /// # Panics
    ///
    /// Panics if the failure is `Stderr`
    #[allow(clippy::must_use_candidate)]
    #[track_caller]
    pub fn unwrap_stdout(self) -> String {
        match self {
            Self::Stdout(msg) => msg.plain(),
            Self::Completion(s) => s,
            Self::Stderr(..) => panic!("not an stdout: {:?}", self),
        }
    }

    /// Exit code appropriate for the failure
    #[allow(clippy::must_use_candidate)]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Stdout(..) | Self::Completion(..) => 0,
            Self::Stderr(..) => 1,
        }
    }

    /// Prints to stdout or stderr as appropriate, with styles when the
    /// stream supports them
    pub fn print_message(&self) {
        use supports_color::{on, Stream};
        match self {
            ParseFailure::Stdout(msg) => {
                if on(Stream::Stdout).is_some() {
                    println!("{}", msg.ansi());
                } else {
                    println!("{}", msg.plain());
                }
            }
            ParseFailure::Completion(s) => {
                print!("{}", s);
            }
            ParseFailure::Stderr(msg) => {
                if on(Stream::Stderr).is_some() {
                    let style = Style::new().bold().fg(Color::Red);
                    eprintln!("{}Error:{} {}", style, Style::reset(), msg.ansi());
                } else {
                    eprintln!("Error: {}", msg.plain());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phrases_fill_positional_arguments() {
        let config = ErrorConfig::default();
        let err = Error::new(
            ErrorKind::NumberRange,
            vec![
                FmtArg::OptName("-n".into()),
                FmtArg::Num(11.0),
                FmtArg::Num(0.0),
                FmtArg::Num(10.0),
            ],
        );
        assert_eq!(
            err.render(&config).plain(),
            "Invalid parameter to -n: 11. Value must be in the range [0, 10]."
        );
    }

    #[test]
    fn phrase_overrides_take_precedence() {
        let mut config = ErrorConfig::default();
        config
            .phrases
            .insert(ErrorKind::UnknownOption, "No such option: %o.".to_string());
        let err = Error::new(ErrorKind::UnknownOption, vec![FmtArg::OptName("--x".into())]);
        assert_eq!(err.render(&config).plain(), "No such option: --x.");
    }

    #[test]
    fn whole_numbers_print_without_fraction() {
        assert_eq!(format_num(3.0), "3");
        assert_eq!(format_num(3.7), "3.7");
        assert_eq!(format_num(-2.0), "-2");
    }
}
