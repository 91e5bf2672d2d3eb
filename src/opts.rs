//! Option schema
//!
//! An [`Opt`] is a shared header plus a [`Kind`] tag. The header covers
//! naming, help and requirement concerns common to every option; the kind
//! carries everything specific to how the option consumes the command line.
//! Schemas are plain data with `Rc`-shared callbacks, constructed once and
//! immutable afterwards.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::rc::Rc;

use regex::Regex;

use crate::csi::Style;
use crate::requires::Requires;

/// A parsed option value
///
/// Array kinds always normalize into the matching array variant, even when
/// a single element was consumed.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Str(String),
    Num(f64),
    StrArray(Vec<String>),
    NumArray(Vec<f64>),
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Num(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Num(value as f64)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Value::StrArray(value)
    }
}

impl From<&[&str]> for Value {
    fn from(value: &[&str]) -> Self {
        Value::StrArray(value.iter().map(|s| s.to_string()).collect())
    }
}

impl From<Vec<f64>> for Value {
    fn from(value: Vec<f64>) -> Self {
        Value::NumArray(value)
    }
}

/// Values record produced by one parse
///
/// Every key of the schema is present; `None` marks a value that was
/// neither specified nor defaulted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptValues(pub BTreeMap<String, Option<Value>>);

impl OptValues {
    /// Value for a key, `None` when unset or unknown
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).and_then(|v| v.as_ref())
    }

    pub fn set(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_string(), Some(value));
    }
}

pub type FunctionCb = Rc<dyn Fn(&mut OptValues, bool, &[String]) -> Result<Option<Value>, String>>;
pub type CommandCb = Rc<dyn Fn(&OptValues, OptValues) -> Result<Value, String>>;
pub type ParseCb = Rc<dyn Fn(&str) -> Result<Value, String>>;
pub type ParseDelimitedCb = Rc<dyn Fn(&str) -> Result<Vec<Value>, String>>;
pub type CompleteCb = Rc<dyn Fn(&OptValues, &str) -> Vec<String>>;
pub type ResolveCb = Rc<dyn Fn() -> Option<PathBuf>>;
pub type DefaultCb = Rc<dyn Fn(&OptValues) -> Value>;

/// Default for a parametric option, a literal or a callable over the
/// values parsed so far
#[derive(Clone)]
pub enum DefaultValue {
    Value(Value),
    Call(DefaultCb),
}

impl std::fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DefaultValue::Value(v) => f.debug_tuple("Value").field(v).finish(),
            DefaultValue::Call(_) => f.write_str("Call(..)"),
        }
    }
}

/// Positional behavior of a parametric option
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Positional {
    /// consumes any token that matches no name
    Plain,
    /// same, plus a marker name after which every token is positional
    Marker(String),
}

/// Fields shared by every parametric option
#[derive(Clone, Default)]
pub struct ValSpec {
    pub default: Option<DefaultValue>,
    pub example: Option<Value>,
    pub positional: Option<Positional>,
    pub param_name: Option<String>,
    pub parse: Option<ParseCb>,
    pub complete: Option<CompleteCb>,
}

/// Case folding applied to string parameters
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CaseFold {
    Lower,
    Upper,
}

/// Rounding applied to number parameters
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Round {
    Trunc,
    Floor,
    Ceil,
    Round,
}

#[derive(Clone, Default)]
pub struct StrCheck {
    /// mutually exclusive with `regex`
    pub enums: Option<Vec<String>>,
    pub regex: Option<Regex>,
    pub trim: bool,
    pub case: Option<CaseFold>,
}

#[derive(Clone, Default)]
pub struct NumCheck {
    /// mutually exclusive with `range`
    pub enums: Option<Vec<f64>>,
    /// closed on both ends
    pub range: Option<(f64, f64)>,
    pub round: Option<Round>,
}

/// Element separator for array options
#[derive(Clone)]
pub enum Separator {
    Text(String),
    Pattern(Regex),
}

/// Accumulation behavior of array options
///
/// A second specification without `append` resets the accumulator; the
/// intermediate normalized array from the first occurrence is discarded,
/// only the value that ends up stored is checked last.
#[derive(Clone, Default)]
pub struct ArraySpec {
    pub separator: Option<Separator>,
    pub append: bool,
    pub unique: bool,
    pub limit: Option<usize>,
    pub parse_delimited: Option<ParseDelimitedCb>,
}

/// Option kind, the dispatch tag of the parser loop
#[derive(Clone)]
pub enum Kind {
    /// boolean that consumes no parameter, `true` unless a negation name
    /// was used
    Flag { negation: Vec<String> },
    /// user callback, may break the parsing loop
    Function { run: FunctionCb, breaks: bool },
    /// nested schema parsed against the remaining arguments
    Command {
        opts: Rc<Vec<(String, Opt)>>,
        run: CommandCb,
    },
    /// terminates the parse with the rendered help message
    Help,
    /// terminates the parse with a literal or manifest-resolved version
    Version {
        version: Option<String>,
        resolve: Option<ResolveCb>,
    },
    Bool {
        val: ValSpec,
    },
    Str {
        val: ValSpec,
        check: StrCheck,
    },
    Num {
        val: ValSpec,
        check: NumCheck,
    },
    Strs {
        val: ValSpec,
        check: StrCheck,
        array: ArraySpec,
    },
    Nums {
        val: ValSpec,
        check: NumCheck,
        array: ArraySpec,
    },
}

impl Kind {
    pub(crate) fn is_niladic(&self) -> bool {
        matches!(
            self,
            Kind::Flag { .. }
                | Kind::Function { .. }
                | Kind::Command { .. }
                | Kind::Help
                | Kind::Version { .. }
        )
    }

    pub(crate) fn is_array(&self) -> bool {
        matches!(self, Kind::Strs { .. } | Kind::Nums { .. })
    }

    pub(crate) fn val_spec(&self) -> Option<&ValSpec> {
        match self {
            Kind::Bool { val }
            | Kind::Str { val, .. }
            | Kind::Num { val, .. }
            | Kind::Strs { val, .. }
            | Kind::Nums { val, .. } => Some(val),
            _ => None,
        }
    }

    pub(crate) fn val_spec_mut(&mut self) -> Option<&mut ValSpec> {
        match self {
            Kind::Bool { val }
            | Kind::Str { val, .. }
            | Kind::Num { val, .. }
            | Kind::Strs { val, .. }
            | Kind::Nums { val, .. } => Some(val),
            _ => None,
        }
    }

    pub(crate) fn array_spec(&self) -> Option<&ArraySpec> {
        match self {
            Kind::Strs { array, .. } | Kind::Nums { array, .. } => Some(array),
            _ => None,
        }
    }

    /// lowercase kind name, used for the fallback param column and for
    /// incompatible-value errors
    pub(crate) fn type_name(&self) -> &'static str {
        match self {
            Kind::Flag { .. } => "flag",
            Kind::Function { .. } => "function",
            Kind::Command { .. } => "command",
            Kind::Help => "help",
            Kind::Version { .. } => "version",
            Kind::Bool { .. } => "boolean",
            Kind::Str { .. } => "string",
            Kind::Num { .. } => "number",
            Kind::Strs { .. } => "strings",
            Kind::Nums { .. } => "numbers",
        }
    }
}

/// Per-option style overrides for the help formatter
#[derive(Debug, Clone, Default)]
pub struct OptStyles {
    pub names: Option<Style>,
    pub param: Option<Style>,
    pub descr: Option<Style>,
}

/// One option definition: shared header plus kind
#[derive(Clone)]
pub struct Opt {
    /// ordered name slots; a `None` slot keeps alignment with sibling
    /// options in the help output
    pub names: Vec<Option<String>>,
    /// name used in error and help phrases, defaults to the first
    /// non-empty slot
    pub preferred_name: Option<String>,
    pub desc: Option<String>,
    /// help grouping bucket, empty for the default group
    pub group: String,
    pub hide: bool,
    pub deprecated: Option<String>,
    pub link: Option<String>,
    pub styles: OptStyles,
    pub requires: Option<Requires>,
    pub required: bool,
    pub kind: Kind,
}

impl Opt {
    fn base(names: &[&str], kind: Kind) -> Self {
        Opt {
            names: names.iter().map(|n| Some(n.to_string())).collect(),
            preferred_name: None,
            desc: None,
            group: String::new(),
            hide: false,
            deprecated: None,
            link: None,
            styles: OptStyles::default(),
            requires: None,
            required: false,
            kind,
        }
    }

    #[must_use]
    pub fn flag(names: &[&str]) -> Self {
        Opt::base(
            names,
            Kind::Flag {
                negation: Vec::new(),
            },
        )
    }

    #[must_use]
    pub fn function(names: &[&str], run: FunctionCb) -> Self {
        Opt::base(names, Kind::Function { run, breaks: false })
    }

    #[must_use]
    pub fn command(names: &[&str], opts: Vec<(String, Opt)>, run: CommandCb) -> Self {
        Opt::base(
            names,
            Kind::Command {
                opts: Rc::new(opts),
                run,
            },
        )
    }

    #[must_use]
    pub fn help(names: &[&str]) -> Self {
        Opt::base(names, Kind::Help)
    }

    #[must_use]
    pub fn version(names: &[&str], version: Option<&str>) -> Self {
        Opt::base(
            names,
            Kind::Version {
                version: version.map(String::from),
                resolve: None,
            },
        )
    }

    #[must_use]
    pub fn boolean(names: &[&str]) -> Self {
        Opt::base(
            names,
            Kind::Bool {
                val: ValSpec::default(),
            },
        )
    }

    #[must_use]
    pub fn string(names: &[&str]) -> Self {
        Opt::base(
            names,
            Kind::Str {
                val: ValSpec::default(),
                check: StrCheck::default(),
            },
        )
    }

    #[must_use]
    pub fn number(names: &[&str]) -> Self {
        Opt::base(
            names,
            Kind::Num {
                val: ValSpec::default(),
                check: NumCheck::default(),
            },
        )
    }

    #[must_use]
    pub fn strings(names: &[&str]) -> Self {
        Opt::base(
            names,
            Kind::Strs {
                val: ValSpec::default(),
                check: StrCheck::default(),
                array: ArraySpec::default(),
            },
        )
    }

    #[must_use]
    pub fn numbers(names: &[&str]) -> Self {
        Opt::base(
            names,
            Kind::Nums {
                val: ValSpec::default(),
                check: NumCheck::default(),
                array: ArraySpec::default(),
            },
        )
    }
}

/// Chainable header setters
impl Opt {
    #[must_use]
    pub fn help_text(mut self, desc: &str) -> Self {
        self.desc = Some(desc.to_string());
        self
    }

    #[must_use]
    pub fn group(mut self, group: &str) -> Self {
        self.group = group.to_string();
        self
    }

    #[must_use]
    pub fn hide(mut self) -> Self {
        self.hide = true;
        self
    }

    #[must_use]
    pub fn deprecated(mut self, reason: &str) -> Self {
        self.deprecated = Some(reason.to_string());
        self
    }

    #[must_use]
    pub fn link(mut self, url: &str) -> Self {
        self.link = Some(url.to_string());
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn requires(mut self, requires: Requires) -> Self {
        self.requires = Some(requires);
        self
    }

    #[must_use]
    pub fn styles(mut self, styles: OptStyles) -> Self {
        self.styles = styles;
        self
    }
}

/// Chainable kind setters, no-ops on kinds that lack the field
impl Opt {
    #[must_use]
    pub fn negation(mut self, names: &[&str]) -> Self {
        if let Kind::Flag { negation } = &mut self.kind {
            *negation = names.iter().map(|n| n.to_string()).collect();
        }
        self
    }

    #[must_use]
    pub fn breaks(mut self) -> Self {
        if let Kind::Function { breaks, .. } = &mut self.kind {
            *breaks = true;
        }
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        if let Some(val) = self.kind.val_spec_mut() {
            val.default = Some(DefaultValue::Value(value.into()));
        }
        self
    }

    #[must_use]
    pub fn default_fn(mut self, call: DefaultCb) -> Self {
        if let Some(val) = self.kind.val_spec_mut() {
            val.default = Some(DefaultValue::Call(call));
        }
        self
    }

    #[must_use]
    pub fn example(mut self, value: impl Into<Value>) -> Self {
        if let Some(val) = self.kind.val_spec_mut() {
            val.example = Some(value.into());
        }
        self
    }

    #[must_use]
    pub fn positional(mut self) -> Self {
        if let Some(val) = self.kind.val_spec_mut() {
            val.positional = Some(Positional::Plain);
        }
        self
    }

    #[must_use]
    pub fn positional_marker(mut self, marker: &str) -> Self {
        if let Some(val) = self.kind.val_spec_mut() {
            val.positional = Some(Positional::Marker(marker.to_string()));
        }
        self
    }

    #[must_use]
    pub fn param_name(mut self, name: &str) -> Self {
        if let Some(val) = self.kind.val_spec_mut() {
            val.param_name = Some(name.to_string());
        }
        self
    }

    #[must_use]
    pub fn parse_with(mut self, parse: ParseCb) -> Self {
        if let Some(val) = self.kind.val_spec_mut() {
            val.parse = Some(parse);
        }
        self
    }

    #[must_use]
    pub fn complete_with(mut self, complete: CompleteCb) -> Self {
        if let Some(val) = self.kind.val_spec_mut() {
            val.complete = Some(complete);
        }
        self
    }

    #[must_use]
    pub fn resolve_with(mut self, resolve: ResolveCb) -> Self {
        if let Kind::Version { resolve: slot, .. } = &mut self.kind {
            *slot = Some(resolve);
        }
        self
    }

    #[must_use]
    pub fn str_check(mut self, check: StrCheck) -> Self {
        match &mut self.kind {
            Kind::Str { check: slot, .. } | Kind::Strs { check: slot, .. } => *slot = check,
            _ => {}
        }
        self
    }

    #[must_use]
    pub fn num_check(mut self, check: NumCheck) -> Self {
        match &mut self.kind {
            Kind::Num { check: slot, .. } | Kind::Nums { check: slot, .. } => *slot = check,
            _ => {}
        }
        self
    }

    #[must_use]
    pub fn array_spec(mut self, spec: ArraySpec) -> Self {
        match &mut self.kind {
            Kind::Strs { array, .. } | Kind::Nums { array, .. } => *array = spec,
            _ => {}
        }
        self
    }

    #[must_use]
    pub fn separator(mut self, sep: &str) -> Self {
        match &mut self.kind {
            Kind::Strs { array, .. } | Kind::Nums { array, .. } => {
                array.separator = Some(Separator::Text(sep.to_string()));
            }
            _ => {}
        }
        self
    }

    /// First non-empty name slot
    pub(crate) fn first_name(&self) -> Option<&str> {
        self.names
            .iter()
            .flatten()
            .map(String::as_str)
            .find(|n| !n.is_empty())
    }

    /// Name used in messages; the registry fills `preferred_name` during
    /// construction so the fallback rarely matters
    pub(crate) fn display_name(&self) -> &str {
        self.preferred_name
            .as_deref()
            .or_else(|| self.first_name())
            .unwrap_or_default()
    }
}
