//! Parser loop and requirement evaluation
//!
//! One parse is a left-to-right walk over the argument stream. Each step
//! classifies the current token into one of four states: after a
//! positional marker everything is positional (`Marker`); a token that
//! splits on `=` into a known name is handled inline (`Inline`); a token
//! matching no name either feeds the positional slot (`Positional`) or a
//! previously entered option that still awaits a value (`Param`). Kind
//! dispatch is a plain match over [`Kind`].
//!
//! After the loop the requirement phases run: every always-required key
//! must have been specified, and every specified key with a `requires`
//! tree must satisfy it. Defaults fill the remaining keys last, flowing
//! through the same normalization pipeline as user input.

use std::collections::BTreeSet;

use crate::args::Args;
use crate::complete;
use crate::error::{Error, ErrorConfig, ErrorKind, FmtArg, ParseFailure};
use crate::help::{HelpConfig, HelpFormatter};
use crate::norm::{
    convert_bool, convert_num, normalize_num_array, normalize_number, normalize_str_array,
    normalize_string, normalize_value,
};
use crate::opts::{
    DefaultValue, Kind, Opt, OptValues, Positional, Separator, Value,
};
use crate::requires::Requires;
use crate::term::TermString;
use crate::validate::Registry;
use crate::youmean::similar_names;

/// Schema-driven argument parser
///
/// Construction performs the structural schema checks and is fatal on a
/// broken schema; [`validate`](Parser::validate) opts into the deep pass.
pub struct Parser {
    pub(crate) registry: Registry,
    pub(crate) config: ErrorConfig,
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser").finish_non_exhaustive()
    }
}

/// an option that was entered and still consumes following tokens
#[derive(Debug, Copy, Clone)]
struct Pending {
    ix: usize,
    kind: PendKind,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum PendKind {
    /// single-valued option, exactly one parameter
    Single,
    /// array with a separator or delimited parser, exactly one parameter
    ArrayOnce,
    /// array without a separator, consumes until the next name
    ArrayGreedy,
}

impl Parser {
    pub fn new(opts: Vec<(String, Opt)>) -> Result<Self, ParseFailure> {
        Parser::with_config(opts, ErrorConfig::default())
    }

    pub fn with_config(
        opts: Vec<(String, Opt)>,
        config: ErrorConfig,
    ) -> Result<Self, ParseFailure> {
        match Registry::new(opts) {
            Ok(registry) => Ok(Parser { registry, config }),
            Err(err) => Err(err.into_failure(&config)),
        }
    }

    /// Deep schema validation, opt-in
    pub fn validate(&self) -> Result<(), ParseFailure> {
        self.registry
            .validate()
            .map_err(|err| err.into_failure(&self.config))
    }

    /// Parse pre-tokenized arguments into a fresh values record
    pub fn parse(&self, args: impl Into<Args>) -> Result<OptValues, ParseFailure> {
        let mut values = self.registry.init_values();
        self.parse_into(&mut values, args)?;
        Ok(values)
    }

    /// Parse a raw command line; the first word is the program name
    pub fn parse_line(&self, line: &str) -> Result<OptValues, ParseFailure> {
        let mut args = Args::from_line(line, None);
        if !args.items.is_empty() {
            args.items.remove(0);
        }
        self.parse(args)
    }

    /// Parse into an existing values record
    ///
    /// Missing keys are initialized to unset first; keys already holding
    /// arrays cooperate with append-mode options. Returns the set of keys
    /// that were specified on the command line.
    pub fn parse_into(
        &self,
        values: &mut OptValues,
        args: impl Into<Args>,
    ) -> Result<BTreeSet<String>, ParseFailure> {
        let args = args.into();
        for (key, _) in self.registry.opts.iter() {
            values.0.entry(key.clone()).or_insert(None);
        }
        let completing = args.comp.is_some();
        match self.run_loop(values, &args) {
            Ok(specified) => Ok(specified),
            Err(failure) => {
                if completing && !matches!(failure, ParseFailure::Completion(_)) {
                    // completion must never surface correctness feedback
                    Err(ParseFailure::Completion(String::new()))
                } else {
                    Err(failure)
                }
            }
        }
    }

    /// Process arguments, consulting the completion environment variables
    pub fn run(&self) -> Result<OptValues, ParseFailure> {
        match complete::args_from_env() {
            Some(args) => self.parse(args),
            None => self.parse(Args::current()),
        }
    }

    fn fail(&self, err: Error) -> ParseFailure {
        err.into_failure(&self.config)
    }

    fn err_name(&self, kind: ErrorKind, name: &str) -> ParseFailure {
        self.fail(Error::new(kind, vec![FmtArg::OptName(name.to_string())]))
    }

    fn missing_parameter(&self, ix: usize) -> ParseFailure {
        self.err_name(
            ErrorKind::MissingParameter,
            self.registry.opt(ix).display_name(),
        )
    }

    fn unknown_option(&self, name: &str) -> ParseFailure {
        let similar = similar_names(name, &self.registry);
        if similar.is_empty() {
            self.err_name(ErrorKind::UnknownOption, name)
        } else {
            let mut list = TermString::new();
            for (ix, sim) in similar.iter().enumerate() {
                if ix != 0 {
                    list.push_str(",");
                }
                self.config
                    .styles
                    .push_arg(&FmtArg::OptName(sim.clone()), &mut list);
            }
            self.fail(Error::new(
                ErrorKind::UnknownOptionWithSimilar,
                vec![FmtArg::OptName(name.to_string()), FmtArg::Term(list)],
            ))
        }
    }

    fn custom_parse_error(&self, message: String) -> ParseFailure {
        self.fail(Error::new(
            ErrorKind::ParseError,
            vec![FmtArg::Term(TermString::from(message.as_str()))],
        ))
    }
}

/// The argument loop
impl Parser {
    fn run_loop(
        &self,
        values: &mut OptValues,
        args: &Args,
    ) -> Result<BTreeSet<String>, ParseFailure> {
        let completing = args.comp.is_some();
        let items = &args.items;
        let mut specified = BTreeSet::new();
        let mut marker_mode = false;
        let mut pending: Option<Pending> = None;

        let mut i = 0;
        while i < items.len() {
            if args.comp == Some(i) {
                let word = items[i].as_str();
                let candidates = complete::candidates(
                    self,
                    values,
                    pending.map(|p| (p.ix, p.kind == PendKind::ArrayGreedy)),
                    marker_mode,
                    word,
                );
                return Err(ParseFailure::Completion(candidates));
            }
            let token = &items[i];

            if marker_mode {
                self.feed_positional(values, &mut specified, token)?;
                i += 1;
                continue;
            }

            let (name, inline) = match token.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (token.as_str(), None),
            };

            if let Some(ix) = self.registry.lookup(name) {
                // a known name closes whatever was pending; options that
                // still needed a parameter did not get one
                if let Some(p) = pending.take() {
                    if p.kind != PendKind::ArrayGreedy {
                        return Err(self.missing_parameter(p.ix));
                    }
                }

                if self.is_positional_marker(ix, name) {
                    if inline.is_some() {
                        return Err(self.err_name(ErrorKind::PositionalInlineValue, name));
                    }
                    // the marker itself is not recorded as specified
                    marker_mode = true;
                    i += 1;
                    continue;
                }

                match self.enter_option(ix, name, inline, i, items, values, &mut specified, args)? {
                    Flow::Next => i += 1,
                    Flow::Await(p) => {
                        pending = Some(p);
                        i += 1;
                    }
                    Flow::Stop(done) => return Ok(done),
                }
            } else if let Some(p) = pending {
                // Param state
                match p.kind {
                    PendKind::Single => {
                        let value = self.single_value(p.ix, token)?;
                        values.set(self.registry.key(p.ix), value);
                        pending = None;
                    }
                    PendKind::ArrayOnce => {
                        self.array_batch(p.ix, token, values)?;
                        pending = None;
                    }
                    PendKind::ArrayGreedy => {
                        self.array_batch(p.ix, token, values)?;
                    }
                }
                i += 1;
            } else {
                // Positional state
                self.feed_positional(values, &mut specified, token)?;
                i += 1;
            }
        }

        if args.comp.is_some_and(|c| c >= items.len()) {
            let candidates = complete::candidates(
                self,
                values,
                pending.map(|p| (p.ix, p.kind == PendKind::ArrayGreedy)),
                marker_mode,
                "",
            );
            return Err(ParseFailure::Completion(candidates));
        }

        if let Some(p) = pending {
            if p.kind != PendKind::ArrayGreedy {
                return Err(self.missing_parameter(p.ix));
            }
        }

        if !completing {
            self.check_requirements(values, &specified)?;
            self.apply_defaults(values, &specified)?;
        }
        Ok(specified)
    }

    fn is_positional_marker(&self, ix: usize, name: &str) -> bool {
        matches!(
            self.registry
                .opt(ix)
                .kind
                .val_spec()
                .and_then(|v| v.positional.as_ref()),
            Some(Positional::Marker(marker)) if marker == name
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn enter_option(
        &self,
        ix: usize,
        used_name: &str,
        inline: Option<&str>,
        i: usize,
        items: &[String],
        values: &mut OptValues,
        specified: &mut BTreeSet<String>,
        args: &Args,
    ) -> Result<Flow, ParseFailure> {
        let completing = args.comp.is_some();
        let key = self.registry.key(ix).to_string();
        let opt = self.registry.opt(ix);
        let display = opt.display_name();

        if opt.kind.is_niladic() {
            if inline.is_some() {
                return Err(self.err_name(ErrorKind::OptionInlineValue, used_name));
            }
            specified.insert(key.clone());
        }

        match &opt.kind {
            Kind::Flag { negation } => {
                let value = !negation.iter().any(|n| n == used_name);
                values.set(&key, Value::Bool(value));
                Ok(Flow::Next)
            }

            Kind::Function { run, breaks } => {
                let rest = items[i + 1..].to_vec();
                match run(values, completing, &rest) {
                    Ok(Some(value)) => values.set(&key, value),
                    Ok(None) => {}
                    Err(message) => return Err(self.custom_parse_error(message)),
                }
                if *breaks && !completing {
                    self.check_requirements(values, specified)?;
                    self.apply_defaults(values, specified)?;
                    return Ok(Flow::Stop(specified.clone()));
                }
                Ok(Flow::Next)
            }

            Kind::Command { opts, run } => {
                if !completing {
                    self.check_requirements(values, specified)?;
                    self.apply_defaults(values, specified)?;
                }
                let inner = Parser {
                    registry: Registry::from_shared(opts.clone())
                        .map_err(|err| self.fail(err))?,
                    config: self.config.clone(),
                };
                let inner_args = Args {
                    items: items[i + 1..].to_vec(),
                    comp: args.comp.and_then(|c| c.checked_sub(i + 1)),
                };
                let inner_values = inner.parse(inner_args)?;
                match run(values, inner_values) {
                    Ok(value) => values.set(&key, value),
                    Err(message) => return Err(self.custom_parse_error(message)),
                }
                // a command consumes every remaining argument
                Ok(Flow::Stop(specified.clone()))
            }

            Kind::Help => {
                if completing {
                    return Ok(Flow::Next);
                }
                self.check_requirements(values, specified)?;
                let help = HelpFormatter {
                    registry: &self.registry,
                    config: HelpConfig::default(),
                    styles: self.config.styles.clone(),
                }
                .format_help(None);
                Err(ParseFailure::Stdout(help))
            }

            Kind::Version { version, resolve } => {
                if completing {
                    return Ok(Flow::Next);
                }
                self.check_requirements(values, specified)?;
                let version = match version {
                    Some(v) => v.clone(),
                    None => crate::version::resolve(resolve.as_ref().and_then(|r| r()))
                        .ok_or_else(|| self.err_name(ErrorKind::MissingManifest, display))?,
                };
                let mut out = TermString::new();
                out.word(&version);
                Err(ParseFailure::Stdout(out))
            }

            Kind::Bool { .. } | Kind::Str { .. } | Kind::Num { .. } => {
                specified.insert(key.clone());
                match inline {
                    Some(raw) => {
                        let value = self.single_value(ix, raw)?;
                        values.set(&key, value);
                        Ok(Flow::Next)
                    }
                    None => Ok(Flow::Await(Pending {
                        ix,
                        kind: PendKind::Single,
                    })),
                }
            }

            Kind::Strs { array, .. } | Kind::Nums { array, .. } => {
                specified.insert(key.clone());
                self.enter_array(ix, values);
                let once = array.separator.is_some() || array.parse_delimited.is_some();
                match inline {
                    Some(raw) => {
                        self.array_batch(ix, raw, values)?;
                        Ok(Flow::Next)
                    }
                    None => Ok(Flow::Await(Pending {
                        ix,
                        kind: if once {
                            PendKind::ArrayOnce
                        } else {
                            PendKind::ArrayGreedy
                        },
                    })),
                }
            }
        }
    }

    /// On entry an array accumulator resets, unless append mode finds an
    /// array to extend
    fn enter_array(&self, ix: usize, values: &mut OptValues) {
        let key = self.registry.key(ix);
        let opt = self.registry.opt(ix);
        match &opt.kind {
            Kind::Strs { array, .. } => {
                let keep = array.append && matches!(values.get(key), Some(Value::StrArray(_)));
                if !keep {
                    values.set(key, Value::StrArray(Vec::new()));
                }
            }
            Kind::Nums { array, .. } => {
                let keep = array.append && matches!(values.get(key), Some(Value::NumArray(_)));
                if !keep {
                    values.set(key, Value::NumArray(Vec::new()));
                }
            }
            _ => {}
        }
    }

    fn feed_positional(
        &self,
        values: &mut OptValues,
        specified: &mut BTreeSet<String>,
        token: &str,
    ) -> Result<(), ParseFailure> {
        let ix = match self.registry.positional {
            Some(ix) => ix,
            None => return Err(self.unknown_option(token)),
        };
        let key = self.registry.key(ix).to_string();
        let outcome = if self.registry.opt(ix).kind.is_array() {
            if !specified.contains(&key) {
                self.enter_array(ix, values);
            }
            specified.insert(key);
            self.array_batch(ix, token, values)
        } else {
            specified.insert(key.clone());
            self.single_value(ix, token).map(|value| {
                values.set(&key, value);
            })
        };
        // a rejected positional that resembles an option name was probably
        // a mistyped option
        match outcome {
            Err(ParseFailure::Stderr(message)) => {
                let similar = similar_names(token, &self.registry);
                if similar.is_empty() {
                    return Err(ParseFailure::Stderr(message));
                }
                let mut list = TermString::new();
                for (ix, sim) in similar.iter().enumerate() {
                    if ix != 0 {
                        list.push_str(",");
                    }
                    self.config
                        .styles
                        .push_arg(&FmtArg::OptName(sim.clone()), &mut list);
                }
                Err(self.fail(Error::new(
                    ErrorKind::ParseErrorWithSimilar,
                    vec![FmtArg::Term(message), FmtArg::Term(list)],
                )))
            }
            other => other,
        }
    }

    /// string to typed conversion plus normalization for single-valued
    /// kinds
    fn single_value(&self, ix: usize, raw: &str) -> Result<Value, ParseFailure> {
        let opt = self.registry.opt(ix);
        let name = opt.display_name();
        let val = opt.kind.val_spec().expect("single_value on a niladic kind");
        if let Some(parse) = &val.parse {
            let value = parse(raw).map_err(|message| self.custom_parse_error(message))?;
            return normalize_value(&opt.kind, name, value).map_err(|err| self.fail(err));
        }
        match &opt.kind {
            Kind::Bool { .. } => Ok(Value::Bool(convert_bool(raw))),
            Kind::Str { check, .. } => normalize_string(check, name, raw)
                .map(Value::Str)
                .map_err(|err| self.fail(err)),
            Kind::Num { check, .. } => normalize_number(check, name, convert_num(raw))
                .map(Value::Num)
                .map_err(|err| self.fail(err)),
            _ => unreachable!("single_value on a non-single kind"),
        }
    }

    /// one parameter of an array option: delimited parse, custom element
    /// parse, separator split or a single element; each element runs the
    /// element pipeline, then the array constraints run on the accumulator
    fn array_batch(
        &self,
        ix: usize,
        raw: &str,
        values: &mut OptValues,
    ) -> Result<(), ParseFailure> {
        let opt = self.registry.opt(ix);
        let key = self.registry.key(ix);
        let name = opt.display_name();

        fn split_pieces(separator: &Option<Separator>, raw: &str) -> Vec<String> {
            match separator {
                Some(Separator::Text(sep)) => raw.split(sep.as_str()).map(String::from).collect(),
                Some(Separator::Pattern(re)) => re.split(raw).map(String::from).collect(),
                None => vec![raw.to_string()],
            }
        }

        match &opt.kind {
            Kind::Strs { val, check, array } => {
                let mut items = match values.get(key) {
                    Some(Value::StrArray(xs)) => xs.clone(),
                    _ => Vec::new(),
                };
                let pieces: Vec<String> = if let Some(delimited) = &array.parse_delimited {
                    let parsed =
                        delimited(raw).map_err(|message| self.custom_parse_error(message))?;
                    parsed
                        .into_iter()
                        .map(|v| self.expect_str_element(&opt.kind, name, v))
                        .collect::<Result<_, _>>()?
                } else if let Some(parse) = &val.parse {
                    let value = parse(raw).map_err(|message| self.custom_parse_error(message))?;
                    vec![self.expect_str_element(&opt.kind, name, value)?]
                } else {
                    split_pieces(&array.separator, raw)
                };
                for piece in pieces {
                    items.push(normalize_string(check, name, &piece).map_err(|e| self.fail(e))?);
                }
                normalize_str_array(array, name, &mut items).map_err(|e| self.fail(e))?;
                values.set(key, Value::StrArray(items));
                Ok(())
            }
            Kind::Nums { val, check, array } => {
                let mut items = match values.get(key) {
                    Some(Value::NumArray(xs)) => xs.clone(),
                    _ => Vec::new(),
                };
                let pieces: Vec<f64> = if let Some(delimited) = &array.parse_delimited {
                    let parsed =
                        delimited(raw).map_err(|message| self.custom_parse_error(message))?;
                    parsed
                        .into_iter()
                        .map(|v| self.expect_num_element(&opt.kind, name, v))
                        .collect::<Result<_, _>>()?
                } else if let Some(parse) = &val.parse {
                    let value = parse(raw).map_err(|message| self.custom_parse_error(message))?;
                    vec![self.expect_num_element(&opt.kind, name, value)?]
                } else {
                    split_pieces(&array.separator, raw)
                        .into_iter()
                        .map(|piece| convert_num(&piece))
                        .collect()
                };
                for piece in pieces {
                    items.push(normalize_number(check, name, piece).map_err(|e| self.fail(e))?);
                }
                normalize_num_array(array, name, &mut items).map_err(|e| self.fail(e))?;
                values.set(key, Value::NumArray(items));
                Ok(())
            }
            _ => unreachable!("array_batch on a non-array kind"),
        }
    }

    fn expect_str_element(
        &self,
        kind: &Kind,
        name: &str,
        value: Value,
    ) -> Result<String, ParseFailure> {
        match value {
            Value::Str(s) => Ok(s),
            other => Err(self.fail(Error::new(
                ErrorKind::OptionValueIncompatible,
                vec![
                    FmtArg::OptName(name.to_string()),
                    FmtArg::Value(other),
                    FmtArg::Str(kind.type_name().to_string()),
                ],
            ))),
        }
    }

    fn expect_num_element(
        &self,
        kind: &Kind,
        name: &str,
        value: Value,
    ) -> Result<f64, ParseFailure> {
        match value {
            Value::Num(n) => Ok(n),
            other => Err(self.fail(Error::new(
                ErrorKind::OptionValueIncompatible,
                vec![
                    FmtArg::OptName(name.to_string()),
                    FmtArg::Value(other),
                    FmtArg::Str(kind.type_name().to_string()),
                ],
            ))),
        }
    }
}

/// Requirement phases and defaults
impl Parser {
    fn check_requirements(
        &self,
        values: &OptValues,
        specified: &BTreeSet<String>,
    ) -> Result<(), ParseFailure> {
        for &ix in &self.registry.required {
            let key = self.registry.key(ix);
            if !specified.contains(key) {
                return Err(self.err_name(
                    ErrorKind::MissingRequiredOption,
                    self.registry.opt(ix).display_name(),
                ));
            }
        }
        for (key, opt) in self.registry.opts.iter() {
            if !specified.contains(key) {
                continue;
            }
            if let Some(requires) = &opt.requires {
                if let Err(reason) = self.eval_requires(requires, false, values, specified) {
                    return Err(self.fail(Error::new(
                        ErrorKind::OptionRequires,
                        vec![
                            FmtArg::OptName(opt.display_name().to_string()),
                            FmtArg::Term(reason),
                        ],
                    )));
                }
            }
        }
        Ok(())
    }

    /// Tree walk threading a negate bit; `Not` flips it, which turns `All`
    /// into `One` and back (De Morgan). Returns the failure reason.
    fn eval_requires(
        &self,
        requires: &Requires,
        negate: bool,
        values: &OptValues,
        specified: &BTreeSet<String>,
    ) -> Result<(), TermString> {
        match requires {
            Requires::Present(key) => {
                if specified.contains(key) != negate {
                    Ok(())
                } else {
                    Err(self.leaf_reason(key, negate, None, values))
                }
            }
            Requires::Absent(key) => {
                if specified.contains(key) == negate {
                    Ok(())
                } else {
                    Err(self.leaf_reason(key, !negate, None, values))
                }
            }
            Requires::Equals(key, expected) => {
                let expected = self.normalized_expectation(key, expected);
                let actual = values.get(key);
                let satisfied = specified.contains(key)
                    && actual.is_some_and(|actual| {
                        self.values_equal(key, actual, &expected) != negate
                    });
                if satisfied {
                    Ok(())
                } else {
                    Err(self.leaf_reason(key, negate, Some(&expected), values))
                }
            }
            Requires::All(items) | Requires::One(items) => {
                let conjunction = matches!(requires, Requires::All(_)) != negate;
                if conjunction {
                    for item in items {
                        self.eval_requires(item, negate, values, specified)?;
                    }
                    Ok(())
                } else {
                    let mut reasons = Vec::new();
                    for item in items {
                        match self.eval_requires(item, negate, values, specified) {
                            Ok(()) => return Ok(()),
                            Err(reason) => reasons.push(reason),
                        }
                    }
                    Err(join_or(reasons))
                }
            }
            Requires::Not(item) => self.eval_requires(item, !negate, values, specified),
        }
    }

    /// expectation values run through the target option's normalizer so
    /// that `' A '` matches `a` for a trim plus lowercase option
    fn normalized_expectation(&self, key: &str, expected: &Value) -> Value {
        match self.registry.index_of_key(key) {
            Some(ix) => {
                let opt = self.registry.opt(ix);
                normalize_value(&opt.kind, opt.display_name(), expected.clone())
                    .unwrap_or_else(|_| expected.clone())
            }
            None => expected.clone(),
        }
    }

    fn values_equal(&self, key: &str, actual: &Value, expected: &Value) -> bool {
        let unordered = self
            .registry
            .index_of_key(key)
            .and_then(|ix| self.registry.opt(ix).kind.array_spec())
            .is_some_and(|array| array.unique);
        match (actual, expected) {
            (Value::StrArray(a), Value::StrArray(b)) if unordered => {
                let mut a = a.clone();
                let mut b = b.clone();
                a.sort();
                b.sort();
                a == b
            }
            (Value::NumArray(a), Value::NumArray(b)) if unordered => {
                let mut a = a.clone();
                let mut b = b.clone();
                a.sort_by(f64::total_cmp);
                b.sort_by(f64::total_cmp);
                a == b
            }
            (a, b) => a == b,
        }
    }

    /// reason for one failed leaf: the option name, `no` in front when the
    /// leaf was negated, the expected value and the actual one when they
    /// differ
    fn leaf_reason(
        &self,
        key: &str,
        negate: bool,
        expected: Option<&Value>,
        values: &OptValues,
    ) -> TermString {
        let name = match self.registry.index_of_key(key) {
            Some(ix) => self.registry.opt(ix).display_name().to_string(),
            None => key.to_string(),
        };
        let styles = &self.config.styles;
        let mut out = TermString::new();
        if negate && expected.is_none() {
            out.word("no");
        }
        styles.push_arg(&FmtArg::OptName(name), &mut out);
        if let Some(expected) = expected {
            out.push_str(if negate { "!=" } else { "=" });
            let mut value = TermString::new();
            styles.push_value(expected, &mut value);
            out.append_merged(&value);
            if let Some(actual) = values.get(key) {
                if actual != expected {
                    out.word("(was");
                    let mut was = TermString::new();
                    styles.push_value(actual, &mut was);
                    out.append(&was);
                    out.push_str(")");
                }
            }
        }
        out
    }

    fn apply_defaults(
        &self,
        values: &mut OptValues,
        specified: &BTreeSet<String>,
    ) -> Result<(), ParseFailure> {
        for (key, opt) in self.registry.opts.iter() {
            if specified.contains(key) {
                continue;
            }
            match &opt.kind {
                Kind::Flag { .. } => values.set(key, Value::Bool(false)),
                _ => {
                    let default = opt.kind.val_spec().and_then(|v| v.default.clone());
                    if let Some(default) = default {
                        let value = match default {
                            DefaultValue::Value(v) => v,
                            DefaultValue::Call(call) => call(values),
                        };
                        let value = normalize_value(&opt.kind, opt.display_name(), value)
                            .map_err(|err| self.fail(err))?;
                        values.set(key, value);
                    }
                }
            }
        }
        Ok(())
    }
}

enum Flow {
    /// token consumed, move on
    Next,
    /// token consumed, following tokens may belong to this option
    Await(Pending),
    /// the loop is done early (function break or command)
    Stop(BTreeSet<String>),
}

fn join_or(reasons: Vec<TermString>) -> TermString {
    if reasons.len() == 1 {
        return reasons.into_iter().next().unwrap_or_default();
    }
    let mut out = TermString::new();
    out.word("(");
    for (ix, reason) in reasons.iter().enumerate() {
        if ix != 0 {
            out.word("or");
        }
        out.append(reason);
    }
    out.word(")");
    out
}
