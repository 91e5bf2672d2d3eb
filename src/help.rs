//! Help formatter
//!
//! Renders the schema into a three-column help message: names, param and
//! description. Name slots are aligned across options with `cuf` moves so
//! that a missing slot still reserves its space, columns are reached with
//! `cha` moves, and the description column word-wraps inside its window.
//! Every description feature has a configurable item phrase; the item list
//! itself is configurable and ordered.

use std::collections::BTreeMap;

use crate::csi::{cha, cuf, Seq};
use crate::error::{render_phrase, FmtArg, MsgStyles};
use crate::opts::{CaseFold, DefaultValue, Kind, Opt, Positional, Round, Separator};
use crate::parse::Parser;
use crate::requires::Requires;
use crate::term::TermString;
use crate::validate::Registry;

/// fallback width when neither the caller nor `COLUMNS` provides one
const DEFAULT_WIDTH: usize = 100;

/// Layout of one help column
#[derive(Debug, Clone)]
pub struct ColumnConfig {
    /// column indent, relative to the previous column's end unless
    /// `absolute`
    pub indent: usize,
    /// measure the indent from line start instead
    pub absolute: bool,
    /// line breaks emitted before the column
    pub breaks: usize,
    pub hidden: bool,
}

impl ColumnConfig {
    fn new(indent: usize) -> Self {
        ColumnConfig {
            indent,
            absolute: false,
            breaks: 0,
            hidden: false,
        }
    }
}

/// One description feature with a configurable phrase
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum HelpItem {
    Synopsis,
    Negation,
    Separator,
    Variadic,
    Positional,
    Append,
    Trim,
    Case,
    Round,
    Enums,
    Regex,
    Range,
    Unique,
    Limit,
    Requires,
    Required,
    Default,
    Deprecated,
    Link,
}

impl HelpItem {
    /// every item, in the default order
    pub const ALL: [HelpItem; 19] = [
        HelpItem::Synopsis,
        HelpItem::Negation,
        HelpItem::Separator,
        HelpItem::Variadic,
        HelpItem::Positional,
        HelpItem::Append,
        HelpItem::Trim,
        HelpItem::Case,
        HelpItem::Round,
        HelpItem::Enums,
        HelpItem::Regex,
        HelpItem::Range,
        HelpItem::Unique,
        HelpItem::Limit,
        HelpItem::Requires,
        HelpItem::Required,
        HelpItem::Default,
        HelpItem::Deprecated,
        HelpItem::Link,
    ];
}

fn default_item_phrase(item: HelpItem) -> &'static str {
    match item {
        HelpItem::Synopsis => "%t",
        HelpItem::Negation => "Can be negated with %t.",
        HelpItem::Separator => "Values are delimited by %s.",
        HelpItem::Variadic => "Accepts multiple parameters.",
        HelpItem::Positional => {
            "Accepts positional parameters(| that may be preceded by %t)."
        }
        HelpItem::Append => "May be specified multiple times.",
        HelpItem::Trim => "Values will be trimmed.",
        HelpItem::Case => "Values will be converted to (lowercase|uppercase).",
        HelpItem::Round => {
            "Values will be rounded (towards zero|down|up|to the nearest integer)."
        }
        HelpItem::Enums => "Values must be one of %t.",
        HelpItem::Regex => "Values must match the regex %r.",
        HelpItem::Range => "Values must be in the range [%n1, %n2].",
        HelpItem::Unique => "Duplicate values will be removed.",
        HelpItem::Limit => "Value count is limited to %n.",
        HelpItem::Requires => "Requires %t.",
        HelpItem::Required => "Always required.",
        HelpItem::Default => "Defaults to %t.",
        HelpItem::Deprecated => "Deprecated for %t.",
        HelpItem::Link => "Refer to %u for details.",
    }
}

/// Help formatter configuration
#[derive(Debug, Clone)]
pub struct HelpConfig {
    pub names: ColumnConfig,
    pub param: ColumnConfig,
    pub descr: ColumnConfig,
    /// description items in emission order
    pub items: Vec<HelpItem>,
    pub phrases: BTreeMap<HelpItem, String>,
}

impl Default for HelpConfig {
    fn default() -> Self {
        HelpConfig {
            names: ColumnConfig::new(2),
            param: ColumnConfig::new(2),
            descr: ColumnConfig::new(2),
            items: HelpItem::ALL.to_vec(),
            phrases: BTreeMap::new(),
        }
    }
}

impl HelpConfig {
    fn phrase(&self, item: HelpItem) -> &str {
        self.phrases
            .get(&item)
            .map(String::as_str)
            .unwrap_or_else(|| default_item_phrase(item))
    }
}

/// Renders help messages for one parser
pub struct HelpFormatter<'a> {
    pub(crate) registry: &'a Registry,
    pub(crate) config: HelpConfig,
    pub(crate) styles: MsgStyles,
}

struct Layout {
    slot_widths: Vec<usize>,
    names_start: usize,
    param_start: usize,
    descr_start: usize,
}

impl<'a> HelpFormatter<'a> {
    #[must_use]
    pub fn new(parser: &'a Parser) -> Self {
        HelpFormatter::with_config(parser, HelpConfig::default())
    }

    #[must_use]
    pub fn with_config(parser: &'a Parser, config: HelpConfig) -> Self {
        HelpFormatter {
            registry: &parser.registry,
            config,
            styles: parser.config.styles.clone(),
        }
    }

    /// Render the default group
    #[must_use]
    pub fn format_help(&self, width: Option<usize>) -> TermString {
        self.format_groups(width)
            .into_iter()
            .find(|(group, _)| group.is_empty())
            .map(|(_, text)| text)
            .unwrap_or_default()
    }

    /// Render every group, in first-appearance order
    #[must_use]
    pub fn format_groups(&self, width: Option<usize>) -> Vec<(String, TermString)> {
        let width = width.unwrap_or_else(output_width);
        let layout = self.layout();

        let mut groups: Vec<(String, TermString)> = Vec::new();
        for (_, opt) in self.registry.opts.iter() {
            if opt.hide {
                continue;
            }
            let entry = self.entry(opt, &layout, width);
            match groups.iter_mut().find(|(group, _)| *group == opt.group) {
                Some((_, text)) => text.append(&entry),
                None => groups.push((opt.group.clone(), entry)),
            }
        }
        if groups.is_empty() {
            groups.push((String::new(), TermString::new()));
        }
        groups
    }

    /// Per-slot widths are shared by every option so the columns align
    fn layout(&self) -> Layout {
        let visible = || self.registry.opts.iter().map(|(_, o)| o).filter(|o| !o.hide);

        let slots = visible().map(|o| o.names.len()).max().unwrap_or(0);
        let mut slot_widths = vec![0usize; slots];
        for opt in visible() {
            for (ix, name) in opt.names.iter().enumerate() {
                if let Some(name) = name {
                    slot_widths[ix] = slot_widths[ix].max(name.chars().count());
                }
            }
        }
        let names_width: usize = if slots == 0 {
            0
        } else {
            slot_widths.iter().sum::<usize>() + 2 * (slots - 1)
        };

        let names_cfg = &self.config.names;
        let names_start = names_cfg.indent;
        let names_end = if names_cfg.hidden {
            0
        } else {
            names_start + names_width
        };

        let param_width = visible()
            .map(|o| self.param_column(o).len())
            .max()
            .unwrap_or(0);
        let param_cfg = &self.config.param;
        let param_start = if param_cfg.absolute {
            param_cfg.indent
        } else {
            names_end + param_cfg.indent
        };
        let param_end = if param_cfg.hidden {
            names_end
        } else {
            param_start + param_width
        };

        let descr_cfg = &self.config.descr;
        let descr_start = if descr_cfg.absolute {
            descr_cfg.indent
        } else {
            param_end + descr_cfg.indent
        };

        Layout {
            slot_widths,
            names_start,
            param_start,
            descr_start,
        }
    }

    fn entry(&self, opt: &Opt, layout: &Layout, width: usize) -> TermString {
        let mut out = TermString::new();

        if !self.config.names.hidden {
            for _ in 0..self.config.names.breaks {
                out.push_break();
            }
            out.seq(cha(layout.names_start));
            out.append(&self.names_column(opt, &layout.slot_widths));
        }

        let param = self.param_column(opt);
        if !self.config.param.hidden && !param.is_empty() {
            for _ in 0..self.config.param.breaks {
                out.push_break();
            }
            out.seq(cha(layout.param_start));
            out.append(&param);
        }

        let descr = self.descr_column(opt);
        if !self.config.descr.hidden && !descr.is_empty() {
            for _ in 0..self.config.descr.breaks {
                out.push_break();
            }
            out.seq(cha(layout.descr_start));
            out.append(&descr.wrap(layout.descr_start, width));
        }

        out.push_break();
        out
    }

    /// One sub-slot per name index; absent slots emit only spacing so the
    /// comma alignment survives
    fn names_column(&self, opt: &Opt, slot_widths: &[usize]) -> TermString {
        let style = opt.styles.names.as_ref().unwrap_or(&self.styles.option);
        let revert = &self.styles.revert;
        let last_ix = opt
            .names
            .iter()
            .rposition(Option::is_some)
            .unwrap_or_default();

        let mut out = TermString::new();
        let mut pos = 0usize;
        let mut offset = 0usize;
        for (ix, slot) in opt.names.iter().enumerate() {
            if let Some(name) = slot {
                if offset > pos {
                    out.seq(cuf(offset - pos));
                    pos = offset;
                }
                out.styled(style, name, revert);
                pos += name.chars().count();
                if ix != last_ix {
                    out.push_str(",");
                    pos += 1;
                }
            }
            offset += slot_widths.get(ix).copied().unwrap_or(0) + 2;
        }
        out
    }

    /// The example if present, else the param name in angle brackets, else
    /// the kind; empty for niladic options
    fn param_column(&self, opt: &Opt) -> TermString {
        let mut out = TermString::new();
        let val = match opt.kind.val_spec() {
            Some(val) => val,
            None => return out,
        };
        if let Some(example) = &val.example {
            self.styles.push_value(example, &mut out);
            return out;
        }
        let text = match &val.param_name {
            Some(name) if name.starts_with('<') => name.clone(),
            Some(name) => format!("<{}>", name),
            None => format!("<{}>", opt.kind.type_name()),
        };
        match &opt.styles.param {
            Some(style) => out.styled(style, &text, &self.styles.revert),
            None => self.styles.push_arg(&FmtArg::Param(text), &mut out),
        }
        out
    }

    fn descr_column(&self, opt: &Opt) -> TermString {
        let mut out = TermString::new();
        if let Some(style) = &opt.styles.descr {
            out.seq(Seq::Sgr(style.clone()));
        }
        for &item in &self.config.items {
            if let Some((alt, args)) = self.item_args(opt, item) {
                render_phrase(self.config.phrase(item), alt, &args, &self.styles, &mut out);
            }
        }
        if opt.styles.descr.is_some() {
            out.seq(Seq::Sgr(self.styles.revert.clone()));
        }
        out
    }

    /// Whether the item applies to the option and with which arguments
    fn item_args(&self, opt: &Opt, item: HelpItem) -> Option<(usize, Vec<FmtArg>)> {
        let val = opt.kind.val_spec();
        let array = opt.kind.array_spec();
        let str_check = match &opt.kind {
            Kind::Str { check, .. } | Kind::Strs { check, .. } => Some(check),
            _ => None,
        };
        let num_check = match &opt.kind {
            Kind::Num { check, .. } | Kind::Nums { check, .. } => Some(check),
            _ => None,
        };

        match item {
            HelpItem::Synopsis => {
                let desc = opt.desc.as_deref()?;
                let mut text = TermString::new();
                text.words(desc);
                if !desc.trim_end().ends_with('.') {
                    text.push_str(".");
                }
                Some((0, vec![FmtArg::Term(text)]))
            }
            HelpItem::Negation => match &opt.kind {
                Kind::Flag { negation } if !negation.is_empty() => {
                    let mut list = TermString::new();
                    for (ix, name) in negation.iter().enumerate() {
                        if ix != 0 {
                            list.push_str(",");
                        }
                        self.styles
                            .push_arg(&FmtArg::OptName(name.clone()), &mut list);
                    }
                    Some((0, vec![FmtArg::Term(list)]))
                }
                _ => None,
            },
            HelpItem::Separator => match &array?.separator {
                Some(Separator::Text(sep)) => Some((0, vec![FmtArg::Str(sep.clone())])),
                Some(Separator::Pattern(re)) => {
                    Some((0, vec![FmtArg::Regex(re.as_str().to_string())]))
                }
                None => None,
            },
            HelpItem::Variadic => {
                let array = array?;
                (array.separator.is_none() && array.parse_delimited.is_none())
                    .then_some((0, vec![]))
            }
            HelpItem::Positional => match &val?.positional {
                Some(Positional::Plain) => Some((0, vec![])),
                Some(Positional::Marker(marker)) => {
                    let mut name = TermString::new();
                    self.styles
                        .push_arg(&FmtArg::OptName(marker.clone()), &mut name);
                    Some((1, vec![FmtArg::Term(name)]))
                }
                None => None,
            },
            HelpItem::Append => array?.append.then_some((0, vec![])),
            HelpItem::Trim => str_check?.trim.then_some((0, vec![])),
            HelpItem::Case => match str_check?.case {
                Some(CaseFold::Lower) => Some((0, vec![])),
                Some(CaseFold::Upper) => Some((1, vec![])),
                None => None,
            },
            HelpItem::Round => match num_check?.round {
                Some(Round::Trunc) => Some((0, vec![])),
                Some(Round::Floor) => Some((1, vec![])),
                Some(Round::Ceil) => Some((2, vec![])),
                Some(Round::Round) => Some((3, vec![])),
                None => None,
            },
            HelpItem::Enums => {
                if let Some(enums) = str_check.and_then(|c| c.enums.as_ref()) {
                    Some((0, vec![FmtArg::StrList(enums.clone())]))
                } else {
                    num_check
                        .and_then(|c| c.enums.as_ref())
                        .map(|enums| (0, vec![FmtArg::NumList(enums.clone())]))
                }
            }
            HelpItem::Regex => str_check?
                .regex
                .as_ref()
                .map(|re| (0, vec![FmtArg::Regex(re.as_str().to_string())])),
            HelpItem::Range => num_check?
                .range
                .map(|(lo, hi)| (0, vec![FmtArg::Num(lo), FmtArg::Num(hi)])),
            HelpItem::Unique => array?.unique.then_some((0, vec![])),
            HelpItem::Limit => array?
                .limit
                .map(|limit| (0, vec![FmtArg::Num(limit as f64)])),
            HelpItem::Requires => opt.requires.as_ref().map(|requires| {
                let mut doc = TermString::new();
                self.requires_doc(requires, false, &mut doc);
                (0, vec![FmtArg::Term(doc)])
            }),
            HelpItem::Required => opt.required.then_some((0, vec![])),
            HelpItem::Default => match val?.default.as_ref()? {
                DefaultValue::Value(value) => {
                    let mut doc = TermString::new();
                    self.styles.push_value(value, &mut doc);
                    Some((0, vec![FmtArg::Term(doc)]))
                }
                // a callable default has no static rendition
                DefaultValue::Call(_) => None,
            },
            HelpItem::Deprecated => opt.deprecated.as_ref().map(|reason| {
                (0, vec![FmtArg::Term(TermString::from(reason.as_str()))])
            }),
            HelpItem::Link => opt
                .link
                .as_ref()
                .map(|url| (0, vec![FmtArg::Url(url.clone())])),
        }
    }

    /// Declarative rendition of a requirement tree for the help output
    fn requires_doc(&self, requires: &Requires, negate: bool, out: &mut TermString) {
        match requires {
            Requires::Present(key) => {
                if negate {
                    out.word("no");
                }
                self.push_key_name(key, out);
            }
            Requires::Absent(key) => {
                if !negate {
                    out.word("no");
                }
                self.push_key_name(key, out);
            }
            Requires::Equals(key, value) => {
                self.push_key_name(key, out);
                out.push_str(if negate { "!=" } else { "=" });
                let mut doc = TermString::new();
                self.styles.push_value(value, &mut doc);
                out.append_merged(&doc);
            }
            Requires::All(items) | Requires::One(items) => {
                let conjunction = matches!(requires, Requires::All(_)) != negate;
                let wrap = items.len() > 1;
                if wrap {
                    out.word("(");
                }
                for (ix, item) in items.iter().enumerate() {
                    if ix != 0 {
                        out.word(if conjunction { "and" } else { "or" });
                    }
                    self.requires_doc(item, negate, out);
                }
                if wrap {
                    out.word(")");
                }
            }
            Requires::Not(item) => self.requires_doc(item, !negate, out),
        }
    }

    fn push_key_name(&self, key: &str, out: &mut TermString) {
        let name = match self.registry.index_of_key(key) {
            Some(ix) => self.registry.opt(ix).display_name().to_string(),
            None => key.to_string(),
        };
        self.styles.push_arg(&FmtArg::OptName(name), out);
    }
}

/// Caller width, `COLUMNS`, then the fallback constant
pub(crate) fn output_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|w| *w > 0)
        .unwrap_or(DEFAULT_WIDTH)
}
