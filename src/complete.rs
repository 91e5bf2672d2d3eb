//! Shell completion
//!
//! Completion mode is privileged: when active, the parser never surfaces
//! errors, it throws a newline-joined candidate list through the
//! [`ParseFailure::Completion`](crate::ParseFailure::Completion) channel
//! and the caller prints it verbatim. Activation comes either from the
//! `COMP_LINE` / `COMP_POINT` environment variables or from an explicit
//! completion cursor on [`Args`].

use crate::args::Args;
use crate::error::format_num;
use crate::opts::{Kind, Opt, OptValues};
use crate::parse::Parser;

/// Completion request from the environment, if any
///
/// `COMP_LINE` holds the whole line being edited, `COMP_POINT` the cursor
/// byte offset. The program name is dropped to match the regular argument
/// stream.
pub(crate) fn args_from_env() -> Option<Args> {
    let line = std::env::var("COMP_LINE").ok()?;
    let point = std::env::var("COMP_POINT")
        .ok()
        .and_then(|p| p.trim().parse::<usize>().ok())
        .unwrap_or(line.len());
    let mut args = Args::from_line(&line, Some(point));
    if !args.items.is_empty() {
        args.items.remove(0);
        args.comp = args.comp.map(|c| c.saturating_sub(1));
    }
    Some(args)
}

/// Candidate words for the word under the cursor
///
/// Inside a parameter position the option's own `complete` callback wins,
/// then enum values; in name position every visible name that extends the
/// current prefix is offered, followed by positional parameter candidates
/// when a positional slot exists.
pub(crate) fn candidates(
    parser: &Parser,
    values: &OptValues,
    pending: Option<(usize, bool)>,
    marker: bool,
    word: &str,
) -> String {
    let registry = &parser.registry;
    let mut words = Vec::new();

    match pending {
        Some((ix, greedy)) => {
            param_candidates(registry.opt(ix), values, word, &mut words);
            if greedy {
                name_candidates(parser, word, &mut words);
            }
        }
        None if marker => {
            if let Some(ix) = registry.positional {
                param_candidates(registry.opt(ix), values, word, &mut words);
            }
        }
        None => {
            name_candidates(parser, word, &mut words);
            if let Some(ix) = registry.positional {
                param_candidates(registry.opt(ix), values, word, &mut words);
            }
        }
    }

    words.dedup();
    if words.is_empty() {
        String::new()
    } else {
        let mut out = words.join("\n");
        out.push('\n');
        out
    }
}

fn name_candidates(parser: &Parser, word: &str, out: &mut Vec<String>) {
    for (_, opt) in parser.registry.opts.iter() {
        if opt.hide {
            continue;
        }
        for name in opt.names.iter().flatten() {
            if !name.is_empty() && name.starts_with(word) {
                out.push(name.clone());
            }
        }
        if let Kind::Flag { negation } = &opt.kind {
            for name in negation {
                if name.starts_with(word) {
                    out.push(name.clone());
                }
            }
        }
    }
}

fn param_candidates(opt: &Opt, values: &OptValues, word: &str, out: &mut Vec<String>) {
    if let Some(complete) = opt.kind.val_spec().and_then(|v| v.complete.as_ref()) {
        out.extend(complete(values, word));
        return;
    }
    match &opt.kind {
        Kind::Str { check, .. } | Kind::Strs { check, .. } => {
            if let Some(enums) = &check.enums {
                out.extend(
                    enums
                        .iter()
                        .filter(|e| e.starts_with(word))
                        .cloned(),
                );
            }
        }
        Kind::Num { check, .. } | Kind::Nums { check, .. } => {
            if let Some(enums) = &check.enums {
                out.extend(
                    enums
                        .iter()
                        .map(|n| format_num(*n))
                        .filter(|e| e.starts_with(word)),
                );
            }
        }
        _ => {}
    }
}
