//! Value normalizers
//!
//! Pure functions applied to parsed values before storage and before
//! constraint checks. The validator runs defaults and examples through the
//! same pipeline, so a schema cannot declare a value its own parser would
//! reject.

use crate::error::{Error, ErrorKind, FmtArg};
use crate::opts::{ArraySpec, CaseFold, Kind, NumCheck, Round, StrCheck, Value};

/// trim, fold case, then check enums or regex
pub(crate) fn normalize_string(
    check: &StrCheck,
    name: &str,
    raw: &str,
) -> Result<String, Error> {
    let mut value = if check.trim { raw.trim() } else { raw }.to_string();
    match check.case {
        Some(CaseFold::Lower) => value = value.to_lowercase(),
        Some(CaseFold::Upper) => value = value.to_uppercase(),
        None => {}
    }
    if let Some(enums) = &check.enums {
        if !enums.contains(&value) {
            return Err(Error::new(
                ErrorKind::StringEnums,
                vec![
                    FmtArg::OptName(name.to_string()),
                    FmtArg::Str(value),
                    FmtArg::StrList(enums.clone()),
                ],
            ));
        }
    }
    if let Some(regex) = &check.regex {
        if !regex.is_match(&value) {
            return Err(Error::new(
                ErrorKind::StringRegex,
                vec![
                    FmtArg::OptName(name.to_string()),
                    FmtArg::Str(value),
                    FmtArg::Regex(regex.as_str().to_string()),
                ],
            ));
        }
    }
    Ok(value)
}

/// round, then check enums or range; `NaN` fails either check
pub(crate) fn normalize_number(check: &NumCheck, name: &str, raw: f64) -> Result<f64, Error> {
    let value = match check.round {
        Some(Round::Trunc) => raw.trunc(),
        Some(Round::Floor) => raw.floor(),
        Some(Round::Ceil) => raw.ceil(),
        Some(Round::Round) => raw.round(),
        None => raw,
    };
    if let Some(enums) = &check.enums {
        if !enums.contains(&value) {
            return Err(Error::new(
                ErrorKind::NumberEnums,
                vec![
                    FmtArg::OptName(name.to_string()),
                    FmtArg::Num(value),
                    FmtArg::NumList(enums.clone()),
                ],
            ));
        }
    }
    if let Some((lo, hi)) = check.range {
        // a NaN comparison is false, so it fails the range as required
        if !(value >= lo && value <= hi) {
            return Err(Error::new(
                ErrorKind::NumberRange,
                vec![
                    FmtArg::OptName(name.to_string()),
                    FmtArg::Num(value),
                    FmtArg::Num(lo),
                    FmtArg::Num(hi),
                ],
            ));
        }
    }
    Ok(value)
}

fn check_limit(array: &ArraySpec, name: &str, len: usize) -> Result<(), Error> {
    if let Some(limit) = array.limit {
        if len > limit {
            return Err(Error::new(
                ErrorKind::ArrayLimit,
                vec![
                    FmtArg::OptName(name.to_string()),
                    FmtArg::Num(len as f64),
                    FmtArg::Num(limit as f64),
                ],
            ));
        }
    }
    Ok(())
}

/// dedupe preserving first occurrence when `unique`, then check the limit
pub(crate) fn normalize_str_array(
    array: &ArraySpec,
    name: &str,
    items: &mut Vec<String>,
) -> Result<(), Error> {
    if array.unique {
        let mut seen = std::collections::BTreeSet::new();
        items.retain(|x| seen.insert(x.clone()));
    }
    check_limit(array, name, items.len())
}

pub(crate) fn normalize_num_array(
    array: &ArraySpec,
    name: &str,
    items: &mut Vec<f64>,
) -> Result<(), Error> {
    if array.unique {
        let mut seen = Vec::new();
        items.retain(|x| {
            if seen.iter().any(|s: &f64| s == x) {
                false
            } else {
                seen.push(*x);
                true
            }
        });
    }
    check_limit(array, name, items.len())
}

fn incompatible(kind: &Kind, name: &str, value: &Value) -> Error {
    Error::new(
        ErrorKind::OptionValueIncompatible,
        vec![
            FmtArg::OptName(name.to_string()),
            FmtArg::Value(value.clone()),
            FmtArg::Str(kind.type_name().to_string()),
        ],
    )
}

/// Run a whole value through the pipeline matching the option kind
///
/// Used for defaults, examples and requirement expectations; parsed
/// parameters go element by element through the functions above instead.
pub(crate) fn normalize_value(kind: &Kind, name: &str, value: Value) -> Result<Value, Error> {
    match (kind, value) {
        (Kind::Bool { .. }, Value::Bool(b)) => Ok(Value::Bool(b)),
        (Kind::Flag { .. }, Value::Bool(b)) => Ok(Value::Bool(b)),
        (Kind::Str { check, .. }, Value::Str(s)) => {
            Ok(Value::Str(normalize_string(check, name, &s)?))
        }
        (Kind::Num { check, .. }, Value::Num(n)) => {
            Ok(Value::Num(normalize_number(check, name, n)?))
        }
        (Kind::Strs { check, array, .. }, Value::StrArray(xs)) => {
            let mut items = xs
                .iter()
                .map(|x| normalize_string(check, name, x))
                .collect::<Result<Vec<_>, _>>()?;
            normalize_str_array(array, name, &mut items)?;
            Ok(Value::StrArray(items))
        }
        (Kind::Nums { check, array, .. }, Value::NumArray(xs)) => {
            let mut items = xs
                .iter()
                .map(|x| normalize_number(check, name, *x))
                .collect::<Result<Vec<_>, _>>()?;
            normalize_num_array(array, name, &mut items)?;
            Ok(Value::NumArray(items))
        }
        (kind, value) => Err(incompatible(kind, name, &value)),
    }
}

/// string to typed conversion for single-valued kinds
///
/// Identity for strings, `f64` parsing for numbers (unparseable input
/// becomes `NaN` and fails the constraint checks), "0" and case-insensitive
/// "false" map to `false` for booleans, anything else is `true`.
pub(crate) fn convert_bool(raw: &str) -> bool {
    let trimmed = raw.trim();
    !(trimmed == "0" || trimmed.eq_ignore_ascii_case("false"))
}

pub(crate) fn convert_num(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(f64::NAN)
}
