//! JSON configuration import
//!
//! Maps a JSON document onto [`HelpConfig`] and [`ErrorConfig`] so that
//! phrase tables and column layout can live next to an application's other
//! configuration. Unknown keys are rejected, a misspelled setting should
//! not be silently ignored.

use serde_json::Value as Json;

use crate::error::{ErrorConfig, ErrorKind};
use crate::help::{ColumnConfig, HelpConfig, HelpItem};

fn expect_object<'a>(
    json: &'a Json,
    what: &str,
) -> Result<&'a serde_json::Map<String, Json>, String> {
    json.as_object()
        .ok_or_else(|| format!("{} must be an object", what))
}

fn column_from_json(json: &Json, what: &str) -> Result<ColumnConfig, String> {
    let object = expect_object(json, what)?;
    let mut config = HelpConfig::default().names;
    for (key, value) in object {
        match key.as_str() {
            "indent" => {
                config.indent = value
                    .as_u64()
                    .ok_or_else(|| format!("{}.indent must be a non-negative integer", what))?
                    as usize;
            }
            "absolute" => {
                config.absolute = value
                    .as_bool()
                    .ok_or_else(|| format!("{}.absolute must be a boolean", what))?;
            }
            "breaks" => {
                config.breaks = value
                    .as_u64()
                    .ok_or_else(|| format!("{}.breaks must be a non-negative integer", what))?
                    as usize;
            }
            "hidden" => {
                config.hidden = value
                    .as_bool()
                    .ok_or_else(|| format!("{}.hidden must be a boolean", what))?;
            }
            other => return Err(format!("unknown key {}.{}", what, other)),
        }
    }
    Ok(config)
}

fn help_item_from_name(name: &str) -> Option<HelpItem> {
    Some(match name {
        "synopsis" => HelpItem::Synopsis,
        "negation" => HelpItem::Negation,
        "separator" => HelpItem::Separator,
        "variadic" => HelpItem::Variadic,
        "positional" => HelpItem::Positional,
        "append" => HelpItem::Append,
        "trim" => HelpItem::Trim,
        "case" => HelpItem::Case,
        "round" => HelpItem::Round,
        "enums" => HelpItem::Enums,
        "regex" => HelpItem::Regex,
        "range" => HelpItem::Range,
        "unique" => HelpItem::Unique,
        "limit" => HelpItem::Limit,
        "requires" => HelpItem::Requires,
        "required" => HelpItem::Required,
        "default" => HelpItem::Default,
        "deprecated" => HelpItem::Deprecated,
        "link" => HelpItem::Link,
        _ => return None,
    })
}

fn error_kind_from_name(name: &str) -> Option<ErrorKind> {
    Some(match name {
        "emptyPositionalMarker" => ErrorKind::EmptyPositionalMarker,
        "invalidOptionName" => ErrorKind::InvalidOptionName,
        "optionRequiresItself" => ErrorKind::OptionRequiresItself,
        "unknownRequiredOption" => ErrorKind::UnknownRequiredOption,
        "niladicOptionRequiredValue" => ErrorKind::NiladicOptionRequiredValue,
        "optionZeroEnum" => ErrorKind::OptionZeroEnum,
        "duplicateOptionName" => ErrorKind::DuplicateOptionName,
        "duplicatePositionalOption" => ErrorKind::DuplicatePositionalOption,
        "duplicateStringEnum" => ErrorKind::DuplicateStringEnum,
        "duplicateNumberEnum" => ErrorKind::DuplicateNumberEnum,
        "optionValueIncompatible" => ErrorKind::OptionValueIncompatible,
        "optionEmptyVersion" => ErrorKind::OptionEmptyVersion,
        "unknownOption" => ErrorKind::UnknownOption,
        "unknownOptionWithSimilar" => ErrorKind::UnknownOptionWithSimilar,
        "parseError" => ErrorKind::ParseError,
        "parseErrorWithSimilar" => ErrorKind::ParseErrorWithSimilar,
        "missingParameter" => ErrorKind::MissingParameter,
        "missingRequiredOption" => ErrorKind::MissingRequiredOption,
        "optionRequires" => ErrorKind::OptionRequires,
        "optionInlineValue" => ErrorKind::OptionInlineValue,
        "positionalInlineValue" => ErrorKind::PositionalInlineValue,
        "missingManifest" => ErrorKind::MissingManifest,
        "stringEnums" => ErrorKind::StringEnums,
        "stringRegex" => ErrorKind::StringRegex,
        "numberEnums" => ErrorKind::NumberEnums,
        "numberRange" => ErrorKind::NumberRange,
        "arrayLimit" => ErrorKind::ArrayLimit,
        _ => return None,
    })
}

/// Build a [`HelpConfig`] from a JSON document
pub fn help_config_from_json(json: &Json) -> Result<HelpConfig, String> {
    let object = expect_object(json, "help config")?;
    let mut config = HelpConfig::default();
    for (key, value) in object {
        match key.as_str() {
            "names" => config.names = column_from_json(value, "names")?,
            "param" => config.param = column_from_json(value, "param")?,
            "descr" => config.descr = column_from_json(value, "descr")?,
            "items" => {
                let items = value
                    .as_array()
                    .ok_or_else(|| "items must be an array".to_string())?;
                config.items = items
                    .iter()
                    .map(|item| {
                        item.as_str()
                            .and_then(help_item_from_name)
                            .ok_or_else(|| format!("unknown help item {}", item))
                    })
                    .collect::<Result<_, _>>()?;
            }
            "phrases" => {
                let phrases = expect_object(value, "phrases")?;
                for (name, phrase) in phrases {
                    let item = help_item_from_name(name)
                        .ok_or_else(|| format!("unknown help item {}", name))?;
                    let phrase = phrase
                        .as_str()
                        .ok_or_else(|| format!("phrase for {} must be a string", name))?;
                    config.phrases.insert(item, phrase.to_string());
                }
            }
            other => return Err(format!("unknown key {}", other)),
        }
    }
    Ok(config)
}

/// Build an [`ErrorConfig`] from a JSON document
pub fn error_config_from_json(json: &Json) -> Result<ErrorConfig, String> {
    let object = expect_object(json, "error config")?;
    let mut config = ErrorConfig::default();
    for (key, value) in object {
        match key.as_str() {
            "phrases" => {
                let phrases = expect_object(value, "phrases")?;
                for (name, phrase) in phrases {
                    let kind = error_kind_from_name(name)
                        .ok_or_else(|| format!("unknown error kind {}", name))?;
                    let phrase = phrase
                        .as_str()
                        .ok_or_else(|| format!("phrase for {} must be a string", name))?;
                    config.phrases.insert(kind, phrase.to_string());
                }
            }
            other => return Err(format!("unknown key {}", other)),
        }
    }
    Ok(config)
}
