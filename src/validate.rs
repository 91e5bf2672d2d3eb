//! Schema validation
//!
//! [`Registry`] is built once per parser from the option definitions. The
//! constructor performs the structural pass: it indexes every name
//! (including flag negations and the positional marker), records the single
//! positional slot, collects the always-required keys and fills in missing
//! preferred names. The deep pass ([`Registry::validate`]) is opt-in and
//! checks everything else: name syntax, requirement references, enum sets
//! and that every default and example survives the same normalization
//! pipeline the parser applies to user input.

use std::collections::BTreeMap;
use std::rc::Rc;

use regex::Regex;

use crate::error::{Error, ErrorKind, FmtArg};
use crate::norm::normalize_value;
use crate::opts::{DefaultValue, Kind, Opt, OptValues, Positional};

pub(crate) struct Registry {
    pub(crate) opts: Rc<Vec<(String, Opt)>>,
    /// every user-facing name, negations and markers included
    pub(crate) names: BTreeMap<String, usize>,
    pub(crate) positional: Option<usize>,
    pub(crate) required: Vec<usize>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry").finish_non_exhaustive()
    }
}

fn opt_name_err(kind: ErrorKind, name: &str) -> Error {
    Error::new(kind, vec![FmtArg::OptName(name.to_string())])
}

impl Registry {
    pub(crate) fn new(mut opts: Vec<(String, Opt)>) -> Result<Self, Error> {
        let mut names = BTreeMap::new();
        let mut positional = None;
        let mut required = Vec::new();

        for (ix, (key, opt)) in opts.iter_mut().enumerate() {
            if opt.preferred_name.is_none() {
                opt.preferred_name = opt
                    .names
                    .iter()
                    .flatten()
                    .find(|n| !n.is_empty())
                    .cloned();
            }
            if opt.preferred_name.is_none() {
                return Err(opt_name_err(ErrorKind::InvalidOptionName, key));
            }

            let mut register = |name: &str| -> Result<(), Error> {
                if names.insert(name.to_string(), ix).is_some() {
                    return Err(opt_name_err(ErrorKind::DuplicateOptionName, name));
                }
                Ok(())
            };
            for name in opt.names.iter().flatten() {
                if !name.is_empty() {
                    register(name)?;
                }
            }
            if let Kind::Flag { negation } = &opt.kind {
                for name in negation {
                    register(name)?;
                }
            }
            if let Some(Positional::Marker(marker)) =
                opt.kind.val_spec().and_then(|v| v.positional.as_ref())
            {
                if !marker.is_empty() {
                    register(marker)?;
                }
            }

            if opt.kind.val_spec().is_some_and(|v| v.positional.is_some()) {
                if positional.is_some() {
                    return Err(opt_name_err(
                        ErrorKind::DuplicatePositionalOption,
                        opt.display_name(),
                    ));
                }
                positional = Some(ix);
            }

            if opt.required {
                required.push(ix);
            }
        }

        Ok(Registry {
            opts: Rc::new(opts),
            names,
            positional,
            required,
        })
    }

    pub(crate) fn from_shared(opts: Rc<Vec<(String, Opt)>>) -> Result<Self, Error> {
        // nested command schemas arrive pre-normalized behind an Rc
        Registry::new(opts.as_ref().clone())
    }

    pub(crate) fn opt(&self, ix: usize) -> &Opt {
        &self.opts[ix].1
    }

    pub(crate) fn key(&self, ix: usize) -> &str {
        &self.opts[ix].0
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<usize> {
        self.names.get(name).copied()
    }

    pub(crate) fn index_of_key(&self, key: &str) -> Option<usize> {
        self.opts.iter().position(|(k, _)| k == key)
    }

    /// Fresh values record with every key present and unset
    pub(crate) fn init_values(&self) -> OptValues {
        let mut values = OptValues::default();
        for (key, _) in self.opts.iter() {
            values.0.insert(key.clone(), None);
        }
        values
    }

    /// Deep validation pass
    pub(crate) fn validate(&self) -> Result<(), Error> {
        let bad_name = Regex::new(r"[\s=]").expect("name pattern is well formed");

        for (key, opt) in self.opts.iter() {
            let display = opt.display_name();

            let check_name = |name: &str| -> Result<(), Error> {
                if name.is_empty() || bad_name.is_match(name) {
                    return Err(opt_name_err(ErrorKind::InvalidOptionName, name));
                }
                Ok(())
            };
            for name in opt.names.iter().flatten() {
                check_name(name)?;
            }
            if let Kind::Flag { negation } = &opt.kind {
                for name in negation {
                    check_name(name)?;
                }
            }

            if let Some(Positional::Marker(marker)) =
                opt.kind.val_spec().and_then(|v| v.positional.as_ref())
            {
                if marker.is_empty() {
                    return Err(opt_name_err(ErrorKind::EmptyPositionalMarker, display));
                }
                check_name(marker)?;
            }

            if let Kind::Version { version, .. } = &opt.kind {
                if version.as_deref() == Some("") {
                    return Err(opt_name_err(ErrorKind::OptionEmptyVersion, display));
                }
            }

            self.validate_enums(opt, display)?;

            if let Some(requires) = &opt.requires {
                self.validate_requires(key, requires)?;
            }

            if let Some(val) = opt.kind.val_spec() {
                if let Some(DefaultValue::Value(default)) = &val.default {
                    normalize_value(&opt.kind, display, default.clone())?;
                }
                if let Some(example) = &val.example {
                    normalize_value(&opt.kind, display, example.clone())?;
                }
            }

            // a nested schema is validated along with its parent
            if let Kind::Command { opts, .. } = &opt.kind {
                Registry::from_shared(opts.clone())?.validate()?;
            }
        }
        Ok(())
    }

    fn validate_enums(&self, opt: &Opt, display: &str) -> Result<(), Error> {
        match &opt.kind {
            Kind::Str { check, .. } | Kind::Strs { check, .. } => {
                if let Some(enums) = &check.enums {
                    if enums.is_empty() {
                        return Err(opt_name_err(ErrorKind::OptionZeroEnum, display));
                    }
                    let mut seen = std::collections::BTreeSet::new();
                    for item in enums {
                        let mut folded = if check.trim { item.trim() } else { item }.to_string();
                        match check.case {
                            Some(crate::opts::CaseFold::Lower) => folded = folded.to_lowercase(),
                            Some(crate::opts::CaseFold::Upper) => folded = folded.to_uppercase(),
                            None => {}
                        }
                        if !seen.insert(folded) {
                            return Err(Error::new(
                                ErrorKind::DuplicateStringEnum,
                                vec![
                                    FmtArg::OptName(display.to_string()),
                                    FmtArg::Str(item.clone()),
                                ],
                            ));
                        }
                    }
                }
            }
            Kind::Num { check, .. } | Kind::Nums { check, .. } => {
                if let Some(enums) = &check.enums {
                    if enums.is_empty() {
                        return Err(opt_name_err(ErrorKind::OptionZeroEnum, display));
                    }
                    for (a, item) in enums.iter().enumerate() {
                        if enums[..a].contains(item) {
                            return Err(Error::new(
                                ErrorKind::DuplicateNumberEnum,
                                vec![FmtArg::OptName(display.to_string()), FmtArg::Num(*item)],
                            ));
                        }
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn validate_requires(&self, owner: &str, requires: &crate::requires::Requires) -> Result<(), Error> {
        let mut err = None;
        requires.visit_keys(&mut |key| {
            if err.is_some() {
                return;
            }
            if key == owner {
                err = Some(opt_name_err(ErrorKind::OptionRequiresItself, owner));
            } else if self.index_of_key(key).is_none() {
                err = Some(opt_name_err(ErrorKind::UnknownRequiredOption, key));
            }
        });
        if let Some(err) = err {
            return Err(err);
        }

        let mut err = None;
        requires.visit_value_leaves(&mut |key, value| {
            if err.is_some() {
                return;
            }
            if let Some(ix) = self.index_of_key(key) {
                let target = self.opt(ix);
                if target.kind.is_niladic() {
                    err = Some(opt_name_err(
                        ErrorKind::NiladicOptionRequiredValue,
                        target.display_name(),
                    ));
                    return;
                }
                if let Err(e) =
                    normalize_value(&target.kind, target.display_name(), value.clone())
                {
                    err = Some(e);
                }
            }
        });
        match err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opts::{NumCheck, StrCheck};
    use crate::requires::Requires;

    fn schema(opts: Vec<(&str, Opt)>) -> Vec<(String, Opt)> {
        opts.into_iter().map(|(k, o)| (k.to_string(), o)).collect()
    }

    #[test]
    fn construction_indexes_every_name() {
        let registry = Registry::new(schema(vec![
            ("flag", Opt::flag(&["-f", "--flag"]).negation(&["--no-flag"])),
            ("pos", Opt::strings(&["files"]).positional_marker("--")),
        ]))
        .unwrap();
        assert_eq!(registry.lookup("-f"), Some(0));
        assert_eq!(registry.lookup("--flag"), Some(0));
        assert_eq!(registry.lookup("--no-flag"), Some(0));
        assert_eq!(registry.lookup("--"), Some(1));
        assert_eq!(registry.positional, Some(1));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = Registry::new(schema(vec![
            ("a", Opt::flag(&["-x"])),
            ("b", Opt::string(&["-x"])),
        ]))
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateOptionName);
    }

    #[test]
    fn second_positional_is_rejected() {
        let err = Registry::new(schema(vec![
            ("a", Opt::strings(&["-a"]).positional()),
            ("b", Opt::strings(&["-b"]).positional()),
        ]))
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicatePositionalOption);
    }

    #[test]
    fn names_with_spaces_or_equals_fail_validation() {
        for bad in ["-x y", "-x=y"] {
            let registry = Registry::new(schema(vec![("a", Opt::flag(&[bad]))])).unwrap();
            assert_eq!(
                registry.validate().unwrap_err().kind,
                ErrorKind::InvalidOptionName
            );
        }
    }

    #[test]
    fn requirement_references_are_checked() {
        let registry = Registry::new(schema(vec![(
            "a",
            Opt::flag(&["-a"]).requires(Requires::present("a")),
        )]))
        .unwrap();
        assert_eq!(
            registry.validate().unwrap_err().kind,
            ErrorKind::OptionRequiresItself
        );

        let registry = Registry::new(schema(vec![(
            "a",
            Opt::flag(&["-a"]).requires(Requires::present("ghost")),
        )]))
        .unwrap();
        assert_eq!(
            registry.validate().unwrap_err().kind,
            ErrorKind::UnknownRequiredOption
        );
    }

    #[test]
    fn requirement_value_on_niladic_option_is_rejected() {
        let registry = Registry::new(schema(vec![
            ("a", Opt::string(&["-a"]).requires(Requires::equals("f", true))),
            ("f", Opt::flag(&["-f"])),
        ]))
        .unwrap();
        assert_eq!(
            registry.validate().unwrap_err().kind,
            ErrorKind::NiladicOptionRequiredValue
        );
    }

    #[test]
    fn defaults_run_through_the_value_pipeline() {
        let registry = Registry::new(schema(vec![(
            "n",
            Opt::number(&["-n"])
                .num_check(NumCheck {
                    enums: None,
                    range: Some((0.0, 10.0)),
                    round: None,
                })
                .default_value(42.0),
        )]))
        .unwrap();
        assert_eq!(
            registry.validate().unwrap_err().kind,
            ErrorKind::NumberRange
        );
    }

    #[test]
    fn enum_sets_must_be_nonempty_and_distinct() {
        let registry = Registry::new(schema(vec![(
            "s",
            Opt::string(&["-s"]).str_check(StrCheck {
                enums: Some(vec![]),
                ..StrCheck::default()
            }),
        )]))
        .unwrap();
        assert_eq!(
            registry.validate().unwrap_err().kind,
            ErrorKind::OptionZeroEnum
        );

        let registry = Registry::new(schema(vec![(
            "s",
            Opt::string(&["-s"]).str_check(StrCheck {
                enums: Some(vec!["A".to_string(), " a ".to_string()]),
                trim: true,
                case: Some(crate::opts::CaseFold::Upper),
                regex: None,
            }),
        )]))
        .unwrap();
        assert_eq!(
            registry.validate().unwrap_err().kind,
            ErrorKind::DuplicateStringEnum
        );
    }

    #[test]
    fn empty_version_literal_is_rejected() {
        let registry =
            Registry::new(schema(vec![("v", Opt::version(&["--version"], Some("")))])).unwrap();
        assert_eq!(
            registry.validate().unwrap_err().kind,
            ErrorKind::OptionEmptyVersion
        );
    }

    #[test]
    fn empty_positional_marker_is_rejected() {
        let registry = Registry::new(schema(vec![(
            "p",
            Opt::strings(&["-p"]).positional_marker(""),
        )]))
        .unwrap();
        assert_eq!(
            registry.validate().unwrap_err().kind,
            ErrorKind::EmptyPositionalMarker
        );
    }
}
