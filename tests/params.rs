use std::rc::Rc;

use declargs::*;

#[test]
fn flag_and_required_string() {
    let parser = Parser::new(schema([
        ("flag", Opt::flag(&["-f", "--flag"])),
        ("name", Opt::string(&["-n"]).required()),
    ]))
    .unwrap();

    let values = parser.parse(Args::from(&["-n", "x"])).unwrap();
    assert_eq!(values.get("flag"), Some(&Value::Bool(false)));
    assert_eq!(values.get("name"), Some(&Value::Str("x".to_string())));

    let err = parser.parse(Args::from(&[])).unwrap_err().unwrap_stderr();
    assert_eq!(err, "Option -n is required.");
}

#[test]
fn flag_negation_names() {
    let parser = Parser::new(schema([(
        "color",
        Opt::flag(&["--color"]).negation(&["--no-color"]),
    )]))
    .unwrap();

    let values = parser.parse(Args::from(&["--color"])).unwrap();
    assert_eq!(values.get("color"), Some(&Value::Bool(true)));

    let values = parser.parse(Args::from(&["--no-color"])).unwrap();
    assert_eq!(values.get("color"), Some(&Value::Bool(false)));
}

#[test]
fn inline_values() {
    let parser = Parser::new(schema([
        ("name", Opt::string(&["-n"])),
        ("count", Opt::number(&["-c"])),
    ]))
    .unwrap();

    let values = parser.parse(Args::from(&["-n=x", "-c=2"])).unwrap();
    assert_eq!(values.get("name"), Some(&Value::Str("x".to_string())));
    assert_eq!(values.get("count"), Some(&Value::Num(2.0)));
}

#[test]
fn boolean_conversion_rules() {
    let parser = Parser::new(schema([("b", Opt::boolean(&["-b"]))])).unwrap();
    for (raw, expected) in [("0", false), ("false", false), ("FALSE", false), ("1", true)] {
        let values = parser.parse(Args::from(&["-b", raw])).unwrap();
        assert_eq!(values.get("b"), Some(&Value::Bool(expected)), "{}", raw);
    }
}

#[test]
fn number_round_and_range() {
    let parser = Parser::new(schema([(
        "n",
        Opt::number(&["-n"]).num_check(NumCheck {
            enums: None,
            range: Some((0.0, 10.0)),
            round: Some(Round::Floor),
        }),
    )]))
    .unwrap();

    let values = parser.parse(Args::from(&["-n", "3.7"])).unwrap();
    assert_eq!(values.get("n"), Some(&Value::Num(3.0)));

    let err = parser
        .parse(Args::from(&["-n", "11"]))
        .unwrap_err()
        .unwrap_stderr();
    assert_eq!(
        err,
        "Invalid parameter to -n: 11. Value must be in the range [0, 10]."
    );
}

#[test]
fn normalization_is_idempotent() {
    let parser = Parser::new(schema([(
        "n",
        Opt::number(&["-n"]).num_check(NumCheck {
            enums: None,
            range: Some((0.0, 10.0)),
            round: Some(Round::Floor),
        }),
    )]))
    .unwrap();

    let first = parser.parse(Args::from(&["-n", "3.7"])).unwrap();
    // feeding the normalized value back yields an equal record
    let second = parser.parse(Args::from(&["-n", "3"])).unwrap();
    assert_eq!(first, second);
}

#[test]
fn separator_unique_and_limit() {
    let parser = Parser::new(schema([(
        "s",
        Opt::strings(&["-s"]).separator(",").array_spec(ArraySpec {
            separator: Some(Separator::Text(",".to_string())),
            append: false,
            unique: true,
            limit: Some(2),
            parse_delimited: None,
        }),
    )]))
    .unwrap();

    let values = parser.parse(Args::from(&["-s", "a,a,b"])).unwrap();
    assert_eq!(
        values.get("s"),
        Some(&Value::StrArray(vec!["a".to_string(), "b".to_string()]))
    );

    let err = parser
        .parse(Args::from(&["-s", "a,b,c"]))
        .unwrap_err()
        .unwrap_stderr();
    assert_eq!(
        err,
        "Option -s has too many values (3). Should have at most 2."
    );
}

#[test]
fn variadic_arrays_consume_until_the_next_name() {
    let parser = Parser::new(schema([
        ("s", Opt::strings(&["-s"])),
        ("flag", Opt::flag(&["-f"])),
    ]))
    .unwrap();

    let values = parser.parse(Args::from(&["-s", "a", "b", "-f"])).unwrap();
    assert_eq!(
        values.get("s"),
        Some(&Value::StrArray(vec!["a".to_string(), "b".to_string()]))
    );
    assert_eq!(values.get("flag"), Some(&Value::Bool(true)));
}

#[test]
fn second_specification_replaces_without_append() {
    let parser = Parser::new(schema([("s", Opt::strings(&["-s"]))])).unwrap();
    let values = parser.parse(Args::from(&["-s", "a", "-s", "b"])).unwrap();
    assert_eq!(values.get("s"), Some(&Value::StrArray(vec!["b".to_string()])));
}

#[test]
fn append_concatenates_left_to_right() {
    let parser = Parser::new(schema([(
        "s",
        Opt::strings(&["-s"]).array_spec(ArraySpec {
            append: true,
            ..ArraySpec::default()
        }),
    )]))
    .unwrap();
    let values = parser.parse(Args::from(&["-s", "a", "-s", "b"])).unwrap();
    assert_eq!(
        values.get("s"),
        Some(&Value::StrArray(vec!["a".to_string(), "b".to_string()]))
    );
}

#[test]
fn append_extends_a_prepopulated_record() {
    let parser = Parser::new(schema([(
        "s",
        Opt::strings(&["-s"]).array_spec(ArraySpec {
            append: true,
            ..ArraySpec::default()
        }),
    )]))
    .unwrap();

    let mut values = OptValues::default();
    values.set("s", Value::StrArray(vec!["x".to_string()]));
    let specified = parser.parse_into(&mut values, Args::from(&["-s", "a"])).unwrap();
    assert!(specified.contains("s"));
    assert_eq!(
        values.get("s"),
        Some(&Value::StrArray(vec!["x".to_string(), "a".to_string()]))
    );
}

#[test]
fn positional_tokens_fill_the_positional_slot() {
    let parser = Parser::new(schema([
        ("flag", Opt::flag(&["-f"])),
        ("files", Opt::strings(&["--files"]).positional()),
    ]))
    .unwrap();

    let values = parser.parse(Args::from(&["one", "-f", "two"])).unwrap();
    assert_eq!(
        values.get("files"),
        Some(&Value::StrArray(vec!["one".to_string(), "two".to_string()]))
    );
    assert_eq!(values.get("flag"), Some(&Value::Bool(true)));
}

#[test]
fn positional_marker_forces_everything_positional() {
    let parser = Parser::new(schema([
        ("flag", Opt::flag(&["-f"])),
        ("files", Opt::strings(&["--files"]).positional_marker("--")),
    ]))
    .unwrap();

    let values = parser.parse(Args::from(&["--", "-f", "two"])).unwrap();
    assert_eq!(
        values.get("files"),
        Some(&Value::StrArray(vec!["-f".to_string(), "two".to_string()]))
    );
    // the marker itself is not a specification of the flag
    assert_eq!(values.get("flag"), Some(&Value::Bool(false)));
}

#[test]
fn string_trim_case_and_enums() {
    let parser = Parser::new(schema([(
        "s",
        Opt::string(&["-s"]).str_check(StrCheck {
            enums: Some(vec!["ONE".to_string(), "TWO".to_string()]),
            regex: None,
            trim: true,
            case: Some(CaseFold::Upper),
        }),
    )]))
    .unwrap();

    let values = parser.parse(Args::from(&["-s", " one "])).unwrap();
    assert_eq!(values.get("s"), Some(&Value::Str("ONE".to_string())));

    let err = parser
        .parse(Args::from(&["-s", "three"]))
        .unwrap_err()
        .unwrap_stderr();
    assert_eq!(
        err,
        "Invalid parameter to -s: 'THREE'. Possible values are: 'ONE', 'TWO'."
    );
}

#[test]
fn defaults_apply_to_unspecified_keys() {
    let parser = Parser::new(schema([
        ("name", Opt::string(&["-n"]).default_value("anon")),
        ("count", Opt::number(&["-c"])),
        (
            "copy",
            Opt::string(&["-p"]).default_fn(Rc::new(|values: &OptValues| {
                match values.get("name") {
                    Some(Value::Str(s)) => Value::Str(format!("{}!", s)),
                    _ => Value::Str(String::new()),
                }
            })),
        ),
    ]))
    .unwrap();

    let values = parser.parse(Args::from(&[])).unwrap();
    assert_eq!(values.get("name"), Some(&Value::Str("anon".to_string())));
    assert_eq!(values.get("count"), None);
    // callable defaults observe earlier defaults
    assert_eq!(values.get("copy"), Some(&Value::Str("anon!".to_string())));
}

#[test]
fn defaults_run_through_normalization() {
    let parser = Parser::new(schema([(
        "n",
        Opt::number(&["-n"])
            .num_check(NumCheck {
                enums: None,
                range: None,
                round: Some(Round::Ceil),
            })
            .default_value(1.2),
    )]))
    .unwrap();
    let values = parser.parse(Args::from(&[])).unwrap();
    assert_eq!(values.get("n"), Some(&Value::Num(2.0)));
}

#[test]
fn custom_parse_callback() {
    let parser = Parser::new(schema([(
        "n",
        Opt::number(&["-n"]).parse_with(Rc::new(|raw: &str| {
            raw.trim_start_matches('#')
                .parse::<f64>()
                .map(Value::Num)
                .map_err(|e| e.to_string())
        })),
    )]))
    .unwrap();

    let values = parser.parse(Args::from(&["-n", "#7"])).unwrap();
    assert_eq!(values.get("n"), Some(&Value::Num(7.0)));
}

#[test]
fn parse_delimited_callback() {
    let parser = Parser::new(schema([(
        "s",
        Opt::strings(&["-s"]).array_spec(ArraySpec {
            parse_delimited: Some(Rc::new(|raw: &str| {
                Ok(raw
                    .split(':')
                    .map(|piece| Value::Str(piece.to_string()))
                    .collect())
            })),
            ..ArraySpec::default()
        }),
    )]))
    .unwrap();

    let values = parser.parse(Args::from(&["-s", "a:b"])).unwrap();
    assert_eq!(
        values.get("s"),
        Some(&Value::StrArray(vec!["a".to_string(), "b".to_string()]))
    );
}

#[test]
fn function_option_with_break() {
    let parser = Parser::new(schema([
        (
            "probe",
            Opt::function(
                &["--probe"],
                Rc::new(|_values: &mut OptValues, _completing: bool, rest: &[String]| {
                    Ok(Some(Value::Num(rest.len() as f64)))
                }),
            )
            .breaks(),
        ),
        ("flag", Opt::flag(&["-f"])),
    ]))
    .unwrap();

    // the loop stops at the break, -f is never consumed
    let values = parser.parse(Args::from(&["--probe", "-f"])).unwrap();
    assert_eq!(values.get("probe"), Some(&Value::Num(1.0)));
    assert_eq!(values.get("flag"), Some(&Value::Bool(false)));
}

#[test]
fn command_option_parses_the_remaining_arguments() {
    let inner = schema([("verbose", Opt::flag(&["-v"]))]);
    let parser = Parser::new(schema([
        ("flag", Opt::flag(&["-f"])),
        (
            "sub",
            Opt::command(
                &["sub"],
                inner,
                Rc::new(|outer: &OptValues, inner: OptValues| {
                    let outer_flag = outer.get("flag") == Some(&Value::Bool(true));
                    let inner_flag = inner.get("verbose") == Some(&Value::Bool(true));
                    Ok(Value::Bool(outer_flag && inner_flag))
                }),
            ),
        ),
    ]))
    .unwrap();

    let values = parser.parse(Args::from(&["-f", "sub", "-v"])).unwrap();
    assert_eq!(values.get("sub"), Some(&Value::Bool(true)));
}

#[test]
fn version_option_with_literal() {
    let parser = Parser::new(schema([(
        "version",
        Opt::version(&["--version"], Some("1.2.3")),
    )]))
    .unwrap();

    let out = parser
        .parse(Args::from(&["--version"]))
        .unwrap_err()
        .unwrap_stdout();
    assert_eq!(out, "1.2.3");
}

#[test]
fn parse_line_drops_the_program_name() {
    let parser = Parser::new(schema([("name", Opt::string(&["-n"]))])).unwrap();
    let values = parser.parse_line("prog -n 'hello world'").unwrap();
    assert_eq!(
        values.get("name"),
        Some(&Value::Str("hello world".to_string()))
    );
}

#[test]
fn empty_stream_with_all_optional_schema() {
    let parser = Parser::new(schema([
        ("flag", Opt::flag(&["-f"])),
        ("name", Opt::string(&["-n"])),
        ("nums", Opt::numbers(&["-x"])),
    ]))
    .unwrap();
    let mut values = OptValues::default();
    let specified = parser.parse_into(&mut values, Args::from(&[])).unwrap();
    assert!(specified.is_empty());
    assert_eq!(values.get("flag"), Some(&Value::Bool(false)));
    assert_eq!(values.get("name"), None);
    assert_eq!(values.get("nums"), None);
}
