use std::rc::Rc;

use declargs::*;

fn basic() -> Parser {
    Parser::new(schema([
        ("flag", Opt::flag(&["-f", "--flag"])),
        ("name", Opt::string(&["-n"])),
    ]))
    .unwrap()
}

#[test]
fn name_candidates_for_a_prefix() {
    let out = basic()
        .parse(Args::from(&["--fl"]).set_comp(0))
        .unwrap_err()
        .unwrap_stdout();
    assert_eq!(out, "--flag\n");
}

#[test]
fn empty_word_offers_every_visible_name() {
    let out = basic()
        .parse(Args::from(&[""]).set_comp(0))
        .unwrap_err()
        .unwrap_stdout();
    assert_eq!(out, "-f\n--flag\n-n\n");
}

#[test]
fn completing_past_the_last_word() {
    let out = basic()
        .parse(Args::from(&["-f"]).set_comp(1))
        .unwrap_err()
        .unwrap_stdout();
    assert_eq!(out, "-f\n--flag\n-n\n");
}

#[test]
fn hidden_options_are_not_offered() {
    let parser = Parser::new(schema([
        ("flag", Opt::flag(&["-f"])),
        ("secret", Opt::flag(&["--secret"]).hide()),
    ]))
    .unwrap();
    let out = parser
        .parse(Args::from(&[""]).set_comp(0))
        .unwrap_err()
        .unwrap_stdout();
    assert_eq!(out, "-f\n");
}

#[test]
fn enum_values_complete_in_parameter_position() {
    let parser = Parser::new(schema([(
        "s",
        Opt::string(&["-s"]).str_check(StrCheck {
            enums: Some(vec!["one".to_string(), "two".to_string()]),
            ..StrCheck::default()
        }),
    )]))
    .unwrap();

    let out = parser
        .parse(Args::from(&["-s", ""]).set_comp(1))
        .unwrap_err()
        .unwrap_stdout();
    assert_eq!(out, "one\ntwo\n");

    let out = parser
        .parse(Args::from(&["-s", "t"]).set_comp(1))
        .unwrap_err()
        .unwrap_stdout();
    assert_eq!(out, "two\n");
}

#[test]
fn complete_callback_takes_precedence() {
    let parser = Parser::new(schema([(
        "s",
        Opt::string(&["-s"]).complete_with(Rc::new(|_values: &OptValues, word: &str| {
            vec![format!("{}-done", word)]
        })),
    )]))
    .unwrap();
    let out = parser
        .parse(Args::from(&["-s", "ab"]).set_comp(1))
        .unwrap_err()
        .unwrap_stdout();
    assert_eq!(out, "ab-done\n");
}

#[test]
fn greedy_arrays_offer_parameters_and_names() {
    let parser = Parser::new(schema([(
        "s",
        Opt::strings(&["-s"]).str_check(StrCheck {
            enums: Some(vec!["alpha".to_string()]),
            ..StrCheck::default()
        }),
    )]))
    .unwrap();
    let out = parser
        .parse(Args::from(&["-s", ""]).set_comp(1))
        .unwrap_err()
        .unwrap_stdout();
    assert_eq!(out, "alpha\n-s\n");
}

#[test]
fn errors_are_suppressed_in_completion_mode() {
    let failure = basic()
        .parse(Args::from(&["-x", ""]).set_comp(1))
        .unwrap_err();
    assert!(matches!(failure, ParseFailure::Completion(ref s) if s.is_empty()));
}

#[test]
fn help_does_not_fire_in_completion_mode() {
    let parser = Parser::new(schema([("help", Opt::help(&["--help"]))])).unwrap();
    let failure = parser
        .parse(Args::from(&["--help", ""]).set_comp(1))
        .unwrap_err();
    assert!(matches!(failure, ParseFailure::Completion(ref s) if s == "--help\n"));
}

#[test]
fn completion_environment_activates_the_mode() {
    let parser = basic();
    std::env::set_var("COMP_LINE", "prog --fl");
    std::env::set_var("COMP_POINT", "9");
    let result = parser.run();
    std::env::remove_var("COMP_LINE");
    std::env::remove_var("COMP_POINT");
    let out = result.unwrap_err().unwrap_stdout();
    assert_eq!(out, "--flag\n");
}
