use declargs::*;

#[test]
fn columns_align_at_their_indents() {
    let parser = Parser::new(schema([(
        "all",
        Opt::flag(&["-a", "--all"]).help_text("do all"),
    )]))
    .unwrap();
    let help = HelpFormatter::new(&parser).format_help(Some(80));
    assert_eq!(help.plain(), "  -a, --all    do all.\n");
}

#[test]
fn missing_name_slots_keep_the_alignment() {
    let mut bare = Opt::flag(&["--bare"]).help_text("second");
    bare.names = vec![None, Some("--bare".to_string())];
    let parser = Parser::new(schema([
        ("all", Opt::flag(&["-a", "--all"]).help_text("first")),
        ("bare", bare),
    ]))
    .unwrap();
    let help = HelpFormatter::new(&parser).format_help(Some(80));
    let expected = "\
  -a, --all     first.
      --bare    second.
";
    assert_eq!(help.plain(), expected);
}

#[test]
fn description_items_follow_the_configured_order() {
    let parser = Parser::new(schema([(
        "n",
        Opt::number(&["-n"])
            .num_check(NumCheck {
                enums: None,
                range: Some((0.0, 10.0)),
                round: Some(Round::Floor),
            })
            .default_value(5.0)
            .required()
            .help_text("a number"),
    )]))
    .unwrap();
    let help = HelpFormatter::new(&parser).format_help(Some(200));
    assert_eq!(
        help.plain(),
        "  -n  <number>  a number. Values will be rounded down. \
Values must be in the range [0, 10]. Always required. Defaults to 5.\n"
    );
}

#[test]
fn param_column_prefers_example_then_param_name_then_kind() {
    let parser = Parser::new(schema([
        ("s", Opt::string(&["-s"]).example("abc").help_text("a")),
        ("p", Opt::string(&["-p"]).param_name("FILE").help_text("b")),
        ("q", Opt::string(&["-q"]).help_text("c")),
    ]))
    .unwrap();
    let help = HelpFormatter::new(&parser).format_help(Some(80));
    let expected = "\
  -s  'abc'     a.
  -p  <FILE>    b.
  -q  <string>  c.
";
    assert_eq!(help.plain(), expected);
}

#[test]
fn array_features_are_phrased() {
    let parser = Parser::new(schema([(
        "s",
        Opt::strings(&["-s"])
            .array_spec(ArraySpec {
                separator: Some(Separator::Text(",".to_string())),
                append: true,
                unique: true,
                limit: Some(3),
                parse_delimited: None,
            })
            .help_text("tags"),
    )]))
    .unwrap();
    let help = HelpFormatter::new(&parser).format_help(Some(200)).plain();
    assert!(help.contains("tags."), "{}", help);
    assert!(help.contains("Values are delimited by ','."), "{}", help);
    assert!(help.contains("May be specified multiple times."), "{}", help);
    assert!(help.contains("Duplicate values will be removed."), "{}", help);
    assert!(help.contains("Value count is limited to 3."), "{}", help);
    // no separator means no variadic phrase
    assert!(!help.contains("Accepts multiple parameters."), "{}", help);
}

#[test]
fn string_and_flag_features_are_phrased() {
    let parser = Parser::new(schema([
        (
            "s",
            Opt::string(&["-s"]).str_check(StrCheck {
                enums: Some(vec!["one".to_string(), "two".to_string()]),
                regex: None,
                trim: true,
                case: Some(CaseFold::Lower),
            }),
        ),
        ("f", Opt::flag(&["-f"]).negation(&["--no-f"])),
        (
            "pos",
            Opt::strings(&["--files"]).positional_marker("--").help_text("files"),
        ),
    ]))
    .unwrap();
    let help = HelpFormatter::new(&parser).format_help(Some(200)).plain();
    assert!(help.contains("Values will be trimmed."), "{}", help);
    assert!(
        help.contains("Values will be converted to lowercase."),
        "{}",
        help
    );
    assert!(
        help.contains("Values must be one of 'one', 'two'."),
        "{}",
        help
    );
    assert!(help.contains("Can be negated with --no-f."), "{}", help);
    assert!(
        help.contains("Accepts positional parameters that may be preceded by --."),
        "{}",
        help
    );
}

#[test]
fn requirement_trees_are_documented() {
    let parser = Parser::new(schema([
        (
            "a",
            Opt::flag(&["-a"])
                .requires(Requires::all([
                    Requires::present("b"),
                    Requires::not(Requires::present("c")),
                ]))
                .help_text("a"),
        ),
        ("b", Opt::flag(&["-b"])),
        ("c", Opt::flag(&["-c"])),
    ]))
    .unwrap();
    let help = HelpFormatter::new(&parser).format_help(Some(200)).plain();
    assert!(help.contains("Requires (-b and no -c)."), "{}", help);
}

#[test]
fn groups_render_separately() {
    let parser = Parser::new(schema([
        ("a", Opt::flag(&["-a"]).help_text("plain")),
        ("x", Opt::flag(&["-x"]).group("Extra").help_text("extra")),
    ]))
    .unwrap();
    let formatter = HelpFormatter::new(&parser);
    let groups = formatter.format_groups(Some(80));
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].0, "");
    assert_eq!(groups[1].0, "Extra");
    assert!(groups[0].1.plain().contains("-a"));
    assert!(groups[1].1.plain().contains("-x"));
    // the default group is what format_help returns
    assert_eq!(formatter.format_help(Some(80)).plain(), groups[0].1.plain());
}

#[test]
fn hidden_options_are_skipped() {
    let parser = Parser::new(schema([
        ("a", Opt::flag(&["-a"]).help_text("visible")),
        ("x", Opt::flag(&["--secret"]).hide()),
    ]))
    .unwrap();
    let help = HelpFormatter::new(&parser).format_help(Some(80)).plain();
    assert!(!help.contains("--secret"), "{}", help);
}

#[test]
fn descriptions_wrap_inside_the_window() {
    let parser = Parser::new(schema([(
        "a",
        Opt::flag(&["-a"]).help_text("one two three four five six"),
    )]))
    .unwrap();
    // names end at 4, desc starts at 8
    let help = HelpFormatter::new(&parser).format_help(Some(20)).plain();
    let expected = "\
  -a    one two
        three four
        five six.
";
    assert_eq!(help, expected);
}

#[test]
fn narrow_terminals_degrade_to_column_zero() {
    let parser = Parser::new(schema([(
        "a",
        Opt::flag(&["-a"]).help_text("an-unbreakable-description-token"),
    )]))
    .unwrap();
    let help = HelpFormatter::new(&parser).format_help(Some(12)).plain();
    let expected = "\
  -a
an-unbreakable-description-token.
";
    assert_eq!(help, expected);
}

#[test]
fn item_phrases_are_configurable() {
    let parser = Parser::new(schema([(
        "n",
        Opt::number(&["-n"]).required().help_text("n"),
    )]))
    .unwrap();
    let mut config = HelpConfig::default();
    config
        .phrases
        .insert(HelpItem::Required, "Mandatory.".to_string());
    let help = HelpFormatter::with_config(&parser, config)
        .format_help(Some(200))
        .plain();
    assert!(help.contains("Mandatory."), "{}", help);
    assert!(!help.contains("Always required."), "{}", help);
}

#[test]
fn item_list_controls_what_is_emitted() {
    let parser = Parser::new(schema([(
        "n",
        Opt::number(&["-n"]).required().help_text("the number"),
    )]))
    .unwrap();
    let mut config = HelpConfig::default();
    config.items = vec![HelpItem::Required];
    let help = HelpFormatter::with_config(&parser, config)
        .format_help(Some(200))
        .plain();
    assert!(help.contains("Always required."), "{}", help);
    assert!(!help.contains("the number"), "{}", help);
}

#[test]
fn absolute_and_relative_indents() {
    let parser = Parser::new(schema([(
        "a",
        Opt::flag(&["-a"]).help_text("desc"),
    )]))
    .unwrap();
    let mut config = HelpConfig::default();
    config.descr.absolute = true;
    config.descr.indent = 30;
    let help = HelpFormatter::with_config(&parser, config)
        .format_help(Some(80))
        .plain();
    assert_eq!(help, format!("  -a{}desc.\n", " ".repeat(26)));
}

#[test]
fn styled_rendition_reaches_columns_with_moves() {
    let parser = Parser::new(schema([(
        "all",
        Opt::flag(&["-a", "--all"]).help_text("do all"),
    )]))
    .unwrap();
    let help = HelpFormatter::new(&parser).format_help(Some(80)).ansi();
    // names column start, forward move between slots, desc column start
    assert!(help.contains("\x1b[3G"), "{:?}", help);
    assert!(help.contains("\x1b[1C"), "{:?}", help);
    assert!(help.contains("\x1b[1m"), "{:?}", help);
}
