use declargs::*;

fn abc(requires: Requires) -> Parser {
    Parser::new(schema([
        ("a", Opt::flag(&["-a"]).requires(requires)),
        ("b", Opt::flag(&["-b"])),
        ("c", Opt::string(&["-c"])),
    ]))
    .unwrap()
}

#[test]
fn satisfied_tree_fails_under_negation() {
    let tree = Requires::all([Requires::present("b"), Requires::equals("c", "x")]);
    let argv = ["-a", "-b", "-c", "x"];

    assert!(abc(tree.clone()).parse(Args::from(&argv)).is_ok());
    assert!(abc(Requires::not(tree))
        .parse(Args::from(&argv))
        .is_err());
}

#[test]
fn conjunction_reports_the_first_failure() {
    let parser = abc(Requires::all([
        Requires::present("b"),
        Requires::present("c"),
    ]));
    let err = parser
        .parse(Args::from(&["-a", "-c", "x"]))
        .unwrap_err()
        .unwrap_stderr();
    assert_eq!(err, "Option -a requires -b.");
}

#[test]
fn disjunction_succeeds_on_any_branch() {
    let parser = abc(Requires::one([
        Requires::present("b"),
        Requires::present("c"),
    ]));
    assert!(parser.parse(Args::from(&["-a", "-c", "x"])).is_ok());
    assert!(parser.parse(Args::from(&["-a", "-b"])).is_ok());
    assert!(parser.parse(Args::from(&["-a"])).is_err());
}

#[test]
fn absent_leaf_requires_the_key_to_be_unspecified() {
    let parser = abc(Requires::absent("b"));
    assert!(parser.parse(Args::from(&["-a"])).is_ok());
    let err = parser
        .parse(Args::from(&["-a", "-b"]))
        .unwrap_err()
        .unwrap_stderr();
    assert_eq!(err, "Option -a requires no -b.");
}

#[test]
fn expected_value_needs_the_key_specified() {
    let parser = abc(Requires::equals("c", "x"));
    let err = parser
        .parse(Args::from(&["-a"]))
        .unwrap_err()
        .unwrap_stderr();
    assert_eq!(err, "Option -a requires -c='x'.");
}

#[test]
fn negated_equality_means_a_different_value() {
    let parser = abc(Requires::not(Requires::equals("c", "x")));
    assert!(parser.parse(Args::from(&["-a", "-c", "y"])).is_ok());
    let err = parser
        .parse(Args::from(&["-a", "-c", "x"]))
        .unwrap_err()
        .unwrap_stderr();
    assert_eq!(err, "Option -a requires -c!='x'.");
}

#[test]
fn requirements_only_fire_for_specified_options() {
    let parser = abc(Requires::present("b"));
    // -a was never specified, its tree is not evaluated
    assert!(parser.parse(Args::from(&["-c", "x"])).is_ok());
}

#[test]
fn de_morgan_over_composites() {
    // not(all(b, c)) == one(not b, not c)
    let parser = abc(Requires::not(Requires::all([
        Requires::present("b"),
        Requires::present("c"),
    ])));
    assert!(parser.parse(Args::from(&["-a", "-b"])).is_ok());
    assert!(parser.parse(Args::from(&["-a"])).is_ok());
    let err = parser
        .parse(Args::from(&["-a", "-b", "-c", "x"]))
        .unwrap_err()
        .unwrap_stderr();
    assert_eq!(err, "Option -a requires (no -b or no -c).");
}
