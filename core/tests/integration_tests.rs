use std::collections::HashSet;

use argot_core::{
    AliasDelimiters, AliasSuggester, BuildError, ErrorCode, OptionBuilder, ParseOutcome, ParseStatus, Parser,
    ParserConfig, PrefixRules, Suggestion, ValueDelimiters, ValueKind,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Settings {
    value: Option<i32>,
    null_value: Option<i32>,
    values: Vec<i32>,
    level: usize,
    format: Option<String>,
    files: Vec<String>,
}

fn all_prefixes() -> ParserConfig {
    ParserConfig {
        prefixes: PrefixRules::ALL,
        ..ParserConfig::default()
    }
}

fn value_parser(config: ParserConfig) -> Parser<Settings> {
    let mut parser = Parser::new(config).unwrap();
    parser
        .add(
            OptionBuilder::scalar("Value")
                .aliases(["v", "value"])
                .bind(|s: &mut Settings, v| s.value = Some(v)),
        )
        .unwrap();
    parser
        .add(
            OptionBuilder::scalar("NullValue")
                .aliases(["n", "null-value"])
                .bind(|s: &mut Settings, v| s.null_value = Some(v)),
        )
        .unwrap();
    parser
}

fn codes(outcome: &ParseOutcome) -> Vec<ErrorCode> {
    outcome.errors.iter().map(|err| err.code).collect()
}

// ---------------------------------------------------------------------------
// Parse scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_scalar_values_with_negative_numbers() {
    let mut parser = value_parser(all_prefixes());
    let mut settings = Settings::default();

    let outcome = parser.parse(&["-v", "10", "-n", "-100"], &mut settings);
    assert_eq!(outcome.status, ParseStatus::Valid, "{:?}", outcome.errors);
    assert_eq!(settings.value, Some(10));
    assert_eq!(settings.null_value, Some(-100));
}

#[test]
fn test_missing_value_reports_exactly_one_error() {
    let mut parser = value_parser(all_prefixes());
    let mut settings = Settings::default();

    let outcome = parser.parse(&["-v"], &mut settings);
    assert_eq!(outcome.status, ParseStatus::Invalid);
    assert_eq!(codes(&outcome), [ErrorCode::VeryFewValue]);
    assert_eq!(outcome.errors[0].option.as_deref(), Some("Value"));
    assert_eq!(settings.value, None);
}

#[test]
fn test_all_alias_spellings() {
    let mut parser = value_parser(all_prefixes());
    for args in [
        vec!["-v", "7"],
        vec!["-v7"],
        vec!["-v=7"],
        vec!["--value", "7"],
        vec!["--value=7"],
        vec!["/v", "7"],
        vec!["/value=7"],
        vec!["--v", "7"],
        vec!["-value", "7"],
    ] {
        let mut settings = Settings::default();
        let outcome = parser.parse(&args, &mut settings);
        assert!(outcome.is_valid(), "{args:?}: {:?}", outcome.errors);
        assert_eq!(settings.value, Some(7), "{args:?}");
    }
}

#[test]
fn test_omit_delimiter_and_comma_splitting() {
    let config = ParserConfig {
        value_delimiters: ValueDelimiters::COMMA,
        ..all_prefixes()
    };
    let mut parser = Parser::new(config).unwrap();
    let values = parser
        .add(
            OptionBuilder::sequential("Values")
                .alias("v")
                .bind(|s: &mut Settings, v| s.values = v),
        )
        .unwrap();

    let mut settings = Settings::default();
    let outcome = parser.parse(&["-v1,2,3"], &mut settings);
    assert!(outcome.is_valid(), "{:?}", outcome.errors);
    assert_eq!(parser.option(&values).input_values(), ["1", "2", "3"]);
    assert_eq!(parser.values::<i32>(&values), [1, 2, 3]);
    assert_eq!(settings.values, [1, 2, 3]);
}

#[test]
fn test_sequential_option_accumulates_across_occurrences() {
    let mut parser = Parser::new(all_prefixes()).unwrap();
    parser
        .add(
            OptionBuilder::sequential("Values")
                .alias("v")
                .bind(|s: &mut Settings, v| s.values = v),
        )
        .unwrap();

    let mut settings = Settings::default();
    let outcome = parser.parse(&["-v", "1", "2", "-v=3", "-v4"], &mut settings);
    assert!(outcome.is_valid(), "{:?}", outcome.errors);
    assert_eq!(settings.values, [1, 2, 3, 4]);
}

#[test]
fn test_counter_binds_occurrences() {
    let mut parser = Parser::new(ParserConfig::default()).unwrap();
    let level = parser
        .add(
            OptionBuilder::counter("Level")
                .alias("l")
                .bind(|s: &mut Settings, n| s.level = n),
        )
        .unwrap();

    let mut settings = Settings::default();
    assert!(parser.parse(&["-l", "-l", "-l"], &mut settings).is_valid());
    assert_eq!(settings.level, 3);
    assert_eq!(parser.count(&level), 3);
}

#[test]
fn test_positional_options_fill_in_declaration_order() {
    let mut parser = Parser::new(ParserConfig::default()).unwrap();
    parser
        .add(OptionBuilder::value("Format").bind(|s: &mut Settings, f| s.format = Some(f)))
        .unwrap();
    parser
        .add(OptionBuilder::values("Files").bind(|s: &mut Settings, f| s.files = f))
        .unwrap();

    let mut settings = Settings::default();
    let outcome = parser.parse(&["json", "a.txt", "/tmp/b.txt"], &mut settings);
    assert!(outcome.is_valid(), "{:?}", outcome.errors);
    assert_eq!(settings.format.as_deref(), Some("json"));
    assert_eq!(settings.files, ["a.txt", "/tmp/b.txt"]);
}

#[test]
fn test_leftover_tokens_are_unknown() {
    let mut parser = value_parser(all_prefixes());
    let mut settings = Settings::default();

    let outcome = parser.parse(&["-v", "1", "2", "--bogus", "-"], &mut settings);
    assert_eq!(
        codes(&outcome),
        [
            ErrorCode::UnknownToken,
            ErrorCode::InvalidToken,
            ErrorCode::UnknownToken,
        ]
    );
    assert_eq!(outcome.errors[0].args, ["--bogus"]);
    assert_eq!(outcome.errors[2].args, ["2"]);
}

#[test]
fn test_empty_elements_are_ignored() {
    let mut parser = value_parser(all_prefixes());
    let mut settings = Settings::default();

    let outcome = parser.parse(&["", "--value", "3"], &mut settings);
    assert!(outcome.is_valid(), "{:?}", outcome.errors);
    assert_eq!(settings.value, Some(3));
}

#[test]
fn test_forward_slash_alias_takes_path_values() {
    let config = ParserConfig {
        prefixes: PrefixRules::ALL,
        alias_delimiters: AliasDelimiters::ALL,
        ..ParserConfig::default()
    };
    let mut parser = Parser::new(config).unwrap();
    parser
        .add(
            OptionBuilder::scalar("Out")
                .aliases(["o", "out"])
                .bind(|s: &mut Settings, v| s.format = Some(v)),
        )
        .unwrap();
    parser
        .add(OptionBuilder::values("Files").bind(|s: &mut Settings, files| s.files = files))
        .unwrap();

    for arg in ["/out=/tmp/x", "/out:/tmp/x", "--out=/tmp/x"] {
        let mut settings = Settings::default();
        let outcome = parser.parse(&[arg], &mut settings);
        assert!(outcome.is_valid(), "{arg}: {:?}", outcome.errors);
        assert_eq!(settings.format.as_deref(), Some("/tmp/x"), "{arg}");
        assert!(settings.files.is_empty(), "{arg}");
    }

    let mut settings = Settings::default();
    let outcome = parser.parse(&["/usr/bin"], &mut settings);
    assert!(outcome.is_valid(), "{:?}", outcome.errors);
    assert_eq!(settings.format, None);
    assert_eq!(settings.files, ["/usr/bin"]);
}

#[test]
fn test_parser_is_reusable() {
    let mut parser = value_parser(all_prefixes());
    let value = parser.handle("Value").unwrap();

    let mut settings = Settings::default();
    assert!(parser.parse(&["-v", "1"], &mut settings).is_valid());
    assert_eq!(parser.count(&value), 1);

    let outcome = parser.parse(&["-n", "2"], &mut settings);
    assert!(outcome.is_valid());
    assert_eq!(parser.count(&value), 0);
    assert_eq!(parser.value::<i32>(&value), None);
    assert_eq!(parser.tokens().len(), 2);

    let outcome = parser.parse(&["-v", "x"], &mut settings);
    assert_eq!(codes(&outcome), [ErrorCode::InvalidOptionValue]);
    assert!(parser.parse(&["-v", "3"], &mut settings).is_valid());
    assert_eq!(settings.value, Some(3));
}

// ---------------------------------------------------------------------------
// Value checks
// ---------------------------------------------------------------------------

#[test]
fn test_allowed_values_follow_case_sensitivity() {
    for (case_sensitive, valid) in [(true, false), (false, true)] {
        let config = ParserConfig {
            case_sensitive,
            ..ParserConfig::default()
        };
        let mut parser = Parser::new(config).unwrap();
        parser
            .add(
                OptionBuilder::scalar("Format")
                    .alias("f")
                    .allowed_values(["json".to_string(), "yaml".to_string()])
                    .bind(|s: &mut Settings, f| s.format = Some(f)),
            )
            .unwrap();

        let mut settings = Settings::default();
        let outcome = parser.parse(&["-f", "JSON"], &mut settings);
        assert_eq!(outcome.is_valid(), valid, "{case_sensitive}");
        if !valid {
            assert_eq!(codes(&outcome), [ErrorCode::ValueMustBeOneOf]);
        }
    }
}

#[test]
fn test_predicates_and_defaults() {
    let mut parser = Parser::new(ParserConfig::default()).unwrap();
    parser
        .add(
            OptionBuilder::scalar("Port")
                .alias("p")
                .default_value(8080)
                .predicate(|port: &i32| {
                    if (1..=65535).contains(port) {
                        Ok(())
                    } else {
                        Err("port out of range".to_string())
                    }
                })
                .bind(|s: &mut Settings, p| s.value = Some(p)),
        )
        .unwrap();
    parser
        .add(
            OptionBuilder::sequential("Ids")
                .alias("i")
                .list_predicate(|ids: &[i32]| {
                    let unique: HashSet<_> = ids.iter().collect();
                    if unique.len() == ids.len() {
                        Ok(())
                    } else {
                        Err("ids must be unique".to_string())
                    }
                })
                .bind(|s: &mut Settings, ids| s.values = ids),
        )
        .unwrap();

    let mut settings = Settings::default();
    assert!(parser.parse(&["-i", "1", "2"], &mut settings).is_valid());
    assert_eq!(settings.value, Some(8080));
    assert_eq!(settings.values, [1, 2]);

    let outcome = parser.parse(&["-p", "0", "-i", "1", "1"], &mut settings);
    assert_eq!(
        codes(&outcome),
        [ErrorCode::PredicateFailure, ErrorCode::ListPredicateFailure]
    );
    assert_eq!(outcome.errors[0].args[2], "port out of range");
}

#[derive(Debug, Clone, PartialEq, PartialOrd)]
struct Level(u8);

impl ValueKind for Level {
    fn kind_name() -> &'static str {
        "level"
    }
}

#[test]
fn test_custom_value_kind_requires_parse_callback() {
    let mut parser = Parser::<Vec<Level>>::new(ParserConfig::default()).unwrap();
    let err = parser
        .add(OptionBuilder::<Vec<Level>, Level>::scalar("Level"))
        .unwrap_err();
    assert_eq!(
        err,
        BuildError::MissingParseCallback {
            option: "Level".into(),
            kind: "level",
        }
    );

    parser
        .add(
            OptionBuilder::scalar("Level")
                .parse_with(|raw| match raw {
                    "low" => Ok(Level(1)),
                    "high" => Ok(Level(9)),
                    other => Err(format!("unknown level {other}")),
                })
                .bind(|levels: &mut Vec<Level>, level| levels.push(level)),
        )
        .unwrap();

    let mut levels = Vec::new();
    assert!(parser.parse(&["--level", "high"], &mut levels).is_valid());
    assert_eq!(levels, [Level(9)]);
    let outcome = parser.parse(&["--level", "mid"], &mut levels);
    assert_eq!(codes(&outcome), [ErrorCode::InvalidOptionValue]);
}

#[test]
fn test_panicking_callbacks_become_unexpected_errors() {
    let mut parser = Parser::new(ParserConfig::default()).unwrap();
    parser
        .add(
            OptionBuilder::<Settings, i32>::scalar("Boom")
                .alias("b")
                .bind(|_, _| panic!("binder exploded")),
        )
        .unwrap();
    parser
        .add(
            OptionBuilder::<Settings, i32>::scalar("Check")
                .alias("c")
                .predicate(|_| panic!("predicate exploded")),
        )
        .unwrap();

    let mut settings = Settings::default();
    let outcome = parser.parse(&["-b", "1"], &mut settings);
    assert_eq!(outcome.status, ParseStatus::Invalid);
    assert_eq!(codes(&outcome), [ErrorCode::UnexpectedError]);
    assert_eq!(outcome.errors[0].cause.as_deref(), Some("binder exploded"));

    let outcome = parser.parse(&["-c", "1"], &mut settings);
    assert_eq!(codes(&outcome), [ErrorCode::UnexpectedError]);
    assert_eq!(outcome.errors[0].option.as_deref(), Some("Check"));
}

// ---------------------------------------------------------------------------
// Arity
// ---------------------------------------------------------------------------

#[test]
fn test_arity_bounds_are_necessary_and_sufficient() {
    for occurrences in 0..5_usize {
        for per_occurrence in 1..5_usize {
            let mut parser = Parser::<()>::new(ParserConfig::default()).unwrap();
            parser
                .add(
                    OptionBuilder::<(), i32, _>::sequential("Items")
                        .alias("i")
                        .option_arity(1, 3)
                        .value_arity(2, 3),
                )
                .unwrap();

            let mut args = Vec::new();
            for _ in 0..occurrences {
                args.push("-i".to_string());
                args.extend((0..per_occurrence).map(|n| n.to_string()));
            }

            let outcome = parser.parse(&args, &mut ());
            let expected = (1..=3).contains(&occurrences) && (2..=3).contains(&per_occurrence);
            if occurrences == 0 {
                assert!(outcome.is_empty());
            } else {
                assert_eq!(
                    outcome.is_valid(),
                    expected,
                    "{occurrences}x{per_occurrence}: {:?}",
                    outcome.errors
                );
            }
        }
    }
}

#[test]
fn test_required_option_missing() {
    let mut parser = Parser::<()>::new(ParserConfig::default()).unwrap();
    parser
        .add(OptionBuilder::<(), String>::scalar("Name").alias("n").required())
        .unwrap();
    parser
        .add(OptionBuilder::<(), bool>::switch("Dry").alias("d"))
        .unwrap();

    let outcome = parser.parse(&["-d"], &mut ());
    assert_eq!(codes(&outcome), [ErrorCode::VeryFewOption]);
}

#[test]
fn test_too_many_values_for_scalar() {
    let config = ParserConfig {
        value_delimiters: ValueDelimiters::SEMICOLON,
        ..ParserConfig::default()
    };
    let mut parser = Parser::<()>::new(config).unwrap();
    parser
        .add(OptionBuilder::<(), i32>::scalar("Value").alias("v"))
        .unwrap();

    let outcome = parser.parse(&["-v", "1;2"], &mut ());
    assert_eq!(codes(&outcome), [ErrorCode::TooManyValue]);
    assert_eq!(outcome.errors[0].args, ["Value", "2", "1"]);
}

// ---------------------------------------------------------------------------
// Built-in exclusivity
// ---------------------------------------------------------------------------

fn builtin_parser() -> Parser<Settings> {
    let config = ParserConfig {
        version_option: true,
        verbosity_option: true,
        ..all_prefixes()
    };
    let mut parser = value_parser(config);
    parser
        .add(OptionBuilder::values("Files").bind(|s: &mut Settings, f| s.files = f))
        .unwrap();
    parser
}

#[test]
fn test_help_mixed_with_other_options_is_invalid() {
    let mut parser = builtin_parser();
    let mut settings = Settings::default();

    let outcome = parser.parse(&["-h", "-v", "1"], &mut settings);
    assert_eq!(outcome.status, ParseStatus::Invalid);
    assert_eq!(codes(&outcome), [ErrorCode::InvalidSingleOptionUsage]);
    assert_eq!(settings.value, None);
}

#[test]
fn test_help_mixed_with_positional_value_is_invalid() {
    let mut parser = builtin_parser();
    let outcome = parser.parse(&["--help", "file.txt"], &mut Settings::default());
    assert_eq!(codes(&outcome), [ErrorCode::InvalidSingleOptionUsage]);
}

#[test]
fn test_help_and_version_together_are_both_reported() {
    let mut parser = builtin_parser();
    let outcome = parser.parse(&["-?", "--version"], &mut Settings::default());
    assert_eq!(outcome.status, ParseStatus::Invalid);
    assert_eq!(
        outcome
            .errors
            .iter()
            .map(|err| err.option.as_deref())
            .collect::<Vec<_>>(),
        [Some("Help"), Some("Version")]
    );
}

#[test]
fn test_help_alone_counts_as_only_option() {
    // Nothing else claimed a token: help wins and every other error is dropped.
    let mut parser = builtin_parser();
    for args in [
        vec!["-h"],
        vec!["/?"],
        vec!["--help", "--verbose"],
        vec!["-h", "--nope"],
        vec!["-h", "-h"],
    ] {
        let outcome = parser.parse(&args, &mut Settings::default());
        assert_eq!(outcome.status, ParseStatus::Help, "{args:?}");
        assert!(outcome.errors.is_empty(), "{args:?}");
    }

    let outcome = parser.parse(&["--version", "-v"], &mut Settings::default());
    assert_eq!(
        codes(&outcome),
        [ErrorCode::VeryFewValue, ErrorCode::InvalidSingleOptionUsage]
    );
}

// ---------------------------------------------------------------------------
// Aliases
// ---------------------------------------------------------------------------

#[test]
fn test_duplicate_explicit_alias_fails_before_parsing() {
    let mut parser = Parser::<()>::new(ParserConfig::default()).unwrap();
    parser
        .add(OptionBuilder::<(), i32>::scalar("Value").alias("v"))
        .unwrap();
    let err = parser
        .add(OptionBuilder::<(), i32>::scalar("Verbose").alias("v"))
        .unwrap_err();
    assert_eq!(
        err,
        BuildError::AliasAlreadyInUse {
            alias: "v".into(),
            owner: "Value".into(),
        }
    );
    assert_eq!(err.code(), "BuilderErrors.AliasAlreadyInUse");
}

#[test]
fn test_reserved_aliases_are_rejected() {
    let mut parser = Parser::<()>::new(ParserConfig::default()).unwrap();
    for alias in ["h", "H", "?", "HELP"] {
        let err = parser
            .add(OptionBuilder::<(), bool>::switch("Hide").alias(alias))
            .unwrap_err();
        assert!(matches!(err, BuildError::ReservedAlias(_)), "{alias}");
    }
}

#[test]
fn test_long_alias_truncated_at_word_boundary() {
    let mut parser = Parser::<()>::new(ParserConfig::default()).unwrap();
    let handle = parser
        .add(OptionBuilder::<(), String>::scalar(
            "VeryLongApplicationOptionValuePropertyName",
        ))
        .unwrap();
    assert_eq!(
        parser.option(&handle).aliases(),
        ["v", "very-long-application-option"]
    );
}

#[test]
fn test_suggested_aliases_never_collide() {
    let names = [
        "Value", "Values", "ValueList", "Validate", "Vector", "Verbose", "Vat", "Va",
    ];
    let mut parser = Parser::<()>::new(ParserConfig::default()).unwrap();
    for name in names {
        parser
            .add(OptionBuilder::<(), bool>::switch(name))
            .unwrap();
    }

    let aliases: Vec<String> = parser
        .registry()
        .aliases()
        .map(str::to_ascii_lowercase)
        .collect();
    let unique: HashSet<&String> = aliases.iter().collect();
    assert_eq!(unique.len(), aliases.len(), "{aliases:?}");

    let values = parser.handle("Values").unwrap();
    assert_eq!(parser.option(&values).aliases(), ["a", "values"]);
}

#[test]
fn test_suggestions_are_deterministic_across_parsers() {
    let declare = || {
        let mut parser = Parser::<()>::new(ParserConfig::default()).unwrap();
        for name in ["NullValue", "NameList", "Number", "Node"] {
            parser
                .add(OptionBuilder::<(), String>::scalar(name))
                .unwrap();
        }
        parser
            .options()
            .iter()
            .map(|option| option.prefixed_aliases().to_vec())
            .collect::<Vec<_>>()
    };
    assert_eq!(declare(), declare());
}

#[test]
fn test_suggester_round_trips_through_validation() {
    let config = ParserConfig::default();
    for name in ["max_depth", "HTTPServer", "x2Go", "user-name", "A"] {
        let mut used: Vec<String> = Vec::new();
        for _ in 0..3 {
            let found: Vec<Suggestion> = AliasSuggester::new(
                name,
                used.iter().map(String::as_str),
                true,
                config.max_alias_length,
                config.max_alias_word_count,
            )
            .collect();
            for suggestion in &found {
                assert_eq!(
                    argot_core::validate_alias(suggestion.as_str(), &config).unwrap(),
                    suggestion.as_str()
                );
            }
            used.extend(found.iter().map(|s| s.as_str().to_string()));
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn test_config_file_drives_syntax() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("parser.yaml");
    std::fs::write(
        &path,
        "case_sensitive: false\n\
         prefixes: [single-dash-short, double-dash-long, forward-slash-long]\n\
         alias_delimiters: [colon, whitespace]\n\
         value_delimiters: [pipe]\n",
    )
    .unwrap();

    let config = ParserConfig::load(&path).unwrap();
    let mut parser = Parser::new(config).unwrap();
    parser
        .add(
            OptionBuilder::sequential("Mode")
                .bind(|s: &mut Settings, modes: Vec<String>| s.files = modes),
        )
        .unwrap();

    let mut settings = Settings::default();
    let outcome = parser.parse(&["/MODE:fast|slow", "-M", "safe"], &mut settings);
    assert!(outcome.is_valid(), "{:?}", outcome.errors);
    assert_eq!(settings.files, ["fast", "slow", "safe"]);

    let outcome = parser.parse(&["--mode=fast"], &mut settings);
    assert_eq!(codes(&outcome), [ErrorCode::InvalidAliasUsage]);
}

#[test]
fn test_value_delimiter_split_is_identity_when_disabled() {
    for raw in ["a,b;c|d", "", "plain"] {
        assert_eq!(ValueDelimiters::NONE.split(raw), [raw]);
    }
    let all = ValueDelimiters::ALL.split("a,b;c|d");
    assert_eq!(all, ["a", "b", "c", "d"]);
}
