use clap::Parser;
use smart_selector::cli::commands::{render_classify, render_generate, render_query, render_replay};
use smart_selector::cli::config::{AppConfig, Cli, Commands, load_config, log_filter};
use smart_selector::trace::TraceLogger;

mod common;
use crate::common::utils::{fixture, fixture_path};

// ============================================================================
// CLI Argument Parsing Tests
// ============================================================================

#[test]
fn cli_parse_generate_minimal() {
    let cli = Cli::parse_from([
        "smart-selector",
        "generate",
        "--document",
        "page.html",
        "--target",
        "#buy",
    ]);
    match cli.command {
        Commands::Generate {
            document,
            target,
            json,
            trace,
        } => {
            assert_eq!(document, "page.html");
            assert_eq!(target, "#buy");
            assert!(!json);
            assert!(trace.is_none());
        }
        _ => panic!("Expected Generate command"),
    }
    assert_eq!(cli.verbose, 0);
    assert!(cli.config.is_none());
}

#[test]
fn cli_parse_generate_all_args() {
    let cli = Cli::parse_from([
        "smart-selector",
        "--config",
        "custom.yaml",
        "generate",
        "--document",
        "snap.json",
        "--target",
        "button",
        "--json",
        "--trace",
        "trace.jsonl",
        "-vv",
    ]);
    match cli.command {
        Commands::Generate { json, trace, .. } => {
            assert!(json);
            assert_eq!(trace, Some("trace.jsonl".to_string()));
        }
        _ => panic!("Expected Generate command"),
    }
    assert_eq!(cli.verbose, 2, "Global flag accepted after the subcommand");
    assert_eq!(cli.config, Some("custom.yaml".to_string()));
}

#[test]
fn cli_parse_classify_requires_values() {
    let cli = Cli::parse_from(["smart-selector", "classify", "item-42", "checkout"]);
    match cli.command {
        Commands::Classify { values } => assert_eq!(values, vec!["item-42", "checkout"]),
        _ => panic!("Expected Classify command"),
    }

    let missing = Cli::try_parse_from(["smart-selector", "classify"]);
    assert!(missing.is_err(), "At least one value is required");
}

#[test]
fn cli_parse_query_and_replay() {
    let cli = Cli::parse_from([
        "smart-selector",
        "query",
        "--document",
        "page.html",
        "--selector",
        "ul li:nth-child(2)",
    ]);
    match cli.command {
        Commands::Query { document, selector } => {
            assert_eq!(document, "page.html");
            assert_eq!(selector, "ul li:nth-child(2)");
        }
        _ => panic!("Expected Query command"),
    }

    let cli = Cli::parse_from([
        "smart-selector",
        "replay",
        "--document",
        "page.html",
        "--requests",
        "session.jsonl",
    ]);
    assert!(matches!(cli.command, Commands::Replay { .. }));
}

#[test]
fn cli_rejects_missing_document() {
    let result = Cli::try_parse_from(["smart-selector", "generate", "--target", "p"]);
    assert!(result.is_err());
}

#[test]
fn log_filter_levels() {
    assert_eq!(log_filter(0), "warn");
    assert_eq!(log_filter(1), "info");
    assert_eq!(log_filter(2), "debug");
    assert_eq!(log_filter(7), "trace");
}

// ============================================================================
// Config File Tests
// ============================================================================

#[test]
fn config_load_missing_file() {
    let config = load_config(Some("nonexistent_file_that_does_not_exist.yaml"));
    // Should return defaults without error
    assert!(config.generator.verify_data_attributes);
    assert_eq!(config.generator.data_attributes[0], "data-testid");
    assert!(config.picker.auto_copy);
    assert!(config.trace.path.is_none());
}

#[test]
fn config_partial_yaml_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("smart-selector.yaml");
    let yaml = r#"
generator:
  data_attributes: ["data-automation"]
  verify_data_attributes: false
picker:
  auto_copy: false
trace:
  path: "picks.jsonl"
"#;
    std::fs::write(&path, yaml).unwrap();

    let config = load_config(path.to_str());
    assert_eq!(config.generator.data_attributes, vec!["data-automation"]);
    assert!(!config.generator.verify_data_attributes);
    // Other generator fields get defaults
    assert!(config.generator.date_placeholder_markers.contains(&"日期".to_string()));
    assert!(!config.picker.auto_copy);
    assert!(config.picker.show_highlight);
    assert_eq!(config.trace.path.as_deref(), Some("picks.jsonl"));
}

#[test]
fn config_picker_accepts_camel_case() {
    let config: AppConfig = serde_yaml::from_str("picker:\n  showNotification: false\n").unwrap();
    assert!(!config.picker.show_notification);
    assert!(config.picker.auto_copy);
}

#[test]
fn config_malformed_yaml_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.yaml");
    std::fs::write(&path, "generator: [not: a: mapping").unwrap();

    let config = load_config(path.to_str());
    assert!(config.generator.verify_data_attributes);
    assert_eq!(config.generator.data_attributes.len(), 8);
}

#[test]
fn config_yaml_roundtrip() {
    let config = AppConfig::default();
    let yaml = serde_yaml::to_string(&config).unwrap();
    let parsed: AppConfig = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(parsed.generator, config.generator);
    assert_eq!(parsed.picker, config.picker);
}

// ============================================================================
// Command Output Tests
// ============================================================================

#[test]
fn generate_prints_selector_and_strategy() {
    let dom = fixture("checkout.html");
    let out = render_generate(
        &dom,
        "footer p",
        false,
        &AppConfig::default(),
        &TraceLogger::disabled(),
    )
    .unwrap();
    assert_eq!(
        out,
        "footer p:nth-child(1)\tnth-child\nfooter p:nth-child(2)\tnth-child\n"
    );
}

#[test]
fn generate_flags_non_unique_results() {
    let dom = fixture("nested_lists.html");
    let out = render_generate(&dom, "b", false, &AppConfig::default(), &TraceLogger::disabled())
        .unwrap();
    let first = out.lines().next().unwrap();
    assert_eq!(first, "div div div div b\tabsolute-path (matches 2 elements)");
}

#[test]
fn generate_json_includes_attempts() {
    let dom = fixture("checkout.html");
    let out = render_generate(
        &dom,
        "#checkout-button",
        true,
        &AppConfig::default(),
        &TraceLogger::disabled(),
    )
    .unwrap();
    let value: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
    assert_eq!(value["selector"], "#checkout-button");
    assert_eq!(value["strategy"], "stable-id");
    assert_eq!(value["match_count"], 1);
    assert_eq!(value["attempts"][0]["strategy"], "stable-id");
}

#[test]
fn generate_unknown_target_is_an_error() {
    let dom = fixture("checkout.html");
    let err = render_generate(
        &dom,
        "#missing",
        false,
        &AppConfig::default(),
        &TraceLogger::disabled(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("#missing"), "Got: {}", err);
}

#[test]
fn generate_writes_trace_events() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.jsonl");
    let trace = TraceLogger::new(&path);
    assert!(trace.is_enabled());

    let dom = fixture("checkout.html");
    render_generate(&dom, "li.menu-item", false, &AppConfig::default(), &trace).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 3, "One event per matched element");

    let event: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(event["tag"], "li");
    assert_eq!(event["source"], "cli");
    assert_eq!(event["document_fingerprint"], dom.fingerprint());
    assert!(!event["attempts"].as_array().unwrap().is_empty());
}

#[test]
fn trace_logger_on_unwritable_path_is_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let trace = TraceLogger::new(dir.path().join("missing").join("trace.jsonl"));
    assert!(!trace.is_enabled());
}

#[test]
fn classify_reports_each_value() {
    let out = render_classify(&["item-42".to_string(), "checkout".to_string()]);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(
        lines[0].starts_with("item-42: unstable (pattern:trailing-number)"),
        "Got: {}",
        lines[0]
    );
    assert!(lines[0].ends_with("digit ratio: 0.29"), "Got: {}", lines[0]);
    assert_eq!(
        lines[1],
        "checkout: stable | class: true | meaningful: true | dynamic id: false | digit ratio: 0.00"
    );
}

#[test]
fn query_lists_matches() {
    let dom = fixture("checkout.html");
    let out = render_query(&dom, "li.menu-item").unwrap();
    assert_eq!(
        out,
        "3 match(es) for li.menu-item\n  <li class=\"menu-item\">\n  <li class=\"menu-item\">\n  <li class=\"menu-item active\">\n"
    );

    let out = render_query(&dom, "main").unwrap();
    assert!(out.contains("<main id=\"content\">"), "Got: {}", out);
}

#[test]
fn query_syntax_error_is_reported() {
    let dom = fixture("checkout.html");
    assert!(render_query(&dom, "li:hover").is_err());
}

#[test]
fn replay_answers_each_request() {
    let dom = fixture("checkout.html");
    let requests = std::fs::read_to_string(fixture_path("picker_requests.jsonl")).unwrap();
    let out = render_replay(&dom, &requests, &AppConfig::default()).unwrap();

    let responses: Vec<serde_json::Value> = out
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    let statuses: Vec<&str> = responses
        .iter()
        .map(|r| r["status"].as_str().unwrap())
        .collect();
    assert_eq!(
        statuses,
        vec![
            "started",
            "ok",
            "selectorGenerated",
            "currentSelector",
            "selectorCancelled",
            "state"
        ],
        "Comment line is skipped"
    );
    assert_eq!(responses[2]["selector"], "#checkout-button");
    assert_eq!(responses[2]["matchCount"], 1);
    assert_eq!(responses[3]["selector"]["selector"], "#checkout-button");
    assert_eq!(responses[5]["state"]["isPickingMode"], false);
}

#[test]
fn replay_reports_bad_request_line() {
    let dom = fixture("checkout.html");
    let requests = "{\"action\": \"getState\"}\n\n{\"action\": \"explode\"}\n";
    let err = render_replay(&dom, requests, &AppConfig::default()).unwrap_err();
    assert!(err.to_string().contains("line 3"), "Got: {}", err);
}
