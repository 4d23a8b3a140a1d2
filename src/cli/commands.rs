use crate::cli::config::AppConfig;
use crate::dom::{Dom, NodeId};
use crate::error::SelectorError;
use crate::load_document;
use crate::picker::messages::PickerRequest;
use crate::picker::ports::{LogNotifier, MemoryClipboard, OutlineTracker};
use crate::picker::session::PickerSession;
use crate::selector::classifier::explain_identifier;
use crate::selector::generator::SelectorGenerator;
use crate::trace::{SelectorTraceEvent, TraceLogger};

type CmdResult<T> = Result<T, Box<dyn std::error::Error>>;

fn resolve_targets(dom: &Dom, target: &str) -> CmdResult<Vec<NodeId>> {
    let nodes = dom.query_selector_all(target)?;
    if nodes.is_empty() {
        return Err(SelectorError::ElementNotFound {
            target: target.to_string(),
            context: "no element in the document matches".into(),
        }
        .into());
    }
    Ok(nodes)
}

// ============================================================================
// generate subcommand
// ============================================================================

/// Selector lines for every element matching `target`.
pub fn render_generate(
    dom: &Dom,
    target: &str,
    json: bool,
    config: &AppConfig,
    trace: &TraceLogger,
) -> CmdResult<String> {
    let generator = SelectorGenerator::with_config(dom, config.generator.clone());
    let fingerprint = dom.fingerprint();
    let mut out = String::new();

    for node in resolve_targets(dom, target)? {
        let Some(generated) = generator.generate(node) else {
            continue;
        };
        let tag = dom.tag_name(node).unwrap_or_default();
        trace.log(
            &SelectorTraceEvent::now(tag, &generated)
                .with_fingerprint(Some(fingerprint.clone()))
                .with_source("cli"),
        );

        if json {
            out.push_str(&serde_json::to_string(&generated)?);
        } else if generated.is_unique() {
            out.push_str(&format!("{}\t{}", generated.selector, generated.strategy));
        } else {
            out.push_str(&format!(
                "{}\t{} (matches {} elements)",
                generated.selector, generated.strategy, generated.match_count
            ));
        }
        out.push('\n');
    }

    Ok(out)
}

pub fn cmd_generate(
    document: &str,
    target: &str,
    json: bool,
    trace_path: Option<&str>,
    config: &AppConfig,
    verbose: u8,
) -> CmdResult<()> {
    let dom = load_document(document)?;
    if verbose > 0 {
        eprintln!("Loaded {} ({} nodes)", document, dom.len());
    }

    let trace = match trace_path.or(config.trace.path.as_deref()) {
        Some(path) => TraceLogger::new(path),
        None => TraceLogger::disabled(),
    };

    print!("{}", render_generate(&dom, target, json, config, &trace)?);
    Ok(())
}

// ============================================================================
// classify subcommand
// ============================================================================

pub fn render_classify(values: &[String]) -> String {
    let mut out = String::new();
    for value in values {
        let report = explain_identifier(value);
        let verdict = if report.stable_identifier {
            "stable".to_string()
        } else {
            format!(
                "unstable ({})",
                report.rejected_by.as_deref().unwrap_or("unknown")
            )
        };
        out.push_str(&format!(
            "{}: {} | class: {} | meaningful: {} | dynamic id: {} | digit ratio: {:.2}\n",
            report.value,
            verdict,
            report.stable_class,
            report.meaningful_class,
            report.dynamic_id,
            report.digit_ratio
        ));
    }
    out
}

pub fn cmd_classify(values: &[String]) -> CmdResult<()> {
    print!("{}", render_classify(values));
    Ok(())
}

// ============================================================================
// query subcommand
// ============================================================================

pub fn render_query(dom: &Dom, selector: &str) -> CmdResult<String> {
    let matches = dom.query_selector_all(selector)?;
    let mut out = format!("{} match(es) for {}\n", matches.len(), selector);
    for node in matches {
        let tag = dom.tag_name(node).unwrap_or_default();
        let mut line = format!("  <{}", tag);
        if let Some(id) = dom.attr(node, "id") {
            line.push_str(&format!(" id=\"{}\"", id));
        }
        let classes = dom.class_list(node);
        if !classes.is_empty() {
            line.push_str(&format!(" class=\"{}\"", classes.join(" ")));
        }
        line.push_str(">\n");
        out.push_str(&line);
    }
    Ok(out)
}

pub fn cmd_query(document: &str, selector: &str) -> CmdResult<()> {
    let dom = load_document(document)?;
    print!("{}", render_query(&dom, selector)?);
    Ok(())
}

// ============================================================================
// replay subcommand
// ============================================================================

/// Feeds each request line through a fresh picker session; one JSON response per line.
pub fn render_replay(dom: &Dom, requests: &str, config: &AppConfig) -> CmdResult<String> {
    let trace = match config.trace.path.as_deref() {
        Some(path) => TraceLogger::new(path),
        None => TraceLogger::disabled(),
    };
    let mut session = PickerSession::new(
        config.picker,
        MemoryClipboard::default(),
        LogNotifier,
        OutlineTracker::default(),
    )
    .with_generator_config(config.generator.clone())
    .with_trace(trace);

    let mut out = String::new();
    for (line_no, line) in requests.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let request: PickerRequest =
            serde_json::from_str(line).map_err(|source| SelectorError::SnapshotParse {
                context: format!("picker request on line {}", line_no + 1),
                source,
            })?;
        let response = session.dispatch(dom, &request);
        out.push_str(&serde_json::to_string(&response)?);
        out.push('\n');
    }
    Ok(out)
}

pub fn cmd_replay(document: &str, requests: &str, config: &AppConfig) -> CmdResult<()> {
    let dom = load_document(document)?;
    let requests = std::fs::read_to_string(requests)?;
    print!("{}", render_replay(&dom, &requests, config)?);
    Ok(())
}
