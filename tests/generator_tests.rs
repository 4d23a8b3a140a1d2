use std::collections::HashMap;

use smart_selector::dom::Dom;
use smart_selector::selector::{
    GeneratorConfig, SelectorGenerator, StrategyKind, UniquenessOracle, generate_selector,
};

mod common;
use crate::common::utils::{assert_round_trip, html, node};

// =========================================================================
// Stable id
// =========================================================================

#[test]
fn stable_unique_id_wins() {
    let dom = html(
        r#"<div class="cart"><button id="checkout-button" class="btn">Checkout</button></div>"#,
    );
    let button = node(&dom, "button");

    assert_eq!(
        generate_selector(&dom, button).as_deref(),
        Some("#checkout-button")
    );

    let generated = SelectorGenerator::new(&dom).generate(button).unwrap();
    assert_eq!(generated.strategy, StrategyKind::StableId);
    assert_eq!(generated.match_count, 1);
    assert_eq!(generated.attempts.len(), 1, "First strategy succeeded");
}

#[test]
fn numbered_id_is_never_used() {
    let dom = html(r#"<ul class="items"><li id="item-41">A</li><li id="item-42">B</li></ul>"#);
    let item = node(&dom, "#item-42");

    let generated = SelectorGenerator::new(&dom).generate(item).unwrap();
    assert_ne!(generated.selector, "#item-42");
    assert_ne!(generated.strategy, StrategyKind::StableId);
    assert_eq!(generated.selector, "ul.items li:nth-child(2)");
    assert_eq!(generated.strategy, StrategyKind::NthChild);
    assert_round_trip(&dom, item, &generated);
}

#[test]
fn duplicated_id_falls_through() {
    let dom = html(
        r#"<div class="left"><a id="help">Help</a></div><div class="right"><a id="help">Help</a></div>"#,
    );
    let second = dom.query_selector_all("a").unwrap()[1];

    let generated = SelectorGenerator::new(&dom).generate(second).unwrap();
    assert_ne!(generated.selector, "#help", "Id is not unique in the document");
    assert_round_trip(&dom, second, &generated);
}

// =========================================================================
// Data attributes
// =========================================================================

#[test]
fn data_attribute_with_grandparent_qualifier() {
    let dom = html(
        r#"<div class="checkout-page"><section><button data-testid="pay-now">Pay</button></section></div>"#,
    );
    let button = node(&dom, "button");

    let generated = SelectorGenerator::new(&dom).generate(button).unwrap();
    assert_eq!(generated.strategy, StrategyKind::DataAttribute);
    assert_eq!(
        generated.selector,
        r#"div.checkout-page button[data-testid="pay-now"]"#
    );
}

#[test]
fn data_attribute_without_grandparent_class() {
    let dom = html(r#"<ul><li><a data-cy="profile">Me</a></li></ul>"#);
    let link = node(&dom, "a");

    let generated = SelectorGenerator::new(&dom).generate(link).unwrap();
    assert_eq!(generated.strategy, StrategyKind::DataAttribute);
    assert_eq!(generated.selector, r#"a[data-cy="profile"]"#);
}

#[test]
fn duplicated_data_attribute_is_rejected_when_verified() {
    let dom = html(
        r#"<div><button data-testid="save">A</button><button data-testid="save">B</button></div>"#,
    );
    let first = node(&dom, "button");

    let generated = SelectorGenerator::new(&dom).generate(first).unwrap();
    assert_ne!(generated.strategy, StrategyKind::DataAttribute);
    assert_eq!(generated.selector, "div button:nth-child(1)");
    assert_round_trip(&dom, first, &generated);
}

#[test]
fn unverified_data_attribute_is_returned_as_is() {
    let dom = html(
        r#"<div><button data-testid="save">A</button><button data-testid="save">B</button></div>"#,
    );
    let first = node(&dom, "button");
    let config = GeneratorConfig {
        verify_data_attributes: false,
        ..GeneratorConfig::default()
    };

    let generated = SelectorGenerator::with_config(&dom, config)
        .generate(first)
        .unwrap();
    assert_eq!(generated.strategy, StrategyKind::DataAttribute);
    assert_eq!(generated.selector, r#"button[data-testid="save"]"#);
    assert_eq!(generated.match_count, 2, "Unverified selectors report their real count");
}

#[test]
fn custom_data_attribute_list() {
    let dom = html(r#"<section><span data-automation="total">9</span></section>"#);
    let span = node(&dom, "span");
    let config = GeneratorConfig {
        data_attributes: vec!["data-automation".into()],
        ..GeneratorConfig::default()
    };

    let generated = SelectorGenerator::with_config(&dom, config)
        .generate(span)
        .unwrap();
    assert_eq!(generated.selector, r#"span[data-automation="total"]"#);
}

#[test]
fn data_attribute_name_with_special_characters() {
    let mut dom = Dom::new();
    let root = dom.root();
    let section = dom.create_element(root, "section", HashMap::new());
    let div = dom.create_element(section, "div", HashMap::new());
    let span = dom.create_element(
        div,
        "span",
        HashMap::from([("data-x:id".to_string(), "total".to_string())]),
    );
    dom.create_element(div, "span", HashMap::new());
    let config = GeneratorConfig {
        data_attributes: vec!["data-x:id".into()],
        ..GeneratorConfig::default()
    };

    let generated = SelectorGenerator::with_config(&dom, config)
        .generate(span)
        .unwrap();
    assert_eq!(generated.strategy, StrategyKind::DataAttribute);
    assert_eq!(generated.selector, r#"span[data-x\:id="total"]"#);
    assert_round_trip(&dom, span, &generated);
}

// =========================================================================
// Uniqueness oracle
// =========================================================================

#[test]
fn oracle_counts_and_uniqueness() {
    let dom = html(r#"<ul><li class="a">1</li><li class="b">2</li></ul>"#);
    let oracle = UniquenessOracle::new(&dom);
    let first = node(&dom, "li.a");
    let second = node(&dom, "li.b");

    assert_eq!(oracle.match_count("li"), Some(2));
    assert!(!oracle.is_unique("li"), "Two matches");
    assert_eq!(oracle.match_count("li.c"), Some(0));
    assert!(!oracle.is_unique("li.c"), "No match");
    assert!(oracle.is_unique("li.a"));

    assert!(oracle.is_unique_match("li.a", first));
    assert!(!oracle.is_unique_match("li.a", second), "Unique, but another element");
    assert!(!oracle.is_unique_match("li", first), "Not unique");
}

#[test]
fn oracle_swallows_syntax_errors() {
    let dom = html("<p>x</p>");
    let paragraph = node(&dom, "p");
    let oracle = UniquenessOracle::new(&dom);

    for bad in ["p[", "p:hover", "", "p >"] {
        assert_eq!(oracle.match_count(bad), None, "{}", bad);
        assert!(!oracle.is_unique(bad), "{}", bad);
        assert!(!oracle.is_unique_match(bad, paragraph), "{}", bad);
    }
}

// =========================================================================
// Hybrid and class strategies
// =========================================================================

#[test]
fn hybrid_combines_class_and_attribute() {
    let dom = html(
        r#"<form><input class="form-control" type="email" name="email"><input class="form-control" type="password" name="pw"></form>"#,
    );
    let email = node(&dom, "input");

    let generated = SelectorGenerator::new(&dom).generate(email).unwrap();
    assert_eq!(generated.strategy, StrategyKind::Hybrid);
    assert_eq!(generated.selector, r#"input.form-control[type="email"]"#);
}

#[test]
fn hybrid_skips_short_attribute_values() {
    let dom = html(r#"<div role="ok">x</div><div role="ok">y</div>"#);
    let first = node(&dom, "div");

    let generated = SelectorGenerator::new(&dom).generate(first).unwrap();
    assert_ne!(generated.strategy, StrategyKind::Hybrid, "Values of length 2 are skipped");
}

#[test]
fn robust_class_prefers_largest_combination() {
    let dom = html(
        r#"<nav><a class="nav-link primary-link">Home</a><a class="nav-link">About</a></nav>"#,
    );
    let home = node(&dom, "a");

    let generated = SelectorGenerator::new(&dom).generate(home).unwrap();
    assert_eq!(generated.strategy, StrategyKind::RobustClass);
    assert_eq!(generated.selector, "a.nav-link.primary-link");
}

#[test]
fn robust_class_ignores_unstable_tokens() {
    let dom = html(r#"<main><p class="js-hook lead-text col-md-6">Intro</p><p>Body</p></main>"#);
    let lead = node(&dom, "p");

    let generated = SelectorGenerator::new(&dom).generate(lead).unwrap();
    assert_eq!(generated.selector, "p.lead-text");
}

#[test]
fn special_characters_in_classes_are_escaped() {
    let dom = html(r#"<div><span class="price:total">9.99</span><span>tax</span></div>"#);
    let price = node(&dom, "span");

    let generated = SelectorGenerator::new(&dom).generate(price).unwrap();
    assert_eq!(generated.selector, r"span.price\:total");
    assert_round_trip(&dom, price, &generated);
}

#[test]
fn quotes_in_attribute_values_are_escaped() {
    let dom = html(r#"<form><input name='say "hi"'><input name="other"></form>"#);
    let input = node(&dom, "input");

    let generated = SelectorGenerator::new(&dom).generate(input).unwrap();
    assert_eq!(generated.strategy, StrategyKind::Hybrid);
    assert_round_trip(&dom, input, &generated);
}

// =========================================================================
// Positional disambiguation
// =========================================================================

#[test]
fn identical_siblings_get_distinct_selectors() {
    let dom = html("<html><body><div><p>Same</p><p>Same</p></div></body></html>");
    let paragraphs = dom.query_selector_all("p").unwrap();

    let first = generate_selector(&dom, paragraphs[0]).unwrap();
    let second = generate_selector(&dom, paragraphs[1]).unwrap();

    assert_ne!(first, second, "Siblings must not share a selector");
    assert_eq!(first, "div p:nth-child(1)");
    assert_eq!(second, "div p:nth-child(2)");
    assert_eq!(dom.query_selector_all(&first).unwrap(), vec![paragraphs[0]]);
    assert_eq!(dom.query_selector_all(&second).unwrap(), vec![paragraphs[1]]);
}

// =========================================================================
// Fallback path and absolute path
// =========================================================================

#[test]
fn fallback_uses_positioned_ancestor() {
    let dom = html("<section><div><span></span></div><div><span></span></div></section>");
    let spans = dom.query_selector_all("span").unwrap();

    let generated = SelectorGenerator::new(&dom).generate(spans[1]).unwrap();
    assert_eq!(generated.strategy, StrategyKind::FallbackPath);
    assert_eq!(generated.selector, "div:nth-of-type(2) span");
    assert_round_trip(&dom, spans[1], &generated);
}

#[test]
fn text_anchored_leaf() {
    let dom = html(
        r#"<div class="toast"><span>Saved</span></div><div class="toast"><em>x</em><span>Failed</span></div><div class="log"><span>Saved again</span></div>"#,
    );
    let failed = dom.query_selector_all("span").unwrap()[1];

    let generated = SelectorGenerator::new(&dom).generate(failed).unwrap();
    assert_round_trip(&dom, failed, &generated);
}

#[test]
fn absolute_path_when_nothing_is_unique() {
    let deep = "<div><div><div><div><div><b></b></div></div></div></div></div>";
    let dom = html(&format!("<main><section>{deep}</section><section>{deep}</section></main>"));
    let bold = node(&dom, "b");

    let generated = SelectorGenerator::new(&dom).generate(bold).unwrap();
    assert_eq!(generated.strategy, StrategyKind::AbsolutePath);
    assert_eq!(generated.selector, "div div div div b");
    assert_eq!(generated.match_count, 2, "Best effort, not unique");
    assert!(!generated.is_unique());
    assert_round_trip(&dom, bold, &generated);

    let tried: Vec<StrategyKind> = generated.attempts.iter().map(|a| a.strategy).collect();
    assert_eq!(
        tried,
        vec![
            StrategyKind::StableId,
            StrategyKind::DataAttribute,
            StrategyKind::Hybrid,
            StrategyKind::RobustClass,
            StrategyKind::NthChild,
            StrategyKind::FallbackPath,
            StrategyKind::AbsolutePath,
        ]
    );
}

#[test]
fn bare_element_still_gets_a_selector() {
    let dom = html("<html><body><p></p></body></html>");
    let paragraph = node(&dom, "p");

    let selector = generate_selector(&dom, paragraph).unwrap();
    assert!(!selector.is_empty());
    assert!(dom.query_selector_all(&selector).unwrap().contains(&paragraph));
}

// =========================================================================
// Invalid input and idempotence
// =========================================================================

#[test]
fn non_elements_yield_none() {
    let dom = html("<p>text</p>");
    assert!(generate_selector(&dom, dom.root()).is_none(), "Document node");

    let paragraph = node(&dom, "p");
    let text = dom.children(paragraph)[0];
    assert!(generate_selector(&dom, text).is_none(), "Text node");
}

#[test]
fn generation_is_idempotent() {
    let dom = html(
        r#"<div class="grid"><span class="cell">a</span><span class="cell">b</span><span class="cell">a</span></div>"#,
    );
    let generator = SelectorGenerator::new(&dom);
    for span in dom.query_selector_all("span").unwrap() {
        let first = generator.generate(span).unwrap();
        let second = generator.generate(span).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn every_element_round_trips() {
    let dom = html(
        r#"<html><body class="app"><header><h1 class="title">Shop</h1></header>
        <ul class="menu"><li class="menu-item">One</li><li class="menu-item">Two</li></ul>
        <form><input type="text" name="q"><input type="date"><button>Go</button><button>Go</button></form>
        <table><tr><td>1</td><td>2</td></tr><tr><td>1</td><td>2</td></tr></table></body></html>"#,
    );
    let generator = SelectorGenerator::new(&dom);
    for element in dom.elements() {
        let generated = generator.generate(element).unwrap();
        assert_round_trip(&dom, element, &generated);
    }
}

#[test]
fn empty_document_has_nothing_to_generate() {
    let dom = Dom::new();
    assert!(dom.elements().is_empty());
    assert!(generate_selector(&dom, dom.root()).is_none());
}
