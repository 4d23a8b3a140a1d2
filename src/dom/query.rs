//! Tree-query evaluation: a CSS selector subset parsed and matched against `Dom`.

use std::collections::HashSet;

use crate::dom::dom_model::{Dom, NodeId};
use crate::dom::escape::css_unescape;
use crate::error::{Result, SelectorError};

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrCondition {
    Exists { key: String },
    Eq { key: String, value: String },
    StartsWith { key: String, value: String },
    EndsWith { key: String, value: String },
    Contains { key: String, value: String },
    Includes { key: String, value: String },
    DashMatch { key: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NthExpr {
    a: i64,
    b: i64,
}

impl NthExpr {
    fn matches(&self, index: usize) -> bool {
        let index = index as i64;
        if self.a == 0 {
            return index == self.b;
        }
        // Out-of-range coefficients match nothing.
        let Some(diff) = index.checked_sub(self.b) else {
            return false;
        };
        match (diff.checked_rem(self.a), diff.checked_div(self.a)) {
            (Some(0), Some(steps)) => steps >= 0,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PseudoClass {
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
    NthChild(NthExpr),
    NthLastChild(NthExpr),
    NthOfType(NthExpr),
    NthLastOfType(NthExpr),
    Not(Vec<Vec<SelectorPart>>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SelectorStep {
    tag: Option<String>,
    universal: bool,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCondition>,
    pseudo_classes: Vec<PseudoClass>,
}

impl SelectorStep {
    fn is_empty(&self) -> bool {
        self.tag.is_none()
            && !self.universal
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attrs.is_empty()
            && self.pseudo_classes.is_empty()
    }

    fn id_only(&self) -> Option<&str> {
        if self.tag.is_none()
            && !self.universal
            && self.classes.is_empty()
            && self.attrs.is_empty()
            && self.pseudo_classes.is_empty()
        {
            self.id.as_deref()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
    AdjacentSibling,
    GeneralSibling,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SelectorPart {
    step: SelectorStep,
    // Relation to the previous (left) part.
    combinator: Option<Combinator>,
}

/// A parsed selector list (`a, b c`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    groups: Vec<Vec<SelectorPart>>,
}

impl SelectorList {
    pub fn parse(selector: &str) -> Result<Self> {
        Ok(Self {
            groups: parse_selector_groups(selector)?,
        })
    }
}

impl Dom {
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let list = SelectorList::parse(selector)?;
        Ok(self.select(&list))
    }

    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    pub fn matches_selector(&self, node_id: NodeId, selector: &str) -> Result<bool> {
        if !self.is_element(node_id) {
            return Ok(false);
        }
        let list = SelectorList::parse(selector)?;
        Ok(list
            .groups
            .iter()
            .any(|steps| self.matches_chain(node_id, steps)))
    }

    /// Evaluate an already parsed selector list in document order.
    pub fn select(&self, list: &SelectorList) -> Vec<NodeId> {
        let candidates = if list.groups.len() == 1 && list.groups[0].len() == 1 {
            match list.groups[0][0].step.id_only() {
                Some(id) => self
                    .elements()
                    .into_iter()
                    .filter(|n| self.element(*n).and_then(|e| e.id()) == Some(id))
                    .collect(),
                None => self.elements(),
            }
        } else {
            self.elements()
        };

        let mut seen = HashSet::new();
        candidates
            .into_iter()
            .filter(|candidate| {
                list.groups
                    .iter()
                    .any(|steps| self.matches_chain(*candidate, steps))
                    && seen.insert(*candidate)
            })
            .collect()
    }

    fn matches_chain(&self, node_id: NodeId, steps: &[SelectorPart]) -> bool {
        let Some(last) = steps.last() else {
            return false;
        };
        self.matches_step(node_id, &last.step) && self.matches_left(node_id, steps, steps.len() - 1)
    }

    /// `steps[idx]` matched `node_id`; check the parts to its left, backtracking over
    /// alternative ancestors/siblings.
    fn matches_left(&self, node_id: NodeId, steps: &[SelectorPart], idx: usize) -> bool {
        if idx == 0 {
            return true;
        }
        let prev_step = &steps[idx - 1].step;
        let accept =
            |candidate: NodeId| self.matches_step(candidate, prev_step) && self.matches_left(candidate, steps, idx - 1);

        match steps[idx].combinator.unwrap_or(Combinator::Descendant) {
            Combinator::Child => self.parent(node_id).is_some_and(accept),
            Combinator::Descendant => {
                let mut cursor = self.parent(node_id);
                while let Some(parent) = cursor {
                    if accept(parent) {
                        return true;
                    }
                    cursor = self.parent(parent);
                }
                false
            }
            Combinator::AdjacentSibling => self.previous_element_sibling(node_id).is_some_and(accept),
            Combinator::GeneralSibling => {
                let mut cursor = self.previous_element_sibling(node_id);
                while let Some(sibling) = cursor {
                    if accept(sibling) {
                        return true;
                    }
                    cursor = self.previous_element_sibling(sibling);
                }
                false
            }
        }
    }

    fn matches_step(&self, node_id: NodeId, step: &SelectorStep) -> bool {
        let Some(element) = self.element(node_id) else {
            return false;
        };

        if let Some(tag) = &step.tag {
            if !element.tag_name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        if let Some(id) = &step.id {
            if element.attr("id") != Some(id.as_str()) {
                return false;
            }
        }

        if !step.classes.is_empty() {
            let classes = element.class_list();
            if step
                .classes
                .iter()
                .any(|class_name| !classes.contains(&class_name.as_str()))
            {
                return false;
            }
        }

        for cond in &step.attrs {
            let matched = match cond {
                AttrCondition::Exists { key } => element.attrs.contains_key(key),
                AttrCondition::Eq { key, value } => element.attr(key) == Some(value.as_str()),
                AttrCondition::StartsWith { key, value } => !value.is_empty()
                    && element.attr(key).is_some_and(|attr| attr.starts_with(value.as_str())),
                AttrCondition::EndsWith { key, value } => !value.is_empty()
                    && element.attr(key).is_some_and(|attr| attr.ends_with(value.as_str())),
                AttrCondition::Contains { key, value } => !value.is_empty()
                    && element.attr(key).is_some_and(|attr| attr.contains(value.as_str())),
                AttrCondition::Includes { key, value } => element
                    .attr(key)
                    .is_some_and(|attr| attr.split_ascii_whitespace().any(|t| t == value.as_str())),
                AttrCondition::DashMatch { key, value } => element.attr(key).is_some_and(|attr| {
                    attr == value || attr.starts_with(&format!("{value}-"))
                }),
            };
            if !matched {
                return false;
            }
        }

        step.pseudo_classes
            .iter()
            .all(|pseudo| self.matches_pseudo(node_id, pseudo))
    }

    fn matches_pseudo(&self, node_id: NodeId, pseudo: &PseudoClass) -> bool {
        let siblings = self.element_siblings(node_id);
        let same_type = self.same_tag_siblings(node_id);
        let position = |list: &[NodeId]| list.iter().position(|s| *s == node_id);

        match pseudo {
            PseudoClass::FirstChild => position(&siblings) == Some(0),
            PseudoClass::LastChild => {
                position(&siblings).is_some_and(|p| p + 1 == siblings.len())
            }
            PseudoClass::OnlyChild => siblings.len() == 1,
            PseudoClass::FirstOfType => position(&same_type) == Some(0),
            PseudoClass::LastOfType => {
                position(&same_type).is_some_and(|p| p + 1 == same_type.len())
            }
            PseudoClass::OnlyOfType => same_type.len() == 1,
            PseudoClass::NthChild(expr) => position(&siblings).is_some_and(|p| expr.matches(p + 1)),
            PseudoClass::NthLastChild(expr) => {
                position(&siblings).is_some_and(|p| expr.matches(siblings.len() - p))
            }
            PseudoClass::NthOfType(expr) => {
                position(&same_type).is_some_and(|p| expr.matches(p + 1))
            }
            PseudoClass::NthLastOfType(expr) => {
                position(&same_type).is_some_and(|p| expr.matches(same_type.len() - p))
            }
            PseudoClass::Not(inners) => !inners
                .iter()
                .any(|inner| self.matches_chain(node_id, inner)),
        }
    }
}

// ============================================================================
// Parsing
// ============================================================================

fn unsupported(selector: &str) -> SelectorError {
    SelectorError::UnsupportedSelector(selector.to_string())
}

fn parse_selector_groups(selector: &str) -> Result<Vec<Vec<SelectorPart>>> {
    let groups = split_selector_groups(selector)?;
    let mut parsed = Vec::with_capacity(groups.len());
    for group in groups {
        if group.trim().is_empty() {
            return Err(unsupported(selector));
        }
        parsed.push(parse_selector_chain(&group)?);
    }
    Ok(parsed)
}

fn parse_selector_chain(selector: &str) -> Result<Vec<SelectorPart>> {
    let tokens = tokenize_selector(selector)?;
    let mut steps = Vec::new();
    let mut pending: Option<Combinator> = None;

    for token in tokens {
        let combinator = match token.as_str() {
            ">" => Some(Combinator::Child),
            "+" => Some(Combinator::AdjacentSibling),
            "~" => Some(Combinator::GeneralSibling),
            _ => None,
        };
        if let Some(combinator) = combinator {
            if pending.is_some() || steps.is_empty() {
                return Err(unsupported(selector));
            }
            pending = Some(combinator);
            continue;
        }

        let step = parse_selector_step(&token)?;
        let combinator = if steps.is_empty() {
            None
        } else {
            Some(pending.take().unwrap_or(Combinator::Descendant))
        };
        steps.push(SelectorPart { step, combinator });
    }

    if steps.is_empty() || pending.is_some() {
        return Err(unsupported(selector));
    }
    Ok(steps)
}

/// Copy an escape sequence starting at `chars[i] == '\\'` into `out`; returns the
/// index just past it (including the single whitespace that may end a hex escape).
fn copy_escape(chars: &[char], mut i: usize, out: &mut String) -> usize {
    out.push(chars[i]);
    i += 1;
    let Some(&next) = chars.get(i) else {
        return i;
    };
    if next.is_ascii_hexdigit() {
        let start = i;
        while i < chars.len() && i - start < 6 && chars[i].is_ascii_hexdigit() {
            out.push(chars[i]);
            i += 1;
        }
        if let Some(&ws) = chars.get(i) {
            if ws.is_ascii_whitespace() {
                out.push(ws);
                i += 1;
            }
        }
    } else {
        out.push(next);
        i += 1;
    }
    i
}

/// Split a selector list on commas outside brackets, parens, quotes and escapes.
fn split_selector_groups(selector: &str) -> Result<Vec<String>> {
    let chars: Vec<char> = selector.chars().collect();
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut bracket_depth = 0usize;
    let mut paren_depth = 0usize;
    let mut quote: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if ch == '\\' {
            i = copy_escape(&chars, i, &mut current);
            continue;
        }
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            current.push(ch);
            i += 1;
            continue;
        }
        match ch {
            '"' | '\'' => {
                quote = Some(ch);
                current.push(ch);
            }
            '[' => {
                bracket_depth += 1;
                current.push(ch);
            }
            ']' => {
                bracket_depth = bracket_depth
                    .checked_sub(1)
                    .ok_or_else(|| unsupported(selector))?;
                current.push(ch);
            }
            '(' => {
                paren_depth += 1;
                current.push(ch);
            }
            ')' => {
                paren_depth = paren_depth
                    .checked_sub(1)
                    .ok_or_else(|| unsupported(selector))?;
                current.push(ch);
            }
            ',' if bracket_depth == 0 && paren_depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
        i += 1;
    }

    if bracket_depth != 0 || paren_depth != 0 || quote.is_some() {
        return Err(unsupported(selector));
    }
    parts.push(current.trim().to_string());
    Ok(parts)
}

fn tokenize_selector(selector: &str) -> Result<Vec<String>> {
    let chars: Vec<char> = selector.chars().collect();
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut bracket_depth = 0usize;
    let mut paren_depth = 0usize;
    let mut quote: Option<char> = None;
    let mut i = 0;

    let flush = |current: &mut String, tokens: &mut Vec<String>| {
        if !current.trim().is_empty() {
            tokens.push(current.trim().to_string());
        }
        current.clear();
    };

    while i < chars.len() {
        let ch = chars[i];
        if ch == '\\' {
            i = copy_escape(&chars, i, &mut current);
            continue;
        }
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            current.push(ch);
            i += 1;
            continue;
        }
        let top_level = bracket_depth == 0 && paren_depth == 0;
        match ch {
            '"' | '\'' => {
                quote = Some(ch);
                current.push(ch);
            }
            '[' => {
                bracket_depth += 1;
                current.push(ch);
            }
            ']' => {
                bracket_depth = bracket_depth
                    .checked_sub(1)
                    .ok_or_else(|| unsupported(selector))?;
                current.push(ch);
            }
            '(' => {
                paren_depth += 1;
                current.push(ch);
            }
            ')' => {
                paren_depth = paren_depth
                    .checked_sub(1)
                    .ok_or_else(|| unsupported(selector))?;
                current.push(ch);
            }
            '>' | '+' | '~' if top_level => {
                flush(&mut current, &mut tokens);
                tokens.push(ch.to_string());
            }
            ch if ch.is_ascii_whitespace() && top_level => flush(&mut current, &mut tokens),
            _ => current.push(ch),
        }
        i += 1;
    }

    if bracket_depth != 0 || paren_depth != 0 || quote.is_some() {
        return Err(unsupported(selector));
    }
    flush(&mut current, &mut tokens);
    Ok(tokens)
}

fn parse_selector_step(part: &str) -> Result<SelectorStep> {
    let chars: Vec<char> = part.chars().collect();
    let mut i = 0usize;
    let mut step = SelectorStep::default();

    while i < chars.len() {
        match chars[i] {
            '*' => {
                if step.universal || step.tag.is_some() || i != 0 {
                    return Err(unsupported(part));
                }
                step.universal = true;
                i += 1;
            }
            '#' => {
                let (id, next) = parse_ident(&chars, i + 1).ok_or_else(|| unsupported(part))?;
                if step.id.replace(id).is_some() {
                    return Err(unsupported(part));
                }
                i = next;
            }
            '.' => {
                let (class_name, next) =
                    parse_ident(&chars, i + 1).ok_or_else(|| unsupported(part))?;
                step.classes.push(class_name);
                i = next;
            }
            '[' => {
                let (attr, next) = parse_attr_condition(&chars, i, part)?;
                step.attrs.push(attr);
                i = next;
            }
            ':' => {
                let (pseudo, next) = parse_pseudo(&chars, i, part)?;
                step.pseudo_classes.push(pseudo);
                i = next;
            }
            _ => {
                if i != 0 {
                    return Err(unsupported(part));
                }
                let (tag, next) = parse_ident(&chars, i).ok_or_else(|| unsupported(part))?;
                step.tag = Some(tag.to_ascii_lowercase());
                i = next;
            }
        }
    }

    if step.is_empty() {
        return Err(unsupported(part));
    }
    Ok(step)
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || (ch as u32) >= 0x80
}

fn parse_ident(chars: &[char], start: usize) -> Option<(String, usize)> {
    let mut raw = String::new();
    let mut i = start;
    while i < chars.len() {
        if chars[i] == '\\' {
            if i + 1 >= chars.len() {
                return None;
            }
            i = copy_escape(chars, i, &mut raw);
        } else if is_ident_char(chars[i]) {
            raw.push(chars[i]);
            i += 1;
        } else {
            break;
        }
    }
    if raw.is_empty() {
        return None;
    }
    Some((css_unescape(&raw), i))
}

fn skip_ws(chars: &[char], i: &mut usize) {
    while *i < chars.len() && chars[*i].is_ascii_whitespace() {
        *i += 1;
    }
}

fn parse_attr_condition(
    chars: &[char],
    open_bracket: usize,
    part: &str,
) -> Result<(AttrCondition, usize)> {
    let mut i = open_bracket + 1;
    skip_ws(chars, &mut i);

    let mut raw_key = String::new();
    while i < chars.len() {
        if chars[i] == '\\' {
            if i + 1 >= chars.len() {
                return Err(unsupported(part));
            }
            i = copy_escape(chars, i, &mut raw_key);
        } else if is_ident_char(chars[i]) || chars[i] == ':' {
            raw_key.push(chars[i]);
            i += 1;
        } else {
            break;
        }
    }
    if raw_key.is_empty() {
        return Err(unsupported(part));
    }
    let key = css_unescape(&raw_key).to_ascii_lowercase();

    skip_ws(chars, &mut i);
    match chars.get(i) {
        Some(']') => return Ok((AttrCondition::Exists { key }, i + 1)),
        None => return Err(unsupported(part)),
        _ => {}
    }

    let op = match (chars.get(i), chars.get(i + 1)) {
        (Some('='), _) => {
            i += 1;
            '='
        }
        (Some(c @ ('^' | '$' | '*' | '~' | '|')), Some('=')) => {
            i += 2;
            *c
        }
        _ => return Err(unsupported(part)),
    };

    skip_ws(chars, &mut i);
    let value = match chars.get(i) {
        Some(q @ ('"' | '\'')) => {
            let quote = *q;
            let mut raw = String::new();
            i += 1;
            loop {
                match chars.get(i) {
                    None => return Err(unsupported(part)),
                    Some('\\') => i = copy_escape(chars, i, &mut raw),
                    Some(c) if *c == quote => {
                        i += 1;
                        break;
                    }
                    Some(c) => {
                        raw.push(*c);
                        i += 1;
                    }
                }
            }
            css_unescape(&raw)
        }
        Some(_) => {
            let (ident, next) = parse_ident(chars, i).ok_or_else(|| unsupported(part))?;
            i = next;
            ident
        }
        None => return Err(unsupported(part)),
    };

    skip_ws(chars, &mut i);
    if chars.get(i) != Some(&']') {
        return Err(unsupported(part));
    }

    let cond = match op {
        '=' => AttrCondition::Eq { key, value },
        '^' => AttrCondition::StartsWith { key, value },
        '$' => AttrCondition::EndsWith { key, value },
        '*' => AttrCondition::Contains { key, value },
        '~' => AttrCondition::Includes { key, value },
        _ => AttrCondition::DashMatch { key, value },
    };
    Ok((cond, i + 1))
}

fn parse_pseudo(chars: &[char], colon: usize, part: &str) -> Result<(PseudoClass, usize)> {
    let mut i = colon + 1;
    let name_start = i;
    while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '-') {
        i += 1;
    }
    let name: String = chars[name_start..i]
        .iter()
        .collect::<String>()
        .to_ascii_lowercase();

    let mut argument = None;
    if chars.get(i) == Some(&'(') {
        let mut depth = 0usize;
        let arg_start = i + 1;
        while i < chars.len() {
            match chars[i] {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            i += 1;
        }
        if i >= chars.len() {
            return Err(unsupported(part));
        }
        argument = Some(chars[arg_start..i].iter().collect::<String>());
        i += 1;
    }

    let nth = |arg: &Option<String>| -> Result<NthExpr> {
        arg.as_deref()
            .and_then(parse_nth)
            .ok_or_else(|| unsupported(part))
    };

    let pseudo = match (name.as_str(), &argument) {
        ("first-child", None) => PseudoClass::FirstChild,
        ("last-child", None) => PseudoClass::LastChild,
        ("only-child", None) => PseudoClass::OnlyChild,
        ("first-of-type", None) => PseudoClass::FirstOfType,
        ("last-of-type", None) => PseudoClass::LastOfType,
        ("only-of-type", None) => PseudoClass::OnlyOfType,
        ("nth-child", Some(_)) => PseudoClass::NthChild(nth(&argument)?),
        ("nth-last-child", Some(_)) => PseudoClass::NthLastChild(nth(&argument)?),
        ("nth-of-type", Some(_)) => PseudoClass::NthOfType(nth(&argument)?),
        ("nth-last-of-type", Some(_)) => PseudoClass::NthLastOfType(nth(&argument)?),
        ("not", Some(inner)) => PseudoClass::Not(parse_selector_groups(inner)?),
        _ => return Err(unsupported(part)),
    };
    Ok((pseudo, i))
}

fn parse_nth(raw: &str) -> Option<NthExpr> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();

    match compact.as_str() {
        "odd" => return Some(NthExpr { a: 2, b: 1 }),
        "even" => return Some(NthExpr { a: 2, b: 0 }),
        "" => return None,
        _ => {}
    }

    let Some((a_raw, b_raw)) = compact.split_once('n') else {
        return compact.parse::<i64>().ok().map(|b| NthExpr { a: 0, b });
    };

    let a = match a_raw {
        "" | "+" => 1,
        "-" => -1,
        other => other.parse::<i64>().ok()?,
    };
    let b = if b_raw.is_empty() {
        0
    } else {
        if !b_raw.starts_with(['+', '-']) {
            return None;
        }
        b_raw.parse::<i64>().ok()?
    };
    Some(NthExpr { a, b })
}
