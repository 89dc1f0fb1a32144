//! Rule source parser
//!
//! A rule source describes, for one zoom factor, how every sub-pixel of the
//! magnified output blends the 3x3 neighbourhood for each edge pattern. It is
//! line oriented:
//!
//! ```text
//! // comments and blank lines are ignored
//! case 0
//! case 16..31
//!     pixel0 = c5;
//!     if (edge(c4, c2)) {
//!         pixel1 = interpolate<3,1>(c5, c2);
//!     } else {
//!         pixel1 = interpolate<2,1,1>(c5, c2, c4);
//!     }
//! break
//! ```
//!
//! Parsing happens in two passes. The lexer turns every line into tokens,
//! resolving blend expressions into [`Weights`] as it goes. The parser then
//! drives an explicit state machine over the tokens, recording one
//! assignment per selected case. Once the whole source is read the recorded
//! assignments decide the table layout (quadrant or full) and are written
//! into a [`RawTable`] in source order, so later assignments win.

use std::sync::LazyLock;

use regex::Regex;

use crate::case::{edge_bit, has_edge, CASE_COUNT};
use crate::error::{ParseError, ParseErrorKind};
use crate::table::{Layout, RawTable, Zoom};
use crate::weights::{Weights, CENTER, MAX_FACTOR_TOTAL};

/// Authored neighbour names, indexed by neighbour index.
pub const NEIGHBOUR_NAMES: [&str; 9] = ["c1", "c2", "c3", "c4", "c5", "c6", "c7", "c8", "c9"];

static RE_CASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^case\s+(\d+)(?:\s*\.\.=?\s*(\d+))?\s*:?").expect("valid regex")
});
static RE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^break\b\s*;?").expect("valid regex"));
static RE_IF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^if\s*\(\s*edge\s*\(([^)]*)\)\s*\)").expect("valid regex")
});
static RE_ELSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^else\b").expect("valid regex"));
static RE_ASSIGN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^pixel(\d+)\s*=\s*([^;]*);").expect("valid regex"));
static RE_INTERPOLATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^interpolate\s*<([^>]*)>\s*\(([^)]*)\)$").expect("valid regex")
});
static RE_NEIGHBOUR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^c\d+$").expect("valid regex"));

/// One lexical unit of a rule source.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    /// `case A` or `case A..B`, inclusive
    Case { start: u16, end: u16 },
    Break,
    /// `if (edge(cA, cB))`, resolved to its case bit
    If { edge: usize },
    Else,
    Open,
    Close,
    Assign { slot: usize, weights: Weights },
}

#[derive(Debug, Clone)]
struct Located<'a> {
    line: usize,
    text: &'a str,
    token: Token,
}

impl Located<'_> {
    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(self.line, self.text, kind)
    }
}

/// Parse the rule source for one zoom factor into a raw table.
///
/// # Examples
///
/// ```
/// use hqxc::parser::parse_rules;
/// use hqxc::table::{Layout, Zoom};
/// use hqxc::weights::Weights;
///
/// let source = "case 0\n  pixel0 = interpolate<3,1>(c5, c1);\nbreak\n";
/// let raw = parse_rules(source, Zoom::X2).unwrap();
/// assert_eq!(raw.layout, Layout::Quadrant);
/// assert_eq!(raw.get(0, 0), Some(Weights([1, 0, 0, 0, 3, 0, 0, 0, 0])));
/// assert_eq!(raw.get(1, 0), None);
/// ```
pub fn parse_rules(source: &str, zoom: Zoom) -> Result<RawTable, ParseError> {
    let tokens = lex(source, zoom)?;
    let assignments = run_state_machine(&tokens)?;
    Ok(build_table(zoom, &assignments))
}

// ============================================================================
// Lexer
// ============================================================================

fn lex(source: &str, zoom: Zoom) -> Result<Vec<Located<'_>>, ParseError> {
    let mut tokens = Vec::new();
    for (idx, text) in source.lines().enumerate() {
        let line = idx + 1;
        let code = strip_comments(text);
        let mut rest = code.trim();
        while !rest.is_empty() {
            let (token, consumed) = lex_one(rest, zoom)
                .map_err(|kind| ParseError::new(line, text.trim(), kind))?;
            tokens.push(Located { line, text: text.trim(), token });
            rest = rest[consumed..].trim_start();
        }
    }
    Ok(tokens)
}

/// Remove `//`, `#` and single-line `/* */` comments.
fn strip_comments(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    let cut = [out.find("//"), out.find('#')].into_iter().flatten().min();
    if let Some(cut) = cut {
        out.truncate(cut);
    }
    out
}

/// Lex the token at the start of `input`, returning it and its byte length.
fn lex_one(input: &str, zoom: Zoom) -> Result<(Token, usize), ParseErrorKind> {
    if let Some(caps) = RE_CASE.captures(input) {
        let start = parse_case_value(&caps[1])?;
        let end = match caps.get(2) {
            Some(m) => parse_case_value(m.as_str())?,
            None => start,
        };
        if start > end {
            return Err(ParseErrorKind::EmptyCaseRange { start: start as u64, end: end as u64 });
        }
        return Ok((Token::Case { start, end }, caps[0].len()));
    }
    if let Some(m) = RE_BREAK.find(input) {
        return Ok((Token::Break, m.end()));
    }
    if let Some(caps) = RE_IF.captures(input) {
        let edge = parse_edge(&caps[1])?;
        return Ok((Token::If { edge }, caps[0].len()));
    }
    if let Some(m) = RE_ELSE.find(input) {
        return Ok((Token::Else, m.end()));
    }
    if input.starts_with('{') {
        return Ok((Token::Open, 1));
    }
    if input.starts_with('}') {
        return Ok((Token::Close, 1));
    }
    if let Some(caps) = RE_ASSIGN.captures(input) {
        let slot = parse_slot(&caps[1], zoom)?;
        let weights = parse_expression(caps[2].trim())?;
        return Ok((Token::Assign { slot, weights }, caps[0].len()));
    }
    Err(ParseErrorKind::UnrecognizedStatement)
}

fn parse_case_value(digits: &str) -> Result<u16, ParseErrorKind> {
    let value = digits.parse::<u64>().unwrap_or(u64::MAX);
    if value >= CASE_COUNT as u64 {
        return Err(ParseErrorKind::CaseOutOfRange(value));
    }
    Ok(value as u16)
}

fn parse_slot(digits: &str, zoom: Zoom) -> Result<usize, ParseErrorKind> {
    let slot = digits.parse::<usize>().unwrap_or(usize::MAX);
    let count = zoom.size() * zoom.size();
    if slot >= count {
        return Err(ParseErrorKind::SlotOutOfRange { slot, zoom: zoom.factor() });
    }
    if zoom.implicit_center() == Some(slot) {
        return Err(ParseErrorKind::ImplicitCenter { slot });
    }
    Ok(slot)
}

/// Resolve `cN` to its neighbour index.
fn parse_neighbour(name: &str) -> Result<usize, ParseErrorKind> {
    NEIGHBOUR_NAMES
        .iter()
        .position(|&n| n == name)
        .ok_or_else(|| ParseErrorKind::UnknownNeighbour(name.to_string()))
}

/// Resolve the operands of `edge(...)` to one of the four ring bits.
fn parse_edge(args: &str) -> Result<usize, ParseErrorKind> {
    let unknown = || ParseErrorKind::UnknownEdge(args.trim().to_string());
    let names: Vec<&str> = args.split(',').map(str::trim).collect();
    let [a, b] = names.as_slice() else {
        return Err(unknown());
    };
    let a = parse_neighbour(a)?;
    let b = parse_neighbour(b)?;
    match edge_bit(a, b) {
        Some(bit) if bit < 4 => Ok(bit),
        _ => Err(unknown()),
    }
}

/// Parse `cN` or `interpolate<f1,f2,...>(cA, cB, ...)`.
fn parse_expression(expr: &str) -> Result<Weights, ParseErrorKind> {
    if RE_NEIGHBOUR.is_match(expr) {
        return parse_neighbour(expr).map(Weights::single);
    }
    let Some(caps) = RE_INTERPOLATE.captures(expr) else {
        return Err(ParseErrorKind::MalformedExpression(expr.to_string()));
    };
    let factors = caps[1]
        .split(',')
        .map(str::trim)
        .map(|f| match f.parse::<u32>() {
            Ok(v) if v > 0 => Ok(v),
            _ => Err(ParseErrorKind::InvalidFactor(f.to_string())),
        })
        .collect::<Result<Vec<_>, _>>()?;
    let neighbours = caps[2]
        .split(',')
        .map(str::trim)
        .map(parse_neighbour)
        .collect::<Result<Vec<_>, _>>()?;
    if factors.len() != neighbours.len() {
        return Err(ParseErrorKind::ArityMismatch {
            factors: factors.len(),
            neighbours: neighbours.len(),
        });
    }
    if !(2..=3).contains(&factors.len()) {
        return Err(ParseErrorKind::TermCount(factors.len()));
    }
    let total = factors.iter().try_fold(0u32, |acc, &f| acc.checked_add(f));
    let too_large = || ParseErrorKind::FactorTotal {
        total: factors.iter().map(|&f| u64::from(f)).sum(),
    };
    if !total.is_some_and(|t| t <= MAX_FACTOR_TOTAL) {
        return Err(too_large());
    }
    let terms: Vec<(usize, u32)> = neighbours.iter().copied().zip(factors.iter().copied()).collect();
    Weights::from_terms(&terms).ok_or_else(too_large)
}

// ============================================================================
// State machine
// ============================================================================

/// A `pixel<k> = <expr>;` statement.
#[derive(Debug, Clone, Copy)]
struct Assignment {
    slot: usize,
    weights: Weights,
}

/// An assignment resolved to a single case.
#[derive(Debug, Clone, Copy)]
struct Recorded {
    case: u16,
    slot: usize,
    weights: Weights,
}

/// Where the parser is inside a conditional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    AwaitThenOpen,
    Then,
    AwaitElse,
    AwaitElseOpen,
    Else,
}

#[derive(Debug, Clone)]
struct Conditional {
    edge: usize,
    stage: Stage,
    then_branch: Vec<Assignment>,
    else_branch: Vec<Assignment>,
    line: usize,
    text: String,
}

#[derive(Debug, Clone)]
enum State {
    BetweenGroups,
    CollectingCases(Vec<u16>),
    InBody(Vec<u16>),
    InConditional(Vec<u16>, Conditional),
}

/// Everything the state machine emits besides its next state.
#[derive(Debug, Default)]
struct Output {
    recorded: Vec<Recorded>,
    /// Lines of group-level `{` still waiting for their `}`
    open_braces: Vec<(usize, String)>,
}

impl Output {
    fn record(&mut self, cases: &[u16], assignment: Assignment) {
        self.recorded.extend(cases.iter().map(|&case| Recorded {
            case,
            slot: assignment.slot,
            weights: assignment.weights,
        }));
    }

    fn apply_conditional(&mut self, cases: &[u16], cond: &Conditional) {
        for &case in cases {
            let branch =
                if has_edge(case, cond.edge) { &cond.then_branch } else { &cond.else_branch };
            for a in branch {
                self.recorded.push(Recorded { case, slot: a.slot, weights: a.weights });
            }
        }
    }
}

fn run_state_machine(tokens: &[Located<'_>]) -> Result<Vec<Recorded>, ParseError> {
    let mut out = Output::default();
    let mut state = State::BetweenGroups;
    for tok in tokens {
        state = step(state, tok, &mut out)?;
    }

    if let State::InConditional(cases, cond) = state {
        if cond.stage != Stage::AwaitElse {
            return Err(ParseError::new(cond.line, cond.text, ParseErrorKind::UnexpectedEof));
        }
        out.apply_conditional(&cases, &cond);
    }
    if let Some((line, text)) = out.open_braces.pop() {
        return Err(ParseError::new(
            line,
            text,
            ParseErrorKind::UnbalancedBraces("'{' is never closed"),
        ));
    }
    Ok(out.recorded)
}

fn step(state: State, tok: &Located<'_>, out: &mut Output) -> Result<State, ParseError> {
    use ParseErrorKind as K;

    match (state, &tok.token) {
        (State::InConditional(cases, cond), _) => step_conditional(cases, cond, tok, out),

        (State::BetweenGroups, &Token::Case { start, end }) => {
            Ok(State::CollectingCases((start..=end).collect()))
        }
        (State::CollectingCases(mut cases), &Token::Case { start, end }) => {
            cases.extend(start..=end);
            Ok(State::CollectingCases(cases))
        }
        (State::InBody(_), Token::Case { .. }) => Err(tok.error(K::CaseInsideBody)),

        (State::BetweenGroups, Token::Break) => Err(tok.error(K::StrayBreak)),
        (_, Token::Break) => Ok(State::BetweenGroups),

        (State::BetweenGroups, Token::Assign { .. }) => {
            Err(tok.error(K::OutsideGroup("pixel assignment")))
        }
        (State::BetweenGroups, Token::If { .. }) => Err(tok.error(K::OutsideGroup("conditional"))),
        (
            State::CollectingCases(cases) | State::InBody(cases),
            &Token::Assign { slot, weights },
        ) => {
            out.record(&cases, Assignment { slot, weights });
            Ok(State::InBody(cases))
        }
        (State::CollectingCases(cases) | State::InBody(cases), &Token::If { edge }) => {
            let cond = Conditional {
                edge,
                stage: Stage::AwaitThenOpen,
                then_branch: Vec::new(),
                else_branch: Vec::new(),
                line: tok.line,
                text: tok.text.to_string(),
            };
            Ok(State::InConditional(cases, cond))
        }

        (_, Token::Else) => Err(tok.error(K::UnbalancedConditional("'else' without 'if'"))),
        (state, Token::Open) => {
            out.open_braces.push((tok.line, tok.text.to_string()));
            Ok(state)
        }
        (state, Token::Close) => match out.open_braces.pop() {
            Some(_) => Ok(state),
            None => Err(tok.error(K::UnbalancedBraces("'}' without a matching '{'"))),
        },
    }
}

fn step_conditional(
    cases: Vec<u16>,
    mut cond: Conditional,
    tok: &Located<'_>,
    out: &mut Output,
) -> Result<State, ParseError> {
    use ParseErrorKind as K;

    match (cond.stage, &tok.token) {
        (Stage::AwaitThenOpen, Token::Open) => cond.stage = Stage::Then,
        (Stage::AwaitThenOpen, _) => {
            return Err(tok.error(K::UnbalancedConditional("expected '{' after the condition")));
        }
        (Stage::Then, &Token::Assign { slot, weights }) => {
            cond.then_branch.push(Assignment { slot, weights })
        }
        (Stage::Else, &Token::Assign { slot, weights }) => {
            cond.else_branch.push(Assignment { slot, weights })
        }
        (Stage::Then | Stage::Else, Token::If { .. }) => {
            return Err(tok.error(K::NestedConditional));
        }
        (Stage::Then, Token::Close) => {
            if cond.then_branch.is_empty() {
                return Err(tok.error(K::EmptyBranch));
            }
            cond.stage = Stage::AwaitElse;
        }
        (Stage::Else, Token::Close) => {
            if cond.else_branch.is_empty() {
                return Err(tok.error(K::EmptyBranch));
            }
            out.apply_conditional(&cases, &cond);
            return Ok(State::InBody(cases));
        }
        (Stage::Then | Stage::Else, _) => {
            return Err(tok.error(K::UnbalancedConditional("expected a pixel assignment or '}'")));
        }
        (Stage::AwaitElse, Token::Else) => cond.stage = Stage::AwaitElseOpen,
        (Stage::AwaitElse, _) => {
            // `if` without `else`: the conditional is complete, the token
            // belongs to the enclosing group.
            out.apply_conditional(&cases, &cond);
            return step(State::InBody(cases), tok, out);
        }
        (Stage::AwaitElseOpen, Token::Open) => cond.stage = Stage::Else,
        (Stage::AwaitElseOpen, _) => {
            return Err(tok.error(K::UnbalancedConditional("expected '{' after 'else'")));
        }
    }
    Ok(State::InConditional(cases, cond))
}

// ============================================================================
// Table assembly
// ============================================================================

/// Decide the layout from the authored slots and fill a raw table.
fn build_table(zoom: Zoom, recorded: &[Recorded]) -> RawTable {
    let n = zoom.size();
    let q = zoom.quadrant_size();
    let in_quadrant = |slot: usize| slot % n < q && slot / n < q;
    let layout = if recorded.iter().all(|r| in_quadrant(r.slot)) {
        Layout::Quadrant
    } else {
        Layout::Full
    };
    let stored_index = |slot: usize| match layout {
        Layout::Quadrant => (slot / n) * q + slot % n,
        Layout::Full => slot,
    };

    let mut table = RawTable::empty(zoom, layout);
    for r in recorded {
        table.entries[r.case as usize][stored_index(r.slot)] = Some(r.weights);
    }
    if let Some(center) = zoom.implicit_center() {
        let idx = stored_index(center);
        for entry in &mut table.entries {
            entry[idx] = Some(Weights::single(CENTER));
        }
    }

    log::debug!(
        "parsed {} assignments for zoom {} ({} layout)",
        recorded.len(),
        zoom,
        layout.name()
    );
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str, zoom: Zoom) -> RawTable {
        parse_rules(source, zoom).unwrap()
    }

    fn parse_err(source: &str, zoom: Zoom) -> ParseError {
        parse_rules(source, zoom).unwrap_err()
    }

    #[test]
    fn test_single_neighbour_expression() {
        assert_eq!(parse_expression("c5"), Ok(Weights::CENTER_ONLY));
        assert_eq!(parse_expression("c1"), Ok(Weights::single(0)));
    }

    #[test]
    fn test_interpolate_expression() {
        assert_eq!(
            parse_expression("interpolate<2,1,1>(c5, c2, c4)"),
            Ok(Weights([0, 1, 0, 1, 2, 0, 0, 0, 0]))
        );
        assert_eq!(
            parse_expression("interpolate<3,1>(c5,c1)"),
            Ok(Weights([1, 0, 0, 0, 3, 0, 0, 0, 0]))
        );
    }

    #[test]
    fn test_expression_errors() {
        assert_eq!(
            parse_expression("interpolate<2,1>(c5, c2, c4)"),
            Err(ParseErrorKind::ArityMismatch { factors: 2, neighbours: 3 })
        );
        assert_eq!(parse_expression("interpolate<1>(c5)"), Err(ParseErrorKind::TermCount(1)));
        assert_eq!(
            parse_expression("interpolate<0,1>(c5, c2)"),
            Err(ParseErrorKind::InvalidFactor("0".into()))
        );
        assert_eq!(parse_expression("c0"), Err(ParseErrorKind::UnknownNeighbour("c0".into())));
        assert_eq!(parse_expression("c10"), Err(ParseErrorKind::UnknownNeighbour("c10".into())));
        assert!(matches!(parse_expression("blend(c1)"), Err(ParseErrorKind::MalformedExpression(_))));
    }

    #[test]
    fn test_factor_total_limit() {
        assert_eq!(
            parse_expression("interpolate<4294967295,1>(c5, c5)"),
            Err(ParseErrorKind::FactorTotal { total: 4_294_967_296 })
        );
        assert_eq!(
            parse_expression("interpolate<4294967295,1>(c5, c1)"),
            Err(ParseErrorKind::FactorTotal { total: 4_294_967_296 })
        );
        assert_eq!(
            parse_expression("interpolate<200,56>(c5, c1)"),
            Err(ParseErrorKind::FactorTotal { total: 256 })
        );
        assert_eq!(
            parse_expression("interpolate<254,1>(c5, c1)"),
            Ok(Weights([1, 0, 0, 0, 254, 0, 0, 0, 0]))
        );

        let err = parse_err("case 0\n    pixel0 = interpolate<4294967295,1>(c5, c5);\nbreak\n", Zoom::X2);
        assert_eq!(err.line, 2);
        assert!(matches!(err.kind, ParseErrorKind::FactorTotal { .. }));
    }

    #[test]
    fn test_strip_comments() {
        assert_eq!(strip_comments("case 1 // note"), "case 1 ");
        assert_eq!(strip_comments("# whole line"), "");
        assert_eq!(strip_comments("pixel0 = /* x */ c5;"), "pixel0 =  c5;");
    }

    #[test]
    fn test_case_group_and_break() {
        let raw = parse("case 1\ncase 2\n  pixel0 = c2;\nbreak\ncase 3\n  pixel0 = c4;\n", Zoom::X2);
        assert_eq!(raw.get(1, 0), Some(Weights::single(1)));
        assert_eq!(raw.get(2, 0), Some(Weights::single(1)));
        assert_eq!(raw.get(3, 0), Some(Weights::single(3)));
        assert_eq!(raw.get(0, 0), None);
    }

    #[test]
    fn test_case_range_and_labels() {
        let raw = parse("case 4..=6:\ncase 10..11:\npixel0 = c1;\nbreak;", Zoom::X2);
        for case in [4, 5, 6, 10, 11] {
            assert_eq!(raw.get(case, 0), Some(Weights::single(0)), "case {}", case);
        }
        assert_eq!(raw.get(7, 0), None);
    }

    #[test]
    fn test_conditional_splits_on_ring_bit() {
        let source = "\
case 0..15
    if (edge(c2, c6)) {
        pixel0 = c5;
    } else {
        pixel0 = interpolate<3,1>(c5, c1);
    }
break
";
        let raw = parse(source, Zoom::X2);
        for case in 0..16u16 {
            let expected = if case & 1 != 0 {
                Weights::CENTER_ONLY
            } else {
                Weights([1, 0, 0, 0, 3, 0, 0, 0, 0])
            };
            assert_eq!(raw.get(case, 0), Some(expected), "case {}", case);
        }
    }

    #[test]
    fn test_single_line_conditional_and_operand_order() {
        let source =
            "case 0..15\nif (edge(c2, c4)) { pixel0 = c2; } else { pixel0 = c4; }\nbreak\n";
        let raw = parse(source, Zoom::X2);
        assert_eq!(raw.get(8, 0), Some(Weights::single(1)));
        assert_eq!(raw.get(7, 0), Some(Weights::single(3)));
    }

    #[test]
    fn test_conditional_without_else() {
        let source = "case 0\ncase 8\nif (edge(c4, c2)) {\npixel0 = c2;\n}\npixel1 = c5;\nbreak";
        let raw = parse(source, Zoom::X2);
        assert_eq!(raw.get(8, 0), Some(Weights::single(1)));
        assert_eq!(raw.get(0, 0), None);
        assert_eq!(raw.get(0, 1), Some(Weights::CENTER_ONLY));
    }

    #[test]
    fn test_layout_detection() {
        let quadrant = parse("case 0\npixel0 = c5;\npixel1 = c5;\npixel4 = c5;\n", Zoom::X4);
        assert_eq!(quadrant.layout, Layout::Quadrant);
        assert_eq!(quadrant.get(0, 2), Some(Weights::CENTER_ONLY));

        let full = parse("case 0\npixel0 = c5;\npixel3 = c5;\n", Zoom::X2);
        assert_eq!(full.layout, Layout::Full);
        assert_eq!(full.get(0, 3), Some(Weights::CENTER_ONLY));
        assert_eq!(full.get(0, 1), None);
    }

    #[test]
    fn test_zoom3_implicit_center() {
        let raw = parse("case 0\npixel0 = c1;\n", Zoom::X3);
        assert_eq!(raw.layout, Layout::Quadrant);
        assert_eq!(raw.get(0, 0), Some(Weights::single(0)));
        // stored (1,1) of the 2x2 quadrant is the centre sub-pixel
        assert_eq!(raw.get(4095, 3), Some(Weights::CENTER_ONLY));

        let err = parse_err("case 0\npixel4 = c5;\n", Zoom::X3);
        assert_eq!(err.kind, ParseErrorKind::ImplicitCenter { slot: 4 });
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_later_assignment_overrides() {
        let raw = parse("case 0\npixel0 = c2;\npixel0 = c4;\n", Zoom::X2);
        assert_eq!(raw.get(0, 0), Some(Weights::single(3)));
    }

    #[test]
    fn test_group_level_braces() {
        let raw = parse("case 0: {\n  pixel0 = c2;\n  break;\n}\ncase 1: pixel0 = c4; break;", Zoom::X2);
        assert_eq!(raw.get(0, 0), Some(Weights::single(1)));
        assert_eq!(raw.get(1, 0), Some(Weights::single(3)));
    }

    #[test]
    fn test_case_out_of_range() {
        let err = parse_err("\ncase 4096\n", Zoom::X2);
        assert_eq!(err.line, 2);
        assert_eq!(err.kind, ParseErrorKind::CaseOutOfRange(4096));
        assert!(err.to_string().contains("case 4096"));
    }

    #[test]
    fn test_unknown_edge() {
        let err = parse_err("case 0\nif (edge(c1, c5)) { pixel0 = c5; } else { pixel0 = c1; }", Zoom::X2);
        assert!(matches!(err.kind, ParseErrorKind::UnknownEdge(_)));
    }

    #[test]
    fn test_unbalanced_conditionals() {
        let err = parse_err("case 0\nif (edge(c2, c6)) {\npixel0 = c5;\n", Zoom::X2);
        assert_eq!(err.kind, ParseErrorKind::UnexpectedEof);
        assert_eq!(err.line, 2);

        let err = parse_err("case 0\n} else {\n", Zoom::X2);
        assert!(matches!(err.kind, ParseErrorKind::UnbalancedBraces(_)));

        let err = parse_err("case 0\nelse {\n", Zoom::X2);
        assert!(matches!(err.kind, ParseErrorKind::UnbalancedConditional(_)));

        let err = parse_err("case 0\nif (edge(c2, c6)) pixel0 = c5;\n", Zoom::X2);
        assert!(matches!(err.kind, ParseErrorKind::UnbalancedConditional(_)));
    }

    #[test]
    fn test_nested_and_empty_conditionals() {
        let err = parse_err(
            "case 0\nif (edge(c2, c6)) {\nif (edge(c6, c8)) {\n",
            Zoom::X2,
        );
        assert_eq!(err.kind, ParseErrorKind::NestedConditional);

        let err = parse_err("case 0\nif (edge(c2, c6)) {\n} else {\npixel0 = c5;\n}", Zoom::X2);
        assert_eq!(err.kind, ParseErrorKind::EmptyBranch);
    }

    #[test]
    fn test_statement_errors() {
        assert_eq!(parse_err("pixel0 = c5;", Zoom::X2).kind, ParseErrorKind::OutsideGroup("pixel assignment"));
        assert_eq!(parse_err("break", Zoom::X2).kind, ParseErrorKind::StrayBreak);
        assert_eq!(parse_err("case 0\npixel0 = c5;\ncase 1", Zoom::X2).kind, ParseErrorKind::CaseInsideBody);
        assert_eq!(parse_err("case 0\nfoo", Zoom::X2).kind, ParseErrorKind::UnrecognizedStatement);
        assert_eq!(
            parse_err("case 0\npixel9 = c5;", Zoom::X3).kind,
            ParseErrorKind::SlotOutOfRange { slot: 9, zoom: 3 }
        );
    }

    #[test]
    fn test_empty_source() {
        let raw = parse("// nothing here\n\n", Zoom::X4);
        assert!(raw.entries.iter().all(|e| e.iter().all(Option::is_none)));
    }
}
