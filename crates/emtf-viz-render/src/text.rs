//! ROOT TLatex markup and approximate text metrics.
//!
//! Titles and labels arrive in ROOT's markup (`p_{T}`, `|#eta|`,
//! `log_{2}`). They are split into spans shifted to subscript or superscript
//! and `#name` symbols are replaced by their Unicode characters.

/// Vertical placement of a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    Normal,
    Sub,
    Super,
}

/// A run of text with one vertical placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub shift: Shift,
}

/// Relative size of sub- and superscripts.
pub const SCRIPT_SCALE: f64 = 0.7;

const SYMBOLS: &[(&str, &str)] = &[
    ("alpha", "\u{03B1}"),
    ("beta", "\u{03B2}"),
    ("gamma", "\u{03B3}"),
    ("Delta", "\u{0394}"),
    ("delta", "\u{03B4}"),
    ("eta", "\u{03B7}"),
    ("theta", "\u{03B8}"),
    ("mu", "\u{03BC}"),
    ("pi", "\u{03C0}"),
    ("sigma", "\u{03C3}"),
    ("phi", "\u{03C6}"),
    ("chi", "\u{03C7}"),
    ("pm", "\u{00B1}"),
    ("times", "\u{00D7}"),
    ("rightarrow", "\u{2192}"),
    ("leq", "\u{2264}"),
    ("geq", "\u{2265}"),
];

/// Replace `#name` symbols; unknown names are kept verbatim.
fn replace_symbols(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('#') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let name_len = after.find(|c: char| !c.is_ascii_alphabetic()).unwrap_or(after.len());
        // longest known prefix, so `#etaX` still reads as eta
        let hit = SYMBOLS
            .iter()
            .filter(|(name, _)| after[..name_len].starts_with(name))
            .max_by_key(|(name, _)| name.len());
        match hit {
            Some((name, symbol)) => {
                out.push_str(symbol);
                rest = &after[name.len()..];
            }
            None => {
                out.push('#');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn push(spans: &mut Vec<Span>, text: &str, shift: Shift) {
    if text.is_empty() {
        return;
    }
    match spans.last_mut() {
        Some(last) if last.shift == shift => last.text.push_str(text),
        _ => spans.push(Span { text: text.to_string(), shift }),
    }
}

/// Split ROOT markup into spans. `_{..}` and `^{..}` groups become sub- and
/// superscripts (one level; nested groups are flattened into the outer one),
/// and a bare `_x` or `^x` applies to the single next character.
pub fn parse_latex(s: &str) -> Vec<Span> {
    let s = replace_symbols(s);
    let mut spans = Vec::new();
    let mut chars = s.char_indices().peekable();
    let mut plain_start = 0;
    while let Some((i, c)) = chars.next() {
        let shift = match c {
            '_' => Shift::Sub,
            '^' => Shift::Super,
            _ => continue,
        };
        push(&mut spans, &s[plain_start..i], Shift::Normal);
        let group = match chars.peek() {
            Some(&(j, '{')) => {
                chars.next();
                let mut depth = 1;
                let mut end = s.len();
                for (k, ch) in chars.by_ref() {
                    match ch {
                        '{' => depth += 1,
                        '}' => {
                            depth -= 1;
                            if depth == 0 {
                                end = k;
                                break;
                            }
                        }
                        _ => {}
                    }
                }
                s[j + 1..end].replace(['{', '}', '_', '^'], "")
            }
            Some(&(j, ch)) => {
                chars.next();
                s[j..j + ch.len_utf8()].to_string()
            }
            None => String::new(),
        };
        push(&mut spans, &group, shift);
        plain_start = chars.peek().map_or(s.len(), |&(k, _)| k);
    }
    push(&mut spans, &s[plain_start..], Shift::Normal);
    spans
}

/// Markup flattened to plain text (scripts inline).
pub fn plain_text(s: &str) -> String {
    parse_latex(s).into_iter().map(|sp| sp.text).collect()
}

#[derive(Debug, Clone, Copy)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub ascent: f64,
}

/// Advance width of `c` in ems for a Helvetica-like face.
fn advance(c: char) -> f64 {
    match c {
        ' ' | '.' | ',' | ':' | ';' | '|' | '!' | '\'' | 'i' | 'j' | 'l' | 'I' => 0.28,
        'f' | 't' | 'r' | '(' | ')' | '[' | ']' | '/' | '-' => 0.34,
        'm' | 'w' | 'M' | 'W' | '@' => 0.85,
        c if c.is_ascii_uppercase() => 0.67,
        c if c.is_ascii_digit() => 0.556,
        _ => 0.54,
    }
}

/// Approximate size of rendered markup at `size_pt`.
pub fn measure_text(text: &str, size_pt: f64) -> TextMetrics {
    let width = parse_latex(text)
        .iter()
        .map(|sp| {
            let scale = if sp.shift == Shift::Normal { 1.0 } else { SCRIPT_SCALE };
            sp.text.chars().map(advance).sum::<f64>() * scale
        })
        .sum::<f64>()
        * size_pt;
    TextMetrics { width, height: 1.15 * size_pt, ascent: 0.9 * size_pt }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sp(text: &str, shift: Shift) -> Span {
        Span { text: text.into(), shift }
    }

    #[test]
    fn subscripts_and_symbols() {
        assert_eq!(
            parse_latex("1 < p_{T} < 4 GeV"),
            vec![sp("1 < p", Shift::Normal), sp("T", Shift::Sub), sp(" < 4 GeV", Shift::Normal)]
        );
        assert_eq!(plain_text("1.2 < |#eta| < 2.4"), "1.2 < |\u{03B7}| < 2.4");
        assert_eq!(plain_text("d#phi12/23/34 + comb, #theta"), "d\u{03C6}12/23/34 + comb, \u{03B8}");
    }

    #[test]
    fn nested_and_bare_scripts() {
        let spans = parse_latex("log_{2}(p_{T}^{trg})");
        assert_eq!(spans[1], sp("2", Shift::Sub));
        assert_eq!(spans[4], sp("trg", Shift::Super));
        assert_eq!(parse_latex("x^2"), vec![sp("x", Shift::Normal), sp("2", Shift::Super)]);
        assert_eq!(parse_latex("a_{b_{c}}d")[1], sp("bc", Shift::Sub));
    }

    #[test]
    fn unknown_symbols_survive() {
        assert_eq!(plain_text("#foo and #"), "#foo and #");
        assert_eq!(plain_text("f_0x001f01ff"), "f0x001f01ff");
    }

    #[test]
    fn scripts_measure_narrower() {
        let plain = measure_text("pT", 10.0).width;
        let sub = measure_text("p_{T}", 10.0).width;
        assert!(sub < plain);
        assert!(measure_text("", 10.0).width == 0.0);
    }
}
