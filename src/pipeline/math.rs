//! Display-math repairs.
//!
//! Two independent fixes live here:
//!
//! * [`reindent_math`] — the converter emits the line *after* a display
//!   math block with the block's indentation still attached, which makes
//!   RST treat it as part of the formula. A small state machine tracks the
//!   block's expected indentation (taken from its first non-blank line) and
//!   dedents the first line that breaks it. A `.. math::` directive with
//!   inline content is a one-line formula: only its immediate next indented
//!   line needs the dedent.
//!
//! * [`expand_formula_macros`] — the source defines helper macros
//!   (`\floor*{..}`, `\ceil*{..}`, `\abs{..}`, `\norm{..}`, `\iverson{..}`)
//!   that MathJax does not know. Each occurrence is expanded to its plain
//!   delimiter pair, with the closing brace found by nested-brace matching
//!   so macro arguments may themselves contain braces.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_MATH_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\.\. math::$").unwrap());
static RE_MATH_INLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\.\. math::").unwrap());
static RE_MACRO_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\(floor\*|ceil\*|abs|norm|iverson)\{").unwrap());

/// Dedent the first line following each display-math block.
pub fn reindent_math(lines: &mut [String]) {
    let mut math_block = false;
    let mut math_line = false;
    let mut indent: Option<String> = None;

    for line in lines.iter_mut() {
        if line.is_empty() {
            continue;
        }

        if RE_MATH_BLOCK.is_match(line) {
            math_block = true;
        } else if RE_MATH_INLINE.is_match(line) {
            math_line = true;
        } else if math_block {
            match &indent {
                None => {
                    let leading: String =
                        line.chars().take_while(|c| c.is_whitespace()).collect();
                    indent = Some(leading);
                }
                Some(expected) => {
                    let continues = line.starts_with(expected.as_str())
                        && line[expected.len()..]
                            .chars()
                            .next()
                            .is_some_and(|c| !c.is_whitespace());
                    if !continues {
                        indent = None;
                        math_block = false;
                        *line = line.trim().to_string();
                    }
                }
            }
        } else if math_line && line.starts_with(' ') {
            math_line = false;
            *line = line.trim().to_string();
        }
    }
}

/// Delimiter pair for one helper macro.
fn macro_delimiters(name: &str) -> (&'static str, &'static str) {
    match name {
        "floor*" => (r"\left\lfloor ", r"\right\rfloor "),
        "ceil*" => (r"\left\lceil ", r"\right\rceil "),
        "abs" => ("|", "|"),
        "norm" => (r"\|", r"\|"),
        "iverson" => (r"\big[", r"\big]"),
        other => unreachable!("macro {other} not in RE_MACRO_OPEN"),
    }
}

/// Expand every helper-macro occurrence in the unit's lines.
pub fn expand_formula_macros(lines: &mut [String]) {
    for line in lines.iter_mut() {
        let mut replacements: Vec<(usize, usize, &'static str)> = Vec::new();

        for m in RE_MACRO_OPEN.captures_iter(line) {
            let whole = m.get(0).unwrap();
            let (open, close) = macro_delimiters(&m[1]);

            // Find the brace closing this macro's argument.
            let mut level = 1usize;
            let mut close_idx = None;
            for (idx, ch) in line[whole.end()..].char_indices() {
                match ch {
                    '{' => level += 1,
                    '}' => level -= 1,
                    _ => {}
                }
                if level == 0 {
                    close_idx = Some(whole.end() + idx);
                    break;
                }
            }
            // An unterminated macro is left alone rather than half-expanded.
            let Some(close_idx) = close_idx else { continue };

            replacements.push((whole.start(), whole.end(), open));
            replacements.push((close_idx, close_idx + 1, close));
        }

        replacements.sort_by(|a, b| b.0.cmp(&a.0));
        for (start, end, replacement) in replacements {
            line.replace_range(start..end, replacement);
        }
    }
}
