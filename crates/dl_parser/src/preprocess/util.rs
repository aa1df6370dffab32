//! Shared scanning utilities for preprocessing passes.

/// If `i` opens a comment, a quoted string or a regex literal, the position
/// just past it.
///
/// Template literals are not covered; they contain code and are walked with
/// [`TemplateTracker`].
pub(super) fn skip_non_code(chars: &[char], i: usize) -> Option<usize> {
    let &c = chars.get(i)?;
    if c != '"' && c != '\'' {
        return skip_comment(chars, i).or_else(|| skip_regex(chars, i));
    }

    let mut j = i + 1;
    while let Some(&next) = chars.get(j) {
        match next {
            '\\' => j += 2,
            _ if next == c => return Some(j + 1),
            _ => j += 1,
        }
    }
    Some(chars.len())
}

/// Skip a single `//` or `/* */` comment starting at `i`.
pub(super) fn skip_comment(chars: &[char], i: usize) -> Option<usize> {
    if chars[i] != '/' || i + 1 >= chars.len() {
        return None;
    }

    match chars[i + 1] {
        '/' => {
            let mut j = i + 2;
            while j < chars.len() && chars[j] != '\n' {
                j += 1;
            }
            Some((j + 1).min(chars.len()))
        }
        '*' => {
            let mut j = i + 2;
            while j + 1 < chars.len() {
                if chars[j] == '*' && chars[j + 1] == '/' {
                    return Some(j + 2);
                }
                j += 1;
            }
            Some(chars.len())
        }
        _ => None,
    }
}

/// Skip a `/…/flags` regex literal starting at `i`.
///
/// A `/` only opens a regex where an operand is expected, judged from the
/// previous significant character or keyword. Anything else is division.
/// A line break before the closing `/` means it was not a regex after all.
fn skip_regex(chars: &[char], i: usize) -> Option<usize> {
    if chars.get(i) != Some(&'/') || !expects_operand(chars, i) {
        return None;
    }

    let mut in_class = false;
    let mut j = i + 1;
    loop {
        match *chars.get(j)? {
            '\\' => j += 2,
            '\n' | '\r' => return None,
            '[' => {
                in_class = true;
                j += 1;
            }
            ']' => {
                in_class = false;
                j += 1;
            }
            '/' if !in_class => break,
            _ => j += 1,
        }
    }
    Some(scan_word(chars, j + 1))
}

fn expects_operand(chars: &[char], at: usize) -> bool {
    let Some(prev) = chars[..at].iter().rposition(|c| !c.is_whitespace()) else {
        return true;
    };
    match chars[prev] {
        // `a++ / b`
        '+' | '-' => prev == 0 || chars[prev - 1] != chars[prev],
        // `<` is left out so JSX closing tags stay code.
        '(' | ',' | '=' | ':' | '[' | '!' | '&' | '|' | '?' | '{' | ';' | '*' | '%' | '>'
        | '~' | '^' => true,
        c if is_word_char(c) => {
            let start = chars[..=prev]
                .iter()
                .rposition(|&c| !is_word_char(c))
                .map_or(0, |p| p + 1);
            let word: String = chars[start..=prev].iter().collect();
            matches!(
                word.as_str(),
                "return" | "typeof" | "case" | "throw" | "void" | "yield" | "await" | "in"
                    | "of" | "delete" | "else" | "do" | "new"
            )
        }
        _ => false,
    }
}

/// Skip whitespace and comments; returns the next significant position.
pub(super) fn skip_trivia(chars: &[char], mut i: usize) -> usize {
    while i < chars.len() {
        if chars[i].is_whitespace() {
            i += 1;
        } else if let Some(end) = skip_comment(chars, i) {
            i = end;
        } else {
            break;
        }
    }
    i
}

/// Given `open` at `(`, `[` or `{`, return the position just after its
/// matching closer. Strings, comments and template literals are skipped
/// whole. Returns `None` when the source ends first.
pub(super) fn skip_balanced(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = open;

    while i < chars.len() {
        if let Some(skip) = skip_non_code(chars, i) {
            i = skip;
            continue;
        }

        match chars[i] {
            '`' => {
                i = skip_template(chars, i);
                continue;
            }
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
        i += 1;
    }

    None
}

/// Skip a whole template literal, interpolations included.
fn skip_template(chars: &[char], start: usize) -> usize {
    let mut tracker = TemplateTracker::default();
    let mut i = start;
    while i < chars.len() {
        i += match tracker.step(chars, i) {
            Step::Consumed(n) => n,
            Step::Code => 1,
        };
        if !tracker.inside() {
            return i;
        }
    }
    chars.len()
}

/// Where the scanner is inside (possibly nested) template literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    /// Literal text between the backticks.
    Text,
    /// Inside `${ … }`, with the count of `{` still open in it.
    Code(u32),
}

/// Tells template literal text apart from the code in its interpolations.
#[derive(Debug, Default)]
pub(super) struct TemplateTracker {
    frames: Vec<Frame>,
}

pub(super) enum Step {
    /// Template text or delimiters; skip this many characters.
    Consumed(usize),
    /// Ordinary code; the caller scans it.
    Code,
}

impl TemplateTracker {
    pub fn inside(&self) -> bool {
        !self.frames.is_empty()
    }

    pub fn step(&mut self, chars: &[char], i: usize) -> Step {
        let c = chars[i];
        match self.frames.last().copied() {
            None if c == '`' => {
                self.frames.push(Frame::Text);
                Step::Consumed(1)
            }
            None => Step::Code,
            Some(Frame::Text) => match c {
                '\\' => Step::Consumed(2.min(chars.len() - i)),
                '$' if chars.get(i + 1) == Some(&'{') => {
                    self.replace_top(Frame::Code(0));
                    Step::Consumed(2)
                }
                '`' => {
                    self.frames.pop();
                    Step::Consumed(1)
                }
                _ => Step::Consumed(1),
            },
            Some(Frame::Code(open)) => match c {
                '`' => {
                    self.frames.push(Frame::Text);
                    Step::Consumed(1)
                }
                '{' => {
                    self.replace_top(Frame::Code(open + 1));
                    Step::Code
                }
                '}' if open == 0 => {
                    self.replace_top(Frame::Text);
                    Step::Consumed(1)
                }
                '}' => {
                    self.replace_top(Frame::Code(open - 1));
                    Step::Code
                }
                _ => Step::Code,
            },
        }
    }

    fn replace_top(&mut self, frame: Frame) {
        if let Some(top) = self.frames.last_mut() {
            *top = frame;
        }
    }
}

pub(super) fn is_word_start(chars: &[char], i: usize) -> bool {
    if !chars[i].is_alphabetic() && chars[i] != '_' && chars[i] != '$' {
        return false;
    }
    if i > 0 && is_word_char(chars[i - 1]) {
        return false;
    }
    true
}

pub(super) fn scan_word(chars: &[char], start: usize) -> usize {
    let mut i = start;
    while i < chars.len() && is_word_char(chars[i]) {
        i += 1;
    }
    i
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Byte offset of the `char_idx`-th character.
pub(super) fn char_offset_to_byte(chars: &[char], char_idx: usize) -> usize {
    chars[..char_idx].iter().map(|c| c.len_utf8()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn balanced_skips_strings_and_templates() {
        let src = chars(r#"(a, ")", `${ ")" }`, [1]) rest"#);
        let end = skip_balanced(&src, 0).unwrap();
        let tail: String = src[end..].iter().collect();
        assert_eq!(tail, " rest");
    }

    #[test]
    fn balanced_reports_unterminated() {
        assert!(skip_balanced(&chars("(a, (b)"), 0).is_none());
    }

    #[test]
    fn tracker_hands_interpolations_back_as_code() {
        let src = chars("`a${ {b} }c`");
        let mut tracker = TemplateTracker::default();
        let mut code = String::new();
        let mut i = 0;
        while i < src.len() {
            match tracker.step(&src, i) {
                Step::Consumed(n) => i += n,
                Step::Code => {
                    code.push(src[i]);
                    i += 1;
                }
            }
        }
        assert_eq!(code, " {b} ");
        assert!(!tracker.inside());
    }

    #[test]
    fn unterminated_string_runs_to_end() {
        let src = chars("'abc");
        assert_eq!(skip_non_code(&src, 0), Some(4));
        assert_eq!(skip_non_code(&src, 1), None);
    }

    #[test]
    fn regex_after_an_operator_is_skipped() {
        let c = chars("(/[)}]\\//g.test(x))");
        assert_eq!(skip_balanced(&c, 0), Some(c.len()));
        let c = chars("f(x, /(/)");
        assert_eq!(skip_balanced(&c, 1), Some(c.len()));
    }

    #[test]
    fn slash_after_an_operand_is_division() {
        let c = chars("a / b / c");
        assert_eq!(skip_non_code(&c, 2), None);
        let c = chars("i++ / 2");
        assert_eq!(skip_non_code(&c, 4), None);
        let c = chars("return /x/i;");
        assert_eq!(skip_non_code(&c, 7), Some(11));
    }

    #[test]
    fn trivia_skips_comments() {
        let src = chars("  /* x */ // y\n  z");
        assert_eq!(src[skip_trivia(&src, 0)], 'z');
    }
}
