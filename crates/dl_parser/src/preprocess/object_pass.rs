//! Object member decorator pass.
//!
//! Finds runs of decorators written in front of object literal members and
//! replaces each run with a marker property holding the decorator
//! expressions, in order:
//!
//! `{ @a @b(1) key: v }` → `{ __legacy_decorators__: [a, b(1)], key: v }`
//!
//! Decorators inside class bodies, in parameter lists, or in front of a
//! class statement are left for the SWC parser.

use dl_ast::OBJECT_DECORATORS_MARKER;

use super::util::{
    char_offset_to_byte, is_word_start, scan_word, skip_balanced, skip_non_code, skip_trivia,
    Step, TemplateTracker,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Paren,
    Bracket,
    /// A brace that is not a class body: object literal, block, or type literal.
    Brace,
    ClassBody,
}

/// A `class` keyword whose body has not been reached yet.
#[derive(Debug, Clone, Copy)]
struct ClassHeader {
    /// Stack depth of the keyword; the body opens at this depth.
    depth: usize,
    /// Open `<` of type parameters or type arguments in the header.
    angles: usize,
}

impl ClassHeader {
    fn awaits_body(&self, depth: usize) -> bool {
        self.depth == depth && self.angles == 0
    }
}

#[derive(Debug, Clone)]
struct Replacement {
    /// Byte range of the decorator run in the original source.
    start: usize,
    end: usize,
    text: String,
}

/// Rewrite all object member decorators in the source.
pub fn rewrite_object_decorators(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();

    let replacements = find_object_decorators(&chars);
    if replacements.is_empty() {
        return source.to_string();
    }

    let mut result = source.to_string();
    for r in replacements.iter().rev() {
        result.replace_range(r.start..r.end, &r.text);
    }
    result
}

fn find_object_decorators(chars: &[char]) -> Vec<Replacement> {
    let mut replacements = Vec::new();
    let mut stack: Vec<Container> = Vec::new();
    let mut pending_class: Option<ClassHeader> = None;
    let mut templates = TemplateTracker::default();
    let mut i = 0;

    while i < chars.len() {
        match templates.step(chars, i) {
            Step::Consumed(n) => {
                i += n;
                continue;
            }
            Step::Code => {}
        }

        if let Some(skip) = skip_non_code(chars, i) {
            i = skip;
            continue;
        }

        if is_word_start(chars, i) {
            let end = scan_word(chars, i);
            if is_class_keyword(chars, i, end) {
                pending_class = Some(ClassHeader {
                    depth: stack.len(),
                    angles: 0,
                });
            }
            i = end;
            continue;
        }

        match chars[i] {
            '(' => stack.push(Container::Paren),
            '[' => stack.push(Container::Bracket),
            '{' => {
                if pending_class.is_some_and(|h| h.awaits_body(stack.len())) {
                    pending_class = None;
                    stack.push(Container::ClassBody);
                } else {
                    stack.push(Container::Brace);
                }
            }
            ')' | ']' | '}' => {
                stack.pop();
            }
            '<' => {
                if let Some(header) = pending_class.as_mut().filter(|h| h.depth == stack.len()) {
                    header.angles += 1;
                }
            }
            // `=>` inside a function type does not close an angle.
            '>' if i == 0 || chars[i - 1] != '=' => {
                if let Some(header) = pending_class.as_mut().filter(|h| h.depth == stack.len()) {
                    header.angles = header.angles.saturating_sub(1);
                }
            }
            ';' if pending_class.is_some_and(|h| h.awaits_body(stack.len())) => {
                pending_class = None;
            }
            '@' if stack.last() == Some(&Container::Brace) && at_member_start(chars, i) => {
                if let Some((end, exprs)) = scan_decorator_run(chars, i) {
                    if !decorates_class_statement(chars, end) {
                        replacements.push(Replacement {
                            start: char_offset_to_byte(chars, i),
                            end: char_offset_to_byte(chars, end),
                            text: format!("{OBJECT_DECORATORS_MARKER}: [{}],", exprs.join(", ")),
                        });
                    }
                    i = end;
                    continue;
                }
            }
            _ => {}
        }

        i += 1;
    }

    replacements
}

/// `class` used as a keyword rather than as a property name (`o.class`,
/// `{ class: 1 }`, `class() {}`).
fn is_class_keyword(chars: &[char], start: usize, end: usize) -> bool {
    let word: String = chars[start..end].iter().collect();
    if word != "class" {
        return false;
    }

    let prev = chars[..start].iter().rev().find(|c| !c.is_whitespace());
    if prev == Some(&'.') {
        return false;
    }

    let next = skip_trivia(chars, end);
    !matches!(chars.get(next), Some(':' | '(' | ',' | '}' | '=' | '?'))
}

/// A member starts right after the opening brace or a separating comma.
fn at_member_start(chars: &[char], at: usize) -> bool {
    let prev = chars[..at].iter().rev().find(|c| !c.is_whitespace());
    matches!(prev, Some('{' | ','))
}

/// Scan `@d1 @d2 …` starting at the first `@`. Returns the position after
/// the last decorator and each decorator's expression text.
fn scan_decorator_run(chars: &[char], start: usize) -> Option<(usize, Vec<String>)> {
    let mut exprs = Vec::new();
    let mut end = start;
    let mut i = start;

    loop {
        let at = skip_trivia(chars, i);
        if chars.get(at) != Some(&'@') {
            break;
        }
        let (expr_end, text) = scan_decorator_expr(chars, at + 1)?;
        exprs.push(rewrite_nested(&text));
        end = expr_end;
        i = expr_end;
    }

    if exprs.is_empty() {
        None
    } else {
        Some((end, exprs))
    }
}

/// Scan one decorator expression: `(expr)` or `name(.name | (args))*`.
fn scan_decorator_expr(chars: &[char], start: usize) -> Option<(usize, String)> {
    if start >= chars.len() {
        return None;
    }

    let end = if chars[start] == '(' {
        skip_balanced(chars, start)?
    } else {
        if !is_word_start(chars, start) {
            return None;
        }
        let mut i = scan_word(chars, start);
        loop {
            match chars.get(i) {
                Some('.') if chars.get(i + 1).is_some_and(|_| is_word_start(chars, i + 1)) => {
                    i = scan_word(chars, i + 1);
                }
                Some('(') => i = skip_balanced(chars, i)?,
                _ => break,
            }
        }
        i
    };

    Some((end, chars[start..end].iter().collect()))
}

/// Decorator arguments may themselves contain decorated object literals.
fn rewrite_nested(text: &str) -> String {
    if text.contains('@') {
        rewrite_object_decorators(text)
    } else {
        text.to_string()
    }
}

fn decorates_class_statement(chars: &[char], end: usize) -> bool {
    let next = skip_trivia(chars, end);
    if next >= chars.len() || !is_word_start(chars, next) {
        return false;
    }
    let word: String = chars[next..scan_word(chars, next)].iter().collect();
    matches!(word.as_str(), "class" | "export" | "abstract" | "declare")
}
