//! Makefile-style dependency files, as emitted by GCC, Clang and compatible
//! compilers.
//!
//! This is not a general Makefile parser. It understands exactly enough of the
//! syntax to split a depfile into targets and prerequisites: whitespace and
//! colon separators, the backslash and dollar escapes that GNU Make honors in
//! file names, Windows drive letters, and the double-quoted file names written
//! by the TASKING compiler.

use depfix_fs::{RelativePathContext, is_absolute_path, make_relative_path};

/// Whitespace as understood by Make (the C locale's `isspace`).
#[inline]
#[must_use]
pub fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0b' | '\x0c' | '\r')
}

/// True if `s` is empty or only contains whitespace.
#[inline]
#[must_use]
pub fn is_blank(s: &str) -> bool {
    s.chars().all(is_space)
}

/// Escape a file name so that [`tokenize`] reads it back unchanged when it
/// appears in a depfile.
#[must_use]
pub fn escape_filename(filename: &str) -> String {
    let mut result = String::with_capacity(filename.len());
    for c in filename.chars() {
        match c {
            '\\' | '#' | ':' | ' ' | '\t' => result.push('\\'),
            '$' => result.push('$'),
            _ => {}
        }
        result.push(c);
    }
    result
}

/// The token currently being scanned.
///
/// Blankness is tracked as characters arrive, so deciding whether a `:` belongs
/// to a drive letter never needs to look at the accumulated text again.
struct Accumulator {
    text: String,
    blank: bool,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            text: String::new(),
            blank: true,
        }
    }

    #[inline]
    fn push(&mut self, c: char) {
        if !is_space(c) {
            self.blank = false;
        }
        self.text.push(c);
    }

    #[inline]
    fn is_blank(&self) -> bool {
        self.blank
    }

    /// A single non-blank character, which a following `:/` or `:\` turns
    /// into a drive letter.
    #[inline]
    fn is_drive_letter(&self) -> bool {
        !self.blank && self.text.len() == 1
    }

    /// Finish the current token. Blank tokens are dropped.
    fn take(&mut self) -> Option<String> {
        let blank = std::mem::replace(&mut self.blank, true);
        let text = std::mem::take(&mut self.text);
        (!blank).then_some(text)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    /// Inside `"..."`. Nothing is special here except the closing quote.
    Quoted,
}

/// Split a depfile into targets and prerequisites, in order of appearance.
///
/// Targets keep their trailing colon (`foo.o:`), which is how callers tell them
/// apart from prerequisites. Escapes are resolved, so the tokens are plain file
/// names. Every input produces some list of tokens; whether it makes sense as
/// a Makefile rule is up to the caller.
///
/// A colon directly after a single character and followed by a slash is taken
/// to be a drive letter, which is the same heuristic GNU Make uses on Windows:
///
/// - `cat:/meow` is `cat:` and `/meow`
/// - `cat:c:/meow` is `cat:` and `c:/meow`
/// - `c:c:/meow` is `c:` and `c:/meow`
/// - `cat:c:` is `cat:` and `c:` (Make itself rejects this one)
#[must_use]
pub fn tokenize(file_content: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut token = Accumulator::new();
    let mut state = State::Normal;
    let mut chars = file_content.chars().peekable();

    let skip_spaces = |chars: &mut std::iter::Peekable<std::str::Chars<'_>>| {
        while chars.next_if(|&c| is_space(c)).is_some() {}
    };

    while let Some(c) = chars.next() {
        if state == State::Quoted {
            if c == '"' {
                state = State::Normal;
            } else {
                token.push(c);
            }
            continue;
        }

        match c {
            ':' if token.is_drive_letter() && matches!(chars.peek(), Some('/' | '\\')) => {
                token.push(c);
            }
            c if is_space(c) || c == ':' => {
                let mut colon = c == ':';
                if !colon {
                    skip_spaces(&mut chars);
                    // `foo.o : bar.c` - the colon still belongs to the target.
                    colon = !token.is_blank() && chars.next_if_eq(&':').is_some();
                }
                if colon && !token.is_blank() {
                    token.push(':');
                    skip_spaces(&mut chars);
                }
                result.extend(token.take());
            }
            '\\' => match chars.peek() {
                Some(&next) if matches!(next, '\\' | '#' | ':' | ' ' | '\t') => {
                    chars.next();
                    token.push(next);
                }
                // Line continuation. The newline itself separates tokens.
                Some('\n') => {}
                _ => token.push(c),
            },
            '$' => {
                chars.next_if_eq(&'$');
                token.push(c);
            }
            '"' => state = State::Quoted,
            _ => token.push(c),
        }
    }

    result.extend(token.take());
    result
}

/// Is this token a target, rather than a prerequisite?
#[inline]
#[must_use]
pub fn is_target(token: &str) -> bool {
    token.ends_with(':')
}

/// The prerequisites among `tokens`, i.e. everything that is not a target.
pub fn prerequisites(tokens: &[String]) -> impl Iterator<Item = &str> {
    tokens
        .iter()
        .map(String::as_str)
        .filter(|token| !is_target(token))
}

/// The files a compilation depended on, according to its depfile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependencies {
    /// Prerequisites in order of appearance, made relative where the context
    /// allows it.
    pub paths: Vec<String>,
    /// Whether any prerequisite was an absolute path before being made
    /// relative. Absolute include paths make a cached result less portable.
    pub has_absolute_paths: bool,
}

impl Dependencies {
    #[must_use]
    pub fn from_depfile(ctx: &RelativePathContext<'_>, file_content: &str) -> Self {
        let tokens = tokenize(file_content);
        let mut deps = Dependencies::default();
        for token in prerequisites(&tokens) {
            deps.has_absolute_paths |= is_absolute_path(token);
            deps.paths.push(make_relative_path(ctx, token).into_owned());
        }
        deps
    }
}
