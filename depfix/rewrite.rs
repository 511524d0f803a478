//! Rewriting absolute prerequisite paths in depfiles to relative ones.

use depfix_fs::{RelativePathContext, is_absolute_path, make_relative_path};

use crate::depfile::is_target;

#[inline]
fn is_separator(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Replace absolute prerequisite paths under the base directory with paths
/// relative to the working directory.
///
/// Returns `None` if nothing was rewritten. Otherwise, the returned text is
/// identical to the input except for the replaced paths: whitespace, escapes,
/// comments and line structure are all preserved.
///
/// Only prerequisites are rewritten. Anything before the first target (the
/// first token ending in `:`) is left alone.
///
/// # Panics
///
/// If the base directory in `ctx` is empty. Callers must check
/// [`RelativePathContext::is_enabled`] first.
#[must_use]
pub fn rewrite_source_paths(ctx: &RelativePathContext<'_>, file_content: &str) -> Option<String> {
    assert!(
        ctx.is_enabled(),
        "rewriting depfile paths requires a base directory"
    );

    // Fast path for the common case.
    if memchr::memmem::find(file_content.as_bytes(), ctx.base_dir.as_bytes()).is_none() {
        return None;
    }

    let mut rewriter = Rewriter {
        ctx,
        output: String::with_capacity(file_content.len()),
        seen_target: false,
        rewritten: false,
    };

    for line in file_content.split_inclusive('\n') {
        rewriter.line(line);
    }

    rewriter.rewritten.then_some(rewriter.output)
}

struct Rewriter<'a> {
    ctx: &'a RelativePathContext<'a>,
    output: String,
    /// Set once the first target has been emitted, and never reset: a rule's
    /// prerequisites may continue on the following lines.
    seen_target: bool,
    rewritten: bool,
}

impl Rewriter<'_> {
    fn line(&mut self, line: &str) {
        let (body, delimiter) = split_line_ending(line);

        let mut rest = body;
        while !rest.is_empty() {
            let word = rest.trim_start_matches(is_separator);
            self.output.push_str(&rest[..rest.len() - word.len()]);
            if word.is_empty() {
                break;
            }

            let word_len = word.find(is_separator).unwrap_or(word.len());
            let (token, tail) = word.split_at(word_len);
            self.token(token);
            rest = tail;
        }

        self.output.push_str(delimiter);
    }

    fn token(&mut self, token: &str) {
        if self.seen_target && is_absolute_path(token) {
            let new_path = make_relative_path(self.ctx, token);
            if new_path != token {
                tracing::trace!("rewrote depfile path: {token} -> {new_path}");
                self.output.push_str(&new_path);
                self.rewritten = true;
            } else {
                self.output.push_str(token);
            }
        } else {
            self.output.push_str(token);
        }

        if is_target(token) {
            self.seen_target = true;
        }
    }
}

/// Split the line terminator (`\n` or `\r\n`) off a line.
fn split_line_ending(line: &str) -> (&str, &str) {
    let body = line
        .strip_suffix("\r\n")
        .or_else(|| line.strip_suffix('\n'))
        .unwrap_or(line);
    line.split_at(body.len())
}

#[cfg(test)]
mod tests {
    use depfix_fs::Absolute;

    use super::*;

    const PROJ: &str = "/home/u/proj";

    fn rewrite(cwd: &str, file_content: &str) -> Option<String> {
        let cwd = Absolute::try_new_ref(cwd).unwrap();
        rewrite_source_paths(&RelativePathContext::new(PROJ, cwd), file_content)
    }

    #[test]
    fn simple() {
        assert_eq!(
            rewrite(
                PROJ,
                "out.o: /home/u/proj/src/a.c /usr/include/stdio.h"
            )
            .as_deref(),
            Some("out.o: src/a.c /usr/include/stdio.h")
        );
    }

    #[test]
    fn relative_to_cwd() {
        assert_eq!(
            rewrite(
                "/home/u/proj/build",
                "out.o: /home/u/proj/src/a.c /home/u/proj/build/config.h\n"
            )
            .as_deref(),
            Some("out.o: ../src/a.c config.h\n")
        );
    }

    #[test]
    fn base_dir_not_present() {
        assert_eq!(rewrite(PROJ, "out.o: /usr/include/stdio.h\n"), None);
        assert_eq!(rewrite(PROJ, ""), None);
    }

    #[test]
    fn nothing_to_rewrite() {
        // The base dir occurs, but only in the target.
        assert_eq!(rewrite(PROJ, "/home/u/proj/out.o: src/a.c\n"), None);
        // Outside the base dir, even though it shares a prefix.
        assert_eq!(rewrite(PROJ, "out.o: /home/u/project/a.c\n"), None);
    }

    #[test]
    fn only_after_first_target() {
        assert_eq!(
            rewrite(
                PROJ,
                "/home/u/proj/a.h /home/u/proj/out.o: /home/u/proj/a.h\n"
            )
            .as_deref(),
            Some("/home/u/proj/a.h /home/u/proj/out.o: a.h\n")
        );
    }

    #[test]
    fn continuation_lines() {
        let depfile = "out.o: \\\n  /home/u/proj/src/a.c \\\n\t/home/u/proj/include/a.h \\\n  /usr/include/stdio.h\n\n/home/u/proj/include/a.h:\n";
        let expected = "out.o: \\\n  src/a.c \\\n\tinclude/a.h \\\n  /usr/include/stdio.h\n\ninclude/a.h:\n";
        assert_eq!(rewrite(PROJ, depfile).as_deref(), Some(expected));
    }

    #[test]
    fn preserves_whitespace() {
        assert_eq!(
            rewrite(PROJ, "out.o:\t /home/u/proj/a.c   b.c  \r\n").as_deref(),
            Some("out.o:\t a.c   b.c  \r\n")
        );
    }

    #[test]
    fn target_at_end_of_line() {
        assert_eq!(
            rewrite(PROJ, "out.o:\n /home/u/proj/a.c\n").as_deref(),
            Some("out.o:\n a.c\n")
        );
    }

    #[test]
    fn idempotent() {
        let depfile = "out.o: /home/u/proj/src/a.c /home/u/proj/b.h \\\n /usr/include/stdio.h\n";
        let once = rewrite(PROJ, depfile).unwrap();
        assert_eq!(rewrite(PROJ, &once), None);
    }

    #[test]
    #[should_panic(expected = "requires a base directory")]
    fn empty_base_dir() {
        let cwd = Absolute::try_new_ref("/").unwrap();
        let _ = rewrite_source_paths(&RelativePathContext::new("", cwd), "out.o: /a.c");
    }
}
