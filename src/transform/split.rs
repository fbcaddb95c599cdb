//! Compound-statement splitting.
//!
//! Rewrites every logical line holding two or more statements into a run of
//! single-statement logical lines, preserving every character of original
//! text at the fragment level. The separator (`;`) between two statements
//! is absorbed at the split boundary.
//!
//! The pass is a worklist over a line index: splitting inserts a copy of
//! the line (trimmed to the first statement) before the original, trims the
//! original to the remainder, and re-inspects the remainder without
//! advancing. A line that has shrunk to exactly one statement becomes
//! pending cleanup; once the pass reaches a further line with fewer than
//! two statements (or the end of the buffer), separator text trailing the
//! pending line's single statement is dropped.

use crate::parser::lines::LineBuffer;

/// Deferred-cleanup state threaded through the worklist loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cleanup {
    Clean,
    /// A split left this line with exactly one statement; its trailing
    /// separator text still needs trimming.
    Pending(usize),
}

/// Split every compound logical line in the buffer. Returns whether any
/// change occurred.
pub fn split_compound_statements(buffer: &mut LineBuffer) -> bool {
    let mut changed = false;
    let mut cleanup = Cleanup::Clean;
    let mut i = 0;

    while i < buffer.len() {
        let stmt_count = buffer.line(i).statement_count();

        if stmt_count >= 2 {
            split_first_statement(buffer, i, &mut cleanup, &mut changed);
            // Re-inspect the shrunk remainder (now at i + 1) in this pass
            i += 1;
            continue;
        }

        // Fewer than two statements: any pending line is now final
        cleanup = flush_cleanup(buffer, cleanup, i, &mut changed);

        if stmt_count == 0 && buffer.line_mut(i).remove_empty_statement_markers() {
            // Empty-statement markers on a statement-less line are dropped
            changed = true;
        }
        i += 1;
    }

    flush_at_end(buffer, &mut cleanup, &mut changed);
    changed
}

/// Insert a copy of line `i` trimmed to its first statement, and trim the
/// original to the remainder.
fn split_first_statement(
    buffer: &mut LineBuffer,
    i: usize,
    cleanup: &mut Cleanup,
    changed: &mut bool,
) {
    let line = buffer.line(i);
    let first = line.spans()[0];
    let second_start = line.spans()[1].start;

    // Copy-on-split: the copy owns its own fragment vector; nothing is
    // aliased between the two lines.
    let mut head = line.clone();
    head.erase_fragments(first.end..head.fragments().len());
    head.erase_fragments(0..first.start);

    let tail = buffer.line_mut(i);
    tail.erase_fragments(0..second_start);

    if tail.statement_count() == 1 {
        // Residual separator text on the remainder is trimmed once the
        // pass reaches the next non-compound line
        let pending = *cleanup;
        *cleanup = Cleanup::Pending(i + 1);
        // A still-unflushed earlier pending line is finalized now
        if let Cleanup::Pending(prev) = pending {
            if buffer.line_mut(prev).trim_trailing_separators() {
                *changed = true;
            }
        }
    }

    buffer.insert(i, head);
    *changed = true;
}

/// Trim the pending line's trailing separators, unless the pending line is
/// the one currently being visited (its own visit does not finalize it).
fn flush_cleanup(
    buffer: &mut LineBuffer,
    cleanup: Cleanup,
    current: usize,
    changed: &mut bool,
) -> Cleanup {
    match cleanup {
        Cleanup::Pending(idx) if idx != current => {
            if buffer.line_mut(idx).trim_trailing_separators() {
                *changed = true;
            }
            Cleanup::Clean
        }
        other => other,
    }
}

/// Flush any cleanup still pending at end-of-sequence.
fn flush_at_end(buffer: &mut LineBuffer, cleanup: &mut Cleanup, changed: &mut bool) {
    if let Cleanup::Pending(idx) = *cleanup {
        if buffer.line_mut(idx).trim_trailing_separators() {
            *changed = true;
        }
        *cleanup = Cleanup::Clean;
    }
}
