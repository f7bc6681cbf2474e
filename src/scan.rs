use crate::filter::ExpressionNode;
use crate::output::RecordFormatter;
use crate::parser::parse_combined_entry;
use std::io::{self, BufRead, Write};

/// Counters for one pass over an input
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    pub lines: usize,
    pub matched: usize,
    pub rejected: usize,
}

/// Streams `input` line by line, writing every matching record to `out`.
///
/// Lines that are not in combined format are logged with their line number,
/// copied byte for byte to `bad_lines` when given, and skipped. Whole-line
/// output is also written byte for byte. Without a `matcher` every
/// parseable line matches. Only I/O failures stop the scan.
pub fn scan_lines<R, W>(
    mut input: R,
    out: &mut W,
    mut bad_lines: Option<&mut dyn Write>,
    matcher: Option<&ExpressionNode>,
    formatter: &RecordFormatter<'_>,
) -> io::Result<ScanSummary>
where
    R: BufRead,
    W: Write + ?Sized,
{
    let mut summary = ScanSummary::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        summary.lines += 1;

        let end = buf
            .iter()
            .rposition(|b| !matches!(b, b'\n' | b'\r'))
            .map_or(0, |i| i + 1);
        let raw = &buf[..end];
        let text = String::from_utf8_lossy(raw);
        let line = text.as_ref();

        let entry = match parse_combined_entry(line) {
            Ok(entry) => entry,
            Err(e) => {
                summary.rejected += 1;
                log::warn!("line {}: {}", summary.lines, e);
                if let Some(bad) = bad_lines.as_deref_mut() {
                    bad.write_all(raw)?;
                    bad.write_all(b"\n")?;
                }
                continue;
            }
        };

        if matcher.is_none_or(|tree| tree.matches(&entry.record)) {
            summary.matched += 1;
            if formatter.whole_line() {
                out.write_all(raw)?;
                out.write_all(b"\n")?;
            } else {
                writeln!(out, "{}", formatter.format(&entry))?;
            }
        }
    }

    log::debug!(
        "scanned {} lines: {} matched, {} rejected",
        summary.lines,
        summary.matched,
        summary.rejected
    );
    Ok(summary)
}
