/// Tidy the blank lines left behind by comment removal.
///
/// - Runs of blank (whitespace-only) lines between two non-blank lines are
///   capped at two, emitted as empty lines.
/// - Blank lines at the start or end of the text are dropped.
/// - Non-blank lines are kept verbatim.
///
/// Lines are split on `\n` and rejoined with `\n`; the result never ends
/// with a newline.
pub fn normalize(content: &str) -> String {
    let lines: Vec<&str> = content.split('\n').collect();
    let mut out: Vec<&str> = Vec::with_capacity(lines.len());

    let mut i = 0;
    while i < lines.len() {
        if !is_blank(lines[i]) {
            out.push(lines[i]);
            i += 1;
            continue;
        }

        let run_start = i;
        while i < lines.len() && is_blank(lines[i]) {
            i += 1;
        }

        // Leading or trailing run.
        if out.is_empty() || i == lines.len() {
            continue;
        }

        let keep = (i - run_start).min(2);
        out.extend(std::iter::repeat_n("", keep));
    }

    out.join("\n")
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}
