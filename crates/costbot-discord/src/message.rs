//! Message length handling

/// Maximum characters Discord accepts in a message's content
pub const MESSAGE_LIMIT: usize = 2000;

fn trailer(hidden: usize) -> String {
    format!("… ({hidden} more lines)")
}

/// Cut `content` at the last whole line that fits in `limit` characters
///
/// Content that already fits is returned unchanged. Otherwise the dropped
/// lines are summarized in a trailing `… (N more lines)` line.
pub fn fit_message(content: &str, limit: usize) -> String {
    if content.chars().count() <= limit {
        return content.to_string();
    }

    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    let reserve = trailer(lines.len()).chars().count() + 1;

    let mut used = 0;
    let mut kept = 0;
    for line in &lines {
        let len = line.chars().count();
        if used + len + reserve > limit {
            break;
        }
        used += len;
        kept += 1;
    }

    let mut out = lines[..kept].concat();
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&trailer(lines.len() - kept));
    out
}
