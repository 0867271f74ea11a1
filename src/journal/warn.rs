fn sanitize_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_sep = false;
    for ch in value.chars() {
        if ch.is_whitespace() {
            if !out.is_empty() && !prev_sep {
                out.push('_');
                prev_sep = true;
            }
        } else if !ch.is_control() {
            out.push(ch);
            prev_sep = false;
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "na".to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn format_line(code: &str, stage: &str, source: &str, subject: &str, err: &str) -> String {
    format!(
        "journal_warn code={} stage={} source={} subject={} err={}",
        sanitize_value(code),
        sanitize_value(stage),
        sanitize_value(source),
        sanitize_value(subject),
        sanitize_value(err),
    )
}

/// Logs a degraded-but-recovered condition as one greppable key=value line.
pub fn emit(code: &str, stage: &str, source: &str, subject: &str, err: &str) {
    log::warn!("{}", format_line(code, stage, source, subject, err));
}
