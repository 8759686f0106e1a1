use colored::Colorize;
use nexus::EndpointSpec;
use serde::Serialize;
use similar::ChangeTag;

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print a value as pretty JSON on stdout
pub fn json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ============================================================================
// Spec Diff
// ============================================================================

fn spec_text(spec: Option<&EndpointSpec>) -> String {
    spec.and_then(|s| serde_json::to_string_pretty(s).ok())
        .map(|mut text| {
            text.push('\n');
            text
        })
        .unwrap_or_default()
}

/// Line diff of two specs rendered as JSON.
///
/// Each line starts with `-`, `+` or a space.
pub fn spec_diff(before: Option<&EndpointSpec>, after: Option<&EndpointSpec>) -> Vec<String> {
    let old = spec_text(before);
    let new = spec_text(after);
    let diff = similar::TextDiff::from_lines(&old, &new);

    diff.iter_all_changes()
        .map(|change| {
            let sign = match change.tag() {
                ChangeTag::Delete => '-',
                ChangeTag::Insert => '+',
                ChangeTag::Equal => ' ',
            };
            format!("{sign} {}", change.value().trim_end_matches('\n'))
        })
        .collect()
}

/// Print a colored spec diff
pub fn print_spec_diff(before: Option<&EndpointSpec>, after: Option<&EndpointSpec>) {
    for line in spec_diff(before, after) {
        if line.starts_with('-') {
            println!("    {}", line.red());
        } else if line.starts_with('+') {
            println!("    {}", line.green());
        } else {
            println!("    {}", line.dimmed());
        }
    }
}
