//! Human-readable rendering of ARM deployment errors.

use crate::manifest::DeploymentErrorDetail;

pub const DETAILS_BANNER: &str =
    "------------------------\nDEPLOYMENT ERROR DETAILS\n------------------------";

/// Render an error tree as `code - message`, with child errors listed under
/// a banner and indented one level per depth.
///
/// Nodes missing a code or message are rendered as their raw JSON.
pub fn render_deployment_error(error: &DeploymentErrorDetail) -> String {
    let (Some(code), Some(message)) = (&error.code, &error.message) else {
        return serde_json::to_string(error).unwrap_or_default();
    };

    let mut rendered = format!("{} - {}", code, message);
    if error.details.is_empty() {
        return rendered;
    }

    rendered.push('\n');
    rendered.push_str(DETAILS_BANNER);
    for child in &error.details {
        rendered.push('\n');
        rendered.push_str(&indent(&render_deployment_error(child)));
    }
    rendered
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("  {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}
