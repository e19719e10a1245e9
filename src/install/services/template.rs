//! `{{placeholder}}` substitution for compiled-in templates

use std::collections::BTreeMap;

/// Render `template`, replacing every `{{name}}` with its value.
///
/// Fails on an unknown or unterminated placeholder so a half-rendered file
/// never reaches the host.
pub fn render(template: &str, values: &BTreeMap<&'static str, String>) -> Result<String, String> {
    let mut out = String::with_capacity(template.len() + 256);
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find("}}")
            .ok_or_else(|| "unterminated placeholder".to_string())?;
        let key = after[..end].trim();
        let value = values
            .get(key)
            .ok_or_else(|| format!("unresolved placeholder {{{{{key}}}}}"))?;
        out.push_str(value);
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Quote a path for a systemd command line when it contains whitespace.
pub fn systemd_quote(value: &str) -> String {
    if value.chars().any(char::is_whitespace) {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        value.to_string()
    }
}
