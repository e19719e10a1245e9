//! Static name-resolution fallback for the dashboard alias

pub const LOOPBACK: &str = "127.0.0.1";

/// Whether a hosts-file line maps `ip` to `hostname`.
///
/// Comments and blank lines never match; host names compare
/// case-insensitively.
pub fn line_maps(line: &str, ip: &str, hostname: &str) -> bool {
    let trimmed = line.split('#').next().unwrap_or_default().trim();
    if trimmed.is_empty() {
        return false;
    }

    let mut parts = trimmed.split_whitespace();
    parts.next() == Some(ip) && parts.any(|h| h.eq_ignore_ascii_case(hostname))
}

pub fn has_entry(content: &str, ip: &str, hostname: &str) -> bool {
    content.lines().any(|line| line_maps(line, ip, hostname))
}

/// Text to append so `content` gains the mapping, preserving a trailing newline.
pub fn entry_suffix(content: &str, ip: &str, hostname: &str) -> String {
    let mut suffix = String::new();
    if !content.is_empty() && !content.ends_with('\n') {
        suffix.push('\n');
    }
    suffix.push_str(&format!("{ip}\t{hostname}\n"));
    suffix
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOSTS: &str = "127.0.0.1\tlocalhost\n\
                         ::1\t\tlocalhost ip6-localhost\n\
                         # 127.0.0.1 creaturebox.local\n";

    #[test]
    fn ignores_commented_entries() {
        assert!(!has_entry(HOSTS, LOOPBACK, "creaturebox.local"));
        assert!(has_entry(HOSTS, LOOPBACK, "LOCALHOST"));
    }

    #[test]
    fn matches_aliases_after_the_first_name() {
        let content = "127.0.0.1 localhost creaturebox.local # added by hand\n";
        assert!(has_entry(content, LOOPBACK, "creaturebox.local"));
        assert!(!has_entry(content, "127.0.1.1", "creaturebox.local"));
    }

    #[test]
    fn suffix_terminates_an_unterminated_file() {
        assert_eq!(
            entry_suffix("127.0.0.1 localhost", LOOPBACK, "creaturebox.local"),
            "\n127.0.0.1\tcreaturebox.local\n"
        );
        assert_eq!(
            entry_suffix("", LOOPBACK, "creaturebox.local"),
            "127.0.0.1\tcreaturebox.local\n"
        );
    }
}
