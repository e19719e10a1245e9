//! Historical installation roots that payload files may still reference

/// Roots used by earlier CreatureBox and Mothbox images.
pub const DEFAULT_LEGACY_ROOTS: [&str; 5] = [
    "/home/pi/Desktop/Mothbox",
    "/home/pi/Mothbox",
    "/home/pi/Desktop/CreatureBox",
    "/home/pi/CreatureBox",
    "/home/pi/Desktop/creaturebox",
];

/// One literal replacement applied to payload text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRewrite {
    pub from: String,
    pub to: String,
}

/// Ordered, duplicate-free set of legacy installation roots.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LegacyPathTable {
    roots: Vec<String>,
}

impl LegacyPathTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        table.extend(DEFAULT_LEGACY_ROOTS);
        table
    }

    /// Add a root. Trailing slashes are dropped; blanks and duplicates are ignored.
    pub fn insert(&mut self, root: impl AsRef<str>) -> bool {
        let root = root.as_ref().trim().trim_end_matches('/');
        if root.is_empty() || self.roots.iter().any(|r| r == root) {
            return false;
        }
        self.roots.push(root.to_string());
        true
    }

    pub fn extend<I, S>(&mut self, roots: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for root in roots {
            self.insert(root);
        }
    }

    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Rewrites that move every legacy root onto `target`.
    ///
    /// A root that is `target` itself or one of its ancestors is dropped:
    /// rewriting it would match the already-migrated path again on the next
    /// run. The remaining rewrites are ordered longest-first so overlapping
    /// roots resolve the same way regardless of insertion order.
    pub fn rewrites_to(&self, target: &str) -> Vec<PathRewrite> {
        let target = target.trim_end_matches('/');
        let mut rewrites: Vec<PathRewrite> = self
            .roots
            .iter()
            .filter(|root| !is_path_prefix(root, target))
            .map(|root| PathRewrite {
                from: root.clone(),
                to: target.to_string(),
            })
            .collect();
        rewrites.sort_by(|a, b| b.from.len().cmp(&a.from.len()));
        rewrites
    }
}

fn is_path_prefix(root: &str, path: &str) -> bool {
    path.strip_prefix(root)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Characters that continue a path component.
fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_' | '.')
}

/// Replace whole-path occurrences of `rewrite.from`.
///
/// `/home/pi/CreatureBox` matches in `/home/pi/CreatureBox/photos` and
/// `'/home/pi/CreatureBox'`, but not in `/home/pi/CreatureBox-v2` or
/// `/srv/home/pi/CreatureBox`.
fn replace_root(text: &str, rewrite: &PathRewrite) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (start, _) in text.match_indices(rewrite.from.as_str()) {
        let end = start + rewrite.from.len();
        let opens = text[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !is_name_char(c));
        let closes = text[end..]
            .chars()
            .next()
            .is_none_or(|c| !is_name_char(c));
        if opens && closes {
            out.push_str(&text[last..start]);
            out.push_str(&rewrite.to);
            last = end;
        }
    }
    if last == 0 {
        return None;
    }
    out.push_str(&text[last..]);
    Some(out)
}

/// Apply `rewrites` to `content`; `None` when nothing matched.
pub fn rewrite_content(content: &str, rewrites: &[PathRewrite]) -> Option<String> {
    let mut out: Option<String> = None;
    for rewrite in rewrites {
        let current = out.as_deref().unwrap_or(content);
        if let Some(next) = replace_root(current, rewrite) {
            out = Some(next);
        }
    }
    out.filter(|updated| updated != content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn insert_rejects_duplicates_and_normalizes_slashes() {
        let mut table = LegacyPathTable::new();
        assert!(table.insert("/home/pi/Mothbox/"));
        assert!(!table.insert("/home/pi/Mothbox"));
        assert!(!table.insert("   "));
        assert_eq!(table.roots(), ["/home/pi/Mothbox".to_string()]);
    }

    #[test]
    fn rewrites_every_legacy_root() {
        let table = LegacyPathTable::with_defaults();
        let rewrites = table.rewrites_to("/opt/example");
        let script = "PHOTOS = '/home/pi/Desktop/Mothbox/photos'\n\
                      CFG = '/home/pi/CreatureBox/controls.txt'\n";

        let migrated = rewrite_content(script, &rewrites).unwrap();
        assert_eq!(
            migrated,
            "PHOTOS = '/opt/example/photos'\nCFG = '/opt/example/controls.txt'\n"
        );
        assert_eq!(rewrite_content(&migrated, &rewrites), None);
    }

    #[test]
    fn ancestors_of_the_target_are_not_rewritten() {
        let table = LegacyPathTable::with_defaults();
        let rewrites = table.rewrites_to("/home/pi/CreatureBox/v2");
        assert!(rewrites.iter().all(|r| r.from != "/home/pi/CreatureBox"));

        let script = "ROOT = '/home/pi/CreatureBox/v2/photos'";
        assert_eq!(rewrite_content(script, &rewrites), None);
    }

    #[test]
    fn sibling_target_still_migrates_the_legacy_root() {
        let rewrites = LegacyPathTable::with_defaults().rewrites_to("/home/pi/CreatureBox-v2");

        let migrated = rewrite_content("PHOTOS = '/home/pi/CreatureBox/photos'\n", &rewrites);
        assert_eq!(
            migrated.as_deref(),
            Some("PHOTOS = '/home/pi/CreatureBox-v2/photos'\n")
        );
        assert_eq!(rewrite_content(&migrated.unwrap(), &rewrites), None);
    }

    #[test]
    fn only_whole_paths_match() {
        let rewrites = LegacyPathTable::with_defaults().rewrites_to("/opt/example");

        let lookalikes = "/home/pi/Mothbox2/x /srv/home/pi/Mothbox/x";
        assert_eq!(rewrite_content(lookalikes, &rewrites), None);
        let quoted = "backup,/home/pi/Mothbox\ncd \"/home/pi/Mothbox\"";
        assert_eq!(
            rewrite_content(quoted, &rewrites).as_deref(),
            Some("backup,/opt/example\ncd \"/opt/example\"")
        );
    }

    #[test]
    fn overlapping_roots_apply_longest_first() {
        let mut forward = LegacyPathTable::new();
        forward.extend(["/srv/box", "/srv/box/legacy"]);
        let mut reverse = LegacyPathTable::new();
        reverse.extend(["/srv/box/legacy", "/srv/box"]);

        let text = "a=/srv/box/legacy/x b=/srv/box/y";
        let a = rewrite_content(text, &forward.rewrites_to("/opt/cb"));
        let b = rewrite_content(text, &reverse.rewrites_to("/opt/cb"));
        assert_eq!(a, b);
        assert_eq!(a.as_deref(), Some("a=/opt/cb/x b=/opt/cb/y"));
    }
}
