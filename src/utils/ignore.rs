use regex::Regex;
use std::path::Path;

pub const IGNORE_FILE: &str = ".sprigignore";

/// Patterns from `.sprigignore`, applied only when listing untracked files.
pub struct IgnoreRules {
    patterns: Vec<IgnorePattern>,
}

struct IgnorePattern {
    pattern: Regex,
    negated: bool,
    directory_only: bool,
    anchored: bool,
}

impl IgnoreRules {
    pub fn new<P: AsRef<Path>>(repo_path: P) -> Self {
        let ignore_path = repo_path.as_ref().join(IGNORE_FILE);
        let content = std::fs::read_to_string(ignore_path).unwrap_or_default();
        Self::from_lines(&content)
    }

    pub fn from_lines(content: &str) -> Self {
        let patterns = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(Self::parse_pattern)
            .collect();

        Self { patterns }
    }

    fn parse_pattern(pattern_str: &str) -> Option<IgnorePattern> {
        let mut pattern = pattern_str;
        let mut negated = false;
        let mut directory_only = false;

        if let Some(rest) = pattern.strip_prefix('!') {
            negated = true;
            pattern = rest;
        }

        if let Some(rest) = pattern.strip_suffix('/') {
            directory_only = true;
            pattern = rest;
        }

        let anchored = pattern.contains('/');
        let pattern = pattern.trim_start_matches('/');
        if pattern.is_empty() {
            return None;
        }

        Regex::new(&Self::glob_to_regex(pattern)).ok().map(|regex| IgnorePattern {
            pattern: regex,
            negated,
            directory_only,
            anchored,
        })
    }

    /// `**` crosses directories, `*` and `?` stay inside one path segment,
    /// `[!...]` is a negated class. Everything else matches literally.
    fn glob_to_regex(glob: &str) -> String {
        let mut out = String::from("^");
        let mut chars = glob.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '*' if chars.peek() == Some(&'*') => {
                    chars.next();
                    out.push_str(".*");
                }
                '*' => out.push_str("[^/]*"),
                '?' => out.push_str("[^/]"),
                '[' => {
                    let class: String = chars.by_ref().take_while(|&ch| ch != ']').collect();
                    let class = match class.strip_prefix('!') {
                        Some(rest) => format!("^{}", rest),
                        None => class,
                    };
                    out.push('[');
                    out.push_str(&class);
                    out.push(']');
                }
                c => out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
            }
        }

        out.push('$');
        out
    }

    /// `path` is relative to the working-tree root with `/` separators.
    pub fn is_ignored(&self, path: &str, is_dir: bool) -> bool {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        let mut ignored = false;

        for pattern in &self.patterns {
            if pattern.directory_only && !is_dir {
                continue;
            }

            let subject = if pattern.anchored { path } else { file_name };
            if pattern.pattern.is_match(subject) {
                ignored = !pattern.negated;
            }
        }

        ignored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basename_patterns_match_anywhere() {
        let rules = IgnoreRules::from_lines("*.log\n# comment\n\nbuild/\n");
        assert!(rules.is_ignored("debug.log", false));
        assert!(rules.is_ignored("nested/dir/trace.log", false));
        assert!(!rules.is_ignored("notes.txt", false));
        assert!(rules.is_ignored("build", true));
        assert!(!rules.is_ignored("build", false));
    }

    #[test]
    fn anchored_patterns_and_negation() {
        let rules = IgnoreRules::from_lines("docs/*.md\n*.tmp\n!keep.tmp\n");
        assert!(rules.is_ignored("docs/readme.md", false));
        assert!(!rules.is_ignored("readme.md", false));
        assert!(rules.is_ignored("scratch.tmp", false));
        assert!(!rules.is_ignored("keep.tmp", false));
    }

    #[test]
    fn classes_and_literal_dots() {
        let rules = IgnoreRules::from_lines("file[0-9].txt\nlog[!a].txt\nout/**/*.o\n");
        assert!(rules.is_ignored("file3.txt", false));
        assert!(!rules.is_ignored("fileX.txt", false));
        assert!(!rules.is_ignored("file3Xtxt", false));
        assert!(rules.is_ignored("logb.txt", false));
        assert!(!rules.is_ignored("loga.txt", false));
        assert!(rules.is_ignored("out/deep/er/main.o", false));
    }
}
