// Sensitive-indicator keywords shared by the path prober and the crawler

use crate::error::{Result, ScanError};
use regex::{Regex, RegexBuilder};
use std::fs;
use std::path::Path;
use url::Url;

/// Tokens probed as paths and searched for in page bodies.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "admin",
    "login",
    "password",
    "admin_panel",
    "dashboard",
    "control_panel",
    "members",
    "secure",
    "account",
    "auth",
    "manager",
    "confidential",
    "restricted",
    "private",
    "secret",
    "backup",
    "config",
];

/// Fixed set of keyword tokens plus the single case-insensitive pattern
/// that matches when any of them occurs in a text.
#[derive(Debug, Clone)]
pub struct KeywordSet {
    tokens: Vec<String>,
    pattern: Regex,
}

impl KeywordSet {
    pub fn new<I, S>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();

        if tokens.is_empty() {
            return Err(ScanError::InvalidKeyword(
                "keyword list is empty".to_string(),
            ));
        }

        // Each token has to stand on its own, otherwise "(a" and "b)" would
        // silently combine into one group once joined.
        for token in &tokens {
            if token.is_empty() {
                return Err(ScanError::InvalidKeyword(
                    "keyword list contains an empty entry".to_string(),
                ));
            }
            Regex::new(token)
                .map_err(|e| ScanError::InvalidKeyword(format!("'{}': {}", token, e)))?;
        }

        let pattern = RegexBuilder::new(&tokens.join("|"))
            .case_insensitive(true)
            .build()
            .map_err(|e| ScanError::InvalidKeyword(e.to_string()))?;

        Ok(Self { tokens, pattern })
    }

    /// Load keywords from a newline-delimited file, skipping blanks and `#` comments
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;

        let tokens: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter(|line| !line.starts_with('#'))
            .map(String::from)
            .collect();

        if tokens.is_empty() {
            return Err(ScanError::InvalidKeyword(format!(
                "keyword file {} is empty or contains only comments",
                path.display()
            )));
        }

        Self::new(tokens)
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// First keyword occurrence in `text`, as it appears in the text
    pub fn find<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.pattern.find(text).map(|m| m.as_str())
    }

    /// Match against the path and query of a URL only, so that a keyword in
    /// the host name does not flag every page of the site.
    pub fn find_in_path(&self, url: &str) -> Option<String> {
        match Url::parse(url) {
            Ok(parsed) => {
                let mut tail = parsed.path().to_string();
                if let Some(query) = parsed.query() {
                    tail.push('?');
                    tail.push_str(query);
                }
                self.find(&tail).map(String::from)
            }
            Err(_) => self.find(url).map(String::from),
        }
    }
}

impl Default for KeywordSet {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS.iter().copied()).expect("default keywords are valid patterns")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_keywords() {
        let keywords = KeywordSet::default();
        assert_eq!(keywords.len(), 17);
        assert_eq!(keywords.tokens()[0], "admin");
        assert_eq!(keywords.tokens()[16], "config");
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let keywords = KeywordSet::default();
        assert!(keywords.is_match("<h1>Please LOGIN</h1>"));
        assert_eq!(keywords.find("Member Login here"), Some("Login"));
    }

    #[test]
    fn test_match_anywhere_in_markup() {
        let keywords = KeywordSet::default();
        assert!(keywords.is_match(r#"<input type="password" name="pw">"#));
        assert!(!keywords.is_match("<p>Welcome to our bakery</p>"));
    }

    #[test]
    fn test_find_in_path_ignores_host() {
        let keywords = KeywordSet::new(["secure"]).unwrap();
        assert_eq!(keywords.find_in_path("https://secure.example.com/about"), None);
        assert_eq!(
            keywords.find_in_path("https://example.com/secure/area"),
            Some("secure".to_string())
        );
        assert_eq!(
            keywords.find_in_path("https://example.com/page?view=SECURE"),
            Some("SECURE".to_string())
        );
    }

    #[test]
    fn test_rejects_empty_list() {
        let result = KeywordSet::new(Vec::<String>::new());
        assert!(matches!(result, Err(ScanError::InvalidKeyword(_))));
    }

    #[test]
    fn test_rejects_invalid_token() {
        let result = KeywordSet::new(["admin", "(unclosed"]);
        assert!(matches!(result, Err(ScanError::InvalidKeyword(_))));
    }

    #[test]
    fn test_regex_tokens() {
        let keywords = KeywordSet::new([r"wp-(admin|login)"]).unwrap();
        assert!(keywords.is_match("/WP-Login.php"));
        assert!(!keywords.is_match("/wp-content"));
    }

    #[test]
    fn test_load_skips_comments_and_blanks() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# custom list").unwrap();
        writeln!(file, "phpmyadmin").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  .git  ").unwrap();

        let keywords = KeywordSet::load(file.path()).unwrap();
        assert_eq!(keywords.tokens(), &["phpmyadmin".to_string(), ".git".to_string()]);
    }

    #[test]
    fn test_load_empty_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# nothing here").unwrap();

        let result = KeywordSet::load(file.path());
        assert!(matches!(result, Err(ScanError::InvalidKeyword(_))));
    }
}
