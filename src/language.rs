//! Language rule registry: extensions, comment markers and string delimiters.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Error;

/// Opening and closing text of a multi-line comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentPair {
    pub start: String,
    pub end: String,
}

impl CommentPair {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// Comment and string syntax for one language.
///
/// All lists are ordered: markers, pairs and delimiters are tried in the
/// order given, and the first match wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageRule {
    pub id: String,
    pub extensions: Vec<String>,
    #[serde(default)]
    pub single_line: Vec<String>,
    #[serde(default)]
    pub multi_line: Vec<CommentPair>,
    pub string_delimiters: Vec<String>,
}

impl LanguageRule {
    fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("rule with an empty id".to_string());
        }
        if self.extensions.is_empty() {
            return Err(format!("`{}` has no extensions", self.id));
        }

        let empty = |items: &[String]| items.iter().any(|s| s.is_empty());
        if empty(&self.extensions) {
            return Err(format!("`{}` has an empty extension", self.id));
        }
        if empty(&self.single_line) {
            return Err(format!("`{}` has an empty single-line marker", self.id));
        }
        if empty(&self.string_delimiters) {
            return Err(format!("`{}` has an empty string delimiter", self.id));
        }
        if self
            .multi_line
            .iter()
            .any(|p| p.start.is_empty() || p.end.is_empty())
        {
            return Err(format!("`{}` has an empty multi-line delimiter", self.id));
        }

        Ok(())
    }
}

struct Builtin {
    id: &'static str,
    extensions: &'static [&'static str],
    single_line: &'static [&'static str],
    multi_line: &'static [(&'static str, &'static str)],
    string_delimiters: &'static [&'static str],
}

const QUOTES: &[&str] = &["\"", "'"];
const JS_QUOTES: &[&str] = &["\"", "'", "`"];
const TRIPLE_QUOTES: &[&str] = &["\"\"\"", "'''", "\"", "'"];
const C_BLOCK: &[(&str, &str)] = &[("/*", "*/")];

const BUILTINS: &[Builtin] = &[
    // Triple-quoted strings (docstrings included) are literals, not comments.
    Builtin {
        id: "python",
        extensions: &["py", "pyw"],
        single_line: &["#"],
        multi_line: &[],
        string_delimiters: TRIPLE_QUOTES,
    },
    Builtin {
        id: "javascript",
        extensions: &["js", "jsx", "mjs"],
        single_line: &["//"],
        multi_line: C_BLOCK,
        string_delimiters: JS_QUOTES,
    },
    Builtin {
        id: "typescript",
        extensions: &["ts", "tsx"],
        single_line: &["//"],
        multi_line: C_BLOCK,
        string_delimiters: JS_QUOTES,
    },
    Builtin {
        id: "java",
        extensions: &["java"],
        single_line: &["//"],
        multi_line: C_BLOCK,
        string_delimiters: QUOTES,
    },
    Builtin {
        id: "c_cpp",
        extensions: &["c", "cpp", "cc", "cxx", "h", "hpp"],
        single_line: &["//"],
        multi_line: C_BLOCK,
        string_delimiters: QUOTES,
    },
    Builtin {
        id: "shell",
        extensions: &["sh", "bash", "zsh", "fish"],
        single_line: &["#"],
        multi_line: &[],
        string_delimiters: QUOTES,
    },
    Builtin {
        id: "perl",
        extensions: &["pl", "pm", "perl"],
        single_line: &["#"],
        multi_line: &[("=pod", "=cut")],
        string_delimiters: QUOTES,
    },
    Builtin {
        id: "ruby",
        extensions: &["rb", "ruby"],
        single_line: &["#"],
        multi_line: &[("=begin", "=end")],
        string_delimiters: QUOTES,
    },
    Builtin {
        id: "php",
        extensions: &["php"],
        single_line: &["#", "//"],
        multi_line: C_BLOCK,
        string_delimiters: QUOTES,
    },
    Builtin {
        id: "css",
        extensions: &["css", "scss", "sass", "less"],
        single_line: &["//"],
        multi_line: C_BLOCK,
        string_delimiters: QUOTES,
    },
    Builtin {
        id: "html_xml",
        extensions: &["html", "htm", "xml", "xhtml"],
        single_line: &[],
        multi_line: &[("<!--", "-->")],
        string_delimiters: QUOTES,
    },
    Builtin {
        id: "sql",
        extensions: &["sql"],
        single_line: &["--"],
        multi_line: C_BLOCK,
        string_delimiters: QUOTES,
    },
    Builtin {
        id: "lua",
        extensions: &["lua"],
        single_line: &["--"],
        multi_line: &[("--[[", "]]")],
        string_delimiters: QUOTES,
    },
    Builtin {
        id: "r",
        extensions: &["r"],
        single_line: &["#"],
        multi_line: &[],
        string_delimiters: QUOTES,
    },
    Builtin {
        id: "matlab",
        extensions: &["m"],
        single_line: &["%"],
        multi_line: &[("%{", "%}")],
        string_delimiters: QUOTES,
    },
    // Single quotes are lifetimes as often as char literals. A `'"'` char
    // literal therefore opens a string that runs to the next `"`.
    Builtin {
        id: "rust",
        extensions: &["rs"],
        single_line: &["//"],
        multi_line: C_BLOCK,
        string_delimiters: &["\""],
    },
    Builtin {
        id: "go",
        extensions: &["go"],
        single_line: &["//"],
        multi_line: C_BLOCK,
        string_delimiters: JS_QUOTES,
    },
    Builtin {
        id: "csharp",
        extensions: &["cs"],
        single_line: &["//"],
        multi_line: C_BLOCK,
        string_delimiters: QUOTES,
    },
    Builtin {
        id: "swift",
        extensions: &["swift"],
        single_line: &["//"],
        multi_line: C_BLOCK,
        string_delimiters: &["\"\"\"", "\""],
    },
    Builtin {
        id: "kotlin",
        extensions: &["kt", "kts"],
        single_line: &["//"],
        multi_line: C_BLOCK,
        string_delimiters: &["\"\"\"", "\"", "'"],
    },
    Builtin {
        id: "yaml",
        extensions: &["yaml", "yml"],
        single_line: &["#"],
        multi_line: &[],
        string_delimiters: QUOTES,
    },
    Builtin {
        id: "toml",
        extensions: &["toml"],
        single_line: &["#"],
        multi_line: &[],
        string_delimiters: TRIPLE_QUOTES,
    },
];

impl From<&Builtin> for LanguageRule {
    fn from(b: &Builtin) -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            id: b.id.to_string(),
            extensions: owned(b.extensions),
            single_line: owned(b.single_line),
            multi_line: b
                .multi_line
                .iter()
                .map(|&(start, end)| CommentPair::new(start, end))
                .collect(),
            string_delimiters: owned(b.string_delimiters),
        }
    }
}

/// Immutable lookup table from file extension to [`LanguageRule`].
///
/// Built once at start-up and passed around by reference.
#[derive(Debug, Clone)]
pub struct Registry {
    rules: Vec<LanguageRule>,
    by_ext: HashMap<String, usize>,
}

impl Registry {
    /// The built-in rule table.
    pub fn builtin() -> Self {
        Self::build(BUILTINS.iter().map(LanguageRule::from).collect())
    }

    /// Built-in rules extended by `extra`.
    ///
    /// Extra rules are consulted first. An extra rule whose id matches a
    /// built-in replaces it.
    pub fn with_rules(extra: Vec<LanguageRule>) -> Result<Self, Error> {
        let mut rules = Vec::with_capacity(extra.len() + BUILTINS.len());

        for mut rule in extra {
            rule.id = rule.id.trim().to_string();
            rule.extensions = rule.extensions.iter().map(|e| normalize_ext(e)).collect();
            rule.validate().map_err(Error::InvalidRules)?;
            rules.push(rule);
        }

        for builtin in BUILTINS {
            if !rules.iter().any(|r| r.id == builtin.id) {
                rules.push(LanguageRule::from(builtin));
            }
        }

        Ok(Self::build(rules))
    }

    /// Built-in rules extended by a JSON array of rules read from `path`.
    pub fn from_rules_file(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let extra: Vec<LanguageRule> =
            serde_json::from_str(&text).map_err(|source| Error::RulesFile {
                path: path.to_path_buf(),
                source,
            })?;
        Self::with_rules(extra)
    }

    fn build(rules: Vec<LanguageRule>) -> Self {
        let mut by_ext: HashMap<String, usize> = HashMap::new();

        for (idx, rule) in rules.iter().enumerate() {
            for ext in &rule.extensions {
                match by_ext.get(ext) {
                    Some(&first) if first != idx => warn!(
                        extension = %ext,
                        kept = %rules[first].id,
                        ignored = %rule.id,
                        "extension claimed by more than one language"
                    ),
                    Some(_) => {}
                    None => {
                        by_ext.insert(ext.clone(), idx);
                    }
                }
            }
        }

        Self { rules, by_ext }
    }

    /// Rule for a file extension. Case-insensitive; a leading dot is allowed.
    pub fn rule_for(&self, extension: &str) -> Option<&LanguageRule> {
        self.by_ext
            .get(&normalize_ext(extension))
            .map(|&idx| &self.rules[idx])
    }

    /// Rule for a path, by its extension.
    pub fn detect_language(&self, path: &Path) -> Option<&LanguageRule> {
        path.extension()
            .and_then(|s| s.to_str())
            .and_then(|ext| self.rule_for(ext))
    }

    pub fn get(&self, id: &str) -> Option<&LanguageRule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn rules(&self) -> &[LanguageRule] {
        &self.rules
    }
}

/// Lowercase, no leading dot.
fn normalize_ext(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}
