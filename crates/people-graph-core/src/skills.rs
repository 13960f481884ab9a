//! Keyword skill extraction.
//!
//! Free text is lower-cased and split into word tokens; a vocabulary entry
//! matches when its lower-cased name equals one of the tokens. Tokens never
//! contain whitespace, so multi-word entries ("Machine Learning") never
//! match. That is the established behavior of the import and is kept.
//!
//! The vocabulary is data: the bundled default lives in `data/skills.txt`
//! and can be replaced at runtime with any file in the same format.

use std::collections::{BTreeSet, HashSet};

/// Bundled default vocabulary.
const BUILTIN_VOCABULARY: &str = include_str!("../data/skills.txt");

/// Characters split into their own token wherever they appear.
const SPLIT_ANYWHERE: &[char] = &[
    ';', '@', '#', '$', '%', '&', '?', '!', '(', ')', '[', ']', '{', '}', '<', '>',
];
/// Split off unless a digit follows (`1,000` and `10:30` stay whole).
const SPLIT_BEFORE_NON_DIGIT: &[char] = &[',', ':'];
/// Quotes peeled off the front of a word.
const LEADING: &[char] = &['"', '\'', '`'];
/// Quotes and the full stop peeled off the end of a word.
const TRAILING: &[char] = &['"', '\'', '`', '.'];

#[derive(Debug, Clone)]
struct VocabularyEntry {
    name: String,
    needle: String,
}

/// Allow-list of technology skills recognised in descriptions.
#[derive(Debug, Clone, Default)]
pub struct SkillVocabulary {
    entries: Vec<VocabularyEntry>,
}

impl SkillVocabulary {
    /// The vocabulary compiled into the binary.
    pub fn builtin() -> Self {
        Self::from_text(BUILTIN_VOCABULARY)
    }

    /// Parse one skill per line. Blank lines and `#` comments are ignored,
    /// repeated names keep their first occurrence.
    pub fn from_text(text: &str) -> Self {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for line in text.lines() {
            let name = line.trim();
            if name.is_empty() || name.starts_with('#') {
                continue;
            }
            if !seen.insert(name.to_string()) {
                continue;
            }
            entries.push(VocabularyEntry {
                name: name.to_string(),
                needle: name.to_lowercase(),
            });
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Skill display names in vocabulary order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Skills mentioned in `text`, by display name.
    pub fn extract(&self, text: &str) -> BTreeSet<String> {
        let tokens: HashSet<String> = tokenize(&text.to_lowercase()).into_iter().collect();
        self.entries
            .iter()
            .filter(|entry| tokens.contains(&entry.needle))
            .map(|entry| entry.name.clone())
            .collect()
    }
}

/// Split text into word and punctuation tokens.
///
/// Follows the shape of a Treebank-style tokenizer: whitespace separates
/// words, `;@#$%&?!` and brackets always stand alone, `,` and `:` split
/// unless a digit follows, quotes and a final `.` are peeled from word
/// edges, and a possessive `'s` becomes its own token. Inner full stops and
/// plus signs are kept, so `node.js` and `c++` stay whole while `c#` becomes
/// `c` and `#`, and `python,java` becomes `python`, `,`, `java`.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for word in text.split_whitespace() {
        let mut start = 0;
        let mut chars = word.char_indices().peekable();
        while let Some((idx, c)) = chars.next() {
            let digit_follows = chars.peek().is_some_and(|(_, next)| next.is_ascii_digit());
            let splits = SPLIT_ANYWHERE.contains(&c)
                || (SPLIT_BEFORE_NON_DIGIT.contains(&c) && !digit_follows);
            if splits {
                push_word(&word[start..idx], &mut tokens);
                tokens.push(c.to_string());
                start = idx + c.len_utf8();
            }
        }
        push_word(&word[start..], &mut tokens);
    }
    tokens
}

fn push_word(word: &str, tokens: &mut Vec<String>) {
    let mut rest = word;
    while let Some(c) = rest.chars().next().filter(|c| LEADING.contains(c)) {
        tokens.push(c.to_string());
        rest = &rest[c.len_utf8()..];
    }

    let mut trailing = Vec::new();
    while let Some(c) = rest.chars().next_back().filter(|c| TRAILING.contains(c)) {
        trailing.push(c.to_string());
        rest = &rest[..rest.len() - c.len_utf8()];
    }

    if !rest.is_empty() {
        match rest.strip_suffix("'s").filter(|stem| !stem.is_empty()) {
            Some(stem) => {
                tokens.push(stem.to_string());
                tokens.push("'s".to_string());
            }
            None => tokens.push(rest.to_string()),
        }
    }
    tokens.extend(trailing.into_iter().rev());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn builtin_vocabulary_loads() {
        let vocab = SkillVocabulary::builtin();
        assert!(vocab.len() > 250);
        assert!(vocab.names().any(|n| n == "Kubernetes"));
        // "Cassandra" is listed twice in the data file.
        assert_eq!(vocab.names().filter(|n| *n == "Cassandra").count(), 1);
    }

    #[test]
    fn extracts_whole_tokens() {
        let vocab = SkillVocabulary::builtin();
        let skills = vocab.extract("Built services with Python and Kubernetes");
        assert_eq!(skills, set(&["Kubernetes", "Python"]));
    }

    #[test]
    fn multi_word_skills_never_match() {
        let vocab = SkillVocabulary::builtin();
        assert!(vocab.names().any(|n| n == "Machine Learning"));
        let skills = vocab.extract("Applied Machine Learning with Python.");
        assert!(!skills.contains("Machine Learning"));
        assert_eq!(skills, set(&["Python"]));
    }

    #[test]
    fn punctuation_is_peeled() {
        let vocab = SkillVocabulary::from_text("Docker\nGo\nC++\nNode.js\nC#");
        let skills = vocab.extract("(Docker), Go. Wrote C++; shipped Node.js and C# services!");
        assert_eq!(skills, set(&["C++", "Docker", "Go", "Node.js"]));
    }

    #[test]
    fn substrings_do_not_match() {
        let vocab = SkillVocabulary::from_text("Java\nGo");
        let skills = vocab.extract("JavaScript developer, good at Google searches");
        assert!(skills.is_empty());
    }

    #[test]
    fn extraction_is_deterministic() {
        let vocab = SkillVocabulary::builtin();
        let text = "Rust, Go, Docker, Terraform, PostgreSQL, React and Python";
        assert_eq!(vocab.extract(text), vocab.extract(text));
    }

    #[test]
    fn vocabulary_ignores_comments_and_blanks() {
        let vocab = SkillVocabulary::from_text("# header\n\n  Rust  \nRust\n#Go\n");
        assert_eq!(vocab.names().collect::<Vec<_>>(), vec!["Rust"]);
    }

    #[test]
    fn tokenize_shapes() {
        assert_eq!(tokenize("hello, world."), vec!["hello", ",", "world", "."]);
        assert_eq!(tokenize("c# and f#"), vec!["c", "#", "and", "f", "#"]);
        assert_eq!(tokenize("\"quoted\""), vec!["\"", "quoted", "\""]);
        assert_eq!(tokenize("team's"), vec!["team", "'s"]);
        assert_eq!(tokenize("asp.net"), vec!["asp.net"]);
        assert_eq!(tokenize("c++ node.js."), vec!["c++", "node.js", "."]);
    }

    #[test]
    fn tokenize_splits_inside_words() {
        assert_eq!(
            tokenize("python,java,docker"),
            vec!["python", ",", "java", ",", "docker"]
        );
        assert_eq!(tokenize("rust(tokio)"), vec!["rust", "(", "tokio", ")"]);
        assert_eq!(tokenize("go:kubernetes"), vec!["go", ":", "kubernetes"]);
        assert_eq!(tokenize("[aws]{gcp}<azure>"), vec!["[", "aws", "]", "{", "gcp", "}", "<", "azure", ">"]);
    }

    #[test]
    fn tokenize_keeps_digit_separators() {
        assert_eq!(tokenize("1,000"), vec!["1,000"]);
        assert_eq!(tokenize("at 10:30,"), vec!["at", "10:30", ","]);
        assert_eq!(tokenize("stack:"), vec!["stack", ":"]);
    }

    #[test]
    fn extracts_from_packed_stacks() {
        let vocab = SkillVocabulary::from_text("Python\nJava\nDocker\nRust\nGo\nKubernetes\nTokio");
        let skills = vocab.extract("Stack: Python,Java,Docker; Rust(Tokio) and Go:Kubernetes");
        assert_eq!(
            skills,
            set(&["Docker", "Go", "Java", "Kubernetes", "Python", "Rust", "Tokio"])
        );
        // The builtin list finds the same stack without the extra entry.
        let builtin = SkillVocabulary::builtin()
            .extract("Stack: Python,Java,Docker; Rust(Tokio) and Go:Kubernetes");
        assert_eq!(
            builtin,
            set(&["Docker", "Go", "Java", "Kubernetes", "Python", "Rust"])
        );
    }
}
