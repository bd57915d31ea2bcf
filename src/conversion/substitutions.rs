//! Literal substitution table.
//!
//! Pure find/replace of inline DocBook tags into reStructuredText inline
//! markup. Character escapes run after every tag trigger so that
//! `&lt;command&gt;` stays literal text rather than turning into a code span.

use std::collections::BTreeMap;

use crate::conversion::translator::LINE_BREAK;

/// One find/replace rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub trigger: String,
    pub replacement: String,
    /// The replacement opens an indented block
    pub indents: bool,
}

impl Substitution {
    pub fn new(trigger: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            replacement: replacement.into(),
            indents: false,
        }
    }

    pub fn indenting(mut self) -> Self {
        self.indents = true;
        self
    }
}

/// Text after substitution plus the number of indenting rules that fired
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substituted {
    pub text: String,
    pub indents: usize,
}

const INLINE_RULES: [(&str, &str); 21] = [
    ("<command>", "``"),
    ("</command>", "``"),
    ("<acronym>", "**"),
    ("</acronym>", "**"),
    ("<envar>", "``**"),
    ("</envar>", "**``"),
    ("<filename>", "``"),
    ("</filename>", "``"),
    ("<classname>", "``"),
    ("</classname>", "``"),
    ("<methodname>", "``"),
    ("</methodname>", "``"),
    ("<varname>", "``"),
    ("</varname>", "``"),
    ("<userinput>", "``*"),
    ("</userinput>", "*``"),
    ("<emphasis>", "*"),
    ("</emphasis>", "*"),
    ("<literal>", "``"),
    ("</literal>", "``"),
    ("</para>", "\n"),
];

const NOTE_TRIGGER: &str = "<note>";

const ESCAPE_RULES: [(&str, &str); 2] = [("&lt;", "<"), ("&gt;", ">")];

/// Ordered substitution rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionTable {
    rules: Vec<Substitution>,
}

impl Default for SubstitutionTable {
    fn default() -> Self {
        let mut rules: Vec<Substitution> = INLINE_RULES
            .iter()
            .map(|(trigger, replacement)| Substitution::new(*trigger, *replacement))
            .collect();
        rules.push(Substitution::new(NOTE_TRIGGER, format!(".. note::{}", LINE_BREAK)).indenting());
        rules.extend(ESCAPE_RULES.iter().map(|(t, r)| Substitution::new(*t, *r)));
        Self { rules }
    }
}

impl SubstitutionTable {
    pub fn new(rules: Vec<Substitution>) -> Self {
        Self { rules }
    }

    /// Default rules with user rules applied ahead of the character escapes
    pub fn with_extra(extra: &BTreeMap<String, String>) -> Self {
        let mut table = Self::default();
        let escapes_at = table.rules.len() - ESCAPE_RULES.len();
        let user_rules = extra
            .iter()
            .filter(|(trigger, _)| !trigger.is_empty())
            .map(|(trigger, replacement)| Substitution::new(trigger.as_str(), replacement.as_str()));
        for (offset, rule) in user_rules.enumerate() {
            table.rules.insert(escapes_at + offset, rule);
        }
        table
    }

    pub fn rules(&self) -> &[Substitution] {
        &self.rules
    }

    pub fn apply(&self, text: &str) -> Substituted {
        let mut result = text.to_string();
        let mut indents = 0;
        for rule in &self.rules {
            if result.contains(rule.trigger.as_str()) {
                if rule.indents {
                    indents += result.matches(rule.trigger.as_str()).count();
                }
                result = result.replace(rule.trigger.as_str(), &rule.replacement);
            }
        }
        Substituted {
            text: result,
            indents,
        }
    }
}
