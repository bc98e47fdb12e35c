/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::prefixes::{PrefixMapping, PrefixResult};
use crate::triple::Triple;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a position of a triple pattern is bound or not
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ElementType {
    Variable,
    Constant,
}

/// A term as handed over by the SPARQL front-end, before normalization
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    Variable(String),
    Iri(String),
    PrefixedName {
        prefix: String,
        local: String,
    },
    Literal {
        lexical: String,
        datatype: Option<String>,
        language: Option<String>,
    },
    BlankNode(String),
}

impl Term {
    pub fn variable(name: &str) -> Self {
        Term::Variable(name.trim_start_matches(['?', '$']).to_string())
    }

    pub fn iri(iri: &str) -> Self {
        Term::Iri(iri.trim_start_matches('<').trim_end_matches('>').to_string())
    }

    pub fn prefixed(prefix: &str, local: &str) -> Self {
        Term::PrefixedName {
            prefix: prefix.to_string(),
            local: local.to_string(),
        }
    }

    pub fn literal(lexical: &str) -> Self {
        Term::Literal {
            lexical: lexical.to_string(),
            datatype: None,
            language: None,
        }
    }

    /// Renders the term in its canonical textual form.
    ///
    /// Variables become `?name`, IRIs `<iri>` and literals keep their
    /// N-Triples shape. Blank nodes in a query pattern behave like
    /// variables and are rendered `?_:label`.
    pub fn canonical(&self, prefixes: &PrefixMapping) -> PrefixResult<(String, ElementType)> {
        let rendered = match self {
            Term::Variable(name) => (format!("?{}", name), ElementType::Variable),
            Term::BlankNode(label) => (format!("?_:{}", label), ElementType::Variable),
            Term::Iri(iri) => (format!("<{}>", iri), ElementType::Constant),
            Term::PrefixedName { prefix, local } => {
                let iri = prefixes.expand(prefix, local)?;
                (format!("<{}>", iri), ElementType::Constant)
            }
            Term::Literal {
                lexical,
                datatype,
                language,
            } => {
                let mut text = format!("\"{}\"", lexical);
                if let Some(lang) = language {
                    text.push('@');
                    text.push_str(lang);
                } else if let Some(dt) = datatype {
                    text.push_str("^^<");
                    text.push_str(dt);
                    text.push('>');
                }
                (text, ElementType::Constant)
            }
        };
        Ok(rendered)
    }
}

/// Normalized triple pattern. Every position is kept in canonical text form
/// so that comparing two patterns is a plain string and kind comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TriplePattern {
    pub subject: String,
    pub predicate: String,
    pub object: String,
    pub subject_type: ElementType,
    pub predicate_type: ElementType,
    pub object_type: ElementType,
}

fn element_type_of(text: &str) -> ElementType {
    if text.starts_with('?') {
        ElementType::Variable
    } else {
        ElementType::Constant
    }
}

fn normalize_variable(text: &str) -> String {
    match text.strip_prefix('$') {
        Some(name) => format!("?{}", name),
        None => text.to_string(),
    }
}

impl TriplePattern {
    /// Builds a pattern from already canonical strings. Positions starting
    /// with `?` (or `$`) are variables, everything else is a constant.
    pub fn new(subject: &str, predicate: &str, object: &str) -> Self {
        let subject = normalize_variable(subject);
        let predicate = normalize_variable(predicate);
        let object = normalize_variable(object);
        Self {
            subject_type: element_type_of(&subject),
            predicate_type: element_type_of(&predicate),
            object_type: element_type_of(&object),
            subject,
            predicate,
            object,
        }
    }

    /// Converts a source triple, expanding prefixed names through `prefixes`
    pub fn from_triple(triple: &Triple, prefixes: &PrefixMapping) -> PrefixResult<Self> {
        let (subject, subject_type) = triple.subject.canonical(prefixes)?;
        let (predicate, predicate_type) = triple.predicate.canonical(prefixes)?;
        let (object, object_type) = triple.object.canonical(prefixes)?;
        Ok(Self {
            subject,
            predicate,
            object,
            subject_type,
            predicate_type,
            object_type,
        })
    }

    pub fn is_subject_var(&self) -> bool {
        self.subject_type == ElementType::Variable
    }

    pub fn is_predicate_var(&self) -> bool {
        self.predicate_type == ElementType::Variable
    }

    pub fn is_object_var(&self) -> bool {
        self.object_type == ElementType::Variable
    }

    /// Variables of the pattern in subject, predicate, object order
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        [
            (&self.subject, self.subject_type),
            (&self.predicate, self.predicate_type),
            (&self.object, self.object_type),
        ]
        .into_iter()
        .filter(|(_, kind)| *kind == ElementType::Variable)
        .map(|(text, _)| text.as_str())
    }

    pub fn contains_variable(&self, var: &str) -> bool {
        self.variables().any(|v| v == var)
    }

    /// Exact match on subject, predicate and object text
    pub fn same_triple(&self, other: &TriplePattern) -> bool {
        self.subject == other.subject
            && self.predicate == other.predicate
            && self.object == other.object
    }
}

impl fmt::Display for TriplePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) ({}) ({})", self.subject, self.predicate, self.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_infers_element_types() {
        let tp = TriplePattern::new("?book", "<http://ex.org/title>", "\"Dune\"");
        assert_eq!(tp.subject_type, ElementType::Variable);
        assert_eq!(tp.predicate_type, ElementType::Constant);
        assert_eq!(tp.object_type, ElementType::Constant);
        assert_eq!(tp.variables().collect::<Vec<_>>(), vec!["?book"]);
    }

    #[test]
    fn test_dollar_variables_are_normalized() {
        let tp = TriplePattern::new("$s", "?p", "$o");
        assert_eq!(tp.subject, "?s");
        assert_eq!(tp.object, "?o");
        assert_eq!(tp.variables().count(), 3);
    }

    #[test]
    fn test_from_triple_canonical_form() {
        let mut prefixes = PrefixMapping::new();
        prefixes.add_prefix("ex", "http://ex.org/");
        let triple = Triple::new(
            Term::variable("?b"),
            Term::prefixed("ex", "title"),
            Term::Literal {
                lexical: "Dune".to_string(),
                datatype: None,
                language: Some("en".to_string()),
            },
        );
        let tp = TriplePattern::from_triple(&triple, &prefixes).unwrap();
        assert_eq!(tp.subject, "?b");
        assert_eq!(tp.predicate, "<http://ex.org/title>");
        assert_eq!(tp.object, "\"Dune\"@en");
        assert_eq!(tp.object_type, ElementType::Constant);
    }

    #[test]
    fn test_typed_literal_and_blank_node() {
        let prefixes = PrefixMapping::new();
        let triple = Triple::new(
            Term::BlankNode("b0".to_string()),
            Term::iri("<http://ex.org/age>"),
            Term::Literal {
                lexical: "42".to_string(),
                datatype: Some("http://www.w3.org/2001/XMLSchema#integer".to_string()),
                language: None,
            },
        );
        let tp = TriplePattern::from_triple(&triple, &prefixes).unwrap();
        assert_eq!(tp.subject, "?_:b0");
        assert!(tp.is_subject_var());
        assert_eq!(tp.predicate, "<http://ex.org/age>");
        assert_eq!(tp.object, "\"42\"^^<http://www.w3.org/2001/XMLSchema#integer>");
    }

    #[test]
    fn test_unknown_prefix_fails() {
        let prefixes = PrefixMapping::new();
        let triple = Triple::new(
            Term::variable("s"),
            Term::prefixed("nope", "p"),
            Term::variable("o"),
        );
        assert!(TriplePattern::from_triple(&triple, &prefixes).is_err());
    }

    #[test]
    fn test_same_triple_ignores_nothing_but_text() {
        let a = TriplePattern::new("?s", "<p>", "?o");
        let b = TriplePattern::new("?s", "<p>", "?o");
        let c = TriplePattern::new("?s", "<q>", "?o");
        assert!(a.same_triple(&b));
        assert!(!a.same_triple(&c));
    }
}
