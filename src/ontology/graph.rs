//! In-memory RDF graph
//!
//! The merge pipeline works on a single owned [`Graph`] value that each stage
//! takes and hands back. Triples are kept in a nested ordered index
//! (subject -> predicate -> objects), so iteration order is deterministic and
//! subject-bound lookups are cheap.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::vocab::XSD_STRING;

/// A literal value with an optional datatype or language tag
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Literal {
    /// Lexical form
    pub value: String,

    /// Datatype IRI (`None` for plain and language-tagged literals)
    pub datatype: Option<String>,

    /// Language tag
    pub language: Option<String>,
}

/// An RDF term
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Term {
    /// Named node
    Iri(String),
    /// Blank node label (without the `_:` prefix)
    Blank(String),
    /// Literal value
    Literal(Literal),
}

impl Term {
    /// Create a named node
    pub fn iri(iri: impl Into<String>) -> Self {
        Term::Iri(iri.into())
    }

    /// Create a blank node
    pub fn blank(id: impl Into<String>) -> Self {
        Term::Blank(id.into())
    }

    /// Create a plain literal
    pub fn plain(value: impl Into<String>) -> Self {
        Term::Literal(Literal {
            value: value.into(),
            datatype: None,
            language: None,
        })
    }

    /// Create a language-tagged literal
    ///
    /// The tag is put in canonical case (`ja-latn` becomes `ja-Latn`).
    pub fn lang(value: impl Into<String>, language: impl Into<String>) -> Self {
        Term::Literal(Literal {
            value: value.into(),
            datatype: None,
            language: Some(canonical_language_tag(&language.into())),
        })
    }

    /// Create a typed literal
    ///
    /// `xsd:string` is folded into a plain literal so both spellings compare equal.
    pub fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        let datatype = datatype.into();
        Term::Literal(Literal {
            value: value.into(),
            datatype: (datatype != XSD_STRING).then_some(datatype),
            language: None,
        })
    }

    /// IRI string if this is a named node
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    /// Literal if this is one
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    /// Lexical value of a literal
    pub fn literal_value(&self) -> Option<&str> {
        self.as_literal().map(|l| l.value.as_str())
    }

    /// Whether this is a named node
    pub fn is_iri(&self) -> bool {
        matches!(self, Term::Iri(_))
    }

    /// Render in N-Triples syntax
    pub fn to_ntriples(&self) -> String {
        match self {
            Term::Iri(iri) => format!("<{iri}>"),
            Term::Blank(id) => format!("_:{id}"),
            Term::Literal(lit) => {
                let quoted = format!("\"{}\"", escape_literal(&lit.value));
                match (&lit.language, &lit.datatype) {
                    (Some(lang), _) => format!("{quoted}@{lang}"),
                    (None, Some(dt)) => format!("{quoted}^^<{dt}>"),
                    (None, None) => quoted,
                }
            }
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ntriples())
    }
}

/// BCP 47 case conventions: language lowercase, script titlecase, region uppercase
pub fn canonical_language_tag(tag: &str) -> String {
    tag.split('-')
        .enumerate()
        .map(|(i, sub)| match sub.len() {
            _ if i == 0 => sub.to_ascii_lowercase(),
            4 if sub.chars().all(|c| c.is_ascii_alphabetic()) => {
                let mut chars = sub.chars();
                let first = chars.next().map(|c| c.to_ascii_uppercase()).unwrap_or_default();
                format!("{first}{}", chars.as_str().to_ascii_lowercase())
            }
            2 => sub.to_ascii_uppercase(),
            _ => sub.to_ascii_lowercase(),
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Escape a literal for N-Triples / Turtle quoted strings
pub fn escape_literal(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// An owned triple
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    /// Render as one N-Triples statement
    pub fn to_ntriples(&self) -> String {
        format!(
            "{} {} {} .",
            self.subject.to_ntriples(),
            self.predicate.to_ntriples(),
            self.object.to_ntriples()
        )
    }
}

type PredicateMap = BTreeMap<Term, BTreeSet<Term>>;

/// Set of triples with deterministic ordering
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    index: BTreeMap<Term, PredicateMap>,
    len: usize,
}

impl Graph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of triples
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the graph has no triples
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Add a triple; returns `true` if it was not already present
    pub fn insert(&mut self, subject: Term, predicate: Term, object: Term) -> bool {
        let added = self
            .index
            .entry(subject)
            .or_default()
            .entry(predicate)
            .or_default()
            .insert(object);
        if added {
            self.len += 1;
        }
        added
    }

    /// Add an owned triple
    pub fn insert_triple(&mut self, triple: Triple) -> bool {
        self.insert(triple.subject, triple.predicate, triple.object)
    }

    /// Check for an exact triple
    pub fn contains(&self, subject: &Term, predicate: &Term, object: &Term) -> bool {
        self.index
            .get(subject)
            .and_then(|preds| preds.get(predicate))
            .is_some_and(|objs| objs.contains(object))
    }

    /// Iterate over all triples in order
    pub fn iter(&self) -> impl Iterator<Item = (&Term, &Term, &Term)> + '_ {
        self.index.iter().flat_map(|(s, preds)| {
            preds
                .iter()
                .flat_map(move |(p, objs)| objs.iter().map(move |o| (s, p, o)))
        })
    }

    /// Collect owned triples
    pub fn triples(&self) -> Vec<Triple> {
        self.iter()
            .map(|(s, p, o)| Triple::new(s.clone(), p.clone(), o.clone()))
            .collect()
    }

    /// Triples matching a pattern; `None` is a wildcard
    pub fn triples_matching<'a>(
        &'a self,
        subject: Option<&'a Term>,
        predicate: Option<&'a Term>,
        object: Option<&'a Term>,
    ) -> impl Iterator<Item = (&'a Term, &'a Term, &'a Term)> + 'a {
        let subjects: Box<dyn Iterator<Item = (&'a Term, &'a PredicateMap)> + 'a> = match subject {
            Some(s) => Box::new(self.index.get_key_value(s).into_iter()),
            None => Box::new(self.index.iter()),
        };
        subjects.flat_map(move |(s, preds)| {
            preds
                .iter()
                .filter(move |(p, _)| predicate.map_or(true, |want| *p == want))
                .flat_map(move |(p, objs)| {
                    objs.iter()
                        .filter(move |o| object.map_or(true, |want| *o == want))
                        .map(move |o| (s, p, o))
                })
        })
    }

    /// All distinct subjects
    pub fn subjects(&self) -> impl Iterator<Item = &Term> + '_ {
        self.index.keys()
    }

    /// Predicate/object map of one subject
    pub fn describe(&self, subject: &Term) -> Option<&BTreeMap<Term, BTreeSet<Term>>> {
        self.index.get(subject)
    }

    /// Objects of `(subject, predicate, ?)`
    pub fn objects<'a>(
        &'a self,
        subject: &Term,
        predicate: &Term,
    ) -> impl Iterator<Item = &'a Term> + 'a {
        self.index
            .get(subject)
            .and_then(|preds| preds.get(predicate))
            .into_iter()
            .flatten()
    }

    /// First object of `(subject, predicate, ?)`
    pub fn value(&self, subject: &Term, predicate: &Term) -> Option<&Term> {
        self.objects(subject, predicate).next()
    }

    /// Subjects of `(?, predicate, object)`
    pub fn subjects_with<'a>(&'a self, predicate: &Term, object: &Term) -> Vec<&'a Term> {
        self.index
            .iter()
            .filter(|(_, preds)| preds.get(predicate).is_some_and(|o| o.contains(object)))
            .map(|(s, _)| s)
            .collect()
    }

    /// Subjects that have at least one value for `predicate`
    pub fn subjects_having<'a>(&'a self, predicate: &Term) -> Vec<&'a Term> {
        self.index
            .iter()
            .filter(|(_, preds)| preds.get(predicate).is_some_and(|o| !o.is_empty()))
            .map(|(s, _)| s)
            .collect()
    }

    /// Whether `(subject, rdf:type, class)` is asserted
    pub fn has_type(&self, subject: &Term, class: &Term) -> bool {
        self.contains(subject, &super::vocab::rdf_type(), class)
    }

    /// Subjects asserted to be of `class`
    pub fn subjects_of_type<'a>(&'a self, class: &Term) -> Vec<&'a Term> {
        self.subjects_with(&super::vocab::rdf_type(), class)
    }

    /// Union `other` into this graph; returns the number of new triples
    pub fn extend(&mut self, other: Graph) -> usize {
        let mut added = 0;
        for (s, preds) in other.index {
            for (p, objs) in preds {
                for o in objs {
                    if self.insert(s.clone(), p.clone(), o) {
                        added += 1;
                    }
                }
            }
        }
        added
    }

    /// SHA-256 over the sorted N-Triples rendering
    ///
    /// Two graphs have the same digest exactly when they hold the same triples.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for (s, p, o) in self.iter() {
            hasher.update(s.to_ntriples().as_bytes());
            hasher.update(b" ");
            hasher.update(p.to_ntriples().as_bytes());
            hasher.update(b" ");
            hasher.update(o.to_ntriples().as_bytes());
            hasher.update(b" .\n");
        }
        format!("{:x}", hasher.finalize())
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        let mut graph = Graph::new();
        for triple in iter {
            graph.insert_triple(triple);
        }
        graph
    }
}
