//! External-link augmentation
//!
//! Cross-references a graph of scraped wiki page metadata against the primary
//! graph. Link-graph subjects carrying `dbo:wikiPageExternalLink` are indexed
//! by the normalized last segment of their IRI; primary subjects are looked up
//! by their normalized `rdfs:label`. A hit attaches the stored link plus one
//! derived identifier per configured template.
//!
//! When two different link-graph subjects normalize to the same key the later
//! one in graph order wins. Graph order is sorted, so the winner is stable
//! across runs. Collisions are counted and audited.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::graph::{Graph, Term};
use super::normalize::{normalize, resource_name, strip_parenthetical};
use super::stats::{AuditKind, AuditLog, Stage};
use super::vocab::{external_link, rdfs_label, DBR, WD};

/// Placeholder for the label-derived resource name
pub const NAME_PLACEHOLDER: &str = "{name}";

/// Placeholder for the normalized comparison key
pub const KEY_PLACEHOLDER: &str = "{key}";

/// Augmenter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentConfig {
    /// IRI templates for derived identifiers
    pub templates: Vec<String>,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            templates: vec![
                format!("{}{NAME_PLACEHOLDER}", DBR.base()),
                format!("{}{NAME_PLACEHOLDER}", WD.base()),
            ],
        }
    }
}

impl AugmentConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), super::error::OntologyError> {
        for template in &self.templates {
            if !template.contains(NAME_PLACEHOLDER) && !template.contains(KEY_PLACEHOLDER) {
                return Err(super::error::OntologyError::invalid_config(
                    "augment.templates",
                    template,
                    "Template must contain {name} or {key}",
                ));
            }
            let probe = template
                .replace(NAME_PLACEHOLDER, "x")
                .replace(KEY_PLACEHOLDER, "x");
            if url::Url::parse(&probe).is_err() {
                return Err(super::error::OntologyError::invalid_config(
                    "augment.templates",
                    template,
                    "Template is not an absolute IRI",
                ));
            }
        }
        Ok(())
    }
}

/// Links found for one resource in the link graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    pub subject: Term,
    pub links: Vec<Term>,
}

/// Index of the link graph by normalized resource name
#[derive(Debug, Clone, Default)]
pub struct LinkLookup {
    entries: BTreeMap<String, LinkEntry>,
    collisions: usize,
}

impl LinkLookup {
    /// Build the lookup, last write wins on collisions
    pub fn build(link_graph: &Graph, audit: &mut AuditLog) -> Self {
        let mut lookup = Self::default();
        let predicate = external_link();

        for (subject, _, link) in link_graph.triples_matching(None, Some(&predicate), None) {
            let Some(iri) = subject.as_iri() else {
                continue;
            };
            let key = normalize(&resource_name(iri));
            if key.is_empty() {
                continue;
            }

            match lookup.entries.get_mut(&key) {
                Some(entry) if entry.subject == *subject => entry.links.push(link.clone()),
                Some(entry) => {
                    tracing::debug!(
                        key = %key,
                        previous = %entry.subject,
                        replacement = %subject,
                        "External link name collision"
                    );
                    audit.record(
                        Stage::Augment,
                        AuditKind::NameCollision,
                        key.clone(),
                        format!("{} replaced by {}", entry.subject, subject),
                    );
                    lookup.collisions += 1;
                    *entry = LinkEntry {
                        subject: subject.clone(),
                        links: vec![link.clone()],
                    };
                }
                None => {
                    lookup.entries.insert(
                        key,
                        LinkEntry {
                            subject: subject.clone(),
                            links: vec![link.clone()],
                        },
                    );
                }
            }
        }
        lookup
    }

    pub fn get(&self, key: &str) -> Option<&LinkEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn collisions(&self) -> usize {
        self.collisions
    }
}

/// Summary of an augmentation pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AugmentReport {
    pub lookup_entries: usize,
    pub collisions: usize,
    pub subjects_considered: usize,
    pub subjects_augmented: usize,
    pub triples_added: usize,

    #[serde(skip)]
    pub audit: AuditLog,
}

/// Resource name used in derived IRIs: label without parentheticals, `_` for spaces
fn derived_name(label: &str) -> String {
    strip_parenthetical(label)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

fn expand(template: &str, label: &str, key: &str) -> Option<Term> {
    let candidate = template
        .replace(NAME_PLACEHOLDER, &derived_name(label))
        .replace(KEY_PLACEHOLDER, &key.replace(' ', "_"));
    url::Url::parse(&candidate)
        .ok()
        .map(|url| Term::iri(url.as_str()))
}

/// Attach external links from `link_graph` to matching subjects of `primary`
pub fn augment(
    mut primary: Graph,
    link_graph: &Graph,
    config: &AugmentConfig,
) -> (Graph, AugmentReport) {
    let mut report = AugmentReport::default();
    let lookup = LinkLookup::build(link_graph, &mut report.audit);
    report.lookup_entries = lookup.len();
    report.collisions = lookup.collisions();

    let predicate = external_link();
    let labelled: Vec<(Term, Vec<String>)> = primary
        .subjects_having(&rdfs_label())
        .into_iter()
        .map(|s| {
            let labels = primary
                .objects(s, &rdfs_label())
                .filter_map(Term::literal_value)
                .map(str::to_string)
                .collect();
            (s.clone(), labels)
        })
        .collect();

    for (subject, labels) in labelled {
        report.subjects_considered += 1;
        let hit = labels.iter().find_map(|label| {
            let key = normalize(label);
            lookup.get(&key).map(|entry| (label.clone(), key, entry))
        });
        let Some((label, key, entry)) = hit else {
            continue;
        };

        let mut added = 0;
        for link in &entry.links {
            if primary.insert(subject.clone(), predicate.clone(), link.clone()) {
                added += 1;
            }
        }
        for template in &config.templates {
            match expand(template, &label, &key) {
                Some(target) => {
                    if primary.insert(subject.clone(), predicate.clone(), target) {
                        added += 1;
                    }
                }
                None => {
                    report.audit.record(
                        Stage::Augment,
                        AuditKind::InvalidValue,
                        subject.to_string(),
                        format!("template '{template}' produced an invalid IRI"),
                    );
                }
            }
        }

        if added > 0 {
            report.subjects_augmented += 1;
            report.triples_added += added;
        }
    }

    tracing::info!(
        lookup = report.lookup_entries,
        collisions = report.collisions,
        augmented = report.subjects_augmented,
        added = report.triples_added,
        "External links attached"
    );

    (primary, report)
}
