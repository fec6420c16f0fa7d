//! Entity linking
//!
//! Producers emit raw target names (`ex:typeName "Grass"`) instead of links.
//! The linker mints each name's URI through the normalizer, checks that a node
//! of the expected class exists in the relevant reference graph, and only then
//! adds the relationship triple. Anything it cannot verify is reported as
//! unresolved and left out.
//!
//! Hidden abilities are the one exception. The abilities listing does not
//! enumerate every hidden ability, so a hidden ability with no typed Ability
//! node is minted on the fly (typed both Ability and HiddenAbility). Type, egg
//! group and regular ability links stay strict. Downstream consumers rely on
//! this asymmetry; do not make the two paths symmetric.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::error::OntologyError;
use super::graph::{Graph, Term};
use super::normalize::{mint, strip_parenthetical, to_uri_token};
use super::stats::{AuditKind, AuditLog, Stage};
use super::vocab::{self, rdf_type, rdfs_label, EntityKind, Vocabulary};

// ============================================================================
// Rules
// ============================================================================

/// What to do when a target node does not exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkPolicy {
    /// Omit the link
    Strict,
    /// Create the node with the target class plus `also`, then link
    MintIfMissing { also: Option<EntityKind> },
}

/// Which graph proves a target exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Types,
    Abilities,
    EggGroups,
    /// The unified graph itself
    Unified,
}

/// Separately loaded per-kind reference graphs
#[derive(Debug, Clone, Default)]
pub struct References {
    pub types: Option<Graph>,
    pub abilities: Option<Graph>,
    pub egg_groups: Option<Graph>,
}

impl References {
    pub fn get(&self, kind: ReferenceKind) -> Option<&Graph> {
        match kind {
            ReferenceKind::Types => self.types.as_ref(),
            ReferenceKind::Abilities => self.abilities.as_ref(),
            ReferenceKind::EggGroups => self.egg_groups.as_ref(),
            ReferenceKind::Unified => None,
        }
    }
}

/// One relationship to resolve
#[derive(Debug, Clone)]
pub struct LinkRule {
    pub name: &'static str,
    pub source_class: EntityKind,
    /// Predicate holding the raw target names
    pub name_predicate: Term,
    /// Relationship predicate to add
    pub predicate: Term,
    pub target_class: EntityKind,
    pub reference: ReferenceKind,
    pub policy: LinkPolicy,
}

impl LinkRule {
    /// Classes that must be declared for the rule to run
    fn required_classes(&self) -> Vec<Term> {
        let mut classes = vec![self.target_class.class()];
        if let LinkPolicy::MintIfMissing { also: Some(kind) } = self.policy {
            classes.push(kind.class());
        }
        classes
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Entity linking configuration
#[derive(Debug, Clone)]
pub struct LinkerConfig {
    /// Policy for hidden abilities missing from the abilities reference
    pub hidden_ability_policy: LinkPolicy,

    /// Resolve `Move -> Type`
    pub link_move_types: bool,

    /// Resolve `Episode -> Pokémon` debuts
    pub link_episode_debuts: bool,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            hidden_ability_policy: LinkPolicy::MintIfMissing {
                also: Some(EntityKind::HiddenAbility),
            },
            link_move_types: true,
            link_episode_debuts: true,
        }
    }
}

impl LinkerConfig {
    /// Create a new builder for LinkerConfig
    pub fn builder() -> LinkerConfigBuilder {
        LinkerConfigBuilder::default()
    }

    /// Every link strict, hidden abilities included
    pub fn strict() -> Self {
        Self {
            hidden_ability_policy: LinkPolicy::Strict,
            ..Self::default()
        }
    }

    /// Rules in the order they run
    pub fn rules(&self) -> Vec<LinkRule> {
        let mut rules = vec![
            LinkRule {
                name: "pokemon-type",
                source_class: EntityKind::Pokemon,
                name_predicate: vocab::type_name(),
                predicate: vocab::has_type(),
                target_class: EntityKind::PokemonType,
                reference: ReferenceKind::Types,
                policy: LinkPolicy::Strict,
            },
            LinkRule {
                name: "pokemon-ability",
                source_class: EntityKind::Pokemon,
                name_predicate: vocab::ability_name(),
                predicate: vocab::has_ability(),
                target_class: EntityKind::Ability,
                reference: ReferenceKind::Abilities,
                policy: LinkPolicy::Strict,
            },
            LinkRule {
                name: "pokemon-hidden-ability",
                source_class: EntityKind::Pokemon,
                name_predicate: vocab::hidden_ability_name(),
                predicate: vocab::has_hidden_ability(),
                target_class: EntityKind::Ability,
                reference: ReferenceKind::Abilities,
                policy: self.hidden_ability_policy,
            },
            LinkRule {
                name: "pokemon-egg-group",
                source_class: EntityKind::Pokemon,
                name_predicate: vocab::egg_group_name(),
                predicate: vocab::has_egg_group(),
                target_class: EntityKind::EggGroup,
                reference: ReferenceKind::EggGroups,
                policy: LinkPolicy::Strict,
            },
        ];
        if self.link_move_types {
            rules.push(LinkRule {
                name: "move-type",
                source_class: EntityKind::Move,
                name_predicate: vocab::type_name(),
                predicate: vocab::has_type(),
                target_class: EntityKind::PokemonType,
                reference: ReferenceKind::Types,
                policy: LinkPolicy::Strict,
            });
        }
        if self.link_episode_debuts {
            rules.push(LinkRule {
                name: "episode-debut",
                source_class: EntityKind::Episode,
                name_predicate: vocab::debut_name(),
                predicate: vocab::has_pokemon_debut(),
                target_class: EntityKind::Pokemon,
                reference: ReferenceKind::Unified,
                policy: LinkPolicy::Strict,
            });
        }
        rules
    }
}

/// Builder for LinkerConfig with fluent API
#[derive(Debug, Clone, Default)]
pub struct LinkerConfigBuilder {
    hidden_ability_policy: Option<LinkPolicy>,
    link_move_types: Option<bool>,
    link_episode_debuts: Option<bool>,
}

impl LinkerConfigBuilder {
    /// Mint missing hidden abilities or treat them strictly
    pub fn mint_hidden_abilities(mut self, enable: bool) -> Self {
        self.hidden_ability_policy = Some(if enable {
            LinkPolicy::MintIfMissing {
                also: Some(EntityKind::HiddenAbility),
            }
        } else {
            LinkPolicy::Strict
        });
        self
    }

    pub fn link_move_types(mut self, enable: bool) -> Self {
        self.link_move_types = Some(enable);
        self
    }

    pub fn link_episode_debuts(mut self, enable: bool) -> Self {
        self.link_episode_debuts = Some(enable);
        self
    }

    pub fn build(self) -> LinkerConfig {
        let defaults = LinkerConfig::default();
        LinkerConfig {
            hidden_ability_policy: self
                .hidden_ability_policy
                .unwrap_or(defaults.hidden_ability_policy),
            link_move_types: self.link_move_types.unwrap_or(defaults.link_move_types),
            link_episode_debuts: self
                .link_episode_debuts
                .unwrap_or(defaults.link_episode_debuts),
        }
    }
}

// ============================================================================
// Linking
// ============================================================================

/// Result of resolving one candidate name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// Relationship added
    Linked { target: Term },
    /// Relationship was already present
    AlreadyLinked { target: Term },
    /// Target node created, then linked
    Minted { target: Term },
    /// No node of the expected class exists
    Unresolved { name: String },
    /// Rule skipped because the target class is not in the vocabulary
    UndeclaredClass { class: Term },
}

/// Resolve `names` for one subject
///
/// `reference` is the graph that proves a target exists; `None` checks the
/// graph being linked. Re-running on an already-linked graph adds nothing.
pub fn link(
    graph: &mut Graph,
    reference: Option<&Graph>,
    subject: &Term,
    predicate: &Term,
    names: &[String],
    target_class: EntityKind,
    policy: LinkPolicy,
) -> Vec<LinkOutcome> {
    let class = target_class.class();
    let mut outcomes = Vec::with_capacity(names.len());

    for name in names {
        if name.trim().is_empty() {
            continue;
        }
        // No URI can be minted for a name without a single ASCII letter or digit
        if to_uri_token(name).trim_matches('_').is_empty() {
            outcomes.push(LinkOutcome::Unresolved { name: name.clone() });
            continue;
        }
        let target = mint(target_class.namespace(), name);

        if graph.contains(subject, predicate, &target) {
            outcomes.push(LinkOutcome::AlreadyLinked { target });
            continue;
        }

        let in_reference = match reference {
            Some(reference) => reference.has_type(&target, &class),
            None => graph.has_type(&target, &class),
        };

        if in_reference {
            graph.insert(subject.clone(), predicate.clone(), target.clone());
            outcomes.push(LinkOutcome::Linked { target });
            continue;
        }

        match policy {
            LinkPolicy::MintIfMissing { also } => {
                // Minted on an earlier subject or run
                if graph.has_type(&target, &class) {
                    graph.insert(subject.clone(), predicate.clone(), target.clone());
                    outcomes.push(LinkOutcome::Linked { target });
                    continue;
                }
                graph.insert(target.clone(), rdf_type(), class.clone());
                if let Some(kind) = also {
                    graph.insert(target.clone(), rdf_type(), kind.class());
                }
                let label = strip_parenthetical(name);
                graph.insert(target.clone(), rdfs_label(), Term::plain(label.trim()));
                graph.insert(subject.clone(), predicate.clone(), target.clone());
                outcomes.push(LinkOutcome::Minted { target });
            }
            LinkPolicy::Strict => outcomes.push(LinkOutcome::Unresolved { name: name.clone() }),
        }
    }

    outcomes
}

// ============================================================================
// Report
// ============================================================================

/// Outcome counts for one rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCounts {
    pub linked: usize,
    pub already_linked: usize,
    pub minted: usize,
    pub unresolved: usize,
    pub undeclared: usize,
}

impl LinkCounts {
    fn add(&mut self, outcome: &LinkOutcome) {
        match outcome {
            LinkOutcome::Linked { .. } => self.linked += 1,
            LinkOutcome::AlreadyLinked { .. } => self.already_linked += 1,
            LinkOutcome::Minted { .. } => self.minted += 1,
            LinkOutcome::Unresolved { .. } => self.unresolved += 1,
            LinkOutcome::UndeclaredClass { .. } => self.undeclared += 1,
        }
    }

    fn merge(&mut self, other: &LinkCounts) {
        self.linked += other.linked;
        self.already_linked += other.already_linked;
        self.minted += other.minted;
        self.unresolved += other.unresolved;
        self.undeclared += other.undeclared;
    }
}

/// Summary of a linking pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkReport {
    pub totals: LinkCounts,
    pub by_rule: BTreeMap<String, LinkCounts>,

    /// Rules not run because a class is undeclared
    pub skipped_rules: Vec<String>,

    #[serde(skip)]
    pub audit: AuditLog,
}

impl LinkReport {
    pub fn rule(&self, name: &str) -> LinkCounts {
        self.by_rule.get(name).cloned().unwrap_or_default()
    }
}

/// Apply every rule to the graph
pub fn link_all(
    mut graph: Graph,
    rules: &[LinkRule],
    references: &References,
    vocabulary: &Vocabulary,
) -> (Graph, LinkReport) {
    let mut report = LinkReport::default();

    for rule in rules {
        let mut counts = LinkCounts::default();

        if let Some(class) = rule
            .required_classes()
            .into_iter()
            .find(|c| !vocabulary.is_declared(c))
        {
            let err = OntologyError::undeclared_class(class.as_iri().unwrap_or_default());
            tracing::warn!(rule = rule.name, error = %err, "Skipping link rule");
            report
                .audit
                .record(Stage::Link, AuditKind::UndeclaredClass, rule.name, err.to_string());
            counts.add(&LinkOutcome::UndeclaredClass { class });
            report.skipped_rules.push(rule.name.to_string());
            report.totals.merge(&counts);
            report.by_rule.insert(rule.name.to_string(), counts);
            continue;
        }

        let reference = references.get(rule.reference);
        let subjects: Vec<Term> = graph
            .subjects_of_type(&rule.source_class.class())
            .into_iter()
            .cloned()
            .collect();

        for subject in subjects {
            let names: Vec<String> = graph
                .objects(&subject, &rule.name_predicate)
                .filter_map(Term::literal_value)
                .map(str::to_string)
                .collect();
            if names.is_empty() {
                continue;
            }

            let outcomes = link(
                &mut graph,
                reference,
                &subject,
                &rule.predicate,
                &names,
                rule.target_class,
                rule.policy,
            );
            for outcome in &outcomes {
                counts.add(outcome);
                match outcome {
                    LinkOutcome::Unresolved { name } => {
                        tracing::warn!(
                            rule = rule.name,
                            subject = %subject,
                            name = %name,
                            "Reference not found"
                        );
                        report.audit.record(
                            Stage::Link,
                            AuditKind::UnresolvedReference,
                            subject.to_string(),
                            format!("{}: no {} named '{}'", rule.name, rule.target_class, name),
                        );
                    }
                    LinkOutcome::Minted { target } => {
                        tracing::debug!(rule = rule.name, target = %target, "Minted target node");
                    }
                    _ => {}
                }
            }
        }

        tracing::info!(
            rule = rule.name,
            linked = counts.linked,
            minted = counts.minted,
            unresolved = counts.unresolved,
            "Link rule applied"
        );
        report.totals.merge(&counts);
        report.by_rule.insert(rule.name.to_string(), counts);
    }

    (graph, report)
}
