//! Per-category graph builders
//!
//! Turns scraped records (JSON Lines, one record per line) into the
//! per-category graphs the merge consumes. Cross-references are written as raw
//! name literals (`ex:typeName`, `ex:abilityName`, ...) for the linker to
//! resolve against the reference graphs later.
//!
//! Numeric fields are typed only when their text parses; anything else is
//! omitted and reported, never defaulted.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::io::BufRead;
use std::path::{Path, PathBuf};

use super::error::{OntologyError, OntologyResult};
use super::graph::{Graph, Term};
use super::normalize::{mint, normalize, strip_parenthetical, to_uri_token, zero_pad, NDEX_WIDTH};
use super::stats::{AuditKind, AuditLog, Stage};
use super::vocab::{
    self, rdf_type, rdfs_label, EntityKind, Vocabulary, EP, EX, SCHEMA, XSD_ANY_URI, XSD_DATE,
    XSD_DECIMAL, XSD_INTEGER,
};

/// Date format used by the wiki's episode infoboxes
pub const RELEASE_DATE_FORMAT: &str = "%B %d, %Y";

// ============================================================================
// Records
// ============================================================================

/// Type or egg group
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamedRecord {
    pub name: String,
}

/// Ability with its per-generation effect texts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AbilityRecord {
    pub name: String,

    /// `Generation_III` style keys and other detail fields
    #[serde(default)]
    pub details: BTreeMap<String, String>,
}

/// Pokémon infobox
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PokemonRecord {
    pub name: String,
    pub jname: Option<String>,
    pub category: Option<String>,
    pub ndex: Option<String>,
    pub color: Option<String>,
    pub friendship: Option<String>,
    #[serde(alias = "height-m")]
    pub height: Option<String>,
    #[serde(alias = "weight-kg")]
    pub weight: Option<String>,
    #[serde(alias = "eggcycles")]
    pub hatchtime: Option<String>,
    #[serde(alias = "image_rdf")]
    pub image: Option<String>,
    pub types: Vec<String>,
    pub abilities: Vec<String>,
    #[serde(alias = "abilityd")]
    pub hidden_ability: Option<String>,
    pub egg_groups: Vec<String>,
}

/// Move table row
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub move_type: Option<String>,
    pub category: Option<String>,
    pub accuracy: Option<String>,
    pub power: Option<String>,
    pub pp: Option<String>,
    pub image: Option<String>,
}

/// Anime episode
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EpisodeRecord {
    #[serde(alias = "title")]
    pub name: String,
    pub episode_number: Option<String>,
    pub japan: Option<String>,
    pub united_states: Option<String>,
    pub image: Option<String>,
    pub animation: Option<String>,
    #[serde(alias = "animation_directors")]
    pub director: Option<String>,
    pub screenplay: Option<String>,
    pub storyboard: Option<String>,
    pub opening: Option<String>,
    pub ending: Option<String>,
    pub pokemon_debuts: Vec<String>,
}

/// Item, game or character infobox
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InfoboxRecord {
    pub name: String,
    pub image: Option<String>,
    pub attributes: BTreeMap<String, serde_json::Value>,
}

// ============================================================================
// Build context
// ============================================================================

/// Options for a build
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Normalized names of abilities that are hidden abilities
    pub hidden_abilities: BTreeSet<String>,
}

impl BuildOptions {
    /// Read a hidden-abilities listing (one name per line)
    pub fn with_hidden_listing<R: BufRead>(mut self, reader: R) -> OntologyResult<Self> {
        for line in reader.lines() {
            let line = line?;
            let name = normalize(&line);
            if !name.is_empty() {
                self.hidden_abilities.insert(name);
            }
        }
        Ok(self)
    }
}

/// Summary of a build
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildReport {
    pub kind: Option<EntityKind>,
    pub records_read: usize,
    pub records_skipped: usize,
    pub entities: usize,
    pub invalid_values: usize,
    pub triples: usize,

    #[serde(skip)]
    pub audit: AuditLog,
}

struct Builder<'a> {
    graph: Graph,
    options: &'a BuildOptions,
    report: BuildReport,
}

impl Builder<'_> {
    fn add(&mut self, subject: &Term, predicate: Term, object: Term) {
        self.graph.insert(subject.clone(), predicate, object);
    }

    fn add_text<S: AsRef<str>>(&mut self, subject: &Term, predicate: Term, value: Option<S>) {
        let Some(value) = value else {
            return;
        };
        let value = value.as_ref().trim();
        if !value.is_empty() {
            self.add(subject, predicate, Term::plain(value));
        }
    }

    fn add_typed(
        &mut self,
        subject: &Term,
        field: &str,
        predicate: Term,
        value: Option<&str>,
        parse: fn(&str) -> Option<Term>,
    ) {
        let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return;
        };
        match parse(raw) {
            Some(term) => self.add(subject, predicate, term),
            None => {
                tracing::debug!(
                    subject = %subject,
                    field,
                    value = raw,
                    "Omitting unparseable value"
                );
                self.report.invalid_values += 1;
                self.report.audit.record(
                    Stage::Build,
                    AuditKind::InvalidValue,
                    subject.to_string(),
                    format!("{field} = '{raw}'"),
                );
            }
        }
    }

    fn entity(&mut self, kind: EntityKind, name: &str) -> Option<Term> {
        let name = name.trim();
        if to_uri_token(name).trim_matches('_').is_empty() {
            tracing::warn!(kind = %kind, name, "Skipping record without a usable name");
            self.report.invalid_values += 1;
            self.report.audit.record(
                Stage::Build,
                AuditKind::InvalidValue,
                kind.to_string(),
                format!("name = '{name}'"),
            );
            return None;
        }
        let subject = mint(kind.namespace(), name);
        self.add(&subject, rdf_type(), kind.class());
        self.report.entities += 1;
        Some(subject)
    }
}

// ============================================================================
// Value parsing
// ============================================================================

/// `xsd:integer` for an all-digit value
pub fn integer_literal(value: &str) -> Option<Term> {
    let value = value.trim();
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let n: u64 = value.parse().ok()?;
    Some(Term::typed(n.to_string(), XSD_INTEGER))
}

/// `xsd:decimal` for a finite number
pub fn decimal_literal(value: &str) -> Option<Term> {
    let value = value.trim();
    let n: f64 = value.parse().ok()?;
    n.is_finite().then(|| Term::typed(value, XSD_DECIMAL))
}

/// `xsd:date` for a `"%B %d, %Y"` release date
pub fn date_literal(value: &str) -> Option<Term> {
    let date = NaiveDate::parse_from_str(value.trim(), RELEASE_DATE_FORMAT).ok()?;
    Some(Term::typed(date.format("%Y-%m-%d").to_string(), XSD_DATE))
}

/// Move accuracy: percentage as integer, anything else is `"unlimited"`
pub fn accuracy_literal(value: &str) -> Term {
    integer_literal(&value.replace('%', "")).unwrap_or_else(|| Term::plain("unlimited"))
}

// ============================================================================
// Per-kind graph construction
// ============================================================================

trait Record: DeserializeOwned {
    fn describe(&self, builder: &mut Builder<'_>);
}

fn describe_named(record: &NamedRecord, kind: EntityKind, builder: &mut Builder<'_>) {
    if let Some(subject) = builder.entity(kind, &record.name) {
        builder.add_text(&subject, rdfs_label(), Some(&record.name));
    }
}

impl Record for AbilityRecord {
    fn describe(&self, builder: &mut Builder<'_>) {
        let Some(subject) = builder.entity(EntityKind::Ability, &self.name) else {
            return;
        };
        builder.add_text(&subject, rdfs_label(), Some(&self.name));
        if builder.options.hidden_abilities.contains(&normalize(&self.name)) {
            builder.add(&subject, rdf_type(), EntityKind::HiddenAbility.class());
        }
        for (key, value) in &self.details {
            builder.add_text(&subject, SCHEMA.term(&to_uri_token(key)), Some(value));
        }
    }
}

impl Record for PokemonRecord {
    fn describe(&self, builder: &mut Builder<'_>) {
        let Some(subject) = builder.entity(EntityKind::Pokemon, &self.name) else {
            return;
        };
        builder.add_text(&subject, rdfs_label(), Some(&self.name));
        builder.add_text(&subject, EX.term("jname"), self.jname.as_deref());
        builder.add_text(&subject, EX.term("category"), self.category.as_deref());
        builder.add_text(&subject, EX.term("color"), self.color.as_deref());
        builder.add_text(&subject, EX.term("hatchtime"), self.hatchtime.as_deref());
        if let Some(ndex) = self.ndex.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            builder.add(&subject, vocab::ndex(), Term::plain(zero_pad(ndex, NDEX_WIDTH)));
        }
        let measures = [
            ("friendship", &self.friendship, integer_literal as fn(&str) -> Option<Term>),
            ("height", &self.height, decimal_literal),
            ("weight", &self.weight, decimal_literal),
        ];
        for (field, value, parse) in measures {
            builder.add_typed(&subject, field, EX.term(field), value.as_deref(), parse);
        }
        if let Some(image) = self.image.as_deref().map(str::trim).filter(|i| !i.is_empty()) {
            builder.add(&subject, EX.term("hasImage"), Term::typed(image, XSD_ANY_URI));
        }

        for name in &self.types {
            builder.add_text(&subject, vocab::type_name(), Some(name));
        }
        for name in &self.abilities {
            builder.add_text(&subject, vocab::ability_name(), Some(name));
        }
        builder.add_text(&subject, vocab::hidden_ability_name(), self.hidden_ability.as_deref());
        for name in &self.egg_groups {
            builder.add_text(&subject, vocab::egg_group_name(), Some(name));
        }
    }
}

impl Record for MoveRecord {
    fn describe(&self, builder: &mut Builder<'_>) {
        let Some(subject) = builder.entity(EntityKind::Move, &self.name) else {
            return;
        };
        builder.add_text(&subject, rdfs_label(), Some(&self.name));
        builder.add_text(&subject, vocab::type_name(), self.move_type.as_deref());
        builder.add_text(&subject, SCHEMA.term("category"), self.category.as_deref());
        if let Some(accuracy) = self.accuracy.as_deref() {
            builder.add(&subject, SCHEMA.term("accuracy"), accuracy_literal(accuracy));
        }
        for (field, value) in [("power", &self.power), ("pp", &self.pp)] {
            let predicate = SCHEMA.term(field);
            builder.add_typed(&subject, field, predicate, value.as_deref(), integer_literal);
        }
        builder.add_text(&subject, SCHEMA.term("image"), self.image.as_deref());
    }
}

impl Record for EpisodeRecord {
    fn describe(&self, builder: &mut Builder<'_>) {
        let Some(subject) = builder.entity(EntityKind::Episode, &self.name) else {
            return;
        };
        builder.add_text(&subject, EP.term("hasTitle"), Some(&self.name));
        builder.add_text(&subject, EP.term("hasEpisodeNumber"), self.episode_number.as_deref());
        let releases = [
            ("japan", "hasJapanReleaseDate", &self.japan),
            ("united_states", "hasUSReleaseDate", &self.united_states),
        ];
        for (field, local, value) in releases {
            builder.add_typed(&subject, field, EP.term(local), value.as_deref(), date_literal);
        }

        let credits = [
            ("hasImage", &self.image),
            ("hasAnimation", &self.animation),
            ("hasDirector", &self.director),
            ("hasScreenplay", &self.screenplay),
            ("hasStoryboard", &self.storyboard),
            ("hasOpening", &self.opening),
            ("hasEnding", &self.ending),
        ];
        for (predicate, value) in credits {
            builder.add_text(&subject, EP.term(predicate), value.as_deref());
        }

        for debut in &self.pokemon_debuts {
            let name = strip_parenthetical(debut);
            builder.add_text(&subject, vocab::debut_name(), Some(&name));
        }
    }
}

fn describe_infobox(record: &InfoboxRecord, kind: EntityKind, builder: &mut Builder<'_>) {
    let Some(subject) = builder.entity(kind, &record.name) else {
        return;
    };
    builder.add_text(&subject, rdfs_label(), Some(&record.name));
    builder.add_text(&subject, SCHEMA.term("image"), record.image.as_deref());

    for (key, value) in &record.attributes {
        let predicate = SCHEMA.term(&to_uri_token(key));
        match value {
            serde_json::Value::String(s) => builder.add_text(&subject, predicate, Some(s)),
            serde_json::Value::Array(values) => {
                for v in values.iter().filter_map(scalar_text) {
                    builder.add_text(&subject, predicate.clone(), Some(&v));
                }
            }
            serde_json::Value::Object(fields) => {
                for (sub_key, v) in fields {
                    if let Some(text) = scalar_text(v) {
                        let predicate = SCHEMA.term(&to_uri_token(sub_key));
                        builder.add_text(&subject, predicate, Some(&text));
                    }
                }
            }
            other => {
                if let Some(text) = scalar_text(other) {
                    builder.add_text(&subject, predicate, Some(&text));
                }
            }
        }
    }
}

fn scalar_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// ============================================================================
// Entry points
// ============================================================================

fn read_records<R, T, F>(reader: R, source: &Path, builder: &mut Builder<'_>, mut describe: F)
where
    R: BufRead,
    T: DeserializeOwned,
    F: FnMut(&T, &mut Builder<'_>),
{
    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let parsed = line
            .map_err(|e| e.to_string())
            .and_then(|l| {
                if l.trim().is_empty() {
                    Ok(None)
                } else {
                    serde_json::from_str::<T>(&l).map(Some).map_err(|e| e.to_string())
                }
            });
        match parsed {
            Ok(Some(record)) => {
                builder.report.records_read += 1;
                describe(&record, builder);
            }
            Ok(None) => {}
            Err(reason) => {
                let err = OntologyError::RecordParseFailed {
                    path: source.to_path_buf(),
                    line: line_no,
                    reason,
                };
                tracing::warn!(error = %err, "Skipping record");
                builder.report.records_skipped += 1;
                builder.report.audit.record(
                    Stage::Build,
                    AuditKind::ParseFailed,
                    format!("{}:{line_no}", source.display()),
                    err.to_string(),
                );
            }
        }
    }
}

fn read_kind<R: BufRead, T: Record>(reader: R, source: &Path, builder: &mut Builder<'_>) {
    read_records(reader, source, builder, |record: &T, b| record.describe(b));
}

/// Build the graph for one category of records
///
/// Fails with [`OntologyError::UndeclaredClass`] when a vocabulary is loaded
/// and does not declare the category's class.
pub fn build_records<R: BufRead>(
    kind: EntityKind,
    reader: R,
    source: &Path,
    vocabulary: &Vocabulary,
    options: &BuildOptions,
) -> OntologyResult<(Graph, BuildReport)> {
    let mut required = vec![kind.class()];
    if kind == EntityKind::Ability {
        required.push(EntityKind::HiddenAbility.class());
    }
    if let Some(missing) = required.iter().find(|c| !vocabulary.is_declared(c)) {
        return Err(OntologyError::undeclared_class(missing.as_iri().unwrap_or_default()));
    }

    let mut builder = Builder {
        graph: Graph::new(),
        options,
        report: BuildReport {
            kind: Some(kind),
            ..Default::default()
        },
    };

    match kind {
        EntityKind::PokemonType | EntityKind::EggGroup => {
            read_records(reader, source, &mut builder, |record: &NamedRecord, b| {
                describe_named(record, kind, b)
            })
        }
        EntityKind::Ability => read_kind::<_, AbilityRecord>(reader, source, &mut builder),
        EntityKind::Pokemon => read_kind::<_, PokemonRecord>(reader, source, &mut builder),
        EntityKind::Move => read_kind::<_, MoveRecord>(reader, source, &mut builder),
        EntityKind::Episode => read_kind::<_, EpisodeRecord>(reader, source, &mut builder),
        EntityKind::Item | EntityKind::Game | EntityKind::Character => {
            read_records(reader, source, &mut builder, |record: &InfoboxRecord, b| {
                describe_infobox(record, kind, b)
            })
        }
        EntityKind::HiddenAbility => {
            return Err(OntologyError::UnknownEntityKind {
                value: "hidden ability records are built as abilities".to_string(),
            })
        }
    }

    let Builder { graph, mut report, .. } = builder;
    report.triples = graph.len();
    tracing::info!(
        kind = %kind,
        records = report.records_read,
        skipped = report.records_skipped,
        triples = report.triples,
        "Built category graph"
    );
    Ok((graph, report))
}

/// Build from a JSON Lines file
pub fn build_file(
    kind: EntityKind,
    path: &Path,
    vocabulary: &Vocabulary,
    options: &BuildOptions,
) -> OntologyResult<(Graph, BuildReport)> {
    let file = std::fs::File::open(path)
        .map_err(|e| OntologyError::io_error("open records", Some(PathBuf::from(path)), e))?;
    build_records(kind, std::io::BufReader::new(file), path, vocabulary, options)
}
