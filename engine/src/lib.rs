//! Ideation engine for the Cities of Light
//!
//! Generates technology-concept strings, scores them with simple heuristics,
//! refines their specifications through three synthetic feedback panels and
//! keeps them in a SQLite knowledge base whose tag graph drives synergy and
//! diversity analysis.
//!
//! The engine owns every piece of mutable state: the knowledge base, the
//! vocabulary, one seeded RNG, the performance metrics, the city insights
//! and the continuous-improvement advisor. City simulators and the
//! completion API are reached through async client traits.

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod advisor;
pub mod collaborators;
pub mod config;
pub mod errors;
pub mod feedback;
pub mod ideas;
pub mod insights;
pub mod knowledge_store;
pub mod llm;
pub mod metrics;
pub mod report;
pub mod research;
pub mod review;
pub mod scoring;
pub mod specification;
pub mod synergy;
pub mod vocabulary;

pub use advisor::{Advisor, KMeans};
pub use collaborators::{
    CityLayout, CityLightClient, CommunityFeedback, CulturalImpact, HttpCityLightClient,
    SpatialImpact,
};
pub use config::IdeationConfig;
pub use errors::{ErrorCategory, IdeationError, Result};
pub use insights::{CityInsights, SurveyResponse};
pub use knowledge_store::{ConceptSummary, KnowledgeStore, StoredReview, Synergy, TagCount};
pub use llm::{ChatCompletionClient, CompletionClient};
pub use metrics::PerformanceMetrics;
pub use report::{Enhancement, FUTURE_ENHANCEMENTS, Phase};
pub use research::ResearchCoordinator;
pub use review::{ApprovalStatus, EthicalReview};
pub use scoring::{FeasibilityScores, ResourceEstimate};
pub use specification::Specification;
pub use synergy::DiversityReport;
pub use vocabulary::Vocabulary;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Ideation engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Endpoints used by the integration phase when none are configured
pub const DEFAULT_CULTURAL_EVOLUTION_URL: &str = "http://cultural-evolution-simulator.com";
pub const DEFAULT_COMMUNITY_COHESION_URL: &str = "http://community-cohesion-network.com";
pub const DEFAULT_CARTOGRAPHER_URL: &str = "http://cartographer-of-light.com";

/// Outcome of one generate / specify / assess / refine cycle
#[derive(Debug, Clone, Serialize)]
pub struct CycleSummary {
    pub ideas: Vec<String>,
    /// Overall feasibility per idea, in idea order
    pub feasibility: Vec<f64>,
    /// Distinct specification files written; a refined export replaces the
    /// initial file of the same concept
    pub exported: Vec<PathBuf>,
    /// Knowledge base ids of the refined concepts
    pub stored: Vec<i64>,
}

/// Main entry point for ideation operations
pub struct IdeationEngine {
    cfg: IdeationConfig,
    store: KnowledgeStore,
    vocab: Vocabulary,
    rng: StdRng,
    metrics: PerformanceMetrics,
    insights: CityInsights,
    advisor: Advisor,
    collaborators: HttpCityLightClient,
    /// Next phase `run_phased_implementation` would execute
    current_phase: u8,
}

impl IdeationEngine {
    /// Create a new engine, loading config and opening the knowledge base
    pub fn new() -> Result<Self> {
        let cfg = IdeationConfig::load()?;
        Self::with_config(cfg)
    }

    /// Create an engine with a specific config
    pub fn with_config(cfg: IdeationConfig) -> Result<Self> {
        let store = KnowledgeStore::connect_and_init(&cfg)?;

        tracing::info!(
            version = VERSION,
            db_path = %cfg.resolved_db_path().display(),
            seeded = cfg.seed.is_some(),
            "Ideation engine initialized"
        );

        Self::with_store(cfg, store)
    }

    /// Create an engine backed by an in-memory knowledge base
    pub fn in_memory(cfg: IdeationConfig) -> Result<Self> {
        let store = KnowledgeStore::connect_in_memory()?;
        Self::with_store(cfg, store)
    }

    pub fn with_store(cfg: IdeationConfig, store: KnowledgeStore) -> Result<Self> {
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let collaborators = HttpCityLightClient::new(&cfg.collaborators)?;
        let advisor = Advisor::new(cfg.advisor.initial_step_size);

        Ok(Self {
            cfg,
            store,
            vocab: Vocabulary::default(),
            rng,
            metrics: PerformanceMetrics::new(),
            insights: CityInsights::new(),
            advisor,
            collaborators,
            current_phase: 1,
        })
    }

    pub fn config(&self) -> &IdeationConfig {
        &self.cfg
    }

    pub fn store(&self) -> &KnowledgeStore {
        &self.store
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn vocabulary_mut(&mut self) -> &mut Vocabulary {
        &mut self.vocab
    }

    pub fn metrics(&self) -> &PerformanceMetrics {
        &self.metrics
    }

    pub fn advisor(&self) -> &Advisor {
        &self.advisor
    }

    pub fn collaborators(&self) -> &HttpCityLightClient {
        &self.collaborators
    }

    pub fn current_phase(&self) -> u8 {
        self.current_phase
    }

    fn build(&mut self, concept: &str) -> Result<Specification> {
        specification::build_specification(concept, &self.vocab, &mut self.rng)
    }

    fn first_concept(&self) -> Result<String> {
        self.vocab
            .concepts
            .first()
            .cloned()
            .ok_or(IdeationError::InsufficientVocabulary {
                catalog: "concepts",
                requested: 1,
                available: 0,
            })
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Generation and specification
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn generate_ideas(&mut self, count: usize) -> Result<Vec<String>> {
        tracked!(self.metrics, "generate_ideas", {
            let ideas = ideas::generate_ideas(&self.vocab, count, &mut self.rng)?;
            self.metrics.record_ideas(ideas.len());
            Ok(ideas)
        })
    }

    /// One SCAMPER prompt per technique
    pub fn creative_problem_solving(&mut self) -> Result<Vec<String>> {
        tracked!(
            self.metrics,
            "creative_problem_solving",
            ideas::creative_problem_solving(&self.vocab, &mut self.rng)
        )
    }

    pub fn develop_specification(&mut self, concept: &str) -> Result<Specification> {
        tracked!(self.metrics, "develop_specification", {
            let spec = self.build(concept)?;
            self.metrics.record_specification();
            Ok(spec)
        })
    }

    /// Export `spec` as JSON under the specs directory; returns the file path
    pub fn save_specification(&self, spec: &Specification) -> Result<PathBuf> {
        let path = specification::export_path(&self.cfg.resolved_specs_dir(), &spec.name);
        specification::save_specification(spec, &path)?;
        Ok(path)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Scoring
    // ─────────────────────────────────────────────────────────────────────────────

    /// Feasibility of a fresh specification for `concept`
    pub fn assess_feasibility(&mut self, concept: &str) -> Result<FeasibilityScores> {
        tracked!(self.metrics, "assess_feasibility", {
            let spec = self.build(concept)?;
            let scores = scoring::assess_feasibility(&spec);
            self.metrics.record_feasibility(scores.overall);
            Ok(scores)
        })
    }

    /// Impact of a fresh specification for `concept`
    pub fn estimate_impact(&mut self, concept: &str) -> Result<f64> {
        tracked!(self.metrics, "estimate_impact", {
            let spec = self.build(concept)?;
            let impact = scoring::estimate_impact(&spec);
            self.metrics.record_impact(impact);
            Ok(impact)
        })
    }

    pub fn estimate_resource_requirements(&mut self, concept: &str) -> Result<ResourceEstimate> {
        tracked!(self.metrics, "estimate_resource_requirements", {
            let spec = self.build(concept)?;
            Ok(scoring::estimate_resources(&spec))
        })
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Refinement and review
    // ─────────────────────────────────────────────────────────────────────────────

    /// Fresh specification refined through the configured number of panel rounds
    pub fn refine_concept(&mut self, concept: &str) -> Result<Specification> {
        tracked!(self.metrics, "refine_concept", {
            let mut spec = self.build(concept)?;
            feedback::refine_specification(
                &mut spec,
                self.cfg.refinement.rounds,
                &self.vocab,
                &mut self.rng,
            )?;
            self.metrics.record_refinement();
            Ok(spec)
        })
    }

    /// Review a fresh specification and persist the outcome
    ///
    /// A concept that isn't stored yet is added with the reviewed specification.
    pub fn conduct_ethical_review(&mut self, concept: &str) -> Result<EthicalReview> {
        tracked!(self.metrics, "conduct_ethical_review", {
            self.review_and_record(concept).map(|(_, review)| review)
        })
    }

    fn review_and_record(&mut self, concept: &str) -> Result<(Specification, EthicalReview)> {
        let spec = self.build(concept)?;
        let review = review::review_specification(
            &spec,
            &self.vocab,
            self.cfg.review.approval_threshold,
            &mut self.rng,
        )?;

        let concept_id = match self.store.find_concept_id(concept)? {
            Some(id) => id,
            None => self.store.add_concept(concept, &spec)?,
        };
        self.store
            .record_review(concept_id, &review.review_comments, review.approval_status)?;
        self.metrics.record_review();

        tracing::info!(
            concept_id,
            score = review.ethical_score,
            status = review.approval_status.as_str(),
            "Ethical review recorded"
        );
        Ok((spec, review))
    }

    /// Insert or overwrite ethical guidelines
    pub fn update_ethical_guidelines<I, K, D>(&mut self, updates: I)
    where
        I: IntoIterator<Item = (K, D)>,
        K: Into<String>,
        D: Into<String>,
    {
        self.vocab.update_guidelines(updates);
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Knowledge base
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn add_concept(&mut self, concept: &str, spec: &Specification) -> Result<i64> {
        tracked!(
            self.metrics,
            "add_concept",
            self.store.add_concept(concept, spec)
        )
    }

    pub fn search_concepts(&mut self, query: &str) -> Result<Vec<ConceptSummary>> {
        tracked!(self.metrics, "search_concepts", self.store.search(query))
    }

    /// Strongest co-tagged concept pairs, up to the configured limit
    pub fn identify_synergies(&mut self) -> Result<Vec<Synergy>> {
        let limit = self.cfg.synergy.limit;
        tracked!(self.metrics, "identify_synergies", self.store.synergies(limit))
    }

    pub fn check_diversity(&mut self) -> Result<DiversityReport> {
        tracked!(self.metrics, "check_diversity", {
            let report = DiversityReport::from_distribution(self.store.tag_distribution()?);
            self.metrics.record_diversity(report.diversity_score);
            Ok(report)
        })
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // City insights
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn monitor_city_metrics(&mut self, metrics: BTreeMap<String, f64>) {
        self.insights.monitor_city_metrics(metrics);
    }

    pub fn conduct_survey(&mut self, responses: impl IntoIterator<Item = SurveyResponse>) {
        self.insights.conduct_survey(responses);
    }

    pub fn analyze_trends(&self) -> Vec<String> {
        self.insights.analyze_trends()
    }

    pub fn analyze_needs(&self) -> Vec<String> {
        self.insights.analyze_needs()
    }

    pub fn identify_capability_gaps(&self) -> Vec<String> {
        self.insights.identify_capability_gaps(&self.vocab.concepts)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Collaborators
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn connect_to_cultural_evolution_simulator(&mut self, endpoint: impl Into<String>) {
        self.collaborators
            .connect_to_cultural_evolution_simulator(endpoint);
    }

    pub fn connect_to_community_cohesion_network(&mut self, endpoint: impl Into<String>) {
        self.collaborators.connect_to_community_cohesion_network(endpoint);
    }

    pub fn connect_to_cartographer_of_light(&mut self, endpoint: impl Into<String>) {
        self.collaborators.connect_to_cartographer_of_light(endpoint);
    }

    /// Ideas built from simulator trends, needs and layout
    ///
    /// Empty when any of the three is unavailable.
    pub async fn generate_integrated_ideas<C>(&mut self, client: &C) -> Result<Vec<String>>
    where
        C: CityLightClient + ?Sized,
    {
        let (trends, needs, layout) = tracked_async!(self.metrics, "fetch_city_context", async {
            (
                collaborators::degrade("cultural_trends", client.cultural_trends().await),
                collaborators::degrade("community_needs", client.community_needs().await),
                collaborators::degrade("city_layout", client.city_layout().await),
            )
        });

        let (Some(trends), Some(needs), Some(layout)) = (trends, needs, layout) else {
            tracing::info!("City context incomplete, no integrated ideas");
            return Ok(Vec::new());
        };

        let ideas = ideas::integrated_ideas(
            &self.vocab,
            &trends,
            &needs,
            &layout.areas,
            &mut self.rng,
        )?;
        self.metrics.record_ideas(ideas.len());
        Ok(ideas)
    }

    /// Ethical review of `concept` plus cultural impact and community feedback
    pub async fn generate_ethical_impact_report<C>(
        &mut self,
        concept: &str,
        client: &C,
    ) -> Result<String>
    where
        C: CityLightClient + ?Sized,
    {
        let (spec, review) = tracked!(
            self.metrics,
            "conduct_ethical_review",
            self.review_and_record(concept)
        )?;

        let (cultural, community) = tracked_async!(self.metrics, "submit_for_assessment", async {
            (
                collaborators::degrade(
                    "assess_cultural_impact",
                    client.assess_cultural_impact(concept).await,
                ),
                collaborators::degrade(
                    "community_feedback",
                    client.community_feedback(concept).await,
                ),
            )
        });

        Ok(report::render_ethical_impact_report(
            concept,
            &spec,
            &review,
            cultural.as_ref(),
            community.as_ref(),
        ))
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Reports and phases
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn generate_report(&mut self) -> Result<String> {
        let ideas = self.generate_ideas(self.cfg.generation.report_ideas)?;
        let gaps = self.identify_capability_gaps();
        let synergies = self.store.synergies(self.cfg.synergy.report_limit)?;
        Ok(report::render_engine_report(
            &self.vocab.concepts,
            &ideas,
            &gaps,
            &synergies,
        ))
    }

    pub fn plan_future_enhancements(&self) -> &'static [Enhancement] {
        &FUTURE_ENHANCEMENTS
    }

    pub fn execute_phase(&mut self, phase: Phase) -> Result<()> {
        tracing::info!(phase = phase.number(), title = phase.title(), "Executing phase");

        match phase {
            Phase::CoreDevelopment => {
                self.generate_ideas(10)?;
                let concept = self.first_concept()?;
                self.develop_specification(&concept)?;
                self.assess_feasibility(&concept)?;
            }
            Phase::Integration => {
                let urls = self.cfg.collaborators.clone();
                self.connect_to_cultural_evolution_simulator(
                    urls.cultural_evolution_url
                        .unwrap_or_else(|| DEFAULT_CULTURAL_EVOLUTION_URL.to_string()),
                );
                self.connect_to_community_cohesion_network(
                    urls.community_cohesion_url
                        .unwrap_or_else(|| DEFAULT_COMMUNITY_COHESION_URL.to_string()),
                );
                self.connect_to_cartographer_of_light(
                    urls.cartographer_url
                        .unwrap_or_else(|| DEFAULT_CARTOGRAPHER_URL.to_string()),
                );
            }
            Phase::CollaborativeRefinement => {
                let concept = self.first_concept()?;
                self.refine_concept(&concept)?;
                self.conduct_ethical_review(&concept)?;
            }
            Phase::Deployment => {
                let ideas = self.generate_ideas(self.cfg.generation.ideas_per_cycle)?;
                for idea in &ideas {
                    self.develop_specification(idea)?;
                    self.assess_feasibility(idea)?;
                    self.estimate_impact(idea)?;
                    let refined = self.refine_concept(idea)?;
                    self.add_concept(idea, &refined)?;
                    self.conduct_ethical_review(idea)?;
                }
                self.check_diversity()?;
                self.run_improvement_cycle()?;
            }
        }

        Ok(())
    }

    /// Execute phases 1 through 4 in order
    pub fn run_phased_implementation(&mut self) -> Result<()> {
        for phase in Phase::ALL {
            self.execute_phase(phase)?;
            self.current_phase = phase.number() + 1;
            tracing::info!(phase = phase.number(), "Completed phase");
        }
        tracing::info!("Phased implementation completed");
        Ok(())
    }

    /// Generate ideas, export their specifications, score them, then refine,
    /// re-export and store each one
    pub fn run_cycle(&mut self) -> Result<CycleSummary> {
        let ideas = self.generate_ideas(self.cfg.generation.ideas_per_cycle)?;
        let mut exported: Vec<PathBuf> = Vec::with_capacity(ideas.len());

        for idea in &ideas {
            let spec = self.develop_specification(idea)?;
            let path = self.save_specification(&spec)?;
            if !exported.contains(&path) {
                exported.push(path);
            }
        }

        let mut feasibility = Vec::with_capacity(ideas.len());
        for idea in &ideas {
            let scores = self.assess_feasibility(idea)?;
            tracing::info!(concept = %idea, feasibility = scores.overall, "Assessed concept");
            feasibility.push(scores.overall);
        }

        let mut stored = Vec::with_capacity(ideas.len());
        for idea in &ideas {
            let refined = self.refine_concept(idea)?;
            self.save_specification(&refined)?;
            stored.push(self.add_concept(idea, &refined)?);
        }

        tracing::info!(ideas = ideas.len(), "Ideation cycle completed");
        Ok(CycleSummary {
            ideas,
            feasibility,
            exported,
            stored,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Continuous improvement
    // ─────────────────────────────────────────────────────────────────────────────

    /// Record current performance, then cluster a fresh batch of ideas and
    /// name the least-populated cluster
    pub fn suggest_improvements(&mut self) -> Result<String> {
        tracked!(self.metrics, "suggest_improvements", {
            self.advisor
                .record_performance(self.metrics.overall_performance());

            let batch =
                ideas::generate_ideas(&self.vocab, self.cfg.advisor.batch_size, &mut self.rng)?;
            self.metrics.record_ideas(batch.len());

            let vectors = advisor::vectorize_ideas(&batch);
            let mut kmeans = KMeans::new(self.cfg.advisor.clusters);
            kmeans.fit(&vectors, &mut self.rng);
            let cluster = kmeans.least_populated();

            Ok(format!("Focus on exploring ideas similar to cluster {cluster}"))
        })
    }

    /// Fold new ideas into the vocabulary; prune the least-searched concepts
    /// once it grows past the configured maximum
    pub fn update_knowledge_base(&mut self) -> Result<()> {
        tracked!(self.metrics, "update_knowledge_base", {
            let new_concepts = ideas::generate_ideas(
                &self.vocab,
                self.cfg.advisor.vocabulary_growth,
                &mut self.rng,
            )?;
            self.metrics.record_ideas(new_concepts.len());
            self.vocab.concepts.extend(new_concepts);

            if self.vocab.concepts.len() > self.cfg.advisor.max_vocabulary {
                let mut usage = Vec::with_capacity(self.vocab.concepts.len());
                for concept in &self.vocab.concepts {
                    usage.push((self.store.search(concept)?.len(), concept.clone()));
                }
                // Stable: equally unused concepts go oldest first
                usage.sort_by_key(|(hits, _)| *hits);

                let pruned: Vec<String> = usage
                    .into_iter()
                    .take(self.cfg.advisor.prune_count)
                    .map(|(_, c)| c)
                    .collect();
                for concept in &pruned {
                    if let Some(pos) = self.vocab.concepts.iter().position(|c| c == concept) {
                        self.vocab.concepts.remove(pos);
                    }
                }
                tracing::info!(
                    pruned = pruned.len(),
                    remaining = self.vocab.concepts.len(),
                    "Pruned least-used concepts"
                );
            }
            Ok(())
        })
    }

    /// Add the guideline a "more diverse" / "more practical" request asks for
    ///
    /// Returns the key of the guideline added, if any.
    pub fn adapt_to_feedback(&mut self, feedback: &str) -> Option<&'static str> {
        let (key, description) = advisor::adaptation_for(feedback)?;
        self.vocab.update_guidelines([(key, description)]);
        tracing::info!(guideline = key, "Adapted guidelines to feedback");
        Some(key)
    }

    pub fn run_improvement_cycle(&mut self) -> Result<String> {
        let suggestion = self.suggest_improvements()?;
        self.update_knowledge_base()?;
        self.adapt_to_feedback(&suggestion);
        Ok(suggestion)
    }
}
