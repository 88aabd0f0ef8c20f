//! Ideation CLI Commands
//!
//! ## Commands
//!
//! - `ideation cycle` - Generate, specify, assess, refine and store one batch of ideas
//! - `ideation phases` / `ideation phase <N>` - Run the phased rollout
//! - `ideation report` / `ideation plan` - Engine report and enhancement plan
//! - `ideation search|synergies|diversity` - Knowledge base queries
//! - `ideation review|impact-report|integrated` - Ethics and simulator workflows
//! - `ideation improve` - One continuous-improvement cycle
//! - `ideation research` - Analyze the queued paper and draft a community post

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use ideation_engine::report::render_future_plan;
use ideation_engine::{
    ChatCompletionClient, IdeationConfig, IdeationEngine, Phase, ResearchCoordinator,
};
use serde::Serialize;
use std::path::PathBuf;

/// Ideation engine for the Cities of Light
#[derive(Debug, Parser)]
#[command(name = "ideation", version)]
pub struct IdeationCli {
    /// Config file (default: $IDEATION_CONFIG or ~/.config/ideation/ideation.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Fixed RNG seed, overriding the config
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Output as JSON for automation
    #[arg(long, global = true)]
    pub json: bool,

    /// Print performance metrics after the command
    #[arg(long, global = true)]
    pub metrics: bool,

    #[command(subcommand)]
    pub command: IdeationSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum IdeationSubcommand {
    /// Generate ideas, export and refine their specifications, store them
    Cycle,

    /// Run phases 1 through 4
    Phases,

    /// Run a single phase
    Phase {
        /// Phase number
        #[arg(value_parser = clap::value_parser!(u8).range(1..=4))]
        number: u8,
    },

    /// Print the engine report
    Report,

    /// Print the future enhancement plan
    Plan,

    /// Generate idea strings
    Ideas {
        /// Number of ideas
        #[arg(long, short = 'n', default_value_t = 5)]
        count: usize,
    },

    /// One SCAMPER prompt per technique
    Creative,

    /// Feasibility, impact and resource estimate for a concept
    Assess { concept: String },

    /// Search stored concepts by name, purpose or tag
    Search { query: String },

    /// Concept pairs sharing more than one tag
    Synergies,

    /// Tag distribution and diversity score
    Diversity,

    /// Ethical review of a concept, persisted to the knowledge base
    Review { concept: String },

    /// Ethical review plus cultural and community assessments
    ImpactReport { concept: String },

    /// Ideas built from simulator trends, needs and layout
    Integrated,

    /// Suggest improvements, grow the vocabulary and adapt guidelines
    Improve,

    /// Analyze the queued research paper and write a community post
    Research,
}

impl IdeationCli {
    pub async fn run(self) -> anyhow::Result<()> {
        if let IdeationSubcommand::Plan = self.command {
            let plan = ideation_engine::FUTURE_ENHANCEMENTS;
            return if self.json {
                emit_json(&plan)
            } else {
                print!("{}", render_future_plan(&plan));
                Ok(())
            };
        }

        let cfg = self.load_config()?;

        if let IdeationSubcommand::Research = self.command {
            return run_research(&cfg).await;
        }

        let mut engine = IdeationEngine::with_config(cfg).context("failed to start engine")?;
        self.dispatch(&mut engine).await?;

        if self.metrics {
            if self.json {
                emit_json(engine.metrics())?;
            } else {
                println!("\nPerformance Metrics:");
                for line in engine.metrics().summary_lines() {
                    println!("  {line}");
                }
            }
        }
        Ok(())
    }

    fn load_config(&self) -> anyhow::Result<IdeationConfig> {
        let mut cfg = match &self.config {
            Some(path) => IdeationConfig::load_from_path(path)?,
            None => IdeationConfig::load()?,
        };
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }
        Ok(cfg)
    }

    async fn dispatch(&self, engine: &mut IdeationEngine) -> anyhow::Result<()> {
        match &self.command {
            IdeationSubcommand::Cycle => {
                let summary = engine.run_cycle()?;
                if self.json {
                    return emit_json(&summary);
                }
                for (idea, feasibility) in summary.ideas.iter().zip(&summary.feasibility) {
                    println!("{idea}");
                    println!("  feasibility: {feasibility:.2}");
                }
                println!("\nExported {} specification files", summary.exported.len());
            }
            IdeationSubcommand::Phases => {
                engine.run_phased_implementation()?;
                println!("Phased implementation completed");
            }
            IdeationSubcommand::Phase { number } => {
                let phase = Phase::from_number(*number)
                    .with_context(|| format!("no phase {number}"))?;
                engine.execute_phase(phase)?;
                println!("Phase {}: {} completed", phase.number(), phase.title());
            }
            IdeationSubcommand::Report => {
                print!("{}", engine.generate_report()?);
            }
            IdeationSubcommand::Ideas { count } => {
                let ideas = engine.generate_ideas(*count)?;
                self.emit_lines(&ideas)?;
            }
            IdeationSubcommand::Creative => {
                let prompts = engine.creative_problem_solving()?;
                self.emit_lines(&prompts)?;
            }
            IdeationSubcommand::Assess { concept } => {
                let feasibility = engine.assess_feasibility(concept)?;
                let impact = engine.estimate_impact(concept)?;
                let resources = engine.estimate_resource_requirements(concept)?;
                if self.json {
                    return emit_json(&serde_json::json!({
                        "feasibility": feasibility,
                        "impact": impact,
                        "resources": resources,
                    }));
                }
                println!("Feasibility: {:.2}", feasibility.overall);
                println!("  technical: {:.2}", feasibility.technical);
                println!("  resource:  {:.2}", feasibility.resource);
                println!("  ethical:   {:.2}", feasibility.ethical);
                println!("Impact: {impact:.2}");
                println!(
                    "Resources: {} computing power, {} GB storage, {} development weeks",
                    resources.computing_power, resources.storage_gb, resources.development_weeks
                );
            }
            IdeationSubcommand::Search { query } => {
                let hits = engine.search_concepts(query)?;
                if self.json {
                    return emit_json(&hits);
                }
                for hit in hits {
                    println!("[{}] {}: {}", hit.id, hit.name, hit.purpose);
                }
            }
            IdeationSubcommand::Synergies => {
                let synergies = engine.identify_synergies()?;
                if self.json {
                    return emit_json(&synergies);
                }
                for s in synergies {
                    println!("{} + {} ({} common tags)", s.first, s.second, s.shared_tags);
                }
            }
            IdeationSubcommand::Diversity => {
                let report = engine.check_diversity()?;
                if self.json {
                    return emit_json(&report);
                }
                println!("Diversity score: {:.3}", report.diversity_score);
                for tag in report.tag_distribution {
                    println!("  {}: {}", tag.tag, tag.concepts);
                }
            }
            IdeationSubcommand::Review { concept } => {
                let review = engine.conduct_ethical_review(concept)?;
                if self.json {
                    return emit_json(&review);
                }
                println!("Ethical Score: {:.2}", review.ethical_score);
                println!("Approval Status: {}", review.approval_status);
                for comment in &review.review_comments {
                    println!("- {comment}");
                }
            }
            IdeationSubcommand::ImpactReport { concept } => {
                let client = engine.collaborators().clone();
                let report = engine.generate_ethical_impact_report(concept, &client).await?;
                print!("{report}");
            }
            IdeationSubcommand::Integrated => {
                let client = engine.collaborators().clone();
                if !client.fully_connected() {
                    tracing::warn!("Not every simulator has an endpoint; set [collaborators] URLs");
                }
                let ideas = engine.generate_integrated_ideas(&client).await?;
                self.emit_lines(&ideas)?;
            }
            IdeationSubcommand::Improve => {
                let suggestion = engine.run_improvement_cycle()?;
                println!("{suggestion}");
            }
            IdeationSubcommand::Plan | IdeationSubcommand::Research => {
                bail!("command is handled before the engine starts")
            }
        }
        Ok(())
    }

    fn emit_lines(&self, lines: &[String]) -> anyhow::Result<()> {
        if self.json {
            return emit_json(&lines);
        }
        for line in lines {
            println!("{line}");
        }
        Ok(())
    }
}

fn emit_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_research(cfg: &IdeationConfig) -> anyhow::Result<()> {
    let Some(api_key) = cfg.llm.api_key() else {
        bail!(
            "{} is not set; add it to the environment or a .env file",
            cfg.llm.api_key_env
        );
    };

    let completions = ChatCompletionClient::with_api_key(&cfg.llm, Some(api_key))?;
    let research = ResearchCoordinator::new(
        &cfg.research,
        cfg.llm.call_timeout(),
        completions,
    )?;

    match research.process_paper().await {
        Some(post) => {
            println!("{post}");
            Ok(())
        }
        None => bail!("paper processing failed; see log for details"),
    }
}
