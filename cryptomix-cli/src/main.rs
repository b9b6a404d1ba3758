use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use cryptomix_core::{
    apply_variant, assign, classify_and_allocate, generate, Assignment, Experience,
    InvestableAmount, InvestorAnswers, Objective, RiskTolerance, ScenarioEngine, ScenarioSet,
};
use serde::Serialize;
use std::path::PathBuf;

mod config;
mod logging;
mod prices;
mod render;
mod state;

use config::{load_config, Config};
use prices::FilePriceLookup;
use state::{assignments_path, JsonAssignmentStore};

#[derive(Parser, Debug)]
#[command(
    name = "cryptomix",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("CRYPTOMIX_BUILD_SHA"), ")"),
    about = "Crypto allocation questionnaire and scenario analysis"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Questionnaire answers shared by the analysis commands
#[derive(Args, Debug, Clone)]
struct AnswerArgs {
    /// very-short | medium | long
    #[arg(long)]
    objective: String,

    /// low | medium | high
    #[arg(long)]
    risk: String,

    /// Bucket (under-1k, 1k-10k, 10k-50k, over-50k) or amount ($5,000, 5k)
    #[arg(long)]
    amount: Option<String>,

    /// beginner | intermediate | advanced
    #[arg(long, default_value = "beginner")]
    experience: String,
}

impl AnswerArgs {
    fn to_answers(&self) -> Result<InvestorAnswers> {
        let amount = match &self.amount {
            Some(a) => InvestableAmount::parse(a).with_context(|| format!("parsing --amount {a}"))?,
            None => InvestableAmount::None,
        };
        Ok(InvestorAnswers::new(
            Objective::from_token(&self.objective),
            RiskTolerance::from_token(&self.risk),
        )
        .with_amount(amount)
        .with_experience(Experience::from_token(&self.experience)))
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify answers into a tier, horizon and allocation
    Profile {
        #[command(flatten)]
        answers: AnswerArgs,

        /// Subject id; applies every configured experiment's assigned variant
        #[arg(long)]
        subject: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Generate and score the scenario set for the classified tier
    Scenarios {
        #[command(flatten)]
        answers: AnswerArgs,

        /// JSON price snapshot used for valuation context
        #[arg(long)]
        prices: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    /// Rank scenarios against each other
    Compare {
        #[command(flatten)]
        answers: AnswerArgs,

        /// Comma-separated scenario ids (default: all)
        #[arg(long, value_delimiter = ',')]
        ids: Vec<String>,

        #[arg(long)]
        json: bool,
    },

    /// Assign a subject to experiment variants and persist the result
    Assign {
        #[arg(long)]
        subject: String,

        /// Only this experiment (default: all configured)
        #[arg(long)]
        experiment: Option<String>,
    },

    /// Write a default ~/.cryptomix/config.toml
    InitConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = load_config()?;
    logging::init_logging(&logging::LoggingConfig::from_env(&cfg.logging.level))?;

    match cli.command {
        Command::Profile { answers, subject, json } => {
            run_profile(&cfg, &answers, subject.as_deref(), json)?;
        }

        Command::Scenarios { answers, prices, json } => {
            let set = scenarios_for(&answers, prices)?;
            if json {
                print_json(&set)?;
            } else {
                render::print_scenarios(&set);
            }
        }

        Command::Compare { answers, ids, json } => {
            let set = scenarios_for(&answers, None)?;
            let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
            let cmp = set
                .compare(&ids)
                .with_context(|| format!("available scenarios: {}", set.ids().join(", ")))?;
            if json {
                print_json(&cmp)?;
            } else {
                render::print_comparison(&cmp);
            }
        }

        Command::Assign { subject, experiment } => {
            let assignments = run_assign(&cfg, &subject, experiment.as_deref())?;
            if assignments.is_empty() {
                println!("{subject} is not enrolled in any experiment");
            }
            for a in &assignments {
                println!("{} -> {} ({})", a.experiment_id, a.variant, a.assigned_at.to_rfc3339());
            }
        }

        Command::InitConfig => {
            config::init_config()?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn scenarios_for(args: &AnswerArgs, prices: Option<PathBuf>) -> Result<ScenarioSet> {
    let answers = args.to_answers()?;
    let profile = classify_and_allocate(&answers);
    Ok(match prices {
        Some(path) => {
            if !path.exists() {
                bail!("price snapshot not found: {}", path.display());
            }
            ScenarioEngine::new(FilePriceLookup::new(path)).generate(profile.tier, &answers)
        }
        None => generate(profile.tier, &answers, None),
    })
}

fn run_assign(cfg: &Config, subject: &str, only: Option<&str>) -> Result<Vec<Assignment>> {
    if let Some(id) = only {
        if cfg.experiment(id).is_none() {
            bail!("unknown experiment: {id}");
        }
    }

    let mut store = JsonAssignmentStore::open(&assignments_path()?)?;
    let now = chrono::Utc::now();
    let mut out = Vec::new();

    for exp in cfg.experiments.iter().filter(|e| only.is_none_or(|id| e.id == id)) {
        if let Some(a) = assign(exp, subject, &mut store, now)
            .with_context(|| format!("assigning experiment {}", exp.id))?
        {
            out.push(a);
        }
    }

    store.save()?;
    Ok(out)
}

fn run_profile(cfg: &Config, args: &AnswerArgs, subject: Option<&str>, json: bool) -> Result<()> {
    let answers = args.to_answers()?;
    let mut profile = classify_and_allocate(&answers);

    let assignments = match subject {
        Some(s) => run_assign(cfg, s, None)?,
        None => Vec::new(),
    };
    for a in &assignments {
        let variant = cfg
            .experiment(&a.experiment_id)
            .and_then(|e| e.variant(&a.variant));
        match variant {
            Some(v) => profile = apply_variant(&profile, v),
            None => tracing::warn!(
                experiment = %a.experiment_id,
                variant = %a.variant,
                "stored variant no longer configured, skipping"
            ),
        }
    }

    if json {
        print_json(&profile)?;
    } else {
        render::print_profile(&profile, &assignments);
    }
    Ok(())
}
