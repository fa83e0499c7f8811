//! Kairos - renewal intelligence CLI
//!
//! Inspects the demo account catalog, shows per-question signal tiers,
//! renders filtered agent context blocks, and runs ad hoc collaborator
//! analyses against live accounts.

use clap::{Parser, Subcommand};
use kairos_core::{
    classify::tier_for,
    error::Result,
    filter::partition,
    types::QuestionId,
    AccountCatalog, Collaborator, Session,
};
use tracing::{debug, Level};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(name = "kairos")]
#[command(about = "Renewal intelligence: signal filtering and context assembly", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Set log level
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// Load the account catalog from a JSON file instead of the embedded set
    #[arg(long)]
    catalog: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the accounts in the catalog
    Accounts,

    /// Show every observation with its tier under each catalog question
    Signals {
        /// Account id
        #[arg(short, long)]
        account: String,
    },

    /// Render the filtered agent context block for a question
    Context {
        /// Account id
        #[arg(short, long)]
        account: String,

        /// Question id (churn, expansion, seats, features)
        #[arg(short, long)]
        question: String,
    },

    /// Show the intelligence brief for a question
    Brief {
        /// Account id
        #[arg(short, long)]
        account: String,

        /// Question id (churn, expansion, seats, features)
        #[arg(short, long)]
        question: String,

        /// Emit the brief as JSON
        #[arg(long)]
        json: bool,
    },

    /// Ask a free-text question (requires ANTHROPIC_API_KEY)
    Ask {
        /// Account id
        #[arg(short, long)]
        account: String,

        /// The question text
        question: String,
    },
}

fn parse_question(s: &str) -> Result<QuestionId> {
    QuestionId::from_name(s)
        .filter(|q| !q.is_custom())
        .ok_or_else(|| {
            kairos_core::KairosError::Validation(format!(
                "unknown question '{}' (expected churn, expansion, seats, features)",
                s
            ))
        })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };
    let filter = EnvFilter::new(format!(
        "kairos={level},kairos_core={level},reqwest=warn",
        level = level.as_str().to_lowercase()
    ));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    debug!("kairos v{} starting", env!("CARGO_PKG_VERSION"));

    let catalog = match &cli.catalog {
        Some(path) => AccountCatalog::from_path(path)?,
        None => AccountCatalog::embedded()?,
    };

    match cli.command {
        Commands::Accounts => {
            for account in catalog.accounts() {
                println!(
                    "{:<12} {:<24} {:<16} ARR {:<8} renewal {} ({:?} risk, score {})",
                    account.id,
                    account.name,
                    account.industry,
                    account.arr,
                    account.renewal_date,
                    account.risk_level,
                    account.risk_score,
                );
            }
            Ok(())
        }

        Commands::Signals { account } => {
            let account = catalog.get(&account)?;
            println!("{} ({} observations)", account.name, account.observations.len());
            println!();
            for (idx, obs) in account.observations.iter().enumerate() {
                let tiers: Vec<String> = QuestionId::CATALOG
                    .iter()
                    .map(|q| format!("{}: {}", q, tier_for(obs, *q).label()))
                    .collect();
                println!(
                    "{:>2}. [{}] {}: {}",
                    idx,
                    obs.category.upper(),
                    obs.metric,
                    obs.value
                );
                println!("      {}", tiers.join("  "));
            }
            println!();
            for q in QuestionId::CATALOG {
                let stats = partition(&account.observations, q).stats();
                println!(
                    "{:<12} kept {:>2}/{:<2} noise removed {:>3}%",
                    q.to_string(),
                    stats.kept,
                    stats.total,
                    stats.noise_percent_removed
                );
            }
            Ok(())
        }

        Commands::Context { account, question } => {
            let question = parse_question(&question)?;
            let mut session = Session::new(catalog);
            session.select_account(&account)?;
            session.select_question(question)?;
            let stats = session.stats()?;
            println!("{}", session.context_block()?);
            eprintln!();
            eprintln!(
                "{} of {} signals kept, {}% filtered as noise",
                stats.kept, stats.total, stats.noise_percent_removed
            );
            Ok(())
        }

        Commands::Brief {
            account,
            question,
            json,
        } => {
            let question = parse_question(&question)?;
            let mut session = Session::new(catalog);
            session.select_account(&account)?;
            session.select_question(question)?;
            let brief = session.active_brief()?;
            if json {
                println!("{}", serde_json::to_string_pretty(brief)?);
            } else {
                print_brief(brief);
            }
            Ok(())
        }

        Commands::Ask { account, question } => {
            let collaborator = Collaborator::with_default()?;
            let mut session = Session::new(catalog);
            session.select_account(&account)?;
            session.ask_custom(&collaborator, &question).await?;
            let stats = session.stats()?;
            println!("{}", session.context_block()?);
            println!();
            println!(
                "{} of {} signals kept, {}% filtered as noise",
                stats.kept, stats.total, stats.noise_percent_removed
            );
            println!();
            print_brief(session.active_brief()?);
            Ok(())
        }
    }
}

fn print_brief(brief: &kairos_core::Brief) {
    println!("{}", brief.title);
    println!("{} ({})", brief.risk, brief.prob);
    println!();
    println!("Key factors:");
    for factor in &brief.factors {
        println!("  - {}", factor);
    }
    println!();
    println!("Recommended actions:");
    for (i, action) in brief.actions.iter().enumerate() {
        println!("  {}. {}", i + 1, action);
        if let Some(impact) = brief.action_impacts.get(i) {
            println!("     {} ({})", impact.text, impact.math);
        }
    }
    println!();
    println!(
        "Confidence: {}%{}",
        brief.confidence,
        if brief.autonomy_eligible() {
            " (autonomy eligible)"
        } else {
            ""
        }
    );
    println!("Timeline: {}", brief.timeline);
}
