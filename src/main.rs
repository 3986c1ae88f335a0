use anyhow::{bail, Context as AnyhowContext, Result};
use clap::{Parser, Subcommand};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use indicatif_log_bridge::LogWrapper;
use log::{debug, LevelFilter};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

mod advisor;
mod catalog;
mod config;
mod constants;
mod context;
mod display;
mod matcher;
mod protocol;
mod query;

use context::AppContext;
use protocol::SearchRequest;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Use this config file instead of the global and workspace ones
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the local knowledge base only
    Search {
        /// Agricultural query, e.g. "best fertilizer for rice?"
        query: String,
        /// Maximum number of results
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
        /// Drop results scoring below this
        #[arg(short, long, allow_negative_numbers = true)]
        min_score: Option<f64>,
        /// Print the response as JSON
        #[arg(long)]
        json: bool,
        /// Show how each record was scored
        #[arg(long, conflicts_with = "json")]
        explain: bool,
    },
    /// Search the local knowledge base, then ask the AI advisor
    Ask {
        /// Agricultural query, e.g. "how to control pests in cotton?"
        query: String,
        /// Maximum number of local results used as context
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
        /// Drop local results scoring below this
        #[arg(short, long, allow_negative_numbers = true)]
        min_score: Option<f64>,
    },
    /// List the knowledge base records
    Catalog,
    /// Show the resolved configuration
    Config,
}

fn search_request(
    ctx: &AppContext,
    query: String,
    top_k: Option<usize>,
    min_score: Option<f64>,
) -> SearchRequest {
    let defaults = ctx.config_manager.get_search_config();
    let mut request = SearchRequest::new(query);
    request.top_k = top_k.unwrap_or(defaults.top_k);
    request.min_score = min_score.unwrap_or(defaults.min_score);
    request
}

fn search_knowledge_base(
    ctx: &AppContext,
    request: SearchRequest,
    json: bool,
    explain: bool,
) -> Result<()> {
    let response = ctx.engine.execute(&request);
    debug!(
        "{} of {} records returned in {}ms",
        response.stats.num_results, response.stats.num_candidates, response.stats.total_time_ms
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    let mut out = display::stdout();
    display::print_results(&mut out, &response.results)?;
    if explain {
        println!();
        display::print_scores(&mut out, &ctx.engine.score(&request.query))?;
    }
    Ok(())
}

async fn ask_advisor(
    ctx: &AppContext,
    request: SearchRequest,
    multi: &MultiProgress,
) -> Result<()> {
    if request.query.trim().is_empty() {
        bail!("Please enter a query.");
    }

    let advisor = match ctx.advisor() {
        Ok(advisor) => advisor,
        Err(e) => {
            let message = format!("Configuration Error: {:#}", e);
            display::print_error(&mut display::stderr(), &message)?;
            eprintln!("Setup: get an API key from https://console.groq.com/ and export GROQ_API_KEY,");
            eprintln!("or set advisor.api_key in the config file shown by `kcc config`.");
            return Err(e);
        }
    };

    let results = ctx.engine.search(&request.query, request.top_k, request.min_score);
    let mut out = display::stdout();
    display::print_results(&mut out, &results)?;
    if results.is_empty() {
        println!("Consulting AI expert...");
    }
    println!();

    let spinner = multi.add(ProgressBar::new_spinner());
    spinner.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
    spinner.set_message(format!("Consulting AI expert ({})...", advisor.model()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let advice = advisor.ask(&request.query, &results).await;
    spinner.finish_and_clear();
    multi.remove(&spinner);

    match advice {
        Ok(advice) => {
            display::print_advice(&mut out, &advice)?;
            Ok(())
        }
        Err(e) => {
            display::print_error(&mut display::stderr(), &format!("Advisor Error: {:#}", e))?;
            eprintln!("Troubleshooting:");
            eprintln!("  - Verify your API key is correct");
            eprintln!("  - Check your internet connection");
            eprintln!("  - Ensure you have API credits available");
            Err(e)
        }
    }
}

fn show_config(ctx: &AppContext) -> Result<()> {
    let manager = &ctx.config_manager;
    let describe = |path: &Option<PathBuf>| match path {
        Some(path) if path.exists() => path.display().to_string(),
        Some(path) => format!("{} (not found)", path.display()),
        None => "-".to_string(),
    };
    println!("Global config: {}", describe(&manager.global_config_path));
    println!("Local config:  {}", describe(&manager.local_config_path));

    let search = manager.get_search_config();
    println!();
    println!("[search]");
    println!("top_k = {}", search.top_k);
    println!("min_score = {}", search.min_score);

    let advisor = manager.get_advisor_config();
    println!();
    println!("[advisor]");
    println!("model = {:?}", advisor.model);
    println!("max_tokens = {}", advisor.max_tokens);
    println!("temperature = {}", advisor.temperature);
    println!("base_url = {:?}", advisor.base_url);
    println!(
        "api_key = {}",
        match advisor.api_key.as_deref() {
            Some(key) if !key.is_empty() => mask_key(key),
            _ => "(not set)".to_string(),
        }
    );

    if let Err(e) = advisor.validate() {
        println!();
        display::print_warning(&mut display::stdout(), &e.to_string())?;
    }
    Ok(())
}

/// Show only a short prefix of long keys; short keys are hidden entirely.
fn mask_key(key: &str) -> String {
    if key.chars().count() <= 8 {
        return "****".to_string();
    }
    let visible: String = key.chars().take(4).collect();
    format!("{}****", visible)
}

fn init_logging(verbose: bool) -> Result<MultiProgress> {
    let default_level = if verbose { "debug" } else { "warn" };
    let logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .build();
    let level: LevelFilter = logger.filter();

    let multi = MultiProgress::new();
    LogWrapper::new(multi.clone(), logger)
        .try_init()
        .context("Failed to initialize logger")?;
    log::set_max_level(level);
    Ok(multi)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let multi = init_logging(cli.verbose)?;

    let Some(command) = cli.command else {
        println!("No command specified. Use --help to see available commands.");
        println!("Example usage:");
        println!("  Search: kcc search \"best fertilizer for rice?\"");
        println!("  Ask:    kcc ask \"how to control pests in cotton?\"");
        return Ok(());
    };

    let base_path = env::current_dir().context("Failed to get current directory")?;
    let ctx = AppContext::new(&base_path, cli.config.as_deref())?;

    match command {
        Commands::Search {
            query,
            top_k,
            min_score,
            json,
            explain,
        } => {
            let request = search_request(&ctx, query, top_k, min_score);
            search_knowledge_base(&ctx, request, json, explain)?;
        }
        Commands::Ask {
            query,
            top_k,
            min_score,
        } => {
            let request = search_request(&ctx, query, top_k, min_score);
            ask_advisor(&ctx, request, &multi).await?;
        }
        Commands::Catalog => {
            display::print_catalog(&mut display::stdout(), ctx.engine.catalog())?;
        }
        Commands::Config => {
            show_config(&ctx)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_search_flags() {
        let cli = Cli::try_parse_from(["kcc", "search", "rice", "-k", "5", "--min-score", "-1"])
            .unwrap();
        match cli.command {
            Some(Commands::Search {
                query,
                top_k,
                min_score,
                json,
                explain,
            }) => {
                assert_eq!(query, "rice");
                assert_eq!(top_k, Some(5));
                assert_eq!(min_score, Some(-1.0));
                assert!(!json);
                assert!(!explain);
            }
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn test_json_and_explain_conflict() {
        assert!(Cli::try_parse_from(["kcc", "search", "rice", "--json", "--explain"]).is_err());
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("gsk_abcdef123"), "gsk_****");
        assert_eq!(mask_key("ab"), "****");
        assert_eq!(mask_key("abcd"), "****");
        assert_eq!(mask_key("gsk_abcd"), "****");
    }
}
