use clap::Parser;
use std::path::PathBuf;
use storefront_e2e::{BrowserKind, Params, Scenario, SuiteConfig, SuiteRunner};
use tracing::{warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "storefront-e2e")]
#[command(about = "End-to-end browser tests for an OpenCart storefront")]
#[command(version)]
struct Cli {
    /// Suite config file (built-in defaults when omitted or missing)
    config: Option<PathBuf>,

    /// Browser to drive: chrome or chromium (overrides config)
    #[arg(long, value_name = "NAME", value_parser = parse_browser)]
    browser: Option<BrowserKind>,

    /// Run in headless mode (overrides config)
    #[arg(long)]
    headless: bool,

    /// Storefront URL (overrides config)
    #[arg(long, env = "BASE_URL", value_name = "URL")]
    base_url: Option<String>,

    /// Set a parameter (can be used multiple times)
    #[arg(short = 'P', long = "param", value_name = "KEY=VALUE")]
    params: Vec<String>,

    /// Run only these scenarios, by id or slug (can be used multiple times)
    #[arg(long, value_name = "SCENARIO")]
    only: Vec<String>,

    /// List scenarios and exit
    #[arg(long)]
    list: bool,

    /// Validate config without running
    #[arg(long)]
    check: bool,

    /// Verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (only errors)
    #[arg(short, long)]
    quiet: bool,
}

fn parse_browser(name: &str) -> Result<BrowserKind, String> {
    name.parse().map_err(|e: storefront_e2e::Error| e.to_string())
}

#[tokio::main]
async fn main() -> storefront_e2e::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v/-q when set
    let level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            _ => Level::DEBUG,
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    if cli.list {
        for scenario in Scenario::all() {
            println!(
                "{}  {:<26} {}",
                scenario.id(),
                scenario.slug(),
                scenario.description()
            );
        }
        return Ok(());
    }

    let params = Params::from_args(&cli.params)?;

    let mut config = match cli.config {
        Some(ref path) if path.exists() => SuiteConfig::load_with_params(path, &params)?,
        Some(ref path) => {
            warn!("{} not found, using built-in defaults", path.display());
            SuiteConfig::parse_with_params("", &params)?
        }
        None => SuiteConfig::parse_with_params("", &params)?,
    };

    if let Some(kind) = cli.browser {
        config.browser.kind = kind;
    }
    if cli.headless {
        config.browser.headless = true;
    }
    if let Some(url) = cli.base_url {
        config.base_url = url;
    }
    if !cli.only.is_empty() {
        config.scenarios = cli.only.clone();
    }
    config.validate()?;
    let scenarios = config.selected_scenarios()?;

    if cli.check {
        println!("Config valid: {}", config.name);
        println!("  Base URL: {}", config.base_url);
        println!(
            "  Browser: {}{}",
            config.browser.kind,
            if config.browser.headless { " (headless)" } else { "" }
        );
        println!("  Scenarios: {}", scenarios.len());
        for scenario in &scenarios {
            println!("    - {}", scenario);
        }
        if !config.params.is_empty() {
            println!("  Parameters: {}", config.params.len());
            for (name, def) in &config.params {
                let req = if def.required { " (required)" } else { "" };
                let desc = def.description.as_deref().unwrap_or("");
                println!("    - {}{}: {}", name, req, desc);
            }
        }
        if !config.locators.is_empty() {
            println!("  Locator overrides: {}", config.locators.len());
        }
        if let Some(ref retry) = config.on_failure.retry {
            println!("  Retry attempts: {}", retry.attempts);
        }
        return Ok(());
    }

    println!("Running: {} against {}", config.name, config.base_url);

    let report = SuiteRunner::new(&config).run(&scenarios).await;

    println!();
    for result in &report.results {
        if result.success {
            println!("✓ {} ({}ms)", result.scenario, result.duration_ms);
        } else {
            println!("✗ {} ({}ms)", result.scenario, result.duration_ms);
            if let Some(ref error) = result.error {
                println!("  Error: {}", error);
            }
            if let Some(ref path) = result.screenshot {
                println!("  Screenshot: {}", path.display());
            }
        }
        if result.retries > 0 {
            println!("  Retries: {}", result.retries);
        }
    }
    println!();
    println!("{} passed, {} failed", report.passed(), report.failed());

    if !report.all_passed() {
        std::process::exit(1);
    }

    Ok(())
}
