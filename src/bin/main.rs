use clap::Parser;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "storefront-e2e")]
#[command(about = "Check-payment browser scenario for the storefront, per locale")]
#[command(version)]
struct Cli {
    /// Suite config file
    config: PathBuf,

    /// Only run this project (can be used multiple times)
    #[arg(long = "project", value_name = "NAME")]
    projects: Vec<String>,

    /// Run in headless mode (overrides config)
    #[arg(long)]
    headless: bool,

    /// Set a parameter (can be used multiple times)
    #[arg(short = 'P', long = "param", value_name = "KEY=VALUE")]
    params: Vec<String>,

    /// Verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Validate config and fixtures without running
    #[arg(long)]
    check: bool,

    /// Quiet mode (only errors)
    #[arg(short, long)]
    quiet: bool,

    /// CI defaults: 2 retries, 1 worker (also enabled by the CI env var)
    #[arg(long)]
    ci: bool,
}

#[tokio::main]
async fn main() -> storefront_e2e::Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            _ => Level::DEBUG,
        }
    };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    let params = storefront_e2e::Params::from_args(&cli.params)?;
    let mut config = storefront_e2e::SuiteConfig::load_with_params(&cli.config, &params)?;
    let base_path = storefront_e2e::Runner::base_path_of(&cli.config).to_path_buf();
    let ci = cli.ci || storefront_e2e::Runner::ci_from_env();

    if cli.check {
        println!("Config valid: {}", config.name);
        for project in config.select_projects(&cli.projects)? {
            let fixture_path = base_path.join(&project.fixture);
            let fixture = storefront_e2e::Fixture::load_with_params(&fixture_path, &params)?;
            println!(
                "  {} ({}): {} [search: {}]",
                project.name, project.locale, project.base_url, fixture.search_term
            );
            let methods: Vec<_> = project
                .locale
                .variant()
                .payment_methods
                .iter()
                .map(|m| m.display_name())
                .collect();
            println!("    Payment methods: {}", methods.join(", "));
        }
        println!("  Retries: {}", config.run.effective_retries(ci));
        println!(
            "  Workers: {}",
            config.run.effective_workers(ci, config.projects.len())
        );
        if let Some(target) = config.run.target_cart_amount {
            println!("  Target cart amount: {}", target);
        }
        if !config.params.is_empty() {
            println!("  Parameters: {}", config.params.len());
            for (name, def) in &config.params {
                let req = if def.required { " (required)" } else { "" };
                let desc = def.description.as_deref().unwrap_or("");
                println!("    - {}{}: {}", name, req, desc);
            }
        }
        return Ok(());
    }

    if cli.headless {
        config.browser.headless = true;
    }

    println!("Running: {}", config.name);

    let runner = storefront_e2e::Runner::new(config, base_path)
        .with_params(params)
        .with_projects(cli.projects)
        .with_ci(ci);
    let result = runner.run().await?;

    println!();
    for project in &result.projects {
        if project.success {
            println!("✓ {} ({})", project.name, project.locale);
        } else {
            println!("✗ {} ({})", project.name, project.locale);
            if let Some(ref error) = project.error {
                println!("  Error: {}", error);
            }
        }
        if let Some(ref outcome) = project.outcome {
            println!(
                "  Cart: {} | Payment methods verified: {}",
                outcome.cart_amount,
                outcome.verified_methods.len()
            );
        }
        if let Some(ref screenshot) = project.screenshot {
            println!("  Screenshot: {}", screenshot.display());
        }
        println!("  Duration: {}ms", project.duration_ms);
        if project.retries > 0 {
            println!("  Retries: {}", project.retries);
        }
    }

    if !result.success() {
        std::process::exit(1);
    }

    Ok(())
}
