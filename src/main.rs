use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dmponline::client::DmpClient;
use dmponline::config::{ClientConfig, TlsVerification, DEFAULT_URL};
use dmponline::output::{write_table, Table};
use dmponline::{overview, plans, statistics, templates};

#[derive(Parser)]
#[command(name = "dmponline")]
#[command(about = "Retrieve and inspect DMPonline data management plans")]
struct Cli {
    /// DMPonline API access token
    #[arg(short = 't', long, env = "DMPONLINE_API_TOKEN")]
    api_token: String,

    /// Email of the account owning the token (required for API v1 requests)
    #[arg(short = 'u', long, env = "DMPONLINE_USER_EMAIL")]
    user_email: Option<String>,

    /// Skip TLS certificate verification (overridden by --cert-file)
    #[arg(long)]
    do_not_verify: bool,

    /// PEM certificate to trust for the API host
    #[arg(short, long)]
    cert_file: Option<PathBuf>,

    /// Base URL of the DMPonline API
    #[arg(long, env = "DMPONLINE_URL", default_value = DEFAULT_URL)]
    base_url: String,

    /// Output file to write to (supported formats: .html, .csv, .xlsx)
    #[arg(short, long, global = true)]
    output_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a plan, normalized to a single row
    Plan {
        /// DMPonline plan ID
        #[arg(short = 'i', long)]
        plan_id: i64,
    },
    /// Determine whether a plan declares handling of personal data
    PersonalData {
        /// DMPonline plan ID
        #[arg(short = 'i', long)]
        plan_id: i64,

        /// Log the template, question and chosen answer
        #[arg(short, long)]
        verbose: bool,
    },
    /// List all questions of a plan
    Questions {
        /// DMPonline plan ID
        #[arg(short = 'i', long)]
        plan_id: i64,
    },
    /// Metadata about all plans of your organisation
    Statistics,
    /// Number of plans of your organisation
    Count,
    /// Your organisation's departments
    Departments,
    /// Users per department
    DepartmentUsers,
}

/// Logs go to stderr so stdout carries only table output.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "dmponline=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let tls = TlsVerification::resolve(cli.do_not_verify, cli.cert_file);
    tracing::debug!("call api with verify={:?}", tls);
    let config = ClientConfig::new(cli.api_token)
        .with_base_url(cli.base_url)
        .with_user_email(cli.user_email)
        .with_tls(tls);
    let client = DmpClient::connect(&config)
        .await
        .context("Failed to connect to DMPonline")?;

    let output = cli.output_file.as_deref();
    let mut stdout = std::io::stdout();

    match cli.command {
        Commands::Plan { plan_id } => match plans::fetch_plan(&client, plan_id).await {
            Some(record) => write_table(&Table::from_pairs(record.columns()), output, &mut stdout)?,
            None => println!("No data for plan {}", plan_id),
        },
        Commands::PersonalData { plan_id, verbose } => {
            let answer = match templates::has_personal_data(&client, plan_id, verbose).await {
                Some(true) => "yes",
                Some(false) => "no",
                None => "unknown",
            };
            println!("plan {}: personal data {}", plan_id, answer);
        }
        Commands::Questions { plan_id } => {
            match overview::question_overview(&client, plan_id).await {
                Some(rows) => write_table(&overview::overview_table(&rows), output, &mut stdout)?,
                None => println!("No data for plan {}", plan_id),
            }
        }
        Commands::Statistics => match statistics::plan_statistics(&client, None).await {
            Some(stats) => {
                let rows: Vec<_> = stats.iter().map(|s| s.to_row()).collect();
                write_table(&Table::from_flat_rows(&rows), output, &mut stdout)?;
            }
            None => println!("No plan statistics available"),
        },
        Commands::Count => match statistics::dmp_count(&client).await {
            Some(count) => println!("{}", count),
            None => println!("No plan statistics available"),
        },
        Commands::Departments => match statistics::departments(&client).await {
            Some(rows) => write_table(&Table::from_flat_rows(&rows), output, &mut stdout)?,
            None => println!("No departments available"),
        },
        Commands::DepartmentUsers => match statistics::department_users(&client).await {
            Some(rows) => write_table(&Table::from_flat_rows(&rows), output, &mut stdout)?,
            None => println!("No department users available"),
        },
    }

    Ok(())
}
