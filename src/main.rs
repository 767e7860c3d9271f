//! mysqlcmd - run a SQL query against a MySQL server and emit the result.

use mysqlcmd::cli::Cli;
use mysqlcmd::config::Config;
use mysqlcmd::db::MySqlConnector;
use mysqlcmd::error::Result;
use mysqlcmd::logging;
use mysqlcmd::output;
use mysqlcmd::query::QueryRunner;
use tracing::{debug, error};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Initialize logging
    logging::init_stderr_logging(logging::default_level(cli.debug));

    if let Err(e) = run(&cli).await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    // Load configuration file
    let config_path = cli.config_path();
    debug!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    // Resolve the invocation with precedence:
    // 1. CLI arguments (highest)
    // 2. Named connection from config
    // 3. Default connection from config
    // 4. Environment variables
    let invocation = cli.to_invocation(&config)?;
    let transaction = cli.transaction()?;
    debug!("Connection: {}", invocation.connection.display_string());

    let connector = MySqlConnector;
    let result = QueryRunner::new(&connector)
        .run(&invocation, transaction.as_ref())
        .await?;

    let rendered = output::render(&result, cli.output)?;
    if !rendered.is_empty() {
        println!("{rendered}");
    }

    Ok(())
}
