use std::process::ExitCode;

use tracing::{error, info};

use blog_search::{logging, run, AppConfig, Dependencies};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(config.log_format) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    info!("Starting blog search v{}", env!("CARGO_PKG_VERSION"));

    let result = match Dependencies::new(&config).await {
        Ok(deps) => run(&deps, &config).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(report) => {
            info!(
                index_created = report.index_created,
                indexed = report.indexed_one_by_one + report.bulk.succeeded,
                term_matches = report.term_matches.len(),
                total_posts = report.total_posts,
                recent_posts = report.recent_posts.len(),
                "Run complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Run failed");
            ExitCode::FAILURE
        }
    }
}
