mod cli;

use clap::Parser;
use log::debug;
use std::process::ExitCode;
use webapp_ip_restriction::{pipeline, resolve_session, ArmClient, Authenticator, Error, Result};

/*-------------------------------------------------------------------------------------------------
  Main CLI Function
-------------------------------------------------------------------------------------------------*/

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = cli::Args::parse();

    // Initialize logging
    if let Err(error) = stderrlog::new()
        .module(module_path!())
        .verbosity(args.verbose.log_level_filter())
        .init()
    {
        eprintln!("Failed to initialize logging: {error}");
    }

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &cli::Args) -> Result<()> {
    // Validate the service tag before touching the network
    let filter = cli::build_filter(args)?;
    let catalog = cli::build_catalog_client(args);
    debug!("Catalog download page: {}", catalog.url());

    /*----------------------------------------------------------------------------------
      Show All IP Ranges
    ----------------------------------------------------------------------------------*/

    if args.show_all_ip_ranges {
        let service_tags = catalog.get_service_tags().await?;

        if let Some(path) = &args.csv_file {
            cli::csv::save(&service_tags, path)?;
        }

        return match args.output {
            cli::OutputFormat::Json => cli::output::catalog_json(&service_tags),
            cli::OutputFormat::Table => {
                cli::output::catalog_table(&service_tags);
                Ok(())
            }
        };
    }

    /*----------------------------------------------------------------------------------
      Update the Site
    ----------------------------------------------------------------------------------*/

    let filter =
        filter.ok_or_else(|| Error::Configuration("a service tag is required".to_string()))?;
    let strategy = cli::build_strategy(args);
    cli::log::settings(args, &strategy);

    let authenticator = Authenticator::new();
    let chooser = cli::StdinChooser;
    let (service_tags, session) = pipeline::fetch_and_authenticate(
        &catalog,
        resolve_session(&authenticator, &strategy, &chooser),
    )
    .await?;

    let request = cli::build_request(args, filter.apply(&service_tags), session.subscription_ids)?;
    cli::log::filtered_service_tags(request.service_tags(), &request);

    let management = ArmClient::new(session.credential);
    let configuration = pipeline::apply(&request, &management).await?;
    cli::log::configuration(&configuration);

    match args.output {
        cli::OutputFormat::Json => cli::output::configuration_json(&configuration),
        cli::OutputFormat::Table => {
            cli::output::configuration_table(&configuration);
            Ok(())
        }
    }
}
