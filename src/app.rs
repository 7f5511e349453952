use crate::{
    browserstack::{AutomateApi, BrowserStackClient, Credentials},
    cli::args::{Cli, Command, SessionSelector},
    config::{ConfigLoader, RunnerConfig},
    driver::{session_config::SessionConfig, RunDriver, SdkExecutor},
    outcome::OutcomeExtractor,
    reporters::{writer, OutputLayout},
    targets,
    ui::printer,
    utils::{ids, logging},
};
use anyhow::{bail, Result};

pub async fn run(cli: Cli) -> Result<()> {
    let level = logging::level_from_cli(&cli);
    logging::init(level)?;

    let config = ConfigLoader::load_with_custom_path(cli.config.as_deref())?;
    let runner = &config.browserstack_runner;

    let client = BrowserStackClient::new(&config.api, Credentials::from_env()?)?;
    tracing::debug!("Automate API at {}", config.api.base_url);

    match cli.command {
        Command::Exec => exec(&client, runner).await,
        Command::GenerateTargets { platform, versions } => {
            let report =
                targets::generate_targets(&client, &runner.target_generator, platform, versions.as_deref()).await?;
            printer::print_generation_summary(&report);
            Ok(())
        }
        Command::ScopeVersions => {
            let (path, ranges) = targets::scope_versions(&client, &runner.target_generator).await?;
            printer::print_scope_summary(&path, &ranges);
            Ok(())
        }
        Command::SaveOutcome(selector) => save_outcome(&client, runner, selector).await,
        Command::SaveLogs(selector) => save_logs(&client, runner, selector).await,
        Command::SaveAll(selector) => save_all(&client, runner, selector).await,
    }
}

async fn exec(api: &dyn AutomateApi, runner: &RunnerConfig) -> Result<()> {
    let executor = SdkExecutor::from_config(runner)?;
    executor.verify()?;

    let session = SessionConfig::load(&runner.session_config)?;
    let token = ids::unique_token();
    let driver = RunDriver::new(api, &executor, runner);

    // Dropping the run future kills the child and restores the session config.
    let manifest = tokio::select! {
        result = driver.run(session, &token) => result?,
        _ = tokio::signal::ctrl_c() => {
            bail!(
                "interrupted; {:?} restored. Set interrupted: true and continue_point to resume",
                runner.session_config
            );
        }
    };

    let layout = OutputLayout::new(&runner.output_analyzer.output_directory);
    let path = writer::write_run_manifest(&layout, &manifest)?;
    printer::print_run_summary(&manifest, &path);
    Ok(())
}

async fn save_outcome(api: &dyn AutomateApi, runner: &RunnerConfig, selector: SessionSelector) -> Result<()> {
    let extractor = OutcomeExtractor::new(api, OutputLayout::new(&runner.output_analyzer.output_directory));

    match selector {
        SessionSelector { session_id: Some(id), .. } => {
            println!("Gathering information about session_id {:?}...", id);
            let report = extractor.save_session(&id).await?;
            printer::print_session_report(&report);
        }
        SessionSelector { unique_id: Some(fragment), .. } => {
            println!("Gathering information about builds matching {:?}...", fragment);
            let report = extractor.save_build(&fragment).await?;
            printer::print_build_summary(&report);
        }
        _ => bail!("either a session id or a build fragment is required"),
    }
    Ok(())
}

async fn save_logs(api: &dyn AutomateApi, runner: &RunnerConfig, selector: SessionSelector) -> Result<()> {
    let extractor = OutcomeExtractor::new(api, OutputLayout::new(&runner.output_analyzer.output_directory));

    let written = match selector {
        SessionSelector { session_id: Some(id), .. } => vec![extractor.save_session_logs(&id).await?],
        SessionSelector { unique_id: Some(fragment), .. } => extractor.save_build_logs(&fragment).await?,
        _ => bail!("either a session id or a build fragment is required"),
    };
    printer::print_logs_saved(&written);
    Ok(())
}

async fn save_all(api: &dyn AutomateApi, runner: &RunnerConfig, selector: SessionSelector) -> Result<()> {
    let extractor = OutcomeExtractor::new(api, OutputLayout::new(&runner.output_analyzer.output_directory));

    match selector {
        SessionSelector { session_id: Some(id), .. } => {
            println!("Gathering everything about session_id {:?}...", id);
            let (report, log) = extractor.save_all_session(&id).await?;
            printer::print_session_report(&report);
            printer::print_logs_saved(&[log]);
        }
        SessionSelector { unique_id: Some(fragment), .. } => {
            println!("Gathering everything about builds matching {:?}...", fragment);
            let (report, logs) = extractor.save_all_build(&fragment).await?;
            printer::print_build_summary(&report);
            printer::print_logs_saved(&logs);
        }
        _ => bail!("either a session id or a build fragment is required"),
    }
    Ok(())
}
