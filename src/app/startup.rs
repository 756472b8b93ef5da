//! Process startup
//!
//! Parses arguments, starts logging, builds the builtin registries, starts
//! every configured instance and runs the requested collector. This is the
//! only place that terminates the process on failure.

use super::cli::Args;
use super::config::Config;
use super::error::AppError;
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::{effective_level, init_logging};
use crate::core::version::long_version;
use crate::plugin::api::{
    Capability, Executor, Instances, LifecycleOrchestrator, LifecycleReporter, LogReporter,
    Registries,
};
use clap::Parser;
use prettytable::{format, Cell, Row, Table};
use strum::IntoEnumIterator;

/// Initialize application startup
pub async fn startup() {
    let args = Args::parse();
    let use_color = args.use_color();

    let level = effective_level(args.log_level.as_deref(), args.verbosity());
    if let Err(e) = init_logging(
        level,
        args.log_format.as_deref(),
        args.log_file.as_deref(),
        use_color,
    ) {
        eprintln!("Error: unable to start logging: {}", e);
        std::process::exit(1);
    }
    log::debug!("pickman {} starting", long_version());

    let registries = Registries::builtin();

    if args.list_plugins {
        print_plugin_table(&registries, use_color);
        return;
    }

    if let Err(error) = run(&args, &registries, &LogReporter).await {
        log_error_with_context(&error, "Data collection failed");
        std::process::exit(1);
    }
}

/// Load the configuration, start all instances and run the named collector
pub async fn run(
    args: &Args,
    registries: &Registries,
    reporter: &dyn LifecycleReporter,
) -> Result<(), AppError> {
    let collector_name = args
        .name
        .as_deref()
        .ok_or(AppError::MissingCollectorName)?;

    let config = Config::load(args.config_file.as_deref()).await?;
    if config.server.is_some() {
        log::debug!("Ignoring 'server' section of the configuration");
    }

    let mut instances = Instances::new();
    LifecycleOrchestrator::new(registries, &mut instances, reporter)
        .start(&config.declarations())
        .await?;

    Executor::new(&instances, reporter)
        .execute(collector_name)
        .await?;
    Ok(())
}

/// One row per capability with its registered plugin names
pub fn plugin_table(registries: &Registries, use_color: bool) -> Table {
    let title_style = if use_color { "bFc" } else { "b" };

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);
    table.set_titles(Row::new(vec![
        Cell::new("Capability").style_spec(title_style),
        Cell::new("Plugins").style_spec(title_style),
    ]));

    for capability in Capability::iter() {
        let names = registries.plugin_names(capability);
        let plugins = if names.is_empty() {
            "-".to_string()
        } else {
            names.join(", ")
        };
        table.add_row(Row::new(vec![
            Cell::new(capability.as_ref()),
            Cell::new(&plugins),
        ]));
    }
    table
}

fn print_plugin_table(registries: &Registries, use_color: bool) {
    let table = plugin_table(registries, use_color);
    if use_color {
        table.printstd();
    } else {
        print!("{}", table);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::tests::utils::RecordingReporter;
    use tempfile::TempDir;

    fn args(extra: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("pickman").chain(extra.iter().copied())).unwrap()
    }

    #[test]
    fn test_plugin_table_lists_every_capability() {
        let table = plugin_table(&Registries::builtin(), false).to_string();

        assert!(table.contains("credential"));
        assert!(table.contains("datasource"));
        assert!(table.contains("collector"));
        assert!(table.contains("simple.map"));
        assert!(table.contains("google.analytics"));
    }

    #[tokio::test]
    async fn test_run_without_config_file_fails() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("none.json");
        let missing = missing.to_string_lossy();
        let reporter = RecordingReporter::default();

        let error = run(
            &args(&["-c", &*missing, "-n", "col1"]),
            &Registries::builtin(),
            &reporter,
        )
        .await
        .unwrap_err();
        assert!(matches!(error, AppError::Config(_)));
    }

    #[tokio::test]
    async fn test_run_with_empty_config_reports_unknown_collector() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pickman.json");
        std::fs::write(&path, "{}").unwrap();
        let path = path.to_string_lossy();
        let reporter = RecordingReporter::default();

        let error = run(
            &args(&["-c", &*path, "-n", "col1"]),
            &Registries::builtin(),
            &reporter,
        )
        .await
        .unwrap_err();

        assert_eq!(error.to_string(), "No collector instance named 'col1'");
        assert_eq!(
            reporter.events(),
            vec!["empty credential", "empty datasource", "empty collector"]
        );
    }
}
