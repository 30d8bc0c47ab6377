use clap::Parser;
use codesearch::core::logging::{self, LogTarget};
use codesearch::ui::cli::{Cli, CollectionCommand, Commands};
use codesearch::ui::highlight::snippet_to_text;
use codesearch::{Config, Error, HttpBackend, Result, SearchOrchestrator, SearchTui};
use std::io::IsTerminal;
use tokio::runtime::Runtime;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::resolve(cli.overrides())?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match cli.command {
        None | Some(Commands::Tui) => handle_tui(config, &runtime),
        Some(Commands::Search { query, json }) => {
            handle_search(&config, &runtime, &query.join(" "), json)
        }
        Some(Commands::Collection { action }) => handle_collection(&config, &runtime, action),
    }
}

fn handle_tui(config: Config, runtime: &Runtime) -> Result<()> {
    let _log_guard = logging::init(LogTarget::File(&config.log_path()))?;

    let backend = HttpBackend::new(&config)?;
    let mut tui = SearchTui::new(config, backend, runtime.handle().clone());
    tui.run()
}

fn handle_search(config: &Config, runtime: &Runtime, query: &str, json: bool) -> Result<()> {
    logging::init(LogTarget::Stderr)?;

    let backend = HttpBackend::new(config)?;
    let mut orchestrator = SearchOrchestrator::new(config, backend);
    runtime.block_on(orchestrator.search(query))?;

    let results = orchestrator.results();
    if json {
        let out = serde_json::to_string_pretty(results)
            .map_err(|e| Error::Decode(format!("Failed to serialize results: {}", e)))?;
        println!("{}", out);
        return Ok(());
    }

    if results.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    let color = std::io::stdout().is_terminal();
    for (i, snippet) in results.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("── {} (line {})", snippet.file_path, snippet.first_line());
        print!(
            "{}",
            snippet_to_text(&snippet.content, &snippet.file_path, snippet.first_line(), color)
        );
    }

    Ok(())
}

fn handle_collection(config: &Config, runtime: &Runtime, action: CollectionCommand) -> Result<()> {
    logging::init(LogTarget::Stderr)?;

    let backend = HttpBackend::new(config)?;
    let configured = || config.collection_name.clone();

    let reply = runtime.block_on(async {
        match action {
            CollectionCommand::Create { name } => {
                backend.create_collection(&name.unwrap_or_else(configured)).await
            }
            CollectionCommand::Delete { name } => {
                backend.delete_collection(&name.unwrap_or_else(configured)).await
            }
            CollectionCommand::Init { name, path } => {
                backend
                    .init_collection(&name.unwrap_or_else(configured), &path)
                    .await
            }
        }
    })?;

    println!("✓ {}", reply.message);
    Ok(())
}
