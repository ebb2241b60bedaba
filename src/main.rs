use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use iced::{window, Size};
use tracing::info;

use feedbackhub::cli::{Cli, Command};
use feedbackhub::client::FeedbackClient;
use feedbackhub::gui::FeedbackHubApp;
use feedbackhub::{api, init_logging, Config, JsonFileStore};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbosity());

    let mut config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::Serve(args) => {
            args.apply(&mut config);
            config.validate()?;
            serve(&config)
        }
        Command::Gui(args) => {
            args.apply(&mut config);
            config.validate()?;
            run_gui(&config)
        }
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn serve(config: &Config) -> Result<()> {
    let addr = config.bind_addr()?;
    let store = JsonFileStore::open_or_create(&config.storage.data_file)?;
    info!("Feedback data file: {}", store.path().display());

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(api::serve(addr, Arc::new(store)))
}

fn run_gui(config: &Config) -> Result<()> {
    let client = FeedbackClient::new(config.gui.api_url.clone());
    info!("Dashboard talking to {}", client.base_url());

    iced::application(
        "Feedback Hub",
        FeedbackHubApp::update,
        FeedbackHubApp::view,
    )
    .window(window::Settings {
        size: Size::new(1280.0, 820.0),
        resizable: true,
        ..window::Settings::default()
    })
    .run_with(move || FeedbackHubApp::new(client))?;
    Ok(())
}
