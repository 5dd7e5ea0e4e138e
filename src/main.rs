use std::net::IpAddr;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use spotremote::{
    config::{self, RefreshStrategy, Settings},
    error, info, server, warning,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the relay server
    Serve(ServeOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ServeOptions {
    /// Address to bind to (overrides SERVER_HOST)
    #[clap(long)]
    pub host: Option<IpAddr>,

    /// Port to listen on (overrides PORT)
    #[clap(long)]
    pub port: Option<u16>,

    /// How to keep the access token fresh (overrides REFRESH_STRATEGY)
    #[clap(long, value_enum)]
    pub refresh: Option<RefreshStrategy>,

    /// Open the login page in the default browser once the server is up
    #[clap(long)]
    pub open: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn apply_overrides(mut settings: Settings, opt: &ServeOptions) -> Settings {
    if let Some(host) = opt.host {
        settings.host = host;
    }
    if let Some(port) = opt.port {
        settings.port = port;
    }
    if let Some(refresh) = opt.refresh {
        settings.refresh_strategy = refresh;
    }
    settings
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(opt) => {
            if let Err(e) = config::load_env().await {
                warning!("Cannot load environment. Err: {}", e);
            }

            let settings = match Settings::from_env() {
                Ok(settings) => apply_overrides(settings, &opt),
                Err(e) => error!("Invalid configuration: {}", e),
            };
            info!("Spotify callback URL: {}", settings.redirect_uri);
            info!("Refresh strategy: {:?}", settings.refresh_strategy);

            if opt.open {
                let url = settings.local_url();
                tokio::spawn(async move {
                    tokio::time::sleep(std::time::Duration::from_millis(500)).await;
                    if webbrowser::open(&url).is_err() {
                        warning!(
                            "Failed to open browser. Please navigate to the following URL manually:\n{}",
                            url
                        )
                    }
                });
            }

            if let Err(e) = server::start_api_server(settings).await {
                error!("Server failed: {}", e);
            }
        }
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
