//! CLI for Cowify - serve the relay or cowify a photo against a running one.

use clap::{Args, Parser, Subcommand};
use cowify::client::{DirectorySink, HttpRelayClient, UploadSession};
use cowify::image::find_reference_image;
use cowify::server::{self, ServerConfig};
use cowify::Upload;
use std::net::IpAddr;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "cowify=debug,tower_http=info";

#[derive(Parser)]
#[command(name = "cowify")]
#[command(about = "Turn a profile picture into a cartoon cow via the OpenAI image API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the relay server and static page
    Serve(ServeArgs),

    /// Cowify a local image through a running relay
    Run(RunArgs),

    /// Show which reference image would be attached
    Reference(ReferenceArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Bind address (overrides HOST)
    #[arg(long)]
    host: Option<IpAddr>,

    /// Bind port (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory with the static page (overrides STATIC_DIR)
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Directory searched for the reference image (overrides REFERENCE_DIR)
    #[arg(long)]
    reference_dir: Option<PathBuf>,
}

#[derive(Args)]
struct RunArgs {
    /// Image to cowify
    input: PathBuf,

    /// Base URL of the relay
    #[arg(short, long, default_value = "http://localhost:3000")]
    server: String,

    /// Directory the result is saved into
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,
}

#[derive(Args)]
struct ReferenceArgs {
    /// Directory to search (defaults to REFERENCE_DIR or the current directory)
    #[arg(short, long)]
    dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => serve(args).await?,
        Commands::Run(args) => run(args, cli.json).await?,
        Commands::Reference(args) => show_reference(args, cli.json)?,
    }

    Ok(())
}

/// Installs the subscriber. `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = ServerConfig::from_env()?;

    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(dir) = args.static_dir {
        config.static_dir = dir;
    }
    if let Some(dir) = args.reference_dir {
        config.reference_dir = dir;
    }

    server::start(config).await?;
    Ok(())
}

async fn run(args: RunArgs, json_output: bool) -> anyhow::Result<()> {
    let upload = Upload::from_path(&args.input)?;
    let api = HttpRelayClient::new(&args.server);
    let mut session: UploadSession = UploadSession::default();

    session.select_file(Some(upload));
    let succeeded = session.run(&api).await;

    if !succeeded {
        let message = session.status().text.clone();
        if json_output {
            let result = serde_json::json!({
                "success": false,
                "error": message,
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        anyhow::bail!(message);
    }

    let mut sink = DirectorySink::new(&args.output_dir);
    session.download(&mut sink)?;
    let output = sink
        .last_saved()
        .map(|path| path.display().to_string())
        .unwrap_or_default();

    if json_output {
        let result = serde_json::json!({
            "success": true,
            "input": args.input.display().to_string(),
            "output": output,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{} Saved {}", session.status().text, output);
    }

    Ok(())
}

fn show_reference(args: ReferenceArgs, json_output: bool) -> anyhow::Result<()> {
    let dir = match args.dir {
        Some(dir) => dir,
        None => ServerConfig::from_env()?.reference_dir,
    };
    let found = find_reference_image(&dir);

    if json_output {
        let result = serde_json::json!({
            "dir": dir.display().to_string(),
            "reference": found.as_ref().map(|path| path.display().to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        match found {
            Some(path) => println!("Reference image: {}", path.display()),
            None => println!("No reference image in {}", dir.display()),
        }
    }

    Ok(())
}
