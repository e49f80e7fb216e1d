use clap::{Parser, Subcommand};
use image_scaler::fetch::HttpFetcher;
use image_scaler::imaging::{RequestParams, RustBackend};
use image_scaler::service::{Scaler, render_source};
use image_scaler::{config, logging, shell};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "image-scaler")]
#[command(about = "On-demand image resizing proxy")]
#[command(long_about = "\
On-demand image resizing proxy

Every GET path is fetched from the configured origin, cropped to 3:2,
resized to a size tier, and returned as WebP. The smallest tier returns a
blurred SVG placeholder instead.

Query parameters:

  size       xxs | xs | sm | md | lg | xl       (default md)
             48  | 300| 600| 1200| 2048| 2048 px wide
  quality    1-100                               (default 60, WebP only)
  svgMethod  css | anything else                 (default css, xxs only)
             css:   blur applied by the SVG filter in the browser
             other: blur baked into the embedded JPEG

Configuration layers: stock defaults → --config file → environment
(VS_BASE_URL, VS_AUTH, VS_LOGGING, PORT).

Run 'image-scaler gen-config' to generate a documented config file.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(clap::Args, Clone, Default)]
struct ServeArgs {
    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(clap::Args, Clone)]
struct RenderArgs {
    /// Source image file
    #[arg(long)]
    input: PathBuf,

    /// Size tier
    #[arg(long)]
    size: Option<String>,

    /// Output quality (1-100)
    #[arg(long)]
    quality: Option<String>,

    /// Placeholder blur method for the xxs tier
    #[arg(long)]
    svg_method: Option<String>,

    /// Where to write the rendered payload
    #[arg(long)]
    output: PathBuf,

    /// Log crop decisions and timings
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve(ServeArgs),
    /// Print a stock config file with all options documented
    GenConfig,
    /// Render a local file through the same pipeline, without the network
    Render(RenderArgs),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve(ServeArgs::default())) {
        Command::Serve(args) => {
            let config = config::load_config(args.config.as_deref())?;
            logging::init_server_logger(config.verbose);
            let fetcher = HttpFetcher::new(&config)?;
            let scaler = Arc::new(Scaler::new(config.clone(), fetcher, RustBackend::new()));
            shell::server::serve(&config, shell::server::router(scaler)).await?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Render(args) => {
            logging::init_server_logger(args.verbose);
            let params = RequestParams::from_query(|key| match key {
                "size" => args.size.as_deref(),
                "quality" => args.quality.as_deref(),
                "svgMethod" => args.svg_method.as_deref(),
                _ => None,
            });
            let bytes = std::fs::read(&args.input)?;
            let (output, stats) = render_source(&RustBackend::new(), &bytes, &params)?;
            std::fs::write(&args.output, &output.payload)?;
            println!("{} → {}", args.input.display(), args.output.display());
            println!("Content-Type: {}", output.content_type);
            println!("{stats}");
        }
    }

    Ok(())
}
