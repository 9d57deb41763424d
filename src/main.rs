use clap::{Parser, Subcommand};
use memecap::captioning::{AnthropicProvider, CaptionProvider, caption_or_placeholder};
use memecap::compositing::{RasterBackend, RenderBackend, plan_layout};
use memecap::config::{self, Config};
use memecap::interactive::{self, Context};
use memecap::session::Session;
use memecap::{output, source};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "memecap")]
#[command(about = "Caption images with AI-written meme text")]
#[command(long_about = "\
Caption images with AI-written meme text

memecap sends an image to the Anthropic Messages API, asks for a short
funny caption, and burns it into the top of the image in classic meme style:
bold upper-case letters, white fill, black outline, wrapped to the width of
the image.

The API key is read from ANTHROPIC_API_KEY (configurable). It is only needed
by commands that ask for a caption.

Run 'memecap gen-config' to generate a documented memecap.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./memecap.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ask for a caption and print it
    Caption {
        /// Image file
        image: PathBuf,
    },
    /// Caption an image and save the result as PNG
    Make {
        /// Image file
        image: PathBuf,
        /// Use this caption instead of asking the API
        #[arg(long)]
        caption: Option<String>,
        /// Output file (an existing file is never overwritten)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Show how a caption would be laid out, without writing anything
    Layout {
        /// Image file
        image: PathBuf,
        /// Caption to lay out
        #[arg(long)]
        caption: String,
    },
    /// Interactive session: load, regenerate, download
    Session {
        /// Image to start with
        image: Option<PathBuf>,
    },
    /// Print a stock memecap.toml with all options documented
    GenConfig,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Caption { image } => {
            let config = load_config(cli.config.as_deref())?;
            let provider = AnthropicProvider::from_env(config.provider.clone())?;
            let loaded = source::load(&image).await?;
            let result = provider
                .request_caption(&loaded.bytes, &loaded.media_type)
                .await;
            println!("{}", caption_or_placeholder(result));
        }
        Command::Make {
            image,
            caption,
            output: target,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let backend = RasterBackend::new(config.render.font_path.clone());
            let loaded = source::load(&image).await?;
            let mut session = Session::new();
            session.replace_image(loaded);
            match caption {
                Some(text) => {
                    let ticket = session.begin_request();
                    session.apply_caption(ticket, Ok(text));
                }
                None => {
                    let provider = AnthropicProvider::from_env(config.provider.clone())?;
                    let outcome = session.regenerate(&provider).await?;
                    output::print_lines(&output::format_outcome(&outcome, session.caption()));
                }
            }
            let (dir, file_name) = export_target(target.as_deref(), &config);
            let path = session.export(&backend, &config.render.options(), &dir, &file_name)?;
            output::print_lines(&output::format_saved(&path));
        }
        Command::Layout { image, caption } => {
            let config = load_config(cli.config.as_deref())?;
            let backend = RasterBackend::new(config.render.font_path.clone());
            let loaded = source::load(&image).await?;
            let mut surface = backend.allocate(loaded.width(), loaded.height())?;
            let layout = plan_layout(&mut surface, &caption, &config.render.options())?;
            output::print_lines(&output::format_layout(
                layout.as_ref(),
                loaded.width(),
                loaded.height(),
            ));
        }
        Command::Session { image } => {
            let config = load_config(cli.config.as_deref())?;
            let backend = RasterBackend::new(config.render.font_path.clone());
            let provider = AnthropicProvider::from_env(config.provider.clone())?;
            let ctx = Context {
                provider: &provider,
                backend: &backend,
                options: config.render.options(),
                export: config.export.clone(),
            };
            interactive::run(&ctx, image.as_deref()).await?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays clean for captions and results.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "memecap=debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// `--config` must exist when given; `./memecap.toml` is optional.
fn load_config(path: Option<&Path>) -> Result<Config, config::ConfigError> {
    match path {
        Some(path) => config::load_required_config(path),
        None => config::load_config(Path::new(config::DEFAULT_CONFIG_FILE)),
    }
}

/// Split `--output` into directory and file name, falling back to config.
fn export_target(target: Option<&Path>, config: &Config) -> (PathBuf, String) {
    let Some(target) = target else {
        return (
            config.export.directory.clone(),
            config.export.file_name.clone(),
        );
    };
    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| config.export.file_name.clone());
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    (dir, file_name)
}
