mod cli;

use showtape::{config, http, inputs, processor::Processor};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use showtape_common::{FormatCode, VideoFormat};
use std::path::{Path, PathBuf};

struct GetArgs {
    urls: Vec<String>,
    format: Option<u8>,
    video_format: Option<u8>,
    out_path: Option<PathBuf>,
    force_video: bool,
    skip_videos: bool,
    skip_chapters: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "showtape=trace,showtape_media=trace,showtape_av=debug,reqwest=debug".to_string()
        } else {
            "showtape=info,showtape_media=info,showtape_av=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Get {
            urls,
            format,
            video_format,
            out_path,
            force_video,
            skip_videos,
            skip_chapters,
        } => {
            let args = GetArgs {
                urls,
                format,
                video_format,
                out_path,
                force_video,
                skip_videos,
                skip_chapters,
            };
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            rt.block_on(get(args, cli.config.as_deref()))
        }
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("showtape {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn get(args: GetArgs, config_path: Option<&Path>) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    if let Some(format) = args.format {
        config.download.format = FormatCode::try_from(format)?;
    }
    if let Some(video_format) = args.video_format {
        config.download.video_format = VideoFormat::try_from(video_format)?;
    }
    if let Some(out_path) = args.out_path {
        config.download.out_path = out_path;
    }
    config.download.force_video |= args.force_video;
    config.download.skip_videos |= args.skip_videos;
    config.download.skip_chapters |= args.skip_chapters;

    config::require_stream_params(&config.stream)
        .context("Stream parameters are required to download")?;

    let urls = inputs::expand_inputs(&args.urls).context("Failed to process URLs")?;

    std::fs::create_dir_all(&config.download.out_path).with_context(|| {
        format!(
            "Failed to make output folder: {:?}",
            config.download.out_path
        )
    })?;

    let ffmpeg = showtape_av::resolve_tool(
        showtape_av::FFMPEG,
        config.tools.ffmpeg_path.as_deref(),
    )
    .unwrap_or_else(|e| {
        tracing::warn!("{}; remuxing will fail until ffmpeg is installed", e);
        PathBuf::from(showtape_av::FFMPEG)
    });

    let client = http::build_client()?;
    let processor = Processor::new(&config, client, ffmpeg);
    let report = processor.run(&urls).await;

    tracing::info!(
        "Done: {} succeeded, {} failed, {} invalid",
        report.succeeded,
        report.failed,
        report.invalid
    );

    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    println!("Checking external tools...\n");

    let config = config::load_config_or_default(config_path)?;
    let program = config
        .tools
        .ffmpeg_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(showtape_av::FFMPEG));
    let tool = showtape_av::check_version(&program, "-version");

    let status = if tool.available { "✓" } else { "✗" };
    print!("{} {}", status, tool.name);
    if let Some(ref version) = tool.version {
        print!(" ({})", version);
    }
    if let Some(ref path) = tool.resolved {
        print!(" - {}", path.display());
    }
    println!();

    println!();
    if tool.available {
        println!("All required tools are available!");
    } else {
        println!("ffmpeg is missing. Videos and HLS-only tracks cannot be remuxed without it.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Track format: {}", config.download.format);
            println!(
                "  Video format: {}p",
                config.download.video_format.height()
            );
            println!("  Output path: {}", config.download.out_path.display());
            println!("  API base: {}", config.api.base_url);
            println!(
                "  Stream parameters: {}",
                if config::require_stream_params(&config.stream).is_ok() {
                    "set"
                } else {
                    "missing"
                }
            );
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Track format: {}", config.download.format);
            println!("  Output path: {}", config.download.out_path.display());
        }
    }

    Ok(())
}
