use anyhow::Result;
use clap::Parser;

use recommended_bump::config;
use recommended_bump::ui;
use recommended_bump::{recommended_bump, ParserOptions};

#[derive(clap::Parser)]
#[command(
    name = "recommended-bump",
    version,
    about = "Recommend a semantic version bump from the commits since the last release tag"
)]
struct Args {
    #[arg(short, long, help = "Preset to use, e.g. angular or conventionalcommits")]
    preset: Option<String>,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, help = "Only consider commits touching this path")]
    path: Option<String>,

    #[arg(short, long, help = "Only consider release tags of this package (<name>@<version>)")]
    lerna_package: Option<String>,

    #[arg(long, help = "Keep commits that were later reverted")]
    keep_reverted: bool,

    #[arg(long, help = "Regex matching commit headers")]
    header_pattern: Option<String>,

    #[arg(
        long,
        value_delimiter = ',',
        help = "Comma-separated names of the header pattern groups, e.g. type,scope,subject"
    )]
    header_correspondence: Option<Vec<String>>,

    #[arg(short, long, help = "Print the reason and any advisory messages")]
    verbose: bool,

    #[arg(long, help = "Print the full recommendation as JSON")]
    json: bool,
}

#[tokio::main]
async fn main() {
    // Write to stderr so logs don't interfere with the recommendation on stdout
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        ui::display_error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let (mut options, file_parser_opts) = config::load_config(args.config.as_deref())?.into_parts();

    if args.preset.is_some() {
        options.preset = args.preset;
    }
    if args.path.is_some() {
        options.path = args.path;
    }
    if args.lerna_package.is_some() {
        options.lerna_package = args.lerna_package;
    }
    if args.keep_reverted {
        options.ignore_reverted = false;
    }
    if args.verbose {
        options = options.with_warn(ui::display_warning);
    }

    let cli_parser_opts = ParserOptions {
        header_pattern: args.header_pattern,
        header_correspondence: args.header_correspondence,
        ..Default::default()
    };
    let parser_opts = file_parser_opts.merge(cli_parser_opts);

    let result = recommended_bump(options, parser_opts).await?;

    if args.json {
        ui::display_json(&result)?;
    } else {
        ui::display_recommendation(&result, args.verbose);
    }

    Ok(())
}
