//! gif CLI - Command line interface for gifbox
//!
//! Status lines for multi-entry operations go to stdout as
//! `[kind]\t{id prefix}\t{message}`; diagnostics go to stderr via tracing.

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use gifbox::{
    Config, ExportOptions, Fetcher, Filter, ImageEntry, LineSink, NullFilter, Order,
    OrderAndLimit, RemoteFilter, Store, TagFilter, TypeFilter,
};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gif")]
#[command(about = "A content-addressed store for your image collection")]
#[command(version)]
struct Cli {
    /// Path to the store (defaults to $GIFBOX_STORE or the platform data dir)
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Output format for listings (json or text)
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Args, Clone, Debug)]
struct FilterArgs {
    /// Only images of this file type (e.g. gif, png)
    #[arg(short = 't', long = "type")]
    file_type: Option<String>,

    /// Only images carrying this tag
    #[arg(long)]
    tag: Option<String>,

    /// Sort order: newest, oldest or largest
    #[arg(short, long, default_value = "newest")]
    order: Order,

    /// Maximum number of images
    #[arg(short, long)]
    limit: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a single image from a URL or a file
    Add {
        /// URL or file path
        location: String,
        /// Tags to attach (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Import a bundle, a metadata file, or a directory of images
    Import {
        /// URL, file or directory
        location: String,
        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,
    },

    /// Export the store as metadata or as a bundle
    Export {
        /// Output file, "-" for stdout
        #[arg(short, long, default_value = "-")]
        output: String,
        /// Include content (implied by a .tar.gz or .gifb output name)
        #[arg(short, long)]
        bundle: bool,
    },

    /// List stored images
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Print source URLs of stored images
    Urls {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Print on-disk paths of stored images
    Paths {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Open stored images with the default viewer
    Open {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Delete the whole store
    Purge {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let store = open_store(cli.store.as_ref())?;

    match cli.command {
        Commands::Add { location, tags } => {
            let image = if is_url(&location) {
                ImageEntry::from_url(&location, fetcher()?.as_ref())?
            } else {
                ImageEntry::from_file(&location)
                    .with_context(|| format!("Could not read {}", location))?
            };
            let mut sink = LineSink::new(std::io::stdout());
            store.add(image.with_tags(tags), &mut sink);
            store.sync()?;
        }

        Commands::Import {
            location,
            recursive,
        } => {
            let fetcher = fetcher()?;
            let mut sink = LineSink::new(std::io::stdout());
            let summary =
                gifbox::import_location(&store, &location, recursive, fetcher.as_ref(), &mut sink)
                    .context("Import error")?;
            tracing::info!(?summary, "import done");
        }

        Commands::Export { output, bundle } => {
            let include_content = bundle || is_bundle_name(&output);

            // Local images cannot be re-fetched, so metadata-only exports skip them
            let filter: Box<dyn Filter> = if include_content {
                Box::new(NullFilter)
            } else {
                Box::new(RemoteFilter::new(NullFilter))
            };
            let options = ExportOptions {
                include_content,
                ..ExportOptions::default()
            };

            let target: Box<dyn Write> = if output == "-" {
                Box::new(std::io::stdout())
            } else {
                Box::new(
                    std::fs::File::create(&output)
                        .with_context(|| format!("Could not create file {}", output))?,
                )
            };
            let mut writer = BufWriter::new(target);
            store
                .export(&mut writer, filter.as_ref(), options)
                .context("Export error")?;
            writer.flush()?;
        }

        Commands::List { filter } => {
            let images = store.list(build_filter(&filter, false).as_ref())?;
            match cli.format {
                OutputFormat::Json => {
                    let items: Vec<_> = images.iter().map(image_json).collect();
                    println!(
                        "{}",
                        serde_json::json!({
                            "count": items.len(),
                            "images": items
                        })
                    );
                }
                OutputFormat::Text => {
                    println!("{} images", images.len());
                    for image in &images {
                        println!(
                            "{}\t{}\t{}\t{}\t{}",
                            image.id.short(),
                            image.file_type,
                            image.size,
                            image.tags.join(","),
                            image.url
                        );
                    }
                }
            }
        }

        Commands::Urls { filter } => {
            for image in store.list(build_filter(&filter, true).as_ref())? {
                println!("{}", image.url);
            }
        }

        Commands::Paths { filter } => {
            for image in store.list(build_filter(&filter, false).as_ref())? {
                println!("{}", store.path_for(&image).display());
            }
        }

        Commands::Open { filter } => {
            for image in store.list(build_filter(&filter, false).as_ref())? {
                let path = store.path_for(&image);
                open::that(&path).with_context(|| format!("Could not open {}", path.display()))?;
            }
        }

        Commands::Purge { yes } => {
            if !yes {
                anyhow::bail!("Refusing to purge {} without --yes", store.path().display());
            }
            let path = store.path().to_path_buf();
            store.purge()?;
            println!("Purged {}", path.display());
        }
    }

    Ok(())
}

fn open_store(path: Option<&PathBuf>) -> anyhow::Result<Store> {
    let config = match path {
        Some(path) => Config::with_store_path(path),
        None => Config::from_env()?,
    };
    Store::open(config.store_path())
        .with_context(|| format!("Could not open store at {}", config.store_path().display()))
}

#[cfg(feature = "remote")]
fn fetcher() -> anyhow::Result<Box<dyn Fetcher>> {
    Ok(Box::new(gifbox::HttpFetcher::new()?))
}

#[cfg(not(feature = "remote"))]
fn fetcher() -> anyhow::Result<Box<dyn Fetcher>> {
    // Without HTTP support every URL behaves as unreachable
    Ok(Box::new(gifbox::MockFetcher::new()))
}

fn build_filter(args: &FilterArgs, remote_only: bool) -> Box<dyn Filter> {
    let mut filter: Box<dyn Filter> = Box::new(TypeFilter::new(NullFilter, args.file_type.clone()));
    if let Some(tag) = &args.tag {
        filter = Box::new(TagFilter::new(filter, tag.clone()));
    }
    if remote_only {
        filter = Box::new(RemoteFilter::new(filter));
    }
    Box::new(OrderAndLimit::new(filter, args.order, args.limit.unwrap_or(0)))
}

fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

fn is_bundle_name(output: &str) -> bool {
    output.ends_with(".tar.gz") || output.ends_with(".gifb")
}

fn image_json(image: &ImageEntry) -> serde_json::Value {
    serde_json::json!({
        "id": image.id.to_hex(),
        "url": image.url,
        "tags": image.tags,
        "addedAt": image.added_at.map(|t| t.to_rfc3339()),
        "size": image.size,
        "type": image.file_type
    })
}
