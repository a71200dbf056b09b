//! colophon: A markdown specification assembler.
#![allow(clippy::multiple_crate_versions)]

use clap::{Parser, Subcommand};
use colophon::{
    anchor, config, dedup::DedupPolicy, fragment, renumber::SectionNumberMap, Assembler, Error,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "colophon")]
#[command(about = "Assemble markdown specification fragments into one document", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Configuration file (defaults to colophon.toml in the working directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Compile the fragments under ROOT into a single document
    Build {
        /// Specification root holding the category directories
        root: PathBuf,

        /// Output file (defaults to the configured name inside ROOT)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Document title
        #[arg(long)]
        title: Option<String>,

        /// Heading deduplication policy
        #[arg(long, value_enum)]
        dedup: Option<DedupPolicy>,

        #[command(flatten)]
        map: MapArgs,

        /// Print the run report as JSON on stdout
        #[arg(long)]
        report: bool,
    },
    /// Print the fragments under ROOT in reading order
    Order {
        /// Specification root holding the category directories
        root: PathBuf,
    },
    /// Rewrite legacy section numbers in fragment files
    Renumber {
        /// Fragment files to rewrite in place
        #[arg(required = true, value_name = "PATH")]
        files: Vec<PathBuf>,

        #[command(flatten)]
        map: MapArgs,

        /// Category to renumber as, instead of the one derived from each file name
        #[arg(long)]
        category: Option<String>,

        /// Print the rewritten text instead of writing it back
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the link anchor for a heading
    Anchor {
        /// Heading text
        #[arg(required = true)]
        text: Vec<String>,
    },
}

#[derive(clap::Args)]
#[group(multiple = false)]
struct MapArgs {
    /// Section number map (JSON)
    #[arg(long, value_name = "FILE")]
    map: Option<PathBuf>,

    /// Use the built-in legacy type-system map
    #[arg(long)]
    legacy_map: bool,
}

impl MapArgs {
    fn load(&self) -> Result<Option<SectionNumberMap>, Error> {
        if let Some(path) = &self.map {
            let map = SectionNumberMap::from_json(path)?;
            if map.is_empty() {
                tracing::warn!(path = %path.display(), "section number map has no rules");
            }
            tracing::debug!(
                path = %path.display(),
                categories = ?map.categories().collect::<Vec<_>>(),
                "loaded section number map"
            );
            return Ok(Some(map));
        }
        Ok(self.legacy_map.then(SectionNumberMap::legacy_type_system))
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "colophon=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let cfg = match &args.config {
        Some(path) => config::Config::load_from(path),
        None => config::Config::load(),
    };

    match run(args.command, cfg) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, mut cfg: config::Config) -> Result<(), Error> {
    match command {
        Command::Build {
            root,
            output,
            title,
            dedup,
            map,
            report,
        } => {
            // Override config with command line args
            if let Some(title) = title {
                cfg.title = title;
            }
            let output = output.unwrap_or_else(|| root.join(&cfg.output));
            let map = map.load()?;

            let mut assembler = Assembler::new(&cfg);
            if let Some(policy) = dedup {
                assembler = assembler.with_policy(policy);
            }
            if let Some(map) = &map {
                assembler = assembler.with_renumbering(map);
            }

            let document = assembler.compile(&root)?;
            document.write(&output)?;
            tracing::info!(output = %output.display(), "wrote compiled specification");

            if report {
                match serde_json::to_string_pretty(&document.report) {
                    Ok(json) => println!("{json}"),
                    Err(e) => tracing::error!(error = %e, "could not serialise report"),
                }
            }
            Ok(())
        }
        Command::Order { root } => {
            let discovery = Assembler::new(&cfg).discover(&root)?;
            for fragment in &discovery.fragments {
                println!("{}", fragment.relative.display());
            }
            Ok(())
        }
        Command::Renumber {
            files,
            map,
            category,
            dry_run,
        } => {
            let map = map
                .load()?
                .unwrap_or_else(SectionNumberMap::legacy_type_system);
            for path in &files {
                renumber_file(&map, path, category.as_deref(), dry_run)?;
            }
            Ok(())
        }
        Command::Anchor { text } => {
            println!("{}", anchor::anchor(&text.join(" ")));
            Ok(())
        }
    }
}

fn renumber_file(
    map: &SectionNumberMap,
    path: &Path,
    category: Option<&str>,
    dry_run: bool,
) -> Result<(), Error> {
    let category = category.map_or_else(|| fragment::category_of(path), str::to_string);
    if !map.has_category(&category) {
        tracing::warn!(path = %path.display(), %category, "no renumbering rules for category");
        return Ok(());
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable file");
            return Ok(());
        }
    };

    let result = map.renumber(&category, &content);
    tracing::info!(
        path = %path.display(),
        %category,
        headings = result.headings,
        references = result.references,
        markers = result.markers,
        labels = result.labels,
        "renumbered"
    );

    if dry_run {
        print!("{}", result.text);
        return Ok(());
    }
    fs::write(path, &result.text).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })
}
