//! holokg CLI: holographic knowledge graph over hyperdimensional vectors.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use holokg::config::{CONFIG_FILE, HoloConfig};
use holokg::export::FactExport;
use holokg::graph::{Fact, HoloGraph};
use holokg::reason::ReasoningEngine;
use holokg::store::HoloStore;

const DEFAULT_DATA_DIR: &str = ".holokg";

#[derive(Parser)]
#[command(name = "holokg", version, about = "Holographic knowledge graph")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory for persistent storage.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Hypervector dimension (overrides the config file).
    #[arg(long, global = true)]
    dimension: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new holokg data directory.
    Init,

    /// Learn a single fact.
    Learn {
        subject: String,
        relation: String,
        object: String,
    },

    /// Learn facts from a JSON file.
    Ingest {
        /// JSON array of {"subject", "relation", "object", "weight"?} objects.
        #[arg(long)]
        file: PathBuf,
    },

    /// Ask for the object of (subject, relation).
    Ask { subject: String, relation: String },

    /// Follow a chain of relations from a start concept.
    Hop {
        start: String,
        relations: Vec<String>,
    },

    /// Show the concepts nearest to a concept's prototype.
    Decode {
        name: String,

        /// Number of matches to show.
        #[arg(long, default_value = "5")]
        top_k: usize,
    },

    /// Show graph info and statistics.
    Info,

    /// Export concepts and facts as JSON.
    Export,
}

fn resolve_config(cli: &Cli) -> Result<HoloConfig> {
    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
    let mut config = HoloConfig::discover(cli.config.as_deref(), &data_dir)?;
    if let Some(dimension) = cli.dimension {
        config.dimension = dimension;
    }
    if cli.data_dir.is_some() || config.data_dir.is_none() {
        config.data_dir = Some(data_dir);
    }
    config.validate()?;
    Ok(config)
}

fn open(config: &HoloConfig) -> Result<(HoloStore, HoloGraph)> {
    let data_dir = config
        .data_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
    let store = HoloStore::open(&data_dir)?;
    let graph = store.load(config)?;
    Ok((store, graph))
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    match cli.command {
        Commands::Init => {
            let (store, mut graph) = open(&config)?;
            store.save(&graph)?;
            if let Some(dir) = &config.data_dir {
                config.save(&dir.join(CONFIG_FILE))?;
                println!("Initialized holokg at {}", dir.display());
            }
            print!("{}", graph.stats()?);
        }

        Commands::Learn {
            subject,
            relation,
            object,
        } => {
            let (store, mut graph) = open(&config)?;
            graph.learn(&subject, &relation, &object)?;
            store.save(&graph)?;
            println!("Learned {}", Fact::new(subject, relation, object));
        }

        Commands::Ingest { file } => {
            let (store, mut graph) = open(&config)?;
            let content = std::fs::read_to_string(&file).into_diagnostic()?;
            let facts: Vec<FactExport> = serde_json::from_str(&content).into_diagnostic()?;
            for f in &facts {
                graph.learn_weighted(
                    Fact::new(f.subject.clone(), f.relation.clone(), f.object.clone()),
                    f.weight,
                )?;
            }
            store.save(&graph)?;
            println!("Ingested {} facts from {}", facts.len(), file.display());
            print!("{}", graph.stats()?);
        }

        Commands::Ask { subject, relation } => {
            let (_store, mut graph) = open(&config)?;
            let answer = graph.ask(&subject, &relation)?;
            match answer.similarity() {
                Some(sim) => println!("{answer}  (similarity {sim:.4})"),
                None => println!("{answer}"),
            }
        }

        Commands::Hop { start, relations } => {
            let (_store, mut graph) = open(&config)?;
            let relations: Vec<&str> = relations.iter().map(String::as_str).collect();
            let trace = ReasoningEngine::new().multi_hop_trace(&mut graph, &start, &relations)?;
            println!("{trace}");
            println!("=> {}", trace.answer);
        }

        Commands::Decode { name, top_k } => {
            let (_store, graph) = open(&config)?;
            match graph.memory().get(&name) {
                Some(proto) => {
                    let matches = graph.memory().top_k(graph.ops(), proto, top_k)?;
                    for (i, m) in matches.iter().enumerate() {
                        println!("  {}. {} ({:.4})", i + 1, m.name, m.similarity);
                    }
                }
                None => println!("Concept \"{name}\" is not defined."),
            }
        }

        Commands::Info => {
            let (store, mut graph) = open(&config)?;
            print!("{}", graph.stats()?);
            println!("  store:        {}", store.path().display());
        }

        Commands::Export => {
            let (_store, graph) = open(&config)?;
            let json = serde_json::to_string_pretty(&graph.export()).into_diagnostic()?;
            println!("{json}");
        }
    }

    Ok(())
}
