use anyhow::{Context, Result};
use caramba_inbound::{ErrorList, InboundSet, Synthesizer, catalog, keys, presets};
use clap::{Parser, Subcommand};
use console::style;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::exit;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod input;

use config::SynthConfig;

#[derive(Parser)]
#[command(name = "caramba-synth")]
#[command(about = "Caramba inbound config synthesizer", long_about = None)]
struct Cli {
    /// Policy file (reserved ports, minimum secret length)
    #[arg(long, global = true, env = "SYNTH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize inbounds from a TOML or JSON spec file
    Build {
        /// Spec file with an `inbounds` list
        #[arg(long, short)]
        input: PathBuf,
        /// Write the result here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Seed for generated ids and keys
        #[arg(long, env = "SYNTH_SEED")]
        seed: Option<u64>,
    },
    /// List supported protocol/transport/security combinations
    Catalog {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },
    /// Synthesize the seven stock inbounds on consecutive ports
    Presets {
        #[arg(long, default_value_t = 443, env = "SYNTH_BASE_PORT")]
        base_port: u16,
        /// REALITY camouflage host and TLS certificate domain
        #[arg(long, env = "SYNTH_SNI")]
        sni: String,
        #[arg(long, short)]
        output: Option<PathBuf>,
        #[arg(long, env = "SYNTH_SEED")]
        seed: Option<u64>,
    },
    /// Generate a REALITY keypair and short id
    Keygen,
}

fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "caramba_synth=info,caramba_inbound=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => {}
        Err(e) => {
            match e.downcast_ref::<ErrorList>() {
                Some(errors) => print_errors(errors),
                None => eprintln!("{}", style(format!("Error: {:#}", e)).red()),
            }
            exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Build { input, output, seed } => {
            let synth = synthesizer(cli.config.as_deref())?;
            let specs = input::load_specs(&input)?;
            let set = synthesize(&synth, &specs, seed)?;
            emit(&set, output.as_deref())
        }
        Commands::Catalog { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(catalog::entries())?);
            } else {
                print_catalog();
            }
            Ok(())
        }
        Commands::Presets {
            base_port,
            sni,
            output,
            seed,
        } => {
            let synth = synthesizer(cli.config.as_deref())?;
            let specs = presets::standard_set(base_port, &sni);
            let set = synthesize(&synth, &specs, seed)?;
            emit(&set, output.as_deref())
        }
        Commands::Keygen => {
            let mut rng = rand::rng();
            let pair = keys::generate_reality_keypair(&mut rng);
            println!("Private key: {}", pair.private_key);
            println!("Public key:  {}", pair.public_key);
            println!("Short id:    {}", keys::generate_short_id(&mut rng));
            Ok(())
        }
    }
}

fn synthesizer(config: Option<&Path>) -> Result<Synthesizer> {
    let config = SynthConfig::load(config)?;
    Ok(Synthesizer::new(config.policy()))
}

fn synthesize(
    synth: &Synthesizer,
    specs: &[caramba_inbound::InboundSpec],
    seed: Option<u64>,
) -> Result<InboundSet> {
    let set = match seed {
        Some(seed) => synth.synthesize_with(specs, &mut StdRng::seed_from_u64(seed))?,
        None => synth.synthesize(specs)?,
    };
    Ok(set)
}

fn emit(set: &InboundSet, output: Option<&Path>) -> Result<()> {
    let json = set.to_json_pretty()?;
    match output {
        Some(path) => {
            fs::write(path, json + "\n").with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{}",
                style(format!("Wrote {} inbound(s) to {}", set.len(), path.display())).green()
            );
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn print_catalog() {
    println!("{}", style("Supported inbounds").bold().cyan());
    for entry in catalog::entries() {
        let required: Vec<&str> = entry
            .required_fields()
            .map(|f| f.name)
            .filter(|n| !matches!(*n, "port" | "tag"))
            .collect();
        let suffix = if required.is_empty() {
            String::new()
        } else {
            format!("  requires {}", required.join(", "))
        };
        println!(
            "  {:<12} {:<12} {:<8} {}{}",
            entry.protocol.as_str(),
            entry.transport.as_str(),
            entry.security.as_str(),
            style(entry.label()).dim(),
            suffix
        );
    }
}

fn print_errors(errors: &ErrorList) {
    eprintln!("{}", style(errors.to_string()).red().bold());
    for e in errors {
        eprintln!("  {} {}", style("✗").red(), e);
    }
}
