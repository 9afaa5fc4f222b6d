use clap::{Args, Parser, Subcommand};
use cw_compose::{ChipComposer, ChipFeatures, ComposeResult, config_digest, to_json_string};
use cw_template::{Template, TemplateLoader};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cw-cli")]
#[command(about = "chipweave CLI - compose wired chip configurations for the simulator", long_about = None)]
struct Cli {
    /// Log composition steps and bindings
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct TemplateArgs {
    /// Path to the chip template (YAML or JSON)
    template_path: PathBuf,
    /// Extra directory to search for included files (repeatable)
    #[arg(short = 'I', long = "include-dir")]
    include_dirs: Vec<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose the chip and write its JSON configuration
    Compose {
        #[command(flatten)]
        template: TemplateArgs,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show which optional blocks the template enables
    Features {
        #[command(flatten)]
        template: TemplateArgs,
    },
    /// Print the SHA-256 digest of the composed configuration
    Digest {
        #[command(flatten)]
        template: TemplateArgs,
    },
}

fn main() -> ComposeResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Compose { template, output } => cmd_compose(&template, output.as_deref()),
        Commands::Features { template } => cmd_features(&template),
        Commands::Digest { template } => cmd_digest(&template),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn loader(args: &TemplateArgs) -> TemplateLoader {
    let mut loader = TemplateLoader::from_env();
    if let Some(dir) = args.template_path.parent() {
        loader = loader.with_search_dir(dir);
    }
    for dir in &args.include_dirs {
        loader = loader.with_search_dir(dir);
    }
    loader
}

fn load(args: &TemplateArgs) -> ComposeResult<(TemplateLoader, Template)> {
    let loader = loader(args);
    let template = loader.load(&args.template_path)?;
    Ok((loader, template))
}

fn cmd_compose(args: &TemplateArgs, output: Option<&Path>) -> ComposeResult<()> {
    let (loader, template) = load(args)?;
    let config = ChipComposer::new(loader).get_config(&template)?;
    let text = to_json_string(&config)?;

    match output {
        Some(path) => {
            std::fs::write(path, text)?;
            info!(path = %path.display(), "configuration written");
            eprintln!("✓ Configuration written to {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

fn cmd_features(args: &TemplateArgs) -> ComposeResult<()> {
    let (loader, template) = load(args)?;
    let features = ChipFeatures::from_template(&template)?;

    println!("Chip: {} (family {})", features.chip_name, features.chip_family);
    if features.has_cluster {
        println!("  Clusters: {}", features.nb_cluster);
    }
    let enabled = features.enabled();
    if enabled.is_empty() {
        println!("  No optional blocks enabled");
    } else {
        println!("  Enabled: {}", enabled.join(", "));
    }

    println!("Wiring steps:");
    for step in ChipComposer::new(loader).steps() {
        let mark = if step.enabled(&features) { "✓" } else { "-" };
        println!("  {} {}", mark, step.name);
    }
    Ok(())
}

fn cmd_digest(args: &TemplateArgs) -> ComposeResult<()> {
    let (loader, template) = load(args)?;
    let config = ChipComposer::new(loader).get_config(&template)?;
    println!("{}", config_digest(&config)?);
    Ok(())
}
