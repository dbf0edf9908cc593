//! Command line interface of sMOMENT.rs
//!
//! Every step of a model building project is one subcommand, the data files written by one step
//! are read by the next:
//! ```text
//! smomentrs combine --first sabio.json --second brenda.json --output combined.json
//! smomentrs kcat-mapping --model model.json --kcat-database combined.json \
//!     --organism "Escherichia coli" --taxonomy lineages.json --output kcats.json
//! smomentrs initial-stoichiometries --model model.json --output stoichiometries.json
//! smomentrs smoment --model model.json --masses masses.json --protein-data protein_data.json \
//!     --stoichiometries stoichiometries.json --kcats kcats.json --output model_sMOMENT.json
//! smomentrs flux-control --model model_sMOMENT.json --scenarios scenarios.json \
//!     --project iJO1366 --output-dir flux_control/
//! smomentrs differential --scenarios scenarios.json --project iJO1366 --flux-control-dir flux_control/
//! ```
use std::error::Error;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use indexmap::IndexSet;
use log::info;

use smomentrs_core::analysis::differential::{get_differential_reactions, DEFAULT_THRESHOLD};
use smomentrs_core::analysis::flux_control::{
    flux_control_by_scenario, read_flux_control_files, write_flux_control_files,
};
use smomentrs_core::analysis::fva_prot_pool::fva_prot_pool;
use smomentrs_core::analysis::scenario::read_scenarios;
use smomentrs_core::cache::JsonFileCache;
use smomentrs_core::enhance::gecko::create_gecko_model;
use smomentrs_core::enhance::manual_changes::{apply_manual_changes, read_kcat_changes};
use smomentrs_core::enhance::protein_data::ProteinData;
use smomentrs_core::enhance::smoment::create_smoment_model;
use smomentrs_core::enhance::{Enhancement, EnhancementInput, SmomentOptions};
use smomentrs_core::io::project::{read_json_file, EnzymeStoichiometries, ProteinMasses};
use smomentrs_core::kcat::combine::{combine_kcat_databases, NamedDatabase};
use smomentrs_core::kcat::database::KcatDatabase;
use smomentrs_core::kcat::protein_database::ProteinKcatDatabase;
use smomentrs_core::kcat::selection::{get_reactions_kcat_mapping, KcatSelector};
use smomentrs_core::kcat::taxonomy::{CachedTaxonomy, Lineage, StaticTaxonomy, TaxonomyProvider};
use smomentrs_core::kcat::{KcatSelection, ReactionKcatMapping};
use smomentrs_core::metabolic_model::model::Model;
use smomentrs_core::optimize::solvers::clarabel::ClarabelSolver;

#[derive(Parser, Debug)]
#[command(name = "smomentrs", version, about = "Build and analyse protein-constrained metabolic models")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Combine two kcat databases into one
    Combine(CombineArgs),
    /// Create the initial enzyme stoichiometry table from the gene rules of a model
    InitialStoichiometries(InitialStoichiometriesArgs),
    /// Select forward and reverse kcats for every reaction of a model
    KcatMapping(KcatMappingArgs),
    /// Build the sMOMENT model
    Smoment(AssemblyArgs),
    /// Build the GECKO model
    Gecko(AssemblyArgs),
    /// Scale the enzyme costs of selected reactions of a protein-constrained model
    ManualChanges(ManualChangesArgs),
    /// Calculate the flux control of the enzyme constraints under every scenario
    FluxControl(FluxControlArgs),
    /// Find the differential reactions of previously calculated flux control files
    Differential(DifferentialArgs),
    /// Run flux variability analyses for several protein pool sizes
    FvaProtPool(FvaProtPoolArgs),
}

#[derive(Args, Debug)]
struct CombineArgs {
    /// First kcat database
    #[arg(long)]
    first: PathBuf,
    /// Name recorded as the source of entries taken from the first database
    #[arg(long, default_value = "SABIO-RK")]
    first_name: String,
    /// Second kcat database
    #[arg(long)]
    second: PathBuf,
    /// Name recorded as the source of entries taken from the second database
    #[arg(long, default_value = "BRENDA")]
    second_name: String,
    #[arg(long)]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct InitialStoichiometriesArgs {
    #[arg(long)]
    model: PathBuf,
    #[arg(long)]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct KcatMappingArgs {
    #[arg(long)]
    model: PathBuf,
    /// Combined kcat database
    #[arg(long)]
    kcat_database: PathBuf,
    /// Organism of the model, used to rank the kcats by taxonomic distance
    #[arg(long)]
    organism: String,
    /// Lineages of the organisms in the kcat database, `{organism: [taxa...]}`
    #[arg(long)]
    taxonomy: PathBuf,
    /// Cache file for looked up lineages
    #[arg(long)]
    taxonomy_cache: Option<PathBuf>,
    /// Protein specific kcats, preferred over the database kcats
    #[arg(long)]
    protein_kcats: Option<PathBuf>,
    /// How a kcat is derived from the collected samples: mean, median or random
    #[arg(long, default_value = "median")]
    selection: KcatSelection,
    /// Seed for the random selection
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct AssemblyArgs {
    #[arg(long)]
    model: PathBuf,
    /// Protein masses in kDa
    #[arg(long)]
    masses: PathBuf,
    #[arg(long)]
    protein_data: PathBuf,
    #[arg(long)]
    stoichiometries: PathBuf,
    /// Reaction kcat mapping
    #[arg(long)]
    kcats: PathBuf,
    /// JSON file with the assembly options
    #[arg(long)]
    options: Option<PathBuf>,
    /// Reactions which get no enzyme constraint, added to those of the options file
    #[arg(long, value_delimiter = ',')]
    exclude: Vec<String>,
    /// Selection of the default kcat, overrides the options file
    #[arg(long)]
    default_kcat_selection: Option<KcatSelection>,
    /// Seed for the random default kcat, overrides the options file
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct ManualChangesArgs {
    #[arg(long)]
    model: PathBuf,
    /// `{reaction: [direction, factor]}`
    #[arg(long)]
    changes: PathBuf,
    #[arg(long)]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct FluxControlArgs {
    #[arg(long)]
    model: PathBuf,
    #[arg(long)]
    scenarios: PathBuf,
    /// Project name, the flux control files are prefixed with it
    #[arg(long)]
    project: String,
    #[arg(long)]
    output_dir: PathBuf,
}

#[derive(Args, Debug)]
struct DifferentialArgs {
    #[arg(long)]
    scenarios: PathBuf,
    #[arg(long)]
    project: String,
    #[arg(long)]
    flux_control_dir: PathBuf,
    /// Minimal relative change of a differential reaction
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f64,
}

#[derive(Args, Debug)]
struct FvaProtPoolArgs {
    #[arg(long)]
    model: PathBuf,
    /// Upper bounds of the protein pool reaction
    #[arg(long, value_delimiter = ',', required = true)]
    pool_bounds: Vec<f64>,
    /// Reaction to maximize instead of the model's objective
    #[arg(long)]
    objective: Option<String>,
    /// Reactions whose flux ranges are reported, all reactions if left out
    #[arg(long, value_delimiter = ',')]
    reactions: Vec<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Combine(args) => combine(args),
        Commands::InitialStoichiometries(args) => initial_stoichiometries(args),
        Commands::KcatMapping(args) => kcat_mapping(args),
        Commands::Smoment(args) => assemble(args, create_smoment_model),
        Commands::Gecko(args) => assemble(args, create_gecko_model),
        Commands::ManualChanges(args) => manual_changes(args),
        Commands::FluxControl(args) => flux_control(args),
        Commands::Differential(args) => differential(args),
        Commands::FvaProtPool(args) => fva(args),
    }
}

fn combine(args: CombineArgs) -> Result<(), Box<dyn Error>> {
    let first = KcatDatabase::read(&args.first)?;
    let second = KcatDatabase::read(&args.second)?;
    let combined = combine_kcat_databases(
        NamedDatabase::new(&args.first_name, &first),
        NamedDatabase::new(&args.second_name, &second),
    );
    info!("Combined database holds {} EC numbers", combined.len());
    combined.write(&args.output)?;
    Ok(())
}

fn initial_stoichiometries(args: InitialStoichiometriesArgs) -> Result<(), Box<dyn Error>> {
    let model = Model::read_json(&args.model)?;
    let table = EnzymeStoichiometries::from_model(&model)?;
    info!("{} reactions have a gene rule", table.len());
    table.write(&args.output)?;
    Ok(())
}

fn kcat_mapping(args: KcatMappingArgs) -> Result<(), Box<dyn Error>> {
    let model = Model::read_json(&args.model)?;
    let database = KcatDatabase::read(&args.kcat_database)?;
    let protein_kcats = args
        .protein_kcats
        .as_ref()
        .map(ProteinKcatDatabase::read)
        .transpose()?;
    let lineages = StaticTaxonomy::read(&args.taxonomy)?;
    let mut taxonomy: Box<dyn TaxonomyProvider> = match &args.taxonomy_cache {
        Some(path) => {
            let cache = JsonFileCache::<Option<Lineage>>::open(path)?;
            Box::new(CachedTaxonomy::new(lineages, cache))
        }
        None => Box::new(lineages),
    };

    let mut selector = KcatSelector::new(&args.organism, &database, taxonomy.as_mut(), args.selection);
    if let Some(protein_kcats) = &protein_kcats {
        selector = selector.with_protein_kcat_database(protein_kcats);
    }
    if let Some(seed) = args.seed {
        selector = selector.with_seed(seed);
    }
    let mapping = get_reactions_kcat_mapping(&model, &mut selector);
    info!("Found kcats for {} reactions", mapping.len());
    mapping.write(&args.output)?;
    Ok(())
}

fn assemble<F, E>(args: AssemblyArgs, create: F) -> Result<(), Box<dyn Error>>
where
    F: FnOnce(Model, EnhancementInput, &SmomentOptions) -> Result<Enhancement, E>,
    E: Error + 'static,
{
    let model = Model::read_json(&args.model)?;
    let masses: ProteinMasses = read_json_file(&args.masses)?;
    let protein_data = ProteinData::read(&args.protein_data)?;
    let stoichiometries = EnzymeStoichiometries::read(&args.stoichiometries)?;
    let kcats = ReactionKcatMapping::read(&args.kcats)?;

    let mut options: SmomentOptions = match &args.options {
        Some(path) => read_json_file(path)?,
        None => SmomentOptions::default(),
    };
    options.excluded_reactions.extend(args.exclude);
    if let Some(selection) = args.default_kcat_selection {
        options.default_kcat_selection = selection;
    }
    if args.seed.is_some() {
        options.seed = args.seed;
    }

    let input = EnhancementInput {
        masses: &masses,
        protein_data: &protein_data,
        stoichiometries: &stoichiometries,
        kcats: &kcats,
    };
    let enhancement = create(model, input, &options)?;
    info!("{}", enhancement.report);
    enhancement.model.write_json(&args.output)?;
    Ok(())
}

fn manual_changes(args: ManualChangesArgs) -> Result<(), Box<dyn Error>> {
    let mut model = Model::read_json(&args.model)?;
    let changes = read_kcat_changes(&args.changes)?;
    apply_manual_changes(&mut model, &changes)?;
    info!("Applied {} kcat changes", changes.len());
    model.write_json(&args.output)?;
    Ok(())
}

fn flux_control(args: FluxControlArgs) -> Result<(), Box<dyn Error>> {
    let mut model = Model::read_json(&args.model)?;
    let scenarios = read_scenarios(&args.scenarios)?;
    let tables = flux_control_by_scenario(&mut model, &ClarabelSolver::new(), &scenarios)?;
    for path in write_flux_control_files(&args.output_dir, &args.project, &tables)? {
        info!("Wrote {}", path.display());
    }
    Ok(())
}

fn differential(args: DifferentialArgs) -> Result<(), Box<dyn Error>> {
    let scenarios = read_scenarios(&args.scenarios)?;
    let names: Vec<String> = scenarios.keys().cloned().collect();
    let tables = read_flux_control_files(&args.flux_control_dir, &args.project, &names)?;
    let result = get_differential_reactions(&tables, &scenarios, args.threshold);
    for (scenario, reactions) in &result.unique {
        println!("Unique differential reactions of {scenario}: {}", join(reactions));
    }
    println!("Differential reactions of all scenarios: {}", join(&result.common));
    Ok(())
}

fn fva(args: FvaProtPoolArgs) -> Result<(), Box<dyn Error>> {
    let mut model = Model::read_json(&args.model)?;
    let results = fva_prot_pool(
        &mut model,
        &ClarabelSolver::new(),
        &args.pool_bounds,
        args.objective.as_deref(),
        &args.reactions,
    )?;
    for result in results {
        println!(
            "Protein pool upper bound {}: objective {}",
            result.pool_upper_bound,
            result.solution.optimal_value()?
        );
        println!("Reaction\tMinimum\tMaximum");
        for (reaction, range) in &result.ranges {
            println!("{reaction}\t{}\t{}", range.minimum, range.maximum);
        }
    }
    Ok(())
}

fn join(reactions: &IndexSet<String>) -> String {
    reactions
        .iter()
        .map(String::as_str)
        .collect::<Vec<&str>>()
        .join(", ")
}
