//! Factorio Production Calculator
//!
//! Command-line front end over the definitions database.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use factorio_calculator::graph::DemandGraph;
use factorio_calculator::settings::{DEFAULT_BELT, DEFAULT_DRILL, DEFAULT_FURNACE, UserSettings};
use factorio_calculator::{CalcError, db, defs, rates, report, resolver, sample};

#[derive(Parser)]
#[command(name = "factorio-calculator")]
#[command(about = "Production chain calculator for Factorio")]
struct Cli {
    /// Path to the SQLite database
    #[arg(short, long, default_value = "factorio_data.db", global = true)]
    database: PathBuf,

    /// Log debug output to stderr
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize empty database with schema
    Init,

    /// Import JSON definition files from a directory
    Import {
        /// Directory holding smeltables.json, furnaces.json, belts.json, drills.json, recipes.json
        defs_dir: PathBuf,

        /// Clear existing definitions before importing
        #[arg(long)]
        clear: bool,
    },

    /// Load the built-in vanilla definitions
    LoadSample,

    /// Calculate furnaces, drills and belts for smelting an ore
    Smelt {
        /// Ore to smelt (e.g., "iron-ore")
        ore: String,

        /// Desired output per second
        #[arg(short, long, conflicts_with = "furnaces")]
        rate: Option<f64>,

        /// Size the setup around this many furnaces instead
        #[arg(short, long)]
        furnaces: Option<f64>,

        #[arg(long, default_value = DEFAULT_DRILL)]
        drill: String,

        #[arg(long, default_value = DEFAULT_FURNACE)]
        furnace: String,

        #[arg(long, default_value = DEFAULT_BELT)]
        belt: String,

        /// Items stacked per belt slot
        #[arg(long, default_value = "1")]
        stack_size: f64,
    },

    /// Calculate the full ingredient chain for one or more items
    Calc {
        /// Items to produce (e.g., "electronic-circuit")
        #[arg(required = true)]
        items: Vec<String>,

        /// Target production rate per item, per second
        #[arg(short, long, default_value = "1.0")]
        rate: f64,

        /// Speed of the crafting building
        #[arg(long, default_value = "1.0")]
        crafting_speed: f64,

        /// Show detailed recipe tree
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the ingredient graph for an item in Graphviz format
    Graph {
        item: String,

        #[arg(short, long, default_value = "1.0")]
        rate: f64,
    },

    /// Check stored recipes for missing ingredients and cycles
    Validate,

    /// List all recipes in the database
    ListRecipes,

    /// List all furnaces, drills and belts in the database
    ListBuildings,
}

fn init_logging(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "warn" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let mut conn = Connection::open(&cli.database)
        .with_context(|| format!("Failed to open {}", cli.database.display()))?;
    db::init_schema(&conn)?;
    debug!(database = %cli.database.display(), "opened database");

    match cli.command {
        Commands::Init => {
            println!("Database initialized at: {}", cli.database.display());
        }

        Commands::Import { defs_dir, clear } => {
            if clear {
                info!("replacing existing definitions");
            }
            let stats = defs::import_to_database(&mut conn, &defs_dir, clear)?;
            println!("{}", stats);
        }

        Commands::LoadSample => {
            let definitions = sample::definitions();
            db::store_definitions(&mut conn, &definitions, true)?;
            println!("Loaded {} sample definitions", definitions.len());
        }

        Commands::Smelt {
            ore,
            rate,
            furnaces,
            drill,
            furnace,
            belt,
            stack_size,
        } => {
            let definitions = db::load_definitions(&conn)?;
            let settings = UserSettings {
                drill_type: drill,
                furnace_type: furnace,
                belt_type: belt,
                stack_size,
            };
            let smeltable = definitions
                .smeltables
                .get(&ore)
                .ok_or_else(|| CalcError::NotFound(ore.clone()))?;
            let setup = settings.setup(&definitions)?;

            let plan = match furnaces {
                Some(count) => rates::plan_from_building_count(smeltable, &setup, count)?,
                None => rates::plan_from_desired(smeltable, &setup, rate.unwrap_or(1.0))?,
            };
            println!("{}", report::format_smelting_plan(&ore, &settings, &plan));
        }

        Commands::Calc {
            items,
            rate,
            crafting_speed,
            verbose,
        } => {
            let registry = db::load_registry(&conn)?;
            let targets: Vec<(&str, f64)> = items.iter().map(|item| (item.as_str(), rate)).collect();
            let resolution = resolver::resolve_all(&registry, &targets)?;

            if verbose {
                println!("Recipe tree:\n");
                println!("{}", report::format_tree(&resolution));
            }

            let summary = report::summarize(&resolution, &registry, crafting_speed)?;
            println!("{}", summary);
        }

        Commands::Graph { item, rate } => {
            let registry = db::load_registry(&conn)?;
            let resolution = resolver::resolve(&registry, &item, rate)?;
            print!("{}", DemandGraph::from_resolution(&resolution).to_dot());
        }

        Commands::Validate => {
            let registry = db::load_registry(&conn)?;
            let missing = registry.missing_references();
            for (item, ingredient) in &missing {
                println!("'{}' needs '{}', which has no recipe", item, ingredient);
            }

            let cyclic = resolver::find_cycles(&registry);
            for item in &cyclic {
                println!("'{}' is part of a recipe cycle", item);
            }

            if !missing.is_empty() || !cyclic.is_empty() {
                bail!(
                    "{} missing ingredients, {} items in cycles",
                    missing.len(),
                    cyclic.len()
                );
            }
            println!("{} recipes OK", registry.len());
        }

        Commands::ListRecipes => {
            let recipes = db::list_recipes(&conn)?;
            if recipes.is_empty() {
                println!("No recipes in database. Run 'import' or 'load-sample' first.");
            } else {
                println!("{:<30} {:>6}", "Recipe", "Parts");
                println!("{}", "-".repeat(37));
                for (name, parts) in recipes {
                    if parts == 0 {
                        println!("{:<30} {:>6}", name, "raw");
                    } else {
                        println!("{:<30} {:>6}", name, parts);
                    }
                }
            }
        }

        Commands::ListBuildings => {
            let definitions = db::load_definitions(&conn)?;
            if definitions.furnaces.is_empty()
                && definitions.drills.is_empty()
                && definitions.belts.is_empty()
            {
                println!("No buildings in database. Run 'import' or 'load-sample' first.");
            } else {
                let mut furnaces: Vec<_> = definitions.furnaces.iter().collect();
                furnaces.sort_by(|a, b| a.0.cmp(b.0));
                println!("{:<30} {:>10} {:>12} {:>10}", "Furnace", "Speed", "Energy (kW)", "Fuel (kW)");
                for (name, f) in furnaces {
                    println!(
                        "{:<30} {:>10.2} {:>12.0} {:>10.0}",
                        name, f.base_smelting_speed, f.energy_consumption, f.fuel_consumption
                    );
                }

                let mut drills: Vec<_> = definitions.drills.iter().collect();
                drills.sort_by(|a, b| a.0.cmp(b.0));
                println!("\n{:<30} {:>10} {:>12}", "Drill", "Speed", "Pollution");
                for (name, d) in drills {
                    println!("{:<30} {:>10.2} {:>12.1}", name, d.mining_speed, d.pollution);
                }

                let mut belts: Vec<_> = definitions.belts.iter().collect();
                belts.sort_by(|a, b| a.0.cmp(b.0));
                println!("\n{:<30} {:>10}", "Belt", "Items/s");
                for (name, b) in belts {
                    println!("{:<30} {:>10.1}", name, b.speed);
                }
            }
        }
    }

    Ok(())
}
