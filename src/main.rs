use clap::{Parser as ClapParser, Subcommand};
use std::io::{self, Read};
use std::path::PathBuf;
use tablinq::cli::{self, CliError, CompileOutcome, QueryCommand, QueryOutput};
use tablinq::{Config, config, logger};

#[derive(ClapParser)]
#[command(name = "tq")]
#[command(about = "tq - Query JSON tables with lambda predicates, pushing filters down where possible")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to $TQ_CONFIG when set)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level: off, error, warn, info, debug or trace
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a query against JSON data
    Query {
        /// JSON file with an array of records or an object of tables (reads stdin if not provided)
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Table to read
        #[arg(short, long)]
        table: Option<String>,

        /// Only read records whose PartitionKey matches
        #[arg(long)]
        partition: Option<String>,

        /// Predicate, e.g. 'r => r.age >= 18'
        #[arg(short = 'w', long = "where")]
        filter: Option<String>,

        /// Keep records of this type
        #[arg(long)]
        of_type: Option<String>,

        /// Keep the first record per distinct key
        #[arg(long)]
        distinct: Option<String>,

        /// Sort key, repeatable; prefix with 'desc:' for descending
        #[arg(short, long)]
        order_by: Vec<String>,

        #[arg(long)]
        skip: Option<usize>,

        #[arg(long)]
        take: Option<usize>,

        #[arg(long)]
        skip_while: Option<String>,

        #[arg(long)]
        take_while: Option<String>,

        /// Projection applied to each result
        #[arg(short, long)]
        select: Option<String>,

        /// Print the number of results
        #[arg(short, long)]
        count: bool,

        /// Evaluate every predicate locally
        #[arg(long)]
        no_pushdown: bool,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Show the filter text a predicate compiles to
    Compile {
        /// Predicate, e.g. 'r => r.age >= 18'
        expr: String,
    },

    /// Validate a guest expression
    Check {
        expr: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = run(cli);

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli
        .config
        .or_else(|| std::env::var_os("TQ_CONFIG").map(PathBuf::from));
    let config = match config_path {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };

    let level = match &cli.log_level {
        Some(level) => config::parse_level(level)?,
        None => config.level_filter()?,
    };
    if let Err(e) = logger::init(level) {
        eprintln!("warning: logging disabled: {e}");
    }

    match cli.command {
        Commands::Query {
            data,
            table,
            partition,
            filter,
            of_type,
            distinct,
            order_by,
            skip,
            take,
            skip_while,
            take_while,
            select,
            count,
            no_pushdown,
            pretty,
        } => {
            let data = read_data(data.or_else(|| config.source.data.clone()))?;
            let command = QueryCommand {
                data,
                table: table.or_else(|| config.source.table.clone()),
                partition: partition.or_else(|| config.source.partition.clone()),
                filter,
                of_type,
                distinct,
                order_by,
                skip,
                take,
                skip_while,
                take_while,
                select,
                count,
                pushdown: config.query.pushdown && !no_pushdown,
            };
            match cli::execute_query(&command)? {
                QueryOutput::Count(n) => println!("{}", n),
                QueryOutput::Results(json) => {
                    let text = if pretty {
                        serde_json::to_string_pretty(&json)?
                    } else {
                        serde_json::to_string(&json)?
                    };
                    println!("{}", text);
                }
            }
        }
        Commands::Compile { expr } => match cli::execute_compile(&expr)? {
            CompileOutcome::Remote(filter) => println!("{}", filter),
            outcome @ CompileOutcome::Local(_) => eprintln!("{}", outcome),
        },
        Commands::Check { expr } => {
            let checked = cli::execute_check(&expr)?;
            println!("Syntax is valid ({} => {})", checked.params.join(", "), checked.body);
        }
    }
    Ok(())
}

fn read_data(path: Option<PathBuf>) -> Result<Option<String>, CliError> {
    match path {
        Some(path) => Ok(Some(std::fs::read_to_string(path)?)),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(Some(buffer))
        }
        None => Ok(None),
    }
}
