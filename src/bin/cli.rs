//! kvfacade CLI Client
//!
//! Command-line interface for issuing single facade commands.

use clap::{Parser, Subcommand};
use kvfacade::{Config, ConnectionFactory, Facade, RespSession};
use tracing_subscriber::{fmt, EnvFilter};

/// kvfacade CLI
#[derive(Parser, Debug)]
#[command(name = "kvfacade-cli")]
#[command(about = "CLI for a RESP key-value store through kvfacade")]
#[command(version)]
struct Args {
    /// TOML settings file (host, port, db, password, algo, prefix)
    #[arg(short, long)]
    config: Option<String>,

    /// Store host, ignored with --config
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Store port, ignored with --config
    #[arg(short, long, default_value = "6379")]
    port: u16,

    /// Database index, ignored with --config
    #[arg(short, long, default_value = "0")]
    db: u32,

    /// AUTH password, ignored with --config
    #[arg(long)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,

        /// Expire after this many seconds (0 = never)
        #[arg(short, long, default_value = "0")]
        ttl: u64,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// Remaining time to live of a key
    Ttl {
        /// The key to inspect
        key: String,
    },

    /// Increment an integer value
    Incr {
        /// The key to increment
        key: String,

        /// Amount to add
        #[arg(short, long, default_value = "1")]
        by: i64,
    },

    /// Print server metadata
    Info,

    /// Remove every key of the selected database
    Flush,
}

fn main() {
    // Initialize tracing/logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,kvfacade=info"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    let mut facade = match ConnectionFactory::open(&config) {
        Ok(f) => f,
        Err(e) => {
            tracing::error!("Failed to connect to {}: {}", config.addr(), e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&mut facade, args.command) {
        tracing::error!("Command failed: {}", e);
        std::process::exit(1);
    }
}

/// Settings file when given, command-line flags otherwise
fn load_config(args: &Args) -> kvfacade::Result<Config> {
    if let Some(path) = &args.config {
        return Config::from_toml_file(path);
    }

    let mut builder = Config::builder()
        .host(&args.host)
        .port(args.port)
        .db(args.db);
    if let Some(password) = &args.password {
        builder = builder.password(password);
    }
    Ok(builder.build())
}

fn run(facade: &mut Facade<RespSession>, command: Commands) -> kvfacade::Result<()> {
    match command {
        Commands::Get { key } => match facade.get(&key)? {
            Some(value) => println!("{}", String::from_utf8_lossy(&value)),
            None => println!("(nil)"),
        },
        Commands::Set { key, value, ttl } => {
            let ok = facade.set(&key, value, ttl)?;
            println!("{}", if ok { "OK" } else { "(not set)" });
        }
        Commands::Del { key } => {
            println!("{}", facade.del(&key)?);
        }
        Commands::Ttl { key } => {
            println!("{}", facade.ttl(&key)?);
        }
        Commands::Incr { key, by } => {
            println!("{}", facade.incr_by(&key, by)?);
        }
        Commands::Info => {
            for (field, value) in facade.info()? {
                println!("{}:{}", field, value);
            }
        }
        Commands::Flush => {
            facade.flush()?;
            println!("OK");
        }
    }
    Ok(())
}
