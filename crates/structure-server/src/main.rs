use anyhow::Context;
use clap::Parser;
use derivative::Derivative;
use futures::FutureExt;
use structure_api::{AdapterInfo, AppState};
use structure_core::{PrepopulationConfig, RawPrepopulationConfig, StructureService};
use structure_db::{Db, DbPool};
use structure_models::CompleteStructure;

/// Daemon hosting the virtual structure service's HTTP surface and startup
/// prepopulation driver.
#[derive(Derivative, Parser)]
#[derivative(Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// URL of the backing database. A `postgres://` or `postgresql://`
    /// scheme selects the PostgreSQL backend; anything else is treated as
    /// a SQLite file path.
    #[derivative(Debug = "ignore")]
    #[clap(long = "database", env = "DATABASE_URL")]
    database_url: String,

    /// The port to listen on for adapter-frontend and maintenance requests.
    #[clap(long, default_value = "8080", env = "API_PORT")]
    api_port: u16,

    /// Path prefix the read-only adapter-frontend routes are mounted under.
    #[clap(
        long = "adapter-prefix",
        env = "ADAPTER_PREFIX",
        default_value = structure_api::DEFAULT_PREFIX
    )]
    adapter_prefix: String,

    /// Shared secret compared against every maintenance request's
    /// `maintenance_payload.maintenance_secret`.
    #[derivative(Debug = "ignore")]
    #[clap(long = "maintenance-secret", env = "MAINTENANCE_SECRET")]
    maintenance_secret: String,

    /// Load the startup structure from a JSON file. Takes precedence over
    /// `--populate-from-env`.
    #[clap(long = "populate-via-file", env = "POPULATE_VIA_FILE")]
    populate_via_file: bool,
    /// Path to the JSON structure file, required when `--populate-via-file`
    /// is set.
    #[clap(long = "structure-file", env = "STRUCTURE_FILE_PATH")]
    structure_file: Option<String>,

    /// Load the startup structure from an inline JSON document passed via
    /// `--inline-structure`.
    #[clap(long = "populate-from-env", env = "POPULATE_FROM_ENV")]
    populate_from_env: bool,
    /// Inline JSON structure document, required when `--populate-from-env`
    /// is set.
    #[derivative(Debug = "ignore")]
    #[clap(long = "inline-structure", env = "INLINE_STRUCTURE")]
    inline_structure: Option<String>,

    /// Wipe any existing structure before prepopulating at startup.
    #[clap(long = "overwrite-existing", env = "OVERWRITE_EXISTING_STRUCTURE")]
    overwrite_existing: bool,
}

fn main() -> Result<(), anyhow::Error> {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting tracing default failed");

    let args = Args::parse();
    tracing::info!(?args, "started!");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let task = runtime.spawn(async move { async_main(args).await });
    let result = runtime.block_on(task);

    tracing::info!(?result, "main function completed, shutting down runtime");
    runtime.shutdown_timeout(std::time::Duration::from_secs(5));
    result?
}

async fn async_main(args: Args) -> Result<(), anyhow::Error> {
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", args.api_port))
        .await
        .context("failed to bind server port")?;

    let pool = connect(&args.database_url)
        .await
        .context("connecting to database")?;
    let service = StructureService::new(Db::new(pool));

    let inline_structure = args
        .inline_structure
        .as_deref()
        .map(CompleteStructure::from_json)
        .transpose()
        .context("parsing --inline-structure as JSON")?;

    let prepopulation = RawPrepopulationConfig {
        populate_via_file: args.populate_via_file,
        file_path: args.structure_file.clone(),
        populate_from_env: args.populate_from_env,
        inline_structure,
        overwrite_existing: args.overwrite_existing,
    }
    .build()
    .context("invalid prepopulation configuration")?;

    run_prepopulation(&prepopulation, &service).await?;

    let state = AppState::new(
        service,
        AdapterInfo {
            id: "virtual-structure-adapter".to_string(),
            name: "Virtual Structure Adapter".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        args.maintenance_secret,
    );
    let router = structure_api::build_router(state, &args.adapter_prefix);

    let shutdown = tokio::signal::ctrl_c().map(|_| ()).shared();
    tracing::info!(port = args.api_port, "serving virtual structure service");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("serving HTTP")?;

    Ok(())
}

/// Connects to PostgreSQL when `database_url` carries a `postgres(ql)://`
/// scheme, otherwise treats it as a SQLite file path.
async fn connect(database_url: &str) -> Result<DbPool, structure_db::Error> {
    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        DbPool::connect_postgres(database_url).await
    } else {
        let path = database_url
            .strip_prefix("sqlite://")
            .unwrap_or(database_url);
        DbPool::connect_sqlite(path).await
    }
}

/// The startup driver aborts the whole process on any failure rather than
/// serving with a partially-populated or stale catalog.
async fn run_prepopulation(
    config: &PrepopulationConfig,
    service: &StructureService,
) -> Result<(), anyhow::Error> {
    config
        .run(service)
        .await
        .context("prepopulation failed, aborting startup")
}
