use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use wordbook::api::ServiceClient;
use wordbook::config::Config;
use wordbook::resource::{
    self, Book, BookIdentity, BookReconciler, Reconciler, ResourceKind, Tracked, Word,
    WordReconciler,
};
use wordbook::state::StateStore;

/// Reconcile words and books against a REST service
#[derive(Parser, Debug)]
#[command(name = "wordbook", version, about, long_about = None)]
struct Args {
    /// Base URL of the service
    #[arg(short, long, env = "WORDBOOK_ENDPOINT")]
    endpoint: Option<String>,

    /// Tracked state file
    #[arg(long)]
    state_file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    output: OutputFormat,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage word resources
    #[command(subcommand)]
    Word(WordCommand),
    /// Manage book resources
    #[command(subcommand)]
    Book(BookCommand),
    /// List tracked state
    State,
    /// Print resource schemas
    Schema {
        /// Only this kind
        kind: Option<String>,
    },
    /// Show or change configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
enum WordCommand {
    Create {
        #[arg(long)]
        value: String,
    },
    Read {
        key: String,
    },
    Update {
        key: String,
        #[arg(long)]
        value: String,
    },
    Delete {
        key: String,
    },
}

#[derive(Subcommand, Debug)]
enum BookCommand {
    Create {
        /// Left empty, a title is generated (unless titles are required)
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        author: String,
    },
    Read {
        key: String,
    },
    /// Omitted fields keep their tracked value
    Update {
        key: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        author: Option<String>,
    },
    Delete {
        key: String,
    },
    /// Adopt an existing remote book by title
    Import {
        #[arg(long)]
        title: String,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    Show,
    SetEndpoint { endpoint: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(LevelFilter::from_level(tracing_level).into())
                .from_env_lossy(),
        )
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("wordbook started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(dir) = Config::config_dir() {
        return dir.join("wordbook.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".wordbook").join("wordbook.log");
    }
    PathBuf::from("wordbook.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    let mut config = Config::load();
    match args.command {
        Command::Config(ConfigCommand::Show) => print(&config, args.output),
        Command::Config(ConfigCommand::SetEndpoint { endpoint }) => {
            config.set_endpoint(&endpoint)?;
            print(&config, args.output)
        }
        Command::Schema { kind: None } => {
            print(&resource::definitions(config.book_schema()), args.output)
        }
        Command::Schema { kind: Some(name) } => {
            match resource::get_definition(&name, config.book_schema()) {
                Some(def) => print(&def, args.output),
                None => bail!(
                    "Unknown resource '{}', expected one of: {}",
                    name,
                    resource::RESOURCE_NAMES.join(", ")
                ),
            }
        }
        Command::State => {
            let store = StateStore::open(config.effective_state_file(args.state_file))?;
            let entries: Vec<_> = store.entries().collect();
            print(&entries, args.output)
        }
        Command::Word(cmd) => {
            let client = ServiceClient::new(config.api_settings(args.endpoint.as_deref())?)?;
            tracing::info!("Using endpoint {}", client.base_url());
            let mut store = StateStore::open(config.effective_state_file(args.state_file))?;
            run_word(cmd, WordReconciler::words(client), &mut store, args.output).await
        }
        Command::Book(cmd) => {
            let client = ServiceClient::new(config.api_settings(args.endpoint.as_deref())?)?;
            tracing::info!("Using endpoint {}", client.base_url());
            let mut store = StateStore::open(config.effective_state_file(args.state_file))?;
            let books = BookReconciler::books(config.book_schema(), client);
            run_book(cmd, books, &mut store, args.output).await
        }
    }
}

async fn run_word(
    cmd: WordCommand,
    words: WordReconciler,
    store: &mut StateStore,
    output: OutputFormat,
) -> Result<()> {
    match cmd {
        WordCommand::Create { value } => {
            let tracked = create(&words, store, Word::new(value)).await?;
            print(&tracked, output)
        }
        WordCommand::Read { key } => {
            let tracked = read(&words, store, &key).await?;
            print(&tracked, output)
        }
        WordCommand::Update { key, value } => {
            let tracked = update(&words, store, &key, |_: &Word| Word::new(value)).await?;
            print(&tracked, output)
        }
        WordCommand::Delete { key } => delete(&words, store, &key).await,
    }
}

async fn run_book(
    cmd: BookCommand,
    books: BookReconciler,
    store: &mut StateStore,
    output: OutputFormat,
) -> Result<()> {
    let mirror_id = books.kind().schema().identity == BookIdentity::Title;
    match cmd {
        BookCommand::Create { title, author } => {
            let tracked = create(&books, store, Book::new(title, author)).await?;
            print_book(&tracked, mirror_id, output)
        }
        BookCommand::Read { key } => {
            let tracked = read(&books, store, &key).await?;
            print_book(&tracked, mirror_id, output)
        }
        BookCommand::Update { key, title, author } => {
            let tracked = update(&books, store, &key, |current: &Book| Book {
                title: title.unwrap_or_else(|| current.title.clone()),
                author: author.unwrap_or_else(|| current.author.clone()),
            })
            .await?;
            print_book(&tracked, mirror_id, output)
        }
        BookCommand::Delete { key } => delete(&books, store, &key).await,
        BookCommand::Import { title } => {
            let tracked = books.import_by_title(&title).await?;
            store.put("book", &tracked)?;
            store.save()?;
            print_book(&tracked, mirror_id, output)
        }
    }
}

async fn create<K>(
    reconciler: &Reconciler<K>,
    store: &mut StateStore,
    mut desired: K::Record,
) -> Result<Tracked<K::Record>>
where
    K: ResourceKind,
    K::Record: Serialize,
{
    let kind = reconciler.kind().definition().name;
    let tracked = reconciler.create(&mut desired).await?;
    store.put(kind, &tracked)?;
    store.save()?;
    Ok(tracked)
}

fn load_tracked<K>(
    reconciler: &Reconciler<K>,
    store: &StateStore,
    key: &str,
) -> Result<Tracked<K::Record>>
where
    K: ResourceKind,
    K::Record: DeserializeOwned,
{
    let kind = reconciler.kind().definition().name;
    match store.get(kind, key)? {
        Some(tracked) => Ok(tracked),
        None => bail!("No {} tracked under '{}' in {:?}", kind, key, store.path()),
    }
}

async fn read<K>(
    reconciler: &Reconciler<K>,
    store: &mut StateStore,
    key: &str,
) -> Result<Tracked<K::Record>>
where
    K: ResourceKind,
    K::Record: Serialize + DeserializeOwned,
{
    let mut tracked = load_tracked(reconciler, store, key)?;
    reconciler.read(&mut tracked).await?;
    store.put(reconciler.kind().definition().name, &tracked)?;
    store.save()?;
    Ok(tracked)
}

async fn update<K, F>(
    reconciler: &Reconciler<K>,
    store: &mut StateStore,
    key: &str,
    desired: F,
) -> Result<Tracked<K::Record>>
where
    K: ResourceKind,
    K::Record: Serialize + DeserializeOwned,
    F: FnOnce(&K::Record) -> K::Record,
{
    let mut tracked = load_tracked(reconciler, store, key)?;
    let mut desired = desired(&tracked.record);
    reconciler.update(&mut tracked, &mut desired).await?;
    store.put(reconciler.kind().definition().name, &tracked)?;
    store.save()?;
    Ok(tracked)
}

async fn delete<K>(reconciler: &Reconciler<K>, store: &mut StateStore, key: &str) -> Result<()>
where
    K: ResourceKind,
    K::Record: DeserializeOwned,
{
    let tracked = load_tracked(reconciler, store, key)?;
    reconciler.delete(&tracked).await?;
    store.remove(reconciler.kind().definition().name, key);
    store.save()?;
    Ok(())
}

/// Title-keyed books also expose the server id as `book_id`
fn print_book(tracked: &Tracked<Book>, mirror_id: bool, output: OutputFormat) -> Result<()> {
    let mut value = serde_json::to_value(tracked)?;
    if mirror_id {
        value["book_id"] = serde_json::Value::String(tracked.id.clone());
    }
    print(&value, output)
}

fn print<T: Serialize + ?Sized>(value: &T, output: OutputFormat) -> Result<()> {
    let rendered = match output {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}
