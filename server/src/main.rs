mod config;
mod http;
mod render;

use std::io::{BufRead, Write};

use anyhow::{Result, anyhow};
use clap::{Args, Parser, Subcommand};
use entity::{Estado, UserDraft};
use platform_gateway::HttpUserGateway;
use platform_obs::{ObsConfig, init_tracing};
use products_usuarios::{DirectoryError, Notice, Severity, UserDirectory};
use tracing::info;

use crate::{config::AppConfig, http::ServeConfig};

type Directory = UserDirectory<HttpUserGateway>;

#[derive(Parser, Debug)]
#[command(name = "usuarios-admin", version, about = "Usuarios directory admin")]
struct Cli {
    /// Collection endpoint; overrides API_URL.
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    Directory(DirectoryCommand),
    /// Serve an in-memory collection for local development.
    #[command(name = "mock-api")]
    MockApi(MockApiCommand),
}

#[derive(Subcommand, Debug)]
enum DirectoryCommand {
    /// List the users of the configured sector.
    List(ListCommand),
    /// Fetch one page of the configured sector from the collection.
    Page(PageCommand),
    /// Create a user.
    Create(CreateCommand),
    /// Edit a user; omitted fields keep their stored value.
    Edit(EditCommand),
    /// Mark a user as INACTIVO.
    Deactivate {
        id: String,
        #[arg(long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
    /// Show the most recent user by id.
    Latest,
}

#[derive(Args, Debug)]
struct FilterArgs {
    #[arg(long, default_value = "", help = "Case-insensitive name search")]
    search: String,
    #[arg(long, value_name = "ESTADO", help = "ACTIVO or INACTIVO")]
    estado: Option<Estado>,
}

#[derive(Args, Debug)]
struct ListCommand {
    #[command(flatten)]
    filter: FilterArgs,
    #[arg(long, default_value_t = 1)]
    page: u32,
}

#[derive(Args, Debug)]
struct PageCommand {
    #[command(flatten)]
    filter: FilterArgs,
    #[arg(long, help = "1-based page; defaults to USUARIOS_DEFAULT_PAGE")]
    page: Option<u32>,
}

#[derive(Args, Debug)]
struct CreateCommand {
    #[arg(long)]
    id: String,
    #[arg(long)]
    usuario: String,
    #[arg(long, help = "Defaults to ACTIVO")]
    estado: Option<Estado>,
    #[arg(long, help = "Defaults to USUARIOS_SECTOR")]
    sector: Option<i64>,
}

#[derive(Args, Debug)]
struct EditCommand {
    id: String,
    #[arg(long)]
    usuario: Option<String>,
    #[arg(long)]
    estado: Option<Estado>,
    #[arg(long)]
    sector: Option<i64>,
}

#[derive(Args, Debug)]
struct MockApiCommand {
    #[arg(long, default_value = "127.0.0.1")]
    host: std::net::IpAddr,
    #[arg(long, default_value_t = 3001)]
    port: u16,
    #[arg(long, default_value_t = 25, help = "Users generated in the configured sector")]
    seed: usize,
}

impl From<MockApiCommand> for ServeConfig {
    fn from(value: MockApiCommand) -> Self {
        ServeConfig::new(value.host, value.port, value.seed)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let serving = matches!(cli.command, Command::MockApi(_));
    init_tracing(ObsConfig::for_service("usuarios-admin").verbose(serving))?;

    let mut config = AppConfig::load()?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }

    match cli.command {
        Command::MockApi(cmd) => http::serve(cmd.into(), config.sector).await,
        Command::Directory(command) => run_directory(command, &config).await,
    }
}

async fn run_directory(command: DirectoryCommand, config: &AppConfig) -> Result<()> {
    let gateway = HttpUserGateway::new(config.gateway())?;
    info!(api_url = %gateway.base_url(), sector = config.sector, "using collection");
    let mut directory = UserDirectory::new(gateway, config.directory());

    let outcome = match command {
        DirectoryCommand::List(cmd) => list(&mut directory, cmd).await,
        DirectoryCommand::Page(cmd) => page(&mut directory, cmd).await,
        DirectoryCommand::Create(cmd) => create(&mut directory, cmd).await,
        DirectoryCommand::Edit(cmd) => edit(&mut directory, cmd).await,
        DirectoryCommand::Deactivate { id, yes } => deactivate(&mut directory, &id, yes).await,
        DirectoryCommand::Latest => latest(&mut directory).await,
    };

    for notice in directory.drain_notices() {
        println!("{notice}");
    }
    outcome.map_err(|err| anyhow!("{} ({})", err, err.code()))
}

fn apply_filters(directory: &mut Directory, filter: FilterArgs) {
    directory.set_search(filter.search);
    directory.set_estado_filter(filter.estado);
}

async fn list(directory: &mut Directory, cmd: ListCommand) -> Result<(), DirectoryError> {
    directory.load().await?;
    apply_filters(directory, cmd.filter);
    let (rows, info) = directory.visible_page(cmd.page);
    print!("{}", render::table(&rows));
    println!("{}", render::footer(&info));
    Ok(())
}

async fn page(directory: &mut Directory, cmd: PageCommand) -> Result<(), DirectoryError> {
    let page = cmd.page.unwrap_or(directory.config().default_page);
    directory.load_page(page).await?;
    apply_filters(directory, cmd.filter);
    print!("{}", render::table(&directory.filtered()));
    println!("{}", render::footer(&directory.page_info()));
    Ok(())
}

async fn create(directory: &mut Directory, cmd: CreateCommand) -> Result<(), DirectoryError> {
    directory.load().await?;
    let mut draft = directory.open_create();
    draft.id = Some(cmd.id);
    draft.usuario = Some(cmd.usuario);
    draft.estado = cmd.estado;
    draft.sector = Some(cmd.sector.unwrap_or(directory.config().sector));
    let user = directory.submit(draft).await?;
    print!("{}", render::table(&[&user]));
    Ok(())
}

async fn edit(directory: &mut Directory, cmd: EditCommand) -> Result<(), DirectoryError> {
    directory.load().await?;
    let stored = directory.open_edit(&cmd.id)?;
    let draft = UserDraft {
        usuario: cmd.usuario.or(stored.usuario),
        estado: cmd.estado.or(stored.estado),
        sector: cmd.sector.or(stored.sector),
        ..stored
    };
    let user = directory.submit(draft).await?;
    print!("{}", render::table(&[&user]));
    Ok(())
}

async fn deactivate(directory: &mut Directory, id: &str, yes: bool) -> Result<(), DirectoryError> {
    directory.load().await?;
    let user = directory.request_deactivation(id)?;
    if !yes && !confirm(&format!("Deactivate {} ({})?", user.usuario, user.id)) {
        directory.cancel_deactivation();
        directory.notify(Notice::new(Severity::Info, "Deactivation cancelled", user.usuario));
        return Ok(());
    }
    let user = directory.confirm_deactivation().await?;
    print!("{}", render::table(&[&user]));
    Ok(())
}

async fn latest(directory: &mut Directory) -> Result<(), DirectoryError> {
    match directory.latest().await? {
        Some(user) => print!("{}", render::table(&[&user])),
        None => println!("The collection is empty."),
    }
    Ok(())
}

/// Ask on stdin; anything but `y`/`yes` declines.
fn confirm(question: &str) -> bool {
    print!("{question} [y/N] ");
    if std::io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
