//! Atelier catalog administration tool.
//!
//! Usage:
//!   atelier migrate
//!   atelier show wood 12
//!   atelier translate wood 12 description cs "Dub letní"
//!   atelier --locale cs list wood --page 2

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use atelier_kernel::catalog::Catalog;
use atelier_kernel::config::Config;
use atelier_kernel::db;
use atelier_kernel::locale::LocaleSettings;
use atelier_kernel::models::{CatalogEntity, Color, Language, Material, Product, Wood};
use atelier_kernel::storage::{Pagination, PgStorage};

/// Atelier catalog administration.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Locale used as the default for display (falls back to DEFAULT_LOCALE).
    #[arg(long, global = true)]
    locale: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply database migrations.
    Migrate,

    /// List languages and which of them are enabled.
    Locales,

    /// List entities with their translations in the current locale.
    List {
        kind: EntityKind,

        /// 1-based page number.
        #[arg(long, default_value = "1")]
        page: usize,

        #[arg(long, default_value = "25")]
        per_page: usize,
    },

    /// Show every translation of one entity.
    Show { kind: EntityKind, id: i64 },

    /// Set a translation value.
    Translate {
        kind: EntityKind,
        id: i64,
        field: String,
        locale: String,
        value: String,
    },

    /// Remove a translation.
    Untranslate {
        kind: EntityKind,
        id: i64,
        field: String,
        locale: String,
    },

    /// Create empty placeholders for every translatable field and locale.
    Prepare { kind: EntityKind, id: i64 },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EntityKind {
    Color,
    Wood,
    Material,
    Product,
}

/// Call a generic command function with the model type matching `kind`.
macro_rules! dispatch {
    ($kind:expr, $func:ident($($arg:expr),* $(,)?)) => {
        match $kind {
            EntityKind::Color => $func::<Color>($($arg),*).await,
            EntityKind::Wood => $func::<Wood>($($arg),*).await,
            EntityKind::Material => $func::<Material>($($arg),*).await,
            EntityKind::Product => $func::<Product>($($arg),*).await,
        }
    };
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();

    let config = Config::from_env().context("failed to load configuration")?;
    let pool = db::create_pool(&config).await?;

    if let Command::Migrate = cli.command {
        db::run_migrations(&pool).await?;
        info!("migrations applied");
        return Ok(());
    }

    let settings = LocaleSettings::from_config(&config)?;
    let catalog = Catalog::new(PgStorage::new(pool.clone()), settings);
    let catalog = match cli.locale.as_deref() {
        Some(locale) => catalog.for_locale(locale),
        None => catalog,
    };
    info!(locale = catalog.locale(), "catalog ready");

    match cli.command {
        Command::Migrate => Ok(()),
        Command::Locales => {
            for language in Language::list_all(&pool).await? {
                let enabled = catalog.locales().is_supported(&language.id);
                println!(
                    "{:<8} {:<20} {}{}",
                    language.id,
                    language.label,
                    if enabled { "enabled" } else { "disabled" },
                    if language.id == catalog.locales().default_locale() {
                        " (default)"
                    } else {
                        ""
                    }
                );
            }
            Ok(())
        }
        Command::List {
            kind,
            page,
            per_page,
        } => dispatch!(kind, list(&catalog, Pagination::page(page, per_page))),
        Command::Show { kind, id } => dispatch!(kind, show(&catalog, id)),
        Command::Translate {
            kind,
            id,
            field,
            locale,
            value,
        } => dispatch!(kind, translate(&catalog, id, &field, &locale, &value)),
        Command::Untranslate {
            kind,
            id,
            field,
            locale,
        } => dispatch!(kind, untranslate(&catalog, id, &field, &locale)),
        Command::Prepare { kind, id } => dispatch!(kind, prepare(&catalog, id)),
    }
}

async fn load<T: CatalogEntity>(catalog: &Catalog, id: i64) -> Result<T> {
    catalog
        .find::<T>(id)
        .await?
        .with_context(|| format!("{} {id} not found", T::ENTITY_TYPE))
}

async fn list<T: CatalogEntity>(catalog: &Catalog, pagination: Pagination) -> Result<()> {
    let total = catalog.count::<T>().await?;
    let entities = catalog.list::<T>(pagination).await?;

    println!("{} {} of {total}", entities.len(), T::ENTITY_TYPE);
    for entity in &entities {
        let id = entity.id().unwrap_or_default();
        let fields = entity
            .translations_for_locale(catalog.locale())
            .into_iter()
            .map(|(field, value)| format!("{field}={}", value.unwrap_or("")))
            .collect::<Vec<_>>()
            .join(", ");
        println!("{id:>6}  {fields}");
    }
    Ok(())
}

async fn show<T: CatalogEntity>(catalog: &Catalog, id: i64) -> Result<()> {
    let entity = load::<T>(catalog, id).await?;

    println!("{} {id}", T::ENTITY_TYPE);
    for record in entity.translations() {
        println!(
            "  {:<16} {:<6} {}",
            record.field(),
            record.locale(),
            record.value().unwrap_or("∅")
        );
    }
    Ok(())
}

async fn translate<T: CatalogEntity>(
    catalog: &Catalog,
    id: i64,
    field: &str,
    locale: &str,
    value: &str,
) -> Result<()> {
    if !catalog.locales().is_supported(locale) {
        anyhow::bail!("locale '{locale}' is not enabled");
    }
    let mut entity = load::<T>(catalog, id).await?;
    if !entity.is_translatable_field(field) {
        anyhow::bail!(
            "'{field}' is not translatable on {} (expected one of: {})",
            T::ENTITY_TYPE,
            entity.translatable_fields().join(", ")
        );
    }

    entity.add_or_update_translation(field, value, locale);
    catalog.save(&mut entity).await?;
    info!(entity_type = T::ENTITY_TYPE, id, field, locale, "translation saved");
    Ok(())
}

async fn untranslate<T: CatalogEntity>(
    catalog: &Catalog,
    id: i64,
    field: &str,
    locale: &str,
) -> Result<()> {
    let mut entity = load::<T>(catalog, id).await?;
    if !entity.remove_translation(field, locale) {
        println!("no {field} translation for {locale}");
        return Ok(());
    }

    catalog.save(&mut entity).await?;
    info!(entity_type = T::ENTITY_TYPE, id, field, locale, "translation removed");
    Ok(())
}

async fn prepare<T: CatalogEntity>(catalog: &Catalog, id: i64) -> Result<()> {
    let mut entity = load::<T>(catalog, id).await?;
    let created = catalog.initializer().prepare(&mut entity).await?;
    if created > 0 {
        catalog.save(&mut entity).await?;
    }
    println!("created {created} placeholder(s)");
    Ok(())
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
