//! Command-line front end: preview a localized page, list locales and check
//! translation coverage for a site.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::{
    Path,
    PathBuf,
};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{
    Parser,
    Subcommand,
};
use site_i18n::config::{
    ConfigError,
    ConfigManager,
    FileMatcher,
    I18nSettings,
    MatcherError,
};
use site_i18n::coverage::{
    coverage_report,
    load_all,
};
use site_i18n::discovery::{
    DiscoveryError,
    discover_locales,
};
use site_i18n::document::MemoryDocument;
use site_i18n::engine::Localizer;
use site_i18n::input::source::{
    FileSource,
    HttpSource,
    LoadError,
    TranslationSource,
};
use site_i18n::location::PageLocation;
use site_i18n::storage::{
    FilePreferences,
    PreferenceError,
};
use site_i18n::structured_data::StructuredData;
use site_i18n::types::Locale;
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser)]
#[command(name = "site-i18n")]
#[command(version)]
#[command(about = "Locale detection, translation and SEO metadata for static sites")]
struct Cli {
    /// Site root containing `.site-i18n.json` and the translation files
    #[arg(long, global = true, default_value = ".")]
    site_root: PathBuf,

    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Localize a page skeleton and print it as HTML
    Render {
        /// Address of the page, e.g. https://example.com/about.html?lang=tr
        #[arg(long)]
        url: String,

        /// Switch to this locale after initialization
        #[arg(long)]
        locale: Option<String>,

        /// Language reported by the browser, e.g. tr-TR
        #[arg(long)]
        browser_language: Option<String>,

        /// JSON file holding the persisted locale preference
        #[arg(long)]
        preferences: Option<PathBuf>,

        /// Fetch translations from this base URL instead of the site root
        #[arg(long)]
        translations_url: Option<String>,
    },

    /// Report translation keys missing from each locale
    Coverage {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Exit with a failure status when any key is missing
        #[arg(long)]
        strict: bool,
    },

    /// List locales that have a translation file
    Locales,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Matcher(#[from] MatcherError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Preferences(#[from] PreferenceError),

    #[error("Invalid URL '{input}': {source}")]
    Url {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("No translation files found under '{}'", .0.display())]
    NoLocales(PathBuf),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(writer).init();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let site_root = cli.site_root;
    let mut config_manager = ConfigManager::new();
    config_manager.load_settings(Some(site_root.clone()))?;
    let settings = config_manager.get_settings().clone();

    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Commands::Render { url, locale, browser_language, preferences, translations_url } => {
            let options = RenderOptions { url, locale, browser_language, preferences, translations_url };
            let html = render(&site_root, settings, options).await?;
            write!(stdout, "{html}")?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Coverage { json, strict } => {
            coverage(&mut stdout, &site_root, &settings, json, strict).await
        }
        Commands::Locales => locales(&mut stdout, &site_root, &settings),
    }
}

struct RenderOptions {
    url: String,
    locale: Option<String>,
    browser_language: Option<String>,
    preferences: Option<PathBuf>,
    translations_url: Option<String>,
}

fn parse_url(input: &str) -> Result<Url, CliError> {
    Url::parse(input).map_err(|source| CliError::Url { input: input.to_string(), source })
}

/// Localize a page skeleton and return it as HTML.
async fn render(
    site_root: &Path,
    settings: I18nSettings,
    options: RenderOptions,
) -> Result<String, CliError> {
    let location = PageLocation::new(parse_url(&options.url)?);
    let source: Arc<dyn TranslationSource> = match &options.translations_url {
        Some(base) => Arc::new(HttpSource::new(parse_url(base)?, &settings)),
        None => Arc::new(FileSource::new(site_root, &settings)),
    };

    let supported = settings.supported()?;
    let document = skeleton(source.as_ref(), &settings, supported.default_locale()).await;

    let mut builder =
        Localizer::builder_with_shared_source(settings, location, document, source)
            .observer(StructuredData::new());
    if let Some(path) = options.preferences {
        builder = builder.preferences(FilePreferences::open(path)?);
    }
    if let Some(language) = options.browser_language {
        builder = builder.browser_language(language);
    }
    let mut localizer = builder.initialize().await?;

    if let Some(target) = options.locale {
        let outcome = localizer.switch_locale(&target).await?;
        tracing::info!(?outcome, "Switch finished");
    }

    Ok(localizer.document().to_html())
}

/// A page with one marked element per content key of the default locale, plus
/// the language controls. `meta.*` keys end up in the head instead.
async fn skeleton(
    source: &dyn TranslationSource,
    settings: &I18nSettings,
    default_locale: &Locale,
) -> MemoryDocument {
    let keys: BTreeSet<String> = match source.load(default_locale).await {
        Ok(tree) => {
            let meta_prefix = format!("meta{}", tree.separator());
            tree.flatten().into_keys().filter(|key| !key.starts_with(&meta_prefix)).collect()
        }
        Err(e) => {
            tracing::warn!("Cannot build page skeleton from '{}': {}", default_locale, e);
            BTreeSet::new()
        }
    };

    let mut document = MemoryDocument::new();
    document.push_head("meta", &[("charset", "utf-8")]);
    let controls = &settings.controls;
    document.push_body("button", &[("class", controls.switch_button_class.as_str())], "");
    document.push_body("select", &[("class", controls.select_class.as_str())], "");
    for key in &keys {
        document.push_body("span", &[(settings.marker_attribute.as_str(), key.as_str())], "");
    }
    document
}

async fn coverage(
    out: &mut impl Write,
    site_root: &Path,
    settings: &I18nSettings,
    json: bool,
    strict: bool,
) -> Result<ExitCode, CliError> {
    let matcher = FileMatcher::new(site_root.to_path_buf(), settings)?;
    let discovered = discover_locales(&matcher)?;
    if discovered.is_empty() {
        return Err(CliError::NoLocales(site_root.to_path_buf()));
    }

    let locales: Vec<_> = discovered.into_iter().map(|entry| entry.locale).collect();
    let source = FileSource::new(site_root, settings);
    let mut trees = Vec::new();
    for (locale, result) in load_all(&source, &locales).await {
        match result {
            Ok(tree) => trees.push((locale, tree)),
            Err(e) => tracing::warn!("Skipping '{}': {}", locale, e),
        }
    }

    let report = coverage_report(&trees);
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        writeln!(out, "{} keys across {} locales", report.total_keys, report.locales.len())?;
        for entry in &report.locales {
            writeln!(
                out,
                "{}: {} translated, {} missing",
                entry.locale,
                entry.translated,
                entry.missing.len()
            )?;
            for key in &entry.missing {
                writeln!(out, "  - {key}")?;
            }
        }
    }

    if strict && !report.is_complete() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn locales(
    out: &mut impl Write,
    site_root: &Path,
    settings: &I18nSettings,
) -> Result<ExitCode, CliError> {
    let matcher = FileMatcher::new(site_root.to_path_buf(), settings)?;
    let discovered = discover_locales(&matcher)?;

    let supported = settings.supported()?;
    for entry in &discovered {
        let relative = entry.path.strip_prefix(site_root).unwrap_or(&entry.path);
        let marker = if supported.contains(&entry.locale) { "" } else { " (not supported)" };
        writeln!(out, "{}\t{}{}", entry.locale, relative.display(), marker)?;
    }
    for locale in supported.iter() {
        if !discovered.iter().any(|entry| &entry.locale == locale) {
            tracing::warn!("Supported locale '{}' has no translation file", locale);
        }
    }
    Ok(ExitCode::SUCCESS)
}
