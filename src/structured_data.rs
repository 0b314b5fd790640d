//! schema.org JSON-LD blocks kept in step with the active locale.

use serde::Serialize;

use crate::config::{
    ArticleConfig,
    OrganizationConfig,
    PersonConfig,
    ProductConfig,
    StructuredDataConfig,
};
use crate::document::{
    Document,
    Selector,
};
use crate::engine::{
    LocaleObserver,
    LocalizationContext,
    PageType,
};

const SCHEMA_CONTEXT: &str = "https://schema.org";
const SCRIPT_ID_PREFIX: &str = "structured-data-";
const JSON_LD_TYPE: &str = "application/ld+json";

/// A single value or a list, serialized the way schema.org consumers expect.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum OneOrMany<'a> {
    One(&'a str),
    Many(&'a [String]),
}

impl<'a> OneOrMany<'a> {
    fn from_slice(values: &'a [String]) -> Option<Self> {
        match values {
            [] => None,
            [single] => Some(Self::One(single)),
            many => Some(Self::Many(many)),
        }
    }
}

#[derive(Debug, Serialize)]
struct Person<'a> {
    #[serde(rename = "@type")]
    kind: &'static str,
    name: &'a str,
    #[serde(rename = "sameAs", skip_serializing_if = "Option::is_none")]
    same_as: Option<OneOrMany<'a>>,
}

impl<'a> From<&'a PersonConfig> for Person<'a> {
    fn from(person: &'a PersonConfig) -> Self {
        Self { kind: "Person", name: &person.name, same_as: OneOrMany::from_slice(&person.same_as) }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContactPoint<'a> {
    #[serde(rename = "@type")]
    kind: &'static str,
    email: &'a str,
    contact_type: &'a str,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    available_language: &'a [String],
}

#[derive(Debug, Serialize)]
struct ImageObject {
    #[serde(rename = "@type")]
    kind: &'static str,
    url: String,
}

#[derive(Debug, Serialize)]
struct OrganizationRef<'a> {
    #[serde(rename = "@type")]
    kind: &'static str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    logo: Option<ImageObject>,
}

impl<'a> OrganizationRef<'a> {
    const fn new(name: &'a str) -> Self {
        Self { kind: "Organization", name, logo: None }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Organization<'a> {
    #[serde(rename = "@context")]
    context: &'static str,
    #[serde(rename = "@type")]
    kind: &'static str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    alternate_name: Option<&'a str>,
    url: &'a str,
    logo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    founding_date: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    founders: Vec<Person<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    contact_point: Option<ContactPoint<'a>>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    same_as: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    industry: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speciality: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    keywords: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct SearchAction {
    #[serde(rename = "@type")]
    kind: &'static str,
    target: String,
    #[serde(rename = "query-input")]
    query_input: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WebSite<'a> {
    #[serde(rename = "@context")]
    context: &'static str,
    #[serde(rename = "@type")]
    kind: &'static str,
    name: &'a str,
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    in_language: &'a str,
    publisher: OrganizationRef<'a>,
    potential_action: SearchAction,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SoftwareApplication<'a> {
    #[serde(rename = "@context")]
    context: &'static str,
    #[serde(rename = "@type")]
    kind: &'static str,
    name: &'a str,
    application_category: &'a str,
    #[serde(rename = "operatingSystem", skip_serializing_if = "<[String]>::is_empty")]
    operating_systems: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    creator: OrganizationRef<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    download_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code_repository: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    programming_language: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    license: Option<&'a str>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    features: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    requirements: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Blog<'a> {
    #[serde(rename = "@context")]
    context: &'static str,
    #[serde(rename = "@type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    url: String,
    in_language: &'a str,
    publisher: OrganizationRef<'a>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    about: &'a [String],
}

#[derive(Debug, Serialize)]
struct WebPage {
    #[serde(rename = "@type")]
    kind: &'static str,
    #[serde(rename = "@id")]
    id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Article<'a> {
    #[serde(rename = "@context")]
    context: &'static str,
    #[serde(rename = "@type")]
    kind: &'static str,
    headline: &'a str,
    description: &'a str,
    url: String,
    date_published: &'a str,
    date_modified: &'a str,
    author: OrganizationRef<'a>,
    publisher: OrganizationRef<'a>,
    main_entity_of_page: WebPage,
    in_language: &'a str,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    about: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    keywords: Option<&'a str>,
}

/// Emits `<script type="application/ld+json">` blocks describing the site,
/// the organization behind it and the current page.
///
/// Does nothing unless `structuredData.enabled` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredData;

impl StructuredData {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl LocaleObserver for StructuredData {
    fn locale_applied(&mut self, context: &LocalizationContext, document: &mut dyn Document) {
        if !context.settings().structured_data.enabled {
            return;
        }

        let existing = Selector::tag("script").with_attribute_prefix("id", SCRIPT_ID_PREFIX);
        for node in document.query_all(&existing) {
            document.remove(node);
        }

        let blocks = match build_blocks(context) {
            Ok(blocks) => blocks,
            Err(e) => {
                tracing::error!("Failed to serialize structured data: {}", e);
                return;
            }
        };

        for (id, json) in &blocks {
            let script_id = format!("{SCRIPT_ID_PREFIX}{id}");
            let node = document
                .append_to_head("script", &[("type", JSON_LD_TYPE), ("id", script_id.as_str())]);
            document.set_text(node, json);
        }
        tracing::debug!(blocks = blocks.len(), "Inserted structured data");
    }
}

/// Serialized JSON-LD blocks for the current locale and page, keyed by id.
///
/// # Errors
/// A block could not be serialized.
pub fn build_blocks(
    context: &LocalizationContext,
) -> Result<Vec<(&'static str, String)>, serde_json::Error> {
    let config = &context.settings().structured_data;
    let origin = context.location().origin();
    let in_language = language_tag(config, context.current_locale().as_str());

    let mut blocks = vec![
        ("organization", serde_json::to_string(&organization(config, context, origin))?),
        ("website", serde_json::to_string(&website(config, context, origin, in_language))?),
    ];

    match context.page_type() {
        PageType::Home => {
            if let Some(product) = &config.product {
                blocks.push((
                    "product",
                    serde_json::to_string(&software_application(config, product, context))?,
                ));
            }
        }
        PageType::Articles => {
            blocks.push(("blog", serde_json::to_string(&blog(config, context, origin, in_language))?));
        }
        PageType::Article(slug) => {
            if let Some(article) = config.articles.iter().find(|article| article.slug == slug)
                && let Some(data) = article_data(config, article, context, origin, in_language)
            {
                blocks.push(("article", serde_json::to_string(&data)?));
            }
        }
        PageType::About | PageType::Contact => {}
    }

    Ok(blocks)
}

/// `inLanguage` value for a locale code.
#[must_use]
pub fn language_tag<'a>(config: &'a StructuredDataConfig, locale: &'a str) -> &'a str {
    config.language_tags.get(locale).map_or(locale, String::as_str)
}

fn organization<'a>(
    config: &'a StructuredDataConfig,
    context: &'a LocalizationContext,
    origin: &'a str,
) -> Organization<'a> {
    let org: &OrganizationConfig = &config.organization;
    Organization {
        context: SCHEMA_CONTEXT,
        kind: "Organization",
        name: &org.name,
        alternate_name: org.alternate_name.as_deref(),
        url: origin,
        logo: format!("{origin}{}", org.logo_path),
        description: context.translate_path(&["meta", "site", "description"]),
        founding_date: org.founding_date.as_deref(),
        founders: org.founders.iter().map(Person::from).collect(),
        contact_point: org.contact_email.as_deref().map(|email| ContactPoint {
            kind: "ContactPoint",
            email,
            contact_type: &org.contact_type,
            available_language: &org.available_languages,
        }),
        same_as: &org.same_as,
        industry: org.industry.as_deref(),
        speciality: org.speciality.as_deref(),
        keywords: context.translate_path(&["meta", "site", "keywords"]),
    }
}

fn website<'a>(
    config: &'a StructuredDataConfig,
    context: &'a LocalizationContext,
    origin: &'a str,
    in_language: &'a str,
) -> WebSite<'a> {
    WebSite {
        context: SCHEMA_CONTEXT,
        kind: "WebSite",
        name: &config.organization.name,
        url: origin,
        description: context.translate_path(&["meta", "site", "description"]),
        in_language,
        publisher: OrganizationRef::new(&config.organization.name),
        potential_action: SearchAction {
            kind: "SearchAction",
            target: format!("{origin}{}", config.search_path),
            query_input: "required name=search_term_string",
        },
    }
}

fn software_application<'a>(
    config: &'a StructuredDataConfig,
    product: &'a ProductConfig,
    context: &'a LocalizationContext,
) -> SoftwareApplication<'a> {
    SoftwareApplication {
        context: SCHEMA_CONTEXT,
        kind: "SoftwareApplication",
        name: &product.name,
        application_category: &product.application_category,
        operating_systems: &product.operating_systems,
        description: context.translate_path(&["products", &product.id, "description"]),
        creator: OrganizationRef::new(&config.organization.name),
        download_url: product.download_url.as_deref(),
        code_repository: product.code_repository.as_deref(),
        programming_language: product.programming_language.as_deref(),
        version: product.version.as_deref(),
        license: product.license.as_deref(),
        features: &product.features,
        requirements: product.requirements.as_deref(),
    }
}

fn blog<'a>(
    config: &'a StructuredDataConfig,
    context: &'a LocalizationContext,
    origin: &'a str,
    in_language: &'a str,
) -> Blog<'a> {
    Blog {
        context: SCHEMA_CONTEXT,
        kind: "Blog",
        name: context.translate_path(&["meta", "pages", "articles", "title"]),
        description: context.translate_path(&["meta", "pages", "articles", "description"]),
        url: format!("{origin}/articles.html"),
        in_language,
        publisher: OrganizationRef::new(&config.organization.name),
        about: &config.blog_topics,
    }
}

/// `None` unless both the headline and the description are translated.
fn article_data<'a>(
    config: &'a StructuredDataConfig,
    article: &'a ArticleConfig,
    context: &'a LocalizationContext,
    origin: &'a str,
    in_language: &'a str,
) -> Option<Article<'a>> {
    let slug = article.slug.as_str();
    let headline = context.translate_path(&["meta", "articles", slug, "title"])?;
    let description = context.translate_path(&["meta", "articles", slug, "description"])?;

    let url = format!("{origin}/articles/{slug}.html");
    let date_published =
        article.date_published.as_deref().unwrap_or(&config.fallback_article_date);
    let date_modified = article.date_modified.as_deref().unwrap_or(date_published);
    let organization = &config.organization;

    Some(Article {
        context: SCHEMA_CONTEXT,
        kind: "Article",
        headline,
        description,
        url: url.clone(),
        date_published,
        date_modified,
        author: OrganizationRef::new(&organization.name),
        publisher: OrganizationRef {
            logo: Some(ImageObject {
                kind: "ImageObject",
                url: format!("{origin}{}", organization.logo_path),
            }),
            ..OrganizationRef::new(&organization.name)
        },
        main_entity_of_page: WebPage { kind: "WebPage", id: url },
        in_language,
        about: &article.about,
        keywords: context.translate_path(&["meta", "articles", slug, "keywords"]),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;
    use serde_json::{
        Value,
        json,
    };

    use super::*;
    use crate::config::I18nSettings;
    use crate::document::MemoryDocument;
    use crate::test_utils::context_with_settings;

    fn settings() -> I18nSettings {
        let mut settings = I18nSettings::default();
        let config = &mut settings.structured_data;
        config.enabled = true;
        config.organization.name = "Example Soft".to_string();
        config.organization.founders = vec![
            PersonConfig { name: "Ada".to_string(), same_as: vec!["https://a.example".to_string()] },
            PersonConfig {
                name: "Bob".to_string(),
                same_as: vec!["https://b.example".to_string(), "https://c.example".to_string()],
            },
        ];
        config.organization.contact_email = Some("info@example.com".to_string());
        config.product = Some(ProductConfig {
            id: "widget".to_string(),
            name: "Widget".to_string(),
            application_category: "SystemUtility".to_string(),
            operating_systems: vec!["Linux".to_string()],
            ..ProductConfig::default()
        });
        config.blog_topics = vec!["Green Technology".to_string()];
        config.articles = vec![
            ArticleConfig {
                slug: "green-algorithms".to_string(),
                date_published: Some("2024-12-10".to_string()),
                ..ArticleConfig::default()
            },
            ArticleConfig { slug: "draft".to_string(), ..ArticleConfig::default() },
        ];
        settings
    }

    fn translations() -> Value {
        json!({
            "meta": {
                "site": { "description": "Sürdürülebilir yazılım", "keywords": "yeşil" },
                "pages": { "articles": { "title": "Makaleler", "description": "Blog" } },
                "articles": {
                    "green-algorithms": { "title": "Yeşil algoritmalar", "description": "Verimlilik" },
                    "draft": { "title": "Taslak" },
                    "unlisted": { "title": "Liste dışı", "description": "Yok" }
                }
            },
            "products": { "widget": { "description": "Pil ömrünü uzatır" } }
        })
    }

    fn blocks(url: &str) -> Vec<(&'static str, Value)> {
        let context = context_with_settings(settings(), url, "tr", translations());
        build_blocks(&context)
            .unwrap()
            .into_iter()
            .map(|(id, json)| (id, serde_json::from_str(&json).unwrap()))
            .collect()
    }

    fn ids(blocks: &[(&'static str, Value)]) -> Vec<&'static str> {
        blocks.iter().map(|(id, _)| *id).collect()
    }

    #[rstest]
    #[case("https://example.com/", &["organization", "website", "product"])]
    #[case("https://example.com/articles.html", &["organization", "website", "blog"])]
    #[case("https://example.com/articles/green-algorithms.html", &["organization", "website", "article"])]
    #[case("https://example.com/articles/draft.html", &["organization", "website"])]
    #[case("https://example.com/articles/unlisted.html", &["organization", "website"])]
    #[case("https://example.com/about.html", &["organization", "website"])]
    fn page_specific_blocks(#[case] url: &str, #[case] expected: &[&str]) {
        assert_eq!(ids(&blocks(url)), expected);
    }

    #[rstest]
    fn organization_and_website_use_translations_and_config() {
        let blocks = blocks("https://example.com/index.html?lang=tr");
        let organization = &blocks[0].1;
        let website = &blocks[1].1;

        assert_eq!(organization["@type"], json!("Organization"));
        assert_eq!(organization["url"], json!("https://example.com"));
        assert_eq!(organization["logo"], json!("https://example.com/images/logo.svg"));
        assert_eq!(organization["description"], json!("Sürdürülebilir yazılım"));
        assert_eq!(organization["founders"][0]["sameAs"], json!("https://a.example"));
        assert_eq!(organization["founders"][1]["sameAs"], json!(["https://b.example", "https://c.example"]));
        assert_eq!(organization["contactPoint"]["contactType"], json!("customer service"));
        assert_eq!(website["inLanguage"], json!("tr-TR"));
        assert_eq!(website["potentialAction"]["target"], json!("https://example.com/articles.html?search={search_term_string}"));
    }

    #[rstest]
    fn product_description_comes_from_translations() {
        let blocks = blocks("https://example.com/");
        let product = &blocks[2].1;

        assert_eq!(product["@type"], json!("SoftwareApplication"));
        assert_eq!(product["description"], json!("Pil ömrünü uzatır"));
        assert_eq!(product["operatingSystem"], json!(["Linux"]));
    }

    #[rstest]
    fn article_uses_configured_dates() {
        let blocks = blocks("https://example.com/articles/green-algorithms.html");
        let article = &blocks[2].1;

        assert_eq!(article["headline"], json!("Yeşil algoritmalar"));
        assert_eq!(article["datePublished"], json!("2024-12-10"));
        assert_eq!(article["dateModified"], json!("2024-12-10"));
        assert_eq!(article["mainEntityOfPage"]["@id"], json!("https://example.com/articles/green-algorithms.html"));
        assert_eq!(article["publisher"]["logo"]["@type"], json!("ImageObject"));
    }

    #[rstest]
    fn language_tag_falls_back_to_code() {
        let config = StructuredDataConfig::default();

        assert_that!(language_tag(&config, "tr"), eq("tr-TR"));
        assert_that!(language_tag(&config, "de"), eq("de"));
    }

    #[rstest]
    fn observer_replaces_previous_scripts() {
        let context = context_with_settings(settings(), "https://example.com/", "tr", translations());
        let mut document = MemoryDocument::new();
        document.push_head("script", &[("id", "structured-data-stale")]);
        let analytics = document.push_head("script", &[("id", "analytics")]);
        let mut observer = StructuredData::new();

        observer.locale_applied(&context, &mut document);
        observer.locale_applied(&context, &mut document);

        let scripts = document.query_all(&Selector::tag("script").with_attribute_prefix("id", SCRIPT_ID_PREFIX));
        let ids: Vec<Option<String>> = scripts.iter().map(|node| document.attribute(*node, "id")).collect();
        assert_eq!(
            ids,
            vec![
                Some("structured-data-organization".to_string()),
                Some("structured-data-website".to_string()),
                Some("structured-data-product".to_string()),
            ]
        );
        assert_that!(document.attribute(scripts[0], "type"), some(eq(JSON_LD_TYPE)));
        assert_that!(document.attribute(analytics, "id"), some(eq("analytics")));
    }

    #[rstest]
    fn observer_is_inert_when_disabled() {
        let context = context_with_settings(
            I18nSettings::default(),
            "https://example.com/",
            "en",
            translations(),
        );
        let mut document = MemoryDocument::new();

        StructuredData::new().locale_applied(&context, &mut document);

        assert_that!(document.is_empty(), eq(true));
    }
}
