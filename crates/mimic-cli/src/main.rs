//! mimic - parse markup and print it re-serialized
//!
//! Usage: `mimic [--xml | --html] [--shadow-roots] [--raw] <file-or-url>`

#[cfg(feature = "mimalloc")]
use mimalloc::MiMalloc;

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use anyhow::{Context, bail};
use mimic_dom::DomTree;
use mimic_html::{HtmlParser, ParserOptions, SerializerOptions, XmlParser, XmlSerializer};
use mimic_net::{FetchOptions, HttpFetcher, ResourceFetcher};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Syntax {
    Xml,
    Html,
}

struct Args {
    source: String,
    syntax: Option<Syntax>,
    serializer: SerializerOptions,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut source = None;
    let mut syntax = None;
    let mut serializer = SerializerOptions::default();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--xml" => syntax = Some(Syntax::Xml),
            "--html" => syntax = Some(Syntax::Html),
            "--shadow-roots" => serializer.include_shadow_roots = true,
            "--raw" => serializer.escape_entities = false,
            flag if flag.starts_with("--") => bail!("unknown flag {}", flag),
            _ if source.is_some() => bail!("only one input is supported"),
            _ => source = Some(arg),
        }
    }
    let Some(source) = source else {
        bail!("usage: mimic [--xml | --html] [--shadow-roots] [--raw] <file-or-url>");
    };
    Ok(Args {
        source,
        syntax,
        serializer,
    })
}

fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// XML content type implied by a file extension
fn xml_content_type(source: &str) -> Option<&'static str> {
    let extension = source.rsplit('.').next()?.to_ascii_lowercase();
    match extension.as_str() {
        "xml" => Some("application/xml"),
        "svg" => Some("image/svg+xml"),
        "xhtml" | "xht" => Some("application/xhtml+xml"),
        _ => None,
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;
    let markup = if is_url(&args.source) {
        HttpFetcher::new(FetchOptions::default())?.fetch_sync(&args.source)?
    } else {
        std::fs::read_to_string(&args.source)
            .with_context(|| format!("failed to read {}", args.source))?
    };

    let content_type = xml_content_type(&args.source);
    let syntax = args.syntax.unwrap_or(match content_type {
        Some(_) => Syntax::Xml,
        None => Syntax::Html,
    });

    let mut tree = DomTree::new();
    let document = match syntax {
        Syntax::Xml => {
            let parser = XmlParser::with_options(ParserOptions {
                content_type: content_type.unwrap_or("application/xml").to_string(),
            });
            let outcome = parser.parse_with_error(&mut tree, &markup);
            if let Some(error) = &outcome.error {
                tracing::warn!("{}: {}", args.source, error);
            }
            outcome.document
        }
        Syntax::Html => HtmlParser::new()
            .parse_with_url(&mut tree, &markup, &args.source)
            .with_context(|| format!("failed to parse {}", args.source))?,
    };
    tracing::info!("Parsed {} into {} nodes", args.source, tree.len());

    let output = XmlSerializer::with_options(args.serializer).serialize_to_string(&tree, document);
    println!("{}", output);
    Ok(())
}
