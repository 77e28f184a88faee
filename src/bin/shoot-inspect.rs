//! Point-and-shoot inspector
//!
//! Loads a page snapshot and reports what the capture heuristics make of
//! it: the meaningful elements of the page, or the element at a point.

use anyhow::{Context, Result, bail};
use clap::Parser;
use point_and_shoot::dom::{DomElement, DomWindow, Location, MemoryElement, MemoryWindow, PageSnapshot};
use point_and_shoot::helpers::element::{is_image, is_media, is_visible};
use point_and_shoot::helpers::point_and_shoot::{is_meaningful_with, is_point_disabled};
use point_and_shoot::{EmbedResolver, FrameBounds, HelperConfig, Rect};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "shoot-inspect")]
#[command(version)]
#[command(about = "Inspect point-and-shoot heuristics on a page snapshot", long_about = None)]
struct Cli {
    /// Page snapshot (JSON)
    #[arg(value_name = "SNAPSHOT")]
    snapshot: PathBuf,

    /// Override the location of the page
    #[arg(long, value_name = "URL")]
    href: Option<String>,

    /// Heuristics configuration (JSON)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Inspect the element at this x coordinate
    #[arg(long, requires = "y", allow_hyphen_values = true)]
    x: Option<f64>,

    /// Inspect the element at this y coordinate
    #[arg(long, requires = "x", allow_hyphen_values = true)]
    y: Option<f64>,

    /// Print reports as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct ElementReport {
    tag: String,
    id: Option<String>,
    visible: bool,
    meaningful: bool,
    image: bool,
    media: bool,
    embeddable: bool,
    point_disabled: bool,
    bounds: Option<Rect>,
}

impl ElementReport {
    fn line(&self) -> String {
        let mut flags = Vec::new();
        for (flag, name) in [
            (self.visible, "visible"),
            (self.meaningful, "meaningful"),
            (self.image, "image"),
            (self.media, "media"),
            (self.embeddable, "embed"),
            (self.point_disabled, "point-disabled"),
        ] {
            if flag {
                flags.push(name);
            }
        }

        let bounds = match &self.bounds {
            Some(rect) => format!("{} {} {}x{}", rect.x, rect.y, rect.width, rect.height),
            None => "-".to_string(),
        };
        let id = self.id.as_deref().map(|id| format!("#{}", id)).unwrap_or_default();

        format!("{}{} [{}] {}", self.tag.to_ascii_lowercase(), id, flags.join(","), bounds)
    }
}

fn inspect(element: &MemoryElement, win: &MemoryWindow, frame: &FrameBounds<'_, MemoryWindow>) -> ElementReport {
    let resolver = frame.resolver();
    ElementReport {
        tag: element.tag_name(),
        id: element.id(),
        visible: is_visible(element, win),
        meaningful: is_meaningful_with(element, resolver),
        image: is_image(element, win),
        media: is_media(element),
        embeddable: resolver.is_embeddable_element(element),
        point_disabled: is_point_disabled(win, element),
        bounds: frame.element_bounds(element).rect,
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let json = std::fs::read_to_string(&cli.snapshot)
        .with_context(|| format!("Failed to read snapshot {}", cli.snapshot.display()))?;
    let mut page = PageSnapshot::from_json(&json)?;
    if let Some(href) = cli.href {
        page.href = href;
    }

    let config = match &cli.config {
        Some(path) => HelperConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => HelperConfig::default(),
    };

    let win = MemoryWindow::from_snapshot(&page)?;
    let mut resolver = EmbedResolver::new(&win, &config)?;
    if let Some(first_href) = &page.first_href {
        resolver = resolver.with_first_location(Location::parse(first_href));
    }
    let frame = FrameBounds::with_resolver(resolver, &config);

    log::debug!("Inspecting {} ({} elements)", page.href, win.document().len());

    let elements = match (cli.x, cli.y) {
        (Some(x), Some(y)) => match win.element_from_point(x, y) {
            Some(element) => vec![element],
            None => bail!("No element at {}, {}", x, y),
        },
        _ => {
            let body = win.body().context("Snapshot has no body")?;
            body.descendants()
                .into_iter()
                .filter(|element| is_meaningful_with(element, frame.resolver()))
                .collect()
        }
    };

    let reports: Vec<ElementReport> = elements
        .iter()
        .map(|element| inspect(element, &win, &frame))
        .collect();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            println!("{}", report.line());
        }
    }

    Ok(())
}
