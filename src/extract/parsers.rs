use crate::config::Selectors;
use crate::models::{SpecBundle, SpecSource, VinReportTexts};
use anyhow::Result;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use tracing::{debug, warn};

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow::anyhow!("selector {:?}: {:?}", css, e))
}

/// Element text with runs of whitespace collapsed to one space.
fn text_of(el: ElementRef) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_text(scope: ElementRef, sel: &Selector) -> Option<String> {
    scope
        .select(sel)
        .next()
        .map(text_of)
        .filter(|t| !t.is_empty())
}

/// Parses every configured selector once.
pub fn validate_selectors(selectors: &Selectors) -> Result<()> {
    for css in [
        &selectors.card,
        &selectors.card_title,
        &selectors.card_spec_item,
        &selectors.card_link,
        &selectors.price,
        &selectors.detail_title,
        &selectors.spec_table_row,
        &selectors.vin_marker,
        &selectors.vin_item,
        &selectors.description,
    ] {
        selector(css)?;
    }
    Ok(())
}

// ── Search results page ───────────────────────────────────────────────────────

pub fn is_card_page(html: &str, selectors: &Selectors) -> Result<bool> {
    let doc = Html::parse_document(html);
    let card_sel = selector(&selectors.card)?;
    Ok(doc.select(&card_sel).next().is_some())
}

/// One compact bundle per listing card.
pub fn parse_card_page(html: &str, page_id: &str, selectors: &Selectors) -> Result<Vec<SpecBundle>> {
    let doc = Html::parse_document(html);

    let card_sel = selector(&selectors.card)?;
    let title_sel = selector(&selectors.card_title)?;
    let item_sel = selector(&selectors.card_spec_item)?;
    let price_sel = selector(&selectors.price)?;
    let link_sel = selector(&selectors.card_link)?;

    let mut bundles = Vec::new();

    for (n, card) in doc.select(&card_sel).enumerate() {
        let href = card
            .value()
            .attr("href")
            .or_else(|| card.select(&link_sel).next().and_then(|a| a.value().attr("href")));
        let id = href
            .map(|h| h.to_string())
            .unwrap_or_else(|| format!("{}#{}", page_id, n));

        let (Some(title), Some(price)) = (first_text(card, &title_sel), first_text(card, &price_sel))
        else {
            warn!("{}: card without title or price, skipped", id);
            continue;
        };

        let items: Vec<String> = card.select(&item_sel).map(text_of).collect();

        bundles.push(SpecBundle {
            id,
            title,
            price,
            specs: SpecSource::Compact {
                items,
                details: BTreeMap::new(),
            },
            vin_report: None,
            description: None,
        });
    }

    debug!("{}: {} cards", page_id, bundles.len());
    Ok(bundles)
}

// ── Listing detail page ───────────────────────────────────────────────────────

/// Extended bundle from a detail page; `None` when the page has no title or
/// price.
pub fn parse_detail_page(
    html: &str,
    page_id: &str,
    selectors: &Selectors,
) -> Result<Option<SpecBundle>> {
    let doc = Html::parse_document(html);
    let root = doc.root_element();

    let title_sel = selector(&selectors.detail_title)?;
    let price_sel = selector(&selectors.price)?;
    let row_sel = selector(&selectors.spec_table_row)?;
    let th_sel = selector("th")?;
    let td_sel = selector("td")?;
    let marker_sel = selector(&selectors.vin_marker)?;
    let vin_item_sel = selector(&selectors.vin_item)?;
    let button_sel = selector("button")?;
    let description_sel = selector(&selectors.description)?;

    let Some(title) = first_text(root, &title_sel) else {
        warn!("{}: no title, skipped", page_id);
        return Ok(None);
    };
    let title = title
        .strip_prefix(selectors.detail_title_prefix.as_str())
        .unwrap_or(&title)
        .to_string();

    let Some(price) = first_text(root, &price_sel) else {
        warn!("{}: no price, skipped", page_id);
        return Ok(None);
    };

    let mut table = BTreeMap::new();
    for row in doc.select(&row_sel) {
        // section headers span the whole row and have no <td>
        if let (Some(label), Some(value)) = (first_text(row, &th_sel), first_text(row, &td_sel)) {
            table.insert(label, value);
        }
    }

    let vin_report = first_text(root, &marker_sel).map(|marker| {
        let items: Vec<ElementRef> = doc.select(&vin_item_sel).collect();
        VinReportTexts {
            marker,
            quick_stats: items
                .iter()
                .take(2)
                .filter_map(|item| first_text(*item, &button_sel))
                .collect(),
            lines: items.iter().map(|item| text_of(*item)).collect(),
        }
    });

    Ok(Some(SpecBundle {
        id: page_id.to_string(),
        title,
        price,
        specs: SpecSource::Extended { table },
        vin_report,
        description: first_text(root, &description_sel),
    }))
}

// ── Card + detail join ────────────────────────────────────────────────────────

/// Saved-page name a card points at: last path segment of its link without
/// the extension. ".../toyota/camry/1234.html" → "1234"
fn listing_key(id: &str) -> &str {
    let tail = id.rsplit('/').next().unwrap_or(id);
    tail.strip_suffix(".html").unwrap_or(tail)
}

/// Folds each saved detail page into the card that links to it. The detail
/// table becomes the card's `details`, the VIN report and description move
/// over, and the standalone detail bundle is dropped. Detail pages no card
/// points at stay as they are.
pub fn merge_detail_pages(bundles: Vec<SpecBundle>) -> Vec<SpecBundle> {
    enum Slot {
        Card(usize),
        Detail(String),
    }

    let mut cards = Vec::new();
    let mut details: BTreeMap<String, SpecBundle> = BTreeMap::new();
    let mut order = Vec::new();

    for bundle in bundles {
        match bundle.specs {
            SpecSource::Extended { .. } => {
                order.push(Slot::Detail(bundle.id.clone()));
                details.insert(bundle.id.clone(), bundle);
            }
            SpecSource::Compact { .. } => {
                order.push(Slot::Card(cards.len()));
                cards.push(bundle);
            }
        }
    }

    let mut merged = 0;
    for card in &mut cards {
        let Some(detail) = details.remove(listing_key(&card.id)) else {
            continue;
        };
        let (SpecSource::Compact { details: card_details, .. }, SpecSource::Extended { table }) =
            (&mut card.specs, detail.specs)
        else {
            continue;
        };
        if card_details.is_empty() {
            *card_details = table;
        }
        card.vin_report = detail.vin_report.or(card.vin_report.take());
        card.description = detail.description.or(card.description.take());
        merged += 1;
    }

    if merged > 0 {
        debug!("Merged {} detail pages into their cards", merged);
    }

    let mut cards = cards.into_iter().map(Some).collect::<Vec<_>>();
    order
        .into_iter()
        .filter_map(|slot| match slot {
            Slot::Card(i) => cards[i].take(),
            Slot::Detail(id) => details.remove(&id),
        })
        .collect()
}
