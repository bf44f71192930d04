//! Parsing for the hosted storefront markup shared by several Canadian game stores:
//! product tiles with an `addToCart(...)` button for stocked items and a bare
//! title paragraph for sold out ones.

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::cards::{price::Price, vendor_listing::VendorListing};

lazy_static! {
    static ref ADD_TO_CART: Regex =
        Regex::new(r"addToCart\('([^']+)','([^']+)','([^']*)',([^)]+)\)").unwrap();
    static ref TITLE_PARTS: Regex = Regex::new(r"^(.*?)\s*\[([^\]]+)\]\s*(?:-\s*)?(.*)$").unwrap();
    static ref DOLLAR_PRICE: Regex = Regex::new(r"\$\s*([0-9]+(?:\.[0-9]+)?)").unwrap();
    static ref PAGE_NUMBER: Regex = Regex::new(r"[?&]page=(\d+)").unwrap();
    static ref BR_TAG: Regex = Regex::new(r"(?i)<br\s*/?>").unwrap();
    static ref TAGS: Regex = Regex::new(r"<[^>]+>").unwrap();
    static ref PRODUCT_TILE: Selector = Selector::parse("div.product.Norm").unwrap();
    static ref ADD_TO_CART_BUTTON: Selector = Selector::parse(r#"[onclick*="addToCart"]"#).unwrap();
    static ref PARAGRAPH: Selector = Selector::parse("p").unwrap();
    static ref PRODUCT_TITLE: Selector = Selector::parse("p.productTitle").unwrap();
    static ref PRODUCT_PRICE: Selector = Selector::parse(".productPrice").unwrap();
    static ref PRODUCT_LINK: Selector = Selector::parse("a[href]").unwrap();
    static ref NEXT_LINK: Selector =
        Selector::parse(r#"#pagination a.next, a[rel="next"]"#).unwrap();
    static ref PAGE_LINKS: Selector = Selector::parse("#pagination .pages a.page-num").unwrap();
}

/// The arguments of an `addToCart('id','title','qty',price)` handler.
#[derive(Debug, Clone, PartialEq)]
pub struct AddToCart {
    pub product_id: String,
    pub title: String,
    pub quantity: Option<u32>,
    pub price: Option<f64>,
}

pub fn parse_add_to_cart(onclick: &str) -> Option<AddToCart> {
    let caps = ADD_TO_CART.captures(onclick)?;
    Some(AddToCart {
        product_id: caps[1].to_string(),
        title: caps[2].to_string(),
        quantity: caps[3].trim().parse().ok(),
        price: caps[4].trim().trim_matches('\'').parse().ok(),
    })
}

/// "Lightning Bolt [Magic 2011] - Near Mint" -> ("Lightning Bolt", "Magic 2011", Some("Near Mint"))
pub fn split_title(full_title: &str) -> Option<(String, String, Option<String>)> {
    let caps = TITLE_PARTS.captures(full_title.trim())?;
    let condition = caps[3].trim();
    Some((
        caps[1].trim().to_string(),
        caps[2].trim().to_string(),
        (!condition.is_empty()).then(|| condition.to_string()),
    ))
}

/// First "$12.34" amount in `text`.
pub fn dollar_amount(text: &str) -> Option<f64> {
    DOLLAR_PRICE
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
}

pub fn absolute_url(base_url: &str, href: &str) -> Option<String> {
    Url::parse(base_url)
        .and_then(|base| base.join(href))
        .map(|url| url.to_string())
        .ok()
}

/// Every product tile on a search page. Sold out tiles are only returned when asked for.
pub fn parse_product_tiles(html: &str, base_url: &str, include_sold_out: bool) -> Vec<VendorListing> {
    let document = Html::parse_document(html);
    let mut listings = Vec::new();

    for tile in document.select(&PRODUCT_TILE) {
        let listing = match tile.select(&ADD_TO_CART_BUTTON).next() {
            Some(button) => in_stock_tile(tile, button, base_url),
            None if include_sold_out => sold_out_tile(tile, base_url),
            None => None,
        };
        match listing {
            Some(listing) => listings.push(listing),
            None => debug!("Skipping product tile without a usable title or price"),
        }
    }

    listings
}

fn in_stock_tile(tile: ElementRef, button: ElementRef, base_url: &str) -> Option<VendorListing> {
    let cart = parse_add_to_cart(button.value().attr("onclick")?)?;
    let (title, set, condition) = split_title(&cart.title)?;

    // The handler's price argument is often a placeholder, the visible price wins.
    let shown_price = button
        .select(&PARAGRAPH)
        .chain(tile.select(&PARAGRAPH))
        .find_map(|p| dollar_amount(&p.text().collect::<String>()));
    let price = shown_price.or(cart.price)?;

    Some(VendorListing {
        title,
        price: Price::new(price),
        set: Some(set),
        condition,
        in_stock: true,
        stock_quantity: cart.quantity,
        url: tile_url(tile, base_url),
    })
}

fn sold_out_tile(tile: ElementRef, base_url: &str) -> Option<VendorListing> {
    let title_html = tile.select(&PRODUCT_TITLE).next()?.inner_html();
    let mut parts = BR_TAG.splitn(&title_html, 2);
    let title = html_text(parts.next()?);
    let set = html_text(parts.next()?)
        .trim_start_matches('[')
        .trim_end_matches(']')
        .trim()
        .to_string();

    let price = tile
        .select(&PRODUCT_PRICE)
        .chain(tile.select(&PARAGRAPH))
        .find_map(|p| dollar_amount(&p.text().collect::<String>()))
        .unwrap_or(0.0);

    Some(VendorListing {
        title,
        price: Price::new(price),
        set: (!set.is_empty()).then_some(set),
        condition: None,
        in_stock: false,
        stock_quantity: Some(0),
        url: tile_url(tile, base_url),
    })
}

fn tile_url(tile: ElementRef, base_url: &str) -> Option<String> {
    let href = tile.select(&PRODUCT_LINK).next()?.value().attr("href")?;
    absolute_url(base_url, href)
}

fn html_text(fragment: &str) -> String {
    let text = TAGS.replace_all(fragment, "");
    text.replace("&amp;", "&").trim().to_string()
}

pub fn has_next_page(html: &str) -> bool {
    Html::parse_document(html).select(&NEXT_LINK).next().is_some()
}

/// Highest page number linked from the pagination block, 1 when there is none.
pub fn total_pages(html: &str) -> u32 {
    Html::parse_document(html)
        .select(&PAGE_LINKS)
        .filter_map(|link| {
            let href = link.value().attr("href")?;
            PAGE_NUMBER.captures(href)?[1].parse::<u32>().ok()
        })
        .max()
        .unwrap_or(1)
}
