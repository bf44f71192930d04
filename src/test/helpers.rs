use crate::cards::{card_request::CardRequest, price::Price, vendor_listing::VendorListing};

pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn sol_ring_request() -> CardRequest {
    CardRequest::new("Sol Ring", 1)
}

pub fn listing(
    title: &str,
    set: Option<&str>,
    price: f64,
    in_stock: bool,
    stock_quantity: Option<u32>,
) -> VendorListing {
    VendorListing {
        title: title.to_string(),
        price: Price::new(price),
        set: set.map(str::to_string),
        condition: Some("NM".to_string()),
        in_stock,
        stock_quantity,
        url: None,
    }
}
