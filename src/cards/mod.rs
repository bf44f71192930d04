pub mod card_request;
pub mod card_result;
pub mod cardname;
pub mod deck;
pub mod price;
pub mod vendor_listing;
