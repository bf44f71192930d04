pub const FACETOFACE_SOURCE: &str = "facetoface";
pub const FACETOFACE_URL: &str = "https://facetofacegames.com";
pub const FACETOFACE_PAGE_SIZE: u32 = 24;

pub const TAPS_SOURCE: &str = "taps";
pub const TAPS_URL: &str = "https://store.storepass.co";
pub const TAPS_STORE_ID: &str = "afbPeXJ2EK";
pub const TAPS_PAGE_LIMIT: usize = 200;

pub const REDCLAW_SOURCE: &str = "redclaw";
pub const REDCLAW_URL: &str = "https://www.redclawgaming.com";

pub const TIMEVAULT_SOURCE: &str = "timevault";
pub const TIMEVAULT_URL: &str = "https://thetimevault.ca";

pub const PRISMA_SOURCE: &str = "prisma";
pub const PRISMA_URL: &str = "https://api.conductcommerce.com";
pub const PRISMA_HOST: &str = "www.prismatcg.com";
pub const PRISMA_PRODUCT_TYPE_ID: &str = "1";

pub const UNKNOWN_SET: &str = "Unknown Set";

pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";

pub const DECK_FILE_PREFIX: &str = "deck_";
