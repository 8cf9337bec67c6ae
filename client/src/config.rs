const STYLE_PATH: &str = "/style.json";
const COUNTY_INDEX_PATH: &str = "/counties.json";

/// Startup configuration for the tile service connection.
///
/// The access credential is an explicit constructor input read once in
/// `main` from the mount element; its absence is the one fatal startup
/// condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapConfig {
    access_token: String,
}

impl MapConfig {
    pub fn new(raw_token: &str) -> Option<Self> {
        let token = raw_token.trim();
        (!token.is_empty()).then(|| Self {
            access_token: token.to_string(),
        })
    }

    /// Read the access token from the mount element's `data-foodmap-token`
    /// attribute.
    pub fn from_mount_element(element: &web_sys::Element) -> Option<Self> {
        Self::new(&element.get_attribute("data-foodmap-token")?)
    }

    pub fn style_url(&self) -> String {
        self.with_token(STYLE_PATH)
    }

    pub fn county_index_url(&self) -> String {
        self.with_token(COUNTY_INDEX_PATH)
    }

    pub fn tile_url(&self, path: &str) -> String {
        self.with_token(path)
    }

    fn with_token(&self, path: &str) -> String {
        let separator = if path.contains('?') { '&' } else { '?' };
        format!("{path}{separator}access_token={}", self.access_token)
    }
}
