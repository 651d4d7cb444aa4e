/// Builds fully-qualified TMDB image URLs from relative paths.
#[derive(Debug, Clone)]
pub struct ImageUrls {
    base_url: String,
}

impl ImageUrls {
    pub const DEFAULT_SIZE: &'static str = "w500";
    pub const BACKDROP_SIZE: &'static str = "w1280";

    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `{base}/{size}{path}`; `None` when the path is absent or empty.
    #[must_use]
    pub fn url(&self, path: Option<&str>, size: &str) -> Option<String> {
        match path {
            Some(path) if !path.is_empty() => Some(format!("{}/{size}{path}", self.base_url)),
            _ => None,
        }
    }

    #[must_use]
    pub fn poster(&self, path: Option<&str>) -> Option<String> {
        self.url(path, Self::DEFAULT_SIZE)
    }

    #[must_use]
    pub fn backdrop(&self, path: Option<&str>) -> Option<String> {
        self.url(path, Self::BACKDROP_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_url() {
        let urls = ImageUrls::new("https://image.tmdb.org/t/p/");
        assert_eq!(
            urls.poster(Some("/abc.jpg")).as_deref(),
            Some("https://image.tmdb.org/t/p/w500/abc.jpg")
        );
        assert_eq!(
            urls.backdrop(Some("/bg.jpg")).as_deref(),
            Some("https://image.tmdb.org/t/p/w1280/bg.jpg")
        );
        assert_eq!(urls.poster(None), None);
        assert_eq!(urls.poster(Some("")), None);
    }
}
