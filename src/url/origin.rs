use crate::UrlError;
use std::fmt;
use url::Url;

/// The scheme + host + port of the seed URL
///
/// Two URLs are "same-origin" when all three parts match. The crawl never
/// leaves its origin.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin {
    scheme: String,
    host: String,
    port: Option<u16>,
    base: Url,
}

impl Origin {
    /// Builds the origin of an http(s) URL
    ///
    /// # Examples
    ///
    /// ```
    /// use site_chat::url::Origin;
    /// use url::Url;
    ///
    /// let seed = Url::parse("https://Energy.Maryland.gov/Pages/default.aspx").unwrap();
    /// let origin = Origin::of(&seed).unwrap();
    /// assert_eq!(origin.to_string(), "https://energy.maryland.gov");
    /// ```
    pub fn of(url: &Url) -> Result<Self, UrlError> {
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(UrlError::InvalidScheme(url.scheme().to_string()));
        }

        let host = url
            .host_str()
            .ok_or(UrlError::MissingHost)?
            .to_lowercase();
        let port = url.port_or_known_default();

        let mut base = url.clone();
        base.set_path("/");
        base.set_query(None);
        base.set_fragment(None);

        Ok(Self {
            scheme: url.scheme().to_string(),
            host,
            port,
            base,
        })
    }

    /// Returns the host (lowercase)
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns true if `url` shares this origin
    pub fn contains(&self, url: &Url) -> bool {
        url.scheme() == self.scheme
            && url
                .host_str()
                .map(|h| h.eq_ignore_ascii_case(&self.host))
                .unwrap_or(false)
            && url.port_or_known_default() == self.port
    }

    /// Resolves an href found on one of this origin's pages
    ///
    /// Only origin-relative hrefs (starting with `/`) and absolute URLs under
    /// this origin are accepted; everything else yields `None`.
    pub fn resolve(&self, href: &str) -> Option<Url> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }

        let resolved = if href.starts_with('/') {
            self.base.join(href).ok()?
        } else {
            Url::parse(href).ok()?
        };

        // Catches protocol-relative hrefs (`//other.host/x`) as well
        if self.contains(&resolved) {
            Some(resolved)
        } else {
            None
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Url::origin() drops default ports the same way
        write!(f, "{}", self.base.origin().ascii_serialization())
    }
}
