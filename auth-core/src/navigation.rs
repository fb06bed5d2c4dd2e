//! Navigation seam between the session core and the router.

/// Where the app currently is, plus any state the previous navigation
/// attached to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    /// Query string without the leading `?`
    pub query: String,
    /// Location an auth redirect captured for returning after login
    pub from: Option<String>,
    /// Error reason handed to the view by the navigation that led here
    pub error: Option<String>,
    /// Informational message, e.g. after a successful registration
    pub notice: Option<String>,
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Parse a `path?query` string.
    pub fn parse(href: &str) -> Self {
        match href.split_once('?') {
            Some((path, query)) => Self::new(path).with_query(query),
            None => Self::new(href),
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into().trim_start_matches('?').to_string();
        self
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Path plus query, suitable for navigating back here.
    pub fn href(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query)
        }
    }

    /// Decoded value of the first query parameter named `name`.
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .find_map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode(key) == name).then(|| decode(value))
            })
    }
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced.clone(),
    }
}

/// A requested move to another view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub to: String,
    pub from: Option<String>,
    pub error: Option<String>,
    pub notice: Option<String>,
    /// Replace the current history entry instead of pushing
    pub replace: bool,
}

impl Navigation {
    pub fn push(to: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            from: None,
            error: None,
            notice: None,
            replace: false,
        }
    }

    pub fn replace(to: impl Into<String>) -> Self {
        Self {
            replace: true,
            ..Self::push(to)
        }
    }

    pub fn with_from(mut self, from: Option<String>) -> Self {
        self.from = from;
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_notice(mut self, notice: impl Into<String>) -> Self {
        self.notice = Some(notice.into());
        self
    }
}

/// Router access used by the session service and guards.
pub trait Navigator {
    fn location(&self) -> Location;
    fn navigate(&self, navigation: Navigation);
}
