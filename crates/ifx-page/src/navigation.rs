//! Navigation side effects recorded for the host shell to apply.

/// Delay applied before post-submit redirects.
pub const REDIRECT_DELAY_MS: u64 = 1200;

/// Views the page can navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Main,
}

impl View {
    pub fn document(self) -> &'static str {
        match self {
            Self::Login => "login.html",
            Self::Main => "index.html",
        }
    }
}

/// One requested navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    pub view: View,
    pub delay_ms: u64,
}

/// Collects navigation requests in the order handlers raised them.
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    requests: Vec<Navigation>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self, view: View, delay_ms: u64) {
        self.requests.push(Navigation { view, delay_ms });
    }

    pub fn requests(&self) -> &[Navigation] {
        &self.requests
    }

    pub fn last(&self) -> Option<Navigation> {
        self.requests.last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::Navigation;
    use super::Navigator;
    use super::REDIRECT_DELAY_MS;
    use super::View;

    #[test]
    fn records_requests_with_delays() {
        let mut navigator = Navigator::new();
        navigator.request(View::Login, REDIRECT_DELAY_MS);
        navigator.request(View::Login, 0);

        assert_eq!(
            navigator.last(),
            Some(Navigation {
                view: View::Login,
                delay_ms: 0
            })
        );
        assert_eq!(View::Main.document(), "index.html");
    }
}
