use std::fmt;

use tracing::debug;

/// Top-level pages. Exactly one is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Page {
    #[default]
    Landing,
    Map,
    ReportIssue,
    MyReports,
    Gallery,
    About,
}

impl Page {
    /// Pages listed in the navigation bar, in order
    pub const NAV: [Page; 6] = [
        Page::Landing,
        Page::Map,
        Page::ReportIssue,
        Page::MyReports,
        Page::Gallery,
        Page::About,
    ];

    /// Stable identifier, used in logs
    pub fn id(&self) -> &'static str {
        match self {
            Page::Landing => "landing-page",
            Page::Map => "map-view",
            Page::ReportIssue => "report-issue",
            Page::MyReports => "my-reports",
            Page::Gallery => "gallery",
            Page::About => "about",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Page::Landing => "Home",
            Page::Map => "Map",
            Page::ReportIssue => "Report Issue",
            Page::MyReports => "My Reports",
            Page::Gallery => "Gallery",
            Page::About => "About",
        };
        f.write_str(label)
    }
}

/// Work the controller owes a page when it becomes visible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    RenderList,
    RenderGallery,
    /// Map layout must be refreshed after a short delay
    InvalidateMap,
    Nothing,
}

/// Tracks the visible page and the side navigation drawer
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    current: Page,
    nav_open: bool,
}

impl Navigator {
    pub fn current(&self) -> Page {
        self.current
    }

    pub fn nav_open(&self) -> bool {
        self.nav_open
    }

    pub fn toggle_nav(&mut self) {
        self.nav_open = !self.nav_open;
    }

    /// Switch to `page` and report what must be rendered, once, for it
    pub fn navigate(&mut self, page: Page) -> Activation {
        debug!("Navigating {} -> {}", self.current.id(), page.id());
        self.current = page;
        self.nav_open = false;

        match page {
            Page::MyReports => Activation::RenderList,
            Page::Gallery => Activation::RenderGallery,
            Page::Map => Activation::InvalidateMap,
            _ => Activation::Nothing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_on_landing() {
        assert_eq!(Navigator::default().current(), Page::Landing);
    }

    #[test]
    fn test_activation_per_page() {
        let mut nav = Navigator::default();
        assert_eq!(nav.navigate(Page::MyReports), Activation::RenderList);
        assert_eq!(nav.navigate(Page::Gallery), Activation::RenderGallery);
        assert_eq!(nav.navigate(Page::Map), Activation::InvalidateMap);
        assert_eq!(nav.navigate(Page::About), Activation::Nothing);
        assert_eq!(nav.current(), Page::About);
    }

    #[test]
    fn test_navigation_closes_drawer() {
        let mut nav = Navigator::default();
        nav.toggle_nav();
        assert!(nav.nav_open());
        nav.navigate(Page::ReportIssue);
        assert!(!nav.nav_open());
    }
}
