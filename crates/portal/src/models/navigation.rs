//! Role-aware page chrome: header links, the viewer badge, and the banner.

use silver_connect_core::Role;

use super::flash::Flash;
use super::session::SessionUser;

/// A header navigation link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub href: &'static str,
}

const fn link(label: &'static str, href: &'static str) -> NavLink {
    NavLink { label, href }
}

/// Header links for the current viewer.
#[must_use]
pub fn nav_links(viewer: Option<&SessionUser>) -> Vec<NavLink> {
    let public = [
        link("Home", "/"),
        link("Services", "/services"),
        link("Registry", "/helpers"),
    ];

    match viewer.map(|user| user.role) {
        None => public
            .into_iter()
            .chain([
                link("How it Works", "/how-it-works"),
                link("About", "/about"),
                link("Contact", "/contact"),
            ])
            .collect(),
        Some(Role::Admin) => vec![
            link("Terminal", "/admin"),
            link("Registry", "/helpers"),
            link("Profile", "/profile"),
        ],
        Some(Role::Helper) => vec![
            link("Operations", "/helper"),
            link("Directory", "/helpers"),
            link("Services", "/services"),
            link("Profile", "/profile"),
            link("Contact", "/contact"),
        ],
        Some(Role::User) => public
            .into_iter()
            .chain([
                link("Dashboard", "/dashboard"),
                link("Profile", "/profile"),
                link("Process", "/how-it-works"),
                link("Support", "/contact"),
            ])
            .collect(),
    }
}

/// Name and role shown in the header for a signed-in viewer.
#[derive(Debug, Clone)]
pub struct Viewer {
    pub name: String,
    pub role: Role,
    /// Path of the viewer's own dashboard.
    pub landing: &'static str,
}

/// Data every page template needs for its layout.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub nav: Vec<NavLink>,
    pub viewer: Option<Viewer>,
    pub current_path: String,
    pub flash: Option<Flash>,
}

impl PageContext {
    #[must_use]
    pub fn new(viewer: Option<&SessionUser>, current_path: &str, flash: Option<Flash>) -> Self {
        Self {
            nav: nav_links(viewer),
            viewer: viewer.map(|user| Viewer {
                name: user.name.clone(),
                role: user.role,
                landing: user.landing().path(),
            }),
            current_path: current_path.to_string(),
            flash,
        }
    }

    /// Replace the banner for a page rendered straight from a failed form.
    #[must_use]
    pub fn with_flash(mut self, flash: Flash) -> Self {
        self.flash = Some(flash);
        self
    }

    /// Whether `href` is the page being rendered.
    #[must_use]
    pub fn is_current(&self, href: &str) -> bool {
        self.current_path == href
    }
}
