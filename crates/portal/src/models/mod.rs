//! Portal-side models: session state, banners, and page chrome.

pub mod flash;
pub mod navigation;
pub mod session;

pub use flash::{Flash, FlashKind};
pub use navigation::{NavLink, PageContext, Viewer, nav_links};
pub use session::{ActiveSession, Restored, SessionUser, keys};
