//! Navigation seam for provider consent redirects.

use tracing::warn;

/// Performs the navigation for a consent redirect.
///
/// The flows invoke this at most once per logical flow; implementations do
/// not need their own de-duplication.
pub trait Navigator: Send + Sync {
    fn navigate(&self, url: &str);
}

/// Opens the consent URL in the system browser.
#[derive(Debug, Default)]
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn navigate(&self, url: &str) {
        if let Err(err) = webbrowser::open(url) {
            warn!("failed to open consent URL {url}: {err}");
        }
    }
}
