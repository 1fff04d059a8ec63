//! Opening pages in the user's browser.

/// Launches URLs on the user's desktop.
pub trait Browser: Send + Sync {
    fn open_url(&self, url: &str) -> std::io::Result<()>;
}

/// Opens URLs with the platform's default handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

impl Browser for SystemBrowser {
    fn open_url(&self, url: &str) -> std::io::Result<()> {
        open::that_detached(url)
    }
}
