//! Page handle abstraction.
//!
//! The extraction engine only needs to search under a root and read text or
//! attributes off the elements it finds. `StaticPage` answers those queries from
//! a parsed HTML document; `LivePage` answers them from a rendered browser tab.

pub mod live;
pub mod static_page;

use async_trait::async_trait;
use url::Url;

use crate::error::AppError;
use crate::extract::locator::Locator;

pub use live::LivePage;
pub use static_page::StaticPage;

/// Queryable view of one loaded page. Element handles are only valid while the
/// page that produced them is alive.
#[async_trait(?Send)]
pub trait PageHandle {
    type Element: Clone;

    /// The listing URL the page ended up on, after any redirects.
    fn url(&self) -> &Url;

    /// Base for relative links: the document's `<base href>` when it declares
    /// one, otherwise [`PageHandle::url`].
    fn base_url(&self) -> &Url {
        self.url()
    }

    /// Whether content may still be injected after load, so that an empty
    /// query result is worth retrying until the attempt budget runs out.
    fn is_live(&self) -> bool {
        false
    }

    /// Elements under `root` (the whole document when `None`) matching
    /// `locator`, in document order. The root itself is never returned.
    async fn query(
        &self,
        locator: &Locator,
        root: Option<&Self::Element>,
    ) -> Result<Vec<Self::Element>, AppError>;

    async fn read_text(&self, element: &Self::Element) -> Result<String, AppError>;

    async fn read_attribute(
        &self,
        element: &Self::Element,
        name: &str,
    ) -> Result<Option<String>, AppError>;

    /// Lower-case tag name.
    async fn tag_name(&self, element: &Self::Element) -> Result<String, AppError>;
}
