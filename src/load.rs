//! Fetching and parsing destination pages.

use core::future::Future;
use thiserror::Error;
use tracing::{debug, instrument};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, DomParser, Response, SupportedType};

#[derive(Debug, Error)]
pub enum LoadError {
	#[error("no `window` is available")]
	NoWindow,
	#[error("fetch failed: {0:?}")]
	Fetch(JsValue),
	#[error("server responded with HTTP status {0}")]
	Status(u16),
	#[error("failed to parse the response as HTML: {0:?}")]
	Parse(JsValue),
}

/// Produces the parsed document a link points to.
pub trait PageLoader {
	fn load(&self, href: &str) -> impl Future<Output = Result<Document, LoadError>>;
}

/// Loads pages with [***fetch()***](https://developer.mozilla.org/en-US/docs/Web/API/fetch)
/// and parses them with a [***DOMParser***](https://developer.mozilla.org/en-US/docs/Web/API/DOMParser).
///
/// Responses with a non-2xx status are treated as failures, so that the browser can display them natively instead.
#[derive(Debug, Clone)]
pub struct FetchLoader {
	parser: DomParser,
}

impl FetchLoader {
	/// # Errors
	///
	/// Iff no [***DOMParser***](https://developer.mozilla.org/en-US/docs/Web/API/DOMParser) can be created.
	pub fn new() -> Result<Self, LoadError> {
		Ok(Self {
			parser: DomParser::new().map_err(LoadError::Parse)?,
		})
	}

	#[instrument(level = "trace", skip(self))]
	async fn fetch_document(&self, href: &str) -> Result<Document, LoadError> {
		let window = web_sys::window().ok_or(LoadError::NoWindow)?;
		let response: Response = JsFuture::from(window.fetch_with_str(href))
			.await
			.map_err(LoadError::Fetch)?
			.dyn_into()
			.map_err(LoadError::Fetch)?;
		if !response.ok() {
			return Err(LoadError::Status(response.status()));
		}

		let html = JsFuture::from(response.text().map_err(LoadError::Fetch)?).await.map_err(LoadError::Fetch)?;
		let html = html.as_string().ok_or_else(|| LoadError::Fetch(html.clone()))?;
		debug!(bytes = html.len(), "Fetched");

		self.parser.parse_from_string(&html, SupportedType::TextHtml).map_err(LoadError::Parse)
	}
}

impl PageLoader for FetchLoader {
	fn load(&self, href: &str) -> impl Future<Output = Result<Document, LoadError>> {
		self.fetch_document(href)
	}
}
