//! Content fingerprints, the sole equality test used during reconciliation.
//!
//! Two nodes with the same serialized content (tag, attributes and all descendants) must produce equal fingerprints.
//! Anything implementing [`Fingerprinter`] can be injected; closures `Fn(Node) -> impl Future<Output = Result<_, _>>` qualify.

use core::{convert::Infallible, fmt::Write as _, future::Future, hash::Hash};
use sha2::{Digest as _, Sha256};
use std::{borrow::Cow, future};
use thiserror::Error;
use tracing::{instrument, trace};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;

/// Computes fingerprints for nodes of type `N`, possibly asynchronously.
pub trait Fingerprinter<N: ?Sized> {
	type Output: Eq + Hash;
	type Error;

	fn fingerprint(&self, node: &N) -> impl Future<Output = Result<Self::Output, Self::Error>>;
}

impl<N, F, Fut, T, E> Fingerprinter<N> for F
where
	N: Clone,
	F: Fn(N) -> Fut,
	Fut: Future<Output = Result<T, E>>,
	T: Eq + Hash,
{
	type Output = T;
	type Error = E;

	fn fingerprint(&self, node: &N) -> impl Future<Output = Result<T, E>> {
		self(node.clone())
	}
}

/// How digest bytes are rendered into a fingerprint string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HexStyle {
	/// Two lowercase hex digits per byte.
	#[default]
	Padded,
	/// Lowercase hex without zero-padding, so `[0x01, 0x23]` and `[0x12, 0x03]` both render as `"123"`.
	///
	/// Only useful to reproduce fingerprints of older Turbolinks-style scripts exactly.
	Unpadded,
}

/// Renders `bytes` as lowercase hex in the given `style`.
#[must_use]
pub fn render_hex(bytes: &[u8], style: HexStyle) -> String {
	match style {
		HexStyle::Padded => hex::encode(bytes),
		HexStyle::Unpadded => bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut rendered, byte| {
			// Writing into a `String` can't fail.
			let _ = write!(rendered, "{:x}", byte);
			rendered
		}),
	}
}

/// Access to a node's full serialized markup.
pub trait OuterHtml {
	fn outer_html(&self) -> String;
}

impl OuterHtml for web_sys::Element {
	fn outer_html(&self) -> String {
		web_sys::Element::outer_html(self)
	}
}

/// Synchronous SHA-256 over [`OuterHtml::outer_html`].
///
/// Works outside of browsers too, so this is the fingerprinter to use with non-DOM [`ChildList`](`crate::tree::ChildList`)s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentHash {
	pub hex_style: HexStyle,
}

impl<N: OuterHtml + ?Sized> Fingerprinter<N> for ContentHash {
	type Output = String;
	type Error = Infallible;

	fn fingerprint(&self, node: &N) -> impl Future<Output = Result<String, Infallible>> {
		let digest = Sha256::digest(node.outer_html().as_bytes());
		future::ready(Ok(render_hex(&digest, self.hex_style)))
	}
}

#[derive(Debug, Error)]
pub enum DigestError {
	#[error("no `window` is available")]
	NoWindow,
	#[error("`window.crypto` is unavailable: {0:?}")]
	Unavailable(JsValue),
	#[error("`crypto.subtle.digest` failed: {0:?}")]
	Digest(JsValue),
}

/// Digests an element's [***outerHTML***](https://developer.mozilla.org/en-US/docs/Web/API/Element/outerHTML) (as UTF-8)
/// with [***SubtleCrypto.digest()***](https://developer.mozilla.org/en-US/docs/Web/API/SubtleCrypto/digest).
///
/// This is the default fingerprinter, with `"SHA-1"` and [`HexStyle::Padded`].
#[derive(Debug, Clone)]
pub struct SubtleDigest {
	pub algorithm: Cow<'static, str>,
	pub hex_style: HexStyle,
}

impl Default for SubtleDigest {
	fn default() -> Self {
		Self {
			algorithm: Cow::Borrowed("SHA-1"),
			hex_style: HexStyle::default(),
		}
	}
}

impl SubtleDigest {
	#[instrument(level = "trace", skip(element), fields(tag = %element.tag_name()))]
	async fn digest(&self, element: &web_sys::Element) -> Result<String, DigestError> {
		let subtle = web_sys::window().ok_or(DigestError::NoWindow)?.crypto().map_err(DigestError::Unavailable)?.subtle();
		let data = js_sys::Uint8Array::from(element.outer_html().as_bytes());
		let promise = subtle.digest_with_str_and_buffer_source(&self.algorithm, &data).map_err(DigestError::Digest)?;
		let buffer = JsFuture::from(promise).await.map_err(DigestError::Digest)?;
		let fingerprint = render_hex(&js_sys::Uint8Array::new(&buffer).to_vec(), self.hex_style);
		trace!(%fingerprint);
		Ok(fingerprint)
	}
}

impl Fingerprinter<web_sys::Element> for SubtleDigest {
	type Output = String;
	type Error = DigestError;

	fn fingerprint(&self, node: &web_sys::Element) -> impl Future<Output = Result<String, DigestError>> {
		self.digest(node)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct Markup(&'static str);
	impl OuterHtml for Markup {
		fn outer_html(&self) -> String {
			self.0.to_owned()
		}
	}

	#[test]
	fn padded_hex_keeps_leading_zeros() {
		assert_eq!(render_hex(&[0x0a, 0xbc, 0x00], HexStyle::Padded), "0abc00");
	}

	#[test]
	fn unpadded_hex_aliases_distinct_digests() {
		assert_eq!(render_hex(&[0x0a, 0xbc, 0x00], HexStyle::Unpadded), "abc0");
		assert_eq!(render_hex(&[0x01, 0x23], HexStyle::Unpadded), render_hex(&[0x12, 0x03], HexStyle::Unpadded));
		assert_ne!(render_hex(&[0x01, 0x23], HexStyle::Padded), render_hex(&[0x12, 0x03], HexStyle::Padded));
	}

	#[test]
	fn content_hash_depends_only_on_markup() {
		let hash = |markup| futures::executor::block_on(ContentHash::default().fingerprint(&Markup(markup))).unwrap();

		assert_eq!(hash("<p>a</p>"), hash("<p>a</p>"));
		assert_ne!(hash("<p>a</p>"), hash("<p>b</p>"));
		assert_eq!(
			hash(""),
			// SHA-256 of the empty string.
			"e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
		);
	}
}
