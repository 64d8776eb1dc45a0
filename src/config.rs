use crate::{
	event::DeleteEvent,
	fingerprint::{HexStyle, SubtleDigest},
	reconcile::TrailingAppend,
};
use std::borrow::Cow;

/// A top-level part of a document that is reconciled on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
	Head,
	Body,
}

impl Region {
	/// Finds this region's element in `document`.
	#[must_use]
	pub fn of(self, document: &web_sys::Document) -> Option<web_sys::Element> {
		match self {
			Region::Head => document.head().map(Into::into),
			Region::Body => document.body().map(Into::into),
		}
	}
}

/// Shared settings for interception, page replacement and reconciliation.
///
/// The defaults match the event names and digest Turbolinks-style scripts use.
#[derive(Debug, Clone)]
pub struct Config {
	/// Dispatched on the clicked link before fetching, with the `href` as `detail`.
	pub fetch_event: Cow<'static, str>,
	/// Dispatched on each element about to be deleted.
	pub delete_event: Cow<'static, str>,
	/// Dispatched on the `window` before falling back to a full page load, with the `href` as `detail`.
	pub navigate_event: Cow<'static, str>,
	/// Any algorithm name [***SubtleCrypto.digest()***](https://developer.mozilla.org/en-US/docs/Web/API/SubtleCrypto/digest) accepts.
	pub digest_algorithm: Cow<'static, str>,
	pub hex_style: HexStyle,
	pub trailing_append: TrailingAppend,
	/// Reconciled in this order.
	pub regions: Vec<Region>,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			fetch_event: Cow::Borrowed("turbo:fetch"),
			delete_event: Cow::Borrowed("turbo:delete"),
			navigate_event: Cow::Borrowed("turbo:navigate"),
			digest_algorithm: Cow::Borrowed("SHA-1"),
			hex_style: HexStyle::Padded,
			trailing_append: TrailingAppend::All,
			regions: vec![Region::Head, Region::Body],
		}
	}
}

impl Config {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn with_event_prefix(mut self, prefix: &str) -> Self {
		self.fetch_event = format!("{}:fetch", prefix).into();
		self.delete_event = format!("{}:delete", prefix).into();
		self.navigate_event = format!("{}:navigate", prefix).into();
		self
	}

	#[must_use]
	pub fn with_digest_algorithm(mut self, algorithm: impl Into<Cow<'static, str>>) -> Self {
		self.digest_algorithm = algorithm.into();
		self
	}

	#[must_use]
	pub fn with_hex_style(mut self, hex_style: HexStyle) -> Self {
		self.hex_style = hex_style;
		self
	}

	#[must_use]
	pub fn with_trailing_append(mut self, trailing_append: TrailingAppend) -> Self {
		self.trailing_append = trailing_append;
		self
	}

	#[must_use]
	pub fn with_regions(mut self, regions: impl IntoIterator<Item = Region>) -> Self {
		self.regions = regions.into_iter().collect();
		self
	}

	#[must_use]
	pub fn subtle_digest(&self) -> SubtleDigest {
		SubtleDigest {
			algorithm: self.digest_algorithm.clone(),
			hex_style: self.hex_style,
		}
	}

	#[must_use]
	pub fn delete_veto(&self) -> DeleteEvent {
		DeleteEvent { name: self.delete_event.clone() }
	}
}
