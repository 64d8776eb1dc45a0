//! Page replacement: load, reconcile each region, commit.

use crate::{
	config::{Config, Region},
	event::dispatch_cancellable,
	fingerprint::{Fingerprinter, SubtleDigest},
	load::{FetchLoader, LoadError, PageLoader},
	reconcile::{reconcile, ReconcileError, Reconciliation},
};
use core::{cell::Cell, future::Future};
use futures::lock::Mutex;
use std::error::Error as StdError;
use thiserror::Error;
use tracing::{debug, error, info, instrument, trace_span, warn};
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum NavigationError {
	#[error("no `window` or `document` is available")]
	NoDocument,
	#[error(transparent)]
	Load(#[from] LoadError),
	#[error("{region:?} is missing from the {which} document")]
	MissingRegion { region: Region, which: &'static str },
	#[error("failed to mutate the {region:?}: {error:?}")]
	Dom { region: Region, error: JsValue },
	#[error("failed to fingerprint an element in the {region:?}: {error}")]
	Fingerprint { region: Region, error: Box<dyn StdError> },
	#[error("failed to push the history entry: {0:?}")]
	History(JsValue),
	/// A later navigation started before this one could commit. Nothing was changed.
	#[error("superseded by a later navigation")]
	Superseded,
}

/// Orders navigations on one document.
///
/// Commits run one at a time, in the order their navigations [`begin`](`NavigationQueue::begin`).
/// A navigation that is still waiting to commit when a later one begins is dropped.
#[derive(Debug, Default)]
pub struct NavigationQueue {
	latest: Cell<u64>,
	commit_lock: Mutex<()>,
}

impl NavigationQueue {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Starts a navigation, superseding all earlier ones that haven't started committing yet.
	pub fn begin(&self) -> Navigation<'_> {
		let id = self.latest.get() + 1;
		self.latest.set(id);
		Navigation { queue: self, id }
	}
}

/// A navigation handed out by [`NavigationQueue::begin`].
#[derive(Debug)]
#[must_use = "A `Navigation` does nothing unless it's `commit`ted."]
pub struct Navigation<'a> {
	queue: &'a NavigationQueue,
	id: u64,
}

impl Navigation<'_> {
	/// Whether no later navigation has begun yet.
	#[must_use]
	pub fn is_latest(&self) -> bool {
		self.queue.latest.get() == self.id
	}

	/// Waits until no other commit is running, then runs `commit` unless this navigation was superseded meanwhile.
	///
	/// Returns [`None`] iff `commit` wasn't run.
	pub async fn commit<T, Fut>(self, commit: impl FnOnce() -> Fut) -> Option<T>
	where
		Fut: Future<Output = T>,
	{
		let _guard = self.queue.commit_lock.lock().await;
		if self.is_latest() {
			Some(commit().await)
		} else {
			debug!(navigation = self.id, latest = self.queue.latest.get(), "Superseded");
			None
		}
	}
}

/// Replaces the displayed page with another one in place.
#[derive(Debug)]
pub struct PageReplacer<L = FetchLoader, F = SubtleDigest> {
	loader: L,
	fingerprinter: F,
	config: Config,
	navigations: NavigationQueue,
}

impl PageReplacer {
	/// A replacer using [`FetchLoader`] and the [`SubtleDigest`] described by `config`.
	///
	/// # Errors
	///
	/// Iff the [`FetchLoader`] can't be created.
	pub fn with_defaults(config: Config) -> Result<Self, LoadError> {
		Ok(Self::new(FetchLoader::new()?, config.subtle_digest(), config))
	}
}

impl<L, F> PageReplacer<L, F>
where
	L: PageLoader,
	F: Fingerprinter<web_sys::Element>,
	F::Error: StdError + 'static,
{
	#[must_use]
	pub fn new(loader: L, fingerprinter: F, config: Config) -> Self {
		Self {
			loader,
			fingerprinter,
			config,
			navigations: NavigationQueue::new(),
		}
	}

	#[must_use]
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Loads `href` and morphs the current document into it, then pushes a history entry.
	///
	/// Nothing is committed to the history if any region fails to reconcile.
	/// Calls on the same [`PageReplacer`] never reconcile concurrently; see [`NavigationQueue`].
	///
	/// # Errors
	///
	/// Iff loading fails, a region is missing, reconciliation aborts or the history can't be updated.
	/// In the latter two cases, the document may already have been partially altered.
	///
	/// [`NavigationError::Superseded`] iff a later call began before this one started reconciling.
	#[instrument(level = "trace", skip(self))]
	pub async fn replace_page(&self, href: &str) -> Result<Vec<Reconciliation>, NavigationError> {
		let window = web_sys::window().ok_or(NavigationError::NoDocument)?;
		let document = window.document().ok_or(NavigationError::NoDocument)?;

		let navigation = self.navigations.begin();
		let new_document = self.loader.load(href).await?;
		navigation
			.commit(|| self.commit(&window, &document, &new_document, href))
			.await
			.unwrap_or(Err(NavigationError::Superseded))
	}

	async fn commit(
		&self,
		window: &web_sys::Window,
		document: &web_sys::Document,
		new_document: &web_sys::Document,
		href: &str,
	) -> Result<Vec<Reconciliation>, NavigationError> {
		let veto = self.config.delete_veto();
		let mut reconciliations = Vec::with_capacity(self.config.regions.len());
		for &region in &self.config.regions {
			let current = region.of(document).ok_or(NavigationError::MissingRegion { region, which: "current" })?;
			let imported = region.of(new_document).ok_or(NavigationError::MissingRegion { region, which: "fetched" })?;

			let reconciliation = reconcile(&current, &imported, &self.fingerprinter, &veto, self.config.trailing_append)
				.await
				.map_err(|error| match error {
					ReconcileError::Dom(error) => NavigationError::Dom { region, error },
					ReconcileError::Fingerprint(error) => NavigationError::Fingerprint { region, error: Box::new(error) },
				})?;
			reconciliations.push(reconciliation);
		}

		window
			.history()
			.and_then(|history| history.push_state_with_url(&JsValue::NULL, &new_document.title(), Some(href)))
			.map_err(NavigationError::History)?;

		info!("Navigated");
		Ok(reconciliations)
	}

	/// [`replace_page`](`PageReplacer::replace_page`), falling back to [`force_navigate`](`PageReplacer::force_navigate`) on failure.
	///
	/// A superseded call does nothing further, since the later navigation takes over.
	pub async fn visit(&self, href: &str) {
		match self.replace_page(href).await {
			Ok(_) => {}
			Err(NavigationError::Superseded) => debug!("Left to a later navigation"),
			Err(error) => {
				error!("In-place navigation failed: {}", error);
				self.force_navigate(href);
			}
		}
	}

	/// Announces a full page load with the configured navigate event on `window`, then performs it unless that event was cancelled.
	pub fn force_navigate(&self, href: &str) {
		let span = trace_span!("force_navigate", event = %self.config.navigate_event);
		let _enter = span.enter();

		let window = match web_sys::window() {
			Some(window) => window,
			None => return error!("No `window` to navigate."),
		};

		match dispatch_cancellable(window.as_ref(), &self.config.navigate_event, Some(&JsValue::from_str(href))) {
			Ok(true) => {}
			Ok(false) => return warn!("Full page load was cancelled; Staying on the partially updated page."),
			Err(error) => error!("Failed to dispatch {:?}: {:?}; Navigating anyway.", self.config.navigate_event, error),
		}

		if let Err(error) = window.location().set_href(href) {
			error!("Failed to navigate: {:?}", error);
		}
	}
}
