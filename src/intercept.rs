//! Click interception.
//!
//! Only plain primary-button clicks on same-origin links without `target` are taken over.
//! Everything else is left to the browser.

use crate::{event::dispatch_cancellable, fingerprint::Fingerprinter, load::PageLoader, navigate::PageReplacer};
use std::{error::Error as StdError, rc::Rc};
use tracing::{debug, error, instrument, trace};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;

/// Why a click was left to the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
	NotPrimaryButton,
	ModifierKey,
	NoLink,
	HasTarget,
	NoHref,
	FragmentOnly,
	CrossOrigin,
	/// A listener cancelled the fetch event.
	Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct Modifiers {
	pub ctrl: bool,
	pub shift: bool,
	pub meta: bool,
	pub alt: bool,
}

impl Modifiers {
	#[must_use]
	pub fn of(event: &web_sys::MouseEvent) -> Self {
		Self {
			ctrl: event.ctrl_key(),
			shift: event.shift_key(),
			meta: event.meta_key(),
			alt: event.alt_key(),
		}
	}

	#[must_use]
	pub fn any(self) -> bool {
		self.ctrl || self.shift || self.meta || self.alt
	}
}

/// Button and modifier checks, which come before looking at the DOM.
///
/// Held modifiers mean the user wants something else, like opening a new tab.
///
/// # Errors
///
/// Iff the click shouldn't be intercepted.
pub fn check_pointer(button: i16, modifiers: Modifiers) -> Result<(), Skip> {
	if button != 0 {
		Err(Skip::NotPrimaryButton)
	} else if modifiers.any() {
		Err(Skip::ModifierKey)
	} else {
		Ok(())
	}
}

/// Link checks, given whether the link has a `target` attribute and its raw `href` attribute.
///
/// Returns the destination to fetch.
///
/// # Errors
///
/// Iff the click shouldn't be intercepted.
pub fn check_link(has_target: bool, href: Option<&str>) -> Result<&str, Skip> {
	if has_target {
		return Err(Skip::HasTarget);
	}
	let href = href.ok_or(Skip::NoHref)?;
	if href.starts_with('#') {
		Err(Skip::FragmentOnly)
	} else if href.contains("//") {
		// Any link to another host needs the `//` before its authority, so this rejects a few same-origin links too.
		Err(Skip::CrossOrigin)
	} else {
		Ok(href)
	}
}

/// Takes over `event` if it qualifies, and returns whether it did.
///
/// Qualifying links are announced with the configured fetch event (with the `href` as `detail`);
/// cancelling it hands the click back to the browser. Otherwise, the default action is prevented
/// and [`PageReplacer::visit`] is spawned on the local executor.
#[instrument(skip_all)]
pub fn handle_click<L, F>(event: &web_sys::MouseEvent, replacer: &Rc<PageReplacer<L, F>>) -> bool
where
	L: PageLoader + 'static,
	F: Fingerprinter<web_sys::Element> + 'static,
	F::Error: StdError + 'static,
{
	match take_over(event, replacer) {
		Ok(href) => {
			event.prevent_default();
			let replacer = Rc::clone(replacer);
			spawn_local(async move { replacer.visit(&href).await });
			true
		}
		Err(skip) => {
			trace!(?skip, "Leaving click to the browser");
			false
		}
	}
}

fn take_over<L, F>(event: &web_sys::MouseEvent, replacer: &PageReplacer<L, F>) -> Result<String, Skip>
where
	L: PageLoader,
	F: Fingerprinter<web_sys::Element>,
	F::Error: StdError + 'static,
{
	check_pointer(event.button(), Modifiers::of(event))?;

	let link = event
		.target()
		.and_then(|target| target.dyn_into::<web_sys::Element>().ok())
		.and_then(|target| target.closest("a").ok().flatten())
		.ok_or(Skip::NoLink)?;
	let href = check_link(link.has_attribute("target"), link.get_attribute("href").as_deref())?.to_owned();

	let fetch_event = &replacer.config().fetch_event;
	match dispatch_cancellable(link.as_ref(), fetch_event, Some(&JsValue::from_str(&href))) {
		Ok(true) => {}
		Ok(false) => {
			debug!(event = %fetch_event, "Fetch cancelled by listener");
			return Err(Skip::Cancelled);
		}
		Err(error) => error!("Failed to dispatch {:?}: {:?}; Fetching anyway.", fetch_event, error),
	}

	Ok(href)
}

/// Keeps a `click` listener on `window` alive. Dropping it removes the listener.
#[must_use = "Dropping the `Interceptor` removes its listener."]
pub struct Interceptor {
	window: web_sys::Window,
	listener: Closure<dyn Fn(web_sys::MouseEvent)>,
}

impl Interceptor {
	/// Installs a `click` listener on `window` that [`handle_click`]s with `replacer`.
	///
	/// # Errors
	///
	/// Iff there is no `window` or the listener can't be added.
	#[instrument(skip_all)]
	pub fn install<L, F>(replacer: PageReplacer<L, F>) -> Result<Self, JsValue>
	where
		L: PageLoader + 'static,
		F: Fingerprinter<web_sys::Element> + 'static,
		F::Error: StdError + 'static,
	{
		let window = web_sys::window().ok_or_else(|| JsValue::from_str("turbo-dom: No `window` found."))?;
		let replacer = Rc::new(replacer);
		let listener = Closure::wrap(Box::new(move |event: web_sys::MouseEvent| {
			handle_click(&event, &replacer);
		}) as Box<dyn Fn(web_sys::MouseEvent)>);

		window.add_event_listener_with_callback("click", listener.as_ref().unchecked_ref())?;
		debug!("Installed click listener");
		Ok(Self { window, listener })
	}
}

impl Drop for Interceptor {
	fn drop(&mut self) {
		if let Err(error) = self.window.remove_event_listener_with_callback("click", self.listener.as_ref().unchecked_ref()) {
			error!("Failed to remove click listener: {:?}", error);
		} else {
			debug!("Removed click listener");
		}
	}
}
