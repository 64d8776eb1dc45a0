//! Cancellable notifications.
//!
//! Every potentially destructive step is announced first, and any listener may veto it by calling
//! [***preventDefault()***](https://developer.mozilla.org/en-US/docs/Web/API/Event/preventDefault).

use std::borrow::Cow;
use tracing::{error, trace};
use wasm_bindgen::JsValue;

/// Consulted synchronously before each deletion during reconciliation.
pub trait DeleteVeto<N: ?Sized> {
	/// Returns `false` to keep `node` in place.
	fn allow_delete(&self, node: &N) -> bool;
}

impl<N: ?Sized, F: Fn(&N) -> bool> DeleteVeto<N> for F {
	fn allow_delete(&self, node: &N) -> bool {
		self(node)
	}
}

/// Dispatches a bubbling, cancellable [***CustomEvent***](https://developer.mozilla.org/en-US/docs/Web/API/CustomEvent)
/// without `detail` on each element that is about to be deleted.
#[derive(Debug, Clone)]
pub struct DeleteEvent {
	pub name: Cow<'static, str>,
}

impl DeleteVeto<web_sys::Element> for DeleteEvent {
	fn allow_delete(&self, node: &web_sys::Element) -> bool {
		if cfg!(feature = "dangerous-logging") {
			trace!(event = %self.name, outer_html = %node.outer_html(), "Requesting deletion");
		} else {
			trace!(event = %self.name, tag = %node.tag_name(), "Requesting deletion");
		}

		match dispatch_cancellable(node.as_ref(), &self.name, None) {
			Ok(allowed) => allowed,
			Err(error) => {
				error!("Failed to dispatch {:?}: {:?}; Deleting anyway.", self.name, error);
				true
			}
		}
	}
}

/// Dispatches a bubbling, cancellable [***CustomEvent***](https://developer.mozilla.org/en-US/docs/Web/API/CustomEvent) named `name` on `target`.
///
/// Returns `Ok(false)` iff a listener cancelled the event.
///
/// # Errors
///
/// Iff the event can't be created or dispatched.
pub fn dispatch_cancellable(target: &web_sys::EventTarget, name: &str, detail: Option<&JsValue>) -> Result<bool, JsValue> {
	let init = web_sys::CustomEventInit::new();
	init.set_bubbles(true);
	init.set_cancelable(true);
	if let Some(detail) = detail {
		init.set_detail(detail);
	}

	let event = web_sys::CustomEvent::new_with_event_init_dict(name, &init)?;
	let not_cancelled = target.dispatch_event(&event)?;
	if !not_cancelled {
		trace!(event = name, "Cancelled by listener");
	}
	Ok(not_cancelled)
}
