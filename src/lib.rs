#![doc(html_root_url = "https://docs.rs/turbo-dom/0.1.0")]
#![warn(clippy::pedantic)]
//! Turbo-style link navigation for Wasm.
//!
//! [`install_default_hook`] takes over same-origin link clicks, fetches the destination page in the background
//! and [`reconcile`](`reconcile::reconcile`)s the live `<head>` and `<body>` towards it, then pushes a history entry.
//! Elements whose content didn't change stay in the document untouched.
//!
//! # Events
//!
//! All events are bubbling and cancellable [***CustomEvent***](https://developer.mozilla.org/en-US/docs/Web/API/CustomEvent)s.
//! Their names can be changed through [`Config`].
//!
//! | name | target | `detail` | when cancelled |
//! |------|--------|----------|----------------|
//! | `turbo:fetch` | the clicked link | `href` | the browser navigates normally |
//! | `turbo:delete` | the element to remove | | the element stays |
//! | `turbo:navigate` | `window` | `href` | no full page load happens after a failure |

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod config;
pub mod event;
pub mod fingerprint;
pub mod intercept;
pub mod load;
pub mod navigate;
pub mod reconcile;
pub mod tree;

pub use config::{Config, Region};
pub use intercept::Interceptor;
pub use navigate::PageReplacer;
pub use reconcile::{reconcile, ReconcileError, Reconciliation, TrailingAppend};

use tracing::instrument;
use wasm_bindgen::JsValue;

/// Installs click interception on `window` with [`Config::default`].
///
/// Keep the returned [`Interceptor`] around for as long as interception should stay active.
///
/// # Errors
///
/// Iff there is no `window` or the listener or its [`FetchLoader`](`load::FetchLoader`) can't be created.
pub fn install_default_hook() -> Result<Interceptor, JsValue> {
	install_hook(Config::default())
}

/// Installs click interception on `window` with the given `config`.
///
/// # Errors
///
/// Iff there is no `window` or the listener or its [`FetchLoader`](`load::FetchLoader`) can't be created.
#[instrument]
pub fn install_hook(config: Config) -> Result<Interceptor, JsValue> {
	let replacer = PageReplacer::with_defaults(config).map_err(|error| JsValue::from_str(&error.to_string()))?;
	Interceptor::install(replacer)
}

/// Reconciles the element children of `current` towards those of `imported` with the digest and delete event from `config`.
///
/// # Errors
///
/// See [`reconcile()`].
pub async fn reconcile_dom(
	current: &web_sys::Element,
	imported: &web_sys::Element,
	config: &Config,
) -> Result<Reconciliation, ReconcileError<JsValue, fingerprint::DigestError>> {
	reconcile(current, imported, &config.subtle_digest(), &config.delete_veto(), config.trailing_append).await
}
