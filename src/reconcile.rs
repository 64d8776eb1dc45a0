//! Morphs one sequence of sibling elements into another in a single greedy left-to-right pass.
//!
//! Elements are matched by [fingerprint](`crate::fingerprint`) only. A matched current element is kept in place untouched,
//! which preserves its live state (focus, scroll position, running animations, attached listeners…).
//! Unmatched current elements are deleted unless vetoed, and imported elements missing before a match are cloned in.
//!
//! Each top-level child is atomic: if anything inside it changed, it is replaced as a whole.
//! The result is not guaranteed to be a minimal edit.

use crate::{event::DeleteVeto, fingerprint::Fingerprinter, tree::ChildList};
use futures::future::try_join_all;
use hashbrown::HashMap;
use thiserror::Error;
use tracing::{debug, info, instrument, trace, trace_span, warn};

/// What to do with imported elements that remain unmatched after the main pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailingAppend {
	/// Move all of them to the end of the current parent.
	#[default]
	All,
	/// Like [`TrailingAppend::All`], except that a *single* leftover element is dropped instead.
	///
	/// This reproduces an off-by-one in the boundary check of Turbolinks-style scripts
	/// (`lastImportedItem < importedHashes.length - 1`) for pages that came to depend on it.
	DropSingleLeftover,
}

/// Counts of the edits a [`reconcile`] pass made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reconciliation {
	/// Current elements that were matched and kept.
	pub retained: usize,
	/// Imported elements cloned in before a retained element.
	pub inserted: usize,
	/// Current elements removed.
	pub deleted: usize,
	/// Current elements that would have been removed but were vetoed.
	pub vetoed: usize,
	/// Imported elements moved to the end after the main pass.
	pub appended: usize,
	/// Imported elements left out due to [`TrailingAppend::DropSingleLeftover`].
	pub dropped: usize,
}

impl Reconciliation {
	/// Whether the pass didn't mutate the current parent at all.
	#[must_use]
	pub fn is_unchanged(&self) -> bool {
		self.inserted == 0 && self.deleted == 0 && self.appended == 0
	}
}

/// A reconciliation pass was aborted.
///
/// The current parent is left partially reconciled. There is no rollback.
#[derive(Debug, Error)]
pub enum ReconcileError<D, F> {
	#[error("failed to mutate the current tree: {0:?}")]
	Dom(D),
	#[error("failed to fingerprint an element: {0:?}")]
	Fingerprint(F),
}

/// Reconciles the element children of `current` towards those of `imported`.
///
/// All imported fingerprints are computed up front, concurrently, before anything is mutated.
/// Current elements are fingerprinted one by one as the pass reaches them.
///
/// Imported elements are cloned into `current` where they precede a retained element,
/// and moved (so `imported` loses them) where they trail after the last match.
///
/// `current` must not be mutated by anything else while the returned future is pending.
/// [`PageReplacer`](`crate::PageReplacer`) runs its passes through a [`NavigationQueue`](`crate::navigate::NavigationQueue`) for this.
///
/// # Errors
///
/// Iff a fingerprint can't be computed or a tree mutation fails.
/// `current` is left as it was at that point.
#[instrument(skip_all, fields(trailing_append = ?trailing_append))]
pub async fn reconcile<P, F, V>(
	current: &P,
	imported: &P,
	fingerprinter: &F,
	veto: &V,
	trailing_append: TrailingAppend,
) -> Result<Reconciliation, ReconcileError<P::Error, F::Error>>
where
	P: ChildList,
	F: Fingerprinter<P::Child>,
	V: DeleteVeto<P::Child>,
{
	let imported_children: Vec<P::Child> = (0..imported.element_count()).map_while(|i| imported.element_at(i)).collect();
	let imported_fingerprints = try_join_all(imported_children.iter().map(|child| fingerprinter.fingerprint(child)))
		.await
		.map_err(ReconcileError::Fingerprint)?;

	// First match wins for duplicate fingerprints.
	let mut first_imported_index = HashMap::with_capacity(imported_fingerprints.len());
	for (i, fingerprint) in imported_fingerprints.into_iter().enumerate() {
		first_imported_index.entry(fingerprint).or_insert(i);
	}
	debug!(imported = imported_children.len(), distinct = first_imported_index.len(), "Fingerprinted imported elements");

	let mut stats = Reconciliation::default();
	let mut child_index = 0;
	let mut last_imported_item = 0;

	while let Some(node) = current.element_at(child_index) {
		let fingerprint = fingerprinter.fingerprint(&node).await.map_err(ReconcileError::Fingerprint)?;
		let imported_index = first_imported_index.get(&fingerprint).copied();

		match imported_index {
			Some(imported_index) if imported_index >= last_imported_item => {
				let span = trace_span!("Retaining", child_index, imported_index, last_imported_item);
				let _enter = span.enter();

				for missing in &imported_children[last_imported_item..imported_index] {
					let clone = P::clone_element(missing).map_err(ReconcileError::Dom)?;
					current.insert_element_before(&clone, &node).map_err(ReconcileError::Dom)?;
					trace!(?missing, "Inserted clone");
				}

				stats.inserted += imported_index - last_imported_item;
				stats.retained += 1;
				child_index += imported_index - last_imported_item + 1;
				last_imported_item = imported_index + 1;
			}

			// Unknown, or its imported slot was already claimed by an earlier element.
			_ => {
				let span = trace_span!("Deleting", child_index, ?imported_index, last_imported_item);
				let _enter = span.enter();

				if veto.allow_delete(&node) {
					current.remove_element(&node).map_err(ReconcileError::Dom)?;
					trace!(?node, "Deleted");
					stats.deleted += 1;
				} else {
					debug!(?node, "Deletion vetoed");
					stats.vetoed += 1;
					child_index += 1;
				}
			}
		}
	}

	let leftovers = imported_children.get(last_imported_item..).unwrap_or_default();
	match (trailing_append, leftovers.len()) {
		(TrailingAppend::DropSingleLeftover, 1) => {
			warn!("Dropping the last imported element, which wasn't matched before.");
			stats.dropped = 1;
		}
		_ => {
			for leftover in leftovers {
				current.append_element(leftover).map_err(ReconcileError::Dom)?;
			}
			stats.appended = leftovers.len();
		}
	}

	info!(
		retained = stats.retained,
		inserted = stats.inserted,
		deleted = stats.deleted,
		vetoed = stats.vetoed,
		appended = stats.appended,
		"Reconciled"
	);
	Ok(stats)
}
