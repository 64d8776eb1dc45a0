//! The tree operations reconciliation needs, and their [***DOM***](https://developer.mozilla.org/en-US/docs/Web/API/Document_Object_Model) implementation.

use core::fmt::Debug;
use wasm_bindgen::{JsCast, JsValue};

/// A parent node whose *element* children can be reconciled.
///
/// Only element children take part: text and comment nodes between them are never looked at
/// (compare [***children***](https://developer.mozilla.org/en-US/docs/Web/API/Element/children)
/// vs. [***childNodes***](https://developer.mozilla.org/en-US/docs/Web/API/Node/childNodes)).
///
/// Implementations are handles: all mutation goes through `&self`, and cloning a [`ChildList::Child`] clones the handle, not the node.
pub trait ChildList {
	type Child: Clone + Debug;
	type Error: Debug;

	/// The current number of element children.
	fn element_count(&self) -> usize;

	/// The element child at `index`, if `index` is in bounds.
	fn element_at(&self, index: usize) -> Option<Self::Child>;

	/// Removes `child` from this parent.
	///
	/// # Errors
	///
	/// Iff `child` is not a child of this parent or the tree refuses the mutation.
	fn remove_element(&self, child: &Self::Child) -> Result<(), Self::Error>;

	/// Inserts `new_child` immediately before `reference`, which must be a child of this parent.
	///
	/// If `new_child` already has a parent, it is moved.
	///
	/// # Errors
	///
	/// Iff `reference` is not a child of this parent or the tree refuses the mutation.
	fn insert_element_before(&self, new_child: &Self::Child, reference: &Self::Child) -> Result<(), Self::Error>;

	/// Appends `child` as last child, moving it from its current parent if there is one.
	///
	/// # Errors
	///
	/// Iff the tree refuses the mutation.
	fn append_element(&self, child: &Self::Child) -> Result<(), Self::Error>;

	/// Creates a deep copy of `child` that shares no state with it and has no parent.
	///
	/// # Errors
	///
	/// Iff the node can't be cloned.
	fn clone_element(child: &Self::Child) -> Result<Self::Child, Self::Error>;
}

impl ChildList for web_sys::Element {
	type Child = web_sys::Element;
	type Error = JsValue;

	fn element_count(&self) -> usize {
		self.child_element_count() as usize
	}

	fn element_at(&self, index: usize) -> Option<Self::Child> {
		self.children().item(index.try_into().ok()?)
	}

	fn remove_element(&self, child: &Self::Child) -> Result<(), Self::Error> {
		let parent: &web_sys::Node = self.as_ref();
		parent.remove_child(child.as_ref()).map(drop)
	}

	fn insert_element_before(&self, new_child: &Self::Child, reference: &Self::Child) -> Result<(), Self::Error> {
		let parent: &web_sys::Node = self.as_ref();
		parent.insert_before(new_child.as_ref(), Some(reference.as_ref())).map(drop)
	}

	fn append_element(&self, child: &Self::Child) -> Result<(), Self::Error> {
		// Nodes from a `DOMParser` document are adopted implicitly here.
		let parent: &web_sys::Node = self.as_ref();
		parent.append_child(child.as_ref()).map(drop)
	}

	fn clone_element(child: &Self::Child) -> Result<Self::Child, Self::Error> {
		child.clone_node_with_deep(true)?.dyn_into::<web_sys::Element>().map_err(JsValue::from)
	}
}
