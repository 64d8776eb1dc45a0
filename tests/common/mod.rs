//! A minimal in-memory element tree for driving reconciliation without a browser.
#![allow(dead_code)]

use std::{
	cell::{Cell, RefCell},
	convert::Infallible,
	fmt::{self, Debug, Formatter},
	future::{ready, Future, Ready},
	pin::Pin,
	rc::{Rc, Weak},
	task::{Context, Poll},
};
use turbo_dom::{fingerprint::OuterHtml, tree::ChildList};

thread_local! {
	static NEXT_ID: Cell<usize> = Cell::new(0);
}

/// A handle to an element with a tag, a text body standing in for its content, and element children.
#[derive(Clone)]
pub struct Node(Rc<Data>);

struct Data {
	id: usize,
	tag: String,
	content: String,
	children: RefCell<Vec<Node>>,
	parent: RefCell<Weak<Data>>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum TreeError {
	NotAChild,
}

impl Node {
	pub fn new(tag: &str, content: &str) -> Self {
		Self(Rc::new(Data {
			id: NEXT_ID.with(|next| next.replace(next.get() + 1)),
			tag: tag.to_owned(),
			content: content.to_owned(),
			children: RefCell::default(),
			parent: RefCell::default(),
		}))
	}

	/// A parent with one child per `(tag, content)` pair.
	pub fn parent_of(children: &[(&str, &str)]) -> Self {
		let parent = Self::new("body", "");
		for &(tag, content) in children {
			parent.append_element(&Self::new(tag, content)).unwrap();
		}
		parent
	}

	pub fn tag(&self) -> &str {
		&self.0.tag
	}

	pub fn content(&self) -> String {
		self.0.content.clone()
	}

	/// Unique per node instance, and not shared by clones.
	pub fn id(&self) -> usize {
		self.0.id
	}

	pub fn children(&self) -> Vec<Node> {
		self.0.children.borrow().clone()
	}

	pub fn tags(&self) -> Vec<String> {
		self.0.children.borrow().iter().map(|child| child.0.tag.clone()).collect()
	}

	pub fn ids(&self) -> Vec<usize> {
		self.0.children.borrow().iter().map(Node::id).collect()
	}

	pub fn parent(&self) -> Option<Node> {
		self.0.parent.borrow().upgrade().map(Node)
	}

	fn position_of(&self, child: &Node) -> Option<usize> {
		self.0.children.borrow().iter().position(|c| Rc::ptr_eq(&c.0, &child.0))
	}

	fn detach(child: &Node) {
		if let Some(parent) = child.parent() {
			if let Some(position) = parent.position_of(child) {
				parent.0.children.borrow_mut().remove(position);
			}
		}
		*child.0.parent.borrow_mut() = Weak::new();
	}

	fn adopt(&self, child: &Node) {
		Self::detach(child);
		*child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
	}
}

impl Debug for Node {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "<{}#{}>", self.0.tag, self.0.id)
	}
}

impl ChildList for Node {
	type Child = Node;
	type Error = TreeError;

	fn element_count(&self) -> usize {
		self.0.children.borrow().len()
	}

	fn element_at(&self, index: usize) -> Option<Node> {
		self.0.children.borrow().get(index).cloned()
	}

	fn remove_element(&self, child: &Node) -> Result<(), TreeError> {
		self.position_of(child).ok_or(TreeError::NotAChild)?;
		Self::detach(child);
		Ok(())
	}

	fn insert_element_before(&self, new_child: &Node, reference: &Node) -> Result<(), TreeError> {
		self.position_of(reference).ok_or(TreeError::NotAChild)?;
		self.adopt(new_child);
		let position = self.position_of(reference).ok_or(TreeError::NotAChild)?;
		self.0.children.borrow_mut().insert(position, new_child.clone());
		Ok(())
	}

	fn append_element(&self, child: &Node) -> Result<(), TreeError> {
		self.adopt(child);
		self.0.children.borrow_mut().push(child.clone());
		Ok(())
	}

	fn clone_element(child: &Node) -> Result<Node, TreeError> {
		let clone = Node::new(&child.0.tag, &child.0.content);
		for grandchild in child.children() {
			clone.append_element(&Self::clone_element(&grandchild)?)?;
		}
		Ok(clone)
	}
}

impl OuterHtml for Node {
	fn outer_html(&self) -> String {
		let children: String = self.children().iter().map(OuterHtml::outer_html).collect();
		format!("<{0}>{1}{2}</{0}>", self.0.tag, self.0.content, children)
	}
}

/// Fingerprints nodes by their content text alone, so tests can pick fingerprints independently of tags.
pub fn by_content(node: Node) -> Ready<Result<String, Infallible>> {
	ready(Ok(node.content()))
}

/// Suspends once, so that other futures polled alongside get a turn.
pub struct YieldOnce(bool);

impl Future for YieldOnce {
	type Output = ();

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
		if self.0 {
			Poll::Ready(())
		} else {
			self.0 = true;
			cx.waker().wake_by_ref();
			Poll::Pending
		}
	}
}

pub fn yield_once() -> YieldOnce {
	YieldOnce(false)
}

/// Like [`by_content`], but suspends once per call.
pub async fn by_content_eventually(node: Node) -> Result<String, Infallible> {
	yield_once().await;
	Ok(node.content())
}

pub fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_max_level(tracing::Level::TRACE).with_test_writer().try_init();
}
