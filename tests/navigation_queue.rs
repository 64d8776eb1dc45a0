use futures::{executor::block_on, future::join};
use turbo_dom::{navigate::NavigationQueue, reconcile, ReconcileError, Reconciliation, TrailingAppend};

mod common;
use common::{by_content_eventually, init_tracing, yield_once, Node};

fn allow_all(_: &Node) -> bool {
	true
}

async fn reconcile_towards(current: &Node, imported: &[(&str, &str)]) -> Result<Reconciliation, ReconcileError<common::TreeError, std::convert::Infallible>> {
	reconcile(current, &Node::parent_of(imported), &by_content_eventually, &allow_all, TrailingAppend::All).await
}

#[test]
fn navigation_started_mid_commit_waits_for_it() {
	init_tracing();
	let queue = NavigationQueue::new();
	let current = Node::parent_of(&[("p", "1"), ("div", "2"), ("span", "3")]);

	let first = async {
		queue.begin().commit(|| reconcile_towards(&current, &[("div", "2"), ("footer", "4")])).await
	};
	let second = async {
		// Begins while the first pass is suspended on a fingerprint.
		yield_once().await;
		queue.begin().commit(|| reconcile_towards(&current, &[("nav", "5"), ("span", "3")])).await
	};
	let (first, second) = block_on(join(first, second));

	assert_eq!(
		first.unwrap().unwrap(),
		Reconciliation { retained: 1, deleted: 2, appended: 1, ..Reconciliation::default() }
	);
	assert_eq!(second.unwrap().unwrap(), Reconciliation { deleted: 2, appended: 2, ..Reconciliation::default() });
	assert_eq!(current.tags(), ["nav", "span"]);
}

#[test]
fn waiting_navigation_is_superseded_by_a_later_one() {
	init_tracing();
	let queue = NavigationQueue::new();
	let current = Node::parent_of(&[("p", "1")]);

	let first = queue.begin();
	let second = queue.begin();
	assert!(!first.is_latest());
	assert!(second.is_latest());

	let first = block_on(first.commit(|| reconcile_towards(&current, &[("div", "2")])));
	assert!(first.is_none());
	assert_eq!(current.tags(), ["p"]);

	let second = block_on(second.commit(|| reconcile_towards(&current, &[("span", "3")])));
	assert_eq!(second.unwrap().unwrap(), Reconciliation { deleted: 1, appended: 1, ..Reconciliation::default() });
	assert_eq!(current.tags(), ["span"]);
}

#[test]
fn navigations_begun_after_a_commit_still_run() {
	init_tracing();
	let queue = NavigationQueue::new();
	let current = Node::parent_of(&[("p", "1")]);

	assert!(block_on(queue.begin().commit(|| reconcile_towards(&current, &[("div", "2")]))).is_some());
	assert!(block_on(queue.begin().commit(|| reconcile_towards(&current, &[("span", "3")]))).is_some());
	assert_eq!(current.tags(), ["span"]);
}
