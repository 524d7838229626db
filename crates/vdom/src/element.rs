//! Element - the only node kind with children
//!
//! Two ordered child lists:
//!
//! ```text
//! <type attrs...> [content...] [end_content...] </type>
//! ```
//!
//! Every mutation is total. Bad input never fails, it just does less.
//!
//! Pending content keeps its position in the list it was added to, so
//! adds on one element always land in issue order, resolved or not.

use futures_util::future::{self, join_all, BoxFuture};
use futures_util::FutureExt;
use smallvec::SmallVec;
use std::fmt::Display;
use std::mem;

use crate::error::{DomError, Result};
use crate::types::{AddOptions, Addition, Child, ElementId, Node, Pending, Slot, TextNode, TextOptions};

/// Which child list an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum List {
    Content,
    End,
}

impl From<AddOptions> for List {
    fn from(options: AddOptions) -> Self {
        if options.to_end {
            List::End
        } else {
            List::Content
        }
    }
}

/// Detached reference to an element, enough to remove it later
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementRef {
    pub id: ElementId,
    /// Most recent owner at the time the handle was taken
    pub parent: Option<ElementId>,
}

/// Virtual element
#[derive(Debug)]
pub struct Element {
    id: ElementId,
    tag: String,

    // Insertion order is render order; most elements carry few attributes
    attrs: SmallVec<[(String, String); 4]>,

    content: Vec<Slot>,
    end_content: Vec<Slot>,

    // Last owner, for `remove` only. Not a tree edge.
    parent: Option<ElementId>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            id: ElementId::new(),
            tag: tag.into(),
            attrs: SmallVec::new(),
            content: Vec::new(),
            end_content: Vec::new(),
            parent: None,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Identity of this element (not the `id` attribute)
    pub fn element_id(&self) -> ElementId {
        self.id
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn content(&self) -> &[Slot] {
        &self.content
    }

    pub fn end_content(&self) -> &[Slot] {
        &self.end_content
    }

    /// Attributes in insertion order
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    // -------- Attributes --------

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing any previous value in place
    pub fn set_attr(&mut self, name: &str, value: impl Display) -> &mut Self {
        let value = value.to_string();
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value,
            None => self.attrs.push((name.to_string(), value)),
        }
        self
    }

    pub fn remove_attr(&mut self, name: &str) -> &mut Self {
        self.attrs.retain(|(k, _)| k != name);
        self
    }

    /// `None` deletes the attribute
    pub fn set_attr_opt<V: Display>(&mut self, name: &str, value: Option<V>) -> &mut Self {
        match value {
            Some(value) => self.set_attr(name, value),
            None => self.remove_attr(name),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn set_id(&mut self, id: impl Display) -> &mut Self {
        self.set_attr("id", id)
    }

    /// Class attribute, empty when absent
    pub fn class(&self) -> &str {
        self.attr("class").unwrap_or("")
    }

    pub fn set_class(&mut self, class: impl Display) -> &mut Self {
        self.set_attr("class", class)
    }

    /// True only if every space-separated name in `names` is present
    pub fn has_classes(&self, names: &str) -> bool {
        names
            .split_whitespace()
            .all(|name| self.class().split(' ').any(|c| c == name))
    }

    /// Add or remove each space-separated name in `names`
    ///
    /// Never inserts duplicates. Removing the last class leaves `class=""`.
    pub fn classed(&mut self, names: &str, add: bool) -> &mut Self {
        for name in names.split_whitespace() {
            let present = self.class().split(' ').any(|c| c == name);
            if add && !present {
                let class = if self.class().is_empty() {
                    name.to_string()
                } else {
                    format!("{} {}", self.class(), name)
                };
                self.set_class(class);
            } else if !add && present {
                let class = self
                    .class()
                    .split(' ')
                    .filter(|c| *c != name)
                    .collect::<Vec<_>>()
                    .join(" ");
                self.set_class(class);
            }
        }
        self
    }

    // -------- Composition --------

    /// Add a child to the main content
    pub fn add(&mut self, child: impl Into<Child>) -> Added<'_> {
        self.add_with(child, AddOptions::default())
    }

    /// Add a child after the main content
    pub fn add_to_end(&mut self, child: impl Into<Child>) -> Added<'_> {
        self.add_with(child, AddOptions::to_end())
    }

    pub fn add_with(&mut self, child: impl Into<Child>, options: AddOptions) -> Added<'_> {
        let child = child.into();
        let list = List::from(options);
        let at = self.slots(list).len();
        let deferred = child.is_deferred();

        self.insert_at(list, at, child);

        Added {
            element: self,
            pending: deferred.then_some((list, at)),
        }
    }

    /// Append text, HTML-escaped
    pub fn text(&mut self, text: impl Display) -> &mut Self {
        self.text_with(text, TextOptions::default())
    }

    pub fn text_with(&mut self, text: impl Display, options: TextOptions) -> &mut Self {
        let text = text.to_string();
        let node = if options.escape {
            TextNode::escaped(&text)
        } else {
            TextNode::raw(text)
        };
        self.content.push(Slot::Node(Node::Text(node)));
        self
    }

    /// Append text if there is any
    pub fn text_opt<T: Display>(&mut self, text: Option<T>) -> &mut Self {
        match text {
            Some(text) => self.text(text),
            None => self,
        }
    }

    // -------- Removal --------

    /// Remove a direct child element from the main content (not end content)
    pub fn remove_child(&mut self, id: ElementId) -> bool {
        let index = self.content.iter().position(|slot| {
            matches!(slot, Slot::Node(Node::Element(el)) if el.id == id)
        });
        match index {
            Some(index) => {
                self.content.remove(index);
                true
            }
            None => false,
        }
    }

    /// Snapshot of this element's identity and owner
    ///
    /// `parent` is the owner at the time of the call. `remove` does not rely
    /// on it, so a handle taken before the element was added still works.
    pub fn handle(&self) -> ElementRef {
        ElementRef {
            id: self.id,
            parent: self.parent,
        }
    }

    /// Ask the current owner of `target` (somewhere in this subtree) to drop it
    pub fn remove(&mut self, target: ElementRef) -> bool {
        let owner = self.find(target.id).and_then(Element::parent);
        match owner.and_then(|parent| self.find_mut(parent)) {
            Some(parent) => parent.remove_child(target.id),
            None => false,
        }
    }

    // -------- Lookup --------

    /// Find this element or a descendant by identity
    pub fn find(&self, id: ElementId) -> Option<&Element> {
        if self.id == id {
            return Some(self);
        }
        self.content
            .iter()
            .chain(self.end_content.iter())
            .find_map(|slot| match slot {
                Slot::Node(Node::Element(el)) => el.find(id),
                _ => None,
            })
    }

    pub fn find_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        if self.id == id {
            return Some(self);
        }
        self.content
            .iter_mut()
            .chain(self.end_content.iter_mut())
            .find_map(|slot| match slot {
                Slot::Node(Node::Element(el)) => el.find_mut(id),
                _ => None,
            })
    }

    pub fn get(&self, id: ElementId) -> Result<&Element> {
        self.find(id).ok_or(DomError::ElementNotFound(id))
    }

    pub fn get_mut(&mut self, id: ElementId) -> Result<&mut Element> {
        self.find_mut(id).ok_or(DomError::ElementNotFound(id))
    }

    // -------- Pending content --------

    /// True if any slot in this subtree still waits on a future
    pub fn has_pending(&self) -> bool {
        self.content
            .iter()
            .chain(self.end_content.iter())
            .any(|slot| match slot {
                Slot::Pending(_) => true,
                Slot::Node(Node::Element(el)) => el.has_pending(),
                Slot::Node(Node::Head(head)) => head.element.has_pending(),
                Slot::Node(_) => false,
            })
    }

    fn has_direct_pending(&self) -> bool {
        self.content
            .iter()
            .chain(self.end_content.iter())
            .any(Slot::is_pending)
    }

    /// Await every pending slot in this subtree
    ///
    /// All pending slots of one element are awaited together, and child
    /// subtrees resolve concurrently. Resolved content is spliced in where
    /// its slot stood, in tree order; chained additions follow it.
    /// Resolution repeats until nothing is pending, since a future may
    /// yield further pending content.
    pub fn resolve(&mut self) -> BoxFuture<'_, ()> {
        async move {
            while self.has_direct_pending() {
                self.resolve_direct().await;
            }

            let children = self
                .content
                .iter_mut()
                .chain(self.end_content.iter_mut())
                .filter_map(|slot| match slot {
                    Slot::Node(Node::Element(el)) => Some(el.resolve()),
                    Slot::Node(Node::Head(head)) => Some(head.element.resolve()),
                    _ => None,
                });
            join_all(children).await;
        }
        .boxed()
    }

    /// One round over the direct pending slots of both lists
    async fn resolve_direct(&mut self) {
        let mut waiting = Vec::new();
        let mut futures = Vec::new();
        for list in [List::Content, List::End] {
            for (i, slot) in self.slots_mut(list).iter_mut().enumerate() {
                if let Slot::Pending(pending) = slot {
                    let idle = future::ready(Child::Empty).boxed();
                    futures.push(mem::replace(&mut pending.future, idle));
                    waiting.push((list, i, mem::take(&mut pending.chained)));
                }
            }
        }

        let resolved = join_all(futures).await;

        let mut splices = Vec::with_capacity(waiting.len());
        let mut appended = Vec::new();
        for ((list, i, chained), child) in waiting.into_iter().zip(resolved) {
            let mut following = Vec::new();
            for Addition { child, options } in chained {
                let target = List::from(options);
                if target == list {
                    following.push(child);
                } else {
                    appended.push((target, child));
                }
            }
            splices.push((list, i, child, following));
        }

        // Back to front, so positions not yet spliced stay valid
        for (list, i, child, following) in splices.into_iter().rev() {
            self.slots_mut(list).remove(i);
            let mut at = i + self.insert_at(list, i, child);
            for child in following {
                at += self.insert_at(list, at, child);
            }
        }

        for (target, child) in appended {
            let end = self.slots(target).len();
            self.insert_at(target, end, child);
        }
    }

    // -------- Internals --------

    pub(crate) fn slots(&self, list: List) -> &Vec<Slot> {
        match list {
            List::Content => &self.content,
            List::End => &self.end_content,
        }
    }

    pub(crate) fn slots_mut(&mut self, list: List) -> &mut Vec<Slot> {
        match list {
            List::Content => &mut self.content,
            List::End => &mut self.end_content,
        }
    }

    /// Insert `child` at `at`, returns the number of slots inserted
    fn insert_at(&mut self, list: List, at: usize, child: Child) -> usize {
        match child {
            Child::Empty => 0,
            Child::Many(items) if items.iter().any(Child::is_pending) => {
                // Wait for the whole sequence so its order survives
                let future = join_all(items.into_iter().map(Child::into_future))
                    .map(Child::Many)
                    .boxed();
                self.slots_mut(list)
                    .insert(at, Slot::Pending(Pending::new(future)));
                1
            }
            Child::Many(items) => {
                let mut inserted = 0;
                for item in items {
                    inserted += self.insert_at(list, at + inserted, item);
                }
                inserted
            }
            Child::Pending(future) => {
                self.slots_mut(list)
                    .insert(at, Slot::Pending(Pending::new(future)));
                1
            }
            Child::Raw(text) => {
                self.slots_mut(list)
                    .insert(at, Slot::Node(Node::Text(TextNode::raw(text))));
                1
            }
            Child::Node(mut node) => {
                if let Node::Element(el) = &mut node {
                    el.parent = Some(self.id);
                }
                self.slots_mut(list).insert(at, Slot::Node(node));
                1
            }
        }
    }
}

/// Result of `Element::add`
///
/// When the add produced pending content, further `add` calls are queued
/// on it and applied in call order once it resolves. Otherwise they go
/// straight to the element.
#[derive(Debug)]
pub struct Added<'a> {
    element: &'a mut Element,
    pending: Option<(List, usize)>,
}

impl<'a> Added<'a> {
    pub fn add(self, child: impl Into<Child>) -> Added<'a> {
        self.add_with(child, AddOptions::default())
    }

    pub fn add_to_end(self, child: impl Into<Child>) -> Added<'a> {
        self.add_with(child, AddOptions::to_end())
    }

    pub fn add_with(self, child: impl Into<Child>, options: AddOptions) -> Added<'a> {
        let Added { element, pending } = self;
        match pending {
            Some((list, at)) => {
                if let Some(Slot::Pending(slot)) = element.slots_mut(list).get_mut(at) {
                    slot.chained.push(Addition {
                        child: child.into(),
                        options,
                    });
                }
                Added { element, pending }
            }
            None => element.add_with(child, options),
        }
    }

    /// Whether further adds are being deferred
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Back to the element
    pub fn into_element(self) -> &'a mut Element {
        self.element
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{asset, create, text_node};
    use crate::serializer::to_html;
    use std::time::Duration;

    fn rendered(el: &Element) -> String {
        el.stringify()
    }

    #[test]
    fn test_attr_set_get_delete() {
        let mut el = create("a");
        el.set_attr("href", "/x").set_attr("tabindex", 3);

        assert_eq!(el.attr("href"), Some("/x"));
        assert_eq!(el.attr("tabindex"), Some("3"));

        el.set_attr_opt::<&str>("href", None);
        assert_eq!(el.attr("href"), None);
        assert_eq!(rendered(&el), "<a tabindex=\"3\"></a>");
    }

    #[test]
    fn test_attr_keeps_insertion_order() {
        let mut el = create("input");
        el.set_attr("type", "text").set_attr("name", "q").set_attr("type", "search");

        assert_eq!(rendered(&el), "<input type=\"search\" name=\"q\"></input>");
    }

    #[test]
    fn test_classed_no_duplicates() {
        let mut el = create("div");
        el.classed("a b", true).classed("a b", true).classed("b", true);

        assert!(el.has_classes("a b"));
        assert!(el.has_classes("b a"));
        assert!(!el.has_classes("a c"));
        assert_eq!(el.class(), "a b");
    }

    #[test]
    fn test_classed_remove_last_leaves_empty() {
        let mut el = create("div");
        el.classed("a", true).classed("b", true);
        el.classed("a", false);
        assert_eq!(el.class(), "b");

        el.classed("b", false);
        assert_eq!(el.attr("class"), Some(""));
        assert_eq!(rendered(&el), "<div class=\"\"></div>");
    }

    #[test]
    fn test_id_and_class_wrappers() {
        let mut el = create("section");
        assert_eq!(el.id(), None);
        assert_eq!(el.class(), "");

        el.set_id("main").set_class("wide");
        assert_eq!(el.id(), Some("main"));
        assert_eq!(el.class(), "wide");
    }

    #[test]
    fn test_add_routes_to_end() {
        let mut el = create("ul");
        el.add_to_end(text_node("last"));
        el.add(text_node("first"));

        assert_eq!(el.content().len(), 1);
        assert_eq!(el.end_content().len(), 1);
        assert_eq!(rendered(&el), "<ul>firstlast</ul>");
    }

    #[test]
    fn test_add_none_is_noop() {
        let mut el = create("div");
        el.add(None::<Element>);
        assert!(el.content().is_empty());
    }

    #[test]
    fn test_add_sequence_and_strings() {
        let mut el = create("p");
        el.add(vec![Child::from("<i>raw</i>"), text_node("&").into()]);

        assert_eq!(rendered(&el), "<p><i>raw</i>&amp;</p>");
    }

    #[test]
    fn test_add_sets_parent() {
        let mut root = create("div");
        let child = create("span");
        let child_id = child.element_id();
        root.add(child);

        let found = root.get(child_id).unwrap();
        assert_eq!(found.parent(), Some(root.element_id()));
    }

    #[test]
    fn test_text_escaping_options() {
        let mut el = create("p");
        el.text("<b>")
            .text_with("<b>", TextOptions { escape: false })
            .text_opt(None::<&str>);

        assert_eq!(rendered(&el), "<p>&lt;b&gt;<b></p>");
    }

    #[test]
    fn test_remove_child_only_main_content() {
        let mut root = create("div");
        let a = create("a");
        let b = create("b");
        let (a_id, b_id) = (a.element_id(), b.element_id());
        root.add(a);
        root.add_to_end(b);

        assert!(!root.remove_child(b_id));
        assert!(root.remove_child(a_id));
        assert!(!root.remove_child(a_id));
        assert_eq!(rendered(&root), "<div><b></b></div>");
    }

    #[test]
    fn test_remove_via_handle() {
        let mut root = create("div");
        let mut inner = create("section");
        let leaf = create("span");
        let handle = {
            inner.add(leaf);
            match inner.content()[0].as_node() {
                Some(Node::Element(el)) => el.handle(),
                _ => panic!("expected element"),
            }
        };
        root.add(inner);

        assert!(root.remove(handle));
        assert_eq!(rendered(&root), "<div><section></section></div>");
        assert!(!root.remove(handle));
    }

    #[test]
    fn test_remove_with_handle_taken_before_add() {
        let mut root = create("div");
        let mut inner = create("section");
        let leaf = create("span");
        let handle = leaf.handle();
        assert_eq!(handle.parent, None);

        inner.add(leaf);
        root.add(inner);

        assert!(root.remove(handle));
        assert_eq!(rendered(&root), "<div><section></section></div>");
    }

    #[test]
    fn test_get_missing_element() {
        let root = create("div");
        let other = create("div");
        assert!(matches!(
            root.get(other.element_id()),
            Err(DomError::ElementNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_pending_add_resolves_in_place() {
        let mut el = create("div");
        el.add(text_node("a"));
        let added = el.add(Child::pending(async { text_node("b") }));
        assert!(added.is_pending());
        el.add(text_node("c"));

        assert!(el.has_pending());
        el.resolve().await;
        assert!(!el.has_pending());
        assert_eq!(rendered(&el), "<div>abc</div>");
    }

    #[tokio::test]
    async fn test_chained_adds_wait_for_pending() {
        let mut el = create("div");
        el.add(Child::pending(async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            text_node("1")
        }))
        .add(text_node("2"))
        .add_to_end(text_node("end"))
        .add(text_node("3"));

        // Chained additions are queued, not inserted yet
        assert_eq!(el.content().len(), 1);
        assert!(el.end_content().is_empty());

        el.resolve().await;
        assert_eq!(rendered(&el), "<div>123end</div>");
    }

    #[tokio::test]
    async fn test_sequence_with_pending_keeps_order() {
        let mut el = create("ol");
        let slow = Child::pending(async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            text_node("slow")
        });
        let added = el.add(vec![text_node("first").into(), slow, text_node("last").into()]);
        assert!(added.is_pending());

        // Whole sequence waits as one slot
        assert_eq!(el.content().len(), 1);
        el.resolve().await;
        assert_eq!(rendered(&el), "<ol>firstslowlast</ol>");
    }

    #[tokio::test]
    async fn test_nested_pending_resolves_transitively() {
        let mut inner = create("span");
        inner.add(Child::pending(async {
            Child::pending(async { vec![text_node("x"), text_node("y")] })
        }));
        let mut root = create("div");
        root.add(inner);

        root.resolve().await;
        assert_eq!(rendered(&root), "<div><span>xy</span></div>");
    }

    #[tokio::test]
    async fn test_pending_element_gets_parent() {
        let mut root = create("div");
        let child = create("em");
        let id = child.element_id();
        root.add(Child::pending(async move { child }));
        root.resolve().await;

        assert_eq!(root.get(id).unwrap().parent(), Some(root.element_id()));
    }

    #[tokio::test]
    async fn test_pending_into_end_content() {
        let mut root = create("div");
        root.add_to_end(Child::pending(async { asset("/a.js", "a.js") }))
            .add(text_node("chained"));
        root.add(text_node("main"));

        root.resolve().await;
        assert_eq!(to_html(root.content()), "mainchained");
        assert_eq!(root.end_content().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_slots_resolve_concurrently() {
        let mut el = create("div");
        for n in 0..5u64 {
            el.add(Child::pending(async move {
                tokio::time::sleep(Duration::from_millis(100 - n * 10)).await;
                text_node(&n.to_string())
            }));
        }
        el.add_to_end(Child::pending(async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            text_node("!")
        }));

        let started = tokio::time::Instant::now();
        el.resolve().await;

        // One wait for the slowest, not the sum of all six
        assert!(started.elapsed() < Duration::from_millis(150));
        assert_eq!(rendered(&el), "<div>01234!</div>");
    }

    #[tokio::test(start_paused = true)]
    async fn test_child_subtrees_resolve_concurrently() {
        let mut root = create("div");
        for n in 0..4u64 {
            let mut child = create("p");
            child.add(Child::pending(async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                text_node(&n.to_string())
            }));
            root.add(child);
        }

        let started = tokio::time::Instant::now();
        root.resolve().await;

        assert!(started.elapsed() < Duration::from_millis(150));
        assert_eq!(rendered(&root), "<div><p>0</p><p>1</p><p>2</p><p>3</p></div>");
    }

    #[tokio::test]
    async fn test_concurrent_round_splices_chained_adds() {
        let mut el = create("div");
        el.add(Child::pending(async { text_node("a") }))
            .add(text_node("b"))
            .add_to_end(text_node("z"));
        el.add(Child::pending(async { text_node("c") }))
            .add(text_node("d"));
        el.add_to_end(Child::pending(async { text_node("y") }))
            .add(text_node("e"));

        el.resolve().await;
        assert_eq!(to_html(el.content()), "abcde");
        assert_eq!(to_html(el.end_content()), "yz");
    }
}
