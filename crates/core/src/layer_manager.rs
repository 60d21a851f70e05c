//! Registry of open overlays and of the containers hosting them.
//!
//! Each container goes through
//! `unregistered -> registered -> locked -> registered -> unregistered`:
//! the first [`LayerManager::add`] registers it, the first
//! [`LayerManager::mount`] locks scrolling, and the last
//! [`LayerManager::remove`] restores everything and forgets it.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::aria::{aria_hidden, aria_hidden_siblings, hidden_siblings};
use crate::dom::Document;
use crate::error::LayerError;
use crate::scroll_lock::{lock_container, StylePatch};

static NEXT_OVERLAY_ID: AtomicU64 = AtomicU64::new(1);

struct OverlayInner<N> {
    id: u64,
    surface: RefCell<Option<N>>,
    mount_node: RefCell<Option<N>>,
}

/// Handle to one logical overlay. Clones share identity.
pub struct OverlayRecord<N> {
    inner: Rc<OverlayInner<N>>,
}

impl<N> OverlayRecord<N> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(OverlayInner {
                id: NEXT_OVERLAY_ID.fetch_add(1, Ordering::Relaxed),
                surface: RefCell::new(None),
                mount_node: RefCell::new(None),
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Root node rendered for the overlay, once it exists.
    pub fn set_surface(&self, node: Option<N>) {
        *self.inner.surface.borrow_mut() = node;
    }

    /// Node the portal attached to the mount container.
    pub fn set_mount_node(&self, node: Option<N>) {
        *self.inner.mount_node.borrow_mut() = node;
    }
}

impl<N: Clone> OverlayRecord<N> {
    pub fn surface(&self) -> Option<N> {
        self.inner.surface.borrow().clone()
    }

    pub fn mount_node(&self) -> Option<N> {
        self.inner.mount_node.borrow().clone()
    }
}

impl<N> Clone for OverlayRecord<N> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<N> PartialEq for OverlayRecord<N> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<N> Default for OverlayRecord<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> fmt::Debug for OverlayRecord<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OverlayRecord(#{})", self.inner.id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MountOptions {
    pub disable_scroll_lock: bool,
}

struct ContainerEntry<N> {
    container: N,
    overlays: Vec<OverlayRecord<N>>,
    restore: Option<StylePatch<N>>,
    hidden_sibling_nodes: Vec<N>,
}

/// Tracks every open overlay (stacking order) and, per container, the
/// scroll lock and sibling visibility to restore.
pub struct LayerManager<D: Document> {
    doc: D,
    overlays: Vec<OverlayRecord<D::Node>>,
    containers: Vec<ContainerEntry<D::Node>>,
}

impl<D: Document> LayerManager<D> {
    pub fn new(doc: D) -> Self {
        Self {
            doc,
            overlays: Vec::new(),
            containers: Vec::new(),
        }
    }

    pub fn document(&self) -> &D {
        &self.doc
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    pub fn container_count(&self) -> usize {
        self.containers.len()
    }

    /// Overlays hosted by `container`, bottom to top.
    pub fn overlays_in(&self, container: &D::Node) -> Vec<OverlayRecord<D::Node>> {
        self.containers
            .iter()
            .find(|entry| entry.container == *container)
            .map(|entry| entry.overlays.clone())
            .unwrap_or_default()
    }

    pub fn is_top_modal(&self, overlay: &OverlayRecord<D::Node>) -> bool {
        self.overlays.last() == Some(overlay)
    }

    /// Registers `overlay` as the topmost layer inside `container` and
    /// returns its stacking index. Adding a registered overlay again is a
    /// no-op returning its current index.
    pub fn add(&mut self, overlay: &OverlayRecord<D::Node>, container: &D::Node) -> usize {
        if let Some(index) = self.overlays.iter().position(|o| o == overlay) {
            let elsewhere = self
                .containers
                .iter()
                .any(|entry| entry.overlays.contains(overlay) && entry.container != *container);
            if elsewhere {
                log::warn!(
                    "layer: overlay #{} re-added to a different container, keeping the first",
                    overlay.id()
                );
            }
            return index;
        }

        let index = self.overlays.len();
        self.overlays.push(overlay.clone());

        let surface = overlay.surface();
        if let Some(node) = &surface {
            aria_hidden(&self.doc, node, false);
        }

        let hidden = hidden_siblings(&self.doc, container);
        aria_hidden_siblings(
            &self.doc,
            container,
            &[overlay.mount_node(), surface],
            &hidden,
            true,
        );

        match self
            .containers
            .iter_mut()
            .find(|entry| entry.container == *container)
        {
            Some(entry) => entry.overlays.push(overlay.clone()),
            None => self.containers.push(ContainerEntry {
                container: container.clone(),
                overlays: vec![overlay.clone()],
                restore: None,
                hidden_sibling_nodes: hidden,
            }),
        }

        log::debug!("layer: added overlay #{} at index {index}", overlay.id());
        index
    }

    /// Called once the overlay's node is attached. The first mount into a
    /// container locks its scrolling.
    pub fn mount(
        &mut self,
        overlay: &OverlayRecord<D::Node>,
        options: MountOptions,
    ) -> Result<(), LayerError> {
        let entry = self
            .containers
            .iter_mut()
            .find(|entry| entry.overlays.contains(overlay))
            .ok_or(LayerError::NotRegistered(overlay.id()))?;

        if entry.restore.is_none() {
            entry.restore = Some(if options.disable_scroll_lock {
                StylePatch::new()
            } else {
                lock_container(&self.doc, &entry.container)
            });
        }
        Ok(())
    }

    /// Unregisters `overlay`. Returns the index it had in the stack, or
    /// `None` when it was not registered (nothing is touched then).
    pub fn remove(&mut self, overlay: &OverlayRecord<D::Node>) -> Option<usize> {
        let index = self.overlays.iter().position(|o| o == overlay)?;
        let Some(container_index) = self
            .containers
            .iter()
            .position(|entry| entry.overlays.contains(overlay))
        else {
            log::warn!("layer: overlay #{} has no container entry", overlay.id());
            self.overlays.remove(index);
            return Some(index);
        };

        self.overlays.remove(index);
        let entry = &mut self.containers[container_index];
        entry.overlays.retain(|o| o != overlay);

        if entry.overlays.is_empty() {
            let entry = self.containers.remove(container_index);
            // A modal closed before its first paint never locked anything.
            if let Some(patch) = entry.restore {
                patch.restore(&self.doc);
            }

            let surface = overlay.surface();
            if let Some(node) = &surface {
                aria_hidden(&self.doc, node, true);
            }
            aria_hidden_siblings(
                &self.doc,
                &entry.container,
                &[overlay.mount_node(), surface],
                &entry.hidden_sibling_nodes,
                false,
            );
            log::debug!("layer: released container after overlay #{}", overlay.id());
        } else if let Some(next_top) = entry.overlays.last() {
            // The mount node is the container's child; the surface may sit
            // inside it.
            for node in [next_top.mount_node(), next_top.surface()].into_iter().flatten() {
                aria_hidden(&self.doc, &node, false);
            }
        }

        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_dom::{FakeDocument, FakeNode};

    fn overlay_in(doc: &FakeDocument, container: &FakeNode) -> OverlayRecord<FakeNode> {
        let overlay = OverlayRecord::new();
        overlay.set_surface(Some(doc.create_in(container, "div")));
        overlay
    }

    #[test]
    fn test_add_is_idempotent() {
        let doc = FakeDocument::new();
        let container = doc.create_in(&doc.body_node(), "div");
        let mut manager = LayerManager::new(doc);
        let overlay = OverlayRecord::new();

        let idx = manager.add(&overlay, &container);
        manager.mount(&overlay, MountOptions::default()).unwrap();

        assert_eq!(manager.add(&overlay, &container), idx);
        assert_eq!(manager.overlays_in(&container).len(), 1);
        assert_eq!(manager.remove(&overlay), Some(idx));
        assert!(manager.is_empty());
        assert_eq!(manager.container_count(), 0);
    }

    #[test]
    fn test_readd_to_other_container_keeps_first() {
        let doc = FakeDocument::new();
        let first = doc.create_in(&doc.body_node(), "div");
        let second = doc.create_in(&doc.body_node(), "div");
        let mut manager = LayerManager::new(doc);
        let overlay = OverlayRecord::new();

        assert_eq!(manager.add(&overlay, &first), 0);
        assert_eq!(manager.add(&overlay, &second), 0);
        assert_eq!(manager.overlays_in(&first).len(), 1);
        assert!(manager.overlays_in(&second).is_empty());
        assert_eq!(manager.container_count(), 1);
    }

    #[test]
    fn test_stacking_follows_insertion_order() {
        let doc = FakeDocument::new();
        let container = doc.create_in(&doc.body_node(), "div");
        let mut manager = LayerManager::new(doc);
        let modal1 = OverlayRecord::new();
        let modal2 = OverlayRecord::new();
        let modal3 = OverlayRecord::new();

        assert_eq!(manager.add(&modal1, &container), 0);
        manager.mount(&modal1, MountOptions::default()).unwrap();
        assert!(manager.is_top_modal(&modal1));
        assert_eq!(manager.add(&modal2, &container), 1);
        assert!(manager.is_top_modal(&modal2));
        assert_eq!(manager.add(&modal3, &container), 2);
        assert!(manager.is_top_modal(&modal3));

        assert_eq!(manager.remove(&modal2), Some(1));
        assert_eq!(manager.add(&modal2, &container), 2);
        manager.mount(&modal2, MountOptions::default()).unwrap();
        assert!(manager.is_top_modal(&modal2));
        assert!(!manager.is_top_modal(&modal3));

        assert_eq!(manager.remove(&modal3), Some(1));
        assert_eq!(manager.remove(&modal2), Some(1));
        assert!(manager.is_top_modal(&modal1));
        assert_eq!(manager.remove(&modal1), Some(0));
        assert!(!manager.is_top_modal(&modal1));
    }

    #[test]
    fn test_remove_unknown_overlay_is_noop() {
        let doc = FakeDocument::new();
        let container = doc.create_in(&doc.body_node(), "div");
        let mut manager = LayerManager::new(doc);
        let registered = OverlayRecord::new();
        manager.add(&registered, &container);

        assert_eq!(manager.remove(&OverlayRecord::new()), None);
        assert_eq!(manager.len(), 1);
        assert!(manager.is_top_modal(&registered));
    }

    #[test]
    fn test_mount_requires_add() {
        let mut manager = LayerManager::new(FakeDocument::new());
        let overlay = OverlayRecord::new();

        assert_eq!(
            manager.mount(&overlay, MountOptions::default()),
            Err(LayerError::NotRegistered(overlay.id()))
        );
    }

    #[test]
    fn test_sibling_hiding_round_trip() {
        let doc = FakeDocument::new();
        let container = doc.create_in(&doc.body_node(), "div");
        let a = doc.create_in(&container, "div");
        let b = doc.create_in(&container, "div");
        let c = doc.create_in(&container, "div");
        doc.set_attribute(&b, "aria-hidden", "true");
        let overlay = overlay_in(&doc, &container);
        let surface = overlay.surface().unwrap();

        let mut manager = LayerManager::new(doc);
        manager.add(&overlay, &container);
        let doc = manager.document();
        assert!(doc.is_hidden(&a));
        assert!(doc.is_hidden(&b));
        assert!(doc.is_hidden(&c));
        assert!(!doc.is_hidden(&surface));

        manager.remove(&overlay);
        let doc = manager.document();
        assert!(!doc.is_hidden(&a));
        assert!(doc.is_hidden(&b));
        assert!(!doc.is_hidden(&c));
    }

    #[test]
    fn test_next_top_overlay_is_revealed() {
        let doc = FakeDocument::new();
        let container = doc.create_in(&doc.body_node(), "div");
        let sibling = doc.create_in(&container, "div");
        let first = overlay_in(&doc, &container);
        let second = overlay_in(&doc, &container);
        let first_surface = first.surface().unwrap();

        let mut manager = LayerManager::new(doc);
        manager.add(&first, &container);
        manager.add(&second, &container);
        assert!(manager.document().is_hidden(&first_surface));

        manager.remove(&second);
        assert!(!manager.document().is_hidden(&first_surface));
        assert!(manager.document().is_hidden(&sibling));

        manager.remove(&first);
        assert!(!manager.document().is_hidden(&sibling));
    }

    #[test]
    fn test_next_top_mount_host_is_revealed() {
        let doc = FakeDocument::new();
        let container = doc.create_in(&doc.body_node(), "div");
        let hosted = |doc: &FakeDocument| {
            let overlay = OverlayRecord::new();
            let host = doc.create_in(&container, "div");
            overlay.set_surface(Some(doc.create_in(&host, "div")));
            overlay.set_mount_node(Some(host));
            overlay
        };
        let first = hosted(&doc);
        let second = hosted(&doc);
        let first_host = first.mount_node().unwrap();
        let first_surface = first.surface().unwrap();

        let mut manager = LayerManager::new(doc);
        manager.add(&first, &container);
        manager.add(&second, &container);
        assert!(manager.document().is_hidden(&first_host));

        manager.remove(&second);
        assert!(!manager.document().is_hidden(&first_host));
        assert!(!manager.document().is_hidden(&first_surface));
    }

    #[test]
    fn test_scroll_lock_pairs_with_last_removal() {
        let doc = FakeDocument::with_scrollbar(15.0);
        let container = doc.create_in(&doc.body_node(), "div");
        doc.set_style(&container, "padding-right", "20px");
        doc.set_overflowing(&container, true);

        let mut manager = LayerManager::new(doc);
        let first = OverlayRecord::new();
        let second = OverlayRecord::new();

        manager.add(&first, &container);
        manager.mount(&first, MountOptions::default()).unwrap();
        manager.add(&second, &container);
        manager.mount(&second, MountOptions::default()).unwrap();
        assert_eq!(manager.document().style(&container, "padding-right"), "35px");
        assert_eq!(manager.document().style(&container, "overflow"), "hidden");

        manager.remove(&first);
        assert_eq!(manager.document().style(&container, "overflow"), "hidden");

        manager.remove(&second);
        assert_eq!(manager.document().style(&container, "padding-right"), "20px");
        assert_eq!(manager.document().style(&container, "overflow"), "");
    }

    #[test]
    fn test_disable_scroll_lock_leaves_styles() {
        let doc = FakeDocument::new();
        let container = doc.create_in(&doc.body_node(), "div");
        doc.set_overflowing(&container, true);

        let mut manager = LayerManager::new(doc);
        let overlay = OverlayRecord::new();
        manager.add(&overlay, &container);
        manager
            .mount(
                &overlay,
                MountOptions {
                    disable_scroll_lock: true,
                },
            )
            .unwrap();

        assert_eq!(manager.document().style(&container, "overflow"), "");
        assert_eq!(manager.document().style(&container, "padding-right"), "");
        manager.remove(&overlay);
    }

    #[test]
    fn test_remove_before_mount_hides_surface() {
        let doc = FakeDocument::new();
        let container = doc.create_in(&doc.body_node(), "div");
        let overlay = overlay_in(&doc, &container);
        let surface = overlay.surface().unwrap();

        let mut manager = LayerManager::new(doc);
        manager.add(&overlay, &container);
        assert_eq!(manager.remove(&overlay), Some(0));

        assert!(manager.document().is_hidden(&surface));
        assert_eq!(manager.document().style(&container, "overflow"), "");
    }
}
