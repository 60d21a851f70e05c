//! Renders children into a container elsewhere in the document.
//!
//! Children are rendered in place into a `display: contents` host, then an
//! effect moves the host into the target container. That move is the
//! attach phase; `on_attach` is the post-attach hook dependents use.

use leptos::html;
use leptos::prelude::*;
use web_sys::{Element, Node};

use crate::dom::WebDocument;
use layerkit_core::dom::Document;

/// Supplies the element overlays attach to. Returning `None` means the
/// container is not ready yet; signals read here are tracked, so the
/// portal attaches once the supplier yields a node.
pub type ContainerFn = Callback<(), Option<Element>>;

/// Passed to `on_attach` once the host sits in its container.
#[derive(Debug, Clone)]
pub struct PortalMount {
    pub container: Element,
    pub host: Element,
}

/// `<body>` when no supplier is given. A supplier's `None` is passed
/// through as "not ready".
pub fn resolve_container(container: Option<ContainerFn>) -> Option<Element> {
    match container {
        Some(supplier) => supplier.try_run(()).flatten(),
        None => WebDocument.body(),
    }
}

#[component]
pub fn Portal(
    /// Target container. Defaults to `<body>`.
    #[prop(default = None)]
    container: Option<ContainerFn>,
    /// Keep children in the logical parent instead.
    #[prop(optional, into)]
    disable_portal: MaybeProp<bool>,
    #[prop(optional)] on_attach: Option<Callback<PortalMount>>,
    children: Children,
) -> impl IntoView {
    let marker = NodeRef::<html::Template>::new();
    let host_ref = NodeRef::<html::Div>::new();
    let attached = StoredValue::new_local(None::<Element>);

    Effect::new(move |_| {
        let disabled = disable_portal.get().unwrap_or(false);
        let (Some(marker), Some(host)) = (marker.get(), host_ref.get()) else {
            return;
        };
        let host = Element::from(host);

        let target = if disabled {
            let Some(parent) = marker.parent_element() else {
                return;
            };
            let host_node: &Node = &host;
            if marker.next_sibling().as_ref() != Some(host_node) {
                let _ = parent.insert_before(&host, marker.next_sibling().as_ref());
            }
            parent
        } else {
            let Some(container) = resolve_container(container) else {
                log::debug!("portal: no container available yet");
                // Nothing shows until the container resolves.
                host.remove();
                attached.set_value(None);
                return;
            };
            if host.parent_element().as_ref() != Some(&container) {
                let _ = container.append_child(&host);
            }
            container
        };

        attached.set_value(Some(host.clone()));
        if let Some(on_attach) = on_attach {
            on_attach.run(PortalMount {
                container: target,
                host,
            });
        }
    });

    on_cleanup(move || {
        attached.try_update_value(|host| {
            if let Some(host) = host.take() {
                host.remove();
            }
        });
    });

    view! {
        <template node_ref=marker></template>
        <div node_ref=host_ref class="layerkit-portal" style="display: contents">
            {children()}
        </div>
    }
}
