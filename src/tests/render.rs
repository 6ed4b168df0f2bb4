use anyhow::anyhow;
use brook_memory::{MemoryError, MemoryTree, NodeId};

use crate::prelude::*;
use crate::{Error, Node, RenderError, SUPPORTED_EVENTS};

fn setup() -> (Renderer<MemoryTree>, NodeId) {
    let mut tree = MemoryTree::new();
    let root = tree.create_container("div");
    (Renderer::new(tree), root)
}

fn html(renderer: &Renderer<MemoryTree>, container: NodeId) -> String {
    renderer.host().inner_html(container)
}

fn counter(count: i32) -> VNode {
    h(
        "div",
        props! { "className" => "counter" },
        children![
            h("span", Props::new(), children!["count: ", count]),
            h("button", Props::new(), children!["+"]),
        ],
    )
}

#[test]
fn first_render_clears_the_container() {
    let mut tree = MemoryTree::new();
    let root = tree.create_container("div");
    let stale = tree.create_text_node("server markup").unwrap();
    tree.append_child(&root, &stale).unwrap();

    let mut renderer = Renderer::new(tree);
    renderer.render(counter(0), &root).unwrap();

    assert_eq!(
        html(&renderer, root),
        r#"<div class="counter"><span>count: 0</span><button>+</button></div>"#
    );
    assert_eq!(renderer.host().parent(stale), None);
}

#[test]
fn clearing_can_be_turned_off() {
    let mut tree = MemoryTree::new();
    let root = tree.create_container("div");
    let header = tree.create_element_node("header").unwrap();
    tree.append_child(&root, &header).unwrap();

    let mut renderer = Renderer::<MemoryTree>::builder().clear_on_mount(false).build(tree);
    renderer.render("body", &root).unwrap();

    assert_eq!(html(&renderer, root), "<header></header>body");
    assert!(!renderer.options().clear_on_mount());
}

#[test]
fn rerender_updates_in_place() {
    let (mut renderer, root) = setup();
    renderer.render(counter(0), &root).unwrap();
    let wrapper = renderer.host().children(root)[0];
    renderer.host_mut().reset_counters();

    renderer.render(counter(1), &root).unwrap();

    assert_eq!(renderer.host().children(root), [wrapper]);
    assert_eq!(
        renderer.host().counters(),
        brook_memory::Counters {
            text_writes: 1,
            ..Default::default()
        }
    );
    assert_eq!(
        html(&renderer, root),
        r#"<div class="counter"><span>count: 1</span><button>+</button></div>"#
    );
}

#[test]
fn remembered_tree_is_normalized() {
    let greeting = Component::new(|props: &ComponentProps| {
        let name = props
            .get("name")
            .and_then(PropValue::to_attribute_value)
            .unwrap_or_default();
        h("p", Props::new(), children!["hello ", name])
    });
    let (mut renderer, root) = setup();

    renderer
        .render(h(greeting, props! { "name" => "ada" }, children![]), &root)
        .unwrap();

    let Some(Node::Element(element)) = renderer.tree(&root) else {
        panic!("expected an element, found {:?}", renderer.tree(&root));
    };
    assert_eq!(element.tag, "p");
    assert_eq!(html(&renderer, root), "<p>hello ada</p>");
}

#[test]
fn components_see_their_children() {
    let card = Component::new(|props: &ComponentProps| {
        h(
            "article",
            Props::new(),
            props.children().iter().cloned().collect::<Vec<_>>(),
        )
    });
    let (mut renderer, root) = setup();

    renderer
        .render(
            h(card, Props::new(), children![h("h1", Props::new(), children!["title"]), "body"]),
            &root,
        )
        .unwrap();

    assert_eq!(html(&renderer, root), "<article><h1>title</h1>body</article>");
}

#[test]
fn failing_component_leaves_everything_untouched() {
    let broken = Component::try_new(|_| Err(anyhow!("no data"))).with_name("Broken");
    let (mut renderer, root) = setup();
    renderer.render(counter(3), &root).unwrap();
    let before = renderer.tree(&root).cloned();
    renderer.host_mut().reset_counters();

    let error = renderer
        .render(
            h("main", Props::new(), children![h(broken, Props::new(), children![])]),
            &root,
        )
        .unwrap_err();

    assert!(matches!(error, Error::Normalize(_)));
    assert!(error.to_string().contains("Broken"));
    assert_eq!(renderer.host().counters(), brook_memory::Counters::default());
    assert_eq!(renderer.tree(&root).cloned(), before);
}

#[test]
fn unmount_empties_and_forgets() {
    let (mut renderer, root) = setup();
    renderer.render(counter(0), &root).unwrap();

    assert!(renderer.unmount(&root).unwrap());
    assert_eq!(html(&renderer, root), "");
    assert!(renderer.tree(&root).is_none());
    assert!(!renderer.unmount(&root).unwrap());

    renderer.render(counter(5), &root).unwrap();
    assert!(html(&renderer, root).contains("count: 5"));
}

#[test]
fn containers_are_independent() {
    let mut tree = MemoryTree::new();
    let left = tree.create_container("div");
    let right = tree.create_container("div");
    let mut renderer = Renderer::new(tree);

    renderer.render("left", &left).unwrap();
    renderer.render(counter(0), &right).unwrap();
    renderer.render("still left", &left).unwrap();

    assert_eq!(html(&renderer, left), "still left");
    assert!(html(&renderer, right).contains("count: 0"));
    assert!(renderer.events().is_delegated(&left));
    assert!(renderer.events().is_delegated(&right));
}

#[test]
fn empty_views_render_nothing_visible() {
    let (mut renderer, root) = setup();
    renderer.render(VNode::Empty, &root).unwrap();
    assert_eq!(html(&renderer, root), "");

    renderer.render("now text", &root).unwrap();
    assert_eq!(html(&renderer, root), "now text");

    renderer.render(None::<&str>, &root).unwrap();
    assert_eq!(html(&renderer, root), "");
}

#[test]
fn root_fragments_mount_as_siblings() {
    let (mut renderer, root) = setup();
    renderer
        .render(
            vec![
                h("li", Props::new(), children!["a"]),
                h("li", Props::new(), children!["b"]),
            ],
            &root,
        )
        .unwrap();
    assert_eq!(renderer.host().children(root).len(), 2);

    renderer.render(h("li", Props::new(), children!["only"]), &root).unwrap();
    assert_eq!(html(&renderer, root), "<li>only</li>");
}

#[test]
fn tampered_live_tree_is_reported() {
    let (mut renderer, root) = setup();
    renderer.render(vec!["a", "b"], &root).unwrap();
    renderer.host_mut().clear_children(&root).unwrap();

    let error = renderer.render(vec!["a", "c"], &root).unwrap_err();

    assert!(matches!(
        error,
        Error::Render(RenderError::MissingChild { index: 1 })
    ));
    assert!(error.host().is_none());
}

#[test]
fn host_errors_are_exposed() {
    let mut tree = MemoryTree::new();
    let text = tree.create_text_node("leaf").unwrap();
    let mut renderer = Renderer::new(tree);

    let error = renderer.render("child", &text).unwrap_err();

    assert_eq!(error.host(), Some(&MemoryError::NotAnElement(text)));
    assert!(renderer.tree(&text).is_none());
}

#[test]
fn default_options_delegate_every_supported_event() {
    let (renderer, _) = setup();
    assert_eq!(renderer.options().delegated_events().len(), SUPPORTED_EVENTS.len());
    assert!(renderer.options().clear_on_mount());
}
