//! Rendering and extraction over a wide, moderately deep tree

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vdom::{asset, body_classed, create, extract_directives, serializer, Element, Node, Slot};

fn build_page(sections: usize, items: usize) -> Element {
    let mut root = create("main");
    for s in 0..sections {
        let mut section = create("section");
        section.set_id(format!("s{}", s)).classed("docs-section", true);
        section.add(asset("/section.css", "section.css"));
        for i in 0..items {
            let mut item = create("div");
            item.set_class("item").text(format!("item <{}> of {}", i, s));
            if i % 10 == 0 {
                item.add(body_classed("has-items", true));
            }
            section.add(item);
        }
        root.add(section);
    }
    root
}

fn bench_render(c: &mut Criterion) {
    let roots = vec![Slot::Node(Node::Element(build_page(50, 100)))];

    c.bench_function("to_html 5k elements", |b| {
        b.iter(|| serializer::to_html(black_box(&roots)))
    });

    c.bench_function("extract_directives 5k elements", |b| {
        b.iter(|| extract_directives(black_box(&roots)).assets.len())
    });
}

criterion_group!(benches, bench_render);
criterion_main!(benches);
