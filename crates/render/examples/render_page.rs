//! Render a small documentation page, linking assets under /assets

use render::{DocumentSerializer, FsLoader, SerializerConfig};
use std::sync::Arc;
use vdom::{asset, body_classed, create, head_with_id, text_node, Child};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let mut title = create("title");
    title.text("Element API");

    let mut page = create("div");
    page.set_class("docs-page")
        .add(head_with_id(title, "title"))
        .add(body_classed("docs", true))
        .add(asset("/docs.css", "docs.css"));

    let mut heading = create("h1");
    heading.text("Element <API>");
    page.add(heading);

    // Content that arrives later, e.g. a changelog rendered elsewhere
    page.add(Child::pending(async {
        let mut list = create("ul");
        for version in ["1.0.0", "1.1.0"] {
            let mut item = create("li");
            item.text(version);
            list.add(item);
        }
        list
    }))
    .add(text_node("Generated docs"));

    let serializer = DocumentSerializer::with_config(SerializerConfig::linked("/assets"))
        .with_loader(Arc::new(FsLoader::new()));
    let document = serializer.stringify([page]).await?;

    println!("{}", document.html);
    for asset in &document.assets {
        println!("copy {} -> {}", asset.file.display(), asset.url);
    }

    Ok(())
}
