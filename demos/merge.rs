//! Merging a site-specific configuration layer over the defaults.
//!
//! Run with: cargo run --example merge

use cfx2::{from_str, merge, to_string, MergeFlags, Node};
use std::borrow::Cow;
use std::error::Error;

const DEFAULTS: &str = "\
Server: 'default' (port: 8080, workers: 4, tls)
  Route: '/' (handler: 'index')
";

const SITE: &str = "\
Server: 'production' (port: 443, log: 'warn')
  Route: '/admin' (handler: 'admin')
";

fn main() -> Result<(), Box<dyn Error>> {
    let defaults = from_str(DEFAULTS)?;
    let site = from_str(SITE)?;
    let base = defaults.find_child("Server").ok_or("missing Server")?;

    for (label, flags) in [
        ("defaults win", MergeFlags::empty()),
        (
            "site wins",
            MergeFlags::TEXT_FROM_RIGHT
                | MergeFlags::PREFER_ATTRIBS_FROM_RIGHT
                | MergeFlags::RIGHT_CHILDREN_FIRST,
        ),
    ] {
        let overlay = site.children()[0].clone();
        let merged = merge(Cow::Borrowed(base), Cow::Owned(overlay), flags)?;

        let mut doc = Node::document();
        doc.add_child(merged);
        println!("{label}:\n{}", to_string(&doc)?);
    }

    // The borrowed side is left untouched
    assert_eq!(base.attrib("port"), Some("8080"));
    Ok(())
}
