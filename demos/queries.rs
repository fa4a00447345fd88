//! Path queries and select commands over a user table.
//!
//! Run with: cargo run --example queries

use cfx2::{compile, from_str, Resolved};
use std::error::Error;
use std::ops::ControlFlow;

const USERS: &str = "\
Users
  root: 'Super user' (homeDir: '/root', shell: '/bin/zsh')
  userA (homeDir: '/home/a')
  userB (homeDir: '/home/b')
  adminX (homeDir: '/home/x')
";

fn main() -> Result<(), Box<dyn Error>> {
    let mut doc = from_str(USERS)?;

    // Read-only lookups
    println!("root lives in {:?}", doc.query_value("Users/root.homeDir"));
    match doc.query("Users/root") {
        Some(Resolved::Node(node)) => println!("root has {} attributes", node.attributes().len()),
        _ => println!("no root"),
    }
    assert!(doc.query("Users/nobody").is_none());

    // Modifying queries create what is missing
    doc.apply("Users/guest.homeDir:/home/guest")?;
    doc.apply("Users/guest:Guest account")?;
    println!("guest: {:?}", doc.query_value("Users/guest"));

    // Select commands match children by name
    let users = doc.find_child("Users").ok_or("missing Users")?;
    let cmd = compile("select user*, *X")?;
    println!("{cmd}:");
    cmd.execute(users, |node| {
        println!("  {} -> {}", node.name().unwrap_or("?"), node.attrib("homeDir").unwrap_or("-"));
        ControlFlow::Continue(())
    })?;

    let everyone = users.select("select *")?;
    println!("{} users in total", everyone.len());

    Ok(())
}
