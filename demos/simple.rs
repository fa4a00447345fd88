//! Parsing, editing and writing a document.
//!
//! Run with: cargo run --example simple

use cfx2::{from_str, to_string, Node};
use std::error::Error;

const CONFIG: &str = "\
{ display settings }
Window: 'Main window' (width: 640, height: 480)
  Title: 'Hello'
  Font (face: 'DejaVu Sans', size: 11)

Audio (volume: '0.8', muted)
";

fn main() -> Result<(), Box<dyn Error>> {
    let mut doc = from_str(CONFIG)?;

    let window = doc.find_child_mut("Window").ok_or("missing Window")?;
    let width = window.attrib_i64("width")?;
    window.set_attrib_i64("width", width * 2)?;
    window.add_child(Node::new("Icon").with_text("app.png"));

    let audio = doc.find_child_mut("Audio").ok_or("missing Audio")?;
    let volume = audio.attrib_f64("volume")?;
    audio.set_attrib_f64("volume", volume / 2.0)?;
    audio.remove_attrib("muted")?;

    let text = to_string(&doc)?;
    println!("Edited document:\n{text}");

    let back = from_str(&text)?;
    assert_eq!(back, doc);
    println!("✓ Round-trip successful");

    Ok(())
}
