//! TOON's tabular format on uniformly-shaped data.
//!
//! Run with: cargo run --example tabular_arrays

use std::error::Error;
use toon_codec::{decode, encode, toon};

fn main() -> Result<(), Box<dyn Error>> {
    // A uniform array of flat objects qualifies for the tabular layout:
    // one header line, one row per element, no repeated keys.
    let inventory = toon!({
        "products": [
            {"sku": "WIDGET-001", "name": "Widget", "price": 9.99, "stock": 130},
            {"sku": "GADGET-042", "name": "Gadget", "price": 14.99, "stock": 41},
            {"sku": "DOODAD-007", "name": "Doodad", "price": 4.5, "stock": 0}
        ]
    });

    let toon = encode(&inventory)?;
    println!("Tabular TOON:\n{}\n", toon);

    let json = serde_json::to_string(&inventory)?;
    println!("Equivalent JSON ({} chars vs {} chars):\n{}\n", json.len(), toon.len(), json);

    // A single nested value anywhere disqualifies the table; the encoder
    // falls back to list form.
    let mixed = toon!({
        "products": [
            {"sku": "WIDGET-001", "dims": {"w": 3, "h": 5}},
            {"sku": "GADGET-042", "dims": {"w": 1, "h": 2}}
        ]
    });
    println!("List-form fallback:\n{}\n", encode(&mixed)?);

    assert_eq!(decode(&encode(&inventory)?)?, inventory);
    println!("✓ Round-trip successful");

    Ok(())
}
