//! Customizing TOON output with EncodeOptions.
//!
//! Run with: cargo run --example custom_options

use std::error::Error;
use toon_codec::{
    decode_with_options, encode_with_options, toon, DecodeOptions, Delimiter, EncodeOptions,
    KeyFolding, PathExpansion,
};

fn main() -> Result<(), Box<dyn Error>> {
    let config = toon!({
        "server": {
            "http": {
                "port": 8080
            }
        },
        "rows": [
            {"id": 1, "label": "alpha"},
            {"id": 2, "label": "beta"}
        ]
    });

    // Default format (comma delimiter)
    println!("Default (comma):");
    println!("{}\n", toon_codec::encode(&config)?);

    // Pipe delimiter, recorded in the array brackets
    println!("Pipe delimiter:");
    let pipe = EncodeOptions::new().with_delimiter(Delimiter::Pipe);
    println!("{}\n", encode_with_options(&config, &pipe)?);

    // Key folding collapses single-key chains into dotted keys
    println!("Key folding:");
    let folding = EncodeOptions::new().with_key_folding(KeyFolding::Safe);
    let folded = encode_with_options(&config, &folding)?;
    println!("{}\n", folded);

    // ...and path expansion undoes it on decode
    let expand = DecodeOptions::new().with_expand_paths(PathExpansion::Safe);
    assert_eq!(decode_with_options(&folded, &expand)?, config);
    println!("✓ Folded output expands back to the original");

    // Sorted keys for deterministic output across runs
    println!("\nSorted keys:");
    let sorted = EncodeOptions::new().with_sort_keys(true);
    println!("{}", encode_with_options(&config, &sorted)?);

    Ok(())
}
