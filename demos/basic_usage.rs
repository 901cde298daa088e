//! Basic usage example for keyclaim.
//!
//! Demonstrates:
//! - Claiming a key by constructing an owning handle
//! - Duplicate claims failing while the holder is alive
//! - Key release on drop, making the key reusable
//! - Borrowing handles over caller-owned values
//! - Inline handles with `DEFAULT_TIMEOUT`
//!
//! Run with: `cargo run --example basic_usage`

use keyclaim::{ClaimError, Handle, InlineHandle, Registry, DEFAULT_TIMEOUT};
use std::time::Duration;

#[derive(Debug, Default, PartialEq)]
struct Connection {
    host: String,
    port: u16,
}

fn main() {
    println!("=== keyclaim: Basic Usage ===\n");

    // One registry per (value type, key type) pairing.
    let registry = Registry::<Connection, (String, u16)>::new();
    let key = ("db".to_string(), 1);
    let timeout = Duration::from_millis(100);

    // -------------------------------------------------------------------------
    // 1. Claim a key with an owning handle
    // -------------------------------------------------------------------------
    println!("1. Claiming {:?} with an owning handle...", key);

    let a = Handle::with(&registry, key.clone(), timeout, || Connection {
        host: "localhost".to_string(),
        port: 5432,
    })
    .unwrap();

    println!("   bound: {:?}", *a);

    // -------------------------------------------------------------------------
    // 2. A second claim of the same key fails
    // -------------------------------------------------------------------------
    println!("\n2. Claiming the same key while the holder is alive...");

    match Handle::with_default(&registry, key.clone(), timeout) {
        Ok(_) => println!("   unexpectedly succeeded"),
        Err(ClaimError::DuplicateKey) => println!("   rejected (expected): the key is taken"),
        Err(e) => println!("   failed: {}", e),
    }

    // -------------------------------------------------------------------------
    // 3. Dropping the holder releases the key
    // -------------------------------------------------------------------------
    println!("\n3. Dropping the holder and claiming again...");

    drop(a);
    let b = Handle::with_default(&registry, key.clone(), timeout).unwrap();
    println!("   reclaimed by a fresh handle: {:?}", *b);
    drop(b);

    // -------------------------------------------------------------------------
    // 4. Borrow a caller-owned value instead of allocating
    // -------------------------------------------------------------------------
    println!("\n4. Borrowing a caller-owned connection...");

    let pooled = Connection {
        host: "10.0.0.7".to_string(),
        port: 5432,
    };

    {
        let borrowed = Handle::borrowed(&registry, key.clone(), timeout, &pooled).unwrap();
        println!("   serving from {:?}", *borrowed);
    }

    println!("   handle gone, caller still owns {:?}", pooled);

    // -------------------------------------------------------------------------
    // 5. Inline handle: the value lives directly in the handle
    // -------------------------------------------------------------------------
    println!("\n5. Inline handle claimed with DEFAULT_TIMEOUT...");

    let counters = Registry::<u64, &'static str>::new();
    let mut hits = InlineHandle::<u64, &'static str>::unbound();
    hits.init(&counters, "hits", DEFAULT_TIMEOUT).unwrap();

    *hits += 1;
    *hits += 1;
    println!("   {} = {}", hits.key().unwrap(), *hits);

    // -------------------------------------------------------------------------
    // Summary
    // -------------------------------------------------------------------------
    println!("\n=== Example Complete ===");
    println!("Every claimed key was released when its holder went out of scope.");
}
