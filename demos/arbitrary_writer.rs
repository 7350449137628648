//! Example demonstrating arbitrary writer usage
//!
//! This shows how to write ZIP files to any writer (not just files),
//! such as in-memory buffers, network streams, etc.
//!
//! The `.close()` method returns the writer, allowing you to:
//! - Take the Vec<u8> holding the ZIP bytes
//! - Continue using the writer for other purposes
//! - Save in-memory ZIPs to disk or send over network
//!
//! Every open entry is buffered in memory until it is finished, so the
//! largest entries in flight bound memory use.

use zipout::{EntryOptions, Result, ZipOutput};

fn main() -> Result<()> {
    // Example 1: Write ZIP to in-memory buffer (Vec<u8>)
    println!("Example 1: Writing ZIP to in-memory buffer...");
    let mut zip = ZipOutput::from_writer(Vec::new())?;

    zip.write_entry("hello.txt", EntryOptions::deflated(), b"Hello from in-memory ZIP!")?;
    zip.write_entry("data.txt", EntryOptions::stored(), b"Some data in the second file.")?;

    let zip_bytes = zip.close()?;
    println!(
        "✓ Successfully created in-memory ZIP ({} bytes)",
        zip_bytes.len()
    );

    // Example 2: Prefix the archive with a launcher stub
    println!("\nExample 2: Writing a self-executing archive...");
    let stub = b"#!/bin/sh\nexec java -jar \"$0\" \"$@\"\n";
    let mut zip = ZipOutput::from_writer_with_header(Vec::new(), stub, 4)?;

    let large_data = "Hello World! ".repeat(1000);
    zip.write_entry("compressed.txt", EntryOptions::deflated(), large_data.as_bytes())?;
    zip.write_entry("aligned.bin", EntryOptions::stored(), &[0u8; 64])?;

    let zip_bytes = zip.close()?;
    println!(
        "✓ Archive with {} byte stub ({} bytes total)",
        stub.len(),
        zip_bytes.len()
    );

    Ok(())
}
