//! Basic usage example for zipout

use std::io::Write;
use zipout::{EntryOptions, ZipOutput};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== zipout Basic Example ===\n");

    println!("Creating test.zip...");
    let mut zip = ZipOutput::from_writer_with_alignment(std::fs::File::create("test.zip")?, 4)?;

    // Entries can be open at the same time
    let mut first = zip.create_entry("file1.txt", EntryOptions::stored().comment("Comment"))?;
    let mut second = zip.create_entry("file2.txt", EntryOptions::deflated())?;

    writeln!(first, "This is file 1.")?;
    writeln!(second, "This is file 2.")?;
    writeln!(first, "Hello, world!")?;
    writeln!(second, "Hello, world!")?;

    // The central directory keeps creation order: file1.txt, file2.txt
    second.finish(&mut zip)?;
    first.finish(&mut zip)?;

    zip.write_entry(
        "file3.txt",
        EntryOptions::stored().extra_field(vec![0x34, 0x12, 4, 0, b'H', b'e', b'l', b'l']),
        b"This is file 3.\nHello, world!\n",
    )?;

    zip.set_comment("Main file comment");
    zip.close()?;
    println!("✓ Created test.zip");

    Ok(())
}
