//! File Status Example
//!
//! Prints the runtime identity and the native status of each path given on
//! the command line.
//!
//! Run with: cargo run --example `file_status` -- /etc/hosts /tmp

use statprobe::FileProbe;

fn main() -> Result<(), statprobe::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("╔════════════════════════════════════════════════════════════╗");
    println!("║       STATPROBE - Native File Status Demo                  ║");
    println!("╚════════════════════════════════════════════════════════════╝");
    println!();

    let probe = match FileProbe::new() {
        Ok(probe) => probe,
        Err(e) if e.is_platform_unsupported() => {
            println!("❌ {e}");
            println!("   Requires: Linux or macOS on x86-64 or ARM64");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let layout = probe.layout();
    println!("✓ Runtime: {}", probe.identity());
    println!("  Layout: {} ({} bytes)", layout.name, layout.size);
    println!();

    let paths: Vec<String> = std::env::args().skip(1).collect();
    let paths = if paths.is_empty() { vec![".".to_string()] } else { paths };

    for path in &paths {
        match probe.stat(path) {
            Ok(status) => {
                println!("{path}:");
                println!("  Type:        {}", status.file_type());
                println!("  Permissions: {}", status.permissions());
                println!("  Size:        {} bytes", status.size);
                println!("  Inode:       {} on device {:#x}", status.ino, status.dev);
                println!("  Links:       {}", status.nlink);
                println!("  Owner:       uid {} gid {}", status.uid, status.gid);
                println!("  Blocks:      {} x 512 (block size {})", status.blocks, status.blksize);
                println!(
                    "  Modified:    {}.{:09}",
                    status.mtime.seconds, status.mtime.nanoseconds
                );
            }
            Err(e) => println!("{path}: ❌ {e}"),
        }
        println!();
    }

    Ok(())
}
