//! Kernel listing and control details.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use clap::Args;
use synthi_registry::{KernelDescriptor, KernelRegistry};

#[derive(Args)]
pub struct KernelsArgs {
    /// Show controls for one kernel (oscillator, noise, output, scope)
    #[arg(value_name = "KERNEL")]
    kernel: Option<String>,
}

fn print_details(d: &KernelDescriptor) {
    println!("{} ({})", d.name, d.id);
    println!("{}", "=".repeat(d.name.len() + d.id.len() + 3));
    println!();
    println!("{}", d.description);
    println!();
    println!("Role:    {}", d.role.name());
    println!("Inputs:  {}", list_or_none(d.inputs));
    println!("Outputs: {}", list_or_none(d.outputs));
    println!();

    if d.params.is_empty() {
        println!("No positional controls; configure through commands.");
        return;
    }

    println!("Controls:");
    println!();
    println!("  {:>2}  {:16}  {:16}  {:>12}  {}", "#", "Id", "Name", "Default", "Range");
    println!("  {:>2}  {:16}  {:16}  {:>12}  {}", "-", "--", "----", "-------", "-----");
    for (i, p) in d.params.iter().enumerate() {
        println!(
            "  {:>2}  {:16}  {:16}  {:>12}  {} .. {}{}",
            i,
            p.id,
            p.name,
            format!("{}{}", p.default, p.unit.suffix()),
            p.min,
            p.max,
            p.unit.suffix()
        );
    }
}

fn list_or_none(items: &[&str]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

pub fn run(args: KernelsArgs) -> anyhow::Result<()> {
    let registry = KernelRegistry::new();

    if let Some(id) = &args.kernel {
        let descriptor = registry
            .get_by_id(&id.to_ascii_lowercase())
            .ok_or_else(|| anyhow::anyhow!("Unknown kernel: {id}"))?;
        print_details(descriptor);
        return Ok(());
    }

    println!("Available Kernels");
    println!("=================");
    println!();
    println!("  {:12}  {:10}  {:>6}  {}", "Id", "Role", "Params", "Description");
    println!("  {:12}  {:10}  {:>6}  {}", "--", "----", "------", "-----------");
    for d in registry.all_kernels() {
        println!(
            "  {:12}  {:10}  {:>6}  {}",
            d.id,
            d.role.name(),
            d.params.len(),
            d.description
        );
    }
    println!();
    println!("Use 'synthi kernels <KERNEL>' for control details.");
    Ok(())
}
