use crate::collector::CollectorRegistry;
use crate::config::Config;

/// Print each backend family, its probe locations, and whether any of them
/// exist on this machine.
pub fn list_sources(config: &Config) {
    let registry = CollectorRegistry::from_config(config);

    println!("{:<10} {:<9} DESCRIPTION", "SOURCE", "PRESENT");
    for collector in registry.collectors() {
        let present = collector.probe_roots().iter().any(|p| p.exists());
        println!(
            "{:<10} {:<9} {}",
            collector.name(),
            present,
            collector.description()
        );
        for root in collector.probe_roots() {
            println!("{:<10}   {}", "", root.display());
        }
    }
}
