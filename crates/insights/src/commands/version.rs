pub fn run() -> anyhow::Result<()> {
    println!("insights {}", env!("CARGO_PKG_VERSION"));
    println!("Observation reports and monthly learning analytics");
    Ok(())
}
