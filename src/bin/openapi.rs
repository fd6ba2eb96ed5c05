use anyhow::Result;

// Print the OpenAPI document for the relay routes
fn main() -> Result<()> {
    let spec = reset_relay::relay::openapi();
    println!("{}", spec.to_pretty_json()?);

    Ok(())
}
