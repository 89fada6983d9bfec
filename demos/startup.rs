use ignition::{InitRegistry, LayeredConfig, Prompt, SharedState, StdTerminal};
use tracing_subscriber::EnvFilter;

fn register_components(registry: &mut InitRegistry) {
    registry.register("server", |state: &SharedState| {
        println!("server starting for {}", state["name"]);
        Ok(None)
    });

    registry
        .initializer("database")
        .before("server")
        .register(|state: &SharedState| {
            let mut next = state.clone();
            next.insert("pool_size".into(), 8.into());
            println!("database pool ready");
            Ok(Some(next))
        });
}

fn main() -> Result<(), ignition::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut config = LayeredConfig::builder()
        .with_app_name("ignition-demo")
        .with_filename("demo.toml")
        .build()?;

    config.run_wizard(
        &[
            Prompt::new("url", "Service URL").with_default("https://example.com"),
            Prompt::new("retries", "Retries").with_validator(|_, value| {
                let text = value.as_str().unwrap_or_default();
                text.parse::<u32>().map(|_| true).map_err(Into::into)
            }),
        ],
        &mut StdTerminal,
    )?;
    let path = config.save()?;
    println!("configuration saved to {}", path.display());

    let mut registry = InitRegistry::new();
    register_components(&mut registry);

    let mut options = SharedState::new();
    options.insert("url".into(), config.get("url")?.to_value());
    registry.run_all("ignition-demo", options)?;

    println!("shared state: {:?}", registry.shared_state());
    Ok(())
}
