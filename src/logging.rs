/// Routes `tracing` events to the browser console.
#[cfg(target_arch = "wasm32")]
pub fn init() {
    use tracing::subscriber::set_global_default;
    use tracing::Level;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::Registry;

    let console_level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let wasm_layer = tracing_wasm::WASMLayer::new(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(console_level)
            .build(),
    );

    let _ = set_global_default(Registry::default().with(wasm_layer));
}

/// No-op off the browser; host tests run without a subscriber.
#[cfg(not(target_arch = "wasm32"))]
pub fn init() {}
