use interoptopus::util::NamespaceMappings;
use interoptopus::Interop;
use interoptopus_backend_csharp::{Config, Generator};
use quest_camera_bridge::args::parse_args;
use quest_camera_bridge::build_binding_inventory;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, Layer};

fn main() {
    let args = parse_args();

    // Build the FmtSubscriber layer
    let fmt_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_filter(args.log_level.level_filter());

    let subscriber = tracing_subscriber::registry().with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set global default subscriber");

    info!("{:?}", args);

    let generator = Generator::new(
        Config {
            class: args.class.clone(),
            dll_name: args.dll_name.clone(),
            namespace_mappings: NamespaceMappings::new(&args.namespace),
            ..Config::default()
        },
        build_binding_inventory(),
    );

    if let Some(parent) = std::path::Path::new(&args.output).parent() {
        if let Err(err) = std::fs::create_dir_all(parent) {
            error!("Failed to create {}: {}", parent.display(), err);
            std::process::exit(1);
        }
    }

    match generator.write_file(&args.output) {
        Ok(()) => info!("Wrote C# bindings to {}", args.output),
        Err(err) => {
            error!("Failed to write C# bindings: {}", err);
            std::process::exit(1);
        }
    }
}
