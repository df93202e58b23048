use interoptopus::util::NamespaceMappings;
use interoptopus::{Error, Interop};

#[test]
#[cfg_attr(miri, ignore)]
fn bindings_csharp() -> Result<(), Error> {
    use interoptopus_backend_csharp::{Config, Generator};

    std::fs::create_dir_all("bindings/csharp").expect("Failed to create bindings directory");

    Generator::new(
        Config {
            class: "QuestCameraBridgeInterop".to_string(),
            dll_name: "quest_camera_bridge".to_string(),
            namespace_mappings: NamespaceMappings::new("Meta.QuestCamera"),
            ..Config::default()
        },
        quest_camera_bridge::build_binding_inventory(),
    )
    .write_file("bindings/csharp/QuestCameraBridgeInterop.cs")?;

    Ok(())
}
