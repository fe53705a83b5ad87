use shared::PageConfig;

const EMBEDDED_CONFIG: &str = include_str!("../gsea.toml");

/// Page configuration baked into the bundle. A broken file is reported on the
/// console and replaced by defaults so the page still comes up.
pub fn load_page_config() -> PageConfig {
    let (config, error) = PageConfig::from_toml_or_default(EMBEDDED_CONFIG);
    if let Some(error) = error {
        zoon::println!("Invalid gsea.toml, using defaults: {}", error);
    }
    config
}
