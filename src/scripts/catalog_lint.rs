use linstor_prop_editor::config::EditorConfig;
use linstor_prop_editor::logic::{CatalogLinter, SchemaResolver};
use linstor_prop_editor::model::PropertyMap;
use linstor_prop_editor::seed::load_catalog;

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let config = EditorConfig::load()?;
    let (catalog, constants) = load_catalog(&config.catalog)?;

    let resolver = SchemaResolver::with_settings(&catalog, &constants, config.resolver.clone());
    for object_type in catalog.object_types() {
        let fields = resolver.resolve(object_type, &PropertyMap::new());
        println!("{:<24} {:>4} field(s)", object_type, fields.len());
    }

    let issues = CatalogLinter::lint(&catalog, &constants);
    if issues.is_empty() {
        println!("Catalog is clean");
        return Ok(());
    }

    for issue in &issues {
        println!(
            "[{}] {} {:?}: {}",
            issue.scope, issue.property, issue.issue_type, issue.message
        );
    }
    anyhow::bail!("{} catalog issue(s) found", issues.len())
}
