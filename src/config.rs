use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditorConfig {
    pub catalog: CatalogConfig,
    pub resolver: ResolverSettings,
    pub form: FormSettings,
}

/// Where the property catalogs come from. Any path left unset falls back to
/// the built-in seed catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub general_path: Option<PathBuf>,
    pub drbd_path: Option<PathBuf>,
    pub constants_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverSettings {
    /// Ranges spanning more than this render as integer inputs instead of sliders.
    pub slider_max_spread: i64,
    /// Lower bound used when a range definition has no `min`.
    pub range_default_min: i64,
    /// Upper bound used when a range definition has no `max`.
    pub range_default_max: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSettings {
    pub required_message: String,
    pub default_invalid_message: String,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            slider_max_spread: 10000,
            range_default_min: 0,
            range_default_max: 10000,
        }
    }
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            required_message: "This field is required".to_string(),
            default_invalid_message: "Invalid value".to_string(),
        }
    }
}

impl EditorConfig {
    /// Load configuration from defaults, an optional `prop-editor` file and
    /// `PROPEDIT_*` environment variables, in increasing precedence.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        config = config.add_source(config::Config::try_from(&EditorConfig::default())?);

        config = config.add_source(config::File::with_name("prop-editor").required(false));

        // Nested keys use a double underscore, e.g. PROPEDIT_RESOLVER__SLIDER_MAX_SPREAD
        config = config.add_source(
            config::Environment::with_prefix("PROPEDIT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = config.build()?;
        let editor_config: EditorConfig = config.try_deserialize()?;

        Ok(editor_config)
    }
}
