use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Top-level profile controlling parsing, catalog matching, and remote sync.
///
/// Every section is optional in the TOML file; missing sections fall back to
/// the built-in defaults, so a bare `guionero import` works with no profile
/// file at all.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Profile {
    #[serde(default)]
    pub parser: ParserConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
}

impl Profile {
    pub fn validate(&self) -> Result<()> {
        for program in &self.catalog.programs {
            if program.key.trim().is_empty() {
                bail!("catalog program key must not be empty");
            }
            if program.name.trim().is_empty() {
                bail!("catalog program name must not be empty (key {})", program.key);
            }
        }

        // Http mode tolerates a missing endpoint here; the CLI can supply it
        // per invocation, and the fetch boundary reports the gap otherwise.
        if self.remote.mode == RemoteMode::File && self.remote.file_path.is_none() {
            bail!("remote.file_path is required for file mode");
        }
        if self.remote.mode == RemoteMode::Inline && self.remote.inline_data.is_none() {
            bail!("remote.inline_data is required for inline mode");
        }

        Ok(())
    }

    /// Loads a profile from a TOML file, or returns defaults when no path is
    /// given. A path that exists but fails to parse is an error; silence here
    /// would hide a typo in a delimiter or stopword list.
    pub fn load_or_default(path: Option<&Path>) -> Result<Profile> {
        let Some(path) = path else {
            return Ok(Profile::default());
        };
        load_profile_file(path)
    }
}

pub fn load_profile_file(path: &Path) -> Result<Profile> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read profile: {}", path.display()))?;
    let profile: Profile = toml::from_str(&text)
        .with_context(|| format!("failed to parse toml in {}", path.display()))?;
    profile
        .validate()
        .with_context(|| format!("invalid profile {}", path.display()))?;
    Ok(profile)
}

/// Delimiter dialect separating entries in an upload.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DelimiterStyle {
    /// Literal `>>>` markers (bulk distribution feeds).
    Arrows,
    /// Runs of 4 or more underscores (per-program uploads).
    Underscores,
    /// Runs of 5 or more hyphens (legacy exports).
    #[default]
    Hyphens,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParserConfig {
    #[serde(default)]
    pub delimiter: DelimiterStyle,
    /// When true, records failing the completeness check are excluded from
    /// parser output. Default is to retain them; display layers filter.
    #[serde(default)]
    pub drop_invalid: bool,
    #[serde(default = "default_stopwords")]
    pub stopwords: Vec<String>,
    /// Misspelled month name -> month number, merged over the canonical
    /// Spanish names. `ANERO = 1` ships by default.
    #[serde(default = "default_month_aliases")]
    pub month_aliases: BTreeMap<String, u32>,
    /// Prefixes stripped from the raw program field before matching.
    #[serde(default = "default_program_prefixes")]
    pub program_prefixes: Vec<String>,
    /// Abbreviation -> full program name, used to infer the program from the
    /// entry header line when the field is missing or unspecified.
    #[serde(default)]
    pub program_abbreviations: BTreeMap<String, String>,
    #[serde(default = "default_program_literal")]
    pub default_program: String,
    #[serde(default = "default_title_literal")]
    pub fallback_title: String,
    #[serde(default = "default_max_tags")]
    pub max_tags: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: DelimiterStyle::default(),
            drop_invalid: false,
            stopwords: default_stopwords(),
            month_aliases: default_month_aliases(),
            program_prefixes: default_program_prefixes(),
            program_abbreviations: BTreeMap::new(),
            default_program: default_program_literal(),
            fallback_title: default_title_literal(),
            max_tags: default_max_tags(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CatalogConfig {
    #[serde(default)]
    pub programs: Vec<ProgramEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProgramEntry {
    pub key: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RemoteMode {
    #[default]
    Http,
    File,
    Inline,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub mode: RemoteMode,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub file_path: Option<PathBuf>,
    #[serde(default)]
    pub inline_data: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u8,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            mode: RemoteMode::Http,
            endpoint: None,
            file_path: None,
            inline_data: None,
            headers: BTreeMap::new(),
            timeout_secs: default_timeout_secs(),
            retry_attempts: default_retry_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            user_agent: None,
        }
    }
}

pub fn sanitize_for_path(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .trim_matches('-')
        .to_string()
}

fn default_stopwords() -> Vec<String> {
    [
        "DE", "LA", "EL", "EN", "Y", "LOS", "LAS", "DEL", "UN", "UNA", "PARA", "POR", "CON",
        "SOBRE", "ESTA", "ESTE", "COMO", "QUE", "MAS", "SUS",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

fn default_month_aliases() -> BTreeMap<String, u32> {
    BTreeMap::from([("ANERO".to_string(), 1)])
}

fn default_program_prefixes() -> Vec<String> {
    vec!["PROG.".to_string()]
}

fn default_program_literal() -> String {
    "Desconocido".to_string()
}

fn default_title_literal() -> String {
    "Sin Tema".to_string()
}

fn default_max_tags() -> usize {
    5
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_retry_attempts() -> u8 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    500
}
