//! Language configuration for harness generation and dispatch

use std::collections::HashMap;
use std::sync::OnceLock;

use anyhow::Context;
use serde::Deserialize;

/// Source dialect a harness is generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    C,
    Cpp,
    Java,
    Python,
}

/// Configuration for a supported programming language
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageConfig {
    /// Dialect used by the harness generator
    pub language: Language,
    /// Default backend language id
    pub language_id: u32,
}

/// Raw TOML configuration for a language
#[derive(Debug, Deserialize)]
struct RawLanguageConfig {
    dialect: Language,
    language_id: u32,
    #[serde(default)]
    aliases: Vec<String>,
}

/// Global language configurations
static LANGUAGES: OnceLock<HashMap<String, LanguageConfig>> = OnceLock::new();

/// Initialize language configurations from the embedded TOML file
pub fn init_languages() -> anyhow::Result<()> {
    let content = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/files/languages.toml"));
    let languages = parse_languages(content)?;

    LANGUAGES
        .set(languages)
        .map_err(|_| anyhow::anyhow!("Languages already initialized"))?;

    Ok(())
}

/// Parse a language table, expanding aliases into their own entries
fn parse_languages(content: &str) -> anyhow::Result<HashMap<String, LanguageConfig>> {
    let raw_configs: HashMap<String, RawLanguageConfig> =
        toml::from_str(content).context("Invalid language configuration")?;

    let mut languages = HashMap::new();
    let mut aliases = Vec::new();

    // Names first, so an alias can never shadow a language declared later
    for (name, raw) in raw_configs {
        let config = LanguageConfig {
            language: raw.dialect,
            language_id: raw.language_id,
        };

        if languages.insert(name.to_lowercase(), config.clone()).is_some() {
            anyhow::bail!("Duplicate language name: {}", name);
        }
        aliases.extend(raw.aliases.into_iter().map(|alias| (alias, config.clone())));
    }

    for (alias, config) in aliases {
        if languages.contains_key(&alias.to_lowercase()) {
            anyhow::bail!("Duplicate language alias: {}", alias);
        }
        languages.insert(alias.to_lowercase(), config);
    }

    Ok(languages)
}

/// Get language configuration by language name or alias
pub fn get_language_config(language: &str) -> Option<LanguageConfig> {
    LANGUAGES.get()?.get(&language.trim().to_lowercase()).cloned()
}

/// Get all supported language names
pub fn get_supported_languages() -> Vec<String> {
    let mut names: Vec<String> = LANGUAGES
        .get()
        .map(|langs| langs.keys().cloned().collect())
        .unwrap_or_default();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_config() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[cpp]
dialect = "cpp"
language_id = 54
aliases = ["C++"]

[python]
dialect = "python"
language_id = 71
aliases = ["py", "python3"]
"#
        )
        .unwrap();
        file
    }

    #[test]
    fn test_load_languages() {
        let config_file = create_test_config();
        let content = fs::read_to_string(config_file.path()).unwrap();
        let languages = parse_languages(&content).unwrap();

        assert_eq!(languages["c++"].language, Language::Cpp);
        assert_eq!(languages["py"].language_id, 71);
        assert_eq!(languages["python3"], languages["python"]);
    }

    #[test]
    fn test_duplicate_alias_rejected() {
        let content = r#"
[c]
dialect = "c"
language_id = 50
aliases = ["cc"]

[cpp]
dialect = "cpp"
language_id = 54
aliases = ["cc"]
"#;
        assert!(parse_languages(content).is_err());
    }

    #[test]
    fn test_alias_matching_a_language_name_rejected() {
        // Rejected whichever table is visited first
        let content = r#"
[c]
dialect = "c"
language_id = 50
aliases = ["cpp"]

[cpp]
dialect = "cpp"
language_id = 54
"#;
        let err = parse_languages(content).unwrap_err();
        assert!(err.to_string().contains("Duplicate language alias: cpp"));
    }

    #[test]
    fn test_names_differing_in_case_rejected() {
        let content = r#"
[java]
dialect = "java"
language_id = 62

[Java]
dialect = "java"
language_id = 91
"#;
        assert!(parse_languages(content).is_err());
    }

    #[test]
    fn test_embedded_languages() {
        let _ = init_languages();

        let java = get_language_config("Java").unwrap();
        assert_eq!(java.language, Language::Java);
        assert_eq!(java.language_id, 62);
        assert_eq!(get_language_config("c++").unwrap().language, Language::Cpp);
        assert!(get_language_config("brainfuck").is_none());
        assert!(get_supported_languages().contains(&"python3".to_string()));
    }
}
