use coop_terms_core::PolicyConfig;

use super::file;

/// Load the policy tables: the reference defaults, or a YAML/JSON override.
pub fn load_policy(path: Option<&str>) -> Result<PolicyConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(PolicyConfig::default());
    };

    let (canonical, contents) = file::read_text(path)?;
    let is_json = canonical
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let policy: PolicyConfig = if is_json {
        serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse policy '{}': {}", canonical.display(), e))?
    } else {
        serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse policy '{}': {}", canonical.display(), e))?
    };
    policy.validate()?;

    tracing::info!(path = %canonical.display(), "loaded policy override");
    Ok(policy)
}
