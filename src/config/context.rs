use super::error::{ConfigError, ConfigResult};
use super::{ConfigStore, Context};

fn validate_name(name: &str) -> ConfigResult<()> {
    if name.trim().is_empty() {
        return Err(ConfigError::EmptyContextName);
    }
    Ok(())
}

/// Parses an hourly price. An omitted price is zero.
pub fn parse_price(price: Option<&str>) -> ConfigResult<f64> {
    let Some(raw) = price else {
        return Ok(0.0);
    };

    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(ConfigError::InvalidPrice(raw.to_string())),
    }
}

/// Creates or overwrites the context called `name`.
pub fn set(
    store: &ConfigStore,
    name: &str,
    client_id: &str,
    project_id: &str,
    price: Option<&str>,
) -> ConfigResult<Context> {
    validate_name(name)?;
    let price = parse_price(price)?;

    let mut config = store.load()?;
    let mut contexts = config.contexts()?;

    let ctx = Context {
        project_id: project_id.to_string(),
        client_id: client_id.to_string(),
        price,
    };
    if contexts.insert(name.to_string(), ctx.clone()).is_some() {
        log::info!("Overwriting existing context '{name}'");
    }

    config.set_contexts(&contexts)?;
    store.save(&config)?;
    Ok(ctx)
}

pub fn get(store: &ConfigStore, name: &str) -> ConfigResult<Context> {
    store
        .load()?
        .contexts()?
        .remove(name)
        .ok_or_else(|| ConfigError::UnknownContext(name.to_string()))
}

/// All contexts sorted by name, paired with whether they are selected.
pub fn list(store: &ConfigStore) -> ConfigResult<Vec<(String, Context, bool)>> {
    let config = store.load()?;
    let current = config.current_context();

    Ok(config
        .contexts()?
        .into_iter()
        .map(|(name, ctx)| {
            let is_current = current.as_deref() == Some(name.as_str());
            (name, ctx, is_current)
        })
        .collect())
}

pub fn select(store: &ConfigStore, name: &str) -> ConfigResult<()> {
    let mut config = store.load()?;

    if !config.contexts()?.contains_key(name) {
        return Err(ConfigError::UnknownContext(name.to_string()));
    }

    config.set("current_context", name);
    store.save(&config)
}

/// Removes `name`. A `current_context` pointing at it is cleared as well.
pub fn remove(store: &ConfigStore, name: &str) -> ConfigResult<bool> {
    let mut config = store.load()?;
    let mut contexts = config.contexts()?;
    let removed = contexts.remove(name).is_some();

    config.set_contexts(&contexts)?;
    if config.current_context().as_deref() == Some(name) {
        config.set("current_context", serde_json::Value::Null);
    }

    store.save(&config)?;
    Ok(removed)
}

/// The selected context, if any. A dangling selection reads as an error.
pub fn current(store: &ConfigStore) -> ConfigResult<Option<(String, Context)>> {
    let config = store.load()?;

    let Some(name) = config.current_context() else {
        return Ok(None);
    };

    let ctx = config
        .contexts()?
        .remove(&name)
        .ok_or_else(|| ConfigError::UnknownContext(name.clone()))?;

    Ok(Some((name, ctx)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tempfile::TempDir;

    fn store() -> (TempDir, ConfigStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::at(dir.path().join("config.json"));
        (dir, store)
    }

    #[test]
    fn omitted_price_is_zero() {
        let (_dir, store) = store();
        set(&store, "acme", "C-1", "P-1", None).unwrap();
        assert_eq!(get(&store, "acme").unwrap().price, 0.0);

        let raw: Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["contexts"]["acme"]["Price"], serde_json::json!(0.0));
    }

    #[test]
    fn explicit_price_is_stored_as_a_number() {
        let (_dir, store) = store();
        set(&store, "acme", "C-1", "P-1", Some("12.50")).unwrap();

        let raw: Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["contexts"]["acme"]["Price"].as_f64(), Some(12.5));
    }

    #[test]
    fn negative_or_garbage_prices_are_rejected() {
        assert!(matches!(
            parse_price(Some("-1")),
            Err(ConfigError::InvalidPrice(_))
        ));
        assert!(matches!(
            parse_price(Some("cheap")),
            Err(ConfigError::InvalidPrice(_))
        ));
    }

    #[test]
    fn set_overwrites_an_existing_name() {
        let (_dir, store) = store();
        set(&store, "acme", "C-1", "P-1", None).unwrap();
        set(&store, "acme", "C-2", "P-2", Some("3")).unwrap();

        let ctx = get(&store, "acme").unwrap();
        assert_eq!(ctx.client_id, "C-2");
        assert_eq!(list(&store).unwrap().len(), 1);
    }

    #[test]
    fn empty_name_is_rejected() {
        let (_dir, store) = store();
        assert!(matches!(
            set(&store, "  ", "C", "P", None),
            Err(ConfigError::EmptyContextName)
        ));
    }

    #[test]
    fn select_requires_an_existing_context() {
        let (_dir, store) = store();
        assert!(matches!(
            select(&store, "ghost"),
            Err(ConfigError::UnknownContext(_))
        ));

        set(&store, "acme", "C", "P", None).unwrap();
        select(&store, "acme").unwrap();
        let (name, _) = current(&store).unwrap().unwrap();
        assert_eq!(name, "acme");
    }

    #[test]
    fn removing_the_current_context_clears_the_selection() {
        let (_dir, store) = store();
        set(&store, "acme", "C", "P", None).unwrap();
        select(&store, "acme").unwrap();

        assert!(remove(&store, "acme").unwrap());
        assert_eq!(store.load().unwrap().current_context(), None);
        assert!(current(&store).unwrap().is_none());
    }

    #[test]
    fn removing_another_context_keeps_the_selection() {
        let (_dir, store) = store();
        set(&store, "acme", "C", "P", None).unwrap();
        set(&store, "globex", "C2", "P2", None).unwrap();
        select(&store, "acme").unwrap();

        remove(&store, "globex").unwrap();
        assert_eq!(
            store.load().unwrap().current_context().as_deref(),
            Some("acme")
        );
    }

    #[test]
    fn list_flags_the_current_context_in_name_order() {
        let (_dir, store) = store();
        set(&store, "zeta", "C", "P", None).unwrap();
        set(&store, "alpha", "C", "P", None).unwrap();
        select(&store, "zeta").unwrap();

        let entries = list(&store).unwrap();
        let names: Vec<_> = entries.iter().map(|(n, _, c)| (n.as_str(), *c)).collect();
        assert_eq!(names, vec![("alpha", false), ("zeta", true)]);
    }
}
