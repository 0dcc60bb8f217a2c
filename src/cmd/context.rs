use super::{AppError, AppResult, ContextCommand, ContextFormat};
use crate::config::{ConfigStore, Context, context};
use crate::output;
use crate::prompt;
use owo_colors::OwoColorize;
use std::collections::BTreeMap;

pub fn handle(store: &ConfigStore, action: ContextCommand) -> AppResult<()> {
    match action {
        ContextCommand::List { output } => list(store, output),
        ContextCommand::Show { name } => show(store, name),
        ContextCommand::Set {
            name,
            client_id,
            project_id,
            price,
        } => {
            context::set(store, &name, &client_id, &project_id, price.as_deref())?;
            println!("{}", format!("Saved context '{name}'.").green());
            Ok(())
        }
        ContextCommand::Select { name } => select(store, name),
        ContextCommand::Remove { name } => {
            if context::remove(store, &name)? {
                println!("{}", format!("Removed context '{name}'.").green());
            } else {
                log::warn!("There is no context named '{name}'");
            }
            Ok(())
        }
        ContextCommand::Current => {
            match context::current(store)? {
                Some((name, _)) => println!("current_context: {name}"),
                None => println!("current_context: none"),
            }
            Ok(())
        }
    }
}

fn list(store: &ConfigStore, format: ContextFormat) -> AppResult<()> {
    let entries = context::list(store)?;
    if entries.is_empty() {
        return Err(AppError::Sorry("there are no contexts created".into()));
    }

    match format {
        ContextFormat::Table => {
            let rows = entries
                .into_iter()
                .map(|(name, ctx, is_current)| {
                    vec![
                        if is_current { "*".into() } else { String::new() },
                        name,
                        ctx.project_id,
                        ctx.client_id,
                        ctx.price.to_string(),
                    ]
                })
                .collect();
            output::print_table(&["", "Context", "Project", "Client", "Price"], rows);
        }
        ContextFormat::Json => output::print_json(&by_name(entries))?,
        ContextFormat::Yaml => output::print_yaml(&by_name(entries))?,
    }
    Ok(())
}

fn by_name(entries: Vec<(String, Context, bool)>) -> BTreeMap<String, Context> {
    entries
        .into_iter()
        .map(|(name, ctx, _)| (name, ctx))
        .collect()
}

fn show(store: &ConfigStore, name: Option<String>) -> AppResult<()> {
    let (name, ctx) = match name {
        Some(name) => {
            let ctx = context::get(store, &name)?;
            (name, ctx)
        }
        None => context::current(store)?
            .ok_or_else(|| AppError::Sorry("there are no contexts selected".into()))?,
    };

    println!("{name}: {}", serde_json::to_string(&ctx)?);
    Ok(())
}

fn select(store: &ConfigStore, name: Option<String>) -> AppResult<()> {
    let name = match name {
        Some(name) => name,
        None => {
            let names = context::list(store)?
                .into_iter()
                .map(|(name, _, _)| name)
                .collect::<Vec<_>>();
            if names.is_empty() {
                return Err(AppError::Sorry("there are no contexts created".into()));
            }
            match prompt::pick("Context", names)? {
                Some(name) => name,
                None => return Ok(()),
            }
        }
    };

    context::select(store, &name)?;
    println!("{}", format!("Selected context '{name}'.").green());
    Ok(())
}
