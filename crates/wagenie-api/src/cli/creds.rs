//! `wagenie creds` -- inspect or reset the persisted credential record.
//!
//! The blob itself is session key material and is never printed, only its
//! presence.

use console::style;

use wagenie_core::credstore::CredentialStore;

use crate::state::AppState;

pub async fn show_creds(state: &AppState, json: bool) -> anyhow::Result<()> {
    let creds = state.store.load().await?;
    let has_blob = !creds.blob.is_null();

    if json {
        let out = serde_json::json!({
            "path": state.store.path(),
            "registered": creds.registered,
            "has_blob": has_blob,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let mark = if creds.registered {
        style("registered").green().to_string()
    } else {
        style("not registered").yellow().to_string()
    };
    println!("  {} ({})", mark, state.store.path().display());
    if !has_blob {
        println!("  no session material stored; the next run will pair");
    }
    Ok(())
}

pub async fn reset_creds(state: &AppState, json: bool) -> anyhow::Result<()> {
    state.store.reset().await?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "reset": true, "path": state.store.path() })
        );
    } else {
        println!(
            "  {} credentials removed; the next run will pair again",
            style("ok").green()
        );
    }
    Ok(())
}
