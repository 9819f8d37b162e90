use comfy_table::{Cell, Table};

use crate::error::{Result, YieldGapError};
use crate::fmt::percent;
use crate::settings::{load_settings, parse_rate, save_settings, settings_path};

pub fn show() -> Result<()> {
    let settings = load_settings();
    let mut table = Table::new();
    table.set_header(vec!["Setting", "Value"]);
    table.add_row(vec![
        Cell::new("fallback_rate"),
        Cell::new(format!("{} ({})", settings.fallback_rate, percent(settings.fallback_rate))),
    ]);
    table.add_row(vec![Cell::new("profile_base_url"), Cell::new(&settings.profile_base_url)]);
    table.add_row(vec![Cell::new("treasury_url"), Cell::new(&settings.treasury_url)]);
    table.add_row(vec![Cell::new("user_agent"), Cell::new(&settings.user_agent)]);
    table.add_row(vec![Cell::new("timeout_secs"), Cell::new(settings.timeout_secs)]);
    println!("Settings ({})\n{table}", settings_path().display());
    Ok(())
}

pub fn set(
    fallback_rate: Option<&str>,
    user_agent: Option<&str>,
    timeout_secs: Option<u64>,
) -> Result<()> {
    if fallback_rate.is_none() && user_agent.is_none() && timeout_secs.is_none() {
        return Err(YieldGapError::Settings("nothing to set".to_string()));
    }
    let mut settings = load_settings();
    if let Some(raw) = fallback_rate {
        settings.fallback_rate = parse_rate(raw)?;
    }
    if let Some(ua) = user_agent {
        settings.user_agent = ua.to_string();
    }
    if let Some(secs) = timeout_secs {
        if secs == 0 {
            return Err(YieldGapError::Settings("timeout must be at least 1 second".to_string()));
        }
        settings.timeout_secs = secs;
    }
    save_settings(&settings)?;
    println!("Saved {}", settings_path().display());
    Ok(())
}
