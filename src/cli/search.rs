use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::models::Ein;
use crate::settings::load_settings;
use crate::sources::ProPublicaClient;

pub async fn run(query: &str, limit: usize) -> Result<()> {
    let client = ProPublicaClient::new(&load_settings())?;
    let hits = client.search(query).await?;

    if hits.is_empty() {
        println!("No organizations found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["EIN", "Name", "City", "State"]);
    for hit in hits.iter().take(limit) {
        let ein = Ein::parse(&hit.ein)
            .map(|e| e.to_string())
            .unwrap_or_else(|_| hit.ein.clone());
        table.add_row(vec![
            Cell::new(ein),
            Cell::new(&hit.name),
            Cell::new(hit.city.as_deref().unwrap_or_default()),
            Cell::new(hit.state.as_deref().unwrap_or_default()),
        ]);
    }
    println!("Organizations\n{table}");
    if hits.len() > limit {
        println!("{} more not shown; use --limit to see them.", hits.len() - limit);
    }
    Ok(())
}
