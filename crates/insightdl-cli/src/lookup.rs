//! `lookup`: resolve a company or taxonomy name to ids.

use clap::{ArgGroup, Args};
use insightdl_api::{InsightClient, MatchSet, NamedId};

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("kind").required(true).args(["company", "taxonomy"])))]
pub(crate) struct LookupArgs {
    /// Name to search for
    #[arg(long)]
    pub name: String,
    /// Search companies
    #[arg(long)]
    pub company: bool,
    /// Search the organisation's taxonomies
    #[arg(long)]
    pub taxonomy: bool,
}

/// # Errors
///
/// Returns an error if the lookup request fails.
pub(crate) async fn run_lookup(client: &InsightClient, args: &LookupArgs) -> anyhow::Result<()> {
    let matches = if args.company {
        client.search_companies(&args.name).await?
    } else {
        client.search_taxonomy(&args.name).await?
    };
    print!("{}", render_matches(&matches));
    Ok(())
}

fn render_matches(matches: &MatchSet) -> String {
    let mut out = format!("Exact matches: {}\n", matches.best.len());
    out.push_str(&render_table(&matches.best));
    out.push('\n');
    out.push_str(&format!("Total matches: {}\n", matches.all.len()));
    out.push_str(&render_table(&matches.all));
    out
}

fn render_table(rows: &[NamedId]) -> String {
    let mut out = format!("{:<14} {:<70}\n", "ID", "NAME");
    for row in rows {
        out.push_str(&format!("{:<14} {:<70}\n", row.id, row.name));
    }
    out
}
