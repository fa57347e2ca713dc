// Lineup lab entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to stderr; the report goes to stdout)
// 2. Load config
// 3. Load the projection dataset
// 4. Open the SQLite store
// 5. Build the engine (restores selected team, migrates scenarios,
//    loads the team's autosave)
// 6. Print a read-only roster report and exit

use lineup_lab::app::LineupApp;
use lineup_lab::config;
use lineup_lab::finder;
use lineup_lab::format::{format_delta, format_rate};
use lineup_lab::lineup::{delta, LineupSummary, LineupVariant};
use lineup_lab::player;
use lineup_lab::store::SqliteStore;

use anyhow::Context;
use tracing::info;

fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("Lineup lab starting up");

    // 2. Load config
    let config = config::load_or_default().context("failed to load configuration")?;

    // 3. Load the projection dataset
    let players = player::load_players(&config.data.players_path)
        .with_context(|| format!("failed to load {}", config.data.players_path.display()))?;
    info!("Loaded {} players", players.len());

    // 4. Open the SQLite store
    let store =
        SqliteStore::open(&config.store.db_path).context("failed to open the lineup store")?;
    info!("Store opened at {}", config.store.db_path);

    // 5. Build the engine
    let league = config.league.averages;
    let app = LineupApp::new(config, players, store).context("failed to build the engine")?;

    // 6. Report
    println!("Team: {}", app.selected_team());
    for variant in [LineupVariant::VsRhp, LineupVariant::VsLhp] {
        println!("\nLineup {}:", variant.label());
        let roster = app.roster().variant(variant);
        for slot in &roster.lineup_slots {
            let name = roster
                .player_at(slot.order)
                .map_or("-", |p| p.name.as_str());
            println!("  {}. {:<3} {}", slot.order, slot.position, name);
        }

        let summary = app.lineup_summary(variant);
        if summary != LineupSummary::default() {
            println!(
                "  AVG {} ({})  OBP {} ({})  SLG {} ({})  OPS {} ({})  wRC+ {:.0} ({})",
                format_rate(summary.avg),
                format_delta(delta(summary.avg, league.avg), 3),
                format_rate(summary.obp),
                format_delta(delta(summary.obp, league.obp), 3),
                format_rate(summary.slg),
                format_delta(delta(summary.slg, league.slg), 3),
                format_rate(summary.ops),
                format_delta(delta(summary.ops, league.ops), 3),
                summary.wrc,
                format_delta(delta(summary.wrc, league.wrc), 0),
            );
        }
        let split = app.split_summary(variant);
        if split != LineupSummary::default() {
            println!(
                "  {}: AVG {}  OBP {}  SLG {}  OPS {}  wRC+ {:.0}",
                variant.label(),
                format_rate(split.avg),
                format_rate(split.obp),
                format_rate(split.slg),
                format_rate(split.ops),
                split.wrc,
            );
        }
    }

    let top = finder::top_free_agents(app.players(), "", 5);
    if !top.is_empty() {
        println!("\nTop free agents:");
        for p in top {
            println!("  {:<24} WAR {:.1}", p.name, p.war.unwrap_or(0.0));
        }
    }

    let scenarios = app.saved_scenarios()?;
    println!("\nSaved scenarios for {}: {}", app.selected_team(), scenarios.len());
    for s in scenarios {
        println!("  {} ({})", s.name, s.id);
    }

    info!("Lineup lab done");
    Ok(())
}

/// Initialize tracing to stderr so the report on stdout stays clean.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("lineup_lab=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
