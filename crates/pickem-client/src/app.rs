// Command handlers: fetch through `PickemApi`, run the core logic, render.
//
// Every handler takes the `SessionContext` it works on and a writer for its
// output, so the same code serves the CLI and the integration tests.

use std::io::Write;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use pickem_core::{
    tally, Game, PickEdit, PickSet, QuotaViolation, StandingEntry, StandingsAggregator, UserTally,
    Week,
};
use tracing::{info, warn};

use crate::api::PickemApi;
use crate::config::{Config, OutputFormat};
use crate::context::SessionContext;
use crate::render;

/// What happened to a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The edited pick set broke the quota and was not sent.
    Rejected(Vec<QuotaViolation>),
    /// The server stored the picks and echoed them back.
    Submitted(PickSet),
}

/// Build the context for a command. The year and week default to the
/// backend's current week; the user defaults to the configured login.
pub async fn resolve_context(
    api: &dyn PickemApi,
    config: &Config,
    year: Option<i32>,
    week: Option<u32>,
    username: Option<String>,
) -> Result<SessionContext> {
    let username = username.or_else(|| config.credentials.username.clone());

    let base = match (year, week) {
        (Some(year), Some(week)) => Week { year, week },
        _ => api
            .current_week()
            .await
            .context("failed to fetch the current week")?,
    };

    let ctx = SessionContext::new(base, username).with_overrides(year, week);
    if ctx.week == 0 || ctx.week > config.season.weeks {
        bail!(
            "week {} is outside the season (1-{})",
            ctx.week,
            config.season.weeks
        );
    }
    Ok(ctx)
}

async fn login(api: &dyn PickemApi, config: &Config) -> Result<()> {
    let Some((username, password)) = config.credentials.login() else {
        bail!("no credentials configured; copy defaults/credentials.toml.example to config/credentials.toml");
    };
    api.login(username, password)
        .await
        .with_context(|| format!("login failed for {username}"))
}

pub async fn show_current(api: &dyn PickemApi, out: &mut dyn Write) -> Result<Week> {
    let week = api
        .current_week()
        .await
        .context("failed to fetch the current week")?;
    writeln!(out, "{week}")?;
    Ok(week)
}

/// Season-to-date standings through `ctx.week`.
pub async fn show_standings(
    api: &dyn PickemApi,
    ctx: &SessionContext,
    aggregator: &StandingsAggregator,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<Vec<StandingEntry>> {
    let totals = api
        .cumulative_totals(ctx.week())
        .await
        .with_context(|| format!("failed to fetch totals for {}", ctx.week()))?;
    let standings = aggregator
        .aggregate(&totals)
        .context("backend returned invalid weekly totals")?;
    info!(
        totals = totals.len(),
        users = standings.len(),
        "aggregated standings for {}",
        ctx.week()
    );

    match format {
        OutputFormat::Table => write!(out, "{}", render::standings_table(&standings))?,
        OutputFormat::Csv => render::standings_csv(&standings, &mut *out)?,
    }
    Ok(standings)
}

pub async fn show_games(
    api: &dyn PickemApi,
    ctx: &SessionContext,
    out: &mut dyn Write,
) -> Result<Vec<Game>> {
    let games = api
        .games(ctx.week())
        .await
        .with_context(|| format!("failed to fetch games for {}", ctx.week()))?;
    write!(out, "{}", render::games_table(&games))?;
    Ok(games)
}

pub async fn show_results(
    api: &dyn PickemApi,
    ctx: &SessionContext,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<Vec<UserTally>> {
    let results = api
        .results(ctx.week())
        .await
        .with_context(|| format!("failed to fetch results for {}", ctx.week()))?;
    let tallies = tally(&results);

    match format {
        OutputFormat::Table => write!(out, "{}", render::results_table(&results, &tallies))?,
        OutputFormat::Csv => render::tally_csv(&tallies, &mut *out)?,
    }
    Ok(tallies)
}

pub async fn show_picks(
    api: &dyn PickemApi,
    config: &Config,
    ctx: &SessionContext,
    now: DateTime<Utc>,
    out: &mut dyn Write,
) -> Result<PickSet> {
    login(api, config).await?;
    let picks = api
        .picks(ctx)
        .await
        .with_context(|| format!("failed to fetch picks for {}", ctx.week()))?;
    write!(out, "{}", render::picks_table(picks.as_slice(), now))?;

    let violations = picks.violations();
    if !violations.is_empty() {
        write!(out, "{}", render::violations(&violations))?;
    }
    Ok(picks)
}

/// Apply `edits` to the user's current picks and submit them. Nothing is
/// sent when the edited set breaks the quota; every violation is printed.
pub async fn submit_picks(
    api: &dyn PickemApi,
    config: &Config,
    ctx: &SessionContext,
    edits: &[PickEdit],
    now: DateTime<Utc>,
    out: &mut dyn Write,
) -> Result<SubmitOutcome> {
    if edits.is_empty() {
        bail!("no picks given");
    }

    login(api, config).await?;
    let mut picks = api
        .picks(ctx)
        .await
        .with_context(|| format!("failed to fetch picks for {}", ctx.week()))?;
    picks
        .apply(edits, now)
        .context("could not apply pick changes")?;

    let violations = picks.violations();
    if !violations.is_empty() {
        warn!(count = violations.len(), "pick set breaks the quota, not submitting");
        writeln!(out, "Unable to send picks. Please correct your point values.")?;
        write!(out, "{}", render::violations(&violations))?;
        return Ok(SubmitOutcome::Rejected(violations));
    }

    let saved = api
        .submit_picks(ctx, &picks)
        .await
        .context("failed to submit picks")?;
    info!(picks = saved.len(), "submitted picks for {}", ctx.week());
    writeln!(out, "Saved {} picks for {}.", saved.len(), ctx.week())?;
    write!(out, "{}", render::picks_table(saved.as_slice(), now))?;
    Ok(SubmitOutcome::Submitted(saved))
}
