use anyhow::Result;
use colored::{ColoredString, Colorize};
use gachaluck_engine::{AnnotatedDraw, DistributionRow, Engine, LuckTier, SummaryStats};
use serde::Serialize;
use std::io::Write;

/// Everything an analysis report prints.
#[derive(Debug, Serialize)]
pub struct AnalysisReport<'a> {
    pub generated_at: String,
    pub profile: &'a str,
    pub source: String,
    pub stats: &'a SummaryStats,
}

impl<'a> AnalysisReport<'a> {
    pub fn new(engine: &'a Engine, source: impl Into<String>, stats: &'a SummaryStats) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            profile: &engine.profile().name,
            source: source.into(),
            stats,
        }
    }
}

/// Probability table with the expectations it implies.
#[derive(Debug, Serialize)]
pub struct TableReport<'a> {
    pub profile: &'a str,
    pub expected_rare: f64,
    pub expected_featured: f64,
    pub rows: Vec<DistributionRow>,
}

impl<'a> TableReport<'a> {
    pub fn new(engine: &'a Engine) -> Self {
        Self {
            profile: &engine.profile().name,
            expected_rare: engine.theoretical_expected_rare(),
            expected_featured: engine.theoretical_expected_featured(),
            rows: engine.distribution().rows().collect(),
        }
    }
}

pub fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    writeln!(out, "{json}")?;
    Ok(())
}

fn tier_colored(tier: LuckTier) -> ColoredString {
    let label = tier.label();
    match tier {
        LuckTier::Blessed | LuckTier::Radiant => label.bright_green().bold(),
        LuckTier::Fortunate | LuckTier::Steady => label.green(),
        LuckTier::Rocky | LuckTier::Jinxed => label.yellow(),
        LuckTier::PityWarrior | LuckTier::Forsaken => label.red().bold(),
    }
}

fn featured_mark(featured: bool) -> &'static str {
    if featured { "featured" } else { "standard" }
}

pub fn write_analysis_console<W: Write>(out: &mut W, report: &AnalysisReport<'_>) -> Result<()> {
    let stats = report.stats;
    writeln!(out, "{}", "🎲 Gacha Luck Analysis".bright_cyan().bold())?;
    writeln!(out, "{}", "======================".cyan())?;
    writeln!(out, "Profile: {}", report.profile)?;
    writeln!(out, "Source: {}", report.source)?;
    writeln!(out)?;
    writeln!(out, "Total pulls: {}", stats.total_pulls)?;
    for (rarity, count) in &stats.count_by_rarity {
        writeln!(out, "  {rarity}★: {count}")?;
    }
    writeln!(
        out,
        "Featured: {} of {} rare ({:.1}% won)",
        stats.featured_count.to_string().green(),
        stats.rare_count,
        stats.win_rate
    )?;
    writeln!(
        out,
        "Average pulls per rare: {:.1} (expected {:.1})",
        stats.avg_pulls_per_rare, stats.theoretical_expected_rare
    )?;
    writeln!(
        out,
        "Average pulls per featured: {:.1} (expected {:.1})",
        stats.avg_pulls_per_featured, stats.theoretical_expected_featured
    )?;
    writeln!(out, "Current pity: {}", stats.current_pity)?;
    if stats.guarantee_active {
        writeln!(out, "{}", "Next rare draw is guaranteed featured".yellow())?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "Luck: {} ({}), percentile {:.2}",
        tier_colored(stats.tier),
        stats.tier.descriptor(),
        stats.percentile
    )?;

    if !stats.rare_draws.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", "Rare draws".bold())?;
        for draw in &stats.rare_draws {
            let mark = if draw.featured {
                featured_mark(true).green()
            } else {
                featured_mark(false).red()
            };
            writeln!(
                out,
                "  #{:<5} {:<16} pity {:>3}  {}  {}",
                draw.position, draw.name, draw.pity, mark, draw.time
            )?;
        }
    }
    Ok(())
}

pub fn write_analysis_markdown<W: Write>(out: &mut W, report: &AnalysisReport<'_>) -> Result<()> {
    let stats = report.stats;
    writeln!(out, "# Gacha Luck Analysis\n")?;
    writeln!(out, "_{} · {} · {}_\n", report.profile, report.source, report.generated_at)?;
    writeln!(out, "## Summary\n")?;
    writeln!(out, "| Metric | Value |")?;
    writeln!(out, "| --- | --- |")?;
    writeln!(out, "| Total pulls | {} |", stats.total_pulls)?;
    writeln!(out, "| Rare draws | {} |", stats.rare_count)?;
    writeln!(out, "| Uncommon draws | {} |", stats.uncommon_count)?;
    writeln!(out, "| Featured draws | {} |", stats.featured_count)?;
    writeln!(out, "| Win rate | {:.1}% |", stats.win_rate)?;
    writeln!(
        out,
        "| Avg pulls per rare | {:.1} (expected {:.1}) |",
        stats.avg_pulls_per_rare, stats.theoretical_expected_rare
    )?;
    writeln!(
        out,
        "| Avg pulls per featured | {:.1} (expected {:.1}) |",
        stats.avg_pulls_per_featured, stats.theoretical_expected_featured
    )?;
    writeln!(out, "| Percentile | {:.2} |", stats.percentile)?;
    writeln!(out, "| Luck tier | {} |", stats.tier.label())?;
    writeln!(out, "| Current pity | {} |", stats.current_pity)?;
    writeln!(
        out,
        "| Guarantee active | {} |",
        if stats.guarantee_active { "yes" } else { "no" }
    )?;

    if !stats.rare_draws.is_empty() {
        writeln!(out, "\n## Rare Draws\n")?;
        writeln!(out, "| # | Name | Pity | Outcome | Time |")?;
        writeln!(out, "| --- | --- | --- | --- | --- |")?;
        for draw in &stats.rare_draws {
            writeln!(
                out,
                "| {} | {} | {} | {} | {} |",
                draw.position,
                draw.name,
                draw.pity,
                featured_mark(draw.featured),
                draw.time
            )?;
        }
    }
    Ok(())
}

pub fn write_analysis_csv<W: Write>(out: &mut W, report: &AnalysisReport<'_>) -> Result<()> {
    writeln!(out, "position,name,pity,featured,time")?;
    for draw in &report.stats.rare_draws {
        writeln!(
            out,
            "{},{},{},{},{}",
            draw.position,
            csv_field(&draw.name),
            draw.pity,
            draw.featured,
            csv_field(&draw.time)
        )?;
    }
    Ok(())
}

pub fn write_table_console<W: Write>(out: &mut W, table: &TableReport<'_>) -> Result<()> {
    writeln!(
        out,
        "{}",
        format!("📈 {} probability table", table.profile)
            .bright_cyan()
            .bold()
    )?;
    writeln!(out, "Expected pulls per rare: {:.4}", table.expected_rare)?;
    writeln!(out, "Expected pulls per featured: {:.4}", table.expected_featured)?;
    writeln!(out)?;
    writeln!(out, "{:>5} {:>9} {:>12} {:>11}", "draw", "rate %", "first hit %", "cumul. %")?;
    for row in &table.rows {
        writeln!(
            out,
            "{:>5} {:>9.3} {:>12.4} {:>11.3}",
            row.draw,
            row.rate * 100.0,
            row.first_success * 100.0,
            row.cumulative * 100.0
        )?;
    }
    Ok(())
}

pub fn write_table_markdown<W: Write>(out: &mut W, table: &TableReport<'_>) -> Result<()> {
    writeln!(out, "# {} Probability Table\n", table.profile)?;
    writeln!(out, "- **Expected pulls per rare**: {:.4}", table.expected_rare)?;
    writeln!(
        out,
        "- **Expected pulls per featured**: {:.4}\n",
        table.expected_featured
    )?;
    writeln!(out, "| Draw | Rate % | First hit % | Cumulative % |")?;
    writeln!(out, "| --- | --- | --- | --- |")?;
    for row in &table.rows {
        writeln!(
            out,
            "| {} | {:.3} | {:.4} | {:.3} |",
            row.draw,
            row.rate * 100.0,
            row.first_success * 100.0,
            row.cumulative * 100.0
        )?;
    }
    Ok(())
}

pub fn write_table_csv<W: Write>(out: &mut W, table: &TableReport<'_>) -> Result<()> {
    writeln!(out, "draw,rate,first_success,cumulative")?;
    for row in &table.rows {
        writeln!(
            out,
            "{},{},{},{}",
            row.draw, row.rate, row.first_success, row.cumulative
        )?;
    }
    Ok(())
}

pub fn write_tiers<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "{}", "🍀 Luck tiers (lower percentile is luckier)".bold())?;
    let mut lower: Option<f64> = None;
    for tier in LuckTier::ALL {
        let range = match (lower, tier.upper_bound()) {
            (None, Some(upper)) => format!("≤ {upper}"),
            (Some(low), Some(upper)) => format!("{low} < p ≤ {upper}"),
            (Some(low), None) => format!("> {low}"),
            (None, None) => "any".to_string(),
        };
        writeln!(
            out,
            "  {:<14} {:<20} {}",
            range,
            tier_colored(tier),
            tier.descriptor()
        )?;
        lower = tier.upper_bound();
    }
    Ok(())
}

pub fn write_history_console<W: Write>(out: &mut W, draws: &[AnnotatedDraw]) -> Result<()> {
    writeln!(out, "{}", "📜 Draw history (newest first)".bright_cyan().bold())?;
    for draw in draws {
        let line = format!(
            "  {:<19} pool {:<3} {}★ {:<16} pity {:>3}",
            draw.time,
            draw.pool.map_or_else(|| "-".to_string(), |pool| pool.to_string()),
            draw.rarity,
            draw.name,
            draw.pity
        );
        match draw.rarity {
            5 if draw.featured => writeln!(out, "{}", line.bright_yellow().bold())?,
            5 => writeln!(out, "{}", line.yellow())?,
            4 => writeln!(out, "{}", line.magenta())?,
            _ => writeln!(out, "{line}")?,
        }
    }
    Ok(())
}

pub fn write_history_markdown<W: Write>(out: &mut W, draws: &[AnnotatedDraw]) -> Result<()> {
    writeln!(out, "# Draw History\n")?;
    writeln!(out, "| Time | Pool | Rarity | Name | Pity | Featured |")?;
    writeln!(out, "| --- | --- | --- | --- | --- | --- |")?;
    for draw in draws {
        writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} |",
            draw.time,
            draw.pool.map_or_else(String::new, |pool| pool.to_string()),
            draw.rarity,
            draw.name,
            draw.pity,
            if draw.featured { "yes" } else { "" }
        )?;
    }
    Ok(())
}

pub fn write_history_csv<W: Write>(out: &mut W, draws: &[AnnotatedDraw]) -> Result<()> {
    writeln!(out, "time,pool,position,rarity,name,category,pity,featured")?;
    for draw in draws {
        writeln!(
            out,
            "{},{},{},{},{},{},{},{}",
            csv_field(&draw.time),
            draw.pool.map_or_else(String::new, |pool| pool.to_string()),
            draw.position,
            draw.rarity,
            csv_field(&draw.name),
            draw.category,
            draw.pity,
            draw.featured
        )?;
    }
    Ok(())
}

/// Quote a field when it holds a separator, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
