use crate::analysis::{PlacementStats, RankedEntry};
use crate::crawl::{CrawlOutcome, CrawlReport};
use crate::icons::IconReport;
use crate::model::Champion;
use colored::*;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct RankRow {
    rank: String,
    #[tabled(rename = "champions")]
    label: String,
    average: String,
    games: String,
}

#[derive(Tabled)]
struct PlacementRow {
    placement: String,
    games: String,
    share: String,
}

fn rank_rows(entries: &[RankedEntry]) -> Vec<RankRow> {
    entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| RankRow {
            rank: format!("#{}", idx + 1),
            label: entry.label.clone(),
            average: format!("{:.2}", entry.average),
            games: entry.samples.to_string(),
        })
        .collect()
}

fn print_ranking(title: &str, entries: &[RankedEntry]) {
    println!("\n{}", title.bold().cyan());
    println!("{}\n", "=".repeat(60).cyan());

    if entries.is_empty() {
        println!("{}", "No placements recorded yet".yellow());
        return;
    }

    let mut table = Table::new(rank_rows(entries));
    table.with(Style::rounded());
    println!("{}", table);
}

pub fn display_total_matches(stats: &PlacementStats) {
    println!(
        "\n{} {} matches recorded ({} teams, {} champions)",
        "📊 Total:".bold(),
        stats.total_matches().to_string().green(),
        stats.team_count(),
        stats.matrix().len()
    );
}

pub fn display_best_champions(entries: &[RankedEntry]) {
    print_ranking("🏆 BEST CHAMPIONS (lowest average placement)", entries);
}

pub fn display_best_pairs(entries: &[RankedEntry]) {
    print_ranking("👥 BEST DUOS (lowest average placement)", entries);
    println!("\n{}", "Interpretation".bold().yellow());
    println!("• Average: mean final placement, 1 is a win");
    println!("• Games: number of recorded matches behind the average\n");
}

pub fn display_champion_report(stats: &PlacementStats, champion: &Champion, best_teammates: &[RankedEntry]) {
    println!("\n{}", format!("🎮 Placement report for {}", champion).bold().cyan());
    println!("{}\n", "=".repeat(60).cyan());

    let (Some(counts), Some(summary)) = (stats.total_placements(champion), stats.average_placement(champion)) else {
        display_error(&format!("'{}' is not a registered champion", champion));
        return;
    };

    if !summary.has_samples() {
        println!("{}", "No placements recorded yet".yellow());
        return;
    }

    let mut table = Table::new(placement_rows(&counts, summary.samples));
    table.with(Style::rounded());
    println!("{}", table);

    let average = format!("{:.2}", summary.average);
    let midpoint = (stats.team_count() as f64 + 1.0) / 2.0;
    let average = if summary.average < midpoint { average.green() } else { average.red() };
    println!("\n{} {} over {} games\n", "📈 Average placement:".bold(), average, summary.samples);

    print_ranking(&format!("🤝 BEST TEAMMATES FOR {}", champion.name().to_uppercase()), best_teammates);
    println!();
}

pub fn display_pair_report(stats: &PlacementStats, first: &Champion, second: &Champion, counts: &[u64]) {
    println!("\n{}", format!("👥 {} + {}", first, second).bold().cyan());
    println!("{}\n", "=".repeat(60).cyan());

    let Some(summary) = stats.average_pairwise_placement(first, second) else {
        display_error(&format!("'{}' or '{}' is not a registered champion", first, second));
        return;
    };
    if !summary.has_samples() {
        println!("{}", "These champions have not been recorded together yet".yellow());
        return;
    }

    let mut table = Table::new(placement_rows(counts, summary.samples));
    table.with(Style::rounded());
    println!("{}", table);
    println!(
        "\n{} {:.2} over {} games\n",
        "📈 Average placement:".bold(),
        summary.average,
        summary.samples
    );
}

fn placement_rows(counts: &[u64], samples: u64) -> Vec<PlacementRow> {
    counts
        .iter()
        .enumerate()
        .map(|(idx, count)| PlacementRow {
            placement: format!("#{}", idx + 1),
            games: count.to_string(),
            share: format!("{:.1}%", *count as f64 / samples as f64 * 100.0),
        })
        .collect()
}

pub fn display_crawl_report(report: &CrawlReport) {
    let outcome = match report.outcome {
        CrawlOutcome::TargetReached => "target reached".green(),
        CrawlOutcome::ListProcessed => "recent matches processed".green(),
        CrawlOutcome::Cancelled => "cancelled".yellow(),
        CrawlOutcome::TimeBudgetSpent => "time budget spent".yellow(),
        CrawlOutcome::IterationCeiling => "iteration limit hit".red(),
    };
    let elapsed = report.finished_at.signed_duration_since(report.started_at);

    println!("\n{} {}", "🕸️ Crawl finished:".bold().cyan(), outcome);
    println!("   Recorded:          {}", report.recorded.to_string().green());
    println!("   Already recorded:  {}", report.already_recorded);
    println!("   Invalid:           {}", report.invalid);
    println!("   Skipped:           {}", report.skipped);
    println!("   Players listed:    {}", report.players_listed);
    println!("   Peak cached:       {}", report.peak_cached);
    println!(
        "   Took {} iterations in {}m {}s",
        report.iterations,
        elapsed.num_minutes(),
        elapsed.num_seconds() % 60
    );
}

pub fn display_icon_report(report: &IconReport) {
    display_success(&format!("Saved {} champion icons", report.saved));
    if report.failed > 0 {
        println!("{} {} icons failed, see the log", "⚠️".yellow(), report.failed);
    }
}

pub fn display_error(error: &str) {
    eprintln!("{} {}", "❌ Error:".red().bold(), error);
}

pub fn display_info(message: &str) {
    println!("{} {}", "ℹ️".cyan(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_placement_rows_show_share_of_games() {
        let rows = placement_rows(&[3, 1, 0, 0], 4);

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].placement, "#1");
        assert_eq!(rows[0].share, "75.0%");
        assert_eq!(rows[1].games, "1");
        assert_eq!(rows[3].share, "0.0%");
    }

    #[test]
    fn test_rank_rows_number_from_one() {
        let entries = vec![
            RankedEntry { label: "ahri + zed".to_string(), average: 1.25, samples: 4 },
            RankedEntry { label: "lux".to_string(), average: 2.0, samples: 10 },
        ];

        let rows = rank_rows(&entries);

        assert_eq!(rows[0].rank, "#1");
        assert_eq!(rows[0].average, "1.25");
        assert_eq!(rows[1].rank, "#2");
        assert_eq!(rows[1].games, "10");
    }
}
