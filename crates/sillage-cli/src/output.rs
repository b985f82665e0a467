//! Output renderers and formatting helpers for CLI commands.

use anyhow::anyhow;
use serde::Serialize;
use serde_json::json;
use sillage_api_models::{
    CollectionEntry, Perfume, Recommendation, SubscriptionStatus, UserProfile,
};

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

pub(crate) fn render_message(message: &str, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&json!({ "message": message })),
        OutputFormat::Table => {
            println!("{message}");
            Ok(())
        }
    }
}

pub(crate) fn render_profile(profile: &UserProfile, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(profile),
        OutputFormat::Table => {
            println!("id: {}", profile.id);
            println!("name: {}", profile.display_name());
            println!("email: {}", profile.email);
            println!("subscribed: {}", yes_no(profile.subscribed));
            println!("queries remaining: {}", profile.queries_remaining);
            println!("verified: {}", yes_no(profile.verified));
            Ok(())
        }
    }
}

pub(crate) fn render_subscription(
    status: &SubscriptionStatus,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(status),
        OutputFormat::Table => {
            println!("subscribed: {}", yes_no(status.subscribed));
            println!("queries remaining: {}", status.queries_remaining);
            if !status.message.is_empty() {
                println!("{}", status.message);
            }
            Ok(())
        }
    }
}

pub(crate) fn render_perfumes(perfumes: &[Perfume], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(perfumes),
        OutputFormat::Table => {
            if perfumes.is_empty() {
                println!("no perfumes found");
                return Ok(());
            }
            println!("{:>6} {:<28} {:<20} ACCORDS", "ID", "NAME", "BRAND");
            for perfume in perfumes {
                println!("{}", perfume_row(perfume));
            }
            Ok(())
        }
    }
}

pub(crate) fn render_perfume(perfume: &Perfume, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(perfume),
        OutputFormat::Table => {
            println!("id: {}", perfume.id);
            println!("name: {}", perfume.name);
            println!("brand: {}", perfume.brand);
            if let Some(perfumer) = &perfume.perfumer {
                println!("perfumer: {perfumer}");
            }
            println!("notes: {}", join_or_dash(&perfume.notes));
            println!("accords: {}", join_or_dash(&perfume.accords));
            Ok(())
        }
    }
}

pub(crate) fn render_collection(entries: &[CollectionEntry], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(entries),
        OutputFormat::Table => {
            if entries.is_empty() {
                println!("your collection is empty");
                return Ok(());
            }
            println!(
                "{:>6} {:<28} {:<20} {:<10} ACCORDS",
                "ID", "NAME", "BRAND", "ADDED"
            );
            for entry in entries {
                let perfume = &entry.perfume;
                println!(
                    "{:>6} {:<28} {:<20} {:<10} {}",
                    perfume.id,
                    truncate(&perfume.name, 28),
                    truncate(&perfume.brand, 20),
                    entry.added_at.format("%Y-%m-%d").to_string(),
                    join_or_dash(&perfume.accords)
                );
            }
            Ok(())
        }
    }
}

pub(crate) fn render_recommendation(
    recommendation: &Recommendation,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(recommendation),
        OutputFormat::Table => {
            println!("id: {}", recommendation.id);
            println!(
                "event: {} at {} ({} {})",
                recommendation.occasion,
                recommendation.venue_name,
                recommendation.event_date,
                recommendation.event_time.format("%H:%M")
            );
            println!(
                "weather: {} ({:.1} °C, {:.0}% humidity)",
                recommendation.weather_description,
                recommendation.temperature,
                recommendation.humidity
            );
            match &recommendation.recommended_perfume {
                Some(perfume) => println!("perfume: {} by {}", perfume.name, perfume.brand),
                None => println!("perfume: -"),
            }
            if let Some(explanation) = &recommendation.explanation {
                println!("why: {explanation}");
            }
            Ok(())
        }
    }
}

pub(crate) fn render_recommendations(
    recommendations: &[Recommendation],
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(recommendations),
        OutputFormat::Table => {
            if recommendations.is_empty() {
                println!("no recommendations yet");
                return Ok(());
            }
            println!("{:>6} {:<10} {:<24} PERFUME", "ID", "DATE", "OCCASION");
            for recommendation in recommendations {
                let perfume = recommendation
                    .recommended_perfume
                    .as_ref()
                    .map_or_else(|| "-".to_string(), |perfume| perfume.name.clone());
                println!(
                    "{:>6} {:<10} {:<24} {}",
                    recommendation.id,
                    recommendation.event_date,
                    truncate(&recommendation.occasion, 24),
                    perfume
                );
            }
            Ok(())
        }
    }
}

#[must_use]
pub(crate) fn perfume_row(perfume: &Perfume) -> String {
    format!(
        "{:>6} {:<28} {:<20} {}",
        perfume.id,
        truncate(&perfume.name, 28),
        truncate(&perfume.brand, 20),
        join_or_dash(&perfume.accords)
    )
}

#[must_use]
pub(crate) fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

#[must_use]
pub(crate) fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let kept: String = value.chars().take(width.saturating_sub(1)).collect();
    format!("{kept}…")
}

const fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}
