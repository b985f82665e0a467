use sillage_core::RecommendationDraft;

use crate::cli::{HistoryArgs, RecommendCreateArgs, RecommendationIdArgs};
use crate::client::{AppContext, CliResult};
use crate::output::{render_recommendation, render_recommendations};

pub(crate) async fn handle_recommend_create(
    ctx: &AppContext,
    args: RecommendCreateArgs,
) -> CliResult<()> {
    ctx.require_session()?;
    let draft = RecommendationDraft {
        event_date: args.date,
        event_time: args.time,
        latitude: args.latitude,
        longitude: args.longitude,
        venue_name: args.venue,
        venue_kind: args.venue_kind,
        venue_description: args.venue_description,
        occasion: args.occasion,
        expectation: args.expectation,
        attire: args.attire,
    };
    let recommendation = ctx.client.recommendations().create(&draft).await?;
    render_recommendation(&recommendation, ctx.output)
}

pub(crate) async fn handle_recommend_history(ctx: &AppContext, args: HistoryArgs) -> CliResult<()> {
    ctx.require_session()?;
    let history = ctx.client.recommendations().history(args.limit).await?;
    render_recommendations(&history, ctx.output)
}

pub(crate) async fn handle_recommend_show(
    ctx: &AppContext,
    args: RecommendationIdArgs,
) -> CliResult<()> {
    ctx.require_session()?;
    let recommendation = ctx.client.recommendations().get(args.id).await?;
    render_recommendation(&recommendation, ctx.output)
}
