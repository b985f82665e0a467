use anyhow::anyhow;
use sillage_api_models::SearchQuery;
use sillage_core::{CollectionApi, PerfumeForm};

use crate::cli::{CreateArgs, PerfumeIdArgs, RemoveArgs, SearchArgs};
use crate::client::{AppContext, CliError, CliResult, confirm};
use crate::output::{render_collection, render_message, render_perfume, render_perfumes};

pub(crate) async fn handle_search(ctx: &AppContext, args: SearchArgs) -> CliResult<()> {
    let text = args.query.trim();
    if text.is_empty() {
        return Err(CliError::validation("search text is required"));
    }

    if args.brand.is_some() || args.accord.is_some() || args.limit.is_some() {
        let query = SearchQuery {
            query: Some(text.to_string()),
            brand: args.brand,
            accord: args.accord,
            limit: args.limit.unwrap_or(ctx.search_limit),
        };
        let results = ctx.client.collection().search(&query).await?;
        return render_perfumes(&results, ctx.output);
    }

    let signed_in = ctx.client.session().is_authenticated();
    let sync = ctx.client.sync();
    sync.set_query(text);
    let view = sync.settled().await;
    if let Some(message) = view.error {
        if signed_in && !ctx.client.session().is_authenticated() {
            return Err(CliError::auth(message));
        }
        return Err(CliError::failure(anyhow!(message)));
    }
    render_perfumes(&view.search_results, ctx.output)
}

pub(crate) async fn handle_collection_list(ctx: &AppContext) -> CliResult<()> {
    ctx.require_session()?;
    let sync = ctx.client.sync();
    sync.reload_collection().await?;
    render_collection(&sync.view().collection, ctx.output)
}

pub(crate) async fn handle_collection_add(ctx: &AppContext, args: PerfumeIdArgs) -> CliResult<()> {
    ctx.require_session()?;
    ctx.client.sync().add_to_collection(args.id).await?;
    render_message(
        &format!("perfume {} added to your collection", args.id),
        ctx.output,
    )
}

pub(crate) async fn handle_collection_remove(ctx: &AppContext, args: RemoveArgs) -> CliResult<()> {
    ctx.require_session()?;
    let sync = ctx.client.sync();
    sync.reload_collection().await?;
    if !sync.view().contains(args.id) {
        return Err(CliError::validation(format!(
            "perfume {} is not in your collection",
            args.id
        )));
    }

    sync.request_removal(args.id);
    if !args.yes {
        let view = sync.view();
        let label = view
            .pending_entry()
            .map_or_else(|| args.id.to_string(), |entry| entry.perfume.name.clone());
        if !confirm(&format!("Remove {label} from your collection?"))? {
            sync.cancel_removal();
            return render_message("removal cancelled", ctx.output);
        }
    }

    if sync.confirm_removal().await? {
        render_message(
            &format!("perfume {} removed from your collection", args.id),
            ctx.output,
        )
    } else {
        render_message("nothing to remove", ctx.output)
    }
}

pub(crate) async fn handle_collection_create(ctx: &AppContext, args: CreateArgs) -> CliResult<()> {
    ctx.require_session()?;
    let form = PerfumeForm {
        name: args.name,
        brand: args.brand,
        perfumer: args.perfumer.unwrap_or_default(),
        notes: args.notes,
        accords: args.accords,
    };
    let created = ctx.client.sync().create_and_add(form).await?;
    render_perfume(&created, ctx.output)
}
