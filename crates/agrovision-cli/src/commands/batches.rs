use agrovision_core::batch_form::CREATE_FAILED_MESSAGE;
use agrovision_core::{BatchAggregate, BatchForm, BatchListModel, LoadOutcome};
use anyhow::anyhow;
use chrono::Utc;

use crate::cli::{BatchAddArgs, BatchShowArgs, TrackArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{render_batch_list, render_batch_record, render_batch_view};

fn applied(outcome: LoadOutcome) -> CliResult<()> {
    match outcome {
        LoadOutcome::Applied => Ok(()),
        LoadOutcome::Failed(error) => Err(error.into()),
        LoadOutcome::Discarded => Err(CliError::failure(anyhow!(
            "response arrived after the view was superseded"
        ))),
    }
}

pub(crate) async fn handle_batch_list(ctx: &AppContext) -> CliResult<()> {
    let model = BatchListModel::new(ctx.remote());
    applied(model.load().await)?;
    let state = model.state();
    render_batch_list(&state.batches, ctx.output)
}

pub(crate) async fn handle_batch_show(ctx: &AppContext, args: BatchShowArgs) -> CliResult<()> {
    let aggregate = BatchAggregate::new(ctx.remote());
    applied(aggregate.load(args.id).await)?;
    render_batch_view(&aggregate.view(), ctx.output)
}

pub(crate) async fn handle_batch_add(ctx: &AppContext, args: BatchAddArgs) -> CliResult<()> {
    let mut form = BatchForm::new();
    form.name = args.name;
    form.kind = args.kind;
    form.sowing_date = args.sowing_date;
    form.substrate = args.substrate;

    let record = form
        .submit(&*ctx.gateway)
        .await
        .map_err(|err| CliError::with_notice(CREATE_FAILED_MESSAGE, &err))?;
    println!("Batch added successfully! (id: {})", record.batch_id);
    render_batch_record(&record, ctx.output)
}

pub(crate) async fn handle_track(ctx: &AppContext, args: TrackArgs) -> CliResult<()> {
    if args.photos.iter().any(|uri| uri.trim().is_empty()) {
        return Err(CliError::validation("photo reference must not be empty"));
    }

    let aggregate = BatchAggregate::new(ctx.remote());
    applied(aggregate.load(args.id).await)?;

    for uri in args.photos {
        aggregate.add_photo(uri.trim());
    }
    if args.irrigation {
        aggregate.add_irrigation_event(Utc::now());
    }
    for note in args.notes {
        if !aggregate.add_growth_note(note) {
            tracing::debug!("skipped blank growth note");
        }
    }

    let view = aggregate.view();
    render_batch_view(&view, ctx.output)?;
    aggregate.close();
    Ok(())
}
