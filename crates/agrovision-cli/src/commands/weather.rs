use agrovision_core::weather::FETCH_FAILED_MESSAGE;
use agrovision_core::{Coordinates, LocationFix, WeatherModel};
use anyhow::anyhow;

use crate::cli::WeatherArgs;
use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_weather;

pub(crate) async fn handle_weather(ctx: &AppContext, args: WeatherArgs) -> CliResult<()> {
    let coordinates = Coordinates::new(args.lat, args.lon)?;
    let model = WeatherModel::new(ctx.weather()?);
    model.load(LocationFix::Granted(coordinates)).await;

    let state = model.state();
    if let Some(error) = &state.error {
        return Err(CliError::with_notice(FETCH_FAILED_MESSAGE, error));
    }
    let report = state
        .report
        .as_ref()
        .ok_or_else(|| CliError::failure(anyhow!(FETCH_FAILED_MESSAGE)))?;
    render_weather(report, ctx.config.weather.units, ctx.output)
}
