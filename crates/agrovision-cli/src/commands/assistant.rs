use agrovision_core::chat::ASK_FAILED_MESSAGE;
use agrovision_core::{AssistantChat, ChatOutcome};

use crate::cli::AskArgs;
use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_answer;

pub(crate) async fn handle_ask(ctx: &AppContext, args: AskArgs) -> CliResult<()> {
    let question = args.question.join(" ");
    let chat = AssistantChat::new(ctx.assistant());
    match chat.ask(&question).await {
        ChatOutcome::Answered(answer) => render_answer(&answer, ctx.output),
        ChatOutcome::Ignored => Err(CliError::validation("question must not be empty")),
        ChatOutcome::Failed(error) => Err(CliError::with_notice(ASK_FAILED_MESSAGE, &error)),
    }
}
