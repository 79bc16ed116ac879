use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use log::info;

use health_form::terminal::{self, TerminalNotifier};
use health_form::view::ElementId;
use health_form::{FormPage, HttpTransport, SubmitOutcome, UiEvent, ViewState};

#[derive(Parser, Debug)]
#[command(name = "health-form", about = "Health risk form client", version)]
struct Cli {
    /// Base URL of the prediction service.
    #[arg(long, env = "HEALTH_API_URL", default_value = "http://127.0.0.1:8080")]
    server: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fill the form interactively (default).
    Interactive,
    /// Submit once with the given values; unset fields are sent empty.
    Submit(SubmitArgs),
}

#[derive(Args, Debug, Default)]
struct SubmitArgs {
    #[arg(long, default_value = "")]
    age: String,
    #[arg(long, default_value = "")]
    gender: String,
    #[arg(long, default_value = "")]
    systolic: String,
    #[arg(long, default_value = "")]
    diastolic: String,
    #[arg(long, default_value = "")]
    cholesterol: String,
    #[arg(long, default_value = "")]
    glucose: String,
    #[arg(long, default_value = "")]
    bmi: String,
    #[arg(long, default_value = "")]
    smoking: String,
}

impl SubmitArgs {
    fn values(self) -> [(ElementId, String); 8] {
        [
            (ElementId::Age, self.age),
            (ElementId::Gender, self.gender),
            (ElementId::Systolic, self.systolic),
            (ElementId::Diastolic, self.diastolic),
            (ElementId::Cholesterol, self.cholesterol),
            (ElementId::Glucose, self.glucose),
            (ElementId::Bmi, self.bmi),
            (ElementId::Smoking, self.smoking),
        ]
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .format_module_path(false)
        .init();

    let cli = Cli::parse();
    let transport = HttpTransport::new(&cli.server)
        .with_context(|| format!("cannot use server {}", cli.server))?;
    info!("Posting to {}", transport.endpoint());

    match cli.command.unwrap_or(Command::Interactive) {
        Command::Interactive => interactive(transport).await,
        Command::Submit(args) => submit_once(transport, args).await,
    }
}

async fn submit_once(transport: HttpTransport, args: SubmitArgs) -> anyhow::Result<ExitCode> {
    let mut view = ViewState::default();
    for (id, value) in args.values() {
        view.set_value(id, value);
    }

    let page = FormPage::bind(
        view,
        Arc::new(transport),
        Arc::new(TerminalNotifier { blocking: false }),
    );
    let outcome = page.dispatch(UiEvent::Submit).await;

    terminal::render_result(&mut io::stdout(), &page.snapshot().await)?;
    Ok(match outcome {
        Some(SubmitOutcome::Rendered) => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

async fn interactive(transport: HttpTransport) -> anyhow::Result<ExitCode> {
    let page = FormPage::bind(
        ViewState::default(),
        Arc::new(transport),
        Arc::new(TerminalNotifier { blocking: true }),
    );
    let view = page.view();

    loop {
        let complete = {
            let mut state = view.lock().await;
            terminal::fill_form(&mut io::stdin().lock(), &mut io::stdout(), &mut state)?
        };
        if !complete {
            break;
        }

        println!("Predicting...");
        page.dispatch(UiEvent::Submit).await;
        terminal::render_result(&mut io::stdout(), &page.snapshot().await)?;

        if !terminal::ask_again(&mut io::stdin().lock(), &mut io::stdout())? {
            break;
        }
        page.dispatch(UiEvent::Reset).await;
    }

    io::stdout().flush()?;
    Ok(ExitCode::SUCCESS)
}
