use statuspanel::{
    app::App,
    cli::{Command, RunOptions},
    Result,
};

fn main() {
    if let Err(err) = try_main() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match Command::parse(&args) {
        Ok(Command::ShowHelp) => {
            Command::print_help();
            Ok(())
        }
        Ok(Command::ShowVersion) => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Ok(Command::Snapshot(opts)) => print_snapshot(opts),
        Ok(Command::Run(opts)) => App::from_options(opts)?.run(),
        Err(err) => {
            Command::print_help();
            Err(err)
        }
    }
}

fn print_snapshot(opts: RunOptions) -> Result<()> {
    let app = App::from_options(opts)?;
    let snapshot = app.snapshot()?;
    let json = serde_json::to_string_pretty(&snapshot)
        .map_err(|e| statuspanel::Error::Parse(format!("json: {e}")))?;
    println!("{json}");
    Ok(())
}
