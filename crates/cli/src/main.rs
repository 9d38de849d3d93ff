use clap::Parser;
use engine::{Engine, DEFAULT_DATA_DIRECTORY};
use repl::Repl;
use std::path::PathBuf;

mod repl;
mod server;

/// Script files hold one command per line.
const SCRIPT_FILE_EXT: &str = ".tdb";

#[derive(Parser, Debug)]
#[command(name = "tabdb", version, about = "A flat-file database spoken to one line at a time")]
struct Args {
    /// Directory holding one sub-directory per database
    #[arg(short, long, default_value = DEFAULT_DATA_DIRECTORY)]
    data: PathBuf,

    /// Serve the line protocol on this address instead of starting a REPL
    #[arg(short, long, value_name = "ADDR")]
    listen: Option<String>,

    /// A single command, or a .tdb script to run
    input: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    let engine = Engine::new(&args.data);
    engine.init()?;

    if let Some(addr) = args.listen {
        let runtime = tokio::runtime::Runtime::new()?;
        return runtime.block_on(server::serve(engine, &addr));
    }

    let mut repl = Repl::new(engine);

    match args.input {
        None => repl.run(),
        Some(input) if input.to_lowercase().ends_with(SCRIPT_FILE_EXT) => repl.eval_file(&input)?,
        Some(input) => repl.eval_command(&input),
    }

    Ok(())
}
