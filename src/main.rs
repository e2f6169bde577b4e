use chat_history_explorer::cli;
use chat_history_explorer::utils::init_logging;

fn main() -> anyhow::Result<()> {
    init_logging("warn");
    cli::run()
}
